use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::secrets::CookieError;


/// Everything that can stop configuration resolution.
///
/// [`ConfigurationError::Missing`] is a guided exit: the operator simply has
/// not produced a configuration yet. Every other kind is an unrecoverable
/// startup error.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigurationError {
    #[error("Cannot find configuration!")]
    #[diagnostic(
        code(semaphore::configuration::missing),
        help(
            "Use -config to point to a JSON file generated by -setup. \
             Have you run `-setup`?"
        )
    )]
    Missing,

    #[error("Could not open configuration file {}.", .path.display())]
    #[diagnostic(code(semaphore::configuration::unreadable))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not decode configuration from {origin}.")]
    #[diagnostic(code(semaphore::configuration::malformed))]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configured cookie secrets are unusable.")]
    #[diagnostic(
        code(semaphore::configuration::cookie_secret),
        help("Generate fresh cookie_hash and cookie_encryption values with -printConfig.")
    )]
    InvalidCookieSecret(#[from] CookieError),
}

impl ConfigurationError {
    pub fn is_unrecoverable(&self) -> bool {
        !matches!(self, ConfigurationError::Missing)
    }

    /// Process exit status the startup sequencer should use for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_unrecoverable() {
            2
        } else {
            1
        }
    }
}

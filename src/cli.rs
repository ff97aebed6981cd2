//! Command-line interface definitions for the server binary.
//!
//! Flags are single-dash long flags (`-config path`, `-printConfig`); the
//! double-dash forms are accepted too. At most one operating mode may be
//! selected per invocation.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Long flag names that may be written with a single dash.
const LONG_FLAGS: [&str; 6] = ["setup", "migrate", "upgrade", "config", "hash", "printConfig"];

/// Flags that take no value but still accept an explicit `-flag=<bool>`.
const BOOLEAN_FLAGS: [&str; 4] = ["setup", "migrate", "upgrade", "printConfig"];



/// Command-line arguments.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "semaphore",
    author,
    about = "Task-automation server: configuration bootstrap.",
    version
)]
#[command(group(
    ArgGroup::new("mode")
        .args(["setup", "migrate", "upgrade", "hash", "print_config"])
        .multiple(false)
))]
pub struct CLIArgs {
    #[arg(long = "setup", help = "Perform interactive setup.")]
    pub setup: bool,

    #[arg(long = "migrate", help = "Execute database migrations.")]
    pub migrate: bool,

    #[arg(long = "upgrade", help = "Upgrade semaphore.")]
    pub upgrade: bool,

    /// Path to the configuration file to use.
    /// If unspecified, the configuration embedded in the binary is used.
    #[arg(
        long = "config",
        value_name = "PATH",
        help = "Path to the JSON configuration file. Defaults to the embedded config.json."
    )]
    pub configuration_file_path: Option<PathBuf>,

    #[arg(
        long = "hash",
        value_name = "PASSWORD",
        help = "Print a bcrypt hash of the given password and exit."
    )]
    pub hash: Option<String>,

    #[arg(long = "printConfig", help = "Print an example configuration and exit.")]
    pub print_config: bool,
}


/// The operating mode selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMode {
    /// Print an example configuration and exit.
    PrintConfig,

    /// Print the hash of the given password and exit.
    HashPassword(String),

    Setup,
    Migrate,
    Upgrade,

    /// Regular startup.
    Serve,
}

impl StartupMode {
    /// Utility modes print their output and exit without loading any configuration.
    pub fn is_utility(&self) -> bool {
        matches!(self, StartupMode::PrintConfig | StartupMode::HashPassword(_))
    }
}


/// The mode flags handed to the server's startup sequencer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupFlags {
    pub interactive_setup: bool,
    pub migration: bool,
    pub upgrade: bool,
}


impl CLIArgs {
    /// Parses the process arguments, accepting single-dash long flags.
    pub fn parse_with_legacy_flags() -> Self {
        Self::parse_from(normalize_legacy_flags(std::env::args_os()))
    }

    pub fn try_parse_with_legacy_flags<I, S>(arguments: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self::try_parse_from(normalize_legacy_flags(arguments))
    }

    pub fn startup_mode(&self) -> StartupMode {
        if self.print_config {
            return StartupMode::PrintConfig;
        }

        // An empty `-hash ""` does not select hashing.
        if let Some(password) = self.hash.as_ref().filter(|password| !password.is_empty()) {
            return StartupMode::HashPassword(password.clone());
        }

        if self.setup {
            StartupMode::Setup
        } else if self.migrate {
            StartupMode::Migrate
        } else if self.upgrade {
            StartupMode::Upgrade
        } else {
            StartupMode::Serve
        }
    }

    pub fn startup_flags(&self) -> StartupFlags {
        StartupFlags {
            interactive_setup: self.setup,
            migration: self.migrate,
            upgrade: self.upgrade,
        }
    }
}


/// Rewrites `-flag` / `-flag=value` into `--flag` / `--flag=value` for every
/// known long flag. The program name, unknown arguments and everything after
/// a `--` terminator are left untouched.
///
/// Boolean flags given an explicit value (`-setup=true`, `-printConfig=0`)
/// become the bare flag when the value is true and are dropped when it is
/// false. Unrecognized values are passed through for clap to reject.
pub fn normalize_legacy_flags<I, S>(arguments: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut terminated = false;

    arguments
        .into_iter()
        .map(Into::into)
        .enumerate()
        .filter_map(|(index, argument)| {
            if index == 0 || terminated {
                return Some(argument);
            }
            if argument == "--" {
                terminated = true;
                return Some(argument);
            }

            rewrite_legacy_flag(argument)
        })
        .collect()
}

fn rewrite_legacy_flag(argument: OsString) -> Option<OsString> {
    let Some(text) = argument.to_str() else {
        return Some(argument);
    };

    let Some(flag) = text
        .strip_prefix("--")
        .or_else(|| text.strip_prefix('-'))
        .filter(|flag| !flag.starts_with('-'))
    else {
        return Some(argument);
    };

    let (name, value) = match flag.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (flag, None),
    };
    if !LONG_FLAGS.contains(&name) {
        return Some(argument);
    }

    if let Some(value) = value.filter(|_| BOOLEAN_FLAGS.contains(&name)) {
        match parse_flag_boolean(value) {
            Some(true) => return Some(OsString::from(format!("--{name}"))),
            Some(false) => return None,
            None => {}
        }
    }

    Some(OsString::from(format!("--{flag}")))
}

/// Boolean spellings accepted for flag values.
fn parse_flag_boolean(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

use std::path::Path;

use tracing::{debug, info};

use super::assets::{AssetSource, EmbeddedAssets, DEFAULT_CONFIGURATION_ASSET};
use super::error::ConfigurationError;
use super::structure::{ConfigDocument, Configuration, ConfigurationSource, ResolutionContext};
use super::traits::ResolvableConfigurationWithContext;


/// Process environment values that take part in resolution, captured once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    port: Option<String>,
}

impl Environment {
    pub const PORT_VARIABLE: &'static str = "PORT";

    /// Captures the relevant variables of the current process.
    pub fn from_process() -> Self {
        Self {
            port: std::env::var(Self::PORT_VARIABLE)
                .ok()
                .filter(|port| !port.is_empty()),
        }
    }

    pub fn with_port<S: Into<String>>(mut self, port: S) -> Self {
        let port = port.into();
        self.port = (!port.is_empty()).then_some(port);
        self
    }

    pub fn port_override(&self) -> Option<&str> {
        self.port.as_deref()
    }
}


/// Turns an explicit path (or the bundled default) into a [`Configuration`].
#[derive(Debug, Clone)]
pub struct ConfigResolver<A = EmbeddedAssets> {
    assets: A,
    environment: Environment,
}

impl ConfigResolver<EmbeddedAssets> {
    /// Resolver over the binary's embedded assets and the process environment.
    pub fn from_process() -> Self {
        Self::new(EmbeddedAssets, Environment::from_process())
    }
}

impl<A: AssetSource> ConfigResolver<A> {
    pub fn new(assets: A, environment: Environment) -> Self {
        Self {
            assets,
            environment,
        }
    }

    /// Loads, overrides, defaults and resolves the configuration.
    ///
    /// An empty `explicit_path` counts as absent. The resolver never exits the
    /// process; the caller decides what to do with a [`ConfigurationError`].
    pub fn resolve(&self, explicit_path: Option<&Path>) -> Result<Configuration, ConfigurationError> {
        let (document, source) = self.load_document(explicit_path)?;
        info!(%source, "Configuration loaded.");

        document.resolve(ResolutionContext {
            source,
            environment: self.environment.clone(),
        })
    }

    /// Loads the raw document without applying overrides or defaults.
    pub fn load_document(
        &self,
        explicit_path: Option<&Path>,
    ) -> Result<(ConfigDocument, ConfigurationSource), ConfigurationError> {
        match explicit_path.filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file.");
                let document = ConfigDocument::load_from_path(path)?;
                let canonical_path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

                Ok((document, ConfigurationSource::File(canonical_path)))
            }
            None => {
                debug!(asset = DEFAULT_CONFIGURATION_ASSET, "Loading embedded configuration.");
                let contents = self
                    .assets
                    .asset(DEFAULT_CONFIGURATION_ASSET)
                    .ok_or(ConfigurationError::Missing)?;

                let document = ConfigDocument::from_json_slice(contents).map_err(|source| {
                    ConfigurationError::Malformed {
                        origin: format!("embedded asset {DEFAULT_CONFIGURATION_ASSET}"),
                        source,
                    }
                })?;

                Ok((
                    document,
                    ConfigurationSource::Embedded(DEFAULT_CONFIGURATION_ASSET),
                ))
            }
        }
    }
}

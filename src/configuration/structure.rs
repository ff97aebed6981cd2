use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use self::cookie::UnresolvedCookieSecrets;
pub use self::database::MySqlConfiguration;
pub use self::ldap::LdapMappings;
use super::error::ConfigurationError;
use super::resolver::Environment;
use super::traits::{ResolvableConfiguration, ResolvableConfigurationWithContext};
use super::utilities::{
    default_tmp_path,
    normalize_port,
    DEFAULT_MAX_PARALLEL_TASKS,
    DEFAULT_PORT,
};
use crate::secrets::{generate_secrets, CookieCodec};

mod cookie;
mod database;
mod ldap;



/// The configuration document, as stored on disk (JSON).
///
/// Every field is optional when loading; absent fields are empty / zero until
/// [`ConfigDocument::apply_defaults`] runs during resolution.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigDocument {
    pub mysql: MySqlConfiguration,

    /// Listen address in `:port` form, e.g. `:3000`.
    pub port: String,

    /// Scratch directory where projects and playbooks are checked out.
    pub tmp_path: String,

    /// Base64 cookie signing key.
    pub cookie_hash: String,
    /// Base64 cookie encryption key, may be empty.
    pub cookie_encryption: String,

    pub email_alert: bool,
    pub email_sender: String,
    pub email_host: String,
    pub email_port: String,

    /// Absolute URL used to build links in outgoing notifications.
    pub web_host: String,

    pub ldap_enable: bool,
    #[serde(rename = "ldap_binddn")]
    pub ldap_bind_dn: String,
    #[serde(rename = "ldap_bindpassword")]
    pub ldap_bind_password: String,
    pub ldap_server: String,
    #[serde(rename = "ldap_needtls")]
    pub ldap_need_tls: bool,
    #[serde(rename = "ldap_searchdn")]
    pub ldap_search_dn: String,
    /// Search filter with a single `%s` placeholder for the login.
    #[serde(rename = "ldap_searchfilter")]
    pub ldap_search_filter: String,
    pub ldap_mappings: LdapMappings,

    pub telegram_alert: bool,
    pub telegram_chat: String,
    pub telegram_token: String,

    pub concurrency_mode: String,
    pub max_parallel_tasks: i64,
}

impl ConfigDocument {
    /// The document printed by `-printConfig`: local database defaults, the
    /// default port and scratch path, and freshly generated cookie secrets.
    pub fn example() -> Self {
        let mut document = Self {
            mysql: MySqlConfiguration::local_defaults(),
            port: DEFAULT_PORT.to_string(),
            tmp_path: default_tmp_path(),
            ..Self::default()
        };
        document.generate_cookie_secrets();

        document
    }

    /// Replaces both cookie secrets with new random 32-byte keys.
    pub fn generate_cookie_secrets(&mut self) {
        let secrets = generate_secrets();

        self.cookie_hash = secrets.encoded_hash_key();
        self.cookie_encryption = secrets.encoded_encryption_key();
    }

    pub fn from_json_slice(contents: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(contents)
    }

    /// Load a document from a specific file path, without resolving it.
    pub fn load_from_path<S: AsRef<Path>>(configuration_file_path: S) -> Result<Self, ConfigurationError> {
        let configuration_file_path = configuration_file_path.as_ref();

        let contents = fs::read(configuration_file_path).map_err(|source| {
            ConfigurationError::Unreadable {
                path: configuration_file_path.to_path_buf(),
                source,
            }
        })?;

        Self::from_json_slice(&contents).map_err(|source| ConfigurationError::Malformed {
            origin: configuration_file_path.display().to_string(),
            source,
        })
    }

    /// Tab-indented JSON, in document field order.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;

        String::from_utf8(buffer).map_err(|error| {
            serde_json::Error::io(std::io::Error::new(std::io::ErrorKind::InvalidData, error))
        })
    }

    /// Fills in the port, scratch path and parallelism limit when unset.
    pub fn apply_defaults(&mut self) {
        self.port = normalize_port(&self.port);
        if self.port.is_empty() {
            self.port = DEFAULT_PORT.to_string();
        }

        if self.tmp_path.is_empty() {
            self.tmp_path = default_tmp_path();
        }

        if self.max_parallel_tasks < 1 {
            self.max_parallel_tasks = DEFAULT_MAX_PARALLEL_TASKS;
        }
    }
}



/// Where a resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationSource {
    /// A file given explicitly on the command line (canonicalized).
    File(PathBuf),

    /// An asset bundled into the binary.
    Embedded(&'static str),
}

impl fmt::Display for ConfigurationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationSource::File(path) => write!(f, "{}", path.display()),
            ConfigurationSource::Embedded(name) => write!(f, "embedded:{name}"),
        }
    }
}


/// Everything needed to resolve a [`ConfigDocument`] besides the document itself.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub source: ConfigurationSource,
    pub environment: Environment,
}


/// The entire resolved configuration.
///
/// Built once at startup and never mutated afterwards; hand it (or references
/// into it) to every component that needs it.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Where the document was loaded from.
    pub source: ConfigurationSource,

    /// The document after environment overrides and defaults.
    pub document: ConfigDocument,

    /// Codec for signing / encrypting session cookies.
    pub cookie: CookieCodec,

    /// Parsed `web_host`, `None` when no web host is configured.
    pub web_host_url: Option<Url>,
}

impl Configuration {
    pub fn port(&self) -> &str {
        &self.document.port
    }

    pub fn tmp_path(&self) -> &Path {
        Path::new(&self.document.tmp_path)
    }

    pub fn max_parallel_tasks(&self) -> usize {
        usize::try_from(self.document.max_parallel_tasks).unwrap_or(usize::MAX)
    }
}


impl ResolvableConfigurationWithContext for ConfigDocument {
    type Resolved = Configuration;
    type Context = ResolutionContext;
    type Error = ConfigurationError;

    fn resolve(mut self, context: Self::Context) -> Result<Self::Resolved, Self::Error> {
        if let Some(port) = context.environment.port_override() {
            debug!(port, "Port overridden by the environment.");
            self.port = normalize_port(port);
        }

        self.apply_defaults();

        let cookie = UnresolvedCookieSecrets {
            hash: &self.cookie_hash,
            encryption: &self.cookie_encryption,
        }
        .resolve()?;

        let web_host_url = parse_web_host(&self.web_host);

        Ok(Configuration {
            source: context.source,
            document: self,
            cookie,
            web_host_url,
        })
    }
}


/// Parses `web_host`; an empty or unparsable value means "no web host".
fn parse_web_host(web_host: &str) -> Option<Url> {
    if web_host.trim().is_empty() {
        return None;
    }

    match Url::parse(web_host) {
        Ok(url) => Some(url),
        Err(error) => {
            warn!(web_host, %error, "Ignoring web_host that is not an absolute URL.");
            None
        }
    }
}

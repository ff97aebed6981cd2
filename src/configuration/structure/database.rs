use serde::{Deserialize, Serialize};


/// MySQL connection settings, consumed by the database layer.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MySqlConfiguration {
    /// `host:port` of the database server.
    #[serde(rename = "host")]
    pub hostname: String,

    #[serde(rename = "user")]
    pub username: String,

    #[serde(rename = "pass")]
    pub password: String,

    #[serde(rename = "name")]
    pub database_name: String,
}

impl MySqlConfiguration {
    pub const DEFAULT_HOSTNAME: &'static str = "127.0.0.1:3306";
    pub const DEFAULT_USERNAME: &'static str = "root";
    pub const DEFAULT_DATABASE_NAME: &'static str = "semaphore";

    /// Settings pointing at a local server with the default user and schema.
    pub fn local_defaults() -> Self {
        Self {
            hostname: Self::DEFAULT_HOSTNAME.to_string(),
            username: Self::DEFAULT_USERNAME.to_string(),
            password: String::new(),
            database_name: Self::DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use tracksync_config::{
    env_parse_or, env_string, LINEAR_API_KEY, LINEAR_API_URL, LINEAR_WORKSPACE_NAME,
    TRACKSYNC_DATABASE_PATH, TRACKSYNC_DB_MAX_CONNECTIONS, TRACKSYNC_HTTP_CONNECT_TIMEOUT_SECS,
    TRACKSYNC_HTTP_REQUEST_TIMEOUT_SECS,
};
use tracksync_core::default_database_path;
use tracksync_linear::ClientConfig;
use tracksync_storage::StorageConfig;

const DEFAULT_WORKSPACE_NAME: &str = "default";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {source}")]
    InvalidNumber {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub db_max_connections: u32,
    pub api_url: Option<String>,
    /// When set, used to bootstrap a workspace connection if none is active
    pub api_key: Option<String>,
    pub workspace_name: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = ClientConfig::default();

        let database_path = env_string(TRACKSYNC_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let request_timeout =
            timeout_from_env(TRACKSYNC_HTTP_REQUEST_TIMEOUT_SECS, defaults.request_timeout)?;
        let connect_timeout =
            timeout_from_env(TRACKSYNC_HTTP_CONNECT_TIMEOUT_SECS, defaults.connect_timeout)?;

        Ok(Config {
            database_path,
            db_max_connections: env_parse_or(
                TRACKSYNC_DB_MAX_CONNECTIONS,
                DEFAULT_DB_MAX_CONNECTIONS,
            ),
            api_url: env_string(LINEAR_API_URL),
            api_key: env_string(LINEAR_API_KEY),
            workspace_name: env_string(LINEAR_WORKSPACE_NAME)
                .unwrap_or_else(|| DEFAULT_WORKSPACE_NAME.to_string()),
            request_timeout,
            connect_timeout,
        })
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            path: self.database_path.clone(),
            max_connections: self.db_max_connections.max(1),
            ..StorageConfig::default()
        }
    }

    /// The env API URL only overrides the default; a workspace's own URL
    /// still wins when the client is built from it.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            ..ClientConfig::default()
        };
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        config
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("workspace_name", &self.workspace_name)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

fn timeout_from_env(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let Some(raw) = env_string(name) else {
        return Ok(default);
    };
    let secs = raw
        .parse::<u64>()
        .map_err(|source| ConfigError::InvalidNumber { name, source })?;
    if secs == 0 {
        return Err(ConfigError::ZeroTimeout(name));
    }
    Ok(Duration::from_secs(secs))
}

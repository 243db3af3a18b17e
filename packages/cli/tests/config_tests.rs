use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracksync_cli::{Config, ConfigError};
use tracksync_linear::DEFAULT_API_URL;

const VARS: [&str; 7] = [
    "TRACKSYNC_DATABASE_PATH",
    "TRACKSYNC_DB_MAX_CONNECTIONS",
    "LINEAR_API_URL",
    "LINEAR_API_KEY",
    "LINEAR_WORKSPACE_NAME",
    "TRACKSYNC_HTTP_REQUEST_TIMEOUT_SECS",
    "TRACKSYNC_HTTP_CONNECT_TIMEOUT_SECS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert!(config.database_path.ends_with(".tracksync/tracksync.db"));
    assert_eq!(config.api_url, None);
    assert_eq!(config.api_key, None);
    assert_eq!(config.workspace_name, "default");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.client_config().api_url, DEFAULT_API_URL);
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    clear_env();
    env::set_var("TRACKSYNC_DATABASE_PATH", "/tmp/tracksync-test.db");
    env::set_var("LINEAR_API_URL", "http://localhost:9999");
    env::set_var("LINEAR_API_KEY", "lin_api_abcdef");
    env::set_var("LINEAR_WORKSPACE_NAME", "acme");
    env::set_var("TRACKSYNC_HTTP_REQUEST_TIMEOUT_SECS", "5");

    let config = Config::from_env().unwrap();

    assert_eq!(config.database_path, PathBuf::from("/tmp/tracksync-test.db"));
    assert_eq!(config.api_key.as_deref(), Some("lin_api_abcdef"));
    assert_eq!(config.workspace_name, "acme");
    assert_eq!(config.request_timeout, Duration::from_secs(5));

    let client = config.client_config();
    assert_eq!(client.api_url, "http://localhost:9999");
    assert_eq!(client.request_timeout, Duration::from_secs(5));
    assert_eq!(
        config.storage_config().path,
        PathBuf::from("/tmp/tracksync-test.db")
    );

    clear_env();
}

#[test]
#[serial]
fn test_blank_api_key_is_unset() {
    clear_env();
    env::set_var("LINEAR_API_KEY", "   ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.api_key, None);

    clear_env();
}

#[test]
#[serial]
fn test_config_invalid_timeout() {
    clear_env();
    env::set_var("TRACKSYNC_HTTP_CONNECT_TIMEOUT_SECS", "soon");

    let result = Config::from_env();

    assert!(matches!(
        result.unwrap_err(),
        ConfigError::InvalidNumber {
            name: "TRACKSYNC_HTTP_CONNECT_TIMEOUT_SECS",
            ..
        }
    ));

    clear_env();
}

#[test]
#[serial]
fn test_config_zero_timeout() {
    clear_env();
    env::set_var("TRACKSYNC_HTTP_REQUEST_TIMEOUT_SECS", "0");

    let result = Config::from_env();

    assert!(matches!(result.unwrap_err(), ConfigError::ZeroTimeout(_)));

    clear_env();
}

#[test]
#[serial]
fn test_garbage_pool_size_falls_back() {
    clear_env();
    env::set_var("TRACKSYNC_DB_MAX_CONNECTIONS", "lots");

    let config = Config::from_env().unwrap();
    assert_eq!(config.db_max_connections, 5);

    clear_env();
}

// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Tracksync

// Local database
pub const TRACKSYNC_DATABASE_PATH: &str = "TRACKSYNC_DATABASE_PATH";
pub const TRACKSYNC_DB_MAX_CONNECTIONS: &str = "TRACKSYNC_DB_MAX_CONNECTIONS";

// Remote tracker
pub const LINEAR_API_URL: &str = "LINEAR_API_URL";
pub const LINEAR_API_KEY: &str = "LINEAR_API_KEY";
pub const LINEAR_WORKSPACE_NAME: &str = "LINEAR_WORKSPACE_NAME";

// HTTP client tuning
pub const TRACKSYNC_HTTP_REQUEST_TIMEOUT_SECS: &str = "TRACKSYNC_HTTP_REQUEST_TIMEOUT_SECS";
pub const TRACKSYNC_HTTP_CONNECT_TIMEOUT_SECS: &str = "TRACKSYNC_HTTP_CONNECT_TIMEOUT_SECS";

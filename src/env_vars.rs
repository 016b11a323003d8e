//! Environment variable names used throughout BlockGate configuration

/// Request filtering
pub const BLOCKLIST_PATH: &str = "BLOCKLIST_PATH";
pub const ALLOW_LOCAL_REQUESTS: &str = "ALLOW_LOCAL_REQUESTS";
pub const LOG_LOCAL_REQUESTS: &str = "LOG_LOCAL_REQUESTS";
pub const DENIED_STATUS_CODE: &str = "DENIED_STATUS_CODE";

/// Proxy behavior configuration
pub const PROXY_TIMEOUT_SECS: &str = "PROXY_TIMEOUT_SECS";
pub const MAX_BODY_SIZE_MB: &str = "MAX_BODY_SIZE_MB";

/// Get all environment variable names for documentation/validation
pub fn all_env_vars() -> &'static [&'static str] {
    &[
        BLOCKLIST_PATH,
        ALLOW_LOCAL_REQUESTS,
        LOG_LOCAL_REQUESTS,
        DENIED_STATUS_CODE,
        PROXY_TIMEOUT_SECS,
        MAX_BODY_SIZE_MB,
    ]
}

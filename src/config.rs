//! Configuration management for BlockGate.
//!
//! This module handles loading and caching configuration from environment variables.
//! All configurations are computed once at first access and cached for the lifetime
//! of the application using `once_cell::sync::Lazy`.
//!
//! # Caching
//!
//! Configuration values are read from environment variables only once, at startup.
//! Command line flags are layered on top by [`crate::args::Args::apply_overrides`].
//!
//! # Example
//!
//! ```
//! use blockgate::config;
//!
//! let filter_config = config::get_filter_config()?;
//! println!("Local requests allowed: {}", filter_config.allow_local_requests);
//!
//! let proxy_config = config::get_proxy_config();
//! println!("Timeout: {:?}", proxy_config.timeout);
//! # Ok::<(), blockgate::BlockGateError>(())
//! ```

use std::env::VarError;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::env_vars;
use blockgate_core::defaults;
use blockgate_core::{
    BlockGateError, FilterConfig, FilterProvider, ProxyConfig, ProxyProvider, Result,
};

// ============================================================================
// Cached Configuration (computed once at first access)
// ============================================================================

static FILTER_CONFIG: Lazy<std::result::Result<FilterConfig, String>> = Lazy::new(|| {
    compute_filter_config_internal(|key| std::env::var(key)).map_err(|err| match err {
        BlockGateError::ConfigError(message) => message,
        other => other.to_string(),
    })
});
static PROXY_CONFIG: Lazy<ProxyConfig> =
    Lazy::new(|| compute_proxy_config_internal(|key| std::env::var(key)));

// ============================================================================
// Internal Helpers
// ============================================================================

/// Parses an environment variable with fallback to a default value.
///
/// Logs a warning if the value exists but cannot be parsed.
fn parse_env_var_or_default<T, F>(env_var: &F, var_name: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match env_var(var_name) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = var_name, value = %value, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Parses a filter setting strictly.
///
/// Unset or blank means `default`. A value that is set but does not parse is
/// a configuration error: filter settings never silently fall back.
fn parse_filter_env_var<T, F>(env_var: &F, var_name: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match env_var(var_name) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().map_err(|_| {
            BlockGateError::ConfigError(format!("invalid value for {var_name}: {value:?}"))
        }),
        _ => Ok(default),
    }
}

/// Parses a boolean filter flag, accepting `true/false`, `yes/no`, `on/off`
/// and `1/0`.
fn parse_bool_env_var<F>(env_var: &F, var_name: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match env_var(var_name) {
        Ok(value) if !value.trim().is_empty() => {
            match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(BlockGateError::ConfigError(format!(
                    "invalid boolean for {var_name}: {value:?}"
                ))),
            }
        }
        _ => Ok(default),
    }
}

// ============================================================================
// Public Configuration Getters
// ============================================================================

/// Returns the cached filter configuration.
///
/// Configuration is read from environment variables on first access:
/// - `BLOCKLIST_PATH`: Blocklist file (required, no default)
/// - `ALLOW_LOCAL_REQUESTS`: Allow private/local clients (default: true)
/// - `LOG_LOCAL_REQUESTS`: Log private/local decisions (default: false)
/// - `DENIED_STATUS_CODE`: Status for denied requests (default: 403)
///
/// # Errors
///
/// Returns [`BlockGateError::ConfigError`] if one of these variables is set
/// to a value that does not parse.
pub fn get_filter_config() -> Result<&'static FilterConfig> {
    FILTER_CONFIG
        .as_ref()
        .map_err(|message| BlockGateError::ConfigError(message.clone()))
}

/// Computes filter configuration from an environment lookup.
///
/// A numeric status code is passed through unvalidated so that an
/// unrecognized value is rejected when the classifier is built.
fn compute_filter_config_internal<F>(env_var: F) -> Result<FilterConfig>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    let mut config = FilterConfig::new()
        .with_allow_local_requests(parse_bool_env_var(
            &env_var,
            env_vars::ALLOW_LOCAL_REQUESTS,
            defaults::ALLOW_LOCAL_REQUESTS,
        )?)
        .with_log_local_requests(parse_bool_env_var(
            &env_var,
            env_vars::LOG_LOCAL_REQUESTS,
            defaults::LOG_LOCAL_REQUESTS,
        )?)
        .with_denied_status_code(parse_filter_env_var(
            &env_var,
            env_vars::DENIED_STATUS_CODE,
            defaults::DENIED_STATUS_CODE,
        )?);

    if let Ok(path) = env_var(env_vars::BLOCKLIST_PATH)
        && !path.trim().is_empty()
    {
        config = config.with_blocklist_path(path.trim());
    }

    Ok(config)
}

/// Returns the cached proxy configuration.
///
/// Controls upstream request behavior including timeouts and size limits.
///
/// Configuration is read from environment variables on first access:
/// - `PROXY_TIMEOUT_SECS`: Upstream request timeout (default: 30)
/// - `MAX_BODY_SIZE_MB`: Maximum request body size (default: 100, 0 = unlimited)
///
/// # Example
///
/// ```
/// use blockgate::config::get_proxy_config;
///
/// let config = get_proxy_config();
/// println!("Timeout: {:?}, Max body: {}", config.timeout, config.max_body_size_mb());
/// ```
pub fn get_proxy_config() -> &'static ProxyConfig {
    &PROXY_CONFIG
}

/// Computes proxy configuration from an environment lookup.
fn compute_proxy_config_internal<F>(env_var: F) -> ProxyConfig
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    let timeout_secs = parse_env_var_or_default(
        &env_var,
        env_vars::PROXY_TIMEOUT_SECS,
        defaults::PROXY_TIMEOUT_SECS,
    );

    let max_body_mb = parse_env_var_or_default(
        &env_var,
        env_vars::MAX_BODY_SIZE_MB,
        defaults::MAX_BODY_SIZE_MB,
    );

    let config = ProxyConfig {
        timeout: Duration::from_secs(timeout_secs),
        max_body_size: ProxyConfig::mb_to_bytes(max_body_mb),
    };

    // Validate configuration
    if !config.is_valid() {
        warn!("Invalid proxy configuration, using defaults");
        return ProxyConfig::default();
    }

    config
}

// ============================================================================
// EnvVarConfig - configuration provider backed by environment variables
// ============================================================================

/// Configuration provider that reads from environment variables.
///
/// This is the default configuration provider for the BlockGate CLI.
/// All values come from the global lazy statics.
///
/// # Example
///
/// ```
/// use blockgate::config::EnvVarConfig;
/// use blockgate::{FilterProvider, ProxyProvider};
///
/// let config = EnvVarConfig::new()?;
/// println!("Denied status: {}", config.denied_status_code());
/// println!("Timeout: {:?}", config.proxy_config().timeout);
/// # Ok::<(), blockgate::BlockGateError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EnvVarConfig {
    filter: &'static FilterConfig,
}

impl EnvVarConfig {
    /// Creates a new configuration provider from environment variables.
    ///
    /// # Errors
    ///
    /// Fails with [`BlockGateError::ConfigError`] when a filter variable holds
    /// an unparseable value.
    pub fn new() -> Result<Self> {
        Ok(Self {
            filter: get_filter_config()?,
        })
    }

    /// The filter configuration this provider reads from.
    pub fn filter_config(&self) -> &'static FilterConfig {
        self.filter
    }
}

impl FilterProvider for EnvVarConfig {
    fn blocklist_path(&self) -> Option<&Path> {
        self.filter.blocklist_path()
    }

    fn allow_local_requests(&self) -> bool {
        self.filter.allow_local_requests()
    }

    fn log_local_requests(&self) -> bool {
        self.filter.log_local_requests()
    }

    fn denied_status_code(&self) -> u16 {
        self.filter.denied_status_code()
    }
}

impl ProxyProvider for EnvVarConfig {
    fn proxy_config(&self) -> &ProxyConfig {
        get_proxy_config()
    }
}

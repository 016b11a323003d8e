//! Configuration traits and types for BlockGate.
//!
//! Hosts supply configuration through the [`FilterProvider`] and
//! [`ProxyProvider`] traits, so values can come from environment variables,
//! files, or a framework's own config system. [`FilterConfig`] and
//! [`ProxyConfig`] are plain-struct implementations for the common case.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::defaults;

// ============================================================================
// Composable Configuration Traits
// ============================================================================

/// Configuration for the request filter.
pub trait FilterProvider: Send + Sync {
    /// Returns the path of the blocklist file, if configured.
    fn blocklist_path(&self) -> Option<&Path>;

    /// Returns whether requests from private/local ranges are allowed.
    fn allow_local_requests(&self) -> bool;

    /// Returns whether private/local range decisions are logged.
    fn log_local_requests(&self) -> bool;

    /// Returns the raw denial status code (0 means "use the default").
    fn denied_status_code(&self) -> u16;
}

/// Configuration for upstream forwarding.
pub trait ProxyProvider: Send + Sync {
    /// Returns the proxy configuration.
    fn proxy_config(&self) -> &ProxyConfig;
}

/// Aggregated configuration for a standalone gate.
pub trait ConfigProvider: FilterProvider + ProxyProvider {}

// Blanket implementation: any type implementing all sub-traits is a ConfigProvider
impl<T> ConfigProvider for T where T: FilterProvider + ProxyProvider {}

// ============================================================================
// FilterConfig
// ============================================================================

/// Plain filter configuration.
///
/// Defaults: no blocklist path, local requests allowed, local requests not
/// logged, status code 403.
///
/// # Example
///
/// ```
/// use blockgate_core::{FilterConfig, FilterProvider};
///
/// let config = FilterConfig::new()
///     .with_blocklist_path("/etc/blockgate/blocklist.txt")
///     .with_denied_status_code(429);
///
/// assert!(config.allow_local_requests());
/// assert_eq!(config.denied_status_code(), 429);
/// ```
#[derive(Clone, Debug)]
pub struct FilterConfig {
    /// Path of the blocklist file
    pub blocklist_path: Option<PathBuf>,
    /// Allow requests from private/local ranges
    pub allow_local_requests: bool,
    /// Log decisions for private/local ranges
    pub log_local_requests: bool,
    /// Status code for denied requests (0 = default)
    pub denied_status_code: u16,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            blocklist_path: None,
            allow_local_requests: defaults::ALLOW_LOCAL_REQUESTS,
            log_local_requests: defaults::LOG_LOCAL_REQUESTS,
            denied_status_code: defaults::DENIED_STATUS_CODE,
        }
    }
}

impl FilterConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the blocklist path.
    pub fn with_blocklist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.blocklist_path = Some(path.into());
        self
    }

    /// Sets whether local requests are allowed.
    pub fn with_allow_local_requests(mut self, allow: bool) -> Self {
        self.allow_local_requests = allow;
        self
    }

    /// Sets whether local requests are logged.
    pub fn with_log_local_requests(mut self, log: bool) -> Self {
        self.log_local_requests = log;
        self
    }

    /// Sets the denial status code.
    pub fn with_denied_status_code(mut self, code: u16) -> Self {
        self.denied_status_code = code;
        self
    }
}

impl FilterProvider for FilterConfig {
    fn blocklist_path(&self) -> Option<&Path> {
        self.blocklist_path.as_deref()
    }

    fn allow_local_requests(&self) -> bool {
        self.allow_local_requests
    }

    fn log_local_requests(&self) -> bool {
        self.log_local_requests
    }

    fn denied_status_code(&self) -> u16 {
        self.denied_status_code
    }
}

// ============================================================================
// ProxyConfig
// ============================================================================

/// Configuration for upstream communication.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use blockgate_core::ProxyConfig;
///
/// let config = ProxyConfig {
///     timeout: Duration::from_secs(30),
///     max_body_size: ProxyConfig::mb_to_bytes(100),
/// };
///
/// assert!(config.is_valid());
/// assert_eq!(config.max_body_size_mb(), "100");
/// ```
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Timeout for upstream requests
    pub timeout: Duration,
    /// Maximum request body size in bytes (0 = unlimited)
    pub max_body_size: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::PROXY_TIMEOUT,
            max_body_size: defaults::MAX_BODY_SIZE,
        }
    }
}

impl ProxyConfig {
    /// Returns `true` if the timeout is non-zero.
    pub fn is_valid(&self) -> bool {
        !self.timeout.is_zero()
    }

    /// Returns the maximum body size in MB, or "unlimited".
    pub fn max_body_size_mb(&self) -> String {
        if self.max_body_size == 0 {
            "unlimited".to_string()
        } else {
            (self.max_body_size / 1024 / 1024).to_string()
        }
    }

    /// Converts megabytes to bytes (0 stays 0, meaning unlimited).
    pub fn mb_to_bytes(mb: usize) -> usize {
        if mb == 0 { 0 } else { mb * 1024 * 1024 }
    }
}

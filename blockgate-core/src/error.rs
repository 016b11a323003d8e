//! Error types for BlockGate.
//!
//! Construction-time failures (bad configuration, unreadable blocklist) are
//! fatal and stop the host from routing traffic through the filter. Parse
//! failures on individual blocklist lines or request candidates never surface
//! as errors from the classifier; they are skipped.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for BlockGate operations.
pub type Result<T> = std::result::Result<T, BlockGateError>;

/// Unified error type for BlockGate operations.
///
/// # Example
///
/// ```
/// use blockgate_core::error::{BlockGateError, Result};
///
/// fn require_path(path: Option<&str>) -> Result<&str> {
///     path.ok_or_else(|| BlockGateError::ConfigError("no blocklist path provided".into()))
/// }
///
/// assert!(require_path(None).is_err());
/// ```
#[derive(Debug, Error)]
pub enum BlockGateError {
    /// Configuration error (missing or invalid values).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The blocklist source could not be opened or read.
    #[error("Failed to load blocklist from {}: {source}", .path.display())]
    BlocklistUnreadable {
        /// Path of the blocklist file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A configured denial status code is not a recognized HTTP status.
    #[error("Invalid denied request status code: {0}")]
    InvalidStatusCode(u16),

    /// Invalid IP address or network format.
    #[error("Invalid IP address: {0}")]
    InvalidIp(String),

    /// Error while forwarding a request.
    #[error("Proxy error: {0}")]
    ProxyError(String),

    /// Upstream connection failed.
    #[error("Upstream connection failed: {0}")]
    UpstreamConnectionFailed(String),

    /// Upstream request timed out.
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Request body too large.
    #[error("Request body too large: {size} bytes (max: {max} bytes)")]
    BodyTooLarge {
        /// Actual body size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// Failed to read request or response body.
    #[error("Body read error: {0}")]
    BodyReadError(String),
}

impl BlockGateError {
    /// Returns the HTTP status code a host should answer with for this error.
    pub fn status_code(&self) -> hyper::StatusCode {
        use hyper::StatusCode;

        match self {
            Self::ConfigError(_) | Self::BlocklistUnreadable { .. } | Self::InvalidStatusCode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::InvalidIp(_) => StatusCode::BAD_REQUEST,
            Self::ProxyError(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamConnectionFailed(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyReadError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns a sanitized message suitable for an HTTP response body.
    pub fn user_message(&self) -> &str {
        match self {
            Self::ConfigError(_) | Self::BlocklistUnreadable { .. } | Self::InvalidStatusCode(_) => {
                "Internal server error"
            }
            Self::InvalidIp(_) => "Invalid request",
            Self::ProxyError(_) => "Bad gateway",
            Self::UpstreamConnectionFailed(_) => "Service unavailable",
            Self::UpstreamTimeout(_) => "Gateway timeout",
            Self::BodyTooLarge { .. } => "Request body too large",
            Self::BodyReadError(_) => "Bad request",
        }
    }

    /// Returns true if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::BlocklistUnreadable { .. }
                | Self::InvalidStatusCode(_)
                | Self::ProxyError(_)
                | Self::UpstreamConnectionFailed(_)
                | Self::UpstreamTimeout(_)
        )
    }
}

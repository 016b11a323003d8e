//! Default configuration values for BlockGate.
//!
//! Centralized so the core, the CLI and the tests agree on them.

use std::time::Duration;

/// Default status code returned for denied requests.
pub const DENIED_STATUS_CODE: u16 = 403;

/// Local requests are allowed unless configured otherwise.
pub const ALLOW_LOCAL_REQUESTS: bool = true;

/// Local-range decisions are not logged unless configured otherwise.
pub const LOG_LOCAL_REQUESTS: bool = false;

/// Name reported in denial log events.
pub const MIDDLEWARE_NAME: &str = "blockgate";

/// Default proxy timeout in seconds.
pub const PROXY_TIMEOUT_SECS: u64 = 30;

/// Default proxy timeout duration.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(PROXY_TIMEOUT_SECS);

/// Default maximum body size in megabytes.
pub const MAX_BODY_SIZE_MB: usize = 100;

/// Default maximum body size in bytes.
pub const MAX_BODY_SIZE: usize = MAX_BODY_SIZE_MB * 1024 * 1024;

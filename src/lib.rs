//! BlockGate - An HTTP gate that drops requests from blocklisted clients
//!
//! A small reverse proxy that classifies every request by its client address
//! and forwards only the allowed ones.
//!
//! # Overview
//!
//! BlockGate provides:
//! - Blocklists of addresses and CIDR ranges loaded from a plain-text file
//! - Private/local range handling (allow or deny, optionally logged)
//! - Client resolution from `X-Forwarded-For`, `X-Real-IP` and the peer address
//! - A configurable denial status with an empty body
//! - Structured logging with JSON support
//!
//! # Example
//!
//! ```rust,no_run
//! use blockgate::{config, Classifier};
//! use blockgate_core::defaults::MIDDLEWARE_NAME;
//!
//! // Get configuration from environment
//! let filter_config = config::get_filter_config()?;
//! let proxy_config = config::get_proxy_config();
//!
//! let classifier = Classifier::from_config(MIDDLEWARE_NAME, filter_config)?;
//! # Ok::<(), blockgate::BlockGateError>(())
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration management from environment variables
//! - [`env_vars`] - Environment variable constants
//! - [`server`] - Startup info
//! - [`args`] - Command line argument parsing
//!
//! # Re-exports from blockgate-core
//!
//! Core functionality is provided by the `blockgate-core` crate:
//! - [`classifier`] - Per-request decisions
//! - [`blocklist`] - Blocklist loading and lookup
//! - [`request_handler`] - hyper adapter and upstream forwarding

#![forbid(unsafe_code)]

pub mod args;
pub mod config;
pub mod env_vars;
pub mod server;

// Re-export blockgate-core modules
pub use blockgate_core::blocklist;
pub use blockgate_core::classifier;
pub use blockgate_core::request_handler;
pub use blockgate_core::types;

// Re-export commonly used items at crate root
pub use config::{EnvVarConfig, get_filter_config, get_proxy_config};
pub use blockgate_core::{
    BlockGateError,
    BlocklistTable,
    Classifier,
    // Aggregated configuration trait
    ConfigProvider,
    Decision,
    // Configuration structs
    FilterConfig,
    // Composable configuration traits
    FilterProvider,
    ProxyConfig,
    ProxyProvider,
};

//! BlockGate Core - Reusable request filtering components
//!
//! This crate decides whether an HTTP request should be let through based on
//! where it claims to come from:
//! - Plain-text blocklists of addresses and CIDR ranges (IPv4 and IPv6)
//! - A fixed table of private, loopback and link-local ranges
//! - Client address resolution from `X-Forwarded-For`, `X-Real-IP` and the
//!   transport peer address, in that order
//!
//! # Overview
//!
//! `blockgate-core` is framework-agnostic. Configuration is read through the
//! [`FilterProvider`] trait and the decision comes back as a plain
//! [`Decision`] value, so any host can wire it in. A hyper adapter is
//! provided in [`request_handler`].
//!
//! # Example
//!
//! ```rust,no_run
//! use blockgate_core::{Classifier, FilterConfig};
//! use hyper::HeaderMap;
//!
//! let config = FilterConfig::new()
//!     .with_blocklist_path("/etc/blockgate/blocklist.txt")
//!     .with_denied_status_code(403);
//!
//! let classifier = Classifier::from_config("blockgate", &config)?;
//!
//! let decision = classifier.classify(&HeaderMap::new(), Some("203.0.113.9:51234"));
//! println!("{decision:?}");
//! # Ok::<(), blockgate_core::BlockGateError>(())
//! ```
//!
//! # Modules
//!
//! - [`types`] - Configuration traits and structs
//! - [`error`] - Error types and result aliases
//! - [`network`] - Address and CIDR parsing
//! - [`blocklist`] - Blocklist loading and lookup
//! - [`private_ranges`] - Reserved and local address space
//! - [`ip_filter`] - Candidate client address extraction
//! - [`classifier`] - Per-request decisions
//! - [`request_handler`] - hyper adapter and upstream forwarding

#![forbid(unsafe_code)]

pub mod blocklist;
pub mod classifier;
pub mod defaults;
pub mod error;
pub mod headers;
pub mod ip_filter;
pub mod network;
pub mod private_ranges;
pub mod request_handler;
#[cfg(test)]
pub mod test_utils;
pub mod types;

// Re-export commonly used items at crate root
pub use blocklist::BlocklistTable;
pub use classifier::{Classifier, ClassifierConfig, Decision};
pub use error::{BlockGateError, Result};
pub use network::NetworkRange;
pub use private_ranges::PrivateRangeTable;
pub use types::{
    // Aggregated configuration trait
    ConfigProvider,
    // Configuration structs
    FilterConfig,
    // Composable configuration traits
    FilterProvider,
    ProxyConfig,
    ProxyProvider,
};

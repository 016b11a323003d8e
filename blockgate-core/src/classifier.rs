//! Request classification.
//!
//! A [`Classifier`] owns a [`BlocklistTable`], a reference to the shared
//! [`PrivateRangeTable`] and an immutable [`ClassifierConfig`]. Each call to
//! [`Classifier::classify`] walks the request's candidate addresses in
//! priority order and stops at the first conclusive one:
//!
//! - a private/local address ends classification: allowed when local requests
//!   are allowed, denied otherwise (the blocklist is not consulted)
//! - a blocklisted address is denied
//! - anything else moves on to the next candidate
//!
//! When every candidate has been checked the request is allowed. Candidates
//! that do not parse as addresses are skipped.
//!
//! Classification is synchronous and never mutates state, so a single
//! classifier can be shared across tasks behind an `Arc`.

use std::net::IpAddr;

use hyper::{HeaderMap, StatusCode};
use tracing::{debug, info};

use crate::blocklist::BlocklistTable;
use crate::defaults;
use crate::error::{BlockGateError, Result};
use crate::ip_filter::{self, CandidateAddress, RawCandidate};
use crate::private_ranges::PrivateRangeTable;
use crate::types::FilterProvider;

/// Outcome of classifying one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request to the next handler unchanged.
    Allow,
    /// Answer with this status code and stop processing.
    Deny(StatusCode),
}

impl Decision {
    /// Returns `true` for [`Decision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the denial status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Allow => None,
            Self::Deny(status) => Some(*status),
        }
    }
}

/// Resolves a configured denial status code.
///
/// `0` means "not set" and resolves to 403. Any other value must be a
/// recognized HTTP status code.
///
/// # Errors
///
/// Returns [`BlockGateError::InvalidStatusCode`] for unrecognized codes.
///
/// # Example
///
/// ```
/// use blockgate_core::classifier::resolve_status_code;
/// use hyper::StatusCode;
///
/// assert_eq!(resolve_status_code(0).unwrap(), StatusCode::FORBIDDEN);
/// assert_eq!(resolve_status_code(429).unwrap(), StatusCode::TOO_MANY_REQUESTS);
/// assert!(resolve_status_code(999).is_err());
/// ```
pub fn resolve_status_code(code: u16) -> Result<StatusCode> {
    let code = if code == 0 {
        defaults::DENIED_STATUS_CODE
    } else {
        code
    };

    StatusCode::from_u16(code)
        .ok()
        .filter(|status| status.canonical_reason().is_some())
        .ok_or(BlockGateError::InvalidStatusCode(code))
}

/// Validated classifier settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    allow_local_requests: bool,
    log_local_requests: bool,
    denied_status: StatusCode,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            allow_local_requests: defaults::ALLOW_LOCAL_REQUESTS,
            log_local_requests: defaults::LOG_LOCAL_REQUESTS,
            denied_status: StatusCode::FORBIDDEN,
        }
    }
}

impl ClassifierConfig {
    /// Builds a configuration, validating the denial status code.
    ///
    /// # Errors
    ///
    /// Returns [`BlockGateError::InvalidStatusCode`] if `denied_status_code`
    /// is non-zero and not a recognized HTTP status.
    pub fn new(
        allow_local_requests: bool,
        log_local_requests: bool,
        denied_status_code: u16,
    ) -> Result<Self> {
        Ok(Self {
            allow_local_requests,
            log_local_requests,
            denied_status: resolve_status_code(denied_status_code)?,
        })
    }

    /// Builds a configuration from a [`FilterProvider`].
    pub fn from_provider(provider: &impl FilterProvider) -> Result<Self> {
        Self::new(
            provider.allow_local_requests(),
            provider.log_local_requests(),
            provider.denied_status_code(),
        )
    }

    pub fn allow_local_requests(&self) -> bool {
        self.allow_local_requests
    }

    pub fn log_local_requests(&self) -> bool {
        self.log_local_requests
    }

    pub fn denied_status(&self) -> StatusCode {
        self.denied_status
    }
}

/// Per-request address classifier.
///
/// # Example
///
/// ```
/// use blockgate_core::{BlocklistTable, Classifier, Decision};
/// use blockgate_core::classifier::ClassifierConfig;
/// use hyper::{HeaderMap, StatusCode};
///
/// let blocklist = BlocklistTable::from_entries(["203.0.113.0/24"]);
/// let classifier = Classifier::new("edge", ClassifierConfig::default(), blocklist);
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.50".parse().unwrap());
///
/// assert_eq!(
///     classifier.classify(&headers, Some("198.51.100.1:40000")),
///     Decision::Deny(StatusCode::FORBIDDEN)
/// );
/// assert_eq!(classifier.classify(&HeaderMap::new(), Some("198.51.100.1:40000")), Decision::Allow);
/// ```
#[derive(Debug)]
pub struct Classifier {
    name: String,
    config: ClassifierConfig,
    blocklist: BlocklistTable,
    private_ranges: &'static PrivateRangeTable,
}

impl Classifier {
    /// Creates a classifier over an already built blocklist.
    pub fn new(name: impl Into<String>, config: ClassifierConfig, blocklist: BlocklistTable) -> Self {
        let name = name.into();

        info!(
            middleware = %name,
            entries = blocklist.len(),
            "Loaded {} blocklisted IPs",
            blocklist.len()
        );
        info!(
            middleware = %name,
            allow_local_requests = config.allow_local_requests,
            log_local_requests = config.log_local_requests,
            denied_status = config.denied_status.as_u16(),
            "Classifier configured"
        );

        Self {
            name,
            config,
            blocklist,
            private_ranges: PrivateRangeTable::get(),
        }
    }

    /// Creates a classifier from a [`FilterProvider`], loading the blocklist
    /// from the configured path.
    ///
    /// # Errors
    ///
    /// - [`BlockGateError::ConfigError`] if no blocklist path is configured
    /// - [`BlockGateError::BlocklistUnreadable`] if the file cannot be read
    /// - [`BlockGateError::InvalidStatusCode`] if the status code is invalid
    pub fn from_config(name: impl Into<String>, provider: &impl FilterProvider) -> Result<Self> {
        let path = provider
            .blocklist_path()
            .ok_or_else(|| BlockGateError::ConfigError("no blocklist path provided".into()))?;

        let config = ClassifierConfig::from_provider(provider)?;
        let blocklist = BlocklistTable::from_path(path)?;

        Ok(Self::new(name, config, blocklist))
    }

    /// Returns the middleware name used in log events.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn blocklist(&self) -> &BlocklistTable {
        &self.blocklist
    }

    /// Returns the request's candidate addresses in evaluation order.
    pub fn candidates(&self, headers: &HeaderMap, peer_addr: Option<&str>) -> Vec<RawCandidate> {
        ip_filter::collect_candidates(headers, peer_addr)
    }

    /// Classifies a request from its headers and transport peer address.
    pub fn classify(&self, headers: &HeaderMap, peer_addr: Option<&str>) -> Decision {
        for raw in self.candidates(headers, peer_addr) {
            let candidate = match raw.parse() {
                Ok(candidate) => candidate,
                Err(_) => {
                    debug!(
                        middleware = %self.name,
                        source = %raw.source,
                        value = %raw.value,
                        "Skipping unparseable client address"
                    );
                    continue;
                }
            };

            if let Some(decision) = self.classify_candidate(candidate) {
                return decision;
            }
        }

        Decision::Allow
    }

    /// Classifies a single address.
    ///
    /// Returns `None` when the address is neither local nor blocklisted and
    /// the next candidate should be examined.
    pub fn classify_address(&self, addr: IpAddr) -> Option<Decision> {
        self.classify_candidate(CandidateAddress {
            addr,
            source: ip_filter::CandidateSource::PeerAddr,
        })
    }

    fn classify_candidate(&self, candidate: CandidateAddress) -> Option<Decision> {
        let CandidateAddress { addr, source } = candidate;

        if self.private_ranges.contains(addr) {
            let allowed = self.config.allow_local_requests;
            if self.config.log_local_requests {
                if allowed {
                    info!(ip = %addr, source = %source, middleware = %self.name, "Local IP allowed");
                } else {
                    info!(ip = %addr, source = %source, middleware = %self.name, "Local IP denied");
                }
            }
            return Some(if allowed {
                Decision::Allow
            } else {
                Decision::Deny(self.config.denied_status)
            });
        }

        if self.blocklist.contains(addr) {
            info!(
                ip = %addr,
                source = %source,
                middleware = %self.name,
                "Request denied - IP is blocklisted"
            );
            return Some(Decision::Deny(self.config.denied_status));
        }

        None
    }
}

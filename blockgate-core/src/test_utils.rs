//! Test utilities for BlockGate.
//!
//! Shared configuration and fixture helpers used across unit tests.
//! Only compiled when running tests (`#[cfg(test)]`).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::types::{FilterProvider, ProxyConfig, ProxyProvider};

/// Shared test configuration.
///
/// Implements every configuration trait with the production defaults and
/// builder methods for customization.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub blocklist_path: Option<PathBuf>,
    pub allow_local_requests: bool,
    pub log_local_requests: bool,
    pub denied_status_code: u16,
    pub proxy: ProxyConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            blocklist_path: None,
            allow_local_requests: true,
            log_local_requests: false,
            denied_status_code: 403,
            proxy: ProxyConfig {
                timeout: Duration::from_secs(30),
                max_body_size: 100 * 1024 * 1024,
            },
        }
    }
}

impl TestConfig {
    /// Create a new test configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocklist_path(mut self, path: impl AsRef<Path>) -> Self {
        self.blocklist_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_allow_local_requests(mut self, allow: bool) -> Self {
        self.allow_local_requests = allow;
        self
    }

    pub fn with_log_local_requests(mut self, log: bool) -> Self {
        self.log_local_requests = log;
        self
    }

    pub fn with_denied_status_code(mut self, code: u16) -> Self {
        self.denied_status_code = code;
        self
    }

    /// Configure the upstream body limit in bytes.
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.proxy.max_body_size = bytes;
        self
    }
}

impl FilterProvider for TestConfig {
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

impl ProxyProvider for TestConfig {
    fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy
    }
}

/// Writes `content` to a temporary blocklist file.
///
/// The file is removed when the returned handle is dropped.
pub fn write_blocklist(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp blocklist");
    file.write_all(content.as_bytes())
        .expect("write temp blocklist");
    file.flush().expect("flush temp blocklist");
    file
}

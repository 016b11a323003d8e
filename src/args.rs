//! Command line argument parsing for BlockGate.
//!
//! This module defines the CLI interface using [`clap`] for argument parsing.
//! It provides configuration for binding addresses, ports, the filter and
//! output verbosity. Filter flags take precedence over environment variables.
//!
//! # Example
//!
//! ```no_run
//! use blockgate::args::Args;
//! use clap::Parser;
//!
//! let args = Args::parse();
//! if let Err(e) = args.validate() {
//!     eprintln!("Configuration error: {}", e);
//!     std::process::exit(1);
//! }
//! ```

use std::path::PathBuf;

use blockgate_core::FilterConfig;
use clap::Parser;

/// Command line arguments for BlockGate.
///
/// # Example
///
/// ```no_run
/// use blockgate::args::Args;
/// use clap::Parser;
///
/// let args = Args::parse();
///
/// println!("Listening on {}:{}", args.bind, args.listen);
/// println!("Forwarding to {}:{}", args.bind, args.forward);
/// ```
#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(
    long_about = "Drops requests whose client address is on a blocklist, then forwards the rest\n\nExample usage:\n  blockgate --listen 8080 --forward 9000 --blocklist /etc/blockgate/blocklist.txt\n  blockgate -l 8080 -f 9000 -B blocklist.txt --deny-local --denied-status 404"
)]
#[command(
    after_help = "Environment variables:\n  BLOCKLIST_PATH         Blocklist file, one address or CIDR per line\n  ALLOW_LOCAL_REQUESTS   Allow private/local clients (default: true)\n  LOG_LOCAL_REQUESTS     Log private/local decisions (default: false)\n  DENIED_STATUS_CODE     Status for denied requests (default: 403)\n  PROXY_TIMEOUT_SECS     Upstream timeout in seconds (default: 30)\n  MAX_BODY_SIZE_MB       Max request body size, 0 = unlimited (default: 100)\n  RUST_LOG               Log filter (default: info)"
)]
pub struct Args {
    /// Address to bind to (for both listening and forwarding)
    #[arg(
        long,
        short = 'b',
        help = "Bind address for listening and forwarding",
        value_name = "ADDRESS",
        default_value = "0.0.0.0"
    )]
    pub bind: String,

    /// Port to listen on for incoming requests
    #[arg(
        long,
        short = 'l',
        help = "Listen port for incoming connections",
        value_name = "PORT"
    )]
    pub listen: u16,

    /// Port to forward requests to
    #[arg(
        long,
        short = 'f',
        help = "Destination port for forwarded requests",
        value_name = "PORT"
    )]
    pub forward: u16,

    /// Blocklist file (overrides BLOCKLIST_PATH)
    #[arg(
        long,
        short = 'B',
        help = "Blocklist file, one address or CIDR range per line",
        value_name = "FILE"
    )]
    pub blocklist: Option<PathBuf>,

    /// Deny requests from private/local ranges (overrides ALLOW_LOCAL_REQUESTS)
    #[arg(long, help = "Deny requests from private and local address ranges")]
    pub deny_local: bool,

    /// Log private/local decisions (overrides LOG_LOCAL_REQUESTS)
    #[arg(long, help = "Log decisions for private and local addresses")]
    pub log_local: bool,

    /// Status code for denied requests (overrides DENIED_STATUS_CODE)
    #[arg(
        long,
        help = "HTTP status code returned to denied clients",
        value_name = "CODE"
    )]
    pub denied_status: Option<u16>,

    /// Enable verbose output
    #[arg(
        long,
        short = 'v',
        help = "Show detailed configuration and startup information"
    )]
    pub verbose: bool,

    /// Enable quiet mode (minimal output)
    #[arg(
        long,
        short = 'q',
        help = "Suppress configuration output, show only essential messages",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output logs in JSON format (for structured logging)
    #[arg(long, help = "Output logs in JSON format for structured logging")]
    pub json_logs: bool,
}

impl Args {
    /// Validates the parsed command line arguments.
    ///
    /// Performs the following validations:
    /// - Listen and forward ports must be different
    /// - Both ports must be greater than 0
    /// - Bind address must be a valid IP address
    ///
    /// # Example
    ///
    /// ```
    /// use blockgate::args::Args;
    /// use clap::Parser;
    ///
    /// let args = Args::try_parse_from(["blockgate", "-l", "8080", "-f", "8080"]).unwrap();
    /// assert!(args.validate().is_err());
    ///
    /// let args = Args::try_parse_from(["blockgate", "-l", "8080", "-f", "9000"]).unwrap();
    /// assert!(args.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.listen == self.forward {
            return Err("Listen and forward ports cannot be the same".to_string());
        }

        if self.listen == 0 || self.forward == 0 {
            return Err("Ports must be greater than 0".to_string());
        }

        // Validate bind address format
        if self.bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address: '{}'", self.bind));
        }

        Ok(())
    }

    /// Layers the filter flags over a configuration read from the environment.
    ///
    /// Flags only ever tighten or replace: `--deny-local` forces local
    /// requests off and `--log-local` forces logging on.
    pub fn apply_overrides(&self, mut config: FilterConfig) -> FilterConfig {
        if let Some(path) = &self.blocklist {
            config = config.with_blocklist_path(path.clone());
        }
        if self.deny_local {
            config = config.with_allow_local_requests(false);
        }
        if self.log_local {
            config = config.with_log_local_requests(true);
        }
        if let Some(code) = self.denied_status {
            config = config.with_denied_status_code(code);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockgate_core::FilterProvider;
    use std::path::Path;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["blockgate", "-l", "8080", "-f", "9000"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_validate_rejects_bad_bind_address() {
        let args = parse(&["-b", "not-an-ip"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let args = Args::try_parse_from(["blockgate", "-l", "0", "-f", "9000"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["blockgate", "-l", "1", "-f", "2", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let base = FilterConfig::new()
            .with_blocklist_path("/env/blocklist")
            .with_log_local_requests(false)
            .with_denied_status_code(451);

        let config = parse(&[]).apply_overrides(base);

        assert_eq!(config.blocklist_path(), Some(Path::new("/env/blocklist")));
        assert!(config.allow_local_requests());
        assert!(!config.log_local_requests());
        assert_eq!(config.denied_status_code(), 451);
    }

    #[test]
    fn test_flags_override_config() {
        let base = FilterConfig::new().with_blocklist_path("/env/blocklist");

        let config = parse(&[
            "-B",
            "/cli/blocklist",
            "--deny-local",
            "--log-local",
            "--denied-status",
            "404",
        ])
        .apply_overrides(base);

        assert_eq!(config.blocklist_path(), Some(Path::new("/cli/blocklist")));
        assert!(!config.allow_local_requests());
        assert!(config.log_local_requests());
        assert_eq!(config.denied_status_code(), 404);
    }
}

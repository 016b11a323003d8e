use crate::{args::Args, env_vars};
use blockgate_core::{Classifier, ProxyConfig};
use std::env;

/// Print startup banner with configuration
pub fn print_startup_info(args: &Args, classifier: &Classifier, proxy_config: &ProxyConfig) {
    if args.quiet {
        // Quiet mode: only essential information
        println!(
            "🚀 BlockGate v{} starting on port {}",
            env!("CARGO_PKG_VERSION"),
            args.listen
        );
        return;
    }

    // Normal/verbose mode: full configuration display
    println!("🛡️  {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("   {}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("📡 Network Configuration:");
    println!("   Listen Port:    {}", args.listen);
    println!("   Forward Port:   {}", args.forward);
    println!();

    println!("🔧 Proxy Configuration:");
    println!("   Timeout:        {} seconds", proxy_config.timeout.as_secs());
    println!("   Max Body Size:  {} MB", proxy_config.max_body_size_mb());

    print_filter_config(classifier);

    // Show environment configuration in verbose mode
    if args.verbose {
        print_env_config();
    }

    println!();
    println!("🚀 Server starting...");
}

/// Print filter configuration summary
fn print_filter_config(classifier: &Classifier) {
    let config = classifier.config();

    println!("🔒 Filter Configuration:");
    println!("   Blocklist:      {} entries", classifier.blocklist().len());
    println!(
        "   Local Clients:  {}",
        if config.allow_local_requests() { "allowed" } else { "denied" }
    );
    println!(
        "   Local Logging:  {}",
        if config.log_local_requests() { "enabled" } else { "disabled" }
    );
    println!("   Denied Status:  {}", config.denied_status().as_u16());
}

/// Print environment variable configuration status (used in verbose mode)
fn print_env_config() {
    println!();
    println!("🔧 Environment Variables:");

    for &var_name in env_vars::all_env_vars() {
        match env::var(var_name) {
            Ok(value) => {
                // Mask filesystem paths
                let display_value = if var_name.ends_with("_PATH") {
                    "[CONFIGURED]".to_string()
                } else {
                    value
                };
                println!("   {:<25} = {}", var_name, display_value);
            }
            Err(_) => {
                println!("   {:<25} = [NOT SET]", var_name);
            }
        }
    }
}

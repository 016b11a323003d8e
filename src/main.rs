use std::net::SocketAddr;
use std::sync::Arc;

use blockgate::args::Args;
use blockgate::config::{self, EnvVarConfig};
use blockgate::server;
use blockgate_core::defaults::MIDDLEWARE_NAME;
use blockgate_core::request_handler::{forward_request, handle_request};
use blockgate_core::Classifier;
use clap::Parser;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.json_logs);

    // Validate arguments
    if let Err(err) = args.validate() {
        error!(error = %err, "Configuration error");
        std::process::exit(1);
    }

    let env_config = match EnvVarConfig::new() {
        Ok(env_config) => env_config,
        Err(err) => {
            error!(error = %err, "Invalid environment configuration");
            std::process::exit(1);
        }
    };

    // Build the classifier before binding so a bad configuration never serves traffic
    let filter_config = args.apply_overrides(env_config.filter_config().clone());
    let classifier = match Classifier::from_config(MIDDLEWARE_NAME, &filter_config) {
        Ok(classifier) => Arc::new(classifier),
        Err(err) => {
            error!(error = %err, "Failed to initialize request filter");
            std::process::exit(1);
        }
    };

    let proxy_config = config::get_proxy_config();
    let http_client = match reqwest::Client::builder()
        .timeout(proxy_config.timeout)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    server::print_startup_info(&args, &classifier, proxy_config);

    // Bind to address (validated above)
    let bind_ip: std::net::IpAddr = match args.bind.parse() {
        Ok(ip) => ip,
        Err(_) => {
            error!(bind = %args.bind, "Invalid bind address");
            std::process::exit(1);
        }
    };
    let bind_addr = SocketAddr::from((bind_ip, args.listen));
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(port = args.listen, error = %err, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(port = args.listen, "BlockGate is running");

    // Accept connections
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(error = %err, "Failed to accept connection");
                continue;
            }
        };

        debug!(peer = %addr, "New connection");

        let io = TokioIo::new(stream);
        let classifier = Arc::clone(&classifier);
        let http_client = http_client.clone();
        let forward_host = args.bind.clone();
        let forward_port = args.forward;

        tokio::task::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let classifier = Arc::clone(&classifier);
                let http_client = http_client.clone();
                let forward_host = forward_host.clone();

                async move {
                    let (host, client, config) = (forward_host.as_str(), &http_client, &env_config);

                    handle_request(req, Some(addr), &classifier, move |req| async move {
                        forward_request(req, host, forward_port, config, client).await
                    })
                    .await
                }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(peer = %addr, error = %err, "Connection error");
            }
        });
    }
}

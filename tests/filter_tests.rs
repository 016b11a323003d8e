//! End-to-end tests for BlockGate.
//!
//! Each test runs an in-process upstream backend and a gate in front of it on
//! ephemeral localhost ports, then talks to the gate over real HTTP. Clients
//! therefore always connect from 127.0.0.1, which is a local peer address.

use std::convert::Infallible;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use blockgate::{BlockGateError, Classifier, FilterConfig, ProxyConfig, ProxyProvider};
use blockgate_core::request_handler::{forward_request, handle_request};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;

const BACKEND_BODY: &str = "Hello from test backend";

struct TestProxyConfig(ProxyConfig);

impl ProxyProvider for TestProxyConfig {
    fn proxy_config(&self) -> &ProxyConfig {
        &self.0
    }
}

struct TestEnvironment {
    gate_addr: SocketAddr,
    client: reqwest::Client,
}

impl TestEnvironment {
    async fn start(classifier: Classifier) -> Self {
        let backend_port = start_backend().await;
        let gate_addr = start_gate(classifier, backend_port).await;

        Self {
            gate_addr,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, forwarded_for: Option<&str>) -> (StatusCode, String) {
        let mut request = self
            .client
            .get(format!("http://{}/resource?x=1", self.gate_addr))
            .timeout(Duration::from_secs(10));
        if let Some(value) = forwarded_for {
            request = request.header("x-forwarded-for", value);
        }

        let response = request.send().await.expect("request to gate");
        let status = response.status().as_u16();
        let body = response.text().await.expect("response body");
        (StatusCode::from_u16(status).unwrap(), body)
    }
}

fn write_blocklist(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp blocklist");
    file.write_all(content.as_bytes()).expect("write temp blocklist");
    file
}

fn classifier_for(content: &str, config: FilterConfig) -> Classifier {
    let file = write_blocklist(content);
    Classifier::from_config("e2e", &config.with_blocklist_path(file.path()))
        .expect("classifier construction")
}

async fn start_backend() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                continue;
            };
            tokio::spawn(async move {
                let service = service_fn(|_req: Request<Incoming>| async {
                    Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(BACKEND_BODY))))
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    port
}

async fn start_gate(classifier: Classifier, backend_port: u16) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let classifier = Arc::new(classifier);
    let config = Arc::new(TestProxyConfig(ProxyConfig::default()));
    let http_client = reqwest::Client::new();

    tokio::spawn(async move {
        loop {
            let Ok((stream, peer)) = listener.accept().await else {
                continue;
            };
            let classifier = Arc::clone(&classifier);
            let config = Arc::clone(&config);
            let http_client = http_client.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let classifier = Arc::clone(&classifier);
                    let config = Arc::clone(&config);
                    let http_client = http_client.clone();

                    async move {
                        let (config, client) = (config.as_ref(), &http_client);
                        handle_request(req, Some(peer), &classifier, move |req| async move {
                            forward_request(req, "127.0.0.1", backend_port, config, client).await
                        })
                        .await
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

// ===========================================
// Blocklist scenarios
// ===========================================

#[tokio::test]
async fn test_ipv4_blocklist_entries_and_ranges() {
    let classifier = classifier_for("192.0.2.1\n198.51.100.0/24\n", FilterConfig::new());
    let env = TestEnvironment::start(classifier).await;

    let (status, body) = env.get(Some("192.0.2.1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty(), "denial must not carry a body");

    let (status, _) = env.get(Some("198.51.100.42")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = env.get(Some("192.0.2.2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, BACKEND_BODY);
}

#[tokio::test]
async fn test_ipv6_blocklist_range() {
    let classifier = classifier_for("2001:db8::/32\n", FilterConfig::new());
    let env = TestEnvironment::start(classifier).await;

    let (status, _) = env.get(Some("2001:db8:0:1::1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = env.get(Some("2001:db9::1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, BACKEND_BODY);
}

#[tokio::test]
async fn test_custom_denied_status() {
    let config = FilterConfig::new().with_denied_status_code(429);
    let classifier = classifier_for("203.0.113.9\n", config);
    let env = TestEnvironment::start(classifier).await;

    let (status, body) = env.get(Some("203.0.113.9")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_malformed_lines_do_not_break_loading() {
    let content = "# scanners\n\
                   not-an-ip\n\
                   192.0.2.1   # inline comment\n\
                   300.1.1.1\n\
                   \n\
                   198.51.100.0/33\n\
                   203.0.113.0/24\n";
    let classifier = classifier_for(content, FilterConfig::new());
    assert_eq!(classifier.blocklist().len(), 2);

    let env = TestEnvironment::start(classifier).await;
    assert_eq!(env.get(Some("192.0.2.1")).await.0, StatusCode::FORBIDDEN);
    assert_eq!(env.get(Some("203.0.113.77")).await.0, StatusCode::FORBIDDEN);
    assert_eq!(env.get(Some("198.51.100.1")).await.0, StatusCode::OK);
}

// ===========================================
// Local address scenarios
// ===========================================

#[tokio::test]
async fn test_local_peer_denied_when_local_disallowed() {
    let config = FilterConfig::new().with_allow_local_requests(false);
    let classifier = classifier_for("", config);
    let env = TestEnvironment::start(classifier).await;

    let (status, body) = env.get(None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_local_peer_allowed_by_default() {
    let classifier = classifier_for("", FilterConfig::new());
    let env = TestEnvironment::start(classifier).await;

    let (status, body) = env.get(None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, BACKEND_BODY);
}

#[tokio::test]
async fn test_local_forwarded_for_wins_over_blocklist() {
    let classifier = classifier_for("10.0.0.0/8\n", FilterConfig::new());
    let env = TestEnvironment::start(classifier).await;

    let (status, _) = env.get(Some("10.20.30.40")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unparseable_forwarded_for_is_skipped() {
    let config = FilterConfig::new().with_allow_local_requests(false);
    let classifier = classifier_for("", config);
    let env = TestEnvironment::start(classifier).await;

    // Garbage is skipped, then the local peer is denied
    let (status, _) = env.get(Some("unknown")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ===========================================
// Construction failures
// ===========================================

#[test]
fn test_missing_blocklist_file_fails_construction() {
    let config = FilterConfig::new().with_blocklist_path("/nonexistent/blockgate/blocklist.txt");
    let err = Classifier::from_config("e2e", &config).unwrap_err();
    assert!(matches!(err, BlockGateError::BlocklistUnreadable { .. }));
}

#[test]
fn test_missing_blocklist_path_fails_construction() {
    let err = Classifier::from_config("e2e", &FilterConfig::new()).unwrap_err();
    assert!(matches!(err, BlockGateError::ConfigError(_)));
}

#[test]
fn test_unrecognized_status_fails_construction() {
    let file = write_blocklist("192.0.2.1\n");
    let config = FilterConfig::new()
        .with_blocklist_path(file.path())
        .with_denied_status_code(777);
    let err = Classifier::from_config("e2e", &config).unwrap_err();
    assert!(matches!(err, BlockGateError::InvalidStatusCode(777)));
}

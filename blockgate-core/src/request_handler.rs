//! HTTP request handling and forwarding.
//!
//! [`handle_request`] is the host adapter: it runs the [`Classifier`] over an
//! incoming request and either hands the request, untouched, to the next
//! handler or answers with the configured denial status and an empty body.
//!
//! [`forward_request`] is the next handler used by the standalone gate. It
//! relays the request to an upstream service through a shared
//! [`reqwest::Client`], which the caller configures with the proxy timeout.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Request, Response, StatusCode};
use tracing::{debug, error, warn};

use crate::classifier::{Classifier, Decision};
use crate::error::BlockGateError;
use crate::headers::{self, is_hop_by_hop};
use crate::types::ProxyProvider;

/// Response type produced by every handler in this module.
pub type HandlerResponse = Response<Full<Bytes>>;

/// Classifies a request and dispatches it.
///
/// Allowed requests are passed to `next` unchanged. Denied requests never
/// reach `next`; they get [`denied_response`] with the classifier's status.
///
/// # Arguments
///
/// * `req` - The incoming HTTP request
/// * `peer_addr` - The transport peer address, when the host knows it
/// * `classifier` - The shared classifier
/// * `next` - The next handler in the chain
///
/// # Example
///
/// ```
/// # tokio_test_block_on(async {
/// use blockgate_core::{BlocklistTable, Classifier};
/// use blockgate_core::classifier::ClassifierConfig;
/// use blockgate_core::request_handler::handle_request;
/// use bytes::Bytes;
/// use http_body_util::Full;
/// use hyper::{Request, Response, StatusCode};
/// use std::convert::Infallible;
///
/// let classifier = Classifier::new(
///     "doc",
///     ClassifierConfig::default(),
///     BlocklistTable::from_entries(["192.0.2.1"]),
/// );
///
/// let req = Request::builder()
///     .header("x-forwarded-for", "192.0.2.1")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let response = handle_request(req, None, &classifier, |_req| async {
///     Ok::<_, Infallible>(Response::new(Full::new(Bytes::from("upstream"))))
/// })
/// .await
/// .unwrap();
///
/// assert_eq!(response.status(), StatusCode::FORBIDDEN);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn handle_request<B, F, Fut>(
    req: Request<B>,
    peer_addr: Option<SocketAddr>,
    classifier: &Classifier,
    next: F,
) -> Result<HandlerResponse, Infallible>
where
    F: FnOnce(Request<B>) -> Fut,
    Fut: Future<Output = Result<HandlerResponse, Infallible>>,
{
    let peer = peer_addr.map(|addr| addr.to_string());

    match classifier.classify(req.headers(), peer.as_deref()) {
        Decision::Allow => next(req).await,
        Decision::Deny(status) => Ok(denied_response(status)),
    }
}

/// Builds a denial response: the status code and nothing else.
///
/// The body is empty so the client learns nothing about which rule matched.
pub fn denied_response(status: StatusCode) -> HandlerResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Creates a plain-text error response.
///
/// Used by the forwarding path, never for filter denials.
///
/// # Example
///
/// ```
/// use blockgate_core::request_handler::create_error_response;
/// use hyper::StatusCode;
///
/// let response = create_error_response(StatusCode::BAD_GATEWAY, "Bad gateway");
/// assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
/// ```
pub fn create_error_response(status: StatusCode, message: &str) -> HandlerResponse {
    Response::builder()
        .status(status)
        .header("content-type", "text/plain")
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|_| {
            // Fallback response if builder fails (extremely unlikely)
            Response::new(Full::new(Bytes::from("Internal Server Error")))
        })
}

/// Turns a forwarding error into a response, logging it at a matching level.
fn error_response(err: &BlockGateError) -> HandlerResponse {
    if err.is_server_error() {
        error!(error = %err, "Forwarding failed");
    } else {
        warn!(error = %err, "Request rejected while forwarding");
    }
    create_error_response(err.status_code(), err.user_message())
}

/// Forwards a request to `http://{host}:{port}` and relays the response.
///
/// The request body is buffered and checked against the configured size
/// limit. Upstream timeouts map to 504, connection failures to 502.
pub async fn forward_request<B, C>(
    req: Request<B>,
    host: &str,
    port: u16,
    config: &C,
    http_client: &reqwest::Client,
) -> Result<HandlerResponse, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
    C: ProxyProvider + ?Sized,
{
    let max_body_size = config.proxy_config().max_body_size;
    let (parts, body) = req.into_parts();

    let body_bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            return Ok(error_response(&BlockGateError::BodyReadError(
                err.to_string(),
            )));
        }
    };

    if max_body_size > 0 && body_bytes.len() > max_body_size {
        return Ok(error_response(&BlockGateError::BodyTooLarge {
            size: body_bytes.len(),
            max: max_body_size,
        }));
    }

    match forward_with_reqwest(parts, body_bytes, host, port, http_client).await {
        Ok(response) => Ok(response),
        Err(err) => Ok(error_response(&err)),
    }
}

/// Shared forwarding logic using reqwest with connection pooling.
async fn forward_with_reqwest(
    parts: hyper::http::request::Parts,
    body_bytes: Bytes,
    host: &str,
    port: u16,
    client: &reqwest::Client,
) -> crate::Result<HandlerResponse> {
    let destination_uri = format!(
        "http://{}:{}{}",
        host,
        port,
        parts.uri.path_and_query().map_or("/", |pq| pq.as_str())
    );

    let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
        .map_err(|e| BlockGateError::ProxyError(format!("unsupported method: {e}")))?;
    let mut req_builder = client.request(method, &destination_uri);

    for (name, value) in parts.headers.iter() {
        let name = name.as_str();
        if name != headers::HOST && name != headers::CONTENT_LENGTH && !is_hop_by_hop(name) {
            req_builder = req_builder.header(name, value.as_bytes());
        }
    }

    if !body_bytes.is_empty() {
        req_builder = req_builder.body(body_bytes);
    }

    debug!(uri = %destination_uri, "Forwarding request upstream");

    let response = req_builder.send().await.map_err(|err| {
        if err.is_timeout() {
            BlockGateError::UpstreamTimeout(err.to_string())
        } else if err.is_connect() {
            BlockGateError::UpstreamConnectionFailed(err.to_string())
        } else {
            BlockGateError::ProxyError(err.to_string())
        }
    })?;

    let status = response.status().as_u16();
    let upstream_headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(|e| BlockGateError::ProxyError(format!("failed to read response body: {e}")))?;

    let mut hyper_response = Response::builder()
        .status(status)
        .body(Full::new(body))
        .map_err(|e| BlockGateError::ProxyError(format!("failed to build response: {e}")))?;

    for (name, value) in upstream_headers.iter() {
        if !is_hop_by_hop(name.as_str())
            && let (Ok(hyper_name), Ok(hyper_value)) = (
                HeaderName::from_bytes(name.as_str().as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            )
        {
            hyper_response.headers_mut().append(hyper_name, hyper_value);
        }
    }

    Ok(hyper_response)
}

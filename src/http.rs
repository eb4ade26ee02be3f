//! Shared HTTP client construction
//!
//! Both the S3 client and the OpenStack clients run over the same tuned
//! hyper stack: HTTP/1.1 only, TCP_NODELAY, 10s connect timeout, 90s
//! keepalive, pooled idle connections.

use bytes::Bytes;
use http_body_util::Full;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use native_tls::TlsConnector;
use std::time::Duration;

/// The concrete hyper client type used throughout the crate
pub type HttpClient = HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Build the shared HTTP client
///
/// Clone is cheap - the client uses Arc internally, and clones share the
/// same connection pool.
pub fn build_client() -> HttpClient {
    let mut http = HttpConnector::new();
    http.set_nodelay(true);
    http.enforce_http(false);
    http.set_connect_timeout(Some(Duration::from_secs(10)));
    http.set_keepalive(Some(Duration::from_secs(90)));

    let tls = TlsConnector::new().expect("failed to build TLS connector");
    let https = HttpsConnector::from((http, tls.into()));

    HyperClient::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(64)
        .retry_canceled_requests(true)
        .set_host(true)
        .build(https)
}

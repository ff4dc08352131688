//! The HTTPS transport seam.
//!
//! Everything in this crate is built on top of a [`Transport`]: something that
//! can perform one HTTP request and hand back the status, headers and raw body.
//! [`ReqwestTransport`] is the production implementation; tests and embedding
//! applications can supply their own.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

/// A fully prepared request, ready to be sent.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// Absolute URL, possibly already carrying a query string.
    pub url: Url,
    /// Final merged headers.
    pub headers: HeaderMap,
    /// Encoded query pairs, appended after any query already in `url`.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

/// A raw response as received from the wire.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The raw response body.
    pub body: String,
}

/// Kind of network-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection could not be established (refused, DNS, TLS).
    Connect,
    /// The request timed out.
    Timeout,
    /// Any other failure before a response was received.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Connect => f.write_str("connection failed"),
            TransportErrorKind::Timeout => f.write_str("request timed out"),
            TransportErrorKind::Other => f.write_str("transport error"),
        }
    }
}

/// A network-level failure: no HTTP response was received.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct TransportError {
    /// What went wrong.
    pub kind: TransportErrorKind,
    /// Underlying error message.
    pub message: String,
}

impl TransportError {
    /// Creates a new `TransportError`.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// Performs a single HTTP exchange.
///
/// Implementations must not retry: retry and backoff are decided by the
/// client on top of this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the raw response, or a network-level
    /// failure if no response was received.
    async fn send(&self, request: TransportRequest)
        -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with standard proxy configuration taken from the
    /// environment (`HTTPS_PROXY` and friends).
    pub fn new() -> crate::Result<Self> {
        Self::with_proxy(None)
    }

    /// Creates a transport routing every request through `proxy`, or through
    /// the environment's proxy settings when `None`.
    pub fn with_proxy(proxy: Option<&str>) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                crate::Error::ConfigurationError(format!("Invalid proxy: {}", e))
            })?;
            builder = builder.proxy(proxy);
        }
        let http_client = builder.build().map_err(|e| {
            crate::Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;
        Ok(Self { http_client })
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut url = request.url;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let mut builder = self
            .http_client
            .request(request.method, url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

//! Error types for REST API calls.
//!
//! Every terminal failure of a logical call is classified into one of the
//! variants below before it reaches the caller. Transient conditions (rate
//! limits, 5xx responses, dropped connections) are retried internally and only
//! show up here once the retry budget is spent. All HTTP-derived variants keep
//! the status, the raw response body and the canonical path of the endpoint so
//! that callers can inspect what happened.

use crate::transport::TransportError;
use http::{HeaderMap, Method, StatusCode};
use std::time::Duration;

/// The longest permissible length of API content included in error messages.
pub const TEXT_LEN_LIMIT: usize = 100;

/// The main error type for REST API calls.
///
/// # Examples
///
/// ```no_run
/// use pdrest::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let mut client = Client::builder().api_key("my-key").build()?;
///
/// match client.get("/users/PABC123").await {
///     Ok(user) => println!("Found: {}", user.data["name"]),
///     Err(Error::Client { status, canonical_path, .. }) if status.as_u16() == 404 => {
///         eprintln!("No such user ({canonical_path})");
///     }
///     Err(Error::Server { status, raw_response, .. }) => {
///         eprintln!("API is having trouble ({status}): {raw_response}");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Network-level failure (connect, DNS, TLS, timeout) after the network
    /// retry budget was exhausted.
    #[error("Connectivity error on {canonical_path} after {attempts} attempts: {source}")]
    Connectivity {
        /// Canonical path of the endpoint being called
        canonical_path: String,
        /// Number of attempts made
        attempts: u32,
        /// The last transport failure
        #[source]
        source: TransportError,
    },

    /// A fatal 4xx response, including 401 and 429 once their retry budget is
    /// spent.
    #[error("Client error {status} on {canonical_path}: {}", truncate_text(.raw_response))]
    Client {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
        /// Canonical path of the endpoint being called
        canonical_path: String,
        /// Server-advised wait before retrying, if the response carried one
        retry_after: Option<Duration>,
    },

    /// A 5xx response after the HTTP retry budget was exhausted.
    #[error("Server error {status} on {canonical_path}: {}", truncate_text(.raw_response))]
    Server {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
        /// Canonical path of the endpoint being called
        canonical_path: String,
    },

    /// A successful response did not contain the expected envelope key.
    #[error(
        "Expected response from {canonical_path} (status {status}) to be an object with key \
         \"{expected}\", but {}",
        truncate_text(.found)
    )]
    SchemaMismatch {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// Canonical path of the endpoint being called
        canonical_path: String,
        /// The envelope key that was expected
        expected: String,
        /// Description of what was found instead
        found: String,
    },

    /// The response body was not valid JSON, or did not decode into the
    /// requested type.
    #[error("Failed to deserialize response from {canonical_path} (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
        /// Canonical path of the endpoint being called
        canonical_path: String,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Unsupported URL, or an operation that the endpoint cannot support
    /// (e.g. paginating an individual resource).
    #[error("URL error: {0}")]
    Url(String),

    /// The API flavor in use does not permit this HTTP method.
    #[error("Method {method} is not permitted by the {api} API")]
    MethodNotPermitted {
        /// The rejected method
        method: Method,
        /// Name of the API flavor
        api: &'static str,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Client { status, .. }
            | Error::Server { status, .. }
            | Error::SchemaMismatch { status, .. }
            | Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Client { raw_response, .. }
            | Error::Server { raw_response, .. }
            | Error::SchemaMismatch { raw_response, .. }
            | Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the response headers if this error carries them.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Error::Client { headers, .. } | Error::Server { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Returns the canonical path of the endpoint that failed, if known.
    pub fn canonical_path(&self) -> Option<&str> {
        match self {
            Error::Connectivity { canonical_path, .. }
            | Error::Client { canonical_path, .. }
            | Error::Server { canonical_path, .. }
            | Error::SchemaMismatch { canonical_path, .. }
            | Error::DeserializationFailed { canonical_path, .. } => Some(canonical_path),
            _ => None,
        }
    }

    /// Returns `true` for failures on the server side (exhausted 5xx).
    ///
    /// # Examples
    ///
    /// ```
    /// use pdrest::Error;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = Error::Server {
    ///     status: StatusCode::BAD_GATEWAY,
    ///     raw_response: "upstream unavailable".to_string(),
    ///     headers: HeaderMap::new(),
    ///     canonical_path: "/users".to_string(),
    /// };
    /// assert!(err.is_server_error());
    /// assert_eq!(err.canonical_path(), Some("/users"));
    /// ```
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// Returns the server-advised wait, present on exhausted 429 errors that
    /// carried a `Retry-After` header.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Client { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Truncates a string longer than [`TEXT_LEN_LIMIT`] characters.
pub fn truncate_text(text: &str) -> String {
    if text.chars().count() > TEXT_LEN_LIMIT {
        let head: String = text.chars().take(TEXT_LEN_LIMIT - 1).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// A specialized `Result` type for REST API calls.
pub type Result<T> = std::result::Result<T, Error>;

//! Response wrapper that preserves both the unwrapped body and raw response
//! details.
//!
//! The [`Response`] type carries the entity extracted from the envelope along
//! with the status, headers, raw body, the canonical path of the endpoint and
//! how long the whole logical call took.

use crate::diagnostics::ResponseDiagnostics;
use crate::Error;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// A successful API response.
///
/// # Type Parameters
///
/// * `T` - The type of the unwrapped response data; [`Value`] unless
///   converted with [`Response::into_typed`]
///
/// # Examples
///
/// ```no_run
/// use pdrest::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), pdrest::Error> {
/// let mut client = Client::builder().api_key("my-key").build()?;
///
/// let response = client.get("/users/PABC123").await?.into_typed::<User>()?;
///
/// println!("User: {}", response.data.name);
/// println!("Endpoint: {}", response.canonical_path);
/// println!("Request took {:?}", response.latency);
/// println!("Retry attempts: {}", response.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T = Value> {
    /// The unwrapped response data.
    pub data: T,

    /// The raw response body as received, before unwrapping.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Canonical path of the endpoint, e.g. `/users/{id}`.
    pub canonical_path: String,

    /// Wall-clock time of the whole logical call, retries and backoff
    /// included.
    pub latency: Duration,

    /// Number of requests sent to complete this call.
    pub attempts: u32,
}

impl<T> Response<T> {
    /// Maps the response data to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pdrest::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response {
    ///     data: 42,
    ///     raw_body: r#"{"count": 42}"#.to_string(),
    ///     status: StatusCode::OK,
    ///     headers: HeaderMap::new(),
    ///     canonical_path: "/incidents/count".to_string(),
    ///     latency: Duration::from_millis(100),
    ///     attempts: 1,
    /// };
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            canonical_path: self.canonical_path,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if the call required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a reference to a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Request id, date and rate limit details from the response headers.
    pub fn diagnostics(&self) -> ResponseDiagnostics {
        ResponseDiagnostics::from_headers(&self.headers)
    }
}

impl Response<Value> {
    /// Decodes the unwrapped data into `U`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] if the data does not match `U`.
    pub fn into_typed<U: DeserializeOwned>(self) -> Result<Response<U>, Error> {
        let Response {
            data,
            raw_body,
            status,
            headers,
            canonical_path,
            latency,
            attempts,
        } = self;
        match serde_json::from_value::<U>(data) {
            Ok(data) => Ok(Response {
                data,
                raw_body,
                status,
                headers,
                canonical_path,
                latency,
                attempts,
            }),
            Err(e) => Err(Error::DeserializationFailed {
                raw_response: raw_body,
                serde_error: e.to_string(),
                status,
                canonical_path,
            }),
        }
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

//! Per-call request options.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// A single value, sent as `key=value`.
    Single(String),
    /// An array filter, sent as repeated `key[]=value` pairs.
    Array(Vec<String>),
}

/// Everything describing one logical API call.
///
/// # Examples
///
/// ```
/// use pdrest::RequestMetadata;
/// use http::Method;
///
/// let request = RequestMetadata::new(Method::GET, "/incidents")
///     .with_query_param("time_zone", "UTC")
///     .with_query_array("statuses", ["triggered", "acknowledged"]);
///
/// assert_eq!(
///     request.encode_query(),
///     vec![
///         ("statuses[]".to_string(), "triggered".to_string()),
///         ("statuses[]".to_string(), "acknowledged".to_string()),
///         ("time_zone".to_string(), "UTC".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method.
    pub method: Method,

    /// Path relative to the base URL, or an absolute URL under it.
    pub path: String,

    /// Headers merged over the client's defaults.
    pub headers: HeaderMap,

    /// Query parameters, encoded in key order.
    pub query_params: BTreeMap<String, QueryValue>,

    /// The unwrapped request body.
    pub body: Option<Value>,

    /// Whether entity wrapping applies to this call.
    pub wrap: bool,

    /// Whether an `Authorization` header in [`headers`](Self::headers)
    /// replaces the client's credentials. Without this flag such a header is
    /// dropped.
    pub override_authorization: bool,
}

impl RequestMetadata {
    /// Creates request options for `method` on `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query_params: BTreeMap::new(),
            body: None,
            wrap: true,
            override_authorization: false,
        }
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter. Booleans and numbers are sent in their
    /// display form (`true`, `25`).
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params
            .insert(key.into(), QueryValue::Single(value.to_string()));
        self
    }

    /// Adds an array-valued query parameter.
    pub fn with_query_array<I>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.query_params
            .insert(key.into(), QueryValue::Array(values));
        self
    }

    /// Adds multiple single-valued query parameters.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params
            .extend(params.into_iter().map(|(k, v)| (k, QueryValue::Single(v))));
        self
    }

    /// Sets the request body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized to JSON.
    pub fn with_body(mut self, body: &impl Serialize) -> Result<Self, crate::Error> {
        let body = serde_json::to_value(body)
            .map_err(|e| crate::Error::SerializationFailed(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Sends and returns bodies as-is, bypassing entity wrapping.
    pub fn without_wrapping(mut self) -> Self {
        self.wrap = false;
        self
    }

    /// Lets an `Authorization` header set on this request replace the
    /// client's credentials.
    pub fn overriding_authorization(mut self) -> Self {
        self.override_authorization = true;
        self
    }

    /// The single value of a query parameter, if set.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        match self.query_params.get(key)? {
            QueryValue::Single(value) => Some(value),
            QueryValue::Array(_) => None,
        }
    }

    /// Encodes the query parameters as sorted pairs. Array values repeat the
    /// key with a `[]` suffix.
    pub fn encode_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.query_params.len());
        for (key, value) in &self.query_params {
            match value {
                QueryValue::Single(value) => pairs.push((key.clone(), value.clone())),
                QueryValue::Array(values) => {
                    let key = if key.ends_with("[]") {
                        key.clone()
                    } else {
                        format!("{key}[]")
                    };
                    pairs.extend(values.iter().map(|v| (key.clone(), v.clone())));
                }
            }
        }
        pairs
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_query() {
        let request = RequestMetadata::new(Method::GET, "/users")
            .with_query_param("include_total", true)
            .with_query_param("limit", 25)
            .with_query_array("team_ids[]", ["PTEAM01"])
            .with_query_array("include", ["contact_methods", "teams"]);

        assert_eq!(
            request.encode_query(),
            vec![
                ("include[]".to_string(), "contact_methods".to_string()),
                ("include[]".to_string(), "teams".to_string()),
                ("include_total".to_string(), "true".to_string()),
                ("limit".to_string(), "25".to_string()),
                ("team_ids[]".to_string(), "PTEAM01".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_param_replaces_previous_value() {
        let request = RequestMetadata::new(Method::GET, "/users")
            .with_query_param("offset", 0)
            .with_query_param("offset", 100);
        assert_eq!(request.query_param("offset"), Some("100"));
    }

    #[test]
    fn test_with_header() {
        let request = RequestMetadata::new(Method::GET, "/users")
            .with_header("From", "jane@example.com")
            .unwrap();
        assert_eq!(request.headers["from"], "jane@example.com");

        assert!(RequestMetadata::new(Method::GET, "/users")
            .with_header("bad header", "x")
            .is_err());
    }

    #[test]
    fn test_with_body() {
        #[derive(Serialize)]
        struct Team {
            name: String,
        }
        let request = RequestMetadata::new(Method::POST, "/teams")
            .with_body(&Team {
                name: "SRE".to_string(),
            })
            .unwrap();
        assert_eq!(request.body, Some(json!({"name": "SRE"})));
        assert!(request.wrap);
        assert!(!request.without_wrapping().wrap);
    }
}

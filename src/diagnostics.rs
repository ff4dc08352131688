//! Support-relevant details carried in response headers.
//!
//! The API stamps every response with a request id and a date; both are what
//! support needs to trace a failed call, so they are logged for server errors
//! and retries. Rate-limited responses may also say how long to wait.

use http::HeaderMap;
use std::time::{Duration, SystemTime};

/// Diagnostic information extracted from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDiagnostics {
    /// Server-assigned request id (`X-Request-Id`).
    pub request_id: Option<String>,

    /// Server time of the response (`Date`).
    pub date: Option<SystemTime>,

    /// How long the server asks clients to wait (`Retry-After`).
    pub retry_after: Option<Duration>,

    /// Requests left in the current rate limit window
    /// (`X-RateLimit-Remaining`).
    pub ratelimit_remaining: Option<u64>,
}

impl ResponseDiagnostics {
    /// Extracts diagnostics from response headers. Absent or malformed
    /// headers yield `None` for the corresponding field.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdrest::diagnostics::ResponseDiagnostics;
    /// use http::HeaderMap;
    /// use std::time::Duration;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-request-id", "b7a7d3e4".parse().unwrap());
    /// headers.insert("retry-after", "30".parse().unwrap());
    ///
    /// let diagnostics = ResponseDiagnostics::from_headers(&headers);
    /// assert_eq!(diagnostics.request_id.as_deref(), Some("b7a7d3e4"));
    /// assert_eq!(diagnostics.retry_after, Some(Duration::from_secs(30)));
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            request_id: header_str(headers, "x-request-id").map(str::to_string),
            date: header_str(headers, "date").and_then(|d| httpdate::parse_http_date(d).ok()),
            retry_after: parse_retry_after(headers),
            ratelimit_remaining: header_str(headers, "x-ratelimit-remaining")
                .and_then(|r| r.parse().ok()),
        }
    }

    /// The `Date` header formatted as an HTTP date, for logging.
    pub fn date_string(&self) -> Option<String> {
        self.date.map(httpdate::fmt_http_date)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

/// Parses `Retry-After` as either delay-seconds or an HTTP date.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = header_str(headers, "retry-after")?;

    if let Ok(seconds) = header.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    // a date in the past means "now"
    Some(
        date_time
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO),
    )
}

//! The API client.
//!
//! [`Client`] composes canonicalization, entity wrapping, retry/backoff and
//! metrics around every logical call. Use [`ClientBuilder`] to configure and
//! create clients.

use crate::{
    auth::AuthMethod,
    canonical::{is_path_param, normalize_url, Resolved},
    diagnostics::ResponseDiagnostics,
    flavor::{ApiFlavor, RestApiV2},
    metadata::RequestMetadata,
    pagination::{attribute_text, MatchMode, PaginationError, Pager},
    retry::{AttemptCounter, BackoffState, Outcome, RetryConfig},
    session::{Session, SessionMetrics},
    tables::ApiTables,
    transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse},
    wrapping::{self, json_type_name, WrapSpec},
    Error, Response, Result,
};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, FROM, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_MAX_PAGES: u32 = 10_000;
// the API refuses offset + limit beyond this
const DEFAULT_MAX_OFFSET: u64 = 10_000;

/// A single resource: either a path/URL, or an entity as returned by the API,
/// whose `self` property holds its URL.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceRef {
    /// Path relative to the base URL, or an absolute URL under it.
    Path(String),
    /// An entity object carrying a `self` URL.
    Entity(Value),
}

impl ResourceRef {
    /// The path or URL of the resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] for an entity without a string `self` property.
    pub fn into_path(self) -> Result<String> {
        match self {
            ResourceRef::Path(path) => Ok(path),
            ResourceRef::Entity(entity) => entity
                .get("self")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::Url("Entity has no \"self\" property holding its URL".to_string())
                }),
        }
    }
}

impl From<&str> for ResourceRef {
    fn from(path: &str) -> Self {
        ResourceRef::Path(path.to_string())
    }
}

impl From<String> for ResourceRef {
    fn from(path: String) -> Self {
        ResourceRef::Path(path)
    }
}

impl From<&String> for ResourceRef {
    fn from(path: &String) -> Self {
        ResourceRef::Path(path.clone())
    }
}

impl From<Value> for ResourceRef {
    fn from(entity: Value) -> Self {
        ResourceRef::Entity(entity)
    }
}

impl From<&Value> for ResourceRef {
    fn from(entity: &Value) -> Self {
        ResourceRef::Entity(entity.clone())
    }
}

/// A client for the PagerDuty REST API v2 or one of the integration APIs.
///
/// Every call goes through the same pipeline: the URL is reduced to its
/// canonical path, the request body is wrapped in its entity envelope, the
/// request is sent with retries, the response is unwrapped and the call is
/// recorded in the session metrics.
///
/// A client owns its session state (metrics, backoff timer), so calls take
/// `&mut self`. Cloning a client shares the configuration and connection pool
/// but starts a fresh session; use one clone per concurrent task.
///
/// # Examples
///
/// ```no_run
/// use pdrest::Client;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = Client::builder()
///     .api_key("y_NbAkKc66ryYTWUXYEu")
///     .default_from("jane.doe@example.com")
///     .build()?;
///
/// // GET /users/{id}: the "user" envelope is removed
/// let user = client.get("/users/PABC123").await?;
/// println!("User: {}", user.data["name"]);
///
/// // POST /teams: the body is sent as {"team": {...}}
/// let team = client.post("/teams", &json!({"name": "SRE"})).await?;
/// println!("Created team {}", team.data["id"]);
///
/// // paginated index
/// let services = client.list_all("/services").await?;
/// println!("{} services", services.len());
/// # Ok(())
/// # }
/// ```
pub struct Client {
    inner: Arc<ClientInner>,
    session: Session,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    flavor: Arc<dyn ApiFlavor>,
    tables: Arc<ApiTables>,
    base_url: String,
    auth: AuthMethod,
    base_headers: HeaderMap,
    retry: RetryConfig,
    timeout: Option<Duration>,
    page_size: u32,
    max_pages: u32,
    max_offset: u64,
}

impl Clone for Client {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            session: Session::default(),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api", &self.inner.flavor.name())
            .field("base_url", &self.inner.base_url)
            .field("auth", &self.inner.auth)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL all paths are resolved against.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The API flavor in use.
    pub fn flavor(&self) -> &dyn ApiFlavor {
        self.inner.flavor.as_ref()
    }

    /// The lookup tables in use.
    pub fn tables(&self) -> &ApiTables {
        &self.inner.tables
    }

    /// The retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    /// Call metrics for this session.
    pub fn metrics(&self) -> &SessionMetrics {
        &self.session.metrics
    }

    /// Clears the call metrics.
    pub fn reset_metrics(&mut self) {
        self.session.metrics = SessionMetrics::default();
    }

    /// The session's backoff state.
    pub fn backoff(&self) -> &BackoffState {
        &self.session.backoff
    }

    pub(crate) fn default_page_size(&self) -> u32 {
        self.inner.page_size
    }

    pub(crate) fn max_pages(&self) -> u32 {
        self.inner.max_pages
    }

    pub(crate) fn max_offset(&self) -> u64 {
        self.inner.max_offset
    }

    /// Canonical path of `url`, with the tier that resolved it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if `url` is absolute and not under the base URL.
    pub fn canonical_path(&self, url: &str) -> Result<Resolved<String>> {
        self.inner.tables.canonicalize(&self.inner.base_url, url)
    }

    /// The entity wrapping applied to `method` on `url`, with the tier that
    /// resolved it.
    pub fn wrapping_for(&self, method: &Method, url: &str) -> Result<Resolved<WrapSpec>> {
        let canonical_path = self.canonical_path(url)?.value;
        Ok(self.resolve_wrapping(method, &canonical_path))
    }

    pub(crate) fn resolve_wrapping(&self, method: &Method, canonical_path: &str) -> Resolved<WrapSpec> {
        if self.inner.flavor.auto_wrap() {
            self.inner.tables.resolve_wrapping(method, canonical_path)
        } else {
            Resolved::table(WrapSpec::none())
        }
    }

    /// Performs one logical API call.
    ///
    /// Unless the request opts out, the body is wrapped and the response
    /// unwrapped according to the endpoint's entity wrapping; the returned
    /// data is the entity itself. Retryable failures are retried with
    /// backoff; only terminal failures are returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pdrest::{Client, RequestMetadata};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), pdrest::Error> {
    /// let mut client = Client::builder().api_key("my-key").build()?;
    ///
    /// let request = RequestMetadata::new(Method::GET, "/incidents")
    ///     .with_query_array("statuses", ["triggered"])
    ///     .with_query_param("limit", 5);
    /// let response = client.call(request).await?;
    /// println!("{} incidents", response.data.as_array().map_or(0, Vec::len));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call(&mut self, mut request: RequestMetadata) -> Result<Response> {
        let start = Instant::now();
        let method = request.method.clone();
        if !self.inner.flavor.permits(&method) {
            return Err(Error::MethodNotPermitted {
                method,
                api: self.inner.flavor.name(),
            });
        }

        let url = normalize_url(&self.inner.base_url, &request.path)?;
        let canonical_path = self.canonical_path(&url)?.value;
        let endpoint = format!("{method} {canonical_path}");

        let wrapping = if request.wrap {
            let resolved = self.resolve_wrapping(&method, &canonical_path);
            tracing::debug!(
                endpoint = %endpoint,
                tier = ?resolved.tier,
                request_key = ?resolved.value.request,
                response_key = ?resolved.value.response,
                "Resolved entity wrapping"
            );
            resolved.value
        } else {
            WrapSpec::none()
        };

        let body = request
            .body
            .take()
            .map(|body| wrapping::wrap(body, wrapping.request.as_deref()));
        let transport_request = TransportRequest {
            method,
            url: Url::parse(&url)?,
            headers: self.prepare_headers(&request),
            query: request.encode_query(),
            body,
            timeout: self.inner.timeout,
        };

        let result = self.dispatch(transport_request, &canonical_path).await;
        self.session.metrics.record(&endpoint, start.elapsed());
        let (response, attempts) = result?;

        unwrap_response(response, &wrapping, canonical_path, start.elapsed(), attempts)
    }

    /// Merges default and caller headers. A caller `Authorization` header is
    /// honored only if the request explicitly overrides authorization.
    fn prepare_headers(&self, request: &RequestMetadata) -> HeaderMap {
        let mut headers = self.inner.base_headers.clone();
        if matches!(request.method, Method::POST | Method::PUT | Method::PATCH) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        merge_headers(&mut headers, &request.headers, |name| {
            if *name == AUTHORIZATION && !request.override_authorization {
                tracing::warn!(
                    path = %request.path,
                    "Ignoring Authorization header on request that does not override authorization"
                );
                false
            } else {
                true
            }
        });
        headers
    }

    /// Sends a request until it succeeds or fails terminally.
    async fn dispatch(
        &mut self,
        request: TransportRequest,
        canonical_path: &str,
    ) -> Result<(TransportResponse, u32)> {
        let inner = Arc::clone(&self.inner);
        let retry = &inner.retry;
        let mut attempts = AttemptCounter::new();

        loop {
            let attempt = attempts.attempts();
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt,
                "Executing HTTP request"
            );

            match inner.transport.send(request.clone()).await {
                Ok(response) => {
                    log_response(&request, &response);
                    let outcome = retry.classify_status(response.status, &mut attempts);
                    if outcome == Outcome::Success {
                        self.session.backoff.record_success(retry);
                        return Ok((response, attempt));
                    }
                    if !outcome.is_retryable() {
                        return Err(http_error(response, canonical_path));
                    }
                    let delay = self.session.backoff.next_delay(retry, &mut attempts);
                    tracing::info!(
                        status = response.status.as_u16(),
                        canonical_path = %canonical_path,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request after HTTP error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    let outcome = retry.classify_network_failure(&mut attempts);
                    if !outcome.is_retryable() {
                        tracing::error!(
                            error = %error,
                            canonical_path = %canonical_path,
                            attempts = attempt,
                            "Giving up after network errors"
                        );
                        return Err(Error::Connectivity {
                            canonical_path: canonical_path.to_string(),
                            attempts: attempt,
                            source: error,
                        });
                    }
                    let delay = self.session.backoff.next_delay(retry, &mut attempts);
                    tracing::info!(
                        error = %error,
                        canonical_path = %canonical_path,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request after network error"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Retrieves a resource.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), pdrest::Error> {
    /// # let mut client = pdrest::Client::builder().api_key("my-key").build()?;
    /// let user = client.get("/users/PABC123").await?;
    /// // follow a reference embedded in another entity
    /// let team = client.get(&user.data["teams"][0]).await?;
    /// println!("{}", team.data["name"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&mut self, resource: impl Into<ResourceRef>) -> Result<Response> {
        let path = resource.into().into_path()?;
        self.call(RequestMetadata::new(Method::GET, path)).await
    }

    /// Creates a resource; `body` is the unwrapped entity.
    pub async fn post(
        &mut self,
        resource: impl Into<ResourceRef>,
        body: &impl Serialize,
    ) -> Result<Response> {
        self.send_body(Method::POST, resource.into(), body).await
    }

    /// Updates a resource; `body` is the unwrapped entity.
    pub async fn put(
        &mut self,
        resource: impl Into<ResourceRef>,
        body: &impl Serialize,
    ) -> Result<Response> {
        self.send_body(Method::PUT, resource.into(), body).await
    }

    /// Partially updates a resource.
    pub async fn patch(
        &mut self,
        resource: impl Into<ResourceRef>,
        body: &impl Serialize,
    ) -> Result<Response> {
        self.send_body(Method::PATCH, resource.into(), body).await
    }

    /// Deletes a resource.
    pub async fn delete(&mut self, resource: impl Into<ResourceRef>) -> Result<Response> {
        let path = resource.into().into_path()?;
        self.call(RequestMetadata::new(Method::DELETE, path)).await
    }

    async fn send_body(
        &mut self,
        method: Method,
        resource: ResourceRef,
        body: &impl Serialize,
    ) -> Result<Response> {
        let path = resource.into_path()?;
        let request = RequestMetadata::new(method, path).with_body(body)?;
        self.call(request).await
    }

    /// Total number of records in a collection, as reported by the API.
    pub async fn get_total(&mut self, path: impl Into<String>) -> Result<u64> {
        self.get_total_with(RequestMetadata::new(Method::GET, path))
            .await
    }

    /// Total number of records matching a query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the response carries no total.
    pub async fn get_total_with(&mut self, request: RequestMetadata) -> Result<u64> {
        let request = request
            .with_query_param("total", true)
            .with_query_param("limit", 1)
            .with_query_param("offset", 0)
            .without_wrapping();
        let response = self.call(request).await?;
        match response.data.get("total").and_then(Value::as_u64) {
            Some(total) => Ok(total),
            None => Err(Error::SchemaMismatch {
                status: response.status,
                found: describe(&response.data),
                raw_response: response.raw_body,
                canonical_path: response.canonical_path,
                expected: "total".to_string(),
            }),
        }
    }

    /// Lazily iterates over a collection endpoint.
    pub fn list(&mut self, path: impl Into<String>) -> Pager<'_> {
        self.list_with(RequestMetadata::new(Method::GET, path))
    }

    /// Lazily iterates over a collection, with query parameters and headers
    /// taken from `request`.
    pub fn list_with(&mut self, request: RequestMetadata) -> Pager<'_> {
        Pager::new(self, request)
    }

    /// Every item of a collection, in order.
    pub async fn list_all(
        &mut self,
        path: impl Into<String>,
    ) -> std::result::Result<Vec<Value>, PaginationError> {
        self.list(path).collect_vec().await
    }

    /// Every item of a collection, keyed by the attribute `by` (usually
    /// `id`). Items sharing a key overwrite earlier ones.
    pub async fn dict_all(
        &mut self,
        path: impl Into<String>,
        by: &str,
    ) -> std::result::Result<HashMap<String, Value>, PaginationError> {
        self.list(path).collect_map(by).await
    }

    /// Finds the item of a collection whose `attribute` equals `query`,
    /// ignoring case. The collection is searched with the `query` parameter
    /// and iteration stops at the first match.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), pdrest::PaginationError> {
    /// # let mut client = pdrest::Client::builder().api_key("my-key").build()?;
    /// if let Some(user) = client.find("/users", "jane.doe@example.com", "email").await? {
    ///     println!("Found {}", user["id"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find(
        &mut self,
        path: impl Into<String>,
        query: &str,
        attribute: &str,
    ) -> std::result::Result<Option<Value>, PaginationError> {
        let request = RequestMetadata::new(Method::GET, path).with_query_param("query", query);
        self.list_with(request)
            .find_by(attribute, query, MatchMode::CaseInsensitive)
            .await
    }

    /// Finds or creates a resource, using `attribute` of `values` as the
    /// idempotency key. With `update`, an existing resource is updated with
    /// `values` if any of them differ.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if `values` has no `attribute`.
    pub async fn persist(
        &mut self,
        path: impl Into<String>,
        attribute: &str,
        values: Value,
        update: bool,
    ) -> std::result::Result<Value, PaginationError> {
        let path = path.into();
        let query = match values.get(attribute).and_then(attribute_text) {
            Some(query) => query,
            None => {
                return Err(Error::ConfigurationError(format!(
                    "Values must contain the idempotency key \"{attribute}\""
                ))
                .into())
            }
        };

        match self.find(path.as_str(), &query, attribute).await? {
            Some(existing) => {
                if !update {
                    return Ok(existing);
                }
                let mut merged = existing.clone();
                if let (Value::Object(merged), Value::Object(values)) = (&mut merged, &values) {
                    for (key, value) in values {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                if merged == existing {
                    Ok(existing)
                } else {
                    Ok(self.put(existing, &merged).await?.data)
                }
            }
            None => Ok(self.post(path, &values).await?.data),
        }
    }
}

/// Replaces every header of `target` that `source` sets with all of the
/// values from `source`. Names rejected by `keep` are left alone.
fn merge_headers(target: &mut HeaderMap, source: &HeaderMap, keep: impl Fn(&HeaderName) -> bool) {
    for name in source.keys() {
        if !keep(name) {
            continue;
        }
        target.remove(name);
        for value in source.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}

fn log_response(request: &TransportRequest, response: &TransportResponse) {
    let diagnostics = ResponseDiagnostics::from_headers(&response.headers);
    let request_id = diagnostics.request_id.as_deref().unwrap_or("(missing header)");
    let date = diagnostics
        .date_string()
        .unwrap_or_else(|| "(missing header)".to_string());

    tracing::debug!(
        method = %request.method,
        url = %request.url,
        status = response.status.as_u16(),
        x_request_id = %request_id,
        date = %date,
        ratelimit_remaining = ?diagnostics.ratelimit_remaining,
        "Request completed"
    );
    if response.status.is_server_error() {
        tracing::error!(
            status = response.status.as_u16(),
            x_request_id = %request_id,
            date = %date,
            "API server error; reference the request id and date when contacting support"
        );
    }
}

fn http_error(response: TransportResponse, canonical_path: &str) -> Error {
    let TransportResponse {
        status,
        headers,
        body,
    } = response;
    if status.is_server_error() {
        Error::Server {
            status,
            raw_response: body,
            headers,
            canonical_path: canonical_path.to_string(),
        }
    } else {
        let retry_after = ResponseDiagnostics::from_headers(&headers).retry_after;
        Error::Client {
            status,
            raw_response: body,
            headers,
            canonical_path: canonical_path.to_string(),
            retry_after,
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("its keys are: {}", keys.join(", "))
        }
        other => format!("its type is {}", json_type_name(other)),
    }
}

/// Decodes a successful response and extracts the entity from its envelope.
fn unwrap_response(
    response: TransportResponse,
    wrapping: &WrapSpec,
    canonical_path: String,
    latency: Duration,
    attempts: u32,
) -> Result<Response> {
    let TransportResponse {
        status,
        headers,
        body,
    } = response;

    let decoded = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&body) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    canonical_path = %canonical_path,
                    "Failed to decode response body as JSON"
                );
                return Err(Error::DeserializationFailed {
                    raw_response: body,
                    serde_error: e.to_string(),
                    status,
                    canonical_path,
                });
            }
        }
    };

    let unwrappable = !wrapping.requires_success || status.is_success();
    let data = match wrapping.response.as_deref() {
        Some(key) if unwrappable && !decoded.is_null() => {
            match wrapping::unwrap(decoded, Some(key)) {
                Ok(data) => data,
                Err(mismatch) => {
                    return Err(Error::SchemaMismatch {
                        status,
                        raw_response: body,
                        canonical_path,
                        expected: mismatch.expected,
                        found: mismatch.found,
                    })
                }
            }
        }
        _ => decoded,
    };

    Ok(Response {
        data,
        raw_body: body,
        status,
        headers,
        canonical_path,
        latency,
        attempts,
    })
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use pdrest::{ClientBuilder, RetryConfig};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), pdrest::Error> {
/// let client = ClientBuilder::new()
///     .oauth_token("pdus+_0XBPWQQ_a23a6d1f")
///     .timeout(Duration::from_secs(30))
///     .retry_config(RetryConfig::default().jitter_ceiling(Duration::from_secs(2)))
///     .default_header("X-Early-Access", "foo-bar")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<String>,
    flavor: Arc<dyn ApiFlavor>,
    tables: Option<Arc<ApiTables>>,
    auth: Option<AuthMethod>,
    default_from: Option<String>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    proxy: Option<String>,
    retry: RetryConfig,
    transport: Option<Arc<dyn Transport>>,
    page_size: u32,
    max_pages: u32,
    max_offset: u64,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` for the REST API v2 with default
    /// settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            flavor: Arc::new(RestApiV2),
            tables: None,
            auth: None,
            default_from: None,
            default_headers: HeaderMap::new(),
            timeout: Some(DEFAULT_TIMEOUT),
            proxy: None,
            retry: RetryConfig::default(),
            transport: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            max_offset: DEFAULT_MAX_OFFSET,
        }
    }

    /// Creates a builder configured from the environment:
    ///
    /// - `PAGERDUTY_API_KEY` (required)
    /// - `PAGERDUTY_AUTH_TYPE`: `token` (default), `bearer` or `oauth2`
    /// - `PAGERDUTY_FROM`: default `From` header
    /// - `PAGERDUTY_BASE_URL`: overrides the API's base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a value is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_env_vars(|name| std::env::var(name).ok())
    }

    fn from_env_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let key = var("PAGERDUTY_API_KEY").filter(|k| !k.is_empty()).ok_or_else(|| {
            Error::ConfigurationError("PAGERDUTY_API_KEY is not set".to_string())
        })?;
        let auth_type = var("PAGERDUTY_AUTH_TYPE").unwrap_or_else(|| "token".to_string());

        let mut builder = Self::new().auth(AuthMethod::from_type(&auth_type, key)?);
        if let Some(from) = var("PAGERDUTY_FROM") {
            builder = builder.default_from(from);
        }
        if let Some(base_url) = var("PAGERDUTY_BASE_URL") {
            builder = builder.base_url(base_url)?;
        }
        Ok(builder)
    }

    /// Overrides the API's base URL, e.g. for a proxy or a test server.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();
        Url::parse(url)?;
        self.base_url = Some(url.trim_end_matches('/').to_string());
        Ok(self)
    }

    /// Selects the API flavor. Defaults to [`RestApiV2`].
    pub fn flavor(mut self, flavor: impl ApiFlavor + 'static) -> Self {
        self.flavor = Arc::new(flavor);
        self
    }

    /// Replaces the flavor's lookup tables.
    pub fn tables(mut self, tables: Arc<ApiTables>) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Authenticates with a REST API key.
    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.auth(AuthMethod::Token(key.into()))
    }

    /// Authenticates with an OAuth access token.
    pub fn oauth_token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::Bearer(token.into()))
    }

    /// Sets the credentials.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Email address of the acting user, sent as the `From` header. Required
    /// by some write operations when using an account-level API key.
    pub fn default_from(mut self, email: impl Into<String>) -> Self {
        self.default_from = Some(email.into());
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-request timeout. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Routes all requests through a proxy. Without this the standard proxy
    /// environment variables apply.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Sets the retry configuration.
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Uses a custom transport instead of the default `reqwest` one.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Number of items requested per page when paginating. Defaults to 100.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Maximum number of page fetches in one iteration. Defaults to 10 000.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Highest `offset + limit` requested in offset pagination. Defaults to
    /// 10 000.
    pub fn max_offset(mut self, max_offset: u64) -> Self {
        self.max_offset = max_offset;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no credentials were provided or the configuration
    /// is invalid.
    pub fn build(self) -> Result<Client> {
        let auth = self
            .auth
            .ok_or_else(|| Error::ConfigurationError("An API key is required".to_string()))?;
        self.retry.validate()?;
        if self.page_size == 0 || self.max_pages == 0 {
            return Err(Error::ConfigurationError(
                "Page size and page limit must be at least 1".to_string(),
            ));
        }

        let base_url = match self.base_url {
            Some(base_url) => base_url,
            None => self.flavor.base_url().trim_end_matches('/').to_string(),
        };
        let tables = self.tables.unwrap_or_else(|| self.flavor.tables());

        let invalid = |e: http::header::InvalidHeaderValue| {
            Error::ConfigurationError(format!("Invalid header value: {}", e))
        };
        let mut base_headers = HeaderMap::new();
        base_headers.insert(ACCEPT, HeaderValue::from_str(self.flavor.accept()).map_err(invalid)?);
        let mut authorization = HeaderValue::from_str(&auth.header_value()).map_err(invalid)?;
        authorization.set_sensitive(true);
        base_headers.insert(AUTHORIZATION, authorization);
        base_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pdrest/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(from) = &self.default_from {
            base_headers.insert(FROM, HeaderValue::from_str(from).map_err(invalid)?);
        }
        merge_headers(&mut base_headers, &self.default_headers, |_| true);

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => {
                if self.proxy.is_some() {
                    tracing::warn!("Proxy setting is ignored when a custom transport is used");
                }
                transport
            }
            None => Arc::new(ReqwestTransport::with_proxy(self.proxy.as_deref())?),
        };

        tracing::debug!(
            api = self.flavor.name(),
            base_url = %base_url,
            key = %auth.truncated_key(),
            "Client configured"
        );

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                flavor: self.flavor,
                tables,
                base_url,
                auth,
                base_headers,
                retry: self.retry,
                timeout: self.timeout,
                page_size: self.page_size,
                max_pages: self.max_pages,
                max_offset: self.max_offset,
            }),
            session: Session::default(),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_individual_resource(canonical_path: &str) -> bool {
    canonical_path.rsplit('/').next().is_some_and(is_path_param)
}

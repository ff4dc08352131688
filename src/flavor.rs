//! API flavors: the per-API behavior layered on the shared request core.
//!
//! The REST API v2 and the integration APIs share one execution pipeline and
//! differ only in what is described by an [`ApiFlavor`]: the default base
//! URL, the `Accept` header, which methods are allowed, the lookup tables and
//! whether entity wrapping is applied.

use crate::tables::ApiTables;
use http::Method;
use std::fmt;
use std::sync::Arc;

/// The `Accept` header value for the REST API v2.
pub const REST_V2_ACCEPT: &str = "application/vnd.pagerduty+json;version=2";

/// Per-API behavior.
pub trait ApiFlavor: fmt::Debug + Send + Sync {
    /// A short name used in errors and logs.
    fn name(&self) -> &'static str;

    /// The API's base URL.
    fn base_url(&self) -> &str;

    /// The `Accept` header value.
    fn accept(&self) -> &str;

    /// Whether requests with `method` are allowed.
    fn permits(&self, method: &Method) -> bool;

    /// Canonical path, entity wrapper and pagination tables.
    fn tables(&self) -> Arc<ApiTables>;

    /// Whether entity wrapping applies to calls that don't opt out.
    fn auto_wrap(&self) -> bool {
        true
    }
}

/// The REST API v2.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestApiV2;

impl ApiFlavor for RestApiV2 {
    fn name(&self) -> &'static str {
        "REST v2"
    }

    fn base_url(&self) -> &str {
        "https://api.pagerduty.com"
    }

    fn accept(&self) -> &str {
        REST_V2_ACCEPT
    }

    fn permits(&self, method: &Method) -> bool {
        matches!(
            *method,
            Method::GET | Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        )
    }

    fn tables(&self) -> Arc<ApiTables> {
        ApiTables::rest_v2()
    }
}

/// An integration API built on the REST v2 conventions, with its own base
/// URL, tables and allowed methods.
///
/// # Examples
///
/// ```
/// use pdrest::flavor::{ApiFlavor, IntegrationApi};
/// use http::Method;
///
/// let jira = IntegrationApi::jira_cloud();
/// assert!(jira.permits(&Method::GET));
/// assert!(!jira.permits(&Method::POST));
/// ```
#[derive(Debug, Clone)]
pub struct IntegrationApi {
    name: &'static str,
    base_url: String,
    permitted_methods: Vec<Method>,
    tables: Arc<ApiTables>,
}

impl IntegrationApi {
    /// Describes an integration API.
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        permitted_methods: impl IntoIterator<Item = Method>,
        tables: Arc<ApiTables>,
    ) -> Self {
        Self {
            name,
            base_url: base_url.into(),
            permitted_methods: permitted_methods.into_iter().collect(),
            tables,
        }
    }

    /// The Jira Cloud integration API. Read-only.
    pub fn jira_cloud() -> Self {
        Self::new(
            "Jira Cloud integration",
            "https://api.pagerduty.com/integration-jira-cloud",
            [Method::GET],
            ApiTables::jira_cloud(),
        )
    }

    /// The Slack integration API.
    pub fn slack() -> Self {
        Self::new(
            "Slack integration",
            "https://api.pagerduty.com/integration-slack",
            [Method::GET, Method::POST, Method::PUT, Method::DELETE],
            ApiTables::slack(),
        )
    }

    /// The Slack integration API's workspace connection endpoints, served
    /// from a different host.
    pub fn slack_connections() -> Self {
        Self::new(
            "Slack integration connections",
            "https://app.pagerduty.com/integration-slack",
            [Method::GET, Method::POST, Method::PUT, Method::DELETE],
            ApiTables::slack_connections(),
        )
    }
}

impl ApiFlavor for IntegrationApi {
    fn name(&self) -> &'static str {
        self.name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn accept(&self) -> &str {
        "application/json"
    }

    fn permits(&self, method: &Method) -> bool {
        self.permitted_methods.contains(method)
    }

    fn tables(&self) -> Arc<ApiTables> {
        Arc::clone(&self.tables)
    }
}

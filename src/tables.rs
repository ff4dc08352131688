//! Immutable per-API lookup tables.
//!
//! An [`ApiTables`] bundles the three read-only inputs that drive
//! canonicalization, entity wrapping and pagination-mode selection. Tables
//! are loaded once and shared by reference between clients; changing them
//! means building a new client.

mod rest_v2;

use crate::canonical::{canonicalize, CanonicalPathTable, Resolved};
use crate::wrapping::{resolve_wrapping, EntityWrapperTable, WrapSpec};
use crate::Result;
use http::Method;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// How a collection endpoint paginates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// Numeric `offset`/`limit` with a `more` continuation flag.
    Offset,
    /// Opaque continuation token.
    Cursor,
}

/// Canonical paths, entity wrapper overrides and cursor-paginated paths for
/// one API.
///
/// # Examples
///
/// ```
/// use pdrest::tables::{ApiTables, PaginationMode};
///
/// let tables: ApiTables = serde_json::from_str(r#"{
///     "canonical_paths": ["/widgets", "/widgets/{id}", "/widgets/{id}/audit/records"],
///     "entity_wrappers": {"GET /widgets/{id}/audit/records": "records"},
///     "cursor_paths": ["/widgets/{id}/audit/records"]
/// }"#).unwrap();
///
/// assert_eq!(tables.pagination_mode("/widgets"), PaginationMode::Offset);
/// assert_eq!(tables.pagination_mode("/widgets/{id}/audit/records"), PaginationMode::Cursor);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTables {
    #[serde(default)]
    canonical_paths: CanonicalPathTable,
    #[serde(default)]
    entity_wrappers: EntityWrapperTable,
    #[serde(default)]
    cursor_paths: HashSet<String>,
}

impl ApiTables {
    /// Assembles tables from their parts.
    pub fn new(
        canonical_paths: CanonicalPathTable,
        entity_wrappers: EntityWrapperTable,
        cursor_paths: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            canonical_paths,
            entity_wrappers,
            cursor_paths: cursor_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Tables with no entries: every decision falls through to the heuristic
    /// tier and every collection paginates by offset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses tables from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid API tables: {e}")))
    }

    /// The built-in tables for the REST API v2, loaded once per process.
    pub fn rest_v2() -> Arc<ApiTables> {
        static TABLES: OnceLock<Arc<ApiTables>> = OnceLock::new();
        TABLES
            .get_or_init(|| {
                Arc::new(Self {
                    canonical_paths: CanonicalPathTable::from_static(
                        rest_v2::REST_V2_CANONICAL_PATHS,
                    ),
                    entity_wrappers: EntityWrapperTable::from_static(rest_v2::REST_V2_WRAPPERS),
                    cursor_paths: rest_v2::REST_V2_CURSOR_PATHS
                        .iter()
                        .map(|p| p.to_string())
                        .collect(),
                })
            })
            .clone()
    }

    /// Tables for the Jira Cloud integration API.
    pub fn jira_cloud() -> Arc<ApiTables> {
        static TABLES: OnceLock<Arc<ApiTables>> = OnceLock::new();
        TABLES
            .get_or_init(|| {
                Arc::new(Self {
                    canonical_paths: CanonicalPathTable::from_static(&[
                        "/accounts_mappings",
                        "/accounts_mappings/{id}",
                    ]),
                    entity_wrappers: EntityWrapperTable::from_static(&[(
                        "GET /accounts_mappings/{id}",
                        None,
                        None,
                    )]),
                    cursor_paths: HashSet::new(),
                })
            })
            .clone()
    }

    /// Tables for the Slack integration API.
    pub fn slack() -> Arc<ApiTables> {
        static TABLES: OnceLock<Arc<ApiTables>> = OnceLock::new();
        TABLES
            .get_or_init(|| {
                Arc::new(Self {
                    canonical_paths: CanonicalPathTable::from_static(&[
                        "/incidents/{incident_id}/dedicated_channel",
                        "/incidents/{incident_id}/notification_channels",
                    ]),
                    entity_wrappers: EntityWrapperTable::from_static(&[
                        (
                            "* /incidents/{incident_id}/dedicated_channel",
                            Some("channel"),
                            Some("channel"),
                        ),
                        (
                            "GET /incidents/{incident_id}/notification_channels",
                            Some("channels"),
                            Some("channels"),
                        ),
                        ("POST /incidents/{incident_id}/notification_channels", None, None),
                    ]),
                    cursor_paths: HashSet::new(),
                })
            })
            .clone()
    }

    /// Tables for the Slack integration API's workspace connection endpoints.
    pub fn slack_connections() -> Arc<ApiTables> {
        static TABLES: OnceLock<Arc<ApiTables>> = OnceLock::new();
        TABLES
            .get_or_init(|| {
                Arc::new(Self {
                    canonical_paths: CanonicalPathTable::from_static(&[
                        "/workspaces/{slack_team_id}/connections",
                        "/workspaces/{slack_team_id}/connections/{connection_id}",
                    ]),
                    entity_wrappers: EntityWrapperTable::from_static(&[
                        (
                            "GET /workspaces/{slack_team_id}/connections",
                            Some("slack_connections"),
                            Some("slack_connections"),
                        ),
                        (
                            "POST /workspaces/{slack_team_id}/connections",
                            Some("slack_connection"),
                            Some("slack_connection"),
                        ),
                        (
                            "PUT /workspaces/{slack_team_id}/connections/{connection_id}",
                            Some("slack_connection"),
                            Some("slack_connection"),
                        ),
                    ]),
                    cursor_paths: HashSet::new(),
                })
            })
            .clone()
    }

    /// The canonical path table.
    pub fn canonical_paths(&self) -> &CanonicalPathTable {
        &self.canonical_paths
    }

    /// The entity wrapper override table.
    pub fn entity_wrappers(&self) -> &EntityWrapperTable {
        &self.entity_wrappers
    }

    /// Canonicalizes `url` under `base_url` against these tables.
    pub fn canonicalize(&self, base_url: &str, url: &str) -> Result<Resolved<String>> {
        canonicalize(&self.canonical_paths, base_url, url)
    }

    /// Resolves wrapping for a method and canonical path.
    pub fn resolve_wrapping(&self, method: &Method, canonical_path: &str) -> Resolved<WrapSpec> {
        resolve_wrapping(&self.entity_wrappers, method, canonical_path)
    }

    /// The pagination protocol of a collection endpoint.
    pub fn pagination_mode(&self, canonical_path: &str) -> PaginationMode {
        if self.cursor_paths.contains(canonical_path) {
            PaginationMode::Cursor
        } else {
            PaginationMode::Offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::Tier;

    const BASE: &str = "https://api.pagerduty.com";

    #[test]
    fn test_rest_v2_tables_are_shared() {
        let a = ApiTables::rest_v2();
        let b = ApiTables::rest_v2();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.canonical_paths().len() > 200);
        assert!(!a.entity_wrappers().is_empty());
    }

    #[test]
    fn test_rest_v2_canonical_paths() {
        let tables = ApiTables::rest_v2();
        let cases = [
            ("/users/PAM4FGS", "/users/{id}"),
            ("/users", "/users"),
            ("/users/me", "/users/me"),
            ("/services/PSVC123/integrations/PINT456", "/services/{id}/integrations/{integration_id}"),
            ("/event_orchestrations/services/PSVC123", "/event_orchestrations/services/{service_id}"),
        ];
        for (url, expected) in cases {
            let resolved = tables.canonicalize(BASE, url).unwrap();
            assert_eq!(resolved.value, expected, "url: {url}");
            assert_eq!(resolved.tier, Tier::Table);
        }
    }

    #[test]
    fn test_rest_v2_wrapping() {
        let tables = ApiTables::rest_v2();

        let resolved = tables.resolve_wrapping(&Method::GET, "/users/{id}");
        assert_eq!(resolved.value, WrapSpec::same("user"));
        assert_eq!(resolved.tier, Tier::Heuristic);

        let resolved = tables.resolve_wrapping(&Method::GET, "/escalation_policies");
        assert_eq!(resolved.value, WrapSpec::same("escalation_policies"));

        let resolved = tables.resolve_wrapping(&Method::PUT, "/incidents/{id}/merge");
        assert_eq!(resolved.value.request.as_deref(), Some("source_incidents"));
        assert_eq!(resolved.value.response.as_deref(), Some("incident"));
        assert_eq!(resolved.tier, Tier::Table);

        let resolved = tables.resolve_wrapping(&Method::GET, "/event_orchestrations/services/{service_id}");
        assert_eq!(resolved.value, WrapSpec::same("orchestration_path"));

        let resolved = tables.resolve_wrapping(&Method::POST, "/analytics/raw/incidents");
        assert!(resolved.value.is_none());
    }

    #[test]
    fn test_rest_v2_pagination_mode() {
        let tables = ApiTables::rest_v2();
        assert_eq!(tables.pagination_mode("/audit/records"), PaginationMode::Cursor);
        assert_eq!(tables.pagination_mode("/users/{id}/audit/records"), PaginationMode::Cursor);
        assert_eq!(tables.pagination_mode("/users"), PaginationMode::Offset);
    }

    #[test]
    fn test_integration_tables() {
        let jira = ApiTables::jira_cloud();
        let base = "https://api.pagerduty.com/integration-jira-cloud";
        let resolved = jira.canonicalize(base, "/accounts_mappings/PABC123").unwrap();
        assert_eq!(resolved.value, "/accounts_mappings/{id}");
        assert!(jira.resolve_wrapping(&Method::GET, &resolved.value).value.is_none());

        let slack = ApiTables::slack();
        let resolved = slack.resolve_wrapping(&Method::GET, "/incidents/{incident_id}/notification_channels");
        assert_eq!(resolved.value, WrapSpec::same("channels"));
        let resolved = slack.resolve_wrapping(&Method::DELETE, "/incidents/{incident_id}/dedicated_channel");
        assert_eq!(resolved.value, WrapSpec::same("channel"));
    }

    #[test]
    fn test_empty_tables() {
        let tables = ApiTables::empty();
        let resolved = tables.canonicalize(BASE, "/widgets/PWID123").unwrap();
        assert_eq!(resolved.value, "/widgets/{id}");
        assert_eq!(resolved.tier, Tier::Heuristic);
        assert_eq!(tables.pagination_mode("/widgets"), PaginationMode::Offset);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(ApiTables::from_json(r#"{"canonical_paths": ["widgets"]}"#).is_err());
        assert!(ApiTables::from_json(r#"{"entity_wrappers": {"/widgets": "widget"}}"#).is_err());
    }
}

//! Entity wrapping: nesting request bodies under, and extracting response
//! bodies from, a single-key envelope.
//!
//! The API nests entities in a one-property object named after the resource,
//! e.g. `{"user": {...}}` for a single user and `{"users": [...]}` for a page
//! of them. Which key applies to an endpoint is decided in two tiers: an
//! explicit [`EntityWrapperTable`] entry for the method and canonical path,
//! or, failing that, inference from the path's shape ([`infer_wrapper`]).

use crate::canonical::{is_path_param, Resolved};
use crate::{Error, Result};
use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Irregular plural/singular pairs. Matched as suffixes so that compound
/// names like `incident_statuses` are covered.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("statuses", "status"),
    ("analyses", "analysis"),
    ("addresses", "address"),
    ("aliases", "alias"),
    ("indices", "index"),
    ("people", "person"),
    ("series", "series"),
];

/// Singularizes a collection name, e.g. `escalation_policies` → `escalation_policy`.
///
/// # Examples
///
/// ```
/// use pdrest::wrapping::singular_name;
///
/// assert_eq!(singular_name("users"), "user");
/// assert_eq!(singular_name("escalation_policies"), "escalation_policy");
/// assert_eq!(singular_name("incident_statuses"), "incident_status");
/// ```
pub fn singular_name(plural: &str) -> String {
    for (irregular, singular) in IRREGULAR_PLURALS {
        if let Some(stem) = plural.strip_suffix(irregular) {
            return format!("{stem}{singular}");
        }
    }
    if let Some(stem) = plural.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = plural.strip_suffix('s') {
        stem.to_string()
    } else {
        plural.to_string()
    }
}

/// Pluralizes an object type name as found in an entity's `type` property,
/// e.g. `escalation_policy_reference` → `escalation_policies`.
pub fn plural_name(object_type: &str) -> String {
    let object_type = object_type
        .strip_suffix("_reference")
        .unwrap_or(object_type);
    for (plural, irregular) in IRREGULAR_PLURALS {
        if let Some(stem) = object_type.strip_suffix(irregular) {
            return format!("{stem}{plural}");
        }
    }
    if let Some(stem) = object_type.strip_suffix('y') {
        format!("{stem}ies")
    } else {
        format!("{object_type}s")
    }
}

fn default_requires_success() -> bool {
    true
}

/// Envelope keys for one endpoint.
///
/// `None` for either side means the body is passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WrapSpec {
    /// Envelope key for the request body.
    #[serde(default)]
    pub request: Option<String>,
    /// Envelope key for the response body.
    #[serde(default)]
    pub response: Option<String>,
    /// Whether the response must have a 2xx status before it is unwrapped.
    /// When `false`, any non-error (2xx/3xx) response is unwrapped.
    #[serde(default = "default_requires_success")]
    pub requires_success: bool,
}

impl WrapSpec {
    /// No wrapping in either direction.
    pub fn none() -> Self {
        Self::split(None::<String>, None::<String>)
    }

    /// The same envelope key for request and response.
    pub fn same(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::split(Some(key.clone()), Some(key))
    }

    /// Distinct envelope keys for request and response.
    pub fn split(request: Option<impl Into<String>>, response: Option<impl Into<String>>) -> Self {
        Self {
            request: request.map(Into::into),
            response: response.map(Into::into),
            requires_success: true,
        }
    }

    /// Sets whether unwrapping requires a 2xx response.
    pub fn requires_success(mut self, requires_success: bool) -> Self {
        self.requires_success = requires_success;
        self
    }

    /// Whether neither body is wrapped.
    pub fn is_none(&self) -> bool {
        self.request.is_none() && self.response.is_none()
    }
}

/// Table entry as written in configuration: a key, `null`, a
/// `[request, response]` pair, or a full [`WrapSpec`] object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WrapValue {
    /// One key for both directions, or `null` for none.
    Same(Option<String>),
    /// `[request, response]`.
    Split(Option<String>, Option<String>),
    /// Explicit object form.
    Full(WrapSpec),
}

impl From<WrapValue> for WrapSpec {
    fn from(value: WrapValue) -> Self {
        match value {
            WrapValue::Same(Some(key)) => WrapSpec::same(key),
            WrapValue::Same(None) => WrapSpec::none(),
            WrapValue::Split(request, response) => WrapSpec::split(request, response),
            WrapValue::Full(spec) => spec,
        }
    }
}

/// Explicit entity wrapping overrides keyed by `"METHOD /canonical/path"`,
/// where `METHOD` may be `*` to match any method.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "HashMap<String, WrapValue>")]
pub struct EntityWrapperTable {
    entries: HashMap<String, WrapSpec>,
}

impl EntityWrapperTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. `endpoint` is `"METHOD /path"` or `"* /path"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint pattern is malformed.
    pub fn with_entry(mut self, endpoint: &str, spec: WrapSpec) -> Result<Self> {
        let key = Self::normalize_key(endpoint)?;
        self.entries.insert(key, spec);
        Ok(self)
    }

    /// Builds a table from compiled-in `(endpoint, request, response)`
    /// entries whose endpoint keys are already in normal form.
    pub(crate) fn from_static(entries: &[(&str, Option<&str>, Option<&str>)]) -> Self {
        let entries = entries
            .iter()
            .map(|(endpoint, request, response)| {
                (endpoint.to_string(), WrapSpec::split(*request, *response))
            })
            .collect();
        Self { entries }
    }

    fn normalize_key(endpoint: &str) -> Result<String> {
        let invalid = || {
            Error::ConfigurationError(format!(
                "Invalid entity wrapper endpoint pattern \"{endpoint}\"; expected \"METHOD /path\""
            ))
        };
        let (method, path) = endpoint.split_once(' ').ok_or_else(invalid)?;
        if !path.starts_with('/') {
            return Err(invalid());
        }
        let method = if method == "*" {
            method.to_string()
        } else {
            Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| invalid())?
                .to_string()
        };
        Ok(format!("{method} {path}"))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry for a method and canonical path. An exact-method
    /// entry takes precedence over a `*` entry.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&WrapSpec> {
        self.entries
            .get(&format!("{} {}", method.as_str(), path))
            .or_else(|| self.entries.get(&format!("* {path}")))
    }
}

impl TryFrom<HashMap<String, WrapValue>> for EntityWrapperTable {
    type Error = Error;

    fn try_from(raw: HashMap<String, WrapValue>) -> Result<Self> {
        raw.into_iter()
            .try_fold(Self::new(), |table, (endpoint, value)| {
                table.with_entry(&endpoint, value.into())
            })
    }
}

/// Infers the envelope key from the shape of a canonical path.
///
/// - Individual resource (`/users/{id}`): singular of the collection, `user`.
/// - Creating in a collection (`POST /users`): singular, `user`.
/// - Anything else on a collection (`GET /users`, multi-update `PUT`):
///   the collection name itself, `users`.
///
/// Returns `None` when the path gives nothing to infer from, e.g. a resource
/// whose parent node is itself a parameter.
pub fn infer_wrapper(method: &Method, path: &str) -> Option<String> {
    let nodes: Vec<&str> = path.split('/').skip(1).collect();
    let last = *nodes.last()?;
    if is_path_param(last) {
        let parent = *nodes.get(nodes.len().checked_sub(2)?)?;
        if parent.is_empty() || is_path_param(parent) {
            None
        } else {
            Some(singular_name(parent))
        }
    } else if last.is_empty() {
        None
    } else if *method == Method::POST {
        Some(singular_name(last))
    } else {
        Some(last.to_string())
    }
}

/// Decides the wrapping for an endpoint: table entry first, inference second.
///
/// # Examples
///
/// ```
/// use pdrest::wrapping::{resolve_wrapping, EntityWrapperTable, WrapSpec};
/// use pdrest::canonical::Tier;
/// use http::Method;
///
/// let table = EntityWrapperTable::new()
///     .with_entry("PUT /incidents/{id}/merge", WrapSpec::split(Some("source_incidents"), Some("incident")))
///     .unwrap();
///
/// let resolved = resolve_wrapping(&table, &Method::GET, "/users/{id}");
/// assert_eq!(resolved.value, WrapSpec::same("user"));
/// assert_eq!(resolved.tier, Tier::Heuristic);
///
/// let resolved = resolve_wrapping(&table, &Method::PUT, "/incidents/{id}/merge");
/// assert_eq!(resolved.value.request.as_deref(), Some("source_incidents"));
/// assert_eq!(resolved.tier, Tier::Table);
/// ```
pub fn resolve_wrapping(
    table: &EntityWrapperTable,
    method: &Method,
    path: &str,
) -> Resolved<WrapSpec> {
    match table.lookup(method, path) {
        Some(spec) => Resolved::table(spec.clone()),
        None => Resolved::heuristic(match infer_wrapper(method, path) {
            Some(key) => WrapSpec::same(key),
            None => WrapSpec::none(),
        }),
    }
}

/// Nests `body` under `key`. A body that already is an object carrying `key`
/// is returned unchanged.
pub fn wrap(body: Value, key: Option<&str>) -> Value {
    match key {
        Some(key) if !matches!(&body, Value::Object(map) if map.contains_key(key)) => {
            let mut envelope = Map::new();
            envelope.insert(key.to_string(), body);
            Value::Object(envelope)
        }
        _ => body,
    }
}

/// The response body did not have the expected envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeMismatch {
    /// The key that was expected.
    pub expected: String,
    /// What the body looked like instead.
    pub found: String,
}

/// Extracts the value under `key` from a decoded response body.
pub fn unwrap(body: Value, key: Option<&str>) -> std::result::Result<Value, EnvelopeMismatch> {
    let Some(key) = key else {
        return Ok(body);
    };
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(value) => Ok(value),
            None => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                Err(EnvelopeMismatch {
                    expected: key.to_string(),
                    found: format!("its keys are: {}", keys.join(", ")),
                })
            }
        },
        other => Err(EnvelopeMismatch {
            expected: key.to_string(),
            found: format!("its type is {}", json_type_name(&other)),
        }),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

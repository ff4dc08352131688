//! URL normalization and path canonicalization.
//!
//! A canonical path is the path of an API URL with its variable identifier
//! segments replaced by placeholders, e.g. `/users/PAM4FGS/contact_methods`
//! becomes `/users/{id}/contact_methods`. It is the lookup key for entity
//! wrapping and pagination-mode decisions.
//!
//! Canonicalization is two-tiered: the URL is first matched against the
//! [`CanonicalPathTable`]; when no single template matches, a segment-shape
//! heuristic produces a best-effort template instead. The tier that produced
//! the answer is reported in [`Resolved::tier`].

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;

/// The placeholder substituted for identifier segments by the heuristic tier.
pub const PLACEHOLDER: &str = "{id}";

/// Which tier of a two-tier lookup produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// An explicit table entry.
    Table,
    /// The naming/shape heuristic.
    Heuristic,
}

/// A value together with the tier that resolved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value.
    pub value: T,
    /// How it was resolved.
    pub tier: Tier,
}

impl<T> Resolved<T> {
    pub(crate) fn table(value: T) -> Self {
        Self {
            value,
            tier: Tier::Table,
        }
    }

    pub(crate) fn heuristic(value: T) -> Self {
        Self {
            value,
            tier: Tier::Heuristic,
        }
    }
}

/// Whether a node of a canonical path is a variable parameter, i.e. `{id}`.
pub fn is_path_param(node: &str) -> bool {
    node.len() > 1 && node.starts_with('{') && node.ends_with('}')
}

/// Whether a concrete path segment looks like an opaque identifier: purely
/// numeric, a 7- or 14-character upper-case alphanumeric token, or a UUID.
pub fn looks_like_identifier(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    let opaque_token = matches!(segment.len(), 7 | 14)
        && segment
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    opaque_token || is_uuid(segment)
}

fn is_uuid(segment: &str) -> bool {
    segment.len() == 36
        && segment.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// One node of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(String),
    Param,
}

/// A canonical path template such as `/users/{id}/contact_methods`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    nodes: Vec<Node>,
}

impl PathTemplate {
    /// Parses a template. It must start with `/`.
    pub fn parse(template: &str) -> Result<Self> {
        if !template.starts_with('/') {
            return Err(Error::ConfigurationError(format!(
                "Canonical path template {template} must start with '/'"
            )));
        }
        Ok(Self::parse_trusted(template))
    }

    fn parse_trusted(template: &str) -> Self {
        let nodes = segments(template)
            .map(|node| {
                if is_path_param(node) {
                    Node::Param
                } else {
                    Node::Literal(node.to_string())
                }
            })
            .collect();
        Self {
            raw: template.to_string(),
            nodes,
        }
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of literal nodes matching `path_nodes`, or `None` if the
    /// template does not match.
    fn match_score(&self, path_nodes: &[&str]) -> Option<usize> {
        if self.nodes.len() != path_nodes.len() {
            return None;
        }
        let mut literals = 0;
        for (node, segment) in self.nodes.iter().zip(path_nodes) {
            match node {
                Node::Param => {}
                Node::Literal(literal) if literal == segment => literals += 1,
                Node::Literal(_) => return None,
            }
        }
        Some(literals)
    }
}

/// The immutable set of known canonical path templates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct CanonicalPathTable {
    templates: Vec<PathTemplate>,
    // literal keywords seen at each node position
    literals: Vec<HashSet<String>>,
}

impl CanonicalPathTable {
    /// Builds a table from template strings.
    pub fn new<I, S>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let templates = templates
            .into_iter()
            .map(|t| PathTemplate::parse(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_templates(templates))
    }

    /// Builds a table from compiled-in templates known to be well formed.
    pub(crate) fn from_static(templates: &[&str]) -> Self {
        Self::from_templates(templates.iter().map(|t| PathTemplate::parse_trusted(t)).collect())
    }

    fn from_templates(templates: Vec<PathTemplate>) -> Self {
        let mut literals: Vec<HashSet<String>> = Vec::new();
        for template in &templates {
            for (i, node) in template.nodes.iter().enumerate() {
                if literals.len() <= i {
                    literals.resize_with(i + 1, HashSet::new);
                }
                if let Node::Literal(literal) = node {
                    literals[i].insert(literal.clone());
                }
            }
        }

        Self {
            templates,
            literals,
        }
    }

    /// Number of templates in the table.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Whether `path` is one of the templates, verbatim.
    pub fn contains(&self, path: &str) -> bool {
        self.templates.iter().any(|t| t.raw == path)
    }

    fn is_literal_at(&self, position: usize, segment: &str) -> bool {
        self.literals
            .get(position)
            .is_some_and(|set| set.contains(segment))
    }

    /// Finds the template matching the given path nodes. An exact textual
    /// match wins; otherwise the single template with the most matching
    /// literal nodes. Ties are unresolved.
    fn lookup(&self, path: &str, path_nodes: &[&str]) -> Option<&PathTemplate> {
        if let Some(exact) = self.templates.iter().find(|t| t.raw == path) {
            return Some(exact);
        }

        let mut best: Option<(&PathTemplate, usize)> = None;
        let mut tied = false;
        for template in &self.templates {
            let Some(score) = template.match_score(path_nodes) else {
                continue;
            };
            match best {
                Some((_, best_score)) if score < best_score => {}
                Some((_, best_score)) if score == best_score => tied = true,
                _ => {
                    best = Some((template, score));
                    tied = false;
                }
            }
        }

        if tied {
            tracing::warn!(
                path = %path,
                "Path matches more than one canonical template equally well"
            );
            return None;
        }
        best.map(|(template, _)| template)
    }
}

impl TryFrom<Vec<String>> for CanonicalPathTable {
    type Error = Error;

    fn try_from(templates: Vec<String>) -> Result<Self> {
        Self::new(templates)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').skip(1)
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Resolves a path or URL to a fully qualified URL under `base_url`.
///
/// Relative paths (with or without a leading slash) are joined to the base;
/// absolute URLs are accepted as-is only if they lie under the base. Query
/// strings are preserved. Normalizing an already normalized URL is a no-op.
///
/// # Examples
///
/// ```
/// use pdrest::canonical::normalize_url;
///
/// let base = "https://api.pagerduty.com";
/// assert_eq!(normalize_url(base, "users").unwrap(), "https://api.pagerduty.com/users");
/// assert_eq!(normalize_url(base, "/users?limit=1").unwrap(), "https://api.pagerduty.com/users?limit=1");
/// assert!(normalize_url(base, "https://events.pagerduty.com/v2/enqueue").is_err());
/// ```
pub fn normalize_url(base_url: &str, url: &str) -> Result<String> {
    let base = base_url.trim_end_matches('/');
    if is_absolute(url) {
        let under_base = url
            .strip_prefix(base)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'));
        if under_base {
            Ok(url.to_string())
        } else {
            Err(Error::Url(format!(
                "URL {url} does not start with the API base URL {base}"
            )))
        }
    } else {
        Ok(format!("{}/{}", base, url.trim_start_matches('/')))
    }
}

/// Extracts the leading-slash-relative path of `url` under `base_url`,
/// without query string or trailing slash.
pub fn relative_path(base_url: &str, url: &str) -> Result<String> {
    let full_url = normalize_url(base_url, url)?;
    let base = base_url.trim_end_matches('/');
    let rest = &full_url[base.len()..];
    let path = rest.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(path.to_string())
    }
}

/// Reduces a URL to its canonical path.
///
/// Only fails if `url` cannot be normalized under `base_url`; unknown
/// endpoints still get a best-effort template from the heuristic tier.
///
/// # Examples
///
/// ```
/// use pdrest::canonical::{canonicalize, CanonicalPathTable, Tier};
///
/// let table = CanonicalPathTable::new(["/users", "/users/{id}", "/users/me"]).unwrap();
/// let base = "https://api.pagerduty.com";
///
/// let resolved = canonicalize(&table, base, "/users/PAM4FGS").unwrap();
/// assert_eq!(resolved.value, "/users/{id}");
/// assert_eq!(resolved.tier, Tier::Table);
///
/// let resolved = canonicalize(&table, base, "/teams/PQ1W2E3/members").unwrap();
/// assert_eq!(resolved.value, "/teams/{id}/members");
/// assert_eq!(resolved.tier, Tier::Heuristic);
/// ```
pub fn canonicalize(
    table: &CanonicalPathTable,
    base_url: &str,
    url: &str,
) -> Result<Resolved<String>> {
    let path = relative_path(base_url, url)?;
    let path_nodes: Vec<&str> = segments(&path).collect();

    if let Some(template) = table.lookup(&path, &path_nodes) {
        return Ok(Resolved::table(template.raw.clone()));
    }

    let mut templated = String::with_capacity(path.len());
    for (i, segment) in path_nodes.iter().enumerate() {
        templated.push('/');
        if !is_path_param(segment)
            && looks_like_identifier(segment)
            && !table.is_literal_at(i, segment)
        {
            templated.push_str(PLACEHOLDER);
        } else {
            templated.push_str(segment);
        }
    }
    if templated.is_empty() {
        templated.push('/');
    }

    if !table.is_empty() {
        tracing::debug!(
            url = %url,
            canonical_path = %templated,
            "URL does not match a known canonical path; using inferred template"
        );
    }
    Ok(Resolved::heuristic(templated))
}

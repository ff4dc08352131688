//! Lazy iteration over collection endpoints.
//!
//! A [`Pager`] fetches one page at a time, choosing offset or cursor
//! pagination from the endpoint's canonical path, and yields the items of
//! each page in order. Nothing is requested until the first item is pulled,
//! and consumers that stop early (such as [`Pager::find`]) fetch no further
//! pages.

use crate::{
    client::is_individual_resource,
    metadata::RequestMetadata,
    tables::PaginationMode,
    wrapping::{self, json_type_name},
    Client, Error,
};
use futures::Stream;
use http::Method;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Errors from iterating over a collection.
#[derive(thiserror::Error, Debug)]
pub enum PaginationError {
    /// The page ceiling was reached before the collection was exhausted.
    #[error("Pagination of {canonical_path} exceeded the limit of {limit} pages")]
    LimitExceeded {
        /// Canonical path of the collection
        canonical_path: String,
        /// The page ceiling
        limit: u32,
    },

    /// A page request failed.
    #[error(transparent)]
    Request(#[from] Error),
}

impl PaginationError {
    /// Canonical path of the collection, if known.
    pub fn canonical_path(&self) -> Option<&str> {
        match self {
            PaginationError::LimitExceeded { canonical_path, .. } => Some(canonical_path),
            PaginationError::Request(e) => e.canonical_path(),
        }
    }
}

/// How [`Pager::find_by`] compares attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Exact string equality.
    Exact,
    /// Equality ignoring case.
    #[default]
    CaseInsensitive,
    /// Substring, ignoring case.
    Contains,
}

impl MatchMode {
    /// Whether `candidate` matches `query`.
    pub fn matches(self, candidate: &str, query: &str) -> bool {
        match self {
            MatchMode::Exact => candidate == query,
            MatchMode::CaseInsensitive => candidate.to_lowercase() == query.to_lowercase(),
            MatchMode::Contains => candidate.to_lowercase().contains(&query.to_lowercase()),
        }
    }
}

type ItemHook<'a> = Box<dyn FnMut(&Value, u64, Option<u64>) + Send + 'a>;

#[derive(Debug, Clone)]
struct Plan {
    canonical_path: String,
    envelope: String,
    mode: PaginationMode,
    limit: u32,
}

/// A lazy, forward-only iterator over a collection endpoint.
///
/// Created by [`Client::list`] and [`Client::list_with`]. The pager borrows
/// the client mutably, so page requests go through the client's retry and
/// metrics like any other call.
///
/// # Examples
///
/// ```no_run
/// use pdrest::Client;
///
/// # async fn example() -> Result<(), pdrest::PaginationError> {
/// let mut client = Client::builder().api_key("my-key").build()?;
///
/// let mut incidents = client
///     .list("/incidents")
///     .array_param("statuses", ["triggered", "acknowledged"])
///     .with_total()
///     .on_item(|incident, n, total| {
///         let total = total.map_or("?".to_string(), |t| t.to_string());
///         println!("{n}/{total}: {}", incident["id"]);
///     });
///
/// while let Some(incident) = incidents.try_next().await? {
///     if incident["urgency"] == "high" {
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Pager<'a> {
    client: &'a mut Client,
    request: RequestMetadata,
    page_size: Option<u32>,
    with_total: bool,
    item_hook: Option<ItemHook<'a>>,
    plan: Option<Plan>,
    offset: u64,
    cursor: Option<String>,
    done: bool,
    buffer: VecDeque<Value>,
    pages_fetched: u32,
    items_yielded: u64,
    total: Option<u64>,
}

impl fmt::Debug for Pager<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("path", &self.request.path)
            .field("plan", &self.plan)
            .field("offset", &self.offset)
            .field("cursor", &self.cursor)
            .field("done", &self.done)
            .field("pages_fetched", &self.pages_fetched)
            .field("items_yielded", &self.items_yielded)
            .finish_non_exhaustive()
    }
}

impl<'a> Pager<'a> {
    pub(crate) fn new(client: &'a mut Client, request: RequestMetadata) -> Self {
        let offset = request
            .query_param("offset")
            .and_then(|offset| offset.parse().ok())
            .unwrap_or(0);
        Self {
            client,
            request,
            page_size: None,
            with_total: false,
            item_hook: None,
            plan: None,
            offset,
            cursor: None,
            done: false,
            buffer: VecDeque::new(),
            pages_fetched: 0,
            items_yielded: 0,
            total: None,
        }
    }

    /// Items requested per page, overriding the client default.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Asks offset-paginated endpoints for the total record count, which is
    /// then passed to the item hook.
    pub fn with_total(mut self) -> Self {
        self.with_total = true;
        self
    }

    /// Calls `hook` with every item yielded, its 1-based position and the
    /// total record count when known.
    pub fn on_item(mut self, hook: impl FnMut(&Value, u64, Option<u64>) + Send + 'a) -> Self {
        self.item_hook = Some(Box::new(hook));
        self
    }

    /// Adds a query parameter to every page request.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.request = self.request.with_query_param(key, value);
        self
    }

    /// Adds an array query parameter to every page request.
    pub fn array_param<I>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.request = self.request.with_query_array(key, values);
        self
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Total record count reported by the last page, if any.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Fetches the next page and returns its items, or `None` once the
    /// collection is exhausted. The item hook is not called for pages taken
    /// this way.
    ///
    /// After an error the pager is finished.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>, PaginationError> {
        if self.done {
            return Ok(None);
        }
        let result = self.fetch_page().await;
        if result.is_err() {
            self.done = true;
        }
        result
    }

    /// The next item, fetching a page when the current one is used up.
    pub async fn try_next(&mut self) -> Result<Option<Value>, PaginationError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                self.items_yielded += 1;
                if let Some(hook) = self.item_hook.as_mut() {
                    hook(&item, self.items_yielded, self.total);
                }
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(page) => self.buffer.extend(page),
                None => return Ok(None),
            }
        }
    }

    /// Collects every remaining item.
    pub async fn collect_vec(mut self) -> Result<Vec<Value>, PaginationError> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Collects every remaining item keyed by its `by` attribute. Items
    /// without the attribute are skipped; later items win on duplicate keys.
    pub async fn collect_map(mut self, by: &str) -> Result<HashMap<String, Value>, PaginationError> {
        let mut items = HashMap::new();
        while let Some(item) = self.try_next().await? {
            let key = match item.get(by).and_then(attribute_text) {
                Some(key) => key,
                None => {
                    tracing::warn!(
                        key = by,
                        path = %self.request.path,
                        "Skipping item without key attribute"
                    );
                    continue;
                }
            };
            items.insert(key, item);
        }
        Ok(items)
    }

    /// The first remaining item satisfying `predicate`. No pages are
    /// fetched after the match.
    pub async fn find(
        mut self,
        mut predicate: impl FnMut(&Value) -> bool,
    ) -> Result<Option<Value>, PaginationError> {
        while let Some(item) = self.try_next().await? {
            if predicate(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// The first remaining item whose `attribute` matches `value`. Numbers and
    /// booleans are compared by their JSON text.
    pub async fn find_by(
        self,
        attribute: &str,
        value: &str,
        mode: MatchMode,
    ) -> Result<Option<Value>, PaginationError> {
        self.find(|item| {
            item.get(attribute)
                .and_then(attribute_text)
                .is_some_and(|candidate| mode.matches(&candidate, value))
        })
        .await
    }

    /// Converts the pager into a stream of items.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures::TryStreamExt;
    ///
    /// # async fn example() -> Result<(), pdrest::PaginationError> {
    /// # let mut client = pdrest::Client::builder().api_key("my-key").build()?;
    /// let names: Vec<String> = client
    ///     .list("/teams")
    ///     .into_stream()
    ///     .map_ok(|team| team["name"].as_str().unwrap_or_default().to_string())
    ///     .try_collect()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_stream(self) -> impl Stream<Item = Result<Value, PaginationError>> + 'a {
        futures::stream::try_unfold(self, |mut pager| async move {
            let next = pager.try_next().await?;
            Ok::<_, PaginationError>(next.map(|item| (item, pager)))
        })
    }

    fn resolve_plan(&self) -> Result<Plan, Error> {
        let canonical_path = self.client.canonical_path(&self.request.path)?.value;
        if is_individual_resource(&canonical_path) {
            return Err(Error::Url(format!(
                "{canonical_path} is an individual resource, not a collection; it cannot be \
                 iterated over"
            )));
        }
        let envelope = self
            .client
            .resolve_wrapping(&Method::GET, &canonical_path)
            .value
            .response
            .ok_or_else(|| {
                Error::Url(format!(
                    "Pagination is not supported for GET {canonical_path}: its response has no \
                     entity wrapper"
                ))
            })?;
        let mode = self.client.tables().pagination_mode(&canonical_path);
        let limit = self
            .page_size
            .or_else(|| {
                self.request
                    .query_param("limit")
                    .and_then(|limit| limit.parse().ok())
            })
            .unwrap_or_else(|| self.client.default_page_size())
            .max(1);
        Ok(Plan {
            canonical_path,
            envelope,
            mode,
            limit,
        })
    }

    async fn fetch_page(&mut self) -> Result<Option<Vec<Value>>, PaginationError> {
        let plan = match &self.plan {
            Some(plan) => plan.clone(),
            None => {
                let plan = self.resolve_plan()?;
                tracing::debug!(
                    canonical_path = %plan.canonical_path,
                    mode = ?plan.mode,
                    limit = plan.limit,
                    "Starting pagination"
                );
                self.plan = Some(plan.clone());
                plan
            }
        };

        let mut request = self
            .request
            .clone()
            .without_wrapping()
            .with_query_param("limit", plan.limit);
        match plan.mode {
            PaginationMode::Offset => {
                let highest = self.offset + u64::from(plan.limit);
                if highest > self.client.max_offset() {
                    tracing::warn!(
                        canonical_path = %plan.canonical_path,
                        offset = self.offset,
                        limit = plan.limit,
                        max_offset = self.client.max_offset(),
                        "Stopping iteration at the API's maximum offset; results are incomplete"
                    );
                    self.done = true;
                    return Ok(None);
                }
                request = request.with_query_param("offset", self.offset);
                if self.with_total {
                    request = request.with_query_param("total", true);
                }
            }
            PaginationMode::Cursor => {
                if let Some(cursor) = &self.cursor {
                    request = request.with_query_param("cursor", cursor);
                }
            }
        }
        self.check_page_ceiling(&plan)?;

        let response = self.client.call(request).await?;
        self.pages_fetched += 1;
        let body = response.data;
        if let Some(total) = body.get("total").and_then(Value::as_u64) {
            self.total = Some(total);
        }
        let continuation = match plan.mode {
            PaginationMode::Offset => Continuation::More(match body.get("more") {
                Some(more) => more.as_bool().unwrap_or(false),
                None => {
                    tracing::warn!(
                        canonical_path = %plan.canonical_path,
                        "Response lacks a \"more\" property; stopping iteration"
                    );
                    false
                }
            }),
            PaginationMode::Cursor => Continuation::Cursor(next_cursor(&body)),
        };

        let items = match wrapping::unwrap(body, Some(&plan.envelope)) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                return Err(Error::SchemaMismatch {
                    status: response.status,
                    raw_response: response.raw_body,
                    canonical_path: plan.canonical_path,
                    expected: plan.envelope,
                    found: format!(
                        "its value is of type {}, not an array",
                        json_type_name(&other)
                    ),
                }
                .into())
            }
            Err(mismatch) => {
                return Err(Error::SchemaMismatch {
                    status: response.status,
                    raw_response: response.raw_body,
                    canonical_path: plan.canonical_path,
                    expected: mismatch.expected,
                    found: mismatch.found,
                }
                .into())
            }
        };

        match continuation {
            Continuation::More(more) => {
                self.offset += items.len() as u64;
                if !more || items.len() < plan.limit as usize {
                    self.done = true;
                }
            }
            Continuation::Cursor(Some(cursor)) => self.cursor = Some(cursor),
            Continuation::Cursor(None) => self.done = true,
        }
        tracing::debug!(
            canonical_path = %plan.canonical_path,
            page = self.pages_fetched,
            items = items.len(),
            done = self.done,
            "Fetched page"
        );
        Ok(Some(items))
    }

    fn check_page_ceiling(&self, plan: &Plan) -> Result<(), PaginationError> {
        let limit = self.client.max_pages();
        if self.pages_fetched >= limit {
            tracing::error!(
                canonical_path = %plan.canonical_path,
                pages = self.pages_fetched,
                "Page limit reached before the collection was exhausted"
            );
            return Err(PaginationError::LimitExceeded {
                canonical_path: plan.canonical_path.clone(),
                limit,
            });
        }
        Ok(())
    }
}

enum Continuation {
    More(bool),
    Cursor(Option<String>),
}

/// Text form of an attribute used as a key or search term: strings as-is,
/// other values as JSON. `null` has none.
pub(crate) fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// The continuation token of a cursor page: `next_cursor`, or `cursor` when
/// the response has no `next_cursor` key. Null or empty ends iteration.
fn next_cursor(body: &Value) -> Option<String> {
    let token = match body.get("next_cursor") {
        Some(token) => token,
        None => body.get("cursor")?,
    };
    token
        .as_str()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

use std::collections::HashSet;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::content::ContentItem;
use crate::search::client::{SearchClient, SearchHit};
use crate::search::query::build_search_query;

/// Resolved value of a search: deduplicated items plus the rest of the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<ContentItem>,
    pub total: u64,
    /// Non-hit response fields, unchanged.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

/// How a view sees an asynchronous value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<T> {
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> ResourceState<T> {
    /// Read a resource snapshot; `None` means the request has not settled.
    pub fn from_snapshot<E: std::fmt::Display>(snapshot: Option<Result<T, E>>) -> Self {
        match snapshot {
            None => ResourceState::Pending,
            Some(Ok(value)) => ResourceState::Ready(value),
            Some(Err(err)) => ResourceState::Failed(err.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ResourceState::Pending)
    }
}

/// Keep the first item for every id, preserving response order.
pub fn dedup_by_id(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect()
}

fn parse_hits(hits: Vec<SearchHit>) -> Vec<ContentItem> {
    hits.into_iter()
        .filter_map(|hit| match ContentItem::parse(&hit.source) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(hit = ?hit.id, "skipping search hit: {e}");
                None
            }
        })
        .collect()
}

/// Core search logic, separated from the server function for testability.
///
/// A blank query resolves to an empty result without contacting the index.
pub async fn process_search(client: &dyn SearchClient, q: &str) -> Result<SearchResults, AppError> {
    let q = q.trim();
    if q.is_empty() {
        return Ok(SearchResults::default());
    }

    let response = client.search(&build_search_query(q)).await?;
    let hits = dedup_by_id(parse_hits(response.hits));
    tracing::debug!(q, hits = hits.len(), "search resolved");

    Ok(SearchResults {
        hits,
        total: response.total.value(),
        extra: response.extra,
    })
}

/// Server function behind the search resource.
#[server(SearchPosts, "/api")]
pub async fn search_posts(q: String) -> Result<SearchResults, ServerFnError> {
    let state = expect_context::<crate::app::AppState>();
    process_search(state.search_client.as_ref(), &q)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// The `q` parameter of the current URL (empty when absent).
pub fn use_url_query() -> Memo<String> {
    let query = use_query_map();
    Memo::new(move |_| query.read().get("q").unwrap_or_default())
}

/// Editable search text, reset whenever the URL query changes.
pub fn use_search_query() -> RwSignal<String> {
    let url_query = use_url_query();
    let query = RwSignal::new(url_query.get_untracked());
    Effect::new(move |_| query.set(url_query.get()));
    query
}

/// Search resource keyed by the URL query.
///
/// A new request is issued only when `q` changes; the resolved value is
/// shared by every reader until then.
pub fn use_url_search_resource() -> Resource<Result<SearchResults, ServerFnError>> {
    let q = use_url_query();
    Resource::new(move || q.get(), |q| async move { search_posts(q).await })
}

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::content::{Post, TaxonomyEntry};
use crate::models::descriptor::parse_date;

/// Page size used when the list does not specify one.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

/// A hit count as reported by the search index.
///
/// Older indexes report a plain number, newer ones `{"value": n, "relation": "eq"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Total {
    Count(u64),
    Object {
        value: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relation: Option<String>,
    },
}

impl Total {
    pub fn value(&self) -> u64 {
        match self {
            Total::Count(n) => *n,
            Total::Object { value, .. } => *value,
        }
    }
}

impl Default for Total {
    fn default() -> Self {
        Total::Count(0)
    }
}

/// Where a post list is rendered and what it is restricted to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListContext {
    /// Path of the current page (`/tag`, `/category`, ...).
    pub pathname: String,
    /// The `id` URL parameter.
    pub id: Option<String>,
    /// Fixed category ids configured on the list; override `id`.
    pub categories: Option<Vec<String>>,
    /// Post id to leave out (e.g. the post being read).
    pub exclude: Option<String>,
}

/// Query parameters of `GET /api/posts.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub start: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Comma-separated category ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

fn default_rows() -> u32 {
    DEFAULT_ITEMS_PER_PAGE
}

fn parse_count(name: &str, value: &str) -> Result<u32, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("'{name}' must be a non-negative integer")))
}

impl PostsQuery {
    /// Build the request for zero-indexed `page` of a list.
    pub fn for_page(page: u32, items_per_page: u32, ctx: &ListContext) -> Self {
        let mut query = Self {
            start: page * items_per_page,
            rows: items_per_page,
            ..Self::default()
        };

        let id = ctx.id.clone().filter(|id| !id.is_empty());
        if ctx.pathname == "/tag" {
            query.tags = id;
        } else {
            query.categories = id;
        }

        if let Some(categories) = ctx.categories.as_ref().filter(|c| !c.is_empty()) {
            query.categories = Some(categories.join(","));
        }

        query.exclude = ctx.exclude.clone().filter(|e| !e.is_empty());
        query
    }

    /// Parse a raw query string.
    ///
    /// Repeated `categories` and the bracketed `categories[]` array form are
    /// merged into one comma-separated list. Blank values count as absent.
    pub fn from_query_string(raw: &str) -> Result<Self, AppError> {
        let mut query = Self {
            rows: default_rows(),
            ..Self::default()
        };
        let mut categories = Vec::new();

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "start" => query.start = parse_count("start", value)?,
                "rows" => query.rows = parse_count("rows", value)?,
                "tags" if !value.is_empty() => query.tags = Some(value.to_string()),
                "exclude" if !value.is_empty() => query.exclude = Some(value.to_string()),
                "categories" | "categories[]" => categories.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string),
                ),
                _ => {}
            }
        }

        if !categories.is_empty() {
            query.categories = Some(categories.join(","));
        }
        Ok(query)
    }

    pub fn category_ids(&self) -> Vec<&str> {
        self.categories
            .as_deref()
            .map(|c| c.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("start", self.start.to_string()), ("rows", self.rows.to_string())];
        if let Some(tags) = &self.tags {
            pairs.push(("tags", tags.clone()));
        }
        if let Some(categories) = &self.categories {
            pairs.push(("categories", categories.clone()));
        }
        if let Some(exclude) = &self.exclude {
            pairs.push(("exclude", exclude.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    #[serde(default)]
    pub name_s: String,
    #[serde(default, rename = "profilePic_s")]
    pub profile_pic_s: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorItem {
    pub component: AuthorSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub item: AuthorItem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub item: Vec<TaxonomyEntry>,
}

/// One post as returned by `GET /api/posts.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub author_bio: Option<AuthorRef>,
    #[serde(default)]
    pub categories: Option<CategoryRef>,
}

/// Body of `GET /api/posts.json`. `hits` may be `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub total: Total,
    #[serde(default)]
    pub hits: Option<Vec<PostHit>>,
}

/// Flat view model of a post in a list.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub url: String,
    pub headline: String,
    pub main_image: Option<String>,
    pub author_name: String,
    pub author_image: Option<String>,
    /// e.g. `Mar 13, 2020`
    pub last_modified_date: String,
    pub categories: Vec<TaxonomyEntry>,
}

impl From<PostHit> for PostCard {
    fn from(hit: PostHit) -> Self {
        let author = hit.author_bio.map(|a| a.item.component).unwrap_or_default();
        Self {
            url: hit.url,
            headline: hit.headline,
            main_image: hit.main_image,
            author_name: author.name_s,
            author_image: author.profile_pic_s,
            last_modified_date: hit
                .last_modified_date
                .as_deref()
                .map(format_card_date)
                .unwrap_or_default(),
            categories: hit.categories.map(|c| c.item).unwrap_or_default(),
        }
    }
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        let author = post.author_bios.first();
        Self {
            url: post.url.clone(),
            headline: post.headline.clone(),
            main_image: post.main_image.clone(),
            author_name: author.map(|a| a.name.clone()).unwrap_or_default(),
            author_image: author.and_then(|a| a.profile_pic.clone()),
            last_modified_date: post
                .meta
                .date_modified
                .map(|dt| dt.format("%b %-d, %Y").to_string())
                .unwrap_or_default(),
            categories: post.categories.clone(),
        }
    }
}

/// Format a timestamp as `Mon D, YYYY`; unparseable input is returned unchanged.
pub fn format_card_date(raw: &str) -> String {
    parse_date(raw)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// What the pager should do after a page was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerUpdate {
    /// First time there is more than one page: build the pager.
    Initialize { total_pages: u32 },
    Unchanged,
}

/// Lifecycle of the post list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPhase {
    Idle,
    Loading { page: u32 },
    Rendered,
    Failed(String),
}

/// Pagination bookkeeping for a server-paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub total_results: u64,
    pub items_per_page: u32,
    pub initialized: bool,
    pub current_page: u32,
}

impl PaginationState {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            total_results: 0,
            items_per_page: if items_per_page == 0 {
                DEFAULT_ITEMS_PER_PAGE
            } else {
                items_per_page
            },
            initialized: false,
            current_page: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let per_page = u64::from(self.items_per_page);
        u32::try_from(self.total_results.div_ceil(per_page)).unwrap_or(u32::MAX)
    }

    /// Build the request for zero-indexed `page` and make it current.
    pub fn request_page(&mut self, page: u32, ctx: &ListContext) -> PostsQuery {
        self.current_page = page;
        PostsQuery::for_page(page, self.items_per_page, ctx)
    }

    /// Record a response: normalize the total, map the hits, and decide
    /// whether the pager has to be built.
    pub fn apply(&mut self, response: PostsResponse) -> (Vec<PostCard>, PagerUpdate) {
        self.total_results = response.total.value();
        let cards = response
            .hits
            .unwrap_or_default()
            .into_iter()
            .map(PostCard::from)
            .collect();

        let total_pages = self.total_pages();
        let update = if !self.initialized && total_pages > 1 {
            self.initialized = true;
            PagerUpdate::Initialize { total_pages }
        } else {
            PagerUpdate::Unchanged
        };

        (cards, update)
    }

    pub fn pager_visible(&self) -> bool {
        self.initialized && self.total_pages() > 1
    }
}

/// Convert a one-indexed pager click into a zero-indexed page.
pub fn page_from_click(clicked: u32) -> u32 {
    clicked.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_merges_bracketed_categories() {
        let query = PostsQuery::from_query_string(
            "start=10&rows=5&categories%5B%5D=travel&categories%5B%5D=food&exclude=p1",
        )
        .unwrap();
        assert_eq!(query.start, 10);
        assert_eq!(query.rows, 5);
        assert_eq!(query.category_ids(), vec!["travel", "food"]);
        assert_eq!(query.exclude.as_deref(), Some("p1"));
    }

    #[test]
    fn test_query_string_defaults_and_blanks() {
        let query = PostsQuery::from_query_string("tags=&categories=").unwrap();
        assert_eq!(query.rows, DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(query.tags, None);
        assert_eq!(query.categories, None);

        let pairs = PostsQuery::for_page(1, 10, &ListContext::default()).query_pairs();
        let raw: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        assert_eq!(PostsQuery::from_query_string(&raw).unwrap().start, 10);
    }

    #[test]
    fn test_query_string_rejects_bad_numbers() {
        let err = PostsQuery::from_query_string("rows=ten").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    fn response(total: serde_json::Value, hits: serde_json::Value) -> PostsResponse {
        serde_json::from_value(serde_json::json!({ "total": total, "hits": hits })).unwrap()
    }

    #[test]
    fn test_total_scalar_and_object_normalize() {
        let scalar: Total = serde_json::from_str("42").unwrap();
        let object: Total = serde_json::from_str(r#"{"value": 42, "relation": "eq"}"#).unwrap();
        assert_eq!(scalar.value(), 42);
        assert_eq!(object.value(), 42);
    }

    #[test]
    fn test_null_hits_render_empty_without_pager() {
        let mut state = PaginationState::new(10);
        let (cards, update) = state.apply(response(serde_json::json!(0), serde_json::Value::Null));
        assert!(cards.is_empty());
        assert_eq!(update, PagerUpdate::Unchanged);
        assert!(!state.pager_visible());
    }

    #[test]
    fn test_page_two_requests_start_twenty() {
        let mut state = PaginationState::new(10);
        let query = state.request_page(2, &ListContext::default());
        assert_eq!(query.start, 20);
        assert_eq!(query.rows, 10);
        assert_eq!(state.current_page, 2);

        let pairs = query.query_pairs();
        assert!(pairs.contains(&("start", "20".to_string())));
        assert!(pairs.contains(&("rows", "10".to_string())));
    }

    #[test]
    fn test_pager_click_is_one_indexed() {
        assert_eq!(page_from_click(3), 2);
        assert_eq!(page_from_click(1), 0);
        assert_eq!(page_from_click(0), 0);
    }

    #[test]
    fn test_pager_initializes_once() {
        let mut state = PaginationState::new(10);
        let (_, first) = state.apply(response(serde_json::json!({ "value": 42 }), serde_json::json!([])));
        assert_eq!(first, PagerUpdate::Initialize { total_pages: 5 });

        let (_, second) = state.apply(response(serde_json::json!(42), serde_json::json!([])));
        assert_eq!(second, PagerUpdate::Unchanged);
        assert!(state.pager_visible());
    }

    #[test]
    fn test_single_page_has_no_pager() {
        let mut state = PaginationState::new(10);
        let (_, update) = state.apply(response(serde_json::json!(10), serde_json::json!([])));
        assert_eq!(update, PagerUpdate::Unchanged);
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn test_zero_page_size_falls_back_to_default() {
        assert_eq!(PaginationState::new(0).items_per_page, DEFAULT_ITEMS_PER_PAGE);
    }

    #[test]
    fn test_tag_page_filters_by_tag() {
        let ctx = ListContext {
            pathname: "/tag".into(),
            id: Some("spring".into()),
            ..ListContext::default()
        };
        let query = PostsQuery::for_page(0, 10, &ctx);
        assert_eq!(query.tags.as_deref(), Some("spring"));
        assert_eq!(query.categories, None);
    }

    #[test]
    fn test_static_categories_override_url_id() {
        let ctx = ListContext {
            pathname: "/category".into(),
            id: Some("travel".into()),
            categories: Some(vec!["food".into(), "style".into()]),
            exclude: Some("post-1".into()),
        };
        let query = PostsQuery::for_page(1, 5, &ctx);
        assert_eq!(query.category_ids(), vec!["food", "style"]);
        assert_eq!(query.exclude.as_deref(), Some("post-1"));
        assert_eq!(query.start, 5);
    }

    #[test]
    fn test_card_from_hit() {
        let hit: PostHit = serde_json::from_value(serde_json::json!({
            "url": "/articles/hello",
            "headline": "Hello",
            "mainImage": "/img.png",
            "lastModifiedDate": "2020-03-13T17:34:14.000Z",
            "authorBio": { "item": { "component": { "name_s": "Jane", "profilePic_s": "/jane.png" } } },
            "categories": { "item": [ { "key": "travel", "value": "Travel" } ] }
        }))
        .unwrap();

        let card = PostCard::from(hit);
        assert_eq!(card.last_modified_date, "Mar 13, 2020");
        assert_eq!(card.author_name, "Jane");
        assert_eq!(card.author_image.as_deref(), Some("/jane.png"));
        assert_eq!(card.categories[0].value, "Travel");
    }

    #[test]
    fn test_card_without_author() {
        let card = PostCard::from(PostHit {
            url: "/x".into(),
            headline: "X".into(),
            ..PostHit::default()
        });
        assert_eq!(card.author_name, "");
        assert_eq!(card.last_modified_date, "");
    }
}

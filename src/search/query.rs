use serde_json::{json, Value};

use crate::models::listing::PostsQuery;

/// Content types a post can be indexed under.
pub const POST_CONTENT_TYPES: [&str; 2] = ["/page/post", "/component/post"];

/// Fields matched by free-text search.
pub const SEARCH_FIELDS: [&str; 2] = ["headline_s", "blurb_t"];

/// Upper bound on `rows` accepted by the posts endpoint.
pub const MAX_ROWS: u32 = 100;

fn post_type_filter() -> Value {
    let should: Vec<Value> = POST_CONTENT_TYPES
        .iter()
        .map(|ty| json!({ "match": { "content-type": ty } }))
        .collect();
    json!({ "bool": { "should": should } })
}

/// Full-text query over posts.
pub fn build_search_query(q: &str) -> Value {
    json!({
        "query": {
            "bool": {
                "filter": [
                    post_type_filter(),
                    {
                        "multi_match": {
                            "query": q,
                            "fields": SEARCH_FIELDS,
                        }
                    }
                ]
            }
        }
    })
}

/// Paginated listing query: posts only, newest first.
pub fn build_posts_query(request: &PostsQuery) -> Value {
    let mut filter = vec![post_type_filter()];

    if let Some(tag) = request.tags.as_deref().filter(|t| !t.is_empty()) {
        filter.push(json!({ "match": { "tags_o.item.key": tag } }));
    }

    let categories = request.category_ids();
    if !categories.is_empty() {
        let should: Vec<Value> = categories
            .iter()
            .map(|c| json!({ "match": { "categories_o.item.key": c } }))
            .collect();
        filter.push(json!({ "bool": { "should": should } }));
    }

    let mut query = json!({ "filter": filter });
    if let Some(exclude) = request.exclude.as_deref().filter(|e| !e.is_empty()) {
        query["must_not"] = json!([{ "match": { "objectId": exclude } }]);
    }

    json!({
        "query": { "bool": query },
        "from": request.start,
        "size": request.rows.min(MAX_ROWS),
        "sort": [ { "lastModifiedDate_dt": { "order": "desc" } } ],
    })
}

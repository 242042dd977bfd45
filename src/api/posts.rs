use serde_json::Value;

use crate::error::AppError;
use crate::models::content::TaxonomyEntry;
use crate::models::descriptor::{store_url_to_render_url, Descriptor};
use crate::models::listing::{
    AuthorItem, AuthorRef, AuthorSummary, CategoryRef, PostHit, PostsQuery, PostsResponse,
};
use crate::search::client::SearchClient;
use crate::search::query::build_posts_query;

/// Flatten an indexed post into the shape the list renderer expects.
pub fn post_hit_from_source(source: &Value) -> Result<PostHit, AppError> {
    let desc = Descriptor::new(source)?;

    let author_bio = desc
        .items(&["authorBio_o", "authorBio"])
        .into_iter()
        .find_map(|item| item.get("component"))
        .map(|component| -> Result<AuthorRef, AppError> {
            let bio = Descriptor::new(component)?;
            Ok(AuthorRef {
                item: AuthorItem {
                    component: AuthorSummary {
                        name_s: bio.string_or_default(&["name_s"]),
                        profile_pic_s: bio.string(&["profilePic_s"]),
                    },
                },
            })
        })
        .transpose()?;

    let categories = desc
        .items(&["categories_o", "categories"])
        .into_iter()
        .map(|item| {
            let entry = Descriptor::new(item)?;
            Ok(TaxonomyEntry {
                key: entry.require(&["key"])?,
                value: entry.string_or_default(&["value_smv", "value"]),
                image: None,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(PostHit {
        id: desc.require(&["objectId", "guid"])?,
        url: desc
            .string(&["url", "slug"])
            .unwrap_or_else(|| store_url_to_render_url(&desc.string_or_default(&["localId", "path"]))),
        headline: desc.string_or_default(&["headline_s"]),
        main_image: desc.string(&["mainImage_s"]),
        last_modified_date: desc.string(&["lastModifiedDate_dt", "lastModifiedDate"]),
        author_bio,
        categories: Some(CategoryRef { item: categories }),
    })
}

/// Core listing logic, separated from the HTTP layer for testability.
pub async fn process_posts_query(
    client: &dyn SearchClient,
    request: &PostsQuery,
) -> Result<PostsResponse, AppError> {
    if request.rows == 0 {
        return Err(AppError::BadRequest("rows must be positive".into()));
    }

    let response = client.search(&build_posts_query(request)).await?;
    tracing::debug!(
        start = request.start,
        rows = request.rows,
        total = response.total.value(),
        "posts page fetched"
    );

    let hits = response
        .hits
        .iter()
        .map(|hit| post_hit_from_source(&hit.source))
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(PostsResponse {
        total: response.total,
        hits: Some(hits),
    })
}

/// Axum handler for `GET /api/posts.json`.
#[cfg(feature = "ssr")]
pub async fn posts_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    axum::extract::RawQuery(raw): axum::extract::RawQuery,
) -> Result<axum::Json<PostsResponse>, AppError> {
    let request = PostsQuery::from_query_string(raw.as_deref().unwrap_or_default())?;
    let response = process_posts_query(state.search_client.as_ref(), &request).await?;
    Ok(axum::Json(response))
}

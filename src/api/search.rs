use serde::Deserialize;

use crate::error::AppError;
use crate::search::resource::{process_search, SearchResults};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Axum handler for `GET /api/search.json`.
pub async fn search_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    axum::extract::Query(params): axum::extract::Query<SearchParams>,
) -> Result<axum::Json<SearchResults>, AppError> {
    let results = process_search(state.search_client.as_ref(), &params.q).await?;
    Ok(axum::Json(results))
}

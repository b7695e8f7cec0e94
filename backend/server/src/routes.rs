use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    search::{PageParams, RecipePage, SearchResults, collect_filters, list_recipes, search_recipes},
    state::AppState,
};

pub async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "API is running. Visit /static/index.html" }))
}

/// GET /api/recipes?page=&limit=
pub async fn recipes_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<RecipePage>, AppError> {
    let page = list_recipes(state.store.clone(), params, state.config.max_page_limit).await?;

    Ok(Json(page))
}

/// GET /api/recipes/search?calories=&title=&cuisine=&total_time=&rating=
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResults>, AppError> {
    let specs = collect_filters(
        params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );

    let results = search_recipes(state.store.clone(), specs).await?;

    Ok(Json(results))
}

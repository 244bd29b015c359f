use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_search_query;
use super::{ApiError, ApiResponse, AppState};
use crate::services::UserSummary;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /search?q=
/// Substring match on usernames.
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let query = validate_search_query(params.q.as_deref())?;
    let limit = state.config().server.search_limit;

    let users = state.account_service().search(query, limit).await?;

    Ok(Json(ApiResponse::success(users)))
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::validation::{validate_post_id, validate_user_id};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{PostError, PostView};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub song_recommendation: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub post_id: i32,
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(_) | PostError::UserNotFound(_) => Self::NotFound(err.to_string()),
            PostError::Forbidden => Self::forbidden(err.to_string()),
            PostError::Validation(msg) => Self::validation(msg),
            PostError::Database(msg) => Self::DatabaseError(msg),
            PostError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /post
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CreatePostResponse>>), ApiError> {
    let user_id = session_user_id(&session).await?;
    let Json(payload) = payload?;

    let post = state
        .post_service()
        .create_post(
            user_id,
            &payload.song_recommendation,
            payload.description.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatePostResponse {
            post_id: post.post_id,
        })),
    ))
}

/// DELETE /post/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user_id = session_user_id(&session).await?;
    let id = validate_post_id(id)?;

    state.post_service().delete_post(user_id, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Post deleted.",
    ))))
}

/// GET /users/{id}/posts
pub async fn list_user_posts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<PostView>>>, ApiError> {
    let id = validate_user_id(id)?;
    let posts = state.post_service().list_posts(id).await?;
    Ok(Json(ApiResponse::success(posts)))
}

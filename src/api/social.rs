use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::observability;
use super::validation::validate_user_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{SocialError, UserSummary};

impl From<SocialError> for ApiError {
    fn from(err: SocialError) -> Self {
        match err {
            // Edge-state conflicts keep the 400 the web client already handles.
            SocialError::SelfFollow
            | SocialError::AlreadyFollowing
            | SocialError::NotFollowing => Self::validation(err.to_string()),
            SocialError::CurrentUserNotFound
            | SocialError::FollowTargetNotFound
            | SocialError::UnfollowTargetNotFound => Self::NotFound(err.to_string()),
            SocialError::UserNotFound(id) => Self::not_found("User", id),
            SocialError::Database(msg) => Self::DatabaseError(msg),
            SocialError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /follow/{id}
pub async fn follow(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let follower_id = session_user_id(&session).await?;
    let id = validate_user_id(id)?;

    let result = state.social_service().follow(follower_id, id).await;
    observability::record_follow_change("follow", &result);
    result?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Now following.",
    ))))
}

/// POST /unfollow/{id}
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let follower_id = session_user_id(&session).await?;
    let id = validate_user_id(id)?;

    let result = state.social_service().unfollow(follower_id, id).await;
    observability::record_follow_change("unfollow", &result);
    result?;

    Ok(Json(ApiResponse::success(MessageResponse::new("Unfollowed."))))
}

/// GET /users/{id}/followers
pub async fn list_followers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let id = validate_user_id(id)?;
    let users = state.social_service().followers(id).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /users/{id}/following
pub async fn list_following(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let id = validate_user_id(id)?;
    let users = state.social_service().following(id).await?;
    Ok(Json(ApiResponse::success(users)))
}

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, observability};
use crate::services::{AccountError, AccountInfo, Registration, UserSummary};

/// Session key holding the authenticated user's id.
pub const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => Self::validation(msg),
            AccountError::UsernameTaken | AccountError::EmailTaken => {
                Self::Conflict(err.to_string())
            }
            AccountError::InvalidCredentials => Self::unauthorized(err.to_string()),
            AccountError::UserNotFound(id) => Self::not_found("User", id),
            AccountError::Database(msg) => Self::DatabaseError(msg),
            AccountError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without an authenticated session.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    session_user_id(&session).await?;
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserSummary>>), ApiError> {
    let Json(payload) = payload?;

    let user = state
        .account_service()
        .register(Registration {
            username: payload.username,
            password: payload.password,
            email: payload.email,
            bio: payload.bio,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// POST /login
/// Verifies credentials and binds the session to the user.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let Json(payload) = payload?;

    let result = state
        .account_service()
        .login(&payload.username, &payload.password)
        .await;
    observability::record_login(result.is_ok());
    let user = result?;

    // New id on privilege change so a planted cookie cannot ride the login.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to cycle session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, user.user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(user_id = user.user_id, "User logged in");

    Ok(Json(ApiResponse::success(user)))
}

/// POST /logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to flush session: {e}");
    }
    Json(ApiResponse::success(MessageResponse::new("Logged out.")))
}

/// GET /me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AccountInfo>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    match state.account_service().get_account(user_id).await {
        Ok(account) => Ok(Json(ApiResponse::success(account))),
        Err(AccountError::UserNotFound(_)) => {
            // The account went away underneath a live session.
            let _ = session.flush().await;
            Err(ApiError::unauthorized("User not found"))
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Get the user id from the session, returns error if not authenticated.
/// Records the id on the current request span.
pub async fn session_user_id(session: &Session) -> Result<i32, ApiError> {
    let user_id = session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    tracing::Span::current().record("user_id", user_id);
    Ok(user_id)
}

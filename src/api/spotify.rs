//! Spotify account linking via the authorization-code flow.

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use super::auth::session_user_id;
use super::{ApiError, AppState};
use crate::services::LinkError;

/// Session key for the anti-forgery `state` sent to the provider.
const OAUTH_STATE_KEY: &str = "spotify_oauth_state";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Provider(msg) => Self::spotify_error(msg),
            LinkError::UserNotFound(id) => Self::not_found("User", id),
            LinkError::Database(msg) => Self::DatabaseError(msg),
            LinkError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /login/spotify
pub async fn login_spotify(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Redirect, ApiError> {
    session_user_id(&session).await?;

    let csrf = Uuid::new_v4().to_string();
    session
        .insert(OAUTH_STATE_KEY, &csrf)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let url = state.link_service().authorize_url(&csrf)?;
    Ok(Redirect::to(&url))
}

/// GET /callback/spotify
///
/// Exchanges the authorization code, stores the token for the session user
/// and sends the browser back to their profile page.
pub async fn callback_spotify(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let user_id = session_user_id(&session).await?;

    if let Some(error) = query.error {
        return Err(ApiError::validation(format!(
            "Spotify authorization failed: {error}"
        )));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::validation("Missing authorization code"))?;

    // A callback is only honoured for a flow this session started.
    let expected: Option<String> = session
        .remove(OAUTH_STATE_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    match (expected, query.state) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => return Err(ApiError::validation("OAuth state mismatch")),
    }

    state.link_service().complete_link(user_id, &code).await?;

    Ok(Redirect::to(&state.config().profile_redirect_for(user_id)))
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::validation::validate_user_id;
use super::{ApiError, ApiResponse, AppState};
use crate::db::ProfileChanges;
use crate::models::patch::Patch;
use crate::services::{ProfileError, ProfileView};

/// Body of `PUT /profile/{id}`. A missing field is left alone; `null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub bio: Patch<String>,
    #[serde(default)]
    pub profile_image: Patch<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            bio: req.bio,
            profile_image: req.profile_image,
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::UserNotFound(_) | ProfileError::ProfileNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ProfileError::Forbidden => Self::forbidden(err.to_string()),
            ProfileError::Validation(msg) => Self::validation(msg),
            ProfileError::Database(msg) => Self::DatabaseError(msg),
            ProfileError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /profile/{id}
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    let id = validate_user_id(id)?;
    let profile = state.profile_service().get_profile(id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /profile/{id}
/// Only the profile owner may update it. The row is created on first write.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    let caller_id = session_user_id(&session).await?;
    let id = validate_user_id(id)?;
    let Json(payload) = payload?;

    let profile = state
        .profile_service()
        .update_profile(caller_id, id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_missing() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"bio": null}"#).unwrap();
        assert!(matches!(req.bio, Patch::Clear));
        assert!(matches!(req.profile_image, Patch::Absent));

        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"profile_image": "a.png"}"#).unwrap();
        assert!(matches!(req.bio, Patch::Absent));
        assert!(matches!(req.profile_image, Patch::Set(ref s) if s == "a.png"));
    }
}

//! Domain service for user profiles.

use serde::Serialize;
use thiserror::Error;

use crate::db::ProfileChanges;

/// Errors specific to profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("User not found")]
    UserNotFound(i32),

    #[error("Profile not found for this user")]
    ProfileNotFound(i32),

    #[error("You can only edit your own profile")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A profile joined with its owner's username and follow counts.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user_id: i32,
    pub username: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
}

/// Domain service trait for profiles.
#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    /// # Errors
    ///
    /// [`ProfileError::ProfileNotFound`] when the user exists but has never
    /// written a profile.
    async fn get_profile(&self, user_id: i32) -> Result<ProfileView, ProfileError>;

    /// Applies `changes` to `user_id`'s profile on behalf of `caller_id`.
    ///
    /// # Errors
    ///
    /// [`ProfileError::Forbidden`] when the caller is not the profile owner.
    async fn update_profile(
        &self,
        caller_id: i32,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<ProfileView, ProfileError>;
}

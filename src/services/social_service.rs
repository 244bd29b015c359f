//! Domain service for the follow graph.

use thiserror::Error;

use crate::services::account_service::UserSummary;

/// Errors specific to follow operations.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("Cannot follow yourself.")]
    SelfFollow,

    #[error("Current user not found.")]
    CurrentUserNotFound,

    #[error("User to follow not found.")]
    FollowTargetNotFound,

    #[error("User to unfollow not found.")]
    UnfollowTargetNotFound,

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Already following.")]
    AlreadyFollowing,

    #[error("Not following this user.")]
    NotFollowing,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SocialError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SocialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for following users.
#[async_trait::async_trait]
pub trait SocialService: Send + Sync {
    /// Records that `follower_id` follows `followed_id`.
    async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<(), SocialError>;

    async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<(), SocialError>;

    async fn followers(&self, user_id: i32) -> Result<Vec<UserSummary>, SocialError>;

    async fn following(&self, user_id: i32) -> Result<Vec<UserSummary>, SocialError>;
}

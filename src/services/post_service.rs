//! Domain service for song-recommendation posts.

use serde::Serialize;
use thiserror::Error;

use crate::db::Post;

/// Errors specific to post operations.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound(i32),

    #[error("User not found")]
    UserNotFound(i32),

    #[error("You can only delete your own posts")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PostError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PostError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post_id: i32,
    pub user_id: i32,
    pub song_recommendation: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.id,
            user_id: post.user_id,
            song_recommendation: post.song_recommendation,
            description: post.description,
            created_at: post.created_at,
        }
    }
}

/// Domain service trait for posts.
#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    async fn create_post(
        &self,
        user_id: i32,
        song_recommendation: &str,
        description: Option<&str>,
    ) -> Result<PostView, PostError>;

    /// Posts by `user_id`, newest first.
    async fn list_posts(&self, user_id: i32) -> Result<Vec<PostView>, PostError>;

    /// Deletes a post. Only the author may delete it.
    async fn delete_post(&self, caller_id: i32, post_id: i32) -> Result<(), PostError>;
}

//! Domain service for linking a user to their Spotify account.

use thiserror::Error;

/// Errors specific to account linking.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Spotify service is unavailable")]
    Provider(String),

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for LinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LinkError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait LinkService: Send + Sync {
    /// URL of the provider's consent page. `state` is echoed back on the callback.
    fn authorize_url(&self, state: &str) -> Result<String, LinkError>;

    /// Exchanges an authorization code and stores the resulting token for `user_id`.
    async fn complete_link(&self, user_id: i32, code: &str) -> Result<(), LinkError>;
}

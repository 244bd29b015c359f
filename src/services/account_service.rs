//! Domain service for accounts: registration, credential checks and lookup.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public identity of a user, as listed by search and the follow graph.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: i32,
    pub username: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
        }
    }
}

/// The signed-in user's own account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub spotify_linked: bool,
}

/// Registration input. Holds the plaintext password, hence no `Debug`.
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub bio: Option<String>,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates a user with a hashed password and, if given, an initial bio.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UsernameTaken`] or [`AccountError::EmailTaken`]
    /// when either is already registered.
    async fn register(&self, registration: Registration) -> Result<UserSummary, AccountError>;

    /// Checks credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] for an unknown username or
    /// a wrong password; the two are not distinguished.
    async fn login(&self, username: &str, password: &str) -> Result<UserSummary, AccountError>;

    async fn get_account(&self, user_id: i32) -> Result<AccountInfo, AccountError>;

    /// Substring search on usernames.
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<UserSummary>, AccountError>;
}

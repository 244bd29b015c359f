//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{CreateUserOutcome, NewUser, Store};
use crate::db::repositories::user::hash_password;
use crate::services::account_service::{
    AccountError, AccountInfo, AccountService, Registration, UserSummary,
};

const MAX_USERNAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 100;
const MAX_BIO_LEN: usize = 255;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate(registration: &Registration) -> Result<(), AccountError> {
        let username = registration.username.trim();
        if username.is_empty() {
            return Err(AccountError::Validation("Username is required".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AccountError::Validation(format!(
                "Username must be {MAX_USERNAME_LEN} characters or less"
            )));
        }
        if registration.password.is_empty() {
            return Err(AccountError::Validation("Password is required".to_string()));
        }

        let email = registration.email.trim();
        if email.is_empty() {
            return Err(AccountError::Validation("Email is required".to_string()));
        }
        if email.chars().count() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(email) {
            return Err(AccountError::Validation("Email address is invalid".to_string()));
        }

        if let Some(bio) = &registration.bio
            && bio.chars().count() > MAX_BIO_LEN
        {
            return Err(AccountError::Validation(format!(
                "Bio must be {MAX_BIO_LEN} characters or less"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, registration: Registration) -> Result<UserSummary, AccountError> {
        Self::validate(&registration)?;

        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_string();

        if self.store.username_taken(&username).await? {
            return Err(AccountError::UsernameTaken);
        }
        if self.store.email_taken(&email).await? {
            return Err(AccountError::EmailTaken);
        }

        let password = registration.password;
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AccountError::Internal(format!("Password hashing task panicked: {e}")))??;

        let bio = registration.bio.filter(|b| !b.trim().is_empty());

        // The pre-checks above race with concurrent registrations; the unique
        // columns settle it.
        let outcome = self
            .store
            .create_user(NewUser {
                username,
                email,
                password_hash,
                bio,
            })
            .await?;

        match outcome {
            CreateUserOutcome::Created(user) => {
                info!(user_id = user.id, username = %user.username, "User registered");
                Ok(UserSummary::from(user))
            }
            CreateUserOutcome::UsernameTaken => Err(AccountError::UsernameTaken),
            CreateUserOutcome::EmailTaken => Err(AccountError::EmailTaken),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<UserSummary, AccountError> {
        // Same normalization as `register`; blank input is just a failed login.
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::InvalidCredentials);
        }

        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        Ok(UserSummary::from(user))
    }

    async fn get_account(&self, user_id: i32) -> Result<AccountInfo, AccountError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AccountError::UserNotFound(user_id))?;

        let spotify_linked = self.store.get_spotify_token(user_id).await?.is_some();

        Ok(AccountInfo {
            user_id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            spotify_linked,
        })
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<UserSummary>, AccountError> {
        let users = self.store.search_users(query, limit).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }
}

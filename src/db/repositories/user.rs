use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{profiles, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Row to insert on registration. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
}

/// Outcome of an insert that can collide with a unique column.
#[derive(Debug, Clone)]
pub enum CreateUserOutcome {
    Created(User),
    UsernameTaken,
    EmailTaken,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.is_some())
    }

    /// Insert a user and, when a bio is supplied, its profile row in one transaction.
    ///
    /// Unique violations are reported as outcomes rather than errors so that a
    /// registration racing another one with the same name still maps to a conflict.
    pub async fn create(&self, new_user: NewUser) -> Result<CreateUserOutcome> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let inserted = users::ActiveModel {
            username: Set(new_user.username.clone()),
            password_hash: Set(new_user.password_hash),
            email: Set(new_user.email.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(e) => {
                if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
                    // Dropping the transaction rolls it back.
                    return Ok(if detail.contains("email") {
                        CreateUserOutcome::EmailTaken
                    } else {
                        CreateUserOutcome::UsernameTaken
                    });
                }
                return Err(e).context("Failed to insert user");
            }
        };

        if let Some(bio) = new_user.bio {
            profiles::ActiveModel {
                user_id: Set(user.id),
                bio: Set(Some(bio)),
                profile_image: Set(None),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to insert initial profile")?;
        }

        txn.commit().await?;

        Ok(CreateUserOutcome::Created(User::from(user)))
    }

    /// Verify password for a user and return the user when it matches.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Substring match on username, ordered by username.
    pub async fn search(&self, query: &str, limit: u64) -> Result<Vec<User>> {
        let users = users::Entity::find()
            .filter(users::Column::Username.contains(query))
            .order_by_asc(users::Column::Username)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to search users")?;

        Ok(users.into_iter().map(User::from).collect())
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the library default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Params are read back from the PHC string, so hashes made under older
/// settings keep verifying after the config changes.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 256,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_hash_roundtrip() {
        let hash = hash_password("p1", Some(&cheap_config())).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("p1", &hash).unwrap());
        assert!(!verify_password("p2", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same", Some(&cheap_config())).unwrap();
        let b = hash_password("same", Some(&cheap_config())).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_error() {
        assert!(verify_password("p1", "not-a-phc-string").is_err());
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            bio: Some("hi".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_maps_unique_violations() {
        let path = std::env::temp_dir().join(format!("tuneshare-users-{}.db", uuid::Uuid::new_v4()));
        let store = crate::db::Store::new(&format!("sqlite:{}", path.display()))
            .await
            .unwrap();
        let repo = UserRepository::new(store.conn.clone());

        let created = repo.create(new_user("alice", "a@x.com")).await.unwrap();
        let CreateUserOutcome::Created(alice) = created else {
            panic!("expected a new user");
        };

        // Skips the pre-checks the account service runs, as a concurrent
        // registration would.
        let outcome = repo.create(new_user("alice2", "a@x.com")).await.unwrap();
        assert!(matches!(outcome, CreateUserOutcome::EmailTaken));

        let outcome = repo.create(new_user("alice", "other@x.com")).await.unwrap();
        assert!(matches!(outcome, CreateUserOutcome::UsernameTaken));

        // The rejected inserts left no rows behind.
        assert!(!repo.email_taken("other@x.com").await.unwrap());
        assert!(!repo.username_taken("alice2").await.unwrap());
        assert_eq!(repo.get_by_id(alice.id).await.unwrap().unwrap().email, "a@x.com");

        drop(store);
        let _ = std::fs::remove_file(path);
    }
}

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::post::Post;
pub use repositories::profile::{Profile, ProfileChanges};
pub use repositories::spotify_token::SpotifyToken;
pub use repositories::user::{CreateUserOutcome, NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn post_repo(&self) -> repositories::post::PostRepository {
        repositories::post::PostRepository::new(self.conn.clone())
    }

    fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn spotify_token_repo(&self) -> repositories::spotify_token::SpotifyTokenRepository {
        repositories::spotify_token::SpotifyTokenRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, new_user: NewUser) -> Result<CreateUserOutcome> {
        self.user_repo().create(new_user).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn user_exists(&self, id: i32) -> Result<bool> {
        self.user_repo().exists(id).await
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        self.user_repo().username_taken(username).await
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        self.user_repo().email_taken(email).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn search_users(&self, query: &str, limit: u64) -> Result<Vec<User>> {
        self.user_repo().search(query, limit).await
    }

    // Profiles

    pub async fn get_profile(&self, user_id: i32) -> Result<Option<Profile>> {
        self.profile_repo().get_by_user(user_id).await
    }

    pub async fn upsert_profile(&self, user_id: i32, changes: ProfileChanges) -> Result<Profile> {
        self.profile_repo().upsert(user_id, changes).await
    }

    // Posts

    pub async fn create_post(
        &self,
        user_id: i32,
        song_recommendation: &str,
        description: Option<&str>,
    ) -> Result<Post> {
        self.post_repo()
            .create(user_id, song_recommendation, description)
            .await
    }

    pub async fn get_post(&self, id: i32) -> Result<Option<Post>> {
        self.post_repo().get(id).await
    }

    pub async fn list_posts_for_user(&self, user_id: i32) -> Result<Vec<Post>> {
        self.post_repo().list_for_user(user_id).await
    }

    pub async fn delete_post(&self, id: i32) -> Result<bool> {
        self.post_repo().delete(id).await
    }

    // Follow graph

    pub async fn add_follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo().insert(follower_id, followed_id).await
    }

    pub async fn remove_follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo().delete(follower_id, followed_id).await
    }

    pub async fn list_followers(&self, user_id: i32) -> Result<Vec<User>> {
        self.follow_repo().followers(user_id).await
    }

    pub async fn list_following(&self, user_id: i32) -> Result<Vec<User>> {
        self.follow_repo().following(user_id).await
    }

    pub async fn follow_counts(&self, user_id: i32) -> Result<(u64, u64)> {
        let repo = self.follow_repo();
        let followers = repo.follower_count(user_id).await?;
        let following = repo.following_count(user_id).await?;
        Ok((followers, following))
    }

    // Spotify

    pub async fn get_spotify_token(&self, user_id: i32) -> Result<Option<SpotifyToken>> {
        self.spotify_token_repo().get(user_id).await
    }

    pub async fn save_spotify_token(
        &self,
        user_id: i32,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_in: i64,
    ) -> Result<()> {
        self.spotify_token_repo()
            .upsert(user_id, access_token, refresh_token, expires_in)
            .await
    }
}

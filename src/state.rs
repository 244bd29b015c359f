use std::sync::Arc;

use crate::clients::spotify::{OAuthProvider, SpotifyClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, LinkService, PostService, ProfileService, SeaOrmAccountService,
    SeaOrmLinkService, SeaOrmPostService, SeaOrmProfileService, SeaOrmSocialService,
    SocialService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Tuneshare/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub account_service: Arc<dyn AccountService>,

    pub profile_service: Arc<dyn ProfileService>,

    pub post_service: Arc<dyn PostService>,

    pub social_service: Arc<dyn SocialService>,

    pub link_service: Arc<dyn LinkService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.spotify.request_timeout_seconds)?;
        let spotify = Arc::new(SpotifyClient::with_shared_client(
            http_client,
            config.spotify.clone(),
        ));
        Self::with_oauth_provider(config, spotify).await
    }

    /// Like [`SharedState::new`] but with a caller-supplied OAuth provider.
    pub async fn with_oauth_provider(
        config: Config,
        provider: Arc<dyn OAuthProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let account_service = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService>;

        let profile_service =
            Arc::new(SeaOrmProfileService::new(store.clone())) as Arc<dyn ProfileService>;

        let post_service = Arc::new(SeaOrmPostService::new(store.clone())) as Arc<dyn PostService>;

        let social_service =
            Arc::new(SeaOrmSocialService::new(store.clone())) as Arc<dyn SocialService>;

        let link_service =
            Arc::new(SeaOrmLinkService::new(store.clone(), provider)) as Arc<dyn LinkService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            account_service,
            profile_service,
            post_service,
            social_service,
            link_service,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

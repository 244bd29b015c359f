//! Implementation of the `LinkService` trait over an [`OAuthProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::clients::spotify::OAuthProvider;
use crate::db::Store;
use crate::db::repositories::spotify_token::expiry_after;
use crate::services::link_service::{LinkError, LinkService};

pub struct SeaOrmLinkService {
    store: Store,
    provider: Arc<dyn OAuthProvider>,
}

impl SeaOrmLinkService {
    #[must_use]
    pub fn new(store: Store, provider: Arc<dyn OAuthProvider>) -> Self {
        Self { store, provider }
    }
}

#[async_trait]
impl LinkService for SeaOrmLinkService {
    fn authorize_url(&self, state: &str) -> Result<String, LinkError> {
        self.provider
            .authorize_url(state)
            .map_err(|e| LinkError::Internal(e.to_string()))
    }

    async fn complete_link(&self, user_id: i32, code: &str) -> Result<(), LinkError> {
        if !self.store.user_exists(user_id).await? {
            return Err(LinkError::UserNotFound(user_id));
        }

        let grant = self.provider.exchange_code(code).await.map_err(|e| {
            warn!(user_id, error = %e, "Spotify token exchange failed");
            LinkError::Provider(e.to_string())
        })?;

        if expiry_after(chrono::Utc::now(), grant.expires_in).is_none() {
            warn!(
                user_id,
                expires_in = grant.expires_in,
                "Spotify returned an unusable token lifetime"
            );
            return Err(LinkError::Provider(format!(
                "Token lifetime out of range: expires_in={}",
                grant.expires_in
            )));
        }

        self.store
            .save_spotify_token(
                user_id,
                &grant.access_token,
                grant.refresh_token.as_deref(),
                grant.expires_in,
            )
            .await?;

        info!(user_id, "Spotify account linked");
        Ok(())
    }
}

//! Spotify authorization-code flow.
//!
//! Only the code-for-token exchange lives here; storing the grant is the
//! linking service's job.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::SpotifyConfig;

/// Token grant returned by the provider's token endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,

    #[serde(default)]
    pub token_type: String,

    #[serde(default)]
    pub scope: Option<String>,

    /// Seconds until `access_token` expires
    pub expires_in: i64,

    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// An OAuth provider that can turn an authorization code into tokens.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL the browser is sent to so the user can grant access.
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Exchange a one-time authorization code for a token grant.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;
}

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Tuneshare/1.0")
            .build()
            .context("Failed to build Spotify HTTP client")?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn with_shared_client(client: Client, config: SpotifyConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl OAuthProvider for SpotifyClient {
    fn authorize_url(&self, state: &str) -> Result<String> {
        let scopes = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", scopes.as_str()),
                ("state", state),
            ],
        )
        .context("Invalid Spotify authorize URL")?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        if self.config.client_id.is_empty() || self.config.client_secret.is_empty() {
            bail!("Spotify client credentials are not configured");
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await
            .context("Failed to reach Spotify token endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<TokenErrorBody>(&body).map_or(body, |e| {
                match e.error_description {
                    Some(desc) => format!("{}: {desc}", e.error),
                    None => e.error,
                }
            });
            warn!(status = %status, "Spotify token exchange rejected");
            bail!("Spotify token exchange failed: status={status}, reason={reason}");
        }

        let grant: TokenGrant = response
            .json()
            .await
            .context("Failed to parse Spotify token response")?;

        debug!(
            expires_in = grant.expires_in,
            has_refresh = grant.refresh_token.is_some(),
            "Spotify token exchange succeeded"
        );

        Ok(grant)
    }
}

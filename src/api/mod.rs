use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

use time;

use crate::config::{Config, ServerConfig, SessionBackend};
use crate::state::SharedState;

pub mod auth;
mod error;
mod observability;
mod posts;
mod profiles;
mod search;
mod social;
mod spotify;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::{AccountService, LinkService, PostService, ProfileService, SocialService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn account_service(&self) -> &Arc<dyn AccountService> {
        &self.shared.account_service
    }

    #[must_use]
    pub fn profile_service(&self) -> &Arc<dyn ProfileService> {
        &self.shared.profile_service
    }

    #[must_use]
    pub fn post_service(&self) -> &Arc<dyn PostService> {
        &self.shared.post_service
    }

    #[must_use]
    pub fn social_service(&self) -> &Arc<dyn SocialService> {
        &self.shared.social_service
    }

    #[must_use]
    pub fn link_service(&self) -> &Arc<dyn LinkService> {
        &self.shared.link_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

fn session_layer<S>(store: S, server: &ServerConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_ttl_minutes,
        )))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    // Credentialed CORS cannot use a literal `*`, so mirror the caller instead.
    let cors = if origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(AllowOrigin::mirror_request())
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let server = state.config().server.clone();

    let app = Router::new()
        .merge(create_public_router())
        .merge(create_protected_router())
        .route_layer(middleware::from_fn(observability::logging_middleware));

    let app = match server.session_backend {
        SessionBackend::Memory => app.layer(session_layer(MemoryStore::default(), &server)),
        SessionBackend::Sqlite => {
            let pool = state.store().conn.get_sqlite_connection_pool().clone();
            let store = SqliteStore::new(pool);
            store.migrate().await?;
            app.layer(session_layer(store, &server))
        }
    };

    Ok(app
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(cors_layer(&server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // PUT checks the session itself; GET is public.
        .route(
            "/profile/{id}",
            get(profiles::get_profile).put(profiles::update_profile),
        )
        .route("/users/{id}/posts", get(posts::list_user_posts))
        .route("/users/{id}/followers", get(social::list_followers))
        .route("/users/{id}/following", get(social::list_following))
        .route("/search", get(search::search_users))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .route("/metrics", get(observability::get_metrics))
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/post", post(posts::create_post))
        .route("/post/{id}", delete(posts::delete_post))
        .route("/follow/{id}", post(social::follow))
        .route("/unfollow/{id}", post(social::unfollow))
        .route("/login/spotify", get(spotify::login_spotify))
        .route("/callback/spotify", get(spotify::callback_spotify))
        .route_layer(middleware::from_fn(auth::auth_middleware))
}

//! Request tracing, Prometheus metrics and response hardening.
//!
//! Besides the generic request counters this records the events the service
//! cares about: login attempts and follow-graph changes.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::AppState;
use crate::services::SocialError;

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Unauthenticated,
    ClientError,
    ServerError,
}

impl Outcome {
    fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            Self::ServerError
        } else if status == StatusCode::UNAUTHORIZED {
            Self::Unauthenticated
        } else if status.is_client_error() {
            Self::ClientError
        } else {
            Self::Success
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unauthenticated => "unauthenticated",
            Self::ClientError => "client_error",
            Self::ServerError => "error",
        }
    }
}

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus_handle {
        Some(handle) => handle.render(),
        None => "Metrics not enabled or failed to initialize".to_string(),
    }
}

/// Wraps every routed request in a span carrying the request id and route.
/// Handlers that resolve a session fill in `user_id`.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| path.clone(), |mp| mp.as_str().to_owned());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %path,
        route = %route,
        user_id = tracing::field::Empty,
    );

    let response = next.run(req).instrument(span.clone()).await;

    let elapsed = start.elapsed();
    let status = response.status();
    let outcome = Outcome::from_status(status);

    let labels = [
        ("method", method.to_string()),
        ("route", route.clone()),
        ("status", status.as_u16().to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());

    if outcome == Outcome::Unauthenticated {
        metrics::counter!("tuneshare_unauthenticated_requests_total", "route" => route)
            .increment(1);
    }

    span.in_scope(|| {
        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            outcome = outcome.as_str(),
            "Request finished"
        );
    });

    response
}

/// Counts a login attempt by result.
pub fn record_login(succeeded: bool) {
    let result = if succeeded { "success" } else { "failure" };
    metrics::counter!("tuneshare_logins_total", "result" => result).increment(1);
}

fn follow_result_label(result: &Result<(), SocialError>) -> &'static str {
    match result {
        Ok(()) => "applied",
        Err(SocialError::SelfFollow | SocialError::AlreadyFollowing | SocialError::NotFollowing) => {
            "rejected"
        }
        Err(
            SocialError::CurrentUserNotFound
            | SocialError::FollowTargetNotFound
            | SocialError::UnfollowTargetNotFound
            | SocialError::UserNotFound(_),
        ) => "not_found",
        Err(SocialError::Database(_) | SocialError::Internal(_)) => "error",
    }
}

/// Counts a follow or unfollow request by how it ended.
pub fn record_follow_change(action: &'static str, result: &Result<(), SocialError>) {
    metrics::counter!(
        "tuneshare_follow_changes_total",
        "action" => action,
        "result" => follow_result_label(result)
    )
    .increment(1);
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(Outcome::from_status(StatusCode::OK), Outcome::Success);
        assert_eq!(Outcome::from_status(StatusCode::SEE_OTHER), Outcome::Success);
        assert_eq!(
            Outcome::from_status(StatusCode::UNAUTHORIZED),
            Outcome::Unauthenticated
        );
        assert_eq!(
            Outcome::from_status(StatusCode::FORBIDDEN),
            Outcome::ClientError
        );
        assert_eq!(
            Outcome::from_status(StatusCode::BAD_GATEWAY),
            Outcome::ServerError
        );
    }

    #[test]
    fn test_follow_result_label() {
        assert_eq!(follow_result_label(&Ok(())), "applied");
        assert_eq!(
            follow_result_label(&Err(SocialError::AlreadyFollowing)),
            "rejected"
        );
        assert_eq!(
            follow_result_label(&Err(SocialError::FollowTargetNotFound)),
            "not_found"
        );
        assert_eq!(
            follow_result_label(&Err(SocialError::Internal("boom".into()))),
            "error"
        );
    }

    #[test]
    fn test_security_header_names_are_valid() {
        for (name, value) in SECURITY_HEADERS {
            assert!(HeaderName::try_from(name).is_ok());
            assert!(HeaderValue::try_from(value).is_ok());
        }
    }
}

//! End-to-end tests for accounts, profiles, posts, the follow graph and search.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tuneshare::config::{Config, SessionBackend};

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("tuneshare-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.session_backend = SessionBackend::Memory;
    config.server.secure_cookies = false;
    config.security.argon2_memory_cost_kib = 256;
    config.security.argon2_time_cost = 1;

    let state = tuneshare::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    tuneshare::api::router(state)
        .await
        .expect("Failed to build router")
}

struct TestResponse {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        cookie,
        body,
    }
}

async fn register(app: &Router, username: &str, bio: Option<&str>) -> i64 {
    let mut payload = json!({
        "username": username,
        "password": "p1",
        "email": format!("{username}@x.com"),
    });
    if let Some(bio) = bio {
        payload["bio"] = json!(bio);
    }

    let res = send(app, "POST", "/register", None, Some(payload)).await;
    assert_eq!(res.status, StatusCode::CREATED, "register {username}: {}", res.body);
    res.body["data"]["user_id"].as_i64().unwrap()
}

/// Registers `username` and returns its id with a logged-in session cookie.
async fn register_and_login(app: &Router, username: &str, bio: Option<&str>) -> (i64, String) {
    let user_id = register(app, username, bio).await;

    let res = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"username": username, "password": "p1"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["user_id"].as_i64(), Some(user_id));

    (user_id, res.cookie.expect("login must set a session cookie"))
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;

    let (user_id, cookie) = register_and_login(&app, "alice", None).await;

    let res = send(&app, "GET", "/me", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], json!(true));
    assert_eq!(res.body["data"]["user_id"].as_i64(), Some(user_id));
    assert_eq!(res.body["data"]["username"], json!("alice"));
    assert_eq!(res.body["data"]["email"], json!("alice@x.com"));
    assert_eq!(res.body["data"]["spotify_linked"], json!(false));

    let res = send(&app, "GET", "/me", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["success"], json!(false));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;
    register(&app, "alice", None).await;

    let res = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"username": "alice", "password": "p2", "email": "other@x.com"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], json!("Username already exists"));

    let res = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"username": "alice2", "password": "p2", "email": "alice@x.com"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], json!("Email already registered"));
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = spawn_app().await;

    let res = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"username": "alice", "password": "p1", "email": "not-an-email"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"username": "", "password": "p1", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    // Not JSON at all.
    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("username=alice"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let app = spawn_app().await;
    register(&app, "alice", None).await;

    let res = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "nobody", "password": "p1"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], json!("Invalid username or password"));

    for payload in [
        json!({"username": "alice", "password": ""}),
        json!({"username": "", "password": "p1"}),
        json!({"username": "   ", "password": "p1"}),
    ] {
        let res = send(&app, "POST", "/login", None, Some(payload.clone())).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "login {payload}");
        assert_eq!(res.body["error"], json!("Invalid username or password"));
        assert!(res.cookie.is_none());
    }
}

#[tokio::test]
async fn test_login_trims_username_like_register() {
    let app = spawn_app().await;

    let res = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"username": " bob ", "password": "p1", "email": "bob@x.com"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["username"], json!("bob"));
    let user_id = res.body["data"]["user_id"].as_i64();

    for username in ["bob", " bob", "bob  "] {
        let res = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({"username": username, "password": "p1"})),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK, "login {username:?}");
        assert_eq!(res.body["data"]["user_id"].as_i64(), user_id);
    }
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;
    let (_, cookie) = register_and_login(&app, "alice", None).await;

    let res = send(&app, "POST", "/logout", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = send(&app, "GET", "/me", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_partial_updates() {
    let app = spawn_app().await;
    let (alice, cookie) = register_and_login(&app, "alice", None).await;

    let res = send(&app, "GET", &format!("/profile/{alice}"), None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], json!("Profile not found for this user"));

    let uri = format!("/profile/{alice}");

    let res = send(&app, "PUT", &uri, Some(&cookie), Some(json!({"bio": "hi"}))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["bio"], json!("hi"));
    assert_eq!(res.body["data"]["profile_image"], Value::Null);

    let res = send(
        &app,
        "PUT",
        &uri,
        Some(&cookie),
        Some(json!({"profile_image": "a.png"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["bio"], json!("hi"));
    assert_eq!(res.body["data"]["profile_image"], json!("a.png"));

    let res = send(&app, "PUT", &uri, Some(&cookie), Some(json!({"bio": null}))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["bio"], Value::Null);
    assert_eq!(res.body["data"]["profile_image"], json!("a.png"));

    let res = send(&app, "GET", &uri, None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["username"], json!("alice"));
    assert_eq!(res.body["data"]["profile_image"], json!("a.png"));
}

#[tokio::test]
async fn test_profile_update_is_owner_only() {
    let app = spawn_app().await;
    let alice = register(&app, "alice", Some("alice bio")).await;
    let (_, bob_cookie) = register_and_login(&app, "bob", None).await;

    let uri = format!("/profile/{alice}");

    let res = send(&app, "PUT", &uri, Some(&bob_cookie), Some(json!({"bio": "pwned"}))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = send(&app, "PUT", &uri, None, Some(json!({"bio": "pwned"}))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, "GET", &uri, None, None).await;
    assert_eq!(res.body["data"]["bio"], json!("alice bio"));
}

#[tokio::test]
async fn test_post_lifecycle() {
    let app = spawn_app().await;
    let (alice, alice_cookie) = register_and_login(&app, "alice", None).await;
    let (_, bob_cookie) = register_and_login(&app, "bob", None).await;

    let res = send(
        &app,
        "POST",
        "/post",
        None,
        Some(json!({"song_recommendation": "Song A"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(
        &app,
        "POST",
        "/post",
        Some(&alice_cookie),
        Some(json!({"song_recommendation": ""})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(
        &app,
        "POST",
        "/post",
        Some(&alice_cookie),
        Some(json!({"song_recommendation": "Song A", "description": "great"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let post_id = res.body["data"]["post_id"].as_i64().unwrap();

    let posts_uri = format!("/users/{alice}/posts");
    let res = send(&app, "GET", &posts_uri, None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    let posts = res.body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["song_recommendation"], json!("Song A"));
    assert_eq!(posts[0]["description"], json!("great"));

    let post_uri = format!("/post/{post_id}");
    let res = send(&app, "DELETE", &post_uri, Some(&bob_cookie), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = send(&app, "DELETE", &post_uri, Some(&alice_cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["message"], json!("Post deleted."));

    let res = send(&app, "GET", &posts_uri, None, None).await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 0);

    let res = send(&app, "DELETE", &post_uri, Some(&alice_cookie), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_posts_are_listed_newest_first() {
    let app = spawn_app().await;
    let (alice, cookie) = register_and_login(&app, "alice", None).await;

    for song in ["first", "second", "third"] {
        let res = send(
            &app,
            "POST",
            "/post",
            Some(&cookie),
            Some(json!({"song_recommendation": song})),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let res = send(&app, "GET", &format!("/users/{alice}/posts"), None, None).await;
    let songs: Vec<&str> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["song_recommendation"].as_str().unwrap())
        .collect();
    assert_eq!(songs, vec!["third", "second", "first"]);

    let res = send(&app, "GET", "/users/999/posts", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_round_trip() {
    let app = spawn_app().await;
    let (alice, alice_cookie) = register_and_login(&app, "alice", None).await;
    let bob = register(&app, "bob", Some("bob bio")).await;

    let follow_uri = format!("/follow/{bob}");
    let unfollow_uri = format!("/unfollow/{bob}");

    let res = send(&app, "POST", &follow_uri, Some(&alice_cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["message"], json!("Now following."));

    let res = send(&app, "POST", &follow_uri, Some(&alice_cookie), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], json!("Already following."));

    let res = send(&app, "GET", &format!("/users/{bob}/followers"), None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body["data"],
        json!([{"user_id": alice, "username": "alice"}])
    );

    let res = send(&app, "GET", &format!("/users/{alice}/following"), None, None).await;
    assert_eq!(
        res.body["data"],
        json!([{"user_id": bob, "username": "bob"}])
    );

    let res = send(&app, "GET", &format!("/profile/{bob}"), None, None).await;
    assert_eq!(res.body["data"]["follower_count"], json!(1));
    assert_eq!(res.body["data"]["following_count"], json!(0));

    let res = send(&app, "POST", &unfollow_uri, Some(&alice_cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["message"], json!("Unfollowed."));

    let res = send(&app, "POST", &unfollow_uri, Some(&alice_cookie), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], json!("Not following this user."));

    let res = send(&app, "GET", &format!("/users/{bob}/followers"), None, None).await;
    assert_eq!(res.body["data"], json!([]));

    // Back to the starting state, so following again works.
    let res = send(&app, "POST", &follow_uri, Some(&alice_cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_follow_rejections() {
    let app = spawn_app().await;
    let (alice, cookie) = register_and_login(&app, "alice", None).await;

    let res = send(&app, "POST", &format!("/follow/{alice}"), Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], json!("Cannot follow yourself."));

    let res = send(&app, "POST", "/follow/999", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], json!("User to follow not found."));

    let res = send(&app, "POST", "/unfollow/999", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], json!("User to unfollow not found."));

    let res = send(&app, "POST", &format!("/follow/{alice}"), None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, "GET", "/users/999/followers", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_users() {
    let app = spawn_app().await;
    let alice = register(&app, "alice", None).await;
    register(&app, "bob", None).await;
    let malice = register(&app, "malice", None).await;

    let res = send(&app, "GET", "/search?q=lic", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body["data"],
        json!([
            {"user_id": alice, "username": "alice"},
            {"user_id": malice, "username": "malice"},
        ])
    );

    let res = send(&app, "GET", "/search?q=zzz", None, None).await;
    assert_eq!(res.body["data"], json!([]));

    let res = send(&app, "GET", "/search", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], json!("Missing search query"));

    let res = send(&app, "GET", "/search?q=%20%20", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

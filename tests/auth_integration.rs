mod common;

use common::{jwt_settings, spawn_app, spawn_app_with};
use serde_json::{json, Value};
use storekeeper::auth::TokenKind;

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_201_for_valid_credentials() {
    let app = spawn_app();

    let response = app.register("alice", "secret123").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User created successfully.");
}

#[tokio::test]
async fn register_returns_400_for_duplicate_username() {
    let app = spawn_app();

    assert_eq!(201, app.register("alice", "secret123").await.status().as_u16());
    let response = app.register("alice", "another-password").await;

    assert_eq!(400, response.status().as_u16(), "Duplicate username must be rejected");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "A user with that username already exists");
    assert_eq!(body["code"], "DUPLICATE_ENTRY");
}

#[tokio::test]
async fn register_returns_400_for_missing_fields() {
    let app = spawn_app();

    let test_cases = vec![
        (json!({"password": "secret123"}), "'username' cannot be left blank!"),
        (json!({"username": "alice"}), "'password' cannot be left blank!"),
        (json!({"username": "   ", "password": "secret123"}), "'username' cannot be left blank!"),
        (json!({"username": "alice", "password": ""}), "'password' cannot be left blank!"),
        (json!({}), "'username' cannot be left blank!"),
    ];

    for (body, expected_message) in test_cases {
        let response = app.post_json("/register", &body).await;

        assert_eq!(400, response.status().as_u16(), "Payload {} should be rejected", body);
        let response_body: Value = response.json().await.unwrap();
        assert_eq!(response_body["message"], expected_message);
    }
}

#[tokio::test]
async fn register_returns_400_for_short_password() {
    let app = spawn_app();

    let response = app.register("alice", "short").await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn register_returns_400_for_malformed_json() {
    let app = spawn_app();

    let response = app
        .client
        .post(&app.url("/register"))
        .header("Content-Type", "application/json")
        .body("{\"username\": ")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_fresh_access_token_and_refresh_token() {
    let app = spawn_app();
    app.register("alice", "secret123").await;

    let response = app.login("alice", "secret123").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let access = app.claims(body["access_token"].as_str().unwrap());
    let refresh = app.claims(body["refresh_token"].as_str().unwrap());

    assert_eq!(access.kind, TokenKind::Access);
    assert!(access.fresh);
    assert_eq!(refresh.kind, TokenKind::Refresh);
    assert_eq!(access.sub, refresh.sub);
    assert_ne!(access.jti, refresh.jti);
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn login_returns_401_with_identical_message_for_bad_credentials() {
    let app = spawn_app();
    app.register("alice", "secret123").await;

    let wrong_password = app.login("alice", "secret124").await;
    let unknown_user = app.login("mallory", "secret123").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_user.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a["message"], "Invalid credentials");
    assert_eq!(a["message"], b["message"]);
    assert_eq!(a["code"], b["code"]);
}

#[tokio::test]
async fn login_returns_400_for_missing_password() {
    let app = spawn_app();

    let response = app.post_json("/login", &json!({"username": "alice"})).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "'password' cannot be left blank!");
}

#[tokio::test]
async fn login_rejects_passwords_differing_past_72_bytes() {
    let app = spawn_app();
    let prefix = "a".repeat(72);

    let too_long = app.register("alice", &format!("{}REALSUFFIX", prefix)).await;
    assert_eq!(400, too_long.status().as_u16(), "Passwords over 72 bytes must be rejected");

    assert_eq!(201, app.register("bob", &prefix).await.status().as_u16());
    assert_eq!(200, app.login("bob", &prefix).await.status().as_u16());

    for candidate in [format!("{}REALSUFFIX", prefix), format!("{}totally-different", prefix)] {
        let response = app.login("bob", &candidate).await;
        assert_eq!(401, response.status().as_u16(), "Extra bytes past the limit must not log in");
    }
    assert_eq!(401, app.login("alice", &format!("{}totally-different", prefix)).await.status().as_u16());
}

// --- Logout Tests ---

#[tokio::test]
async fn logout_revokes_the_access_token() {
    let app = spawn_app();
    let (access_token, _) = app.login_new_user("alice", "secret123").await;

    let response = app.post_with_token("/logout", &access_token).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User logged out");

    let again = app.post_with_token("/logout", &access_token).await;
    assert_eq!(401, again.status().as_u16(), "Revoked token must be rejected");
}

#[tokio::test]
async fn logout_leaves_other_sessions_valid() {
    let app = spawn_app();
    let (first_access, first_refresh) = app.login_new_user("alice", "secret123").await;

    let second: Value = app.login("alice", "secret123").await.json().await.unwrap();
    let second_access = second["access_token"].as_str().unwrap();

    assert_eq!(200, app.post_with_token("/logout", &first_access).await.status().as_u16());

    assert_eq!(200, app.post_with_token("/refresh", &first_refresh).await.status().as_u16());
    assert_eq!(200, app.post_with_token("/logout", second_access).await.status().as_u16());
}

#[tokio::test]
async fn logout_requires_a_token() {
    let app = spawn_app();

    let response = app
        .client
        .post(&app.url("/logout"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn logout_rejects_refresh_tokens_and_garbage() {
    let app = spawn_app();
    let (_, refresh_token) = app.login_new_user("alice", "secret123").await;

    assert_eq!(401, app.post_with_token("/logout", &refresh_token).await.status().as_u16());
    assert_eq!(401, app.post_with_token("/logout", "not.a.token").await.status().as_u16());
}

#[tokio::test]
async fn expired_access_token_is_rejected() {
    let mut jwt = jwt_settings();
    jwt.access_token_expiry = -60;
    let app = spawn_app_with(jwt);
    app.register("alice", "secret123").await;

    let body: Value = app.login("alice", "secret123").await.json().await.unwrap();
    let access_token = body["access_token"].as_str().unwrap();

    assert_eq!(401, app.post_with_token("/logout", access_token).await.status().as_u16());
}

// --- Refresh Tests ---

#[tokio::test]
async fn refresh_issues_non_fresh_access_token() {
    let app = spawn_app();
    let (original_access, refresh_token) = app.login_new_user("alice", "secret123").await;

    let response = app.post_with_token("/refresh", &refresh_token).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body.get("refresh_token").is_none());

    let new_access = body["access_token"].as_str().unwrap();
    let claims = app.claims(new_access);
    assert_eq!(claims.kind, TokenKind::Access);
    assert!(!claims.fresh);
    assert_eq!(claims.sub, app.claims(&original_access).sub);

    assert_eq!(200, app.post_with_token("/logout", new_access).await.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let app = spawn_app();
    let (access_token, _) = app.login_new_user("alice", "secret123").await;

    let response = app.post_with_token("/refresh", &access_token).await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_tokens_signed_with_another_key() {
    let app = spawn_app();
    let (_, refresh_token) = app.login_new_user("alice", "secret123").await;

    let mut other = jwt_settings();
    other.secret = "a-completely-different-secret-of-32-chars".to_string();
    let forged = storekeeper::auth::encode_token(&app.claims(&refresh_token), &other).unwrap();

    assert_eq!(401, app.post_with_token("/refresh", &forged).await.status().as_u16());
}

mod common;

use common::spawn_app;
use serde_json::Value;

// --- Store Tests ---

#[tokio::test]
async fn store_create_get_and_duplicate() {
    let app = spawn_app();

    let missing = app.client.get(&app.url("/store/nonexistent")).send().await.unwrap();
    assert_eq!(404, missing.status().as_u16());
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["message"], "Store not found");

    let created = app.client.post(&app.url("/store/shoes")).send().await.unwrap();
    assert_eq!(201, created.status().as_u16());
    let body: Value = created.json().await.unwrap();
    assert_eq!(body["name"], "shoes");
    assert!(body["id"].is_string());

    let duplicate = app.client.post(&app.url("/store/shoes")).send().await.unwrap();
    assert_eq!(400, duplicate.status().as_u16());
    let body: Value = duplicate.json().await.unwrap();
    assert_eq!(body["message"], "An item with name 'shoes' already exists.");

    let fetched = app.client.get(&app.url("/store/shoes")).send().await.unwrap();
    assert_eq!(200, fetched.status().as_u16());
    let body: Value = fetched.json().await.unwrap();
    assert_eq!(body["name"], "shoes");
}

#[tokio::test]
async fn store_list_returns_all_stores() {
    let app = spawn_app();

    let empty: Value = app.client.get(&app.url("/stores")).send().await.unwrap().json().await.unwrap();
    assert_eq!(empty["stores"].as_array().unwrap().len(), 0);

    for name in ["shoes", "books"] {
        app.client.post(&app.url(&format!("/store/{}", name))).send().await.unwrap();
    }

    let response = app.client.get(&app.url("/stores")).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let names: Vec<&str> = body["stores"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["books", "shoes"]);
}

#[tokio::test]
async fn store_delete_is_idempotent() {
    let app = spawn_app();
    app.client.post(&app.url("/store/shoes")).send().await.unwrap();

    for _ in 0..2 {
        let response = app.client.delete(&app.url("/store/shoes")).send().await.unwrap();
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Store deleted.");
    }

    let gone = app.client.get(&app.url("/store/shoes")).send().await.unwrap();
    assert_eq!(404, gone.status().as_u16());
}

// --- User Tests ---

#[tokio::test]
async fn user_get_and_delete() {
    let app = spawn_app();
    let (access_token, _) = app.login_new_user("alice", "secret123").await;
    let user_id = app.claims(&access_token).sub;

    let response = app.client.get(&app.url(&format!("/user/{}", user_id))).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], user_id.as_str());
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());

    let deleted = app.client.delete(&app.url(&format!("/user/{}", user_id))).send().await.unwrap();
    assert_eq!(200, deleted.status().as_u16());
    let body: Value = deleted.json().await.unwrap();
    assert_eq!(body["message"], "User deleted.");

    let again = app.client.delete(&app.url(&format!("/user/{}", user_id))).send().await.unwrap();
    assert_eq!(404, again.status().as_u16());

    let login = app.login("alice", "secret123").await;
    assert_eq!(401, login.status().as_u16());
}

#[tokio::test]
async fn user_get_returns_404_for_unknown_ids() {
    let app = spawn_app();

    for id in [uuid_like_but_unknown(), "not-a-uuid".to_string()] {
        let response = app.client.get(&app.url(&format!("/user/{}", id))).send().await.unwrap();
        assert_eq!(404, response.status().as_u16(), "id {} should be unknown", id);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "User not found");
    }
}

fn uuid_like_but_unknown() -> String {
    "00000000-0000-4000-8000-000000000000".to_string()
}

// --- Scenario ---

#[tokio::test]
async fn register_login_logout_then_protected_action_is_rejected() {
    let app = spawn_app();

    assert_eq!(201, app.register("alice", "secret123").await.status().as_u16());

    let login = app.login("alice", "secret123").await;
    assert_eq!(200, login.status().as_u16());
    let tokens: Value = login.json().await.unwrap();
    assert!(tokens["access_token"].is_string());
    assert!(tokens["refresh_token"].is_string());
    let access_token = tokens["access_token"].as_str().unwrap();

    assert_eq!(200, app.post_with_token("/logout", access_token).await.status().as_u16());
    assert_eq!(401, app.post_with_token("/logout", access_token).await.status().as_u16());
}

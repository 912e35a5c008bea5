#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::TcpListener;
use storekeeper::auth::{decode_token, AuthService, Claims};
use storekeeper::configuration::{JwtSettings, PasswordSettings};
use storekeeper::startup::{run, Storage};

/// Lowest bcrypt cost, keeps the suite fast
pub const TEST_HASH_COST: u32 = 4;

pub struct TestApp {
    pub address: String,
    pub jwt: JwtSettings,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-at-least-32-characters".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 3600,
        issuer: "storekeeper-test".to_string(),
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(jwt_settings())
}

pub fn spawn_app_with(jwt: JwtSettings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let storage = Storage::in_memory();
    let auth = AuthService::new(
        storage.users.clone(),
        storage.revocations.clone(),
        jwt.clone(),
        TEST_HASH_COST,
    )
    .expect("Failed to build auth service");
    let server = run(
        listener,
        storage,
        auth,
        PasswordSettings {
            hash_cost: TEST_HASH_COST,
        },
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        jwt,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_with_token(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        self.post_json("/register", &json!({"username": username, "password": password}))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post_json("/login", &json!({"username": username, "password": password}))
            .await
    }

    /// Register and log in, returning (access_token, refresh_token)
    pub async fn login_new_user(&self, username: &str, password: &str) -> (String, String) {
        assert_eq!(201, self.register(username, password).await.status().as_u16());

        let response = self.login(username, password).await;
        assert_eq!(200, response.status().as_u16());

        let body: Value = response.json().await.expect("Failed to parse response");
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    pub fn claims(&self, token: &str) -> Claims {
        decode_token(token, &self.jwt).expect("Token should decode")
    }
}

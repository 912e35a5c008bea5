/// Authentication Routes
///
/// Login, logout and access token refresh.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, Authenticated};
use crate::error::AppError;
use crate::routes::MessageResponse;
use crate::validators::required_field;

/// Body of `/register` and `/login`
///
/// Both fields are optional at the serde level so that a missing field gets
/// the same blank-field message as an empty one.
#[derive(Deserialize)]
pub struct CredentialsForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /login
///
/// Authenticate with username and password. Returns a fresh access token
/// and a refresh token.
///
/// # Errors
/// - 400: Missing username or password
/// - 401: Invalid credentials (unknown user and wrong password look the same)
pub async fn login(
    form: web::Json<CredentialsForm>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let username = required_field(form.username.as_deref(), "username")?.trim();
    let password = required_field(form.password.as_deref(), "password")?;

    let tokens = auth.login(username, password).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: auth.settings().access_token_expiry,
    }))
}

/// POST /logout
///
/// **Requires a valid access token.** Blacklists the token's jti; other
/// tokens held by the same user keep working.
pub async fn logout(
    principal: web::ReqData<Authenticated>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    auth.logout(&principal).await?;

    tracing::info!(user_id = %principal.user_id(), "User logged out");

    Ok(HttpResponse::Ok().json(MessageResponse::new("User logged out")))
}

/// POST /refresh
///
/// **Requires a valid refresh token.** Returns a new, non-fresh access token.
pub async fn refresh(
    principal: web::ReqData<Authenticated>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let access_token = auth.refresh(&principal).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: auth.settings().access_token_expiry,
    }))
}

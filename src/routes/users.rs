use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::audit::AuditEvent;
use crate::auth::hash_password;
use crate::configuration::PasswordSettings;
use crate::error::AppError;
use crate::repository::{username_taken, UserRepository, UserResponse};
use crate::routes::{CredentialsForm, MessageResponse};
use crate::validators::{is_valid_username, required_field};

const USER_NOT_FOUND: &str = "User not found";

fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(USER_NOT_FOUND))
}

/// POST /register
///
/// # Errors
/// - 400: Blank field, password too short/long, or username taken
pub async fn register(
    form: web::Json<CredentialsForm>,
    users: web::Data<dyn UserRepository>,
    password_settings: web::Data<PasswordSettings>,
) -> Result<HttpResponse, AppError> {
    let username = is_valid_username(required_field(form.username.as_deref(), "username")?)?;
    let password = required_field(form.password.as_deref(), "password")?;

    if users.find_by_username(&username).await?.is_some() {
        AuditEvent::failure("REGISTER", "user", "Username already taken").emit();
        return Err(username_taken());
    }

    let password_hash = hash_password(password, password_settings.hash_cost)?;
    let user = users.insert(&username, &password_hash).await?;

    AuditEvent::success("REGISTER", "user", "User created")
        .with_resource_id(user.id.to_string())
        .emit();

    Ok(HttpResponse::Created().json(MessageResponse::new("User created successfully.")))
}

/// GET /user/{id}
pub async fn get_user(
    path: web::Path<String>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let user_id = parse_user_id(&path)?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// DELETE /user/{id}
pub async fn delete_user(
    path: web::Path<String>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let user_id = parse_user_id(&path)?;

    if !users.delete(user_id).await? {
        return Err(AppError::not_found(USER_NOT_FOUND));
    }

    AuditEvent::success("DELETE", "user", "User deleted")
        .with_resource_id(user_id.to_string())
        .emit();

    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted.")))
}

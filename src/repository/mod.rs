/// Credential Store
///
/// Persistence for users and stores behind two traits. Handlers and the
/// auth service only see the traits; the backend is picked at startup.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

pub mod memory;
mod postgres;

pub use postgres::{PgStoreRepository, PgUserRepository};

/// A registered user. The hash never leaves the server.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// Public JSON shape of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// # Errors
    /// `Conflict` if the username is taken
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Store>, AppError>;

    async fn find_all(&self) -> Result<Vec<Store>, AppError>;

    /// # Errors
    /// `Conflict` if the name is taken
    async fn insert(&self, name: &str) -> Result<Store, AppError>;

    /// Returns whether a row was removed
    async fn delete_by_name(&self, name: &str) -> Result<bool, AppError>;
}

pub(crate) fn username_taken() -> AppError {
    AppError::conflict("A user with that username already exists")
}

pub(crate) fn store_name_taken(name: &str) -> AppError {
    AppError::conflict(format!("An item with name '{}' already exists.", name))
}

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{store_name_taken, username_taken, Store, StoreRepository, User, UserRepository};
use crate::error::{AppError, DatabaseError};

/// Map a failed INSERT: unique violations become `conflict`, query failures
/// become a generic insert failure.
fn insert_error(err: impl Into<AppError>, conflict: AppError) -> AppError {
    match err.into() {
        AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => conflict,
        AppError::Database(DatabaseError::QueryExecution(msg)) => {
            AppError::Database(DatabaseError::InsertFailed(msg))
        }
        other => other,
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, username, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, username, password_hash)| User {
            id,
            username,
            password_hash,
        }))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, username, password_hash)| User {
            id,
            username,
            password_hash,
        }))
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let user_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, username_taken()))?;

        Ok(User {
            id: user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>("SELECT id, name FROM stores WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(store)
    }

    async fn find_all(&self) -> Result<Vec<Store>, AppError> {
        let stores = sqlx::query_as::<_, Store>("SELECT id, name FROM stores ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(stores)
    }

    async fn insert(&self, name: &str) -> Result<Store, AppError> {
        let store_id = Uuid::new_v4();

        sqlx::query("INSERT INTO stores (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(store_id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, store_name_taken(name)))?;

        Ok(Store {
            id: store_id,
            name: name.to_string(),
        })
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM stores WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Token Blacklist
///
/// Revoked token identifiers (jti), consulted on every authorization.
/// Each entry remembers when its token expires; after that moment the token
/// is rejected by signature validation anyway and the entry can be purged.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::error::AppError;

/// Revocation store shared by every request handler
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn contains(&self, jti: &str) -> Result<bool, AppError>;

    /// Mark `jti` revoked until `expires_at` (Unix timestamp).
    /// Adding a jti that is already present is a no-op.
    async fn add(&self, jti: &str, expires_at: i64) -> Result<(), AppError>;

    /// Drop entries whose token expired strictly before `now`.
    /// Returns the number of entries removed.
    async fn purge_expired(&self, now: i64) -> Result<u64, AppError>;
}

/// Process-local blacklist
#[derive(Default)]
pub struct InMemoryBlacklist {
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationStore for InMemoryBlacklist {
    async fn contains(&self, jti: &str) -> Result<bool, AppError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.contains_key(jti))
    }

    async fn add(&self, jti: &str, expires_at: i64) -> Result<(), AppError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(jti.to_string()).or_insert(expires_at);
        Ok(())
    }

    async fn purge_expired(&self, now: i64) -> Result<u64, AppError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        Ok((before - entries.len()) as u64)
    }
}

/// Blacklist shared by every instance pointing at the same database
pub struct PgBlacklist {
    pool: PgPool,
}

impl PgBlacklist {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_datetime(timestamp: i64) -> Result<chrono::DateTime<Utc>, AppError> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| AppError::Internal(format!("Timestamp out of range: {}", timestamp)))
}

#[async_trait]
impl RevocationStore for PgBlacklist {
    async fn contains(&self, jti: &str) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i32>("SELECT 1 FROM token_blacklist WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn add(&self, jti: &str, expires_at: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO token_blacklist (jti, expires_at, revoked_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(to_datetime(expires_at)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < $1")
            .bind(to_datetime(now)?)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Periodically evict entries for tokens that have expired on their own
pub fn spawn_blacklist_sweeper(
    store: Arc<dyn RevocationStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match store.purge_expired(Utc::now().timestamp()).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Purged expired blacklist entries"),
                Err(e) => tracing::error!(error = %e, "Blacklist sweep failed"),
            }
        }
    })
}

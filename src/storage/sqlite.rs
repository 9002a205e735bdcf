use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{
    config::StorageConfig,
    error::{AppError, Result},
};
use super::{entry_size, KeyValueStore};

/// Key-value store persisted in a single SQLite table.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    quota: Option<u64>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool, quota: Option<u64>) -> Self {
        Self { pool, quota }
    }

    /// Opens (creating if needed) the database named in the config and runs migrations.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Storage opened at {}", config.url);
        Ok(Self::new(pool, config.quota_chars))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(quota) = self.quota {
            let others: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(LENGTH(key) + LENGTH(value)), 0) FROM kv_entries WHERE key != ?",
            )
            .bind(key)
            .fetch_one(&mut *tx)
            .await?;

            let total = others.max(0) as u64 + entry_size(key, value);
            if total > quota {
                return Err(AppError::StorageQuotaExceeded(format!(
                    "Writing '{}' needs {} of {} characters",
                    key, total, quota
                )));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().naive_utc())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM kv_entries ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;

use crate::app::repositories::KeyValueStore;

use super::DatabaseConnectionRef;

/// Key-value store kept in a single SQLite table. Values are stored as JSON
/// text, one row per key.
pub struct DbStore {
    db: DatabaseConnectionRef,
}

impl DbStore {
    pub fn new(db: DatabaseConnectionRef) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for DbStore {
    async fn open(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL)",
        )
        .execute(self.db.as_pool())
        .await
        .context("could not open the local store")?;

        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let optional_row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(self.db.as_pool())
            .await?;

        let Some(row) = optional_row else {
            return Ok(None);
        };

        let raw: String = row.try_get(0)?;
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("value stored under `{}` is not valid JSON", key))?;

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        // A single upsert statement, so the old value is replaced atomically.
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value.to_string())
        .execute(self.db.as_pool())
        .await?;

        Ok(())
    }
}

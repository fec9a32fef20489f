use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

/// Persistent store addressed by string keys.
///
/// `set` replaces the whole value under a key atomically; there is no partial
/// update path.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Must be awaited before `get`/`set`. Opening twice is allowed.
    async fn open(&self) -> anyhow::Result<()>;

    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;
}

/// Source of remotely controlled feature flags.
#[async_trait]
pub trait FlagSource: Send + Sync {
    /// Fetches the current remote configuration and returns the activated
    /// flag values.
    async fn fetch_and_activate(&self) -> anyhow::Result<HashMap<String, bool>>;
}

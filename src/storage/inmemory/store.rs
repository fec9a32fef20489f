use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::app::repositories::KeyValueStore;

struct MutableStore {
    opened: bool,
    values: HashMap<String, Value>,
}

/// Process-local store. Contents are lost on exit.
pub struct InMemoryStore {
    state: Mutex<MutableStore>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MutableStore {
                opened: false,
                values: HashMap::new(),
            }),
        }
    }
}

fn ensure_opened(state: &MutableStore) -> anyhow::Result<()> {
    if !state.opened {
        return Err(anyhow::anyhow!("in-memory store has not been opened"));
    }

    Ok(())
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn open(&self) -> anyhow::Result<()> {
        self.state.lock().unwrap().opened = true;
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let state = self.state.lock().unwrap();
        ensure_opened(&state)?;

        Ok(state.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        ensure_opened(&state)?;

        state.values.insert(key.to_string(), value);
        Ok(())
    }
}

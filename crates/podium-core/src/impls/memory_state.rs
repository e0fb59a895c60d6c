//! InMemoryStateStore - プロセス内だけの永続化（開発・テスト用）

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::Result;
use crate::ports::StateStore;

#[derive(Default)]
pub struct InMemoryStateStore {
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, key: &str, default: serde_json::Value) -> Result<serde_json::Value> {
        let values = self.values.lock().await;
        Ok(values.get(key).cloned().unwrap_or(default))
    }

    async fn save(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value.clone());
        Ok(())
    }
}

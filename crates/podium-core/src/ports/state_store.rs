//! StateStore port - 再起動をまたいで JSON を保存する key/value ストア
//!
//! 実装:
//! - InMemoryStateStore（開発・テスト用）
//! - JsonFileStateStore（単一の JSON ファイル）

use async_trait::async_trait;

use crate::domain::Result;

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns `default` when nothing was saved under `key`.
    async fn load(&self, key: &str, default: serde_json::Value) -> Result<serde_json::Value>;

    /// A successful save is visible to the next `load`.
    async fn save(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}

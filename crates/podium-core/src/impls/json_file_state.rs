//! JsonFileStateStore - 単一 JSON ファイルに key ごとの値を保存
//!
//! The file holds one JSON object; each key is a top-level field. Writes go
//! to a sibling temp file that is then renamed over the original, so a crash
//! mid-write leaves the previous state intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::domain::{Result, ScheduleError};
use crate::ports::StateStore;

pub struct JsonFileStateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_object(&self, key: &str) -> Result<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(persistence(key, format!("cannot read state: {e}"))),
        };
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(persistence(
                key,
                format!("state file is not a JSON object (found {})", type_name(&other)),
            )),
        }
    }
}

fn persistence(key: &str, message: String) -> ScheduleError {
    ScheduleError::Persistence {
        key: key.to_string(),
        message,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self, key: &str, default: Value) -> Result<Value> {
        let mut object = self.read_object(key).await?;
        Ok(object.remove(key).unwrap_or(default))
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut object = self.read_object(key).await?;
        object.insert(key.to_string(), value.clone());
        let bytes = serde_json::to_vec_pretty(&Value::Object(object))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence(key, format!("cannot create state dir: {e}")))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| persistence(key, format!("cannot write state: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| persistence(key, format!("cannot replace state: {e}")))?;
        Ok(())
    }
}

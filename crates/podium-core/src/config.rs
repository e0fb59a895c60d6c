//! Scheduler configuration.
//!
//! Every field has a default, so an empty TOML table is a valid config.

use std::path::Path;

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::DEFAULT_COMPLETED_CAP;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Primary query window, applied both ahead of and behind now.
    pub lookahead_minutes: i64,
    pub early_lookahead_minutes: i64,
    pub early_lookbehind_minutes: i64,
    /// Pause between the end of one cycle and the start of the next.
    pub poll_interval_secs: u64,
    /// Skippable reminders older than this are dropped instead of sent.
    pub stale_after_secs: i64,
    pub completed_cap: usize,
    pub qa_buffer_secs: i64,
    /// How many due tasks may be dispatched at once within one cycle.
    pub dispatch_concurrency: usize,
    pub state_key: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead_minutes: 15,
            early_lookahead_minutes: 75,
            early_lookbehind_minutes: 15,
            poll_interval_secs: 8,
            stale_after_secs: 600,
            completed_cap: DEFAULT_COMPLETED_CAP,
            qa_buffer_secs: 0,
            dispatch_concurrency: 1,
            state_key: "scheduler".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::seconds(self.stale_after_secs)
    }

    pub fn qa_buffer(&self) -> Duration {
        Duration::seconds(self.qa_buffer_secs)
    }

    /// Problems that make the config unusable, empty when it is fine.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.poll_interval_secs == 0 {
            problems.push("poll_interval_secs must be greater than zero".to_string());
        }
        if self.completed_cap == 0 {
            problems.push("completed_cap must be greater than zero".to_string());
        }
        if self.dispatch_concurrency == 0 {
            problems.push("dispatch_concurrency must be greater than zero".to_string());
        }
        if self.lookahead_minutes < 0
            || self.early_lookahead_minutes < 0
            || self.early_lookbehind_minutes < 0
        {
            problems.push("query windows must not be negative".to_string());
        }
        if self.state_key.is_empty() {
            problems.push("state_key must not be empty".to_string());
        }
        problems
    }
}

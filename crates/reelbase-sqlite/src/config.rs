//! SQLite adapter configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how a [`SqliteAdapter`](crate::SqliteAdapter) connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqliteAdapterConfig {
    /// Database file; created if missing.
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a statement waits on another connection's write lock
    /// before failing with a retryable error.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    SqliteAdapterConfig::DEFAULT_MAX_CONNECTIONS
}

fn default_busy_timeout_ms() -> u64 {
    SqliteAdapterConfig::DEFAULT_BUSY_TIMEOUT_MS
}

impl SqliteAdapterConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: Self::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

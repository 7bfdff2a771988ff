//! File adapter configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where a [`FileAdapter`](crate::FileAdapter) keeps its documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAdapterConfig {
    /// Data directory; created on first write.
    pub root: PathBuf,

    /// How long a writer waits for the store lock before giving up with
    /// a retryable error.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    FileAdapterConfig::DEFAULT_LOCK_TIMEOUT_MS
}

impl FileAdapterConfig {
    pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            lock_timeout_ms: Self::DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

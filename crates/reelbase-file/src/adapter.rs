//! Document-store adapter implementation.

use std::path::Path;

use async_trait::async_trait;
use tracing::instrument;

use reelbase_core::error::Error;
use reelbase_core::query::{ListFilter, ListPage, Pagination};
use reelbase_core::{CatalogRecord, Mutator, RecordId, Result, StorageAdapter};

use crate::config::FileAdapterConfig;
use crate::store::DocumentStore;

/// Filesystem-backed document-store adapter.
///
/// Blocking file work runs on the blocking thread pool. Once started, an
/// operation runs to completion even if the caller stops waiting, and the
/// rename-based writes mean it either lands completely or not at all.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    store: DocumentStore,
}

impl FileAdapter {
    /// Create an adapter over the configured data directory.
    pub fn new(config: FileAdapterConfig) -> Self {
        Self {
            store: DocumentStore::new(&config.root, config.lock_timeout()),
        }
    }

    /// Get the data directory.
    pub fn root(&self) -> &Path {
        self.store.root()
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(DocumentStore) -> Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(store))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl StorageAdapter for FileAdapter {
    fn name(&self) -> &'static str {
        "file"
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert(&self, record: CatalogRecord) -> Result<()> {
        self.blocking(move |store| store.insert(&record)).await
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord> {
        let id = id.clone();
        self.blocking(move |store| store.get(&id)).await
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ListFilter, pagination: &Pagination) -> Result<ListPage> {
        let filter = filter.clone();
        let pagination = pagination.clone();
        self.blocking(move |store| store.list(&filter, &pagination))
            .await
    }

    #[instrument(skip(self, mutator))]
    async fn update_if_version_matches(
        &self,
        id: &RecordId,
        expected_version: u64,
        mutator: Mutator,
    ) -> Result<CatalogRecord> {
        let id = id.clone();
        self.blocking(move |store| store.update(&id, expected_version, mutator))
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &RecordId) -> Result<()> {
        let id = id.clone();
        self.blocking(move |store| store.delete(&id)).await
    }
}

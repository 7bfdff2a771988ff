//! Storage adapter trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::concurrency::Mutator;
use crate::query::{ListFilter, ListPage, Pagination};
use crate::record::CatalogRecord;
use crate::types::RecordId;

/// A storage backend for catalog records.
///
/// Adapters only store and retrieve what the repository hands them; they
/// never generate ids. Every backend must honor the same error contract:
///
/// - [`AdapterError::DuplicateId`](crate::error::AdapterError::DuplicateId)
///   from `insert` when the id is taken,
/// - [`AdapterError::NotFound`](crate::error::AdapterError::NotFound)
///   from `get_by_id`, `update_if_version_matches` and `delete`,
/// - [`AdapterError::VersionConflict`](crate::error::AdapterError::VersionConflict)
///   from `update_if_version_matches`,
/// - [`Error::Unavailable`](crate::Error::Unavailable) when the backend
///   itself cannot be reached.
///
/// A mutating call that is abandoned midway must either fully apply or
/// leave no trace.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Store a new record keyed by its id.
    async fn insert(&self, record: CatalogRecord) -> Result<()>;

    /// Fetch a record by id.
    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord>;

    /// List records matching `filter`, newest first.
    ///
    /// Ties on `created_at` are broken by `id` ascending. The returned
    /// cursor, when present, resumes right after the last record of the page.
    async fn list(&self, filter: &ListFilter, pagination: &Pagination) -> Result<ListPage>;

    /// Atomically replace a record if its version is `expected_version`.
    ///
    /// The read, the version check, [`Mutator::apply`] and the write all
    /// happen inside one critical section for `id`. Contention is never
    /// waited out: a stale version fails immediately.
    async fn update_if_version_matches(
        &self,
        id: &RecordId,
        expected_version: u64,
        mutator: Mutator,
    ) -> Result<CatalogRecord>;

    /// Permanently remove a record.
    ///
    /// Deleting an absent record is an error, so a repeated delete fails.
    async fn delete(&self, id: &RecordId) -> Result<()>;
}

#[async_trait]
impl<T: StorageAdapter + ?Sized> StorageAdapter for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn insert(&self, record: CatalogRecord) -> Result<()> {
        (**self).insert(record).await
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord> {
        (**self).get_by_id(id).await
    }

    async fn list(&self, filter: &ListFilter, pagination: &Pagination) -> Result<ListPage> {
        (**self).list(filter, pagination).await
    }

    async fn update_if_version_matches(
        &self,
        id: &RecordId,
        expected_version: u64,
        mutator: Mutator,
    ) -> Result<CatalogRecord> {
        (**self)
            .update_if_version_matches(id, expected_version, mutator)
            .await
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        (**self).delete(id).await
    }
}

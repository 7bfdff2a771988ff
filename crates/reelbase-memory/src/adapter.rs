//! HashMap-backed storage adapter.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, instrument};

use reelbase_core::error::{AdapterError, Error};
use reelbase_core::query::{ListFilter, ListPage, Pagination, paginate};
use reelbase_core::{CatalogRecord, Mutator, RecordId, Result, StorageAdapter};

type Records = HashMap<RecordId, CatalogRecord>;

/// In-memory storage adapter.
///
/// Each mutation runs inside one write-lock critical section with no
/// `.await` in it, so it is atomic even if the calling future is dropped.
/// Readers get clones and never see a half-written record. Clones share
/// the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    records: Arc<RwLock<Records>>,
}

impl MemoryAdapter {
    /// Create an empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|_| Error::internal("record store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>> {
        self.records
            .write()
            .map_err(|_| Error::internal("record store lock poisoned"))
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert(&self, record: CatalogRecord) -> Result<()> {
        let mut records = self.write()?;
        match records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(AdapterError::DuplicateId { id: record.id }.into()),
            Entry::Vacant(slot) => {
                slot.insert(record);
                debug!("Inserted record");
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound { id: id.clone() }.into())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ListFilter, pagination: &Pagination) -> Result<ListPage> {
        let records = self.read()?;
        Ok(paginate(
            records.values().filter(|r| filter.matches(r)).cloned(),
            filter,
            pagination,
        ))
    }

    #[instrument(skip(self, mutator))]
    async fn update_if_version_matches(
        &self,
        id: &RecordId,
        expected_version: u64,
        mutator: Mutator,
    ) -> Result<CatalogRecord> {
        let mut records = self.write()?;
        let current = records
            .get_mut(id)
            .ok_or_else(|| AdapterError::NotFound { id: id.clone() })?;

        let next = mutator.apply(current, expected_version)?;
        *current = next.clone();

        debug!(version = next.version, "Updated record");
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &RecordId) -> Result<()> {
        let mut records = self.write()?;
        match records.remove(id) {
            Some(_) => {
                debug!("Deleted record");
                Ok(())
            }
            None => Err(AdapterError::NotFound { id: id.clone() }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelbase_core::{Kind, RecordDraft, RecordPatch};

    fn record(title: &str) -> CatalogRecord {
        CatalogRecord::new(
            RecordId::generate(),
            RecordDraft {
                title: title.to_string(),
                description: None,
                kind: Kind::Movie,
                year: None,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let adapter = MemoryAdapter::new();
        let rec = record("Alien");

        adapter.insert(rec.clone()).await.unwrap();
        let err = adapter.insert(rec.clone()).await.unwrap_err();

        assert!(matches!(err, Error::Adapter(AdapterError::DuplicateId { .. })));
        assert_eq!(adapter.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let adapter = MemoryAdapter::new();
        let other = adapter.clone();
        let rec = record("Aliens");

        adapter.insert(rec.clone()).await.unwrap();
        assert_eq!(other.get_by_id(&rec.id).await.unwrap(), rec);
    }

    #[tokio::test]
    async fn failed_update_leaves_record_untouched() {
        let adapter = MemoryAdapter::new();
        let rec = record("Alien 3");
        adapter.insert(rec.clone()).await.unwrap();

        let mutator = Mutator::from_patch(Utc::now(), RecordPatch::default().with_title(""));
        assert!(adapter
            .update_if_version_matches(&rec.id, 1, mutator)
            .await
            .is_err());

        assert_eq!(adapter.get_by_id(&rec.id).await.unwrap(), rec);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let adapter = MemoryAdapter::new();
        let mutator = Mutator::from_patch(Utc::now(), RecordPatch::default());
        let err = adapter
            .update_if_version_matches(&RecordId::generate(), 1, mutator)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn poisoned_store_reports_internal_error() {
        let adapter = MemoryAdapter::new();
        let records = adapter.records.clone();
        let _ = std::thread::spawn(move || {
            let _guard = records.write().unwrap();
            panic!("writer died");
        })
        .join();

        let err = adapter.len().unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
        assert!(adapter.is_empty().is_err());
    }
}

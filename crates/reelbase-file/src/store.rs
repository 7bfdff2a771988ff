//! Filesystem storage for the document adapter.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{debug, warn};

use reelbase_core::error::{AdapterError, Error};
use reelbase_core::query::{ListFilter, ListPage, Pagination, paginate};
use reelbase_core::{CatalogRecord, Mutator, RecordId, Result};

fn map_io(path: &Path, err: io::Error) -> Error {
    Error::unavailable(format!("{}: {}", path.display(), err))
}

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Holds the store lock until dropped.
struct StoreLock(File);

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            warn!(error = %e, "Failed to release store lock");
        }
    }
}

/// Synchronous document storage.
///
/// Writers hold the store lock for their whole read-check-write sequence.
/// Documents are replaced by writing a temp file and renaming it over the
/// old one, so readers take no lock: they see either the old or the new
/// document, never a partial one.
#[derive(Debug, Clone)]
pub(crate) struct DocumentStore {
    root: PathBuf,
    lock_timeout: Duration,
}

impl DocumentStore {
    pub(crate) fn new(root: impl AsRef<Path>, lock_timeout: Duration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            lock_timeout,
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory holding one document per record.
    fn records_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("store.lock")
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        // Record ids are restricted to [A-Za-z0-9_-], so they are safe file names.
        self.records_dir().join(format!("{}.json", id))
    }

    /// Take the writer lock, giving up after the configured timeout.
    fn lock(&self) -> Result<StoreLock> {
        let records_dir = self.records_dir();
        fs::create_dir_all(&records_dir).map_err(|e| map_io(&records_dir, e))?;

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;

        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return Ok(StoreLock(file)),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if Instant::now() >= deadline {
                        return Err(Error::unavailable(format!(
                            "{}: still held by another writer after {:?}",
                            lock_path.display(),
                            self.lock_timeout
                        )));
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(map_io(&lock_path, e)),
            }
        }
    }

    fn read_document(&self, path: &Path) -> Result<Option<CatalogRecord>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io(path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::internal(format!("corrupt document {}: {}", path.display(), e)))
    }

    fn write_document(&self, record: &CatalogRecord) -> Result<()> {
        let path = self.record_path(&record.id);
        let content = serde_json::to_string_pretty(record).map_err(Error::internal)?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|e| map_io(&temp_path, e))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| map_io(&temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| map_io(&path, e))?;

        Ok(())
    }

    // ========================================================================
    // Record Operations
    // ========================================================================

    pub(crate) fn insert(&self, record: &CatalogRecord) -> Result<()> {
        let _lock = self.lock()?;

        let path = self.record_path(&record.id);
        if path.try_exists().map_err(|e| map_io(&path, e))? {
            return Err(AdapterError::DuplicateId {
                id: record.id.clone(),
            }
            .into());
        }

        self.write_document(record)?;
        debug!(id = %record.id, "Wrote record document");
        Ok(())
    }

    pub(crate) fn get(&self, id: &RecordId) -> Result<CatalogRecord> {
        self.read_document(&self.record_path(id))?
            .ok_or_else(|| AdapterError::NotFound { id: id.clone() }.into())
    }

    pub(crate) fn list(&self, filter: &ListFilter, pagination: &Pagination) -> Result<ListPage> {
        let dir = self.records_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(paginate(Vec::new(), filter, pagination));
            }
            Err(e) => return Err(map_io(&dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| map_io(&dir, e))?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            match self.read_document(&path) {
                Ok(Some(record)) if filter.matches(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
            }
        }

        Ok(paginate(records, filter, pagination))
    }

    pub(crate) fn update(
        &self,
        id: &RecordId,
        expected_version: u64,
        mutator: Mutator,
    ) -> Result<CatalogRecord> {
        let _lock = self.lock()?;

        let current = self
            .read_document(&self.record_path(id))?
            .ok_or_else(|| AdapterError::NotFound { id: id.clone() })?;

        let next = mutator.apply(&current, expected_version)?;
        self.write_document(&next)?;

        debug!(%id, version = next.version, "Rewrote record document");
        Ok(next)
    }

    pub(crate) fn delete(&self, id: &RecordId) -> Result<()> {
        let _lock = self.lock()?;
        let path = self.record_path(id);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(%id, "Removed record document");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(AdapterError::NotFound { id: id.clone() }.into())
            }
            Err(e) => Err(map_io(&path, e)),
        }
    }
}

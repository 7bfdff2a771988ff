//! The catalog repository.
//!
//! This is the only entry point callers use. It validates input before
//! touching storage, owns record identity, hands updates to the
//! [`ConcurrencyController`], and passes adapter errors through unchanged.

use std::sync::Arc;

use async_stream::try_stream;
use futures_core::Stream;
use tracing::{debug, error, instrument, warn};

use crate::Result;
use crate::concurrency::ConcurrencyController;
use crate::config::RepositoryConfig;
use crate::error::{Error, ValidationError};
use crate::query::{ListFilter, ListPage, Pagination};
use crate::record::{CatalogRecord, RecordInput, RecordPatch, validate, validate_patch};
use crate::traits::{Clock, StorageAdapter, SystemClock};
use crate::types::RecordId;

/// Record lifecycle operations over one storage adapter.
///
/// # Example
///
/// ```ignore
/// let repo = CatalogRepository::new(MemoryAdapter::new());
///
/// let dune = repo.create(RecordInput::new("Dune").with_year(2021)).await?;
/// let dune = repo.update(&dune.id, dune.version, RecordPatch::default().with_year(2022)).await?;
/// assert_eq!(dune.version, 2);
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository<A> {
    adapter: A,
    config: RepositoryConfig,
    clock: Arc<dyn Clock>,
    controller: ConcurrencyController,
}

impl<A: StorageAdapter> CatalogRepository<A> {
    /// Create a repository with the default configuration and wall clock.
    pub fn new(adapter: A) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            adapter,
            config: RepositoryConfig::default(),
            controller: ConcurrencyController::new(clock.clone()),
            clock,
        }
    }

    /// Create a repository with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the page sizes are inconsistent.
    pub fn with_config(adapter: A, config: RepositoryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(adapter)
        })
    }

    /// Replace the clock used for timestamps and year bounds.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.controller = ConcurrencyController::new(clock.clone());
        self.clock = clock;
        self
    }

    /// Access the underlying adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Validate `input` and store it as a new record at version 1.
    #[instrument(skip(self, input), fields(adapter = self.adapter.name()))]
    pub async fn create(&self, input: RecordInput) -> Result<CatalogRecord> {
        let now = self.clock.now();
        let draft = validate(&input, now)?;
        let record = CatalogRecord::new(RecordId::generate(), draft, now);

        self.adapter
            .insert(record.clone())
            .await
            .inspect_err(log_unclassified)?;

        debug!(id = %record.id, title = %record.title, "Created record");
        Ok(record)
    }

    /// Fetch a record by id.
    #[instrument(skip(self), fields(adapter = self.adapter.name(), %id))]
    pub async fn get(&self, id: &RecordId) -> Result<CatalogRecord> {
        self.adapter
            .get_by_id(id)
            .await
            .inspect_err(log_unclassified)
    }

    /// List one page of records, newest first.
    ///
    /// A missing limit takes the configured default; filtering and
    /// ordering are done by the adapter.
    #[instrument(skip(self, filter, pagination), fields(adapter = self.adapter.name()))]
    pub async fn list(&self, filter: ListFilter, pagination: Pagination) -> Result<ListPage> {
        let pagination = self.check_query(&filter, pagination)?;
        let page = self
            .adapter
            .list(&filter, &pagination)
            .await
            .inspect_err(log_unclassified)?;
        debug!(count = page.records.len(), more = page.next_cursor.is_some(), "Listed records");
        Ok(page)
    }

    /// Apply `patch` if the record is still at `expected_version`.
    ///
    /// Provided fields are validated before the adapter is called; the
    /// merged record is validated again inside the compare-and-swap.
    #[instrument(skip(self, patch), fields(adapter = self.adapter.name(), %id))]
    pub async fn update(
        &self,
        id: &RecordId,
        expected_version: u64,
        patch: RecordPatch,
    ) -> Result<CatalogRecord> {
        validate_patch(&patch, self.clock.now())?;
        self.controller
            .update(&self.adapter, id, expected_version, patch)
            .await
    }

    /// Permanently delete a record.
    #[instrument(skip(self), fields(adapter = self.adapter.name(), %id))]
    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        self.adapter
            .delete(id)
            .await
            .inspect_err(log_unclassified)?;
        debug!("Deleted record");
        Ok(())
    }

    /// Stream every record matching `filter`, fetching pages lazily.
    ///
    /// Pages are chained by cursor, so records created after the walk
    /// started are not revisited and deleted ones are simply skipped.
    pub fn records(
        &self,
        filter: ListFilter,
    ) -> impl Stream<Item = Result<CatalogRecord>> + Send + '_ {
        let limit = self.config.max_page_size;
        try_stream! {
            let mut pagination = Pagination::first(limit);
            loop {
                let page = self.list(filter.clone(), pagination).await?;
                for record in page.records {
                    yield record;
                }
                match page.next_cursor {
                    Some(cursor) => pagination = Pagination::after(cursor, limit),
                    None => break,
                }
            }
        }
    }

    fn check_query(&self, filter: &ListFilter, pagination: Pagination) -> Result<Pagination> {
        if let (Some(from), Some(to)) = (filter.year_from, filter.year_to)
            && from > to
        {
            return Err(ValidationError::InvalidYearRange { from, to }.into());
        }

        if pagination.cursor.is_some() && pagination.offset.is_some() {
            return Err(ValidationError::InvalidPagination {
                reason: "cursor and offset cannot be combined".to_string(),
            }
            .into());
        }

        let limit = pagination.limit.unwrap_or(self.config.default_page_size);
        if limit == 0 || limit > self.config.max_page_size {
            return Err(ValidationError::InvalidLimit {
                limit,
                max: self.config.max_page_size,
            }
            .into());
        }

        Ok(Pagination {
            limit: Some(limit),
            ..pagination
        })
    }
}

/// Log storage failures that carry no domain meaning for the caller.
fn log_unclassified(err: &Error) {
    match err {
        Error::Unavailable { .. } => warn!(error = %err, "Storage unavailable"),
        Error::Internal { .. } => error!(error = %err, "Storage failure"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::Mutator;
    use crate::error::AdapterError;
    use async_trait::async_trait;
    use std::io;
    use std::sync::Mutex;

    /// Adapter whose backend is gone, or whose records never exist.
    #[derive(Debug)]
    struct BrokenAdapter {
        failure: fn() -> Error,
    }

    #[async_trait]
    impl StorageAdapter for BrokenAdapter {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn insert(&self, _record: CatalogRecord) -> Result<()> {
            Err((self.failure)())
        }

        async fn get_by_id(&self, _id: &RecordId) -> Result<CatalogRecord> {
            Err((self.failure)())
        }

        async fn list(&self, _filter: &ListFilter, _pagination: &Pagination) -> Result<ListPage> {
            Err((self.failure)())
        }

        async fn update_if_version_matches(
            &self,
            _id: &RecordId,
            _expected_version: u64,
            _mutator: Mutator,
        ) -> Result<CatalogRecord> {
            Err((self.failure)())
        }

        async fn delete(&self, _id: &RecordId) -> Result<()> {
            Err((self.failure)())
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    fn capture_logs() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (captured, tracing::subscriber::set_default(subscriber))
    }

    #[tokio::test]
    async fn test_storage_failures_are_logged() {
        let (logs, _guard) = capture_logs();
        let repo = CatalogRepository::new(BrokenAdapter {
            failure: || Error::unavailable("disk detached"),
        });
        let id = RecordId::generate();

        assert!(repo.create(RecordInput::new("Dune")).await.is_err());
        assert!(repo.get(&id).await.is_err());
        assert!(
            repo.list(ListFilter::default(), Pagination::default())
                .await
                .is_err()
        );
        assert!(repo.delete(&id).await.is_err());

        let text = logs.text();
        assert_eq!(text.matches("Storage unavailable").count(), 4);
        assert!(text.contains("disk detached"));
    }

    #[tokio::test]
    async fn test_internal_failures_are_logged_as_errors() {
        let (logs, _guard) = capture_logs();
        let repo = CatalogRepository::new(BrokenAdapter {
            failure: || Error::internal("corrupt row"),
        });

        assert!(repo.get(&RecordId::generate()).await.is_err());

        let text = logs.text();
        assert!(text.contains("ERROR"));
        assert!(text.contains("Storage failure"));
    }

    #[tokio::test]
    async fn test_domain_outcomes_are_not_logged_as_failures() {
        let (logs, _guard) = capture_logs();
        let repo = CatalogRepository::new(BrokenAdapter {
            failure: || {
                AdapterError::NotFound {
                    id: RecordId::new("gone").unwrap(),
                }
                .into()
            },
        });

        assert!(repo.get(&RecordId::generate()).await.unwrap_err().is_not_found());
        assert!(!logs.text().contains("Storage"));
    }
}

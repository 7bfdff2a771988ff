//! Optimistic concurrency control.
//!
//! Every update carries the version the caller last observed. Adapters
//! compare it with the stored version inside their critical section and
//! either apply the change or fail with
//! [`AdapterError::VersionConflict`]. Nothing here retries: a retry could
//! overwrite another caller's intent, so that decision stays with the
//! caller.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::error::{AdapterError, Error, ValidationError};
use crate::record::{CatalogRecord, RecordDraft, RecordPatch, merge};
use crate::traits::{Clock, StorageAdapter};
use crate::types::RecordId;

type Transform =
    Box<dyn FnOnce(&CatalogRecord) -> std::result::Result<RecordDraft, ValidationError> + Send>;

/// Fail with a conflict unless `current` is at `expected_version`.
pub fn check_version(
    current: &CatalogRecord,
    expected_version: u64,
) -> std::result::Result<(), AdapterError> {
    if current.version == expected_version {
        Ok(())
    } else {
        Err(AdapterError::VersionConflict {
            id: current.id.clone(),
            expected: expected_version,
            actual: current.version,
        })
    }
}

/// A pending change to one record, run by an adapter inside its critical
/// section.
///
/// The version bump and timestamp rules live here so every backend
/// applies them identically.
pub struct Mutator {
    touched_at: DateTime<Utc>,
    transform: Transform,
}

impl Mutator {
    /// A mutator that derives new content from the current record.
    ///
    /// `touched_at` becomes the new `updated_at` unless the stored value
    /// is later.
    pub fn new<F>(touched_at: DateTime<Utc>, transform: F) -> Self
    where
        F: FnOnce(&CatalogRecord) -> std::result::Result<RecordDraft, ValidationError>
            + Send
            + 'static,
    {
        Self {
            touched_at,
            transform: Box::new(transform),
        }
    }

    /// A mutator that applies a patch.
    pub fn from_patch(touched_at: DateTime<Utc>, patch: RecordPatch) -> Self {
        Self::new(touched_at, move |current| merge(current, &patch, touched_at))
    }

    /// Check the version and produce the replacement record.
    ///
    /// The result keeps `id` and `created_at`, carries
    /// `version = expected_version + 1`, and has an `updated_at` that is
    /// never earlier than the current one.
    pub fn apply(self, current: &CatalogRecord, expected_version: u64) -> Result<CatalogRecord> {
        check_version(current, expected_version)?;

        let draft = (self.transform)(current)?;
        let updated_at = self.touched_at.max(current.updated_at);

        Ok(CatalogRecord {
            id: current.id.clone(),
            title: draft.title,
            description: draft.description,
            kind: draft.kind,
            year: draft.year,
            created_at: current.created_at,
            updated_at,
            version: expected_version + 1,
        })
    }
}

impl fmt::Debug for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("touched_at", &self.touched_at)
            .finish_non_exhaustive()
    }
}

/// Turns a versioned update request into one compare-and-swap call.
#[derive(Debug, Clone)]
pub struct ConcurrencyController {
    clock: Arc<dyn Clock>,
}

impl ConcurrencyController {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Apply `patch` to record `id` if it is still at `expected_version`.
    ///
    /// Fails with `NotFound` if the record vanished, `VersionConflict` if
    /// the version is stale, or a validation error if the patched record
    /// would be invalid. The stored record is untouched on every failure.
    #[instrument(skip(self, adapter, patch), fields(adapter = adapter.name(), %id))]
    pub async fn update<A>(
        &self,
        adapter: &A,
        id: &RecordId,
        expected_version: u64,
        patch: RecordPatch,
    ) -> Result<CatalogRecord>
    where
        A: StorageAdapter + ?Sized,
    {
        let mutator = Mutator::from_patch(self.clock.now(), patch);
        let result = adapter
            .update_if_version_matches(id, expected_version, mutator)
            .await;

        match &result {
            Ok(record) => debug!(version = record.version, "Applied update"),
            Err(Error::Adapter(AdapterError::VersionConflict { actual, .. })) => {
                warn!(expected_version, actual, "Rejected stale update")
            }
            Err(Error::Adapter(AdapterError::NotFound { .. })) => {
                debug!("Update target vanished")
            }
            Err(Error::Validation(e)) => debug!(error = %e, "Patched record is invalid"),
            Err(e) => warn!(error = %e, "Update failed"),
        }

        result
    }
}

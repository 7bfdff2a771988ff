//! Catalog record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Kind, RecordId};

/// The validated content fields of a record.
///
/// This is everything a caller controls. Identity, timestamps and version
/// are owned by the repository and the concurrency controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub title: String,
    pub description: Option<String>,
    pub kind: Kind,
    pub year: Option<i32>,
}

/// One movie or series entry in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Opaque unique id, immutable after creation.
    pub id: RecordId,

    /// Non-empty title.
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub kind: Kind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Set once at creation.
    pub created_at: DateTime<Utc>,

    /// Set on every successful mutation; never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,

    /// Starts at 1 and grows by exactly 1 per successful update.
    pub version: u64,
}

impl CatalogRecord {
    /// The version every record starts at.
    pub const INITIAL_VERSION: u64 = 1;

    /// Build a freshly created record.
    pub fn new(id: RecordId, draft: RecordDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            kind: draft.kind,
            year: draft.year,
            created_at: now,
            updated_at: now,
            version: Self::INITIAL_VERSION,
        }
    }

    /// The content fields of this record.
    pub fn draft(&self) -> RecordDraft {
        RecordDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            kind: self.kind,
            year: self.year,
        }
    }
}

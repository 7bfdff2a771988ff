//! Pagination cursor type.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::record::CatalogRecord;

use super::RecordId;

const SEPARATOR: char = '|';

/// An opaque marker for the last record of a listing page.
///
/// Listings are ordered by `created_at` descending with `id` ascending as
/// tie-break, so the pair identifies a position in that order even after
/// the record itself is deleted. Resuming from a cursor yields exactly the
/// records that sort after it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cursor {
    created_at: DateTime<Utc>,
    id: RecordId,
}

impl Cursor {
    /// A cursor positioned at the given record.
    pub fn after(record: &CatalogRecord) -> Self {
        Self {
            created_at: record.created_at,
            id: record.id.clone(),
        }
    }

    /// Parse a cursor previously produced by [`Cursor::encode`].
    pub fn decode(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCursor {
            value: s.to_string(),
        };

        let (ts, id) = s.split_once(SEPARATOR).ok_or_else(invalid)?;
        let created_at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| invalid())?
            .with_timezone(&Utc);
        let id = RecordId::new(id).map_err(|_| invalid())?;

        Ok(Self { created_at, id })
    }

    /// Creation time of the record the cursor points at.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Render the cursor as an opaque string.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            SEPARATOR,
            self.id
        )
    }

    /// Returns true if `record` sorts strictly after this cursor.
    pub fn admits(&self, record: &CatalogRecord) -> bool {
        record.created_at < self.created_at
            || (record.created_at == self.created_at && record.id > self.id)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl TryFrom<String> for Cursor {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::decode(&s)
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.encode()
    }
}

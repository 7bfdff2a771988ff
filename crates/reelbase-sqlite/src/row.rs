//! Mapping between table rows and catalog records.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::error::DatabaseError;
use sqlx::{Executor, Sqlite};

use reelbase_core::error::Error;
use reelbase_core::{CatalogRecord, Kind, RecordId, Result};

/// Common SELECT fields for record queries
pub(crate) const SELECT_RECORD: &str = r#"
    SELECT
        id, title, description, kind, year,
        version, created_at, updated_at
    FROM catalog_record
"#;

// Primary result codes, compared after masking off the extended bits.
const SQLITE_IOERR: i32 = 10;
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_FULL: i32 = 13;
const SQLITE_CANTOPEN: i32 = 14;

/// Timestamps are stored as fixed-width RFC 3339 text so that string
/// order is time order.
pub(crate) fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn sql_version(version: u64) -> Result<i64> {
    i64::try_from(version).map_err(|_| Error::internal(format!("version {} overflows", version)))
}

fn transient(db: &dyn DatabaseError) -> bool {
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| {
            matches!(
                code & 0xff,
                SQLITE_BUSY | SQLITE_LOCKED | SQLITE_IOERR | SQLITE_FULL | SQLITE_CANTOPEN
            )
        })
}

/// Classify a driver error: lost connections and lock timeouts are
/// retryable, everything else is internal.
pub(crate) fn map_sqlx(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => Error::unavailable(err),
        sqlx::Error::Database(db) if transient(&**db) => Error::unavailable(err),
        _ => Error::internal(err),
    }
}

/// Internal row type for mapping SQLite results
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RecordRow {
    id: String,
    title: String,
    description: Option<String>,
    kind: String,
    year: Option<i32>,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RecordRow> for CatalogRecord {
    type Error = Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let corrupt = |what: &str, cause: &dyn std::fmt::Display| {
            Error::internal(format!("corrupt row {}: {}: {}", row.id, what, cause))
        };

        let parse_time = |value: &str| {
            DateTime::parse_from_rfc3339(value).map(|t| t.with_timezone(&Utc))
        };

        Ok(CatalogRecord {
            id: RecordId::new(row.id.as_str()).map_err(|e| corrupt("id", &e))?,
            kind: row.kind.parse::<Kind>().map_err(|e| corrupt("kind", &e))?,
            version: u64::try_from(row.version).map_err(|e| corrupt("version", &e))?,
            created_at: parse_time(&row.created_at).map_err(|e| corrupt("created_at", &e))?,
            updated_at: parse_time(&row.updated_at).map_err(|e| corrupt("updated_at", &e))?,
            title: row.title,
            description: row.description,
            year: row.year,
        })
    }
}

/// Fetch one record through any executor, including an open transaction.
pub(crate) async fn fetch_record<'e, E>(executor: E, id: &RecordId) -> Result<Option<CatalogRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = format!("{} WHERE id = $1", SELECT_RECORD);
    let row = sqlx::query_as::<_, RecordRow>(&query)
        .bind(id.as_str())
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx)?;

    row.map(CatalogRecord::try_from).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(kind: &str, created_at: &str) -> RecordRow {
        RecordRow {
            id: "abc".to_string(),
            title: "Heat".to_string(),
            description: None,
            kind: kind.to_string(),
            year: Some(1995),
            version: 3,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = earlier + chrono::Duration::nanoseconds(1);
        assert!(timestamp(&earlier) < timestamp(&later));
        assert_eq!(timestamp(&earlier).len(), timestamp(&later).len());
    }

    #[test]
    fn test_row_converts_to_record() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let record = CatalogRecord::try_from(row("series", &timestamp(&created))).unwrap();
        assert_eq!(record.kind, Kind::Series);
        assert_eq!(record.version, 3);
        assert_eq!(record.created_at, created);
    }

    #[test]
    fn test_corrupt_row_is_internal() {
        let err = CatalogRecord::try_from(row("opera", "2024-01-01T00:00:00Z")).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));

        let err = CatalogRecord::try_from(row("movie", "yesterday")).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }

    #[test]
    fn test_pool_errors_are_retryable() {
        assert!(map_sqlx(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!map_sqlx(sqlx::Error::RowNotFound).is_retryable());
    }
}

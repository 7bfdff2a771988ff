//! Table definitions.

use sqlx::SqlitePool;

const CREATE_RECORD_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS catalog_record (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        kind TEXT NOT NULL,
        year INTEGER,
        version INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

// Matches the listing order: newest first, id as tie-break.
const CREATE_LISTING_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS catalog_record_listing
    ON catalog_record (created_at DESC, id ASC)
"#;

/// Create the schema if it does not exist yet.
pub(crate) async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_RECORD_TABLE).execute(pool).await?;
    sqlx::query(CREATE_LISTING_INDEX).execute(pool).await?;
    Ok(())
}

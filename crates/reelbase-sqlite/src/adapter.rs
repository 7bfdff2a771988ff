//! Relational adapter implementation.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, instrument};

use reelbase_core::error::{AdapterError, Error};
use reelbase_core::query::{ListFilter, ListPage, Pagination, paginate};
use reelbase_core::{CatalogRecord, Mutator, RecordId, Result, StorageAdapter};

use crate::config::SqliteAdapterConfig;
use crate::row::{RecordRow, SELECT_RECORD, fetch_record, map_sqlx, sql_version, timestamp};
use crate::schema;

/// SQLite-backed relational adapter.
///
/// The database runs in WAL mode, so readers never wait for a writer.
/// Writers serialize on SQLite's write lock and give up with a retryable
/// error after the configured busy timeout. Clones share one pool.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
}

enum Param {
    Text(String),
    Int(i64),
}

impl SqliteAdapter {
    /// Open the database, creating the file and schema if needed.
    pub async fn connect(config: &SqliteAdapterConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(map_sqlx)?;

        schema::migrate(&pool).await.map_err(map_sqlx)?;
        debug!(path = %config.path.display(), "Opened catalog database");

        Ok(Self::from_pool(pool))
    }

    /// Wrap a pool whose schema is already in place.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Explain why a conditional update matched no row.
    async fn missed_update(
        conn: &mut SqliteConnection,
        id: &RecordId,
        expected_version: u64,
    ) -> Error {
        let actual =
            sqlx::query_scalar::<_, i64>("SELECT version FROM catalog_record WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(conn)
                .await;

        match actual {
            Ok(None) => AdapterError::NotFound { id: id.clone() }.into(),
            Ok(Some(actual)) => AdapterError::VersionConflict {
                id: id.clone(),
                expected: expected_version,
                actual: u64::try_from(actual).unwrap_or_default(),
            }
            .into(),
            Err(e) => map_sqlx(e),
        }
    }
}

/// Bind `param` at the next position and return its placeholder.
fn placeholder(params: &mut Vec<Param>, param: Param) -> String {
    params.push(param);
    format!("${}", params.len())
}

/// Build the listing query and its parameters.
///
/// Kind, year range and cursor are pushed into SQL. The title filter is
/// matched in Rust, so when one is present the page is cut after the
/// rows come back.
fn listing_query(filter: &ListFilter, pagination: &Pagination) -> (String, Vec<Param>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(kind) = filter.kind {
        let p = placeholder(&mut params, Param::Text(kind.as_str().to_string()));
        clauses.push(format!("kind = {}", p));
    }
    if let Some(from) = filter.year_from {
        let p = placeholder(&mut params, Param::Int(from.into()));
        clauses.push(format!("year >= {}", p));
    }
    if let Some(to) = filter.year_to {
        let p = placeholder(&mut params, Param::Int(to.into()));
        clauses.push(format!("year <= {}", p));
    }
    if let Some(cursor) = &pagination.cursor {
        let at = timestamp(&cursor.created_at());
        let before = placeholder(&mut params, Param::Text(at.clone()));
        let same = placeholder(&mut params, Param::Text(at));
        let id = placeholder(&mut params, Param::Text(cursor.id().to_string()));
        clauses.push(format!(
            "(created_at < {} OR (created_at = {} AND id > {}))",
            before, same, id
        ));
    }

    let mut sql = SELECT_RECORD.to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id ASC");

    if filter.title_contains.is_none() {
        // One extra row tells whether another page follows.
        let limit = i64::from(pagination.limit_or_default()) + 1;
        let offset = i64::try_from(pagination.offset.unwrap_or(0)).unwrap_or(i64::MAX);
        let limit = placeholder(&mut params, Param::Int(limit));
        let offset = placeholder(&mut params, Param::Int(offset));
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
    }

    (sql, params)
}

#[async_trait]
impl StorageAdapter for SqliteAdapter {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert(&self, record: CatalogRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO catalog_record
                (id, title, description, kind, year, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.kind.as_str())
        .bind(record.year)
        .bind(sql_version(record.version)?)
        .bind(timestamp(&record.created_at))
        .bind(timestamp(&record.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Inserted record row");
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AdapterError::DuplicateId { id: record.id }.into())
            }
            Err(e) => Err(map_sqlx(e)),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord> {
        fetch_record(&self.pool, id)
            .await?
            .ok_or_else(|| AdapterError::NotFound { id: id.clone() }.into())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ListFilter, pagination: &Pagination) -> Result<ListPage> {
        let (sql, params) = listing_query(filter, pagination);

        let mut query = sqlx::query_as::<_, RecordRow>(&sql);
        for param in params {
            query = match param {
                Param::Text(value) => query.bind(value),
                Param::Int(value) => query.bind(value),
            };
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx)?;
        let records = rows
            .into_iter()
            .map(CatalogRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        // Rows already skipped by SQL must not be skipped again.
        let pagination = if filter.title_contains.is_none() {
            Pagination {
                offset: None,
                ..pagination.clone()
            }
        } else {
            pagination.clone()
        };
        Ok(paginate(records, filter, &pagination))
    }

    #[instrument(skip(self, mutator))]
    async fn update_if_version_matches(
        &self,
        id: &RecordId,
        expected_version: u64,
        mutator: Mutator,
    ) -> Result<CatalogRecord> {
        let expected = sql_version(expected_version)?;
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // A no-op write on the expected version takes the write lock before
        // the row is read, so nothing can change it in between.
        let claimed = sqlx::query(
            "UPDATE catalog_record SET version = version WHERE id = $1 AND version = $2",
        )
        .bind(id.as_str())
        .bind(expected)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        if claimed.rows_affected() == 0 {
            return Err(Self::missed_update(&mut tx, id, expected_version).await);
        }

        let current = fetch_record(&mut *tx, id)
            .await?
            .ok_or_else(|| AdapterError::NotFound { id: id.clone() })?;
        let next = mutator.apply(&current, expected_version)?;

        sqlx::query(
            r#"
            UPDATE catalog_record SET
                title = $1,
                description = $2,
                kind = $3,
                year = $4,
                version = $5,
                updated_at = $6
            WHERE id = $7 AND version = $8
            "#,
        )
        .bind(&next.title)
        .bind(&next.description)
        .bind(next.kind.as_str())
        .bind(next.year)
        .bind(sql_version(next.version)?)
        .bind(timestamp(&next.updated_at))
        .bind(id.as_str())
        .bind(expected)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;

        debug!(version = next.version, "Updated record row");
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &RecordId) -> Result<()> {
        let result = sqlx::query("DELETE FROM catalog_record WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(AdapterError::NotFound { id: id.clone() }.into());
        }
        debug!("Deleted record row");
        Ok(())
    }
}

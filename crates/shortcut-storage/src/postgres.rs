use async_trait::async_trait;
use jiff::Timestamp;
use shortcut_core::{
    AuthStore, BatchStore, Identity, Result, ShortId, Store, StoreError, Url,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Connection, Postgres, QueryBuilder};
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// Schema applied by [`PostgresStore::bootstrap`].
const SCHEMA: &str = include_str!("../ddl/postgres/urls.sql");

/// Each row binds two parameters; PostgreSQL caps a statement at 65535.
const MAX_ROWS_PER_INSERT: usize = 65535 / 2;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL implementation of the storage contract.
///
/// Identifiers are the `BIGSERIAL` row ids, so allocation is safe under
/// concurrent writers. Soft delete is implemented with `deleted_at`: a
/// tombstoned row keeps its id and owner, its `original_url` is cleared.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store from an existing PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `urls` table and its owner index if they do not exist.
    pub async fn bootstrap(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        info!("bootstrapped postgres schema");
        Ok(())
    }

    async fn insert_one(&self, owner: Option<Identity>, target: &Url) -> Result<ShortId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO urls (original_url, user_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(target.as_str())
        .bind(owner.map(|owner| owner.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(ShortId::from_row_id(id))
    }

    /// Inserts every target inside one transaction.
    ///
    /// The transaction is only committed when the backend returned an id
    /// for every row, so a partial batch is rolled back.
    async fn insert_many(&self, owner: Option<Identity>, targets: &[Url]) -> Result<Vec<ShortId>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let owner = owner.map(|owner| owner.as_uuid());
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut ids = Vec::with_capacity(targets.len());

        for chunk in targets.chunks(MAX_ROWS_PER_INSERT) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO urls (original_url, user_id) ");
            builder.push_values(chunk, |mut row, target| {
                row.push_bind(target.as_str()).push_bind(owner);
            });
            builder.push(" RETURNING id");

            let chunk_ids: Vec<i64> = builder
                .build_query_scalar()
                .fetch_all(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            ids.extend(chunk_ids.into_iter().map(ShortId::from_row_id));
        }

        let ids = StoreError::check_batch(targets.len(), ids)?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(ids)
    }
}

fn now_unix_seconds() -> i64 {
    Timestamp::now().as_second()
}

/// Maps a selected `(original_url, deleted_at)` row onto the contract.
fn resolve_row(id: &ShortId, row: Option<(Option<String>, Option<i64>)>) -> Result<Url> {
    match row {
        None => Err(StoreError::NotFound(id.to_string())),
        Some((_, Some(_))) => Err(StoreError::Deleted(id.to_string())),
        Some((Some(raw), None)) => parse_url(&raw),
        Some((None, None)) => Err(StoreError::InvalidData(format!(
            "row {} has neither a url nor a tombstone",
            id
        ))),
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw)
        .map_err(|e| StoreError::InvalidData(format!("stored url '{}' is invalid: {e}", raw)))
}

/// Reduces sqlx errors to their kind.
///
/// Connection-level errors can echo parts of the DSN, so only database
/// errors keep the backend's message.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout("connection pool timed out".to_string()),
        sqlx::Error::PoolClosed => StoreError::Closed,
        sqlx::Error::WorkerCrashed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            StoreError::Unavailable("database connection failed".to_string())
        }
        sqlx::Error::Configuration(_) => {
            StoreError::Unavailable("invalid database configuration".to_string())
        }
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StoreError::InvalidData(err.to_string()),
        sqlx::Error::Database(db) => StoreError::Query(db.message().to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn save(&self, target: &Url) -> Result<ShortId> {
        let id = self.insert_one(None, target).await?;
        debug!(id = %id, "saved url");
        Ok(id)
    }

    async fn load(&self, id: &ShortId) -> Result<Url> {
        trace!(id = %id, "loading url");
        let Some(row_id) = id.to_row_id() else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        let row: Option<(Option<String>, Option<i64>)> = sqlx::query_as(
            r#"
            SELECT original_url, deleted_at
            FROM urls
            WHERE id = $1
            "#,
        )
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        resolve_row(id, row)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        conn.ping().await.map_err(map_sqlx_error)
    }

    async fn close(&self) -> Result<()> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("closed postgres pool");
        }
        Ok(())
    }
}

#[async_trait]
impl BatchStore for PostgresStore {
    async fn save_batch(&self, targets: &[Url]) -> Result<Vec<ShortId>> {
        let ids = self.insert_many(None, targets).await?;
        debug!(count = ids.len(), "saved url batch");
        Ok(ids)
    }
}

#[async_trait]
impl AuthStore for PostgresStore {
    async fn save_user(&self, owner: Identity, target: &Url) -> Result<ShortId> {
        let id = self.insert_one(Some(owner), target).await?;
        debug!(id = %id, owner = %owner, "saved user url");
        Ok(id)
    }

    async fn save_user_batch(&self, owner: Identity, targets: &[Url]) -> Result<Vec<ShortId>> {
        let ids = self.insert_many(Some(owner), targets).await?;
        debug!(count = ids.len(), owner = %owner, "saved user url batch");
        Ok(ids)
    }

    async fn load_user(&self, owner: Identity, id: &ShortId) -> Result<Url> {
        trace!(id = %id, owner = %owner, "loading user url");
        let Some(row_id) = id.to_row_id() else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        let row: Option<(Option<String>, Option<i64>)> = sqlx::query_as(
            r#"
            SELECT original_url, deleted_at
            FROM urls
            WHERE id = $1
              AND user_id = $2
            "#,
        )
        .bind(row_id)
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        resolve_row(id, row)
    }

    async fn load_users(&self, owner: Identity) -> Result<BTreeMap<ShortId, Url>> {
        trace!(owner = %owner, "loading user urls");
        let rows: Vec<(i64, Option<String>, Option<i64>)> = sqlx::query_as(
            r#"
            SELECT id, original_url, deleted_at
            FROM urls
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(owner.to_string()));
        }

        rows.into_iter()
            .filter(|(_, _, deleted_at)| deleted_at.is_none())
            .map(|(id, raw, deleted_at)| {
                let id = ShortId::from_row_id(id);
                let url = resolve_row(&id, Some((raw, deleted_at)))?;
                Ok((id, url))
            })
            .collect()
    }

    async fn delete_users(&self, owner: Identity, ids: &[ShortId]) -> Result<()> {
        let row_ids: Vec<i64> = ids.iter().filter_map(ShortId::to_row_id).collect();
        if row_ids.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE urls
            SET original_url = NULL,
                deleted_at = $1
            WHERE user_id = $2
              AND id = ANY($3)
              AND deleted_at IS NULL
            "#,
        )
        .bind(now_unix_seconds())
        .bind(owner.as_uuid())
        .bind(row_ids)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(
            owner = %owner,
            requested = ids.len(),
            deleted = result.rows_affected(),
            "deleted user urls"
        );
        Ok(())
    }
}

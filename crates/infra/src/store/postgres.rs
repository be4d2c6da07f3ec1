//! Postgres-backed branch store.
//!
//! Expects the table:
//!
//! ```sql
//! CREATE TABLE branches (
//!     branch_id BIGSERIAL PRIMARY KEY,
//!     name      TEXT NOT NULL,
//!     location  TEXT NOT NULL
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | `PoolTimedOut`, `PoolClosed`, `Io`, `Tls` | `Connection` |
//! | `ColumnDecode`, `ColumnNotFound`, `Decode` | `Decode` |
//! | `Database` and anything else | `Query` |

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Connection, PgPool, Postgres, Row};
use tracing::instrument;

use branches_core::{Branch, BranchDraft, BranchId};

use super::r#trait::{BranchConnection, Connector, StoreError};
use crate::config::DatabaseConfig;

/// Connector over a shared SQLx Postgres pool.
///
/// `PgPool` is internally reference-counted, so cloning the connector shares
/// the same pool.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    pool: PgPool,
}

impl PostgresConnector {
    /// Build the pool. Opening the first connection doubles as a reachability check.
    #[instrument(skip_all, fields(max_connections = config.max_connections), err)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Ok(Self::new(pool))
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check out a connection and ping it. This is the only liveness check a
    /// connection gets; the pool's own test-on-acquire is switched off.
    async fn checkout(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;

        conn.ping()
            .await
            .map_err(|e| StoreError::Connection(format!("ping failed: {e}")))?;

        Ok(conn)
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(false)
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn acquire(&self) -> Result<Box<dyn BranchConnection>, StoreError> {
        let conn = self.checkout().await?;
        Ok(Box::new(PostgresBranchConnection { conn }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.checkout().await.map(drop)
    }
}

/// A pooled connection, returned to the pool on drop.
pub struct PostgresBranchConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl BranchConnection for PostgresBranchConnection {
    async fn list(&mut self) -> Result<Vec<Result<Branch, StoreError>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT branch_id, name, location
            FROM branches
            ORDER BY branch_id ASC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| map_sqlx_error("list_branches", e))?;

        Ok(rows.iter().map(decode_branch).collect())
    }

    async fn find(&mut self, id: BranchId) -> Result<Option<Branch>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT branch_id, name, location
            FROM branches
            WHERE branch_id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| map_sqlx_error("find_branch", e))?;

        row.as_ref().map(decode_branch).transpose()
    }

    async fn exists(&mut self, id: BranchId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT branch_id FROM branches WHERE branch_id = $1")
            .bind(id.get())
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_sqlx_error("branch_exists", e))?;

        Ok(row.is_some())
    }

    async fn insert(&mut self, draft: &BranchDraft) -> Result<Option<BranchId>, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO branches (name, location)
            VALUES ($1, $2)
            RETURNING branch_id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.location)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| map_sqlx_error("insert_branch", e))?;

        row.map(|row| {
            row.try_get::<i64, _>("branch_id")
                .map(BranchId::new)
                .map_err(|e| map_sqlx_error("insert_branch", e))
        })
        .transpose()
    }

    async fn update(&mut self, id: BranchId, draft: &BranchDraft) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE branches SET name = $1, location = $2 WHERE branch_id = $3")
            .bind(&draft.name)
            .bind(&draft.location)
            .bind(id.get())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_sqlx_error("update_branch", e))?;

        Ok(result.rows_affected())
    }

    async fn delete(&mut self, id: BranchId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM branches WHERE branch_id = $1")
            .bind(id.get())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_sqlx_error("delete_branch", e))?;

        Ok(result.rows_affected())
    }
}

fn decode_branch(row: &PgRow) -> Result<Branch, StoreError> {
    let id: i64 = row
        .try_get("branch_id")
        .map_err(|e| map_sqlx_error("decode_branch", e))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| map_sqlx_error("decode_branch", e))?;
    let location: String = row
        .try_get("location")
        .map_err(|e| map_sqlx_error("decode_branch", e))?;

    Ok(Branch {
        id: BranchId::new(id),
        name,
        location,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut => {
            StoreError::Connection(format!("timed out waiting for a connection in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Connection(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Connection(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Connection(format!("tls error in {operation}: {e}")),
        e @ (sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_)) => StoreError::Decode(format!("{operation}: {e}")),
        sqlx::Error::Database(db_err) => StoreError::Query(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        e => StoreError::Query(format!("sqlx error in {operation}: {e}")),
    }
}

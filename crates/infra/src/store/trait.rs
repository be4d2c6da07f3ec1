use async_trait::async_trait;
use thiserror::Error;

use branches_core::{Branch, BranchDraft, BranchId};

/// Storage operation error.
///
/// These are **infrastructure errors**; input validation lives in
/// `branches-core`.
///
/// - **Connection**: the store could not be reached or did not answer a ping
/// - **Query**: a statement was rejected or failed while executing
/// - **Decode**: a row came back in a shape that does not map onto [`Branch`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("row decode failed: {0}")]
    Decode(String),
}

/// Hands out live, exclusively-owned connections to the branch store.
///
/// Implementations wrap a process-wide pool; a connection returned by
/// [`Connector::acquire`] belongs to one request and goes back to the pool
/// when dropped, on every exit path.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Acquire a connection and verify it with a round-trip ping.
    async fn acquire(&self) -> Result<Box<dyn BranchConnection>, StoreError>;

    /// Startup reachability check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// One checked-out connection. Every method issues exactly one statement.
#[async_trait]
pub trait BranchConnection: Send {
    /// All rows in insertion order, each decoded on its own so a single bad
    /// row does not spoil the batch.
    async fn list(&mut self) -> Result<Vec<Result<Branch, StoreError>>, StoreError>;

    async fn find(&mut self, id: BranchId) -> Result<Option<Branch>, StoreError>;

    async fn exists(&mut self, id: BranchId) -> Result<bool, StoreError>;

    /// Insert a row; `None` means the store reported no row written.
    async fn insert(&mut self, draft: &BranchDraft) -> Result<Option<BranchId>, StoreError>;

    /// Overwrite name and location, returning the affected row count.
    async fn update(&mut self, id: BranchId, draft: &BranchDraft) -> Result<u64, StoreError>;

    /// Returns the affected row count.
    async fn delete(&mut self, id: BranchId) -> Result<u64, StoreError>;
}

//! Branch persistence boundary.
//!
//! Handlers talk to the [`Connector`]/[`BranchConnection`] traits only; the
//! backend (Postgres or in-memory) is picked once at startup.

use std::sync::Arc;

use crate::config::{Config, StoreBackend};

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryConnector;
pub use postgres::PostgresConnector;
pub use r#trait::{BranchConnection, Connector, StoreError};

/// Build the configured connector and verify the store answers a ping.
pub async fn connect(config: &Config) -> Result<Arc<dyn Connector>, StoreError> {
    let connector: Arc<dyn Connector> = match config.backend {
        StoreBackend::Postgres => Arc::new(PostgresConnector::connect(&config.database).await?),
        StoreBackend::InMemory => {
            tracing::warn!("USE_IN_MEMORY_STORE=true; branches are not persisted");
            Arc::new(InMemoryConnector::new())
        }
    };

    connector.ping().await?;
    Ok(connector)
}

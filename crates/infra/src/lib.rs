//! Infrastructure layer: configuration and the branch store.

pub mod config;
pub mod store;

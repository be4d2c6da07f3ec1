//! HTTP API application wiring (Axum router + store wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `response.rs`: JSON envelope writing
//! - `errors.rs`: handler-boundary error → response mapping

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use branches_infra::store::Connector;

use crate::middleware;

pub mod errors;
pub mod response;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(connector: Arc<dyn Connector>) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::log_requests))
            .layer(Extension(connector)),
    )
}

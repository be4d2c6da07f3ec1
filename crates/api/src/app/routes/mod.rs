use axum::{routing::get, Router};

pub mod branches;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/branches", branches::router())
}

use axum::http::StatusCode;

/// Liveness only; does not touch the store.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

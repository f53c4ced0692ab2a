//! API endpoint handlers.
//!
//! Handlers validate request shape, then hand work to the inference
//! services. No handler touches the model directly.

pub mod docs;
pub mod health;
pub mod info;
pub mod predict;

use axum::http::Uri;

use crate::api::error::ApiError;

/// Fallback for unknown routes: structured 404.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

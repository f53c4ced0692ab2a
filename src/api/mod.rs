//! HTTP boundary for the sentiment service.
//!
//! Validates request structure, delegates to `SentimentService`, and maps
//! service outcomes to status codes and stable error codes.
//!
//! The router is composable: `sentiment_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod cors;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::sentiment_api_router;
pub use server::{start_server, start_server_on, ApiServer, ServeError, ServerSession};
pub use types::ApiContext;

//! CareLingo Engine HTTP server
//!
//! Thin axum surface over the speech pipeline: one operation to run an
//! utterance end to end, plus health and version endpoints. Startup owns
//! the process-wide concerns -- environment loading, tracing, encryption
//! key sourcing, and provider configuration.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{api_success, ApiError, ApiResponse};
pub use server::{AppState, ServerConfig};

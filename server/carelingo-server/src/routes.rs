use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::server::AppState;

/// Build the complete API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/version", get(handlers::health::version_info))
        .route("/v1/utterances", post(handlers::utterances::run_utterance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

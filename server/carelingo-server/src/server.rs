use std::sync::Arc;
use std::time::Instant;

use secure_store::SecureStore;
use speech_pipeline::PipelineOrchestrator;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name reported by the health endpoints.
    pub name: String,
    /// Bind address, `host:port`.
    pub bind_addr: String,
}

impl ServerConfig {
    /// Load server configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            name: std::env::var("CARELINGO_SERVER_NAME")
                .unwrap_or_else(|_| "CareLingo Engine".to_string()),
            bind_addr: std::env::var("CARELINGO_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        }
    }
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub store: SecureStore,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        orchestrator: PipelineOrchestrator,
        store: SecureStore,
    ) -> Self {
        Self {
            config,
            orchestrator: Arc::new(orchestrator),
            store,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

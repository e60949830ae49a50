use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carelingo_server::{routes, AppState, ServerConfig};
use secure_store::{KeyConfig, SecureStore};
use speech_pipeline::{PipelineConfig, PipelineOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_config = ServerConfig::from_env();

    // Key sourcing happens before anything else touches an artifact.
    let key_config = KeyConfig::from_env();
    let store =
        SecureStore::from_key_config(&key_config).context("failed to initialize secure store")?;

    let pipeline_config = PipelineConfig::from_env().context("invalid pipeline configuration")?;
    let orchestrator = PipelineOrchestrator::from_config(&pipeline_config, store.clone())
        .context("failed to build pipeline")?;

    let state = AppState::new(server_config.clone(), orchestrator, store);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server_config.bind_addr))?;
    info!(addr = %server_config.bind_addr, name = %server_config.name, "server listening");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}

use salarypred::{config::AppConfig, model, server, telemetry, ArtifactStore};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Init
    telemetry::init_tracing();
    let metrics = telemetry::install_metrics()?;
    model::loader::init_ort()?;

    // 2. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = AppConfig::load(&config_path)?;
    tracing::info!(path = %config_path, "configuration loaded");

    // 3. Load artifacts before accepting requests
    let store = ArtifactStore::load(&config.artifacts)?;
    tracing::info!(
        pipeline = %config.artifacts.pipeline.display(),
        encoders = store.encoders().len(),
        "artifacts loaded"
    );

    // 4. Create Router
    let state =
        server::types::AppState::new(store, config.extraction.clone()).with_metrics(metrics);
    let app = server::routes::create_router(state, config.server.cors);

    // 5. Bind & Serve
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(
        "Server listening on http://{}:{}",
        config.server.host,
        config.server.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

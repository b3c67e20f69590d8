use document_frontend::config::get_configuration;
use document_frontend::services::{build_backend, metrics};
use document_frontend::startup::build_router;
use document_frontend::AppState;
use service_core::observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "document-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )
    .map_err(|e| anyhow::anyhow!("Tracing initialization failed: {}", e))?;

    metrics::init_metrics().map_err(|e| anyhow::anyhow!("Metrics initialization failed: {}", e))?;

    let backend = build_backend(&configuration.backend).map_err(|e| {
        tracing::error!(error = %e, "Failed to build document backend");
        anyhow::anyhow!("Backend error: {}", e)
    })?;

    let state = AppState::from_settings(&configuration, backend);

    // Initial list load; failures land in the store's error field.
    tokio::spawn({
        let workspace = state.workspace.clone();
        async move {
            workspace.refresh().await;
        }
    });

    let app = build_router(state);

    let address = configuration.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting document-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

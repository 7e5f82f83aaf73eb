use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use vehicle_rag::core::logging;
use vehicle_rag::server;
use vehicle_rag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize()
        .await
        .context("Failed to initialize application state")?;
    logging::init(&state.paths, "server.log");

    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("VEHICLE_RAG_PORT={}", addr.port());
    tracing::info!(
        "Listening on {} (embeddings: {}, generation: {})",
        addr,
        state.providers.embedder.name(),
        state.providers.generator.name()
    );

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", err);
    }
}

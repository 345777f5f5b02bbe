use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use docqa::core::logging;
use docqa::server::router;
use docqa::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize().await?;
    logging::init(&state.paths);

    tracing::info!("Starting documentation QA assistant...");
    if state.settings.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY not set. Chat and indexing requests will fail without it.");
    }

    // Index in the background so startup is not gated on the network.
    let rag = state.rag.clone();
    tokio::spawn(async move {
        match rag.initialize(false).await {
            Ok(count) => tracing::info!("RAG service initialized with {} chunks", count),
            Err(err) => tracing::error!("Failed to initialize RAG service: {}", err),
        }
    });

    let bind_addr = format!("{}:{}", state.settings.host, state.settings.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let app: Router = router::router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

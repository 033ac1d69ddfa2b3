//! HTTP surface: the chat page, a health probe and the chat endpoint


pub mod errors;
pub mod handlers;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::llm::OllamaLlm;
use crate::rag::{ChatPipeline, build_retriever};
use crate::{RagError, Result};

pub use handlers::AppState;
pub use types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

/// Create the application router
#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Wire the configured retriever and model into a pipeline
///
/// Fails with [`RagError::RetrieverUnsupported`] before anything is served
/// when the retrieval settings name a backend or search mode that does not exist.
#[inline]
pub async fn build_pipeline(config: &Config) -> Result<ChatPipeline> {
    let retriever = build_retriever(config).await?;
    let llm = OllamaLlm::new(&config.ollama, &config.generation)
        .map_err(|e| RagError::Generation(format!("{:#}", e)))?;
    info!(
        "Chat pipeline ready: model {}, k = {}",
        llm.model(),
        config.retrieval.k
    );
    Ok(ChatPipeline::new(retriever, Arc::new(llm), &config.retrieval))
}

/// Serve until Ctrl-C
#[inline]
pub async fn serve(config: &Config, host: &str, port: u16) -> Result<()> {
    let state = AppState::new(build_pipeline(config).await?);
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Restaurant chat listening on http://{}", addr);
    info!("  GET  /        - Chat page");
    info!("  GET  /health  - Health check");
    info!("  POST /chat    - Ask a question");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

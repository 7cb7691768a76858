use crate::api::ApiClient;
use crate::callback::handle_callback;
use crate::config::Config;
use crate::content::ContentStore;
use crate::store::ProjectStore;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub store: ProjectStore,
    pub content: Arc<dyn ContentStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_callback))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Bind and serve the webhook endpoint until the process is stopped.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {addr}"))?;

    info!("Listening on {addr}");
    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

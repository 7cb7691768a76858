use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use translation_bridge::{api::ApiClient, config::Config, content::MemoryContentStore, server, store::ProjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_bridge=info".parse()?),
        )
        .init();

    info!("Starting translation bridge");

    let config = Config::from_env()?;
    let api = Arc::new(ApiClient::new(&config)?);
    let store = ProjectStore::new(&config.database_path, config.sandbox)?;

    if config.sandbox {
        info!("Running against the sandbox environment");
    }

    // Standalone deployments get an in-memory content store; embedding
    // platforms supply their own ContentStore implementation instead.
    let content = Arc::new(MemoryContentStore::new(vec![
        "en".to_string(),
        "es".to_string(),
    ]));

    server::serve(server::AppState {
        config,
        api,
        store,
        content,
    })
    .await
}

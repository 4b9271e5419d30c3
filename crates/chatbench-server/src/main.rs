#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use chatbench_ai::{LlmClient, OpenAIClient};
use chatbench_core::{AppCore, paths};
use chatbench_server::{build_router, config::ServerConfig};

fn build_llm_client(config: &ServerConfig) -> Option<Arc<dyn LlmClient>> {
    let Some(api_key) = config.openai_api_key.as_deref() else {
        tracing::warn!("OPENAI_API_KEY is not set; /trigger will answer 503");
        return None;
    };
    let mut client = OpenAIClient::new(api_key);
    if let Some(base_url) = config.openai_base_url.as_deref() {
        client = client.with_base_url(base_url);
    }
    Some(Arc::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chatbench_server=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting chatbench server");

    let config = ServerConfig::load()?;
    let db_path = match config.db_path.clone() {
        Some(path) => path,
        None => paths::ensure_database_path().context("Failed to determine database path")?,
    };

    let core = Arc::new(
        AppCore::new(&db_path, build_llm_client(&config))
            .await
            .context("Failed to initialize app core")?,
    );
    let app = build_router(core);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(db = %db_path.display(), "chatbench running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("Failed to start server")
}

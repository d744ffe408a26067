mod api_error;
mod api_response;
mod config_payload;
mod routes;

use std::env;
use std::sync::Arc;

use routes::AppState;
use seo_rewriter::{ConfigStore, HistoryStore, RewriteService, RewriteSettings};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config_store = ConfigStore::from_env();
    config_store.initialize().log();

    let rewriter = RewriteService::new(RewriteSettings::from_env())?;
    let state = AppState {
        config_store: Arc::new(config_store),
        history: Arc::new(HistoryStore::new()),
        rewriter: Arc::new(rewriter),
    };

    let app = routes::router(state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

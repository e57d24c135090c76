use std::sync::Arc;

use tracing::{info, warn};
use vidhi_core::config::Config;
use vidhi_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidhi_server=info,vidhi_agent=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(?config, "configuration loaded");

    let state = Arc::new(AppState::from_config(&config));
    if state.backend.is_none() {
        warn!("GEMINI_API_KEY is not set; chat requests will fail until it is configured");
    }

    let app = build_router(state);

    let addr = config.addr();
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Credential-holding relay between the chat client and the completion service.

pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use vidhi_agent::GeminiBackend;
use vidhi_core::{backend::CompletionBackend, config::Config};

// ── AppState ──────────────────────────────────────────────────────────────

/// Read-only state shared by every request.
pub struct AppState {
    /// `None` when the credential is missing; chat requests then fail with 500.
    pub backend: Option<Arc<dyn CompletionBackend>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self {
            backend,
            start_time: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let backend = GeminiBackend::from_config(config)
            .map(|b| Arc::new(b) as Arc<dyn CompletionBackend>);
        Self::new(backend)
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/chat", post(routes::chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

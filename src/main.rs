use anyhow::Context;
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod dispatch;
mod error;
mod feed;
mod groups;
mod models;
mod parser;
mod settings;
mod speech;


use feed::{HttpStatusSource, StatusSource};
use models::{SkillEvent, SkillResponse};
use settings::Settings;

/// Voice skill endpoint for subway status.
/// Stateless: each request fetches the feed once and answers once.
#[derive(Clone)]
struct AppState {
    source: Arc<dyn StatusSource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Settings::load(None).context("Failed to load settings")?;
    let source = HttpStatusSource::new(&settings.status_url, settings.request_timeout())
        .context("Failed to build status feed client")?;

    let state = AppState {
        source: Arc::new(source),
    };

    let addr = settings.socket_addr()?;
    info!(%addr, "subway status skill listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root).post(handle_event))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn root() -> &'static str {
    "Subway Status skill v0.1.0"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Skill invocation: event in, speech and optional card out
async fn handle_event(
    State(state): State<AppState>,
    Json(event): Json<SkillEvent>,
) -> Json<SkillResponse> {
    let response = dispatch::dispatch(state.source.as_ref(), &event).await;
    debug!(speech = ?response.ssml(), "responding");
    Json(response)
}

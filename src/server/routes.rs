//! Axum route handlers for the pibrain HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`      : Returns `{"status": "ok", "version": "1.0.0", "service": "pibrain"}`
//! - `POST /api/messages`: Accepts an activity, returns the outbound activities as an array

use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bot::{Activity, ActivityType, Bot};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
}

impl AppState {
    pub fn new(bot: Bot) -> Self {
        Self { bot: Arc::new(bot) }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/messages", post(messages_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health: liveness check.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "pibrain",
    }))
}

/// POST /api/messages: run one turn.
///
/// Only `message` activities start a turn; anything else is acknowledged with
/// an empty reply list. A message the bot cannot handle (no sender, no text)
/// still gets the bot's generic error reply.
async fn messages_handler(
    State(state): State<AppState>,
    Json(activity): Json<Activity>,
) -> Json<Vec<Activity>> {
    if activity.kind != ActivityType::Message {
        tracing::debug!("Ignoring {:?} activity", activity.kind);
        return Json(Vec::new());
    }
    let replies = state.bot.on_message_activity(&activity).await;
    tracing::info!(
        user = activity.user_id().unwrap_or_default(),
        replies = replies.len(),
        "turn complete"
    );
    Json(replies)
}

//! pibrain HTTP server binary.
//!
//! Asks for consent on the terminal, then serves the bot over HTTP.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `OPENAI_API_KEY` / `AZURE_OPENAI_API_KEY` + `AZURE_OPENAI_ENDPOINT`: completion endpoint
//! - `PIBRAIN_MODEL`: model id (default: gpt-4)
//! - `PIBRAIN_DB_PATH`: SQLite file (default: data/Chinook.db)
//! - `RUST_LOG`: Tracing filter (default: "info,pibrain=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use pibrain::bot::Bot;
use pibrain::consent::{self, TerminalConsent};
use pibrain::inference::chat_from_settings;
use pibrain::sentiment::{analyzer, Backend};
use pibrain::server::{app_router, AppState};
use pibrain::store::SqliteStore;
use pibrain::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pibrain=debug".into()),
        )
        .init();

    let settings = Settings::load();

    // Nothing below may run until the operator has accepted.
    let Some(consent) = consent::obtain(&mut TerminalConsent::stdio())? else {
        return Ok(());
    };

    let mut bot = Bot::new(
        consent,
        chat_from_settings(&settings),
        Arc::from(analyzer(Backend::Intensity)),
    );
    match SqliteStore::open_or_download(&settings.db_path, &settings.db_url).await {
        Ok(store) => bot = bot.with_store(Arc::new(store)),
        Err(e) => tracing::error!("Database unavailable: {}", e),
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);
    let app = app_router(AppState::new(bot));

    tracing::info!("pibrain server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health      : liveness check");
    tracing::info!("  POST /api/messages: bot turn");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}

//! HTTP front end for the bot.
//!
//! # Endpoints
//!
//! - `GET  /health`      : Liveness check
//! - `POST /api/messages`: Deliver one activity, receive the replies

pub mod routes;

pub use routes::{app_router, AppState};

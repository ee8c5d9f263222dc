//! # pibrain
//!
//! A conversational bot that keeps a per-user context log and answers through
//! a hosted chat-completion endpoint, with sentiment scoring, persona
//! responders, a local SQLite sample database and a handful of information
//! services on the side.
//!
//! Nothing that touches user data can be constructed before the operator has
//! accepted the privacy notice; see [`consent`].

pub mod bot;
pub mod config;
pub mod consent;
pub mod context;
pub mod inference;
pub mod maintenance;
pub mod persona;
pub mod registry;
pub mod sentiment;
pub mod server;
pub mod services;
pub mod store;

pub use bot::{Activity, Bot};
pub use config::Settings;
pub use consent::{ConsentGate, Consented, TerminalConsent};
pub use context::{ConversationContext, TurnRecord};
pub use inference::{ChatCompletion, InferenceClient, InferenceError, Message, Role};
pub use persona::Persona;
pub use registry::{FunctionRegistry, Plan, RegistryError};
pub use sentiment::{SentimentAnalyzer, SentimentResult};
pub use store::{QueryStore, SqliteStore, StoreError};

/// Library version.
pub const VERSION: &str = "1.0.0";

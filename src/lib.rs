pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;
pub mod summary;

pub use auth::{IdentityVerifier, UserIdentity};
pub use config::AppConfig;
pub use database::models::{NewSipPlan, SipPlan};
pub use state::AppState;
pub use summary::{summarize, SchemeSummary};

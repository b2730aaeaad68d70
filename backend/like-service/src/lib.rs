/// Like Service Library
///
/// Owns the authoritative "user liked post/comment" relation and serves the
/// like toggle endpoints plus the read endpoints that embed live like counts.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `domain`: Records, response views and their pure projections
/// - `repository`: Store traits with Postgres and in-memory implementations
/// - `services`: Like orchestration, content reads, reconciliation events
/// - `middleware`: JWT identity extraction
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod repository;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;

//! Caseflow HTTP server: axum router over the engine services.
//!
//! The router is generic over the SurrealDB connection so the same
//! application serves a remote database in production and the
//! in-memory engine in tests.

pub mod config;
pub mod identity;
pub mod response;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::app;
pub use state::AppState;

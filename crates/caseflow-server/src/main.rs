//! Caseflow server — application entry point.

use caseflow_db::DbManager;
use caseflow_server::{AppState, ServerConfig, app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("caseflow=info".parse().unwrap()),
        )
        .json()
        .init();

    let config = ServerConfig::from_env();

    let manager = DbManager::connect(&config.db)
        .await
        .expect("failed to initialise the caseflow database");

    let state = AppState::new(manager.client().clone(), config.engine.clone());
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind listener");
    tracing::info!(addr = %config.bind_addr, "Caseflow server listening");

    axum::serve(listener, router)
        .await
        .expect("server terminated abnormally");
}

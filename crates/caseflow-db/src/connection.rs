//! SurrealDB connection management.
//!
//! [`DbManager::connect`] hands back a handle that is authenticated,
//! scoped to the caseflow namespace/database, and migrated — callers
//! never see a half-initialised connection.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Connection settings for the caseflow database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "caseflow".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Defaults overlaid with the `CASEFLOW_DB_URL`,
    /// `CASEFLOW_DB_NAMESPACE`, `CASEFLOW_DB_DATABASE`,
    /// `CASEFLOW_DB_USERNAME` and `CASEFLOW_DB_PASSWORD` environment
    /// variables where set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CASEFLOW_DB_URL") {
            config.url = url;
        }
        if let Ok(ns) = std::env::var("CASEFLOW_DB_NAMESPACE") {
            config.namespace = ns;
        }
        if let Ok(name) = std::env::var("CASEFLOW_DB_DATABASE") {
            config.database = name;
        }
        if let Ok(user) = std::env::var("CASEFLOW_DB_USERNAME") {
            config.username = user;
        }
        if let Ok(pass) = std::env::var("CASEFLOW_DB_PASSWORD") {
            config.password = pass;
        }

        config
    }
}

/// A connected, migrated handle to the caseflow database.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect and prepare the caseflow database.
    ///
    /// Authenticates as root, selects the configured namespace and
    /// database, and runs any pending schema migrations before the
    /// handle is handed out.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connecting to caseflow database"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;

        info!("caseflow database ready");

        Ok(Self { db })
    }

    /// The underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}

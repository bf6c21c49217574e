//! Server configuration, loaded from the environment.

use caseflow_db::DbConfig;
use caseflow_engine::EngineConfig;

/// Configuration for the HTTP server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    pub db: DbConfig,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            db: DbConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build configuration from `CASEFLOW_*` environment variables,
    /// falling back to defaults for anything unset. The `CASEFLOW_DB_*`
    /// variables are read by [`DbConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            db: DbConfig::from_env(),
            ..Self::default()
        };

        if let Ok(addr) = std::env::var("CASEFLOW_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(ttl) = std::env::var("CASEFLOW_VAULT_TTL_SECS")
            && let Ok(ttl) = ttl.parse()
        {
            config.engine.vault_session_ttl_secs = ttl;
        }

        config
    }
}

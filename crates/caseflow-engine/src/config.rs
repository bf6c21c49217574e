//! Engine configuration.

/// Configuration shared by the engine services.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Vault session time-to-live in seconds (default: 120). A session
    /// whose last heartbeat is older than this is expired; clients are
    /// expected to beat at most every 60 seconds, leaving one missed
    /// beat of slack.
    pub vault_session_ttl_secs: u64,
    /// Upper bound on audit query page size (default: 50).
    pub audit_page_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vault_session_ttl_secs: 120,
            audit_page_limit: 50,
        }
    }
}

//! Vault session domain model.
//!
//! A vault session is a lease: exclusive, time-limited access to a
//! case's secured documents, renewed by client heartbeats. At most one
//! session per case may be `Unlocked` at any instant. The vault is an
//! access-control boundary, not a cryptographic one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Lease state. `Locked` and `Expired` are terminal for a session
/// instance; a fresh unlock creates a new session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VaultSessionState {
    Unlocked,
    Locked,
    Expired,
}

impl VaultSessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unlocked => "Unlocked",
            Self::Locked => "Locked",
            Self::Expired => "Expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Unlocked" => Some(Self::Unlocked),
            "Locked" => Some(Self::Locked),
            "Expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSession {
    pub id: Uuid,
    pub firm_id: Uuid,
    pub case_id: Uuid,
    /// The user currently holding the lease.
    pub holder_id: Uuid,
    pub state: VaultSessionState,
    pub created_at: DateTime<Utc>,
    /// Expiry is computed on read as `now - last_heartbeat_at > TTL`.
    pub last_heartbeat_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateVaultSession {
    pub firm_id: Uuid,
    pub case_id: Uuid,
    pub holder_id: Uuid,
}

/// SHA-256 hash of a raw vault PIN, hex-encoded.
///
/// This is the value stored on the case as `vault_pin_hash`.
pub fn hash_pin(pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-shape comparison of a raw PIN against a stored hash.
pub fn verify_pin(pin: &str, stored_hash: &str) -> bool {
    hash_pin(pin) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_hash_round_trip() {
        let hash = hash_pin("4242");
        assert!(verify_pin("4242", &hash));
        assert!(!verify_pin("4243", &hash));
    }
}

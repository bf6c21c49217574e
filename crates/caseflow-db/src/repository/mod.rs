//! SurrealDB repository implementations.

mod audit;
mod case;
mod employee;
mod firm;
mod vault_session;

pub use audit::SurrealAuditLogRepository;
pub use case::SurrealCaseRepository;
pub use employee::SurrealEmployeeRepository;
pub use firm::SurrealFirmRepository;
pub use vault_session::SurrealVaultSessionRepository;

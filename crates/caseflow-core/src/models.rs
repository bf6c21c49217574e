//! Domain models for Caseflow.
//!
//! These are the core types shared across all crates.

pub mod audit;
pub mod case;
pub mod employee;
pub mod firm;
pub mod transfer;
pub mod transition;
pub mod vault;

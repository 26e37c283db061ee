//! Domain layer for Grouper focus group simulations
//!
//! This module contains the core data model, scoring, and the ports the
//! services drive.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{DomainError, DomainResult, OracleError};

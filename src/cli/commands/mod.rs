//! CLI command implementations.

pub mod config;
pub mod focus;
pub mod participants;

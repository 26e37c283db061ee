//! Adapters for external systems.

pub mod oracles;
pub mod yaml;

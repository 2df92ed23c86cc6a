//! Configuration module for blockdown
//!
//! User preferences, their JSON serialization and persistence to the
//! platform config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;

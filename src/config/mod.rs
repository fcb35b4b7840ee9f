//! Configuration
//!
//! Error taxonomy, shared types, and executor settings.

pub mod settings;
pub mod types;

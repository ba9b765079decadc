//! pocket-config
//!
//! Persistent user preferences for the Pocketbook shell.
//! Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{default_home, Config, HOME_ENV};

//! # songnote common library
//!
//! Shared code for the songnote binary and its tests:
//! - Configuration loading (TOML bootstrap + environment overrides)
//! - Logging initialization
//! - Error types
//! - Timestamp helpers used for generated names

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use error::{Error, Result};

//! # Culture Extractor Common Library
//!
//! Shared code for the Culture Extractor matching tools:
//! - Error types
//! - TOML configuration loading and matcher thresholds

pub mod config;
pub mod error;

pub use config::{ConfigOrigin, MatchThresholds, TomlConfig};
pub use error::{Error, Result};

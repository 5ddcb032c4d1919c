//! Configuration management for the rating tracker
//!
//! This module handles configuration loading from environment variables or a
//! TOML file, validation, and default values.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, EventSettings, HistorySettings, ServiceSettings};
pub use rating::RatingConfig;

//! Main application configuration
//!
//! This module defines the primary configuration structures for the tracker,
//! including environment variable and TOML file loading and validation.

use crate::config::rating::RatingConfig;
use crate::history::histogram_bin_count;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::info;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub history: HistorySettings,
    pub events: EventSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Match-history statistics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Width of each opponent-Elo histogram bin
    pub histogram_bin_size: i64,
    /// Start of the first histogram bin
    pub histogram_min_elo: i64,
    /// Start of the last histogram bin
    pub histogram_max_elo: i64,
    /// Number of recent matches in the Elo change summary
    pub elo_change_window: usize,
    /// Maximum number of best wins reported
    pub best_wins_limit: usize,
}

/// Live-update event settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Events buffered per subscriber before it starts lagging
    pub channel_capacity: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "elo-tracker".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            histogram_bin_size: 25,
            histogram_min_elo: 750,
            histogram_max_elo: 1450,
            elo_change_window: 20,
            best_wins_limit: 12,
        }
    }
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(k_factor) = env::var("ELO_K_FACTOR") {
            config.rating.k_factor = k_factor
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k_factor))?;
        }
        if let Ok(epsilon) = env::var("ELO_EPSILON") {
            config.rating.epsilon = epsilon
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_EPSILON value: {}", epsilon))?;
        }
        if let Ok(rating) = env::var("DEFAULT_RATING") {
            config.rating.default_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_RATING value: {}", rating))?;
        }

        // History settings
        if let Ok(bin_size) = env::var("HISTOGRAM_BIN_SIZE") {
            config.history.histogram_bin_size = bin_size
                .parse()
                .map_err(|_| anyhow!("Invalid HISTOGRAM_BIN_SIZE value: {}", bin_size))?;
        }
        if let Ok(min_elo) = env::var("HISTOGRAM_MIN_ELO") {
            config.history.histogram_min_elo = min_elo
                .parse()
                .map_err(|_| anyhow!("Invalid HISTOGRAM_MIN_ELO value: {}", min_elo))?;
        }
        if let Ok(max_elo) = env::var("HISTOGRAM_MAX_ELO") {
            config.history.histogram_max_elo = max_elo
                .parse()
                .map_err(|_| anyhow!("Invalid HISTOGRAM_MAX_ELO value: {}", max_elo))?;
        }
        if let Ok(window) = env::var("ELO_CHANGE_WINDOW") {
            config.history.elo_change_window = window
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_CHANGE_WINDOW value: {}", window))?;
        }
        if let Ok(limit) = env::var("BEST_WINS_LIMIT") {
            config.history.best_wins_limit = limit
                .parse()
                .map_err(|_| anyhow!("Invalid BEST_WINS_LIMIT value: {}", limit))?;
        }

        // Event settings
        if let Ok(capacity) = env::var("EVENT_CHANNEL_CAPACITY") {
            config.events.channel_capacity = capacity
                .parse()
                .map_err(|_| anyhow!("Invalid EVENT_CHANNEL_CAPACITY value: {}", capacity))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| anyhow!("Invalid configuration: {}", e))?;

        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.rating.validate()?;

    // Validate history settings
    if config.history.histogram_bin_size <= 0 {
        return Err(anyhow!("Histogram bin size must be positive"));
    }
    if config.history.histogram_max_elo < config.history.histogram_min_elo {
        return Err(anyhow!("Histogram max Elo must not be below min Elo"));
    }
    histogram_bin_count(
        config.history.histogram_bin_size,
        config.history.histogram_min_elo,
        config.history.histogram_max_elo,
    )?;
    if config.history.elo_change_window == 0 {
        return Err(anyhow!("Elo change window must be greater than 0"));
    }

    // Validate event settings
    if config.events.channel_capacity == 0 {
        return Err(anyhow!("Event channel capacity must be greater than 0"));
    }

    Ok(())
}

//! Elo engine configuration

use crate::error::TrackerError;
use crate::types::{KFactor, Rating, DEFAULT_K_FACTOR};
use serde::{Deserialize, Serialize};

/// Clamp margin keeping the implied expected score inside (0, 1)
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Parameters of the Elo rating engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Maximum swing per match
    pub k_factor: f64,
    /// Clamp margin applied to the implied expected score when estimating
    pub epsilon: f64,
    /// Rating assumed for a player with no recorded matches
    pub default_rating: Rating,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            epsilon: DEFAULT_EPSILON,
            default_rating: 1000.0,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        self.k_factor()?;

        if !(self.epsilon > 0.0 && self.epsilon < 0.5) {
            return Err(TrackerError::ConfigurationError {
                message: format!("Epsilon must be in (0, 0.5), got {}", self.epsilon),
            }
            .into());
        }

        if !self.default_rating.is_finite() {
            return Err(TrackerError::ConfigurationError {
                message: "Default rating must be finite".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// The configured K-factor, validated
    pub fn k_factor(&self) -> Result<KFactor, TrackerError> {
        KFactor::new(self.k_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_config_default() {
        let config = RatingConfig::default();
        assert_eq!(config.k_factor, 25.0);
        assert_eq!(config.epsilon, 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rating_config_validation() {
        let mut config = RatingConfig::default();

        config.k_factor = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.epsilon = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.epsilon = 0.5;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.default_rating = f64::NAN;
        assert!(config.validate().is_err());
    }
}

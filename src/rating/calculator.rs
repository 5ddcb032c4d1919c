//! Rating calculator trait and a recording mock
//!
//! Callers such as the match-entry form take the engine as a
//! `dyn RatingCalculator` so it can be swapped for a fixed-result mock.

use crate::error::TrackerError;
use crate::types::{KFactor, MatchOutcome, Rating, RatingUpdate};

/// Trait for forward and inverse rating calculations
pub trait RatingCalculator: Send + Sync {
    /// Apply a match result to `my_rating`
    fn apply_match_result(
        &self,
        my_rating: Rating,
        opponent_rating: Rating,
        outcome: MatchOutcome,
    ) -> RatingUpdate;

    /// Estimate the opponent's rating from the delta `my_rating` received
    ///
    /// # Errors
    /// [`TrackerError::InconsistentOutcome`] when the sign of `rating_change`
    /// contradicts `outcome`.
    fn estimate_opponent_rating(
        &self,
        my_rating: Rating,
        rating_change: f64,
        outcome: MatchOutcome,
    ) -> Result<i64, TrackerError>;

    /// Get the initial rating for new players
    fn get_initial_rating(&self) -> Rating;

    fn k_factor(&self) -> KFactor;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()>;
}

/// Arguments of one `estimate_opponent_rating` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateCall {
    pub my_rating: Rating,
    pub rating_change: f64,
    pub outcome: MatchOutcome,
}

/// Mock rating calculator for testing
#[derive(Debug, Default)]
pub struct MockRatingCalculator {
    estimate_calls: std::sync::Mutex<Vec<EstimateCall>>,
    fixed_estimate: std::sync::RwLock<Option<Result<i64, TrackerError>>>,
    k_factor: KFactor,
}

impl MockRatingCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed result to return for all estimations
    pub fn set_fixed_estimate(&self, result: Result<i64, TrackerError>) {
        if let Ok(mut fixed) = self.fixed_estimate.write() {
            *fixed = Some(result);
        }
    }

    /// Get all estimation calls made (for testing)
    pub fn get_estimate_calls(&self) -> Vec<EstimateCall> {
        self.estimate_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Clear recorded calls
    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.estimate_calls.lock() {
            calls.clear();
        }
    }
}

impl RatingCalculator for MockRatingCalculator {
    fn apply_match_result(
        &self,
        my_rating: Rating,
        _opponent_rating: Rating,
        _outcome: MatchOutcome,
    ) -> RatingUpdate {
        RatingUpdate {
            old_rating: my_rating,
            new_rating: my_rating,
            rating_change: 0.0,
        }
    }

    fn estimate_opponent_rating(
        &self,
        my_rating: Rating,
        rating_change: f64,
        outcome: MatchOutcome,
    ) -> Result<i64, TrackerError> {
        if let Ok(mut calls) = self.estimate_calls.lock() {
            calls.push(EstimateCall {
                my_rating,
                rating_change,
                outcome,
            });
        }

        if let Ok(fixed) = self.fixed_estimate.read() {
            if let Some(result) = fixed.as_ref() {
                return result.clone();
            }
        }

        // Default behavior: an evenly matched opponent
        Ok(my_rating.floor() as i64)
    }

    fn get_initial_rating(&self) -> Rating {
        1000.0
    }

    fn k_factor(&self) -> KFactor {
        self.k_factor
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "mock",
            "k_factor": self.k_factor.value()
        })
    }

    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()> {
        if let Some(k) = config.get("k_factor").and_then(|v| v.as_f64()) {
            self.k_factor = KFactor::new(k)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_calculator_records_calls() {
        let calculator = MockRatingCalculator::new();

        let estimate = calculator
            .estimate_opponent_rating(1234.5, 7.0, MatchOutcome::Win)
            .unwrap();
        assert_eq!(estimate, 1234);

        let calls = calculator.get_estimate_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].rating_change, 7.0);
        assert_eq!(calls[0].outcome, MatchOutcome::Win);

        calculator.clear_calls();
        assert!(calculator.get_estimate_calls().is_empty());
    }

    #[test]
    fn test_mock_calculator_fixed_estimate() {
        let calculator = MockRatingCalculator::new();
        calculator.set_fixed_estimate(Err(TrackerError::InconsistentOutcome {
            outcome: MatchOutcome::Loss,
            rating_change: 3.0,
        }));

        let result = calculator.estimate_opponent_rating(1000.0, 3.0, MatchOutcome::Loss);
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_calculator_config() {
        let mut calculator = MockRatingCalculator::new();
        assert_eq!(calculator.config()["type"], "mock");

        calculator
            .update_config(serde_json::json!({ "k_factor": 10.0 }))
            .unwrap();
        assert_eq!(calculator.k_factor().value(), 10.0);

        assert!(calculator
            .update_config(serde_json::json!({ "k_factor": -3.0 }))
            .is_err());
    }
}

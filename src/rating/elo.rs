//! Logistic Elo model: forward updates and inverse opponent estimation
//!
//! The forward direction follows the canonical expected-score formula
//! `E = 1 / (1 + 10^((opponent - me) / 400))` with `delta = K * (S - E)`.
//! The inverse direction solves that formula for the opponent's rating given
//! an observed delta, which is how the tracker fills in opponents whose
//! rating was not shown at the end of a match.

use crate::config::rating::{RatingConfig, DEFAULT_EPSILON};
use crate::error::TrackerError;
use crate::rating::calculator::RatingCalculator;
use crate::types::{KFactor, MatchOutcome, Rating, RatingUpdate};
use skillratings::elo::{expected_score as elo_expected_score, EloRating};
use tracing::debug;

/// Rating points per factor of ten in the odds
const ELO_SCALE: f64 = 400.0;

/// Probability-weighted score `my_rating` is expected to take against `opponent_rating`
pub fn expected_score(my_rating: Rating, opponent_rating: Rating) -> f64 {
    let (expected, _) = elo_expected_score(
        &EloRating { rating: my_rating },
        &EloRating {
            rating: opponent_rating,
        },
    );
    expected
}

/// Exact, unrounded rating delta for one side of a match
pub fn rating_change(
    my_rating: Rating,
    opponent_rating: Rating,
    outcome: MatchOutcome,
    k_factor: KFactor,
) -> f64 {
    k_factor.value() * (outcome.score() - expected_score(my_rating, opponent_rating))
}

/// Apply a match result, rounding the delta to whole points
pub fn apply_match_result(
    my_rating: Rating,
    opponent_rating: Rating,
    outcome: MatchOutcome,
    k_factor: KFactor,
) -> RatingUpdate {
    let change = rating_change(my_rating, opponent_rating, outcome, k_factor).round();

    RatingUpdate {
        old_rating: my_rating,
        new_rating: my_rating + change,
        rating_change: change,
    }
}

/// Reject deltas whose sign contradicts the outcome
pub fn check_outcome_consistency(
    outcome: MatchOutcome,
    rating_change: f64,
) -> Result<(), TrackerError> {
    if outcome.admits_change(rating_change) {
        Ok(())
    } else {
        Err(TrackerError::InconsistentOutcome {
            outcome,
            rating_change,
        })
    }
}

/// Back-estimate the opponent's rating from the delta `my_rating` received
///
/// Fails when the sign of `rating_change` contradicts `outcome`, or when
/// `my_rating` is not a finite number or the estimate does not fit an
/// `i64`. The implied expected score is always clamped into `[ε, 1 - ε]`, so extreme
/// deltas saturate to a large but finite estimate. The result is floored.
pub fn estimate_opponent_rating(
    my_rating: Rating,
    rating_change: f64,
    outcome: MatchOutcome,
    k_factor: KFactor,
) -> Result<i64, TrackerError> {
    estimate_opponent_rating_with_epsilon(
        my_rating,
        rating_change,
        outcome,
        k_factor,
        DEFAULT_EPSILON,
    )
}

/// [`estimate_opponent_rating`] with an explicit clamp margin
pub fn estimate_opponent_rating_with_epsilon(
    my_rating: Rating,
    rating_change: f64,
    outcome: MatchOutcome,
    k_factor: KFactor,
    epsilon: f64,
) -> Result<i64, TrackerError> {
    if !my_rating.is_finite() {
        return Err(TrackerError::InvalidRating { value: my_rating });
    }
    check_outcome_consistency(outcome, rating_change)?;

    let score = outcome.score();
    let implied = score - rating_change / k_factor.value();
    // Clamped even when already in range; zero deltas land on the boundary.
    let expected = implied.min(1.0 - epsilon).max(epsilon);
    let odds_ratio = (1.0 - expected) / expected;
    let opponent_rating = my_rating + ELO_SCALE * odds_ratio.log10();

    debug!(
        "Estimated opponent rating: my_rating={} rating_change={} score={} expected={} odds_ratio={} opponent={}",
        my_rating, rating_change, score, expected, odds_ratio, opponent_rating
    );

    let floored = opponent_rating.floor();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if !(floored >= i64::MIN as f64 && floored < i64::MAX as f64) {
        return Err(TrackerError::InvalidRating {
            value: opponent_rating,
        });
    }

    Ok(floored as i64)
}

/// Elo rating calculator with configurable K-factor and clamp margin
#[derive(Debug, Clone)]
pub struct EloRatingCalculator {
    config: RatingConfig,
    k_factor: KFactor,
}

impl EloRatingCalculator {
    /// Create a new Elo rating calculator
    pub fn new(config: RatingConfig) -> crate::error::Result<Self> {
        config.validate()?;
        let k_factor = config.k_factor()?;

        Ok(Self { config, k_factor })
    }

    pub fn rating_config(&self) -> &RatingConfig {
        &self.config
    }
}

impl Default for EloRatingCalculator {
    fn default() -> Self {
        Self {
            config: RatingConfig::default(),
            k_factor: KFactor::default(),
        }
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn apply_match_result(
        &self,
        my_rating: Rating,
        opponent_rating: Rating,
        outcome: MatchOutcome,
    ) -> RatingUpdate {
        apply_match_result(my_rating, opponent_rating, outcome, self.k_factor)
    }

    fn estimate_opponent_rating(
        &self,
        my_rating: Rating,
        rating_change: f64,
        outcome: MatchOutcome,
    ) -> Result<i64, TrackerError> {
        estimate_opponent_rating_with_epsilon(
            my_rating,
            rating_change,
            outcome,
            self.k_factor,
            self.config.epsilon,
        )
    }

    fn get_initial_rating(&self) -> Rating {
        self.config.default_rating
    }

    fn k_factor(&self) -> KFactor {
        self.k_factor
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()> {
        let new_config: RatingConfig = serde_json::from_value(config).map_err(|e| {
            TrackerError::ConfigurationError {
                message: format!("Invalid Elo configuration: {}", e),
            }
        })?;

        new_config.validate()?;
        self.k_factor = new_config.k_factor()?;
        self.config = new_config;
        Ok(())
    }
}

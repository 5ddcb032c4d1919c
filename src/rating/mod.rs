//! Elo rating engine
//!
//! This module provides the forward rating update, the inverse opponent
//! estimation, and the calculator trait callers inject the engine through.

pub mod calculator;
pub mod elo;

// Re-export commonly used types
pub use calculator::{MockRatingCalculator, RatingCalculator};
pub use elo::{
    apply_match_result, estimate_opponent_rating, expected_score, rating_change,
    EloRatingCalculator,
};

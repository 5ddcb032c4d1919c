//! Error types for the rating tracker
//!
//! Engine operations return [`TrackerError`] directly so callers can match on
//! the failure; application-level code uses the anyhow-based [`Result`] alias.

use crate::types::MatchOutcome;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific tracker scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    #[error("Mismatch between match result ({outcome}) and elo change sign ({rating_change})")]
    InconsistentOutcome {
        outcome: MatchOutcome,
        rating_change: f64,
    },

    #[error("Invalid match outcome score: {score} (expected 0 or 1)")]
    InvalidOutcomeScore { score: u8 },

    #[error("Invalid K-factor: {value} (must be positive and finite)")]
    InvalidKFactor { value: f64 },

    #[error("Invalid rating: {value} (must be finite and within integer range)")]
    InvalidRating { value: f64 },

    #[error("Invalid match record: {reason}")]
    InvalidMatchRecord { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Event bus error: {message}")]
    EventBusError { message: String },
}

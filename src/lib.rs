//! Elo Tracker - rating engine for a personal ranked-match tracker
//!
//! This crate provides the Elo forward update and inverse opponent
//! estimation, manual match-entry bookkeeping, match-history statistics,
//! and typed live-update events for a fighting-game Elo tracker.

pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod logging;
pub mod match_entry;
pub mod rating;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Result, TrackerError};
pub use types::*;

// Re-export key components
pub use events::{BroadcastEventBus, EventPublisher, MatchEvent};
pub use match_entry::MatchEntryForm;
pub use rating::{EloRatingCalculator, RatingCalculator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

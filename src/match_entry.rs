//! Manual match entry
//!
//! Form state for recording a ranked match by hand. Whenever the Elo change
//! is edited the opponent's rating is back-estimated from it, so matches
//! where the opponent's rating was never shown still get a usable value.

use crate::error::TrackerError;
use crate::rating::RatingCalculator;
use crate::types::{GameResult, MatchOutcome, MatchRecord, MAX_GAMES_PER_MATCH};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

/// Editable state of one manually entered match
pub struct MatchEntryForm {
    calculator: Arc<dyn RatingCalculator>,
    pub elo_rank_old: i64,
    pub elo_change: i64,
    pub elo_rank_new: i64,
    pub match_win: MatchOutcome,
    pub match_forfeit: bool,
    pub opponent_name: String,
    pub opponent_elo: Option<i64>,
    pub opponent_estimated_elo: Option<i64>,
    pub final_move_id: Option<i64>,
    games: Vec<GameResult>,
}

impl std::fmt::Debug for MatchEntryForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEntryForm")
            .field("elo_rank_old", &self.elo_rank_old)
            .field("elo_change", &self.elo_change)
            .field("elo_rank_new", &self.elo_rank_new)
            .field("match_win", &self.match_win)
            .field("match_forfeit", &self.match_forfeit)
            .field("opponent_name", &self.opponent_name)
            .field("opponent_elo", &self.opponent_elo)
            .field("opponent_estimated_elo", &self.opponent_estimated_elo)
            .field("final_move_id", &self.final_move_id)
            .field("games", &self.games)
            .finish()
    }
}

impl MatchEntryForm {
    /// Create an empty form starting from the calculator's initial rating
    pub fn new(calculator: Arc<dyn RatingCalculator>) -> Self {
        let initial = calculator.get_initial_rating().round() as i64;
        Self {
            calculator,
            elo_rank_old: initial,
            elo_change: 0,
            elo_rank_new: initial,
            match_win: MatchOutcome::Win,
            match_forfeit: false,
            opponent_name: String::new(),
            opponent_elo: None,
            opponent_estimated_elo: None,
            final_move_id: None,
            games: Vec::new(),
        }
    }

    /// Pre-fill the next entry from the most recent recorded match
    pub fn load_from(&mut self, latest: &MatchRecord) {
        self.elo_rank_old = latest.elo_rank_new;
        self.elo_change = 0;
        self.elo_rank_new = latest.elo_rank_new;
        self.opponent_estimated_elo = None;
    }

    pub fn set_rating_before(&mut self, rating: i64) {
        self.elo_rank_old = rating;
        self.elo_rank_new = rating + self.elo_change;
    }

    /// Store the outcome; the estimate refreshes on the next delta edit
    pub fn set_outcome(&mut self, outcome: MatchOutcome) {
        self.match_win = outcome;
    }

    /// Games entered so far, in play order
    pub fn games(&self) -> &[GameResult] {
        &self.games
    }

    /// Enter the result of game `number` (1 to 3)
    ///
    /// Earlier games that were skipped are left blank.
    pub fn set_game(&mut self, number: usize, game: GameResult) -> Result<(), TrackerError> {
        if number == 0 || number > MAX_GAMES_PER_MATCH {
            return Err(TrackerError::InvalidMatchRecord {
                reason: format!("game {} is outside 1..={}", number, MAX_GAMES_PER_MATCH),
            });
        }

        if self.games.len() < number {
            self.games.resize(number, GameResult::default());
        }
        self.games[number - 1] = game;
        Ok(())
    }

    /// Record the Elo change and re-estimate the opponent's rating
    pub fn set_rating_change(&mut self, delta: i64) {
        self.opponent_estimated_elo = match self.calculator.estimate_opponent_rating(
            self.elo_rank_old as f64,
            delta as f64,
            self.match_win,
        ) {
            Ok(estimate) => Some(estimate),
            Err(e) => {
                warn!("Could not estimate opponent Elo: {}", e);
                None
            }
        };

        self.elo_change = delta;
        self.elo_rank_new = self.elo_rank_old + delta;
    }

    /// Finish the entry as a validated match record
    pub fn into_record(
        self,
        ranked_game_number: u32,
        match_date: DateTime<Utc>,
    ) -> Result<MatchRecord, TrackerError> {
        let record = MatchRecord {
            ranked_game_number,
            match_date,
            elo_rank_old: self.elo_rank_old,
            elo_rank_new: self.elo_rank_new,
            elo_change: self.elo_change,
            match_win: self.match_win,
            match_forfeit: self.match_forfeit,
            opponent_name: self.opponent_name,
            opponent_elo: self.opponent_elo,
            opponent_estimated_elo: self.opponent_estimated_elo,
            final_move_id: self.final_move_id,
            games: self.games,
        };

        record.validate()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{EloRatingCalculator, MockRatingCalculator};
    use crate::types::GameWinner;

    fn elo_form() -> MatchEntryForm {
        MatchEntryForm::new(Arc::new(EloRatingCalculator::default()))
    }

    fn date() -> DateTime<Utc> {
        "2025-03-01T18:30:00Z".parse().unwrap()
    }

    #[test]
    fn test_new_form_starts_at_initial_rating() {
        let form = elo_form();
        assert_eq!(form.elo_rank_old, 1000);
        assert_eq!(form.elo_rank_new, 1000);
        assert_eq!(form.opponent_estimated_elo, None);
    }

    #[test]
    fn test_rating_change_fills_estimate() {
        let mut form = elo_form();
        form.set_rating_change(10);

        assert_eq!(form.elo_change, 10);
        assert_eq!(form.elo_rank_new, 1010);
        assert_eq!(form.opponent_estimated_elo, Some(929));
    }

    #[test]
    fn test_inconsistent_change_clears_estimate() {
        let mut form = elo_form();
        form.set_rating_change(10);
        assert!(form.opponent_estimated_elo.is_some());

        form.set_outcome(MatchOutcome::Loss);
        form.set_rating_change(8);

        assert_eq!(form.opponent_estimated_elo, None);
        assert_eq!(form.elo_change, 8);
        assert_eq!(form.elo_rank_new, 1008);
    }

    #[test]
    fn test_rating_before_keeps_change() {
        let mut form = elo_form();
        form.set_rating_change(12);
        form.set_rating_before(1200);

        assert_eq!(form.elo_rank_old, 1200);
        assert_eq!(form.elo_rank_new, 1212);
    }

    #[test]
    fn test_estimate_uses_current_outcome_and_rating() {
        let calculator = Arc::new(MockRatingCalculator::new());
        let mut form = MatchEntryForm::new(calculator.clone());

        form.set_rating_before(1150);
        form.set_outcome(MatchOutcome::Loss);
        form.set_rating_change(-9);

        let calls = calculator.get_estimate_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].my_rating, 1150.0);
        assert_eq!(calls[0].rating_change, -9.0);
        assert_eq!(calls[0].outcome, MatchOutcome::Loss);
        assert_eq!(form.opponent_estimated_elo, Some(1150));
    }

    #[test]
    fn test_load_from_latest_record() {
        let mut form = elo_form();
        let latest = MatchRecord {
            ranked_game_number: 3,
            match_date: date(),
            elo_rank_old: 1040,
            elo_rank_new: 1052,
            elo_change: 12,
            match_win: MatchOutcome::Win,
            match_forfeit: false,
            opponent_name: String::new(),
            opponent_elo: None,
            opponent_estimated_elo: Some(1030),
            final_move_id: Some(4),
            games: vec![GameResult::default()],
        };

        form.load_from(&latest);
        assert_eq!(form.elo_rank_old, 1052);
        assert_eq!(form.elo_rank_new, 1052);
        assert_eq!(form.elo_change, 0);
        assert!(form.games().is_empty());
        assert_eq!(form.final_move_id, None);
    }

    #[test]
    fn test_set_game_fills_slots_in_order() {
        let mut form = elo_form();
        let third = GameResult {
            stage: Some(5),
            winner: Some(GameWinner::Me),
            ..GameResult::default()
        };

        form.set_game(3, third).unwrap();
        assert_eq!(form.games().len(), 3);
        assert!(form.games()[0].is_empty());
        assert_eq!(form.games()[2], third);

        let first = GameResult {
            char_pick: Some(3),
            winner: Some(GameWinner::Opponent),
            ..GameResult::default()
        };
        form.set_game(1, first).unwrap();
        assert_eq!(form.games()[0], first);
        assert_eq!(form.games().len(), 3);
    }

    #[test]
    fn test_set_game_rejects_out_of_range() {
        let mut form = elo_form();
        assert!(form.set_game(0, GameResult::default()).is_err());
        assert!(form.set_game(4, GameResult::default()).is_err());
        assert!(form.games().is_empty());
    }

    #[test]
    fn test_into_record() {
        let mut form = elo_form();
        form.opponent_name = "rival".to_string();
        form.set_rating_change(10);

        let record = form.into_record(4, date()).unwrap();
        assert_eq!(record.ranked_game_number, 4);
        assert_eq!(record.elo_rank_new, 1010);
        assert_eq!(record.opponent_estimated_elo, Some(929));
        assert_eq!(record.opponent_name, "rival");
    }

    #[test]
    fn test_into_record_carries_games() {
        let mut form = elo_form();
        form.set_rating_change(15);
        form.final_move_id = Some(14);
        form.set_game(
            1,
            GameResult {
                char_pick: Some(3),
                opponent_pick: Some(11),
                stage: Some(2),
                winner: Some(GameWinner::Me),
                final_move_id: Some(14),
            },
        )
        .unwrap();

        let record = form.into_record(6, date()).unwrap();
        assert_eq!(record.final_move_id, Some(14));
        assert_eq!(record.games.len(), 1);
        assert_eq!(record.games[0].won(), Some(true));
    }

    #[test]
    fn test_into_record_rejects_inconsistent_entry() {
        let mut form = elo_form();
        form.set_outcome(MatchOutcome::Loss);
        form.set_rating_change(5);

        assert!(matches!(
            form.into_record(5, date()),
            Err(TrackerError::InconsistentOutcome { .. })
        ));
    }
}

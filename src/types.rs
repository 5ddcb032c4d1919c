//! Common types used throughout the rating tracker

use crate::error::TrackerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A competitor's skill estimate. Conventionally within [0, 3000] but unbounded.
pub type Rating = f64;

/// K-factor used when none is configured
pub const DEFAULT_K_FACTOR: f64 = 25.0;

/// Result of a rated match from the perspective of one side
///
/// Serialized as the integer score the tracker API uses (`1` = win, `0` = loss).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchOutcome {
    Win,
    Loss,
}

impl MatchOutcome {
    /// Actual score of the outcome under the Elo model
    pub fn score(self) -> f64 {
        match self {
            MatchOutcome::Win => 1.0,
            MatchOutcome::Loss => 0.0,
        }
    }

    /// The outcome recorded for the other side of the same match
    pub fn opposite(self) -> Self {
        match self {
            MatchOutcome::Win => MatchOutcome::Loss,
            MatchOutcome::Loss => MatchOutcome::Win,
        }
    }

    /// Whether a rating delta has a sign this outcome allows. Zero is allowed for both.
    pub fn admits_change(self, rating_change: f64) -> bool {
        match self {
            MatchOutcome::Win => rating_change >= 0.0,
            MatchOutcome::Loss => rating_change <= 0.0,
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::Win => write!(f, "Win"),
            MatchOutcome::Loss => write!(f, "Loss"),
        }
    }
}

impl TryFrom<u8> for MatchOutcome {
    type Error = TrackerError;

    fn try_from(score: u8) -> Result<Self, Self::Error> {
        match score {
            1 => Ok(MatchOutcome::Win),
            0 => Ok(MatchOutcome::Loss),
            _ => Err(TrackerError::InvalidOutcomeScore { score }),
        }
    }
}

impl From<MatchOutcome> for u8 {
    fn from(outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Win => 1,
            MatchOutcome::Loss => 0,
        }
    }
}

impl From<bool> for MatchOutcome {
    fn from(won: bool) -> Self {
        if won {
            MatchOutcome::Win
        } else {
            MatchOutcome::Loss
        }
    }
}

/// Sensitivity constant bounding the rating swing of a single match
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct KFactor(f64);

impl KFactor {
    /// Create a K-factor, rejecting zero, negative and non-finite values
    pub fn new(value: f64) -> Result<Self, TrackerError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(TrackerError::InvalidKFactor { value })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for KFactor {
    fn default() -> Self {
        Self(DEFAULT_K_FACTOR)
    }
}

impl TryFrom<f64> for KFactor {
    type Error = TrackerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KFactor> for f64 {
    fn from(k: KFactor) -> Self {
        k.0
    }
}

/// Outcome of applying one match result to a rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub old_rating: Rating,
    pub new_rating: Rating,
    /// Whole-point delta, `new_rating - old_rating`
    pub rating_change: f64,
}

/// Games played in a ranked set (best of three)
pub const MAX_GAMES_PER_MATCH: usize = 3;

/// Which side took a single game of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameWinner {
    Me,
    Opponent,
}

impl GameWinner {
    /// Decode the API's winner code (`1` = me, `2` = opponent)
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(GameWinner::Me),
            2 => Some(GameWinner::Opponent),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            GameWinner::Me => 1,
            GameWinner::Opponent => 2,
        }
    }
}

/// One game of a match. Picks, stage and move are ids into the tracker's lookup tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub char_pick: Option<i64>,
    pub opponent_pick: Option<i64>,
    pub stage: Option<i64>,
    pub winner: Option<GameWinner>,
    pub final_move_id: Option<i64>,
}

impl GameResult {
    /// Nothing recorded for this game
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `Some(true)` if this side took the game, `None` if no winner was recorded
    pub fn won(&self) -> Option<bool> {
        self.winner.map(|winner| winner == GameWinner::Me)
    }
}

/// One ranked match as recorded by the tracker API
///
/// Per-game details arrive as flat `game_<n>_<field>` keys and are gathered
/// into [`MatchRecord::games`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub ranked_game_number: u32,
    pub match_date: DateTime<Utc>,
    pub elo_rank_old: i64,
    pub elo_rank_new: i64,
    pub elo_change: i64,
    pub match_win: MatchOutcome,
    #[serde(default, with = "int_flag")]
    pub match_forfeit: bool,
    #[serde(default)]
    pub opponent_name: String,
    #[serde(default, with = "known_value")]
    pub opponent_elo: Option<i64>,
    #[serde(default, with = "known_value")]
    pub opponent_estimated_elo: Option<i64>,
    #[serde(default, with = "known_value")]
    pub final_move_id: Option<i64>,
    #[serde(flatten, with = "game_slots")]
    pub games: Vec<GameResult>,
}

impl MatchRecord {
    /// Check that the stored ratings add up and the delta agrees with the outcome
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.elo_rank_old + self.elo_change != self.elo_rank_new {
            return Err(TrackerError::InvalidMatchRecord {
                reason: format!(
                    "game {}: {} + {} != {}",
                    self.ranked_game_number, self.elo_rank_old, self.elo_change, self.elo_rank_new
                ),
            });
        }

        if !self.match_win.admits_change(self.elo_change as f64) {
            return Err(TrackerError::InconsistentOutcome {
                outcome: self.match_win,
                rating_change: self.elo_change as f64,
            });
        }

        if self.games.len() > MAX_GAMES_PER_MATCH {
            return Err(TrackerError::InvalidMatchRecord {
                reason: format!(
                    "game {}: {} games recorded, at most {} allowed",
                    self.ranked_game_number,
                    self.games.len(),
                    MAX_GAMES_PER_MATCH
                ),
            });
        }

        Ok(())
    }

    /// Opponent rating if known, falling back to the estimate
    pub fn best_known_opponent_elo(&self) -> Option<i64> {
        self.opponent_elo.or(self.opponent_estimated_elo)
    }
}

/// 0/1 integer flags; the API uses -1 for "not recorded", read as false.
mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(i64::from(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(i64::deserialize(deserializer)? > 0)
    }
}

/// Ratings and ids where the API sends -1 (or null) for "unknown".
mod known_value {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rating: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        rating.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Ok(Option::<i64>::deserialize(deserializer)?.filter(|value| *value >= 0))
    }
}

/// Flat `game_1_char_pick` .. `game_3_final_move_id` keys, -1 meaning unset.
///
/// Trailing games with nothing recorded are dropped on the way in and
/// written back as -1 slots only for games that exist.
mod game_slots {
    use super::{GameResult, GameWinner, MAX_GAMES_PER_MATCH};
    use serde::de::{IgnoredAny, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    const FIELDS: [&str; 5] = ["char_pick", "opponent_pick", "stage", "winner", "final_move_id"];

    /// Zero-based game index and field name of a per-game key
    fn split_key(key: &str) -> Option<(usize, &str)> {
        let (number, field) = key.strip_prefix("game_")?.split_once('_')?;
        let number: usize = number.parse().ok()?;
        if (1..=MAX_GAMES_PER_MATCH).contains(&number) && FIELDS.contains(&field) {
            Some((number - 1, field))
        } else {
            None
        }
    }

    pub fn serialize<S: Serializer>(
        games: &[GameResult],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (index, game) in games.iter().take(MAX_GAMES_PER_MATCH).enumerate() {
            let prefix = format!("game_{}_", index + 1);
            map.serialize_entry(&format!("{}char_pick", prefix), &game.char_pick.unwrap_or(-1))?;
            map.serialize_entry(
                &format!("{}opponent_pick", prefix),
                &game.opponent_pick.unwrap_or(-1),
            )?;
            map.serialize_entry(&format!("{}stage", prefix), &game.stage.unwrap_or(-1))?;
            map.serialize_entry(
                &format!("{}winner", prefix),
                &game.winner.map_or(-1, GameWinner::code),
            )?;
            map.serialize_entry(
                &format!("{}final_move_id", prefix),
                &game.final_move_id.unwrap_or(-1),
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<GameResult>, D::Error> {
        deserializer.deserialize_map(GameSlotsVisitor)
    }

    struct GameSlotsVisitor;

    impl<'de> Visitor<'de> for GameSlotsVisitor {
        type Value = Vec<GameResult>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("per-game match fields")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut games = [GameResult::default(); MAX_GAMES_PER_MATCH];

            while let Some(key) = map.next_key::<String>()? {
                let Some((index, field)) = split_key(&key) else {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                };

                let value = map.next_value::<Option<i64>>()?.filter(|value| *value >= 0);
                let game = &mut games[index];
                match field {
                    "char_pick" => game.char_pick = value,
                    "opponent_pick" => game.opponent_pick = value,
                    "stage" => game.stage = value,
                    "winner" => game.winner = value.and_then(GameWinner::from_code),
                    _ => game.final_move_id = value,
                }
            }

            let played = games
                .iter()
                .rposition(|game| !game.is_empty())
                .map_or(0, |last| last + 1);
            Ok(games[..played].to_vec())
        }
    }
}

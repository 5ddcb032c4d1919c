//! Shared match-history fixtures for integration testing

use elo_tracker::types::MatchRecord;

/// A short season as the tracker API returns it
pub const SEASON_JSON: &str = r#"[
    {"ranked_game_number": 1, "match_date": "2025-03-01T18:00:00Z", "elo_rank_old": 1000,
     "elo_rank_new": 1013, "elo_change": 13, "match_win": 1, "match_forfeit": 0,
     "opponent_name": "alpha", "opponent_elo": 1000, "opponent_estimated_elo": -1,
     "final_move_id": 14,
     "game_1_char_pick": 3, "game_1_opponent_pick": 11, "game_1_stage": 2, "game_1_winner": 1,
     "game_2_char_pick": 3, "game_2_opponent_pick": 11, "game_2_stage": 5, "game_2_winner": 1,
     "game_3_char_pick": -1, "game_3_opponent_pick": -1, "game_3_stage": -1, "game_3_winner": -1},
    {"ranked_game_number": 2, "match_date": "2025-03-01T18:20:00Z", "elo_rank_old": 1013,
     "elo_rank_new": 1004, "elo_change": -9, "match_win": 0, "match_forfeit": 1,
     "opponent_name": "bravo", "opponent_elo": 1100},
    {"ranked_game_number": 3, "match_date": "2025-03-02T20:05:00Z", "elo_rank_old": 1004,
     "elo_rank_new": 1024, "elo_change": 20, "match_win": 1, "match_forfeit": -1,
     "opponent_name": "alpha", "opponent_elo": -1, "opponent_estimated_elo": 1244,
     "game_1_char_pick": 3, "game_1_opponent_pick": 7, "game_1_stage": 5, "game_1_winner": 2,
     "game_2_char_pick": 3, "game_2_opponent_pick": 11, "game_2_stage": 2, "game_2_winner": 1,
     "game_3_char_pick": 3, "game_3_opponent_pick": 11, "game_3_stage": 2, "game_3_winner": 1},
    {"ranked_game_number": 4, "match_date": "2025-03-02T20:30:00Z", "elo_rank_old": 1024,
     "elo_rank_new": 1010, "elo_change": -14, "match_win": 0, "match_forfeit": 0,
     "opponent_name": "delta", "opponent_elo": 982}
]"#;

pub fn season() -> Vec<MatchRecord> {
    serde_json::from_str(SEASON_JSON).expect("fixture season should parse")
}

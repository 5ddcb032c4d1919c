//! Match-history statistics
//!
//! Read-side aggregations over recorded matches. Everything here works from
//! the deltas and per-game results already stored on each record; no rating
//! engine calls.

use crate::config::HistorySettings;
use crate::error::TrackerError;
use crate::types::{GameResult, MatchOutcome, MatchRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Upper bound on the number of opponent-Elo histogram bins
pub const MAX_HISTOGRAM_BINS: i64 = 10_000;

/// Elo gained and lost over a window of recent matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EloChangeSummary {
    pub elo_change_plus: i64,
    /// Sum of negative deltas (zero or below)
    pub elo_change_minus: i64,
    pub difference: i64,
}

/// Rating movement of one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EloSwing {
    pub ranked_game_number: u32,
    pub start: i64,
    pub end: i64,
    pub opponent_elo: Option<i64>,
}

/// Opponent-Elo histogram bin covering `start..=end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: i64,
    pub end: i64,
    pub count: usize,
}

impl HistogramBin {
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Games won out of games played, grouped by a character or stage id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinRate {
    pub id: i64,
    pub games: usize,
    pub wins: usize,
    /// Percentage, 0 to 100
    pub win_rate: f64,
}

/// Record against one named opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub opponent_name: String,
    pub total_matches: usize,
    pub matches_won: usize,
    pub matches_lost: usize,
    pub win_percentage: f64,
    pub avg_elo_change: f64,
    /// Game win rate per stage
    pub stages: Vec<WinRate>,
    /// Game win rate per character the opponent picked
    pub matchups: Vec<WinRate>,
    /// Matches against this opponent, most recent first
    pub matches: Vec<MatchRecord>,
}

/// Combined statistics for a match history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub matches: usize,
    pub wins: usize,
    pub forfeits: usize,
    pub last_match: Option<MatchRecord>,
    pub last_win: Option<MatchRecord>,
    pub recent_change: EloChangeSummary,
    pub best_wins: Vec<MatchRecord>,
    pub opponent_histogram: Vec<HistogramBin>,
    pub character_win_rates: Vec<WinRate>,
    pub stage_win_rates: Vec<WinRate>,
    pub opponents: Vec<HeadToHead>,
}

/// Sum gains and losses over the `last_n` most recent matches
pub fn elo_change_summary(records: &[MatchRecord], last_n: usize) -> EloChangeSummary {
    let mut recent: Vec<&MatchRecord> = records.iter().collect();
    recent.sort_by_key(|record| Reverse(record.ranked_game_number));

    let mut summary = EloChangeSummary::default();
    for record in recent.into_iter().take(last_n) {
        if record.elo_change >= 0 {
            summary.elo_change_plus += record.elo_change;
        } else {
            summary.elo_change_minus += record.elo_change;
        }
    }
    summary.difference = summary.elo_change_plus + summary.elo_change_minus;
    summary
}

/// Start and end rating of every match, in the order given
pub fn elo_swings(records: &[MatchRecord]) -> Vec<EloSwing> {
    records
        .iter()
        .map(|record| EloSwing {
            ranked_game_number: record.ranked_game_number,
            start: record.elo_rank_old,
            end: record.elo_rank_old + record.elo_change,
            opponent_elo: record.best_known_opponent_elo(),
        })
        .collect()
}

/// Wins with the largest gains (the biggest upsets), strongest opponent first on ties
pub fn best_wins(records: &[MatchRecord], limit: usize) -> Vec<MatchRecord> {
    let mut wins: Vec<&MatchRecord> = records
        .iter()
        .filter(|record| record.match_win == MatchOutcome::Win)
        .collect();

    wins.sort_by_key(|record| {
        (
            Reverse(record.elo_change),
            Reverse(record.best_known_opponent_elo()),
        )
    });

    wins.into_iter().take(limit).cloned().collect()
}

/// Number of bins covering `min_elo..=max_elo`
///
/// Fails when the bin size is not positive, when the last bin would end past
/// `i64::MAX`, or when more than [`MAX_HISTOGRAM_BINS`] bins are needed. An
/// empty range needs no bins.
pub fn histogram_bin_count(
    bin_size: i64,
    min_elo: i64,
    max_elo: i64,
) -> Result<usize, TrackerError> {
    if bin_size <= 0 {
        return Err(TrackerError::ConfigurationError {
            message: format!("Histogram bin size must be positive, got {}", bin_size),
        });
    }
    if max_elo < min_elo {
        return Ok(0);
    }

    let too_many = || TrackerError::ConfigurationError {
        message: format!(
            "Histogram range {}..={} in bins of {} needs more than {} bins",
            min_elo, max_elo, bin_size, MAX_HISTOGRAM_BINS
        ),
    };
    let span = max_elo.checked_sub(min_elo).ok_or_else(too_many)?;
    if span / bin_size >= MAX_HISTOGRAM_BINS {
        return Err(too_many());
    }
    let count = span / bin_size + 1;

    // Cannot overflow: the last start is at most max_elo
    let last_start = min_elo + (count - 1) * bin_size;
    last_start
        .checked_add(bin_size - 1)
        .ok_or_else(|| TrackerError::ConfigurationError {
            message: format!(
                "Histogram bin starting at {} would end past {}",
                last_start,
                i64::MAX
            ),
        })?;

    Ok(count as usize)
}

/// Count matches per opponent-Elo bin
///
/// Bins start at `min_elo` and step by `bin_size` up to and including
/// `max_elo`. An opponent falls into the bin `floor(elo / bin_size) * bin_size`;
/// opponents outside the range, or off the bin grid, are not counted.
pub fn opponent_elo_histogram(
    records: &[MatchRecord],
    bin_size: i64,
    min_elo: i64,
    max_elo: i64,
) -> Result<Vec<HistogramBin>, TrackerError> {
    let count = histogram_bin_count(bin_size, min_elo, max_elo)?;

    let mut bins: Vec<HistogramBin> = (0..count as i64)
        .map(|index| {
            let start = min_elo + index * bin_size;
            HistogramBin {
                start,
                end: start + (bin_size - 1),
                count: 0,
            }
        })
        .collect();

    // Widened so ratings near the ends of i64 cannot overflow
    let width = i128::from(bin_size);
    for elo in records.iter().filter_map(|record| record.opponent_elo) {
        let offset = i128::from(elo).div_euclid(width) * width - i128::from(min_elo);
        if offset < 0 || offset % width != 0 {
            continue;
        }
        let Ok(index) = usize::try_from(offset / width) else {
            continue;
        };
        if let Some(bin) = bins.get_mut(index) {
            bin.count += 1;
        }
    }

    Ok(bins)
}

/// Matches that ended in a forfeit
pub fn forfeit_count(records: &[MatchRecord]) -> usize {
    records.iter().filter(|record| record.match_forfeit).count()
}

/// The most recent match by ranked game number
pub fn last_match(records: &[MatchRecord]) -> Option<&MatchRecord> {
    records.iter().max_by_key(|record| record.ranked_game_number)
}

/// The most recent win by ranked game number
pub fn last_win(records: &[MatchRecord]) -> Option<&MatchRecord> {
    records
        .iter()
        .filter(|record| record.match_win == MatchOutcome::Win)
        .max_by_key(|record| record.ranked_game_number)
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Per-game win rates grouped by `key`; games without a winner or key are skipped
fn game_win_rates<'a, I, F>(records: I, key: F) -> Vec<WinRate>
where
    I: IntoIterator<Item = &'a MatchRecord>,
    F: Fn(&GameResult) -> Option<i64>,
{
    let mut tally: BTreeMap<i64, (usize, usize)> = BTreeMap::new();
    for game in records.into_iter().flat_map(|record| record.games.iter()) {
        let (Some(id), Some(won)) = (key(game), game.won()) else {
            continue;
        };
        let entry = tally.entry(id).or_default();
        entry.0 += 1;
        if won {
            entry.1 += 1;
        }
    }

    tally
        .into_iter()
        .map(|(id, (games, wins))| WinRate {
            id,
            games,
            wins,
            win_rate: percentage(wins, games),
        })
        .collect()
}

/// Game win rate per character this side picked
pub fn character_win_rates(records: &[MatchRecord]) -> Vec<WinRate> {
    game_win_rates(records, |game| game.char_pick)
}

/// Game win rate per character the opponent picked
pub fn matchup_win_rates(records: &[MatchRecord]) -> Vec<WinRate> {
    game_win_rates(records, |game| game.opponent_pick)
}

/// Game win rate per stage
pub fn stage_win_rates(records: &[MatchRecord]) -> Vec<WinRate> {
    game_win_rates(records, |game| game.stage)
}

fn same_opponent(record: &MatchRecord, name: &str) -> bool {
    record.opponent_name.trim().to_lowercase() == name.to_lowercase()
}

/// Record against one opponent, matched by name ignoring case and surrounding space
///
/// A blank name matches nothing.
pub fn head_to_head(records: &[MatchRecord], opponent_name: &str) -> HeadToHead {
    let name = opponent_name.trim();
    let mut matches: Vec<&MatchRecord> = if name.is_empty() {
        Vec::new()
    } else {
        records
            .iter()
            .filter(|record| same_opponent(record, name))
            .collect()
    };
    matches.sort_by_key(|record| Reverse(record.ranked_game_number));

    let total_matches = matches.len();
    let matches_won = matches
        .iter()
        .filter(|record| record.match_win == MatchOutcome::Win)
        .count();
    let total_change: i64 = matches.iter().map(|record| record.elo_change).sum();

    HeadToHead {
        opponent_name: name.to_string(),
        total_matches,
        matches_won,
        matches_lost: total_matches - matches_won,
        win_percentage: percentage(matches_won, total_matches),
        avg_elo_change: if total_matches == 0 {
            0.0
        } else {
            total_change as f64 / total_matches as f64
        },
        stages: game_win_rates(matches.iter().copied(), |game| game.stage),
        matchups: game_win_rates(matches.iter().copied(), |game| game.opponent_pick),
        matches: matches.into_iter().cloned().collect(),
    }
}

/// Head-to-head records for every named opponent, ordered by name
pub fn opponents(records: &[MatchRecord]) -> Vec<HeadToHead> {
    // Keyed case-insensitively, keeping the first spelling seen
    let mut names: BTreeMap<String, &str> = BTreeMap::new();
    for record in records {
        let name = record.opponent_name.trim();
        if !name.is_empty() {
            names.entry(name.to_lowercase()).or_insert(name);
        }
    }

    names
        .values()
        .map(|name| head_to_head(records, name))
        .collect()
}

/// Build the full statistics report using the configured windows and bins
pub fn summarize(
    records: &[MatchRecord],
    settings: &HistorySettings,
) -> Result<HistoryReport, TrackerError> {
    Ok(HistoryReport {
        matches: records.len(),
        wins: records
            .iter()
            .filter(|record| record.match_win == MatchOutcome::Win)
            .count(),
        forfeits: forfeit_count(records),
        last_match: last_match(records).cloned(),
        last_win: last_win(records).cloned(),
        recent_change: elo_change_summary(records, settings.elo_change_window),
        best_wins: best_wins(records, settings.best_wins_limit),
        opponent_histogram: opponent_elo_histogram(
            records,
            settings.histogram_bin_size,
            settings.histogram_min_elo,
            settings.histogram_max_elo,
        )?,
        character_win_rates: character_win_rates(records),
        stage_win_rates: stage_win_rates(records),
        opponents: opponents(records),
    })
}

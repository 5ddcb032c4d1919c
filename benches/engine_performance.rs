//! Performance benchmarks for the Elo engine and history statistics

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elo_tracker::history;
use elo_tracker::rating::elo::{apply_match_result, estimate_opponent_rating};
use elo_tracker::{GameResult, GameWinner, KFactor, MatchOutcome, MatchRecord};

fn bench_estimate_opponent_rating(c: &mut Criterion) {
    let k = KFactor::default();

    c.bench_function("estimate_opponent_rating", |b| {
        b.iter(|| {
            black_box(estimate_opponent_rating(
                black_box(1000.0),
                black_box(10.0),
                MatchOutcome::Win,
                k,
            ))
        })
    });
}

fn bench_apply_match_result(c: &mut Criterion) {
    let k = KFactor::default();

    c.bench_function("apply_match_result", |b| {
        b.iter(|| {
            black_box(apply_match_result(
                black_box(1000.0),
                black_box(1120.0),
                MatchOutcome::Loss,
                k,
            ))
        })
    });
}

fn bench_history_summary(c: &mut Criterion) {
    let k = KFactor::default();
    let mut rating = 1000.0;
    let records: Vec<MatchRecord> = (0..1000u32)
        .map(|game| {
            let opponent = 800.0 + f64::from(game % 600);
            let outcome = MatchOutcome::from(game % 3 != 0);
            let update = apply_match_result(rating, opponent, outcome, k);
            let record = MatchRecord {
                ranked_game_number: game + 1,
                match_date: chrono::Utc::now(),
                elo_rank_old: update.old_rating as i64,
                elo_rank_new: update.new_rating as i64,
                elo_change: update.rating_change as i64,
                match_win: outcome,
                match_forfeit: false,
                opponent_name: format!("player{}", game % 40),
                opponent_elo: Some(opponent as i64),
                opponent_estimated_elo: None,
                final_move_id: None,
                games: vec![GameResult {
                    char_pick: Some(i64::from(game % 12)),
                    opponent_pick: Some(i64::from(game % 17)),
                    stage: Some(i64::from(game % 6)),
                    winner: Some(if outcome == MatchOutcome::Win {
                        GameWinner::Me
                    } else {
                        GameWinner::Opponent
                    }),
                    final_move_id: None,
                }],
            };
            rating = update.new_rating;
            record
        })
        .collect();

    let settings = elo_tracker::config::HistorySettings::default();
    c.bench_function("history_summary_1000_matches", |b| {
        b.iter(|| black_box(history::summarize(&records, &settings)))
    });
}

criterion_group!(
    benches,
    bench_estimate_opponent_rating,
    bench_apply_match_result,
    bench_history_summary
);
criterion_main!(benches);

//! Statistics calculation engine.
//!
//! Computes derived metrics from stored match records:
//! - Match outcomes from set scores
//! - Player and pair tallies, efficiency and win streaks
//! - Rankings and badge levels
//! - Textual insights over a period and month over month

pub mod achievements;
pub mod engine;
pub mod insights;
pub mod outcome;
pub mod pairs;
pub mod players;
pub mod ranking;
pub mod streaks;

pub use achievements::{evaluate, evaluate_efficiency, evaluate_player};
pub use engine::{ReportSnapshot, StatsEngine, StatsFilter, StatsReport};
pub use insights::{generate_insights, CloseMatch, Insight, PeriodStats};
pub use outcome::{resolve_outcome, tally_sets, MatchOutcome, SetTally};
pub use pairs::aggregate_pairs;
pub use players::{aggregate_players, discover_roster};
pub use ranking::{rank, Rankable, RankedEntry};
pub use streaks::{chronological, player_streak, StreakState};

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Win percentage, rounded to two decimals. Zero games gives zero.
pub fn calculate_efficiency(won: u32, played: u32) -> f64 {
    if played == 0 {
        0.0
    } else {
        round2(won as f64 / played as f64 * 100.0)
    }
}

/// Percentage of `part` over `whole`, clamped to `[0, 100]`.
/// A non-positive `whole` gives zero.
pub fn calculate_progress(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    (part / whole * 100.0).clamp(0.0, 100.0)
}

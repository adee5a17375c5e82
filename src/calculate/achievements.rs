//! Badge evaluation against three-step threshold ladders.

use std::collections::BTreeMap;

use super::{calculate_progress, round2};
use crate::config::AchievementConfig;
use crate::models::{AchievementStatus, BadgeTier, Metric, PlayerStat, ThresholdLadder};

/// Current value of a metric for a player.
pub fn metric_value(stat: &PlayerStat, metric: Metric) -> f64 {
    match metric {
        Metric::GamesPlayed => stat.games_played as f64,
        Metric::GamesWon => stat.games_won as f64,
        Metric::Partners => stat.partner_count() as f64,
        Metric::Efficiency => stat.efficiency,
        Metric::LongestStreak => stat.longest_streak as f64,
    }
}

/// Highest tier whose threshold `value` meets, and progress to the next.
///
/// Progress is `(value - previous) / (next - previous)` as a percentage,
/// where `previous` is zero below bronze. A maxed ladder reports the gold
/// threshold and full progress.
pub fn evaluate(metric: Metric, value: f64, ladder: &ThresholdLadder) -> AchievementStatus {
    let level = ladder
        .0
        .iter()
        .rposition(|threshold| value >= *threshold)
        .map(|i| i + 1)
        .unwrap_or(0);

    let (next_threshold, progress) = if level >= ladder.0.len() {
        (ladder.top(), 100.0)
    } else {
        let previous = if level == 0 { 0.0 } else { ladder.0[level - 1] };
        let next = ladder.0[level];
        (next, calculate_progress(value - previous, next - previous))
    };

    AchievementStatus {
        metric,
        tier: BadgeTier::from_level(level as u8),
        value,
        next_threshold,
        progress: round2(progress),
        not_eligible: false,
    }
}

/// Efficiency badge, gated on a minimum number of games.
///
/// Below `min_games` the player is not eligible whatever their efficiency,
/// and progress counts games towards eligibility.
pub fn evaluate_efficiency(
    efficiency: f64,
    games_played: u32,
    ladder: &ThresholdLadder,
    min_games: u32,
) -> AchievementStatus {
    if games_played < min_games {
        return AchievementStatus {
            metric: Metric::Efficiency,
            tier: None,
            value: efficiency,
            next_threshold: min_games as f64,
            progress: round2(calculate_progress(games_played as f64, min_games as f64)),
            not_eligible: true,
        };
    }
    evaluate(Metric::Efficiency, efficiency, ladder)
}

/// Every metric for one player.
pub fn evaluate_player(
    stat: &PlayerStat,
    config: &AchievementConfig,
) -> BTreeMap<Metric, AchievementStatus> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let ladder = config.ladder(metric);
            let status = match metric {
                Metric::Efficiency => evaluate_efficiency(
                    stat.efficiency,
                    stat.games_played,
                    ladder,
                    config.min_games_for_efficiency,
                ),
                _ => evaluate(metric, metric_value(stat, metric), ladder),
            };
            (metric, status)
        })
        .collect()
}

//! Per-pair aggregation.

use std::collections::BTreeMap;

use tracing::debug;

use super::outcome::resolve_outcome;
use super::streaks::{chronological, StreakState};
use crate::models::{MatchRecord, PairKey, PairStat, Side};

const SIDES: [Side; 2] = [Side::Pair1, Side::Pair2];

/// Fold records into one stat line per pair, keyed canonically.
///
/// Pairs with a blank member contribute nothing.
pub fn aggregate_pairs(records: &[&MatchRecord]) -> BTreeMap<PairKey, PairStat> {
    let mut stats: BTreeMap<PairKey, PairStat> = BTreeMap::new();

    for record in records {
        let outcome = resolve_outcome(&record.sets);
        for side in SIDES {
            let pair = record.pair(side);
            if !pair.is_complete() {
                continue;
            }
            let stat = stats
                .entry(pair.key())
                .or_insert_with(|| PairStat::new(&pair.player1, &pair.player2));
            stat.games_played += 1;
            if outcome.is_win_for(side) {
                stat.games_won += 1;
            } else if outcome.is_loss_for(side) {
                stat.games_lost += 1;
            }
        }
    }

    let mut streaks: BTreeMap<PairKey, StreakState> = BTreeMap::new();
    for record in chronological(records) {
        let outcome = resolve_outcome(&record.sets);
        for side in SIDES {
            let pair = record.pair(side);
            if pair.is_complete() {
                streaks
                    .entry(pair.key())
                    .or_default()
                    .push(outcome.is_win_for(side));
            }
        }
    }

    for (key, stat) in stats.iter_mut() {
        if let Some(streak) = streaks.get(key) {
            stat.current_streak = streak.current;
            stat.longest_streak = streak.longest;
        }
        stat.finalize();
    }

    debug!(
        "Aggregated {} records into {} pair stats",
        records.len(),
        stats.len()
    );
    stats
}

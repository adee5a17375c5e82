//! Win streak calculation.
//!
//! Streaks are folded over matches in date order. Any non-win, including a
//! no-decision, resets the current streak.

use serde::{Deserialize, Serialize};

use super::outcome::resolve_outcome;
use crate::models::MatchRecord;

/// Running streak state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive wins ending at the latest match folded in
    pub current: u32,
    /// Longest run seen so far
    pub longest: u32,
}

impl StreakState {
    pub fn push(&mut self, won: bool) {
        self.current = if won { self.current + 1 } else { 0 };
        self.longest = self.longest.max(self.current);
    }

    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut state = Self::default();
        for won in results {
            state.push(won);
        }
        state
    }
}

/// Dated records sorted by `(date, created_at)` ascending.
///
/// Undated records cannot be placed in time and are left out. The sort is
/// stable, so same-day records without a timestamp keep their input order.
pub fn chronological<'a>(records: &[&'a MatchRecord]) -> Vec<&'a MatchRecord> {
    let mut dated: Vec<&MatchRecord> = records
        .iter()
        .copied()
        .filter(|r| r.date.is_some())
        .collect();
    dated.sort_by_key(|r| (r.date, r.created_at));
    dated
}

/// Streak of one player over records already in chronological order.
pub fn player_streak(ordered: &[&MatchRecord], name: &str) -> StreakState {
    StreakState::from_results(ordered.iter().filter_map(|record| {
        let side = record.side_of(name)?;
        Some(resolve_outcome(&record.sets).is_win_for(side))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::game;

    #[test]
    fn test_push_fold() {
        let state = StreakState::from_results([true, true, false, true]);
        assert_eq!(state.current, 1);
        assert_eq!(state.longest, 2);
    }

    #[test]
    fn test_empty_streak() {
        assert_eq!(StreakState::from_results([]), StreakState::default());
    }

    #[test]
    fn test_chronological_sorts_and_drops_undated() {
        let late = game(Some("2025-03-20"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]);
        let early = game(Some("2025-03-01"), ["A", "B"], ["C", "D"], &[(1, 6), (1, 6)]);
        let undated = game(None, ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]);
        let records = vec![&late, &undated, &early];

        let ordered = chronological(&records);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].id, early.id);
        assert_eq!(ordered[1].id, late.id);
    }

    #[test]
    fn test_player_streak_input_order_not_trusted() {
        // win, loss, win, win by date; supplied shuffled
        let m1 = game(Some("2025-01-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]);
        let m2 = game(Some("2025-01-02"), ["A", "B"], ["C", "D"], &[(1, 6), (1, 6)]);
        let m3 = game(Some("2025-01-03"), ["C", "A"], ["B", "D"], &[(6, 1), (6, 1)]);
        let m4 = game(Some("2025-01-04"), ["B", "D"], ["A", "C"], &[(1, 6), (1, 6)]);
        let records = vec![&m4, &m2, &m1, &m3];

        let streak = player_streak(&chronological(&records), "A");
        assert_eq!(streak, StreakState { current: 2, longest: 2 });

        let streak = player_streak(&chronological(&records), "B");
        assert_eq!(streak, StreakState { current: 0, longest: 1 });
    }

    #[test]
    fn test_no_decision_breaks_streak() {
        let m1 = game(Some("2025-01-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]);
        let m2 = game(Some("2025-01-02"), ["A", "B"], ["C", "D"], &[(6, 4), (3, 6)]);
        let m3 = game(Some("2025-01-03"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]);
        let records = vec![&m1, &m2, &m3];

        let streak = player_streak(&chronological(&records), "A");
        assert_eq!(streak, StreakState { current: 1, longest: 1 });
    }

    #[test]
    fn test_player_absent() {
        let m1 = game(Some("2025-01-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]);
        let records = vec![&m1];
        assert_eq!(
            player_streak(&chronological(&records), "Z"),
            StreakState::default()
        );
    }
}

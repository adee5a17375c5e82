//! Match outcome resolution from set scores.
//!
//! A set is decided when both scores are present and differ. The pair with
//! more decided sets wins the match; equal counts, including zero decided
//! sets, are a no-decision. There is no fallback in favour of pair 1.

use serde::{Deserialize, Serialize};

use crate::models::{SetScore, Side};

/// Decided sets won by each pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTally {
    pub pair1: u32,
    pub pair2: u32,
}

impl SetTally {
    pub fn won_by(&self, side: Side) -> u32 {
        match side {
            Side::Pair1 => self.pair1,
            Side::Pair2 => self.pair2,
        }
    }

    pub fn lost_by(&self, side: Side) -> u32 {
        self.won_by(side.opponent())
    }

    pub fn decided(&self) -> u32 {
        self.pair1 + self.pair2
    }
}

/// Result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner(Side),
    NoDecision,
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            MatchOutcome::Winner(side) => Some(*side),
            MatchOutcome::NoDecision => None,
        }
    }

    pub fn is_win_for(&self, side: Side) -> bool {
        self.winner() == Some(side)
    }

    pub fn is_loss_for(&self, side: Side) -> bool {
        self.winner() == Some(side.opponent())
    }
}

/// Count decided sets per pair.
pub fn tally_sets(sets: &[SetScore]) -> SetTally {
    sets.iter()
        .filter_map(SetScore::winner)
        .fold(SetTally::default(), |mut tally, side| {
            match side {
                Side::Pair1 => tally.pair1 += 1,
                Side::Pair2 => tally.pair2 += 1,
            }
            tally
        })
}

/// Determine which pair won the match.
pub fn resolve_outcome(sets: &[SetScore]) -> MatchOutcome {
    let tally = tally_sets(sets);
    match tally.pair1.cmp(&tally.pair2) {
        std::cmp::Ordering::Greater => MatchOutcome::Winner(Side::Pair1),
        std::cmp::Ordering::Less => MatchOutcome::Winner(Side::Pair2),
        std::cmp::Ordering::Equal => MatchOutcome::NoDecision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(scores: &[(u32, u32)]) -> Vec<SetScore> {
        scores.iter().map(|&(a, b)| SetScore::new(a, b)).collect()
    }

    #[test]
    fn test_straight_sets() {
        assert_eq!(
            resolve_outcome(&sets(&[(6, 2), (6, 3)])),
            MatchOutcome::Winner(Side::Pair1)
        );
        assert_eq!(
            resolve_outcome(&sets(&[(2, 6), (3, 6)])),
            MatchOutcome::Winner(Side::Pair2)
        );
    }

    #[test]
    fn test_three_sets() {
        let outcome = resolve_outcome(&sets(&[(7, 6), (4, 6), (7, 6)]));
        assert_eq!(outcome, MatchOutcome::Winner(Side::Pair1));
        assert!(outcome.is_win_for(Side::Pair1));
        assert!(outcome.is_loss_for(Side::Pair2));
    }

    #[test]
    fn test_split_sets_is_no_decision() {
        let outcome = resolve_outcome(&sets(&[(6, 4), (3, 6)]));
        assert_eq!(outcome, MatchOutcome::NoDecision);
        assert!(!outcome.is_win_for(Side::Pair1));
        assert!(!outcome.is_loss_for(Side::Pair1));
    }

    #[test]
    fn test_no_sets_is_no_decision() {
        assert_eq!(resolve_outcome(&[]), MatchOutcome::NoDecision);
    }

    #[test]
    fn test_unparseable_and_equal_sets_ignored() {
        let mut s = sets(&[(6, 6), (6, 1)]);
        s.push(SetScore {
            pair1_score: None,
            pair2_score: Some(6),
        });
        let tally = tally_sets(&s);
        assert_eq!(tally, SetTally { pair1: 1, pair2: 0 });
        assert_eq!(tally.decided(), 1);
        assert_eq!(resolve_outcome(&s), MatchOutcome::Winner(Side::Pair1));
    }

    #[test]
    fn test_tally_by_side() {
        let tally = tally_sets(&sets(&[(7, 6), (4, 6), (7, 6)]));
        assert_eq!(tally.won_by(Side::Pair1), 2);
        assert_eq!(tally.lost_by(Side::Pair1), 1);
        assert_eq!(tally.won_by(Side::Pair2), 1);
        assert_eq!(tally.lost_by(Side::Pair2), 2);
    }
}

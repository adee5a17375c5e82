//! Ranking of players and pairs.
//!
//! Order is efficiency descending, then games won descending. Entries
//! with no games are left out.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{PairStat, PlayerStat};

/// Anything that can be placed on a leaderboard.
pub trait Rankable {
    fn label(&self) -> String;
    fn efficiency(&self) -> f64;
    fn games_won(&self) -> u32;
    fn games_played(&self) -> u32;
}

impl Rankable for PlayerStat {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn efficiency(&self) -> f64 {
        self.efficiency
    }

    fn games_won(&self) -> u32 {
        self.games_won
    }

    fn games_played(&self) -> u32 {
        self.games_played
    }
}

impl Rankable for PairStat {
    fn label(&self) -> String {
        self.key.to_string()
    }

    fn efficiency(&self) -> f64 {
        self.efficiency
    }

    fn games_won(&self) -> u32 {
        self.games_won
    }

    fn games_played(&self) -> u32 {
        self.games_played
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry<T> {
    /// 1-based position; entries with identical keys share a position
    pub position: usize,

    /// Same games won and efficiency as the leader
    pub tied_with_first: bool,

    #[serde(flatten)]
    pub stat: T,
}

/// Leaderboard comparator: `Less` means `a` ranks first.
pub fn compare<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.efficiency()
        .partial_cmp(&a.efficiency())
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.games_won().cmp(&a.games_won()))
}

fn same_key<T: Rankable>(a: &T, b: &T) -> bool {
    a.games_won() == b.games_won() && a.efficiency() == b.efficiency()
}

/// Build a leaderboard. The sort is stable, so equal entries keep input order.
pub fn rank<'a, T, I>(entries: I) -> Vec<RankedEntry<T>>
where
    T: Rankable + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sorted: Vec<&T> = entries
        .into_iter()
        .filter(|e| e.games_played() > 0)
        .collect();
    sorted.sort_by(|a, b| compare(*a, *b));

    let mut ranked: Vec<RankedEntry<T>> = Vec::with_capacity(sorted.len());
    for (i, entry) in sorted.iter().enumerate() {
        let position = match (i.checked_sub(1).map(|p| sorted[p]), ranked.last()) {
            (Some(prev), Some(last)) if same_key(prev, *entry) => last.position,
            _ => i + 1,
        };
        ranked.push(RankedEntry {
            position,
            tied_with_first: same_key(sorted[0], *entry),
            stat: (*entry).clone(),
        });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::calculate_efficiency;

    fn player(name: &str, won: u32, played: u32) -> PlayerStat {
        let mut stat = PlayerStat::new(name);
        stat.games_won = won;
        stat.games_lost = played - won;
        stat.games_played = played;
        stat.efficiency = calculate_efficiency(won, played);
        stat
    }

    fn names(ranked: &[RankedEntry<PlayerStat>]) -> Vec<&str> {
        ranked.iter().map(|r| r.stat.name.as_str()).collect()
    }

    #[test]
    fn test_efficiency_then_wins() {
        let stats = vec![
            player("Low", 1, 4),
            player("HighFew", 2, 2),
            player("HighMany", 5, 5),
            player("Mid", 3, 5),
        ];
        let ranked = rank(&stats);
        assert_eq!(names(&ranked), vec!["HighMany", "HighFew", "Mid", "Low"]);
        assert_eq!(ranked[0].position, 1);
        assert_eq!(ranked[3].position, 4);
    }

    #[test]
    fn test_zero_games_excluded() {
        let stats = vec![player("Idle", 0, 0), player("Active", 1, 2)];
        let ranked = rank(&stats);
        assert_eq!(names(&ranked), vec!["Active"]);
    }

    #[test]
    fn test_tied_with_first() {
        let stats = vec![
            player("A", 3, 4),
            player("B", 3, 4),
            player("C", 6, 8),
            player("D", 1, 4),
        ];
        let ranked = rank(&stats);
        // C has more wins at equal efficiency
        assert_eq!(names(&ranked), vec!["C", "A", "B", "D"]);
        assert!(ranked[0].tied_with_first);
        assert!(!ranked[1].tied_with_first);
        assert_eq!(ranked[1].position, 2);
        assert_eq!(ranked[2].position, 2);
        assert_eq!(ranked[3].position, 4);
    }

    #[test]
    fn test_multiple_tied_with_first() {
        let stats = vec![player("A", 2, 3), player("B", 2, 3), player("C", 1, 3)];
        let ranked = rank(&stats);
        assert!(ranked[0].tied_with_first);
        assert!(ranked[1].tied_with_first);
        assert!(!ranked[2].tied_with_first);
        assert_eq!(ranked[1].position, 1);
    }

    #[test]
    fn test_comparator_property() {
        let stats = vec![
            player("A", 1, 3),
            player("B", 2, 3),
            player("C", 4, 6),
            player("D", 0, 2),
            player("E", 3, 3),
            player("F", 2, 2),
        ];
        let ranked = rank(&stats);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0].stat, &pair[1].stat);
            assert!(a.efficiency >= b.efficiency);
            if a.efficiency == b.efficiency {
                assert!(a.games_won >= b.games_won);
            }
        }
    }

    #[test]
    fn test_empty_ranking() {
        let stats: Vec<PlayerStat> = Vec::new();
        assert!(rank(&stats).is_empty());
    }

    #[test]
    fn test_pairs_rankable() {
        let mut a = PairStat::new("Ana", "Bea");
        a.games_played = 2;
        a.games_won = 2;
        a.finalize();
        let mut b = PairStat::new("Carla", "Dani");
        b.games_played = 2;
        b.games_won = 1;
        b.finalize();
        let ranked = rank(&[b, a]);
        assert_eq!(ranked[0].stat.label(), "Ana & Bea");
    }

    #[test]
    fn test_ranked_entry_serializes_flat() {
        let stats = vec![player("A", 1, 1)];
        let ranked = rank(&stats);
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["position"], 1);
        assert_eq!(json["name"], "A");
        assert_eq!(json["tied_with_first"], true);
    }
}

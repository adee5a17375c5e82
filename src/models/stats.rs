//! Derived statistics models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PairKey;
use crate::calculate::calculate_efficiency;

/// Per-player statistics over a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    /// Player name
    pub name: String,

    /// Matches the player took part in, decided or not
    pub games_played: u32,

    /// Decided matches won
    pub games_won: u32,

    /// Decided matches lost
    pub games_lost: u32,

    /// Sets won across all matches
    pub sets_won: u32,

    /// Sets lost across all matches
    pub sets_lost: u32,

    /// Win percentage (0 to 100, two decimals)
    pub efficiency: f64,

    /// Consecutive wins ending at the most recent match
    pub current_streak: u32,

    /// Longest run of consecutive wins
    pub longest_streak: u32,

    /// Distinct co-players
    pub partners: BTreeSet<String>,
}

impl PlayerStat {
    /// Create an empty stat line for a player.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Matches played without a decided winner.
    pub fn no_decisions(&self) -> u32 {
        self.games_played - self.games_won - self.games_lost
    }

    pub fn partner_count(&self) -> u32 {
        self.partners.len() as u32
    }

    /// Recompute efficiency from the tallies.
    pub fn finalize(&mut self) {
        self.efficiency = calculate_efficiency(self.games_won, self.games_played);
    }
}

/// Per-pair statistics over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStat {
    /// Canonical key
    pub key: PairKey,

    /// Members in canonical order
    pub players: (String, String),

    pub games_played: u32,

    pub games_won: u32,

    pub games_lost: u32,

    /// Win percentage (0 to 100, two decimals)
    pub efficiency: f64,

    pub current_streak: u32,

    pub longest_streak: u32,
}

impl PairStat {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = PairKey::ordered(a, b);
        Self {
            key: PairKey::new(a, b),
            players: (first.to_string(), second.to_string()),
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            efficiency: 0.0,
            current_streak: 0,
            longest_streak: 0,
        }
    }

    pub fn finalize(&mut self) {
        self.efficiency = calculate_efficiency(self.games_won, self.games_played);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_stat_zero_games() {
        let mut stat = PlayerStat::new("Alice");
        stat.finalize();
        assert_eq!(stat.efficiency, 0.0);
        assert_eq!(stat.no_decisions(), 0);
    }

    #[test]
    fn test_player_stat_finalize() {
        let mut stat = PlayerStat::new("Alice");
        stat.games_played = 3;
        stat.games_won = 2;
        stat.games_lost = 0;
        stat.finalize();
        assert_eq!(stat.efficiency, 66.67);
        assert_eq!(stat.no_decisions(), 1);
    }

    #[test]
    fn test_pair_stat_canonical_members() {
        let stat = PairStat::new("Bob", "Alice");
        assert_eq!(stat.players, ("Alice".to_string(), "Bob".to_string()));
        assert_eq!(stat.key, PairKey::new("Alice", "Bob"));
    }

    #[test]
    fn test_player_stat_serialization() {
        let mut stat = PlayerStat::new("Alice");
        stat.partners.insert("Carol".to_string());
        let json = serde_json::to_string(&stat).unwrap();
        let back: PlayerStat = serde_json::from_str(&json).unwrap();
        assert_eq!(stat, back);
    }
}

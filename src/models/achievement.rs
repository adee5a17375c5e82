//! Badge tiers and achievement status.

use serde::{Deserialize, Serialize};

/// Three-step badge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
}

impl BadgeTier {
    /// Tier for a 1-based level; `0` or anything above 3 has no tier.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(BadgeTier::Bronze),
            2 => Some(BadgeTier::Silver),
            3 => Some(BadgeTier::Gold),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            BadgeTier::Bronze => 1,
            BadgeTier::Silver => 2,
            BadgeTier::Gold => 3,
        }
    }
}

impl std::fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadgeTier::Bronze => write!(f, "Bronze"),
            BadgeTier::Silver => write!(f, "Silver"),
            BadgeTier::Gold => write!(f, "Gold"),
        }
    }
}

/// Player statistic a badge is awarded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    GamesPlayed,
    GamesWon,
    Partners,
    Efficiency,
    LongestStreak,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::GamesPlayed,
        Metric::GamesWon,
        Metric::Partners,
        Metric::Efficiency,
        Metric::LongestStreak,
    ];

    /// Snake-case key, matching the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::GamesPlayed => "games_played",
            Metric::GamesWon => "games_won",
            Metric::Partners => "partners",
            Metric::Efficiency => "efficiency",
            Metric::LongestStreak => "longest_streak",
        }
    }

    /// Human-readable form of [`Metric::key`], e.g. `Longest streak`.
    pub fn label(&self) -> String {
        let words = self.key().replace('_', " ");
        let mut chars = words.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => words,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Ascending `[bronze, silver, gold]` thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdLadder(pub [f64; 3]);

impl ThresholdLadder {
    pub fn new(bronze: f64, silver: f64, gold: f64) -> Self {
        Self([bronze, silver, gold])
    }

    /// Non-decreasing from bronze to gold.
    pub fn is_ascending(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn threshold(&self, tier: BadgeTier) -> f64 {
        self.0[(tier.level() - 1) as usize]
    }

    pub fn top(&self) -> f64 {
        self.0[2]
    }
}

/// Achievement state of one player on one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub metric: Metric,

    /// Highest tier reached
    pub tier: Option<BadgeTier>,

    /// Current value of the statistic
    pub value: f64,

    /// Next unmet threshold, or the top one when maxed
    pub next_threshold: f64,

    /// Percentage towards the next tier (or towards eligibility)
    pub progress: f64,

    /// Sample too small for this metric to be awarded
    #[serde(default)]
    pub not_eligible: bool,
}

impl AchievementStatus {
    /// `0` for none, `1..=3` for bronze to gold.
    pub fn level(&self) -> u8 {
        self.tier.map(|t| t.level()).unwrap_or(0)
    }

    pub fn is_maxed(&self) -> bool {
        self.tier == Some(BadgeTier::Gold)
    }
}

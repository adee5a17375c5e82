//! Match record model: one played padel match between two pairs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, MatchId, PairKey};

/// Which of the two pairs in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Pair1,
    Pair2,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Pair1 => Side::Pair2,
            Side::Pair2 => Side::Pair1,
        }
    }
}

/// Two players fielded together. Names may be empty in incomplete records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub player1: String,
    pub player2: String,
}

impl Pair {
    pub fn new(player1: impl Into<String>, player2: impl Into<String>) -> Self {
        Self {
            player1: player1.into(),
            player2: player2.into(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.player1 == name || self.player2 == name
    }

    /// The other member of the pair, if `name` is in it.
    pub fn partner_of(&self, name: &str) -> Option<&str> {
        if self.player1 == name {
            Some(&self.player2)
        } else if self.player2 == name {
            Some(&self.player1)
        } else {
            None
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(&self.player1, &self.player2)
    }

    /// Both members have a name.
    pub fn is_complete(&self) -> bool {
        !self.player1.is_empty() && !self.player2.is_empty()
    }
}

/// Score of one set. `None` marks a missing or non-numeric score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub pair1_score: Option<u32>,
    pub pair2_score: Option<u32>,
}

impl SetScore {
    pub fn new(pair1_score: u32, pair2_score: u32) -> Self {
        Self {
            pair1_score: Some(pair1_score),
            pair2_score: Some(pair2_score),
        }
    }

    /// Both scores present.
    pub fn scores(&self) -> Option<(u32, u32)> {
        Some((self.pair1_score?, self.pair2_score?))
    }

    /// The side that won this set, if scores are valid and differ.
    pub fn winner(&self) -> Option<Side> {
        let (p1, p2) = self.scores()?;
        match p1.cmp(&p2) {
            std::cmp::Ordering::Greater => Some(Side::Pair1),
            std::cmp::Ordering::Less => Some(Side::Pair2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// One played match as stored after boundary validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Document id from the database, or a content hash
    pub id: MatchId,

    /// Day the match was played; required for any period filter
    pub date: Option<NaiveDate>,

    /// Venue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub pair1: Pair,

    pub pair2: Pair,

    /// Ordered sets, normally two or three
    #[serde(default)]
    pub sets: Vec<SetScore>,

    /// Name of whoever submitted the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,

    /// Submission timestamp assigned by the database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Create a new MatchRecord with a content-derived ID.
    pub fn new(date: Option<NaiveDate>, pair1: Pair, pair2: Pair, sets: Vec<SetScore>) -> Self {
        let id = Self::content_id(date, &pair1, &pair2, &sets);
        Self {
            id,
            date,
            location: None,
            pair1,
            pair2,
            sets,
            added_by: None,
            created_at: None,
        }
    }

    /// Deterministic ID over date, line-ups and scores.
    pub fn content_id(
        date: Option<NaiveDate>,
        pair1: &Pair,
        pair2: &Pair,
        sets: &[SetScore],
    ) -> MatchId {
        let date = date.map(|d| d.to_string()).unwrap_or_default();
        let score = sets
            .iter()
            .map(|s| {
                format!(
                    "{}-{}",
                    s.pair1_score.map(|v| v.to_string()).unwrap_or_default(),
                    s.pair2_score.map(|v| v.to_string()).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        EntityId::generate(&[
            &date,
            &pair1.player1,
            &pair1.player2,
            &pair2.player1,
            &pair2.player2,
            &score,
        ])
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn pair(&self, side: Side) -> &Pair {
        match side {
            Side::Pair1 => &self.pair1,
            Side::Pair2 => &self.pair2,
        }
    }

    /// Side a player is on. Pair 1 is checked first.
    pub fn side_of(&self, name: &str) -> Option<Side> {
        if self.pair1.contains(name) {
            Some(Side::Pair1)
        } else if self.pair2.contains(name) {
            Some(Side::Pair2)
        } else {
            None
        }
    }

    pub fn involves(&self, name: &str) -> bool {
        self.side_of(name).is_some()
    }

    /// Partner of `name` in this match.
    pub fn partner_of(&self, name: &str) -> Option<&str> {
        let side = self.side_of(name)?;
        self.pair(side).partner_of(name)
    }

    /// All four participant names, including empty ones.
    pub fn participants(&self) -> [&str; 4] {
        [
            self.pair1.player1.as_str(),
            self.pair1.player2.as_str(),
            self.pair2.player1.as_str(),
            self.pair2.player2.as_str(),
        ]
    }
}

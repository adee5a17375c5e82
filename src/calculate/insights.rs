//! Human-readable observations over a period and month over month.
//!
//! Every "best of" selection reports all entries sharing the best value.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pairs::aggregate_pairs;
use super::players::aggregate_players;
use super::round2;
use crate::models::{MatchId, MatchRecord, Month, PairKey, PairStat, PlayerStat};

/// Player and pair stats for one slice of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub players: BTreeMap<String, PlayerStat>,
    pub pairs: BTreeMap<PairKey, PairStat>,
}

impl PeriodStats {
    pub fn compute(records: &[&MatchRecord], roster: &[String]) -> Self {
        Self {
            players: aggregate_players(records, roster),
            pairs: aggregate_pairs(records),
        }
    }

    fn active_players(&self) -> impl Iterator<Item = &PlayerStat> {
        self.players.values().filter(|p| p.games_played > 0)
    }
}

/// A match shown in the closest-match insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseMatch {
    pub id: MatchId,
    pub date: Option<NaiveDate>,
    pub pair1: String,
    pub pair2: String,
    /// Valid sets only, e.g. `7-6, 4-6, 7-6`
    pub score: String,
    pub sets: u32,
    pub total_difference: u32,
}

/// One observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    TopEfficiency {
        players: Vec<String>,
        efficiency: f64,
    },
    MostSetsWon {
        players: Vec<String>,
        sets: u32,
    },
    MostSetsLost {
        players: Vec<String>,
        sets: u32,
    },
    LongestStreak {
        players: Vec<String>,
        streak: u32,
    },
    MostActivePair {
        pairs: Vec<PairKey>,
        games: u32,
    },
    MostImproved {
        month: Month,
        players: Vec<String>,
        improvement: f64,
    },
    LongestPairStreak {
        month: Month,
        pairs: Vec<PairKey>,
        streak: u32,
    },
    ClosestMatch {
        matches: Vec<CloseMatch>,
        average_difference: f64,
    },
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::TopEfficiency {
                players,
                efficiency,
            } => write!(f, "Top efficiency: {} ({:.2}%)", join(players), efficiency),
            Insight::MostSetsWon { players, sets } => {
                write!(f, "Most sets won: {} ({})", join(players), sets)
            }
            Insight::MostSetsLost { players, sets } => {
                write!(f, "Most sets lost: {} ({})", join(players), sets)
            }
            Insight::LongestStreak { players, streak } => {
                write!(f, "Longest win streak: {} ({} in a row)", join(players), streak)
            }
            Insight::MostActivePair { pairs, games } => {
                write!(f, "Most active pair: {} ({} matches)", join(pairs), games)
            }
            Insight::MostImproved {
                month,
                players,
                improvement,
            } => write!(
                f,
                "Most improved in {}: {} (+{:.2} points vs previous month)",
                month,
                join(players),
                improvement
            ),
            Insight::LongestPairStreak {
                month,
                pairs,
                streak,
            } => write!(
                f,
                "Longest pair streak in {}: {} ({} in a row)",
                month,
                join(pairs),
                streak
            ),
            Insight::ClosestMatch {
                matches,
                average_difference,
            } => {
                let described = matches
                    .iter()
                    .map(|m| {
                        let date = m
                            .date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "undated".to_string());
                        format!("{} {} vs {} {}", date, m.pair1, m.pair2, m.score)
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(
                    f,
                    "Closest match: {} (avg difference {:.2} per set)",
                    described, average_difference
                )
            }
        }
    }
}

/// All items sharing the highest key.
fn leaders<'a, T, K, I, F>(items: I, key: F) -> Option<(K, Vec<&'a T>)>
where
    T: 'a,
    K: PartialOrd + Copy,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> K,
{
    let mut best: Option<(K, Vec<&'a T>)> = None;
    for item in items {
        let k = key(item);
        let better = match &best {
            None => true,
            Some((top, _)) => k > *top,
        };
        if better {
            best = Some((k, vec![item]));
        } else if let Some((top, list)) = best.as_mut() {
            if k == *top {
                list.push(item);
            }
        }
    }
    best
}

fn names(stats: &[&PlayerStat]) -> Vec<String> {
    stats.iter().map(|s| s.name.clone()).collect()
}

fn keys(stats: &[&PairStat]) -> Vec<PairKey> {
    stats.iter().map(|s| s.key.clone()).collect()
}

/// Matches minimising the mean absolute per-set score difference.
///
/// Ties go to the match with more sets; remaining ties are all returned.
/// Records with no valid set are ignored.
pub fn closest_matches(records: &[&MatchRecord]) -> Option<(f64, Vec<CloseMatch>)> {
    let mut best: Vec<CloseMatch> = Vec::new();

    for record in records {
        let valid: Vec<(u32, u32)> = record.sets.iter().filter_map(|s| s.scores()).collect();
        if valid.is_empty() {
            continue;
        }
        let candidate = CloseMatch {
            id: record.id.clone(),
            date: record.date,
            pair1: record.pair1.key().to_string(),
            pair2: record.pair2.key().to_string(),
            score: valid
                .iter()
                .map(|(a, b)| format!("{}-{}", a, b))
                .collect::<Vec<_>>()
                .join(", "),
            sets: valid.len() as u32,
            total_difference: valid.iter().map(|(a, b)| a.abs_diff(*b)).sum(),
        };

        let Some(current) = best.first() else {
            best.push(candidate);
            continue;
        };

        // Compare averages exactly: d1 / n1 against d2 / n2
        let lhs = candidate.total_difference as u64 * current.sets as u64;
        let rhs = current.total_difference as u64 * candidate.sets as u64;
        let replace = lhs < rhs || (lhs == rhs && candidate.sets > current.sets);
        if replace {
            best = vec![candidate];
        } else if lhs == rhs && candidate.sets == current.sets {
            best.push(candidate);
        }
    }

    let first = best.first()?;
    let average = round2(first.total_difference as f64 / first.sets as f64);
    Some((average, best))
}

/// Generate insights.
///
/// `period` covers the selected date range; `this_month` and `last_month`
/// cover the calendar month of `month` and the one before it.
pub fn generate_insights(
    period_records: &[&MatchRecord],
    period: &PeriodStats,
    month: Month,
    this_month: &PeriodStats,
    last_month: &PeriodStats,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some((efficiency, top)) = leaders(period.active_players(), |p| p.efficiency) {
        insights.push(Insight::TopEfficiency {
            players: names(&top),
            efficiency,
        });
    }

    if let Some((sets, top)) = leaders(period.active_players(), |p| p.sets_won) {
        if sets > 0 {
            insights.push(Insight::MostSetsWon {
                players: names(&top),
                sets,
            });
        }
    }

    if let Some((sets, top)) = leaders(period.active_players(), |p| p.sets_lost) {
        if sets > 0 {
            insights.push(Insight::MostSetsLost {
                players: names(&top),
                sets,
            });
        }
    }

    if let Some((streak, top)) = leaders(period.active_players(), |p| p.longest_streak) {
        if streak > 0 {
            insights.push(Insight::LongestStreak {
                players: names(&top),
                streak,
            });
        }
    }

    if let Some((games, top)) = leaders(period.pairs.values(), |p| p.games_played) {
        insights.push(Insight::MostActivePair {
            pairs: keys(&top),
            games,
        });
    }

    let improvements: Vec<(String, f64)> = this_month
        .active_players()
        .filter_map(|now| {
            let before = last_month.players.get(&now.name)?;
            (before.games_played > 0)
                .then(|| (now.name.clone(), round2(now.efficiency - before.efficiency)))
        })
        .collect();
    if let Some((improvement, top)) = leaders(&improvements, |(_, delta)| *delta) {
        if improvement > 0.0 {
            insights.push(Insight::MostImproved {
                month,
                players: top.iter().map(|(name, _)| name.clone()).collect(),
                improvement,
            });
        }
    }

    if let Some((streak, top)) = leaders(this_month.pairs.values(), |p| p.longest_streak) {
        if streak > 0 {
            insights.push(Insight::LongestPairStreak {
                month,
                pairs: keys(&top),
                streak,
            });
        }
    }

    if let Some((average_difference, matches)) = closest_matches(period_records) {
        insights.push(Insight::ClosestMatch {
            matches,
            average_difference,
        });
    }

    insights
}

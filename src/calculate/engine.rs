//! Single entry point over the whole calculation pipeline.
//!
//! Every call recomputes from the full record list; nothing is cached
//! between calls, so the same input always yields the same report.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::achievements::evaluate_player;
use super::insights::{generate_insights, Insight, PeriodStats};
use super::players::discover_roster;
use super::ranking::{rank, RankedEntry};
use crate::config::AchievementConfig;
use crate::models::{
    AchievementStatus, DateRange, MatchRecord, Metric, Month, PairKey, PairStat, PlayerStat,
};

/// Which records and players a computation covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsFilter {
    pub range: DateRange,

    /// Restrict to these roster members; `None` keeps the whole roster
    #[serde(default)]
    pub players: Option<Vec<String>>,
}

impl StatsFilter {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            players: None,
        }
    }

    pub fn with_players(mut self, players: Vec<String>) -> Self {
        self.players = Some(players);
        self
    }

    /// Same player selection over a different date range.
    pub fn over(&self, range: DateRange) -> Self {
        Self {
            range,
            players: self.players.clone(),
        }
    }
}

/// Everything derived for one filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub filter: StatsFilter,

    /// Reference day for the month-over-month insights
    pub today: NaiveDate,

    /// Number of records the filter selected
    pub match_count: usize,

    pub players: BTreeMap<String, PlayerStat>,

    pub pairs: BTreeMap<PairKey, PairStat>,

    pub player_ranking: Vec<RankedEntry<PlayerStat>>,

    pub pair_ranking: Vec<RankedEntry<PairStat>>,

    pub achievements: BTreeMap<String, BTreeMap<Metric, AchievementStatus>>,

    pub insights: Vec<Insight>,
}

impl StatsReport {
    /// Insights rendered as text.
    pub fn insight_lines(&self) -> Vec<String> {
        self.insights.iter().map(|i| i.to_string()).collect()
    }
}

/// A report stamped with when it was computed, for the derived history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub computed_at: DateTime<Utc>,
    pub report: StatsReport,
}

impl ReportSnapshot {
    pub fn new(report: StatsReport) -> Self {
        Self {
            computed_at: Utc::now(),
            report,
        }
    }
}

/// Stats engine over a fixed roster.
#[derive(Debug, Clone, Default)]
pub struct StatsEngine {
    roster: Vec<String>,
    achievements: AchievementConfig,
}

impl StatsEngine {
    pub fn new(roster: Vec<String>, achievements: AchievementConfig) -> Self {
        Self {
            roster,
            achievements,
        }
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Track every player found in `records` when no roster is configured.
    pub fn with_discovered_roster(mut self, records: &[MatchRecord]) -> Self {
        if self.roster.is_empty() {
            self.roster = discover_roster(records);
            debug!("Discovered {} players from records", self.roster.len());
        }
        self
    }

    /// Roster members selected by the filter.
    pub fn effective_roster(&self, filter: &StatsFilter) -> Vec<String> {
        match &filter.players {
            None => self.roster.clone(),
            Some(selected) => {
                let selected: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
                let roster: Vec<String> = self
                    .roster
                    .iter()
                    .filter(|name| selected.contains(name.as_str()))
                    .cloned()
                    .collect();
                if roster.len() < selected.len() {
                    debug!(
                        "Ignoring {} selected players not on the roster",
                        selected.len() - roster.len()
                    );
                }
                roster
            }
        }
    }

    /// Records inside the date range, and involving a selected player when
    /// a player subset is given.
    pub fn select<'a>(&self, records: &'a [MatchRecord], filter: &StatsFilter) -> Vec<&'a MatchRecord> {
        let roster = filter.players.as_ref().map(|_| self.effective_roster(filter));
        records
            .iter()
            .filter(|r| filter.range.includes(r.date))
            .filter(|r| match &roster {
                None => true,
                Some(names) => names.iter().any(|name| r.involves(name)),
            })
            .collect()
    }

    fn period<'a>(
        &self,
        records: &'a [MatchRecord],
        filter: &StatsFilter,
    ) -> (Vec<&'a MatchRecord>, PeriodStats) {
        let selected = self.select(records, filter);
        let roster = self.effective_roster(filter);
        let mut stats = PeriodStats::compute(&selected, &roster);
        if filter.players.is_some() {
            stats
                .pairs
                .retain(|_, p| roster.contains(&p.players.0) || roster.contains(&p.players.1));
        }
        (selected, stats)
    }

    pub fn player_stats(
        &self,
        records: &[MatchRecord],
        filter: &StatsFilter,
    ) -> BTreeMap<String, PlayerStat> {
        self.period(records, filter).1.players
    }

    pub fn pair_stats(
        &self,
        records: &[MatchRecord],
        filter: &StatsFilter,
    ) -> BTreeMap<PairKey, PairStat> {
        self.period(records, filter).1.pairs
    }

    pub fn achievements(
        &self,
        players: &BTreeMap<String, PlayerStat>,
    ) -> BTreeMap<String, BTreeMap<Metric, AchievementStatus>> {
        players
            .iter()
            .map(|(name, stat)| (name.clone(), evaluate_player(stat, &self.achievements)))
            .collect()
    }

    /// Insights over the filter's range, plus the month containing `today`
    /// against the month before it.
    pub fn insights(&self, records: &[MatchRecord], filter: &StatsFilter, today: NaiveDate) -> Vec<Insight> {
        let (selected, period) = self.period(records, filter);
        self.insights_for(records, filter, today, &selected, &period)
    }

    fn insights_for(
        &self,
        records: &[MatchRecord],
        filter: &StatsFilter,
        today: NaiveDate,
        selected: &[&MatchRecord],
        period: &PeriodStats,
    ) -> Vec<Insight> {
        let month = Month::containing(today);
        let (_, this_month) = self.period(records, &filter.over(month.range()));
        let (_, last_month) = self.period(records, &filter.over(month.previous().range()));
        generate_insights(selected, period, month, &this_month, &last_month)
    }

    /// Compute the full report.
    pub fn report(&self, records: &[MatchRecord], filter: &StatsFilter, today: NaiveDate) -> StatsReport {
        let (selected, period) = self.period(records, filter);
        let insights = self.insights_for(records, filter, today, &selected, &period);

        let player_ranking = rank(period.players.values());
        let pair_ranking = rank(period.pairs.values());
        let achievements = self.achievements(&period.players);

        info!(
            "Computed report over {} of {} records: {} players, {} pairs, {} insights",
            selected.len(),
            records.len(),
            period.players.len(),
            period.pairs.len(),
            insights.len()
        );

        StatsReport {
            filter: filter.clone(),
            today,
            match_count: selected.len(),
            players: period.players,
            pairs: period.pairs,
            player_ranking,
            pair_ranking,
            achievements,
            insights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::{game, roster};
    use crate::models::BadgeTier;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn engine(names: &[&str]) -> StatsEngine {
        StatsEngine::new(roster(names), AchievementConfig::default())
    }

    #[test]
    fn test_single_match_report() {
        let records = vec![game(
            Some("2025-03-01"),
            ["Alice", "Carol"],
            ["Bob", "Dave"],
            &[(6, 2), (6, 3)],
        )];
        let report = engine(&["Alice", "Bob"]).report(&records, &StatsFilter::default(), date("2025-03-15"));

        assert_eq!(report.match_count, 1);
        assert_eq!(report.players["Alice"].games_won, 1);
        assert_eq!(report.players["Alice"].efficiency, 100.0);
        assert_eq!(report.players["Bob"].games_won, 0);
        assert_eq!(report.players["Bob"].efficiency, 0.0);
        assert_eq!(report.player_ranking[0].stat.name, "Alice");
        assert_eq!(report.player_ranking[1].stat.name, "Bob");
        assert_eq!(report.pairs.len(), 2);
        assert_eq!(report.achievements["Alice"].len(), 5);
        assert!(report.achievements["Alice"][&Metric::Efficiency].not_eligible);
    }

    #[test]
    fn test_pair_efficiency_and_streak_orderings() {
        // Ana and Bea together three times, two wins and one loss, with other
        // games in between
        let loss_between = vec![
            game(Some("2025-01-01"), ["Ana", "Bea"], ["C", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-01-02"), ["Ana", "C"], ["Bea", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-01-03"), ["Ana", "Bea"], ["C", "D"], &[(1, 6), (1, 6)]),
            game(Some("2025-01-04"), ["Bea", "D"], ["Ana", "C"], &[(6, 1), (6, 1)]),
            game(Some("2025-01-05"), ["Bea", "Ana"], ["C", "D"], &[(6, 1), (6, 1)]),
        ];
        let report = engine(&["Ana", "Bea"]).report(&loss_between, &StatsFilter::default(), date("2025-01-31"));
        let pair = &report.pairs[&PairKey::new("Ana", "Bea")];
        assert_eq!(pair.games_played, 3);
        assert_eq!(pair.efficiency, 66.67);
        assert_eq!(pair.longest_streak, 1);

        let loss_first = vec![
            game(Some("2025-01-01"), ["Ana", "Bea"], ["C", "D"], &[(1, 6), (1, 6)]),
            game(Some("2025-01-02"), ["X", "C"], ["Y", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-01-03"), ["Ana", "Bea"], ["C", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-01-05"), ["Bea", "Ana"], ["C", "D"], &[(6, 1), (6, 1)]),
        ];
        let report = engine(&["Ana", "Bea"]).report(&loss_first, &StatsFilter::default(), date("2025-01-31"));
        let pair = &report.pairs[&PairKey::new("Ana", "Bea")];
        assert_eq!(pair.efficiency, 66.67);
        assert_eq!(pair.longest_streak, 2);
        assert_eq!(report.players["Ana"].longest_streak, 2);
        assert_eq!(report.players["Ana"].current_streak, 2);
    }

    #[test]
    fn test_split_sets_no_decision() {
        let records = vec![game(
            Some("2025-03-01"),
            ["Alice", "Carol"],
            ["Bob", "Dave"],
            &[(6, 4), (3, 6)],
        )];
        let players = engine(&["Alice", "Bob", "Carol", "Dave"])
            .player_stats(&records, &StatsFilter::default());
        for stat in players.values() {
            assert_eq!(stat.games_played, 1);
            assert_eq!(stat.games_won, 0);
            assert_eq!(stat.games_lost, 0);
        }
    }

    #[test]
    fn test_date_range_excludes_undated() {
        let records = vec![
            game(Some("2025-02-28"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-03-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]),
            game(None, ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]),
        ];
        let e = engine(&["A"]);

        let all = e.player_stats(&records, &StatsFilter::default());
        assert_eq!(all["A"].games_played, 3);

        let march = StatsFilter::new(Month { year: 2025, month: 3 }.range());
        let stats = e.player_stats(&records, &march);
        assert_eq!(stats["A"].games_played, 1);
    }

    #[test]
    fn test_player_subset() {
        let records = vec![
            game(Some("2025-03-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-03-02"), ["E", "F"], ["G", "H"], &[(6, 1), (6, 1)]),
        ];
        let e = engine(&["A", "C", "E"]);
        let filter = StatsFilter::default().with_players(vec!["A".to_string(), "Zed".to_string()]);

        assert_eq!(e.effective_roster(&filter), roster(&["A"]));
        assert_eq!(e.select(&records, &filter).len(), 1);

        let report = e.report(&records, &filter, date("2025-03-31"));
        assert_eq!(report.players.keys().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(
            report.pairs.keys().cloned().collect::<Vec<_>>(),
            vec![PairKey::new("A", "B")]
        );
    }

    #[test]
    fn test_discovered_roster() {
        let records = vec![game(Some("2025-03-01"), ["B", "A"], ["C", ""], &[(6, 1), (6, 1)])];

        let discovered = StatsEngine::default().with_discovered_roster(&records);
        assert_eq!(discovered.roster(), roster(&["A", "B", "C"]).as_slice());

        let configured = engine(&["A"]).with_discovered_roster(&records);
        assert_eq!(configured.roster(), roster(&["A"]).as_slice());
    }

    #[test]
    fn test_empty_inputs() {
        let report = StatsEngine::default().report(&[], &StatsFilter::default(), date("2025-03-01"));
        assert_eq!(report.match_count, 0);
        assert!(report.players.is_empty());
        assert!(report.pairs.is_empty());
        assert!(report.player_ranking.is_empty());
        assert!(report.achievements.is_empty());
        assert!(report.insights.is_empty());

        let report = engine(&["A"]).report(&[], &StatsFilter::default(), date("2025-03-01"));
        assert_eq!(report.players["A"], PlayerStat::new("A"));
        assert!(report.player_ranking.is_empty());
    }

    #[test]
    fn test_report_is_idempotent() {
        let records = vec![
            game(Some("2025-03-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-03-02"), ["A", "C"], ["B", "D"], &[(7, 6), (4, 6), (7, 6)]),
            game(Some("2025-02-02"), ["A", "D"], ["B", "C"], &[(2, 6), (2, 6)]),
        ];
        let e = engine(&["A", "B", "C", "D"]);
        let first = e.report(&records, &StatsFilter::default(), date("2025-03-10"));
        let second = e.report(&records, &StatsFilter::default(), date("2025-03-10"));
        assert_eq!(first, second);
        assert!(!first.insight_lines().is_empty());
    }

    #[test]
    fn test_efficiency_badge_after_five_games() {
        let records: Vec<MatchRecord> = (1..=5)
            .map(|d| {
                game(
                    Some(&format!("2025-03-{:02}", d)),
                    ["A", "B"],
                    ["C", "D"],
                    &[(6, 1), (6, 1)],
                )
            })
            .collect();
        let e = engine(&["A"]);

        let four = StatsFilter::new(DateRange::new(None, Some(date("2025-03-04"))));
        let report = e.report(&records, &four, date("2025-03-31"));
        assert!(report.achievements["A"][&Metric::Efficiency].not_eligible);

        let report = e.report(&records, &StatsFilter::default(), date("2025-03-31"));
        let status = &report.achievements["A"][&Metric::Efficiency];
        assert!(!status.not_eligible);
        assert_eq!(status.tier, Some(BadgeTier::Gold));
        assert_eq!(report.achievements["A"][&Metric::LongestStreak].tier, Some(BadgeTier::Silver));
    }

    #[test]
    fn test_report_serialization() {
        let records = vec![game(Some("2025-03-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)])];
        let report = engine(&["A"]).report(&records, &StatsFilter::default(), date("2025-03-02"));
        let json = serde_json::to_string(&ReportSnapshot::new(report.clone())).unwrap();
        let back: ReportSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report.match_count, 1);
        assert_eq!(back.report.players["A"].games_won, 1);
        assert_eq!(back.report.player_ranking[0].stat.name, "A");
        assert_eq!(back.report.insight_lines(), report.insight_lines());
    }
}

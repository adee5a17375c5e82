//! Per-player aggregation.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::outcome::{resolve_outcome, tally_sets};
use super::streaks::{chronological, player_streak};
use crate::models::{MatchRecord, PlayerStat};

/// Fold records into one stat line per roster member.
///
/// Every roster member gets an entry, zeroed if they never played. Blank
/// and repeated roster names are ignored.
pub fn aggregate_players(records: &[&MatchRecord], roster: &[String]) -> BTreeMap<String, PlayerStat> {
    let mut stats: BTreeMap<String, PlayerStat> = roster
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| (name.clone(), PlayerStat::new(name.as_str())))
        .collect();

    for record in records {
        let outcome = resolve_outcome(&record.sets);
        let tally = tally_sets(&record.sets);

        for (name, stat) in stats.iter_mut() {
            let Some(side) = record.side_of(name) else {
                continue;
            };

            stat.games_played += 1;
            if outcome.is_win_for(side) {
                stat.games_won += 1;
            } else if outcome.is_loss_for(side) {
                stat.games_lost += 1;
            }
            stat.sets_won += tally.won_by(side);
            stat.sets_lost += tally.lost_by(side);

            if let Some(partner) = record.partner_of(name) {
                if !partner.is_empty() {
                    stat.partners.insert(partner.to_string());
                }
            }
        }
    }

    let ordered = chronological(records);
    for (name, stat) in stats.iter_mut() {
        let streak = player_streak(&ordered, name);
        stat.current_streak = streak.current;
        stat.longest_streak = streak.longest;
        stat.finalize();
    }

    debug!(
        "Aggregated {} records into {} player stats",
        records.len(),
        stats.len()
    );
    stats
}

/// Every non-empty player name appearing in the records, sorted.
pub fn discover_roster(records: &[MatchRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.participants())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::{game, roster};
    use crate::models::{Pair, SetScore};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_match_roster() {
        let m = game(
            Some("2025-03-01"),
            ["Alice", "Carol"],
            ["Bob", "Dave"],
            &[(6, 2), (6, 3)],
        );
        let stats = aggregate_players(&[&m], &roster(&["Alice", "Bob"]));

        assert_eq!(stats.len(), 2);
        let alice = &stats["Alice"];
        assert_eq!(alice.games_played, 1);
        assert_eq!(alice.games_won, 1);
        assert_eq!(alice.games_lost, 0);
        assert_eq!(alice.efficiency, 100.0);
        assert_eq!(alice.sets_won, 2);
        assert_eq!(alice.sets_lost, 0);

        let bob = &stats["Bob"];
        assert_eq!(bob.games_played, 1);
        assert_eq!(bob.games_won, 0);
        assert_eq!(bob.games_lost, 1);
        assert_eq!(bob.efficiency, 0.0);
        assert_eq!(bob.sets_lost, 2);
    }

    #[test]
    fn test_split_match_counts_played_only() {
        let m = game(
            Some("2025-03-01"),
            ["Alice", "Carol"],
            ["Bob", "Dave"],
            &[(6, 4), (3, 6)],
        );
        let stats = aggregate_players(&[&m], &roster(&["Alice", "Bob", "Carol", "Dave"]));

        for stat in stats.values() {
            assert_eq!(stat.games_played, 1, "{}", stat.name);
            assert_eq!(stat.games_won, 0);
            assert_eq!(stat.games_lost, 0);
            assert_eq!(stat.sets_won, 1);
            assert_eq!(stat.sets_lost, 1);
            assert_eq!(stat.current_streak, 0);
        }
    }

    #[test]
    fn test_partners_are_distinct() {
        let m1 = game(Some("2025-03-01"), ["Alice", "Carol"], ["Bob", "Dave"], &[(6, 2), (6, 3)]);
        let m2 = game(Some("2025-03-02"), ["Carol", "Alice"], ["Eve", "Dave"], &[(6, 2), (6, 3)]);
        let m3 = game(Some("2025-03-03"), ["Bob", "Dave"], ["Alice", "Eve"], &[(6, 2), (6, 3)]);
        let stats = aggregate_players(&[&m1, &m2, &m3], &roster(&["Alice"]));

        let alice = &stats["Alice"];
        assert_eq!(alice.partner_count(), 2);
        assert!(alice.partners.contains("Carol"));
        assert!(alice.partners.contains("Eve"));
        assert_eq!(alice.games_played, 3);
        assert_eq!(alice.games_won, 2);
        assert_eq!(alice.games_lost, 1);
        assert_eq!(alice.efficiency, 66.67);
        assert_eq!(alice.current_streak, 0);
        assert_eq!(alice.longest_streak, 2);
    }

    #[test]
    fn test_absent_roster_member_zeroed() {
        let m = game(Some("2025-03-01"), ["Alice", "Carol"], ["Bob", "Dave"], &[(6, 2), (6, 3)]);
        let stats = aggregate_players(&[&m], &roster(&["Zoe"]));
        assert_eq!(stats["Zoe"], PlayerStat::new("Zoe"));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate_players(&[], &[]).is_empty());
        let stats = aggregate_players(&[], &roster(&["Alice", "", "Alice"]));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats["Alice"].efficiency, 0.0);
    }

    #[test]
    fn test_incomplete_record_tolerated() {
        let m = MatchRecord::new(
            None,
            Pair::new("Alice", ""),
            Pair::default(),
            vec![SetScore {
                pair1_score: None,
                pair2_score: Some(3),
            }],
        );
        let stats = aggregate_players(&[&m], &roster(&["Alice"]));
        let alice = &stats["Alice"];
        assert_eq!(alice.games_played, 1);
        assert_eq!(alice.games_won, 0);
        assert_eq!(alice.games_lost, 0);
        assert_eq!(alice.sets_won, 0);
        assert!(alice.partners.is_empty());
    }

    #[test]
    fn test_won_plus_lost_never_exceeds_played() {
        let records = vec![
            game(Some("2025-01-01"), ["A", "B"], ["C", "D"], &[(6, 1), (6, 1)]),
            game(Some("2025-01-02"), ["A", "C"], ["B", "D"], &[(6, 4), (3, 6)]),
            game(Some("2025-01-03"), ["A", "D"], ["B", "C"], &[(2, 6), (6, 2), (4, 6)]),
            game(None, ["B", "A"], ["C", ""], &[]),
        ];
        let refs: Vec<&MatchRecord> = records.iter().collect();
        let stats = aggregate_players(&refs, &roster(&["A", "B", "C", "D"]));
        for stat in stats.values() {
            assert!(stat.games_won + stat.games_lost <= stat.games_played);
        }
        assert_eq!(stats["A"].games_played, 4);
        assert_eq!(stats["A"].no_decisions(), 2);
    }

    #[test]
    fn test_discover_roster() {
        let records = vec![
            game(None, ["Zoe", "Ana"], ["Bea", ""], &[]),
            game(None, ["Ana", "Carla"], ["Bea", "Zoe"], &[]),
        ];
        assert_eq!(
            discover_roster(&records),
            roster(&["Ana", "Bea", "Carla", "Zoe"])
        );
    }
}

use super::parser::BuildParser;
use super::part_stats::{wilson, win_rate};
use crate::models::{MatchRecord, PartCatalog, PartType};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Record of one full build as piloted by one player.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildStat {
    pub build: String,
    pub player: String,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub wilson_score: f64,
}

impl BuildStat {
    fn new(build: String, player: &str) -> Self {
        BuildStat {
            build,
            player: player.to_string(),
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            wilson_score: 0.0,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchOutcome {
    Win,
    Loss,
}

impl MatchOutcome {
    pub fn from_won(won: bool) -> Self {
        if won {
            MatchOutcome::Win
        } else {
            MatchOutcome::Loss
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Win => write!(f, "Win"),
            MatchOutcome::Loss => write!(f, "Loss"),
        }
    }
}

/// One match played by a given build and player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildMatch {
    pub result: MatchOutcome,
    pub opponent: String,
    pub opponent_bey: String,
    pub finish: String,
}

/// Every (build, player) pair whose build contains `part_key` in the
/// `part_type` slot, in order of first appearance.
pub fn builds_for_part(
    matches: &[MatchRecord],
    catalog: &PartCatalog,
    part_type: PartType,
    part_key: &str,
) -> Vec<BuildStat> {
    let parser = BuildParser::from_catalog(catalog);
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut builds: Vec<BuildStat> = Vec::new();

    for m in matches {
        for side in m.sides() {
            let parsed = parser.parse(side.combo);
            if parsed.is_unknown() || parsed.key(part_type) != part_key {
                continue;
            }

            let build = parsed.build_string();
            let slot = *index
                .entry((build.clone(), side.player.to_string()))
                .or_insert_with(|| {
                    builds.push(BuildStat::new(build, side.player));
                    builds.len() - 1
                });

            let stat = &mut builds[slot];
            if side.won {
                stat.wins += 1;
            } else {
                stat.losses += 1;
            }
        }
    }

    for stat in &mut builds {
        stat.win_rate = win_rate(stat.wins, stat.losses);
        stat.wilson_score = wilson(stat.wins, stat.games());
    }
    builds
}

/// Match log for one build as played by one player. A match where the
/// player used the build on both sides yields two rows.
pub fn matches_for_build(
    matches: &[MatchRecord],
    catalog: &PartCatalog,
    build: &str,
    player: &str,
) -> Vec<BuildMatch> {
    let parser = BuildParser::from_catalog(catalog);
    let mut rows = Vec::new();

    for m in matches {
        for side in m.sides() {
            if side.player != player {
                continue;
            }
            let parsed = parser.parse(side.combo);
            if parsed.is_unknown() || parsed.build_string() != build {
                continue;
            }
            let finish = if m.finish_label.is_empty() {
                "Unknown".to_string()
            } else {
                m.finish_label.clone()
            };
            rows.push(BuildMatch {
                result: MatchOutcome::from_won(side.won),
                opponent: side.opponent.to_string(),
                opponent_bey: side.opponent_combo.to_string(),
                finish,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(p1: &str, p2: &str, bey1: &str, bey2: &str, winner: &str, finish: &str) -> MatchRecord {
        MatchRecord {
            player1: p1.into(),
            player2: p2.into(),
            bey_combo1: bey1.into(),
            bey_combo2: bey2.into(),
            winner_name: winner.into(),
            finish_label: finish.into(),
            tournament_id: None,
        }
    }

    fn catalog() -> PartCatalog {
        let mut catalog = PartCatalog::new();
        catalog.add_blade("Dran Sword", "BX");
        catalog.add_blade("Wizard Rod", "UX");
        catalog.add_ratchet("3-60");
        catalog.add_ratchet("9-60");
        catalog.add_bit("F", "Flat");
        catalog.add_bit("B", "Ball");
        catalog
    }

    fn sample() -> Vec<MatchRecord> {
        vec![
            record("A", "B", "Dran Sword 3-60F", "Wizard Rod 9-60B", "A", "Burst Finish (x)"),
            record("A", "C", "Dran Sword 3-60F", "Dran Sword 9-60B", "C", "Spin Finish"),
            record("B", "C", "Wizard Rod 9-60B", "Dran Sword 9-60B", "B", ""),
            record("A", "B", "Dran Sword  3-60F", "Wizard Rod 3-60F", "A", "Over Finish (y)"),
        ]
    }

    #[test]
    fn test_builds_grouped_by_build_and_player() {
        let builds = builds_for_part(&sample(), &catalog(), PartType::Blade, "Dran Sword");
        assert_eq!(builds.len(), 2);

        assert_eq!(builds[0].build, "Dran Sword 3-60F");
        assert_eq!(builds[0].player, "A");
        assert_eq!((builds[0].wins, builds[0].losses), (2, 1));

        assert_eq!(builds[1].build, "Dran Sword 9-60B");
        assert_eq!(builds[1].player, "C");
        assert_eq!((builds[1].wins, builds[1].losses), (1, 1));
        assert!((builds[1].win_rate - 0.5).abs() < 1e-9);
        assert!(builds[1].wilson_score > 0.0);
    }

    #[test]
    fn test_builds_filter_by_bit() {
        let builds = builds_for_part(&sample(), &catalog(), PartType::Bit, "F");
        let pairs: Vec<(&str, &str)> = builds
            .iter()
            .map(|b| (b.build.as_str(), b.player.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("Dran Sword 3-60F", "A"), ("Wizard Rod 3-60F", "B")]
        );
    }

    #[test]
    fn test_builds_for_unused_part() {
        assert!(builds_for_part(&sample(), &catalog(), PartType::Ratchet, "5-80").is_empty());
        assert!(builds_for_part(&sample(), &catalog(), PartType::Blade, "").is_empty());
    }

    #[test]
    fn test_matches_for_build_rows() {
        let rows = matches_for_build(&sample(), &catalog(), "Dran Sword 3-60F", "A");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].result, MatchOutcome::Win);
        assert_eq!(rows[0].opponent, "B");
        assert_eq!(rows[0].opponent_bey, "Wizard Rod 9-60B");
        assert_eq!(rows[0].finish, "Burst Finish (x)");
        assert_eq!(rows[1].result, MatchOutcome::Loss);
        assert_eq!(rows[1].finish, "Spin Finish");
        assert_eq!(rows[2].opponent_bey, "Wizard Rod 3-60F");
    }

    #[test]
    fn test_matches_for_build_missing_finish() {
        let rows = matches_for_build(&sample(), &catalog(), "Dran Sword 9-60B", "C");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].result, MatchOutcome::Loss);
        assert_eq!(rows[1].finish, "Unknown");
    }

    #[test]
    fn test_round_trip_row_counts() {
        let matches = sample();
        let catalog = catalog();
        for part_type in PartType::ALL {
            for key in catalog.keys(part_type) {
                for stat in builds_for_part(&matches, &catalog, part_type, key) {
                    let rows = matches_for_build(&matches, &catalog, &stat.build, &stat.player);
                    assert_eq!(rows.len() as u32, stat.games());
                    let wins = rows.iter().filter(|r| r.result == MatchOutcome::Win).count();
                    assert_eq!(wins as u32, stat.wins);
                }
            }
        }
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(MatchOutcome::Win.to_string(), "Win");
        assert_eq!(MatchOutcome::from_won(false).to_string(), "Loss");
    }
}

use super::parser::BuildParser;
use crate::models::{MatchRecord, PartCatalog, PartType};
use std::collections::BTreeMap;

/// z for a ~95% confidence interval.
pub const WILSON_Z: f64 = 1.96;

/// Lower bound of the Wilson score interval at [`WILSON_Z`].
pub fn wilson(wins: u32, total: u32) -> f64 {
    wilson_with_z(wins, total, WILSON_Z)
}

/// Lower bound of the Wilson score interval for `wins` successes out of
/// `total` trials. Zero when there are no trials.
pub fn wilson_with_z(wins: u32, total: u32, z: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let phat = wins as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = phat + z2 / (2.0 * n);
    let spread = z * ((phat * (1.0 - phat) + z2 / (4.0 * n)) / n).sqrt();
    ((center - spread) / denom).clamp(0.0, 1.0)
}

/// Fraction of decided games won, 0 when nothing was played.
pub fn win_rate(wins: u32, losses: u32) -> f64 {
    let total = wins + losses;
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartStat {
    pub part_type: PartType,
    pub key: String,
    /// Blade line or bit long name; empty for ratchets.
    pub detail: String,
    pub used: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub wilson_score: f64,
}

impl PartStat {
    pub fn new(part_type: PartType, key: &str, detail: String) -> Self {
        PartStat {
            part_type,
            key: key.to_string(),
            detail,
            used: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            wilson_score: 0.0,
        }
    }

    fn record(&mut self, won: bool) {
        self.used += 1;
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }

    fn finalize(&mut self) {
        self.win_rate = win_rate(self.wins, self.losses);
        self.wilson_score = wilson(self.wins, self.wins + self.losses);
    }
}

/// Result of one aggregation pass. A fresh value per call; nothing is
/// carried over between passes.
#[derive(Debug, Clone, Default)]
pub struct MetaReport {
    pub blade: BTreeMap<String, PartStat>,
    pub ratchet: BTreeMap<String, PartStat>,
    pub bit: BTreeMap<String, PartStat>,
    pub matches_seen: usize,
    /// Combo strings (one per match side) that did not split into parts.
    pub unparsed_combos: usize,
}

impl MetaReport {
    pub fn stats(&self, part_type: PartType) -> &BTreeMap<String, PartStat> {
        match part_type {
            PartType::Blade => &self.blade,
            PartType::Ratchet => &self.ratchet,
            PartType::Bit => &self.bit,
        }
    }

    fn stats_mut(&mut self, part_type: PartType) -> &mut BTreeMap<String, PartStat> {
        match part_type {
            PartType::Blade => &mut self.blade,
            PartType::Ratchet => &mut self.ratchet,
            PartType::Bit => &mut self.bit,
        }
    }

    pub fn get(&self, part_type: PartType, key: &str) -> Option<&PartStat> {
        self.stats(part_type).get(key)
    }

    /// Parts that saw play, best Wilson score first.
    pub fn ranked(&self, part_type: PartType) -> Vec<PartStat> {
        let mut rows: Vec<PartStat> = self
            .stats(part_type)
            .values()
            .filter(|s| s.used > 0)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.wilson_score
                .partial_cmp(&a.wilson_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }

    /// Keys with at least one recorded use, for picking a build filter.
    pub fn used_keys(&self, part_type: PartType) -> Vec<&str> {
        self.stats(part_type)
            .values()
            .filter(|s| s.used > 0)
            .map(|s| s.key.as_str())
            .collect()
    }

    pub fn total_used(&self, part_type: PartType) -> u32 {
        self.stats(part_type).values().map(|s| s.used).sum()
    }

    /// Silently ignores keys the catalog does not know, including the
    /// empty key of an unparsed combo.
    fn count(&mut self, part_type: PartType, key: &str, won: bool) {
        if let Some(stat) = self.stats_mut(part_type).get_mut(key) {
            stat.record(won);
        }
    }
}

/// Tallies usage, wins and losses per catalog part over both sides of every
/// match, then derives win rate and Wilson score.
pub fn aggregate(matches: &[MatchRecord], catalog: &PartCatalog) -> MetaReport {
    let mut report = MetaReport::default();
    for part_type in PartType::ALL {
        let stats = report.stats_mut(part_type);
        for key in catalog.keys(part_type) {
            stats.insert(
                key.to_string(),
                PartStat::new(part_type, key, catalog.detail(part_type, key)),
            );
        }
    }

    let parser = BuildParser::from_catalog(catalog);
    for m in matches {
        for side in m.sides() {
            let parsed = parser.parse(side.combo);
            if parsed.is_unknown() {
                report.unparsed_combos += 1;
                continue;
            }
            for part_type in PartType::ALL {
                report.count(part_type, parsed.key(part_type), side.won);
            }
        }
        report.matches_seen += 1;
    }

    for part_type in PartType::ALL {
        for stat in report.stats_mut(part_type).values_mut() {
            stat.finalize();
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn record(p1: &str, p2: &str, bey1: &str, bey2: &str, winner: &str) -> MatchRecord {
        MatchRecord {
            player1: p1.into(),
            player2: p2.into(),
            bey_combo1: bey1.into(),
            bey_combo2: bey2.into(),
            winner_name: winner.into(),
            finish_label: "Burst Finish (...)".into(),
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
        catalog.add_bit("N", "Needle");
        catalog.add_bit("LF", "Low Flat");
        catalog
    }

    #[test]
    fn test_wilson_zero_total() {
        assert_eq!(wilson(0, 0), 0.0);
    }

    #[test]
    fn test_wilson_known_value() {
        // 45 of 50 at z = 1.96
        assert!((wilson(45, 50) - 0.7864).abs() < 1e-3);
    }

    #[test]
    fn test_wilson_bounds_and_monotonic() {
        for total in 0..=60u32 {
            let mut prev = -1.0;
            for wins in 0..=total {
                let score = wilson(wins, total);
                assert!((0.0..=1.0).contains(&score), "{wins}/{total} -> {score}");
                assert!(score + EPS >= prev, "not monotonic at {wins}/{total}");
                prev = score;
            }
        }
    }

    #[test]
    fn test_wilson_penalizes_small_samples() {
        assert!(wilson(45, 50) > wilson(1, 1));
    }

    #[test]
    fn test_win_rate_guard() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert!((win_rate(3, 1) - 0.75).abs() < EPS);
    }

    #[test]
    fn test_single_match_scenario() {
        let mut catalog = PartCatalog::new();
        catalog.add_bit("F", "Flat");
        catalog.add_bit("N", "Needle");
        catalog.add_blade("Dran Sword", "BX");
        catalog.add_ratchet("3-60");
        let matches = vec![record("A", "B", "Dran Sword 3-60F", "Dran Sword 3-60N", "A")];

        let report = aggregate(&matches, &catalog);

        let blade = report.get(PartType::Blade, "Dran Sword").unwrap();
        assert_eq!((blade.used, blade.wins, blade.losses), (2, 1, 1));
        let f = report.get(PartType::Bit, "F").unwrap();
        assert_eq!((f.used, f.wins, f.losses), (1, 1, 0));
        let n = report.get(PartType::Bit, "N").unwrap();
        assert_eq!((n.used, n.wins, n.losses), (1, 0, 1));
        assert!((blade.win_rate - 0.5).abs() < EPS);
    }

    #[test]
    fn test_used_equals_wins_plus_losses() {
        let matches = vec![
            record("A", "B", "Dran Sword 3-60F", "Wizard Rod 9-60LF", "A"),
            record("A", "C", "Dran Sword 3-60F", "Wizard Rod 3-60N", "C"),
            record("B", "C", "Wizard Rod 9-60LF", "Dran Sword 9-60N", "B"),
            record("B", "C", "Unknown 9-60Q", "Dran Sword 9-60N", "C"),
        ];
        let report = aggregate(&matches, &catalog());
        for part_type in PartType::ALL {
            for stat in report.stats(part_type).values() {
                assert_eq!(stat.used, stat.wins + stat.losses);
            }
        }
        assert_eq!(report.matches_seen, 4);
        assert_eq!(report.unparsed_combos, 1);
        // 7 recognised sides, every part type known for each of them
        assert_eq!(report.total_used(PartType::Blade), 7);
        assert_eq!(report.total_used(PartType::Bit), 7);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let matches = vec![record("A", "B", "Hells Scythe 4-60F", "Dran Sword 5-80N", "A")];
        let report = aggregate(&matches, &catalog());
        assert!(report.get(PartType::Blade, "Hells Scythe").is_none());
        assert_eq!(report.get(PartType::Bit, "F").unwrap().wins, 1);
        assert_eq!(report.get(PartType::Blade, "Dran Sword").unwrap().losses, 1);
        assert_eq!(report.total_used(PartType::Ratchet), 0);
    }

    #[test]
    fn test_unused_parts_stay_in_map_but_not_ranked() {
        let matches = vec![record("A", "B", "Dran Sword 3-60F", "Dran Sword 3-60F", "B")];
        let report = aggregate(&matches, &catalog());
        assert_eq!(report.stats(PartType::Blade).len(), 2);
        let ranked = report.ranked(PartType::Blade);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "Dran Sword");
        assert_eq!(report.used_keys(PartType::Bit), vec!["F"]);
        assert_eq!(report.get(PartType::Blade, "Wizard Rod").unwrap().wilson_score, 0.0);
    }

    #[test]
    fn test_ranked_by_wilson() {
        let mut matches = Vec::new();
        for i in 0..10 {
            let winner = if i < 8 { "A" } else { "B" };
            matches.push(record("A", "B", "Dran Sword 3-60F", "Wizard Rod 9-60N", winner));
        }
        matches.push(record("C", "D", "Wizard Rod 3-60LF", "Dran Sword 9-60N", "C"));
        let report = aggregate(&matches, &catalog());
        let bits = report.ranked(PartType::Bit);
        assert_eq!(bits[0].key, "F");
        assert_eq!(bits.last().unwrap().key, "N");
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let catalog = catalog();
        let matches = vec![record("A", "B", "Dran Sword 3-60F", "Wizard Rod 9-60N", "A")];
        let first = aggregate(&matches, &catalog);
        let second = aggregate(&matches, &catalog);
        assert_eq!(first.blade, second.blade);
        assert_eq!(second.get(PartType::Bit, "F").unwrap().used, 1);
    }
}

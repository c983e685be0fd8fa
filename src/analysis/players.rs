//! Per-player results: record, tournament points, finish tendencies and
//! how each bey a player brought performed.

use super::builds::MatchOutcome;
use super::part_stats::win_rate;
use crate::models::{FinishType, MatchRecord, Registration};
use std::collections::HashMap;

/// Finish counts in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinishTally {
    counts: Vec<(FinishType, u32)>,
}

impl FinishTally {
    pub fn add(&mut self, finish: &FinishType) {
        match self.counts.iter_mut().find(|(f, _)| f == finish) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((finish.clone(), 1)),
        }
    }

    pub fn get(&self, finish: &FinishType) -> u32 {
        self.counts
            .iter()
            .find(|(f, _)| f == finish)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Points the tallied finishes are worth.
    pub fn points(&self) -> u32 {
        self.counts.iter().map(|(f, n)| f.points() * n).sum()
    }

    /// Most frequent finish; the earliest seen wins a tie.
    pub fn top(&self) -> Option<&FinishType> {
        let mut best: Option<&(FinishType, u32)> = None;
        for entry in &self.counts {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(f, _)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FinishType, u32)> {
        self.counts.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeyStat {
    /// Combo string as recorded in the match table.
    pub bey: String,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub win_finishes: FinishTally,
    pub loss_finishes: FinishTally,
}

impl BeyStat {
    fn new(bey: &str) -> Self {
        BeyStat {
            bey: bey.to_string(),
            wins: 0,
            losses: 0,
            points: 0,
            win_finishes: FinishTally::default(),
            loss_finishes: FinishTally::default(),
        }
    }

    pub fn points_given(&self) -> u32 {
        self.loss_finishes.points()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMatch {
    pub result: MatchOutcome,
    pub bey: String,
    pub finish: FinishType,
    pub opponent: String,
    pub opponent_bey: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStat {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub win_finishes: FinishTally,
    pub loss_finishes: FinishTally,
    /// Beys from the player's registration, empty without one.
    pub declared_beys: Vec<String>,
    /// Beys in order of first use.
    pub beys: Vec<BeyStat>,
    pub matches: Vec<PlayerMatch>,
}

impl PlayerStat {
    fn new(name: &str) -> Self {
        PlayerStat {
            name: name.to_string(),
            wins: 0,
            losses: 0,
            points: 0,
            win_finishes: FinishTally::default(),
            loss_finishes: FinishTally::default(),
            declared_beys: Vec::new(),
            beys: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.losses)
    }

    pub fn points_per_match(&self) -> f64 {
        if self.games() == 0 {
            0.0
        } else {
            self.points as f64 / self.games() as f64
        }
    }

    /// Bey that earned the most points; the earliest used wins a tie.
    pub fn most_valuable_bey(&self) -> Option<&BeyStat> {
        let mut best: Option<&BeyStat> = None;
        for bey in &self.beys {
            if best.map_or(true, |b| bey.points > b.points) {
                best = Some(bey);
            }
        }
        best
    }

    pub fn bey(&self, bey: &str) -> Option<&BeyStat> {
        self.beys.iter().find(|b| b.bey == bey)
    }

    fn bey_mut(&mut self, bey: &str) -> &mut BeyStat {
        let idx = match self.beys.iter().position(|b| b.bey == bey) {
            Some(idx) => idx,
            None => {
                self.beys.push(BeyStat::new(bey));
                self.beys.len() - 1
            }
        };
        &mut self.beys[idx]
    }

    fn record_win(&mut self, bey: &str, finish: &FinishType, opponent: &str, opponent_bey: &str) {
        let pts = finish.points();
        self.wins += 1;
        self.points += pts;
        self.win_finishes.add(finish);

        let stat = self.bey_mut(bey);
        stat.wins += 1;
        stat.points += pts;
        stat.win_finishes.add(finish);

        self.matches.push(PlayerMatch {
            result: MatchOutcome::Win,
            bey: bey.to_string(),
            finish: finish.clone(),
            opponent: opponent.to_string(),
            opponent_bey: opponent_bey.to_string(),
        });
    }

    fn record_loss(&mut self, bey: &str, finish: &FinishType, opponent: &str, opponent_bey: &str) {
        self.losses += 1;
        self.loss_finishes.add(finish);

        let stat = self.bey_mut(bey);
        stat.losses += 1;
        stat.loss_finishes.add(finish);

        self.matches.push(PlayerMatch {
            result: MatchOutcome::Loss,
            bey: bey.to_string(),
            finish: finish.clone(),
            opponent: opponent.to_string(),
            opponent_bey: opponent_bey.to_string(),
        });
    }
}

/// Player records for everyone who appears in `matches`, in order of first
/// appearance. Matches whose winner is neither participant are skipped.
pub fn player_stats(matches: &[MatchRecord]) -> Vec<PlayerStat> {
    let mut roster = Roster::default();
    for m in matches {
        roster.enter(&m.player1);
        roster.enter(&m.player2);
    }
    roster.tally(matches)
}

/// Player records seeded from registrations, in registration order.
/// Registered players without a recorded match still get a (zeroed) entry,
/// and matches involving an unregistered player are skipped.
pub fn registered_player_stats(
    matches: &[MatchRecord],
    registrations: &[Registration],
) -> Vec<PlayerStat> {
    let mut roster = Roster::default();
    for reg in registrations {
        let player = roster.enter(&reg.player);
        for bey in &reg.beys {
            if !player.declared_beys.contains(bey) {
                player.declared_beys.push(bey.clone());
            }
        }
    }
    roster.tally(matches)
}

#[derive(Default)]
struct Roster {
    index: HashMap<String, usize>,
    players: Vec<PlayerStat>,
}

impl Roster {
    fn enter(&mut self, name: &str) -> &mut PlayerStat {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.index.insert(name.to_string(), self.players.len());
                self.players.push(PlayerStat::new(name));
                self.players.len() - 1
            }
        };
        &mut self.players[idx]
    }

    fn tally(mut self, matches: &[MatchRecord]) -> Vec<PlayerStat> {
        for m in matches {
            let (winner, win_bey, loser, lose_bey) = if m.winner_name == m.player1 {
                (&m.player1, &m.bey_combo1, &m.player2, &m.bey_combo2)
            } else if m.winner_name == m.player2 {
                (&m.player2, &m.bey_combo2, &m.player1, &m.bey_combo1)
            } else {
                continue;
            };
            let (Some(&w), Some(&l)) = (self.index.get(winner), self.index.get(loser)) else {
                continue;
            };
            let finish = m.finish_type();
            self.players[w].record_win(win_bey, &finish, loser, lose_bey);
            self.players[l].record_loss(lose_bey, &finish, winner, win_bey);
        }
        self.players
    }
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

    fn sample() -> Vec<MatchRecord> {
        vec![
            record("Ana", "Ben", "Dran Sword 3-60F", "Wizard Rod 9-60B", "Ana", "Burst Finish (r1)"),
            record("Ana", "Cal", "Hells Scythe 4-60T", "Leon Claw 5-60P", "Cal", "Spin Finish"),
            record("Ben", "Ana", "Wizard Rod 9-60B", "Dran Sword 3-60F", "Ana", "Extreme Finish (wall)"),
            record("Ben", "Cal", "Wizard Rod 9-60B", "Leon Claw 5-60P", "Nobody", "Over Finish"),
        ]
    }

    #[test]
    fn test_roster_in_first_appearance_order() {
        let players = player_stats(&sample());
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Ben", "Cal"]);
    }

    #[test]
    fn test_points_and_record() {
        let players = player_stats(&sample());
        let ana = &players[0];
        assert_eq!((ana.wins, ana.losses), (2, 1));
        assert_eq!(ana.points, 5);
        assert!((ana.points_per_match() - 5.0 / 3.0).abs() < 1e-9);
        assert_eq!(ana.matches.len(), 3);
        assert_eq!(ana.matches[1].result, MatchOutcome::Loss);
        assert_eq!(ana.matches[1].opponent_bey, "Leon Claw 5-60P");

        let ben = &players[1];
        assert_eq!((ben.wins, ben.losses, ben.points), (0, 2, 0));
        // the match with an unrecognised winner counts for nobody
        assert_eq!(players[2].games(), 1);
    }

    #[test]
    fn test_bey_stats_and_most_valuable() {
        let players = player_stats(&sample());
        let ana = &players[0];
        let dran = ana.bey("Dran Sword 3-60F").unwrap();
        assert_eq!((dran.wins, dran.losses, dran.points), (2, 0, 5));
        assert_eq!(dran.win_finishes.get(&FinishType::Extreme), 1);
        let scythe = ana.bey("Hells Scythe 4-60T").unwrap();
        assert_eq!(scythe.points_given(), 1);
        assert_eq!(ana.most_valuable_bey().unwrap().bey, "Dran Sword 3-60F");
    }

    #[test]
    fn test_top_finish_tie_goes_to_first_seen() {
        let players = player_stats(&sample());
        let ana = &players[0];
        assert_eq!(ana.win_finishes.top(), Some(&FinishType::Burst));
        assert_eq!(ana.loss_finishes.top(), Some(&FinishType::Spin));
        assert_eq!(players[1].win_finishes.top(), None);
    }

    #[test]
    fn test_unknown_finish_scores_nothing() {
        let matches = vec![record("A", "B", "X 1-60F", "Y 1-60F", "A", "")];
        let players = player_stats(&matches);
        assert_eq!(players[0].points, 0);
        assert_eq!(players[0].wins, 1);
        assert_eq!(players[0].win_finishes.total(), 1);
    }

    #[test]
    fn test_registered_roster() {
        let regs = vec![
            Registration {
                player: "Cal".into(),
                beys: vec!["Leon Claw 5-60P".into()],
                tournament_id: None,
            },
            Registration {
                player: "Ana".into(),
                beys: vec!["Dran Sword 3-60F".into(), "Hells Scythe 4-60T".into()],
                tournament_id: None,
            },
            Registration {
                player: "Dee".into(),
                beys: Vec::new(),
                tournament_id: None,
            },
        ];
        let players = registered_player_stats(&sample(), &regs);
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cal", "Ana", "Dee"]);

        // Ben is not registered, so only the Ana/Cal match counts
        let ana = &players[1];
        assert_eq!((ana.wins, ana.losses), (0, 1));
        assert_eq!(ana.declared_beys, vec!["Dran Sword 3-60F", "Hells Scythe 4-60T"]);
        assert_eq!((players[0].wins, players[0].points), (1, 1));

        let dee = &players[2];
        assert_eq!(dee.games(), 0);
        assert!(dee.most_valuable_bey().is_none());
    }

    #[test]
    fn test_match_roster_has_no_declared_beys() {
        let players = player_stats(&sample());
        assert!(players.iter().all(|p| p.declared_beys.is_empty()));
    }

    #[test]
    fn test_most_valuable_bey_without_points() {
        let matches = vec![record("A", "B", "X 1-60F", "Y 1-60F", "B", "Spin Finish")];
        let players = player_stats(&matches);
        assert_eq!(players[0].most_valuable_bey().unwrap().bey, "X 1-60F");
        assert!(player_stats(&[]).is_empty());
    }
}

//! Domain types shared by the loaders and the analysis passes.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The three part slots a build is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    Blade,
    Ratchet,
    Bit,
}

impl PartType {
    pub const ALL: [PartType; 3] = [PartType::Blade, PartType::Ratchet, PartType::Bit];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartType::Blade => "blade",
            PartType::Ratchet => "ratchet",
            PartType::Bit => "bit",
        }
    }

    /// Plural heading used above rendered tables.
    pub fn title(&self) -> &'static str {
        match self {
            PartType::Blade => "Blades",
            PartType::Ratchet => "Ratchets",
            PartType::Bit => "Bits",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blade" | "blades" => Ok(PartType::Blade),
            "ratchet" | "ratchets" => Ok(PartType::Ratchet),
            "bit" | "bits" => Ok(PartType::Bit),
            _ => Err(AppError::UnknownPartType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BladeInfo {
    pub name: String,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatchetInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitInfo {
    /// Shortcut as written at the end of a combo string, e.g. "F".
    pub name: String,
    /// Long form, e.g. "Flat".
    pub full_name: String,
}

/// Known parts, keyed by the identifier that appears inside combo strings.
///
/// Built once from the reference tables and never mutated by the analysis
/// passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartCatalog {
    pub blade: BTreeMap<String, BladeInfo>,
    pub ratchet: BTreeMap<String, RatchetInfo>,
    pub bit: BTreeMap<String, BitInfo>,
}

impl PartCatalog {
    pub fn new() -> Self {
        PartCatalog::default()
    }

    pub fn add_blade(&mut self, key: &str, line: &str) {
        self.blade.insert(
            key.to_string(),
            BladeInfo {
                name: key.to_string(),
                line: line.to_string(),
            },
        );
    }

    pub fn add_ratchet(&mut self, key: &str) {
        self.ratchet.insert(
            key.to_string(),
            RatchetInfo {
                name: key.to_string(),
            },
        );
    }

    pub fn add_bit(&mut self, shortcut: &str, full_name: &str) {
        self.bit.insert(
            shortcut.to_string(),
            BitInfo {
                name: shortcut.to_string(),
                full_name: full_name.to_string(),
            },
        );
    }

    pub fn contains(&self, part_type: PartType, key: &str) -> bool {
        match part_type {
            PartType::Blade => self.blade.contains_key(key),
            PartType::Ratchet => self.ratchet.contains_key(key),
            PartType::Bit => self.bit.contains_key(key),
        }
    }

    pub fn keys(&self, part_type: PartType) -> Vec<&str> {
        match part_type {
            PartType::Blade => self.blade.keys().map(String::as_str).collect(),
            PartType::Ratchet => self.ratchet.keys().map(String::as_str).collect(),
            PartType::Bit => self.bit.keys().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blade.is_empty() && self.ratchet.is_empty() && self.bit.is_empty()
    }

    /// Product line for blades, bit long name for bits, empty for ratchets.
    pub fn detail(&self, part_type: PartType, key: &str) -> String {
        match part_type {
            PartType::Blade => self
                .blade
                .get(key)
                .map(|b| b.line.clone())
                .unwrap_or_default(),
            PartType::Ratchet => String::new(),
            PartType::Bit => self
                .bit
                .get(key)
                .map(|b| b.full_name.clone())
                .unwrap_or_default(),
        }
    }
}

/// Category of a match outcome, taken from the prefix of the outcome label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishType {
    Spin,
    Burst,
    Over,
    Extreme,
    Other(String),
}

impl FinishType {
    /// "Burst Finish (lap 2)" -> Burst. Only the text before " (" counts.
    pub fn from_label(label: &str) -> Self {
        let prefix = label.split(" (").next().unwrap_or("").trim();
        match prefix {
            "Spin Finish" => FinishType::Spin,
            "Burst Finish" => FinishType::Burst,
            "Over Finish" => FinishType::Over,
            "Extreme Finish" => FinishType::Extreme,
            other => FinishType::Other(other.to_string()),
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            FinishType::Spin => 1,
            FinishType::Burst | FinishType::Over => 2,
            FinishType::Extreme => 3,
            FinishType::Other(_) => 0,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FinishType::Spin => "Spin Finish",
            FinishType::Burst => "Burst Finish",
            FinishType::Over => "Over Finish",
            FinishType::Extreme => "Extreme Finish",
            FinishType::Other(label) => label,
        }
    }
}

impl fmt::Display for FinishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded match between two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player1: String,
    pub player2: String,
    pub bey_combo1: String,
    pub bey_combo2: String,
    pub winner_name: String,
    pub finish_label: String,
    /// Tournament the match was played in, when the table records it.
    #[serde(default)]
    pub tournament_id: Option<String>,
}

/// A confirmed tournament entry and the beys the player declared for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub player: String,
    pub beys: Vec<String>,
    #[serde(default)]
    pub tournament_id: Option<String>,
}

/// One player's view of a match.
#[derive(Debug, Clone, Copy)]
pub struct MatchSide<'a> {
    pub player: &'a str,
    pub combo: &'a str,
    pub opponent: &'a str,
    pub opponent_combo: &'a str,
    pub won: bool,
}

impl MatchRecord {
    pub fn finish_type(&self) -> FinishType {
        FinishType::from_label(&self.finish_label)
    }

    /// True when the match belongs to `tournament`. Unscoped records never
    /// match a tournament filter.
    pub fn in_tournament(&self, tournament: &str) -> bool {
        self.tournament_id.as_deref() == Some(tournament)
    }

    /// Both sides, player 1 first.
    pub fn sides(&self) -> [MatchSide<'_>; 2] {
        [
            MatchSide {
                player: &self.player1,
                combo: &self.bey_combo1,
                opponent: &self.player2,
                opponent_combo: &self.bey_combo2,
                won: self.winner_name == self.player1,
            },
            MatchSide {
                player: &self.player2,
                combo: &self.bey_combo2,
                opponent: &self.player1,
                opponent_combo: &self.bey_combo1,
                won: self.winner_name == self.player2,
            },
        ]
    }
}

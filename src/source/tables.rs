//! CSV exports of the reference and match tables.
//!
//! Columns are located by header name, case-insensitively, so both the
//! spreadsheet exports ("PLAYER 1") and database dumps ("player1_name")
//! load the same way.

use crate::error::AppError;
use crate::models::{MatchRecord, PartCatalog, Registration};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

const BLADE_KEY: &[&str] = &["Blades", "Blade"];
const BLADE_LINE: &[&str] = &["Line"];
const RATCHET_KEY: &[&str] = &["Ratchet", "Ratchets"];
const BIT_KEY: &[&str] = &["Shortcut"];
const BIT_NAME: &[&str] = &["Bit", "Bits"];

const PLAYER_1: &[&str] = &["PLAYER 1", "player1_name"];
const PLAYER_2: &[&str] = &["PLAYER 2", "player2_name"];
const BEY_1: &[&str] = &["BEY 1", "player1_beyblade"];
const BEY_2: &[&str] = &["BEY 2", "player2_beyblade"];
const WINNER: &[&str] = &["WINNER", "winner_name"];
const OUTCOME: &[&str] = &["OUTCOME", "outcome"];
const TOURNAMENT: &[&str] = &["TOURNAMENT", "tournament_id"];

const PLAYER: &[&str] = &["PLAYER", "player_name"];
const DECLARED_BEYS: &[&str] = &["BEYS", "BEYBLADE", "beyblade_name", "beyblades"];
const STATUS: &[&str] = &["STATUS", "status"];

struct Table {
    name: &'static str,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl Table {
    fn read(name: &'static str, text: &str) -> Result<Self, AppError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::csv(name, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::csv(name, e))?;

        Ok(Table {
            name,
            headers,
            records,
        })
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            self.headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(alias))
        })
    }

    fn column(&self, aliases: &[&str]) -> Result<usize, AppError> {
        self.find(aliases).ok_or_else(|| AppError::MissingColumn {
            table: self.name.to_string(),
            column: aliases[0].to_string(),
        })
    }
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}

fn optional_cell(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.map(|i| cell(record, i))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Builds the part catalog from the blade, ratchet and bit tables. Rows with
/// an empty key are dropped.
pub fn parse_catalog(blades: &str, ratchets: &str, bits: &str) -> Result<PartCatalog, AppError> {
    let mut catalog = PartCatalog::new();

    let table = Table::read("blade", blades)?;
    let key = table.column(BLADE_KEY)?;
    let line = table.find(BLADE_LINE);
    for record in &table.records {
        let name = cell(record, key);
        if name.is_empty() {
            continue;
        }
        catalog.add_blade(name, line.map(|i| cell(record, i)).unwrap_or(""));
    }

    let table = Table::read("ratchet", ratchets)?;
    let key = table.column(RATCHET_KEY)?;
    for record in &table.records {
        let name = cell(record, key);
        if !name.is_empty() {
            catalog.add_ratchet(name);
        }
    }

    let table = Table::read("bit", bits)?;
    let key = table.column(BIT_KEY)?;
    let full = table.find(BIT_NAME);
    for record in &table.records {
        let shortcut = cell(record, key);
        if shortcut.is_empty() {
            continue;
        }
        let full_name = full.map(|i| cell(record, i)).unwrap_or("");
        catalog.add_bit(shortcut, if full_name.is_empty() { shortcut } else { full_name });
    }

    debug!(
        blades = catalog.blade.len(),
        ratchets = catalog.ratchet.len(),
        bits = catalog.bit.len(),
        "part catalog loaded"
    );
    Ok(catalog)
}

/// Reads the match table. A missing outcome column or cell becomes "Unknown".
pub fn parse_matches(text: &str) -> Result<Vec<MatchRecord>, AppError> {
    let table = Table::read("match", text)?;
    let p1 = table.column(PLAYER_1)?;
    let p2 = table.column(PLAYER_2)?;
    let b1 = table.column(BEY_1)?;
    let b2 = table.column(BEY_2)?;
    let winner = table.column(WINNER)?;
    let outcome = table.find(OUTCOME);
    let tournament = table.find(TOURNAMENT);

    let mut matches = Vec::with_capacity(table.records.len());
    let mut skipped = 0usize;
    for record in &table.records {
        let player1 = cell(record, p1);
        let player2 = cell(record, p2);
        if player1.is_empty() && player2.is_empty() {
            skipped += 1;
            continue;
        }
        let finish = outcome.map(|i| cell(record, i)).unwrap_or("");
        matches.push(MatchRecord {
            player1: player1.to_string(),
            player2: player2.to_string(),
            bey_combo1: cell(record, b1).to_string(),
            bey_combo2: cell(record, b2).to_string(),
            winner_name: cell(record, winner).to_string(),
            finish_label: if finish.is_empty() {
                "Unknown".to_string()
            } else {
                finish.to_string()
            },
            tournament_id: optional_cell(record, tournament),
        });
    }

    debug!(matches = matches.len(), skipped, "match table loaded");
    Ok(matches)
}

/// Reads the registration table. Only confirmed entries are kept when a
/// status column exists. A player may list several beys in one cell
/// separated by `;`, or take one row per bey; rows for the same player and
/// tournament are merged in order.
pub fn parse_registrations(text: &str) -> Result<Vec<Registration>, AppError> {
    let table = Table::read("registration", text)?;
    let player = table.column(PLAYER)?;
    let beys = table.find(DECLARED_BEYS);
    let status = table.find(STATUS);
    let tournament = table.find(TOURNAMENT);

    let mut registrations: Vec<Registration> = Vec::new();
    for record in &table.records {
        let name = cell(record, player);
        if name.is_empty() {
            continue;
        }
        if let Some(i) = status {
            if !cell(record, i).eq_ignore_ascii_case("confirmed") {
                continue;
            }
        }
        let tournament_id = optional_cell(record, tournament);
        let declared = beys
            .map(|i| cell(record, i))
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|b| !b.is_empty());

        let idx = match registrations
            .iter()
            .position(|r| r.player == name && r.tournament_id == tournament_id)
        {
            Some(idx) => idx,
            None => {
                registrations.push(Registration {
                    player: name.to_string(),
                    beys: Vec::new(),
                    tournament_id,
                });
                registrations.len() - 1
            }
        };
        let entry = &mut registrations[idx];
        for bey in declared {
            if !entry.beys.iter().any(|b| b == bey) {
                entry.beys.push(bey.to_string());
            }
        }
    }

    debug!(registrations = registrations.len(), "registration table loaded");
    Ok(registrations)
}

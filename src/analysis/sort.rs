//! Column sorting for stat tables.
//!
//! Sorting is stable in both directions: rows that compare equal on the
//! chosen column keep their previous relative order.

use super::builds::BuildStat;
use super::part_stats::PartStat;
use crate::error::AppError;
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl SortValue<'_> {
    fn compare(&self, other: &SortValue<'_>) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// A table row that exposes a value per displayed column.
pub trait SortableRow {
    type Column: Copy + PartialEq;

    fn sort_value(&self, column: Self::Column) -> SortValue<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartColumn {
    Name,
    /// Blade line or bit long name.
    Detail,
    Used,
    Wins,
    Losses,
    WinRate,
    Wilson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildColumn {
    Build,
    Player,
    Wins,
    Losses,
    WinRate,
    Wilson,
}

fn normalize(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect()
}

impl FromStr for PartColumn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "name" => Ok(PartColumn::Name),
            "detail" | "line" | "fullname" => Ok(PartColumn::Detail),
            "used" | "usage" => Ok(PartColumn::Used),
            "wins" => Ok(PartColumn::Wins),
            "losses" => Ok(PartColumn::Losses),
            "winrate" => Ok(PartColumn::WinRate),
            "wilson" | "wilsonscore" => Ok(PartColumn::Wilson),
            _ => Err(AppError::NotFound(format!("part table column '{}'", s))),
        }
    }
}

impl FromStr for BuildColumn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "build" => Ok(BuildColumn::Build),
            "player" | "user" => Ok(BuildColumn::Player),
            "wins" => Ok(BuildColumn::Wins),
            "losses" => Ok(BuildColumn::Losses),
            "winrate" => Ok(BuildColumn::WinRate),
            "wilson" | "wilsonscore" => Ok(BuildColumn::Wilson),
            _ => Err(AppError::NotFound(format!("build table column '{}'", s))),
        }
    }
}

impl SortableRow for PartStat {
    type Column = PartColumn;

    fn sort_value(&self, column: PartColumn) -> SortValue<'_> {
        match column {
            PartColumn::Name => SortValue::Text(&self.key),
            PartColumn::Detail => SortValue::Text(&self.detail),
            PartColumn::Used => SortValue::Number(self.used as f64),
            PartColumn::Wins => SortValue::Number(self.wins as f64),
            PartColumn::Losses => SortValue::Number(self.losses as f64),
            PartColumn::WinRate => SortValue::Number(self.win_rate),
            PartColumn::Wilson => SortValue::Number(self.wilson_score),
        }
    }
}

impl SortableRow for BuildStat {
    type Column = BuildColumn;

    fn sort_value(&self, column: BuildColumn) -> SortValue<'_> {
        match column {
            BuildColumn::Build => SortValue::Text(&self.build),
            BuildColumn::Player => SortValue::Text(&self.player),
            BuildColumn::Wins => SortValue::Number(self.wins as f64),
            BuildColumn::Losses => SortValue::Number(self.losses as f64),
            BuildColumn::WinRate => SortValue::Number(self.win_rate),
            BuildColumn::Wilson => SortValue::Number(self.wilson_score),
        }
    }
}

pub fn sort_rows<R: SortableRow>(rows: &mut [R], column: R::Column, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = a.sort_value(column).compare(&b.sort_value(column));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Header-click sort state: clicking the active ascending column flips it
/// to descending, any other click sorts ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortState<C> {
    pub column: Option<C>,
    pub direction: SortDirection,
}

impl<C: Copy + PartialEq> Default for SortState<C> {
    fn default() -> Self {
        SortState {
            column: None,
            direction: SortDirection::Ascending,
        }
    }
}

impl<C: Copy + PartialEq> SortState<C> {
    pub fn new(column: C, direction: SortDirection) -> Self {
        SortState {
            column: Some(column),
            direction,
        }
    }

    pub fn toggle(&mut self, column: C) {
        self.direction = if self.column == Some(column) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        self.column = Some(column);
    }

    /// Rows are left untouched until a column has been chosen.
    pub fn apply<R: SortableRow<Column = C>>(&self, rows: &mut [R]) {
        if let Some(column) = self.column {
            sort_rows(rows, column, self.direction);
        }
    }
}

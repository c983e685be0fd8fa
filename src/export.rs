//! Flat record lists for saving stat tables to disk.

use crate::analysis::{BuildStat, MetaReport, PartStat};
use crate::error::AppError;
use crate::models::PartType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(AppError::ConfigError(format!(
                "unknown export format '{}' (expected json or csv)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub part_type: PartType,
    pub key: String,
    pub detail: String,
    pub used: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub wilson: f64,
}

impl From<&PartStat> for PartRecord {
    fn from(stat: &PartStat) -> Self {
        PartRecord {
            part_type: stat.part_type,
            key: stat.key.clone(),
            detail: stat.detail.clone(),
            used: stat.used,
            wins: stat.wins,
            losses: stat.losses,
            win_rate: stat.win_rate,
            wilson: stat.wilson_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub build: String,
    pub player: String,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub wilson: f64,
}

impl From<&BuildStat> for BuildRecord {
    fn from(stat: &BuildStat) -> Self {
        BuildRecord {
            build: stat.build.clone(),
            player: stat.player.clone(),
            wins: stat.wins,
            losses: stat.losses,
            win_rate: stat.win_rate,
            wilson: stat.wilson_score,
        }
    }
}

/// Ranked rows of every part type that saw play, blades first.
pub fn part_records(report: &MetaReport) -> Vec<PartRecord> {
    PartType::ALL
        .iter()
        .flat_map(|&t| report.ranked(t))
        .map(|s| PartRecord::from(&s))
        .collect()
}

pub fn build_records(builds: &[BuildStat]) -> Vec<BuildRecord> {
    builds.iter().map(BuildRecord::from).collect()
}

pub fn to_json<T: Serialize>(records: &[T]) -> Result<String, AppError> {
    serde_json::to_string_pretty(records).map_err(|e| AppError::JsonError(e.to_string()))
}

pub fn to_csv<T: Serialize>(records: &[T]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record).map_err(|e| AppError::csv("export", e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::csv("export", e))?;
    String::from_utf8(bytes).map_err(|e| AppError::csv("export", e))
}

pub fn write_records<T: Serialize>(records: &[T], format: ExportFormat, path: &Path) -> Result<(), AppError> {
    let body = match format {
        ExportFormat::Json => to_json(records)?,
        ExportFormat::Csv => to_csv(records)?,
    };
    fs::write(path, body)?;
    Ok(())
}

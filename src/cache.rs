use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw CSV body of one table as last fetched from its URL.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedTable {
    pub url: String,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

/// Snapshots of remote tables, keyed by table name.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SheetCache {
    #[serde(skip)]
    path: PathBuf,
    pub tables: HashMap<String, CachedTable>,
}

impl SheetCache {
    pub fn new(path: PathBuf) -> Self {
        SheetCache {
            path,
            tables: HashMap::new(),
        }
    }

    pub fn default_path() -> PathBuf {
        let cache_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bey_meta");

        let _ = fs::create_dir_all(&cache_dir);

        cache_dir.join("sheets.json")
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&Self::default_path())
    }

    /// A missing file yields an empty cache.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let mut cache = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<SheetCache>(&content).map_err(|e| {
                AppError::JsonError(format!("Failed to parse cache: {}", e))
            })?,
            Err(_) => return Ok(SheetCache::new(path.to_path_buf())),
        };
        cache.path = path.to_path_buf();
        Ok(cache)
    }

    pub fn save(&self) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize cache: {}", e))
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Cached body for `table`, if it came from `url` and is younger than
    /// `max_age_mins`.
    pub fn fresh(&self, table: &str, url: &str, max_age_mins: u64) -> Option<&str> {
        self.tables
            .get(table)
            .filter(|t| t.url == url && !is_stale(t.fetched_at, max_age_mins))
            .map(|t| t.body.as_str())
    }

    pub fn store(&mut self, table: &str, url: &str, body: &str) {
        self.tables.insert(
            table.to_string(),
            CachedTable {
                url: url.to_string(),
                body: body.to_string(),
                fetched_at: Utc::now(),
            },
        );
    }
}

fn is_stale(fetched_at: DateTime<Utc>, max_age_mins: u64) -> bool {
    let age = Utc::now().signed_duration_since(fetched_at);
    age.num_minutes() >= max_age_mins as i64
}

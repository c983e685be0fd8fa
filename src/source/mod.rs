pub mod client;
pub mod tables;

use crate::analysis::players::{player_stats, registered_player_stats, PlayerStat};
use crate::cache::SheetCache;
use crate::config::{Config, SourceLocation};
use crate::error::AppError;
use crate::models::{MatchRecord, PartCatalog, Registration};
use client::SheetClient;
use indicatif::ProgressBar;
use tracing::{info, warn};

/// Everything one analysis session needs: the part catalog, the match
/// results and, when available, the registrations.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub catalog: PartCatalog,
    pub matches: Vec<MatchRecord>,
    pub registrations: Option<Vec<Registration>>,
}

impl Dataset {
    /// Keeps only the matches and registrations of one tournament. Records
    /// without a tournament id are dropped.
    pub fn for_tournament(mut self, tournament: &str) -> Dataset {
        self.matches.retain(|m| m.in_tournament(tournament));
        if let Some(registrations) = self.registrations.as_mut() {
            registrations.retain(|r| r.in_tournament(tournament));
        }
        self
    }

    /// Distinct tournament ids in the match table, in order of first appearance.
    pub fn tournaments(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for id in self.matches.iter().filter_map(|m| m.tournament_id.as_deref()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Registered roster when a registration table was loaded, otherwise
    /// everyone seen in the match table.
    pub fn player_stats(&self) -> Vec<PlayerStat> {
        match &self.registrations {
            Some(registrations) => registered_player_stats(&self.matches, registrations),
            None => player_stats(&self.matches),
        }
    }
}

/// Loads every configured table. The snapshot cache under the home
/// directory is only opened when at least one table is remote.
pub fn load_dataset(config: &Config, refresh: bool, progress: &ProgressBar) -> Result<Dataset, AppError> {
    if !config.has_remote_source() {
        return load_with_cache(config, None, refresh, progress);
    }
    let mut cache = SheetCache::load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable cache");
        SheetCache::new(SheetCache::default_path())
    });
    load_with_cache(config, Some(&mut cache), refresh, progress)
}

/// Loads every configured table, serving remote ones from `cache` when
/// fresh. `refresh` forces every remote table to be refetched. Without a
/// cache, remote tables are always fetched.
pub fn load_with_cache(
    config: &Config,
    mut cache: Option<&mut SheetCache>,
    refresh: bool,
    progress: &ProgressBar,
) -> Result<Dataset, AppError> {
    let client = SheetClient::new();
    if refresh {
        if let Some(cache) = cache.as_deref_mut() {
            cache.tables.clear();
        }
    }
    let mut fetched = false;

    let mut read = |table: &str, location: &SourceLocation| -> Result<String, AppError> {
        progress.set_message(format!("{} table", table));
        let body = match (location, cache.as_deref_mut()) {
            (SourceLocation::Url(url), Some(cache)) => {
                match cache.fresh(table, url, config.cache_max_age_mins) {
                    Some(body) => {
                        info!(table, "using cached table");
                        body.to_string()
                    }
                    None => {
                        let body = client.fetch(table, location)?;
                        cache.store(table, url, &body);
                        fetched = true;
                        body
                    }
                }
            }
            _ => client.fetch(table, location)?,
        };
        progress.inc(1);
        Ok(body)
    };

    let blades = read("blade", &config.blade)?;
    let ratchets = read("ratchet", &config.ratchet)?;
    let bits = read("bit", &config.bit)?;
    let matches = read("match", &config.matches)?;
    let registrations = match &config.registrations {
        Some(location) => Some(read("registration", location)?),
        None => None,
    };

    if fetched {
        if let Some(cache) = cache {
            if let Err(e) = cache.save() {
                warn!(error = %e, "failed to save table cache");
            }
        }
    }

    let catalog = tables::parse_catalog(&blades, &ratchets, &bits)?;
    let matches = tables::parse_matches(&matches)?;
    let registrations = registrations
        .map(|text| tables::parse_registrations(&text))
        .transpose()?;
    info!(
        blades = catalog.blade.len(),
        ratchets = catalog.ratchet.len(),
        bits = catalog.bit.len(),
        matches = matches.len(),
        registrations = registrations.as_ref().map_or(0, Vec::len),
        "dataset loaded"
    );

    Ok(Dataset {
        catalog,
        matches,
        registrations,
    })
}

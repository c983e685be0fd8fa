use crate::error::AppError;
use std::env;
use std::path::PathBuf;

const DEFAULT_CACHE_MAX_AGE_MINS: u64 = 60;

/// Where each of the tables comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLocation {
    Url(String),
    File(PathBuf),
}

impl SourceLocation {
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceLocation::Url(_))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub blade: SourceLocation,
    pub ratchet: SourceLocation,
    pub bit: SourceLocation,
    pub matches: SourceLocation,
    /// Optional registration table; players then come from it instead of
    /// the match table.
    pub registrations: Option<SourceLocation>,
    pub cache_max_age_mins: u64,
}

impl Config {
    /// Reads `.env` and the process environment. A data directory, from
    /// `data_dir` or `BEY_META_DATA_DIR`, takes precedence over URLs.
    pub fn from_env(data_dir: Option<PathBuf>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(data_dir, |name| env::var(name).ok())
    }

    /// Same as `from_env`, with variables resolved through `lookup`.
    pub fn from_lookup<F>(data_dir: Option<PathBuf>, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_max_age_mins = match lookup("BEY_META_CACHE_MAX_AGE_MINS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "BEY_META_CACHE_MAX_AGE_MINS must be a whole number of minutes, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_CACHE_MAX_AGE_MINS,
        };

        let data_dir = data_dir.or_else(|| lookup("BEY_META_DATA_DIR").map(PathBuf::from));
        if let Some(dir) = data_dir {
            return Ok(Config::from_dir(dir, cache_max_age_mins));
        }

        let required = |name: &str| {
            lookup(name).filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                AppError::ConfigError(format!(
                    "{} not set (or pass --data-dir with local CSV files)",
                    name
                ))
            })
        };

        Ok(Config {
            blade: SourceLocation::Url(required("BEY_META_BLADE_URL")?),
            ratchet: SourceLocation::Url(required("BEY_META_RATCHET_URL")?),
            bit: SourceLocation::Url(required("BEY_META_BIT_URL")?),
            matches: SourceLocation::Url(required("BEY_META_MATCH_URL")?),
            registrations: lookup("BEY_META_REGISTRATION_URL")
                .filter(|v| !v.trim().is_empty())
                .map(SourceLocation::Url),
            cache_max_age_mins,
        })
    }

    /// `registrations.csv` is picked up only when it exists.
    pub fn from_dir(dir: PathBuf, cache_max_age_mins: u64) -> Self {
        let registrations = dir.join("registrations.csv");
        Config {
            blade: SourceLocation::File(dir.join("blades.csv")),
            ratchet: SourceLocation::File(dir.join("ratchets.csv")),
            bit: SourceLocation::File(dir.join("bits.csv")),
            matches: SourceLocation::File(dir.join("matches.csv")),
            registrations: registrations.is_file().then(|| SourceLocation::File(registrations)),
            cache_max_age_mins,
        }
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceLocation> {
        [&self.blade, &self.ratchet, &self.bit, &self.matches]
            .into_iter()
            .chain(self.registrations.as_ref())
    }

    pub fn has_remote_source(&self) -> bool {
        self.sources().any(SourceLocation::is_remote)
    }
}

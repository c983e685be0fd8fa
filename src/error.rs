use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded while fetching {0}, please try again later")]
    RateLimited(String),

    #[error("CSV error in {table} table: {message}")]
    CsvError { table: String, message: String },

    #[error("Missing column '{column}' in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown part type '{0}' (expected blade, ratchet or bit)")]
    UnknownPartType(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn csv(table: &str, err: impl std::fmt::Display) -> Self {
        AppError::CsvError {
            table: table.to_string(),
            message: err.to_string(),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid period kind '{0}': expected one of day, week, month, wtd, mtd")]
    InvalidPeriodKind(String),

    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    #[error("Duplicate market code: {0}")]
    DuplicateMarket(String),

    #[error("Invalid configuration for market '{market}': {details}")]
    InvalidMarketConfig { market: String, details: String },

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MetricsError>;

//! Error types for the Wellplan engine

use thiserror::Error;

/// Errors that can occur while computing targets, plans or analytics
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Insufficient catalog: {0}")]
    InsufficientCatalog(String),

    #[error("Invalid analytics window: {0}")]
    InvalidWindow(String),

    #[error("Invalid log entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Plan rejected: {0}")]
    PlanRejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Stable machine-readable code for host applications
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidProfile(_) => "INVALID_PROFILE",
            EngineError::InsufficientCatalog(_) => "INSUFFICIENT_CATALOG",
            EngineError::InvalidWindow(_) => "INVALID_WINDOW",
            EngineError::InvalidEntry(_) => "INVALID_ENTRY",
            EngineError::JsonError(_) => "JSON_ERROR",
            EngineError::DateParseError(_) => "DATE_PARSE_ERROR",
            EngineError::ConfigError(_) => "CONFIG_ERROR",
            EngineError::PlanRejected(_) => "PLAN_REJECTED",
            EngineError::Io(_) => "IO_ERROR",
        }
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`)
pub fn parse_date(value: &str) -> Result<chrono::NaiveDate, EngineError> {
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::DateParseError(format!("'{}': {}", value, e)))
}

//! Log entry parsing and validation
//!
//! Accepts JSON arrays or NDJSON (one entry per line) and validates each entry
//! independently so a host can report every bad record at once.

use super::types::{DailyLogEntry, LogPayload};
use crate::error::EngineError;
use serde::Serialize;
use thiserror::Error;

/// Validation errors for a single log entry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryValidationError {
    #[error("user_id is empty")]
    MissingUserId,

    #[error("habit_id is empty")]
    MissingHabitId,

    #[error("mood score {0} is outside 1-5")]
    MoodOutOfRange(u8),

    #[error("sleep hours {0} are outside 0-24")]
    SleepHoursOutOfRange(f64),

    #[error("sleep quality {0}% is outside 0-100")]
    SleepQualityOutOfRange(f64),

    #[error("{field} must be a non-negative finite number, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },
}

impl From<EntryValidationError> for EngineError {
    fn from(e: EntryValidationError) -> Self {
        EngineError::InvalidEntry(e.to_string())
    }
}

impl DailyLogEntry {
    /// Check field ranges for the entry's metric
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(EntryValidationError::MissingUserId);
        }
        match &self.payload {
            LogPayload::Sleep { hours, quality_percent } => {
                if !(hours.is_finite() && (0.0..=24.0).contains(hours)) {
                    return Err(EntryValidationError::SleepHoursOutOfRange(*hours));
                }
                if let Some(q) = quality_percent {
                    if !(q.is_finite() && (0.0..=100.0).contains(q)) {
                        return Err(EntryValidationError::SleepQualityOutOfRange(*q));
                    }
                }
            }
            LogPayload::Mood { score } => {
                if !(1..=5).contains(score) {
                    return Err(EntryValidationError::MoodOutOfRange(*score));
                }
            }
            LogPayload::Habit { habit_id, .. } => {
                if habit_id.trim().is_empty() {
                    return Err(EntryValidationError::MissingHabitId);
                }
            }
            LogPayload::Meditation { duration_minutes } => {
                non_negative("duration_minutes", *duration_minutes)?
            }
            LogPayload::Workout { duration_minutes } => {
                non_negative("duration_minutes", *duration_minutes)?
            }
            LogPayload::Water { milliliters } => non_negative("milliliters", *milliliters)?,
            LogPayload::Reflection { .. }
            | LogPayload::Steps { .. }
            | LogPayload::SugarControl { .. } => {}
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), EntryValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EntryValidationError::NegativeAmount { field, value })
    }
}

/// Parser for batches of log entries
pub struct LogEntryParser;

impl LogEntryParser {
    /// Parse a JSON array of entries
    pub fn parse_array(json: &str) -> Result<Vec<DailyLogEntry>, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse newline-delimited JSON; blank lines are skipped
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<DailyLogEntry>, EngineError> {
        ndjson
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    EngineError::InvalidEntry(format!("line {}: {}", i + 1, e))
                })
            })
            .collect()
    }

    /// Parse either format, choosing by the first non-whitespace character
    pub fn parse(input: &str) -> Result<Vec<DailyLogEntry>, EngineError> {
        if input.trim_start().starts_with('[') {
            Self::parse_array(input)
        } else {
            Self::parse_ndjson(input)
        }
    }

    /// Parse and reject the batch on the first invalid entry
    pub fn parse_validated(input: &str) -> Result<Vec<DailyLogEntry>, EngineError> {
        let entries = Self::parse(input)?;
        for (index, entry) in entries.iter().enumerate() {
            entry
                .validate()
                .map_err(|e| EngineError::InvalidEntry(format!("entry {}: {}", index, e)))?;
        }
        Ok(entries)
    }
}

/// Validation outcome for one entry in a batch
#[derive(Debug, Clone, Serialize)]
pub struct EntryValidationResult {
    pub index: usize,
    pub date: String,
    pub metric: &'static str,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validate every entry, reporting all failures
pub fn validate_entries(entries: &[DailyLogEntry]) -> Vec<EntryValidationResult> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let result = entry.validate();
            EntryValidationResult {
                index,
                date: entry.date.to_string(),
                metric: entry.metric().as_str(),
                valid: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            }
        })
        .collect()
}

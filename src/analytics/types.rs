//! Core types for daily logs and derived analytics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::recommendations::Recommendation;
use super::rolling::{AnalyticsWindow, StabilityScore};
use super::streak::StreakState;
use crate::error::EngineError;

/// A tracked daily metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sleep,
    Mood,
    Habit,
    Meditation,
    Reflection,
    SugarControl,
    Water,
    Steps,
    Workout,
}

/// How multiple entries for the same day collapse into one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Counts and durations add up
    Sum,
    /// Qualitative single-value metrics keep the latest entry
    LastWrite,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Sleep,
        Metric::Mood,
        Metric::Habit,
        Metric::Meditation,
        Metric::Reflection,
        Metric::SugarControl,
        Metric::Water,
        Metric::Steps,
        Metric::Workout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Sleep => "sleep",
            Metric::Mood => "mood",
            Metric::Habit => "habit",
            Metric::Meditation => "meditation",
            Metric::Reflection => "reflection",
            Metric::SugarControl => "sugar_control",
            Metric::Water => "water",
            Metric::Steps => "steps",
            Metric::Workout => "workout",
        }
    }

    pub fn parse(value: &str) -> Result<Self, EngineError> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == value.trim().to_ascii_lowercase().replace('-', "_"))
            .ok_or_else(|| EngineError::InvalidEntry(format!("unknown metric '{}'", value)))
    }

    pub fn aggregation(&self) -> Aggregation {
        match self {
            Metric::Sleep | Metric::Mood | Metric::SugarControl | Metric::Habit => {
                Aggregation::LastWrite
            }
            Metric::Meditation
            | Metric::Reflection
            | Metric::Water
            | Metric::Steps
            | Metric::Workout => Aggregation::Sum,
        }
    }

    /// Unit of the metric's numeric value
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Sleep => "hours",
            Metric::Mood => "score",
            Metric::Habit | Metric::SugarControl => "ratio",
            Metric::Meditation | Metric::Workout => "minutes",
            Metric::Reflection => "entries",
            Metric::Water => "ml",
            Metric::Steps => "steps",
        }
    }
}

/// Metric-specific payload of a log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum LogPayload {
    Sleep {
        hours: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quality_percent: Option<f64>,
    },
    Mood {
        score: u8,
    },
    Habit {
        habit_id: String,
        completed: bool,
    },
    Meditation {
        duration_minutes: f64,
    },
    /// Gratitude or journal entries
    Reflection {
        count: u32,
    },
    SugarControl {
        is_sugar_free: bool,
    },
    Water {
        milliliters: f64,
    },
    Steps {
        count: u32,
    },
    Workout {
        duration_minutes: f64,
    },
}

impl LogPayload {
    pub fn metric(&self) -> Metric {
        match self {
            LogPayload::Sleep { .. } => Metric::Sleep,
            LogPayload::Mood { .. } => Metric::Mood,
            LogPayload::Habit { .. } => Metric::Habit,
            LogPayload::Meditation { .. } => Metric::Meditation,
            LogPayload::Reflection { .. } => Metric::Reflection,
            LogPayload::SugarControl { .. } => Metric::SugarControl,
            LogPayload::Water { .. } => Metric::Water,
            LogPayload::Steps { .. } => Metric::Steps,
            LogPayload::Workout { .. } => Metric::Workout,
        }
    }

    /// Numeric value used for averages and variability
    pub fn value(&self) -> f64 {
        match self {
            LogPayload::Sleep { hours, .. } => *hours,
            LogPayload::Mood { score } => f64::from(*score),
            LogPayload::Habit { completed, .. } => bool_value(*completed),
            LogPayload::Meditation { duration_minutes } => *duration_minutes,
            LogPayload::Reflection { count } => f64::from(*count),
            LogPayload::SugarControl { is_sugar_free } => bool_value(*is_sugar_free),
            LogPayload::Water { milliliters } => *milliliters,
            LogPayload::Steps { count } => f64::from(*count),
            LogPayload::Workout { duration_minutes } => *duration_minutes,
        }
    }

    pub fn habit_id(&self) -> Option<&str> {
        match self {
            LogPayload::Habit { habit_id, .. } => Some(habit_id.as_str()),
            _ => None,
        }
    }
}

fn bool_value(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// A single time-stamped fact for a (user, metric, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    /// Store-assigned identifier, used for caller-initiated edits and deletes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    /// Calendar date the entry belongs to (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Write time (epoch milliseconds), used for last-write-wins
    #[serde(default)]
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub payload: LogPayload,
}

impl DailyLogEntry {
    pub fn new(user_id: impl Into<String>, date: NaiveDate, timestamp_ms: i64, payload: LogPayload) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            date,
            timestamp_ms,
            payload,
        }
    }

    pub fn metric(&self) -> Metric {
        self.payload.metric()
    }
}

/// Everything derived for one metric over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAnalytics {
    pub metric: Metric,
    pub as_of: NaiveDate,
    pub window: AnalyticsWindow,
    pub streak: StreakState,
    /// Mean of per-day values over days that have entries
    pub rolling_average: Option<f64>,
    /// Sum of per-day values in the window
    pub window_total: f64,
    /// Days in the window with at least one entry
    pub days_logged: usize,
    /// Days in the window meeting the metric's completion predicate
    pub qualifying_days: usize,
    pub stability: StabilityScore,
    /// Average sleep quality (sleep only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality_average: Option<f64>,
    pub recommendations: Vec<Recommendation>,
}

/// Short- and long-horizon analytics for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOverview {
    pub metric: Metric,
    pub seven_day: MetricAnalytics,
    pub ninety_day: MetricAnalytics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json_shape() {
        let json = r#"{
            "user_id": "u1",
            "date": "2024-01-05",
            "timestamp_ms": 1704412800000,
            "metric": "sleep",
            "hours": 7.5,
            "quality_percent": 82
        }"#;
        let entry: DailyLogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.metric(), Metric::Sleep);
        assert_eq!(entry.payload.value(), 7.5);
        assert_eq!(entry.date.to_string(), "2024-01-05");

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["metric"], "sleep");
        assert_eq!(back["hours"], 7.5);
    }

    #[test]
    fn test_habit_payload() {
        let json = r#"{"user_id":"u1","date":"2024-01-01","metric":"habit","habit_id":"water","completed":true}"#;
        let entry: DailyLogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.payload.habit_id(), Some("water"));
        assert_eq!(entry.payload.value(), 1.0);
        assert_eq!(entry.timestamp_ms, 0);
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!(Metric::parse("sugar-control").unwrap(), Metric::SugarControl);
        assert_eq!(Metric::parse("Mood").unwrap(), Metric::Mood);
        assert!(Metric::parse("calories").is_err());
    }

    #[test]
    fn test_aggregation_rules() {
        assert_eq!(Metric::Mood.aggregation(), Aggregation::LastWrite);
        assert_eq!(Metric::Steps.aggregation(), Aggregation::Sum);
        assert_eq!(Metric::Meditation.aggregation(), Aggregation::Sum);
    }
}

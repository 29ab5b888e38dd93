//! Engine configuration
//!
//! Policy knobs for the three components. The fixed formula tables (activity
//! multipliers, goal adjustments, protein factors) are not configurable and
//! live in [`crate::targets`].

use crate::analytics::types::Metric;
use crate::error::EngineError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub targets: TargetConfig,
    pub plans: PlanConfig,
    pub analytics: AnalyticsConfig,
}

impl EngineConfig {
    /// Load configuration from JSON; missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| EngineError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.targets.validate()?;
        self.plans.validate()?;
        self.analytics.validate()
    }
}

/// Safety policy around the calorie and macro targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Lowest daily calorie target ever returned (kcal)
    pub calorie_floor_kcal: f64,
    /// Highest daily calorie target ever returned (kcal)
    pub calorie_ceiling_kcal: f64,
    /// Carbohydrate floor (g)
    pub carb_floor_g: f64,
    /// Fat never drops below this share of calories when rebalancing for the carb floor
    pub min_fat_fraction: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            calorie_floor_kcal: 1200.0,
            calorie_ceiling_kcal: 4500.0,
            carb_floor_g: 50.0,
            min_fat_fraction: 0.20,
        }
    }
}

impl TargetConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if !(self.calorie_floor_kcal > 0.0 && self.calorie_floor_kcal < self.calorie_ceiling_kcal) {
            return Err(EngineError::ConfigError(format!(
                "calorie floor {} must be positive and below ceiling {}",
                self.calorie_floor_kcal, self.calorie_ceiling_kcal
            )));
        }
        if self.carb_floor_g < 0.0 {
            return Err(EngineError::ConfigError("carb_floor_g must be >= 0".into()));
        }
        if !(0.0..=0.5).contains(&self.min_fat_fraction) {
            return Err(EngineError::ConfigError(
                "min_fat_fraction must be within 0.0-0.5".into(),
            ));
        }
        Ok(())
    }
}

/// Plan generation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Allowed deviation of a meal's macro energy split from its slot (fraction, 0.15 = 15 points)
    pub macro_tolerance: f64,
    /// Minimum meal suggestions per slot before a warning is raised
    pub min_meal_suggestions: usize,
    /// Maximum meal suggestions per slot
    pub max_meal_suggestions: usize,
    /// Portion scaling bounds applied to catalog meals
    pub portion_range: (f64, f64),
    /// Number of habits recommended by the wellness plan
    pub habit_count: usize,
    /// Wake-up time used to derive the bedtime window
    pub wake_time: NaiveTime,
    /// Refuse plans that would carry insufficient-catalog warnings
    pub strict_catalog: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            macro_tolerance: 0.15,
            min_meal_suggestions: 2,
            max_meal_suggestions: 4,
            portion_range: (0.5, 2.5),
            habit_count: 5,
            wake_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap_or_default(),
            strict_catalog: false,
        }
    }
}

impl PlanConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&self.macro_tolerance) {
            return Err(EngineError::ConfigError(
                "macro_tolerance must be within 0.0-1.0".into(),
            ));
        }
        if self.min_meal_suggestions > self.max_meal_suggestions || self.max_meal_suggestions == 0 {
            return Err(EngineError::ConfigError(format!(
                "meal suggestion bounds {}..{} are inverted",
                self.min_meal_suggestions, self.max_meal_suggestions
            )));
        }
        let (low, high) = self.portion_range;
        if !(low > 0.0 && low <= high) {
            return Err(EngineError::ConfigError(format!(
                "portion_range ({}, {}) is invalid",
                low, high
            )));
        }
        Ok(())
    }
}

/// Analytics policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Window used when the caller does not supply one (days)
    pub default_window_days: u32,
    /// Longest window accepted (days)
    pub max_window_days: u32,
    /// Samples needed before a stability score counts as reliable
    pub min_reliable_samples: usize,
    /// Let an as-of date with no entries defer to the previous day
    pub pending_today_grace: bool,
    pub stability_caps: StabilityCaps,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window_days: 7,
            max_window_days: 366,
            min_reliable_samples: 3,
            pending_today_grace: false,
            stability_caps: StabilityCaps::default(),
        }
    }
}

impl AnalyticsConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if self.default_window_days == 0 || self.default_window_days > self.max_window_days {
            return Err(EngineError::ConfigError(format!(
                "default_window_days {} must be within 1-{}",
                self.default_window_days, self.max_window_days
            )));
        }
        self.stability_caps.validate()
    }
}

/// Per-metric standard deviation caps for the stability score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityCaps {
    pub sleep_hours: f64,
    pub mood: f64,
    pub meditation_minutes: f64,
    pub reflection: f64,
    pub water_ml: f64,
    pub steps: f64,
    pub workout_minutes: f64,
    /// Binary metrics (habit completion, sugar control); σ of a 0/1 series is at most 0.5
    pub binary: f64,
}

impl Default for StabilityCaps {
    fn default() -> Self {
        Self {
            sleep_hours: 2.0,
            mood: 2.0,
            meditation_minutes: 15.0,
            reflection: 2.0,
            water_ml: 1000.0,
            steps: 4000.0,
            workout_minutes: 30.0,
            binary: 0.5,
        }
    }
}

impl StabilityCaps {
    pub fn for_metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Sleep => self.sleep_hours,
            Metric::Mood => self.mood,
            Metric::Meditation => self.meditation_minutes,
            Metric::Reflection => self.reflection,
            Metric::Water => self.water_ml,
            Metric::Steps => self.steps,
            Metric::Workout => self.workout_minutes,
            Metric::Habit | Metric::SugarControl => self.binary,
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        for metric in Metric::ALL {
            let cap = self.for_metric(metric);
            if !(cap.is_finite() && cap > 0.0) {
                return Err(EngineError::ConfigError(format!(
                    "stability cap for {} must be positive",
                    metric.as_str()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config =
            EngineConfig::from_json(r#"{"targets": {"calorie_floor_kcal": 1400}}"#).unwrap();
        assert_eq!(config.targets.calorie_floor_kcal, 1400.0);
        assert_eq!(config.targets.carb_floor_g, 50.0);
        assert_eq!(config.analytics.default_window_days, 7);
        assert_eq!(config.plans.habit_count, 5);
    }

    #[test]
    fn test_rejects_inverted_calorie_bounds() {
        let result = EngineConfig::from_json(
            r#"{"targets": {"calorie_floor_kcal": 5000, "calorie_ceiling_kcal": 2000}}"#,
        );
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_zero_stability_cap() {
        let result = EngineConfig::from_json(r#"{"analytics": {"stability_caps": {"mood": 0}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip() {
        let config = EngineConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_mood_cap() {
        let caps = StabilityCaps::default();
        assert_eq!(caps.for_metric(Metric::Mood), 2.0);
        assert_eq!(caps.for_metric(Metric::Habit), 0.5);
    }
}

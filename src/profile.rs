//! User profile types
//!
//! The profile is the single input to target computation and plan generation.
//! Biometrics are always held in canonical SI units (kg, cm); unit conversion
//! happens once, in [`crate::adapters::units`], before a profile is built.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted age range (years)
pub const AGE_RANGE: (u32, u32) = (13, 120);
/// Accepted weight range (kg)
pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 500.0);
/// Accepted height range (cm)
pub const HEIGHT_RANGE_CM: (f64, f64) = (50.0, 280.0);
/// Accepted meals per day
pub const MEALS_PER_DAY_RANGE: (u8, u8) = (1, 8);
/// Accepted weekly training time (hours)
pub const WEEKLY_HOURS_RANGE: (f64, f64) = (0.0, 40.0);

/// Biological sex as used by the Mifflin-St Jeor equation.
///
/// Only the two categories the formula defines are representable; any other
/// value is rejected with [`EngineError::InvalidProfile`] at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BiologicalSex {
    Male,
    Female,
}

impl BiologicalSex {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiologicalSex::Male => "male",
            BiologicalSex::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Result<Self, EngineError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(BiologicalSex::Male),
            "female" | "f" => Ok(BiologicalSex::Female),
            other => Err(EngineError::InvalidProfile(format!(
                "unsupported biological sex '{}': expected 'male' or 'female'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for BiologicalSex {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BiologicalSex::parse(&value)
    }
}

impl From<BiologicalSex> for String {
    fn from(sex: BiologicalSex) -> Self {
        sex.as_str().to_string()
    }
}

/// Primary fitness goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    LoseWeight,
    BuildMuscle,
    Maintain,
    ImproveHealth,
}

/// Five-point activity scale, ordered from least to most active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];
}

/// Training experience tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessExperience {
    Beginner,
    Intermediate,
    Advanced,
}

/// Preferred training modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutPreference {
    Strength,
    Cardio,
    Hiit,
    Yoga,
    Mixed,
}

/// Dietary approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionApproach {
    Balanced,
    HighProtein,
    LowCarb,
    PlantBased,
    Flexible,
}

/// Self-reported stress level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl StressLevel {
    pub fn is_elevated(&self) -> bool {
        matches!(self, StressLevel::High | StressLevel::VeryHigh)
    }
}

/// Complete user profile in canonical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub biological_sex: BiologicalSex,
    pub age_years: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    pub goal: FitnessGoal,
    pub activity_level: ActivityLevel,
    pub experience: FitnessExperience,
    pub workout_preference: WorkoutPreference,
    /// Weekly training-time budget (hours)
    pub weekly_workout_hours: f64,
    pub nutrition_approach: NutritionApproach,
    pub meals_per_day: u8,
    /// Habitual sleep duration (hours)
    pub sleep_hours: f64,
    pub stress_level: StressLevel,
    #[serde(default)]
    pub motivations: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub goal_statement: String,
    /// Incremented by every explicit profile update
    #[serde(default = "first_revision")]
    pub revision: u32,
    /// Epoch milliseconds of the last create/update
    #[serde(default)]
    pub updated_at_ms: i64,
}

fn first_revision() -> u32 {
    1
}

impl UserProfile {
    /// Parse and validate a profile from JSON.
    ///
    /// Any shape or value problem (including an unsupported biological sex)
    /// surfaces as [`EngineError::InvalidProfile`].
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let profile: UserProfile = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidProfile(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check every biometric and preference field against its accepted range
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.user_id.trim().is_empty() {
            return Err(invalid("user_id must not be empty"));
        }
        if self.age_years < AGE_RANGE.0 || self.age_years > AGE_RANGE.1 {
            return Err(invalid(&format!(
                "age_years {} outside {}-{}",
                self.age_years, AGE_RANGE.0, AGE_RANGE.1
            )));
        }
        check_range("weight_kg", self.weight_kg, WEIGHT_RANGE_KG)?;
        check_range("height_cm", self.height_cm, HEIGHT_RANGE_CM)?;
        if let Some(target) = self.target_weight_kg {
            check_range("target_weight_kg", target, WEIGHT_RANGE_KG)?;
        }
        if self.meals_per_day < MEALS_PER_DAY_RANGE.0 || self.meals_per_day > MEALS_PER_DAY_RANGE.1 {
            return Err(invalid(&format!(
                "meals_per_day {} outside {}-{}",
                self.meals_per_day, MEALS_PER_DAY_RANGE.0, MEALS_PER_DAY_RANGE.1
            )));
        }
        check_range("sleep_hours", self.sleep_hours, (0.0, 24.0))?;
        check_range("weekly_workout_hours", self.weekly_workout_hours, WEEKLY_HOURS_RANGE)?;
        Ok(())
    }

    /// Apply an explicit update, producing the superseding profile.
    ///
    /// The receiver is left untouched; the returned profile carries
    /// `revision + 1` and is validated before it is handed back.
    pub fn apply_update(&self, update: ProfileUpdate, now_ms: i64) -> Result<UserProfile, EngineError> {
        let mut next = self.clone();

        if let Some(age) = update.age_years {
            next.age_years = age;
        }
        if let Some(weight) = update.weight_kg {
            next.weight_kg = weight;
        }
        if let Some(height) = update.height_cm {
            next.height_cm = height;
        }
        if let Some(target) = update.target_weight_kg {
            next.target_weight_kg = target;
        }
        if let Some(goal) = update.goal {
            next.goal = goal;
        }
        if let Some(level) = update.activity_level {
            next.activity_level = level;
        }
        if let Some(experience) = update.experience {
            next.experience = experience;
        }
        if let Some(preference) = update.workout_preference {
            next.workout_preference = preference;
        }
        if let Some(hours) = update.weekly_workout_hours {
            next.weekly_workout_hours = hours;
        }
        if let Some(approach) = update.nutrition_approach {
            next.nutrition_approach = approach;
        }
        if let Some(meals) = update.meals_per_day {
            next.meals_per_day = meals;
        }
        if let Some(sleep) = update.sleep_hours {
            next.sleep_hours = sleep;
        }
        if let Some(stress) = update.stress_level {
            next.stress_level = stress;
        }
        if let Some(motivations) = update.motivations {
            next.motivations = motivations;
        }
        if let Some(challenges) = update.challenges {
            next.challenges = challenges;
        }
        if let Some(statement) = update.goal_statement {
            next.goal_statement = statement;
        }

        next.revision = self.revision.saturating_add(1);
        next.updated_at_ms = now_ms;
        next.validate()?;
        Ok(next)
    }
}

/// Partial update to a profile; `None` leaves a field unchanged.
///
/// `target_weight_kg` is doubly optional so an update can clear it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub age_years: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub target_weight_kg: Option<Option<f64>>,
    pub goal: Option<FitnessGoal>,
    pub activity_level: Option<ActivityLevel>,
    pub experience: Option<FitnessExperience>,
    pub workout_preference: Option<WorkoutPreference>,
    pub weekly_workout_hours: Option<f64>,
    pub nutrition_approach: Option<NutritionApproach>,
    pub meals_per_day: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<StressLevel>,
    pub motivations: Option<Vec<String>>,
    pub challenges: Option<Vec<String>>,
    pub goal_statement: Option<String>,
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}y, {:.1}kg, {:.1}cm, rev {})",
            self.user_id,
            self.biological_sex.as_str(),
            self.age_years,
            self.weight_kg,
            self.height_cm,
            self.revision
        )
    }
}

fn invalid(msg: &str) -> EngineError {
    EngineError::InvalidProfile(msg.to_string())
}

fn check_range(field: &str, value: f64, range: (f64, f64)) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(invalid(&format!("{} must be a finite number", field)));
    }
    if value < range.0 || value > range.1 {
        return Err(invalid(&format!(
            "{} {} outside {}-{}",
            field, value, range.0, range.1
        )));
    }
    Ok(())
}

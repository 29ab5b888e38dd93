//! Onboarding questionnaire adapter
//!
//! Maps the display labels a questionnaire collects ("4-6 hours", "Very High",
//! "Intermittent fasting") to a canonical [`UserProfile`].

use super::units::{Height, Weight};
use super::ProfileAdapter;
use crate::error::EngineError;
use crate::profile::{
    ActivityLevel, BiologicalSex, FitnessExperience, FitnessGoal, NutritionApproach, StressLevel,
    UserProfile, WorkoutPreference,
};
use serde::Deserialize;
use tracing::warn;

/// Weekly hours assumed when the training-time label is unknown
pub const DEFAULT_WEEKLY_HOURS: f64 = 3.0;
/// Meals per day assumed when the meal-frequency label is unknown
pub const DEFAULT_MEALS_PER_DAY: u8 = 3;

/// Raw questionnaire answers
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingAnswers {
    pub user_id: String,
    pub gender: String,
    pub age: u32,
    pub weight: Weight,
    pub height: Height,
    #[serde(default)]
    pub target_weight: Option<Weight>,
    pub fitness_goal: String,
    pub experience: String,
    pub workout_preference: String,
    pub time_available: String,
    pub activity_level: String,
    pub nutrition_preference: String,
    pub sleep_hours: f64,
    pub stress_level: String,
    #[serde(default)]
    pub motivation: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    pub meal_frequency: String,
    #[serde(default)]
    pub goal: String,
}

/// Adapter for questionnaire answers
pub struct OnboardingAdapter;

impl ProfileAdapter for OnboardingAdapter {
    fn parse(&self, raw_json: &str, now_ms: i64) -> Result<UserProfile, EngineError> {
        let answers: OnboardingAnswers = serde_json::from_str(raw_json)
            .map_err(|e| EngineError::InvalidProfile(e.to_string()))?;
        self.convert(&answers, now_ms)
    }
}

impl OnboardingAdapter {
    /// Convert answers to a validated profile (revision 1)
    pub fn convert(&self, answers: &OnboardingAnswers, now_ms: i64) -> Result<UserProfile, EngineError> {
        let profile = UserProfile {
            user_id: answers.user_id.clone(),
            biological_sex: BiologicalSex::parse(&answers.gender)?,
            age_years: answers.age,
            weight_kg: answers.weight.to_kg(),
            height_cm: answers.height.to_cm(),
            target_weight_kg: answers.target_weight.map(Weight::to_kg),
            goal: goal(&answers.fitness_goal)?,
            activity_level: activity_level(&answers.activity_level)?,
            experience: experience(&answers.experience)?,
            workout_preference: workout_preference(&answers.workout_preference)?,
            weekly_workout_hours: weekly_hours(&answers.time_available),
            nutrition_approach: nutrition_approach(&answers.nutrition_preference)?,
            meals_per_day: meals_per_day(&answers.meal_frequency),
            sleep_hours: answers.sleep_hours,
            stress_level: stress_level(&answers.stress_level)?,
            motivations: answers.motivation.clone(),
            challenges: answers.challenges.clone(),
            goal_statement: answers.goal.clone(),
            revision: 1,
            updated_at_ms: now_ms,
        };
        profile.validate()?;
        Ok(profile)
    }
}

fn unknown(field: &str, label: &str) -> EngineError {
    EngineError::InvalidProfile(format!("unknown {} '{}'", field, label))
}

fn goal(label: &str) -> Result<FitnessGoal, EngineError> {
    match label.trim() {
        "Lose Weight" => Ok(FitnessGoal::LoseWeight),
        "Build Muscle" => Ok(FitnessGoal::BuildMuscle),
        "Maintain Weight" => Ok(FitnessGoal::Maintain),
        "Improve Endurance" | "General Health" => Ok(FitnessGoal::ImproveHealth),
        other => Err(unknown("fitness goal", other)),
    }
}

fn experience(label: &str) -> Result<FitnessExperience, EngineError> {
    match label.trim() {
        "Beginner" => Ok(FitnessExperience::Beginner),
        "Intermediate" => Ok(FitnessExperience::Intermediate),
        "Advanced" => Ok(FitnessExperience::Advanced),
        other => Err(unknown("experience", other)),
    }
}

fn workout_preference(label: &str) -> Result<WorkoutPreference, EngineError> {
    match label.trim() {
        "Strength Training" => Ok(WorkoutPreference::Strength),
        "Cardio" => Ok(WorkoutPreference::Cardio),
        "HIIT" => Ok(WorkoutPreference::Hiit),
        "Flexibility/Yoga" => Ok(WorkoutPreference::Yoga),
        "Mixed" => Ok(WorkoutPreference::Mixed),
        other => Err(unknown("workout preference", other)),
    }
}

/// Activity labels carry a parenthetical description; only the lead words matter
fn activity_level(label: &str) -> Result<ActivityLevel, EngineError> {
    let head = label.split('(').next().unwrap_or_default().trim();
    match head {
        "Sedentary" => Ok(ActivityLevel::Sedentary),
        "Lightly Active" => Ok(ActivityLevel::LightlyActive),
        "Moderately Active" => Ok(ActivityLevel::ModeratelyActive),
        "Very Active" => Ok(ActivityLevel::VeryActive),
        "Extremely Active" => Ok(ActivityLevel::ExtremelyActive),
        _ => Err(unknown("activity level", label)),
    }
}

fn nutrition_approach(label: &str) -> Result<NutritionApproach, EngineError> {
    match label.trim() {
        "High Protein" => Ok(NutritionApproach::HighProtein),
        "Low Carb" => Ok(NutritionApproach::LowCarb),
        "Balanced" => Ok(NutritionApproach::Balanced),
        "Plant-Based" => Ok(NutritionApproach::PlantBased),
        "Flexible Dieting" => Ok(NutritionApproach::Flexible),
        other => Err(unknown("nutrition approach", other)),
    }
}

fn stress_level(label: &str) -> Result<StressLevel, EngineError> {
    match label.trim() {
        "Low" => Ok(StressLevel::Low),
        "Moderate" => Ok(StressLevel::Moderate),
        "High" => Ok(StressLevel::High),
        "Very High" => Ok(StressLevel::VeryHigh),
        other => Err(unknown("stress level", other)),
    }
}

fn weekly_hours(label: &str) -> f64 {
    match label.trim() {
        "Less than 2 hours" => 1.0,
        "2-4 hours" => 3.0,
        "4-6 hours" => 5.0,
        "6-8 hours" => 7.0,
        "More than 8 hours" => 10.0,
        other => {
            warn!(label = other, "unknown training time label, assuming {} h", DEFAULT_WEEKLY_HOURS);
            DEFAULT_WEEKLY_HOURS
        }
    }
}

fn meals_per_day(label: &str) -> u8 {
    match label.trim() {
        "2 meals" | "Intermittent fasting" => 2,
        "3 meals" => 3,
        "4-5 small meals" => 4,
        "6+ small meals" => 6,
        other => {
            warn!(label = other, "unknown meal frequency label, assuming {} meals", DEFAULT_MEALS_PER_DAY);
            DEFAULT_MEALS_PER_DAY
        }
    }
}

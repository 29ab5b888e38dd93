//! Daily energy and macronutrient targets
//!
//! Mifflin-St Jeor BMR, activity-scaled TDEE, goal adjustment and macro split.
//! This module is the single source of truth for the activity multipliers and
//! goal adjustments; callers must not carry their own copies of these tables.
//!
//! Reference: Mifflin, M.D., et al. (1990). A new predictive equation for
//! resting energy expenditure. *Am J Clin Nutr*, 51(2), 241-247.

use crate::config::TargetConfig;
use crate::error::EngineError;
use crate::profile::{ActivityLevel, BiologicalSex, FitnessGoal, NutritionApproach, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// kcal per gram of protein or carbohydrate
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARB: f64 = 4.0;
/// kcal per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;

const MSJ_WEIGHT_COEF: f64 = 10.0;
const MSJ_HEIGHT_COEF: f64 = 6.25;
const MSJ_AGE_COEF: f64 = 5.0;

const PROTEIN_BASE_G_PER_KG: f64 = 1.6;
const PROTEIN_BUILD_MUSCLE_G_PER_KG: f64 = 2.2;
const PROTEIN_LOSE_WEIGHT_G_PER_KG: f64 = 2.0;
const PROTEIN_HIGH_PROTEIN_G_PER_KG: f64 = 2.5;

const FAT_FRACTION_DEFAULT: f64 = 0.30;
const FAT_FRACTION_LOW_CARB: f64 = 0.40;

/// Sex constant of the Mifflin-St Jeor equation
pub fn sex_constant(sex: BiologicalSex) -> f64 {
    match sex {
        BiologicalSex::Male => 5.0,
        BiologicalSex::Female => -161.0,
    }
}

/// TDEE multiplier for an activity level
pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
        ActivityLevel::ExtremelyActive => 1.9,
    }
}

/// Calorie adjustment applied on top of TDEE for a goal (kcal)
pub fn goal_adjustment(goal: FitnessGoal) -> f64 {
    match goal {
        FitnessGoal::LoseWeight => -500.0,
        FitnessGoal::BuildMuscle => 300.0,
        FitnessGoal::Maintain | FitnessGoal::ImproveHealth => 0.0,
    }
}

/// Protein factor (g/kg). The nutrition-approach override wins over the goal override.
pub fn protein_factor(goal: FitnessGoal, approach: NutritionApproach) -> f64 {
    if approach == NutritionApproach::HighProtein {
        return PROTEIN_HIGH_PROTEIN_G_PER_KG;
    }
    match goal {
        FitnessGoal::BuildMuscle => PROTEIN_BUILD_MUSCLE_G_PER_KG,
        FitnessGoal::LoseWeight => PROTEIN_LOSE_WEIGHT_G_PER_KG,
        FitnessGoal::Maintain | FitnessGoal::ImproveHealth => PROTEIN_BASE_G_PER_KG,
    }
}

/// Share of calories from fat
pub fn fat_fraction(approach: NutritionApproach) -> f64 {
    match approach {
        NutritionApproach::LowCarb => FAT_FRACTION_LOW_CARB,
        _ => FAT_FRACTION_DEFAULT,
    }
}

/// Mifflin-St Jeor basal metabolic rate (kcal/day)
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: u32, sex: BiologicalSex) -> f64 {
    MSJ_WEIGHT_COEF * weight_kg + MSJ_HEIGHT_COEF * height_cm - MSJ_AGE_COEF * f64::from(age_years)
        + sex_constant(sex)
}

/// Adjustment applied while deriving a target set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFlag {
    /// Calorie target raised to the configured floor
    CalorieFloorApplied,
    /// Calorie target lowered to the configured ceiling
    CalorieCeilingApplied,
    /// Carbohydrates raised to the carb floor
    CarbFloorApplied,
    /// Fat reduced to make room for the carb floor
    FatReducedForCarbFloor,
    /// Protein plus the carb floor exceed the calorie budget even with minimum fat
    MacroBudgetExceeded,
}

/// Derived daily targets. Never persisted on its own; recompute from the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSet {
    pub bmr: f64,
    pub tdee: f64,
    pub daily_calories: f64,
    pub daily_protein_grams: f64,
    pub daily_carb_grams: f64,
    pub daily_fat_grams: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<TargetFlag>,
}

impl TargetSet {
    /// Reject caller-supplied targets a plan cannot be built from
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("bmr", self.bmr),
            ("tdee", self.tdee),
            ("daily_calories", self.daily_calories),
            ("daily_protein_grams", self.daily_protein_grams),
            ("daily_carb_grams", self.daily_carb_grams),
            ("daily_fat_grams", self.daily_fat_grams),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EngineError::PlanRejected(format!(
                    "target {} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        if self.daily_calories <= 0.0 {
            return Err(EngineError::PlanRejected("daily_calories must be positive".into()));
        }
        Ok(())
    }

    /// Energy implied by the macro targets (kcal)
    pub fn macro_calories(&self) -> f64 {
        self.daily_protein_grams * KCAL_PER_G_PROTEIN
            + self.daily_carb_grams * KCAL_PER_G_CARB
            + self.daily_fat_grams * KCAL_PER_G_FAT
    }

    /// Percentage of calories from each macro
    pub fn macro_percentages(&self) -> MacroPercentages {
        let total = self.macro_calories();
        if total <= 0.0 {
            return MacroPercentages::default();
        }
        MacroPercentages {
            protein_pct: self.daily_protein_grams * KCAL_PER_G_PROTEIN / total * 100.0,
            carb_pct: self.daily_carb_grams * KCAL_PER_G_CARB / total * 100.0,
            fat_pct: self.daily_fat_grams * KCAL_PER_G_FAT / total * 100.0,
        }
    }

    pub fn has_flag(&self, flag: TargetFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Integer view for display
    pub fn rounded(&self) -> RoundedTargets {
        RoundedTargets {
            bmr: self.bmr.round() as i64,
            tdee: self.tdee.round() as i64,
            daily_calories: self.daily_calories.round() as i64,
            daily_protein_grams: self.daily_protein_grams.round() as i64,
            daily_carb_grams: self.daily_carb_grams.round() as i64,
            daily_fat_grams: self.daily_fat_grams.round() as i64,
        }
    }
}

/// Macro energy split in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroPercentages {
    pub protein_pct: f64,
    pub carb_pct: f64,
    pub fat_pct: f64,
}

/// Rounded targets as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundedTargets {
    pub bmr: i64,
    pub tdee: i64,
    pub daily_calories: i64,
    pub daily_protein_grams: i64,
    pub daily_carb_grams: i64,
    pub daily_fat_grams: i64,
}

/// Target calculator for turning a profile into daily targets
#[derive(Debug, Clone)]
pub struct TargetCalculator {
    config: TargetConfig,
}

impl Default for TargetCalculator {
    fn default() -> Self {
        Self::new(TargetConfig::default())
    }
}

impl TargetCalculator {
    pub fn new(config: TargetConfig) -> Self {
        Self { config }
    }

    /// Compute the target set for a profile.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidProfile`] if any biometric is missing or
    /// out of range; no partial result is produced.
    pub fn compute(&self, profile: &UserProfile) -> Result<TargetSet, EngineError> {
        profile.validate()?;

        let mut flags = Vec::new();

        let bmr = mifflin_st_jeor(
            profile.weight_kg,
            profile.height_cm,
            profile.age_years,
            profile.biological_sex,
        );
        if bmr <= 0.0 {
            return Err(EngineError::InvalidProfile(format!(
                "biometrics produce a non-positive BMR ({:.1})",
                bmr
            )));
        }
        let tdee = bmr * activity_multiplier(profile.activity_level);

        let raw_calories = tdee + goal_adjustment(profile.goal);
        let daily_calories = self.clamp_calories(raw_calories, &mut flags);

        let protein_g = profile.weight_kg * protein_factor(profile.goal, profile.nutrition_approach);
        let mut fat_g = daily_calories * fat_fraction(profile.nutrition_approach) / KCAL_PER_G_FAT;

        let protein_kcal = protein_g * KCAL_PER_G_PROTEIN;
        let mut carb_g = (daily_calories - protein_kcal - fat_g * KCAL_PER_G_FAT) / KCAL_PER_G_CARB;

        if carb_g < self.config.carb_floor_g {
            carb_g = self.config.carb_floor_g;
            flags.push(TargetFlag::CarbFloorApplied);

            // Give up fat energy to keep the macros inside the calorie budget
            let min_fat_g = daily_calories * self.config.min_fat_fraction / KCAL_PER_G_FAT;
            let fat_room_g =
                (daily_calories - protein_kcal - carb_g * KCAL_PER_G_CARB) / KCAL_PER_G_FAT;
            let rebalanced = fat_room_g.max(min_fat_g);
            if rebalanced < fat_g {
                fat_g = rebalanced;
                flags.push(TargetFlag::FatReducedForCarbFloor);
            }
            if fat_room_g < min_fat_g {
                flags.push(TargetFlag::MacroBudgetExceeded);
                warn!(
                    user_id = %profile.user_id,
                    protein_g,
                    daily_calories,
                    "protein and carb floor exceed calorie budget"
                );
            }
        }

        let targets = TargetSet {
            bmr,
            tdee,
            daily_calories,
            daily_protein_grams: protein_g,
            daily_carb_grams: carb_g,
            daily_fat_grams: fat_g,
            flags,
        };

        debug!(
            user_id = %profile.user_id,
            bmr = targets.bmr,
            tdee = targets.tdee,
            calories = targets.daily_calories,
            "computed targets"
        );

        Ok(targets)
    }

    fn clamp_calories(&self, raw: f64, flags: &mut Vec<TargetFlag>) -> f64 {
        if raw < self.config.calorie_floor_kcal {
            warn!(
                raw_calories = raw,
                floor = self.config.calorie_floor_kcal,
                "calorie target clamped to floor"
            );
            flags.push(TargetFlag::CalorieFloorApplied);
            self.config.calorie_floor_kcal
        } else if raw > self.config.calorie_ceiling_kcal {
            warn!(
                raw_calories = raw,
                ceiling = self.config.calorie_ceiling_kcal,
                "calorie target clamped to ceiling"
            );
            flags.push(TargetFlag::CalorieCeilingApplied);
            self.config.calorie_ceiling_kcal
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample_profile;
    use crate::profile::{NutritionApproach, StressLevel};

    #[test]
    fn test_reference_scenario() {
        let targets = TargetCalculator::default().compute(&sample_profile()).unwrap();

        // 10*80 + 6.25*180 - 5*30 + 5 = 800 + 1125 - 150 + 5
        assert!((targets.bmr - 1780.0).abs() < 1e-9);
        assert!((targets.tdee - 2759.0).abs() < 1e-6);
        assert!((targets.daily_calories - 2259.0).abs() < 1e-6);
        // lose_weight overrides the 1.6 g/kg base
        assert!((targets.daily_protein_grams - 160.0).abs() < 1e-9);
        assert!(targets.flags.is_empty());
    }

    #[test]
    fn test_maintain_uses_base_protein() {
        let mut profile = sample_profile();
        profile.goal = FitnessGoal::Maintain;
        let targets = TargetCalculator::default().compute(&profile).unwrap();
        assert!((targets.daily_protein_grams - 128.0).abs() < 1e-9);
        assert!((targets.daily_calories - targets.tdee).abs() < 1e-9);
    }

    #[test]
    fn test_high_protein_overrides_goal() {
        let mut profile = sample_profile();
        profile.goal = FitnessGoal::BuildMuscle;
        profile.nutrition_approach = NutritionApproach::HighProtein;
        let targets = TargetCalculator::default().compute(&profile).unwrap();
        assert!((targets.daily_protein_grams - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_carb_fat_fraction() {
        let mut profile = sample_profile();
        profile.nutrition_approach = NutritionApproach::LowCarb;
        let targets = TargetCalculator::default().compute(&profile).unwrap();
        let expected_fat = targets.daily_calories * 0.40 / 9.0;
        assert!((targets.daily_fat_grams - expected_fat).abs() < 1e-9);
    }

    #[test]
    fn test_sex_difference_is_166() {
        let male = sample_profile();
        let mut female = sample_profile();
        female.biological_sex = BiologicalSex::Female;

        let calc = TargetCalculator::default();
        let diff = calc.compute(&male).unwrap().bmr - calc.compute(&female).unwrap().bmr;
        assert!((diff - 166.0).abs() < 1e-9);
    }

    #[test]
    fn test_tdee_monotonic_in_activity() {
        let calc = TargetCalculator::default();
        let mut previous = 0.0;
        for level in ActivityLevel::ALL {
            let mut profile = sample_profile();
            profile.activity_level = level;
            let tdee = calc.compute(&profile).unwrap().tdee;
            assert!(tdee >= previous);
            previous = tdee;
        }
    }

    #[test]
    fn test_macros_sum_to_calories() {
        let targets = TargetCalculator::default().compute(&sample_profile()).unwrap();
        assert!((targets.macro_calories() - targets.daily_calories).abs() < 0.5);
    }

    #[test]
    fn test_calorie_floor_is_flagged() {
        let mut profile = sample_profile();
        profile.biological_sex = BiologicalSex::Female;
        profile.weight_kg = 45.0;
        profile.height_cm = 150.0;
        profile.age_years = 70;
        profile.activity_level = ActivityLevel::Sedentary;
        profile.stress_level = StressLevel::Low;

        let targets = TargetCalculator::default().compute(&profile).unwrap();
        assert_eq!(targets.daily_calories, 1200.0);
        assert!(targets.has_flag(TargetFlag::CalorieFloorApplied));
    }

    #[test]
    fn test_calorie_ceiling_is_flagged() {
        let mut profile = sample_profile();
        profile.weight_kg = 180.0;
        profile.height_cm = 210.0;
        profile.age_years = 20;
        profile.activity_level = ActivityLevel::ExtremelyActive;
        profile.goal = FitnessGoal::BuildMuscle;

        let targets = TargetCalculator::default().compute(&profile).unwrap();
        assert_eq!(targets.daily_calories, 4500.0);
        assert!(targets.has_flag(TargetFlag::CalorieCeilingApplied));
    }

    #[test]
    fn test_carb_floor_rebalances_fat() {
        // Heavy, sedentary, high-protein, cutting: protein crowds out carbs
        let mut profile = sample_profile();
        profile.weight_kg = 120.0;
        profile.height_cm = 165.0;
        profile.age_years = 55;
        profile.biological_sex = BiologicalSex::Female;
        profile.activity_level = ActivityLevel::Sedentary;
        profile.nutrition_approach = NutritionApproach::HighProtein;

        let targets = TargetCalculator::default().compute(&profile).unwrap();
        assert!(targets.has_flag(TargetFlag::CarbFloorApplied));
        assert_eq!(targets.daily_carb_grams, 50.0);
        assert!(targets.daily_fat_grams >= targets.daily_calories * 0.20 / 9.0 - 1e-9);
        assert!(targets.daily_carb_grams >= 0.0 && targets.daily_fat_grams >= 0.0);
    }

    #[test]
    fn test_invalid_profile_fails_fast() {
        let mut profile = sample_profile();
        profile.height_cm = 0.0;
        assert!(matches!(
            TargetCalculator::default().compute(&profile),
            Err(EngineError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_rounded_view() {
        let rounded = TargetCalculator::default()
            .compute(&sample_profile())
            .unwrap()
            .rounded();
        assert_eq!(rounded.bmr, 1780);
        assert_eq!(rounded.daily_calories, 2259);
        assert_eq!(rounded.daily_protein_grams, 160);
    }
}

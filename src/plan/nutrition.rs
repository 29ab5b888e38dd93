//! Nutrition plan
//!
//! Splits the daily calorie and macro targets across meal slots and attaches
//! catalog meals whose macro energy split sits close to the slot's split.

use super::catalog::{MealArchetype, MealType};
use super::{tiebreak_keys, PlanWarning};
use crate::config::PlanConfig;
use crate::profile::{NutritionApproach, UserProfile};
use crate::targets::{TargetSet, KCAL_PER_G_CARB, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use serde::{Deserialize, Serialize};

/// Salt separating nutrition tie-breaks from other plan sections
const NUTRITION_SALT: u64 = 0x6e75_7472;

/// A catalog meal scaled to a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSuggestion {
    pub archetype_id: String,
    pub name: String,
    /// Multiplier applied to the archetype's base portion
    pub portion: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// One meal slot of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealTemplate {
    pub meal_type: MealType,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub suggestions: Vec<MealSuggestion>,
    /// No catalog meal matched; the slot carries targets only
    #[serde(default)]
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub calorie_target: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub meals: Vec<MealTemplate>,
}

/// Ordered meal slots for a meals-per-day count
pub fn slot_sequence(meals_per_day: u8) -> Vec<MealType> {
    use MealType::*;
    match meals_per_day {
        0 | 1 => vec![Dinner],
        2 => vec![Lunch, Dinner],
        3 => vec![Breakfast, Lunch, Dinner],
        4 => vec![Breakfast, Lunch, Dinner, Snack],
        5 => vec![Breakfast, Snack, Lunch, Snack, Dinner],
        n => {
            let mut slots = vec![Breakfast, Snack, Lunch, Snack, Dinner, Snack];
            slots.extend(std::iter::repeat(Snack).take(usize::from(n) - 6));
            slots
        }
    }
}

/// Base weights renormalised to sum to 1
pub fn slot_weights(slots: &[MealType]) -> Vec<f64> {
    let total: f64 = slots.iter().map(MealType::base_weight).sum();
    slots.iter().map(|s| s.base_weight() / total).collect()
}

pub(crate) fn build(
    config: &PlanConfig,
    profile: &UserProfile,
    targets: &TargetSet,
    meals: &[MealArchetype],
    seed: u64,
) -> (NutritionPlan, Vec<PlanWarning>) {
    let slots = slot_sequence(profile.meals_per_day);
    let weights = slot_weights(&slots);
    let split = target_split(targets);
    let plant_only = profile.nutrition_approach == NutritionApproach::PlantBased;
    let mut warnings = Vec::new();

    let templates = slots
        .iter()
        .zip(&weights)
        .enumerate()
        .map(|(index, (meal_type, weight))| {
            let calories = targets.daily_calories * weight;
            let keys = tiebreak_keys(seed, NUTRITION_SALT + index as u64, meals.len());

            let mut ranked: Vec<(i64, u64, MealSuggestion)> = meals
                .iter()
                .zip(keys)
                .filter(|(m, _)| m.meal_types.contains(meal_type) && (!plant_only || m.plant_based))
                .filter_map(|(m, key)| {
                    score(m, calories, split, config).map(|(distance, suggestion)| (distance, key, suggestion))
                })
                .collect();
            ranked.sort_by_key(|(distance, key, _)| (*distance, *key));

            let suggestions: Vec<MealSuggestion> = ranked
                .into_iter()
                .take(config.max_meal_suggestions)
                .map(|(_, _, s)| s)
                .collect();

            if suggestions.len() < config.min_meal_suggestions {
                warnings.push(PlanWarning::InsufficientMeals {
                    slot: index,
                    meal_type: *meal_type,
                    found: suggestions.len(),
                    required: config.min_meal_suggestions,
                });
            }

            MealTemplate {
                meal_type: *meal_type,
                calories,
                protein_g: targets.daily_protein_grams * weight,
                carbs_g: targets.daily_carb_grams * weight,
                fat_g: targets.daily_fat_grams * weight,
                placeholder: suggestions.is_empty(),
                suggestions,
            }
        })
        .collect();

    let plan = NutritionPlan {
        calorie_target: targets.daily_calories,
        protein_g: targets.daily_protein_grams,
        carbs_g: targets.daily_carb_grams,
        fat_g: targets.daily_fat_grams,
        meals: templates,
    };
    (plan, warnings)
}

/// Macro energy shares (protein, carbs, fat) of the daily targets
fn target_split(targets: &TargetSet) -> (f64, f64, f64) {
    let total = targets.macro_calories();
    if total <= 0.0 {
        return (0.0, 0.0, 0.0);
    }
    (
        targets.daily_protein_grams * KCAL_PER_G_PROTEIN / total,
        targets.daily_carb_grams * KCAL_PER_G_CARB / total,
        targets.daily_fat_grams * KCAL_PER_G_FAT / total,
    )
}

/// Fit a meal to a slot, returning its split distance in hundredths.
///
/// `macro_tolerance` is absolute: each macro's share of the meal's energy
/// must sit within that many share points (0.15 = 15 percentage points) of
/// the slot's share, not within 15 % of the slot's value. A 30 % protein
/// slot accepts meals from 15 % to 45 % protein.
///
/// Distances are bucketed so near-identical fits tie and fall through to
/// the seeded key.
fn score(
    meal: &MealArchetype,
    slot_calories: f64,
    split: (f64, f64, f64),
    config: &PlanConfig,
) -> Option<(i64, MealSuggestion)> {
    let energy = meal.energy_kcal();
    if energy <= 0.0 {
        return None;
    }
    let portion = slot_calories / energy;
    let (low, high) = config.portion_range;
    if !(low..=high).contains(&portion) {
        return None;
    }

    let (p, c, f) = meal.energy_shares();
    let diffs = [(p - split.0).abs(), (c - split.1).abs(), (f - split.2).abs()];
    if diffs.iter().any(|d| *d > config.macro_tolerance) {
        return None;
    }
    let distance = (diffs.iter().sum::<f64>() * 100.0).round() as i64;

    Some((
        distance,
        MealSuggestion {
            archetype_id: meal.id.clone(),
            name: meal.name.clone(),
            portion,
            calories: energy * portion,
            protein_g: meal.protein_g * portion,
            carbs_g: meal.carbs_g * portion,
            fat_g: meal.fat_g * portion,
        },
    ))
}

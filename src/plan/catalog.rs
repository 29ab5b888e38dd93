//! Content catalog
//!
//! Read-only meal, exercise and habit archetypes supplied by a content
//! collaborator. The generator never invents archetypes; everything in a plan
//! comes from here.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Base share of daily calories before renormalisation
    pub fn base_weight(&self) -> f64 {
        match self {
            MealType::Breakfast => 0.25,
            MealType::Lunch => 0.30,
            MealType::Dinner => 0.35,
            MealType::Snack => 0.10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

/// A meal template with its macro composition at one portion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealArchetype {
    pub id: String,
    pub name: String,
    pub meal_types: Vec<MealType>,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub plant_based: bool,
}

impl MealArchetype {
    /// Energy from macros (kcal)
    pub fn energy_kcal(&self) -> f64 {
        self.protein_g * 4.0 + self.carbs_g * 4.0 + self.fat_g * 9.0
    }

    /// Energy shares (protein, carbs, fat); all zero for an empty meal
    pub fn energy_shares(&self) -> (f64, f64, f64) {
        let total = self.energy_kcal();
        if total <= 0.0 {
            return (0.0, 0.0, 0.0);
        }
        (
            self.protein_g * 4.0 / total,
            self.carbs_g * 4.0 / total,
            self.fat_g * 9.0 / total,
        )
    }
}

/// Training modality of an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Strength,
    Cardio,
    Hiit,
    Yoga,
}

impl Modality {
    /// Cardio and yoga are prescribed by duration rather than sets × reps
    pub fn is_timed(&self) -> bool {
        matches!(self, Modality::Cardio | Modality::Yoga)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    FullBody,
    Cardio,
    Mobility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseArchetype {
    pub id: String,
    pub name: String,
    pub modality: Modality,
    pub muscle_groups: Vec<MuscleGroup>,
    /// Approximate energy cost (kcal/min)
    pub calories_per_minute: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitCategory {
    Health,
    Fitness,
    Mindfulness,
    Social,
    Learning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitArchetype {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub category: HabitCategory,
    pub target_days_per_week: u8,
    /// Lower-case words matched against profile motivations and challenges
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Versioned archetype catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    #[serde(default)]
    pub meals: Vec<MealArchetype>,
    #[serde(default)]
    pub exercises: Vec<ExerciseArchetype>,
    #[serde(default)]
    pub habits: Vec<HabitArchetype>,
}

/// Content collaborator seam
pub trait CatalogSource {
    fn load(&self) -> Result<Catalog, EngineError>;
}

impl CatalogSource for Catalog {
    fn load(&self) -> Result<Catalog, EngineError> {
        Ok(self.clone())
    }
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject archetypes that could not produce a sensible plan entry
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.version.trim().is_empty() {
            return Err(EngineError::InsufficientCatalog("catalog version is empty".into()));
        }
        for meal in &self.meals {
            if meal.energy_kcal() <= 0.0 || meal.meal_types.is_empty() {
                return Err(EngineError::InsufficientCatalog(format!(
                    "meal '{}' has no energy or no meal type",
                    meal.id
                )));
            }
        }
        for habit in &self.habits {
            if !(1..=7).contains(&habit.target_days_per_week) {
                return Err(EngineError::InsufficientCatalog(format!(
                    "habit '{}' targets {} days per week",
                    habit.id, habit.target_days_per_week
                )));
            }
        }
        Ok(())
    }

    /// Built-in starter content
    pub fn builtin() -> Self {
        Self {
            version: "builtin-2024.1".to_string(),
            meals: builtin_meals(),
            exercises: builtin_exercises(),
            habits: builtin_habits(),
        }
    }
}

fn meal(id: &str, name: &str, types: &[MealType], p: f64, c: f64, f: f64, plant: bool) -> MealArchetype {
    MealArchetype {
        id: id.to_string(),
        name: name.to_string(),
        meal_types: types.to_vec(),
        protein_g: p,
        carbs_g: c,
        fat_g: f,
        plant_based: plant,
    }
}

fn builtin_meals() -> Vec<MealArchetype> {
    use MealType::*;
    vec![
        meal("greek-yogurt-parfait", "Greek Yogurt Parfait", &[Breakfast, Snack], 25.0, 40.0, 8.0, false),
        meal("veggie-egg-scramble", "Veggie Egg Scramble with Toast", &[Breakfast], 24.0, 25.0, 16.0, false),
        meal("overnight-oats", "Overnight Oats with Berries", &[Breakfast], 20.0, 45.0, 10.0, true),
        meal("protein-pancakes", "Protein Pancakes", &[Breakfast], 30.0, 35.0, 8.0, false),
        meal("tofu-breakfast-burrito", "Tofu Breakfast Burrito", &[Breakfast, Lunch], 22.0, 38.0, 14.0, true),
        meal("chicken-quinoa-bowl", "Grilled Chicken Quinoa Bowl", &[Lunch, Dinner], 40.0, 50.0, 14.0, false),
        meal("turkey-avocado-wrap", "Turkey Avocado Wrap", &[Lunch], 32.0, 40.0, 18.0, false),
        meal("lentil-chickpea-salad", "Lentil & Chickpea Salad", &[Lunch], 22.0, 50.0, 14.0, true),
        meal("tuna-nicoise-salad", "Tuna Nicoise Salad", &[Lunch, Dinner], 35.0, 25.0, 20.0, false),
        meal("tempeh-buddha-bowl", "Tempeh Buddha Bowl", &[Lunch, Dinner], 28.0, 45.0, 18.0, true),
        meal("salmon-sweet-potato", "Baked Salmon with Sweet Potato", &[Dinner], 38.0, 45.0, 20.0, false),
        meal("beef-stir-fry", "Lean Beef Stir-Fry with Rice", &[Dinner], 40.0, 55.0, 15.0, false),
        meal("chickpea-curry", "Chickpea Curry with Brown Rice", &[Dinner], 20.0, 62.0, 16.0, true),
        meal("chicken-roast-veg", "Chicken Breast with Roasted Vegetables", &[Lunch, Dinner], 45.0, 20.0, 15.0, false),
        meal("tofu-veg-stir-fry", "Tofu & Vegetable Stir-Fry", &[Dinner], 28.0, 40.0, 18.0, true),
        meal("protein-shake-banana", "Protein Shake with Banana", &[Snack, Breakfast], 25.0, 30.0, 6.0, false),
        meal("cottage-cheese-fruit", "Cottage Cheese with Fruit", &[Snack], 20.0, 18.0, 5.0, false),
        meal("hummus-veggies", "Hummus with Veggies & Pita", &[Snack], 10.0, 25.0, 9.0, true),
        meal("edamame", "Salted Edamame", &[Snack], 17.0, 13.0, 8.0, true),
        meal("eggs-and-fruit", "Hard-Boiled Eggs & Fruit", &[Snack], 13.0, 15.0, 9.0, false),
    ]
}

fn exercise(id: &str, name: &str, modality: Modality, groups: &[MuscleGroup], cpm: f64) -> ExerciseArchetype {
    ExerciseArchetype {
        id: id.to_string(),
        name: name.to_string(),
        modality,
        muscle_groups: groups.to_vec(),
        calories_per_minute: cpm,
    }
}

fn builtin_exercises() -> Vec<ExerciseArchetype> {
    use Modality::*;
    use MuscleGroup::*;
    vec![
        exercise("push-ups", "Push-ups", Strength, &[Chest, Triceps, Shoulders], 7.0),
        exercise("bench-press", "Bench Press", Strength, &[Chest, Triceps, Shoulders], 6.0),
        exercise("overhead-press", "Overhead Press", Strength, &[Shoulders, Triceps], 6.0),
        exercise("incline-db-press", "Incline Dumbbell Press", Strength, &[Chest, Shoulders], 6.0),
        exercise("lateral-raise", "Lateral Raise", Strength, &[Shoulders], 4.0),
        exercise("tricep-dips", "Tricep Dips", Strength, &[Triceps, Chest], 6.0),
        exercise("deadlift", "Deadlift", Strength, &[Back, Glutes, Hamstrings], 6.0),
        exercise("pull-ups", "Pull-ups", Strength, &[Back, Biceps], 8.0),
        exercise("bent-over-row", "Bent-over Row", Strength, &[Back, Biceps], 6.0),
        exercise("lat-pulldown", "Lat Pulldown", Strength, &[Back, Biceps], 5.0),
        exercise("face-pull", "Face Pull", Strength, &[Shoulders, Back], 4.0),
        exercise("bicep-curl", "Bicep Curl", Strength, &[Biceps], 4.0),
        exercise("bodyweight-squats", "Bodyweight Squats", Strength, &[Quads, Glutes, Core], 6.0),
        exercise("back-squat", "Barbell Back Squat", Strength, &[Quads, Glutes], 7.0),
        exercise("walking-lunges", "Walking Lunges", Strength, &[Quads, Glutes, Hamstrings], 6.0),
        exercise("romanian-deadlift", "Romanian Deadlift", Strength, &[Hamstrings, Glutes], 6.0),
        exercise("leg-press", "Leg Press", Strength, &[Quads, Glutes], 5.0),
        exercise("glute-bridge", "Glute Bridge", Strength, &[Glutes, Hamstrings, Core], 4.0),
        exercise("calf-raise", "Standing Calf Raise", Strength, &[Calves], 4.0),
        exercise("plank", "Plank", Strength, &[Core], 4.0),
        exercise("hanging-leg-raise", "Hanging Leg Raise", Strength, &[Core], 5.0),
        exercise("running", "Running", Modality::Cardio, &[MuscleGroup::Cardio, Quads, Calves], 11.0),
        exercise("cycling", "Cycling", Modality::Cardio, &[MuscleGroup::Cardio, Quads], 9.0),
        exercise("rowing-machine", "Rowing Machine", Modality::Cardio, &[MuscleGroup::Cardio, Back, Quads], 10.0),
        exercise("jump-rope", "Jump Rope", Modality::Cardio, &[MuscleGroup::Cardio, FullBody], 12.0),
        exercise("brisk-walk", "Brisk Walk", Modality::Cardio, &[MuscleGroup::Cardio], 5.0),
        exercise("stair-climber", "Stair Climber", Modality::Cardio, &[MuscleGroup::Cardio, Glutes], 9.0),
        exercise("hiit-circuit", "HIIT Circuit", Hiit, &[FullBody], 13.0),
        exercise("burpees", "Burpees", Hiit, &[FullBody, Chest], 12.0),
        exercise("kettlebell-swings", "Kettlebell Swings", Hiit, &[FullBody, Glutes, Hamstrings], 12.0),
        exercise("mountain-climbers", "Mountain Climbers", Hiit, &[FullBody, Core], 10.0),
        exercise("jump-squats", "Jump Squats", Hiit, &[FullBody, Quads, Glutes], 11.0),
        exercise("battle-ropes", "Battle Ropes", Hiit, &[FullBody, Shoulders], 11.0),
        exercise("yoga-flow", "Yoga Flow", Yoga, &[Mobility, Core], 4.0),
        exercise("sun-salutation", "Sun Salutation", Yoga, &[Mobility, FullBody], 4.0),
        exercise("hip-opener", "Hip Opener Sequence", Yoga, &[Mobility, Glutes], 3.0),
        exercise("cat-cow", "Cat-Cow", Yoga, &[Mobility, Back], 2.5),
        exercise("warrior-series", "Warrior Series", Yoga, &[Mobility, Quads, Core], 4.0),
        exercise("childs-pose", "Child's Pose Stretch", Yoga, &[Mobility, Back], 2.0),
    ]
}

fn habit(id: &str, name: &str, icon: &str, category: HabitCategory, days: u8, keywords: &[&str]) -> HabitArchetype {
    HabitArchetype {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        category,
        target_days_per_week: days,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn builtin_habits() -> Vec<HabitArchetype> {
    use HabitCategory::*;
    vec![
        habit("drink-water", "Drink 8 glasses of water", "Droplets", Health, 7, &["health", "energy", "appearance", "diet"]),
        habit("daily-vitamins", "Take daily vitamins", "Pill", Health, 7, &["health", "longevity", "diet"]),
        habit("time-in-nature", "Spend time in nature", "Leaf", Health, 5, &["health", "longevity", "energy"]),
        habit("sleep-8-hours", "Get 8 hours of sleep", "Moon", Health, 7, &["energy", "health", "longevity", "injury"]),
        habit("limit-screen-time", "Limit screen time", "Phone", Health, 7, &["energy", "time", "consistency"]),
        habit("exercise-30", "Exercise for 30 minutes", "Dumbbell", Fitness, 4, &["strength", "appearance", "competition", "health", "confidence"]),
        habit("meditate-10", "Meditate for 10 minutes", "Brain", Mindfulness, 5, &["motivation", "confidence", "consistency"]),
        habit("gratitude", "Practice gratitude", "Heart", Mindfulness, 5, &["confidence", "motivation"]),
        habit("connect", "Connect with friends/family", "Users", Social, 3, &["social support", "confidence", "motivation"]),
        habit("read-30", "Read for 30 minutes", "Book", Learning, 4, &["knowledge", "longevity"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.habits.len(), 10);
        assert!(catalog.exercises.iter().any(|e| e.name == "HIIT Circuit"));
    }

    #[test]
    fn test_energy_shares_sum_to_one() {
        for meal in Catalog::builtin().meals {
            let (p, c, f) = meal.energy_shares();
            assert!((p + c + f - 1.0).abs() < 1e-9, "{}", meal.id);
        }
    }

    #[test]
    fn test_from_json_rejects_bad_habit() {
        let json = r#"{"version":"v1","habits":[{"id":"x","name":"X","icon":"Star","category":"health","target_days_per_week":9}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(EngineError::InsufficientCatalog(_))
        ));
    }

    #[test]
    fn test_catalog_source() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.load().unwrap().version, catalog.version);
    }
}

//! Plan generation
//!
//! Turns a profile, its targets and a content catalog into nutrition,
//! fitness and wellness plans.
//!
//! - Archetype tie-breaks are driven by an explicit seed ([`GeneratorOptions`]).
//!   The default seed is derived from user id, profile revision and catalog
//!   version, so regenerating an unchanged profile reproduces the same bundle.
//! - Missing content never gets invented. The slot is left as a placeholder
//!   and a [`PlanWarning`] is attached, unless `strict_catalog` is set.

pub mod catalog;
pub mod fitness;
pub mod nutrition;
pub mod registry;
pub mod wellness;

pub use catalog::{Catalog, CatalogSource, MealType, Modality, MuscleGroup};
pub use fitness::{FitnessPlan, SplitKind, Workout};
pub use nutrition::{MealTemplate, NutritionPlan};
pub use registry::{PlanHistory, PlanRecord};
pub use wellness::{MeditationStyle, WellnessPlan};

use crate::config::PlanConfig;
use crate::error::EngineError;
use crate::profile::UserProfile;
use crate::targets::TargetSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Knobs for a single generation call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Tie-break seed; `None` derives one from the profile and catalog
    pub seed: Option<u64>,
}

impl GeneratorOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn resolve_seed(&self, profile: &UserProfile, catalog: &Catalog) -> u64 {
        self.seed
            .unwrap_or_else(|| default_seed(&profile.user_id, profile.revision, &catalog.version))
    }
}

/// Stable FNV-1a over user id, profile revision and catalog version
pub fn default_seed(user_id: &str, revision: u32, catalog_version: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let revision = revision.to_le_bytes();
    let parts: [&[u8]; 3] = [user_id.as_bytes(), &revision, catalog_version.as_bytes()];
    let mut hash = OFFSET;
    for part in parts {
        for byte in part {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(PRIME);
        }
        // Field separator so ("ab", "c") and ("a", "bc") differ
        hash ^= 0xff;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// One pseudo-random key per candidate, reproducible for (seed, salt)
pub(crate) fn tiebreak_keys(seed: u64, salt: u64, count: usize) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ salt.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    (0..count).map(|_| rng.gen::<u64>()).collect()
}

/// Non-fatal content gap found while generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    InsufficientMeals {
        slot: usize,
        meal_type: MealType,
        found: usize,
        required: usize,
    },
    InsufficientExercises {
        day: String,
        focus: String,
        found: usize,
        required: usize,
    },
    InsufficientHabits {
        found: usize,
        required: usize,
    },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::InsufficientMeals { slot, meal_type, found, required } => write!(
                f,
                "meal slot {} ({}): {} matching meals, {} required",
                slot,
                meal_type.as_str(),
                found,
                required
            ),
            PlanWarning::InsufficientExercises { day, focus, found, required } => write!(
                f,
                "{} {}: {} matching exercises, {} required",
                day, focus, found, required
            ),
            PlanWarning::InsufficientHabits { found, required } => {
                write!(f, "{} habits available, {} required", found, required)
            }
        }
    }
}

/// The three plans generated together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBundle {
    pub user_id: String,
    pub profile_revision: u32,
    pub catalog_version: String,
    pub seed: u64,
    pub nutrition: NutritionPlan,
    pub fitness: FitnessPlan,
    pub wellness: WellnessPlan,
    #[serde(default)]
    pub warnings: Vec<PlanWarning>,
}

/// Plan generator
#[derive(Debug, Clone, Default)]
pub struct PlanGenerator {
    config: PlanConfig,
}

impl PlanGenerator {
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    /// Generate nutrition, fitness and wellness plans
    pub fn generate(
        &self,
        profile: &UserProfile,
        targets: &TargetSet,
        catalog: &Catalog,
        options: GeneratorOptions,
    ) -> Result<PlanBundle, EngineError> {
        profile.validate()?;
        targets.validate()?;
        let seed = options.resolve_seed(profile, catalog);

        let (nutrition, mut warnings) =
            nutrition::build(&self.config, profile, targets, &catalog.meals, seed);
        let (fitness, fitness_warnings) =
            fitness::build(profile, &catalog.exercises, seed);
        let (wellness, wellness_warnings) =
            wellness::build(&self.config, profile, &catalog.habits, seed);
        warnings.extend(fitness_warnings);
        warnings.extend(wellness_warnings);

        for warning in &warnings {
            warn!(user_id = %profile.user_id, catalog = %catalog.version, "{}", warning);
        }
        if self.config.strict_catalog && !warnings.is_empty() {
            let detail: Vec<String> = warnings.iter().map(ToString::to_string).collect();
            return Err(EngineError::InsufficientCatalog(detail.join("; ")));
        }

        debug!(
            user_id = %profile.user_id,
            seed,
            meals = nutrition.meals.len(),
            split = fitness.split.name(),
            workouts = fitness.workouts.len(),
            habits = wellness.habits.len(),
            "plans generated"
        );

        Ok(PlanBundle {
            user_id: profile.user_id.clone(),
            profile_revision: profile.revision,
            catalog_version: catalog.version.clone(),
            seed,
            nutrition,
            fitness,
            wellness,
            warnings,
        })
    }
}

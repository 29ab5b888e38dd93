//! Fitness plan
//!
//! Chooses a training split from experience, preference and available days,
//! spreads the sessions over the week and fills each one from the exercise
//! catalog.

use super::catalog::{ExerciseArchetype, Modality, MuscleGroup};
use super::{tiebreak_keys, PlanWarning};
use crate::profile::{FitnessExperience, UserProfile, WorkoutPreference};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Salt separating fitness tie-breaks from other plan sections
const FITNESS_SALT: u64 = 0x6669_746e;

/// Fewer exercises than this in a session raises a warning
pub const MIN_EXERCISES_PER_DAY: usize = 4;

pub const MIN_TRAINING_DAYS: u8 = 2;
pub const MAX_TRAINING_DAYS: u8 = 6;
pub const MIN_SESSION_MINUTES: u32 = 20;
pub const MAX_SESSION_MINUTES: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    FullBody,
    UpperLower,
    PushPullLegs,
    CardioEndurance,
    HiitConditioning,
    MobilityYoga,
    Hybrid,
}

impl SplitKind {
    pub fn name(&self) -> &'static str {
        match self {
            SplitKind::FullBody => "Full Body",
            SplitKind::UpperLower => "Upper/Lower",
            SplitKind::PushPullLegs => "Push/Pull/Legs",
            SplitKind::CardioEndurance => "Cardio Endurance",
            SplitKind::HiitConditioning => "HIIT Conditioning",
            SplitKind::MobilityYoga => "Mobility & Yoga",
            SplitKind::Hybrid => "Hybrid",
        }
    }

    /// Pick a split for a preference, experience tier and day count
    pub fn select(preference: WorkoutPreference, experience: FitnessExperience, days: u8) -> Self {
        match preference {
            WorkoutPreference::Strength => {
                if experience >= FitnessExperience::Intermediate && days >= 5 {
                    SplitKind::PushPullLegs
                } else if days >= 4 {
                    SplitKind::UpperLower
                } else {
                    SplitKind::FullBody
                }
            }
            WorkoutPreference::Cardio => SplitKind::CardioEndurance,
            WorkoutPreference::Hiit => SplitKind::HiitConditioning,
            WorkoutPreference::Yoga => SplitKind::MobilityYoga,
            WorkoutPreference::Mixed => SplitKind::Hybrid,
        }
    }

    /// Rotation of session focuses for this split
    fn rotation(&self) -> Vec<Focus> {
        use MuscleGroup::*;
        match self {
            SplitKind::FullBody => vec![Focus::new(
                "Full Body",
                Modality::Strength,
                &[Chest, Back, Quads, Hamstrings, Shoulders, Core],
            )],
            SplitKind::UpperLower => vec![
                Focus::new("Upper Body", Modality::Strength, &[Chest, Back, Shoulders, Biceps, Triceps]),
                Focus::new("Lower Body", Modality::Strength, &[Quads, Hamstrings, Glutes, Calves, Core]),
            ],
            SplitKind::PushPullLegs => vec![
                Focus::new("Push", Modality::Strength, &[Chest, Shoulders, Triceps]),
                Focus::new("Pull", Modality::Strength, &[Back, Biceps, Core]),
                Focus::new("Legs", Modality::Strength, &[Quads, Hamstrings, Glutes, Calves]),
            ],
            SplitKind::CardioEndurance => {
                vec![Focus::new("Endurance", Modality::Cardio, &[MuscleGroup::Cardio])]
            }
            SplitKind::HiitConditioning => {
                vec![Focus::new("Conditioning", Modality::Hiit, &[FullBody])]
            }
            SplitKind::MobilityYoga => vec![Focus::new("Mobility", Modality::Yoga, &[Mobility])],
            SplitKind::Hybrid => vec![
                Focus::new("Full Body Strength", Modality::Strength, &[Chest, Back, Quads, Core]),
                Focus::new("Cardio", Modality::Cardio, &[MuscleGroup::Cardio]),
                Focus::new("HIIT", Modality::Hiit, &[FullBody]),
            ],
        }
    }
}

#[derive(Debug, Clone)]
struct Focus {
    name: &'static str,
    modality: Modality,
    groups: Vec<MuscleGroup>,
}

impl Focus {
    fn new(name: &'static str, modality: Modality, groups: &[MuscleGroup]) -> Self {
        Self {
            name,
            modality,
            groups: groups.to_vec(),
        }
    }
}

/// Sets/reps/rest, or a duration for timed modalities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePrescription {
    pub exercise_id: String,
    pub name: String,
    pub sets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub day: Weekday,
    pub focus: String,
    pub modality: Modality,
    pub target_groups: Vec<MuscleGroup>,
    pub exercises: Vec<ExercisePrescription>,
    pub estimated_duration_minutes: u32,
    pub estimated_calories: u32,
    /// No catalog exercise matched this session
    #[serde(default)]
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessPlan {
    pub split: SplitKind,
    pub split_name: String,
    pub days_per_week: u8,
    pub session_minutes: u32,
    pub workouts: Vec<Workout>,
}

/// Training days per week from the weekly hours budget
pub fn days_per_week(weekly_hours: f64) -> u8 {
    (weekly_hours.round() as i64).clamp(i64::from(MIN_TRAINING_DAYS), i64::from(MAX_TRAINING_DAYS)) as u8
}

/// Session length from the weekly budget spread over the training days
pub fn session_minutes(weekly_hours: f64, days: u8) -> u32 {
    let minutes = weekly_hours * 60.0 / f64::from(days.max(1));
    (minutes.round() as i64).clamp(i64::from(MIN_SESSION_MINUTES), i64::from(MAX_SESSION_MINUTES)) as u32
}

/// Weekdays used for a given number of training days
pub fn schedule(days: u8) -> Vec<Weekday> {
    use Weekday::*;
    match days {
        0..=2 => vec![Mon, Thu],
        3 => vec![Mon, Wed, Fri],
        4 => vec![Mon, Tue, Thu, Fri],
        5 => vec![Mon, Tue, Wed, Fri, Sat],
        _ => vec![Mon, Tue, Wed, Thu, Fri, Sat],
    }
}

/// Exercises per session for an experience tier
pub fn exercises_per_day(experience: FitnessExperience) -> usize {
    match experience {
        FitnessExperience::Beginner => 4,
        FitnessExperience::Intermediate => 5,
        FitnessExperience::Advanced => 6,
    }
}

/// Sets, reps and rest for an experience tier
fn tier_prescription(experience: FitnessExperience) -> (u32, &'static str, u32) {
    match experience {
        FitnessExperience::Beginner => (3, "10", 60),
        FitnessExperience::Intermediate => (3, "8-12", 75),
        FitnessExperience::Advanced => (4, "6-8", 90),
    }
}

pub(crate) fn build(
    profile: &UserProfile,
    exercises: &[ExerciseArchetype],
    seed: u64,
) -> (FitnessPlan, Vec<PlanWarning>) {
    let days = days_per_week(profile.weekly_workout_hours);
    let minutes = session_minutes(profile.weekly_workout_hours, days);
    let split = SplitKind::select(profile.workout_preference, profile.experience, days);
    let rotation = split.rotation();
    let per_day = exercises_per_day(profile.experience);
    let mut warnings = Vec::new();

    let workouts = schedule(days)
        .into_iter()
        .enumerate()
        .map(|(index, day)| {
            let focus = &rotation[index % rotation.len()];
            let keys = tiebreak_keys(seed, FITNESS_SALT + index as u64, exercises.len());
            let picked = pick_exercises(exercises, &keys, focus, per_day);

            if picked.len() < MIN_EXERCISES_PER_DAY {
                warnings.push(PlanWarning::InsufficientExercises {
                    day: day.to_string(),
                    focus: focus.name.to_string(),
                    found: picked.len(),
                    required: MIN_EXERCISES_PER_DAY,
                });
            }

            let slot_minutes = if picked.is_empty() { 0 } else { minutes / picked.len() as u32 };
            let (sets, reps, rest) = tier_prescription(profile.experience);
            let estimated_calories = picked
                .iter()
                .map(|e| e.calories_per_minute * f64::from(slot_minutes))
                .sum::<f64>()
                .round() as u32;

            let prescriptions = picked
                .iter()
                .map(|e| {
                    if e.modality.is_timed() {
                        ExercisePrescription {
                            exercise_id: e.id.clone(),
                            name: e.name.clone(),
                            sets: 1,
                            reps: None,
                            rest_seconds: 0,
                            duration_minutes: Some(slot_minutes.max(5)),
                        }
                    } else {
                        ExercisePrescription {
                            exercise_id: e.id.clone(),
                            name: e.name.clone(),
                            sets,
                            reps: Some(reps.to_string()),
                            rest_seconds: rest,
                            duration_minutes: None,
                        }
                    }
                })
                .collect::<Vec<_>>();

            Workout {
                day,
                focus: focus.name.to_string(),
                modality: focus.modality,
                target_groups: focus.groups.clone(),
                placeholder: prescriptions.is_empty(),
                exercises: prescriptions,
                estimated_duration_minutes: minutes,
                estimated_calories,
            }
        })
        .collect();

    let plan = FitnessPlan {
        split,
        split_name: split.name().to_string(),
        days_per_week: days,
        session_minutes: minutes,
        workouts,
    };
    (plan, warnings)
}

/// Greedy pick favouring exercises that cover still-uncovered target groups
fn pick_exercises<'a>(
    exercises: &'a [ExerciseArchetype],
    keys: &[u64],
    focus: &Focus,
    count: usize,
) -> Vec<&'a ExerciseArchetype> {
    let mut candidates: Vec<(&ExerciseArchetype, u64)> = exercises
        .iter()
        .zip(keys.iter().copied())
        .filter(|(e, _)| {
            e.modality == focus.modality && e.muscle_groups.iter().any(|g| focus.groups.contains(g))
        })
        .collect();

    let mut covered: Vec<MuscleGroup> = Vec::new();
    let mut picked = Vec::new();
    while picked.len() < count && !candidates.is_empty() {
        let best = candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, (e, key))| {
                let fresh = e
                    .muscle_groups
                    .iter()
                    .filter(|g| focus.groups.contains(g) && !covered.contains(g))
                    .count();
                (std::cmp::Reverse(fresh), *key)
            })
            .map(|(i, _)| i);

        let Some(index) = best else { break };
        let (exercise, _) = candidates.remove(index);
        covered.extend(exercise.muscle_groups.iter().copied());
        picked.push(exercise);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::catalog::Catalog;
    use crate::profile::tests::sample_profile;

    #[test]
    fn test_days_and_session_length() {
        assert_eq!(days_per_week(1.0), 2);
        assert_eq!(days_per_week(3.0), 3);
        assert_eq!(days_per_week(10.0), 6);
        assert_eq!(session_minutes(3.0, 3), 60);
        assert_eq!(session_minutes(1.0, 2), 30);
        assert_eq!(session_minutes(10.0, 6), 90);
        assert_eq!(session_minutes(0.0, 2), 20);
    }

    #[test]
    fn test_split_selection() {
        use FitnessExperience::*;
        use WorkoutPreference::*;
        assert_eq!(SplitKind::select(Strength, Beginner, 3), SplitKind::FullBody);
        assert_eq!(SplitKind::select(Strength, Beginner, 5), SplitKind::UpperLower);
        assert_eq!(SplitKind::select(Strength, Intermediate, 4), SplitKind::UpperLower);
        assert_eq!(SplitKind::select(Strength, Advanced, 6), SplitKind::PushPullLegs);
        assert_eq!(SplitKind::select(Yoga, Advanced, 6), SplitKind::MobilityYoga);
        assert_eq!(SplitKind::select(Mixed, Beginner, 3), SplitKind::Hybrid);
    }

    #[test]
    fn test_beginner_full_body() {
        let (plan, warnings) = build(&sample_profile(), &Catalog::builtin().exercises, 11);
        assert!(warnings.is_empty());
        assert_eq!(plan.split_name, "Full Body");
        assert_eq!(plan.days_per_week, 3);
        assert_eq!(plan.workouts.len(), 3);
        assert_eq!(
            plan.workouts.iter().map(|w| w.day).collect::<Vec<_>>(),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
        for workout in &plan.workouts {
            assert_eq!(workout.exercises.len(), 4);
            for e in &workout.exercises {
                assert_eq!(e.sets, 3);
                assert_eq!(e.reps.as_deref(), Some("10"));
                assert_eq!(e.rest_seconds, 60);
            }
        }
    }

    #[test]
    fn test_advanced_push_pull_legs() {
        let mut profile = sample_profile();
        profile.experience = FitnessExperience::Advanced;
        profile.weekly_workout_hours = 6.0;
        let (plan, warnings) = build(&profile, &Catalog::builtin().exercises, 5);

        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(plan.split, SplitKind::PushPullLegs);
        let focuses: Vec<_> = plan.workouts.iter().map(|w| w.focus.as_str()).collect();
        assert_eq!(focuses, vec!["Push", "Pull", "Legs", "Push", "Pull", "Legs"]);
        for workout in &plan.workouts {
            assert_eq!(workout.exercises.len(), 6);
            assert!(workout.exercises.iter().all(|e| e.sets == 4 && e.rest_seconds == 90));
        }
    }

    #[test]
    fn test_cardio_is_timed() {
        let mut profile = sample_profile();
        profile.workout_preference = WorkoutPreference::Cardio;
        let (plan, _) = build(&profile, &Catalog::builtin().exercises, 5);
        let first = &plan.workouts[0].exercises[0];
        assert!(first.reps.is_none());
        assert_eq!(first.duration_minutes, Some(15));
    }

    #[test]
    fn test_no_duplicate_exercises_in_a_session() {
        let (plan, _) = build(&sample_profile(), &Catalog::builtin().exercises, 99);
        for workout in &plan.workouts {
            let mut ids: Vec<_> = workout.exercises.iter().map(|e| e.exercise_id.clone()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), workout.exercises.len());
        }
    }

    #[test]
    fn test_missing_modality_gives_placeholder() {
        let mut profile = sample_profile();
        profile.workout_preference = WorkoutPreference::Yoga;
        let catalog: Vec<_> = Catalog::builtin()
            .exercises
            .into_iter()
            .filter(|e| e.modality != Modality::Yoga)
            .collect();
        let (plan, warnings) = build(&profile, &catalog, 1);
        assert!(plan.workouts.iter().all(|w| w.placeholder));
        assert_eq!(warnings.len(), plan.workouts.len());
    }
}

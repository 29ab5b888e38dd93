//! Engine entry points
//!
//! Three stateless call shapes for hosts that just want an answer:
//!
//! - [`compute_targets`]: profile → energy and macro targets
//! - [`generate_plans`]: profile + targets + catalog → plan bundle
//! - [`compute_metric_analytics`]: ordered log entries → streak and rolling stats
//!
//! [`Engine`] carries an [`EngineConfig`] and adds the operations that work
//! against collaborators (profile store, catalog service, log store).

use crate::analytics::{
    DailyLogEntry, LogStore, Metric, MetricAnalytics, MetricAnalyzer, MetricOverview,
    WellnessSummary,
};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::plan::{
    Catalog, CatalogSource, GeneratorOptions, PlanBundle, PlanGenerator, PlanHistory, PlanRecord,
};
use crate::profile::UserProfile;
use crate::targets::{TargetCalculator, TargetSet};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Compute energy and macro targets with default configuration
pub fn compute_targets(profile: &UserProfile) -> Result<TargetSet, EngineError> {
    TargetCalculator::default().compute(profile)
}

/// Generate all three plans with the default (derived) seed
pub fn generate_plans(
    profile: &UserProfile,
    targets: &TargetSet,
    catalog: &Catalog,
) -> Result<PlanBundle, EngineError> {
    generate_plans_with(profile, targets, catalog, GeneratorOptions::default())
}

/// Generate all three plans with explicit options
pub fn generate_plans_with(
    profile: &UserProfile,
    targets: &TargetSet,
    catalog: &Catalog,
    options: GeneratorOptions,
) -> Result<PlanBundle, EngineError> {
    PlanGenerator::default().generate(profile, targets, catalog, options)
}

/// Streak, rolling average and stability for one metric
pub fn compute_metric_analytics(
    entries: &[DailyLogEntry],
    metric: Metric,
    as_of: NaiveDate,
    window_days: u32,
) -> Result<MetricAnalytics, EngineError> {
    MetricAnalyzer::default().analyze(entries, metric, as_of, window_days)
}

/// Identity/profile store seam
pub trait ProfileSource {
    /// Fully populated profile for a user
    fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, EngineError>;
}

/// A user's profile with the targets and plans derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub profile: UserProfile,
    pub targets: TargetSet,
    pub plans: PlanBundle,
}

/// Config-carrying engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    targets: TargetCalculator,
    plans: PlanGenerator,
    analytics: MetricAnalyzer,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            targets: TargetCalculator::new(config.targets.clone()),
            plans: PlanGenerator::new(config.plans.clone()),
            analytics: MetricAnalyzer::new(config.analytics.clone()),
            config,
        })
    }

    pub fn from_config_json(json: &str) -> Result<Self, EngineError> {
        Self::new(EngineConfig::from_json(json)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compute_targets(&self, profile: &UserProfile) -> Result<TargetSet, EngineError> {
        self.targets.compute(profile)
    }

    pub fn generate_plans(
        &self,
        profile: &UserProfile,
        targets: &TargetSet,
        catalog: &Catalog,
        options: GeneratorOptions,
    ) -> Result<PlanBundle, EngineError> {
        self.plans.generate(profile, targets, catalog, options)
    }

    /// Recompute targets and plans and make them the active bundle.
    ///
    /// Any failure (catalog load, invalid profile, strict catalog gap) leaves
    /// the history unchanged.
    pub fn regenerate_plans<'h>(
        &self,
        history: &'h mut PlanHistory,
        profile: &UserProfile,
        catalog: &dyn CatalogSource,
        options: GeneratorOptions,
        now_ms: i64,
    ) -> Result<&'h PlanRecord, EngineError> {
        history.regenerate(now_ms, || {
            let catalog = catalog.load()?;
            let targets = self.targets.compute(profile)?;
            self.plans.generate(profile, &targets, &catalog, options)
        })
    }

    pub fn metric_analytics(
        &self,
        entries: &[DailyLogEntry],
        metric: Metric,
        as_of: NaiveDate,
        window_days: u32,
    ) -> Result<MetricAnalytics, EngineError> {
        self.analytics.analyze(entries, metric, as_of, window_days)
    }

    pub fn metric_overview(
        &self,
        entries: &[DailyLogEntry],
        metric: Metric,
        as_of: NaiveDate,
    ) -> Result<MetricOverview, EngineError> {
        self.analytics.overview(entries, metric, as_of)
    }

    pub fn wellness_summary(
        &self,
        entries: &[DailyLogEntry],
        as_of: NaiveDate,
    ) -> Result<WellnessSummary, EngineError> {
        WellnessSummary::compute(&self.analytics, entries, as_of)
    }

    /// Analytics over entries fetched from a log store.
    ///
    /// Only the configured maximum lookback is fetched, so streaks longer
    /// than `max_window_days` are reported at that length.
    pub fn analytics_from_store(
        &self,
        store: &dyn LogStore,
        user_id: &str,
        metric: Metric,
        as_of: NaiveDate,
        window_days: u32,
    ) -> Result<MetricAnalytics, EngineError> {
        let window = self.analytics.window(as_of, window_days)?;
        let lookback = self.config.analytics.max_window_days.max(window.days());
        let start = as_of - Duration::days(i64::from(lookback) - 1);
        let entries = store.range(user_id, metric, start, as_of)?;
        debug!(user_id, metric = metric.as_str(), %start, %as_of, entries = entries.len(), "fetched log range");
        self.analytics.analyze_window(&entries, metric, window)
    }

    /// Fetch a profile and derive its targets and plans
    pub fn baseline_for(
        &self,
        profiles: &dyn ProfileSource,
        catalog: &dyn CatalogSource,
        user_id: &str,
        options: GeneratorOptions,
    ) -> Result<Baseline, EngineError> {
        let profile = profiles.fetch_profile(user_id)?;
        let targets = self.targets.compute(&profile)?;
        let plans = self.plans.generate(&profile, &targets, &catalog.load()?, options)?;
        Ok(Baseline {
            profile,
            targets,
            plans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{InMemoryLogStore, LogPayload};
    use crate::config::PlanConfig;
    use crate::profile::tests::sample_profile;
    use std::collections::HashMap;

    struct Profiles(HashMap<String, UserProfile>);

    impl ProfileSource for Profiles {
        fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, EngineError> {
            self.0
                .get(user_id)
                .cloned()
                .ok_or_else(|| EngineError::InvalidProfile(format!("unknown user '{}'", user_id)))
        }
    }

    struct EmptyCatalog;

    impl CatalogSource for EmptyCatalog {
        fn load(&self) -> Result<Catalog, EngineError> {
            Ok(Catalog {
                version: "empty".into(),
                meals: vec![],
                exercises: vec![],
                habits: vec![],
            })
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_free_functions_match_engine() {
        let profile = sample_profile();
        let engine = Engine::default();
        let targets = compute_targets(&profile).unwrap();
        assert_eq!(targets, engine.compute_targets(&profile).unwrap());

        let catalog = Catalog::builtin();
        let plans = generate_plans(&profile, &targets, &catalog).unwrap();
        let again = engine
            .generate_plans(&profile, &targets, &catalog, GeneratorOptions::default())
            .unwrap();
        assert_eq!(plans, again);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let json = r#"{"targets": {"calorie_floor_kcal": 5000, "calorie_ceiling_kcal": 1000}}"#;
        assert!(matches!(
            Engine::from_config_json(json),
            Err(EngineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_regenerate_failure_keeps_active_plan() {
        let profile = sample_profile();
        let mut history = PlanHistory::new();
        let lenient = Engine::default();
        let first = lenient
            .regenerate_plans(&mut history, &profile, &Catalog::builtin(), GeneratorOptions::default(), 1)
            .unwrap()
            .id;

        let strict = Engine::new(EngineConfig {
            plans: PlanConfig {
                strict_catalog: true,
                ..PlanConfig::default()
            },
            ..EngineConfig::default()
        })
        .unwrap();
        let result = strict.regenerate_plans(&mut history, &profile, &EmptyCatalog, GeneratorOptions::default(), 2);

        assert!(matches!(result, Err(EngineError::InsufficientCatalog(_))));
        assert_eq!(history.active().unwrap().id, first);
        assert_eq!(history.history().len(), 1);
    }

    #[test]
    fn test_analytics_from_store() {
        let mut store = InMemoryLogStore::new();
        for day in 1..=5 {
            let entry = DailyLogEntry::new(
                "user-1",
                date(&format!("2024-01-0{}", day)),
                i64::from(day),
                LogPayload::Water { milliliters: 500.0 * f64::from(day) },
            );
            store.append(entry).unwrap();
        }

        let analytics = Engine::default()
            .analytics_from_store(&store, "user-1", Metric::Water, date("2024-01-05"), 3)
            .unwrap();
        assert_eq!(analytics.days_logged, 3);
        assert_eq!(analytics.rolling_average, Some(2000.0));
        assert_eq!(analytics.streak.current_streak, 5);

        let other = Engine::default()
            .analytics_from_store(&store, "user-2", Metric::Water, date("2024-01-05"), 3)
            .unwrap();
        assert_eq!(other.days_logged, 0);
    }

    #[test]
    fn test_baseline_for() {
        let profile = sample_profile();
        let profiles = Profiles(HashMap::from([(profile.user_id.clone(), profile.clone())]));
        let engine = Engine::default();

        let baseline = engine
            .baseline_for(&profiles, &Catalog::builtin(), &profile.user_id, GeneratorOptions::default())
            .unwrap();
        assert_eq!(baseline.profile, profile);
        assert_eq!(baseline.plans.user_id, profile.user_id);
        assert!(baseline.plans.warnings.is_empty());

        assert!(matches!(
            engine.baseline_for(&profiles, &Catalog::builtin(), "nobody", GeneratorOptions::default()),
            Err(EngineError::InvalidProfile(_))
        ));
    }
}

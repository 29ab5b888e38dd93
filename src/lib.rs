//! Wellplan - deterministic personal metrics and plan engine
//!
//! Wellplan turns a user profile into daily energy and macro targets, builds
//! nutrition, fitness and wellness plans from a content catalog, and computes
//! streaks and rolling statistics over daily self-reported logs.
//!
//! ## Modules
//!
//! - **Targets**: BMR (Mifflin-St Jeor) → TDEE → calorie and macro targets
//! - **Plans**: meal templates, weekly workout split, sleep/meditation/habits
//! - **Analytics**: per-metric streaks, windowed averages, stability scores
//!
//! Every computation is a pure function of its inputs. Hosts supply profiles,
//! catalogs and log slices through the collaborator traits
//! ([`engine::ProfileSource`], [`plan::CatalogSource`], [`analytics::LogStore`]).

pub mod adapters;
pub mod analytics;
pub mod config;
pub mod engine;
pub mod entitlement;
pub mod error;
pub mod plan;
pub mod profile;
pub mod report;
pub mod targets;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use analytics::{DailyLogEntry, Metric, MetricAnalytics, StreakState};
pub use config::EngineConfig;
pub use engine::{compute_metric_analytics, compute_targets, generate_plans, Engine};
pub use error::EngineError;
pub use plan::{Catalog, PlanBundle};
pub use profile::UserProfile;
pub use targets::TargetSet;

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "wellplan-engine";

//! Profile input adapters
//!
//! Adapters turn raw onboarding payloads into canonical profiles. All unit
//! conversion happens here and nowhere else.

mod onboarding;
pub mod units;

pub use onboarding::{OnboardingAdapter, OnboardingAnswers};
pub use units::{Height, Weight};

use crate::error::EngineError;
use crate::profile::UserProfile;

/// Trait for profile sources
pub trait ProfileAdapter {
    /// Parse raw JSON and convert to a validated canonical profile
    fn parse(&self, raw_json: &str, now_ms: i64) -> Result<UserProfile, EngineError>;
}

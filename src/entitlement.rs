//! Entitlement gating for presentation layers
//!
//! The engine computes every value regardless of tier. Hosts pass an
//! [`Entitlements`] implementation to their own rendering code and wrap
//! outputs in [`Gated`] to decide what is shown.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" | "premium" => Ok(Tier::Pro),
            other => Err(EngineError::ConfigError(format!("unknown tier '{}'", other))),
        }
    }
}

/// Surfaces a host may choose to gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    DailyTargets,
    ShortTermAnalytics,
    PersonalizedPlans,
    LongTermAnalytics,
    Recommendations,
    WellnessSummary,
}

impl Feature {
    /// Lowest tier that unlocks the feature
    pub fn required_tier(&self) -> Tier {
        match self {
            Feature::DailyTargets | Feature::ShortTermAnalytics => Tier::Free,
            Feature::PersonalizedPlans
            | Feature::LongTermAnalytics
            | Feature::Recommendations
            | Feature::WellnessSummary => Tier::Pro,
        }
    }
}

/// Billing/entitlement service seam
pub trait Entitlements {
    fn tier(&self) -> Tier;

    fn allows(&self, feature: Feature) -> bool {
        self.tier() >= feature.required_tier()
    }
}

impl Entitlements for Tier {
    fn tier(&self) -> Tier {
        *self
    }
}

/// Account flags as the billing service reports them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    #[serde(default)]
    pub subscription_active: bool,
    #[serde(default)]
    pub is_admin: bool,
}

impl Entitlements for AccountStatus {
    fn tier(&self) -> Tier {
        if self.subscription_active || self.is_admin {
            Tier::Pro
        } else {
            Tier::Free
        }
    }
}

/// A value as the presentation layer may show it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum Gated<T> {
    Available { value: T },
    Locked { feature: Feature, required_tier: Tier },
}

impl<T> Gated<T> {
    pub fn new(entitlements: &dyn Entitlements, feature: Feature, value: T) -> Self {
        if entitlements.allows(feature) {
            Gated::Available { value }
        } else {
            Gated::Locked {
                feature,
                required_tier: feature.required_tier(),
            }
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Gated::Locked { .. })
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Gated::Available { value } => Some(value),
            Gated::Locked { .. } => None,
        }
    }
}

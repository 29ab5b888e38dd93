//! Unit conversion at the profile boundary
//!
//! The engine only ever sees kilograms and centimeters.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

pub const KG_PER_LB: f64 = 0.453592;
pub const CM_PER_FOOT: f64 = 30.48;
pub const CM_PER_INCH: f64 = 2.54;

/// A body weight in the unit the user entered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Weight {
    Kilograms(f64),
    Pounds(f64),
}

impl Weight {
    /// Parse a value with a unit label (`kg`, `lb`, `lbs`)
    pub fn parse(value: f64, unit: &str) -> Result<Self, EngineError> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(Weight::Kilograms(value)),
            "lb" | "lbs" | "pounds" => Ok(Weight::Pounds(value)),
            other => Err(EngineError::InvalidProfile(format!(
                "unknown weight unit '{}'",
                other
            ))),
        }
    }

    pub fn to_kg(self) -> f64 {
        match self {
            Weight::Kilograms(kg) => kg,
            Weight::Pounds(lb) => lb * KG_PER_LB,
        }
    }
}

/// A body height in the unit the user entered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum Height {
    Centimeters { value: f64 },
    FeetInches { feet: f64, inches: f64 },
}

impl Height {
    /// Decimal feet as some height pickers report it (5.5 = 5 ft 6 in)
    pub fn from_decimal_feet(feet: f64) -> Self {
        let whole = feet.floor();
        Height::FeetInches {
            feet: whole,
            inches: (feet - whole) * 12.0,
        }
    }

    pub fn to_cm(self) -> f64 {
        match self {
            Height::Centimeters { value } => value,
            Height::FeetInches { feet, inches } => feet * CM_PER_FOOT + inches * CM_PER_INCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pounds_to_kg() {
        assert!((Weight::Pounds(176.0).to_kg() - 79.832192).abs() < 1e-9);
        assert_eq!(Weight::Kilograms(80.0).to_kg(), 80.0);
    }

    #[test]
    fn test_weight_unit_labels() {
        assert_eq!(Weight::parse(150.0, "lbs").unwrap(), Weight::Pounds(150.0));
        assert_eq!(Weight::parse(70.0, "KG").unwrap(), Weight::Kilograms(70.0));
        assert!(Weight::parse(70.0, "stone").is_err());
    }

    #[test]
    fn test_feet_inches_to_cm() {
        let height = Height::FeetInches { feet: 5.0, inches: 11.0 };
        assert!((height.to_cm() - 180.34).abs() < 1e-9);
    }

    #[test]
    fn test_decimal_feet() {
        let height = Height::from_decimal_feet(5.5);
        assert!((height.to_cm() - (5.0 * 30.48 + 6.0 * 2.54)).abs() < 1e-9);
    }
}

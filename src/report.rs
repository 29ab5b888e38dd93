//! Report envelopes
//!
//! Wraps any engine output with producer metadata so hosts can tell which
//! engine build computed a value and when.

use crate::error::EngineError;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Output envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<T> {
    pub engine_version: String,
    pub producer: Producer,
    /// RFC 3339
    pub computed_at_utc: String,
    pub payload: T,
}

/// Report encoder with a stable instance id
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn wrap<T>(&self, payload: T) -> Report<T> {
        Report {
            engine_version: ENGINE_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            payload,
        }
    }

    pub fn encode_to_json<T: Serialize>(&self, payload: &T, pretty: bool) -> Result<String, EngineError> {
        let report = self.wrap(payload);
        let json = if pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_envelope_fields() {
        let encoder = ReportEncoder::with_instance_id("test-instance".into());
        let report = encoder.wrap(42u32);

        assert_eq!(report.payload, 42);
        assert_eq!(report.producer.name, "wellplan-engine");
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.engine_version, ENGINE_VERSION);
        assert!(DateTime::parse_from_rfc3339(&report.computed_at_utc).is_ok());
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder.encode_to_json(&vec!["a", "b"], false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["payload"][1], "b");
        assert_eq!(value["producer"]["instance_id"], encoder.instance_id());
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_instance_ids_unique() {
        assert_ne!(ReportEncoder::new().instance_id(), ReportEncoder::new().instance_id());
    }
}

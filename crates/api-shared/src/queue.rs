//! Queue entries as served by the external queue-assigner, and their enriched form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Display name used when no local name is stored for a queued patient.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// One entry of the external queue.
///
/// Only `patient_id` is interpreted. Everything else (priority score, position, wait
/// time, timestamp, vital signs, anything the external service adds later) is kept in
/// `fields` and re-emitted exactly as received, whatever its JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QueueEntry {
    pub patient_id: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: Map<String, Value>,
}

impl QueueEntry {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style setter for a pass-through field.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// A pass-through field read as a number, if it is one.
    ///
    /// # Returns
    /// `None` when the field is absent or not numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// Attaches a display name, falling back to [`ANONYMOUS_NAME`].
    pub fn enrich(mut self, name: Option<String>) -> EnrichedEntry {
        // An upstream `name` would otherwise be serialised twice.
        self.fields.remove("name");
        EnrichedEntry {
            entry: self,
            name: name.unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
        }
    }
}

/// A queue entry joined with the locally stored name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub name: String,
}

/// Generic `{ "message": ... }` body, used for errors and acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response to the admin "call next" action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CallNextRes {
    pub message: String,
    #[serde(rename = "calledPatient")]
    pub called_patient: EnrichedEntry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upstream_entry() -> Value {
        json!({
            "patient_id": "abc123",
            "priority_score": 0.82,
            "queue_position": 1,
            "estimated_wait_time": 12.5,
            "timestamp": "2024-05-01T10:00:00",
            "Heart_Rate": 72.0,
            "Oxygen_Saturation": 98.0
        })
    }

    #[test]
    fn unknown_upstream_fields_survive_enrichment() {
        let entry: QueueEntry = serde_json::from_value(upstream_entry()).unwrap();
        assert_eq!(entry.number("queue_position"), Some(1.0));
        assert_eq!(entry.fields.get("Heart_Rate"), Some(&json!(72.0)));

        let enriched = entry.enrich(Some("Jane Doe".into()));
        let out = serde_json::to_value(&enriched).unwrap();
        assert_eq!(out["name"], "Jane Doe");
        assert_eq!(out["Heart_Rate"], 72.0);
        assert_eq!(out["patient_id"], "abc123");
    }

    #[test]
    fn loosely_typed_upstream_fields_pass_through_unchanged() {
        let raw = json!({
            "patient_id": "abc123",
            "timestamp": 1714557600.5,
            "queue_position": 1.0,
            "priority_score": "high",
            "estimated_wait_time": null
        });
        let entry: QueueEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.number("queue_position"), Some(1.0));
        assert_eq!(entry.number("priority_score"), None);

        let out = serde_json::to_value(entry.enrich(None)).unwrap();
        assert_eq!(out["timestamp"], raw["timestamp"]);
        assert_eq!(out["queue_position"], raw["queue_position"]);
        assert_eq!(out["priority_score"], "high");
        assert!(out["estimated_wait_time"].is_null());
        assert!(out.as_object().unwrap().contains_key("estimated_wait_time"));
    }

    #[test]
    fn missing_name_becomes_anonymous() {
        let entry: QueueEntry = serde_json::from_value(json!({"patient_id": "x1"})).unwrap();
        let enriched = entry.enrich(None);
        assert_eq!(enriched.name, ANONYMOUS_NAME);
    }

    #[test]
    fn upstream_name_is_replaced_not_duplicated() {
        let entry: QueueEntry =
            serde_json::from_value(json!({"patient_id": "x1", "name": "upstream"})).unwrap();
        let out = serde_json::to_string(&entry.enrich(Some("Local".into()))).unwrap();
        assert_eq!(out.matches("\"name\"").count(), 1);
        assert!(out.contains("\"name\":\"Local\""));
    }

    #[test]
    fn enriched_entry_reads_back_without_leaking_name_into_extra() {
        let entry: QueueEntry = serde_json::from_value(upstream_entry()).unwrap();
        let json = serde_json::to_string(&entry.enrich(Some("Jane Doe".into()))).unwrap();
        let back: EnrichedEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Jane Doe");
        assert!(!back.entry.fields.contains_key("name"));
    }

    #[test]
    fn call_next_response_uses_called_patient_key() {
        let entry: QueueEntry = serde_json::from_value(json!({"patient_id": "x1"})).unwrap();
        let res = CallNextRes {
            message: "Next patient called successfully".into(),
            called_patient: entry.enrich(None),
        };
        let out = serde_json::to_value(res).unwrap();
        assert_eq!(out["calledPatient"]["patient_id"], "x1");
        assert_eq!(out["calledPatient"]["name"], "Anonymous");
    }
}

//! Check-in form body posted by the kiosk frontend.
//!
//! The browser keeps form inputs as text, so numeric fields arrive either as JSON
//! numbers or as numeric strings. Both are accepted here; range checks happen in
//! `kiosk-core` so that errors can name the offending field.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// `POST /api/patients` request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInReq {
    #[serde(default)]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    #[serde(default)]
    pub gender: String,
    /// Kilograms.
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    /// Metres.
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub vital_signs: VitalSignsReq,
}

/// Vital signs captured on the kiosk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VitalSignsReq {
    /// Beats per minute.
    #[serde(default, deserialize_with = "lenient_number")]
    pub heart_rate: Option<f64>,
    /// mmHg.
    #[serde(default, deserialize_with = "lenient_number")]
    pub blood_pressure_systolic: Option<f64>,
    /// mmHg.
    #[serde(default, deserialize_with = "lenient_number")]
    pub blood_pressure_diastolic: Option<f64>,
    /// Degrees Celsius.
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature: Option<f64>,
    /// Percent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub oxygen_saturation: Option<f64>,
    /// Breaths per minute.
    #[serde(default, deserialize_with = "lenient_number")]
    pub respiratory_rate: Option<f64>,
}

/// Accepts `12`, `12.5`, `"12.5"`, `""` and `null`. Blank strings and `null` map to `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("expected a number, got {s:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let req: CheckInReq = serde_json::from_value(json!({
            "fullName": "Jane Doe",
            "age": "40",
            "gender": "Female",
            "weight": 60,
            "height": "1.65",
            "contactNumber": "",
            "vitalSigns": {
                "heartRate": 72,
                "bloodPressureSystolic": 120,
                "bloodPressureDiastolic": 80,
                "temperature": 36.6,
                "oxygenSaturation": 98,
                "respiratoryRate": 16
            }
        }))
        .unwrap();

        assert_eq!(req.full_name, "Jane Doe");
        assert_eq!(req.age, Some(40.0));
        assert_eq!(req.height, Some(1.65));
        assert_eq!(req.vital_signs.temperature, Some(36.6));
        assert_eq!(req.contact_number.as_deref(), Some(""));
    }

    #[test]
    fn blank_and_missing_numbers_are_none() {
        let req: CheckInReq =
            serde_json::from_value(json!({"fullName": "A", "age": "", "weight": null})).unwrap();
        assert_eq!(req.age, None);
        assert_eq!(req.weight, None);
        assert_eq!(req.height, None);
        assert_eq!(req.vital_signs, VitalSignsReq::default());
    }

    #[test]
    fn rejects_non_numeric_text() {
        let result: Result<CheckInReq, _> =
            serde_json::from_value(json!({"fullName": "A", "age": "forty"}));
        assert!(result.is_err());
    }
}

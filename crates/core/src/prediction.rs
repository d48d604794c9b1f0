//! Mapping from a validated check-in to the queue-assigner's prediction schema.

use crate::constants::{DERIVED_BMI, DERIVED_HRV, DERIVED_MAP, DERIVED_PULSE_PRESSURE};
use crate::validation::CheckIn;
use serde::Serialize;

/// Body of `POST /predict/`.
///
/// Field names are fixed by the external service. The `Derived_*` values are
/// placeholders: this system does not compute them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: f64,
    #[serde(rename = "Respiratory_Rate")]
    pub respiratory_rate: f64,
    #[serde(rename = "Body_Temperature")]
    pub body_temperature: f64,
    #[serde(rename = "Oxygen_Saturation")]
    pub oxygen_saturation: f64,
    #[serde(rename = "Systolic_Blood_Pressure")]
    pub systolic_blood_pressure: f64,
    #[serde(rename = "Diastolic_Blood_Pressure")]
    pub diastolic_blood_pressure: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Gender")]
    pub gender: u8,
    #[serde(rename = "Weight_kg")]
    pub weight_kg: f64,
    #[serde(rename = "Height_m")]
    pub height_m: f64,
    #[serde(rename = "Derived_HRV")]
    pub derived_hrv: f64,
    #[serde(rename = "Derived_Pulse_Pressure")]
    pub derived_pulse_pressure: f64,
    #[serde(rename = "Derived_BMI")]
    pub derived_bmi: f64,
    #[serde(rename = "Derived_MAP")]
    pub derived_map: f64,
}

impl From<&CheckIn> for PredictionRequest {
    fn from(check_in: &CheckIn) -> Self {
        let vitals = &check_in.vital_signs;
        Self {
            heart_rate: vitals.heart_rate,
            respiratory_rate: vitals.respiratory_rate,
            body_temperature: vitals.temperature,
            oxygen_saturation: vitals.oxygen_saturation,
            systolic_blood_pressure: vitals.blood_pressure_systolic,
            diastolic_blood_pressure: vitals.blood_pressure_diastolic,
            age: check_in.age,
            gender: check_in.gender.code(),
            weight_kg: check_in.weight_kg,
            height_m: check_in.height_m,
            derived_hrv: DERIVED_HRV,
            derived_pulse_pressure: DERIVED_PULSE_PRESSURE,
            derived_bmi: DERIVED_BMI,
            derived_map: DERIVED_MAP,
        }
    }
}

//! Check-in validation.
//!
//! The kiosk frontend already validates its forms, but the relay re-checks every
//! submission before anything is sent to the queue-assigner. The ranges match the
//! limits of the kiosk inputs. All failing fields are reported together so a caller
//! can show them at once.

use crate::{KioskError, KioskResult};
use api_shared::{CheckInReq, VitalSignsReq};
use kiosk_types::NonEmptyText;
use std::ops::RangeInclusive;

const AGE_YEARS: RangeInclusive<f64> = 1.0..=120.0;
const MAX_WEIGHT_KG: f64 = 500.0;
const HEIGHT_M: RangeInclusive<f64> = 0.5..=2.5;
const HEART_RATE_BPM: RangeInclusive<f64> = 40.0..=180.0;
const SYSTOLIC_MMHG: RangeInclusive<f64> = 70.0..=200.0;
const DIASTOLIC_MMHG: RangeInclusive<f64> = 40.0..=120.0;
const TEMPERATURE_C: RangeInclusive<f64> = 34.0..=42.0;
const OXYGEN_SATURATION_PCT: RangeInclusive<f64> = 70.0..=100.0;
const RESPIRATORY_RATE_BPM: RangeInclusive<f64> = 6.0..=40.0;

/// Gender as recorded on the kiosk form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Maps the form label. Anything other than `Male` or `Female` is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            _ => Gender::Other,
        }
    }

    /// Numeric code expected by the queue-assigner.
    pub fn code(self) -> u8 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
            Gender::Other => 2,
        }
    }
}

/// Vital signs that passed range checks.
#[derive(Debug, Clone, PartialEq)]
pub struct VitalSigns {
    pub heart_rate: f64,
    pub blood_pressure_systolic: f64,
    pub blood_pressure_diastolic: f64,
    pub temperature: f64,
    pub oxygen_saturation: f64,
    pub respiratory_rate: f64,
}

/// A check-in that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckIn {
    pub full_name: NonEmptyText,
    pub age: f64,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_m: f64,
    pub vital_signs: VitalSigns,
}

/// Validates a check-in form.
///
/// # Errors
///
/// Returns `KioskError::InvalidInput` listing every missing or out-of-range field.
pub fn validate_check_in(req: &CheckInReq) -> KioskResult<CheckIn> {
    let mut problems = Vec::new();

    let full_name = NonEmptyText::new(&req.full_name)
        .map_err(|_| problems.push("fullName is required".to_string()))
        .ok();
    let age = field(&mut problems, "age", req.age, AGE_YEARS);
    let weight_kg = checked(
        &mut problems,
        "weight",
        req.weight,
        |v| v > 0.0 && v <= MAX_WEIGHT_KG,
        format!("must be greater than 0 and at most {MAX_WEIGHT_KG}"),
    );
    let height_m = field(&mut problems, "height", req.height, HEIGHT_M);
    let vital_signs = vitals(&mut problems, &req.vital_signs);

    match (full_name, age, weight_kg, height_m, vital_signs) {
        (Some(full_name), Some(age), Some(weight_kg), Some(height_m), Some(vital_signs))
            if problems.is_empty() =>
        {
            Ok(CheckIn {
                full_name,
                age,
                gender: Gender::from_label(&req.gender),
                weight_kg,
                height_m,
                vital_signs,
            })
        }
        _ => Err(KioskError::InvalidInput(problems.join("; "))),
    }
}

fn vitals(problems: &mut Vec<String>, req: &VitalSignsReq) -> Option<VitalSigns> {
    let heart_rate = field(problems, "vitalSigns.heartRate", req.heart_rate, HEART_RATE_BPM);
    let systolic = field(
        problems,
        "vitalSigns.bloodPressureSystolic",
        req.blood_pressure_systolic,
        SYSTOLIC_MMHG,
    );
    let diastolic = field(
        problems,
        "vitalSigns.bloodPressureDiastolic",
        req.blood_pressure_diastolic,
        DIASTOLIC_MMHG,
    );
    let temperature = field(
        problems,
        "vitalSigns.temperature",
        req.temperature,
        TEMPERATURE_C,
    );
    let oxygen_saturation = field(
        problems,
        "vitalSigns.oxygenSaturation",
        req.oxygen_saturation,
        OXYGEN_SATURATION_PCT,
    );
    let respiratory_rate = field(
        problems,
        "vitalSigns.respiratoryRate",
        req.respiratory_rate,
        RESPIRATORY_RATE_BPM,
    );

    Some(VitalSigns {
        heart_rate: heart_rate?,
        blood_pressure_systolic: systolic?,
        blood_pressure_diastolic: diastolic?,
        temperature: temperature?,
        oxygen_saturation: oxygen_saturation?,
        respiratory_rate: respiratory_rate?,
    })
}

fn field(
    problems: &mut Vec<String>,
    name: &str,
    value: Option<f64>,
    range: RangeInclusive<f64>,
) -> Option<f64> {
    let rule = format!("must be between {} and {}", range.start(), range.end());
    checked(problems, name, value, |v| range.contains(&v), rule)
}

fn checked(
    problems: &mut Vec<String>,
    name: &str,
    value: Option<f64>,
    accept: impl Fn(f64) -> bool,
    rule: String,
) -> Option<f64> {
    match value {
        None => {
            problems.push(format!("{name} is required"));
            None
        }
        Some(v) if !v.is_finite() || !accept(v) => {
            problems.push(format!("{name} {rule}"));
            None
        }
        Some(v) => Some(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::jane_doe;

    #[test]
    fn valid_check_in_passes() {
        let check_in = validate_check_in(&jane_doe()).unwrap();
        assert_eq!(check_in.full_name.as_str(), "Jane Doe");
        assert_eq!(check_in.gender, Gender::Female);
        assert_eq!(check_in.height_m, 1.65);
        assert_eq!(check_in.vital_signs.heart_rate, 72.0);
    }

    #[test]
    fn gender_codes() {
        assert_eq!(Gender::from_label("Male").code(), 0);
        assert_eq!(Gender::from_label("Female").code(), 1);
        assert_eq!(Gender::from_label("").code(), 2);
        assert_eq!(Gender::from_label("female").code(), 2);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let req = CheckInReq {
            full_name: "  ".into(),
            ..jane_doe()
        };
        let req = CheckInReq { age: None, ..req };

        let err = validate_check_in(&req).unwrap_err();
        let KioskError::InvalidInput(message) = err else {
            panic!("expected InvalidInput");
        };
        assert!(message.contains("fullName is required"));
        assert!(message.contains("age is required"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut req = jane_doe();
        req.age = Some(0.0);
        req.height = Some(165.0);
        req.vital_signs.oxygen_saturation = Some(101.0);

        let message = validate_check_in(&req).unwrap_err().to_string();
        assert!(message.contains("age must be between 1 and 120"));
        assert!(message.contains("height must be between 0.5 and 2.5"));
        assert!(message.contains("vitalSigns.oxygenSaturation must be between 70 and 100"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut req = jane_doe();
        req.weight = Some(f64::NAN);
        assert!(validate_check_in(&req).is_err());
    }

    #[test]
    fn weight_only_needs_to_be_positive() {
        let mut req = jane_doe();
        req.weight = Some(0.4);
        assert_eq!(validate_check_in(&req).unwrap().weight_kg, 0.4);

        req.weight = Some(500.0);
        assert!(validate_check_in(&req).is_ok());

        for bad in [0.0, -1.0, 500.5] {
            req.weight = Some(bad);
            let message = validate_check_in(&req).unwrap_err().to_string();
            assert!(message.contains("weight must be greater than 0 and at most 500"));
        }
    }

    #[test]
    fn blood_pressure_fields_are_checked_independently() {
        let mut req = jane_doe();
        req.vital_signs.blood_pressure_systolic = Some(90.0);
        req.vital_signs.blood_pressure_diastolic = Some(90.0);
        assert!(validate_check_in(&req).is_ok());

        req.vital_signs.blood_pressure_diastolic = Some(95.0);
        assert!(validate_check_in(&req).is_ok());
    }
}

use crate::catalog::RangeBounds;
use serde::{Deserialize, Serialize};

/// One reading submitted for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(rename = "type")]
    pub measurement_type: String,
    pub value: f64,
}

impl Measurement {
    pub fn new(measurement_type: &str, value: f64) -> Self {
        Self {
            measurement_type: measurement_type.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    NonIntegralValue,
    OutOfRange,
}

/// A measurement that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    #[serde(rename = "error")]
    pub message: String,
    /// Type as the caller spelled it.
    pub measurement_type: String,
    pub invalid_value: f64,
    pub available_ranges: Vec<RangeBounds>,
}

impl ValidationError {
    pub fn non_integral(measurement: &Measurement) -> Self {
        let t = &measurement.measurement_type;
        Self {
            kind: ValidationErrorKind::NonIntegralValue,
            message: format!(
                "Invalid value {} for measurement type {}. {} must be a whole number (integer).",
                measurement.value, t, t
            ),
            measurement_type: t.clone(),
            invalid_value: measurement.value,
            available_ranges: Vec::new(),
        }
    }

    pub fn out_of_range(measurement: &Measurement, available_ranges: Vec<RangeBounds>) -> Self {
        Self {
            kind: ValidationErrorKind::OutOfRange,
            message: format!(
                "Invalid value {} for measurement type {}. Value is outside defined ranges.",
                measurement.value, measurement.measurement_type
            ),
            measurement_type: measurement.measurement_type.clone(),
            invalid_value: measurement.value,
            available_ranges,
        }
    }
}

/// Outcome of one scoring call: the sum of matched scores and every rejected measurement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub total_score: i32,
    pub errors: Vec<ValidationError>,
}

impl ScoreResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

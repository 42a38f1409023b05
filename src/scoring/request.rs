use super::types::Measurement;
use crate::catalog::normalize_type;
use anyhow::{bail, Context, Result};
use thiserror::Error;

/// Request-level checks applied before the engine sees a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Measurements are required")]
    Empty,

    #[error("All measurement types ({}) are required; missing: {}", .required.join(", "), .missing.join(", "))]
    MissingTypes {
        required: Vec<String>,
        missing: Vec<String>,
    },
}

/// Reject an empty batch, or one lacking any of the `required` types.
///
/// Type comparison is case-insensitive.
pub fn check_request(measurements: &[Measurement], required: &[String]) -> Result<(), RequestError> {
    if measurements.is_empty() {
        return Err(RequestError::Empty);
    }

    let provided: Vec<String> = measurements
        .iter()
        .map(|m| normalize_type(&m.measurement_type))
        .collect();

    let required: Vec<String> = required.iter().map(|t| normalize_type(t)).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|t| !provided.contains(t))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RequestError::MissingTypes { required, missing })
    }
}

/// Parse a `TYPE=VALUE` pair such as `HR=72` or `temp=37.4`.
pub fn parse_measurement(s: &str) -> Result<Measurement> {
    let Some((measurement_type, value)) = s.split_once('=') else {
        bail!("Expected TYPE=VALUE, got '{}'", s);
    };

    let measurement_type = measurement_type.trim();
    if measurement_type.is_empty() {
        bail!("Missing measurement type in '{}'", s);
    }

    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value in '{}'", s))?;
    if !value.is_finite() {
        bail!("Value must be a finite number in '{}'", s);
    }

    Ok(Measurement::new(measurement_type, value))
}

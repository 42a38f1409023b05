use crate::catalog::normalize_type;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Measurement types known to the default configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Temp,
    Hr,
    Rr,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 3] = [MeasurementKind::Temp, MeasurementKind::Hr, MeasurementKind::Rr];

    pub fn tag(&self) -> &'static str {
        match self {
            MeasurementKind::Temp => "TEMP",
            MeasurementKind::Hr => "HR",
            MeasurementKind::Rr => "RR",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeasurementKind::Temp => "Temperature",
            MeasurementKind::Hr => "Heart rate",
            MeasurementKind::Rr => "Respiratory rate",
        }
    }

    /// Whether readings of this kind are counts (beats, breaths) per minute.
    pub fn integral_only(&self) -> bool {
        matches!(self, MeasurementKind::Hr | MeasurementKind::Rr)
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MeasurementKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_type(s).as_str() {
            "TEMP" => Ok(MeasurementKind::Temp),
            "HR" => Ok(MeasurementKind::Hr),
            "RR" => Ok(MeasurementKind::Rr),
            _ => bail!("Unknown measurement type: {}", s),
        }
    }
}

/// Per-type rules applied before range lookup, keyed by normalized tag.
///
/// Types with no entry are scored without any value constraint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeRules {
    integral_only: BTreeMap<String, bool>,
}

impl TypeRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, measurement_type: &str, integral_only: bool) -> Self {
        self.set(measurement_type, integral_only);
        self
    }

    pub fn set(&mut self, measurement_type: &str, integral_only: bool) {
        self.integral_only
            .insert(normalize_type(measurement_type), integral_only);
    }

    pub fn requires_whole_number(&self, measurement_type: &str) -> bool {
        self.integral_only
            .get(&normalize_type(measurement_type))
            .copied()
            .unwrap_or(false)
    }

    /// Configured type tags, normalized and sorted.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.integral_only.keys().map(String::as_str)
    }
}

/// Rules for TEMP, HR and RR: heart and respiratory rate must be whole numbers.
pub fn default_rules() -> TypeRules {
    MeasurementKind::ALL
        .iter()
        .fold(TypeRules::new(), |rules, kind| {
            rules.with_type(kind.tag(), kind.integral_only())
        })
}

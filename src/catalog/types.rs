use serde::{Deserialize, Serialize};

pub type RangeId = u64;

/// Normalize a measurement type tag for catalog keys and matching.
pub fn normalize_type(measurement_type: &str) -> String {
    measurement_type.trim().to_uppercase()
}

/// A scored interval `(min_value, max_value]` for one measurement type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRange {
    pub id: RangeId,
    pub measurement_type: String,
    pub min_value: f64,
    pub max_value: f64,
    pub score: i32,
}

impl ScoreRange {
    /// Exclusive lower bound, inclusive upper bound.
    pub fn contains(&self, value: f64) -> bool {
        value > self.min_value && value <= self.max_value
    }

    pub fn bounds(&self) -> RangeBounds {
        RangeBounds {
            min_value: self.min_value,
            max_value: self.max_value,
        }
    }
}

/// A range proposed for insertion or as the replacement for an existing id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRange {
    pub measurement_type: String,
    pub min_value: f64,
    pub max_value: f64,
    pub score: i32,
}

impl NewRange {
    pub fn new(measurement_type: &str, min_value: f64, max_value: f64, score: i32) -> Self {
        Self {
            measurement_type: measurement_type.to_string(),
            min_value,
            max_value,
            score,
        }
    }

    pub fn bounds(&self) -> RangeBounds {
        RangeBounds {
            min_value: self.min_value,
            max_value: self.max_value,
        }
    }

    pub(crate) fn into_range(self, id: RangeId) -> ScoreRange {
        ScoreRange {
            id,
            measurement_type: normalize_type(&self.measurement_type),
            min_value: self.min_value,
            max_value: self.max_value,
            score: self.score,
        }
    }
}

/// Bare interval bounds, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeBounds {
    pub min_value: f64,
    pub max_value: f64,
}

impl RangeBounds {
    /// Half-open overlap test matching `(min, max]` semantics.
    pub fn overlaps(&self, other: &RangeBounds) -> bool {
        self.min_value < other.max_value && self.max_value > other.min_value
    }
}

impl std::fmt::Display for RangeBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}]", self.min_value, self.max_value)
    }
}

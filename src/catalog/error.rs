use super::types::{RangeBounds, RangeId};
use thiserror::Error;

/// Errors raised by catalog reads and mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("invalid range for {measurement_type}: {reason}")]
    InvalidRange {
        measurement_type: String,
        reason: String,
    },

    #[error("range for {measurement_type} {proposed} overlaps with existing range {existing}")]
    Overlap {
        measurement_type: String,
        proposed: RangeBounds,
        existing: RangeBounds,
    },

    #[error("range with id {0} not found")]
    NotFound(RangeId),

    #[error("ranges with ids {} not found", join_ids(.0))]
    NotFoundMany(Vec<RangeId>),

    #[error("{0}")]
    EmptyRequest(String),

    #[error("range lookup unavailable: {0}")]
    Unavailable(String),
}

fn join_ids(ids: &[RangeId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CatalogError {
    /// Conflicts are caller mistakes; everything else is a lookup or storage fault.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidRange { .. } | CatalogError::Overlap { .. }
        )
    }
}

use super::error::CatalogError;
use super::types::ScoreRange;
use async_trait::async_trait;

/// Read side of the range catalog, as consumed by the score engine.
///
/// Implementations translate their own storage failures into
/// [`CatalogError::Unavailable`]; no other variant is expected from reads.
#[async_trait]
pub trait RangeRepository: Send + Sync {
    /// Find the range of `measurement_type` where `min < value <= max`.
    async fn lookup(
        &self,
        measurement_type: &str,
        value: f64,
    ) -> Result<Option<ScoreRange>, CatalogError>;

    /// All ranges of `measurement_type`, ascending by `min_value`.
    async fn list_by_type(&self, measurement_type: &str) -> Result<Vec<ScoreRange>, CatalogError>;
}

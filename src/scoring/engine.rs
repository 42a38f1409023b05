use super::cancel::CancelFlag;
use super::measurement::{default_rules, TypeRules};
use super::types::{Measurement, ScoreResult, ValidationError};
use crate::catalog::{normalize_type, CatalogError, RangeRepository, ScoreRange};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failures that abort a whole calculation. Per-measurement problems are
/// reported in [`ScoreResult::errors`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("range lookup unavailable: {0}")]
    LookupUnavailable(String),

    #[error("score calculation cancelled after {processed} measurements")]
    Cancelled { processed: usize },

    #[error("total score overflowed after adding {score} for {measurement_type}")]
    ScoreOverflow { measurement_type: String, score: i32 },
}

/// Scores batches of measurements against a range repository.
///
/// The engine holds no state between calls; concurrent calls only read the
/// repository.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    rules: TypeRules,
    lookup_timeout: Option<Duration>,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl ScoreEngine {
    pub fn new(rules: TypeRules) -> Self {
        Self {
            rules,
            lookup_timeout: None,
        }
    }

    /// Treat any repository call slower than `timeout` as unavailable.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    pub fn rules(&self) -> &TypeRules {
        &self.rules
    }

    /// Score `measurements` in input order.
    ///
    /// Invalid measurements contribute nothing and are collected as errors;
    /// processing always continues to the end of the batch. Only an
    /// unavailable repository, a raised `cancel` flag or a total that no
    /// longer fits in `i32` aborts the call.
    pub async fn calculate(
        &self,
        measurements: &[Measurement],
        catalog: &dyn RangeRepository,
        cancel: Option<&CancelFlag>,
    ) -> Result<ScoreResult, ScoreError> {
        let mut result = ScoreResult::default();

        for (processed, measurement) in measurements.iter().enumerate() {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                tracing::warn!(processed, "Score calculation cancelled");
                return Err(ScoreError::Cancelled { processed });
            }

            match self.evaluate(measurement, catalog).await? {
                Ok(range) => {
                    tracing::debug!(
                        measurement_type = %measurement.measurement_type,
                        value = measurement.value,
                        range_id = range.id,
                        score = range.score,
                        "Matched range"
                    );
                    result.total_score =
                        result.total_score.checked_add(range.score).ok_or_else(|| {
                            ScoreError::ScoreOverflow {
                                measurement_type: range.measurement_type.clone(),
                                score: range.score,
                            }
                        })?;
                }
                Err(error) => result.errors.push(error),
            }
        }

        if result.is_valid() {
            tracing::info!(
                score = result.total_score,
                measurements = measurements.len(),
                "Calculated NEWS score"
            );
        }

        Ok(result)
    }

    /// Match one measurement: the inner result is the matched range or the
    /// validation error to report for it.
    async fn evaluate(
        &self,
        measurement: &Measurement,
        catalog: &dyn RangeRepository,
    ) -> Result<Result<ScoreRange, ValidationError>, ScoreError> {
        let measurement_type = normalize_type(&measurement.measurement_type);

        if self.rules.requires_whole_number(&measurement_type) && measurement.value.fract() != 0.0 {
            tracing::warn!(
                measurement_type = %measurement.measurement_type,
                value = measurement.value,
                "Invalid decimal value, must be a whole number"
            );
            return Ok(Err(ValidationError::non_integral(measurement)));
        }

        if let Some(range) = self
            .guarded(catalog.lookup(&measurement_type, measurement.value))
            .await?
        {
            return Ok(Ok(range));
        }

        tracing::warn!(
            measurement_type = %measurement.measurement_type,
            value = measurement.value,
            "Value is outside defined ranges"
        );
        let available = self
            .guarded(catalog.list_by_type(&measurement_type))
            .await?
            .iter()
            .map(ScoreRange::bounds)
            .collect();
        Ok(Err(ValidationError::out_of_range(measurement, available)))
    }

    async fn guarded<T, F>(&self, call: F) -> Result<T, ScoreError>
    where
        F: Future<Output = Result<T, CatalogError>>,
    {
        let outcome = match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ScoreError::LookupUnavailable(format!(
                    "no response within {}",
                    humantime::format_duration(limit)
                ))
            })?,
            None => call.await,
        };
        outcome.map_err(|e| match e {
            CatalogError::Unavailable(reason) => ScoreError::LookupUnavailable(reason),
            other => ScoreError::LookupUnavailable(other.to_string()),
        })
    }
}

use super::error::CatalogError;
use super::repository::RangeRepository;
use super::types::{normalize_type, NewRange, RangeBounds, RangeId, ScoreRange};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory range catalog.
///
/// Reads share the lock; every mutation validates and commits while holding
/// the write guard, so two writers can never both pass the overlap check
/// against the same stale view.
#[derive(Debug, Default)]
pub struct RangeCatalog {
    state: RwLock<CatalogState>,
}

#[derive(Debug, Clone)]
struct CatalogState {
    next_id: RangeId,
    // normalized type -> ranges ascending by min_value
    by_type: BTreeMap<String, Vec<ScoreRange>>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            next_id: 1,
            by_type: BTreeMap::new(),
        }
    }
}

impl CatalogState {
    fn find(&self, id: RangeId) -> Option<&ScoreRange> {
        self.by_type.values().flatten().find(|r| r.id == id)
    }

    fn insert(&mut self, range: ScoreRange) {
        let ranges = self.by_type.entry(range.measurement_type.clone()).or_default();
        let pos = ranges.partition_point(|r| r.min_value < range.min_value);
        ranges.insert(pos, range);
    }

    fn take(&mut self, id: RangeId) -> Option<ScoreRange> {
        let (key, pos) = self.by_type.iter().find_map(|(key, ranges)| {
            ranges
                .iter()
                .position(|r| r.id == id)
                .map(|pos| (key.clone(), pos))
        })?;
        let ranges = self.by_type.get_mut(&key)?;
        let removed = ranges.remove(pos);
        if ranges.is_empty() {
            self.by_type.remove(&key);
        }
        Some(removed)
    }

    fn remaining_ids(&self) -> u64 {
        RangeId::MAX - self.next_id
    }

    // RangeId::MAX is never handed out, so a stored catalog can always be restored.
    fn allocate_id(&mut self) -> Result<RangeId, CatalogError> {
        if self.remaining_ids() == 0 {
            return Err(ids_exhausted());
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    /// First stored range of `measurement_type` overlapping `proposed`, ignoring `skip`.
    fn first_overlap(
        &self,
        measurement_type: &str,
        proposed: &RangeBounds,
        skip: Option<RangeId>,
    ) -> Option<&ScoreRange> {
        self.by_type
            .get(measurement_type)?
            .iter()
            .filter(|r| Some(r.id) != skip)
            .find(|r| r.bounds().overlaps(proposed))
    }
}

/// Check the shape of a proposed range and return its normalized type.
fn validate_shape(range: &NewRange) -> Result<String, CatalogError> {
    let measurement_type = normalize_type(&range.measurement_type);
    if measurement_type.is_empty() {
        return Err(CatalogError::InvalidRange {
            measurement_type: range.measurement_type.clone(),
            reason: "measurement type is required".to_string(),
        });
    }
    if !range.min_value.is_finite() || !range.max_value.is_finite() {
        return Err(CatalogError::InvalidRange {
            measurement_type,
            reason: "min value and max value must be finite numbers".to_string(),
        });
    }
    if range.min_value >= range.max_value {
        return Err(CatalogError::InvalidRange {
            measurement_type,
            reason: format!(
                "min value ({}) must be less than max value ({})",
                range.min_value, range.max_value
            ),
        });
    }
    Ok(measurement_type)
}

fn ids_exhausted() -> CatalogError {
    CatalogError::Unavailable("no range ids left to allocate".to_string())
}

fn overlap_error(measurement_type: &str, proposed: RangeBounds, existing: RangeBounds) -> CatalogError {
    CatalogError::Overlap {
        measurement_type: measurement_type.to_string(),
        proposed,
        existing,
    }
}

impl RangeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from proposed ranges, validated as one batch.
    pub fn with_ranges(ranges: Vec<NewRange>) -> Result<Self, Vec<CatalogError>> {
        let catalog = Self::new();
        if !ranges.is_empty() {
            catalog.add_many(ranges)?;
        }
        Ok(catalog)
    }

    /// Rebuild a catalog from previously stored ranges, keeping their ids.
    ///
    /// The stored data is re-checked: bounds, duplicate ids and overlaps are
    /// all rejected rather than trusted.
    pub fn restore(next_id: RangeId, ranges: Vec<ScoreRange>) -> Result<Self, CatalogError> {
        let mut state = CatalogState::default();
        let mut seen = BTreeSet::new();
        let mut max_id = 0;
        for range in ranges {
            let proposed = NewRange {
                measurement_type: range.measurement_type.clone(),
                min_value: range.min_value,
                max_value: range.max_value,
                score: range.score,
            };
            let measurement_type = validate_shape(&proposed)?;
            if range.id == 0 || range.id == RangeId::MAX || !seen.insert(range.id) {
                return Err(CatalogError::InvalidRange {
                    measurement_type,
                    reason: format!("duplicate or invalid id {}", range.id),
                });
            }
            if let Some(existing) = state.first_overlap(&measurement_type, &range.bounds(), None) {
                return Err(overlap_error(&measurement_type, range.bounds(), existing.bounds()));
            }
            max_id = max_id.max(range.id);
            state.insert(proposed.into_range(range.id));
        }
        state.next_id = next_id.max(max_id.saturating_add(1));
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogState>, CatalogError> {
        self.state
            .read()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, CatalogError> {
        self.state
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }

    /// Id the next inserted range will receive.
    pub fn next_id(&self) -> Result<RangeId, CatalogError> {
        Ok(self.read()?.next_id)
    }

    pub fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.read()?.by_type.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, id: RangeId) -> Result<Option<ScoreRange>, CatalogError> {
        Ok(self.read()?.find(id).cloned())
    }

    pub fn find_range(
        &self,
        measurement_type: &str,
        value: f64,
    ) -> Result<Option<ScoreRange>, CatalogError> {
        let state = self.read()?;
        Ok(state
            .by_type
            .get(&normalize_type(measurement_type))
            .and_then(|ranges| ranges.iter().find(|r| r.contains(value)))
            .cloned())
    }

    pub fn ranges_of(&self, measurement_type: &str) -> Result<Vec<ScoreRange>, CatalogError> {
        let state = self.read()?;
        Ok(state
            .by_type
            .get(&normalize_type(measurement_type))
            .cloned()
            .unwrap_or_default())
    }

    /// Every range, ordered by measurement type and then by `min_value`.
    pub fn list_all(&self) -> Result<Vec<ScoreRange>, CatalogError> {
        let state = self.read()?;
        Ok(state.by_type.values().flatten().cloned().collect())
    }

    pub fn add(&self, range: NewRange) -> Result<ScoreRange, CatalogError> {
        let measurement_type = validate_shape(&range).inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected range");
        })?;

        let mut state = self.write()?;
        if let Some(existing) = state.first_overlap(&measurement_type, &range.bounds(), None) {
            let err = overlap_error(&measurement_type, range.bounds(), existing.bounds());
            tracing::warn!(error = %err, "Rejected range");
            return Err(err);
        }

        let id = state.allocate_id()?;
        let stored = range.into_range(id);
        state.insert(stored.clone());
        tracing::info!(id, measurement_type = %stored.measurement_type, "Added score range");
        Ok(stored)
    }

    /// Insert a batch of ranges, all or nothing.
    ///
    /// Every problem in the batch is reported, including overlaps between two
    /// members of the batch itself.
    pub fn add_many(&self, ranges: Vec<NewRange>) -> Result<Vec<ScoreRange>, Vec<CatalogError>> {
        if ranges.is_empty() {
            return Err(vec![CatalogError::EmptyRequest(
                "at least one range is required".to_string(),
            )]);
        }

        let mut state = self.write().map_err(|e| vec![e])?;
        let mut errors = Vec::new();
        let mut accepted: Vec<(String, NewRange)> = Vec::new();

        for range in ranges {
            let measurement_type = match validate_shape(&range) {
                Ok(t) => t,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            let proposed = range.bounds();
            let mut conflicts: Vec<RangeBounds> = state
                .by_type
                .get(&measurement_type)
                .into_iter()
                .flatten()
                .filter(|r| r.bounds().overlaps(&proposed))
                .map(ScoreRange::bounds)
                .collect();
            conflicts.extend(
                accepted
                    .iter()
                    .filter(|(t, r)| *t == measurement_type && r.bounds().overlaps(&proposed))
                    .map(|(_, r)| r.bounds()),
            );

            if conflicts.is_empty() {
                accepted.push((measurement_type, range));
            } else {
                errors.extend(
                    conflicts
                        .into_iter()
                        .map(|existing| overlap_error(&measurement_type, proposed, existing)),
                );
            }
        }

        if !errors.is_empty() {
            tracing::warn!(count = errors.len(), "Rejected range batch");
            return Err(errors);
        }

        if state.remaining_ids() < accepted.len() as u64 {
            return Err(vec![ids_exhausted()]);
        }

        let mut stored = Vec::with_capacity(accepted.len());
        for (_, range) in accepted {
            let id = state.allocate_id().map_err(|e| vec![e])?;
            let range = range.into_range(id);
            state.insert(range.clone());
            stored.push(range);
        }

        tracing::info!(count = stored.len(), "Created score ranges");
        Ok(stored)
    }

    /// Replace range `id`; the overlap check ignores the range being replaced.
    pub fn update(&self, id: RangeId, range: NewRange) -> Result<ScoreRange, CatalogError> {
        let mut state = self.write()?;
        if state.find(id).is_none() {
            tracing::warn!(id, "Update requested for missing range");
            return Err(CatalogError::NotFound(id));
        }

        let measurement_type = validate_shape(&range).inspect_err(|e| {
            tracing::warn!(id, error = %e, "Rejected range update");
        })?;
        if let Some(existing) = state.first_overlap(&measurement_type, &range.bounds(), Some(id)) {
            let err = overlap_error(&measurement_type, range.bounds(), existing.bounds());
            tracing::warn!(error = %err, "Rejected range update");
            return Err(err);
        }

        state.take(id);
        let stored = range.into_range(id);
        state.insert(stored.clone());
        tracing::info!(id, measurement_type = %stored.measurement_type, "Updated score range");
        Ok(stored)
    }

    pub fn remove(&self, id: RangeId) -> Result<ScoreRange, CatalogError> {
        let mut state = self.write()?;
        match state.take(id) {
            Some(removed) => {
                tracing::info!(id, measurement_type = %removed.measurement_type, "Deleted score range");
                Ok(removed)
            }
            None => {
                tracing::warn!(id, "Delete requested for missing range");
                Err(CatalogError::NotFound(id))
            }
        }
    }

    /// Remove every id or none of them.
    pub fn remove_many(&self, ids: &[RangeId]) -> Result<Vec<ScoreRange>, CatalogError> {
        if ids.is_empty() {
            return Err(CatalogError::EmptyRequest(
                "at least one id is required".to_string(),
            ));
        }

        let mut state = self.write()?;
        let mut unique = Vec::new();
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let missing: Vec<RangeId> = unique
            .iter()
            .copied()
            .filter(|id| state.find(*id).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Delete requested for missing ranges");
            return Err(CatalogError::NotFoundMany(missing));
        }

        let removed: Vec<ScoreRange> = unique.iter().filter_map(|id| state.take(*id)).collect();
        tracing::info!(count = removed.len(), "Deleted score ranges");
        Ok(removed)
    }
}

#[async_trait]
impl RangeRepository for RangeCatalog {
    async fn lookup(
        &self,
        measurement_type: &str,
        value: f64,
    ) -> Result<Option<ScoreRange>, CatalogError> {
        self.find_range(measurement_type, value)
    }

    async fn list_by_type(&self, measurement_type: &str) -> Result<Vec<ScoreRange>, CatalogError> {
        self.ranges_of(measurement_type)
    }
}

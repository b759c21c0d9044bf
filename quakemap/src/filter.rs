//! Magnitude and region filtering of parsed records.

use thiserror::Error;

use crate::geo::{Region, RegionFilter};
use crate::record::EventRecord;

/// Errors from validating caller-supplied filter parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Minimum magnitude is greater than the maximum.
    #[error("minimum magnitude {min} must be less than or equal to maximum magnitude {max}")]
    InvertedRange { min: f64, max: f64 },

    /// A bound is NaN or infinite.
    #[error("magnitude bounds must be finite numbers")]
    NonFiniteBound,
}

/// Inclusive magnitude range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeRange {
    min: f64,
    max: f64,
}

impl MagnitudeRange {
    /// Creates a validated range.
    pub fn new(min: f64, max: f64) -> Result<Self, FilterError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(FilterError::NonFiniteBound);
        }
        if min > max {
            return Err(FilterError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Creates a range without validation. An inverted range matches nothing.
    pub fn unchecked(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns true if `magnitude` lies within the range (inclusive).
    #[inline]
    pub fn contains(&self, magnitude: f64) -> bool {
        magnitude >= self.min && magnitude <= self.max
    }
}

/// Combined record predicate: optional magnitude range AND region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventFilter {
    /// `None` disables magnitude filtering.
    pub magnitude: Option<MagnitudeRange>,
    pub region: RegionFilter,
}

impl EventFilter {
    /// A filter that passes every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_magnitude(mut self, range: MagnitudeRange) -> Self {
        self.magnitude = Some(range);
        self
    }

    pub fn with_region(mut self, region: impl Into<RegionFilter>) -> Self {
        self.region = region.into();
        self
    }

    /// Returns true if the record passes both predicates.
    #[inline]
    pub fn matches(&self, record: &EventRecord) -> bool {
        let magnitude_ok = self
            .magnitude
            .map_or(true, |range| range.contains(record.magnitude()));
        magnitude_ok && self.region.accepts(record.region())
    }

    /// Keeps the records that match, preserving order.
    pub fn apply(&self, records: Vec<EventRecord>) -> Vec<EventRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }

    /// Returns true if this filter passes every record.
    pub fn is_pass_through(&self) -> bool {
        self.magnitude.is_none() && self.region == RegionFilter::All
    }
}

/// Filters `records` by an optional magnitude range and a region.
pub fn filter(
    records: Vec<EventRecord>,
    magnitude: Option<MagnitudeRange>,
    region: RegionFilter,
) -> Vec<EventRecord> {
    EventFilter { magnitude, region }.apply(records)
}

/// Counts records per region, in classification order, omitting empty
/// regions.
pub fn region_counts(records: &[EventRecord]) -> Vec<(Region, usize)> {
    Region::ALL
        .iter()
        .map(|&region| {
            let count = records.iter().filter(|r| r.region() == region).count();
            (region, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

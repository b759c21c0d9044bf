//! Geographic extent of a set of events, used to fit a map view.

use crate::record::EventRecord;

/// Axis-aligned latitude/longitude extent.
///
/// Does not attempt to wrap across the antimeridian: a batch with events
/// at 179°E and 179°W spans the whole globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Creates a degenerate extent covering a single point.
    pub fn from_point(lat: f64, lon: f64) -> Self {
        Self {
            south: lat,
            west: lon,
            north: lat,
            east: lon,
        }
    }

    /// Computes the extent of all record epicenters.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_records(records: &[EventRecord]) -> Option<Self> {
        let (first, rest) = records.split_first()?;
        let mut bounds = Self::from_point(first.latitude(), first.longitude());
        for record in rest {
            bounds.extend(record.latitude(), record.longitude());
        }
        Some(bounds)
    }

    /// Grows the extent to include the given point.
    pub fn extend(&mut self, lat: f64, lon: f64) {
        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
        self.west = self.west.min(lon);
        self.east = self.east.max(lon);
    }

    /// Center of the extent as (latitude, longitude).
    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Returns true if the point lies within the extent (inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lon)
    }
}

//! Parsed seismic event records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geo::{classify, Region};
use crate::radius::RadiusFormula;

/// One seismic event decoded from the feed.
///
/// Records are immutable. The region and display radius are attached at
/// construction and depend only on the record's own fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    latitude: f64,
    longitude: f64,
    magnitude: f64,
    place: String,
    depth_km: Option<f64>,
    occurred_at: Option<String>,
    region: Region,
    display_radius_km: f64,
}

impl EventRecord {
    /// Builds a record and derives its region and display radius.
    pub fn new(
        latitude: f64,
        longitude: f64,
        magnitude: f64,
        place: impl Into<String>,
        depth_km: Option<f64>,
        occurred_at: Option<String>,
        formula: RadiusFormula,
    ) -> Self {
        Self {
            latitude,
            longitude,
            magnitude,
            place: place.into(),
            depth_km,
            occurred_at,
            region: classify(latitude, longitude),
            display_radius_km: formula.radius_km(magnitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Event magnitude. NaN only for records kept by a lenient parser.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    /// Hypocenter depth in kilometers, if the feed reported one.
    pub fn depth_km(&self) -> Option<f64> {
        self.depth_km
    }

    /// Origin time exactly as it appeared in the feed.
    pub fn occurred_at(&self) -> Option<&str> {
        self.occurred_at.as_deref()
    }

    /// Origin time interpreted as RFC 3339, if it is one.
    pub fn occurred_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.occurred_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Radius of the map overlay in kilometers. NaN if the magnitude is.
    pub fn display_radius_km(&self) -> f64 {
        self.display_radius_km
    }

    /// Presentation-ready summary of the event.
    pub fn details(&self) -> EventDetails {
        EventDetails {
            place: self.place.clone(),
            magnitude: format!("{:.2}", self.magnitude),
            latitude: format!("{:.2}°", self.latitude),
            longitude: format!("{:.2}°", self.longitude),
            depth: self
                .depth_km
                .map(|d| format!("{:.2} km", d))
                .unwrap_or_else(|| "N/A".to_string()),
            time: match (self.occurred_at_utc(), self.occurred_at.as_deref()) {
                (Some(t), _) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                (None, Some(raw)) => raw.to_string(),
                (None, None) => "N/A".to_string(),
            },
            radius: if self.display_radius_km.is_nan() {
                "N/A".to_string()
            } else {
                format!("{:.2} km", self.display_radius_km)
            },
            region: self.region.name().to_string(),
        }
    }
}

/// Formatted fields of a selected event, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDetails {
    pub place: String,
    pub magnitude: String,
    pub latitude: String,
    pub longitude: String,
    pub depth: String,
    pub time: String,
    pub radius: String,
    pub region: String,
}

impl EventDetails {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> [(&'static str, &str); 8] {
        [
            ("Location", self.place.as_str()),
            ("Magnitude", self.magnitude.as_str()),
            ("Latitude", self.latitude.as_str()),
            ("Longitude", self.longitude.as_str()),
            ("Depth", self.depth.as_str()),
            ("Time", self.time.as_str()),
            ("Radius", self.radius.as_str()),
            ("Region", self.region.as_str()),
        ]
    }
}

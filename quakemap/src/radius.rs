//! Magnitude to display radius estimation.
//!
//! The radius sizes a map overlay around an epicenter. It is a visual aid,
//! not a physical measurement.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Radius used below magnitude 4.
pub const MIN_RADIUS_KM: f64 = 5.0;

/// Piecewise thresholds, highest first: (magnitude floor, radius at floor).
const THRESHOLDS: [(f64, f64); 4] = [(7.0, 300.0), (6.0, 100.0), (5.0, 30.0), (4.0, 10.0)];

/// Formula used to turn a magnitude into a radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadiusFormula {
    /// Radius grows linearly within each band: `radius_at_floor * m / floor`.
    #[default]
    Linear,
    /// Radius is constant within each band.
    Stepped,
}

impl RadiusFormula {
    /// Estimates the display radius in kilometers.
    ///
    /// Bands are checked top-down with `>=`, so a magnitude exactly on a
    /// threshold belongs to the higher band. An undefined magnitude (NaN)
    /// yields an undefined radius.
    pub fn radius_km(&self, magnitude: f64) -> f64 {
        if magnitude.is_nan() {
            return f64::NAN;
        }
        for (floor, at_floor) in THRESHOLDS {
            if magnitude >= floor {
                return match self {
                    RadiusFormula::Linear => at_floor * magnitude / floor,
                    RadiusFormula::Stepped => at_floor,
                };
            }
        }
        MIN_RADIUS_KM
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RadiusFormula::Linear => "linear",
            RadiusFormula::Stepped => "stepped",
        }
    }
}

impl fmt::Display for RadiusFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown radius formula '{0}' (expected 'linear' or 'stepped')")]
pub struct UnknownRadiusFormula(pub String);

impl FromStr for RadiusFormula {
    type Err = UnknownRadiusFormula;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(RadiusFormula::Linear),
            "stepped" => Ok(RadiusFormula::Stepped),
            _ => Err(UnknownRadiusFormula(s.to_string())),
        }
    }
}

/// Estimates the display radius with the [`RadiusFormula::Linear`] scale.
#[inline]
pub fn radius(magnitude: f64) -> f64 {
    RadiusFormula::Linear.radius_km(magnitude)
}

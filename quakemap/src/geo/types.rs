//! Region enumeration and region filter selection.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Macro-geographic region an event is classified into.
///
/// Derived from the epicenter coordinates by [`crate::geo::classify`]; never
/// read from the feed itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    Africa,
    Antarctica,
    Asia,
    #[serde(rename = "Australia/Oceania")]
    AustraliaOceania,
    Europe,
    NorthAmerica,
    SouthAmerica,
    /// No bounding box matched.
    Unknown,
}

impl Region {
    /// All regions in classification priority order, `Unknown` last.
    pub const ALL: [Region; 8] = [
        Region::Africa,
        Region::Antarctica,
        Region::Asia,
        Region::AustraliaOceania,
        Region::Europe,
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::Unknown,
    ];

    /// Human-readable region name.
    pub fn name(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Antarctica => "Antarctica",
            Region::Asia => "Asia",
            Region::AustraliaOceania => "Australia/Oceania",
            Region::Europe => "Europe",
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
            Region::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a region name cannot be recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region '{0}'")]
pub struct UnknownRegion(pub String);

/// Lowercases and strips separators so "North America", "north-america"
/// and "NorthAmerica" compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "africa" => Ok(Region::Africa),
            "antarctica" => Ok(Region::Antarctica),
            "asia" => Ok(Region::Asia),
            "australiaoceania" | "australia" | "oceania" => Ok(Region::AustraliaOceania),
            "europe" => Ok(Region::Europe),
            "northamerica" => Ok(Region::NorthAmerica),
            "southamerica" => Ok(Region::SouthAmerica),
            "unknown" => Ok(Region::Unknown),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}

/// Region predicate of the filter engine: everything, or one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Only(Region),
}

impl RegionFilter {
    /// Returns true if `region` passes this filter.
    #[inline]
    pub fn accepts(&self, region: Region) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Only(wanted) => *wanted == region,
        }
    }
}

impl From<Region> for RegionFilter {
    fn from(region: Region) -> Self {
        RegionFilter::Only(region)
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => f.write_str("All"),
            RegionFilter::Only(region) => region.fmt(f),
        }
    }
}

impl FromStr for RegionFilter {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if normalize(s) == "all" {
            return Ok(RegionFilter::All);
        }
        s.parse().map(RegionFilter::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_str_accepts_display_names() {
        for region in Region::ALL {
            let parsed: Region = region.name().parse().unwrap();
            assert_eq!(parsed, region);
        }
    }

    #[test]
    fn test_region_from_str_is_lenient() {
        assert_eq!("north-america".parse::<Region>().unwrap(), Region::NorthAmerica);
        assert_eq!("SouthAmerica".parse::<Region>().unwrap(), Region::SouthAmerica);
        assert_eq!("oceania".parse::<Region>().unwrap(), Region::AustraliaOceania);
        assert!("atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_filter_parse() {
        assert_eq!("All".parse::<RegionFilter>().unwrap(), RegionFilter::All);
        assert_eq!(
            "europe".parse::<RegionFilter>().unwrap(),
            RegionFilter::Only(Region::Europe)
        );
    }

    #[test]
    fn test_region_filter_accepts() {
        assert!(RegionFilter::All.accepts(Region::Unknown));
        assert!(RegionFilter::Only(Region::Asia).accepts(Region::Asia));
        assert!(!RegionFilter::Only(Region::Asia).accepts(Region::Europe));
    }
}

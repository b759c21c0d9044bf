//! Geographic classification of epicenters.
//!
//! Maps a latitude/longitude pair to one of a fixed set of macro-regions
//! using an ordered table of axis-aligned bounding boxes. Boxes are
//! inclusive on every edge and may overlap; the first matching entry wins,
//! so Africa takes priority over Europe along the Mediterranean.

mod bounds;
mod types;

pub use bounds::GeoBounds;
pub use types::{Region, RegionFilter, UnknownRegion};

/// An inclusive latitude/longitude rectangle mapped to a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBox {
    pub region: Region,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionBox {
    const fn new(region: Region, lat: (f64, f64), lon: (f64, f64)) -> Self {
        Self {
            region,
            lat_min: lat.0,
            lat_max: lat.1,
            lon_min: lon.0,
            lon_max: lon.1,
        }
    }

    /// Returns true if the point lies inside or on the edge of this box.
    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// Latitude where the American landmass is split between north and south.
pub const AMERICAS_SPLIT_LAT: f64 = 7.0;

/// Classification table in priority order.
pub const REGION_BOXES: [RegionBox; 7] = [
    RegionBox::new(Region::Africa, (-37.0, 37.0), (-18.0, 51.0)),
    RegionBox::new(Region::Antarctica, (-90.0, -60.0), (-180.0, 180.0)),
    RegionBox::new(Region::Asia, (10.0, 80.0), (26.0, 180.0)),
    RegionBox::new(Region::AustraliaOceania, (-55.0, -10.0), (112.0, 180.0)),
    RegionBox::new(Region::Europe, (34.0, 71.0), (-25.0, 45.0)),
    RegionBox::new(Region::NorthAmerica, (AMERICAS_SPLIT_LAT, 83.0), (-180.0, -35.0)),
    RegionBox::new(Region::SouthAmerica, (-60.0, AMERICAS_SPLIT_LAT), (-180.0, -35.0)),
];

/// Classifies an epicenter into a region.
///
/// Total over all inputs: points outside every box, and non-finite
/// coordinates, yield [`Region::Unknown`].
#[inline]
pub fn classify(lat: f64, lon: f64) -> Region {
    REGION_BOXES
        .iter()
        .find(|b| b.contains(lat, lon))
        .map(|b| b.region)
        .unwrap_or(Region::Unknown)
}

//! Geospatial helpers: neighborhood geocoding, WKT points, great-circle distance.

pub mod distance;
pub mod geocoder;
pub mod point;

use serde::{Deserialize, Serialize};

pub use distance::{great_circle_km, round_km};
pub use geocoder::Geocoder;
pub use point::{format_point, parse_point};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

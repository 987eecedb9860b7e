//! Fixed reference data

use resmap_types::GeoPoint;

/// Municipalities offered by the entry form and the mock generator
pub const MUNICIPALITIES: [&str; 6] = [
    "Iloilo City",
    "Oton",
    "Pavia",
    "Leganes",
    "Santa Barbara",
    "Dumangas",
];

/// Default municipality for new entries
pub const DEFAULT_MUNICIPALITY: &str = "Iloilo City";

/// Operations center, used as default entry location and mock data origin
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    latitude: 10.720321,
    longitude: 122.562019,
};

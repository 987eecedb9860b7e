//! Domain logic - filtering, dashboard aggregation, GeoJSON conversion

pub mod constants;
pub mod filter;
pub mod geojson;
pub mod mock;
pub mod service;

pub use filter::{filter_resources, ResourceFilter};
pub use geojson::{to_feature_collection, Feature, FeatureCollection, PointGeometry};
pub use mock::MockGenerator;

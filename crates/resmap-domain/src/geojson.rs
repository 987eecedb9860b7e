//! GeoJSON feature collection built from resource records

use std::borrow::Borrow;

use resmap_types::{GeoPoint, Resource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Point")]
pub struct PointGeometry {
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub properties: Resource,
    pub geometry: PointGeometry,
}

impl Feature {
    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates[1]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Point features for every record with a usable location.
/// Records with non-finite or out-of-range coordinates are left out.
pub fn to_feature_collection<R: Borrow<Resource>>(resources: &[R]) -> FeatureCollection {
    let resources: Vec<&Resource> = resources.iter().map(|r| <R as Borrow<Resource>>::borrow(r)).collect();
    let features = resources
        .into_iter()
        .filter_map(|r| {
            let point = r.location().filter(GeoPoint::is_valid)?;
            Some(Feature {
                properties: r.clone(),
                geometry: PointGeometry {
                    coordinates: [point.longitude, point.latitude],
                },
            })
        })
        .collect();
    FeatureCollection { features }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resmap_types::ResourceType;

    #[test]
    fn test_invalid_locations_excluded() {
        let resources = vec![
            Resource::new("ok", ResourceType::Ems, GeoPoint::new(10.7, 122.5)).with_id("a"),
            Resource::new("nan", ResourceType::Ems, GeoPoint::new(f64::NAN, 122.5)).with_id("b"),
            Resource::new("far", ResourceType::Ems, GeoPoint::new(10.7, 200.0)).with_id("c"),
            Resource {
                latitude: None,
                ..Resource::new("unplaced", ResourceType::Ems, GeoPoint::new(10.7, 122.5)).with_id("d")
            },
        ];
        let fc = to_feature_collection(&resources);
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.features[0].properties.id, "a");
        assert_eq!(fc.features[0].geometry.coordinates, [122.5, 10.7]);
    }

    #[test]
    fn test_serialized_shape() {
        let resources = vec![Resource::new("ok", ResourceType::Ems, GeoPoint::new(10.7, 122.5)).with_id("a")];
        let value = serde_json::to_value(to_feature_collection(&resources)).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert_eq!(value["features"][0]["properties"]["type"], "ems");
    }

    #[test]
    fn test_accepts_borrowed_slices() {
        let resources = vec![Resource::new("ok", ResourceType::Ems, GeoPoint::new(1.0, 2.0)).with_id("a")];
        let refs: Vec<&Resource> = resources.iter().collect();
        assert_eq!(to_feature_collection(&refs), to_feature_collection(&resources));
    }
}

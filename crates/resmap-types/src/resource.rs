//! Resource record and its closed enums

use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, ValidationError};

/// Kind of emergency resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Ver,
    Comm,
    Tools,
    Trucks,
    Watercraft,
    Fr,
    Har,
    Usar,
    Wasar,
    Ews,
    Ems,
    Firetruck,
    Cssr,
    Ambulance,
}

impl ResourceType {
    pub const ALL: [ResourceType; 14] = [
        ResourceType::Ver,
        ResourceType::Comm,
        ResourceType::Tools,
        ResourceType::Trucks,
        ResourceType::Watercraft,
        ResourceType::Fr,
        ResourceType::Har,
        ResourceType::Usar,
        ResourceType::Wasar,
        ResourceType::Ews,
        ResourceType::Ems,
        ResourceType::Firetruck,
        ResourceType::Cssr,
        ResourceType::Ambulance,
    ];

    /// Wire name, also used in icon ids and paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Ver => "ver",
            ResourceType::Comm => "comm",
            ResourceType::Tools => "tools",
            ResourceType::Trucks => "trucks",
            ResourceType::Watercraft => "watercraft",
            ResourceType::Fr => "fr",
            ResourceType::Har => "har",
            ResourceType::Usar => "usar",
            ResourceType::Wasar => "wasar",
            ResourceType::Ews => "ews",
            ResourceType::Ems => "ems",
            ResourceType::Firetruck => "firetruck",
            ResourceType::Cssr => "cssr",
            ResourceType::Ambulance => "ambulance",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Ver => "Vehicle Extrication",
            ResourceType::Comm => "Communications",
            ResourceType::Tools => "Tools & Equipment",
            ResourceType::Trucks => "General Trucks",
            ResourceType::Watercraft => "Watercraft",
            ResourceType::Fr => "Fire Rescue",
            ResourceType::Har => "High Altitude Rescue",
            ResourceType::Usar => "Urban Search & Rescue",
            ResourceType::Wasar => "Water Search & Rescue",
            ResourceType::Ews => "Early Warning System",
            ResourceType::Ems => "Emergency Medical",
            ResourceType::Firetruck => "Fire Truck",
            ResourceType::Cssr => "Collapsed Structure",
            ResourceType::Ambulance => "Ambulance",
        }
    }

    /// Image id registered on the map widget
    pub fn icon_id(&self) -> String {
        format!("icon-{}", self.as_str())
    }

    /// Asset path of the marker pin, relative to the assets root
    pub fn icon_path(&self) -> String {
        format!("/pins/{}.png", self.as_str())
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| Error::UnknownResourceType(s.to_string()))
    }
}

/// Operational state of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Ready,
    Deployed,
    Maintenance,
}

impl ResourceStatus {
    pub const ALL: [ResourceStatus; 3] = [
        ResourceStatus::Ready,
        ResourceStatus::Deployed,
        ResourceStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Ready => "ready",
            ResourceStatus::Deployed => "deployed",
            ResourceStatus::Maintenance => "maintenance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceStatus::Ready => "Ready",
            ResourceStatus::Deployed => "Deployed",
            ResourceStatus::Maintenance => "Maintenance",
        }
    }

    /// Display color as RGB
    pub fn color(&self) -> [u8; 3] {
        match self {
            ResourceStatus::Ready => [0x22, 0xc5, 0x5e],
            ResourceStatus::Deployed => [0xf9, 0x73, 0x16],
            ResourceStatus::Maintenance => [0xea, 0xb3, 0x08],
        }
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and within geographic bounds
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One trackable unit of emergency equipment or personnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub quantity: u32,
    /// Absent or `null` when the record has no position
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Fields written by other clients (e.g. an `image` data URL), kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    pub fn new(
        title: impl Into<String>,
        resource_type: ResourceType,
        location: GeoPoint,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            resource_type,
            quantity: 1,
            latitude: Some(location.latitude),
            longitude: Some(location.longitude),
            municipality: String::new(),
            status: ResourceStatus::default(),
            created_at: Some(Utc::now()),
            user_id: None,
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_municipality(mut self, municipality: impl Into<String>) -> Self {
        self.municipality = municipality.into();
        self
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Position, when both coordinates are present
    pub fn location(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.latitude?, self.longitude?))
    }

    /// Whether this record can be placed on the map
    pub fn has_valid_location(&self) -> bool {
        self.location().is_some_and(|p| p.is_valid())
    }

    /// Checks applied to every record crossing the storage boundary.
    ///
    /// Missing or out-of-range coordinates are allowed; non-finite ones are
    /// not, since they cannot be written back.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id"));
        }
        let finite = |c: Option<f64>| c.map_or(true, f64::is_finite);
        if !finite(self.latitude) || !finite(self.longitude) {
            return Err(ValidationError::InvalidCoordinates {
                latitude: self.latitude.unwrap_or(f64::NAN),
                longitude: self.longitude.unwrap_or(f64::NAN),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_wire_names_round_trip() {
        for t in ResourceType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<ResourceType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!("helicopter".parse::<ResourceType>().is_err());
        assert_eq!("Ambulance".parse::<ResourceType>().unwrap(), ResourceType::Ambulance);
    }

    #[test]
    fn test_icon_paths() {
        assert_eq!(ResourceType::Watercraft.icon_path(), "/pins/watercraft.png");
        assert_eq!(ResourceType::Firetruck.icon_id(), "icon-firetruck");
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"id":"r1","title":"Unit","type":"ems","quantity":2,"latitude":10.7,"longitude":122.5}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.status, ResourceStatus::Ready);
        assert_eq!(resource.municipality, "");
        assert_eq!(resource.description, "");
        assert!(resource.created_at.is_none());
    }

    #[test]
    fn test_created_at_wire_name() {
        let json = r#"{"id":"r1","title":"Unit","type":"ems","quantity":2,"latitude":10.7,"longitude":122.5,"createdAt":"2025-01-02T03:04:05.000Z"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert!(resource.created_at.is_some());
        let value = serde_json::to_value(&resource).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["type"], "ems");
    }

    #[test]
    fn test_location_bounds() {
        assert!(GeoPoint::new(10.72, 122.56).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_validate_requires_id() {
        let resource = Resource::new("Unit", ResourceType::Ems, GeoPoint::new(0.0, 0.0)).with_id(" ");
        assert_eq!(resource.validate(), Err(ValidationError::MissingField("id")));
    }

    #[test]
    fn test_missing_or_null_coordinates_are_kept() {
        let json = r#"[
            {"id":"a","title":"A","type":"ems","latitude":null,"longitude":122.5},
            {"id":"b","title":"B","type":"ems"}
        ]"#;
        let resources: Vec<Resource> = serde_json::from_str(json).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].latitude, None);
        assert_eq!(resources[0].longitude, Some(122.5));
        assert!(resources.iter().all(|r| r.location().is_none()));
        assert!(resources.iter().all(|r| !r.has_valid_location()));
        assert!(resources.iter().all(|r| r.validate().is_ok()));
    }

    #[test]
    fn test_out_of_range_location_is_valid_record_but_unmappable() {
        let resource = Resource::new("Unit", ResourceType::Ems, GeoPoint::new(95.0, 0.0)).with_id("r");
        assert!(resource.validate().is_ok());
        assert!(!resource.has_valid_location());
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let resource = Resource::new("Unit", ResourceType::Ems, GeoPoint::new(f64::NAN, 0.0)).with_id("r");
        assert!(matches!(
            resource.validate(),
            Err(ValidationError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r#"{"id":"r1","title":"Unit","type":"ems","latitude":10.7,"longitude":122.5,"image":"data:image/png;base64,AAAA"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.extra["image"], "data:image/png;base64,AAAA");

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["image"], "data:image/png;base64,AAAA");
        assert_eq!(value["type"], "ems");
    }
}

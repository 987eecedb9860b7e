//! Persistent store for the resource collection
//!
//! The collection is kept as a single JSON array under one key and is always
//! written as a whole (read-all, modify, write-all). Writes are last-writer-wins.

mod file;
mod memory;

pub use file::FileResourceStore;
pub use memory::MemoryResourceStore;

use std::collections::HashSet;

use resmap_types::{Resource, Result, ValidationError};
use tracing::warn;

/// Storage key / file stem holding the collection
pub const COLLECTION_KEY: &str = "map-resources";

/// Capability to load and persist the resource collection
pub trait ResourceStore {
    /// Load the full collection. Unreadable data degrades to an empty collection.
    fn load(&self) -> Vec<Resource>;

    /// Overwrite the full collection
    fn save(&self, resources: &[Resource]) -> Result<()>;

    /// Append one record (read-all, append, write-all)
    fn append(&self, resource: Resource) -> Result<()> {
        resource.validate()?;
        let mut resources = self.load();
        if resources.iter().any(|r| r.id == resource.id) {
            return Err(ValidationError::DuplicateId(resource.id).into());
        }
        resources.push(resource);
        self.save(&resources)
    }

    /// Number of stored records
    fn count(&self) -> usize {
        self.load().len()
    }
}

/// Parse a stored collection, skipping records that fail validation.
///
/// Malformed JSON yields an empty collection. Records with a duplicate id keep
/// the first occurrence.
pub fn parse_collection(raw: &str) -> Vec<Resource> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!("stored resource collection is unreadable, treating as empty: {e}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut resources = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let resource: Resource = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(index, "skipping malformed resource record: {e}");
                continue;
            }
        };
        if let Err(e) = resource.validate() {
            warn!(index, "skipping invalid resource record: {e}");
            continue;
        }
        if !seen.insert(resource.id.clone()) {
            warn!(index, id = %resource.id, "skipping resource with duplicate id");
            continue;
        }
        resources.push(resource);
    }
    resources
}

/// Serialize a collection for storage, rejecting duplicate ids
pub fn encode_collection(resources: &[Resource]) -> Result<String> {
    let mut seen = HashSet::new();
    for resource in resources {
        resource.validate()?;
        if !seen.insert(resource.id.as_str()) {
            return Err(ValidationError::DuplicateId(resource.id.clone()).into());
        }
    }
    Ok(serde_json::to_string_pretty(resources)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resmap_types::{GeoPoint, ResourceType};

    fn unit(id: &str) -> Resource {
        Resource::new("Unit", ResourceType::Ambulance, GeoPoint::new(10.7, 122.5)).with_id(id)
    }

    #[test]
    fn test_parse_malformed_json_is_empty() {
        assert!(parse_collection("{not json").is_empty());
        assert!(parse_collection("{\"id\": 1}").is_empty());
    }

    #[test]
    fn test_parse_skips_bad_records() {
        let raw = r#"[
            {"id":"a","title":"A","type":"ems","quantity":1,"latitude":1.0,"longitude":2.0},
            {"id":"b","title":"B","type":"helicopter","quantity":1,"latitude":1.0,"longitude":2.0},
            {"id":"","title":"C","type":"ems","quantity":1,"latitude":1.0,"longitude":2.0},
            {"id":"a","title":"D","type":"fr","quantity":1,"latitude":1.0,"longitude":2.0}
        ]"#;
        let resources = parse_collection(raw);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].title, "A");
    }

    #[test]
    fn test_encode_rejects_duplicates() {
        let err = encode_collection(&[unit("x"), unit("x")]).unwrap_err();
        assert!(err.to_string().contains("Duplicate resource id"));
    }
}

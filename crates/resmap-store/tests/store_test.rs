//! Integration tests for the resource stores

use chrono::{TimeZone, Utc};
use resmap_store::{FileResourceStore, MemoryResourceStore, ResourceStore};
use resmap_types::{GeoPoint, Resource, ResourceStatus, ResourceType};
use tempfile::tempdir;

fn sample_collection() -> Vec<Resource> {
    let mut first = Resource::new("Ambulance Unit A-1", ResourceType::Ambulance, GeoPoint::new(10.720321, 122.562019))
        .with_id("resource-0")
        .with_municipality("Oton")
        .with_description("Emergency response unit for ambulance operations")
        .with_quantity(3);
    first.created_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap());
    first.user_id = Some("temp-user-id".to_string());

    let mut second = Resource::new("Fire Truck Unit B-7", ResourceType::Firetruck, GeoPoint::new(10.70123456789, 122.5901234567))
        .with_id("resource-1")
        .with_municipality("Pavia")
        .with_status(ResourceStatus::Deployed);
    second.created_at = None;

    vec![first, second]
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileResourceStore::open(dir.path().to_path_buf()).expect("Failed to open store");

    let resources = sample_collection();
    store.save(&resources).expect("save failed");

    let loaded = store.load();
    assert_eq!(loaded, resources);
    assert!(store.path().ends_with("map-resources.json"));
}

#[test]
fn test_file_store_missing_file_is_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileResourceStore::open(dir.path().join("nested")).expect("Failed to open store");
    assert!(store.load().is_empty());
    assert_eq!(store.count(), 0);
}

#[test]
fn test_file_store_malformed_json_is_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileResourceStore::open(dir.path().to_path_buf()).expect("Failed to open store");
    std::fs::write(store.path(), "[{\"id\": \"broken\",").unwrap();

    assert!(store.load().is_empty());
}

#[test]
fn test_append_preserves_existing_records() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileResourceStore::open(dir.path().to_path_buf()).expect("Failed to open store");
    let resources = sample_collection();
    store.save(&resources[..1]).unwrap();

    store.append(resources[1].clone()).expect("append failed");

    assert_eq!(store.load(), resources);
}

#[test]
fn test_append_rejects_duplicate_id() {
    let store = MemoryResourceStore::new();
    let resources = sample_collection();
    store.save(&resources).unwrap();

    let duplicate = resources[0].clone().with_municipality("Leganes");
    assert!(store.append(duplicate).is_err());
    assert_eq!(store.load(), resources);
}

#[test]
fn test_memory_store_round_trip_and_clear() {
    let store = MemoryResourceStore::new();
    assert!(store.load().is_empty());

    let resources = sample_collection();
    store.save(&resources).unwrap();
    assert_eq!(store.load(), resources);

    store.clear();
    assert!(store.raw().is_none());
    assert!(store.load().is_empty());
}

#[test]
fn test_memory_store_malformed_raw() {
    let store = MemoryResourceStore::with_raw("not json at all");
    assert!(store.load().is_empty());
}

#[test]
fn test_last_writer_wins() {
    let dir = tempdir().expect("Failed to create temp dir");
    let first = FileResourceStore::open(dir.path().to_path_buf()).unwrap();
    let second = FileResourceStore::open(dir.path().to_path_buf()).unwrap();
    let resources = sample_collection();

    first.save(&resources).unwrap();
    second.save(&resources[1..]).unwrap();

    assert_eq!(first.load(), resources[1..].to_vec());
}

#[test]
fn test_records_without_coordinates_survive_load() {
    let raw = r#"[
        {"id": "placed", "title": "Rescue Boat", "type": "watercraft", "latitude": 10.7, "longitude": 122.5},
        {"id": "null-lat", "title": "Generator", "type": "tools", "latitude": null, "longitude": 122.5},
        {"id": "no-coords", "title": "Water Supply", "type": "wasar"}
    ]"#;
    let store = MemoryResourceStore::with_raw(raw);

    let loaded = store.load();
    let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["placed", "null-lat", "no-coords"]);
    assert!(loaded[0].has_valid_location());
    assert!(!loaded[1].has_valid_location());
    assert!(loaded[2].location().is_none());

    // Writing the collection back keeps the unplaced records
    store.save(&loaded).unwrap();
    assert_eq!(store.load(), loaded);
}

#[test]
fn test_non_finite_coordinates_rejected_on_save() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileResourceStore::open(dir.path().to_path_buf()).unwrap();
    let resources = sample_collection();
    store.save(&resources).unwrap();

    let broken = Resource::new("Drifting", ResourceType::Watercraft, GeoPoint::new(f64::NAN, 122.5)).with_id("nan");
    assert!(store.append(broken.clone()).is_err());
    assert!(store.save(&[broken]).is_err());
    assert_eq!(store.load(), resources);
}

#[test]
fn test_unknown_fields_survive_rewrite() {
    let raw = r#"[{"id": "pic", "title": "Medic", "type": "ems", "latitude": 10.7, "longitude": 122.5,
                  "image": "data:image/png;base64,AAAA"}]"#;
    let store = MemoryResourceStore::with_raw(raw);

    let mut resources = store.load();
    resources.push(Resource::new("Ambulance", ResourceType::Ambulance, GeoPoint::new(10.71, 122.51)).with_id("new"));
    store.save(&resources).unwrap();

    let reloaded = store.load();
    assert_eq!(reloaded[0].extra["image"], "data:image/png;base64,AAAA");
    assert!(store.raw().unwrap().contains("data:image/png;base64,AAAA"));
}

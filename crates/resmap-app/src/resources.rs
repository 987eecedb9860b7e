//! Resource use cases - entry form, seeding, demo loading, location lookup

use std::collections::HashSet;

use resmap_domain::constants::{DEFAULT_CENTER, DEFAULT_MUNICIPALITY};
use resmap_domain::MockGenerator;
use resmap_store::ResourceStore;
use resmap_types::{
    GeoPoint, LocationError, Resource, ResourceStatus, ResourceType, Result, ValidationError,
};
use tracing::{debug, info};

use crate::config::Config;

/// Entry form for a new resource
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub title: String,
    pub description: String,
    pub resource_type: ResourceType,
    pub quantity: u32,
    pub location: GeoPoint,
    pub municipality: String,
    pub status: ResourceStatus,
    pub user_id: Option<String>,
}

impl Default for NewResource {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            resource_type: ResourceType::Trucks,
            quantity: 1,
            location: DEFAULT_CENTER,
            municipality: DEFAULT_MUNICIPALITY.to_string(),
            status: ResourceStatus::Ready,
            user_id: None,
        }
    }
}

impl NewResource {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if !self.location.is_valid() {
            return Err(ValidationError::InvalidCoordinates {
                latitude: self.location.latitude,
                longitude: self.location.longitude,
            });
        }
        Ok(())
    }

    /// Build the stored record with a fresh id and creation time
    pub fn into_resource(self) -> Resource {
        let mut resource = Resource::new(self.title.trim(), self.resource_type, self.location)
            .with_description(self.description)
            .with_quantity(self.quantity)
            .with_municipality(self.municipality)
            .with_status(self.status);
        resource.user_id = self.user_id;
        resource
    }
}

/// Validate the form and append the resulting record. Nothing is written on failure.
pub fn add_resource<S: ResourceStore + ?Sized>(store: &S, form: NewResource) -> Result<Resource> {
    form.validate()?;
    let resource = form.into_resource();
    store.append(resource.clone())?;
    info!(id = %resource.id, resource_type = %resource.resource_type, "resource added");
    Ok(resource)
}

/// Persist generated records. Returns the number written.
///
/// With `replace` the collection is overwritten; otherwise records are appended
/// and generated ids that collide with stored ones are reassigned.
pub fn seed<S: ResourceStore + ?Sized>(
    store: &S,
    count: usize,
    seed: Option<u64>,
    replace: bool,
) -> Result<usize> {
    let mut generator = match seed {
        Some(s) => MockGenerator::seeded(s),
        None => MockGenerator::default(),
    };
    let generated = generator.generate(count);

    let resources = if replace {
        generated
    } else {
        let mut existing = store.load();
        let mut ids: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
        for mut resource in generated {
            if ids.contains(&resource.id) {
                resource.id = uuid::Uuid::new_v4().to_string();
            }
            ids.insert(resource.id.clone());
            existing.push(resource);
        }
        existing
    };

    store.save(&resources)?;
    info!(count, replace, "seeded resources");
    Ok(count)
}

/// Loaded collection and whether it is generated demo data
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedResources {
    pub resources: Vec<Resource>,
    pub demo: bool,
}

/// Load the stored collection, falling back to unsaved demo data when empty
pub fn load_or_demo<S: ResourceStore + ?Sized>(store: &S, config: &Config) -> LoadedResources {
    let resources = store.load();
    if resources.is_empty() && config.demo_data {
        debug!(count = config.mock_count, "store empty, showing demo data");
        return LoadedResources {
            resources: MockGenerator::default().generate(config.mock_count),
            demo: true,
        };
    }
    LoadedResources {
        resources,
        demo: false,
    }
}

/// Source of the device's current position
pub trait LocationProvider {
    fn current_location(&self) -> std::result::Result<GeoPoint, LocationError>;
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoPoint);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> std::result::Result<GeoPoint, LocationError> {
        if self.0.is_valid() {
            Ok(self.0)
        } else {
            Err(LocationError::Unavailable(format!(
                "invalid position {}, {}",
                self.0.latitude, self.0.longitude
            )))
        }
    }
}

/// Provider for hosts without any location source
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn current_location(&self) -> std::result::Result<GeoPoint, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Fill the form location from `provider`. The form is unchanged on failure.
pub fn locate<P: LocationProvider + ?Sized>(
    provider: &P,
    form: &mut NewResource,
) -> std::result::Result<GeoPoint, LocationError> {
    let position = provider.current_location()?;
    form.location = position;
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resmap_store::MemoryResourceStore;

    fn form(title: &str) -> NewResource {
        NewResource {
            title: title.to_string(),
            ..NewResource::default()
        }
    }

    #[test]
    fn test_form_defaults() {
        let form = NewResource::default();
        assert_eq!(form.resource_type, ResourceType::Trucks);
        assert_eq!(form.quantity, 1);
        assert_eq!(form.municipality, "Iloilo City");
        assert_eq!(form.status, ResourceStatus::Ready);
        assert_eq!(form.location, DEFAULT_CENTER);
    }

    #[test]
    fn test_validation() {
        assert_eq!(form("  ").validate(), Err(ValidationError::MissingField("title")));

        let mut bad = form("Boat");
        bad.location = GeoPoint::new(95.0, 0.0);
        assert!(matches!(bad.validate(), Err(ValidationError::InvalidCoordinates { .. })));

        bad.location = GeoPoint::new(f64::NAN, 0.0);
        assert!(bad.validate().is_err());
        assert!(form("Boat").validate().is_ok());
    }

    #[test]
    fn test_add_resource_assigns_id_and_time() {
        let store = MemoryResourceStore::new();
        let added = add_resource(&store, form(" Rescue Boat ")).unwrap();
        assert_eq!(added.title, "Rescue Boat");
        assert!(!added.id.is_empty());
        assert!(added.created_at.is_some());
        assert_eq!(store.load(), vec![added]);
    }

    #[test]
    fn test_invalid_form_writes_nothing() {
        let store = MemoryResourceStore::new();
        assert!(add_resource(&store, form("")).is_err());
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_seed_replace_and_append() {
        let store = MemoryResourceStore::new();
        assert_eq!(seed(&store, 5, Some(1), true).unwrap(), 5);
        assert_eq!(store.count(), 5);

        seed(&store, 5, Some(2), false).unwrap();
        let all = store.load();
        assert_eq!(all.len(), 10);
        let ids: HashSet<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 10);

        seed(&store, 3, Some(3), true).unwrap();
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_load_or_demo() {
        let store = MemoryResourceStore::new();
        let config = Config::default();
        let loaded = load_or_demo(&store, &config);
        assert!(loaded.demo);
        assert_eq!(loaded.resources.len(), 45);
        assert!(store.raw().is_none(), "demo data must not be persisted");

        let no_demo = Config {
            demo_data: false,
            ..Config::default()
        };
        assert!(load_or_demo(&store, &no_demo).resources.is_empty());

        add_resource(&store, form("Boat")).unwrap();
        let loaded = load_or_demo(&store, &config);
        assert!(!loaded.demo);
        assert_eq!(loaded.resources.len(), 1);
    }

    #[test]
    fn test_locate() {
        let mut f = form("Boat");
        let here = GeoPoint::new(10.8, 122.4);
        assert_eq!(locate(&FixedLocation(here), &mut f).unwrap(), here);
        assert_eq!(f.location, here);

        let before = f.clone();
        assert!(matches!(locate(&NoLocation, &mut f), Err(LocationError::Unsupported)));
        assert_eq!(f, before);

        let broken = FixedLocation(GeoPoint::new(f64::NAN, 0.0));
        assert!(matches!(locate(&broken, &mut f), Err(LocationError::Unavailable(_))));
        assert_eq!(f, before);
    }
}

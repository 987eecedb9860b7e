//! Type and text filtering of the resource collection

use std::collections::BTreeSet;

use resmap_types::{Resource, ResourceType};
use serde::{Deserialize, Serialize};

/// Active type set plus free-text query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    active_types: BTreeSet<ResourceType>,
    query: String,
}

impl Default for ResourceFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl ResourceFilter {
    /// Every type active, empty query
    pub fn all() -> Self {
        Self {
            active_types: ResourceType::ALL.into_iter().collect(),
            query: String::new(),
        }
    }

    /// No type active; matches nothing until types are toggled on
    pub fn none() -> Self {
        Self {
            active_types: BTreeSet::new(),
            query: String::new(),
        }
    }

    pub fn from_types(types: impl IntoIterator<Item = ResourceType>) -> Self {
        Self {
            active_types: types.into_iter().collect(),
            query: String::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    /// Flip a type in or out of the active set
    pub fn toggle(&mut self, resource_type: ResourceType) {
        if !self.active_types.remove(&resource_type) {
            self.active_types.insert(resource_type);
        }
    }

    pub fn is_active(&self, resource_type: ResourceType) -> bool {
        self.active_types.contains(&resource_type)
    }

    pub fn active_types(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.active_types.iter().copied()
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        self.is_active(resource.resource_type)
            && matches_query(resource, &self.query.to_lowercase())
    }

    /// Visible subsequence, original order preserved
    pub fn apply<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        let needle = self.query.to_lowercase();
        resources
            .iter()
            .filter(|r| self.is_active(r.resource_type) && matches_query(r, &needle))
            .collect()
    }
}

/// Resources whose type is active and whose title, municipality or
/// description contains `search` (case-insensitive). Empty search matches all.
pub fn filter_resources<'a>(
    resources: &'a [Resource],
    active_types: &[ResourceType],
    search: &str,
) -> Vec<&'a Resource> {
    ResourceFilter::from_types(active_types.iter().copied())
        .with_query(search)
        .apply(resources)
}

fn matches_query(resource: &Resource, needle: &str) -> bool {
    needle.is_empty()
        || resource.title.to_lowercase().contains(needle)
        || resource.municipality.to_lowercase().contains(needle)
        || resource.description.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resmap_types::{GeoPoint, ResourceStatus};

    fn resource(id: &str, t: ResourceType, title: &str, municipality: &str) -> Resource {
        Resource::new(title, t, GeoPoint::new(10.7, 122.5))
            .with_id(id)
            .with_municipality(municipality)
    }

    fn sample() -> Vec<Resource> {
        vec![
            resource("1", ResourceType::Ambulance, "Ambulance Unit A-1", "Oton")
                .with_status(ResourceStatus::Ready),
            resource("2", ResourceType::Firetruck, "Fire Truck Unit B-2", "Oton")
                .with_status(ResourceStatus::Deployed),
            resource("3", ResourceType::Watercraft, "Rescue Boat", "Dumangas")
                .with_description("Coastal water rescue"),
        ]
    }

    #[test]
    fn test_type_filter_preserves_order() {
        let resources = sample();
        let visible = filter_resources(
            &resources,
            &[ResourceType::Watercraft, ResourceType::Ambulance],
            "",
        );
        let ids: Vec<_> = visible.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let resources = sample();
        let all = ResourceFilter::all();

        let by_title = all.clone().with_query("fire TRUCK").apply(&resources);
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "2");

        let by_municipality = all.clone().with_query("oTON").apply(&resources);
        assert_eq!(by_municipality.len(), 2);

        let by_description = all.with_query("coastal").apply(&resources);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "3");
    }

    #[test]
    fn test_empty_type_set_matches_nothing() {
        let resources = sample();
        assert!(ResourceFilter::none().apply(&resources).is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut filter = ResourceFilter::all();
        filter.toggle(ResourceType::Ambulance);
        assert!(!filter.is_active(ResourceType::Ambulance));
        filter.toggle(ResourceType::Ambulance);
        assert!(filter.is_active(ResourceType::Ambulance));
    }

    #[test]
    fn test_matches_agrees_with_apply() {
        let resources = sample();
        let filter = ResourceFilter::from_types([ResourceType::Firetruck]).with_query("unit");
        let applied = filter.apply(&resources);
        let matched: Vec<_> = resources.iter().filter(|r| filter.matches(r)).collect();
        assert_eq!(applied, matched);
    }
}

//! Dashboard aggregates over a resource collection
//!
//! Every function accepts `&[Resource]` as well as `&[&Resource]`, so the same
//! aggregates serve the full collection and a filtered view. Equal counts keep
//! first-seen order from the input.

use std::borrow::Borrow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use resmap_types::{Resource, ResourceStatus, ResourceType};
use serde::Serialize;

fn view<R: Borrow<Resource>>(resources: &[R]) -> Vec<&Resource> {
    resources.iter().map(|r| <R as Borrow<Resource>>::borrow(r)).collect()
}

/// `round(count / total * 100)`, 0 for an empty total
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ResourceStatus,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MunicipalityStats {
    pub name: String,
    pub count: usize,
    pub ready: usize,
    pub deployed: usize,
    pub maintenance: usize,
    /// Share of the whole collection
    pub percentage: u32,
}

impl MunicipalityStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            ready: 0,
            deployed: 0,
            maintenance: 0,
            percentage: 0,
        }
    }

    fn record(&mut self, status: ResourceStatus) {
        self.count += 1;
        match status {
            ResourceStatus::Ready => self.ready += 1,
            ResourceStatus::Deployed => self.deployed += 1,
            ResourceStatus::Maintenance => self.maintenance += 1,
        }
    }
}

/// Headline numbers for the dashboard cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_resources: usize,
    pub total_quantity: u64,
    pub statuses: [StatusCount; 3],
    pub municipality_count: usize,
    pub average_per_municipality: usize,
    pub top_municipality: Option<(String, usize)>,
    pub most_common_type: Option<TypeCount>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardStats {
    pub fn status(&self, status: ResourceStatus) -> StatusCount {
        self.statuses
            .iter()
            .copied()
            .find(|s| s.status == status)
            .unwrap_or(StatusCount {
                status,
                count: 0,
                percentage: 0,
            })
    }

    pub fn readiness_percentage(&self) -> u32 {
        self.status(ResourceStatus::Ready).percentage
    }
}

/// Count and share per status, in `ready, deployed, maintenance` order
pub fn status_breakdown<R: Borrow<Resource>>(resources: &[R]) -> [StatusCount; 3] {
    let resources = view(resources);
    let total = resources.len();
    ResourceStatus::ALL.map(|status| {
        let count = resources.iter().filter(|r| r.status == status).count();
        StatusCount {
            status,
            count,
            percentage: percentage(count, total),
        }
    })
}

/// Counts per type, descending, zero counts omitted, optionally truncated
pub fn type_distribution<R: Borrow<Resource>>(
    resources: &[R],
    limit: Option<usize>,
) -> Vec<TypeCount> {
    let resources = view(resources);
    let total = resources.len();
    let mut order: Vec<ResourceType> = Vec::new();
    let mut counts: HashMap<ResourceType, usize> = HashMap::new();
    for resource in &resources {
        let t = resource.resource_type;
        let count = counts.entry(t).or_insert(0);
        if *count == 0 {
            order.push(t);
        }
        *count += 1;
    }

    let mut distribution: Vec<TypeCount> = order
        .into_iter()
        .map(|t| {
            let count = counts[&t];
            TypeCount {
                resource_type: t,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(n) = limit {
        distribution.truncate(n);
    }
    distribution
}

/// Per-municipality totals with status sub-counts, descending by total
pub fn municipality_stats<R: Borrow<Resource>>(resources: &[R]) -> Vec<MunicipalityStats> {
    let resources = view(resources);
    let total = resources.len();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<MunicipalityStats> = Vec::new();
    for resource in resources.iter().copied() {
        let slot = *index
            .entry(resource.municipality.as_str())
            .or_insert_with(|| {
                stats.push(MunicipalityStats::new(&resource.municipality));
                stats.len() - 1
            });
        stats[slot].record(resource.status);
    }

    for entry in &mut stats {
        entry.percentage = percentage(entry.count, total);
    }
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

/// Most recently created records first; records without a timestamp sort last
pub fn recent_activity<R: Borrow<Resource>>(resources: &[R], limit: usize) -> Vec<&Resource> {
    let mut recent = view(resources);
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(limit);
    recent
}

pub fn summarize<R: Borrow<Resource>>(resources: &[R]) -> DashboardStats {
    let resources = view(resources);
    let total_resources = resources.len();
    let total_quantity = resources.iter().map(|r| u64::from(r.quantity)).sum();

    let municipalities = municipality_stats(&resources);
    let municipality_count = municipalities.len();
    let average_per_municipality = if municipality_count > 0 {
        (total_resources as f64 / municipality_count as f64).round() as usize
    } else {
        0
    };
    let top_municipality = municipalities
        .into_iter()
        .next()
        .map(|m| (m.name, m.count));

    DashboardStats {
        total_resources,
        total_quantity,
        statuses: status_breakdown(&resources),
        municipality_count,
        average_per_municipality,
        top_municipality,
        most_common_type: type_distribution(&resources, Some(1)).into_iter().next(),
        last_updated: resources.iter().filter_map(|r| r.created_at).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use resmap_types::GeoPoint;

    fn resource(id: &str, t: ResourceType, municipality: &str, status: ResourceStatus) -> Resource {
        Resource::new(format!("Unit {id}"), t, GeoPoint::new(10.7, 122.5))
            .with_id(id)
            .with_municipality(municipality)
            .with_status(status)
    }

    #[test]
    fn test_two_resource_scenario() {
        let resources = vec![
            resource("1", ResourceType::Ambulance, "Oton", ResourceStatus::Ready),
            resource("2", ResourceType::Firetruck, "Oton", ResourceStatus::Deployed),
        ];
        let breakdown = status_breakdown(&resources);
        assert_eq!(
            breakdown.map(|s| s.count),
            [1, 1, 0],
        );
        assert_eq!(breakdown.map(|s| s.percentage), [50, 50, 0]);
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let resources: Vec<Resource> = Vec::new();
        let stats = summarize(&resources);
        assert_eq!(stats.total_resources, 0);
        assert_eq!(stats.total_quantity, 0);
        assert_eq!(stats.average_per_municipality, 0);
        assert_eq!(stats.readiness_percentage(), 0);
        assert!(stats.statuses.iter().all(|s| s.percentage == 0));
        assert!(stats.top_municipality.is_none());
        assert!(stats.most_common_type.is_none());
        assert!(stats.last_updated.is_none());
        assert!(type_distribution(&resources, None).is_empty());
        assert!(municipality_stats(&resources).is_empty());
    }

    #[test]
    fn test_type_distribution_sorted_and_truncated() {
        let resources = vec![
            resource("1", ResourceType::Ems, "Oton", ResourceStatus::Ready),
            resource("2", ResourceType::Fr, "Oton", ResourceStatus::Ready),
            resource("3", ResourceType::Fr, "Pavia", ResourceStatus::Ready),
            resource("4", ResourceType::Comm, "Pavia", ResourceStatus::Ready),
        ];
        let all = type_distribution(&resources, None);
        let types: Vec<_> = all.iter().map(|t| t.resource_type).collect();
        // ties keep first-seen order
        assert_eq!(types, vec![ResourceType::Fr, ResourceType::Ems, ResourceType::Comm]);
        assert_eq!(all[0].percentage, 50);

        let top = type_distribution(&resources, Some(2));
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_municipality_stats_sub_counts() {
        let resources = vec![
            resource("1", ResourceType::Ems, "Pavia", ResourceStatus::Maintenance),
            resource("2", ResourceType::Fr, "Oton", ResourceStatus::Ready),
            resource("3", ResourceType::Fr, "Oton", ResourceStatus::Deployed),
            resource("4", ResourceType::Comm, "Leganes", ResourceStatus::Ready),
        ];
        let stats = municipality_stats(&resources);
        let names: Vec<_> = stats.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Oton", "Pavia", "Leganes"]);
        assert_eq!(stats[0].count, 2);
        assert_eq!((stats[0].ready, stats[0].deployed, stats[0].maintenance), (1, 1, 0));
        assert_eq!(stats[0].percentage, 50);
        assert_eq!(stats[1].maintenance, 1);
    }

    #[test]
    fn test_summary_scalars() {
        let mut resources = vec![
            resource("1", ResourceType::Ems, "Pavia", ResourceStatus::Ready).with_quantity(3),
            resource("2", ResourceType::Fr, "Oton", ResourceStatus::Ready).with_quantity(2),
            resource("3", ResourceType::Fr, "Oton", ResourceStatus::Deployed).with_quantity(5),
        ];
        let newest = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        resources[0].created_at = Some(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
        resources[1].created_at = Some(newest);
        resources[2].created_at = None;

        let stats = summarize(&resources);
        assert_eq!(stats.total_resources, 3);
        assert_eq!(stats.total_quantity, 10);
        assert_eq!(stats.municipality_count, 2);
        // 3 / 2 = 1.5 rounds up
        assert_eq!(stats.average_per_municipality, 2);
        assert_eq!(stats.top_municipality, Some(("Oton".to_string(), 2)));
        assert_eq!(stats.most_common_type.map(|t| t.resource_type), Some(ResourceType::Fr));
        assert_eq!(stats.readiness_percentage(), 67);
        assert_eq!(stats.last_updated, Some(newest));
    }

    #[test]
    fn test_recent_activity() {
        let mut resources = vec![
            resource("old", ResourceType::Ems, "Pavia", ResourceStatus::Ready),
            resource("none", ResourceType::Ems, "Pavia", ResourceStatus::Ready),
            resource("new", ResourceType::Ems, "Pavia", ResourceStatus::Ready),
        ];
        resources[0].created_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        resources[1].created_at = None;
        resources[2].created_at = Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());

        let recent = recent_activity(&resources, 2);
        let ids: Vec<_> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_works_on_filtered_views() {
        let resources = vec![
            resource("1", ResourceType::Ems, "Pavia", ResourceStatus::Ready),
            resource("2", ResourceType::Fr, "Oton", ResourceStatus::Deployed),
        ];
        let view: Vec<&Resource> = resources.iter().filter(|r| r.resource_type == ResourceType::Fr).collect();
        let stats = summarize(&view);
        assert_eq!(stats.total_resources, 1);
        assert_eq!(stats.status(ResourceStatus::Deployed).percentage, 100);
    }
}

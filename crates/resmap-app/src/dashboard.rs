//! Dashboard query service
//!
//! Applies the current filter and computes every dashboard aggregate over the
//! visible records in one pass, so list, cards and map always agree.

use resmap_domain::service::dashboard::{
    municipality_stats, recent_activity, summarize, type_distribution, DashboardStats,
    MunicipalityStats, TypeCount,
};
use resmap_domain::{to_feature_collection, FeatureCollection, ResourceFilter};
use resmap_types::Resource;
use serde::Serialize;

/// Number of entries in the recent activity list
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub visible: Vec<Resource>,
    pub stats: DashboardStats,
    pub types: Vec<TypeCount>,
    pub municipalities: Vec<MunicipalityStats>,
    pub recent: Vec<Resource>,
}

impl DashboardReport {
    /// Map features for the visible records
    pub fn features(&self) -> FeatureCollection {
        to_feature_collection(&self.visible)
    }
}

/// Filter `resources` and aggregate the result
pub fn build_report(resources: &[Resource], filter: &ResourceFilter, top_types: usize) -> DashboardReport {
    let visible = filter.apply(resources);
    DashboardReport {
        stats: summarize(&visible),
        types: type_distribution(&visible, Some(top_types)),
        municipalities: municipality_stats(&visible),
        recent: recent_activity(&visible, RECENT_LIMIT)
            .into_iter()
            .cloned()
            .collect(),
        visible: visible.into_iter().cloned().collect(),
    }
}

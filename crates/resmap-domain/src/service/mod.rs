//! Domain services

pub mod dashboard;

pub use dashboard::{
    municipality_stats, percentage, recent_activity, status_breakdown, summarize,
    type_distribution, DashboardStats, MunicipalityStats, StatusCount, TypeCount,
};

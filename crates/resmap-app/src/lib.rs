//! Application service layer - config, resource use cases, dashboard queries, map session, export

pub mod config;
pub mod dashboard;
pub mod export;
pub mod map;
pub mod repository;
pub mod resources;

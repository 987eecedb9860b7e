//! Error types for resmap

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// Resource form validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Duplicate resource id: {0}")]
    DuplicateId(String),
}

/// Map widget and icon errors
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to load icon {url}: {reason}")]
    IconLoad { url: String, reason: String },

    #[error("Map source not found: {0}")]
    SourceMissing(String),

    #[error("Unknown cluster: {0}")]
    UnknownCluster(u64),

    #[error("Resource has no map location: {0}")]
    Unmappable(String),
}

/// Location lookup errors
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("Location permission denied")]
    Denied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Excel export error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;

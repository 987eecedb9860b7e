//! Demonstration data generator

use chrono::{DateTime, Duration, Utc};
use resmap_types::{Resource, ResourceStatus, ResourceType};

use crate::constants::{DEFAULT_CENTER, MUNICIPALITIES};

/// Number of records generated when no count is given
pub const DEFAULT_MOCK_COUNT: usize = 45;

const SPREAD_DEGREES: f64 = 0.1;
const MAX_AGE_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Generates plausible resources scattered around the operations center
pub struct MockGenerator {
    rng: fastrand::Rng,
    now: DateTime<Utc>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self {
            rng: fastrand::Rng::new(),
            now: Utc::now(),
        }
    }
}

impl MockGenerator {
    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            now: Utc::now(),
        }
    }

    /// Anchor `createdAt` timestamps to a fixed instant
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn generate(&mut self, count: usize) -> Vec<Resource> {
        (0..count).map(|i| self.next_resource(i)).collect()
    }

    fn next_resource(&mut self, index: usize) -> Resource {
        let rng = &mut self.rng;
        let resource_type = ResourceType::ALL[rng.usize(..ResourceType::ALL.len())];
        let municipality = MUNICIPALITIES[rng.usize(..MUNICIPALITIES.len())];
        let status = ResourceStatus::ALL[rng.usize(..ResourceStatus::ALL.len())];
        let letter = char::from(b'A' + rng.u8(..26));
        let number = rng.u32(..100);

        Resource {
            id: format!("resource-{index}"),
            title: format!("{} Unit {letter}-{number}", resource_type.label()),
            description: format!("Emergency response unit for {resource_type} operations"),
            resource_type,
            quantity: rng.u32(1..=8),
            latitude: Some(DEFAULT_CENTER.latitude + (rng.f64() - 0.5) * SPREAD_DEGREES),
            longitude: Some(DEFAULT_CENTER.longitude + (rng.f64() - 0.5) * SPREAD_DEGREES),
            municipality: municipality.to_string(),
            status,
            created_at: Some(self.now - Duration::milliseconds(rng.i64(0..MAX_AGE_MS))),
            user_id: None,
            extra: Default::default(),
        }
    }
}

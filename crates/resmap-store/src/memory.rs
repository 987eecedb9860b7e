use std::cell::RefCell;

use resmap_types::{Resource, Result};

use crate::{encode_collection, parse_collection, ResourceStore};

/// In-memory store holding the raw serialized collection in a single slot
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    slot: RefCell<Option<String>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw stored content, which may be malformed
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Drop the stored collection
    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }
}

impl ResourceStore for MemoryResourceStore {
    fn load(&self) -> Vec<Resource> {
        self.slot
            .borrow()
            .as_deref()
            .map(parse_collection)
            .unwrap_or_default()
    }

    fn save(&self, resources: &[Resource]) -> Result<()> {
        let content = encode_collection(resources)?;
        *self.slot.borrow_mut() = Some(content);
        Ok(())
    }
}

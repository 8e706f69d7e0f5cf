//! Per-conversion mapping from resourceType to the most recently produced
//! id of that type (`SPEC_FULL.md` §4.5). Published by the Resource Builder
//! after an `isReferenced: true` entry is emitted; consumed by `Reference`
//! expressions.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    latest_by_type: HashMap<String, String>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any prior binding of `resource_type` with `id`, so later
    /// `Reference` expressions see the most recently produced entry.
    pub fn publish(&mut self, resource_type: impl Into<String>, id: impl Into<String>) {
        self.latest_by_type.insert(resource_type.into(), id.into());
    }

    pub fn resolve(&self, resource_type: &str) -> Option<&str> {
        self.latest_by_type.get(resource_type).map(String::as_str)
    }
}

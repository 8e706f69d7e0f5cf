//! Per-conversion audit of which input HL7 positions were read.
//!
//! Shape: `{ messageId, perSegment: { SEG: { available: [...], read: [...] } } }`.

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentCoverage {
    pub available: IndexSet<String>,
    pub read: IndexSet<String>,
}

impl SegmentCoverage {
    /// Paths that held a value but were never consumed by a successful spec evaluation.
    pub fn unread(&self) -> Vec<&String> {
        self.available.iter().filter(|p| !self.read.contains(*p)).collect()
    }
}

/// Coverage record for one conversion. Built incrementally by the Resource
/// Builder (`mark_available`/`mark_read`) and emitted alongside the bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageReport {
    pub message_id: Option<String>,
    pub per_segment: IndexMap<String, SegmentCoverage>,
}

impl CoverageReport {
    pub fn new(message_id: Option<String>) -> Self {
        Self {
            message_id,
            per_segment: IndexMap::new(),
        }
    }

    /// Record that `segment.path` held a non-empty value in the input tree.
    pub fn mark_available(&mut self, segment: &str, path: impl Into<String>) {
        self.per_segment
            .entry(segment.to_string())
            .or_default()
            .available
            .insert(path.into());
    }

    /// Record that `segment.path` was consumed by at least one successful evaluation.
    ///
    /// Only ever called for non-empty values — empty-value resolutions never
    /// touch the coverage tracker (`SPEC_FULL.md` §4.2).
    pub fn mark_read(&mut self, segment: &str, path: impl Into<String>) {
        self.per_segment
            .entry(segment.to_string())
            .or_default()
            .read
            .insert(path.into());
    }

    pub fn unread_paths(&self, segment: &str) -> Vec<&String> {
        self.per_segment
            .get(segment)
            .map(|c| c.unread())
            .unwrap_or_default()
    }
}

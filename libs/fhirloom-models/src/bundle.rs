//! The output bundle produced by one conversion.
//!
//! Shape: `{ type: "collection", timestamp, entries: [{ resourceType, id, ...fields }] }`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Collection,
}

impl Default for BundleType {
    fn default() -> Self {
        BundleType::Collection
    }
}

/// Ordered collection of resource entries produced from one input message.
///
/// Entries appear in Resource-Entry declaration order; within a repeating
/// entry, occurrences appear in input-segment order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "type")]
    pub bundle_type: BundleType,
    pub timestamp: Option<String>,
    pub entries: Vec<BundleEntry>,
}

impl Bundle {
    pub fn new(timestamp: Option<String>) -> Self {
        Self {
            bundle_type: BundleType::Collection,
            timestamp,
            entries: Vec::new(),
        }
    }

    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entries.push(entry);
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a BundleEntry> {
        self.entries
            .iter()
            .filter(move |e| e.resource_type == resource_type)
    }

    /// Most recently added entry of `resource_type`, if any.
    pub fn latest_of_type(&self, resource_type: &str) -> Option<&BundleEntry> {
        self.entries_of_type(resource_type).last()
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// One produced resource record: `{ resourceType, id, ...fields }`.
///
/// `fields` is declaration-ordered (the resource template's field map is an
/// `IndexMap`), so serialization preserves template field order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleEntry {
    pub resource_type: String,
    pub id: String,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl BundleEntry {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// The structured reference value a `Reference` expression emits for this entry.
    pub fn reference_value(&self) -> Value {
        serde_json::json!({ "reference": format!("{}/{}", self.resource_type, self.id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bundle_is_empty_collection() {
        let bundle = Bundle::new(Some("2012-09-12T01:12:30Z".to_string()));
        assert_eq!(bundle.bundle_type, BundleType::Collection);
        assert_eq!(bundle.entry_count(), 0);
    }

    #[test]
    fn add_entry_preserves_order() {
        let mut bundle = Bundle::new(None);
        bundle.add_entry(BundleEntry::new("Patient", "p1"));
        bundle.add_entry(BundleEntry::new("Encounter", "e1"));
        let types: Vec<_> = bundle.entries.iter().map(|e| e.resource_type.as_str()).collect();
        assert_eq!(types, vec!["Patient", "Encounter"]);
    }

    #[test]
    fn latest_of_type_returns_most_recent() {
        let mut bundle = Bundle::new(None);
        bundle.add_entry(BundleEntry::new("AllergyIntolerance", "a1"));
        bundle.add_entry(BundleEntry::new("AllergyIntolerance", "a2"));
        assert_eq!(bundle.latest_of_type("AllergyIntolerance").unwrap().id, "a2");
        assert!(bundle.latest_of_type("Patient").is_none());
    }

    #[test]
    fn field_order_round_trips_through_json() {
        let mut entry = BundleEntry::new("Patient", "p1");
        entry.set_field("birthDate", serde_json::json!("1980-02-02"));
        entry.set_field("gender", serde_json::json!("male"));
        let value = serde_json::to_value(&entry).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["resourceType", "id", "birthDate", "gender"]);
    }

    #[test]
    fn reference_value_has_expected_shape() {
        let entry = BundleEntry::new("Patient", "abc-123");
        assert_eq!(
            entry.reference_value(),
            serde_json::json!({ "reference": "Patient/abc-123" })
        );
    }
}

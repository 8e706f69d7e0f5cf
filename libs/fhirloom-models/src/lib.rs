//! Data model for the output of one HL7-to-FHIR-bundle conversion.
//!
//! # Example
//!
//! ```
//! use fhirloom_models::{Bundle, BundleEntry};
//!
//! let mut bundle = Bundle::new(None);
//! let mut patient = BundleEntry::new("Patient", "p-1");
//! patient.set_field("gender", serde_json::json!("male"));
//! bundle.add_entry(patient);
//! assert_eq!(bundle.entry_count(), 1);
//! ```

pub mod bundle;
pub mod coverage;
pub mod datetime;
pub mod error;

pub use bundle::{Bundle, BundleEntry, BundleType};
pub use coverage::{CoverageReport, SegmentCoverage};
pub use datetime::reformat_hl7_datetime;
pub use error::{Error, Result};

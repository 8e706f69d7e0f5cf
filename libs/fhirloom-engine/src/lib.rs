//! Coordinator, Resource Builder, Expression Evaluator, and Reference Cache:
//! the pieces that turn a parsed HL7 tree and a set of templates into a
//! FHIR-shaped bundle (`SPEC_FULL.md` §4).

pub mod builder;
pub mod coercion;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod evaluator;
pub mod outcome;
pub mod reference;

pub use config::ConversionConfig;
pub use coordinator::{Coordinator, ConversionOutcome};
pub use error::{Error, Result};
pub use evaluator::EvalEnv;
pub use outcome::{FieldOutcome, Warning};
pub use reference::ReferenceCache;

pub use fhirloom_script::{NoopVocabularyLookup, VocabularyLookup};

//! The single hook through which scripts reach an external vocabulary
//! capability, mirroring the teacher's pluggable `PackageLoader` trait with a
//! shipped no-op default (`libs/fhir-context/src/loader.rs`). Sync and
//! object-safe: script evaluation is synchronous end-to-end, so there is no
//! `async_trait` here.

pub trait VocabularyLookup: Send + Sync {
    /// Looks up a display term for `(system, code)`, if known.
    fn lookup(&self, system: &str, code: &str) -> Option<String>;
}

/// Ships by default; answers every lookup with `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVocabularyLookup;

impl VocabularyLookup for NoopVocabularyLookup {
    fn lookup(&self, _system: &str, _code: &str) -> Option<String> {
        None
    }
}

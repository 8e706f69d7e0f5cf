//! The Coordinator: the single entry point tying parsing, template lookup,
//! the Resource Builder, and coverage tracking together into one conversion
//! (`SPEC_FULL.md` §4.6). Mirrors the retrieved pack's `Validator` — a
//! reusable, cheaply-constructed front door that compiles nothing itself and
//! delegates each step to a focused component (`libs/fhir-validator/src/validator.rs`).

use std::sync::Arc;

use fhirloom_hl7::{HL7Tree, Node, Scope};
use fhirloom_models::{Bundle, BundleEntry, CoverageReport};
use fhirloom_script::{Engine as ScriptEngine, NoopVocabularyLookup, VocabularyLookup};
use fhirloom_templates::TemplateLoader;

use crate::builder::build_resource_entries;
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::evaluator::EvalEnv;
use crate::reference::ReferenceCache;

/// The bundle plus the audit trail of what was read and what wasn't.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub bundle: Bundle,
    pub coverage: CoverageReport,
}

pub struct Coordinator {
    loader: TemplateLoader,
    script_engine: ScriptEngine,
    vocabulary: Arc<dyn VocabularyLookup>,
    config: ConversionConfig,
}

impl Coordinator {
    pub fn new(loader: TemplateLoader, config: ConversionConfig) -> Self {
        Self {
            loader,
            script_engine: ScriptEngine::new(),
            vocabulary: Arc::new(NoopVocabularyLookup),
            config,
        }
    }

    /// Attaches a vocabulary lookup implementation, returning `self` for chaining.
    pub fn with_vocabulary(mut self, vocabulary: Arc<dyn VocabularyLookup>) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Converts one parsed HL7 message into a bundle plus coverage report.
    ///
    /// Reads `MSH-9.1`/`MSH-9.2` to form the message type key (e.g.
    /// `ADT_A01`), `MSH-12` for the version (falling back to
    /// [`ConversionConfig::default_version`] when blank), and `MSH-10` for
    /// the message control id used as the coverage report's `messageId`.
    pub fn convert(&self, tree: &HL7Tree) -> Result<ConversionOutcome> {
        let msh = tree
            .first_occurrence("MSH")
            .ok_or_else(|| Error::UnknownMessageType("(missing MSH segment)".to_string()))?;
        let msh_scope = Scope::for_resource_entry(tree, "MSH", msh.clone(), &[]);

        let message_code = read_field(&msh_scope, "MSH.9.1").unwrap_or_default();
        let trigger_event = read_field(&msh_scope, "MSH.9.2").unwrap_or_default();
        let message_type = format!("{message_code}_{trigger_event}");

        if !self.config.allows(&message_type) {
            return Err(Error::UnknownMessageType(message_type));
        }

        let version = read_field(&msh_scope, "MSH.12")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.config.default_version.clone());

        let template = self.loader.load_message_template(&message_type, &version)?;

        let message_id = read_field(&msh_scope, "MSH.10");
        let timestamp = read_field(&msh_scope, "MSH.7");

        let mut bundle = Bundle::new(timestamp);
        let mut reference_cache = ReferenceCache::new();
        let mut coverage = CoverageReport::new(message_id);
        populate_available(tree, &mut coverage);

        for resource_entry in &template.resources {
            let mut env = EvalEnv {
                loader: &self.loader,
                script_engine: &self.script_engine,
                vocabulary: self.vocabulary.clone(),
                reference_cache: &mut reference_cache,
                coverage: &mut coverage,
                max_depth: self.config.max_template_depth,
            };
            let entries: Vec<BundleEntry> = build_resource_entries(resource_entry, tree, &mut env)?;
            for entry in entries {
                bundle.add_entry(entry);
            }
        }

        Ok(ConversionOutcome { bundle, coverage })
    }
}

fn read_field(scope: &Scope, spec: &str) -> Option<String> {
    let spec = fhirloom_hl7::Spec::parse(spec).ok()?;
    fhirloom_hl7::resolve(&spec, scope, false).as_primitive_string()
}

fn populate_available(tree: &HL7Tree, coverage: &mut CoverageReport) {
    for (segment_name, occurrences) in &tree.segments {
        for occurrence in occurrences {
            if let Node::Composite(fields) = occurrence {
                for (index, field) in fields.iter().enumerate() {
                    if field.has_content() {
                        coverage.mark_available(segment_name, format!("{segment_name}.{}", index + 1));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhirloom_hl7::adapt;
    use fhirloom_templates::TemplateSource;

    fn coordinator() -> Coordinator {
        let loader = TemplateLoader::new(TemplateSource::default());
        Coordinator::new(loader, ConversionConfig::default())
    }

    #[test]
    fn converts_minimal_adt_a01() {
        let tree = adapt(
            "MSH|^~\\&|SE050|050|PACS|050|20120912011230||ADT^A01|102|T|2.6\rEVN||201209122222\rPID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\rPV1|1|I|2000^2012^01\r",
        )
        .unwrap();

        let outcome = coordinator().convert(&tree).unwrap();
        assert_eq!(outcome.bundle.entry_count(), 2);
        assert_eq!(outcome.bundle.entries[0].resource_type, "Patient");
        assert_eq!(outcome.bundle.entries[1].resource_type, "Encounter");
        assert_eq!(outcome.coverage.message_id.as_deref(), Some("102"));
    }

    #[test]
    fn unsupported_message_type_is_rejected() {
        let loader = TemplateLoader::new(TemplateSource::default());
        let config = ConversionConfig {
            supported_messages: vec!["ADT_A01".to_string()],
            ..ConversionConfig::default()
        };
        let coordinator = Coordinator::new(loader, config);

        let tree = adapt("MSH|^~\\&|A|B|C|D|20120912011230||ADT^A08|1|T|2.6\r").unwrap();
        let result = coordinator.convert(&tree);
        assert!(matches!(result, Err(Error::UnknownMessageType(ref t)) if t == "ADT_A08"));
    }

    #[test]
    fn blank_version_falls_back_to_default() {
        let tree = adapt(
            "MSH|^~\\&|SE050|050|PACS|050|20120912011230||ADT^A01|102|T|\rPID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\r",
        )
        .unwrap();
        let outcome = coordinator().convert(&tree).unwrap();
        assert_eq!(outcome.bundle.entry_count(), 2);
    }

    #[test]
    fn repeating_allergy_segments_each_become_an_entry() {
        let tree = adapt(
            "MSH|^~\\&|SE050|050|PACS|050|20120912011230||ADT^A01|102|T|2.6\rPID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\rPV1|1|I|2000^2012^01\rAL1|1|DA|PEANUTS\rAL1|2|DA|SHELLFISH\r",
        )
        .unwrap();
        let outcome = coordinator().convert(&tree).unwrap();
        let allergies: Vec<_> = outcome.bundle.entries_of_type("AllergyIntolerance").collect();
        assert_eq!(allergies.len(), 2);
        for allergy in &allergies {
            assert_eq!(allergy.fields.get("patient"), Some(&serde_json::json!({"reference": format!("Patient/{}", outcome.bundle.latest_of_type("Patient").unwrap().id)})));
        }
    }
}

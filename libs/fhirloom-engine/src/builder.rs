//! Resource Builder: turns one Resource Entry declaration (`SPEC_FULL.md`
//! §4.4) into zero or more [`BundleEntry`] values, publishing referenced
//! entries to the [`crate::reference::ReferenceCache`] as they're produced.

use fhirloom_hl7::{HL7Tree, Node, Scope};
use fhirloom_models::BundleEntry;
use fhirloom_script::Context as ScriptContext;
use fhirloom_templates::ResourceEntry;
use uuid::Uuid;

use crate::error::Result;
use crate::evaluator::{evaluate_resource_template, EvalEnv};

/// Builds every occurrence of `entry` found in `tree`: a single occurrence
/// when `entry.repeats` is false, every occurrence (in input order) when true
/// (`SPEC_FULL.md` §4.4, §9 — "first occurrence vs. every occurrence").
pub fn build_resource_entries(
    entry: &ResourceEntry,
    tree: &HL7Tree,
    env: &mut EvalEnv,
) -> Result<Vec<BundleEntry>> {
    let occurrences: Vec<Node> = if entry.repeats {
        tree.occurrences(&entry.segment).to_vec()
    } else {
        tree.first_occurrence(&entry.segment).cloned().into_iter().collect()
    };

    let template = env.loader.load_resource_template(&entry.resource_path)?;

    let mut built = Vec::with_capacity(occurrences.len());
    for occurrence in occurrences {
        let scope = Scope::for_resource_entry(tree, &entry.segment, occurrence, &entry.additional_segments);
        let ctx = ScriptContext::new(scope).with_vocabulary(env.vocabulary.clone());

        let fields = evaluate_resource_template(&template, &ctx, env, 0)?;
        let id = Uuid::new_v4().to_string();
        let mut bundle_entry = BundleEntry::new(entry.resource_name.clone(), id);
        for (name, value) in fields {
            bundle_entry.set_field(name, value);
        }

        if entry.is_referenced {
            env.reference_cache.publish(entry.resource_name.clone(), bundle_entry.id.clone());
        }

        built.push(bundle_entry);
    }

    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhirloom_hl7::adapt;
    use fhirloom_models::CoverageReport;
    use fhirloom_script::{Engine as ScriptEngine, NoopVocabularyLookup};
    use fhirloom_templates::{TemplateLoader, TemplateSource};
    use std::sync::Arc;

    use crate::reference::ReferenceCache;

    #[test]
    fn repeating_entry_builds_one_per_occurrence() {
        let tree = adapt("AL1|1|DA|PEANUTS\rAL1|2|DA|SHELLFISH\r").unwrap();
        let entry = ResourceEntry {
            resource_name: "AllergyIntolerance".to_string(),
            segment: "AL1".to_string(),
            resource_path: "resource/AllergyIntolerance.yml".to_string(),
            repeats: true,
            is_referenced: false,
            additional_segments: Vec::new(),
        };

        let loader = TemplateLoader::new(TemplateSource::default());
        let script_engine = ScriptEngine::new();
        let mut reference_cache = ReferenceCache::new();
        reference_cache.publish("Patient", "p-1");
        let mut coverage = CoverageReport::new(None);
        let mut env = EvalEnv {
            loader: &loader,
            script_engine: &script_engine,
            vocabulary: Arc::new(NoopVocabularyLookup),
            reference_cache: &mut reference_cache,
            coverage: &mut coverage,
            max_depth: 32,
        };

        let built = build_resource_entries(&entry, &tree, &mut env).unwrap();
        assert_eq!(built.len(), 2);
        assert_ne!(built[0].id, built[1].id);
    }

    #[test]
    fn non_repeating_entry_with_no_occurrence_builds_nothing() {
        let tree = adapt("MSH|^~\\&|A|B|C|D|20120912011230||ADT^A01|1|T|2.6\r").unwrap();
        let entry = ResourceEntry {
            resource_name: "Encounter".to_string(),
            segment: "PV1".to_string(),
            resource_path: "resource/Encounter.yml".to_string(),
            repeats: false,
            is_referenced: false,
            additional_segments: Vec::new(),
        };

        let loader = TemplateLoader::new(TemplateSource::default());
        let script_engine = ScriptEngine::new();
        let mut reference_cache = ReferenceCache::new();
        let mut coverage = CoverageReport::new(None);
        let mut env = EvalEnv {
            loader: &loader,
            script_engine: &script_engine,
            vocabulary: Arc::new(NoopVocabularyLookup),
            reference_cache: &mut reference_cache,
            coverage: &mut coverage,
            max_depth: 32,
        };

        let built = build_resource_entries(&entry, &tree, &mut env).unwrap();
        assert!(built.is_empty());
    }

    #[test]
    fn referenced_entry_publishes_to_cache() {
        let tree = adapt(
            "PID|1||123456^^^MRN||DOE^JOHN^A||19800202|M\r",
        )
        .unwrap();
        let entry = ResourceEntry {
            resource_name: "Patient".to_string(),
            segment: "PID".to_string(),
            resource_path: "resource/Patient.yml".to_string(),
            repeats: false,
            is_referenced: true,
            additional_segments: Vec::new(),
        };

        let loader = TemplateLoader::new(TemplateSource::default());
        let script_engine = ScriptEngine::new();
        let mut reference_cache = ReferenceCache::new();
        let mut coverage = CoverageReport::new(None);
        let mut env = EvalEnv {
            loader: &loader,
            script_engine: &script_engine,
            vocabulary: Arc::new(NoopVocabularyLookup),
            reference_cache: &mut reference_cache,
            coverage: &mut coverage,
            max_depth: 32,
        };

        let built = build_resource_entries(&entry, &tree, &mut env).unwrap();
        drop(env);
        assert_eq!(built.len(), 1);
        assert_eq!(reference_cache.resolve("Patient"), Some(built[0].id.as_str()));
    }
}

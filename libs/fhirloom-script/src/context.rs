//! Evaluation context for a script: the enclosing HL7 scope (segments,
//! `$field`) plus named `vars` bindings layered on top, mirroring
//! `libs/fhirpath`'s `Context.variables: Arc<HashMap<Arc<str>, Value>>`
//! cheap-clone-on-push shape.

use std::collections::HashMap;
use std::sync::Arc;

use fhirloom_hl7::Scope as Hl7Scope;

use crate::value::Value;
use crate::vocabulary::VocabularyLookup;

#[derive(Clone)]
pub struct Context {
    hl7: Hl7Scope,
    vars: Arc<HashMap<Arc<str>, Value>>,
    vocabulary: Option<Arc<dyn VocabularyLookup>>,
}

impl Context {
    pub fn new(hl7: Hl7Scope) -> Self {
        Self {
            hl7,
            vars: Arc::new(HashMap::new()),
            vocabulary: None,
        }
    }

    /// Returns a new context with `vocabulary` attached, leaving `self` untouched.
    pub fn with_vocabulary(&self, vocabulary: Arc<dyn VocabularyLookup>) -> Context {
        Context {
            hl7: self.hl7.clone(),
            vars: self.vars.clone(),
            vocabulary: Some(vocabulary),
        }
    }

    pub fn vocabulary(&self) -> Option<&Arc<dyn VocabularyLookup>> {
        self.vocabulary.as_ref()
    }

    /// Returns a new context with `name` bound to `value`, leaving `self` untouched.
    pub fn with_var(&self, name: impl Into<Arc<str>>, value: Value) -> Context {
        let mut vars = (*self.vars).clone();
        vars.insert(name.into(), value);
        Context {
            hl7: self.hl7.clone(),
            vars: Arc::new(vars),
            vocabulary: self.vocabulary.clone(),
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn field_value(&self) -> Option<Value> {
        self.hl7.field().cloned().map(Value::Node)
    }

    pub fn segment_value(&self, name: &str) -> Option<Value> {
        self.hl7.segment(name).cloned().map(Value::Node)
    }

    pub fn hl7_scope(&self) -> &Hl7Scope {
        &self.hl7
    }
}

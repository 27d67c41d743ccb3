//! JSON animation documents.
//!
//! A document mirrors the builder tree. Targets and evaluators cannot live in JSON, so
//! documents name them and a [`DocContext`] supplies the real objects at build time.

pub mod doc;

use std::collections::BTreeMap;

use crate::{
    animation::values::TypeEvaluator,
    foundation::error::{AnimError, AnimResult},
    target::Target,
};

pub use doc::{AnimDoc, KeyframeDoc, ObjectDoc, PropertyDoc, RepeatDoc, SetDoc, TimingDoc, ValueDoc};

/// Named targets and evaluators a document may reference.
#[derive(Clone, Debug, Default)]
pub struct DocContext {
    pub targets: BTreeMap<String, Target>,
    pub evaluators: BTreeMap<String, TypeEvaluator>,
}

impl DocContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, name: impl Into<String>, target: Target) -> Self {
        self.targets.insert(name.into(), target);
        self
    }

    pub fn with_evaluator(mut self, name: impl Into<String>, evaluator: TypeEvaluator) -> Self {
        self.evaluators.insert(name.into(), evaluator);
        self
    }

    pub fn target(&self, name: &str) -> AnimResult<Target> {
        self.targets
            .get(name)
            .cloned()
            .ok_or_else(|| AnimError::config(format!("unknown target '{name}'")))
    }

    pub fn evaluator(&self, name: &str) -> AnimResult<TypeEvaluator> {
        self.evaluators
            .get(name)
            .cloned()
            .ok_or_else(|| AnimError::config(format!("unknown evaluator '{name}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/doc.rs"]
mod tests;

use crate::{
    animation::{
        keyframe::Interpolator,
        values::{PendingValues, TypeEvaluator, ValueSequence},
    },
    compile::plan::PropertyPlan,
    foundation::error::{AnimError, AnimResult},
};

/// Flat value sequence for one named property.
#[derive(Debug)]
pub struct PropertyBuilder {
    name: String,
    values: Option<PendingValues>,
    evaluator: Option<TypeEvaluator>,
}

impl PropertyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: None,
            evaluator: None,
        }
    }

    /// Values spread evenly over the animation; a single value is the end value.
    pub fn values(mut self, values: impl Into<ValueSequence>) -> Self {
        self.values = Some(PendingValues::Typed(values.into()));
        self
    }

    /// Untyped JSON array, classified when the plan is built.
    pub fn raw_values(mut self, values: serde_json::Value) -> Self {
        self.values = Some(PendingValues::Raw(values));
        self
    }

    /// Evaluator for object sequences.
    pub fn evaluator(mut self, evaluator: TypeEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn build(self) -> AnimResult<PropertyPlan> {
        if self.name.trim().is_empty() {
            return Err(AnimError::MissingPropertyName);
        }
        let values = self.values.ok_or(AnimError::MissingValues)?.resolve()?;
        let interpolator = Interpolator::from_values(values, self.evaluator)?;
        Ok(PropertyPlan {
            name: self.name,
            interpolator,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/builder/property.rs"]
mod tests;

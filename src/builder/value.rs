use super::{AnimBuilder, AnimCore, LeafBuilder};
use crate::{
    animation::{
        keyframe::Interpolator,
        values::{PendingValues, TypeEvaluator, ValueSequence},
    },
    compile::plan::{AnimPlan, PlanKind},
    engine::HostRef,
    foundation::error::{AnimError, AnimResult},
    node::AnimationNode,
};

/// One untargeted interpolation, observed through the update listener.
#[derive(Debug, Default)]
pub struct ValueAnimBuilder {
    core: AnimCore,
    values: Option<PendingValues>,
    evaluator: Option<TypeEvaluator>,
}

impl ValueAnimBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(mut self, values: impl Into<ValueSequence>) -> Self {
        self.values = Some(PendingValues::Typed(values.into()));
        self
    }

    /// Untyped JSON array, classified when the plan is built.
    pub fn raw_values(mut self, values: serde_json::Value) -> Self {
        self.values = Some(PendingValues::Raw(values));
        self
    }

    pub fn evaluator(mut self, evaluator: TypeEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_plan(self) -> AnimResult<AnimPlan> {
        let values = self.values.ok_or(AnimError::MissingValues)?.resolve()?;
        let interpolator = Interpolator::from_values(values, self.evaluator)?;
        let (timing, listeners) = self.core.into_parts();
        Ok(AnimPlan {
            timing,
            listeners,
            kind: PlanKind::Value { interpolator },
        })
    }

    /// Compile and realize on `host`.
    pub fn build(self, host: &HostRef) -> AnimResult<AnimationNode> {
        AnimationNode::realize(self.build_plan()?, host)
    }
}

impl AnimBuilder for ValueAnimBuilder {
    fn core(&self) -> &AnimCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AnimCore {
        &mut self.core
    }
}

impl LeafBuilder for ValueAnimBuilder {}

#[cfg(test)]
#[path = "../../tests/unit/builder/value.rs"]
mod tests;

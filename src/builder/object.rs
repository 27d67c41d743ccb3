use super::{AnimBuilder, AnimCore, KeyframesBuilder, LeafBuilder, PropertyBuilder};
use crate::{
    compile::plan::{AnimPlan, PlanKind, PropertyPlan},
    engine::HostRef,
    foundation::error::{AnimError, AnimResult},
    node::AnimationNode,
    target::Target,
};

#[derive(Debug)]
enum PlanSource {
    Values(PropertyBuilder),
    Keyframes(KeyframesBuilder),
}

impl PlanSource {
    fn build(self) -> AnimResult<PropertyPlan> {
        match self {
            Self::Values(b) => b.build(),
            Self::Keyframes(b) => b.build(),
        }
    }
}

/// Property plans applied together to one target over shared timing.
#[derive(Debug, Default)]
pub struct ObjectAnimBuilder {
    core: AnimCore,
    target: Option<Target>,
    properties: Vec<PlanSource>,
}

impl ObjectAnimBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Add a flat value plan.
    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.properties.push(PlanSource::Values(property));
        self
    }

    /// Add a keyframe plan.
    pub fn keyframes(mut self, keyframes: KeyframesBuilder) -> Self {
        self.properties.push(PlanSource::Keyframes(keyframes));
        self
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Take `target` unless one was already set.
    pub(crate) fn inherit_target(&mut self, target: &Target) {
        if self.target.is_none() {
            self.target = Some(target.clone());
        }
    }

    /// Compile every property plan in declaration order.
    ///
    /// A target is required; zero properties compile to an animation that writes nothing.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_plan(self) -> AnimResult<AnimPlan> {
        let target = self.target.ok_or(AnimError::MissingTarget)?;
        let properties = self
            .properties
            .into_iter()
            .map(PlanSource::build)
            .collect::<AnimResult<Vec<_>>>()?;
        let (timing, listeners) = self.core.into_parts();
        Ok(AnimPlan {
            timing,
            listeners,
            kind: PlanKind::Object { target, properties },
        })
    }

    pub fn build(self, host: &HostRef) -> AnimResult<AnimationNode> {
        AnimationNode::realize(self.build_plan()?, host)
    }
}

impl AnimBuilder for ObjectAnimBuilder {
    fn core(&self) -> &AnimCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AnimCore {
        &mut self.core
    }
}

impl LeafBuilder for ObjectAnimBuilder {}

#[cfg(test)]
#[path = "../../tests/unit/builder/object.rs"]
mod tests;

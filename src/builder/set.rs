use super::{AnimBuilder, AnimCore, AnyBuilder, ObjectAnimBuilder, ValueAnimBuilder};
use crate::{
    compile::plan::{AnimPlan, PlanKind},
    engine::HostRef,
    foundation::{core::CompositeMode, error::AnimResult},
    node::AnimationNode,
    target::Target,
};

/// Group of child animations played in parallel or in sequence.
///
/// The group's duration and easing are only reported in plan summaries. They are not pushed
/// down to its children and do not shape the group's progress, which follows the children.
/// Object children added without a target take the group's target as it is
/// at the moment they are added.
#[derive(Debug, Default)]
pub struct AnimSetBuilder {
    core: AnimCore,
    mode: CompositeMode,
    target: Option<Target>,
    children: Vec<AnyBuilder>,
}

impl AnimSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: CompositeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Target handed to object children added from now on.
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn value_anim(mut self, child: ValueAnimBuilder) -> Self {
        self.children.push(AnyBuilder::Value(child));
        self
    }

    pub fn object_anim(mut self, mut child: ObjectAnimBuilder) -> Self {
        if let Some(target) = &self.target {
            child.inherit_target(target);
        }
        self.children.push(AnyBuilder::Object(child));
        self
    }

    /// Nest a group; nested groups keep their own target.
    pub fn anim_set(mut self, child: AnimSetBuilder) -> Self {
        self.children.push(AnyBuilder::Set(child));
        self
    }

    pub fn child(self, child: impl Into<AnyBuilder>) -> Self {
        match child.into() {
            AnyBuilder::Value(b) => self.value_anim(b),
            AnyBuilder::Object(b) => self.object_anim(b),
            AnyBuilder::Set(b) => self.anim_set(b),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Compile children depth-first in declaration order.
    #[tracing::instrument(level = "debug", skip_all, fields(mode = ?self.mode, children = self.children.len()))]
    pub fn build_plan(self) -> AnimResult<AnimPlan> {
        let children = self
            .children
            .into_iter()
            .map(AnyBuilder::build_plan)
            .collect::<AnimResult<Vec<_>>>()?;
        let (timing, listeners) = self.core.into_parts();
        Ok(AnimPlan {
            timing,
            listeners,
            kind: PlanKind::Set {
                mode: self.mode,
                children,
            },
        })
    }

    pub fn build(self, host: &HostRef) -> AnimResult<AnimationNode> {
        AnimationNode::realize(self.build_plan()?, host)
    }
}

impl AnimBuilder for AnimSetBuilder {
    fn core(&self) -> &AnimCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AnimCore {
        &mut self.core
    }
}

#[cfg(test)]
#[path = "../../tests/unit/builder/set.rs"]
mod tests;

//! Chained builders that describe animations and compile them into nodes.
//!
//! Setters only record configuration. Values are typed, evaluators checked and targets
//! required when `build_plan` (or `build`) runs; the only setter that can fail is
//! [`AnimBuilder::start_delay`].

mod keyframes;
mod object;
mod property;
mod set;
mod value;

use crate::{
    animation::ease::Easing,
    compile::plan::AnimPlan,
    engine::HostRef,
    foundation::{
        core::{AnimValue, RepeatCount, RepeatMode, Timing},
        error::{AnimError, AnimResult},
    },
    node::{
        AnimationNode,
        listeners::{LifecycleEvent, Listeners},
    },
};

pub use keyframes::KeyframesBuilder;
pub use object::ObjectAnimBuilder;
pub use property::PropertyBuilder;
pub use set::AnimSetBuilder;
pub use value::ValueAnimBuilder;

/// Timing and listener slots every animation builder carries.
#[derive(Debug, Default)]
pub struct AnimCore {
    pub(crate) timing: Timing,
    pub(crate) listeners: Listeners,
}

impl AnimCore {
    pub(crate) fn into_parts(self) -> (Timing, Listeners) {
        (self.timing, self.listeners)
    }
}

/// Setters shared by value, object and group builders.
pub trait AnimBuilder: Sized {
    fn core(&self) -> &AnimCore;

    fn core_mut(&mut self) -> &mut AnimCore;

    /// Timing recorded so far.
    fn timing(&self) -> &Timing {
        &self.core().timing
    }

    /// Length of one iteration, in milliseconds.
    fn duration(mut self, ms: u64) -> Self {
        self.core_mut().timing.duration = Some(ms);
        self
    }

    /// Delay before the animation begins, in milliseconds.
    ///
    /// Fails with [`AnimError::InvalidStartDelay`] for negative values.
    fn start_delay(mut self, ms: i64) -> AnimResult<Self> {
        let delay = u64::try_from(ms).map_err(|_| AnimError::InvalidStartDelay(ms))?;
        self.core_mut().timing.start_delay = delay;
        Ok(self)
    }

    fn easing(mut self, easing: impl Into<Easing>) -> Self {
        self.core_mut().timing.easing = Some(easing.into());
        self
    }

    fn on_start(self, f: impl FnMut() + 'static) -> Self {
        self.core().listeners.set(LifecycleEvent::Start, f);
        self
    }

    fn on_end(self, f: impl FnMut() + 'static) -> Self {
        self.core().listeners.set(LifecycleEvent::End, f);
        self
    }

    fn on_cancel(self, f: impl FnMut() + 'static) -> Self {
        self.core().listeners.set(LifecycleEvent::Cancel, f);
        self
    }

    fn on_repeat(self, f: impl FnMut() + 'static) -> Self {
        self.core().listeners.set(LifecycleEvent::Repeat, f);
        self
    }

    fn on_pause(self, f: impl FnMut() + 'static) -> Self {
        self.core().listeners.set(LifecycleEvent::Pause, f);
        self
    }

    fn on_resume(self, f: impl FnMut() + 'static) -> Self {
        self.core().listeners.set(LifecycleEvent::Resume, f);
        self
    }
}

/// Setters only leaf animations have.
pub trait LeafBuilder: AnimBuilder {
    fn repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.core_mut().timing.repeat_mode = mode;
        self
    }

    /// Extra iterations after the first; ignored while the repeat mode is `None`.
    fn repeat_count(mut self, count: RepeatCount) -> Self {
        self.core_mut().timing.repeat_count = count;
        self
    }

    /// Single update slot, called once per host tick with the current value.
    fn on_update(self, f: impl FnMut(&AnimValue) + 'static) -> Self {
        self.core().listeners.set_update(f);
        self
    }
}

/// Any builder that can sit inside a group.
#[derive(Debug)]
pub enum AnyBuilder {
    Value(ValueAnimBuilder),
    Object(ObjectAnimBuilder),
    Set(AnimSetBuilder),
}

impl AnyBuilder {
    pub fn build_plan(self) -> AnimResult<AnimPlan> {
        match self {
            Self::Value(b) => b.build_plan(),
            Self::Object(b) => b.build_plan(),
            Self::Set(b) => b.build_plan(),
        }
    }

    pub fn build(self, host: &HostRef) -> AnimResult<AnimationNode> {
        AnimationNode::realize(self.build_plan()?, host)
    }
}

impl From<ValueAnimBuilder> for AnyBuilder {
    fn from(b: ValueAnimBuilder) -> Self {
        Self::Value(b)
    }
}

impl From<ObjectAnimBuilder> for AnyBuilder {
    fn from(b: ObjectAnimBuilder) -> Self {
        Self::Object(b)
    }
}

impl From<AnimSetBuilder> for AnyBuilder {
    fn from(b: AnimSetBuilder) -> Self {
        Self::Set(b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/builder/builder.rs"]
mod tests;

//! animdsl describes animations with chained builders and compiles them into playable
//! animation trees on a host engine.
//!
//! - Describe a value, object or grouped animation with the builders in [`builder`]
//!   (or the closure helpers in [`dsl`]).
//! - `build_plan` validates the description into an immutable [`AnimPlan`].
//! - `build` realizes the plan on a [`HostEngine`] and returns an [`AnimationNode`].
//!
//! [`HeadlessEngine`] is a deterministic host driven by explicit clock ticks.
#![forbid(unsafe_code)]

mod foundation;

pub mod animation;
pub mod builder;
pub mod compile;
pub mod config;
pub mod dsl;
pub mod engine;
pub mod node;
pub mod target;

pub use crate::foundation::core::{
    AnimValue, CompositeMode, ObjectValue, RepeatCount, RepeatMode, Timing, ValueKind,
};
pub use crate::foundation::error::{AnimError, AnimResult};

pub use crate::animation::ease::{Ease, Easing};
pub use crate::animation::keyframe::{Interpolator, Keyframe};
pub use crate::animation::values::{TypeEvaluator, ValueSequence};
pub use crate::builder::{
    AnimBuilder, AnimSetBuilder, AnyBuilder, KeyframesBuilder, LeafBuilder, ObjectAnimBuilder,
    PropertyBuilder, ValueAnimBuilder,
};
pub use crate::compile::plan::{AnimPlan, PlanKind, PlanSummary, PropertyPlan};
pub use crate::config::{AnimDoc, DocContext};
pub use crate::engine::{
    DEFAULT_DURATION_MS, EngineHandle, HeadlessEngine, HostEngine, HostRef, NodeState,
};
pub use crate::node::{AnimationNode, LifecycleEvent, Listeners, NodeKind};
pub use crate::target::{Animatable, PropertyBag, Target};

/// Builder traits, for `use animdsl::prelude::*`.
pub mod prelude {
    pub use crate::builder::{AnimBuilder, LeafBuilder};
    pub use crate::engine::HostEngine;
    pub use crate::target::Animatable;
}

//! Closure-based entry points.
//!
//! ```ignore
//! let node = animdsl::dsl::value_anim(&host, |b| {
//!     Ok(b.values([0.0f32, 360.0]).duration(1_000).start_delay(200)?)
//! })?;
//! node.start()?;
//! ```

use crate::{
    builder::{AnimSetBuilder, ObjectAnimBuilder, ValueAnimBuilder},
    engine::HostRef,
    foundation::error::AnimResult,
    node::AnimationNode,
};

/// Configure and build a value animation.
pub fn value_anim(
    host: &HostRef,
    configure: impl FnOnce(ValueAnimBuilder) -> AnimResult<ValueAnimBuilder>,
) -> AnimResult<AnimationNode> {
    configure(ValueAnimBuilder::new())?.build(host)
}

/// Configure and build an object animation.
pub fn object_anim(
    host: &HostRef,
    configure: impl FnOnce(ObjectAnimBuilder) -> AnimResult<ObjectAnimBuilder>,
) -> AnimResult<AnimationNode> {
    configure(ObjectAnimBuilder::new())?.build(host)
}

/// Configure and build an animation group.
pub fn anim_set(
    host: &HostRef,
    configure: impl FnOnce(AnimSetBuilder) -> AnimResult<AnimSetBuilder>,
) -> AnimResult<AnimationNode> {
    configure(AnimSetBuilder::new())?.build(host)
}

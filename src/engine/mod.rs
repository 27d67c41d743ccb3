//! Host engine interface.
//!
//! The builders never animate anything themselves: a realized node is a set of entries
//! inside a [`HostEngine`], addressed by [`EngineHandle`]s.

pub mod headless;

use std::rc::Rc;

use crate::{
    animation::keyframe::Interpolator,
    compile::plan::PropertyPlan,
    foundation::{
        core::{CompositeMode, Timing},
        error::AnimResult,
    },
    node::listeners::Listeners,
    target::Target,
};

pub use headless::HeadlessEngine;

/// Duration used for animations that never set one.
pub const DEFAULT_DURATION_MS: u64 = 300;

/// Opaque id of one host entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct EngineHandle(pub u64);

/// Playback state of a host entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Never started, or released.
    #[default]
    Idle,
    Running,
    Paused,
    /// Completed naturally.
    Ended,
    Cancelled,
}

impl NodeState {
    /// `true` while started and not yet terminal, including paused.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// Operations a host animation engine provides to realized nodes.
///
/// Methods take `&self`; engines keep their state behind interior mutability and must not
/// hold it borrowed while invoking listeners.
pub trait HostEngine {
    /// Create a leaf entry. `None` creates an object animation awaiting
    /// [`HostEngine::bind_property`] calls.
    fn create_interpolator(
        &self,
        interpolator: Option<Interpolator>,
        timing: &Timing,
    ) -> AnimResult<EngineHandle>;

    /// Attach a property plan to a leaf created without an interpolator.
    fn bind_property(
        &self,
        handle: EngineHandle,
        target: &Target,
        plan: PropertyPlan,
    ) -> AnimResult<EngineHandle>;

    /// Group existing entries under a new composite entry.
    fn compose(
        &self,
        mode: CompositeMode,
        children: &[EngineHandle],
        timing: &Timing,
    ) -> AnimResult<EngineHandle>;

    fn attach_listeners(&self, handle: EngineHandle, listeners: Listeners) -> AnimResult<()>;

    fn start(&self, handle: EngineHandle) -> AnimResult<()>;

    fn cancel(&self, handle: EngineHandle) -> AnimResult<()>;

    fn pause(&self, handle: EngineHandle) -> AnimResult<()>;

    fn resume(&self, handle: EngineHandle) -> AnimResult<()>;

    fn state(&self, handle: EngineHandle) -> NodeState;

    /// Forget an entry. Unknown handles are ignored.
    fn release(&self, handle: EngineHandle);

    fn default_duration(&self) -> u64 {
        DEFAULT_DURATION_MS
    }
}

/// Shared handle to the engine nodes are realized on.
pub type HostRef = Rc<dyn HostEngine>;

//! Realized, playable animations.

pub mod listeners;

use std::fmt;

use crate::{
    compile::plan::{AnimPlan, PlanKind, PropertyPlan},
    engine::{EngineHandle, HostRef, NodeState},
    foundation::{
        core::{AnimValue, CompositeMode, Timing, ValueKind},
        error::AnimResult,
    },
    target::Target,
};

pub use listeners::{LifecycleEvent, Listeners};

/// What a node animates.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Value {
        value_kind: ValueKind,
    },
    Object {
        target: Target,
        properties: Vec<String>,
        value_kind: Option<ValueKind>,
    },
    Set {
        mode: CompositeMode,
    },
}

/// A compiled animation living in a host engine.
///
/// Every build produces a fresh node with its own host entries and listener slots.
/// Dropping the node releases those entries.
pub struct AnimationNode {
    host: HostRef,
    handle: EngineHandle,
    timing: Timing,
    kind: NodeKind,
    listeners: Listeners,
    children: Vec<AnimationNode>,
}

impl AnimationNode {
    /// Hand `plan` to `host`, children first.
    ///
    /// On failure every entry created so far is released again.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn realize(plan: AnimPlan, host: &HostRef) -> AnimResult<Self> {
        let AnimPlan {
            timing,
            listeners,
            kind,
        } = plan;

        let node = match kind {
            PlanKind::Value { interpolator } => {
                let value_kind = interpolator.kind();
                let handle = host.create_interpolator(Some(interpolator), &timing)?;
                let kind = NodeKind::Value { value_kind };
                Self::wrap(host, handle, timing, kind, listeners, Vec::new())
            }
            PlanKind::Object { target, properties } => {
                let handle = host.create_interpolator(None, &timing)?;
                let kind = NodeKind::Object {
                    target: target.clone(),
                    properties: properties.iter().map(|p| p.name.clone()).collect(),
                    value_kind: properties.first().map(PropertyPlan::kind),
                };
                let node = Self::wrap(host, handle, timing, kind, listeners, Vec::new());
                for property in properties {
                    host.bind_property(handle, &target, property)?;
                }
                node
            }
            PlanKind::Set { mode, children } => {
                let children = children
                    .into_iter()
                    .map(|child| Self::realize(child, host))
                    .collect::<AnimResult<Vec<_>>>()?;
                let handles: Vec<EngineHandle> = children.iter().map(|c| c.handle).collect();
                let handle = host.compose(mode, &handles, &timing)?;
                Self::wrap(host, handle, timing, NodeKind::Set { mode }, listeners, children)
            }
        };

        node.host.attach_listeners(node.handle, node.listeners.clone())?;
        tracing::debug!(handle = node.handle.0, "realized");
        Ok(node)
    }

    fn wrap(
        host: &HostRef,
        handle: EngineHandle,
        timing: Timing,
        kind: NodeKind,
        listeners: Listeners,
        children: Vec<AnimationNode>,
    ) -> Self {
        Self {
            host: host.clone(),
            handle,
            timing,
            kind,
            listeners,
            children,
        }
    }

    /// Start from time zero, cancelling a run already in progress.
    pub fn start(&self) -> AnimResult<()> {
        self.host.start(self.handle)
    }

    /// Request cancellation; the host applies it on its next tick.
    pub fn cancel(&self) -> AnimResult<()> {
        self.host.cancel(self.handle)
    }

    pub fn pause(&self) -> AnimResult<()> {
        self.host.pause(self.handle)
    }

    pub fn resume(&self) -> AnimResult<()> {
        self.host.resume(self.handle)
    }

    pub fn state(&self) -> NodeState {
        self.host.state(self.handle)
    }

    /// `true` while running or paused.
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Kind of the values reported to the update listener; `None` for groups.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match &self.kind {
            NodeKind::Value { value_kind } => Some(*value_kind),
            NodeKind::Object { value_kind, .. } => *value_kind,
            NodeKind::Set { .. } => None,
        }
    }

    pub fn children(&self) -> &[AnimationNode] {
        &self.children
    }

    /// Natural completion time in milliseconds; `None` when it repeats forever.
    pub fn total_duration(&self) -> Option<u64> {
        match &self.kind {
            NodeKind::Set { mode } => mode.span(
                self.timing.start_delay,
                self.children.iter().map(AnimationNode::total_duration),
            ),
            _ => self.timing.leaf_span(self.host.default_duration()),
        }
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn on_start(&self, f: impl FnMut() + 'static) -> &Self {
        self.listeners.set(LifecycleEvent::Start, f);
        self
    }

    pub fn on_end(&self, f: impl FnMut() + 'static) -> &Self {
        self.listeners.set(LifecycleEvent::End, f);
        self
    }

    pub fn on_cancel(&self, f: impl FnMut() + 'static) -> &Self {
        self.listeners.set(LifecycleEvent::Cancel, f);
        self
    }

    pub fn on_repeat(&self, f: impl FnMut() + 'static) -> &Self {
        self.listeners.set(LifecycleEvent::Repeat, f);
        self
    }

    pub fn on_pause(&self, f: impl FnMut() + 'static) -> &Self {
        self.listeners.set(LifecycleEvent::Pause, f);
        self
    }

    pub fn on_resume(&self, f: impl FnMut() + 'static) -> &Self {
        self.listeners.set(LifecycleEvent::Resume, f);
        self
    }

    /// Receive every frame's value. Object animations report their first property.
    pub fn on_update(&self, f: impl FnMut(&AnimValue) + 'static) -> &Self {
        self.listeners.set_update(f);
        self
    }
}

impl Drop for AnimationNode {
    fn drop(&mut self) {
        self.host.release(self.handle);
    }
}

impl fmt::Debug for AnimationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationNode")
            .field("handle", &self.handle)
            .field("timing", &self.timing)
            .field("kind", &self.kind)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/node.rs"]
mod tests;

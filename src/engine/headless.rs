use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use super::{DEFAULT_DURATION_MS, EngineHandle, HostEngine, NodeState};
use crate::{
    animation::keyframe::Interpolator,
    compile::plan::PropertyPlan,
    foundation::{
        core::{AnimValue, CompositeMode, RepeatMode, Timing, ValueKind},
        error::{AnimError, AnimResult},
    },
    node::listeners::{LifecycleEvent, Listeners},
    target::Target,
};

/// Deterministic in-process host.
///
/// Time only moves when [`HeadlessEngine::advance`] is called. Every tick first applies
/// queued cancellations, then completes whatever became due (in time order), then
/// samples the running leaves at the new clock. Listeners run after the engine state is
/// released, so they may call back into the engine.
pub struct HeadlessEngine {
    default_duration: u64,
    state: RefCell<EngineState>,
}

enum Notice {
    Event(Listeners, LifecycleEvent),
    Update(Listeners, AnimValue),
}

impl Notice {
    fn deliver(self) {
        match self {
            Self::Event(listeners, event) => listeners.notify(event),
            Self::Update(listeners, value) => listeners.notify_update(&value),
        }
    }
}

struct Binding {
    target: Target,
    plan: PropertyPlan,
}

/// Interpolators of one run, with start values filled in.
struct Resolved {
    value: Option<Interpolator>,
    properties: Vec<Interpolator>,
}

struct Leaf {
    interpolator: Option<Interpolator>,
    bindings: Vec<Binding>,
    resolved: Option<Resolved>,
}

enum Body {
    Leaf(Leaf),
    Group {
        mode: CompositeMode,
        children: Vec<EngineHandle>,
    },
}

#[derive(Default)]
struct RunState {
    started_at: u64,
    paused_at: Option<u64>,
    /// Launched by the parent group, which must hear about completion.
    by_parent: bool,
    reported_iteration: u64,
    /// Group only: children were launched after the group delay.
    launched: bool,
    next_child: usize,
    live_children: usize,
}

struct Entry {
    timing: Timing,
    listeners: Option<Listeners>,
    parent: Option<EngineHandle>,
    body: Body,
    state: NodeState,
    run: RunState,
}

impl Entry {
    fn new(timing: Timing, body: Body) -> Self {
        Self {
            timing,
            listeners: None,
            parent: None,
            body,
            state: NodeState::Idle,
            run: RunState::default(),
        }
    }

    /// Clock time of the next thing this entry does on its own.
    fn due_at(&self, default_duration: u64) -> Option<u64> {
        if self.state != NodeState::Running {
            return None;
        }
        match &self.body {
            Body::Leaf(_) => self
                .timing
                .leaf_span(default_duration)
                .map(|span| self.run.started_at.saturating_add(span)),
            Body::Group { .. } if !self.run.launched => Some(
                self.run
                    .started_at
                    .saturating_add(self.timing.start_delay),
            ),
            Body::Group { .. } => None,
        }
    }
}

fn event(listeners: &Option<Listeners>, event: LifecycleEvent) -> Option<Notice> {
    listeners.clone().map(|l| Notice::Event(l, event))
}

fn unknown(handle: EngineHandle) -> AnimError {
    AnimError::engine(format!("unknown engine handle {}", handle.0))
}

#[derive(Default)]
struct EngineState {
    now: u64,
    next_id: u64,
    entries: BTreeMap<EngineHandle, Entry>,
    pending_cancels: Vec<EngineHandle>,
    outbox: Vec<Notice>,
}

impl EngineState {
    fn insert(&mut self, entry: Entry) -> EngineHandle {
        self.next_id += 1;
        let handle = EngineHandle(self.next_id);
        self.entries.insert(handle, entry);
        handle
    }

    fn entry_mut(&mut self, handle: EngineHandle) -> AnimResult<&mut Entry> {
        self.entries.get_mut(&handle).ok_or_else(|| unknown(handle))
    }

    fn push(&mut self, handle: EngineHandle, ev: LifecycleEvent) {
        if let Some(notice) = self
            .entries
            .get(&handle)
            .and_then(|e| event(&e.listeners, ev))
        {
            self.outbox.push(notice);
        }
    }

    /// `root` and its descendants, parents before children, in declaration order.
    fn subtree(&self, root: EngineHandle) -> Vec<EngineHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(entry) = self.entries.get(&handle) else {
                continue;
            };
            out.push(handle);
            if let Body::Group { children, .. } = &entry.body {
                stack.extend(children.iter().rev());
            }
        }
        out
    }

    fn start(&mut self, handle: EngineHandle, default_duration: u64) -> AnimResult<()> {
        let entry = self.entries.get(&handle).ok_or_else(|| unknown(handle))?;
        let restarting = entry.state.is_running();
        let by_parent = restarting && entry.run.by_parent;
        if restarting {
            tracing::debug!(handle = handle.0, "restart cancels the running animation");
            self.cancel_tree(handle, false);
        }
        let subtree = self.subtree(handle);
        self.pending_cancels.retain(|h| !subtree.contains(h));

        let now = self.now;
        self.launch(handle, now, by_parent);
        self.settle(default_duration);
        self.sample(default_duration);
        Ok(())
    }

    fn launch(&mut self, handle: EngineHandle, at: u64, by_parent: bool) -> bool {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return false;
        };
        entry.state = NodeState::Running;
        entry.run = RunState {
            started_at: at,
            by_parent,
            ..RunState::default()
        };
        if let Body::Leaf(leaf) = &mut entry.body {
            leaf.resolved = None;
        }
        tracing::debug!(handle = handle.0, at, "launch");
        self.push(handle, LifecycleEvent::Start);
        true
    }

    fn launch_child(&mut self, child: EngineHandle, at: u64, parent_paused: bool) -> bool {
        if !self.launch(child, at, true) {
            return false;
        }
        if parent_paused {
            self.pause_tree(child, at, false);
        }
        true
    }

    fn settle(&mut self, default_duration: u64) {
        while let Some((at, handle)) = self.next_due(default_duration) {
            let is_leaf = matches!(
                self.entries.get(&handle).map(|e| &e.body),
                Some(Body::Leaf(_))
            );
            if is_leaf {
                self.finish_leaf(handle, at);
            } else {
                self.open_group(handle, at);
            }
        }
    }

    fn next_due(&self, default_duration: u64) -> Option<(u64, EngineHandle)> {
        self.entries
            .iter()
            .filter_map(|(h, e)| e.due_at(default_duration).map(|at| (at, *h)))
            .filter(|(at, _)| *at <= self.now)
            .min()
    }

    fn finish_leaf(&mut self, handle: EngineHandle, at: u64) {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return;
        };
        let last = entry.timing.iterations().unwrap_or(1).saturating_sub(1);
        while entry.run.reported_iteration < last {
            entry.run.reported_iteration += 1;
            self.outbox
                .extend(event(&entry.listeners, LifecycleEvent::Repeat));
        }

        let backwards = entry.timing.repeat_mode == RepeatMode::Reverse && last % 2 == 1;
        let raw = if backwards { 0.0 } else { 1.0 };
        let fraction = entry.timing.resolved_easing().apply(raw);
        apply_leaf(entry, fraction, &mut self.outbox);

        entry.state = NodeState::Ended;
        self.outbox.extend(event(&entry.listeners, LifecycleEvent::End));
        tracing::debug!(handle = handle.0, at, "leaf ended");
        self.notify_parent(handle, at);
    }

    fn open_group(&mut self, handle: EngineHandle, at: u64) {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return;
        };
        entry.run.launched = true;
        let Body::Group { mode, children } = &entry.body else {
            return;
        };
        let mode = *mode;
        let children = children.clone();

        match mode {
            CompositeMode::Parallel => {
                let mut live = 0;
                for child in children {
                    if self.launch_child(child, at, false) {
                        live += 1;
                    }
                }
                if let Some(entry) = self.entries.get_mut(&handle) {
                    entry.run.live_children = live;
                }
                if live == 0 {
                    self.finish_group(handle, at);
                }
            }
            CompositeMode::Sequential => self.advance_sequence(handle, at),
        }
    }

    fn advance_sequence(&mut self, handle: EngineHandle, at: u64) {
        loop {
            let Some(entry) = self.entries.get_mut(&handle) else {
                return;
            };
            let Body::Group { children, .. } = &entry.body else {
                return;
            };
            let next = children.get(entry.run.next_child).copied();
            entry.run.next_child += 1;
            let paused = entry.state == NodeState::Paused;

            match next {
                None => {
                    self.finish_group(handle, at);
                    return;
                }
                Some(child) => {
                    if self.launch_child(child, at, paused) {
                        return;
                    }
                }
            }
        }
    }

    /// A child ended or was cancelled.
    fn child_done(&mut self, parent: EngineHandle, at: u64) {
        let Some(entry) = self.entries.get_mut(&parent) else {
            return;
        };
        if !entry.state.is_running() {
            return;
        }
        let Body::Group { mode, .. } = &entry.body else {
            return;
        };
        let mode = *mode;

        match mode {
            CompositeMode::Parallel => {
                entry.run.live_children = entry.run.live_children.saturating_sub(1);
                if entry.run.live_children == 0 {
                    self.finish_group(parent, at);
                }
            }
            CompositeMode::Sequential => self.advance_sequence(parent, at),
        }
    }

    fn finish_group(&mut self, handle: EngineHandle, at: u64) {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return;
        };
        entry.state = NodeState::Ended;
        self.outbox.extend(event(&entry.listeners, LifecycleEvent::End));
        tracing::debug!(handle = handle.0, at, "group ended");
        self.notify_parent(handle, at);
    }

    fn notify_parent(&mut self, handle: EngineHandle, at: u64) {
        let parent = match self.entries.get(&handle) {
            Some(entry) if entry.run.by_parent => entry.parent,
            _ => None,
        };
        if let Some(parent) = parent {
            self.child_done(parent, at);
        }
    }

    /// Apply queued cancels. A handle with a queued ancestor is covered by that ancestor.
    fn apply_cancels(&mut self) {
        let queued = std::mem::take(&mut self.pending_cancels);
        let roots: Vec<_> = queued
            .iter()
            .copied()
            .filter(|h| !self.has_queued_ancestor(*h, &queued))
            .collect();
        for handle in roots {
            if self
                .entries
                .get(&handle)
                .is_some_and(|e| e.state.is_running())
            {
                tracing::debug!(handle = handle.0, "cancel applied");
                self.cancel_tree(handle, true);
            }
        }
    }

    fn has_queued_ancestor(&self, handle: EngineHandle, queued: &[EngineHandle]) -> bool {
        let mut cursor = self.entries.get(&handle).and_then(|e| e.parent);
        while let Some(parent) = cursor {
            if queued.contains(&parent) {
                return true;
            }
            cursor = self.entries.get(&parent).and_then(|e| e.parent);
        }
        false
    }

    fn cancel_tree(&mut self, root: EngineHandle, notify_parent: bool) {
        for handle in self.subtree(root) {
            let Some(entry) = self.entries.get_mut(&handle) else {
                continue;
            };
            if !entry.state.is_running() {
                continue;
            }
            entry.state = NodeState::Cancelled;
            entry.run.paused_at = None;
            self.outbox
                .extend(event(&entry.listeners, LifecycleEvent::Cancel));
        }
        if notify_parent {
            let now = self.now;
            self.notify_parent(root, now);
        }
    }

    fn pause_tree(&mut self, root: EngineHandle, at: u64, notify: bool) {
        for handle in self.subtree(root) {
            let Some(entry) = self.entries.get_mut(&handle) else {
                continue;
            };
            if entry.state != NodeState::Running {
                continue;
            }
            entry.state = NodeState::Paused;
            entry.run.paused_at = Some(at);
            if notify {
                self.outbox
                    .extend(event(&entry.listeners, LifecycleEvent::Pause));
            }
        }
    }

    fn resume_tree(&mut self, root: EngineHandle, at: u64) {
        for handle in self.subtree(root) {
            let Some(entry) = self.entries.get_mut(&handle) else {
                continue;
            };
            if entry.state != NodeState::Paused {
                continue;
            }
            let since = entry.run.paused_at.take().unwrap_or(at);
            entry.run.started_at = entry.run.started_at.saturating_add(at.saturating_sub(since));
            entry.state = NodeState::Running;
            self.outbox
                .extend(event(&entry.listeners, LifecycleEvent::Resume));
        }
    }

    /// Write the current frame of every running leaf.
    fn sample(&mut self, default_duration: u64) {
        let now = self.now;
        for entry in self.entries.values_mut() {
            if entry.state != NodeState::Running || !matches!(entry.body, Body::Leaf(_)) {
                continue;
            }
            let elapsed = now.saturating_sub(entry.run.started_at);
            let Some(local) = elapsed.checked_sub(entry.timing.start_delay) else {
                continue;
            };
            let per = entry.timing.resolved_duration(default_duration);
            if per == 0 {
                continue;
            }

            let mut iteration = local / per;
            let mut within = (local % per) as f64 / per as f64;
            if let Some(iterations) = entry.timing.iterations() {
                if iteration >= iterations {
                    iteration = iterations - 1;
                    within = 1.0;
                }
            }
            while entry.run.reported_iteration < iteration {
                entry.run.reported_iteration += 1;
                self.outbox
                    .extend(event(&entry.listeners, LifecycleEvent::Repeat));
            }
            if entry.timing.repeat_mode == RepeatMode::Reverse && iteration % 2 == 1 {
                within = 1.0 - within;
            }

            let fraction = entry.timing.resolved_easing().apply(within);
            apply_leaf(entry, fraction, &mut self.outbox);
        }
    }
}

fn apply_leaf(entry: &mut Entry, fraction: f64, outbox: &mut Vec<Notice>) {
    let Body::Leaf(leaf) = &mut entry.body else {
        return;
    };
    if leaf.resolved.is_none() {
        leaf.resolved = Some(resolve(leaf));
    }
    let Some(resolved) = &leaf.resolved else {
        return;
    };

    let mut reported = resolved
        .value
        .as_ref()
        .and_then(|interp| interp.sample(fraction));
    for (i, (binding, interp)) in leaf.bindings.iter().zip(&resolved.properties).enumerate() {
        let Some(value) = interp.sample(fraction) else {
            continue;
        };
        if let Err(err) = binding.target.set_property(&binding.plan.name, &value) {
            tracing::warn!(property = %binding.plan.name, error = %err, "target write failed");
        }
        if i == 0 {
            reported = Some(value);
        }
    }

    if let (Some(listeners), Some(value)) = (&entry.listeners, reported) {
        outbox.push(Notice::Update(listeners.clone(), value));
    }
}

fn resolve(leaf: &Leaf) -> Resolved {
    Resolved {
        value: leaf
            .interpolator
            .as_ref()
            .map(|interp| fill(interp, zero(interp.kind()).as_ref())),
        properties: leaf
            .bindings
            .iter()
            .map(|b| {
                let current = b.target.property(&b.plan.name);
                fill(&b.plan.interpolator, current.as_ref())
            })
            .collect(),
    }
}

fn fill(interp: &Interpolator, current: Option<&AnimValue>) -> Interpolator {
    if interp.needs_start_value() {
        interp.with_start_value(current)
    } else {
        interp.clone()
    }
}

/// Start value of an untargeted numeric animation.
fn zero(kind: ValueKind) -> Option<AnimValue> {
    match kind {
        ValueKind::Int => Some(AnimValue::Int(0)),
        ValueKind::Float => Some(AnimValue::Float(0.0)),
        ValueKind::Object => None,
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::with_default_duration(DEFAULT_DURATION_MS)
    }

    /// Engine whose untimed animations last `ms`.
    pub fn with_default_duration(ms: u64) -> Self {
        Self {
            default_duration: ms,
            state: RefCell::new(EngineState::default()),
        }
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Current clock in milliseconds.
    pub fn now(&self) -> u64 {
        self.state.try_borrow().map_or(0, |st| st.now)
    }

    /// Move the clock forward by `dt` milliseconds.
    pub fn advance(&self, dt: u64) -> AnimResult<()> {
        let default_duration = self.default_duration;
        self.with_state(|st| {
            st.apply_cancels();
            st.now = st.now.saturating_add(dt);
            st.settle(default_duration);
            st.sample(default_duration);
            Ok(())
        })
    }

    /// Advance in `step` increments until nothing runs or `max_ms` elapsed.
    ///
    /// Returns the time advanced.
    pub fn run_until_idle(&self, step: u64, max_ms: u64) -> AnimResult<u64> {
        let step = step.max(1);
        let mut elapsed = 0;
        while self.has_running() && elapsed < max_ms {
            let dt = step.min(max_ms - elapsed);
            self.advance(dt)?;
            elapsed += dt;
        }
        Ok(elapsed)
    }

    /// `true` while any entry is running or paused.
    pub fn has_running(&self) -> bool {
        self.state
            .try_borrow()
            .is_ok_and(|st| st.entries.values().any(|e| e.state.is_running()))
    }

    /// Number of live entries; released entries are gone.
    pub fn entry_count(&self) -> usize {
        self.state.try_borrow().map_or(0, |st| st.entries.len())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut EngineState) -> AnimResult<R>) -> AnimResult<R> {
        let out = {
            let mut st = self
                .state
                .try_borrow_mut()
                .map_err(|_| AnimError::engine("engine is busy"))?;
            f(&mut st)
        };
        self.dispatch();
        out
    }

    /// Deliver queued notices with the state released.
    fn dispatch(&self) {
        loop {
            let batch = match self.state.try_borrow_mut() {
                Ok(mut st) => std::mem::take(&mut st.outbox),
                Err(_) => return,
            };
            if batch.is_empty() {
                return;
            }
            for notice in batch {
                notice.deliver();
            }
        }
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessEngine")
            .field("default_duration", &self.default_duration)
            .field("now", &self.now())
            .field("entries", &self.entry_count())
            .finish()
    }
}

impl HostEngine for HeadlessEngine {
    fn create_interpolator(
        &self,
        interpolator: Option<Interpolator>,
        timing: &Timing,
    ) -> AnimResult<EngineHandle> {
        self.with_state(|st| {
            let leaf = Leaf {
                interpolator,
                bindings: Vec::new(),
                resolved: None,
            };
            let handle = st.insert(Entry::new(timing.clone(), Body::Leaf(leaf)));
            tracing::debug!(handle = handle.0, "create leaf");
            Ok(handle)
        })
    }

    fn bind_property(
        &self,
        handle: EngineHandle,
        target: &Target,
        plan: PropertyPlan,
    ) -> AnimResult<EngineHandle> {
        self.with_state(|st| match &mut st.entry_mut(handle)?.body {
            Body::Leaf(leaf) if leaf.interpolator.is_none() => {
                tracing::debug!(handle = handle.0, property = %plan.name, "bind property");
                leaf.bindings.push(Binding {
                    target: target.clone(),
                    plan,
                });
                Ok(handle)
            }
            _ => Err(AnimError::engine(format!(
                "entry {} does not accept property bindings",
                handle.0
            ))),
        })
    }

    fn compose(
        &self,
        mode: CompositeMode,
        children: &[EngineHandle],
        timing: &Timing,
    ) -> AnimResult<EngineHandle> {
        self.with_state(|st| {
            if let Some(missing) = children.iter().find(|c| !st.entries.contains_key(*c)) {
                return Err(unknown(*missing));
            }
            let body = Body::Group {
                mode,
                children: children.to_vec(),
            };
            let handle = st.insert(Entry::new(timing.clone(), body));
            for child in children {
                st.entry_mut(*child)?.parent = Some(handle);
            }
            tracing::debug!(handle = handle.0, ?mode, children = children.len(), "compose");
            Ok(handle)
        })
    }

    fn attach_listeners(&self, handle: EngineHandle, listeners: Listeners) -> AnimResult<()> {
        self.with_state(|st| {
            st.entry_mut(handle)?.listeners = Some(listeners);
            Ok(())
        })
    }

    fn start(&self, handle: EngineHandle) -> AnimResult<()> {
        let default_duration = self.default_duration;
        self.with_state(|st| st.start(handle, default_duration))
    }

    fn cancel(&self, handle: EngineHandle) -> AnimResult<()> {
        self.with_state(|st| {
            let running = st.entry_mut(handle)?.state.is_running();
            if running && !st.pending_cancels.contains(&handle) {
                tracing::debug!(handle = handle.0, "cancel queued");
                st.pending_cancels.push(handle);
            }
            Ok(())
        })
    }

    fn pause(&self, handle: EngineHandle) -> AnimResult<()> {
        self.with_state(|st| {
            if st.entry_mut(handle)?.state == NodeState::Running {
                let now = st.now;
                st.pause_tree(handle, now, true);
            }
            Ok(())
        })
    }

    fn resume(&self, handle: EngineHandle) -> AnimResult<()> {
        self.with_state(|st| {
            if st.entry_mut(handle)?.state == NodeState::Paused {
                let now = st.now;
                st.resume_tree(handle, now);
            }
            Ok(())
        })
    }

    fn state(&self, handle: EngineHandle) -> NodeState {
        self.state
            .try_borrow()
            .ok()
            .and_then(|st| st.entries.get(&handle).map(|e| e.state))
            .unwrap_or_default()
    }

    fn release(&self, handle: EngineHandle) {
        match self.state.try_borrow_mut() {
            Ok(mut st) => {
                st.entries.remove(&handle);
                st.pending_cancels.retain(|h| *h != handle);
                tracing::debug!(handle = handle.0, "release");
            }
            Err(_) => tracing::warn!(handle = handle.0, "engine busy; entry not released"),
        }
    }

    fn default_duration(&self) -> u64 {
        self.default_duration
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/headless.rs"]
mod tests;

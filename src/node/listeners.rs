use std::{cell::RefCell, fmt, rc::Rc};

use crate::foundation::core::AnimValue;

/// Lifecycle events a node reports to its listener slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Start,
    End,
    Cancel,
    Repeat,
    Pause,
    Resume,
}

type Callback = Box<dyn FnMut()>;
type UpdateCallback = Box<dyn FnMut(&AnimValue)>;

#[derive(Default)]
struct Slots {
    start: Option<Callback>,
    end: Option<Callback>,
    cancel: Option<Callback>,
    repeat: Option<Callback>,
    pause: Option<Callback>,
    resume: Option<Callback>,
    update: Option<UpdateCallback>,
}

impl Slots {
    fn slot(&mut self, event: LifecycleEvent) -> &mut Option<Callback> {
        match event {
            LifecycleEvent::Start => &mut self.start,
            LifecycleEvent::End => &mut self.end,
            LifecycleEvent::Cancel => &mut self.cancel,
            LifecycleEvent::Repeat => &mut self.repeat,
            LifecycleEvent::Pause => &mut self.pause,
            LifecycleEvent::Resume => &mut self.resume,
        }
    }
}

/// Single-slot callbacks of one animation.
///
/// Setting a slot replaces whatever was there. Clones share the same slots; every build
/// creates a fresh set, so separately built nodes never share callbacks.
#[derive(Clone, Default)]
pub struct Listeners(Rc<RefCell<Slots>>);

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, event: LifecycleEvent, f: impl FnMut() + 'static) {
        *self.0.borrow_mut().slot(event) = Some(Box::new(f));
    }

    pub fn set_update(&self, f: impl FnMut(&AnimValue) + 'static) {
        self.0.borrow_mut().update = Some(Box::new(f));
    }

    pub fn clear(&self, event: LifecycleEvent) {
        *self.0.borrow_mut().slot(event) = None;
    }

    pub fn is_set(&self, event: LifecycleEvent) -> bool {
        let slots = self.0.borrow();
        match event {
            LifecycleEvent::Start => slots.start.is_some(),
            LifecycleEvent::End => slots.end.is_some(),
            LifecycleEvent::Cancel => slots.cancel.is_some(),
            LifecycleEvent::Repeat => slots.repeat.is_some(),
            LifecycleEvent::Pause => slots.pause.is_some(),
            LifecycleEvent::Resume => slots.resume.is_some(),
        }
    }

    pub fn has_update(&self) -> bool {
        self.0.borrow().update.is_some()
    }

    /// Invoke the slot for `event`, if any.
    ///
    /// The callback is taken out while it runs, so it may replace its own slot; a
    /// replacement made during the call wins.
    pub(crate) fn notify(&self, event: LifecycleEvent) {
        let taken = self.0.borrow_mut().slot(event).take();
        if let Some(mut callback) = taken {
            callback();
            let mut slots = self.0.borrow_mut();
            let slot = slots.slot(event);
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }

    pub(crate) fn notify_update(&self, value: &AnimValue) {
        let taken = self.0.borrow_mut().update.take();
        if let Some(mut callback) = taken {
            callback(value);
            let mut slots = self.0.borrow_mut();
            if slots.update.is_none() {
                slots.update = Some(callback);
            }
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.0.borrow();
        f.debug_struct("Listeners")
            .field("start", &slots.start.is_some())
            .field("end", &slots.end.is_some())
            .field("cancel", &slots.cancel.is_some())
            .field("repeat", &slots.repeat.is_some())
            .field("pause", &slots.pause.is_some())
            .field("resume", &slots.resume.is_some())
            .field("update", &slots.update.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/listeners.rs"]
mod tests;

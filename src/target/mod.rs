//! Animation targets.
//!
//! A target is an external object with named, settable values. Animations only hold
//! [`Target`] references to it; the caller keeps ownership of the object itself.

mod bag;

use std::{cell::RefCell, fmt, rc::Rc};

use crate::foundation::{
    core::AnimValue,
    error::{AnimError, AnimResult},
};

pub use bag::PropertyBag;

/// An object whose named properties can be driven by an animation.
pub trait Animatable {
    /// Current value of `name`, if the object has such a property.
    fn property(&self, name: &str) -> Option<AnimValue>;

    /// Write `value` to `name`.
    fn set_property(&mut self, name: &str, value: &AnimValue) -> AnimResult<()>;
}

/// Shared handle to an [`Animatable`].
#[derive(Clone)]
pub struct Target(Rc<RefCell<dyn Animatable>>);

impl Target {
    /// Move `object` behind a new handle.
    pub fn new<T: Animatable + 'static>(object: T) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Reference an object the caller keeps a typed handle to.
    pub fn from_shared<T: Animatable + 'static>(object: Rc<RefCell<T>>) -> Self {
        Self(object)
    }

    /// `true` when both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub fn property(&self, name: &str) -> Option<AnimValue> {
        self.0.try_borrow().ok()?.property(name)
    }

    pub fn set_property(&self, name: &str, value: &AnimValue) -> AnimResult<()> {
        let mut object = self
            .0
            .try_borrow_mut()
            .map_err(|_| AnimError::engine(format!("target is busy while writing '{name}'")))?;
        object.set_property(name, value)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({:p})", Rc::as_ptr(&self.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/target/target.rs"]
mod tests;

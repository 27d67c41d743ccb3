use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::Animatable;
use crate::foundation::{core::AnimValue, error::AnimResult};

/// A plain map of named values; accepts writes to any property.
#[derive(Clone, Debug, Default, serde::Serialize)]
#[serde(transparent)]
pub struct PropertyBag {
    values: BTreeMap<String, AnimValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AnimValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AnimValue> {
        self.values.get(name)
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(AnimValue::as_f32)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnimValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl Animatable for PropertyBag {
    fn property(&self, name: &str) -> Option<AnimValue> {
        self.values.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: &AnimValue) -> AnimResult<()> {
        self.values.insert(name.to_string(), value.clone());
        Ok(())
    }
}

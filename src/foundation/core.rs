use std::{any::Any, fmt, rc::Rc};

use crate::animation::ease::Easing;

/// Element kind carried by a value sequence, keyframe or interpolated value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// 32-bit signed integers.
    Int,
    /// 32-bit floats.
    Float,
    /// Type-erased objects interpolated through an evaluator.
    Object,
}

/// Type-erased, cheaply clonable object value.
#[derive(Clone)]
pub struct ObjectValue(Rc<dyn Any>);

impl ObjectValue {
    /// Wrap `value`.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrow the wrapped value as `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Return `true` when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.downcast_ref::<serde_json::Value>() {
            Some(v) => write!(f, "ObjectValue({v})"),
            None => f.write_str("ObjectValue(..)"),
        }
    }
}

/// One interpolated value, as written to targets and passed to update callbacks.
#[derive(Clone, Debug)]
pub enum AnimValue {
    /// Integer value.
    Int(i32),
    /// Float value.
    Float(f32),
    /// Object value produced by an evaluator.
    Object(ObjectValue),
}

impl AnimValue {
    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Numeric view of the value; `None` for objects.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(f64::from(*v)),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Object(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|v| v as f32)
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for AnimValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                a.ptr_eq(b)
                    || matches!(
                        (
                            a.downcast_ref::<serde_json::Value>(),
                            b.downcast_ref::<serde_json::Value>()
                        ),
                        (Some(x), Some(y)) if x == y
                    )
            }
            _ => false,
        }
    }
}

impl From<i32> for AnimValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for AnimValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<ObjectValue> for AnimValue {
    fn from(v: ObjectValue) -> Self {
        Self::Object(v)
    }
}

impl serde::Serialize for AnimValue {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => s.serialize_i32(*v),
            Self::Float(v) => s.serialize_f32(*v),
            Self::Object(v) => match v.downcast_ref::<serde_json::Value>() {
                Some(json) => serde::Serialize::serialize(json, s),
                None => s.serialize_unit(),
            },
        }
    }
}

/// What happens when a leaf animation reaches the end of an iteration.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Play once; the repeat count is ignored.
    #[default]
    None,
    /// Jump back to the start for each repetition.
    Restart,
    /// Alternate direction on each repetition.
    Reverse,
}

/// Number of extra iterations after the first one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatCount {
    /// Repeat `n` more times.
    Finite(u32),
    /// Repeat until cancelled.
    Infinite,
}

impl RepeatCount {
    /// Raw sentinel for [`RepeatCount::Infinite`].
    pub const INFINITE: i32 = -1;

    /// Map a raw count; negative values mean infinite.
    pub fn from_raw(raw: i32) -> Self {
        u32::try_from(raw).map_or(Self::Infinite, Self::Finite)
    }
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Finite(0)
    }
}

/// How a composite starts its children.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMode {
    /// All children start together.
    #[default]
    Parallel,
    /// Each child starts after its predecessor finishes.
    Sequential,
}

impl CompositeMode {
    /// Natural span of a group, given its start delay and its children's spans.
    ///
    /// `None` means the group never completes on its own.
    pub fn span(
        self,
        start_delay: u64,
        children: impl IntoIterator<Item = Option<u64>>,
    ) -> Option<u64> {
        let mut acc = 0u64;
        for child in children {
            let child = child?;
            acc = match self {
                Self::Parallel => acc.max(child),
                Self::Sequential => acc.saturating_add(child),
            };
        }
        Some(start_delay.saturating_add(acc))
    }
}

/// Timing shared by every animation description.
///
/// `duration` and `easing` stay `None` until set, so the host can apply its own defaults.
#[derive(Clone, Debug, Default)]
pub struct Timing {
    /// Length of one iteration in milliseconds.
    pub duration: Option<u64>,
    /// Delay before the first iteration, in milliseconds.
    pub start_delay: u64,
    /// Easing applied to overall progress.
    pub easing: Option<Easing>,
    pub repeat_mode: RepeatMode,
    pub repeat_count: RepeatCount,
}

impl Timing {
    /// Total number of iterations, `None` when infinite.
    pub fn iterations(&self) -> Option<u64> {
        match (self.repeat_mode, self.repeat_count) {
            (RepeatMode::None, _) => Some(1),
            (_, RepeatCount::Finite(n)) => Some(u64::from(n) + 1),
            (_, RepeatCount::Infinite) => None,
        }
    }

    pub fn resolved_duration(&self, default_duration: u64) -> u64 {
        self.duration.unwrap_or(default_duration)
    }

    /// Easing to apply, linear when none was set.
    pub fn resolved_easing(&self) -> Easing {
        self.easing.clone().unwrap_or_default()
    }

    /// Natural span of a leaf animation with this timing.
    pub fn leaf_span(&self, default_duration: u64) -> Option<u64> {
        let per = self.resolved_duration(default_duration);
        let iterations = self.iterations()?;
        Some(self.start_delay.saturating_add(per.saturating_mul(iterations)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

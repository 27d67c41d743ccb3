use std::{any::Any, fmt, rc::Rc};

use crate::foundation::{
    core::{AnimValue, ObjectValue, ValueKind},
    error::{AnimError, AnimResult},
};

/// A typed sequence of animation values.
#[derive(Clone, Debug)]
pub enum ValueSequence {
    Int(Vec<i32>),
    Float(Vec<f32>),
    /// Objects; interpolating them needs a [`TypeEvaluator`].
    Object(Vec<ObjectValue>),
}

impl ValueSequence {
    pub fn ints(values: impl IntoIterator<Item = i32>) -> Self {
        Self::Int(values.into_iter().collect())
    }

    pub fn floats(values: impl IntoIterator<Item = f32>) -> Self {
        Self::Float(values.into_iter().collect())
    }

    /// Wrap each value as an [`ObjectValue`].
    pub fn objects<T: Any>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Object(values.into_iter().map(ObjectValue::new).collect())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Object(_) => ValueKind::Object,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_values(self) -> Vec<AnimValue> {
        match self {
            Self::Int(v) => v.into_iter().map(AnimValue::Int).collect(),
            Self::Float(v) => v.into_iter().map(AnimValue::Float).collect(),
            Self::Object(v) => v.into_iter().map(AnimValue::Object).collect(),
        }
    }

    /// Classify a JSON array.
    ///
    /// All-integer arrays become [`ValueSequence::Int`], other numeric arrays become
    /// [`ValueSequence::Float`], and arrays of objects or strings become
    /// [`ValueSequence::Object`]. Anything else is rejected.
    pub fn from_json(value: &serde_json::Value) -> AnimResult<Self> {
        let Some(items) = value.as_array() else {
            return Err(AnimError::unsupported(format!(
                "expected an array of values, found {}",
                json_type(value)
            )));
        };
        if items.is_empty() {
            return Err(AnimError::unsupported("empty value array"));
        }

        if items.iter().all(serde_json::Value::is_number) {
            let ints: Option<Vec<i32>> = items
                .iter()
                .map(|v| v.as_i64().and_then(|i| i32::try_from(i).ok()))
                .collect();
            if let Some(ints) = ints {
                return Ok(Self::Int(ints));
            }
            let floats = items
                .iter()
                .filter_map(serde_json::Value::as_f64)
                .map(|f| f as f32)
                .collect();
            return Ok(Self::Float(floats));
        }

        if items.iter().all(|v| v.is_object() || v.is_string()) {
            return Ok(Self::Object(
                items.iter().cloned().map(ObjectValue::new).collect(),
            ));
        }

        let kinds: Vec<&str> = items.iter().map(json_type).collect();
        Err(AnimError::unsupported(format!(
            "array of [{}]",
            kinds.join(", ")
        )))
    }
}

impl From<Vec<i32>> for ValueSequence {
    fn from(v: Vec<i32>) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<f32>> for ValueSequence {
    fn from(v: Vec<f32>) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<ObjectValue>> for ValueSequence {
    fn from(v: Vec<ObjectValue>) -> Self {
        Self::Object(v)
    }
}

impl<const N: usize> From<[i32; N]> for ValueSequence {
    fn from(v: [i32; N]) -> Self {
        Self::Int(v.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for ValueSequence {
    fn from(v: [f32; N]) -> Self {
        Self::Float(v.to_vec())
    }
}

/// Values as recorded by a builder, classified only when the builder is compiled.
#[derive(Clone, Debug)]
pub(crate) enum PendingValues {
    Typed(ValueSequence),
    Raw(serde_json::Value),
}

impl PendingValues {
    pub(crate) fn resolve(self) -> AnimResult<ValueSequence> {
        match self {
            Self::Typed(seq) => Ok(seq),
            Self::Raw(json) => ValueSequence::from_json(&json),
        }
    }
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

type EvalFn = dyn Fn(f64, &ObjectValue, &ObjectValue) -> ObjectValue;

/// Computes an intermediate object between two endpoints at a progress fraction.
#[derive(Clone)]
pub struct TypeEvaluator(Rc<EvalFn>);

impl TypeEvaluator {
    /// Wrap an evaluator working on type-erased values.
    pub fn new(f: impl Fn(f64, &ObjectValue, &ObjectValue) -> ObjectValue + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Wrap an evaluator for values of type `T`.
    ///
    /// Endpoints of any other type are not interpolated: the nearer endpoint is returned.
    pub fn typed<T: Any>(f: impl Fn(f64, &T, &T) -> T + 'static) -> Self {
        Self::new(move |t, a, b| {
            match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
                (Some(x), Some(y)) => ObjectValue::new(f(t, x, y)),
                _ => {
                    tracing::warn!(
                        expected = std::any::type_name::<T>(),
                        "evaluator endpoints have an unexpected type"
                    );
                    if t < 0.5 { a.clone() } else { b.clone() }
                }
            }
        })
    }

    /// Interpolate numeric fields of two JSON objects; other fields hold the start value.
    pub fn json_lerp() -> Self {
        Self::typed::<serde_json::Value>(|t, a, b| lerp_json(a, b, t))
    }

    pub fn evaluate(&self, t: f64, start: &ObjectValue, end: &ObjectValue) -> ObjectValue {
        (self.0)(t, start, end)
    }
}

impl fmt::Debug for TypeEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeEvaluator(..)")
    }
}

fn lerp_json(a: &serde_json::Value, b: &serde_json::Value, t: f64) -> serde_json::Value {
    use serde_json::Value;

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => {
                serde_json::Number::from_f64(x + (y - x) * t).map_or(Value::Null, Value::Number)
            }
            _ => a.clone(),
        },
        (Value::Object(x), Value::Object(y)) => Value::Object(
            x.iter()
                .map(|(k, xv)| {
                    let v = match y.get(k) {
                        Some(yv) => lerp_json(xv, yv, t),
                        None => xv.clone(),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        _ => a.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/values.rs"]
mod tests;

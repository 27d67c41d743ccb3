use crate::{
    animation::{
        ease::Easing,
        values::{TypeEvaluator, ValueSequence},
    },
    foundation::{
        core::{AnimValue, ObjectValue, ValueKind},
        error::{AnimError, AnimResult},
    },
};

/// One keyframe of a property plan.
#[derive(Clone, Debug)]
pub struct Keyframe {
    /// Position in overall progress, `[0, 1]`.
    pub fraction: f64,
    /// Kind declared for this keyframe, even when it carries no value.
    pub kind: ValueKind,
    /// Value at `fraction`; `None` takes the target's value when the animation starts.
    pub value: Option<AnimValue>,
    /// Easing for the segment that ends at this keyframe.
    pub easing: Option<Easing>,
}

impl Keyframe {
    pub fn int(fraction: f64, value: i32) -> Self {
        Self::with_value(fraction, AnimValue::Int(value))
    }

    pub fn float(fraction: f64, value: f32) -> Self {
        Self::with_value(fraction, AnimValue::Float(value))
    }

    pub fn object(fraction: f64, value: ObjectValue) -> Self {
        Self::with_value(fraction, AnimValue::Object(value))
    }

    /// Keyframe without a value.
    pub fn empty(kind: ValueKind, fraction: f64) -> Self {
        Self {
            fraction,
            kind,
            value: None,
            easing: None,
        }
    }

    pub fn with_easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    fn with_value(fraction: f64, value: AnimValue) -> Self {
        Self {
            fraction,
            kind: value.kind(),
            value: Some(value),
            easing: None,
        }
    }
}

/// A compiled, typed interpolation: ordered keyframes plus an optional evaluator.
#[derive(Clone, Debug)]
pub struct Interpolator {
    kind: ValueKind,
    frames: Vec<Keyframe>,
    evaluator: Option<TypeEvaluator>,
}

impl Interpolator {
    /// Spread a flat sequence evenly over `[0, 1]`.
    ///
    /// A single value becomes the end value; the start is taken from the target.
    pub fn from_values(seq: ValueSequence, evaluator: Option<TypeEvaluator>) -> AnimResult<Self> {
        if seq.is_empty() {
            return Err(AnimError::MissingValues);
        }
        let kind = seq.kind();
        if kind == ValueKind::Object && evaluator.is_none() {
            return Err(AnimError::MissingEvaluator);
        }

        let mut values = seq.into_values();
        let frames = if values.len() == 1 {
            let end = values.remove(0);
            vec![Keyframe::empty(kind, 0.0), Keyframe::with_value(1.0, end)]
        } else {
            let last = (values.len() - 1) as f64;
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| Keyframe::with_value(i as f64 / last, v))
                .collect()
        };

        Ok(Self {
            kind,
            frames,
            evaluator,
        })
    }

    /// Validate and adopt an explicit keyframe list.
    pub fn from_keyframes(
        frames: Vec<Keyframe>,
        evaluator: Option<TypeEvaluator>,
    ) -> AnimResult<Self> {
        let Some(first) = frames.first() else {
            return Err(AnimError::MissingValues);
        };
        let kind = first.kind;

        for k in &frames {
            if !(0.0..=1.0).contains(&k.fraction) {
                return Err(AnimError::InvalidFraction(k.fraction));
            }
            if k.kind != kind {
                return Err(AnimError::InconsistentKeyframeType {
                    expected: kind,
                    found: k.kind,
                });
            }
        }
        if let Some(w) = frames.windows(2).find(|w| w[1].fraction < w[0].fraction) {
            return Err(AnimError::UnorderedKeyframes {
                prev: w[0].fraction,
                next: w[1].fraction,
            });
        }
        if kind == ValueKind::Object && evaluator.is_none() {
            return Err(AnimError::MissingEvaluator);
        }

        Ok(Self {
            kind,
            frames,
            evaluator,
        })
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    /// `true` when some keyframe has no value yet.
    pub fn needs_start_value(&self) -> bool {
        self.frames.iter().any(|k| k.value.is_none())
    }

    /// Fill value-less keyframes.
    ///
    /// `current` (usually the target's value when the animation starts) wins; without it
    /// each gap takes the nearest declared value, preferring the following one.
    pub fn with_start_value(&self, current: Option<&AnimValue>) -> Self {
        let current = current.and_then(|v| coerce(v, self.kind));
        let mut out = self.clone();
        for i in 0..out.frames.len() {
            if out.frames[i].value.is_some() {
                continue;
            }
            let fill = current.clone().or_else(|| {
                self.frames[i..]
                    .iter()
                    .chain(self.frames[..i].iter().rev())
                    .find_map(|k| k.value.clone())
            });
            out.frames[i].value = fill;
        }
        out
    }

    /// Value at overall progress `fraction`.
    ///
    /// Fractions outside the keyframe range extrapolate along the first or last segment.
    /// Returns `None` only while both ends of the active segment lack values.
    pub fn sample(&self, fraction: f64) -> Option<AnimValue> {
        let frames = &self.frames;
        let n = frames.len();
        if n == 1 {
            return frames[0].value.clone();
        }

        let idx = if fraction <= 0.0 {
            1
        } else if fraction >= 1.0 {
            n - 1
        } else {
            match frames[1..].iter().position(|k| fraction < k.fraction) {
                Some(p) => p + 1,
                None => return frames[n - 1].value.clone(),
            }
        };

        let a = &frames[idx - 1];
        let b = &frames[idx];
        let span = b.fraction - a.fraction;
        let mut t = if span > 0.0 {
            (fraction - a.fraction) / span
        } else {
            1.0
        };
        if let Some(easing) = &b.easing {
            t = easing.apply(t);
        }

        match (&a.value, &b.value) {
            (Some(av), Some(bv)) => Some(self.mix(av, bv, t)),
            (av, bv) => bv.clone().or_else(|| av.clone()),
        }
    }

    fn mix(&self, a: &AnimValue, b: &AnimValue, t: f64) -> AnimValue {
        match (a, b) {
            (AnimValue::Int(x), AnimValue::Int(y)) => {
                let x = f64::from(*x);
                let y = f64::from(*y);
                AnimValue::Int((x + (y - x) * t) as i32)
            }
            (AnimValue::Float(x), AnimValue::Float(y)) => {
                let x = f64::from(*x);
                let y = f64::from(*y);
                AnimValue::Float((x + (y - x) * t) as f32)
            }
            (AnimValue::Object(x), AnimValue::Object(y)) => match &self.evaluator {
                Some(eval) => AnimValue::Object(eval.evaluate(t, x, y)),
                None => a.clone(),
            },
            _ => a.clone(),
        }
    }
}

fn coerce(value: &AnimValue, kind: ValueKind) -> Option<AnimValue> {
    match (value, kind) {
        (AnimValue::Int(v), ValueKind::Int) => Some(AnimValue::Int(*v)),
        (AnimValue::Int(v), ValueKind::Float) => Some(AnimValue::Float(*v as f32)),
        (AnimValue::Float(v), ValueKind::Float) => Some(AnimValue::Float(*v)),
        (AnimValue::Float(v), ValueKind::Int) => Some(AnimValue::Int(*v as i32)),
        (AnimValue::Object(v), ValueKind::Object) => Some(AnimValue::Object(v.clone())),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;

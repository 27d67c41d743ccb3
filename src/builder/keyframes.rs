use crate::{
    animation::{
        keyframe::{Interpolator, Keyframe},
        values::TypeEvaluator,
    },
    compile::plan::PropertyPlan,
    foundation::{
        core::ObjectValue,
        error::{AnimError, AnimResult},
    },
};

/// Explicit keyframes for one named property.
///
/// Entries keep declaration order; each entry's easing shapes the segment ending at it.
#[derive(Debug)]
pub struct KeyframesBuilder {
    name: String,
    frames: Vec<Keyframe>,
    evaluator: Option<TypeEvaluator>,
}

impl KeyframesBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
            evaluator: None,
        }
    }

    pub fn keyframe(mut self, keyframe: Keyframe) -> Self {
        self.frames.push(keyframe);
        self
    }

    pub fn int(self, fraction: f64, value: i32) -> Self {
        self.keyframe(Keyframe::int(fraction, value))
    }

    pub fn float(self, fraction: f64, value: f32) -> Self {
        self.keyframe(Keyframe::float(fraction, value))
    }

    pub fn object(self, fraction: f64, value: ObjectValue) -> Self {
        self.keyframe(Keyframe::object(fraction, value))
    }

    pub fn evaluator(mut self, evaluator: TypeEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn build(self) -> AnimResult<PropertyPlan> {
        if self.name.trim().is_empty() {
            return Err(AnimError::MissingPropertyName);
        }
        let interpolator = Interpolator::from_keyframes(self.frames, self.evaluator)?;
        Ok(PropertyPlan {
            name: self.name,
            interpolator,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/builder/keyframes.rs"]
mod tests;

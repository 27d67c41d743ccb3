use std::{collections::BTreeSet, fs, path::Path};

use serde_json::Value;

use super::DocContext;
use crate::{
    animation::{ease::Ease, keyframe::Keyframe, values::ValueSequence},
    builder::{
        AnimBuilder, AnimSetBuilder, AnyBuilder, KeyframesBuilder, LeafBuilder,
        ObjectAnimBuilder, PropertyBuilder, ValueAnimBuilder,
    },
    foundation::{
        core::{AnimValue, CompositeMode, ObjectValue, RepeatCount, RepeatMode, ValueKind},
        error::{AnimError, AnimResult},
    },
};

/// One animation in a document, tagged by `"kind"`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimDoc {
    Value(ValueDoc),
    Object(ObjectDoc),
    Set(SetDoc),
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct TimingDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Signed so that negative delays reach the builder and fail there.
    #[serde(default)]
    pub start_delay: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Ease>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RepeatDoc {
    #[serde(default)]
    pub mode: RepeatMode,
    /// Extra iterations; negative means forever.
    #[serde(default)]
    pub count: i32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ValueDoc {
    #[serde(flatten)]
    pub timing: TimingDoc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ObjectDoc {
    #[serde(flatten)]
    pub timing: TimingDoc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDoc>,
}

/// A property plan: either `values` or `keyframes`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PropertyDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<Vec<KeyframeDoc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct KeyframeDoc {
    pub fraction: f64,
    /// Overrides the kind inferred from the plan's values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Ease>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SetDoc {
    #[serde(flatten)]
    pub timing: TimingDoc,
    #[serde(default)]
    pub mode: CompositeMode,
    /// Handed to object children that name no target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub children: Vec<AnimDoc>,
}

impl AnimDoc {
    pub fn from_json_str(s: &str) -> AnimResult<Self> {
        serde_json::from_str(s).map_err(|e| AnimError::serde(format!("parse animation JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> AnimResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            AnimError::config(format!("read animation JSON '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Every target name referenced anywhere in the tree.
    pub fn target_names(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_targets(&mut out);
        out
    }

    fn collect_targets(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Value(_) => {}
            Self::Object(doc) => out.extend(doc.target.clone()),
            Self::Set(doc) => {
                out.extend(doc.target.clone());
                for child in &doc.children {
                    child.collect_targets(out);
                }
            }
        }
    }

    /// Equivalent builder tree, with names resolved through `ctx`.
    pub fn into_builder(self, ctx: &DocContext) -> AnimResult<AnyBuilder> {
        Ok(match self {
            Self::Value(doc) => doc.into_builder(ctx)?.into(),
            Self::Object(doc) => doc.into_builder(ctx)?.into(),
            Self::Set(doc) => doc.into_builder(ctx)?.into(),
        })
    }
}

impl TimingDoc {
    fn apply<B: AnimBuilder>(&self, mut builder: B) -> AnimResult<B> {
        if let Some(ms) = self.duration {
            builder = builder.duration(ms);
        }
        if let Some(ease) = self.easing {
            builder = builder.easing(ease);
        }
        builder.start_delay(self.start_delay)
    }
}

fn apply_repeat<B: LeafBuilder>(repeat: Option<&RepeatDoc>, builder: B) -> B {
    match repeat {
        Some(r) => builder
            .repeat_mode(r.mode)
            .repeat_count(RepeatCount::from_raw(r.count)),
        None => builder,
    }
}

impl ValueDoc {
    pub fn into_builder(self, ctx: &DocContext) -> AnimResult<ValueAnimBuilder> {
        let mut builder = self.timing.apply(ValueAnimBuilder::new())?;
        builder = apply_repeat(self.repeat.as_ref(), builder);
        if let Some(values) = self.values {
            builder = builder.raw_values(values);
        }
        if let Some(name) = &self.evaluator {
            builder = builder.evaluator(ctx.evaluator(name)?);
        }
        Ok(builder)
    }
}

impl ObjectDoc {
    pub fn into_builder(self, ctx: &DocContext) -> AnimResult<ObjectAnimBuilder> {
        let mut builder = self.timing.apply(ObjectAnimBuilder::new())?;
        builder = apply_repeat(self.repeat.as_ref(), builder);
        if let Some(name) = &self.target {
            builder = builder.target(ctx.target(name)?);
        }
        for property in self.properties {
            builder = if property.keyframes.is_some() {
                builder.keyframes(property.into_keyframes(ctx)?)
            } else {
                builder.property(property.into_values(ctx)?)
            };
        }
        Ok(builder)
    }
}

impl PropertyDoc {
    fn into_values(self, ctx: &DocContext) -> AnimResult<PropertyBuilder> {
        let mut builder = PropertyBuilder::new(self.name);
        if let Some(values) = self.values {
            builder = builder.raw_values(values);
        }
        if let Some(name) = &self.evaluator {
            builder = builder.evaluator(ctx.evaluator(name)?);
        }
        Ok(builder)
    }

    fn into_keyframes(self, ctx: &DocContext) -> AnimResult<KeyframesBuilder> {
        let frames = self.keyframes.unwrap_or_default();
        let kinds = frame_kinds(&frames)?;

        let mut builder = KeyframesBuilder::new(self.name);
        for (frame, kind) in frames.into_iter().zip(kinds) {
            let mut keyframe = match &frame.value {
                Some(value) => Keyframe {
                    value: Some(to_value(value, kind)?),
                    ..Keyframe::empty(kind, frame.fraction)
                },
                None => Keyframe::empty(kind, frame.fraction),
            };
            if let Some(ease) = frame.easing {
                keyframe = keyframe.with_easing(ease);
            }
            builder = builder.keyframe(keyframe);
        }
        if let Some(name) = &self.evaluator {
            builder = builder.evaluator(ctx.evaluator(name)?);
        }
        Ok(builder)
    }
}

/// Kind of each keyframe in a list.
///
/// An explicit `kind` wins. Otherwise a frame takes the kind of its own value, with integers
/// widened to float when the list's default kind is float. Frames with neither take the
/// default: the first explicit kind, else float for numeric lists holding any float, else the
/// first value's kind. Mixed kinds are left for keyframe validation to reject.
fn frame_kinds(frames: &[KeyframeDoc]) -> AnimResult<Vec<ValueKind>> {
    let own = frames
        .iter()
        .map(|f| match (&f.value, f.kind) {
            (_, Some(_)) | (None, None) => Ok(None),
            (Some(value), None) => json_kind(value).map(Some),
        })
        .collect::<AnimResult<Vec<_>>>()?;

    let inferred: Vec<ValueKind> = own.iter().flatten().copied().collect();
    let numeric = inferred
        .iter()
        .all(|k| matches!(k, ValueKind::Int | ValueKind::Float));
    let default = frames.iter().find_map(|f| f.kind).or_else(|| {
        if numeric && inferred.contains(&ValueKind::Float) {
            Some(ValueKind::Float)
        } else {
            inferred.first().copied()
        }
    });

    frames
        .iter()
        .zip(own)
        .map(|(frame, own)| match (frame.kind, own) {
            (Some(kind), _) => Ok(kind),
            (None, Some(ValueKind::Int)) if default == Some(ValueKind::Float) => {
                Ok(ValueKind::Float)
            }
            (None, Some(kind)) => Ok(kind),
            (None, None) => default.ok_or_else(|| {
                AnimError::config(format!(
                    "keyframe at {} has neither a kind nor a value",
                    frame.fraction
                ))
            }),
        })
        .collect()
}

fn json_kind(value: &Value) -> AnimResult<ValueKind> {
    ValueSequence::from_json(&Value::Array(vec![value.clone()])).map(|seq| seq.kind())
}

fn to_value(value: &Value, kind: ValueKind) -> AnimResult<AnimValue> {
    let mismatch =
        || AnimError::unsupported(format!("{value} is not a valid {kind:?} keyframe value"));
    match kind {
        ValueKind::Int => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(AnimValue::Int)
            .ok_or_else(mismatch),
        ValueKind::Float => value
            .as_f64()
            .map(|v| AnimValue::Float(v as f32))
            .ok_or_else(mismatch),
        ValueKind::Object if value.is_object() || value.is_string() => {
            Ok(AnimValue::Object(ObjectValue::new(value.clone())))
        }
        ValueKind::Object => Err(mismatch()),
    }
}

impl SetDoc {
    pub fn into_builder(self, ctx: &DocContext) -> AnimResult<AnimSetBuilder> {
        let mut builder = self.timing.apply(AnimSetBuilder::new())?.mode(self.mode);
        if let Some(name) = &self.target {
            builder = builder.target(ctx.target(name)?);
        }
        for child in self.children {
            builder = builder.child(child.into_builder(ctx)?);
        }
        Ok(builder)
    }
}

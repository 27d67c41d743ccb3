use crate::foundation::core::ValueKind;

/// Result alias used across the crate.
pub type AnimResult<T> = Result<T, AnimError>;

/// Errors raised while configuring, compiling or realizing animations.
///
/// `InvalidStartDelay` is raised by the setter itself. Everything else surfaces from a
/// `build` call, since configuration is recorded without validation.
#[derive(thiserror::Error, Debug)]
pub enum AnimError {
    /// A negative start delay was supplied.
    #[error("invalid start delay {0}: delay must be >= 0")]
    InvalidStartDelay(i64),

    /// A value sequence is not an int, float or typed-object sequence.
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// Object values were supplied without an evaluator.
    #[error("object values need an evaluator")]
    MissingEvaluator,

    /// An object animation was built without a target.
    #[error("object animation has no target")]
    MissingTarget,

    /// A value sequence or keyframe list was never supplied.
    #[error("animation has no values")]
    MissingValues,

    /// A property plan was declared with an empty name.
    #[error("property name must be non-empty")]
    MissingPropertyName,

    /// A keyframe fraction lies outside `[0, 1]`.
    #[error("keyframe fraction {0} is outside [0, 1]")]
    InvalidFraction(f64),

    /// A keyframe disagrees with the kind of the first keyframe of its plan.
    #[error("keyframe kind {found:?} does not match plan kind {expected:?}")]
    InconsistentKeyframeType {
        /// Kind declared by the first keyframe.
        expected: ValueKind,
        /// Kind of the offending keyframe.
        found: ValueKind,
    },

    /// Keyframe fractions decrease between two consecutive entries.
    #[error("keyframe fractions must be non-decreasing ({prev} then {next})")]
    UnorderedKeyframes {
        /// Fraction of the earlier entry.
        prev: f64,
        /// Fraction of the later entry.
        next: f64,
    },

    /// The host engine rejected an operation.
    #[error("engine error: {0}")]
    Engine(String),

    /// An animation document references something that does not exist.
    #[error("config error: {0}")]
    Config(String),

    /// An animation document could not be parsed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimError {
    /// Build an [`AnimError::UnsupportedValueType`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedValueType(msg.into())
    }

    /// Build an [`AnimError::Engine`].
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build an [`AnimError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`AnimError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

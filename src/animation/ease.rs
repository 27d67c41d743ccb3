use std::{fmt, rc::Rc};

/// Built-in easing curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Easing strategy attached to an animation or keyframe.
///
/// The builders treat this as opaque: hosts may hand in any curve through
/// [`Easing::custom`]. Custom curves are not clamped, so overshooting curves extrapolate.
#[derive(Clone)]
pub enum Easing {
    /// One of the built-in curves.
    Preset(Ease),
    /// Caller-supplied curve.
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Easing {
    pub fn linear() -> Self {
        Self::Preset(Ease::Linear)
    }

    /// Wrap a caller-supplied curve.
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// Map progress `t` through this curve.
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::Preset(ease) => ease.apply(t),
            Self::Custom(f) => f(t),
        }
    }

    /// Short label used in plan summaries.
    pub fn label(&self) -> String {
        match self {
            Self::Preset(ease) => format!("{ease:?}"),
            Self::Custom(_) => "custom".to_string(),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::linear()
    }
}

impl From<Ease> for Easing {
    fn from(ease: Ease) -> Self {
        Self::Preset(ease)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(ease) => write!(f, "Easing::Preset({ease:?})"),
            Self::Custom(_) => f.write_str("Easing::Custom(..)"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;

use crate::{
    animation::keyframe::Interpolator,
    foundation::core::{AnimValue, CompositeMode, RepeatCount, RepeatMode, Timing, ValueKind},
    node::listeners::Listeners,
    target::Target,
};

/// A compiled interpolation bound to one property name.
#[derive(Clone, Debug)]
pub struct PropertyPlan {
    pub name: String,
    pub interpolator: Interpolator,
}

impl PropertyPlan {
    pub fn kind(&self) -> ValueKind {
        self.interpolator.kind()
    }

    pub fn sample(&self, fraction: f64) -> Option<AnimValue> {
        self.interpolator.sample(fraction)
    }
}

/// Immutable result of compiling a builder tree, ready to hand to a host.
#[derive(Debug)]
pub struct AnimPlan {
    pub timing: Timing,
    pub listeners: Listeners,
    pub kind: PlanKind,
}

#[derive(Debug)]
pub enum PlanKind {
    /// Untargeted interpolation reported through the update slot.
    Value { interpolator: Interpolator },
    /// Property plans applied together to one target.
    Object {
        target: Target,
        properties: Vec<PropertyPlan>,
    },
    /// Children played in parallel or in sequence.
    Set {
        mode: CompositeMode,
        children: Vec<AnimPlan>,
    },
}

impl AnimPlan {
    /// Kind of the values this plan produces; `None` for groups and empty object plans.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match &self.kind {
            PlanKind::Value { interpolator } => Some(interpolator.kind()),
            PlanKind::Object { properties, .. } => properties.first().map(PropertyPlan::kind),
            PlanKind::Set { .. } => None,
        }
    }

    /// Natural completion time in milliseconds; `None` when it never completes.
    pub fn total_duration(&self, default_duration: u64) -> Option<u64> {
        match &self.kind {
            PlanKind::Value { .. } | PlanKind::Object { .. } => {
                self.timing.leaf_span(default_duration)
            }
            PlanKind::Set { mode, children } => mode.span(
                self.timing.start_delay,
                children.iter().map(|c| c.total_duration(default_duration)),
            ),
        }
    }

    pub fn summary(&self, default_duration: u64) -> PlanSummary {
        let (kind, properties, mode, children) = match &self.kind {
            PlanKind::Value { .. } => ("value", Vec::new(), None, Vec::new()),
            PlanKind::Object { properties, .. } => (
                "object",
                properties.iter().map(|p| p.name.clone()).collect(),
                None,
                Vec::new(),
            ),
            PlanKind::Set { mode, children } => (
                "set",
                Vec::new(),
                Some(*mode),
                children
                    .iter()
                    .map(|c| c.summary(default_duration))
                    .collect(),
            ),
        };

        PlanSummary {
            kind,
            duration: self.timing.duration,
            start_delay: self.timing.start_delay,
            easing: self.timing.resolved_easing().label(),
            repeat_mode: self.timing.repeat_mode,
            repeat_count: self.timing.repeat_count,
            value_kind: self.value_kind(),
            properties,
            mode,
            total_duration: self.total_duration(default_duration),
            children,
        }
    }
}

/// Serializable description of a plan tree.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PlanSummary {
    pub kind: &'static str,
    pub duration: Option<u64>,
    pub start_delay: u64,
    pub easing: String,
    pub repeat_mode: RepeatMode,
    pub repeat_count: RepeatCount,
    pub value_kind: Option<ValueKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CompositeMode>,
    /// `None` when the plan repeats forever.
    pub total_duration: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanSummary>,
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;

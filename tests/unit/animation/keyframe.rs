use super::*;
use crate::animation::ease::Ease;

fn rotation() -> Interpolator {
    Interpolator::from_keyframes(
        vec![
            Keyframe::float(0.0, 0.0),
            Keyframe::float(0.4, 180.0),
            Keyframe::float(1.0, 360.0),
        ],
        None,
    )
    .unwrap()
}

fn float_at(interp: &Interpolator, fraction: f64) -> f32 {
    interp.sample(fraction).and_then(|v| v.as_f32()).unwrap()
}

#[test]
fn keyframe_boundary_is_exact() {
    let interp = rotation();
    assert_eq!(float_at(&interp, 0.0), 0.0);
    assert_eq!(float_at(&interp, 0.4), 180.0);
    assert_eq!(float_at(&interp, 1.0), 360.0);
}

#[test]
fn keyframes_increase_monotonically_between_entries() {
    let interp = rotation();
    let mut prev = f32::MIN;
    for step in 0..=100 {
        let v = float_at(&interp, f64::from(step) / 100.0);
        assert!(v >= prev, "value dropped at step {step}");
        prev = v;
    }
    assert_eq!(float_at(&interp, 0.2), 90.0);
    assert_eq!(float_at(&interp, 0.7), 270.0);
}

#[test]
fn flat_values_are_spread_evenly() {
    let interp =
        Interpolator::from_values(ValueSequence::floats([1.0, 1.1, 1.3, 1.1, 1.0]), None).unwrap();
    let fractions: Vec<f64> = interp.frames().iter().map(|k| k.fraction).collect();
    assert_eq!(fractions, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(float_at(&interp, 0.5), 1.3);
}

#[test]
fn int_interpolation_truncates() {
    let interp = Interpolator::from_values(ValueSequence::ints([0, 10]), None).unwrap();
    assert_eq!(interp.sample(0.55), Some(AnimValue::Int(5)));
    assert_eq!(interp.sample(1.0), Some(AnimValue::Int(10)));
}

#[test]
fn out_of_range_fractions_extrapolate() {
    let interp = Interpolator::from_values(ValueSequence::floats([0.0, 100.0]), None).unwrap();
    assert_eq!(float_at(&interp, 1.2), 120.0);
    assert_eq!(float_at(&interp, -0.1), -10.0);
}

#[test]
fn single_value_takes_start_from_current() {
    let interp = Interpolator::from_values(ValueSequence::floats([1.0]), None).unwrap();
    assert!(interp.needs_start_value());
    assert_eq!(interp.sample(0.5), Some(AnimValue::Float(1.0)));

    let resolved = interp.with_start_value(Some(&AnimValue::Float(0.0)));
    assert!(!resolved.needs_start_value());
    assert_eq!(float_at(&resolved, 0.5), 0.5);
}

#[test]
fn start_value_is_coerced_to_plan_kind() {
    let interp = Interpolator::from_values(ValueSequence::ints([10]), None).unwrap();
    let resolved = interp.with_start_value(Some(&AnimValue::Float(4.9)));
    assert_eq!(resolved.frames()[0].value, Some(AnimValue::Int(4)));
}

#[test]
fn missing_start_without_current_uses_nearest_value() {
    let interp = Interpolator::from_keyframes(
        vec![
            Keyframe::float(0.0, 2.0),
            Keyframe::empty(ValueKind::Float, 0.5),
            Keyframe::float(1.0, 8.0),
        ],
        None,
    )
    .unwrap();
    let resolved = interp.with_start_value(None);
    assert_eq!(resolved.frames()[1].value, Some(AnimValue::Float(8.0)));
}

#[test]
fn keyframe_easing_shapes_the_segment_ending_at_it() {
    let interp = Interpolator::from_keyframes(
        vec![
            Keyframe::float(0.0, 0.0),
            Keyframe::float(1.0, 100.0).with_easing(Ease::InQuad),
        ],
        None,
    )
    .unwrap();
    assert_eq!(float_at(&interp, 0.5), 25.0);
}

#[test]
fn keyframe_validation_errors() {
    let out_of_range = Interpolator::from_keyframes(vec![Keyframe::float(1.5, 0.0)], None);
    assert!(matches!(out_of_range, Err(AnimError::InvalidFraction(f)) if f == 1.5));

    let mixed = Interpolator::from_keyframes(
        vec![Keyframe::float(0.0, 0.0), Keyframe::int(1.0, 3)],
        None,
    );
    assert!(matches!(
        mixed,
        Err(AnimError::InconsistentKeyframeType {
            expected: ValueKind::Float,
            found: ValueKind::Int
        })
    ));

    let unordered = Interpolator::from_keyframes(
        vec![Keyframe::float(0.6, 0.0), Keyframe::float(0.2, 1.0)],
        None,
    );
    assert!(matches!(unordered, Err(AnimError::UnorderedKeyframes { .. })));

    let empty = Interpolator::from_keyframes(Vec::new(), None);
    assert!(matches!(empty, Err(AnimError::MissingValues)));
}

#[test]
fn object_keyframes_need_an_evaluator() {
    let frames = vec![
        Keyframe::object(0.0, ObjectValue::new(0u8)),
        Keyframe::object(1.0, ObjectValue::new(10u8)),
    ];
    assert!(matches!(
        Interpolator::from_keyframes(frames.clone(), None),
        Err(AnimError::MissingEvaluator)
    ));

    let eval = TypeEvaluator::typed::<u8>(|t, a, b| {
        (f64::from(*a) + (f64::from(*b) - f64::from(*a)) * t) as u8
    });
    let interp = Interpolator::from_keyframes(frames, Some(eval)).unwrap();
    let mid = interp.sample(0.5).unwrap();
    assert_eq!(mid.as_object().and_then(|o| o.downcast_ref::<u8>()), Some(&5));
}

#[test]
fn empty_sequences_have_no_values() {
    let err = Interpolator::from_values(ValueSequence::Float(Vec::new()), None).unwrap_err();
    assert!(matches!(err, AnimError::MissingValues));
}

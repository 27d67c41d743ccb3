use serde_json::json;

use super::*;
use crate::foundation::core::{ObjectValue, ValueKind};

#[test]
fn empty_name_is_checked_first() {
    let err = PropertyBuilder::new("").build().unwrap_err();
    assert!(matches!(err, AnimError::MissingPropertyName));

    let err = PropertyBuilder::new("  ").values([1, 2]).build().unwrap_err();
    assert!(matches!(err, AnimError::MissingPropertyName));
}

#[test]
fn values_are_required() {
    let err = PropertyBuilder::new("x").build().unwrap_err();
    assert!(matches!(err, AnimError::MissingValues));

    let err = PropertyBuilder::new("x")
        .values(ValueSequence::Int(Vec::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, AnimError::MissingValues));
}

#[test]
fn typed_sequences_keep_their_kind() {
    let plan = PropertyBuilder::new("alpha")
        .values([0.0f32, 1.0])
        .build()
        .unwrap();
    assert_eq!(plan.name, "alpha");
    assert_eq!(plan.kind(), ValueKind::Float);

    let plan = PropertyBuilder::new("color").values([0, 255]).build().unwrap();
    assert_eq!(plan.kind(), ValueKind::Int);
}

#[test]
fn raw_values_are_classified_at_build_time() {
    let ints = PropertyBuilder::new("x").raw_values(json!([1, 2, 3]));
    assert_eq!(ints.build().unwrap().kind(), ValueKind::Int);

    let floats = PropertyBuilder::new("x").raw_values(json!([1, 2.5]));
    assert_eq!(floats.build().unwrap().kind(), ValueKind::Float);

    let bools = PropertyBuilder::new("x").raw_values(json!([true, false]));
    assert!(matches!(
        bools.build(),
        Err(AnimError::UnsupportedValueType(_))
    ));
}

#[test]
fn objects_need_an_evaluator() {
    let err = PropertyBuilder::new("tint")
        .values(vec![ObjectValue::new(1u8), ObjectValue::new(2u8)])
        .build()
        .unwrap_err();
    assert!(matches!(err, AnimError::MissingEvaluator));

    let plan = PropertyBuilder::new("tint")
        .raw_values(json!([{ "r": 0.0 }, { "r": 1.0 }]))
        .evaluator(TypeEvaluator::json_lerp())
        .build()
        .unwrap();
    assert_eq!(plan.kind(), ValueKind::Object);
    let mid = plan.sample(0.5).unwrap();
    let mid = mid.as_object().unwrap().downcast_ref::<serde_json::Value>().unwrap();
    assert_eq!(mid["r"], 0.5);
}

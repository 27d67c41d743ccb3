use super::*;
use crate::{
    compile::plan::PlanKind,
    foundation::core::ValueKind,
    target::PropertyBag,
};

fn view() -> Target {
    Target::new(PropertyBag::new())
}

#[test]
fn missing_target_is_reported_before_property_errors() {
    let err = ObjectAnimBuilder::new()
        .property(PropertyBuilder::new(""))
        .build_plan()
        .unwrap_err();
    assert!(matches!(err, AnimError::MissingTarget));
}

#[test]
fn zero_properties_still_build() {
    let plan = ObjectAnimBuilder::new().target(view()).build_plan().unwrap();
    match plan.kind {
        PlanKind::Object { properties, .. } => assert!(properties.is_empty()),
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn properties_compile_in_declaration_order() {
    let plan = ObjectAnimBuilder::new()
        .target(view())
        .property(PropertyBuilder::new("rotation").values([0.0f32, 360.0]))
        .keyframes(KeyframesBuilder::new("alpha").int(0.0, 0).int(1.0, 255))
        .property(PropertyBuilder::new("scale").values([1.0f32, 2.0]))
        .build_plan()
        .unwrap();

    assert_eq!(plan.value_kind(), Some(ValueKind::Float));
    let PlanKind::Object { properties, .. } = &plan.kind else {
        panic!("expected an object plan");
    };
    let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["rotation", "alpha", "scale"]);
}

#[test]
fn first_failing_property_aborts_the_build() {
    let err = ObjectAnimBuilder::new()
        .target(view())
        .property(PropertyBuilder::new("ok").values([1, 2]))
        .property(PropertyBuilder::new("bad"))
        .build_plan()
        .unwrap_err();
    assert!(matches!(err, AnimError::MissingValues));
}

#[test]
fn inherit_target_keeps_an_explicit_target() {
    let own = view();
    let group = view();
    let mut b = ObjectAnimBuilder::new().target(own.clone());
    b.inherit_target(&group);
    let PlanKind::Object { target, .. } = b.build_plan().unwrap().kind else {
        panic!("expected an object plan");
    };
    assert!(target.ptr_eq(&own));
}

use std::cell::Cell;

use super::*;
use crate::{
    animation::values::ValueSequence,
    foundation::core::RepeatCount,
    target::PropertyBag,
};

type Log = Rc<RefCell<Vec<String>>>;

fn floats(values: &[f32]) -> Interpolator {
    Interpolator::from_values(ValueSequence::Float(values.to_vec()), None).unwrap()
}

fn ints(values: &[i32]) -> Interpolator {
    Interpolator::from_values(ValueSequence::Int(values.to_vec()), None).unwrap()
}

fn timing(ms: u64) -> Timing {
    Timing {
        duration: Some(ms),
        ..Timing::default()
    }
}

fn recorder(label: &str, log: &Log) -> Listeners {
    let listeners = Listeners::new();
    for ev in [
        LifecycleEvent::Start,
        LifecycleEvent::End,
        LifecycleEvent::Cancel,
        LifecycleEvent::Repeat,
        LifecycleEvent::Pause,
        LifecycleEvent::Resume,
    ] {
        let log = log.clone();
        let entry = format!("{label}:{ev:?}");
        listeners.set(ev, move || log.borrow_mut().push(entry.clone()));
    }
    listeners
}

fn updates(listeners: &Listeners) -> Rc<RefCell<Vec<AnimValue>>> {
    let seen: Rc<RefCell<Vec<AnimValue>>> = Rc::default();
    let sink = seen.clone();
    listeners.set_update(move |v| sink.borrow_mut().push(v.clone()));
    seen
}

fn count(log: &Log, entry: &str) -> usize {
    log.borrow().iter().filter(|e| e.as_str() == entry).count()
}

#[test]
fn value_leaf_samples_each_tick_and_ends_on_the_last_value() {
    let engine = HeadlessEngine::new();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 100.0])), &timing(100))
        .unwrap();
    let listeners = Listeners::new();
    let seen = updates(&listeners);
    engine.attach_listeners(leaf, listeners).unwrap();

    engine.start(leaf).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Running);
    engine.advance(50).unwrap();
    engine.advance(50).unwrap();

    assert_eq!(engine.state(leaf), NodeState::Ended);
    assert_eq!(
        *seen.borrow(),
        vec![
            AnimValue::Float(0.0),
            AnimValue::Float(50.0),
            AnimValue::Float(100.0)
        ]
    );
}

#[test]
fn untargeted_single_value_starts_from_zero() {
    let engine = HeadlessEngine::new();
    let leaf = engine
        .create_interpolator(Some(floats(&[8.0])), &timing(100))
        .unwrap();
    let listeners = Listeners::new();
    let seen = updates(&listeners);
    engine.attach_listeners(leaf, listeners).unwrap();

    engine.start(leaf).unwrap();
    engine.advance(50).unwrap();
    assert_eq!(seen.borrow().last(), Some(&AnimValue::Float(4.0)));
}

#[test]
fn start_delay_holds_back_updates() {
    let engine = HeadlessEngine::new();
    let t = Timing {
        start_delay: 40,
        ..timing(100)
    };
    let leaf = engine.create_interpolator(Some(ints(&[0, 10])), &t).unwrap();
    let listeners = Listeners::new();
    let seen = updates(&listeners);
    engine.attach_listeners(leaf, listeners).unwrap();

    engine.start(leaf).unwrap();
    engine.advance(39).unwrap();
    assert!(seen.borrow().is_empty());
    engine.advance(51).unwrap();
    assert_eq!(seen.borrow().last(), Some(&AnimValue::Int(5)));
    engine.advance(50).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Ended);
}

#[test]
fn cancel_waits_for_the_next_tick() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    engine.attach_listeners(leaf, recorder("a", &log)).unwrap();

    engine.start(leaf).unwrap();
    engine.cancel(leaf).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Running);
    assert_eq!(count(&log, "a:Cancel"), 0);

    engine.advance(0).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Cancelled);
    assert_eq!(count(&log, "a:Cancel"), 1);
    assert_eq!(count(&log, "a:End"), 0);
}

#[test]
fn cancel_on_an_idle_entry_does_nothing() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    engine.attach_listeners(leaf, recorder("a", &log)).unwrap();

    engine.cancel(leaf).unwrap();
    engine.advance(10).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Idle);
    assert!(log.borrow().is_empty());
}

#[test]
fn group_cancel_wins_over_a_child_cancel_in_the_same_tick() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let a = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let g = engine
        .compose(CompositeMode::Parallel, &[a], &Timing::default())
        .unwrap();
    engine.attach_listeners(a, recorder("a", &log)).unwrap();
    engine.attach_listeners(g, recorder("g", &log)).unwrap();

    engine.start(g).unwrap();
    engine.advance(10).unwrap();
    engine.cancel(a).unwrap();
    engine.cancel(g).unwrap();
    engine.advance(10).unwrap();

    assert_eq!(engine.state(g), NodeState::Cancelled);
    assert_eq!(engine.state(a), NodeState::Cancelled);
    assert_eq!(count(&log, "g:Cancel"), 1);
    assert_eq!(count(&log, "a:Cancel"), 1);
    assert_eq!(count(&log, "g:End"), 0);
}

#[test]
fn start_while_running_cancels_then_restarts() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    engine.attach_listeners(leaf, recorder("a", &log)).unwrap();

    engine.start(leaf).unwrap();
    engine.advance(50).unwrap();
    engine.start(leaf).unwrap();
    assert_eq!(*log.borrow(), vec!["a:Start", "a:Cancel", "a:Start"]);

    engine.advance(60).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Running);
    engine.advance(40).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Ended);
}

#[test]
fn pause_shifts_completion() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    engine.attach_listeners(leaf, recorder("a", &log)).unwrap();

    engine.start(leaf).unwrap();
    engine.advance(40).unwrap();
    engine.pause(leaf).unwrap();
    engine.advance(100).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Paused);
    assert!(engine.has_running());

    engine.resume(leaf).unwrap();
    engine.advance(59).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Running);
    engine.advance(1).unwrap();
    assert_eq!(engine.state(leaf), NodeState::Ended);
    assert_eq!(
        *log.borrow(),
        vec!["a:Start", "a:Pause", "a:Resume", "a:End"]
    );
}

#[test]
fn reverse_repeat_ends_on_the_start_value() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let t = Timing {
        repeat_mode: RepeatMode::Reverse,
        repeat_count: RepeatCount::Finite(1),
        ..timing(100)
    };
    let leaf = engine.create_interpolator(Some(ints(&[0, 10])), &t).unwrap();
    let listeners = recorder("a", &log);
    let seen = updates(&listeners);
    engine.attach_listeners(leaf, listeners).unwrap();

    engine.start(leaf).unwrap();
    engine.advance(150).unwrap();
    assert_eq!(seen.borrow().last(), Some(&AnimValue::Int(5)));
    engine.advance(50).unwrap();

    assert_eq!(seen.borrow().last(), Some(&AnimValue::Int(0)));
    assert_eq!(count(&log, "a:Repeat"), 1);
    assert_eq!(engine.state(leaf), NodeState::Ended);
}

#[test]
fn skipped_repeats_are_still_reported() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let t = Timing {
        repeat_mode: RepeatMode::Restart,
        repeat_count: RepeatCount::Finite(2),
        ..timing(100)
    };
    let leaf = engine.create_interpolator(Some(ints(&[0, 10])), &t).unwrap();
    engine.attach_listeners(leaf, recorder("a", &log)).unwrap();

    engine.start(leaf).unwrap();
    engine.advance(1_000).unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["a:Start", "a:Repeat", "a:Repeat", "a:End"]
    );
}

#[test]
fn sequential_group_runs_children_back_to_back() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let a = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let b = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(200))
        .unwrap();
    let group_timing = Timing {
        start_delay: 50,
        ..Timing::default()
    };
    let g = engine
        .compose(CompositeMode::Sequential, &[a, b], &group_timing)
        .unwrap();
    engine.attach_listeners(a, recorder("a", &log)).unwrap();
    engine.attach_listeners(b, recorder("b", &log)).unwrap();
    engine.attach_listeners(g, recorder("g", &log)).unwrap();

    engine.start(g).unwrap();
    engine.advance(149).unwrap();
    assert_eq!(engine.state(a), NodeState::Running);
    assert_eq!(engine.state(b), NodeState::Idle);

    engine.advance(1).unwrap();
    assert_eq!(engine.state(a), NodeState::Ended);
    assert_eq!(engine.state(b), NodeState::Running);

    engine.advance(200).unwrap();
    assert_eq!(engine.state(g), NodeState::Ended);
    assert_eq!(
        *log.borrow(),
        vec!["g:Start", "a:Start", "a:End", "b:Start", "b:End", "g:End"]
    );
}

#[test]
fn parallel_group_ends_with_its_longest_child() {
    let engine = HeadlessEngine::new();
    let a = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let b = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &Timing::default())
        .unwrap();
    let g = engine
        .compose(CompositeMode::Parallel, &[a, b], &Timing::default())
        .unwrap();

    engine.start(g).unwrap();
    engine.advance(100).unwrap();
    assert_eq!(engine.state(a), NodeState::Ended);
    assert_eq!(engine.state(g), NodeState::Running);

    engine.advance(200).unwrap();
    assert_eq!(engine.state(b), NodeState::Ended);
    assert_eq!(engine.state(g), NodeState::Ended);
    assert!(!engine.has_running());
}

#[test]
fn empty_group_ends_after_its_delay() {
    let engine = HeadlessEngine::new();
    let g = engine
        .compose(
            CompositeMode::Sequential,
            &[],
            &Timing {
                start_delay: 30,
                ..Timing::default()
            },
        )
        .unwrap();
    engine.start(g).unwrap();
    engine.advance(29).unwrap();
    assert_eq!(engine.state(g), NodeState::Running);
    engine.advance(1).unwrap();
    assert_eq!(engine.state(g), NodeState::Ended);
}

#[test]
fn cancelled_child_lets_the_sequence_continue() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let a = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let b = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let g = engine
        .compose(CompositeMode::Sequential, &[a, b], &Timing::default())
        .unwrap();
    engine.attach_listeners(a, recorder("a", &log)).unwrap();

    engine.start(g).unwrap();
    engine.advance(30).unwrap();
    engine.cancel(a).unwrap();
    engine.advance(0).unwrap();

    assert_eq!(engine.state(a), NodeState::Cancelled);
    assert_eq!(engine.state(b), NodeState::Running);
    assert_eq!(engine.state(g), NodeState::Running);
    assert_eq!(count(&log, "a:End"), 0);

    engine.advance(100).unwrap();
    assert_eq!(engine.state(g), NodeState::Ended);
}

#[test]
fn cancelling_a_group_cancels_running_children_only() {
    let engine = HeadlessEngine::new();
    let log = Log::default();
    let a = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let b = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let g = engine
        .compose(CompositeMode::Sequential, &[a, b], &Timing::default())
        .unwrap();
    engine.attach_listeners(a, recorder("a", &log)).unwrap();
    engine.attach_listeners(b, recorder("b", &log)).unwrap();
    engine.attach_listeners(g, recorder("g", &log)).unwrap();

    engine.start(g).unwrap();
    engine.cancel(g).unwrap();
    engine.advance(10).unwrap();

    assert_eq!(engine.state(g), NodeState::Cancelled);
    assert_eq!(engine.state(a), NodeState::Cancelled);
    assert_eq!(engine.state(b), NodeState::Idle);
    assert_eq!(
        *log.borrow(),
        vec!["g:Start", "a:Start", "g:Cancel", "a:Cancel"]
    );
}

#[test]
fn object_leaf_reads_its_start_value_from_the_target() {
    let engine = HeadlessEngine::new();
    let bag = PropertyBag::new().with("x", 5.0f32).shared();
    let target = Target::from_shared(bag.clone());
    let leaf = engine.create_interpolator(None, &timing(100)).unwrap();
    let plan = PropertyPlan {
        name: "x".to_string(),
        interpolator: floats(&[15.0]),
    };
    engine.bind_property(leaf, &target, plan).unwrap();

    engine.start(leaf).unwrap();
    engine.advance(50).unwrap();
    assert_eq!(bag.borrow().get_f32("x"), Some(10.0));
    engine.advance(50).unwrap();
    assert_eq!(bag.borrow().get_f32("x"), Some(15.0));
}

#[test]
fn value_leaves_reject_property_bindings() {
    let engine = HeadlessEngine::new();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    let plan = PropertyPlan {
        name: "x".to_string(),
        interpolator: floats(&[1.0]),
    };
    let err = engine
        .bind_property(leaf, &Target::new(PropertyBag::new()), plan)
        .unwrap_err();
    assert!(matches!(err, AnimError::Engine(_)));
}

#[test]
fn compose_rejects_unknown_children() {
    let engine = HeadlessEngine::new();
    let err = engine
        .compose(CompositeMode::Parallel, &[EngineHandle(99)], &Timing::default())
        .unwrap_err();
    assert!(err.to_string().contains("99"));
}

#[test]
fn listeners_may_restart_their_own_entry() {
    let engine = HeadlessEngine::shared();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(10))
        .unwrap();
    let starts = Rc::new(Cell::new(0));
    let restarts = Rc::new(Cell::new(0));

    let listeners = Listeners::new();
    let s = starts.clone();
    listeners.set(LifecycleEvent::Start, move || s.set(s.get() + 1));
    let r = restarts.clone();
    let e = engine.clone();
    listeners.set(LifecycleEvent::End, move || {
        if r.get() < 2 {
            r.set(r.get() + 1);
            e.start(leaf).unwrap();
        }
    });
    engine.attach_listeners(leaf, listeners).unwrap();

    engine.start(leaf).unwrap();
    for _ in 0..3 {
        engine.advance(10).unwrap();
    }
    assert_eq!(starts.get(), 3);
    assert_eq!(engine.state(leaf), NodeState::Ended);
}

#[test]
fn release_forgets_the_entry() {
    let engine = HeadlessEngine::new();
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &timing(100))
        .unwrap();
    assert_eq!(engine.entry_count(), 1);
    engine.release(leaf);
    assert_eq!(engine.entry_count(), 0);
    assert_eq!(engine.state(leaf), NodeState::Idle);
    assert!(engine.start(leaf).is_err());
}

#[test]
fn run_until_idle_stops_at_the_limit_for_infinite_animations() {
    let engine = HeadlessEngine::new();
    let t = Timing {
        repeat_mode: RepeatMode::Restart,
        repeat_count: RepeatCount::Infinite,
        ..timing(100)
    };
    let leaf = engine.create_interpolator(Some(floats(&[0.0, 1.0])), &t).unwrap();
    engine.start(leaf).unwrap();
    assert_eq!(engine.run_until_idle(64, 1_000).unwrap(), 1_000);
    assert!(engine.has_running());
    assert_eq!(engine.now(), 1_000);
}

#[test]
fn custom_default_duration_applies_to_untimed_leaves() {
    let engine = HeadlessEngine::with_default_duration(50);
    assert_eq!(engine.default_duration(), 50);
    let leaf = engine
        .create_interpolator(Some(floats(&[0.0, 1.0])), &Timing::default())
        .unwrap();
    engine.start(leaf).unwrap();
    assert_eq!(engine.run_until_idle(10, 1_000).unwrap(), 50);
}

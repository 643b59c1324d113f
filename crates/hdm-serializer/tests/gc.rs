//! Garbage collection across every arena.

use hdm_model::{Begin, Module};
use hdm_test_utils::{scenario_a, wide_design, GraphSpec, Session};

#[test]
fn dropping_a_root_sweeps_exactly_its_subgraph() {
    let spec = GraphSpec::wide(3, 2);

    let mut reference = Session::new();
    wide_design(&mut reference, &spec);
    let expected = reference.object_stats();

    let mut ser = Session::new();
    wide_design(&mut ser, &spec);
    let a = scenario_a(&mut ser);
    let before = ser.live_count();
    assert_eq!(ser.object_stats()["module"], expected["module"] + 3);

    assert!(ser.release(&a.root));
    ser.set_gc_enabled(true);
    let swept = ser.collect_garbage();

    assert_eq!(ser.object_stats(), expected);
    assert_eq!(swept, before - reference.live_count());
    assert!(!ser.contains(a.top.raw()));
}

#[test]
fn collection_is_explicit() {
    let mut ser = Session::new();
    let a = scenario_a(&mut ser);
    ser.release(&a.root);
    assert_eq!(ser.collect_garbage(), 0);
    assert_eq!(ser.object_stats()["module"], 3);

    ser.set_gc_enabled(true);
    ser.save_to_vec().unwrap();
    assert_eq!(ser.object_stats()["module"], 3);
    // design, two module sequences, three modules
    assert_eq!(ser.collect_garbage(), 6);
    assert_eq!(ser.live_count(), 0);
}

#[test]
fn reachable_subgraph_survives_repeated_collection() {
    let mut ser = Session::new();
    let root = wide_design(&mut ser, &GraphSpec::wide(2, 3));
    ser.make::<Module>();
    ser.make::<Begin>();
    ser.set_gc_enabled(true);

    assert_eq!(ser.collect_garbage(), 2);
    let stats = ser.object_stats();
    assert_eq!(ser.collect_garbage(), 0);
    assert_eq!(ser.object_stats(), stats);
    assert!(ser.contains(root.target()));
    assert_eq!(ser.reachable().len(), ser.live_count());
}

#[test]
fn swept_handles_dangle() {
    let mut ser = Session::new();
    let a = scenario_a(&mut ser);
    let top = ser.wrap(a.top);
    ser.release(&a.root);
    ser.release(&top);
    ser.set_gc_enabled(true);
    ser.collect_garbage();
    assert!(ser.node(top.target()).is_none());
    assert!(ser.cast::<Module>(top.target()).is_none());
}

//! Tests for `SwitchNode` execution.

mod test_utils;

use hfsm_graph::prelude::*;
use hfsm_node::prelude::*;
use test_utils::{Call, CallLog, Probe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Mode {
    Calm,
    Alert,
    Broken,
}

struct Sensor {
    threat: u8,
}

fn mode(sensor: &Sensor) -> Mode {
    match sensor.threat {
        0..=3 => Mode::Calm,
        4..=9 => Mode::Alert,
        _ => Mode::Broken,
    }
}

fn tick(switch: &SwitchNode<Sensor, Mode>, memory: &mut Memory, threat: u8) -> Option<Slot> {
    let sensor = Sensor { threat };
    switch.tick(&NodeContext::new(&sensor), memory).unwrap()
}

fn watch(log: &CallLog) -> (Probe, Probe, SwitchNode<Sensor, Mode>) {
    let calm = Probe::new("Patrol", log).input::<u32>().slot("Done");
    let alert = Probe::new("Hide", log).input::<u32>().slot("Done");
    let switch = SwitchNode::builder("Watch", mode)
        .case(Mode::Calm, calm.clone())
        .case(Mode::Alert, alert.clone())
        .build()
        .unwrap();
    (calm, alert, switch)
}

fn active(memory: &Memory) -> Mode {
    *memory
        .downcast_ref::<SwitchMemory<Mode>>()
        .unwrap()
        .current_node_key()
}

#[test]
fn start_picks_candidate_from_payload() {
    let log = CallLog::new();
    let (_, _, switch) = watch(&log);

    let memory = switch.start(Value::new(6_u32), &Sensor { threat: 5 }).unwrap();

    assert_eq!(active(&memory), Mode::Alert);
    assert_eq!(log.calls(), vec![Call::Start("Hide", Some(6))]);
    assert_eq!(switch.case_count(), 2);
    assert_eq!(switch.input_type(), Some(TypeInfo::of::<u32>()));
}

#[test]
fn unchanged_selection_keeps_candidate_running() {
    let log = CallLog::new();
    let (_, _, switch) = watch(&log);
    let mut memory = switch.start(Value::new(1_u32), &Sensor { threat: 0 }).unwrap();
    log.take();

    tick(&switch, &mut memory, 1);
    tick(&switch, &mut memory, 3);

    assert_eq!(log.calls(), vec![Call::Tick("Patrol"), Call::Tick("Patrol")]);
}

#[test]
fn changed_selection_aborts_old_and_restarts_with_start_args() {
    let log = CallLog::new();
    let (_, _, switch) = watch(&log);
    let mut memory = switch.start(Value::new(7_u32), &Sensor { threat: 0 }).unwrap();
    log.take();

    tick(&switch, &mut memory, 8);
    assert_eq!(
        log.take(),
        vec![
            Call::Abort("Patrol", AbortReason::AbortedBySwitch),
            Call::Start("Hide", Some(7)),
            Call::Tick("Hide")
        ]
    );
    assert_eq!(active(&memory), Mode::Alert);

    tick(&switch, &mut memory, 2);
    assert_eq!(
        log.take(),
        vec![
            Call::Abort("Hide", AbortReason::AbortedBySwitch),
            Call::Start("Patrol", Some(7)),
            Call::Tick("Patrol")
        ]
    );
    let state = memory.downcast_ref::<SwitchMemory<Mode>>().unwrap();
    assert_eq!(state.start_args().downcast_ref::<u32>(), Some(&7));
}

#[test]
fn candidate_slot_is_forwarded() {
    let log = CallLog::new();
    let (_, alert, switch) = watch(&log);
    let mut memory = switch.start(Value::new(1_u32), &Sensor { threat: 9 }).unwrap();

    alert.then_fire("Done");
    let fired = tick(&switch, &mut memory, 9).unwrap();

    assert_eq!(fired.key(), "Done");
    let keys: Vec<_> = switch.slots().iter().map(SlotSpec::key).collect();
    assert_eq!(keys, vec!["Done"]);
}

#[test]
fn abort_reaches_active_candidate_only() {
    let log = CallLog::new();
    let (_, _, switch) = watch(&log);
    let mut memory = switch.start(Value::new(1_u32), &Sensor { threat: 4 }).unwrap();

    switch
        .abort(AbortReason::AbortedByWrapper, &mut memory, &Sensor { threat: 0 })
        .unwrap();

    assert_eq!(log.aborts(), vec![("Hide", AbortReason::AbortedByWrapper)]);
}

#[test]
fn director_key_without_case_fails_at_runtime() {
    let log = CallLog::new();
    let (_, _, switch) = watch(&log);

    let err = switch
        .start(Value::new(1_u32), &Sensor { threat: 200 })
        .unwrap_err();
    assert_eq!(err.to_string(), "switch 'Watch' has no case for Broken");

    let mut memory = switch.start(Value::new(1_u32), &Sensor { threat: 0 }).unwrap();
    let err = switch
        .tick(&NodeContext::new(&Sensor { threat: 200 }), &mut memory)
        .unwrap_err();
    assert!(matches!(err, NodeError::UnknownCase { .. }));
    // The running candidate is left untouched.
    assert!(log.aborts().is_empty());
    assert_eq!(active(&memory), Mode::Calm);
}

#[test]
fn switch_inside_graph_sees_graph_frame() {
    let log = CallLog::new();
    let (calm, _, switch) = watch(&log);
    let mut builder = NodeGraph::builder("Main");
    builder
        .add_node_with_input("Watch", switch, 3_u32)
        .add_node("Rest", Probe::new("Rest", &log))
        .add_internal_transition("Finish", "Watch", "Done", "Rest")
        .initial_node("Watch");
    let graph = builder.build().unwrap();
    let sensor = Sensor { threat: 0 };
    let mut memory = graph.start(Value::unit(), &sensor).unwrap();

    calm.then_fire("Done");
    graph
        .tick(&NodeContext::new(&sensor), &mut memory)
        .unwrap();

    let stack = calm.last_stack();
    assert_eq!(stack.len(), 1);
    assert_eq!(stack[0].node_name, "Watch");
    assert!(stack[0].has_slot("Done"));
    assert_eq!(test_utils::current_node(&memory), "Rest");
}

#[test]
fn failed_restart_never_aborts_the_old_candidate_twice() {
    let log = CallLog::new();
    let inner = SwitchNode::builder("Inner", mode)
        .case(Mode::Alert, Probe::new("Hide", &log).input::<u32>())
        .build()
        .unwrap();
    let outer = SwitchNode::builder("Outer", |sensor: &Sensor| sensor.threat > 3)
        .case(false, Probe::new("Patrol", &log).input::<u32>())
        .case(true, inner)
        .build()
        .unwrap();
    let mut memory = outer.start(Value::new(1_u32), &Sensor { threat: 0 }).unwrap();

    for _ in 0..2 {
        let err = outer
            .tick(&NodeContext::new(&Sensor { threat: 200 }), &mut memory)
            .unwrap_err();
        assert!(matches!(err, NodeError::UnknownCase { .. }));
    }
    outer
        .abort(AbortReason::AbortedByDeath, &mut memory, &Sensor { threat: 200 })
        .unwrap();

    assert_eq!(log.aborts(), vec![("Patrol", AbortReason::AbortedBySwitch)]);
    let state = memory.downcast_ref::<SwitchMemory<bool>>().unwrap();
    assert!(*state.current_node_key());
    assert!(state.is_restart_pending());

    // Once the inner director has a case again, the pending start succeeds.
    outer
        .tick(&NodeContext::new(&Sensor { threat: 5 }), &mut memory)
        .unwrap();
    assert_eq!(log.starts().last(), Some(&("Hide", Some(1))));
    let state = memory.downcast_ref::<SwitchMemory<bool>>().unwrap();
    assert!(!state.is_restart_pending());
    assert_eq!(log.aborts().len(), 1);
}

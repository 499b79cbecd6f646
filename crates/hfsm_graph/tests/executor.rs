//! Tests for driving shared trees through `Executor`.

use std::sync::Arc;
use std::thread;

use hfsm_graph::prelude::*;
use hfsm_node::prelude::*;

struct Tank {
    fuel: u32,
}

/// `Drive` runs until the tank is empty, then `Refuel` waits two ticks.
/// A `Refuel` entered with a patience of three or more gives up instead and
/// leaves the graph through `Retired`.
fn vehicle(patience: u32) -> NodeGraph<Tank> {
    let drive = LeafTask::builder("Drive")
        .slot("Empty")
        .on_tick(|args: TickArgs<'_, Tank, (), ()>| (args.payload.fuel == 0).then_some("Empty"))
        .build()
        .unwrap();
    let refuel = LeafTask::builder("Refuel")
        .slot("Full")
        .slot_with_args::<u32>("GiveUp")
        .on_start(|visits: u32, _: &(), _: &Tank| (visits, 0_u32))
        .on_tick(|args: TickArgs<'_, Tank, (u32, u32), ()>| {
            let (visits, waited) = args.memory;
            *waited += 1;
            if *visits >= 3 {
                Some(Slot::with_args("GiveUp", *visits))
            } else if *waited >= 2 {
                Some(Slot::empty("Full"))
            } else {
                None
            }
        })
        .build()
        .unwrap();

    let mut builder = NodeGraph::builder("Vehicle");
    builder
        .add_node("Drive", drive)
        .add_node_with_input("Refuel", refuel, patience)
        .add_slot_with_args::<u32>("Retired")
        .add_internal_transition("Stop", "Drive", "Empty", "Refuel")
        .add_internal_transition("Go", "Refuel", "Full", "Drive")
        .add_external_transition_with("Retire", "Refuel", "GiveUp", "Retired", |visits: u32| visits)
        .initial_node("Drive");
    builder.build().unwrap()
}

fn current(executor: &Executor<Tank>) -> NodeKey {
    executor
        .memory()
        .and_then(|memory| memory.downcast_ref::<GraphMemory>())
        .map(GraphMemory::current_node)
        .unwrap()
}

#[test]
fn executor_steps_through_internal_transitions() {
    let mut executor = Executor::new(vehicle(1));
    let full = Tank { fuel: 10 };
    let empty = Tank { fuel: 0 };

    executor.start_default(&full).unwrap();
    assert!(executor.tick(&full).unwrap().is_none());
    assert!(executor.tick(&empty).unwrap().is_none());
    assert_eq!(current(&executor), "Refuel");

    assert!(executor.tick(&empty).unwrap().is_none());
    assert!(executor.tick(&empty).unwrap().is_none());
    assert_eq!(current(&executor), "Drive");
    assert_eq!(executor.ticks(), 4);
}

#[test]
fn executor_reports_root_slot_and_keeps_running() {
    let mut executor = Executor::new(vehicle(3));
    let empty = Tank { fuel: 0 };

    executor.start_default(&empty).unwrap();
    assert!(executor.tick(&empty).unwrap().is_none());

    let fired = executor.tick(&empty).unwrap().unwrap();
    assert_eq!(fired.key(), "Retired");
    assert_eq!(fired.args_as::<u32>(), Some(&3));
    assert!(executor.is_running());
    assert_eq!(current(&executor), "Refuel");
}

#[test]
fn many_threads_share_one_tree() {
    let root: NodeRef<Tank> = Arc::new(vehicle(1));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                let mut executor = Executor::shared(root);
                let tank = Tank { fuel: worker };
                executor.start_default(&tank).unwrap();
                executor.tick(&tank).unwrap();
                current(&executor)
            })
        })
        .collect();

    let nodes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(nodes, vec!["Refuel", "Drive", "Drive", "Drive"]);
}

#[test]
fn abort_with_reason_reaches_active_leaf() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static ABORTS: AtomicUsize = AtomicUsize::new(0);

    let leaf = LeafTask::builder("Wait")
        .on_tick(|_: TickArgs<'_, Tank, (), ()>| None::<Slot>)
        .on_abort(|reason, _: &mut (), _: &Tank| {
            assert_eq!(reason, AbortReason::AbortedByDeath);
            ABORTS.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();
    let mut builder = NodeGraph::builder("Main");
    builder.add_node("Wait", leaf).initial_node("Wait");
    let mut executor = Executor::new(builder.build().unwrap());
    let tank = Tank { fuel: 1 };

    executor.start_default(&tank).unwrap();
    executor.abort(AbortReason::AbortedByDeath, &tank).unwrap();

    assert_eq!(ABORTS.load(Ordering::SeqCst), 1);
    assert!(!executor.is_running());
}

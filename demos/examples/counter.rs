// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A click counter driven through the cooperative work loop.
//!
//! This example shows the full driver cycle:
//! - `coppice_tree::Engine` reconciling into the bundled `MemoryHost`,
//! - a component holding state in a `use_state` slot,
//! - a listener feeding clicks back to the driver, which queues them with
//!   `update_state` and re-runs the engine under a small time budget.
//!
//! Run:
//! - `cargo run -p coppice_demos --example counter`

use std::sync::atomic::{AtomicI32, Ordering};

use coppice_tree::{
    Element, Engine, FixedBudget, HookCx, Props, RunStatus, use_state,
};
use coppice_tree::hosts::{MemoryHost, MemoryNodeId};

/// Clicks observed by the listener but not yet applied to engine state.
///
/// Listeners are plain `Fn()` closures and cannot re-enter the engine that
/// owns the host they were fired from, so the demo parks clicks here and
/// the driver drains them between runs.
static PENDING_CLICKS: AtomicI32 = AtomicI32::new(0);

fn counter(cx: &mut HookCx<'_>, _props: &Props) -> Element {
    let (count, _) = use_state(cx, 0_i32);
    Element::host("div")
        .child(Element::host("h1").text_child(format!("count: {count}")))
        .child(
            Element::host("button")
                .listener("onClick", || {
                    PENDING_CLICKS.fetch_add(1, Ordering::Relaxed);
                })
                .text_child("+1"),
        )
}

/// Drive the in-flight pass to completion, two units at a time.
fn run_sliced(engine: &mut Engine<MemoryHost>) {
    let mut slices = 0;
    loop {
        match engine.run(&FixedBudget::new(2)).expect("memory host cannot fail") {
            RunStatus::Yielded => slices += 1,
            RunStatus::Committed(summary) => {
                println!(
                    "committed after {slices} yields: {} placed, {} updated, {} removed",
                    summary.placed, summary.updated, summary.removed
                );
                return;
            }
            RunStatus::Idle => return,
        }
    }
}

fn find_button(host: &MemoryHost, from: MemoryNodeId) -> Option<MemoryNodeId> {
    if host.tag_of(from) == Some("button") {
        return Some(from);
    }
    host.children_of(from)
        .into_iter()
        .find_map(|child| find_button(host, child))
}

fn main() {
    let host = MemoryHost::new();
    let container = host.root();
    let mut engine = Engine::new(host);

    engine.render(Element::component(counter), container);
    run_sliced(&mut engine);
    println!("mounted: {}", engine.host().to_markup());

    for round in 1..=3 {
        let button = find_button(engine.host(), container).expect("counter renders a button");
        engine.host().fire(button, "click");

        let clicks = PENDING_CLICKS.swap(0, Ordering::Relaxed);
        // Slot handles expire with each committed generation, so look the
        // component up again every round.
        let fiber = engine
            .find_component(counter)
            .expect("counter stays mounted");
        let slot = engine
            .component_slot::<i32>(fiber, 0)
            .expect("slot 0 holds the count");
        engine
            .update_state(slot, move |count| count + clicks)
            .expect("slot was acquired from the live generation");

        run_sliced(&mut engine);
        println!("after click {round}: {}", engine.host().to_markup());
    }
}

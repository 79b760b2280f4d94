// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=coppice_tree --heading-base-level=0

//! Coppice Tree: an incremental, interruptible fiber-tree reconciler.
//!
//! Coppice Tree turns immutable element descriptions into mutations on a
//! pluggable render target, spreading the diffing work over small
//! interruptible units so a driver can keep its main loop responsive.
//!
//! - Describes desired trees as plain [`Element`] values (host nodes, text, component functions).
//! - Reconciles each description against the previously committed tree one fiber at a time, under a caller-supplied [`IdleDeadline`] budget.
//! - Applies the resulting placements, updates, and removals to a [`Host`] in a single uninterruptible [`Engine::commit`] batch, so the target never shows a half-built tree.
//! - Gives components ordered [`use_state`] slots whose queued updates arm the next pass.
//!
//! The engine is strictly single threaded and cooperative: it never blocks,
//! never spawns, and suspends only between units of work. The driver owns
//! the loop; the engine only asks, via the deadline, whether it may keep
//! going.
//!
//! ## Two trees, one arena
//!
//! Fibers live in a generational arena holding up to two trees at a time:
//! the *current* tree (what the host shows) and a *work-in-progress* tree
//! built by the in-flight pass. Each work-in-progress fiber links to its
//! same-position predecessor, which is how updates reuse native nodes and
//! how hooks find their previous state. Commit swaps the trees and frees
//! the old generation, so [`FiberId`]s (and the [`StateSlot`]s derived from
//! them) expire with it; drivers re-acquire handles after each commit via
//! [`Engine::find_component`] and [`Engine::component_slot`].
//!
//! ## Not a renderer
//!
//! This crate does not paint, lay out, or own an event loop. The [`Host`]
//! trait is the entire lower boundary: anything that can create nodes,
//! rewrite their properties, and splice children can sit under the engine.
//! A ready-made in-memory target, [`hosts::MemoryHost`], is bundled for
//! tests, demos, and headless use (enabled by the default `host_memory`
//! feature).
//!
//! ## API overview
//!
//! - [`Element`]: immutable description of a desired node, with a builder API.
//! - [`Engine`]: the reconciler; owns the fiber arena and the host.
//! - [`Host`]: the render-target trait the commit phase drives.
//! - [`IdleDeadline`]: time budget asked before each unit of work, with
//!   [`Unbounded`] and [`FixedBudget`] implementations for drivers and tests.
//! - [`use_state`]: per-component state slots, addressed by call order.
//!
//! Key operations:
//! - [`Engine::render`] arms a pass projecting an [`Element`] into a container node.
//! - [`Engine::run`] works under a deadline and commits when the pass completes;
//!   [`Engine::step`] performs exactly one unit for drivers that slice themselves.
//! - [`Engine::set_state`] / [`Engine::update_state`] queue state changes on a
//!   [`StateSlot`] and arm a fresh pass from the committed root.
//! - [`Engine::child_of`], [`Engine::sibling_of`], [`Engine::parent_of`],
//!   [`Engine::alternate_of`], and [`Engine::effect_of`] expose the fiber
//!   structure of a live [`FiberId`] for inspection.
//!
//! ## Example
//!
//! ```rust
//! use coppice_tree::{Element, Engine, FixedBudget, RunStatus, Unbounded, hosts::MemoryHost};
//!
//! let host = MemoryHost::new();
//! let container = host.root();
//! let mut engine = Engine::new(host);
//!
//! engine.render(
//!     Element::host("div")
//!         .prop("id", "app")
//!         .child(Element::host("p").text_child("hello")),
//!     container,
//! );
//!
//! // Work in small slices until the pass commits.
//! loop {
//!     match engine.run(&FixedBudget::new(2)).unwrap() {
//!         RunStatus::Yielded => continue,
//!         RunStatus::Committed(summary) => {
//!             assert_eq!(summary.placed, 3);
//!             break;
//!         }
//!         RunStatus::Idle => unreachable!("a pass is in flight"),
//!     }
//! }
//! assert_eq!(engine.host().to_markup(), "<div id=\"app\"><p>hello</p></div>");
//!
//! // An unbounded driver commits in one call.
//! engine.render(Element::host("p").text_child("bye"), container);
//! engine.run(&Unbounded).unwrap();
//! assert_eq!(engine.host().to_markup(), "<p>bye</p>");
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod commit;
mod deadline;
mod element;
mod engine;
mod error;
mod hooks;
mod host;
mod reconcile;
mod trace;
mod types;

#[cfg(feature = "host_memory")]
pub mod hosts;

pub use commit::CommitSummary;
pub use deadline::{FixedBudget, IdleDeadline, Unbounded};
pub use element::{
    Component, EVENT_PREFIX, Element, ElementKind, Listener, PropValue, Props, Tag, event_name,
};
pub use engine::{Engine, RunStatus, StepStatus};
pub use error::Error;
pub use hooks::{HookCx, StateSlot, use_state};
pub use host::Host;
pub use trace::{TraceEvent, TraceSink};
pub use types::{EffectTag, FiberId};

// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-component state slots.
//!
//! A component's state lives in an ordered sequence of [`Hook`]s on its
//! fiber, matched across generations purely by call-order index. During a
//! component invocation a [`HookCx`] tracks the slot cursor and the previous
//! generation's hooks; [`use_state`] resolves the slot's value by draining
//! the queued updates recorded since the last render.
//!
//! A component must call [`use_state`] the same number of times, in the same
//! order, on every render. Violating this misaligns slot correspondence
//! between generations and corrupts state; it is a documented constraint,
//! not defended against (a changed slot *type* at the same index panics).

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use smallvec::SmallVec;

use crate::types::FiberId;

/// Hook storage for one fiber; most components use only a few slots.
pub(crate) type HookList = SmallVec<[Hook; 4]>;

/// One pending state change, applied in queue order on the next render.
#[derive(Clone)]
pub(crate) enum StateUpdate {
    /// Replace the state with this value.
    Replace(Rc<dyn Any>),
    /// Derive the next state from the current one.
    Transform(Rc<dyn Fn(&dyn Any) -> Rc<dyn Any>>),
}

impl fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(_) => f.write_str("Replace(..)"),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// One state slot: the last resolved value plus updates queued against it.
#[derive(Clone)]
pub(crate) struct Hook {
    pub(crate) state: Rc<dyn Any>,
    pub(crate) queue: Vec<StateUpdate>,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// A typed handle to one state slot of one fiber generation.
///
/// Obtained from [`use_state`] during a render, or from
/// [`Engine::component_slot`](crate::Engine::component_slot) afterwards.
/// The handle names a fiber of a specific generation; once a later commit
/// frees that generation the handle is stale and setter calls fail with
/// [`Error::StaleSlot`](crate::Error::StaleSlot). Drivers should re-acquire
/// slots after each commit.
pub struct StateSlot<T> {
    pub(crate) fiber: FiberId,
    pub(crate) index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateSlot<T> {
    pub(crate) fn new(fiber: FiberId, index: usize) -> Self {
        Self {
            fiber,
            index,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for StateSlot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StateSlot<T> {}

impl<T> fmt::Debug for StateSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSlot")
            .field("fiber", &self.fiber)
            .field("index", &self.index)
            .finish()
    }
}

/// Hook bookkeeping for one component invocation.
///
/// Constructed by the engine around the component call and destroyed when it
/// returns; state operations are therefore only reachable from inside a
/// component body, which is what makes "hook outside render" unrepresentable.
pub struct HookCx<'a> {
    fiber: FiberId,
    prev: &'a [Hook],
    next: HookList,
    cursor: usize,
}

impl fmt::Debug for HookCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCx")
            .field("fiber", &self.fiber)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<'a> HookCx<'a> {
    pub(crate) fn new(fiber: FiberId, prev: &'a [Hook]) -> Self {
        Self {
            fiber,
            prev,
            next: HookList::new(),
            cursor: 0,
        }
    }

    pub(crate) fn into_hooks(self) -> HookList {
        self.next
    }

    fn next_slot(&mut self, init: impl FnOnce() -> Rc<dyn Any>) -> (Rc<dyn Any>, usize) {
        let index = self.cursor;
        self.cursor += 1;
        let state = match self.prev.get(index) {
            Some(old) => old.queue.iter().fold(old.state.clone(), apply_update),
            None => init(),
        };
        self.next.push(Hook {
            state: state.clone(),
            queue: Vec::new(),
        });
        (state, index)
    }
}

fn apply_update(state: Rc<dyn Any>, update: &StateUpdate) -> Rc<dyn Any> {
    match update {
        StateUpdate::Replace(value) => value.clone(),
        StateUpdate::Transform(f) => f(state.as_ref()),
    }
}

/// Declare a state slot at the current call index.
///
/// Resolves to the previous generation's value for this slot (or `init` on
/// first use) with every queued update applied in order: a replacement
/// substitutes the state, a transform maps it. Returns the resolved value
/// and a typed handle for queueing further updates through
/// [`Engine::set_state`](crate::Engine::set_state) and
/// [`Engine::update_state`](crate::Engine::update_state).
///
/// # Panics
///
/// Panics if the slot at this call index held a different type on the
/// previous render (a call-order invariant violation).
pub fn use_state<T: Clone + 'static>(cx: &mut HookCx<'_>, init: T) -> (T, StateSlot<T>) {
    let fiber = cx.fiber;
    let (state, index) = cx.next_slot(|| Rc::new(init));
    let value = state
        .downcast_ref::<T>()
        .expect("hook slot type changed between renders")
        .clone();
    (value, StateSlot::new(fiber, index))
}

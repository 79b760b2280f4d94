// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-target contract.
//!
//! The engine owns the *description* of the tree; a [`Host`] owns the
//! mutable native nodes it is projected onto. Commit drives a host through
//! structural mutations (append/remove) and property rewrites; node
//! creation happens lazily during the pass, on detached nodes that only
//! become visible when commit attaches them.
//!
//! Hosts are deliberately dumb: they never see fibers or effect tags, only
//! node handles and concrete mutations, which keeps DOM-like targets, retained
//! scene graphs, and test doubles equally easy to implement.

use crate::element::{Listener, PropValue};

/// A mutable render target the committed tree is projected onto.
///
/// All operations are fallible; the engine never retries a failed call. A
/// failure during the pass aborts it before anything is visible; a failure
/// during commit aborts the remaining effects and leaves the engine's
/// bookkeeping on the previously committed tree.
pub trait Host {
    /// Handle to a native node. Handles are plain values owned by the host;
    /// the engine stores and passes them back but never interprets them.
    type Node: Copy + Eq + core::fmt::Debug;
    /// Host-side failure type ([`Infallible`](core::convert::Infallible)
    /// for hosts that cannot fail).
    type Error: core::fmt::Debug;

    /// Create a detached native node for a host tag.
    fn create_node(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

    /// Create a detached text-bearing native node.
    fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    /// Replace the text of a text-bearing node.
    fn set_text(&mut self, node: Self::Node, text: &str) -> Result<(), Self::Error>;

    /// Set a named property.
    fn set_prop(&mut self, node: Self::Node, key: &str, value: &PropValue)
    -> Result<(), Self::Error>;

    /// Clear a named property.
    fn clear_prop(&mut self, node: Self::Node, key: &str) -> Result<(), Self::Error>;

    /// Add an event binding. `event` is the lower-cased name with the
    /// reserved `on` prefix already stripped (see
    /// [`event_name`](crate::element::event_name)).
    fn add_listener(
        &mut self,
        node: Self::Node,
        event: &str,
        listener: Listener,
    ) -> Result<(), Self::Error>;

    /// Remove the event binding(s) for a name.
    fn remove_listener(&mut self, node: Self::Node, event: &str) -> Result<(), Self::Error>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error>;

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error>;
}

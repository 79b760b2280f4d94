// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory render target for tests, demos, and headless drivers.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt::Write as _;

use crate::element::{Listener, PropValue};
use crate::host::Host;

/// Handle to a node owned by a [`MemoryHost`].
///
/// Handles are never invalidated: the host arena only grows, and removal
/// merely detaches a node from its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryNodeId(u32);

enum MemoryNodeKind {
    Element(String),
    Text(String),
}

struct MemoryNode {
    kind: MemoryNodeKind,
    props: Vec<(String, PropValue)>,
    listeners: Vec<(String, Listener)>,
    children: Vec<MemoryNodeId>,
    parent: Option<MemoryNodeId>,
}

impl MemoryNode {
    fn new(kind: MemoryNodeKind) -> Self {
        Self {
            kind,
            props: Vec::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// A [`Host`] that renders into a plain in-memory node tree.
///
/// Nodes live in an append-only arena rooted at [`MemoryHost::root`]. Every
/// query the commit phase performs is readable back out, which makes this
/// the reference target for asserting what a pass actually did; it also
/// dispatches events to committed listeners via [`MemoryHost::fire`].
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    /// Create a host holding only the root container.
    pub fn new() -> Self {
        Self {
            nodes: alloc::vec![MemoryNode::new(MemoryNodeKind::Element("#root".to_string()))],
        }
    }

    /// The container node render passes mount into.
    pub fn root(&self) -> MemoryNodeId {
        MemoryNodeId(0)
    }

    fn node(&self, id: MemoryNodeId) -> &MemoryNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: MemoryNodeId) -> &mut MemoryNode {
        &mut self.nodes[id.0 as usize]
    }

    fn push(&mut self, node: MemoryNode) -> MemoryNodeId {
        self.nodes.push(node);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "MemoryNodeId uses 32-bit indices by design."
        )]
        MemoryNodeId((self.nodes.len() - 1) as u32)
    }

    /// Element tag, or `None` for text nodes.
    pub fn tag_of(&self, id: MemoryNodeId) -> Option<&str> {
        match &self.node(id).kind {
            MemoryNodeKind::Element(tag) => Some(tag),
            MemoryNodeKind::Text(_) => None,
        }
    }

    /// Text content, or `None` for element nodes.
    pub fn text_of(&self, id: MemoryNodeId) -> Option<&str> {
        match &self.node(id).kind {
            MemoryNodeKind::Text(text) => Some(text),
            MemoryNodeKind::Element(_) => None,
        }
    }

    /// Current value of a property, if set.
    pub fn prop_of(&self, id: MemoryNodeId, key: &str) -> Option<&PropValue> {
        self.node(id)
            .props
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Event names with at least one attached listener, in attach order.
    pub fn listener_names(&self, id: MemoryNodeId) -> Vec<String> {
        self.node(id)
            .listeners
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }

    /// Attached children, in document order.
    pub fn children_of(&self, id: MemoryNodeId) -> Vec<MemoryNodeId> {
        self.node(id).children.clone()
    }

    /// The node this one is attached under, if any.
    pub fn parent_of(&self, id: MemoryNodeId) -> Option<MemoryNodeId> {
        self.node(id).parent
    }

    /// Invoke every listener attached to `id` for `event`.
    pub fn fire(&self, id: MemoryNodeId, event: &str) {
        // Clone out first: listeners commonly re-enter the engine that
        // borrows this host.
        let listeners: Vec<Listener> = self
            .node(id)
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Render the attached tree under the root as angle-bracket markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.node(self.root()).children {
            self.write_markup(*child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: MemoryNodeId, out: &mut String) {
        match &self.node(id).kind {
            MemoryNodeKind::Text(text) => out.push_str(text),
            MemoryNodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in &self.node(id).props {
                    match value {
                        PropValue::Str(s) => {
                            let _ = write!(out, " {key}=\"{s}\"");
                        }
                        PropValue::Number(n) => {
                            let _ = write!(out, " {key}=\"{n}\"");
                        }
                        PropValue::Bool(b) => {
                            let _ = write!(out, " {key}=\"{b}\"");
                        }
                        PropValue::Listener(_) => {}
                    }
                }
                out.push('>');
                for child in &self.node(id).children {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

impl Host for MemoryHost {
    type Node = MemoryNodeId;
    type Error = Infallible;

    fn create_node(&mut self, tag: &str) -> Result<Self::Node, Self::Error> {
        Ok(self.push(MemoryNode::new(MemoryNodeKind::Element(tag.to_string()))))
    }

    fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error> {
        Ok(self.push(MemoryNode::new(MemoryNodeKind::Text(text.to_string()))))
    }

    fn set_text(&mut self, node: Self::Node, text: &str) -> Result<(), Self::Error> {
        self.node_mut(node).kind = MemoryNodeKind::Text(text.to_string());
        Ok(())
    }

    fn set_prop(&mut self, node: Self::Node, key: &str, value: &PropValue) -> Result<(), Self::Error> {
        let props = &mut self.node_mut(node).props;
        match props.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value.clone(),
            None => props.push((key.to_string(), value.clone())),
        }
        Ok(())
    }

    fn clear_prop(&mut self, node: Self::Node, key: &str) -> Result<(), Self::Error> {
        self.node_mut(node).props.retain(|(k, _)| k != key);
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: Self::Node,
        event: &str,
        listener: Listener,
    ) -> Result<(), Self::Error> {
        self.node_mut(node).listeners.push((event.to_string(), listener));
        Ok(())
    }

    fn remove_listener(&mut self, node: Self::Node, event: &str) -> Result<(), Self::Error> {
        self.node_mut(node).listeners.retain(|(name, _)| name != event);
        Ok(())
    }

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error> {
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error> {
        self.node_mut(parent).children.retain(|c| *c != child);
        self.node_mut(child).parent = None;
        Ok(())
    }
}

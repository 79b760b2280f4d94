// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional child diffing: pairing one fiber's new child elements with
//! the previous generation's child fibers and tagging effects.

use crate::element::Element;
use crate::engine::{Engine, Fiber};
use crate::hooks::HookList;
use crate::host::Host;
use crate::types::{EffectTag, FiberId};

impl<H: Host> Engine<H> {
    /// Walk `elements` and the alternate's child chain in lockstep by
    /// position, allocating a new-generation fiber per element and tagging
    /// effects.
    ///
    /// Pairing is purely positional (index `i` against index `i`); there is
    /// no keyed matching, so list reorders degrade to update-or-replace at
    /// each shifted position. A pair of the same type becomes an update
    /// reusing the old native node; a type mismatch or an extra element
    /// becomes a placement; a leftover old fiber is tagged deletion in
    /// place (it stays in the committed tree until commit detaches it) and
    /// queued. Tagging only: the host is not touched here.
    pub(crate) fn reconcile_children(&mut self, parent: FiberId, elements: &[Element]) {
        let mut old = self
            .fiber(parent)
            .alternate
            .and_then(|alt| self.fiber(alt).child);
        let mut prev_new: Option<FiberId> = None;
        let mut index = 0;
        while index < elements.len() || old.is_some() {
            let element = elements.get(index);
            let same = match (element, old) {
                (Some(el), Some(old_id)) => el.kind.same_type(&self.fiber(old_id).kind),
                _ => false,
            };
            let new_fiber = match (element, old) {
                (Some(el), Some(old_id)) if same => Some(self.alloc(Fiber {
                    generation: 0,
                    // For text this carries the new text; commit writes it
                    // through to the reused node.
                    kind: el.kind.clone(),
                    props: el.props.clone(),
                    children: el.children.clone(),
                    node: self.fiber(old_id).node,
                    parent: Some(parent),
                    child: None,
                    sibling: None,
                    alternate: Some(old_id),
                    effect: EffectTag::Update,
                    hooks: HookList::new(),
                })),
                (Some(el), _) => Some(self.alloc(Fiber {
                    generation: 0,
                    kind: el.kind.clone(),
                    props: el.props.clone(),
                    children: el.children.clone(),
                    node: None,
                    parent: Some(parent),
                    child: None,
                    sibling: None,
                    alternate: None,
                    effect: EffectTag::Placement,
                    hooks: HookList::new(),
                })),
                (None, _) => None,
            };
            if !same && let Some(old_id) = old {
                self.fiber_mut(old_id).effect = EffectTag::Deletion;
                self.deletions.push(old_id);
            }
            if let Some(old_id) = old {
                old = self.fiber(old_id).sibling;
            }
            if let Some(new_id) = new_fiber {
                match prev_new {
                    None => self.fiber_mut(parent).child = Some(new_id),
                    Some(prev) => self.fiber_mut(prev).sibling = Some(new_id),
                }
                prev_new = Some(new_id);
            }
            index += 1;
        }
    }
}

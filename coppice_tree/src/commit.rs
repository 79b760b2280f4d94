// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit phase: applying a completed pass's effects to the host as
//! one uninterrupted batch.

use crate::element::{ElementKind, PropValue, Props, event_name};
use crate::engine::Engine;
use crate::error::Error;
use crate::host::Host;
use crate::trace::TraceEvent;
use crate::types::{EffectTag, FiberId};

/// Counts of native-node mutations applied by one commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Detached nodes newly attached to the tree.
    pub placed: usize,
    /// Reused nodes whose text or properties were rewritten.
    pub updated: usize,
    /// Subtrees detached from the tree.
    pub removed: usize,
}

impl<H: Host> Engine<H> {
    /// Apply a completed pass to the host and swap generations.
    ///
    /// A no-op (returning a zeroed summary) unless the traversal is
    /// exhausted and a work-in-progress tree is pending; a partially built
    /// tree is never observable through the host. Otherwise: queued
    /// deletions are detached first, then the new tree is walked depth
    /// first applying placements and updates, the previous committed tree
    /// is freed, and the new tree becomes current. The batch runs without
    /// yield points.
    ///
    /// If the host fails mid-batch the error is returned, the pass is
    /// discarded, and the previous tree stays current; the host may have
    /// absorbed a prefix of the batch, so the recommended recovery is a
    /// fresh [`Engine::render`].
    pub fn commit(&mut self) -> Result<CommitSummary, Error<H::Error>> {
        if self.next_unit.is_some() {
            return Ok(CommitSummary::default());
        }
        let Some(wip) = self.wip_root else {
            return Ok(CommitSummary::default());
        };
        let mut summary = CommitSummary::default();
        match self.apply_pass(wip, &mut summary) {
            Ok(()) => {
                let previous = self.current_root;
                self.wip_root = None;
                self.current_root = Some(wip);
                if let Some(prev) = previous {
                    self.free_tree(prev);
                }
                self.tracer.emit(TraceEvent::Committed(summary));
                Ok(summary)
            }
            Err(err) => {
                self.discard_pass();
                Err(err)
            }
        }
    }

    fn apply_pass(
        &mut self,
        wip: FiberId,
        summary: &mut CommitSummary,
    ) -> Result<(), Error<H::Error>> {
        for id in core::mem::take(&mut self.deletions) {
            self.commit_deletion(id)?;
            summary.removed += 1;
        }
        let mut next = self.fiber(wip).child;
        while let Some(id) = next {
            self.commit_unit(id, summary)?;
            next = self.next_after(id);
        }
        Ok(())
    }

    fn commit_unit(
        &mut self,
        id: FiberId,
        summary: &mut CommitSummary,
    ) -> Result<(), Error<H::Error>> {
        match self.fiber(id).effect {
            EffectTag::Placement => {
                // Component fibers own no node; their host descendants
                // carry their own placement tags.
                if let Some(node) = self.fiber(id).node {
                    let parent_node = self.node_bearing_ancestor(id);
                    self.host.append_child(parent_node, node)?;
                    summary.placed += 1;
                }
            }
            EffectTag::Update => {
                if let Some(node) = self.fiber(id).node {
                    self.update_node(id, node)?;
                    summary.updated += 1;
                }
            }
            EffectTag::None | EffectTag::Deletion => {}
        }
        Ok(())
    }

    /// Detach the nearest node-bearing descendant of a deleted fiber from
    /// the nearest node-bearing ancestor.
    fn commit_deletion(&mut self, id: FiberId) -> Result<(), Error<H::Error>> {
        let mut cursor = id;
        let node = loop {
            if let Some(node) = self.fiber(cursor).node {
                break Some(node);
            }
            match self.fiber(cursor).child {
                Some(child) => cursor = child,
                None => break None,
            }
        };
        if let Some(node) = node {
            let parent_node = self.node_bearing_ancestor(id);
            self.host.remove_child(parent_node, node)?;
        }
        Ok(())
    }

    /// Rewrite a reused node against the new fiber's description: text is
    /// written through unconditionally; host props are cleared wholesale
    /// from the alternate's set and re-applied from the new set.
    fn update_node(&mut self, id: FiberId, node: H::Node) -> Result<(), Error<H::Error>> {
        let kind = self.fiber(id).kind.clone();
        if let ElementKind::Text(text) = kind {
            self.host.set_text(node, &text)?;
            return Ok(());
        }
        let new_props = self.fiber(id).props.clone();
        let old_props = match self.fiber(id).alternate {
            Some(alt) => self.fiber(alt).props.clone(),
            None => Props::new(),
        };
        for (key, value) in old_props.iter() {
            if let (Some(event), PropValue::Listener(_)) = (event_name(key), value) {
                self.host.remove_listener(node, &event)?;
            }
        }
        for (key, value) in old_props.iter() {
            if !matches!(value, PropValue::Listener(_)) {
                self.host.clear_prop(node, key)?;
            }
        }
        for (key, value) in new_props.iter() {
            match (event_name(key), value) {
                (Some(event), PropValue::Listener(listener)) => {
                    self.host.add_listener(node, &event, listener.clone())?;
                }
                _ => self.host.set_prop(node, key, value)?,
            }
        }
        Ok(())
    }

    /// Walk the parent chain to the first fiber owning a native node. The
    /// synthetic root always owns the container, so this terminates.
    fn node_bearing_ancestor(&self, id: FiberId) -> H::Node {
        let mut cursor = self
            .fiber(id)
            .parent
            .expect("commit reached a detached fiber");
        loop {
            if let Some(node) = self.fiber(cursor).node {
                return node;
            }
            cursor = self
                .fiber(cursor)
                .parent
                .expect("commit reached a detached fiber");
        }
    }
}

#[cfg(all(test, feature = "host_memory"))]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::CommitSummary;
    use crate::deadline::Unbounded;
    use crate::element::{Element, PropValue};
    use crate::engine::{Engine, RunStatus};
    use crate::hosts::MemoryHost;

    fn engine() -> Engine<MemoryHost> {
        Engine::new(MemoryHost::new())
    }

    fn run_to_commit(engine: &mut Engine<MemoryHost>) -> CommitSummary {
        match engine.run(&Unbounded).unwrap() {
            RunStatus::Committed(summary) => summary,
            other => panic!("expected a commit, got {other:?}"),
        }
    }

    #[test]
    fn mount_builds_the_host_tree() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(
            Element::host("div")
                .prop("id", "a")
                .child(Element::host("p").text_child("hello")),
            container,
        );
        let summary = run_to_commit(&mut engine);
        assert_eq!(
            summary,
            CommitSummary {
                placed: 3,
                updated: 0,
                removed: 0
            }
        );

        let host = engine.host();
        let [div] = host.children_of(container)[..] else {
            panic!("container should hold exactly the mounted div");
        };
        assert_eq!(host.tag_of(div), Some("div"));
        assert_eq!(host.prop_of(div, "id"), Some(&PropValue::Str("a".into())));
        let [p] = host.children_of(div)[..] else {
            panic!("div should hold exactly one p");
        };
        assert_eq!(host.tag_of(p), Some("p"));
        let [text] = host.children_of(p)[..] else {
            panic!("p should hold exactly one text node");
        };
        assert_eq!(host.text_of(text), Some("hello"));
    }

    #[test]
    fn text_change_updates_the_same_node() {
        let mut engine = engine();
        let container = engine.host().root();
        let tree = |text: &str| Element::host("p").text_child(text);

        engine.render(tree("hello"), container);
        run_to_commit(&mut engine);
        let p = engine.host().children_of(container)[0];
        let text = engine.host().children_of(p)[0];

        engine.render(tree("world"), container);
        let summary = run_to_commit(&mut engine);
        // Both the reused p and the text node are update-tagged.
        assert_eq!(
            summary,
            CommitSummary {
                placed: 0,
                updated: 2,
                removed: 0
            }
        );
        assert_eq!(engine.host().children_of(container), [p]);
        assert_eq!(engine.host().children_of(p), [text]);
        assert_eq!(engine.host().text_of(text), Some("world"));
    }

    #[test]
    fn shrinking_removes_trailing_children() {
        let mut engine = engine();
        let container = engine.host().root();
        let tree = |n: usize| {
            let mut ul = Element::host("ul");
            for _ in 0..n {
                ul = ul.child(Element::host("li"));
            }
            ul
        };

        engine.render(tree(3), container);
        run_to_commit(&mut engine);
        let ul = engine.host().children_of(container)[0];
        let first_li = engine.host().children_of(ul)[0];

        engine.render(tree(1), container);
        let summary = run_to_commit(&mut engine);
        assert_eq!(summary.removed, 2);
        assert_eq!(summary.placed, 0);
        assert_eq!(engine.host().children_of(ul), [first_li]);
    }

    #[test]
    fn type_change_swaps_the_node() {
        let mut engine = engine();
        let container = engine.host().root();

        engine.render(Element::host("p"), container);
        run_to_commit(&mut engine);
        let p = engine.host().children_of(container)[0];

        engine.render(Element::host("span"), container);
        let summary = run_to_commit(&mut engine);
        assert_eq!(summary.placed, 1);
        assert_eq!(summary.removed, 1);

        let [span] = engine.host().children_of(container)[..] else {
            panic!("container should hold exactly the replacement span");
        };
        assert_ne!(span, p);
        assert_eq!(engine.host().tag_of(span), Some("span"));
    }

    #[test]
    fn listener_rebind_detaches_the_old_closure() {
        let mut engine = engine();
        let container = engine.host().root();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let tree = |count: &Rc<Cell<i32>>| {
            let count = Rc::clone(count);
            Element::host("button").listener("onClick", move || count.set(count.get() + 1))
        };

        engine.render(tree(&first), container);
        run_to_commit(&mut engine);
        let button = engine.host().children_of(container)[0];
        engine.host().fire(button, "click");
        assert_eq!((first.get(), second.get()), (1, 0));

        engine.render(tree(&second), container);
        run_to_commit(&mut engine);
        assert_eq!(engine.host().listener_names(button), ["click"]);
        engine.host().fire(button, "click");
        assert_eq!((first.get(), second.get()), (1, 1));
    }

    #[test]
    fn prop_removal_clears_the_host_prop() {
        let mut engine = engine();
        let container = engine.host().root();

        engine.render(
            Element::host("div").prop("id", "a").prop("hidden", true),
            container,
        );
        run_to_commit(&mut engine);
        let div = engine.host().children_of(container)[0];

        engine.render(Element::host("div").prop("id", "b"), container);
        run_to_commit(&mut engine);
        assert_eq!(
            engine.host().prop_of(div, "id"),
            Some(&PropValue::Str("b".into()))
        );
        assert_eq!(engine.host().prop_of(div, "hidden"), None);
    }

    #[test]
    fn deep_chains_mount_update_and_shrink() {
        const DEPTH: usize = 5000;
        // A div chain DEPTH levels deep ending in a text-bearing p.
        fn chain(text: &str) -> Element {
            let mut el = Element::host("p").text_child(text);
            for _ in 0..DEPTH {
                el = Element::host("div").child(el);
            }
            el
        }
        fn leaf_text(engine: &Engine<MemoryHost>) -> Option<alloc::string::String> {
            let mut node = engine.host().root();
            loop {
                node = *engine.host().children_of(node).first()?;
                if let Some(text) = engine.host().text_of(node) {
                    return Some(text.into());
                }
            }
        }

        let mut engine = engine();
        let container = engine.host().root();

        engine.render(chain("hello"), container);
        let summary = run_to_commit(&mut engine);
        assert_eq!(summary.placed, DEPTH + 2);
        assert_eq!(leaf_text(&engine).as_deref(), Some("hello"));

        engine.render(chain("world"), container);
        let summary = run_to_commit(&mut engine);
        assert_eq!(summary.updated, DEPTH + 2);
        assert_eq!(summary.removed, 0);
        assert_eq!(leaf_text(&engine).as_deref(), Some("world"));

        // Collapsing to a single div detaches the whole chain as one unit.
        engine.render(Element::host("div"), container);
        let summary = run_to_commit(&mut engine);
        assert_eq!(summary.removed, 1);
        let div = engine.host().children_of(container)[0];
        assert!(engine.host().children_of(div).is_empty());
    }

    #[test]
    fn commit_is_a_noop_mid_pass() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(
            Element::host("div").child(Element::host("p")),
            container,
        );
        engine.step().unwrap();
        assert!(engine.next_unit().is_some());

        let summary = engine.commit().unwrap();
        assert_eq!(summary, CommitSummary::default());
        assert!(engine.host().children_of(container).is_empty());
        assert!(engine.current_root().is_none());
        assert!(engine.wip_root().is_some());
    }
}

// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciliation engine: fiber arena, double buffering, and the
//! cooperative work loop.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use smallvec::SmallVec;

use crate::commit::CommitSummary;
use crate::deadline::IdleDeadline;
use crate::element::{Component, Element, ElementKind, PropValue, Props, event_name};
use crate::error::Error;
use crate::hooks::{HookCx, HookList, StateSlot, StateUpdate};
use crate::host::Host;
use crate::trace::{TraceEvent, Tracer};
use crate::types::{EffectTag, FiberId};

/// Kind given to synthetic root fibers. The root's native node is the
/// caller's container, so this tag is never sent to the host.
pub(crate) const ROOT_TAG: &str = "#root";

/// One mutable work unit: an element occurrence in a specific generation.
pub(crate) struct Fiber<H: Host> {
    pub(crate) generation: u32,
    pub(crate) kind: ElementKind,
    pub(crate) props: Props,
    /// Element descriptions for the next tree level, reconciled when this
    /// fiber is processed. Shared with the parent's description, so deep
    /// trees cost one pointer bump per level rather than a subtree copy.
    pub(crate) children: Rc<Vec<Element>>,
    /// Native handle, created lazily and reused across generations while
    /// the kind matches.
    pub(crate) node: Option<H::Node>,
    pub(crate) parent: Option<FiberId>,
    /// Owning edge to the first child.
    pub(crate) child: Option<FiberId>,
    /// Owning edge to the next sibling.
    pub(crate) sibling: Option<FiberId>,
    /// Non-owning cross-generation link to the fiber at the same position
    /// in the previous generation.
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: EffectTag,
    pub(crate) hooks: HookList,
}

/// Result of a single [`Engine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// No pass is in flight.
    Idle,
    /// One unit of work was performed; more remain.
    Worked,
    /// The traversal is exhausted; a completed pass awaits [`Engine::commit`].
    ReadyToCommit,
}

/// Result of one [`Engine::run`] invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// No pass was in flight.
    Idle,
    /// The time budget expired with work remaining; invoke `run` again.
    Yielded,
    /// The pass completed and was committed.
    Committed(CommitSummary),
}

/// An incremental, interruptible tree-reconciliation engine over a [`Host`].
///
/// The engine keeps two fiber trees in an arena: the *current* tree (last
/// committed) and a *work-in-progress* tree built one fiber at a time by
/// [`Engine::run`]/[`Engine::step`] under a host-supplied time budget. When
/// a pass completes, [`Engine::commit`] applies every tagged effect to the
/// host as one uninterrupted batch and the work-in-progress tree becomes
/// current.
///
/// All scheduling state (`current`/`work-in-progress` roots, the traversal
/// cursor, the deletion queue) lives on this value; there are no process
/// globals. Execution is strictly single-threaded and cooperative:
/// suspension happens only between units of work, never inside one and
/// never during commit.
///
/// ## Example
///
/// ```rust
/// use coppice_tree::{Element, Engine, Unbounded, hosts::MemoryHost};
///
/// let host = MemoryHost::new();
/// let container = host.root();
/// let mut engine = Engine::new(host);
/// engine.render(
///     Element::host("div").prop("id", "a").child(Element::host("p").text_child("hello")),
///     container,
/// );
/// engine.run(&Unbounded).unwrap();
///
/// let div = engine.host().children_of(container)[0];
/// assert_eq!(engine.host().tag_of(div), Some("div"));
/// ```
pub struct Engine<H: Host> {
    /// slots
    fibers: Vec<Option<Fiber<H>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    pub(crate) host: H,
    pub(crate) current_root: Option<FiberId>,
    pub(crate) wip_root: Option<FiberId>,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) deletions: SmallVec<[FiberId; 8]>,
    pub(crate) tracer: Tracer,
}

impl<H: Host> core::fmt::Debug for Engine<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.fibers.len();
        let alive = self.fibers.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Engine")
            .field("fibers_total", &total)
            .field("fibers_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("current_root", &self.current_root)
            .field("wip_root", &self.wip_root)
            .field("next_unit", &self.next_unit)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Engine<H> {
    /// Create an engine over the given render target.
    pub fn new(host: H) -> Self {
        Self {
            fibers: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            host,
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: SmallVec::new(),
            tracer: Tracer::disabled(),
        }
    }

    /// Borrow the render target (e.g. to inspect it or fire listeners).
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Install a trace sink receiving scheduling and commit events.
    #[cfg(feature = "trace")]
    pub fn set_trace_sink(&mut self, sink: alloc::boxed::Box<dyn crate::trace::TraceSink>) {
        self.tracer.set_sink(sink);
    }

    // --- arena ---

    pub(crate) fn alloc(&mut self, mut fiber: Fiber<H>) -> FiberId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            fiber.generation = generation;
            self.fibers[idx] = Some(fiber);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "FiberId uses 32-bit indices by design."
            )]
            FiberId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            fiber.generation = generation;
            self.fibers.push(Some(fiber));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "FiberId uses 32-bit indices by design."
            )]
            FiberId::new((self.fibers.len() - 1) as u32, generation)
        }
    }

    /// Free a fiber tree through its owning `child`/`sibling` edges.
    pub(crate) fn free_tree(&mut self, root: FiberId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.is_alive(id) {
                continue;
            }
            let fiber = self.fibers[id.idx()].take().expect("dangling FiberId");
            if let Some(child) = fiber.child {
                stack.push(child);
            }
            if let Some(sibling) = fiber.sibling {
                stack.push(sibling);
            }
            self.free_list.push(id.idx());
        }
    }

    /// Access a fiber; panics if `id` is stale.
    pub(crate) fn fiber(&self, id: FiberId) -> &Fiber<H> {
        self.fibers[id.idx()].as_ref().expect("dangling FiberId")
    }

    /// Access a fiber mutably; panics if `id` is stale.
    pub(crate) fn fiber_mut(&mut self, id: FiberId) -> &mut Fiber<H> {
        self.fibers[id.idx()].as_mut().expect("dangling FiberId")
    }

    fn fiber_opt(&self, id: FiberId) -> Option<&Fiber<H>> {
        let fiber = self.fibers.get(id.idx())?.as_ref()?;
        (fiber.generation == id.1).then_some(fiber)
    }

    /// Returns true if `id` refers to a live fiber.
    ///
    /// A `FiberId` is live if its slot is occupied and its generation
    /// matches the slot's current generation; ids into freed generations
    /// are stale.
    pub fn is_alive(&self, id: FiberId) -> bool {
        self.fiber_opt(id).is_some()
    }

    // --- render requests ---

    /// Arm a render pass projecting `element` into `container`.
    ///
    /// The first call has no current tree and every resulting fiber will be
    /// tagged placement; later calls reconcile against the committed tree.
    /// Arming while a previous pass is mid-traversal silently discards that
    /// pass's progress (the new root overwrites the traversal cursor); the
    /// committed tree is unaffected.
    ///
    /// Nothing touches the host until the pass completes and commits.
    pub fn render(&mut self, element: Element, container: H::Node) -> FiberId {
        self.discard_pass();
        let root = self.alloc(Fiber {
            generation: 0,
            kind: ElementKind::Host(ROOT_TAG.into()),
            props: Props::new(),
            children: Rc::new(vec![element]),
            node: Some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate: self.current_root,
            effect: EffectTag::None,
            hooks: HookList::new(),
        });
        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.tracer.emit(TraceEvent::PassArmed);
        root
    }

    /// Arm a state-triggered pass rooted at the committed root, reusing its
    /// native node and element descriptions.
    fn arm_update_pass(&mut self) {
        let Some(current) = self.current_root else {
            // Nothing committed yet; the queued update is picked up by
            // whichever pass renders this fiber next.
            return;
        };
        self.discard_pass();
        let (kind, props, children, node) = {
            let fiber = self.fiber(current);
            (
                fiber.kind.clone(),
                fiber.props.clone(),
                fiber.children.clone(),
                fiber.node,
            )
        };
        let root = self.alloc(Fiber {
            generation: 0,
            kind,
            props,
            children,
            node,
            parent: None,
            child: None,
            sibling: None,
            alternate: Some(current),
            effect: EffectTag::None,
            hooks: HookList::new(),
        });
        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.tracer.emit(TraceEvent::PassArmed);
    }

    /// Discard any in-flight pass: un-tag queued deletions (they belong to
    /// the committed tree), free the partial work-in-progress tree, and
    /// clear the traversal cursor.
    pub(crate) fn discard_pass(&mut self) {
        if self.wip_root.is_none() && self.next_unit.is_none() && self.deletions.is_empty() {
            return;
        }
        for id in core::mem::take(&mut self.deletions) {
            if self.is_alive(id) {
                self.fiber_mut(id).effect = EffectTag::None;
            }
        }
        if let Some(root) = self.wip_root.take() {
            self.free_tree(root);
        }
        self.next_unit = None;
        self.tracer.emit(TraceEvent::PassDiscarded);
    }

    // --- state updates ---

    /// Queue a replacement value for a state slot and arm a new pass.
    ///
    /// The update lands on the slot's committed hook; it takes effect when
    /// the armed pass re-invokes the owning component.
    pub fn set_state<T: 'static>(
        &mut self,
        slot: StateSlot<T>,
        value: T,
    ) -> Result<(), Error<H::Error>> {
        self.queue_update(slot.fiber, slot.index, StateUpdate::Replace(Rc::new(value)))
    }

    /// Queue a state transform (applied to the then-current value, in queue
    /// order) and arm a new pass.
    pub fn update_state<T: 'static>(
        &mut self,
        slot: StateSlot<T>,
        f: impl Fn(&T) -> T + 'static,
    ) -> Result<(), Error<H::Error>> {
        let transform: Rc<dyn Fn(&dyn Any) -> Rc<dyn Any>> = Rc::new(move |any| {
            let value = any
                .downcast_ref::<T>()
                .expect("hook slot type changed between renders");
            Rc::new(f(value))
        });
        self.queue_update(slot.fiber, slot.index, StateUpdate::Transform(transform))
    }

    fn queue_update(
        &mut self,
        fiber: FiberId,
        index: usize,
        update: StateUpdate,
    ) -> Result<(), Error<H::Error>> {
        if !self.is_alive(fiber) {
            return Err(Error::StaleSlot);
        }
        let Some(hook) = self.fiber_mut(fiber).hooks.get_mut(index) else {
            return Err(Error::StaleSlot);
        };
        hook.queue.push(update);
        self.arm_update_pass();
        Ok(())
    }

    /// Re-acquire a typed slot handle from a live component fiber.
    ///
    /// Returns `None` for stale ids, non-component fibers, missing slot
    /// indices, or a state type other than `T`. Drivers use this to refresh
    /// handles after each commit (each generation has fresh fibers).
    pub fn component_slot<T: 'static>(&self, fiber: FiberId, index: usize) -> Option<StateSlot<T>> {
        let f = self.fiber_opt(fiber)?;
        if !matches!(f.kind, ElementKind::Component(_)) {
            return None;
        }
        let hook = f.hooks.get(index)?;
        hook.state.is::<T>().then(|| StateSlot::new(fiber, index))
    }

    /// Find the first fiber in the committed tree invoking `component`, in
    /// depth-first order.
    pub fn find_component(&self, component: Component) -> Option<FiberId> {
        let mut next = self.current_root;
        while let Some(id) = next {
            if let ElementKind::Component(f) = &self.fiber(id).kind
                && core::ptr::fn_addr_eq(*f, component)
            {
                return Some(id);
            }
            next = self.next_after(id);
        }
        None
    }

    // --- work loop ---

    /// Run the work loop under a time budget.
    ///
    /// While a unit of work remains and at least one whole time unit does,
    /// performs exactly one unit and re-checks the budget. When the
    /// traversal exhausts with a completed pass pending, commits it (commit
    /// itself is never budget-checked). The caller re-invokes `run` from
    /// its idle callback until it returns something other than
    /// [`RunStatus::Yielded`].
    pub fn run(&mut self, deadline: &impl IdleDeadline) -> Result<RunStatus, Error<H::Error>> {
        while self.next_unit.is_some() && deadline.time_remaining() >= 1 {
            self.step()?;
        }
        if self.next_unit.is_none() && self.wip_root.is_some() {
            return Ok(RunStatus::Committed(self.commit()?));
        }
        if self.next_unit.is_some() {
            self.tracer.emit(TraceEvent::Yielded);
            Ok(RunStatus::Yielded)
        } else {
            Ok(RunStatus::Idle)
        }
    }

    /// Perform exactly one unit of work.
    ///
    /// Exposed so drivers (and tests) can control slicing themselves; a
    /// completed pass is *not* committed here, leaving a window to inspect
    /// the work-in-progress tree before [`Engine::commit`].
    pub fn step(&mut self) -> Result<StepStatus, Error<H::Error>> {
        let Some(unit) = self.next_unit else {
            return Ok(if self.wip_root.is_some() {
                StepStatus::ReadyToCommit
            } else {
                StepStatus::Idle
            });
        };
        match self.perform_unit(unit) {
            Ok(next) => {
                self.next_unit = next;
                Ok(if next.is_none() {
                    StepStatus::ReadyToCommit
                } else {
                    StepStatus::Worked
                })
            }
            Err(err) => {
                // A host failure aborts the whole pass; the committed tree
                // and its native nodes are untouched.
                self.discard_pass();
                Err(err)
            }
        }
    }

    /// Process one fiber and return the next in depth-first order.
    fn perform_unit(&mut self, id: FiberId) -> Result<Option<FiberId>, Error<H::Error>> {
        let kind = self.fiber(id).kind.clone();
        match kind {
            ElementKind::Component(component) => {
                let props = self.fiber(id).props.clone();
                let prev_hooks = match self.fiber(id).alternate {
                    Some(alt) => self.fiber(alt).hooks.clone(),
                    None => HookList::new(),
                };
                let mut cx = HookCx::new(id, &prev_hooks);
                let element = component(&mut cx, &props);
                self.fiber_mut(id).hooks = cx.into_hooks();
                self.reconcile_children(id, core::slice::from_ref(&element));
            }
            ElementKind::Host(_) | ElementKind::Text(_) => {
                if self.fiber(id).node.is_none() {
                    let node = self.create_native_node(id)?;
                    self.fiber_mut(id).node = Some(node);
                }
                let children = self.fiber(id).children.clone();
                self.reconcile_children(id, &children);
            }
        }
        self.tracer.emit(TraceEvent::UnitCompleted);
        Ok(self.next_after(id))
    }

    /// Create the detached native node for a host or text fiber and apply
    /// its initial properties. The node stays invisible until commit
    /// attaches it.
    fn create_native_node(&mut self, id: FiberId) -> Result<H::Node, Error<H::Error>> {
        let kind = self.fiber(id).kind.clone();
        match kind {
            ElementKind::Host(tag) => {
                let props = self.fiber(id).props.clone();
                let node = self.host.create_node(&tag)?;
                for (key, value) in props.iter() {
                    match (event_name(key), value) {
                        (Some(event), PropValue::Listener(listener)) => {
                            self.host.add_listener(node, &event, listener.clone())?;
                        }
                        _ => self.host.set_prop(node, key, value)?,
                    }
                }
                Ok(node)
            }
            ElementKind::Text(text) => Ok(self.host.create_text(&text)?),
            ElementKind::Component(_) => unreachable!("component fibers own no native node"),
        }
    }

    /// Depth-first successor: child, else first sibling found while
    /// climbing parents, else none (the pass is over). This order is
    /// load-bearing: it is both the processing order and the time-slicing
    /// granularity.
    pub(crate) fn next_after(&self, id: FiberId) -> Option<FiberId> {
        if let Some(child) = self.fiber(id).child {
            return Some(child);
        }
        let mut cursor = id;
        loop {
            if let Some(sibling) = self.fiber(cursor).sibling {
                return Some(sibling);
            }
            match self.fiber(cursor).parent {
                Some(parent) => cursor = parent,
                None => return None,
            }
        }
    }

    // --- read-only queries ---

    /// Root of the last committed tree, if any.
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Root of the tree under construction, if a pass is in flight or
    /// awaiting commit.
    pub fn wip_root(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Traversal cursor; `None` exactly when no pass is in flight or a
    /// completed pass awaits commit.
    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    /// Old-generation fibers queued for detachment at the next commit.
    pub fn pending_deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    /// First child of a live fiber.
    pub fn child_of(&self, id: FiberId) -> Option<FiberId> {
        self.fiber_opt(id).and_then(|f| f.child)
    }

    /// Next sibling of a live fiber.
    pub fn sibling_of(&self, id: FiberId) -> Option<FiberId> {
        self.fiber_opt(id).and_then(|f| f.sibling)
    }

    /// Parent of a live fiber (`None` for roots and stale ids).
    pub fn parent_of(&self, id: FiberId) -> Option<FiberId> {
        self.fiber_opt(id).and_then(|f| f.parent)
    }

    /// Same-position fiber in the previous generation, if any.
    pub fn alternate_of(&self, id: FiberId) -> Option<FiberId> {
        self.fiber_opt(id).and_then(|f| f.alternate)
    }

    /// Effect tag of a live fiber.
    pub fn effect_of(&self, id: FiberId) -> Option<EffectTag> {
        self.fiber_opt(id).map(|f| f.effect)
    }

    /// Kind of a live fiber.
    pub fn kind_of(&self, id: FiberId) -> Option<&ElementKind> {
        self.fiber_opt(id).map(|f| &f.kind)
    }

    /// Props of a live fiber.
    pub fn props_of(&self, id: FiberId) -> Option<&Props> {
        self.fiber_opt(id).map(|f| &f.props)
    }

    /// Native node handle of a live fiber, if one has been created.
    pub fn node_of(&self, id: FiberId) -> Option<H::Node> {
        self.fiber_opt(id).and_then(|f| f.node)
    }
}

#[cfg(all(test, feature = "host_memory"))]
mod tests {
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use super::*;
    use crate::deadline::{FixedBudget, Unbounded};
    use crate::hooks::use_state;
    use crate::hosts::MemoryHost;

    fn engine() -> Engine<MemoryHost> {
        Engine::new(MemoryHost::new())
    }

    fn label(kind: &ElementKind) -> String {
        match kind {
            ElementKind::Host(tag) => tag.to_string(),
            ElementKind::Text(text) => format!("\"{text}\""),
            ElementKind::Component(_) => "component".to_string(),
        }
    }

    fn item_list(n: usize) -> Element {
        let mut ul = Element::host("ul");
        for _ in 0..n {
            ul = ul.child(Element::host("li"));
        }
        ul
    }

    #[test]
    fn units_are_processed_child_first_then_sibling() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(
            Element::host("div")
                .child(Element::host("p").text_child("hello"))
                .child(Element::host("span")),
            container,
        );

        let mut order = Vec::new();
        while let Some(unit) = engine.next_unit() {
            order.push(label(engine.kind_of(unit).unwrap()));
            engine.step().unwrap();
        }
        assert_eq!(order, ["#root", "div", "p", "\"hello\"", "span"]);
    }

    #[test]
    fn run_yields_on_budget_exhaustion_and_resumes() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(
            Element::host("div")
                .child(Element::host("p"))
                .child(Element::host("span")),
            container,
        );

        // Two units fit in the budget; the pass has four.
        let status = engine.run(&FixedBudget::new(2)).unwrap();
        assert_eq!(status, RunStatus::Yielded);
        assert!(engine.next_unit().is_some());
        assert!(
            engine.host().children_of(container).is_empty(),
            "nothing may reach the host before commit"
        );

        let status = engine.run(&Unbounded).unwrap();
        assert!(matches!(status, RunStatus::Committed(_)));
        assert_eq!(engine.host().children_of(container).len(), 1);

        assert_eq!(engine.run(&Unbounded).unwrap(), RunStatus::Idle);
    }

    #[test]
    fn superseding_a_pass_untags_queued_deletions() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(item_list(3), container);
        engine.run(&Unbounded).unwrap();
        let ul = engine.host().children_of(container)[0];

        // Shrinking pass queues two deletions, then gets superseded.
        engine.render(item_list(1), container);
        while engine.pending_deletions().is_empty() {
            engine.step().unwrap();
        }
        let tagged: Vec<FiberId> = engine.pending_deletions().to_vec();
        assert_eq!(tagged.len(), 2);

        engine.render(item_list(3), container);
        assert!(engine.pending_deletions().is_empty());
        for id in &tagged {
            assert_eq!(
                engine.effect_of(*id),
                Some(EffectTag::None),
                "discarded passes must not leave deletion tags behind"
            );
        }

        let status = engine.run(&Unbounded).unwrap();
        if let RunStatus::Committed(summary) = status {
            assert_eq!(summary.removed, 0);
        } else {
            panic!("expected a commit, got {status:?}");
        }
        assert_eq!(engine.host().children_of(ul).len(), 3);
    }

    #[test]
    fn commit_frees_the_previous_generation() {
        let mut engine = engine();
        let container = engine.host().root();
        let tree = || Element::host("div").child(Element::host("p").text_child("x"));

        let first_root = engine.render(tree(), container);
        engine.run(&Unbounded).unwrap();
        let mut first_ids = Vec::new();
        let mut next = Some(first_root);
        while let Some(id) = next {
            first_ids.push(id);
            next = engine.next_after(id);
        }

        engine.render(tree(), container);
        engine.run(&Unbounded).unwrap();
        for id in &first_ids {
            assert!(!engine.is_alive(*id));
        }
        let root = engine.current_root().unwrap();
        assert!(
            engine
                .alternate_of(root)
                .is_some_and(|alt| !engine.is_alive(alt)),
            "alternate links into the freed generation must read as stale"
        );

        // Freed slots are recycled: a third pass of the same shape does not
        // grow the arena.
        let slots = engine.fibers.len();
        engine.render(tree(), container);
        engine.run(&Unbounded).unwrap();
        assert_eq!(engine.fibers.len(), slots);
    }

    #[test]
    fn host_failure_aborts_the_pass() {
        struct FailingHost;

        impl Host for FailingHost {
            type Node = u32;
            type Error = &'static str;

            fn create_node(&mut self, _tag: &str) -> Result<u32, &'static str> {
                Err("create_node refused")
            }
            fn create_text(&mut self, _text: &str) -> Result<u32, &'static str> {
                Err("create_text refused")
            }
            fn set_text(&mut self, _node: u32, _text: &str) -> Result<(), &'static str> {
                Ok(())
            }
            fn set_prop(
                &mut self,
                _node: u32,
                _key: &str,
                _value: &PropValue,
            ) -> Result<(), &'static str> {
                Ok(())
            }
            fn clear_prop(&mut self, _node: u32, _key: &str) -> Result<(), &'static str> {
                Ok(())
            }
            fn add_listener(
                &mut self,
                _node: u32,
                _event: &str,
                _listener: crate::element::Listener,
            ) -> Result<(), &'static str> {
                Ok(())
            }
            fn remove_listener(&mut self, _node: u32, _event: &str) -> Result<(), &'static str> {
                Ok(())
            }
            fn append_child(&mut self, _parent: u32, _child: u32) -> Result<(), &'static str> {
                Ok(())
            }
            fn remove_child(&mut self, _parent: u32, _child: u32) -> Result<(), &'static str> {
                Ok(())
            }
        }

        let mut engine = Engine::new(FailingHost);
        engine.render(Element::host("div"), 0);
        let err = engine.run(&Unbounded).unwrap_err();
        assert!(matches!(err, Error::Host("create_node refused")));

        assert!(engine.current_root().is_none());
        assert!(engine.wip_root().is_none());
        assert!(engine.next_unit().is_none());
        assert_eq!(engine.run(&Unbounded).unwrap(), RunStatus::Idle);
    }

    fn counter(cx: &mut HookCx<'_>, _props: &Props) -> Element {
        let (count, _) = use_state(cx, 0_i32);
        Element::host("p").text_child(format!("count: {count}"))
    }

    #[test]
    fn state_updates_land_on_the_committed_hook() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(Element::component(counter), container);
        engine.run(&Unbounded).unwrap();
        assert_eq!(engine.host().to_markup(), "<p>count: 0</p>");

        let fiber = engine.find_component(counter).unwrap();
        let slot = engine.component_slot::<i32>(fiber, 0).unwrap();
        engine.set_state(slot, 5).unwrap();
        let status = engine.run(&Unbounded).unwrap();
        assert!(matches!(status, RunStatus::Committed(_)));
        assert_eq!(engine.host().to_markup(), "<p>count: 5</p>");

        // Handles expire with their generation; re-acquire after a commit.
        assert!(matches!(engine.set_state(slot, 9), Err(Error::StaleSlot)));

        let fiber = engine.find_component(counter).unwrap();
        let slot = engine.component_slot::<i32>(fiber, 0).unwrap();
        engine.update_state(slot, |n| n + 1).unwrap();
        engine.update_state(slot, |n| n * 10).unwrap();
        engine.run(&Unbounded).unwrap();
        assert_eq!(engine.host().to_markup(), "<p>count: 60</p>");
    }

    #[test]
    fn unmounting_a_component_invalidates_its_slots() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(Element::component(counter), container);
        engine.run(&Unbounded).unwrap();
        let fiber = engine.find_component(counter).unwrap();
        let slot = engine.component_slot::<i32>(fiber, 0).unwrap();

        engine.render(Element::host("div"), container);
        engine.run(&Unbounded).unwrap();
        assert!(engine.find_component(counter).is_none());
        assert!(matches!(engine.set_state(slot, 1), Err(Error::StaleSlot)));
    }

    #[test]
    fn props_of_reflects_the_committed_description() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(Element::host("div").prop("id", "a"), container);
        engine.run(&Unbounded).unwrap();
        let div = engine.child_of(engine.current_root().unwrap()).unwrap();
        assert_eq!(
            engine.props_of(div).and_then(|p| p.get("id")),
            Some(&PropValue::from("a"))
        );

        engine.render(Element::host("div").prop("id", "b"), container);
        engine.run(&Unbounded).unwrap();
        assert_eq!(
            engine.props_of(div),
            None,
            "handles into the freed generation read as stale"
        );
        let div = engine.child_of(engine.current_root().unwrap()).unwrap();
        assert_eq!(
            engine.props_of(div).and_then(|p| p.get("id")),
            Some(&PropValue::from("b"))
        );
    }

    #[test]
    fn component_slot_rejects_the_wrong_type() {
        let mut engine = engine();
        let container = engine.host().root();
        engine.render(Element::component(counter), container);
        engine.run(&Unbounded).unwrap();
        let fiber = engine.find_component(counter).unwrap();
        assert!(engine.component_slot::<String>(fiber, 0).is_none());
        assert!(engine.component_slot::<i32>(fiber, 1).is_none());
        assert!(engine.component_slot::<i32>(fiber, 0).is_some());
    }
}

// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public handle and tag types for the fiber tree.

/// Identifier for a fiber in the engine's arena (generational).
///
/// A `FiberId` names one element occurrence in one *generation* of the tree.
/// Fibers are never mutated in place across generations: each pass allocates
/// fresh fibers, and the previous generation is freed at commit. A handle
/// into a freed generation is *stale* and is rejected by every accessor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FiberId(pub(crate) u32, pub(crate) u32);

impl FiberId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The mutation a fiber requires at commit time.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum EffectTag {
    /// No render-target mutation (e.g. the root fiber).
    #[default]
    None,
    /// A new native node must be attached.
    Placement,
    /// The existing native node's properties must be rewritten.
    Update,
    /// The native node must be detached. Only ever set on fibers of the
    /// *previous* generation; such fibers are queued, not re-linked.
    Deletion,
}

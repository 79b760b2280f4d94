// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine error type.

use core::fmt;

/// Errors surfaced by engine entry points.
///
/// No operation retries: a host failure aborts the in-flight pass (the
/// previously committed tree and its native nodes are left untouched) and
/// propagates to whichever of `render`/`run`/`step`/`set_state` triggered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The render target reported a failure.
    Host(E),
    /// A state slot referred to a fiber generation that has since been
    /// freed (by a commit or a superseded pass). Re-acquire the slot from
    /// the current tree.
    StaleSlot,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Host(err)
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(err) => write!(f, "render target error: {err}"),
            Self::StaleSlot => f.write_str("state slot refers to a freed fiber generation"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for Error<E> {}

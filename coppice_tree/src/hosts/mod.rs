// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bundled [`Host`](crate::Host) implementations.

mod memory;

pub use memory::{MemoryHost, MemoryNodeId};

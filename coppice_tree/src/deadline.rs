// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time budgets handed to the work loop by the host's idle primitive.

use core::cell::Cell;

/// A remaining-time query, in whole time units.
///
/// The work loop checks the deadline before each unit of work and yields
/// when less than one unit remains. On an interactive platform this wraps
/// the idle callback's deadline object; a non-interactive driver can
/// substitute [`FixedBudget`] (so many units per invocation) or
/// [`Unbounded`] (run the pass to completion).
pub trait IdleDeadline {
    /// Time remaining before the host wants control back, rounded to whole
    /// units.
    fn time_remaining(&self) -> u32;
}

/// A deadline that never expires.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl IdleDeadline for Unbounded {
    fn time_remaining(&self) -> u32 {
        u32::MAX
    }
}

/// A fixed per-call unit budget.
///
/// Each query reports the remaining budget and then consumes one unit,
/// modelling "one unit of work costs one time unit". A budget of `n`
/// therefore lets the work loop perform exactly `n` units before yielding.
#[derive(Debug)]
pub struct FixedBudget {
    remaining: Cell<u32>,
}

impl FixedBudget {
    /// A budget of `units` units of work.
    pub fn new(units: u32) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }
}

impl IdleDeadline for FixedBudget {
    fn time_remaining(&self) -> u32 {
        let remaining = self.remaining.get();
        if remaining > 0 {
            self.remaining.set(remaining - 1);
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_budget_counts_down() {
        let budget = FixedBudget::new(2);
        assert_eq!(budget.time_remaining(), 2);
        assert_eq!(budget.time_remaining(), 1);
        assert_eq!(budget.time_remaining(), 0);
        assert_eq!(budget.time_remaining(), 0, "budget must not underflow");
    }

    #[test]
    fn unbounded_never_expires() {
        let deadline = Unbounded;
        assert_eq!(deadline.time_remaining(), u32::MAX);
        assert_eq!(deadline.time_remaining(), u32::MAX);
    }
}

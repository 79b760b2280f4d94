// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Work-loop instrumentation.
//!
//! The engine reports coarse scheduling events through a [`TraceSink`].
//! With the `trace` cargo feature disabled (the default), [`Tracer`] is a
//! zero-sized no-op and every call site compiles away; enabling the feature
//! costs one branch per event.

use crate::commit::CommitSummary;

/// A scheduling or commit event emitted by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// A new work-in-progress root was armed (initial render, re-render, or
    /// state-triggered update).
    PassArmed,
    /// One unit of work completed.
    UnitCompleted,
    /// The work loop returned control to the host with work remaining.
    Yielded,
    /// A completed pass was committed.
    Committed(CommitSummary),
    /// An in-flight pass was discarded (superseded or aborted on error).
    PassDiscarded,
}

/// Receives [`TraceEvent`]s from the engine.
pub trait TraceSink {
    /// Handle one event.
    fn event(&mut self, event: TraceEvent);
}

/// Event dispatcher held by the engine.
#[cfg(feature = "trace")]
pub(crate) struct Tracer {
    sink: Option<alloc::boxed::Box<dyn TraceSink>>,
}

/// Event dispatcher held by the engine (no-op build).
#[cfg(not(feature = "trace"))]
pub(crate) struct Tracer;

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Tracer")
    }
}

impl Tracer {
    pub(crate) fn disabled() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self
        }
    }

    #[cfg(feature = "trace")]
    pub(crate) fn set_sink(&mut self, sink: alloc::boxed::Box<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    #[inline]
    pub(crate) fn emit(&mut self, event: TraceEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.event(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    struct Recorder(Rc<RefCell<Vec<TraceEvent>>>);

    impl TraceSink for Recorder {
        fn event(&mut self, event: TraceEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn tracer_forwards_to_sink() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::disabled();
        tracer.set_sink(Box::new(Recorder(events.clone())));
        tracer.emit(TraceEvent::PassArmed);
        tracer.emit(TraceEvent::Yielded);
        assert_eq!(
            &*events.borrow(),
            &[TraceEvent::PassArmed, TraceEvent::Yielded]
        );
    }
}

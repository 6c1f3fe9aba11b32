// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! are printed in milliseconds.

use std::io::Write;

use horizon_core::backend::BackendKind;
use horizon_core::limiter::LimitAction;
use horizon_core::state::Phase;
use horizon_core::time::{HostTime, TICKS_PER_MILLI};
use horizon_core::trace::{
    BackendSelectedEvent, EvaluationEvent, Origin, RateLimitedEvent, TeardownEvent,
    TeardownReason, TraceSink, TransitionEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub(crate) fn millis(t: HostTime) -> f64 {
    t.ticks() as f64 / TICKS_PER_MILLI as f64
}

pub(crate) fn backend_name(backend: BackendKind) -> &'static str {
    match backend {
        BackendKind::Native => "native",
        BackendKind::Fallback => "fallback",
    }
}

pub(crate) fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Visible => "visible",
        Phase::Hidden => "hidden",
    }
}

pub(crate) fn origin_name(origin: Origin) -> &'static str {
    match origin {
        Origin::Load => "load",
        Origin::Event => "event",
    }
}

pub(crate) fn reason_name(reason: TeardownReason) -> &'static str {
    match reason {
        TeardownReason::TriggerOnce => "trigger-once",
        TeardownReason::Unobserved => "unobserved",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_backend_selected(&mut self, e: &BackendSelectedEvent) {
        let _ = writeln!(
            self.writer,
            "[select] backend={} at {:.3}ms",
            backend_name(e.backend),
            millis(e.at),
        );
    }

    fn on_evaluation(&mut self, e: &EvaluationEvent) {
        let _ = writeln!(
            self.writer,
            "[eval] origin={} visible={} at {:.3}ms",
            origin_name(e.origin),
            e.visible,
            millis(e.at),
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[transition] backend={} phase={} at {:.3}ms",
            backend_name(e.backend),
            phase_name(e.phase),
            millis(e.at),
        );
    }

    fn on_rate_limited(&mut self, e: &RateLimitedEvent) {
        let _ = match e.action {
            LimitAction::Arm(due) => writeln!(
                self.writer,
                "[limit] armed until {:.3}ms at {:.3}ms",
                millis(due),
                millis(e.at),
            ),
            LimitAction::Coalesced => {
                writeln!(self.writer, "[limit] coalesced at {:.3}ms", millis(e.at))
            }
            LimitAction::Run => writeln!(self.writer, "[limit] run at {:.3}ms", millis(e.at)),
        };
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        let _ = writeln!(
            self.writer,
            "[teardown] backend={} reason={} at {:.3}ms",
            backend_name(e.backend),
            reason_name(e.reason),
            millis(e.at),
        );
    }
}

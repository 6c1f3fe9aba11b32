// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for detectors.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! backends call as they select, evaluate, transition, and tear down. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional shared sink. Detectors outlive the call that
//! created them, so the sink is reference-counted rather than borrowed. When
//! the `trace` feature is **off**, every `Tracer` method compiles to nothing
//! and the sink is dropped on construction. When **on**, each method performs
//! a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::backend::BackendKind;
use crate::limiter::LimitAction;
use crate::state::Phase;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What caused a fallback evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The check run once when the detector attaches.
    Load,
    /// A scroll or resize event.
    Event,
}

/// Why a detector stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeardownReason {
    /// The first entry under trigger-once.
    TriggerOnce,
    /// The caller unobserved through the subscription handle.
    Unobserved,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per detector call after backend selection.
#[derive(Clone, Copy, Debug)]
pub struct BackendSelectedEvent {
    /// The chosen backend.
    pub backend: BackendKind,
    /// Host time of the selection.
    pub at: HostTime,
}

/// Emitted after each fallback geometry evaluation.
#[derive(Clone, Copy, Debug)]
pub struct EvaluationEvent {
    /// What triggered the evaluation.
    pub origin: Origin,
    /// Host time of the evaluation.
    pub at: HostTime,
    /// Geometry result.
    pub visible: bool,
}

/// Emitted on every entry or exit transition.
#[derive(Clone, Copy, Debug)]
pub struct TransitionEvent {
    /// The backend that observed the transition.
    pub backend: BackendKind,
    /// The phase entered.
    pub phase: Phase,
    /// Host time of the transition.
    pub at: HostTime,
}

/// Emitted when the rate limiter deferred or folded a handler call.
#[derive(Clone, Copy, Debug)]
pub struct RateLimitedEvent {
    /// Host time of the call.
    pub at: HostTime,
    /// The limiter's decision.
    pub action: LimitAction,
}

/// Emitted when a detector tears down its subscription.
#[derive(Clone, Copy, Debug)]
pub struct TeardownEvent {
    /// The backend being torn down.
    pub backend: BackendKind,
    /// Why.
    pub reason: TeardownReason,
    /// Host time of the teardown.
    pub at: HostTime,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from detectors.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a backend has been selected.
    fn on_backend_selected(&mut self, e: &BackendSelectedEvent) {
        _ = e;
    }

    /// Called after a fallback geometry evaluation.
    fn on_evaluation(&mut self, e: &EvaluationEvent) {
        _ = e;
    }

    /// Called on every entry or exit transition.
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }

    /// Called when a handler call was deferred or coalesced.
    fn on_rate_limited(&mut self, e: &RateLimitedEvent) {
        _ = e;
    }

    /// Called when a detector tears down.
    fn on_teardown(&mut self, e: &TeardownEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Shared handle to a [`TraceSink`].
pub type SharedSink = Rc<RefCell<dyn TraceSink>>;

/// Thin wrapper around an optional shared [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Clone, Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<SharedSink>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $event:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(sink) = &$self.sink {
            sink.borrow_mut().$method($event);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (&$self, $event);
        }
    }};
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: SharedSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Emits a [`BackendSelectedEvent`].
    #[inline]
    pub fn backend_selected(&self, e: &BackendSelectedEvent) {
        dispatch!(self, on_backend_selected, e);
    }

    /// Emits an [`EvaluationEvent`].
    #[inline]
    pub fn evaluation(&self, e: &EvaluationEvent) {
        dispatch!(self, on_evaluation, e);
    }

    /// Emits a [`TransitionEvent`].
    #[inline]
    pub fn transition(&self, e: &TransitionEvent) {
        dispatch!(self, on_transition, e);
    }

    /// Emits a [`RateLimitedEvent`].
    #[inline]
    pub fn rate_limited(&self, e: &RateLimitedEvent) {
        dispatch!(self, on_rate_limited, e);
    }

    /// Emits a [`TeardownEvent`].
    #[inline]
    pub fn teardown(&self, e: &TeardownEvent) {
        dispatch!(self, on_teardown, e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Decoding stops at the first truncated or unknown record.

use std::cell::RefCell;
use std::rc::Rc;

use horizon_core::backend::BackendKind;
use horizon_core::limiter::LimitAction;
use horizon_core::state::Phase;
use horizon_core::time::HostTime;
use horizon_core::trace::{
    BackendSelectedEvent, EvaluationEvent, Origin, RateLimitedEvent, TeardownEvent,
    TeardownReason, TraceSink, Tracer, TransitionEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_BACKEND_SELECTED: u8 = 1;
const TAG_EVALUATION: u8 = 2;
const TAG_TRANSITION: u8 = 3;
const TAG_RATE_LIMITED: u8 = 4;
const TAG_TEARDOWN: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty recorder together with a [`Tracer`] feeding it.
    ///
    /// The tracer goes into a detector configuration; the recorder stays
    /// with the caller for inspection.
    #[must_use]
    pub fn shared() -> (Rc<RefCell<Self>>, Tracer) {
        let recorder = Rc::new(RefCell::new(Self::new()));
        let tracer = Tracer::new(recorder.clone());
        (recorder, tracer)
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_header(&mut self, tag: u8, at: HostTime) {
        self.write_u8(tag);
        self.write_u64(at.ticks());
    }

    fn write_backend(&mut self, b: BackendKind) {
        self.write_u8(match b {
            BackendKind::Native => 0,
            BackendKind::Fallback => 1,
        });
    }

    fn write_phase(&mut self, p: Phase) {
        self.write_u8(match p {
            Phase::Hidden => 0,
            Phase::Visible => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_backend_selected(&mut self, e: &BackendSelectedEvent) {
        self.write_header(TAG_BACKEND_SELECTED, e.at);
        self.write_backend(e.backend);
    }

    fn on_evaluation(&mut self, e: &EvaluationEvent) {
        self.write_header(TAG_EVALUATION, e.at);
        self.write_u8(match e.origin {
            Origin::Load => 0,
            Origin::Event => 1,
        });
        self.write_u8(u8::from(e.visible));
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.write_header(TAG_TRANSITION, e.at);
        self.write_backend(e.backend);
        self.write_phase(e.phase);
    }

    fn on_rate_limited(&mut self, e: &RateLimitedEvent) {
        self.write_header(TAG_RATE_LIMITED, e.at);
        let (kind, due) = match e.action {
            LimitAction::Run => (0, 0),
            LimitAction::Arm(due) => (1, due.ticks()),
            LimitAction::Coalesced => (2, 0),
        };
        self.write_u8(kind);
        self.write_u64(due);
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.write_header(TAG_TEARDOWN, e.at);
        self.write_backend(e.backend);
        self.write_u8(match e.reason {
            TeardownReason::TriggerOnce => 0,
            TeardownReason::Unobserved => 1,
        });
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`BackendSelectedEvent`].
    BackendSelected(BackendSelectedEvent),
    /// An [`EvaluationEvent`].
    Evaluation(EvaluationEvent),
    /// A [`TransitionEvent`].
    Transition(TransitionEvent),
    /// A [`RateLimitedEvent`].
    RateLimited(RateLimitedEvent),
    /// A [`TeardownEvent`].
    Teardown(TeardownEvent),
}

impl RecordedEvent {
    /// Host time the event was recorded at.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::BackendSelected(e) => e.at,
            Self::Evaluation(e) => e.at,
            Self::Transition(e) => e.at,
            Self::RateLimited(e) => e.at,
            Self::Teardown(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_backend(&mut self) -> Option<BackendKind> {
        match self.read_u8()? {
            0 => Some(BackendKind::Native),
            1 => Some(BackendKind::Fallback),
            _ => None,
        }
    }

    fn read_phase(&mut self) -> Option<Phase> {
        match self.read_u8()? {
            0 => Some(Phase::Hidden),
            1 => Some(Phase::Visible),
            _ => None,
        }
    }

    fn decode_backend_selected(&mut self, at: HostTime) -> Option<RecordedEvent> {
        Some(RecordedEvent::BackendSelected(BackendSelectedEvent {
            backend: self.read_backend()?,
            at,
        }))
    }

    fn decode_evaluation(&mut self, at: HostTime) -> Option<RecordedEvent> {
        let origin = match self.read_u8()? {
            0 => Origin::Load,
            1 => Origin::Event,
            _ => return None,
        };
        Some(RecordedEvent::Evaluation(EvaluationEvent {
            origin,
            at,
            visible: self.read_u8()? != 0,
        }))
    }

    fn decode_transition(&mut self, at: HostTime) -> Option<RecordedEvent> {
        Some(RecordedEvent::Transition(TransitionEvent {
            backend: self.read_backend()?,
            phase: self.read_phase()?,
            at,
        }))
    }

    fn decode_rate_limited(&mut self, at: HostTime) -> Option<RecordedEvent> {
        let kind = self.read_u8()?;
        let due = HostTime(self.read_u64()?);
        let action = match kind {
            0 => LimitAction::Run,
            1 => LimitAction::Arm(due),
            2 => LimitAction::Coalesced,
            _ => return None,
        };
        Some(RecordedEvent::RateLimited(RateLimitedEvent { at, action }))
    }

    fn decode_teardown(&mut self, at: HostTime) -> Option<RecordedEvent> {
        let backend = self.read_backend()?;
        let reason = match self.read_u8()? {
            0 => TeardownReason::TriggerOnce,
            1 => TeardownReason::Unobserved,
            _ => return None,
        };
        Some(RecordedEvent::Teardown(TeardownEvent {
            backend,
            reason,
            at,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at = HostTime(self.read_u64()?);
        let event = match tag {
            TAG_BACKEND_SELECTED => self.decode_backend_selected(at),
            TAG_EVALUATION => self.decode_evaluation(at),
            TAG_TRANSITION => self.decode_transition(at),
            TAG_RATE_LIMITED => self.decode_rate_limited(at),
            TAG_TEARDOWN => self.decode_teardown(at),
            _ => None,
        };
        if event.is_none() {
            // Unknown or truncated: stop for good.
            self.pos = self.data.len();
        }
        event
    }
}

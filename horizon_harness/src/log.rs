// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback recording.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use horizon_core::config::{DetectorConfig, VisibilityChange};
use horizon_core::state::Phase;

/// One recorded callback invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recorded {
    /// The phase reported.
    pub phase: Phase,
    /// A native entry was attached.
    pub had_raw: bool,
}

/// Shared record of every entry and exit callback a detector made.
#[derive(Clone, Debug, Default)]
pub struct TransitionLog {
    events: Rc<RefCell<Vec<Recorded>>>,
}

impl TransitionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs recording `on_entry` and `on_exit` callbacks on `config`.
    #[must_use]
    pub fn attach<E, R: 'static>(&self, config: DetectorConfig<E, R>) -> DetectorConfig<E, R> {
        config.on_entry(self.recorder()).on_exit(self.recorder())
    }

    /// Returns a callback that appends to this log.
    pub fn recorder<R: 'static>(&self) -> impl FnMut(&VisibilityChange<'_, R>) + 'static {
        let events = Rc::clone(&self.events);
        move |change: &VisibilityChange<'_, R>| {
            events.borrow_mut().push(Recorded {
                phase: change.phase,
                had_raw: change.raw.is_some(),
            });
        }
    }

    /// Every recorded invocation in order.
    #[must_use]
    pub fn events(&self) -> Vec<Recorded> {
        self.events.borrow().clone()
    }

    /// Recorded phases in order.
    #[must_use]
    pub fn phases(&self) -> Vec<Phase> {
        self.events.borrow().iter().map(|e| e.phase).collect()
    }

    /// Number of entry callbacks.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.count(Phase::Visible)
    }

    /// Number of exit callbacks.
    #[must_use]
    pub fn exits(&self) -> usize {
        self.count(Phase::Hidden)
    }

    /// Total callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// No callbacks yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    fn count(&self, phase: Phase) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.phase == phase)
            .count()
    }
}

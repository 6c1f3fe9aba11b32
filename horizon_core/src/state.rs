// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entry/exit state machine shared by every backend.
//!
//! Backends only differ in where the "is the target intersecting right now?"
//! boolean comes from. Feeding that boolean through [`VisibilityState::observe`]
//! yields a [`Signal`] only when the phase actually changes:
//!
//! | current   | observed | next      | signal  |
//! |-----------|----------|-----------|---------|
//! | `Hidden`  | `true`   | `Visible` | `Entry` |
//! | `Visible` | `true`   | `Visible` | none    |
//! | `Visible` | `false`  | `Hidden`  | `Exit`  |
//! | `Hidden`  | `false`  | `Hidden`  | none    |

/// Whether the target is currently considered visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not intersecting the root. The initial phase.
    #[default]
    Hidden,
    /// Intersecting the root.
    Visible,
}

/// A phase change worth telling the caller about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `Hidden -> Visible`.
    Entry,
    /// `Visible -> Hidden`.
    Exit,
}

impl Signal {
    /// The phase this signal transitions into.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Entry => Phase::Visible,
            Self::Exit => Phase::Hidden,
        }
    }
}

/// Pure transition function.
///
/// Returns the next phase and the signal to emit, if any.
#[must_use]
pub const fn step(current: Phase, intersecting: bool) -> (Phase, Option<Signal>) {
    match (current, intersecting) {
        (Phase::Hidden, true) => (Phase::Visible, Some(Signal::Entry)),
        (Phase::Visible, true) => (Phase::Visible, None),
        (Phase::Visible, false) => (Phase::Hidden, Some(Signal::Exit)),
        (Phase::Hidden, false) => (Phase::Hidden, None),
    }
}

/// Per-detector visibility state.
///
/// Owned by exactly one detector. Once [`seal`](Self::seal)ed (after a
/// trigger-once entry), every further observation is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilityState {
    phase: Phase,
    sealed: bool,
}

impl VisibilityState {
    /// Creates a state in the [`Phase::Hidden`] phase.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Hidden,
            sealed: false,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` once the state has been sealed.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Feeds one intersection observation into the machine.
    ///
    /// Returns the signal to emit, or `None` when the phase did not change or
    /// the state is sealed.
    pub fn observe(&mut self, intersecting: bool) -> Option<Signal> {
        if self.sealed {
            return None;
        }
        let (next, signal) = step(self.phase, intersecting);
        self.phase = next;
        signal
    }

    /// Permanently stops the machine from emitting further signals.
    pub fn seal(&mut self) {
        self.sealed = true;
    }
}

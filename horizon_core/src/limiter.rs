// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounce and throttle as a clock-driven state machine.
//!
//! [`RateLimiter`] never touches a timer itself. Each [`call`](RateLimiter::call)
//! returns a [`LimitAction`] telling the owner whether to run the handler now,
//! arm a one-shot timer, or do nothing because a timer is already armed. When
//! an armed timer elapses the owner calls [`fire`](RateLimiter::fire), which
//! either runs the handler, asks for the timer to be re-armed, or goes idle.
//!
//! The limiter carries no arguments: owners that need "latest call wins"
//! semantics store the latest arguments themselves and read them when the
//! handler runs.

use crate::time::{Duration, HostTime};

/// Rate-limiting policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateLimit {
    /// Run once input has been quiet for `wait`.
    Debounce {
        /// Quiet period before the handler runs.
        wait: Duration,
    },
    /// Run at most once per `interval`.
    Throttle {
        /// Minimum spacing between runs.
        interval: Duration,
        /// Run the first call of a burst immediately.
        leading: bool,
    },
}

/// What the owner must do after a [`RateLimiter::call`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LimitAction {
    /// Run the handler now.
    Run,
    /// Arm a one-shot timer that calls [`RateLimiter::fire`] at the given
    /// time.
    Arm(HostTime),
    /// Folded into the already-armed timer.
    Coalesced,
}

/// What the owner must do after a [`RateLimiter::fire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireAction {
    /// Run the handler now.
    Run,
    /// Re-arm the timer for the given time; the deadline moved.
    Rearm(HostTime),
    /// Nothing is pending.
    Idle,
}

/// Debounce/throttle state for one rate-limited handler.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    policy: RateLimit,
    /// A timer is outstanding.
    armed: bool,
    /// A call is waiting for its trailing run.
    pending: bool,
    /// Debounce: when the trailing run is due. Throttle: when the current
    /// window closes.
    deadline: Option<HostTime>,
}

impl RateLimiter {
    /// Creates an idle limiter.
    #[must_use]
    pub const fn new(policy: RateLimit) -> Self {
        Self {
            policy,
            armed: false,
            pending: false,
            deadline: None,
        }
    }

    /// Returns `true` if a run is waiting on a timer.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Registers a call at `now`.
    pub fn call(&mut self, now: HostTime) -> LimitAction {
        match self.policy {
            RateLimit::Debounce { wait } => {
                let due = now + wait;
                self.deadline = Some(due);
                self.pending = true;
                self.arm(due)
            }
            RateLimit::Throttle { interval, leading } => {
                let window_open = self.deadline.is_some_and(|end| now < end);
                if window_open {
                    self.pending = true;
                    return match self.deadline {
                        Some(end) => self.arm(end),
                        None => LimitAction::Coalesced,
                    };
                }
                let end = now + interval;
                self.deadline = Some(end);
                if leading {
                    LimitAction::Run
                } else {
                    self.pending = true;
                    self.arm(end)
                }
            }
        }
    }

    /// Handles the armed timer elapsing at `now`.
    pub fn fire(&mut self, now: HostTime) -> FireAction {
        self.armed = false;
        if !self.pending {
            return FireAction::Idle;
        }
        let Some(due) = self.deadline else {
            self.pending = false;
            return FireAction::Run;
        };
        if now < due {
            self.armed = true;
            return FireAction::Rearm(due);
        }
        self.pending = false;
        if let RateLimit::Throttle { interval, .. } = self.policy {
            // A trailing run opens a fresh window.
            self.deadline = Some(now + interval);
        }
        FireAction::Run
    }

    fn arm(&mut self, at: HostTime) -> LimitAction {
        if self.armed {
            LimitAction::Coalesced
        } else {
            self.armed = true;
            LimitAction::Arm(at)
        }
    }
}

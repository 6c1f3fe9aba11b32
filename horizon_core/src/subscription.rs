// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle to a running detector.

use alloc::rc::Rc;
use core::fmt;

use crate::backend::BackendKind;
use crate::trace::TeardownReason;

/// Implemented by each backend's shared state.
pub(crate) trait Teardown {
    /// Removes every listener or observer registration at once. Idempotent.
    fn teardown(&self, reason: TeardownReason);

    /// Returns `true` while the detector can still report transitions.
    fn is_active(&self) -> bool;
}

/// Handle to a running detector.
///
/// Dropping the handle does **not** stop the detector; observation continues
/// until [`unobserve`](Self::unobserve) is called or a trigger-once entry
/// tears it down. Teardown removes the whole subscription (both viewport
/// listeners, or the observer registration) in one step.
///
/// Evaluations already scheduled when teardown happens still run, but they
/// can no longer invoke the caller's callbacks.
#[must_use = "dropping a Subscription leaves the detector running"]
pub struct Subscription {
    backend: BackendKind,
    handle: Rc<dyn Teardown>,
}

impl Subscription {
    pub(crate) fn new(backend: BackendKind, handle: Rc<dyn Teardown>) -> Self {
        Self { backend, handle }
    }

    /// Which backend the detector runs on.
    #[must_use]
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Returns `true` while the detector can still report transitions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Stops the detector. Calling this more than once is harmless.
    pub fn unobserve(&self) {
        self.handle.teardown(TeardownReason::Unobserved);
    }

    /// Stops the detector and consumes the handle.
    pub fn dispose(self) {
        self.unobserve();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("backend", &self.backend)
            .field("active", &self.is_active())
            .finish()
    }
}

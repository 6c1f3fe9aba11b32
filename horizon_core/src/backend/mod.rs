// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility backends.
//!
//! Two backends drive the same [`VisibilityState`] machine:
//!
//! - [`NativeBackend`] adapts a host's native intersection observer. The
//!   boolean input is each entry's `is_intersecting`.
//! - [`FallbackBackend`] listens for viewport scroll/resize, rate-limits the
//!   handler, defers to paint, and runs a [`GeometryMode`] test.
//!
//! Exactly one backend is chosen per detector call by
//! [`BackendKind::select`]; the other is never instantiated.
//!
//! [`VisibilityState`]: crate::state::VisibilityState
//! [`GeometryMode`]: crate::geometry::GeometryMode

mod fallback;
mod native;

pub use fallback::FallbackBackend;
pub use native::NativeBackend;

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::capability::{Capabilities, native_available};
use crate::config::{BackendPreference, Callback, DetectorConfig, VisibilityChange};
use crate::error::ObserveError;
use crate::host::Host;
use crate::state::Signal;
use crate::subscription::Subscription;

/// Which backend a detector runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Native intersection observer.
    Native,
    /// Event-driven geometry polling.
    Fallback,
}

impl BackendKind {
    /// Picks a backend from the caller's preference and the host's
    /// capabilities.
    #[must_use]
    pub fn select(preference: BackendPreference, capabilities: Capabilities) -> Self {
        match preference {
            BackendPreference::ForceFallback => Self::Fallback,
            BackendPreference::Auto if native_available(capabilities) => Self::Native,
            BackendPreference::Auto => Self::Fallback,
        }
    }
}

/// A strategy for turning a [`DetectorConfig`] into a live [`Subscription`].
///
/// `R` is the entry descriptor handed to the caller's callbacks.
pub trait VisibilityBackend<H: Host, R> {
    /// Starts observing `config.target`.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError`] if the host has no document or rejects the
    /// configuration.
    fn attach(
        &self,
        host: &Rc<H>,
        config: DetectorConfig<H::Element, R>,
    ) -> Result<Subscription, ObserveError>;
}

/// The caller's entry/exit callbacks.
///
/// Each callback sits in its own cell so a callback may tear down the
/// detector without conflicting borrows.
pub(crate) struct Callbacks<R> {
    on_entry: RefCell<Option<Callback<R>>>,
    on_exit: RefCell<Option<Callback<R>>>,
}

impl<R> Callbacks<R> {
    pub(crate) fn new(on_entry: Option<Callback<R>>, on_exit: Option<Callback<R>>) -> Self {
        Self {
            on_entry: RefCell::new(on_entry),
            on_exit: RefCell::new(on_exit),
        }
    }

    /// Invokes the callback matching `signal`, if the caller supplied one.
    ///
    /// Panics inside the callback propagate to the caller.
    pub(crate) fn emit(&self, signal: Signal, raw: Option<&R>) {
        let slot = match signal {
            Signal::Entry => &self.on_entry,
            Signal::Exit => &self.on_exit,
        };
        if let Some(callback) = slot.borrow_mut().as_mut() {
            callback(&VisibilityChange {
                phase: signal.phase(),
                raw,
            });
        }
    }
}

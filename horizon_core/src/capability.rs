// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native intersection-observer capability probing.
//!
//! The native backend needs three independent host facilities: the observer
//! constructor, the entry descriptor type, and the `intersectionRatio`
//! accessor on that descriptor. Hosts report which ones they have through
//! [`Capabilities`]; the native path is usable only when all three are
//! present, since partial support fails on first use.
//!
//! Probing happens on every detector call. The one exception is a
//! process-wide polyfill: once [`install_polyfill`] has succeeded, the
//! native path is assumed usable for the rest of the process.

use core::sync::atomic::{AtomicU8, Ordering};

/// Which native observation facilities the host exposes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// The observer constructor exists.
    pub observer: bool,
    /// The entry descriptor type exists.
    pub entry: bool,
    /// The entry descriptor exposes an intersection ratio.
    pub intersection_ratio: bool,
}

impl Capabilities {
    /// All three facilities present.
    pub const FULL: Self = Self {
        observer: true,
        entry: true,
        intersection_ratio: true,
    };

    /// No facilities present.
    pub const NONE: Self = Self {
        observer: false,
        entry: false,
        intersection_ratio: false,
    };

    /// Returns `true` only if every facility is present.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        self.observer && self.entry && self.intersection_ratio
    }
}

const POLYFILL_ABSENT: u8 = 0;
const POLYFILL_INSTALLING: u8 = 1;
const POLYFILL_INSTALLED: u8 = 2;

/// Process-wide polyfill state. Written at most once to `POLYFILL_INSTALLED`.
static POLYFILL: AtomicU8 = AtomicU8::new(POLYFILL_ABSENT);

/// Returns `true` once a polyfill has been installed in this process.
#[must_use]
pub fn polyfill_installed() -> bool {
    POLYFILL.load(Ordering::Acquire) == POLYFILL_INSTALLED
}

/// Runs `install` at most once per process.
///
/// `install` returns whether the polyfill actually took effect. A failed
/// attempt leaves the guard open so a later call may retry; a successful one
/// closes it for good. Returns `true` if a polyfill is installed when this
/// call returns.
pub fn install_polyfill(install: impl FnOnce() -> bool) -> bool {
    if POLYFILL
        .compare_exchange(
            POLYFILL_ABSENT,
            POLYFILL_INSTALLING,
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_err()
    {
        return polyfill_installed();
    }
    let installed = install();
    POLYFILL.store(
        if installed {
            POLYFILL_INSTALLED
        } else {
            POLYFILL_ABSENT
        },
        Ordering::Release,
    );
    installed
}

/// Decides whether the native backend can be used with the given host
/// capabilities.
#[must_use]
pub fn native_available(capabilities: Capabilities) -> bool {
    polyfill_installed() || capabilities.is_complete()
}

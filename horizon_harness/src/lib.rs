// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic simulated host for exercising horizon detectors.
//!
//! [`SimulatedHost`] implements every `horizon_core` host trait over an
//! in-memory document:
//!
//! - a manual clock; timers run only when the test calls
//!   [`advance`](SimulatedHost::advance) or [`settle`](SimulatedHost::settle)
//! - an animation-frame queue drained by
//!   [`run_frame`](SimulatedHost::run_frame)
//! - element rectangles, client sizes, and an inclusive hit test that can be
//!   occluded per element or replaced outright
//! - a scroll/resize listener registry driven by
//!   [`dispatch`](SimulatedHost::dispatch)
//! - a scripted native observer that records every `observe`, `unobserve`,
//!   and `disconnect` call and delivers entries on demand
//!
//! [`TransitionLog`] records what a detector's callbacks saw.

#![no_std]

extern crate alloc;

mod host;
mod log;
mod observer;

pub use host::{ElementId, SimListener, SimulatedHost};
pub use log::{Recorded, TransitionLog};
pub use observer::{ObserverRecord, SimEntry, SimObserver, margin_is_valid};

/// Detector configuration for the simulated host.
pub type SimConfig = horizon_core::config::DetectorConfig<ElementId, SimEntry>;

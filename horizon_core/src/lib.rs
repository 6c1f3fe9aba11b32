// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element visibility detection with a native fast path and a geometric
//! fallback.
//!
//! `horizon_core` decides whether a target element is visible inside a
//! scrolling root and reports entry/exit transitions to the caller. It is
//! `no_std` compatible (with `alloc`) and talks to the platform only through
//! the traits in [`host`].
//!
//! # Architecture
//!
//! ```text
//!   observe_visibility(host, config)
//!       │
//!       ├── config::resolve()         defaults {root: None, "35%", 0.0}
//!       ├── BackendKind::select()     capability probe (per call)
//!       ▼
//!   NativeBackend                     FallbackBackend
//!     observer entries                  scroll/resize ─► RateLimiter
//!       │                                                  │
//!       │                               defer_to_paint ◄───┘
//!       │                                  │
//!       │                               GeometryMode::is_visible
//!       ▼                                  ▼
//!   VisibilityState::observe() ──► on_entry / on_exit
//! ```
//!
//! **[`state`]**: The two-phase entry/exit machine shared by both backends.
//!
//! **[`config`]**: Option resolution, fallback strategy pairings, and the
//! [`DetectorConfig`](config::DetectorConfig) builder.
//!
//! **[`capability`]**: Native capability probing and the process-wide
//! polyfill guard.
//!
//! **[`geometry`]**: Bounding-overlap, corner-sampling, and area-fraction
//! visibility tests.
//!
//! **[`limiter`]**: Clock-driven debounce and leading-edge throttle.
//!
//! **[`deferral`]**: Double animation-frame deferral with a timer fallback.
//!
//! **[`backend`]**: The native and fallback backends.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! detector instrumentation.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod capability;
pub mod config;
pub mod deferral;
mod detector;
pub mod error;
pub mod geometry;
pub mod host;
pub mod limiter;
pub mod state;
mod subscription;
pub mod time;
pub mod trace;

pub use detector::observe_visibility;
pub use subscription::Subscription;

// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detector configuration.
//!
//! [`ObserverOptions`] is the caller's partial override of the intersection
//! settings; [`resolve`] merges it over the defaults to produce an
//! [`IntersectionConfig`]. Values are never validated here: a malformed
//! `root_margin` or a negative `threshold` is handed to the backend as-is.
//!
//! [`DetectorConfig`] bundles the target, the callbacks, and the policy knobs
//! for one detector call.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use crate::geometry::GeometryMode;
use crate::limiter::RateLimit;
use crate::state::Phase;
use crate::time::Duration;
use crate::trace::Tracer;

/// Default `rootMargin` handed to the native observer.
pub const DEFAULT_ROOT_MARGIN: &str = "35%";

/// Default intersection threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Interval the fallback backend's rate limiter is bounded to.
pub const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(16);

/// Partial override of the intersection settings.
///
/// Any field left as `None` takes its default during [`resolve`].
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions<E> {
    /// Containing element. `None` means the document's root element.
    pub root: Option<E>,
    /// CSS-margin-like string growing or shrinking the root's bounds.
    pub root_margin: Option<String>,
    /// Fraction of the target's area that must be visible.
    pub threshold: Option<f64>,
}

impl<E> Default for ObserverOptions<E> {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: None,
            threshold: None,
        }
    }
}

impl<E> ObserverOptions<E> {
    /// Sets the containing element.
    #[must_use]
    pub fn root(mut self, root: E) -> Self {
        self.root = Some(root);
        self
    }

    /// Sets the root margin.
    #[must_use]
    pub fn root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = Some(margin.into());
        self
    }

    /// Sets the threshold.
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Fully resolved intersection settings.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionConfig<E> {
    /// Containing element; `None` resolves to the document's root element.
    pub root: Option<E>,
    /// Root margin, passed through verbatim to the native observer.
    ///
    /// The fallback geometry never applies it.
    pub root_margin: String,
    /// Fraction of the target's area that must be visible.
    pub threshold: f64,
}

impl<E> Default for IntersectionConfig<E> {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: String::from(DEFAULT_ROOT_MARGIN),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Merges `options` over the defaults.
#[must_use]
pub fn resolve<E>(options: ObserverOptions<E>) -> IntersectionConfig<E> {
    let defaults = IntersectionConfig::default();
    IntersectionConfig {
        root: options.root.or(defaults.root),
        root_margin: options.root_margin.unwrap_or(defaults.root_margin),
        threshold: options.threshold.unwrap_or(defaults.threshold),
    }
}

/// The geometry test and rate limiter the fallback backend runs with.
///
/// Each geometry algorithm comes paired with the limiter suited to its cost;
/// the pairings are fixed and cannot be mixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FallbackStrategy {
    /// Occlusion-aware corner hit-testing, debounced.
    ///
    /// Several hit-tests per evaluation, so evaluations wait for input to
    /// quiesce.
    CornerSampling,
    /// Coarse bounding-rectangle overlap, throttled with a leading edge.
    ///
    /// Cheap enough to run on the first event of a burst for the lowest
    /// first-detection latency.
    BoundingOverlap,
    /// Threshold-aware area-fraction test, debounced.
    #[default]
    AreaFraction,
}

impl FallbackStrategy {
    /// Returns the geometry test for this strategy.
    #[must_use]
    pub const fn geometry(self) -> GeometryMode {
        match self {
            Self::CornerSampling => GeometryMode::CornerSampling,
            Self::BoundingOverlap => GeometryMode::BoundingOverlap,
            Self::AreaFraction => GeometryMode::AreaFraction,
        }
    }

    /// Returns the rate limiter paired with this strategy.
    #[must_use]
    pub const fn rate_limit(self) -> RateLimit {
        match self {
            Self::CornerSampling | Self::AreaFraction => RateLimit::Debounce {
                wait: RATE_LIMIT_INTERVAL,
            },
            Self::BoundingOverlap => RateLimit::Throttle {
                interval: RATE_LIMIT_INTERVAL,
                leading: true,
            },
        }
    }
}

/// Which backend the detector may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendPreference {
    /// Probe for the native capability and fall back when it is missing.
    #[default]
    Auto,
    /// Always use the fallback backend.
    ForceFallback,
}

/// Describes a phase change handed to the caller's callbacks.
///
/// `raw` carries the native entry descriptor when the native backend produced
/// the change; the fallback backend has nothing to attach.
#[derive(Debug)]
pub struct VisibilityChange<'a, R> {
    /// The phase the target has just entered.
    pub phase: Phase,
    /// The native entry that caused the change, if any.
    pub raw: Option<&'a R>,
}

/// A caller-supplied entry or exit callback.
pub type Callback<R> = Box<dyn FnMut(&VisibilityChange<'_, R>)>;

/// Everything one detector call needs.
///
/// `E` is the host's element handle, `R` its native entry descriptor.
pub struct DetectorConfig<E, R> {
    /// The element to observe.
    pub target: E,
    /// Partial intersection settings, resolved with [`resolve`].
    pub options: ObserverOptions<E>,
    /// Stop permanently after the first entry.
    pub trigger_once: bool,
    /// Called on every `Hidden -> Visible` transition.
    pub on_entry: Option<Callback<R>>,
    /// Called on every `Visible -> Hidden` transition.
    pub on_exit: Option<Callback<R>>,
    /// Geometry and rate limiting for the fallback backend.
    pub fallback: FallbackStrategy,
    /// Backend selection policy.
    pub backend: BackendPreference,
    /// Diagnostics.
    pub tracer: Tracer,
}

impl<E: fmt::Debug, R> fmt::Debug for DetectorConfig<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("target", &self.target)
            .field("options", &self.options)
            .field("trigger_once", &self.trigger_once)
            .field("on_entry", &self.on_entry.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("fallback", &self.fallback)
            .field("backend", &self.backend)
            .field("tracer", &self.tracer)
            .finish()
    }
}

impl<E, R> DetectorConfig<E, R> {
    /// Creates a configuration observing `target` with default settings and
    /// no callbacks.
    #[must_use]
    pub fn new(target: E) -> Self {
        Self {
            target,
            options: ObserverOptions::default(),
            trigger_once: false,
            on_entry: None,
            on_exit: None,
            fallback: FallbackStrategy::default(),
            backend: BackendPreference::default(),
            tracer: Tracer::none(),
        }
    }

    /// Sets the partial intersection settings.
    #[must_use]
    pub fn options(mut self, options: ObserverOptions<E>) -> Self {
        self.options = options;
        self
    }

    /// Sets whether the detector stops after the first entry.
    #[must_use]
    pub fn trigger_once(mut self, trigger_once: bool) -> Self {
        self.trigger_once = trigger_once;
        self
    }

    /// Sets the entry callback.
    #[must_use]
    pub fn on_entry(mut self, callback: impl FnMut(&VisibilityChange<'_, R>) + 'static) -> Self {
        self.on_entry = Some(Box::new(callback));
        self
    }

    /// Sets the exit callback.
    #[must_use]
    pub fn on_exit(mut self, callback: impl FnMut(&VisibilityChange<'_, R>) + 'static) -> Self {
        self.on_exit = Some(Box::new(callback));
        self
    }

    /// Sets the fallback strategy.
    #[must_use]
    pub fn fallback(mut self, strategy: FallbackStrategy) -> Self {
        self.fallback = strategy;
        self
    }

    /// Sets the backend selection policy.
    #[must_use]
    pub fn backend(mut self, preference: BackendPreference) -> Self {
        self.backend = preference;
        self
    }

    /// Sets the tracer.
    #[must_use]
    pub fn tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }
}

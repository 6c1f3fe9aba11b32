// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! Horizon splits platform-specific work into host implementations. Each
//! host provides:
//!
//! - **Timing** ([`Host`]): a monotonic clock, an optional animation-frame
//!   facility, and one-shot timers.
//! - **Viewport** ([`ViewportHost`]): element measurement, hit-testing, and
//!   scroll/resize listener registration for the fallback backend.
//! - **Native observation** ([`NativeHost`]): capability reporting and
//!   construction of a native intersection observer.
//!
//! Hosts are single-threaded and shared through `Rc`. Every callback handed to
//! a host runs later on the same thread, never re-entrantly from inside the
//! registering call unless the host documents otherwise (test hosts may run
//! native observer callbacks synchronously).
//!
//! # Crate boundaries
//!
//! `horizon_core` owns the state machine, geometry, rate limiting, and the
//! backends written against these traits. Platform crates such as
//! `horizon_backend_web` implement the traits; `horizon_harness` implements
//! them over a simulated document for tests.

use alloc::boxed::Box;
use alloc::rc::Rc;

use kurbo::{Point, Rect, Size};

use crate::capability::Capabilities;
use crate::config::IntersectionConfig;
use crate::error::ObserveError;
use crate::time::{Duration, HostTime};

/// Timing facilities every host provides.
pub trait Host: 'static {
    /// Opaque element handle.
    type Element: Clone + 'static;

    /// Current monotonic time.
    fn now(&self) -> HostTime;

    /// Returns `true` if [`request_animation_frame`](Self::request_animation_frame)
    /// is backed by a real paint-synchronized facility.
    fn animation_frame_available(&self) -> bool;

    /// Runs `callback` once, before the next paint.
    ///
    /// Only called when [`animation_frame_available`](Self::animation_frame_available)
    /// returned `true`.
    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>);

    /// Runs `callback` once, after `delay`.
    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration);
}

/// Global viewport events the fallback backend listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    /// The viewport scrolled.
    Scroll,
    /// The viewport resized.
    Resize,
}

impl ViewportEvent {
    /// DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }
}

/// Measurement and event facilities for the fallback backend.
pub trait ViewportHost: Host {
    /// Registration token returned by [`add_listener`](Self::add_listener).
    type Listener: 'static;

    /// The document's root element, or `None` when there is no document.
    fn document_element(&self) -> Option<Self::Element>;

    /// Returns `true` if `element` is part of the live document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    /// Bounding client rectangle of `element`.
    ///
    /// Detached elements report whatever the platform reports (typically an
    /// all-zero rectangle); this must not fail.
    fn bounding_client_rect(&self, element: &Self::Element) -> Rect;

    /// Client width and height of `element`.
    fn client_size(&self, element: &Self::Element) -> Size;

    /// Returns `true` if the topmost element at `point` (client coordinates)
    /// is `within` or one of its descendants.
    fn hit_test(&self, point: Point, within: &Self::Element) -> bool;

    /// Registers `handler` for `event` on the global viewport.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError::ListenerRejected`] if the platform refuses the
    /// registration.
    fn add_listener(
        &self,
        event: ViewportEvent,
        handler: Rc<dyn Fn()>,
    ) -> Result<Self::Listener, ObserveError>;

    /// Removes a listener registered with [`add_listener`](Self::add_listener).
    fn remove_listener(&self, listener: Self::Listener);
}

/// One native intersection observation.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeEntry<R> {
    /// The target intersects the (margin-adjusted) root.
    pub is_intersecting: bool,
    /// Fraction of the target currently visible.
    pub intersection_ratio: f64,
    /// The platform's own entry descriptor.
    pub raw: R,
}

/// Control surface of a native observer.
pub trait ObserverControl<E> {
    /// Starts notifications for `target`.
    fn observe(&self, target: &E);

    /// Permanently stops notifications for `target`.
    fn unobserve(&self, target: &E);

    /// Stops all notifications.
    fn disconnect(&self);
}

/// Callback a native observer invokes with each batch of entries.
pub type NativeCallback<E, R> = Box<dyn FnMut(&[NativeEntry<R>], &dyn ObserverControl<E>)>;

/// Native intersection observation.
pub trait NativeHost: Host {
    /// The platform's entry descriptor.
    type Entry: 'static;

    /// A live observer.
    type Observer: ObserverControl<Self::Element> + 'static;

    /// Reports which native facilities exist right now.
    fn capabilities(&self) -> Capabilities;

    /// Constructs an observer with `config`.
    ///
    /// The observer does not watch anything until `observe` is called on it.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError::ObserverRejected`] if the platform refuses the
    /// configuration.
    fn create_observer(
        &self,
        config: &IntersectionConfig<Self::Element>,
        callback: NativeCallback<Self::Element, Self::Entry>,
    ) -> Result<Self::Observer, ObserveError>;
}

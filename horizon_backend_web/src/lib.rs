// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for horizon.
//!
//! This crate implements the `horizon_core` host traits on browser APIs:
//!
//! - [`WebHost`]: `performance.now()` clock, `requestAnimationFrame` (with
//!   vendor-prefixed lookup) and `setTimeout`, `getBoundingClientRect` /
//!   `elementFromPoint` geometry, window `scroll`/`resize` listeners, and
//!   `IntersectionObserver`.
//! - [`observe_visibility`]: the detector entry point bound to the current
//!   window.

#![no_std]
// This crate only does useful work in the browser; suppress dead-code
// warnings when cargo-checking on a native host target.
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod frame;
mod observer;
mod viewport;

pub use horizon_core::capability::install_polyfill;
pub use horizon_core::Subscription;
pub use observer::WebObserver;
pub use viewport::WebListener;

use alloc::boxed::Box;
use alloc::rc::Rc;

use js_sys::Function;
use kurbo::{Point, Rect, Size};
use web_sys::{Document, Element, IntersectionObserverEntry, Window};

use horizon_core::capability::Capabilities;
use horizon_core::config::{DetectorConfig, IntersectionConfig};
use horizon_core::deferral::FALLBACK_FRAME_DELAY;
use horizon_core::error::ObserveError;
use horizon_core::host::{Host, NativeCallback, NativeHost, ViewportEvent, ViewportHost};
use horizon_core::time::{Duration, HostTime};

/// Detector configuration for browser elements.
pub type WebDetectorConfig = DetectorConfig<Element, IntersectionObserverEntry>;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(frame::performance_now())
}

/// Browser implementation of the horizon host traits.
pub struct WebHost {
    window: Window,
    document: Document,
    animation_frame: Option<Function>,
}

impl core::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebHost")
            .field("animation_frame", &self.animation_frame.is_some())
            .finish_non_exhaustive()
    }
}

impl WebHost {
    /// Binds to the global `window` and its `document`.
    ///
    /// Returns `None` outside a browser main thread (no `window` or no
    /// `document`).
    #[must_use]
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let animation_frame = frame::find_animation_frame(&window);
        Some(Self {
            window,
            document,
            animation_frame,
        })
    }

    /// Returns the bound window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Host for WebHost {
    type Element = Element;

    fn now(&self) -> HostTime {
        now()
    }

    fn animation_frame_available(&self) -> bool {
        self.animation_frame.is_some()
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) {
        match &self.animation_frame {
            Some(request) => frame::request_frame(&self.window, request, callback),
            None => frame::set_timeout(&self.window, callback, FALLBACK_FRAME_DELAY),
        }
    }

    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) {
        frame::set_timeout(&self.window, callback, delay);
    }
}

impl ViewportHost for WebHost {
    type Listener = WebListener;

    fn document_element(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn is_connected(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn bounding_client_rect(&self, element: &Element) -> Rect {
        viewport::client_rect(&element.get_bounding_client_rect())
    }

    fn client_size(&self, element: &Element) -> Size {
        viewport::client_size(element)
    }

    fn hit_test(&self, point: Point, within: &Element) -> bool {
        viewport::hit_test(&self.document, point, within)
    }

    fn add_listener(
        &self,
        event: ViewportEvent,
        handler: Rc<dyn Fn()>,
    ) -> Result<WebListener, ObserveError> {
        viewport::add_listener(&self.window, event, handler)
    }

    fn remove_listener(&self, listener: WebListener) {
        viewport::remove_listener(&self.window, listener);
    }
}

impl NativeHost for WebHost {
    type Entry = IntersectionObserverEntry;
    type Observer = WebObserver;

    fn capabilities(&self) -> Capabilities {
        observer::capabilities(&self.window)
    }

    fn create_observer(
        &self,
        config: &IntersectionConfig<Element>,
        callback: NativeCallback<Element, IntersectionObserverEntry>,
    ) -> Result<WebObserver, ObserveError> {
        observer::create_observer(config, callback)
    }
}

/// Starts a detector against the current window.
///
/// # Errors
///
/// - [`ObserveError::NoRuntime`] when there is no `window` or `document`.
/// - [`ObserveError::ObserverRejected`] when `IntersectionObserver` throws on
///   the resolved options (for example a malformed `root_margin`).
pub fn observe_visibility(config: WebDetectorConfig) -> Result<Subscription, ObserveError> {
    let host = Rc::new(WebHost::new().ok_or(ObserveError::NoRuntime)?);
    horizon_core::observe_visibility(&host, config)
}

// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot animation frames and timers.
//!
//! The animation-frame function is looked up once per [`WebHost`], trying the
//! standard name first and then the vendor-prefixed variants older engines
//! ship. Callbacks are handed to JS as one-shot closures that free themselves
//! after running.
//!
//! [`WebHost`]: crate::WebHost

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use horizon_core::deferral::FALLBACK_FRAME_DELAY;
use horizon_core::time::Duration;

// Bound as a global so a clock read never fetches the Performance object.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;
}

/// Property names probed for an animation-frame function, in order.
pub(crate) const ANIMATION_FRAME_NAMES: [&str; 5] = [
    "requestAnimationFrame",
    "webkitRequestAnimationFrame",
    "mozRequestAnimationFrame",
    "msRequestAnimationFrame",
    "oRequestAnimationFrame",
];

/// Returns the first animation-frame function `window` exposes.
pub(crate) fn find_animation_frame(window: &Window) -> Option<Function> {
    ANIMATION_FRAME_NAMES.iter().find_map(|name| {
        Reflect::get(window, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    })
}

/// Calls `request` with a one-shot closure wrapping `callback`.
///
/// If the call throws, `callback` is scheduled with `setTimeout` after
/// [`FALLBACK_FRAME_DELAY`] instead.
pub(crate) fn request_frame(window: &Window, request: &Function, callback: Box<dyn FnOnce()>) {
    let slot = Rc::new(Cell::new(Some(callback)));
    let pending = Rc::clone(&slot);
    let closure = Closure::once_into_js(move || {
        if let Some(callback) = pending.take() {
            callback();
        }
    });
    if request.call1(window, &closure).is_err() {
        if let Some(callback) = slot.take() {
            set_timeout(window, callback, FALLBACK_FRAME_DELAY);
        }
    }
}

/// Schedules `callback` after `delay` with `setTimeout`.
pub(crate) fn set_timeout(window: &Window, callback: Box<dyn FnOnce()>, delay: Duration) {
    let closure = Closure::once_into_js(move || callback());
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.unchecked_ref(),
        timeout_millis(delay),
    );
}

/// Converts a delay to the integral milliseconds `setTimeout` takes.
///
/// Rounds up so the callback never runs early; saturates at `i32::MAX`.
pub(crate) fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis_ceil()).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_name_is_probed_first() {
        assert_eq!(ANIMATION_FRAME_NAMES[0], "requestAnimationFrame");
        assert_eq!(ANIMATION_FRAME_NAMES.len(), 5);
    }

    #[test]
    fn timeout_rounds_up() {
        assert_eq!(timeout_millis(FALLBACK_FRAME_DELAY), 17);
        assert_eq!(timeout_millis(Duration::from_millis(16)), 16);
        assert_eq!(timeout_millis(Duration::ZERO), 0);
    }

    #[test]
    fn timeout_saturates() {
        assert_eq!(timeout_millis(Duration(u64::MAX)), i32::MAX);
    }
}

// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferring work until layout has settled.
//!
//! [`defer_to_paint`] requests an animation frame twice in a row and runs the
//! callback from the second one, skipping the frame in which layout may still
//! be in flux. Hosts without an animation-frame facility get a one-shot timer
//! of [`FALLBACK_FRAME_DELAY`] instead.
//!
//! Calls are independent: nothing is coalesced and nothing can be cancelled.

use alloc::boxed::Box;
use alloc::rc::Rc;

use crate::host::Host;
use crate::time::Duration;

/// Timer delay used when no animation-frame facility exists (1000 / 60 ms).
pub const FALLBACK_FRAME_DELAY: Duration = Duration(16_667);

/// Runs `callback` once after the next stable paint.
pub fn defer_to_paint<H: Host>(host: &Rc<H>, callback: Box<dyn FnOnce()>) {
    if host.animation_frame_available() {
        let again = Rc::clone(host);
        host.request_animation_frame(Box::new(move || {
            again.request_animation_frame(callback);
        }));
    } else {
        host.set_timeout(callback, FALLBACK_FRAME_DELAY);
    }
}

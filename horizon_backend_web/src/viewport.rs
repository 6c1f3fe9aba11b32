// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM measurement, hit-testing, and viewport listeners.

use alloc::rc::Rc;

use kurbo::{Point, Rect, Size};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, DomRect, Element, Node, Window};

use horizon_core::error::ObserveError;
use horizon_core::host::ViewportEvent;

use crate::observer::describe;

/// A registered `scroll` or `resize` listener.
///
/// Owns the JS closure; dropping it after removal frees the closure. A
/// closure dropped while it is still running is freed once it returns.
pub struct WebListener {
    event: ViewportEvent,
    closure: Closure<dyn Fn()>,
}

impl core::fmt::Debug for WebListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebListener")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

pub(crate) fn add_listener(
    window: &Window,
    event: ViewportEvent,
    handler: Rc<dyn Fn()>,
) -> Result<WebListener, ObserveError> {
    let closure = Closure::<dyn Fn()>::new(move || handler());
    window
        .add_event_listener_with_callback(event.as_str(), closure.as_ref().unchecked_ref())
        .map_err(|err| ObserveError::ListenerRejected(describe(&err)))?;
    Ok(WebListener { event, closure })
}

pub(crate) fn remove_listener(window: &Window, listener: WebListener) {
    let _ = window.remove_event_listener_with_callback(
        listener.event.as_str(),
        listener.closure.as_ref().unchecked_ref(),
    );
}

/// Converts a `DOMRect` to client-space edges.
pub(crate) fn client_rect(rect: &DomRect) -> Rect {
    edges_to_rect(rect.left(), rect.top(), rect.right(), rect.bottom())
}

/// Builds a [`Rect`] from raw edges without normalizing.
pub(crate) fn edges_to_rect(left: f64, top: f64, right: f64, bottom: f64) -> Rect {
    Rect::new(left, top, right, bottom)
}

pub(crate) fn client_size(element: &Element) -> Size {
    Size::new(
        f64::from(element.client_width()),
        f64::from(element.client_height()),
    )
}

/// Returns `true` if the topmost element at `point` is `within` or inside it.
pub(crate) fn hit_test(document: &Document, point: Point, within: &Element) -> bool {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "elementFromPoint takes single-precision client coordinates"
    )]
    let (x, y) = (point.x as f32, point.y as f32);
    let Some(hit) = document.element_from_point(x, y) else {
        return false;
    };
    let hit: &Node = hit.as_ref();
    within.contains(Some(hit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_not_normalized() {
        let rect = edges_to_rect(50.0, 50.0, -50.0, -50.0);
        assert_eq!(rect.x0, 50.0);
        assert_eq!(rect.y1, -50.0);
        assert!(rect.width() < 0.0, "inverted rectangles keep their sign");
    }
}

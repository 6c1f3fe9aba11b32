// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native `IntersectionObserver` integration.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use js_sys::{Array, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};

use horizon_core::capability::Capabilities;
use horizon_core::config::IntersectionConfig;
use horizon_core::error::ObserveError;
use horizon_core::host::{NativeCallback, NativeEntry, ObserverControl};

type ObserverClosure = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// A live `IntersectionObserver` and the closure it calls.
pub struct WebObserver {
    observer: IntersectionObserver,
    _callback: ObserverClosure,
}

impl core::fmt::Debug for WebObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebObserver").finish_non_exhaustive()
    }
}

impl ObserverControl<Element> for WebObserver {
    fn observe(&self, target: &Element) {
        self.observer.observe(target);
    }

    fn unobserve(&self, target: &Element) {
        self.observer.unobserve(target);
    }

    fn disconnect(&self) {
        self.observer.disconnect();
    }
}

/// The observer handle JS passes to its callback.
struct CallbackObserver(IntersectionObserver);

impl ObserverControl<Element> for CallbackObserver {
    fn observe(&self, target: &Element) {
        self.0.observe(target);
    }

    fn unobserve(&self, target: &Element) {
        self.0.unobserve(target);
    }

    fn disconnect(&self) {
        self.0.disconnect();
    }
}

/// Probes `window` for the three facilities the native backend needs.
///
/// Not cached; a page may install or remove them at any time.
pub(crate) fn capabilities(window: &Window) -> Capabilities {
    let observer = has(window, "IntersectionObserver");
    let entry_ctor = Reflect::get(window, &JsValue::from_str("IntersectionObserverEntry"))
        .ok()
        .filter(|ctor| !ctor.is_undefined() && !ctor.is_null());
    let intersection_ratio = entry_ctor
        .as_ref()
        .and_then(|ctor| Reflect::get(ctor, &JsValue::from_str("prototype")).ok())
        .is_some_and(|proto| proto.is_object() && has(&proto, "intersectionRatio"));
    Capabilities {
        observer,
        entry: entry_ctor.is_some(),
        intersection_ratio,
    }
}

fn has(target: &JsValue, key: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(key)).unwrap_or(false)
}

pub(crate) fn create_observer(
    config: &IntersectionConfig<Element>,
    mut callback: NativeCallback<Element, IntersectionObserverEntry>,
) -> Result<WebObserver, ObserveError> {
    let closure = ObserverClosure::new(move |entries: Array, observer: IntersectionObserver| {
        let entries: Vec<_> = entries
            .iter()
            .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
            .map(|raw| NativeEntry {
                is_intersecting: raw.is_intersecting(),
                intersection_ratio: raw.intersection_ratio(),
                raw,
            })
            .collect();
        callback(&entries, &CallbackObserver(observer));
    });

    let init = IntersectionObserverInit::new();
    init.set_root(config.root.as_ref());
    init.set_root_margin(&config.root_margin);
    init.set_threshold(&JsValue::from_f64(config.threshold));

    let observer = IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
        .map_err(|err| ObserveError::ObserverRejected(describe(&err)))?;
    Ok(WebObserver {
        observer,
        _callback: closure,
    })
}

/// Extracts a readable message from a thrown JS value.
pub(crate) fn describe(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

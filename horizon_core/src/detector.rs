// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The detector entry point.

use alloc::rc::Rc;

use crate::backend::{BackendKind, FallbackBackend, NativeBackend, VisibilityBackend};
use crate::config::DetectorConfig;
use crate::error::ObserveError;
use crate::host::{NativeHost, ViewportHost};
use crate::subscription::Subscription;
use crate::trace::BackendSelectedEvent;

/// Starts watching `config.target` for entry/exit transitions.
///
/// The native capability is probed on every call. When it is complete (or a
/// polyfill has been installed) the native backend is used; otherwise the
/// fallback backend polls geometry on scroll and resize. Exactly one backend
/// is attached.
///
/// # Errors
///
/// - [`ObserveError::NoRuntime`] when the host has no document.
/// - [`ObserveError::ObserverRejected`] when the native observer refuses the
///   resolved configuration.
/// - [`ObserveError::ListenerRejected`] when the fallback backend cannot
///   register its viewport listeners. Nothing stays registered.
pub fn observe_visibility<H>(
    host: &Rc<H>,
    config: DetectorConfig<H::Element, H::Entry>,
) -> Result<Subscription, ObserveError>
where
    H: ViewportHost + NativeHost,
{
    if host.document_element().is_none() {
        return Err(ObserveError::NoRuntime);
    }

    let kind = BackendKind::select(config.backend, host.capabilities());
    config.tracer.backend_selected(&BackendSelectedEvent {
        backend: kind,
        at: host.now(),
    });

    match kind {
        BackendKind::Native => NativeBackend.attach(host, config),
        BackendKind::Fallback => FallbackBackend.attach(host, config),
    }
}

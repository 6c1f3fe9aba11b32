// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter over a host's native intersection observer.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use super::{BackendKind, Callbacks, VisibilityBackend};
use crate::config::{DetectorConfig, resolve};
use crate::error::ObserveError;
use crate::host::{NativeEntry, NativeHost, ObserverControl};
use crate::state::{Signal, VisibilityState};
use crate::subscription::{Subscription, Teardown};
use crate::time::Duration;
use crate::trace::{TeardownEvent, TeardownReason, Tracer, TransitionEvent};

/// Backend that forwards native observer entries into the state machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeBackend;

impl<H: NativeHost> VisibilityBackend<H, H::Entry> for NativeBackend {
    fn attach(
        &self,
        host: &Rc<H>,
        config: DetectorConfig<H::Element, H::Entry>,
    ) -> Result<Subscription, ObserveError> {
        let resolved = resolve(config.options);
        let adapter = Rc::new(Adapter {
            host: Rc::clone(host),
            target: config.target,
            trigger_once: config.trigger_once,
            state: Cell::new(VisibilityState::new()),
            observer: RefCell::new(None),
            callbacks: Callbacks::new(config.on_entry, config.on_exit),
            tracer: config.tracer,
        });

        let callback = {
            let adapter = Rc::clone(&adapter);
            Box::new(
                move |entries: &[NativeEntry<H::Entry>],
                      control: &dyn ObserverControl<H::Element>| {
                    adapter.on_entries(entries, control);
                },
            )
        };
        let observer = host.create_observer(&resolved, callback)?;

        // Some hosts deliver a first batch from inside the constructor; a
        // trigger-once entry there has already unobserved the target.
        if adapter.state.get().is_sealed() {
            adapter.release(observer);
        } else {
            observer.observe(&adapter.target);
            *adapter.observer.borrow_mut() = Some(observer);
        }

        Ok(Subscription::new(BackendKind::Native, adapter))
    }
}

struct Adapter<H: NativeHost> {
    host: Rc<H>,
    target: H::Element,
    trigger_once: bool,
    state: Cell<VisibilityState>,
    observer: RefCell<Option<H::Observer>>,
    callbacks: Callbacks<H::Entry>,
    tracer: Tracer,
}

impl<H: NativeHost> Adapter<H> {
    fn on_entries(
        &self,
        entries: &[NativeEntry<H::Entry>],
        control: &dyn ObserverControl<H::Element>,
    ) {
        for entry in entries {
            let mut state = self.state.get();
            if state.is_sealed() {
                return;
            }
            let signal = state.observe(entry.is_intersecting);
            let finished = self.trigger_once && signal == Some(Signal::Entry);
            if finished {
                state.seal();
            }
            self.state.set(state);
            let Some(signal) = signal else {
                continue;
            };

            let now = self.host.now();
            self.tracer.transition(&TransitionEvent {
                backend: BackendKind::Native,
                phase: signal.phase(),
                at: now,
            });
            if finished {
                control.unobserve(&self.target);
                let observer = self.observer.borrow_mut().take();
                if let Some(observer) = observer {
                    self.release(observer);
                }
                self.tracer.teardown(&TeardownEvent {
                    backend: BackendKind::Native,
                    reason: TeardownReason::TriggerOnce,
                    at: now,
                });
            }
            self.callbacks.emit(signal, Some(&entry.raw));
        }
    }

    /// Disconnects `observer` and drops it from a fresh task.
    ///
    /// Teardown may run inside the observer's own callback, which must stay
    /// alive until that callback returns.
    fn release(&self, observer: H::Observer) {
        observer.disconnect();
        self.host
            .set_timeout(Box::new(move || drop(observer)), Duration::ZERO);
    }
}

impl<H: NativeHost> Teardown for Adapter<H> {
    fn teardown(&self, reason: TeardownReason) {
        let mut state = self.state.get();
        state.seal();
        self.state.set(state);

        let observer = self.observer.borrow_mut().take();
        let Some(observer) = observer else {
            return;
        };
        observer.unobserve(&self.target);
        self.release(observer);
        self.tracer.teardown(&TeardownEvent {
            backend: BackendKind::Native,
            reason,
            at: self.host.now(),
        });
    }

    fn is_active(&self) -> bool {
        !self.state.get().is_sealed()
    }
}

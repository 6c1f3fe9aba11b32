// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event-driven geometry polling.
//!
//! One rate-limited handler is registered for both viewport `scroll` and
//! `resize`. Each handler run defers to paint, measures the target against
//! the root with the configured [`GeometryMode`], and feeds the result into
//! the state machine. The handler also runs once on attach so an
//! already-visible target reports its entry without waiting for input.
//!
//! # Trigger-once
//!
//! An entry produced by a listener-driven run removes both listeners right
//! away. An entry produced by the on-load run seals the state immediately but
//! never removes listeners from inside that run. Removal happens on a
//! zero-delay timer queued by the on-load run, or on the next listener-driven
//! run if one comes first.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use kurbo::{Point, Rect, Size};

use super::{BackendKind, Callbacks, VisibilityBackend};
use crate::config::{DetectorConfig, resolve};
use crate::deferral::defer_to_paint;
use crate::error::ObserveError;
use crate::geometry::{GeometryMode, GeometryProbe};
use crate::host::{ViewportEvent, ViewportHost};
use crate::limiter::{FireAction, LimitAction, RateLimiter};
use crate::state::{Signal, VisibilityState};
use crate::subscription::{Subscription, Teardown};
use crate::time::{Duration, HostTime};
use crate::trace::{
    EvaluationEvent, Origin, RateLimitedEvent, TeardownEvent, TeardownReason, Tracer,
    TransitionEvent,
};

/// Backend that polls geometry on viewport events.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackBackend;

impl<H: ViewportHost, R: 'static> VisibilityBackend<H, R> for FallbackBackend {
    fn attach(
        &self,
        host: &Rc<H>,
        config: DetectorConfig<H::Element, R>,
    ) -> Result<Subscription, ObserveError> {
        let document_root = host.document_element().ok_or(ObserveError::NoRuntime)?;
        let resolved = resolve(config.options);
        let root = resolved.root.unwrap_or(document_root);

        let poller = Rc::new(Poller {
            host: Rc::clone(host),
            root,
            target: config.target,
            geometry: config.fallback.geometry(),
            threshold: resolved.threshold,
            trigger_once: config.trigger_once,
            state: Cell::new(VisibilityState::new()),
            limiter: RefCell::new(RateLimiter::new(config.fallback.rate_limit())),
            latest_origin: Cell::new(Origin::Load),
            listeners: RefCell::new(None),
            removal_pending: Cell::new(false),
            callbacks: Callbacks::new(config.on_entry, config.on_exit),
            tracer: config.tracer,
        });

        let handler: Rc<dyn Fn()> = {
            let poller = Rc::clone(&poller);
            Rc::new(move || poller.handle(Origin::Event))
        };
        let scroll = host.add_listener(ViewportEvent::Scroll, Rc::clone(&handler))?;
        let resize = match host.add_listener(ViewportEvent::Resize, handler) {
            Ok(resize) => resize,
            Err(err) => {
                host.remove_listener(scroll);
                return Err(err);
            }
        };
        *poller.listeners.borrow_mut() = Some(Listeners { scroll, resize });

        poller.handle(Origin::Load);

        Ok(Subscription::new(BackendKind::Fallback, poller))
    }
}

/// The scroll/resize registration pair. Always removed together.
struct Listeners<L> {
    scroll: L,
    resize: L,
}

struct Poller<H: ViewportHost, R> {
    host: Rc<H>,
    root: H::Element,
    target: H::Element,
    geometry: GeometryMode,
    threshold: f64,
    trigger_once: bool,
    state: Cell<VisibilityState>,
    limiter: RefCell<RateLimiter>,
    /// Origin of the most recent handler call; a coalesced run reports it.
    latest_origin: Cell<Origin>,
    listeners: RefCell<Option<Listeners<H::Listener>>>,
    /// Sealed by the on-load run; listeners go on the next event or timer.
    removal_pending: Cell<bool>,
    callbacks: Callbacks<R>,
    tracer: Tracer,
}

impl<H: ViewportHost, R: 'static> Poller<H, R> {
    /// Entry point for both the on-load check and viewport events.
    fn handle(self: &Rc<Self>, origin: Origin) {
        self.latest_origin.set(origin);
        let now = self.host.now();
        let action = self.limiter.borrow_mut().call(now);
        match action {
            LimitAction::Run => self.run(),
            LimitAction::Arm(at) => {
                self.tracer.rate_limited(&RateLimitedEvent { at: now, action });
                self.arm(now, at);
            }
            LimitAction::Coalesced => {
                self.tracer.rate_limited(&RateLimitedEvent { at: now, action });
            }
        }
    }

    fn arm(self: &Rc<Self>, now: HostTime, at: HostTime) {
        let poller = Rc::clone(self);
        let delay: Duration = at - now;
        self.host.set_timeout(Box::new(move || poller.fire()), delay);
    }

    fn fire(self: &Rc<Self>) {
        let now = self.host.now();
        let action = self.limiter.borrow_mut().fire(now);
        match action {
            FireAction::Run => self.run(),
            FireAction::Rearm(at) => self.arm(now, at),
            FireAction::Idle => {}
        }
    }

    /// One rate-limited handler execution.
    fn run(self: &Rc<Self>) {
        let origin = self.latest_origin.get();
        if origin == Origin::Event && self.removal_pending.get() {
            self.remove_listeners(TeardownReason::TriggerOnce);
            return;
        }
        if self.state.get().is_sealed() {
            return;
        }
        let poller = Rc::clone(self);
        defer_to_paint(&self.host, Box::new(move || poller.evaluate(origin)));
    }

    fn evaluate(self: &Rc<Self>, origin: Origin) {
        let mut state = self.state.get();
        if state.is_sealed() {
            return;
        }

        // A detached node measures as a zero rect at the origin, which some
        // geometry modes would accept.
        let connected = self.host.is_connected(&self.target) && self.host.is_connected(&self.root);
        let visible = connected
            && self.geometry.is_visible(
                &Measure {
                    host: &*self.host,
                    root: &self.root,
                    target: &self.target,
                },
                self.threshold,
            );
        let now = self.host.now();
        self.tracer.evaluation(&EvaluationEvent {
            origin,
            at: now,
            visible,
        });

        let signal = state.observe(visible);
        let finished = self.trigger_once && signal == Some(Signal::Entry);
        if finished {
            state.seal();
        }
        self.state.set(state);

        let Some(signal) = signal else {
            return;
        };
        self.tracer.transition(&TransitionEvent {
            backend: BackendKind::Fallback,
            phase: signal.phase(),
            at: now,
        });
        if finished {
            match origin {
                Origin::Event => self.remove_listeners(TeardownReason::TriggerOnce),
                Origin::Load => self.defer_removal(),
            }
        }
        self.callbacks.emit(signal, None);
    }

    fn defer_removal(self: &Rc<Self>) {
        self.removal_pending.set(true);
        let poller = Rc::clone(self);
        self.host.set_timeout(
            Box::new(move || {
                if poller.removal_pending.get() {
                    poller.remove_listeners(TeardownReason::TriggerOnce);
                }
            }),
            Duration::ZERO,
        );
    }

    fn remove_listeners(&self, reason: TeardownReason) {
        let mut state = self.state.get();
        state.seal();
        self.state.set(state);
        self.removal_pending.set(false);

        let Some(listeners) = self.listeners.borrow_mut().take() else {
            return;
        };
        self.host.remove_listener(listeners.scroll);
        self.host.remove_listener(listeners.resize);
        self.tracer.teardown(&TeardownEvent {
            backend: BackendKind::Fallback,
            reason,
            at: self.host.now(),
        });
    }
}

impl<H: ViewportHost, R: 'static> Teardown for Poller<H, R> {
    fn teardown(&self, reason: TeardownReason) {
        self.remove_listeners(reason);
    }

    fn is_active(&self) -> bool {
        !self.state.get().is_sealed()
    }
}

/// Live measurements of one root/target pair.
struct Measure<'a, H: ViewportHost> {
    host: &'a H,
    root: &'a H::Element,
    target: &'a H::Element,
}

impl<H: ViewportHost> GeometryProbe for Measure<'_, H> {
    fn root_size(&self) -> Size {
        self.host.client_size(self.root)
    }

    fn target_rect(&self) -> Rect {
        self.host.bounding_client_rect(self.target)
    }

    fn hit_within_target(&self, point: Point) -> bool {
        self.host.hit_test(point, self.target)
    }
}

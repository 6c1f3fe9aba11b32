// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The simulated host.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Rect, Size};

use horizon_core::capability::Capabilities;
use horizon_core::config::IntersectionConfig;
use horizon_core::error::ObserveError;
use horizon_core::host::{Host, NativeCallback, NativeHost, ViewportEvent, ViewportHost};
use horizon_core::time::{Duration, HostTime};

use crate::observer::{ObserverRecord, ObserverSlot, SimEntry, SimObserver, margin_is_valid};

/// Upper bound on queue turns [`SimulatedHost::settle`] will run.
const SETTLE_LIMIT: usize = 10_000;

/// Handle to an element of the simulated document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    /// The document's root element.
    pub const ROOT: Self = Self(0);
}

/// Registration token for a simulated viewport listener.
#[derive(Debug, PartialEq, Eq)]
pub struct SimListener {
    id: u64,
    event: ViewportEvent,
}

#[derive(Clone, Copy, Debug)]
struct ElementState {
    rect: Rect,
    client_size: Size,
    occluded: bool,
    connected: bool,
}

struct Timer {
    due: HostTime,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

struct Registered {
    id: u64,
    event: ViewportEvent,
    handler: Rc<dyn Fn()>,
}

type HitTester = Rc<dyn Fn(Point, ElementId) -> bool>;

/// In-memory document, clock, and native observer.
///
/// Created behind an `Rc` because detectors hold on to their host.
pub struct SimulatedHost {
    clock: Cell<HostTime>,
    has_document: bool,
    animation_frames: Cell<bool>,
    capabilities: Cell<Capabilities>,
    elements: RefCell<Vec<ElementState>>,
    hit_tester: RefCell<Option<HitTester>>,
    timers: RefCell<Vec<Timer>>,
    frames: RefCell<Vec<Box<dyn FnOnce()>>>,
    next_seq: Cell<u64>,
    listeners: RefCell<Vec<Registered>>,
    observers: RefCell<Vec<Rc<ObserverSlot>>>,
    initial_batch: RefCell<Option<Vec<bool>>>,
    rejection: RefCell<Option<String>>,
    listener_rejection: RefCell<Option<(ViewportEvent, String)>>,
    frames_requested: Cell<usize>,
    timeouts_requested: Cell<usize>,
}

impl fmt::Debug for SimulatedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedHost")
            .field("now", &self.clock.get())
            .field("has_document", &self.has_document)
            .field("capabilities", &self.capabilities.get())
            .field("elements", &self.elements.borrow().len())
            .field("pending_timers", &self.timers.borrow().len())
            .field("pending_frames", &self.frames.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .field("observers", &self.observers.borrow().len())
            .finish_non_exhaustive()
    }
}

impl SimulatedHost {
    /// Creates a document whose root element is a `viewport`-sized client
    /// area. Full native capability and animation frames are available.
    #[must_use]
    pub fn new(viewport: Size) -> Rc<Self> {
        Rc::new(Self::with_document(viewport, true))
    }

    /// Creates a host with no document at all.
    #[must_use]
    pub fn without_document() -> Rc<Self> {
        Rc::new(Self::with_document(Size::ZERO, false))
    }

    fn with_document(viewport: Size, has_document: bool) -> Self {
        let root = ElementState {
            rect: viewport.to_rect(),
            client_size: viewport,
            occluded: false,
            connected: true,
        };
        Self {
            clock: Cell::new(HostTime(0)),
            has_document,
            animation_frames: Cell::new(true),
            capabilities: Cell::new(Capabilities::FULL),
            elements: RefCell::new(alloc::vec![root]),
            hit_tester: RefCell::new(None),
            timers: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            next_seq: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            initial_batch: RefCell::new(None),
            rejection: RefCell::new(None),
            listener_rejection: RefCell::new(None),
            frames_requested: Cell::new(0),
            timeouts_requested: Cell::new(0),
        }
    }

    // --- document ---

    /// Adds an element with bounding rectangle `rect`; its client size is
    /// the rectangle's size.
    pub fn add_element(&self, rect: Rect) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        let id = u32::try_from(elements.len()).unwrap_or(u32::MAX);
        elements.push(ElementState {
            rect,
            client_size: Size::new(rect.width().max(0.0), rect.height().max(0.0)),
            occluded: false,
            connected: true,
        });
        ElementId(id)
    }

    /// Moves `element`. The rectangle is stored as given, never normalized.
    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        if let Some(state) = self.elements.borrow_mut().get_mut(element.0 as usize) {
            state.rect = rect;
        }
    }

    /// Overrides the client size of `element`.
    pub fn set_client_size(&self, element: ElementId, size: Size) {
        if let Some(state) = self.elements.borrow_mut().get_mut(element.0 as usize) {
            state.client_size = size;
        }
    }

    /// Marks `element` as covered by something else at every point.
    pub fn set_occluded(&self, element: ElementId, occluded: bool) {
        if let Some(state) = self.elements.borrow_mut().get_mut(element.0 as usize) {
            state.occluded = occluded;
        }
    }

    /// Removes `element` from the document: it is no longer connected,
    /// measures as an all-zero rectangle, and no point hits it.
    pub fn detach(&self, element: ElementId) {
        if let Some(state) = self.elements.borrow_mut().get_mut(element.0 as usize) {
            *state = ElementState {
                rect: Rect::ZERO,
                client_size: Size::ZERO,
                occluded: true,
                connected: false,
            };
        }
    }

    /// Replaces the default hit test.
    pub fn set_hit_tester(&self, tester: impl Fn(Point, ElementId) -> bool + 'static) {
        *self.hit_tester.borrow_mut() = Some(Rc::new(tester));
    }

    // --- capabilities ---

    /// Sets the native capabilities reported from now on.
    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.capabilities.set(capabilities);
    }

    /// Enables or disables the animation-frame facility.
    pub fn set_animation_frames(&self, available: bool) {
        self.animation_frames.set(available);
    }

    // --- native observer scripting ---

    /// Makes the next observer deliver `intersecting` synchronously from
    /// inside its construction, before anything is observed.
    pub fn script_initial_batch(&self, intersecting: &[bool]) {
        *self.initial_batch.borrow_mut() = Some(intersecting.to_vec());
    }

    /// Makes every observer construction fail with `reason`.
    pub fn reject_observers(&self, reason: impl Into<String>) {
        *self.rejection.borrow_mut() = Some(reason.into());
    }

    /// Delivers one batch to the most recently created observer, whether or
    /// not it is still watching anything.
    ///
    /// Returns `false` if no observer exists.
    pub fn deliver(&self, intersecting: &[bool]) -> bool {
        let slot = self.observers.borrow().last().cloned();
        let Some(slot) = slot else {
            return false;
        };
        slot.deliver(intersecting);
        true
    }

    /// Number of observers constructed so far.
    #[must_use]
    pub fn observers_created(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Snapshot of the most recently created observer's record.
    #[must_use]
    pub fn observer_record(&self) -> Option<ObserverRecord> {
        self.observers
            .borrow()
            .last()
            .map(|slot| slot.record.borrow().clone())
    }

    // --- listeners ---

    /// Makes every registration for `event` fail with `reason`.
    pub fn reject_listeners(&self, event: ViewportEvent, reason: impl Into<String>) {
        *self.listener_rejection.borrow_mut() = Some((event, reason.into()));
    }

    /// Runs every handler registered for `event`.
    ///
    /// The handler list is copied first, so handlers may remove listeners.
    pub fn dispatch(&self, event: ViewportEvent) {
        let handlers: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        for handler in handlers {
            handler();
        }
    }

    /// Number of live listeners for `event`.
    #[must_use]
    pub fn listener_count(&self, event: ViewportEvent) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    // --- time ---

    /// Number of timers waiting to run.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Number of animation-frame callbacks waiting to run.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Total animation frames requested.
    #[must_use]
    pub fn frames_requested(&self) -> usize {
        self.frames_requested.get()
    }

    /// Total timers requested.
    #[must_use]
    pub fn timeouts_requested(&self) -> usize {
        self.timeouts_requested.get()
    }

    /// Runs the animation-frame callbacks queued so far.
    ///
    /// Frames requested while these run wait for the next call. Returns the
    /// number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let frames = core::mem::take(&mut *self.frames.borrow_mut());
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    /// Moves the clock forward by `by`, running every timer that falls due in
    /// deadline order. Each timer sees the clock at its own deadline.
    pub fn advance(&self, by: Duration) {
        let target = self.clock.get().saturating_add(by);
        while let Some(timer) = self.pop_due(target) {
            if timer.due > self.clock.get() {
                self.clock.set(timer.due);
            }
            (timer.callback)();
        }
        self.clock.set(target);
    }

    /// Alternates frames and timers until both queues are empty.
    pub fn settle(&self) {
        for _ in 0..SETTLE_LIMIT {
            if self.run_frame() > 0 {
                continue;
            }
            let next_due = self.timers.borrow().iter().map(|t| t.due).min();
            let Some(due) = next_due else {
                return;
            };
            self.advance(due.saturating_duration_since(self.clock.get()));
        }
    }

    fn pop_due(&self, deadline: HostTime) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(timers.swap_remove(index))
    }

    fn next_seq(&self) -> u64 {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        seq
    }

    fn element(&self, element: ElementId) -> Option<ElementState> {
        self.elements.borrow().get(element.0 as usize).copied()
    }
}

impl Host for SimulatedHost {
    type Element = ElementId;

    fn now(&self) -> HostTime {
        self.clock.get()
    }

    fn animation_frame_available(&self) -> bool {
        self.animation_frames.get()
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) {
        self.frames_requested.set(self.frames_requested.get() + 1);
        self.frames.borrow_mut().push(callback);
    }

    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) {
        self.timeouts_requested.set(self.timeouts_requested.get() + 1);
        let timer = Timer {
            due: self.clock.get() + delay,
            seq: self.next_seq(),
            callback,
        };
        self.timers.borrow_mut().push(timer);
    }
}

impl ViewportHost for SimulatedHost {
    type Listener = SimListener;

    fn document_element(&self) -> Option<ElementId> {
        self.has_document.then_some(ElementId::ROOT)
    }

    fn is_connected(&self, element: &ElementId) -> bool {
        self.element(*element).is_some_and(|e| e.connected)
    }

    fn bounding_client_rect(&self, element: &ElementId) -> Rect {
        self.element(*element).map_or(Rect::ZERO, |e| e.rect)
    }

    fn client_size(&self, element: &ElementId) -> Size {
        self.element(*element).map_or(Size::ZERO, |e| e.client_size)
    }

    fn hit_test(&self, point: Point, within: &ElementId) -> bool {
        let tester = self.hit_tester.borrow().clone();
        if let Some(tester) = tester {
            return tester(point, *within);
        }
        let Some(state) = self.element(*within) else {
            return false;
        };
        let r = state.rect;
        !state.occluded && point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }

    fn add_listener(
        &self,
        event: ViewportEvent,
        handler: Rc<dyn Fn()>,
    ) -> Result<SimListener, ObserveError> {
        let rejection = self.listener_rejection.borrow().clone();
        if let Some((rejected, reason)) = rejection
            && rejected == event
        {
            return Err(ObserveError::ListenerRejected(reason));
        }
        let id = self.next_seq();
        self.listeners.borrow_mut().push(Registered { id, event, handler });
        Ok(SimListener { id, event })
    }

    fn remove_listener(&self, listener: SimListener) {
        self.listeners
            .borrow_mut()
            .retain(|l| !(l.id == listener.id && l.event == listener.event));
    }
}

impl NativeHost for SimulatedHost {
    type Entry = SimEntry;
    type Observer = SimObserver;

    fn capabilities(&self) -> Capabilities {
        self.capabilities.get()
    }

    fn create_observer(
        &self,
        config: &IntersectionConfig<ElementId>,
        callback: NativeCallback<ElementId, SimEntry>,
    ) -> Result<SimObserver, ObserveError> {
        if let Some(reason) = self.rejection.borrow().clone() {
            return Err(ObserveError::ObserverRejected(reason));
        }
        if !margin_is_valid(&config.root_margin) {
            return Err(ObserveError::ObserverRejected(alloc::format!(
                "rootMargin must be specified in pixels or percent: {:?}",
                config.root_margin
            )));
        }

        let slot = Rc::new(ObserverSlot::new(config.clone(), callback));
        self.observers.borrow_mut().push(Rc::clone(&slot));

        let initial = self.initial_batch.borrow_mut().take();
        if let Some(batch) = initial {
            slot.deliver(&batch);
        }
        Ok(SimObserver { slot })
    }
}

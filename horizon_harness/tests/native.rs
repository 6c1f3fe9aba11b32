// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detector scenarios on the native observer path.

use std::rc::Rc;

use horizon_core::backend::BackendKind;
use horizon_core::config::{IntersectionConfig, ObserverOptions};
use horizon_core::error::ObserveError;
use horizon_core::observe_visibility;
use horizon_core::state::Phase;
use horizon_harness::{ElementId, SimConfig, SimulatedHost, TransitionLog};
use kurbo::{Rect, Size};

fn setup() -> (Rc<SimulatedHost>, ElementId, TransitionLog) {
    let host = SimulatedHost::new(Size::new(800.0, 600.0));
    let target = host.add_element(Rect::new(100.0, 100.0, 200.0, 200.0));
    (host, target, TransitionLog::new())
}

#[test]
fn trigger_once_entry_unobserves_target() {
    let (host, target, log) = setup();
    let config = log.attach(SimConfig::new(target).trigger_once(true));
    let subscription = observe_visibility(&host, config).unwrap();
    assert_eq!(subscription.backend(), BackendKind::Native);

    assert!(host.deliver(&[true]));
    assert_eq!(log.entries(), 1);
    assert_eq!(log.exits(), 0);

    let record = host.observer_record().unwrap();
    assert_eq!(record.unobserved, [target]);
    assert_eq!(record.disconnects, 1);
    assert!(!subscription.is_active());
}

#[test]
fn trigger_once_ignores_later_entries() {
    let (host, target, log) = setup();
    let config = log.attach(SimConfig::new(target).trigger_once(true));
    let subscription = observe_visibility(&host, config).unwrap();

    // The rest of the first batch and every later batch are ignored.
    host.deliver(&[true, false, true]);
    host.deliver(&[false]);
    host.deliver(&[true]);
    assert_eq!(log.phases(), [Phase::Visible]);

    // Explicit teardown after trigger-once does not unobserve again.
    subscription.unobserve();
    let record = host.observer_record().unwrap();
    assert_eq!(record.unobserved.len(), 1);
}

#[test]
fn released_observer_is_dropped_on_a_later_task() {
    let (host, target, log) = setup();
    let config = log.attach(SimConfig::new(target).trigger_once(true));
    let _subscription = observe_visibility(&host, config).unwrap();

    host.deliver(&[true]);
    assert!(!host.observer_record().unwrap().dropped);
    host.settle();
    assert!(host.observer_record().unwrap().dropped);
}

#[test]
fn non_intersecting_first_entry_is_silent() {
    let (host, target, log) = setup();
    let config = log.attach(SimConfig::new(target));
    let _subscription = observe_visibility(&host, config).unwrap();

    host.deliver(&[false]);
    assert!(log.is_empty());
}

#[test]
fn entries_and_exits_alternate() {
    let (host, target, log) = setup();
    let config = log.attach(SimConfig::new(target));
    let subscription = observe_visibility(&host, config).unwrap();

    for _ in 0..3 {
        host.deliver(&[true]);
        host.deliver(&[true]);
        host.deliver(&[false]);
        host.deliver(&[false]);
    }
    assert_eq!(log.entries(), 3);
    assert_eq!(log.exits(), 3);
    assert!(log.events().iter().all(|e| e.had_raw));
    assert!(subscription.is_active());
}

#[test]
fn raw_entry_is_forwarded() {
    let (host, target, _) = setup();
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let config = {
        let seen = Rc::clone(&seen);
        SimConfig::new(target).on_entry(move |change| {
            seen.borrow_mut().push(change.raw.copied());
        })
    };
    let _subscription = observe_visibility(&host, config).unwrap();

    host.deliver(&[true]);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    let raw = seen[0].unwrap();
    assert_eq!(raw.target, Some(target));
    assert!(raw.is_intersecting);
    assert_eq!(raw.intersection_ratio, 1.0);
}

#[test]
fn observe_is_called_with_the_target() {
    let (host, target, _) = setup();
    let _subscription = observe_visibility(&host, SimConfig::new(target)).unwrap();

    let record = host.observer_record().unwrap();
    assert_eq!(record.observed, [target]);
    assert!(record.is_watching(target));
}

#[test]
fn default_options_reach_the_observer() {
    let (host, target, _) = setup();
    let _subscription = observe_visibility(&host, SimConfig::new(target)).unwrap();

    let record = host.observer_record().unwrap();
    assert_eq!(record.config, IntersectionConfig::default());
    assert_eq!(record.config.root, None);
    assert_eq!(record.config.root_margin, "35%");
    assert_eq!(record.config.threshold, 0.0);
}

#[test]
fn custom_options_reach_the_observer() {
    let (host, target, _) = setup();
    let scroller = host.add_element(Rect::new(0.0, 0.0, 400.0, 400.0));
    let options = ObserverOptions::default()
        .root(scroller)
        .root_margin("100%")
        .threshold(1.0);
    let config = SimConfig::new(target).options(options);
    let _subscription = observe_visibility(&host, config).unwrap();

    let record = host.observer_record().unwrap();
    assert_eq!(record.config.root, Some(scroller));
    assert_eq!(record.config.root_margin, "100%");
    assert_eq!(record.config.threshold, 1.0);
}

#[test]
fn partial_options_keep_remaining_defaults() {
    let (host, target, _) = setup();
    let config = SimConfig::new(target).options(ObserverOptions::default().threshold(1.0));
    let _subscription = observe_visibility(&host, config).unwrap();

    let record = host.observer_record().unwrap();
    assert_eq!(record.config.root, None);
    assert_eq!(record.config.root_margin, "35%");
    assert_eq!(record.config.threshold, 1.0);
}

#[test]
fn malformed_margin_is_rejected() {
    let (host, target, log) = setup();
    let config = log.attach(
        SimConfig::new(target).options(ObserverOptions::default().root_margin("bogus")),
    );
    let err = observe_visibility(&host, config).unwrap_err();
    assert!(matches!(err, ObserveError::ObserverRejected(_)), "{err}");
    assert_eq!(host.observers_created(), 0);
    assert!(log.is_empty());
}

#[test]
fn host_rejection_is_surfaced() {
    let (host, target, _) = setup();
    host.reject_observers("not today");
    let err = observe_visibility(&host, SimConfig::new(target)).unwrap_err();
    assert_eq!(err, ObserveError::ObserverRejected("not today".into()));
}

#[test]
fn synchronous_first_batch_with_trigger_once() {
    let (host, target, log) = setup();
    host.script_initial_batch(&[true]);
    let config = log.attach(SimConfig::new(target).trigger_once(true));
    let subscription = observe_visibility(&host, config).unwrap();

    assert_eq!(log.entries(), 1);
    assert!(!subscription.is_active());
    let record = host.observer_record().unwrap();
    assert!(record.observed.is_empty());
    assert_eq!(record.disconnects, 1);

    host.deliver(&[false, true]);
    assert_eq!(log.len(), 1);
}

#[test]
fn synchronous_first_batch_without_trigger_once() {
    let (host, target, log) = setup();
    host.script_initial_batch(&[true]);
    let config = log.attach(SimConfig::new(target));
    let _subscription = observe_visibility(&host, config).unwrap();

    assert_eq!(log.entries(), 1);
    let record = host.observer_record().unwrap();
    assert_eq!(record.observed, [target]);
    assert_eq!(record.disconnects, 0);
}

#[test]
fn unobserve_is_idempotent() {
    let (host, target, log) = setup();
    let config = log.attach(SimConfig::new(target));
    let subscription = observe_visibility(&host, config).unwrap();

    subscription.unobserve();
    subscription.unobserve();
    assert!(!subscription.is_active());
    let record = host.observer_record().unwrap();
    assert_eq!(record.unobserved, [target]);
    assert_eq!(record.disconnects, 1);

    // A batch already queued by the platform reports nothing.
    host.deliver(&[true]);
    assert!(log.is_empty());
    host.settle();
    assert!(host.observer_record().unwrap().dropped);
}

#[test]
fn dropping_the_handle_keeps_observing() {
    let (host, target, log) = setup();
    let config = log.attach(SimConfig::new(target));
    drop(observe_visibility(&host, config).unwrap());

    host.deliver(&[true]);
    assert_eq!(log.entries(), 1);
    assert!(host.observer_record().unwrap().is_watching(target));
}

#[test]
fn each_call_builds_its_own_observer() {
    let (host, target, log) = setup();
    let other = host.add_element(Rect::new(0.0, 300.0, 50.0, 350.0));
    let _first = observe_visibility(&host, log.attach(SimConfig::new(target))).unwrap();
    let _second = observe_visibility(&host, log.attach(SimConfig::new(other))).unwrap();
    assert_eq!(host.observers_created(), 2);
    assert_eq!(host.observer_record().unwrap().observed, [other]);
}

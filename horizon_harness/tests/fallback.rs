// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detector scenarios on the geometry-polling path.

use std::rc::Rc;

use horizon_core::backend::BackendKind;
use horizon_core::config::{BackendPreference, FallbackStrategy, ObserverOptions};
use horizon_core::error::ObserveError;
use horizon_core::host::{Host, ViewportEvent};
use horizon_core::observe_visibility;
use horizon_core::state::Phase;
use horizon_core::time::{Duration, HostTime};
use horizon_harness::{ElementId, SimConfig, SimulatedHost, TransitionLog};
use kurbo::{Rect, Size};

const STRATEGIES: [FallbackStrategy; 3] = [
    FallbackStrategy::CornerSampling,
    FallbackStrategy::BoundingOverlap,
    FallbackStrategy::AreaFraction,
];

const IN_VIEW: Rect = Rect::new(100.0, 100.0, 200.0, 200.0);
const BELOW_VIEW: Rect = Rect::new(100.0, 1000.0, 200.0, 1100.0);

fn host() -> Rc<SimulatedHost> {
    SimulatedHost::new(Size::new(800.0, 600.0))
}

fn config(target: ElementId, strategy: FallbackStrategy) -> SimConfig {
    SimConfig::new(target)
        .backend(BackendPreference::ForceFallback)
        .fallback(strategy)
}

fn scroll(host: &SimulatedHost) {
    host.dispatch(ViewportEvent::Scroll);
    host.settle();
}

fn listeners(host: &SimulatedHost) -> (usize, usize) {
    (
        host.listener_count(ViewportEvent::Scroll),
        host.listener_count(ViewportEvent::Resize),
    )
}

#[test]
fn inverted_rect_never_enters() {
    for strategy in STRATEGIES {
        let host = host();
        // top 50, left 50, bottom -50, right -50
        let target = host.add_element(Rect::new(50.0, 50.0, -50.0, -50.0));
        let log = TransitionLog::new();
        let _subscription = observe_visibility(&host, log.attach(config(target, strategy))).unwrap();

        host.settle();
        scroll(&host);
        host.dispatch(ViewportEvent::Resize);
        host.settle();
        assert!(log.is_empty(), "{strategy:?} reported {:?}", log.phases());
    }
}

#[test]
fn zero_rect_with_hits_enters_once() {
    let host = host();
    let target = host.add_element(Rect::ZERO);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::CornerSampling);
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();

    // Two handler calls in immediate succession.
    host.dispatch(ViewportEvent::Scroll);
    host.dispatch(ViewportEvent::Scroll);
    host.settle();
    assert_eq!(log.phases(), [Phase::Visible]);

    // Two separate evaluations.
    scroll(&host);
    scroll(&host);
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn occluded_corners_are_not_visible() {
    let host = host();
    let target = host.add_element(IN_VIEW);
    host.set_occluded(target, true);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::CornerSampling);
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    host.settle();
    assert!(log.is_empty());

    // Uncovering one corner is enough.
    host.set_hit_tester(move |point, within| {
        within == target && point.x == IN_VIEW.x1 && point.y == IN_VIEW.y1
    });
    scroll(&host);
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn detached_target_is_not_visible() {
    for strategy in STRATEGIES {
        for rect in [IN_VIEW, BELOW_VIEW] {
            let host = host();
            let target = host.add_element(rect);
            host.detach(target);
            let log = TransitionLog::new();
            let _subscription =
                observe_visibility(&host, log.attach(config(target, strategy))).unwrap();
            host.settle();
            scroll(&host);
            assert!(log.is_empty(), "{strategy:?} reported {:?}", log.phases());
        }
    }
}

#[test]
fn detached_default_mode_is_not_visible() {
    let host = host();
    let target = host.add_element(BELOW_VIEW);
    host.detach(target);
    let log = TransitionLog::new();
    let config = SimConfig::new(target).backend(BackendPreference::ForceFallback);
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    host.settle();
    scroll(&host);
    assert!(log.is_empty(), "reported {:?}", log.phases());
}

#[test]
fn detaching_a_visible_target_exits() {
    let host = host();
    let target = host.add_element(IN_VIEW);
    let log = TransitionLog::new();
    let _subscription =
        observe_visibility(&host, log.attach(config(target, FallbackStrategy::AreaFraction)))
            .unwrap();
    host.settle();
    assert_eq!(log.phases(), [Phase::Visible]);

    host.detach(target);
    scroll(&host);
    assert_eq!(log.phases(), [Phase::Visible, Phase::Hidden]);
}

#[test]
fn detached_root_is_not_visible() {
    for strategy in STRATEGIES {
        let host = host();
        let scroller = host.add_element(Rect::new(0.0, 0.0, 300.0, 300.0));
        let target = host.add_element(IN_VIEW);
        host.detach(scroller);
        let log = TransitionLog::new();
        let config =
            config(target, strategy).options(ObserverOptions::default().root(scroller));
        let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
        host.settle();
        scroll(&host);
        assert!(log.is_empty(), "{strategy:?} reported {:?}", log.phases());
    }
}

#[test]
fn already_visible_target_enters_without_input() {
    for strategy in STRATEGIES {
        let host = host();
        let target = host.add_element(IN_VIEW);
        let log = TransitionLog::new();
        let _subscription = observe_visibility(&host, log.attach(config(target, strategy))).unwrap();
        host.settle();
        assert_eq!(log.phases(), [Phase::Visible], "{strategy:?}");
        assert!(log.events().iter().all(|e| !e.had_raw));
    }
}

#[test]
fn entries_and_exits_alternate() {
    for strategy in STRATEGIES {
        let host = host();
        let target = host.add_element(IN_VIEW);
        let log = TransitionLog::new();
        let subscription = observe_visibility(&host, log.attach(config(target, strategy))).unwrap();
        host.settle();

        for _ in 0..2 {
            host.set_rect(target, BELOW_VIEW);
            scroll(&host);
            scroll(&host);
            host.set_rect(target, IN_VIEW);
            scroll(&host);
        }
        assert_eq!(
            log.phases(),
            [
                Phase::Visible,
                Phase::Hidden,
                Phase::Visible,
                Phase::Hidden,
                Phase::Visible
            ],
            "{strategy:?}"
        );
        assert!(subscription.is_active());
        assert_eq!(listeners(&host), (1, 1));
    }
}

#[test]
fn resize_also_drives_evaluation() {
    let host = host();
    let target = host.add_element(BELOW_VIEW);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::BoundingOverlap);
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    host.settle();
    assert!(log.is_empty());

    // A taller viewport now contains the target.
    host.set_client_size(ElementId::ROOT, Size::new(800.0, 1200.0));
    host.dispatch(ViewportEvent::Resize);
    host.settle();
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn trigger_once_from_event_removes_both_listeners() {
    let host = host();
    let target = host.add_element(BELOW_VIEW);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::BoundingOverlap).trigger_once(true);
    let subscription = observe_visibility(&host, log.attach(config)).unwrap();
    host.settle();
    assert!(log.is_empty());
    assert_eq!(listeners(&host), (1, 1));

    host.set_rect(target, IN_VIEW);
    scroll(&host);
    assert_eq!(log.phases(), [Phase::Visible]);
    assert_eq!(listeners(&host), (0, 0));
    assert!(!subscription.is_active());

    host.set_rect(target, BELOW_VIEW);
    scroll(&host);
    assert_eq!(log.len(), 1);
}

/// Runs frames and timers one step at a time until `log` has an entry.
fn run_until_reported(host: &SimulatedHost, log: &TransitionLog) {
    for _ in 0..1_000 {
        if !log.is_empty() {
            return;
        }
        if host.run_frame() == 0 {
            host.advance(Duration::from_millis(1));
        }
    }
    panic!("no transition reported");
}

#[test]
fn trigger_once_on_load_defers_listener_removal() {
    for strategy in STRATEGIES {
        let host = host();
        let target = host.add_element(IN_VIEW);
        let log = TransitionLog::new();
        let config = config(target, strategy).trigger_once(true);
        let subscription = observe_visibility(&host, log.attach(config)).unwrap();

        run_until_reported(&host, &log);
        assert_eq!(log.phases(), [Phase::Visible], "{strategy:?}");
        assert!(!subscription.is_active());
        // The on-load run itself leaves the pair registered.
        assert_eq!(listeners(&host), (1, 1), "{strategy:?}");

        // Released on the next task without any input.
        host.advance(Duration::ZERO);
        assert_eq!(listeners(&host), (0, 0), "{strategy:?}");
        assert_eq!(host.pending_timers(), 0, "{strategy:?}");
    }
}

#[test]
fn trigger_once_on_load_ignores_later_events() {
    for strategy in STRATEGIES {
        let host = host();
        let target = host.add_element(IN_VIEW);
        let log = TransitionLog::new();
        let config = config(target, strategy).trigger_once(true);
        let _subscription = observe_visibility(&host, log.attach(config)).unwrap();

        run_until_reported(&host, &log);
        host.set_rect(target, BELOW_VIEW);
        host.dispatch(ViewportEvent::Resize);
        host.settle();
        host.set_rect(target, IN_VIEW);
        host.dispatch(ViewportEvent::Scroll);
        host.settle();
        assert_eq!(listeners(&host), (0, 0), "{strategy:?}");
        assert_eq!(log.len(), 1, "{strategy:?}");
    }
}

#[test]
fn unobserve_removes_listeners_and_silences_pending_runs() {
    let host = host();
    let target = host.add_element(IN_VIEW);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::BoundingOverlap);
    let subscription = observe_visibility(&host, log.attach(config)).unwrap();

    // The on-load run is waiting on its frames.
    assert_eq!(host.pending_frames(), 1);
    subscription.unobserve();
    subscription.unobserve();
    assert_eq!(listeners(&host), (0, 0));
    host.settle();
    assert!(log.is_empty());
    assert!(!subscription.is_active());
}

#[test]
fn dispose_consumes_the_handle() {
    let host = host();
    let target = host.add_element(IN_VIEW);
    let subscription = observe_visibility(&host, config(target, FallbackStrategy::AreaFraction)).unwrap();
    assert_eq!(subscription.backend(), BackendKind::Fallback);
    subscription.dispose();
    assert_eq!(listeners(&host), (0, 0));
}

#[test]
fn debounce_coalesces_a_burst() {
    let host = host();
    let target = host.add_element(IN_VIEW);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::AreaFraction);
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    assert_eq!(host.frames_requested(), 0);

    for _ in 0..4 {
        host.dispatch(ViewportEvent::Scroll);
        host.advance(Duration::from_millis(5));
    }
    assert_eq!(host.frames_requested(), 0);
    assert!(log.is_empty());

    host.settle();
    // One run, two frames for its deferral.
    assert_eq!(host.frames_requested(), 2);
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn leading_throttle_runs_immediately() {
    let host = host();
    let target = host.add_element(IN_VIEW);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::BoundingOverlap);
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    assert_eq!(host.frames_requested(), 1);

    // Inside the window: one trailing run.
    host.dispatch(ViewportEvent::Scroll);
    host.dispatch(ViewportEvent::Scroll);
    assert_eq!(host.pending_timers(), 1);
    host.settle();
    assert_eq!(host.frames_requested(), 4);
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn missing_animation_frames_use_a_timer() {
    let host = host();
    host.set_animation_frames(false);
    let target = host.add_element(IN_VIEW);
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::BoundingOverlap);
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();

    assert_eq!(host.frames_requested(), 0);
    assert_eq!(host.timeouts_requested(), 1);
    host.settle();
    assert_eq!(host.now(), HostTime(16_667));
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn root_margin_is_not_applied() {
    let host = host();
    // Just below the fold; a 35% margin would include it.
    let target = host.add_element(Rect::new(100.0, 650.0, 200.0, 750.0));
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::BoundingOverlap)
        .options(ObserverOptions::default().root_margin("35%"));
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    host.settle();
    assert!(log.is_empty());
}

#[test]
fn area_fraction_honors_threshold() {
    let host = host();
    // Half of the target is above the fold.
    let target = host.add_element(Rect::new(100.0, 550.0, 200.0, 650.0));
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::AreaFraction)
        .options(ObserverOptions::default().threshold(1.0));
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    host.settle();
    assert!(log.is_empty());

    host.set_rect(target, Rect::new(100.0, 450.0, 200.0, 550.0));
    scroll(&host);
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn custom_root_supplies_the_client_area() {
    let host = host();
    let scroller = host.add_element(Rect::new(0.0, 0.0, 300.0, 300.0));
    let target = host.add_element(Rect::new(100.0, 400.0, 200.0, 500.0));
    let log = TransitionLog::new();
    let config = config(target, FallbackStrategy::BoundingOverlap)
        .options(ObserverOptions::default().root(scroller));
    let _subscription = observe_visibility(&host, log.attach(config)).unwrap();
    host.settle();
    assert!(log.is_empty());

    host.set_client_size(scroller, Size::new(300.0, 800.0));
    scroll(&host);
    assert_eq!(log.phases(), [Phase::Visible]);
}

#[test]
fn rejected_listener_leaves_nothing_registered() {
    for event in [ViewportEvent::Scroll, ViewportEvent::Resize] {
        let host = host();
        host.reject_listeners(event, "denied");
        let target = host.add_element(IN_VIEW);
        let log = TransitionLog::new();
        let config = config(target, FallbackStrategy::AreaFraction);
        let err = observe_visibility(&host, log.attach(config)).unwrap_err();
        assert_eq!(err, ObserveError::ListenerRejected("denied".into()), "{event:?}");
        assert_eq!(listeners(&host), (0, 0), "{event:?}");

        host.settle();
        assert!(log.is_empty(), "{event:?}");
        assert_eq!(host.frames_requested(), 0, "{event:?}");
    }
}

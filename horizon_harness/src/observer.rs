// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted native observer.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use horizon_core::config::IntersectionConfig;
use horizon_core::host::{NativeCallback, NativeEntry, ObserverControl};

use crate::host::ElementId;

/// Entry descriptor delivered by the simulated observer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimEntry {
    /// The observed element, if the observer was watching one.
    pub target: Option<ElementId>,
    /// Mirrors [`NativeEntry::is_intersecting`].
    pub is_intersecting: bool,
    /// Mirrors [`NativeEntry::intersection_ratio`].
    pub intersection_ratio: f64,
}

/// Everything a simulated observer was asked to do.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverRecord {
    /// Options the observer was constructed with.
    pub config: IntersectionConfig<ElementId>,
    /// Targets passed to `observe`, in call order.
    pub observed: Vec<ElementId>,
    /// Targets passed to `unobserve`, in call order.
    pub unobserved: Vec<ElementId>,
    /// Number of `disconnect` calls.
    pub disconnects: usize,
    /// The owning handle has been dropped.
    pub dropped: bool,
}

impl ObserverRecord {
    /// Returns `true` if `target` is observed and the observer is connected.
    #[must_use]
    pub fn is_watching(&self, target: ElementId) -> bool {
        if self.disconnects > 0 {
            return false;
        }
        let observed = self.observed.iter().filter(|t| **t == target).count();
        let unobserved = self.unobserved.iter().filter(|t| **t == target).count();
        observed > unobserved
    }
}

pub(crate) struct ObserverSlot {
    pub(crate) record: RefCell<ObserverRecord>,
    pub(crate) callback: RefCell<NativeCallback<ElementId, SimEntry>>,
}

impl ObserverSlot {
    pub(crate) fn new(
        config: IntersectionConfig<ElementId>,
        callback: NativeCallback<ElementId, SimEntry>,
    ) -> Self {
        Self {
            record: RefCell::new(ObserverRecord {
                config,
                observed: Vec::new(),
                unobserved: Vec::new(),
                disconnects: 0,
                dropped: false,
            }),
            callback: RefCell::new(callback),
        }
    }

    /// Invokes the stored callback with one entry per flag.
    ///
    /// Panics if called from inside the same observer's callback.
    pub(crate) fn deliver(&self, intersecting: &[bool]) {
        let target = self.record.borrow().observed.last().copied();
        let entries: Vec<NativeEntry<SimEntry>> = intersecting
            .iter()
            .map(|&is_intersecting| {
                let intersection_ratio = if is_intersecting { 1.0 } else { 0.0 };
                NativeEntry {
                    is_intersecting,
                    intersection_ratio,
                    raw: SimEntry {
                        target,
                        is_intersecting,
                        intersection_ratio,
                    },
                }
            })
            .collect();
        let mut callback = self.callback.borrow_mut();
        (*callback)(&entries, self);
    }
}

impl ObserverControl<ElementId> for ObserverSlot {
    fn observe(&self, target: &ElementId) {
        self.record.borrow_mut().observed.push(*target);
    }

    fn unobserve(&self, target: &ElementId) {
        self.record.borrow_mut().unobserved.push(*target);
    }

    fn disconnect(&self) {
        self.record.borrow_mut().disconnects += 1;
    }
}

/// Handle to a simulated observer, owned by the detector.
pub struct SimObserver {
    pub(crate) slot: Rc<ObserverSlot>,
}

impl fmt::Debug for SimObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimObserver")
            .field("record", &*self.slot.record.borrow())
            .finish_non_exhaustive()
    }
}

impl ObserverControl<ElementId> for SimObserver {
    fn observe(&self, target: &ElementId) {
        self.slot.observe(target);
    }

    fn unobserve(&self, target: &ElementId) {
        self.slot.unobserve(target);
    }

    fn disconnect(&self) {
        self.slot.disconnect();
    }
}

impl Drop for SimObserver {
    fn drop(&mut self) {
        self.slot.record.borrow_mut().dropped = true;
    }
}

/// Returns `true` if `margin` is one to four whitespace-separated lengths,
/// each a number followed by `px` or `%`.
#[must_use]
pub fn margin_is_valid(margin: &str) -> bool {
    let count = margin.split_whitespace().count();
    if !(1..=4).contains(&count) {
        return false;
    }
    margin.split_whitespace().all(|token| {
        let number = token
            .strip_suffix("px")
            .or_else(|| token.strip_suffix('%'));
        number.is_some_and(|n| n.parse::<f64>().is_ok_and(f64::is_finite))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margins() {
        assert!(margin_is_valid("35%"));
        assert!(margin_is_valid("100%"));
        assert!(margin_is_valid("10px 0px"));
        assert!(margin_is_valid("-5px 10% 0px 1.5px"));
        assert!(!margin_is_valid(""));
        assert!(!margin_is_valid("bogus"));
        assert!(!margin_is_valid("10"));
        assert!(!margin_is_valid("1px 1px 1px 1px 1px"));
    }

    #[test]
    fn watching_follows_unobserve_and_disconnect() {
        let target = ElementId::ROOT;
        let mut record = ObserverRecord {
            config: IntersectionConfig::default(),
            observed: alloc::vec![target],
            unobserved: Vec::new(),
            disconnects: 0,
            dropped: false,
        };
        assert!(record.is_watching(target));
        record.unobserved.push(target);
        assert!(!record.is_watching(target));
        record.observed.push(target);
        assert!(record.is_watching(target));
        record.disconnects = 1;
        assert!(!record.is_watching(target));
    }
}

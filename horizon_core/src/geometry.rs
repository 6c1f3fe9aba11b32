// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Manual visibility tests for hosts without a native intersection observer.
//!
//! All rectangles are in client (viewport) coordinates as returned by
//! `getBoundingClientRect`: `x0`/`y0` are the left/top edges and `x1`/`y1`
//! the right/bottom edges. Rectangles are used exactly as reported and never
//! normalized, so an inverted rectangle (right of left, bottom above top)
//! still feeds its raw edges into the tests.
//!
//! None of the tests apply a root margin.

use kurbo::{Point, Rect, Size};

/// Which geometry test the fallback backend runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryMode {
    /// Any overlap of the target's bounds with the root's client area.
    ///
    /// Ignores occlusion and threshold.
    BoundingOverlap,
    /// Overlap plus at least one unoccluded corner.
    ///
    /// Each corner is hit-tested against the document; the corner counts when
    /// the topmost element there lies within the target. Exact-edge corners
    /// may miss because of sub-pixel rounding.
    CornerSampling,
    /// Each edge of the intersection must span at least `threshold` of the
    /// target's extent along that axis.
    AreaFraction,
}

/// Source of the measurements a geometry test needs.
pub trait GeometryProbe {
    /// Client width and height of the root element.
    fn root_size(&self) -> Size;

    /// Bounding client rectangle of the target element.
    fn target_rect(&self) -> Rect;

    /// Returns `true` if the topmost element at `point` is contained in the
    /// target.
    fn hit_within_target(&self, point: Point) -> bool;
}

impl GeometryMode {
    /// Runs this test against the measurements in `probe`.
    #[must_use]
    pub fn is_visible(self, probe: &impl GeometryProbe, threshold: f64) -> bool {
        let root = probe.root_size();
        let target = probe.target_rect();
        match self {
            Self::BoundingOverlap => bounding_overlap(root, target),
            Self::CornerSampling => corner_sampling(root, target, |p| probe.hit_within_target(p)),
            Self::AreaFraction => area_fraction(root, target, threshold),
        }
    }
}

/// Coarse overlap test against a root of size `root`.
///
/// Visible iff the bottom edge is below 0, the right edge is right of 0, the
/// left edge is left of the root width and the top edge is above the root
/// height.
#[must_use]
pub fn bounding_overlap(root: Size, target: Rect) -> bool {
    target.y1 > 0.0 && target.x1 > 0.0 && target.x0 < root.width && target.y0 < root.height
}

/// Returns `true` if `target` lies entirely outside the root's client area.
///
/// Touching an edge does not count as outside.
#[must_use]
pub fn entirely_outside(root: Size, target: Rect) -> bool {
    target.y1 < 0.0 || target.x1 < 0.0 || target.x0 > root.width || target.y0 > root.height
}

/// The four corners of `rect` in top-left, top-right, bottom-left,
/// bottom-right order.
#[must_use]
pub fn corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x1, rect.y1),
    ]
}

/// Occlusion-aware test.
///
/// Visible iff the target is not entirely outside the root and `hit` reports
/// at least one corner as landing on the target. Corners are sampled in
/// [`corners`] order and sampling stops at the first hit.
#[must_use]
pub fn corner_sampling(root: Size, target: Rect, hit: impl FnMut(Point) -> bool) -> bool {
    if entirely_outside(root, target) {
        return false;
    }
    corners(target).into_iter().any(hit)
}

/// Threshold-aware test.
///
/// Builds the intersection extents relative to the root
/// (`top = bottom`, `right = width - left`, `bottom = height - top`,
/// `left = right`) and requires each to be at least `threshold` times the
/// target's height (vertical edges) or width (horizontal edges).
#[must_use]
pub fn area_fraction(root: Size, target: Rect, threshold: f64) -> bool {
    let min_y = threshold * target.height();
    let min_x = threshold * target.width();

    let top = target.y1;
    let right = root.width - target.x0;
    let bottom = root.height - target.y0;
    let left = target.x1;

    top >= min_y && right >= min_x && bottom >= min_y && left >= min_x
}

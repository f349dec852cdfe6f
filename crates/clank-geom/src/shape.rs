//! Bounding shapes and closed-interval intersection tests.
//!
//! The collision resolver reduces every contact question to one of the tests
//! in this module:
//!
//! - robot vs. robot: [`BoundingBox::intersects`]
//! - robot vs. wall: [`BoundingBox::contained_in`] / clamping against the
//!   arena box
//! - bullet vs. robot: [`BoundingBox::intersects_segment`] (a bullet's travel
//!   during one tick is a line segment)
//! - bullet vs. bullet: [`segments_intersect`]
//!
//! All tests treat boundaries as inclusive: exact touching counts as a
//! collision.

use serde::{Deserialize, Serialize};

use crate::Vec2;

// ---------------------------------------------------------------------------
// BoundingBox
// ---------------------------------------------------------------------------

/// An axis-aligned bounding box, stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BoundingBox {
    /// Build a box from its min/max corners.
    ///
    /// Callers must pass `min <= max` component-wise; a degenerate box (zero
    /// width or height) is allowed and behaves as a segment or point.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y, "inverted box: {min:?}..{max:?}");
        Self { min, max }
    }

    /// Build a box centered on `center` with the given full width and height.
    pub fn centered(center: Vec2, width: f64, height: f64) -> Self {
        let half = Vec2::new(width / 2.0, height / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Closed-interval point containment.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Closed-interval box overlap: touching edges count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Whether this box lies entirely inside `outer` (edges may touch).
    pub fn contained_in(&self, outer: &BoundingBox) -> bool {
        self.min.x >= outer.min.x
            && self.min.y >= outer.min.y
            && self.max.x <= outer.max.x
            && self.max.y <= outer.max.y
    }

    /// Whether the segment `a -> b` touches this box.
    ///
    /// Slab test: clip the segment's parameter interval against each axis.
    /// Degenerate segments (`a == b`) reduce to point containment.
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        let d = b - a;
        let mut t_min = 0.0_f64;
        let mut t_max = 1.0_f64;

        for (start, delta, lo, hi) in [
            (a.x, d.x, self.min.x, self.max.x),
            (a.y, d.y, self.min.y, self.max.y),
        ] {
            if delta == 0.0 {
                if start < lo || start > hi {
                    return false;
                }
            } else {
                let inv = 1.0 / delta;
                let (t0, t1) = {
                    let t0 = (lo - start) * inv;
                    let t1 = (hi - start) * inv;
                    if t0 <= t1 {
                        (t0, t1)
                    } else {
                        (t1, t0)
                    }
                };
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Circle
// ---------------------------------------------------------------------------

/// A circle, used for radar scan radii and proximity queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        debug_assert!(radius >= 0.0, "negative radius: {radius}");
        Self { center, radius }
    }

    /// Closed-interval point containment.
    pub fn contains(&self, p: Vec2) -> bool {
        self.center.distance_squared_to(p) <= self.radius * self.radius
    }

    /// Closed-interval circle overlap: tangency counts.
    pub fn intersects(&self, other: &Circle) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared_to(other.center) <= r * r
    }
}

// ---------------------------------------------------------------------------
// Segment intersection
// ---------------------------------------------------------------------------

/// Orientation of the ordered triple `(a, b, c)`.
///
/// Returns a positive value for counter-clockwise, negative for clockwise,
/// and zero for collinear points.
fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `p` lies on the closed segment `a -> b`, assuming the three
/// points are collinear.
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed-interval segment intersection test.
///
/// Touching endpoints and collinear overlap both count as intersection, so
/// two bullets whose travel paths merely graze each other still collide.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(x: f64, y: f64) -> BoundingBox {
        BoundingBox::centered(Vec2::new(x, y), 2.0, 2.0)
    }

    // -- 1. Box construction -------------------------------------------------

    #[test]
    fn centered_box_has_expected_corners() {
        let b = BoundingBox::centered(Vec2::new(10.0, 20.0), 4.0, 6.0);
        assert_eq!(b.min, Vec2::new(8.0, 17.0));
        assert_eq!(b.max, Vec2::new(12.0, 23.0));
        assert_eq!(b.center(), Vec2::new(10.0, 20.0));
        assert_eq!(b.width(), 4.0);
        assert_eq!(b.height(), 6.0);
    }

    // -- 2. Box/box overlap --------------------------------------------------

    #[test]
    fn overlapping_boxes_intersect() {
        assert!(unit_box_at(0.0, 0.0).intersects(&unit_box_at(1.0, 1.0)));
    }

    #[test]
    fn touching_boxes_intersect() {
        // Edges exactly touch at x = 1: closed interval means collision.
        assert!(unit_box_at(0.0, 0.0).intersects(&unit_box_at(2.0, 0.0)));
        // Corner touch.
        assert!(unit_box_at(0.0, 0.0).intersects(&unit_box_at(2.0, 2.0)));
    }

    #[test]
    fn separated_boxes_do_not_intersect() {
        assert!(!unit_box_at(0.0, 0.0).intersects(&unit_box_at(2.001, 0.0)));
    }

    // -- 3. Containment ------------------------------------------------------

    #[test]
    fn box_contained_in_larger_box() {
        let arena = BoundingBox::new(Vec2::ZERO, Vec2::new(400.0, 400.0));
        let robot = BoundingBox::centered(Vec2::new(18.0, 18.0), 36.0, 36.0);
        // Robot flush against the corner: edges touch, still contained.
        assert!(robot.contained_in(&arena));

        let outside = BoundingBox::centered(Vec2::new(10.0, 200.0), 36.0, 36.0);
        assert!(!outside.contained_in(&arena));
    }

    #[test]
    fn point_containment_is_closed() {
        let b = unit_box_at(0.0, 0.0);
        assert!(b.contains(Vec2::new(1.0, 1.0)));
        assert!(b.contains(Vec2::ZERO));
        assert!(!b.contains(Vec2::new(1.0, 1.0 + 1e-9)));
    }

    // -- 4. Segment/box ------------------------------------------------------

    #[test]
    fn segment_through_box_hits() {
        let b = unit_box_at(0.0, 0.0);
        assert!(b.intersects_segment(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn segment_grazing_edge_hits() {
        let b = unit_box_at(0.0, 0.0);
        // Runs exactly along the top edge.
        assert!(b.intersects_segment(Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0)));
    }

    #[test]
    fn segment_ending_inside_hits() {
        let b = unit_box_at(0.0, 0.0);
        assert!(b.intersects_segment(Vec2::new(-5.0, 0.0), Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn segment_missing_box() {
        let b = unit_box_at(0.0, 0.0);
        assert!(!b.intersects_segment(Vec2::new(-5.0, 1.5), Vec2::new(5.0, 1.5)));
        assert!(!b.intersects_segment(Vec2::new(2.0, 2.0), Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn degenerate_segment_is_point_test() {
        let b = unit_box_at(0.0, 0.0);
        assert!(b.intersects_segment(Vec2::ZERO, Vec2::ZERO));
        assert!(!b.intersects_segment(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0)));
    }

    // -- 5. Circles ----------------------------------------------------------

    #[test]
    fn tangent_circles_intersect() {
        let a = Circle::new(Vec2::ZERO, 1.0);
        let b = Circle::new(Vec2::new(2.0, 0.0), 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&Circle::new(Vec2::new(2.001, 0.0), 1.0)));
    }

    #[test]
    fn circle_contains_boundary_point() {
        let c = Circle::new(Vec2::ZERO, 5.0);
        assert!(c.contains(Vec2::new(5.0, 0.0)));
        assert!(c.contains(Vec2::new(3.0, 4.0)));
        assert!(!c.contains(Vec2::new(5.0, 0.1)));
    }

    // -- 6. Segment/segment --------------------------------------------------

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, -1.0),
        ));
    }

    #[test]
    fn touching_endpoints_intersect() {
        assert!(segments_intersect(
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 1.0),
        ));
    }

    #[test]
    fn collinear_overlap_intersects() {
        assert!(segments_intersect(
            Vec2::ZERO,
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn collinear_disjoint_does_not_intersect() {
        assert!(!segments_intersect(
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            Vec2::ZERO,
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(2.0, 1.0),
        ));
    }
}

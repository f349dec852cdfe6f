//! Clank Geometry -- 2-D vector/angle math and collision primitives.
//!
//! This crate is the dependency-light foundation of the Clank battle engine.
//! It provides [`Vec2`], angle normalization helpers, and the closed-interval
//! intersection tests ([`shape`]) the collision resolver is built on.
//!
//! Everything here is a pure function over value types: no shared state, no
//! side effects, safe to call from any context. All angle-consuming functions
//! expect radians; callers normalize with [`normalize_angle`] before
//! comparing headings.
//!
//! # Numeric semantics
//!
//! - Angles are normalized to `[0, 2*PI)`.
//! - Intersection tests use closed intervals: touching counts as a hit. This
//!   keeps collision outcomes deterministic at exact-contact boundaries
//!   instead of depending on which side of an open interval a rounded value
//!   lands on.
//!
//! # Quick Start
//!
//! ```
//! use clank_geom::{Vec2, normalize_angle};
//!
//! let p = Vec2::new(3.0, 4.0);
//! assert_eq!(p.length(), 5.0);
//!
//! let a = normalize_angle(-std::f64::consts::PI);
//! assert!((a - std::f64::consts::PI).abs() < 1e-12);
//! ```

#![deny(unsafe_code)]

pub mod shape;

pub use shape::{segments_intersect, BoundingBox, Circle};

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2-D vector / point with `f64` components.
///
/// Used for robot positions, bullet positions, and displacement deltas. The
/// coordinate system matches the arena: `x` grows to the right, `y` grows
/// upward, and heading `0` points along positive `y` (north), increasing
/// clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `heading` (radians, 0 = north, clockwise).
    pub fn from_heading(heading: f64) -> Self {
        Self {
            x: heading.sin(),
            y: heading.cos(),
        }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared length; avoids the square root when only comparing distances.
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Distance to another point.
    pub fn distance_to(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Squared distance to another point.
    pub fn distance_squared_to(self, other: Vec2) -> f64 {
        (other - self).length_squared()
    }

    /// Dot product.
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Heading from this point toward `other`, normalized to `[0, 2*PI)`.
    ///
    /// Uses the arena convention (0 = north, clockwise), so
    /// `atan2(dx, dy)` rather than the mathematical `atan2(dy, dx)`.
    pub fn heading_to(self, other: Vec2) -> f64 {
        let d = other - self;
        normalize_angle(d.x.atan2(d.y))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Angle helpers
// ---------------------------------------------------------------------------

/// Normalize an angle in radians to `[0, 2*PI)`.
///
/// All headings stored in battle state are normalized with this function
/// before comparison, so two headings that differ by a multiple of a full
/// turn compare equal.
pub fn normalize_angle(angle: f64) -> f64 {
    // rem_euclid can round a tiny negative input up to exactly TAU.
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Normalize a relative angle to `(-PI, PI]`.
///
/// Used for turn deltas: the shortest signed rotation from one heading to
/// another.
pub fn normalize_relative_angle(angle: f64) -> f64 {
    let a = normalize_angle(angle);
    if a > std::f64::consts::PI {
        a - TAU
    } else {
        a
    }
}

/// Signed shortest rotation that takes heading `from` onto heading `to`.
pub fn angle_diff(from: f64, to: f64) -> f64 {
    normalize_relative_angle(to - from)
}

/// Whether `angle` lies inside the arc swept clockwise from `start` by
/// `sweep` radians (closed on both ends).
///
/// `sweep` may be negative for a counter-clockwise arc. A sweep of `2*PI`
/// or more covers the whole circle.
pub fn angle_in_arc(angle: f64, start: f64, sweep: f64) -> bool {
    if sweep.abs() >= TAU {
        return true;
    }
    let (start, sweep) = if sweep < 0.0 {
        (normalize_angle(start + sweep), -sweep)
    } else {
        (normalize_angle(start), sweep)
    };
    let rel = normalize_angle(angle - start);
    rel <= sweep
}

/// Clamp `value` into `[-limit, limit]`. `limit` must be non-negative.
pub fn clamp_magnitude(value: f64, limit: f64) -> f64 {
    debug_assert!(limit >= 0.0, "clamp limit must be non-negative: {limit}");
    value.clamp(-limit, limit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The per-tick action a controller requests.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// One robot's requested action for the current tick.
///
/// An `Intent` expresses desires, not guarantees: the resolver clamps every
/// field against the combat rules (turn-rate caps, acceleration limits,
/// bullet power range) before applying it. Out-of-range values are never an
/// error.
///
/// The default value is the no-op intent: no rotation, brake to a stop,
/// hold fire. It is what the scheduler substitutes when a controller times
/// out, faults, or is disabled.
///
/// # Example
///
/// ```
/// use clank_core::Intent;
///
/// let intent = Intent::default()
///     .with_body_turn(0.1)
///     .with_target_velocity(8.0)
///     .with_fire(2.0);
/// assert_eq!(intent.fire_power, Some(2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Intent {
    /// Requested body rotation this tick, radians, positive = clockwise.
    pub body_turn: f64,
    /// Requested gun rotation this tick, radians, relative to the body turn.
    pub gun_turn: f64,
    /// Requested radar rotation this tick, radians, relative to the gun turn.
    pub radar_turn: f64,
    /// Velocity to accelerate/decelerate toward, units per tick.
    pub target_velocity: f64,
    /// Fire a bullet of this power at the current gun heading, if the gun
    /// is cool and energy allows.
    pub fire_power: Option<f64>,
    /// Sweep the radar over its rotation arc this tick and report robots
    /// seen. With no radar rotation the arc is degenerate: only a target
    /// exactly on the radar heading is reported, so a useful scan keeps the
    /// radar moving.
    pub scan: bool,
}

impl Intent {
    /// The substitute intent for a robot that produced nothing this tick.
    pub fn no_op() -> Self {
        Self::default()
    }

    pub fn with_body_turn(mut self, radians: f64) -> Self {
        self.body_turn = radians;
        self
    }

    pub fn with_gun_turn(mut self, radians: f64) -> Self {
        self.gun_turn = radians;
        self
    }

    pub fn with_radar_turn(mut self, radians: f64) -> Self {
        self.radar_turn = radians;
        self
    }

    pub fn with_target_velocity(mut self, velocity: f64) -> Self {
        self.target_velocity = velocity;
        self
    }

    pub fn with_fire(mut self, power: f64) -> Self {
        self.fire_power = Some(power);
        self
    }

    pub fn with_scan(mut self) -> Self {
        self.scan = true;
        self
    }
}

//! Combat rules: movement caps, bullet arithmetic, gun heat.
//!
//! These constants and formulas define the physics the resolver enforces.
//! Distances are in arena units (pixels), angles in radians, one tick is the
//! time unit. Controllers may request anything; the resolver clamps requests
//! against these caps rather than rejecting them.

/// Maximum robot speed in units per tick.
pub const MAX_VELOCITY: f64 = 8.0;

/// Velocity gain per tick when speeding up.
pub const ACCELERATION: f64 = 1.0;

/// Velocity loss per tick when slowing down or reversing.
pub const DECELERATION: f64 = 2.0;

/// Gun rotation cap per tick.
pub const MAX_GUN_TURN_RATE: f64 = 20.0 * DEG;

/// Radar rotation cap per tick.
pub const MAX_RADAR_TURN_RATE: f64 = 45.0 * DEG;

/// Lowest bullet power a gun can fire.
pub const MIN_BULLET_POWER: f64 = 0.1;

/// Highest bullet power a gun can fire.
pub const MAX_BULLET_POWER: f64 = 3.0;

/// Side length of a robot's square bounding box.
pub const ROBOT_SIZE: f64 = 36.0;

/// Maximum radar scan distance.
pub const SCAN_RADIUS: f64 = 1200.0;

/// Energy lost by each participant of a robot-robot ram, per tick of contact.
pub const RAM_DAMAGE: f64 = 0.6;

/// Gun heat dissipated per tick.
pub const GUN_COOLING_RATE: f64 = 0.1;

/// Gun heat at round start; no robot can fire before it cools.
pub const INITIAL_GUN_HEAT: f64 = 3.0;

/// Default per-robot energy at round start.
pub const DEFAULT_START_ENERGY: f64 = 100.0;

const DEG: f64 = std::f64::consts::PI / 180.0;

/// Body rotation cap for a robot moving at `velocity`: a faster hull turns
/// slower, `10deg - 0.75deg * |v|` per tick.
pub fn max_body_turn_rate(velocity: f64) -> f64 {
    (10.0 - 0.75 * velocity.abs()) * DEG
}

/// Bullet travel distance per tick: `20 - 3 * power`.
///
/// Low-power bullets are fast (19.7 at power 0.1), full-power bullets are
/// slow (11.0 at power 3.0).
pub fn bullet_speed(power: f64) -> f64 {
    20.0 - 3.0 * power
}

/// Energy a bullet of the given power removes from its victim:
/// `4 * power`, plus `2 * (power - 1)` for power above 1.
pub fn bullet_damage(power: f64) -> f64 {
    4.0 * power + 2.0 * (power - 1.0).max(0.0)
}

/// Energy returned to the firer when its bullet connects: `3 * power`.
pub fn hit_energy_reward(power: f64) -> f64 {
    3.0 * power
}

/// Energy lost when hitting a wall at `velocity`: `max(|v| / 2 - 1, 0)`.
///
/// Gentle contact (|v| <= 2) is free.
pub fn wall_damage(velocity: f64) -> f64 {
    (velocity.abs() / 2.0 - 1.0).max(0.0)
}

/// Gun heat generated by firing at `power`: `1 + power / 5`.
pub fn gun_heat_after_fire(power: f64) -> f64 {
    1.0 + power / 5.0
}

/// Clamp a requested fire power into the legal range, further capped by the
/// firer's remaining energy. Returns `None` if the robot cannot afford even
/// the minimum power.
pub fn clamp_bullet_power(requested: f64, energy: f64) -> Option<f64> {
    if !requested.is_finite() || energy < MIN_BULLET_POWER {
        return None;
    }
    Some(requested.clamp(MIN_BULLET_POWER, MAX_BULLET_POWER).min(energy))
}

/// Advance a robot's velocity one tick toward `target`.
///
/// The target is first clamped into `[-MAX_VELOCITY, MAX_VELOCITY]`. Speeding
/// up is limited to [`ACCELERATION`] per tick; slowing down (or reversing
/// through zero) is limited to [`DECELERATION`] per tick. The result never
/// overshoots the target.
pub fn next_velocity(current: f64, target: f64) -> f64 {
    let target = if target.is_finite() {
        target.clamp(-MAX_VELOCITY, MAX_VELOCITY)
    } else {
        0.0
    };
    let diff = target - current;
    if diff == 0.0 {
        return current;
    }
    let dir = diff.signum();
    // Moving the velocity in the same direction it already points grows its
    // magnitude (acceleration); the opposite shrinks it (deceleration).
    let step = if current == 0.0 || current.signum() == dir {
        ACCELERATION
    } else {
        DECELERATION
    };
    if diff.abs() <= step {
        target
    } else {
        current + dir * step
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    // -- 1. Bullet arithmetic ------------------------------------------------

    #[test]
    fn bullet_speed_endpoints() {
        assert!((bullet_speed(MIN_BULLET_POWER) - 19.7).abs() < EPS);
        assert!((bullet_speed(MAX_BULLET_POWER) - 11.0).abs() < EPS);
    }

    #[test]
    fn bullet_damage_low_power_is_linear() {
        assert!((bullet_damage(0.5) - 2.0).abs() < EPS);
        assert!((bullet_damage(1.0) - 4.0).abs() < EPS);
    }

    #[test]
    fn bullet_damage_high_power_gets_bonus() {
        // 4 * 3 + 2 * 2 = 16.
        assert!((bullet_damage(3.0) - 16.0).abs() < EPS);
        // 4 * 2 + 2 * 1 = 10.
        assert!((bullet_damage(2.0) - 10.0).abs() < EPS);
    }

    #[test]
    fn hit_reward_is_three_power() {
        assert!((hit_energy_reward(2.0) - 6.0).abs() < EPS);
    }

    // -- 2. Power clamping ---------------------------------------------------

    #[test]
    fn power_clamped_into_legal_range() {
        assert_eq!(clamp_bullet_power(99.0, 100.0), Some(MAX_BULLET_POWER));
        assert_eq!(clamp_bullet_power(0.0, 100.0), Some(MIN_BULLET_POWER));
        assert_eq!(clamp_bullet_power(1.5, 100.0), Some(1.5));
    }

    #[test]
    fn power_capped_by_remaining_energy() {
        assert_eq!(clamp_bullet_power(3.0, 1.2), Some(1.2));
        assert_eq!(clamp_bullet_power(3.0, 0.05), None);
        assert_eq!(clamp_bullet_power(f64::NAN, 100.0), None);
    }

    // -- 3. Wall damage ------------------------------------------------------

    #[test]
    fn slow_wall_contact_is_free() {
        assert_eq!(wall_damage(2.0), 0.0);
        assert_eq!(wall_damage(-1.0), 0.0);
    }

    #[test]
    fn fast_wall_contact_hurts() {
        assert!((wall_damage(8.0) - 3.0).abs() < EPS);
        assert!((wall_damage(-8.0) - 3.0).abs() < EPS);
    }

    // -- 4. Turn rate --------------------------------------------------------

    #[test]
    fn body_turn_rate_shrinks_with_speed() {
        assert!(max_body_turn_rate(0.0) > max_body_turn_rate(4.0));
        assert!(max_body_turn_rate(4.0) > max_body_turn_rate(8.0));
        // At max speed: 10 - 0.75 * 8 = 4 degrees.
        assert!((max_body_turn_rate(8.0) - 4.0_f64.to_radians()).abs() < EPS);
    }

    // -- 5. Velocity integration ---------------------------------------------

    #[test]
    fn accelerates_by_one_per_tick() {
        assert!((next_velocity(0.0, 8.0) - 1.0).abs() < EPS);
        assert!((next_velocity(1.0, 8.0) - 2.0).abs() < EPS);
        assert!((next_velocity(0.0, -8.0) - (-1.0)).abs() < EPS);
    }

    #[test]
    fn decelerates_by_two_per_tick() {
        assert!((next_velocity(8.0, 0.0) - 6.0).abs() < EPS);
        assert!((next_velocity(-8.0, 0.0) - (-6.0)).abs() < EPS);
        // Reversing direction also decelerates first.
        assert!((next_velocity(3.0, -8.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn never_overshoots_target() {
        assert_eq!(next_velocity(7.5, 8.0), 8.0);
        assert_eq!(next_velocity(1.0, 0.0), 0.0);
        assert_eq!(next_velocity(5.0, 5.0), 5.0);
    }

    #[test]
    fn target_clamped_to_max() {
        let mut v = 0.0;
        for _ in 0..100 {
            v = next_velocity(v, 1e9);
        }
        assert_eq!(v, MAX_VELOCITY);
    }

    #[test]
    fn non_finite_target_brakes() {
        // NaN and infinities are treated as "stop".
        assert!((next_velocity(8.0, f64::NAN) - 6.0).abs() < EPS);
        assert!((next_velocity(8.0, f64::INFINITY) - 6.0).abs() < EPS);
        assert!((next_velocity(1.0, f64::NEG_INFINITY) - 0.0).abs() < EPS);
    }
}

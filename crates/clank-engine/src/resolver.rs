//! Tick resolution: apply collected intents and resolve all interactions in
//! a fixed priority order.
//!
//! The resolver is a pure function of battle state and the intent vector --
//! no clocks, no randomness -- which is what makes replays byte-identical.
//! Each tick runs these phases, always in this order:
//!
//! 1. Movement: gun cooling, clamped rotations, velocity integration,
//!    translation, wall clamping (with wall damage).
//! 2. Bullet advancement along each bullet's heading.
//! 3. Bullet-robot hits (bullet order, then robot order).
//! 4. Bullet-bullet annihilation.
//! 5. Bullets leaving the arena.
//! 6. Robot-robot rams.
//! 7. Deaths, kill credit, and survival scoring.
//! 8. Radar scans against the post-resolution world.
//! 9. Gun fire; new bullets first move next tick.
//!
//! Out-of-range intent fields are clamped, never rejected: a controller
//! cannot construct an invalid action.

use clank_core::rules::{self, ROBOT_SIZE, SCAN_RADIUS};
use clank_core::{EnergyCause, Intent, RobotEvent, RobotId};
use clank_geom::{clamp_magnitude, normalize_angle, segments_intersect, Vec2};

use crate::state::BattleState;

const HALF_ROBOT: f64 = ROBOT_SIZE / 2.0;

/// Resolve one tick. `intents` must be index-aligned with the state's
/// robots: `None` for dead robots, `Some` for the rest (the scheduler
/// guarantees this shape).
pub fn resolve_tick(state: &mut BattleState, intents: &[Option<Intent>]) {
    let tick = state.advance_tick();
    tracing::trace!(round = state.round(), tick, "resolving tick");

    let no_op = Intent::no_op();
    let n = state.robots().len();

    // Phase 1: movement. Remembers each robot's radar sweep for phase 8.
    let mut radar_sweeps: Vec<Option<(f64, f64)>> = vec![None; n];
    for index in 0..n {
        if !state.robots()[index].alive {
            continue;
        }
        let intent = intents[index].as_ref().unwrap_or(&no_op);

        let (wall_hit, wall_damage) = {
            let arena = state.arena();
            let robot = &mut state.robots_mut()[index];

            robot.gun_heat = (robot.gun_heat - rules::GUN_COOLING_RATE).max(0.0);

            let body_turn =
                clamp_magnitude(finite_or_zero(intent.body_turn), rules::max_body_turn_rate(robot.velocity));
            let gun_turn =
                clamp_magnitude(finite_or_zero(intent.gun_turn), rules::MAX_GUN_TURN_RATE);
            let radar_turn =
                clamp_magnitude(finite_or_zero(intent.radar_turn), rules::MAX_RADAR_TURN_RATE);

            // Gun and radar ride on the body: their mounts inherit the body
            // turn, and the radar additionally inherits the gun turn.
            let radar_start = robot.radar_heading;
            let radar_sweep = body_turn + gun_turn + radar_turn;
            robot.body_heading = normalize_angle(robot.body_heading + body_turn);
            robot.gun_heading = normalize_angle(robot.gun_heading + body_turn + gun_turn);
            robot.radar_heading = normalize_angle(radar_start + radar_sweep);
            radar_sweeps[index] = Some((radar_start, radar_sweep));

            robot.velocity = rules::next_velocity(robot.velocity, intent.target_velocity);
            robot.position = robot.position + Vec2::from_heading(robot.body_heading) * robot.velocity;

            // Keep the hull inside the arena; a clamp is a wall hit.
            let clamped = Vec2::new(
                robot
                    .position
                    .x
                    .clamp(arena.min.x + HALF_ROBOT, arena.max.x - HALF_ROBOT),
                robot
                    .position
                    .y
                    .clamp(arena.min.y + HALF_ROBOT, arena.max.y - HALF_ROBOT),
            );
            if clamped != robot.position {
                robot.position = clamped;
                let damage = rules::wall_damage(robot.velocity);
                robot.velocity = 0.0;
                (true, damage)
            } else {
                (false, 0.0)
            }
        };

        if wall_hit {
            let id = RobotId(index);
            let applied = state.apply_energy(id, -wall_damage, EnergyCause::WallDamage);
            state.push_event(id, RobotEvent::HitWall { damage: -applied });
        }
    }

    // Phase 2: advance bullets, keeping each one's travel segment.
    let mut segments: Vec<(Vec2, Vec2)> = Vec::with_capacity(state.bullets().len());
    for bullet in state.bullets_mut() {
        let from = bullet.position;
        bullet.position = from + Vec2::from_heading(bullet.heading) * bullet.velocity;
        segments.push((from, bullet.position));
    }

    // Phase 3: bullet-robot hits. A bullet hits at most one robot; ties on
    // the same segment go to the lower robot index.
    for bi in 0..state.bullets().len() {
        if !state.bullets()[bi].active {
            continue;
        }
        let (owner, power) = (state.bullets()[bi].owner, state.bullets()[bi].power);
        let (from, to) = segments[bi];

        for vi in 0..n {
            let victim = &state.robots()[vi];
            if vi == owner.index() || !victim.alive {
                continue;
            }
            if !victim.bounding_box().intersects_segment(from, to) {
                continue;
            }

            let victim_id = RobotId(vi);
            let applied = state.apply_energy(
                victim_id,
                -rules::bullet_damage(power),
                EnergyCause::BulletDamage { from: owner },
            );
            let damage = -applied;
            if state.robots()[owner.index()].alive {
                state.apply_energy(
                    owner,
                    rules::hit_energy_reward(power),
                    EnergyCause::HitReward { victim: victim_id },
                );
            }

            {
                let shooter = &mut state.robots_mut()[owner.index()];
                shooter.stats.bullet_damage_dealt += damage;
                shooter.stats.bullet_damage_to[vi] += damage;
            }
            {
                let victim = &mut state.robots_mut()[vi];
                victim.stats.bullet_damage_taken += damage;
                // Zero-damage hits (the victim was already drained this
                // tick) do not take over the kill credit.
                if damage > 0.0 {
                    victim.last_damaged_by = Some(owner);
                }
            }

            state.push_event(
                victim_id,
                RobotEvent::HitByBullet {
                    owner,
                    power,
                    damage,
                },
            );
            state.push_event(
                owner,
                RobotEvent::BulletHit {
                    victim: victim_id,
                    damage,
                },
            );

            state.bullets_mut()[bi].active = false;
            break;
        }
    }

    // Phase 4: bullets annihilating each other mid-flight.
    for i in 0..state.bullets().len() {
        for j in (i + 1)..state.bullets().len() {
            if !state.bullets()[i].active || !state.bullets()[j].active {
                continue;
            }
            let (a1, a2) = segments[i];
            let (b1, b2) = segments[j];
            if !segments_intersect(a1, a2, b1, b2) {
                continue;
            }
            let owner_i = state.bullets()[i].owner;
            let owner_j = state.bullets()[j].owner;
            state.bullets_mut()[i].active = false;
            state.bullets_mut()[j].active = false;
            state.push_event(owner_i, RobotEvent::BulletHitBullet { other_owner: owner_j });
            state.push_event(owner_j, RobotEvent::BulletHitBullet { other_owner: owner_i });
        }
    }

    // Phase 5: bullets leaving the arena.
    for bi in 0..state.bullets().len() {
        let bullet = &state.bullets()[bi];
        if bullet.active && !state.arena().contains(bullet.position) {
            let owner = bullet.owner;
            state.bullets_mut()[bi].active = false;
            state.push_event(owner, RobotEvent::BulletMissed);
        }
    }

    // Phase 6: robot-robot rams. Contact costs both sides while either is
    // still moving; two stationary overlapping hulls just sit there.
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&state.robots()[i], &state.robots()[j]);
            if !a.alive || !b.alive {
                continue;
            }
            if a.velocity == 0.0 && b.velocity == 0.0 {
                continue;
            }
            if !a.bounding_box().intersects(&b.bounding_box()) {
                continue;
            }

            let (id_a, id_b) = (RobotId(i), RobotId(j));
            let applied_a =
                state.apply_energy(id_a, -rules::RAM_DAMAGE, EnergyCause::RamDamage { other: id_b });
            let applied_b =
                state.apply_energy(id_b, -rules::RAM_DAMAGE, EnergyCause::RamDamage { other: id_a });
            let (taken_a, taken_b) = (-applied_a, -applied_b);

            {
                let a = &mut state.robots_mut()[i];
                a.velocity = 0.0;
                if taken_a > 0.0 {
                    a.last_damaged_by = Some(id_b);
                }
                a.stats.ram_damage_dealt += taken_b;
                a.stats.ram_damage_to[j] += taken_b;
            }
            {
                let b = &mut state.robots_mut()[j];
                b.velocity = 0.0;
                if taken_b > 0.0 {
                    b.last_damaged_by = Some(id_a);
                }
                b.stats.ram_damage_dealt += taken_a;
                b.stats.ram_damage_to[i] += taken_a;
            }

            state.push_event(id_a, RobotEvent::HitRobot { other: id_b, damage: taken_a });
            state.push_event(id_b, RobotEvent::HitRobot { other: id_a, damage: taken_b });
        }
    }

    // Phase 7: deaths. Kill credit goes to the last damager, even if that
    // robot died in the same tick (mutual destruction credits both).
    let dead: Vec<usize> = state
        .robots()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.alive && r.energy <= 0.0)
        .map(|(i, _)| i)
        .collect();
    for &vi in &dead {
        let robot = &mut state.robots_mut()[vi];
        robot.alive = false;
        robot.energy = 0.0;
        robot.velocity = 0.0;
        robot.pending_events.clear();
        tracing::debug!(robot = %RobotId(vi), tick, "robot destroyed");
    }
    for &vi in &dead {
        let victim_id = RobotId(vi);
        if let Some(killer) = state.robots()[vi].last_damaged_by {
            let stats = &mut state.robots_mut()[killer.index()].stats;
            stats.bullet_kill_bonus += 0.2 * stats.bullet_damage_to[vi];
            stats.ram_kill_bonus += 0.3 * (2.0 * stats.ram_damage_to[vi]);
        }
        for si in 0..n {
            if si == vi {
                continue;
            }
            if state.robots()[si].alive {
                state.robots_mut()[si].stats.survival += 50.0;
            }
            // push_event drops deliveries to robots that died this tick.
            state.push_event(RobotId(si), RobotEvent::RobotDeath { robot: victim_id });
        }
    }

    // Phase 8: radar scans, against the world as it stands after deaths. The
    // scan sector is the arc the radar swept this tick.
    for index in 0..n {
        let Some(intent) = intents[index].as_ref() else {
            continue;
        };
        if !intent.scan || !state.robots()[index].alive {
            continue;
        }
        let Some((start, sweep)) = radar_sweeps[index] else {
            continue;
        };
        let scanner_pos = state.robots()[index].position;
        for other in 0..n {
            let target = &state.robots()[other];
            if other == index || !target.alive {
                continue;
            }
            let distance = scanner_pos.distance_to(target.position);
            let bearing = scanner_pos.heading_to(target.position);
            if distance > SCAN_RADIUS || !clank_geom::angle_in_arc(bearing, start, sweep) {
                continue;
            }
            let event = RobotEvent::ScannedRobot {
                robot: target.id,
                bearing,
                distance,
                energy: target.energy,
                heading: target.body_heading,
                velocity: target.velocity,
            };
            state.push_event(RobotId(index), event);
        }
    }

    state.sweep_bullets();

    // Phase 9: fire. A hot gun or an unaffordable shot is silently skipped;
    // a robot cannot destroy itself by firing.
    for index in 0..n {
        let Some(intent) = intents[index].as_ref() else {
            continue;
        };
        let Some(requested) = intent.fire_power else {
            continue;
        };
        let robot = &state.robots()[index];
        if !robot.alive || robot.gun_heat > 0.0 {
            continue;
        }
        let Some(power) = rules::clamp_bullet_power(requested, robot.energy) else {
            continue;
        };
        if robot.energy - power <= 0.0 {
            continue;
        }
        let (position, heading) = (robot.position, robot.gun_heading);
        let id = RobotId(index);
        state.apply_energy(id, -power, EnergyCause::FireCost { power });
        state.robots_mut()[index].gun_heat += rules::gun_heat_after_fire(power);
        state.spawn_bullet(id, position, heading, power);
        tracing::trace!(robot = %id, power, tick, "bullet fired");
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Authoritative battle state and immutable snapshot publication.
//!
//! Exactly one [`BattleState`] exists per in-progress round. It is owned and
//! mutated only by the simulation thread (the resolver during tick
//! resolution, the round manager between rounds); controllers and external
//! consumers only ever see the [`TickSnapshot`]s it publishes. A snapshot is
//! deep-copied into an `Arc` and never aliases a mutable field, so readers
//! can never observe a half-updated tick.
//!
//! Every energy mutation flows through [`BattleState::apply_energy`], which
//! records the delta in the [`EnergyLedger`] -- the audit trail backing the
//! conservation invariant that [`BattleState::verify_invariants`] checks
//! after every tick.

use std::sync::Arc;

use clank_core::rules::{self, ROBOT_SIZE};
use clank_core::{
    BulletId, BulletStatus, EnergyCause, EnergyEvent, EnergyLedger, RobotEvent, RobotId,
    RobotStatus, TickSnapshot,
};
use clank_geom::{BoundingBox, Vec2};

use crate::EngineError;

// ---------------------------------------------------------------------------
// RoundStats
// ---------------------------------------------------------------------------

/// Per-robot scoring statistics accumulated during one round.
///
/// `bullet_damage_to` / `ram_damage_to` are indexed by victim id; the kill
/// bonus a killer earns is a percentage of the damage it personally dealt to
/// that victim.
#[derive(Debug, Clone, Default)]
pub struct RoundStats {
    pub survival: f64,
    pub last_survivor_bonus: f64,
    pub bullet_damage_dealt: f64,
    pub bullet_damage_taken: f64,
    pub bullet_kill_bonus: f64,
    pub ram_damage_dealt: f64,
    pub ram_kill_bonus: f64,
    pub bullet_damage_to: Vec<f64>,
    pub ram_damage_to: Vec<f64>,
}

impl RoundStats {
    fn new(robot_count: usize) -> Self {
        Self {
            bullet_damage_to: vec![0.0; robot_count],
            ram_damage_to: vec![0.0; robot_count],
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// RobotState
// ---------------------------------------------------------------------------

/// Authoritative state of one robot. Engine-internal; the public projection
/// is [`RobotStatus`].
#[derive(Debug, Clone)]
pub struct RobotState {
    pub id: RobotId,
    pub name: String,
    pub position: Vec2,
    pub body_heading: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
    pub velocity: f64,
    pub energy: f64,
    pub gun_heat: f64,
    pub alive: bool,
    /// Mirrored from the robot's execution slot each tick.
    pub disabled: bool,
    /// The last robot to damage this one; holds the kill credit if this
    /// robot dies. May name a robot that has itself died since.
    pub last_damaged_by: Option<RobotId>,
    /// Events accumulated since this robot's last turn.
    pub pending_events: Vec<RobotEvent>,
    pub stats: RoundStats,
}

impl RobotState {
    /// The robot's square bounding box at its current position.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::centered(self.position, ROBOT_SIZE, ROBOT_SIZE)
    }

    /// Public projection for snapshots.
    fn status(&self) -> RobotStatus {
        RobotStatus {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            body_heading: self.body_heading,
            gun_heading: self.gun_heading,
            radar_heading: self.radar_heading,
            velocity: self.velocity,
            energy: self.energy,
            gun_heat: self.gun_heat,
            alive: self.alive,
            disabled: self.disabled,
        }
    }
}

// ---------------------------------------------------------------------------
// Bullet
// ---------------------------------------------------------------------------

/// An in-flight bullet. The owner id is a weak reference: the owner may die
/// while the bullet is still flying.
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: BulletId,
    pub owner: RobotId,
    pub position: Vec2,
    pub heading: f64,
    pub power: f64,
    /// Travel distance per tick, fixed at fire time.
    pub velocity: f64,
    pub active: bool,
}

impl Bullet {
    fn status(&self) -> BulletStatus {
        BulletStatus {
            id: self.id,
            owner: self.owner,
            position: self.position,
            heading: self.heading,
            power: self.power,
        }
    }
}

// ---------------------------------------------------------------------------
// RobotSpawn
// ---------------------------------------------------------------------------

/// Initial placement of one robot at round start.
#[derive(Debug, Clone)]
pub struct RobotSpawn {
    pub name: String,
    pub position: Vec2,
    pub heading: f64,
}

// ---------------------------------------------------------------------------
// BattleState
// ---------------------------------------------------------------------------

/// The single authoritative mutable store for one round.
#[derive(Debug)]
pub struct BattleState {
    round: u32,
    tick: u64,
    arena: BoundingBox,
    robots: Vec<RobotState>,
    bullets: Vec<Bullet>,
    next_bullet_id: u64,
    ledger: EnergyLedger,
    initial_energy_total: f64,
}

impl BattleState {
    /// Set up round `round` with the given placements. Guns start hot so
    /// nobody fires before [`rules::INITIAL_GUN_HEAT`] cools off.
    pub fn new(round: u32, arena: BoundingBox, spawns: Vec<RobotSpawn>, start_energy: f64) -> Self {
        let robot_count = spawns.len();
        let robots: Vec<RobotState> = spawns
            .into_iter()
            .enumerate()
            .map(|(index, spawn)| RobotState {
                id: RobotId(index),
                name: spawn.name,
                position: spawn.position,
                body_heading: spawn.heading,
                gun_heading: spawn.heading,
                radar_heading: spawn.heading,
                velocity: 0.0,
                energy: start_energy,
                gun_heat: rules::INITIAL_GUN_HEAT,
                alive: true,
                disabled: false,
                last_damaged_by: None,
                pending_events: Vec::new(),
                stats: RoundStats::new(robot_count),
            })
            .collect();

        let initial_energy_total = start_energy * robots.len() as f64;

        Self {
            round,
            tick: 0,
            arena,
            robots,
            bullets: Vec::new(),
            next_bullet_id: 0,
            ledger: EnergyLedger::new(),
            initial_energy_total,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn arena(&self) -> BoundingBox {
        self.arena
    }

    pub fn robots(&self) -> &[RobotState] {
        &self.robots
    }

    pub fn robots_mut(&mut self) -> &mut [RobotState] {
        &mut self.robots
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut [Bullet] {
        &mut self.bullets
    }

    pub fn ledger(&self) -> &EnergyLedger {
        &self.ledger
    }

    pub fn alive_count(&self) -> usize {
        self.robots.iter().filter(|r| r.alive).count()
    }

    /// Sum of all robots' current energy.
    pub fn total_energy(&self) -> f64 {
        self.robots.iter().map(|r| r.energy).sum()
    }

    pub fn initial_energy_total(&self) -> f64 {
        self.initial_energy_total
    }

    // -- mutation (simulation thread only) ----------------------------------

    /// Advance the tick counter; called once per tick by the resolver.
    pub(crate) fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Apply a signed energy delta to a robot and record it in the ledger.
    ///
    /// Damage that would take the robot below zero is capped so energy
    /// bottoms out at exactly zero (the death threshold); the ledger records
    /// the delta actually applied, which is also returned (callers score
    /// inflicted damage by it).
    pub(crate) fn apply_energy(&mut self, robot: RobotId, delta: f64, cause: EnergyCause) -> f64 {
        let tick = self.tick;
        let state = &mut self.robots[robot.index()];
        let applied = if state.energy + delta < 0.0 {
            -state.energy
        } else {
            delta
        };
        state.energy += applied;
        self.ledger.record(EnergyEvent {
            tick,
            robot,
            delta: applied,
            cause,
        });
        applied
    }

    /// Instantiate a validated bullet. Ids are sequential in fire order.
    pub(crate) fn spawn_bullet(&mut self, owner: RobotId, position: Vec2, heading: f64, power: f64) {
        let id = BulletId(self.next_bullet_id);
        self.next_bullet_id += 1;
        self.bullets.push(Bullet {
            id,
            owner,
            position,
            heading,
            power,
            velocity: rules::bullet_speed(power),
            active: true,
        });
    }

    /// Drop bullets that hit something or left the arena this tick.
    pub(crate) fn sweep_bullets(&mut self) {
        self.bullets.retain(|b| b.active);
    }

    /// Queue an event for delivery on the robot's next turn. Events for dead
    /// robots are dropped: a dead robot takes no further turns.
    pub(crate) fn push_event(&mut self, robot: RobotId, event: RobotEvent) {
        let state = &mut self.robots[robot.index()];
        if state.alive {
            state.pending_events.push(event);
        }
    }

    /// Take the robot's pending events, sorted into delivery order.
    pub(crate) fn drain_events(&mut self, robot: RobotId) -> Vec<RobotEvent> {
        let mut events = std::mem::take(&mut self.robots[robot.index()].pending_events);
        clank_core::event::sort_events(&mut events);
        events
    }

    // -- snapshot publication ------------------------------------------------

    /// Deep-copy the resolved state into an immutable snapshot.
    ///
    /// Call only after a tick is fully resolved (or at round start, for
    /// tick 0): snapshot `N` must reflect every applied intent of tick `N`.
    pub fn publish_snapshot(&self) -> Arc<TickSnapshot> {
        Arc::new(TickSnapshot {
            round: self.round,
            tick: self.tick,
            robots: self.robots.iter().map(RobotState::status).collect(),
            bullets: self.bullets.iter().map(Bullet::status).collect(),
        })
    }

    // -- invariants ----------------------------------------------------------

    /// Post-tick consistency checks.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvariantViolation`] with diagnostic detail; the round
    /// manager aborts the round on any of these.
    pub fn verify_invariants(&self) -> Result<(), EngineError> {
        for (index, robot) in self.robots.iter().enumerate() {
            if robot.id.index() != index {
                return Err(EngineError::InvariantViolation(format!(
                    "{} stored at index {index}",
                    robot.id
                )));
            }
            if !robot.energy.is_finite() || robot.energy < 0.0 {
                return Err(EngineError::InvariantViolation(format!(
                    "{} has energy {}",
                    robot.id, robot.energy
                )));
            }
            if robot.alive {
                if robot.energy == 0.0 {
                    return Err(EngineError::InvariantViolation(format!(
                        "{} is alive at zero energy",
                        robot.id
                    )));
                }
                if !robot.bounding_box().contained_in(&self.arena) {
                    return Err(EngineError::InvariantViolation(format!(
                        "{} is outside the arena at {:?}",
                        robot.id, robot.position
                    )));
                }
            } else if robot.energy != 0.0 || robot.velocity != 0.0 {
                return Err(EngineError::InvariantViolation(format!(
                    "dead {} retains energy {} / velocity {}",
                    robot.id, robot.energy, robot.velocity
                )));
            }
        }

        // Conservation: current total == initial total + every ledger delta.
        let expected = self.initial_energy_total + self.ledger.total_delta();
        let actual = self.total_energy();
        if (expected - actual).abs() > 1e-6 {
            return Err(EngineError::InvariantViolation(format!(
                "energy not conserved: ledger expects {expected}, state holds {actual}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The battle lifecycle: rounds, placement, scoring, snapshot broadcast.
//!
//! A battle walks a strict phase machine:
//!
//! ```text
//! Idle -> RoundStarting -> TickLoop -> RoundEnding
//!              ^                           |
//!              +--------- next round ------+
//!                                          v
//!                                   BattleComplete
//! ```
//!
//! `RoundStarting` resets every robot to full energy and a hot gun and
//! places it at a seeded-random non-overlapping position. `TickLoop` runs
//! schedule/resolve/publish until one robot (or none, on a mutual kill)
//! remains or the turn limit trips. `RoundEnding` freezes the round's
//! scores. After the last round the aggregated [`BattleResult`] is final.
//!
//! All randomness in a battle -- placement positions and starting headings
//! -- comes from a single PCG stream seeded by
//! [`BattleConfig::seed`], so a battle is replayed exactly by reusing the
//! config.

use std::f64::consts::TAU;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use clank_core::rules::ROBOT_SIZE;
use clank_core::{
    BattleConfig, BattleResult, RobotId, RobotScore, RoundEndReason, RoundResult, TickSnapshot,
};
use clank_geom::{BoundingBox, Vec2};
use clank_slot::{RobotController, SlotConfig};

use crate::resolver::resolve_tick;
use crate::scheduler::TurnScheduler;
use crate::state::{BattleState, RobotSpawn};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the battle currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet running.
    Idle,
    /// Resetting robots and placing them for the next round.
    RoundStarting,
    /// Ticking.
    TickLoop,
    /// Computing the round's scores.
    RoundEnding,
    /// All rounds done; the result is final.
    BattleComplete,
}

// ---------------------------------------------------------------------------
// BattleRunner
// ---------------------------------------------------------------------------

/// Owns the scheduler, the RNG, and the snapshot subscribers for one battle.
///
/// Consumed by [`run`](BattleRunner::run); a runner cannot be reused, which
/// is what makes a completed battle's result immutable.
pub struct BattleRunner {
    config: BattleConfig,
    names: Vec<String>,
    scheduler: TurnScheduler,
    rng: Pcg64Mcg,
    phase: Phase,
    subscribers: Vec<Sender<Arc<TickSnapshot>>>,
}

impl BattleRunner {
    /// Validate the configuration and spawn one execution slot per
    /// controller.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] on a bad configuration (checked before any
    /// thread is spawned), [`EngineError::Slot`] if a worker fails to spawn.
    pub fn new(
        config: BattleConfig,
        controllers: Vec<Box<dyn RobotController>>,
    ) -> Result<Self, EngineError> {
        config.validate(controllers.len())?;
        let names: Vec<String> = controllers.iter().map(|c| c.name().to_owned()).collect();
        let slot_config = SlotConfig {
            tick_budget: config.tick_budget,
            max_violations: config.max_violations,
        };
        let scheduler = TurnScheduler::new(controllers, slot_config)?;
        let rng = Pcg64Mcg::seed_from_u64(config.seed);
        tracing::info!(robots = names.len(), rounds = config.rounds, seed = config.seed, "battle set up");
        Ok(Self {
            config,
            names,
            scheduler,
            rng,
            phase: Phase::Idle,
            subscribers: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Subscribe to the snapshot stream: tick 0 of each round, then one
    /// snapshot per resolved tick. Dropping the receiver unsubscribes;
    /// subscribers never block the simulation.
    pub fn subscribe(&mut self) -> Receiver<Arc<TickSnapshot>> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn broadcast(&mut self, snapshot: &Arc<TickSnapshot>) {
        self.subscribers.retain(|tx| tx.send(Arc::clone(snapshot)).is_ok());
    }

    fn arena(&self) -> BoundingBox {
        BoundingBox::new(
            Vec2::ZERO,
            Vec2::new(self.config.arena_width, self.config.arena_height),
        )
    }

    /// Seeded rejection sampling: uniform positions, redrawn until the new
    /// hull overlaps nobody already placed. Config validation guarantees the
    /// arena has room, so this terminates.
    fn place_robots(&mut self) -> Vec<RobotSpawn> {
        let half = ROBOT_SIZE / 2.0;
        let (w, h) = (self.config.arena_width, self.config.arena_height);
        let mut boxes: Vec<BoundingBox> = Vec::with_capacity(self.names.len());
        let mut spawns = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let position = loop {
                let candidate = Vec2::new(
                    self.rng.gen_range(half..=w - half),
                    self.rng.gen_range(half..=h - half),
                );
                let hull = BoundingBox::centered(candidate, ROBOT_SIZE, ROBOT_SIZE);
                if boxes.iter().all(|b| !b.intersects(&hull)) {
                    boxes.push(hull);
                    break candidate;
                }
            };
            spawns.push(RobotSpawn {
                name: name.clone(),
                position,
                heading: self.rng.gen_range(0.0..TAU),
            });
        }
        spawns
    }

    /// Drive the whole battle to completion.
    ///
    /// # Errors
    ///
    /// Only [`EngineError::InvariantViolation`]: controller misbehavior is
    /// contained at the slots, so the sole failure left is an engine bug
    /// caught by the post-tick checks.
    pub fn run(mut self) -> Result<BattleResult, EngineError> {
        let arena = self.arena();
        let mut rounds = Vec::with_capacity(self.config.rounds as usize);
        let mut totals: Vec<RobotScore> = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| RobotScore::new(RobotId(i), name))
            .collect();

        for round in 1..=self.config.rounds {
            self.phase = Phase::RoundStarting;
            let spawns = self.place_robots();
            let mut state = BattleState::new(round, arena, spawns, self.config.start_energy);
            self.scheduler.reset_for_round(round);
            let mut snapshot = state.publish_snapshot();
            self.broadcast(&snapshot);

            self.phase = Phase::TickLoop;
            let end_reason = loop {
                match state.alive_count() {
                    0 => break RoundEndReason::AllDestroyed,
                    1 => break RoundEndReason::LastRobotStanding,
                    _ => {}
                }
                if state.tick() >= self.config.max_turns {
                    break RoundEndReason::TurnLimit;
                }
                let intents = self.scheduler.collect_intents(&mut state, &snapshot);
                resolve_tick(&mut state, &intents);
                state.verify_invariants()?;
                snapshot = state.publish_snapshot();
                self.broadcast(&snapshot);
            };

            self.phase = Phase::RoundEnding;
            let result = score_round(&state, &self.names, end_reason);
            tracing::info!(
                round,
                ticks = result.ticks,
                winner = ?result.winner,
                reason = ?result.end_reason,
                "round over"
            );
            for (total, score) in totals.iter_mut().zip(&result.scores) {
                total.accumulate(score);
            }
            rounds.push(result);
        }

        self.phase = Phase::BattleComplete;
        Ok(BattleResult { rounds, totals })
    }
}

// ---------------------------------------------------------------------------
// Round scoring
// ---------------------------------------------------------------------------

/// Freeze one round's scores out of the final battle state.
fn score_round(state: &BattleState, names: &[String], end_reason: RoundEndReason) -> RoundResult {
    let robots = state.robots();
    let mut scores: Vec<RobotScore> = robots
        .iter()
        .enumerate()
        .map(|(i, robot)| {
            let mut score = RobotScore::new(RobotId(i), &names[i]);
            let stats = &robot.stats;
            score.survival = stats.survival;
            score.bullet_damage = stats.bullet_damage_dealt;
            score.bullet_kill_bonus = stats.bullet_kill_bonus;
            score.ram_damage = 2.0 * stats.ram_damage_dealt;
            score.ram_kill_bonus = stats.ram_kill_bonus;
            score.bullet_damage_taken = stats.bullet_damage_taken;
            if robot.alive {
                score.rounds_survived = 1;
            }
            score
        })
        .collect();

    let alive: Vec<usize> = robots
        .iter()
        .enumerate()
        .filter(|(_, r)| r.alive)
        .map(|(i, _)| i)
        .collect();

    if let [survivor] = alive.as_slice() {
        let dead = robots.len() - 1;
        scores[*survivor].last_survivor_bonus = 10.0 * dead as f64;
    }

    let winner = match alive.as_slice() {
        [survivor] => Some(RobotId(*survivor)),
        _ => highest_unique_total(&scores),
    };
    if let Some(w) = winner {
        scores[w.index()].rounds_won = 1;
    }

    RoundResult {
        round: state.round(),
        ticks: state.tick(),
        winner,
        end_reason,
        scores,
    }
}

/// The robot with the strictly highest round total, or `None` on an exact
/// tie at the top.
fn highest_unique_total(scores: &[RobotScore]) -> Option<RobotId> {
    let mut best: Option<(RobotId, f64)> = None;
    let mut tied = false;
    for score in scores {
        let total = score.total();
        match best {
            None => best = Some((score.robot, total)),
            Some((_, top)) if total > top => {
                best = Some((score.robot, total));
                tied = false;
            }
            Some((_, top)) if total == top => tied = true,
            Some(_) => {}
        }
    }
    match best {
        Some((robot, _)) if !tied => Some(robot),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

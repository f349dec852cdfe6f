//! Deterministic turn scheduling across execution slots.
//!
//! Each tick runs in two strict phases: first every eligible robot's tick
//! context is submitted to its slot (workers start computing in parallel),
//! then intents are collected in ascending robot-index order. Arrival order
//! never matters -- a fast controller cannot jump the queue, and a slow one
//! delays only the wait for its own deadline. No intent is applied to shared
//! state until every slot has answered or forfeited, so all controllers
//! decide against the same snapshot.

use std::sync::Arc;

use clank_core::{Intent, TickSnapshot};
use clank_slot::{ExecutionSlot, RobotController, SlotConfig, SlotError, TickContext};

use crate::state::BattleState;
use crate::EngineError;

// ---------------------------------------------------------------------------
// TurnScheduler
// ---------------------------------------------------------------------------

/// Owns one [`ExecutionSlot`] per robot for the duration of a battle.
///
/// Slot index and robot index coincide; dead robots keep their slot (and
/// their index) so intent vectors stay aligned with
/// [`BattleState::robots`](crate::state::BattleState::robots).
#[derive(Debug)]
pub struct TurnScheduler {
    slots: Vec<ExecutionSlot>,
}

impl TurnScheduler {
    /// Spawn a slot per controller, in registration order.
    ///
    /// # Errors
    ///
    /// [`EngineError::Slot`] if any worker thread fails to spawn.
    pub fn new(
        controllers: Vec<Box<dyn RobotController>>,
        config: SlotConfig,
    ) -> Result<Self, EngineError> {
        let slots = controllers
            .into_iter()
            .enumerate()
            .map(|(index, controller)| {
                ExecutionSlot::spawn(clank_core::RobotId(index), controller, config.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[ExecutionSlot] {
        &self.slots
    }

    /// Reset every slot's per-round accounting and notify controllers.
    pub fn reset_for_round(&mut self, round: u32) {
        for slot in &mut self.slots {
            slot.reset_for_round(round);
        }
    }

    /// Run one full turn: submit to all eligible slots, then collect in
    /// robot-index order.
    ///
    /// The returned vector is index-aligned with the battle state's robots:
    /// `None` for dead robots (they take no turn at all), `Some(no_op)` for
    /// disabled or violating ones. Slot failures are contained here -- the
    /// slot records the violation, the robot forfeits the turn.
    ///
    /// Also mirrors each slot's disabled flag back into the battle state so
    /// snapshots report it.
    pub fn collect_intents(
        &mut self,
        state: &mut BattleState,
        snapshot: &Arc<TickSnapshot>,
    ) -> Vec<Option<Intent>> {
        let arena = state.arena();

        // Phase 1: submit. Workers for all eligible robots run concurrently.
        let mut submitted = vec![false; self.slots.len()];
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let robot_id = state.robots()[index].id;
            if !state.robots()[index].alive || slot.is_disabled() {
                continue;
            }
            let events = state.drain_events(robot_id);
            let ctx = TickContext {
                snapshot: Arc::clone(snapshot),
                own: snapshot.robots[index].clone(),
                events,
                arena,
            };
            slot.submit(ctx);
            submitted[index] = true;
        }

        // Phase 2: collect in index order, never arrival order.
        let mut intents = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let robot = &state.robots()[index];
            if !robot.alive {
                intents.push(None);
                continue;
            }
            if !submitted[index] {
                // Disabled before this tick: alive but barred from acting.
                intents.push(Some(Intent::no_op()));
                continue;
            }
            match slot.collect() {
                Ok(intent) => intents.push(Some(intent)),
                Err(SlotError::Timeout { budget }) => {
                    tracing::debug!(robot = %slot.robot(), ?budget, "turn forfeited: budget overrun");
                    intents.push(Some(Intent::no_op()));
                }
                Err(err) => {
                    tracing::debug!(robot = %slot.robot(), %err, "turn forfeited");
                    intents.push(Some(Intent::no_op()));
                }
            }
        }

        for (index, slot) in self.slots.iter().enumerate() {
            state.robots_mut()[index].disabled = slot.is_disabled();
        }

        intents
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

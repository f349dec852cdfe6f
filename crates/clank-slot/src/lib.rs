//! Clank Slot -- isolated execution of competitor robot controllers.
//!
//! This crate is the sandbox boundary of the Clank battle engine. Competitor
//! code implements [`RobotController`]; the engine wraps each controller in
//! an [`ExecutionSlot`] that runs it on a dedicated worker thread with a
//! strict wall-clock budget per tick.
//!
//! # Isolation guarantees
//!
//! - A controller only ever sees an immutable [`TickSnapshot`] handle, its
//!   own status, and its pending events. It has no path to the live battle
//!   state.
//! - A controller that overruns its budget costs itself a turn
//!   ([`SlotError::Timeout`]), never its opponents': each slot has its own
//!   worker, so a hung controller blocks nobody else.
//! - A controller that panics is caught on the worker and surfaced as
//!   [`SlotError::Fault`]; the worker keeps serving later ticks.
//! - Results that arrive after their tick's deadline (or after a round was
//!   torn down) carry a stale sequence number and are discarded, so late
//!   work can never corrupt a later tick.
//!
//! # Example
//!
//! ```
//! use clank_core::{Intent, RobotId};
//! use clank_slot::{ExecutionSlot, RobotController, SlotConfig, TickContext};
//!
//! struct Sitting;
//!
//! impl RobotController for Sitting {
//!     fn name(&self) -> &str {
//!         "sitting-duck"
//!     }
//!     fn tick(&mut self, _ctx: &TickContext) -> Intent {
//!         Intent::no_op()
//!     }
//! }
//!
//! let mut slot = ExecutionSlot::spawn(
//!     RobotId(0),
//!     Box::new(Sitting),
//!     SlotConfig::default(),
//! ).unwrap();
//! assert_eq!(slot.violations(), 0);
//! ```

#![deny(unsafe_code)]

pub mod slot;

pub use slot::{ExecutionSlot, SlotConfig};

use std::sync::Arc;
use std::time::Duration;

use clank_core::{Intent, RobotEvent, RobotStatus, TickSnapshot};
use clank_geom::BoundingBox;

// ---------------------------------------------------------------------------
// TickContext
// ---------------------------------------------------------------------------

/// Everything a controller gets to see when deciding its next action.
#[derive(Debug, Clone)]
pub struct TickContext {
    /// The last published snapshot (tick `N-1` when deciding tick `N`).
    pub snapshot: Arc<TickSnapshot>,
    /// This robot's own status as of that snapshot.
    pub own: RobotStatus,
    /// Events involving this robot since its previous turn, in
    /// deterministic delivery order.
    pub events: Vec<RobotEvent>,
    /// The arena bounds, fixed for the round.
    pub arena: BoundingBox,
}

// ---------------------------------------------------------------------------
// RobotController
// ---------------------------------------------------------------------------

/// A competitor-supplied robot brain.
///
/// Implementations may keep arbitrary internal state across ticks; the slot
/// owns the controller exclusively, so no synchronization is needed. The
/// `Send` bound is what lets the slot move it onto its worker thread.
pub trait RobotController: Send {
    /// Display name, used in results and logs.
    fn name(&self) -> &str;

    /// Decide this tick's action.
    ///
    /// Must return within the configured budget; an overrun or panic costs
    /// the robot its turn (see [`SlotError`]). There is no way to return an
    /// invalid action: out-of-range [`Intent`] fields are clamped by the
    /// resolver.
    fn tick(&mut self, ctx: &TickContext) -> Intent;

    /// Called at the start of each round, after placement. Controllers that
    /// carry cross-tick state reset it here. Default: nothing.
    fn on_round_start(&mut self, _round: u32) {}
}

// ---------------------------------------------------------------------------
// SlotError
// ---------------------------------------------------------------------------

/// Per-tick failures at the slot boundary. All contained: the engine records
/// a violation and substitutes a no-op intent; nothing here aborts a battle.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    /// The controller did not produce an intent within its budget.
    #[error("controller overran its {budget:?} compute budget")]
    Timeout {
        /// The budget that was exceeded.
        budget: Duration,
    },

    /// The controller panicked; the payload message is preserved for logs.
    #[error("controller fault: {0}")]
    Fault(String),

    /// The worker thread is gone (its channel disconnected). Only happens
    /// if the worker itself died, which a controller cannot cause; treated
    /// like a fault by the engine.
    #[error("slot worker terminated")]
    Disconnected,

    /// The worker thread could not be spawned at battle setup.
    #[error("failed to spawn slot worker: {0}")]
    Spawn(String),
}

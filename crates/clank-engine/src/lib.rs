//! Clank Engine -- deterministic battle simulation core.
//!
//! This crate composes the Clank workspace into the battle engine proper:
//! the authoritative [`BattleState`](state::BattleState) with immutable
//! snapshot publication, the fixed-order [`TurnScheduler`](scheduler::TurnScheduler),
//! the [`resolver`] that applies intents and resolves collisions in a fixed
//! priority order, and the [`BattleRunner`](battle::BattleRunner) state
//! machine that drives rounds to a final [`BattleResult`](clank_core::BattleResult).
//!
//! # Determinism Guarantee
//!
//! Given the same [`BattleConfig`](clank_core::BattleConfig) (including the
//! seed) and controllers that are themselves deterministic and within
//! budget, two runs produce byte-identical sequences of
//! [`TickSnapshot`](clank_core::TickSnapshot)s. This is guaranteed by:
//!
//! - Fixed invocation order (robot index, never arrival order).
//! - All intents collected before any is applied to shared state.
//! - Fixed collision resolution priority (bullet-robot, then bullet-bullet,
//!   then robot-robot ram; wall clamping during the movement phase).
//! - All randomness (initial placement) drawn from one seeded RNG.
//!
//! # Quick Start
//!
//! ```no_run
//! use clank_core::BattleConfig;
//! use clank_engine::prelude::*;
//!
//! # fn controllers() -> Vec<Box<dyn RobotController>> { vec![] }
//! let config = BattleConfig {
//!     rounds: 3,
//!     ..Default::default()
//! };
//! let mut runner = BattleRunner::new(config, controllers()).unwrap();
//! let snapshots = runner.subscribe();
//! let result = runner.run().unwrap();
//! println!("winner: {:?}", result.standings()[0].name);
//! ```

#![deny(unsafe_code)]

pub mod battle;
pub mod resolver;
pub mod scheduler;
pub mod state;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the shared data model for convenience.
pub use clank_core;

/// Re-export the geometry primitives for convenience.
pub use clank_geom;

/// Re-export the controller/slot crate for convenience.
pub use clank_slot;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Fatal engine failures. Everything a controller can do wrong is contained
/// at the slot boundary; only a bad configuration or a broken internal
/// invariant surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The battle configuration was rejected before `RoundStarting`.
    #[error(transparent)]
    Config(#[from] clank_core::ConfigError),

    /// Battle state failed a post-tick consistency check (negative energy,
    /// duplicate id, resurrected robot). Aborts the round with diagnostic
    /// detail; indicates an engine bug, not a controller problem.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// A slot worker could not be set up.
    #[error(transparent)]
    Slot(#[from] clank_slot::SlotError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use crate::battle::{BattleRunner, Phase};
    pub use crate::resolver::resolve_tick;
    pub use crate::scheduler::TurnScheduler;
    pub use crate::state::{BattleState, Bullet, RobotSpawn, RobotState};
    pub use crate::EngineError;

    pub use clank_core::{
        BattleConfig, BattleResult, BulletStatus, Intent, RobotEvent, RobotId, RobotScore,
        RobotStatus, RoundEndReason, RoundResult, TickSnapshot,
    };
    pub use clank_geom::{BoundingBox, Vec2};
    pub use clank_slot::{ExecutionSlot, RobotController, SlotConfig, TickContext};
}

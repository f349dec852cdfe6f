//! Clank Core -- shared data model for the Clank battle engine.
//!
//! This crate defines everything both sides of the simulation boundary need
//! to agree on: the combat [`rules`], the per-tick [`Intent`] a controller
//! returns, the immutable [`TickSnapshot`] it observes, the [`RobotEvent`]s
//! derived for it since its last turn, the validated [`BattleConfig`], the
//! round/battle [`results`], and the [`ledger`] that accounts for every
//! energy delta.
//!
//! Nothing in this crate mutates battle state; these are value types the
//! engine produces and controllers consume.

#![deny(unsafe_code)]

pub mod config;
pub mod event;
pub mod intent;
pub mod ledger;
pub mod results;
pub mod rules;
pub mod snapshot;

pub use config::{BattleConfig, ConfigError};
pub use event::RobotEvent;
pub use intent::Intent;
pub use ledger::{EnergyCause, EnergyEvent, EnergyLedger};
pub use results::{BattleResult, RobotScore, RoundEndReason, RoundResult};
pub use snapshot::{BulletStatus, RobotStatus, TickSnapshot};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable identity of a robot for the duration of a battle.
///
/// Robot ids are assigned from the roster order at battle start and never
/// change: the id doubles as the robot's index in every per-robot list the
/// engine produces, including after the robot dies. This is what makes the
/// turn order deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RobotId(pub usize);

impl RobotId {
    /// The robot's position in roster/turn order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RobotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "robot#{}", self.0)
    }
}

/// Identity of a bullet, unique within one round.
///
/// Ids are handed out sequentially in fire order, so bullet iteration order
/// is deterministic as well.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BulletId(pub u64);

impl std::fmt::Display for BulletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bullet#{}", self.0)
    }
}

//! Battle configuration and pre-round validation.
//!
//! A [`BattleConfig`] is the only input the engine takes besides the
//! controllers themselves. Validation happens once, before the first round
//! starts; a config that fails validation is the only way to be rejected up
//! front (everything a controller does later is contained, never fatal).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rules::{DEFAULT_START_ENERGY, ROBOT_SIZE};

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Rejection reasons for a malformed [`BattleConfig`]. All fatal: the battle
/// never leaves `Idle`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("a battle needs at least 2 robots, got {0}")]
    TooFewRobots(usize),

    #[error(
        "arena {width}x{height} is degenerate -- each side must be finite and at least {min} units"
    )]
    DegenerateArena { width: f64, height: f64, min: f64 },

    #[error("arena {width}x{height} cannot place {robots} robots without overlap")]
    ArenaTooSmall {
        width: f64,
        height: f64,
        robots: usize,
    },

    #[error("round count must be at least 1")]
    ZeroRounds,

    #[error("turn limit must be at least 1")]
    ZeroTurnLimit,

    #[error("starting energy must be positive and finite, got {0}")]
    InvalidStartEnergy(f64),

    #[error("per-tick compute budget must be non-zero")]
    ZeroBudget,
}

// ---------------------------------------------------------------------------
// BattleConfig
// ---------------------------------------------------------------------------

/// Full configuration for one battle.
///
/// The defaults give a classic small duel: 800x600 arena, 10 rounds, 100
/// starting energy, a 10 ms compute budget per robot per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    pub arena_width: f64,
    pub arena_height: f64,
    /// Number of rounds in the battle.
    pub rounds: u32,
    /// Hard per-round tick limit; the round ends here even if several robots
    /// remain alive.
    pub max_turns: u64,
    /// Energy every robot starts each round with.
    pub start_energy: f64,
    /// Seed for initial placement. Identical seeds (with identical
    /// controllers) reproduce the battle exactly.
    pub seed: u64,
    /// Wall-clock budget each controller gets per tick.
    pub tick_budget: Duration,
    /// Budget/fault violations per round before a robot is forcibly
    /// disabled for the rest of the round.
    pub max_violations: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            arena_width: 800.0,
            arena_height: 600.0,
            rounds: 10,
            max_turns: 5_000,
            start_energy: DEFAULT_START_ENERGY,
            seed: 0,
            tick_budget: Duration::from_millis(10),
            max_violations: 30,
        }
    }
}

impl BattleConfig {
    /// Minimum arena side: room for two robots abreast.
    pub const MIN_ARENA_EDGE: f64 = 2.0 * ROBOT_SIZE;

    /// Validate this configuration for a roster of `robot_count` robots.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; the first failed check wins. Checks run in a
    /// fixed order so the error is deterministic too.
    pub fn validate(&self, robot_count: usize) -> Result<(), ConfigError> {
        if robot_count < 2 {
            return Err(ConfigError::TooFewRobots(robot_count));
        }
        if !self.arena_width.is_finite()
            || !self.arena_height.is_finite()
            || self.arena_width < Self::MIN_ARENA_EDGE
            || self.arena_height < Self::MIN_ARENA_EDGE
        {
            return Err(ConfigError::DegenerateArena {
                width: self.arena_width,
                height: self.arena_height,
                min: Self::MIN_ARENA_EDGE,
            });
        }
        // Placement needs a 2x2 robot-size cell per robot to terminate.
        let cells = (self.arena_width / (2.0 * ROBOT_SIZE)).floor()
            * (self.arena_height / (2.0 * ROBOT_SIZE)).floor();
        if (robot_count as f64) > cells {
            return Err(ConfigError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                robots: robot_count,
            });
        }
        if self.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if self.max_turns == 0 {
            return Err(ConfigError::ZeroTurnLimit);
        }
        if !(self.start_energy.is_finite() && self.start_energy > 0.0) {
            return Err(ConfigError::InvalidStartEnergy(self.start_energy));
        }
        if self.tick_budget.is_zero() {
            return Err(ConfigError::ZeroBudget);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

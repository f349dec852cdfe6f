//! Round and battle results with per-robot score aggregation.
//!
//! Scoring follows the classic robot-combat breakdown: survival points each
//! time an opponent dies while you live, a last-survivor bonus, 1 point per
//! point of bullet damage dealt plus a 20 % kill bonus, doubled points for
//! ram damage plus a 30 % kill bonus. A [`RoundResult`] is computed at
//! `RoundEnding`; the [`BattleResult`] aggregates all rounds and is immutable
//! once the battle completes.

use serde::{Deserialize, Serialize};

use crate::RobotId;

// ---------------------------------------------------------------------------
// RobotScore
// ---------------------------------------------------------------------------

/// Score fields for one robot, for one round or aggregated over a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotScore {
    pub robot: RobotId,
    pub name: String,
    /// 50 points per opponent that died while this robot was alive.
    pub survival: f64,
    /// 10 points per dead opponent, awarded to the round's sole survivor.
    pub last_survivor_bonus: f64,
    /// 1 point per point of bullet damage dealt.
    pub bullet_damage: f64,
    /// 20 % of the bullet damage dealt to each victim this robot killed.
    pub bullet_kill_bonus: f64,
    /// 2 points per point of ram damage dealt.
    pub ram_damage: f64,
    /// 30 % of the ram damage dealt to each victim this robot killed.
    pub ram_kill_bonus: f64,
    /// Bullet damage received (informational; not part of the total).
    pub bullet_damage_taken: f64,
    /// Rounds this robot won (highest round score).
    pub rounds_won: u32,
    /// Rounds this robot was still alive at the end of.
    pub rounds_survived: u32,
}

impl RobotScore {
    /// A zeroed score sheet for the given robot.
    pub fn new(robot: RobotId, name: impl Into<String>) -> Self {
        Self {
            robot,
            name: name.into(),
            survival: 0.0,
            last_survivor_bonus: 0.0,
            bullet_damage: 0.0,
            bullet_kill_bonus: 0.0,
            ram_damage: 0.0,
            ram_kill_bonus: 0.0,
            bullet_damage_taken: 0.0,
            rounds_won: 0,
            rounds_survived: 0,
        }
    }

    /// Combined score: the sum of every scoring field.
    pub fn total(&self) -> f64 {
        self.survival
            + self.last_survivor_bonus
            + self.bullet_damage
            + self.bullet_kill_bonus
            + self.ram_damage
            + self.ram_kill_bonus
    }

    /// Fold one round's scores into a battle total.
    pub fn accumulate(&mut self, round: &RobotScore) {
        debug_assert_eq!(self.robot, round.robot);
        self.survival += round.survival;
        self.last_survivor_bonus += round.last_survivor_bonus;
        self.bullet_damage += round.bullet_damage;
        self.bullet_kill_bonus += round.bullet_kill_bonus;
        self.ram_damage += round.ram_damage;
        self.ram_kill_bonus += round.ram_kill_bonus;
        self.bullet_damage_taken += round.bullet_damage_taken;
        self.rounds_won += round.rounds_won;
        self.rounds_survived += round.rounds_survived;
    }
}

// ---------------------------------------------------------------------------
// RoundResult
// ---------------------------------------------------------------------------

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEndReason {
    /// Exactly one robot remained alive.
    LastRobotStanding,
    /// The configured turn limit was reached with several robots alive.
    TurnLimit,
    /// Every robot was destroyed (mutual kills on the final tick).
    AllDestroyed,
}

/// Final accounting for one round. Read-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Round number, starting at 1.
    pub round: u32,
    /// Ticks the round ran for.
    pub ticks: u64,
    /// The round winner: the sole survivor, or the highest scorer on a
    /// turn-limit or mutual-destruction ending. `None` only when scores tie
    /// exactly.
    pub winner: Option<RobotId>,
    pub end_reason: RoundEndReason,
    /// Per-robot scores, indexed by robot id.
    pub scores: Vec<RobotScore>,
}

// ---------------------------------------------------------------------------
// BattleResult
// ---------------------------------------------------------------------------

/// Aggregated outcome of a whole battle. Immutable once the battle reaches
/// `BattleComplete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub rounds: Vec<RoundResult>,
    /// Battle totals per robot, indexed by robot id.
    pub totals: Vec<RobotScore>,
}

impl BattleResult {
    /// Robots ordered by total score, best first; ties break toward the
    /// lower robot id so standings are deterministic.
    pub fn standings(&self) -> Vec<&RobotScore> {
        let mut order: Vec<&RobotScore> = self.totals.iter().collect();
        order.sort_by(|a, b| {
            b.total()
                .partial_cmp(&a.total())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.robot.cmp(&b.robot))
        });
        order
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

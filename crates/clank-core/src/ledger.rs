//! Energy ledger: every energy delta, recorded with its cause.
//!
//! The ledger is the audit trail for the conservation invariant: at any tick,
//! the sum of all robots' current energy equals the initial total plus the
//! sum of every recorded delta. The resolver records an [`EnergyEvent`] for
//! each mutation it makes; nothing else touches robot energy.

use serde::{Deserialize, Serialize};

use crate::RobotId;

// ---------------------------------------------------------------------------
// EnergyCause
// ---------------------------------------------------------------------------

/// Why a robot's energy changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnergyCause {
    /// Firing a bullet costs its power.
    FireCost { power: f64 },
    /// Hit by a bullet fired by `from`.
    BulletDamage { from: RobotId },
    /// This robot's bullet connected; reward is `3 * power`.
    HitReward { victim: RobotId },
    /// Drove into a wall too fast.
    WallDamage,
    /// Ram contact with another robot.
    RamDamage { other: RobotId },
}

// ---------------------------------------------------------------------------
// EnergyEvent
// ---------------------------------------------------------------------------

/// One recorded energy mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEvent {
    pub tick: u64,
    pub robot: RobotId,
    /// Signed change applied to the robot's energy. Negative for costs and
    /// damage, positive only for hit rewards.
    pub delta: f64,
    pub cause: EnergyCause,
}

// ---------------------------------------------------------------------------
// EnergyLedger
// ---------------------------------------------------------------------------

/// Append-only log of energy events for one round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyLedger {
    events: Vec<EnergyEvent>,
}

impl EnergyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: EnergyEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[EnergyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Net energy change across all robots since round start.
    pub fn total_delta(&self) -> f64 {
        self.events.iter().map(|e| e.delta).sum()
    }

    /// Net energy change for one robot.
    pub fn total_delta_for(&self, robot: RobotId) -> f64 {
        self.events
            .iter()
            .filter(|e| e.robot == robot)
            .map(|e| e.delta)
            .sum()
    }

    /// Events recorded during one tick, in recording order.
    pub fn events_for_tick(&self, tick: u64) -> impl Iterator<Item = &EnergyEvent> {
        self.events.iter().filter(move |e| e.tick == tick)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fire(tick: u64, robot: usize, power: f64) -> EnergyEvent {
        EnergyEvent {
            tick,
            robot: RobotId(robot),
            delta: -power,
            cause: EnergyCause::FireCost { power },
        }
    }

    #[test]
    fn totals_sum_deltas() {
        let mut ledger = EnergyLedger::new();
        ledger.record(fire(1, 0, 2.0));
        ledger.record(fire(1, 1, 3.0));
        ledger.record(EnergyEvent {
            tick: 4,
            robot: RobotId(0),
            delta: 6.0,
            cause: EnergyCause::HitReward { victim: RobotId(1) },
        });

        assert_eq!(ledger.len(), 3);
        assert!((ledger.total_delta() - 1.0).abs() < 1e-12);
        assert!((ledger.total_delta_for(RobotId(0)) - 4.0).abs() < 1e-12);
        assert!((ledger.total_delta_for(RobotId(1)) - (-3.0)).abs() < 1e-12);
    }

    #[test]
    fn tick_filter() {
        let mut ledger = EnergyLedger::new();
        ledger.record(fire(1, 0, 1.0));
        ledger.record(fire(2, 0, 1.0));
        ledger.record(fire(2, 1, 1.0));

        assert_eq!(ledger.events_for_tick(2).count(), 2);
        assert_eq!(ledger.events_for_tick(3).count(), 0);
    }

    #[test]
    fn clear_resets_for_next_round() {
        let mut ledger = EnergyLedger::new();
        ledger.record(fire(1, 0, 1.0));
        assert!(!ledger.is_empty());
        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_delta(), 0.0);
    }
}

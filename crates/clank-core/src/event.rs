//! Discrete events delivered to a controller alongside the snapshot.
//!
//! Instead of per-event callbacks ("on scanned", "on hit wall", ...), the
//! engine accumulates a list of [`RobotEvent`]s for each robot since its
//! last turn and passes it into the next controller invocation. Events are
//! sorted with [`RobotEvent::sort_key`] before delivery so the order a
//! controller observes is deterministic regardless of resolution internals.

use serde::{Deserialize, Serialize};

use crate::RobotId;

// ---------------------------------------------------------------------------
// RobotEvent
// ---------------------------------------------------------------------------

/// Something that happened to (or because of) a robot during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RobotEvent {
    /// The radar sweep caught another robot.
    ScannedRobot {
        robot: RobotId,
        /// Bearing from the scanning robot's position, radians, absolute.
        bearing: f64,
        distance: f64,
        energy: f64,
        heading: f64,
        velocity: f64,
    },
    /// An enemy bullet connected with this robot.
    HitByBullet {
        owner: RobotId,
        power: f64,
        damage: f64,
    },
    /// A bullet this robot fired connected with a victim.
    BulletHit { victim: RobotId, damage: f64 },
    /// A bullet this robot fired was destroyed by colliding with another
    /// bullet in flight.
    BulletHitBullet { other_owner: RobotId },
    /// A bullet this robot fired left the arena without hitting anything.
    BulletMissed,
    /// This robot drove into a wall.
    HitWall { damage: f64 },
    /// This robot rammed (or was rammed by) another robot.
    HitRobot { other: RobotId, damage: f64 },
    /// Another robot was destroyed this tick.
    RobotDeath { robot: RobotId },
}

impl RobotEvent {
    /// Deterministic delivery order: event kind first, then the other party's
    /// index. Kind ranks follow resolution priority (bullet hits before ram
    /// before wall), scans and deaths last.
    pub fn sort_key(&self) -> (u8, usize) {
        match self {
            RobotEvent::HitByBullet { owner, .. } => (0, owner.index()),
            RobotEvent::BulletHit { victim, .. } => (1, victim.index()),
            RobotEvent::BulletHitBullet { other_owner } => (2, other_owner.index()),
            RobotEvent::BulletMissed => (3, 0),
            RobotEvent::HitRobot { other, .. } => (4, other.index()),
            RobotEvent::HitWall { .. } => (5, 0),
            RobotEvent::ScannedRobot { robot, .. } => (6, robot.index()),
            RobotEvent::RobotDeath { robot } => (7, robot.index()),
        }
    }
}

/// Sort a batch of events into delivery order.
pub fn sort_events(events: &mut [RobotEvent]) {
    events.sort_by_key(RobotEvent::sort_key);
}

//! Immutable per-tick snapshots with BLAKE3 state hashing.
//!
//! A [`TickSnapshot`] is the only view of battle state that leaves the
//! simulation thread: controllers receive it alongside their own status, and
//! external consumers (renderer, scorer) subscribe to the published stream.
//! Snapshot for tick `N` reflects the fully resolved state after all intents
//! for tick `N` were applied -- never a partial state -- and is never mutated
//! after publication.
//!
//! [`TickSnapshot::state_hash`] produces a BLAKE3 hex digest of the canonical
//! JSON encoding. Two battles are byte-identical iff their per-tick hash
//! sequences are equal, which is how the determinism guarantee is verified.

use clank_geom::Vec2;
use serde::{Deserialize, Serialize};

use crate::{BulletId, RobotId};

// ---------------------------------------------------------------------------
// RobotStatus
// ---------------------------------------------------------------------------

/// Public state of one robot at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotStatus {
    pub id: RobotId,
    pub name: String,
    pub position: Vec2,
    /// Hull heading, radians, 0 = north, clockwise.
    pub body_heading: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
    /// Signed speed along the body heading, units per tick.
    pub velocity: f64,
    pub energy: f64,
    pub gun_heat: f64,
    pub alive: bool,
    /// Alive but barred from acting (too many budget violations).
    pub disabled: bool,
}

// ---------------------------------------------------------------------------
// BulletStatus
// ---------------------------------------------------------------------------

/// Public state of one in-flight bullet at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletStatus {
    pub id: BulletId,
    /// The robot that fired it. The owner may already be dead; the bullet
    /// flies on regardless.
    pub owner: RobotId,
    pub position: Vec2,
    pub heading: f64,
    pub power: f64,
}

// ---------------------------------------------------------------------------
// TickSnapshot
// ---------------------------------------------------------------------------

/// Immutable copy of all robot and bullet state at a tick boundary.
///
/// `robots` is indexed by [`RobotId`]; dead robots stay in place so indices
/// never shift mid-round. `bullets` is ordered by [`BulletId`] (fire order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// Round number, starting at 1.
    pub round: u32,
    /// Tick index within the round. Tick 0 is the initial placement, before
    /// any intent has been applied.
    pub tick: u64,
    pub robots: Vec<RobotStatus>,
    pub bullets: Vec<BulletStatus>,
}

impl TickSnapshot {
    /// Status of one robot by id.
    pub fn robot(&self, id: RobotId) -> Option<&RobotStatus> {
        self.robots.get(id.index())
    }

    /// Robots still alive this tick, in id order.
    pub fn alive_robots(&self) -> impl Iterator<Item = &RobotStatus> {
        self.robots.iter().filter(|r| r.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.robots.iter().filter(|r| r.alive).count()
    }

    /// BLAKE3 hex digest (64 lowercase hex chars) of the canonical JSON
    /// encoding of this snapshot.
    ///
    /// Covers everything in the snapshot, so equal hashes mean equal
    /// observable state. Used by the determinism tests to compare whole
    /// battles cheaply.
    pub fn state_hash(&self) -> String {
        let bytes = serde_json::to_vec(self)
            .expect("TickSnapshot should always be JSON-serializable");
        blake3::hash(&bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

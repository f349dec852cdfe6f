//! Replay determinism: the same config and controllers reproduce a battle
//! exactly, snapshot for snapshot.

mod common;

use std::time::Duration;

use clank_engine::prelude::*;
use common::{Spinner, WallCrasher};

fn controllers() -> Vec<Box<dyn RobotController>> {
    vec![Box::new(Spinner), Box::new(WallCrasher::default())]
}

fn config(seed: u64) -> BattleConfig {
    BattleConfig {
        rounds: 2,
        max_turns: 120,
        seed,
        tick_budget: Duration::from_millis(50),
        ..Default::default()
    }
}

/// Run a battle and return every snapshot's content hash plus the result.
fn run_battle(seed: u64) -> (Vec<String>, BattleResult) {
    let mut runner = BattleRunner::new(config(seed), controllers()).unwrap();
    let snapshots = runner.subscribe();
    let result = runner.run().unwrap();
    let hashes = snapshots.try_iter().map(|s| s.state_hash()).collect();
    (hashes, result)
}

#[test]
fn same_seed_replays_identically() {
    let (hashes_a, result_a) = run_battle(1234);
    let (hashes_b, result_b) = run_battle(1234);

    assert!(!hashes_a.is_empty());
    assert_eq!(hashes_a, hashes_b, "snapshot streams must match hash for hash");
    assert_eq!(result_a, result_b);
}

#[test]
fn different_seeds_place_differently() {
    let (hashes_a, _) = run_battle(1);
    let (hashes_b, _) = run_battle(2);
    // The very first snapshot is the placement; different seeds diverge
    // immediately.
    assert_ne!(hashes_a[0], hashes_b[0]);
}

#[test]
fn snapshot_stream_is_ordered_and_gapless() {
    let mut runner = BattleRunner::new(config(9), controllers()).unwrap();
    let snapshots = runner.subscribe();
    runner.run().unwrap();

    let mut expected_round = 1;
    let mut expected_tick = 0;
    for snapshot in snapshots.try_iter() {
        if snapshot.round != expected_round {
            assert_eq!(snapshot.round, expected_round + 1, "rounds advance by one");
            expected_round = snapshot.round;
            expected_tick = 0;
        }
        assert_eq!(snapshot.tick, expected_tick, "ticks advance without gaps");
        expected_tick += 1;
    }
    assert_eq!(expected_round, 2);
}

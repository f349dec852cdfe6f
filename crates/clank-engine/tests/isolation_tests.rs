//! Containment of hostile or broken controllers: panics, budget hogs, and
//! the violation escalation that disables them.

mod common;

use std::time::{Duration, Instant};

use clank_engine::prelude::*;
use common::{Gunner, Hog, Panicker, SittingDuck};

#[test]
fn panicking_controller_never_aborts_the_battle() {
    common::init_tracing();
    let controllers: Vec<Box<dyn RobotController>> =
        vec![Box::new(Gunner::default()), Box::new(Panicker)];
    let config = BattleConfig {
        rounds: 1,
        max_turns: 3_000,
        max_violations: 3,
        seed: 21,
        tick_budget: Duration::from_millis(50),
        ..Default::default()
    };
    let mut runner = BattleRunner::new(config, controllers).unwrap();
    let snapshots = runner.subscribe();
    let result = runner.run().unwrap();

    // The panicker effectively sat still (every turn forfeited) and was
    // shot to pieces.
    let round = &result.rounds[0];
    assert_eq!(round.end_reason, RoundEndReason::LastRobotStanding);
    assert_eq!(round.winner, Some(RobotId(0)));
    assert_eq!(round.scores[1].rounds_survived, 0);

    // It crossed the violation threshold long before dying.
    assert!(snapshots
        .try_iter()
        .any(|s| s.robots[1].disabled && s.robots[1].alive));
}

#[test]
fn budget_hog_cannot_stall_the_simulation() {
    let controllers: Vec<Box<dyn RobotController>> = vec![
        Box::new(Hog {
            delay: Duration::from_millis(200),
        }),
        Box::new(SittingDuck),
    ];
    let config = BattleConfig {
        rounds: 1,
        max_turns: 40,
        max_violations: 2,
        seed: 3,
        tick_budget: Duration::from_millis(5),
        ..Default::default()
    };
    let mut runner = BattleRunner::new(config, controllers).unwrap();
    let snapshots = runner.subscribe();

    let start = Instant::now();
    let result = runner.run().unwrap();
    let elapsed = start.elapsed();

    // 40 ticks at a 5 ms budget: even with scheduling slack the battle must
    // finish in a fraction of the 8 s the hog wanted to burn.
    assert!(
        elapsed < Duration::from_secs(2),
        "hog stalled the battle for {elapsed:?}"
    );

    let round = &result.rounds[0];
    assert_eq!(round.end_reason, RoundEndReason::TurnLimit);
    assert_eq!(round.ticks, 40);
    // Both robots are untouched; the hog only ever hurt its own turns.
    assert_eq!(round.scores[0].rounds_survived, 1);
    assert_eq!(round.scores[1].rounds_survived, 1);

    // After the third violation the hog shows up disabled in snapshots.
    let disabled_at = snapshots
        .try_iter()
        .find(|s| s.robots[0].disabled)
        .map(|s| s.tick);
    assert!(disabled_at.is_some(), "hog was never disabled");
    assert!(disabled_at.unwrap() <= 10);
}

#[test]
fn violations_reset_between_rounds() {
    let controllers: Vec<Box<dyn RobotController>> = vec![
        Box::new(Hog {
            delay: Duration::from_millis(200),
        }),
        Box::new(SittingDuck),
    ];
    let config = BattleConfig {
        rounds: 2,
        max_turns: 15,
        max_violations: 2,
        seed: 3,
        tick_budget: Duration::from_millis(5),
        ..Default::default()
    };
    let mut runner = BattleRunner::new(config, controllers).unwrap();
    let snapshots = runner.subscribe();
    runner.run().unwrap();

    // The disable is per-round: round 2's opening snapshots show the hog
    // enabled again before it re-earns its violations.
    let round2_start = snapshots
        .try_iter()
        .find(|s| s.round == 2 && s.tick == 0)
        .expect("round 2 must publish a tick-0 snapshot");
    assert!(!round2_start.robots[0].disabled);
}

//! Shared fixture controllers for the integration tests.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::time::Duration;

use clank_engine::clank_geom::angle_diff;
use clank_engine::prelude::*;

use clank_engine::clank_core::rules::MAX_RADAR_TURN_RATE;

/// Route engine logs into the test harness; `RUST_LOG` filters as usual.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Does nothing, forever.
pub struct SittingDuck;

impl RobotController for SittingDuck {
    fn name(&self) -> &str {
        "sitting-duck"
    }
    fn tick(&mut self, _ctx: &TickContext) -> Intent {
        Intent::no_op()
    }
}

/// Drives straight ahead at full throttle until it meets a wall. Stops for
/// good if it runs into another robot instead, so it never grinds an
/// opponent down by accident.
#[derive(Default)]
pub struct WallCrasher {
    stopped: bool,
}

impl RobotController for WallCrasher {
    fn name(&self) -> &str {
        "wall-crasher"
    }
    fn tick(&mut self, ctx: &TickContext) -> Intent {
        if ctx
            .events
            .iter()
            .any(|e| matches!(e, RobotEvent::HitRobot { .. }))
        {
            self.stopped = true;
        }
        if self.stopped {
            Intent::no_op()
        } else {
            Intent::no_op().with_target_velocity(8.0)
        }
    }
    fn on_round_start(&mut self, _round: u32) {
        self.stopped = false;
    }
}

/// Spins its radar continuously and scans every tick; deterministic but
/// never fires. Useful for replay tests that need non-trivial intents.
pub struct Spinner;

impl RobotController for Spinner {
    fn name(&self) -> &str {
        "spinner"
    }
    fn tick(&mut self, _ctx: &TickContext) -> Intent {
        Intent::no_op()
            .with_body_turn(0.05)
            .with_target_velocity(4.0)
            .with_radar_turn(MAX_RADAR_TURN_RATE)
            .with_scan()
    }
}

/// Sweeps its radar, remembers the last bearing it saw an opponent at,
/// swings the gun onto it and fires once aligned and cool. Against a
/// stationary opponent every shot connects.
#[derive(Default)]
pub struct Gunner {
    last_bearing: Option<f64>,
}

impl RobotController for Gunner {
    fn name(&self) -> &str {
        "gunner"
    }

    fn tick(&mut self, ctx: &TickContext) -> Intent {
        for event in &ctx.events {
            if let RobotEvent::ScannedRobot { bearing, .. } = event {
                self.last_bearing = Some(*bearing);
            }
        }

        let mut intent = Intent::no_op()
            .with_radar_turn(MAX_RADAR_TURN_RATE)
            .with_scan();
        if let Some(bearing) = self.last_bearing {
            let aim = angle_diff(ctx.own.gun_heading, bearing);
            intent = intent.with_gun_turn(aim);
            if ctx.own.gun_heat == 0.0 && aim.abs() < 1e-6 {
                intent = intent.with_fire(2.0);
            }
        }
        intent
    }

    fn on_round_start(&mut self, _round: u32) {
        self.last_bearing = None;
    }
}

/// Panics on every invocation.
pub struct Panicker;

impl RobotController for Panicker {
    fn name(&self) -> &str {
        "panicker"
    }
    fn tick(&mut self, _ctx: &TickContext) -> Intent {
        panic!("fixture controller crash");
    }
}

/// Burns far more wall-clock time than any sane budget allows.
pub struct Hog {
    pub delay: Duration,
}

impl RobotController for Hog {
    fn name(&self) -> &str {
        "hog"
    }
    fn tick(&mut self, _ctx: &TickContext) -> Intent {
        std::thread::sleep(self.delay);
        Intent::no_op()
    }
}

//! Property tests: no intent stream, however hostile, can break the battle
//! state invariants the resolver maintains.

use proptest::prelude::*;

use clank_engine::prelude::*;

fn wild_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -20.0f64..20.0,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    (
        wild_f64(),
        wild_f64(),
        wild_f64(),
        wild_f64(),
        proptest::option::of(wild_f64()),
        any::<bool>(),
    )
        .prop_map(
            |(body_turn, gun_turn, radar_turn, target_velocity, fire_power, scan)| Intent {
                body_turn,
                gun_turn,
                radar_turn,
                target_velocity,
                fire_power,
                scan,
            },
        )
}

fn fresh_state() -> BattleState {
    let arena = BoundingBox::new(Vec2::ZERO, Vec2::new(400.0, 300.0));
    BattleState::new(
        1,
        arena,
        vec![
            RobotSpawn {
                name: "left".to_owned(),
                position: Vec2::new(100.0, 150.0),
                heading: 0.0,
            },
            RobotSpawn {
                name: "right".to_owned(),
                position: Vec2::new(300.0, 150.0),
                heading: 3.0,
            },
        ],
        100.0,
    )
}

proptest! {
    #[test]
    fn invariants_survive_arbitrary_intents(
        turns in proptest::collection::vec((arb_intent(), arb_intent()), 1..120)
    ) {
        let mut state = fresh_state();
        let mut was_alive = [true, true];
        for (a, b) in turns {
            let intent_a = state.robots()[0].alive.then_some(a);
            let intent_b = state.robots()[1].alive.then_some(b);
            resolve_tick(&mut state, &[intent_a, intent_b]);

            prop_assert!(state.verify_invariants().is_ok());
            for (index, robot) in state.robots().iter().enumerate() {
                prop_assert!((0.0..std::f64::consts::TAU).contains(&robot.body_heading));
                prop_assert!(robot.velocity.abs() <= 8.0 + 1e-9);
                prop_assert!(robot.gun_heat >= 0.0);
                // Death is final.
                prop_assert!(was_alive[index] || !robot.alive);
                was_alive[index] = robot.alive;
            }
        }
    }

    #[test]
    fn ticks_advance_monotonically(
        turns in proptest::collection::vec(arb_intent(), 1..40)
    ) {
        let mut state = fresh_state();
        let mut last = state.tick();
        for intent in turns {
            resolve_tick(&mut state, &[Some(intent.clone()), Some(intent)]);
            prop_assert_eq!(state.tick(), last + 1);
            last = state.tick();
        }
    }
}

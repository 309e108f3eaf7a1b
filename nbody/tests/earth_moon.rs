use std::sync::atomic::AtomicBool;

use cgmath::{EuclideanSpace, InnerSpace, Vector3};
use nbody::{
    BatchRequest, BodySource, LoopSettings, Scheduling, SequentialSim, SimConfig, Simulation,
    Snapshot,
    constants::{G, SEC_PER_DAY},
    presets::earth_moon,
    run_sim_loop,
};

fn config(scheduling: Scheduling, step_limit: Option<u64>) -> SimConfig {
    SimConfig {
        timestep_seconds: SEC_PER_DAY,
        step_limit,
        body_source: BodySource::BuiltIn,
        updates_per_second: None,
        threads: Some(4),
        scheduling,
    }
}

fn rel_err(a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    (a - b).magnitude() / b.magnitude()
}

#[test]
fn one_day_matches_hand_computation() {
    let initial = earth_moon();
    let (earth, moon) = (&initial[0], &initial[1]);

    // Moon pulled towards earth, earth towards moon.
    let r = earth.pos - moon.pos;
    let d = r.magnitude();
    let moon_vel = moon.vel + r * (G * earth.mass / (d * d * d)) * SEC_PER_DAY;
    let moon_pos = moon.pos + moon_vel * SEC_PER_DAY;
    let earth_vel = -r * (G * moon.mass / (d * d * d)) * SEC_PER_DAY;
    let earth_disp = earth_vel * SEC_PER_DAY;

    for scheduling in [
        Scheduling::Sequential,
        Scheduling::ParallelFor,
        Scheduling::WorkCursor,
    ] {
        let mut sim = config(scheduling, None).build().unwrap();
        sim.exec_iter();
        let after = sim.bodies();

        assert!(rel_err(after[1].vel, moon_vel) < 1e-12, "{scheduling:?}");
        assert!(rel_err(after[1].pos.to_vec(), moon_pos.to_vec()) < 1e-12, "{scheduling:?}");
        assert!(rel_err(after[0].vel, earth_vel) < 1e-12, "{scheduling:?}");

        let earth_moved = (after[0].pos - earth.pos).magnitude();
        let moon_moved = (after[1].pos - moon.pos).magnitude();
        assert!((earth_moved - earth_disp.magnitude()).abs() < 1e-6 * earth_moved);
        assert!(earth_moved * 100.0 < moon_moved, "{earth_moved} vs {moon_moved}");
    }
}

#[test]
fn heavy_body_barely_moves() {
    let mut bodies = earth_moon();
    bodies[0].mass *= 1.0e6;
    let mut sim = Simulation::new(bodies.clone(), SequentialSim, SEC_PER_DAY, 1).unwrap();
    sim.exec_iter();

    let heavy = (sim.bodies()[0].pos - bodies[0].pos).magnitude();
    let light = (sim.bodies()[1].pos - bodies[1].pos).magnitude();
    assert!(heavy < light * 1e-6, "{heavy} vs {light}");
}

#[test]
fn bounded_run_of_a_lunar_month_terminates() {
    let config = config(Scheduling::WorkCursor, Some(27));
    let mut sim = config.build().unwrap();
    let exchange = BatchRequest::new(sim.bodies().len());
    let token = AtomicBool::new(false);

    let outcome = run_sim_loop(&mut sim, &exchange, &token, config.loop_settings());
    assert_eq!(outcome.ticks, 27);
    assert_eq!(outcome.remaining, Some(0));

    let mut snapshot = Snapshot::default();
    exchange.sample(&mut snapshot);
    assert_eq!(snapshot.tick, 27);
    assert_eq!(snapshot.elapsed().days, 27);
    assert!(snapshot.bodies.iter().all(|b| b.pos.x.is_finite()));
    assert_eq!(
        LoopSettings {
            step_limit: Some(27),
            updates_per_second: None
        },
        config.loop_settings()
    );
}

#[test]
fn schedulers_agree_over_many_ticks() {
    let mut runs = Vec::new();
    for scheduling in [
        Scheduling::Sequential,
        Scheduling::ParallelFor,
        Scheduling::WorkCursor,
    ] {
        let mut config = config(scheduling, Some(30));
        config.body_source = BodySource::File(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/inner_planets.csv"),
        );
        config.timestep_seconds = SEC_PER_DAY / 4.0;
        let mut sim = config.build().unwrap();
        for _ in 0..30 {
            sim.exec_iter();
        }
        runs.push(sim.bodies().to_vec());
    }

    for other in &runs[1..] {
        for (a, b) in runs[0].iter().zip(other) {
            assert!((a.pos - b.pos).magnitude() <= 1e-9 * a.pos.to_vec().magnitude().max(1.0));
            assert!((a.vel - b.vel).magnitude() <= 1e-9 * a.vel.magnitude().max(1.0));
        }
    }
}

#[test]
fn bundled_dataset_matches_built_in_system() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/earth_moon.csv");
    let loaded = nbody::dataset::load_csv(&path).unwrap();
    assert_eq!(loaded, earth_moon());
}

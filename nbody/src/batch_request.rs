use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use cgmath::Point3;

use crate::sim::{Body, ElapsedTime, Simulation, compute_elapsed_time};

/// What a renderer needs to draw one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub pos: Point3<f64>,
    pub radius: f64,
    pub mass: f64,
}

impl From<&Body> for BodyView {
    fn from(value: &Body) -> Self {
        Self {
            pos: value.pos,
            radius: value.radius,
            mass: value.mass,
        }
    }
}

/// A copy of the simulation state taken between two ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub delta: f64,
    pub view_radius: f64,
    pub bodies: Vec<BodyView>,
}

impl Snapshot {
    pub fn elapsed(&self) -> ElapsedTime {
        compute_elapsed_time(self.tick as f64, self.delta)
    }
}

/// Primitive for communicating between simulation and graphics.
pub struct BatchRequest {
    sample: Mutex<Snapshot>,
    should_sample: AtomicBool,
    simulation_tick: AtomicU64,
    aspect_ratio: AtomicU64,
}

impl BatchRequest {
    pub fn new(n_bodies: usize) -> Self {
        Self {
            sample: Mutex::new(Snapshot {
                bodies: Vec::with_capacity(n_bodies),
                ..Default::default()
            }),
            should_sample: AtomicBool::new(true),
            simulation_tick: AtomicU64::new(0),
            aspect_ratio: AtomicU64::new(1.0f64.to_bits()),
        }
    }

    /// Width over height of the renderer's surface. The simulation never reads this.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from_bits(self.aspect_ratio.load(Ordering::Relaxed))
    }

    pub fn set_aspect_ratio(&self, ratio: f64) {
        self.aspect_ratio.store(ratio.to_bits(), Ordering::Relaxed);
    }

    /// Return whether we are ready to a accept a new simulation batch.
    pub fn should_store(&self) -> bool {
        self.should_sample
            .compare_exchange(true, false, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Store a copy of each simulated body, as well as the current tick.
    pub fn store<R>(&self, sim: &Simulation<R>) {
        let mut data = self.sample.lock().unwrap_or_else(PoisonError::into_inner);
        data.tick = sim.ticks();
        data.delta = sim.delta();
        data.view_radius = sim.view_radius();
        data.bodies.clear();
        data.bodies.extend(sim.bodies().iter().map(BodyView::from));
        // Published under the lock so the counter never runs ahead of the sample.
        self.simulation_tick.store(data.tick, Ordering::Relaxed);
    }

    /// Copy the latest sample into `out`, and request a new one from the simulation.
    pub fn sample(&self, out: &mut Snapshot) {
        let data = self.sample.lock().unwrap_or_else(PoisonError::into_inner);
        out.clone_from(&*data);
        self.should_sample.store(true, Ordering::Relaxed);
    }

    pub fn current_ticks(&self) -> u64 {
        self.simulation_tick.load(Ordering::Relaxed)
    }
}

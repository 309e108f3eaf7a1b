use std::fmt::Display;

use anyhow::Context;
use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3, Zero};
use log::{Level, log_enabled, trace};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::constants::{G, SEC_PER_DAY, SEC_PER_HOUR, SEC_PER_MINUTE};

mod cursor;
mod direct;

pub use cursor::WorkCursorSim;
pub use direct::{ParallelForSim, SequentialSim};

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Kilograms
    pub mass: f64,
    /// Kilometers
    pub radius: f64,
    /// Kilometers
    pub pos: Point3<f64>,
    /// Kilometers per second
    pub vel: Vector3<f64>,
}

impl Body {
    /// Adds the pull of `other` on this body to `out`, without the gravitational constant.
    ///
    /// There is no softening: two bodies at the same position produce non-finite values.
    #[inline]
    pub fn get_acc_towards(&self, other: &Body, out: &mut Vector3<f64>) {
        let rel = other.pos - self.pos;
        let dist = rel.magnitude();
        *out += rel * (other.mass / (dist * dist * dist));
    }

    /// Whether the spheres of the two bodies overlap. The stepper never consults this.
    pub fn collides_with(&self, other: &Body) -> bool {
        (other.pos - self.pos).magnitude() < self.radius + other.radius
    }

    /// Distance from the origin to the far edge of the body.
    pub fn extent(&self) -> f64 {
        self.pos.to_vec().magnitude() + self.radius
    }
}

/// Sum of the pulls of every other body on body `i`.
#[inline]
pub(crate) fn acc_of(bodies: &[Body], i: usize) -> Vector3<f64> {
    let obj = &bodies[i];
    let mut out = Vector3::zero();
    for (other_idx, other) in bodies.iter().enumerate() {
        if other_idx == i {
            continue;
        }
        obj.get_acc_towards(other, &mut out);
    }
    out
}

/// Strategy for the force phase of a tick.
///
/// Implementations read positions and masses only, and write `out_buffer[i]` for body `i`
/// only. `out_buffer` is zeroed before every call.
pub trait SimulationImpl {
    fn accumulate(&mut self, bodies: &[Body], out_buffer: &mut [Vector3<f64>]);
}

impl<T: SimulationImpl + ?Sized> SimulationImpl for Box<T> {
    fn accumulate(&mut self, bodies: &[Body], out_buffer: &mut [Vector3<f64>]) {
        (**self).accumulate(bodies, out_buffer);
    }
}

/// Owns the bodies and everything needed to advance them.
pub struct Simulation<R> {
    bodies: Vec<Body>,
    out_buffer: Vec<Vector3<f64>>,
    pool: ThreadPool,
    simulation: R,
    delta: f64,
    ticks: u64,
    view_radius: f64,
}

impl<R: SimulationImpl + Send> Simulation<R> {
    pub fn new(
        bodies: Vec<Body>,
        simulation: R,
        delta: f64,
        n_threads: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!bodies.is_empty(), "cannot simulate an empty set of bodies");
        let len = bodies.len();
        let out_buffer = vec![Vector3::<f64>::zero(); len];
        let view_radius = bodies.iter().map(Body::extent).fold(0.0, f64::max);
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|idx| format!("nbody-worker-{idx}"))
            .build()
            .context("failed to start the worker pool")?;

        Ok(Self {
            bodies,
            out_buffer,
            pool,
            simulation,
            delta,
            ticks: 0,
            view_radius,
        })
    }

    /// Force phase: every velocity is updated from the positions as they were before the tick.
    pub fn accelerate(&mut self) {
        let bodies = &self.bodies;
        let out_buffer = &mut self.out_buffer;
        let simulation = &mut self.simulation;
        self.pool.install(|| simulation.accumulate(bodies, out_buffer));

        for (obj, acc) in self.bodies.iter_mut().zip(self.out_buffer.iter_mut()) {
            obj.vel += *acc * G * self.delta;
            // The buffer is reused next tick.
            *acc = Vector3::zero();
        }
    }

    /// Move phase. Only valid after `accelerate` has finished for the tick.
    pub fn move_bodies(&mut self) {
        for obj in self.bodies.iter_mut() {
            obj.pos += obj.vel * self.delta;
            self.view_radius = self.view_radius.max(obj.extent());
        }
    }

    /// Run a single tick.
    pub fn exec_iter(&mut self) {
        self.accelerate();
        self.move_bodies();
        self.ticks += 1;

        if log_enabled!(Level::Trace) {
            for (idx, obj) in self.bodies.iter().enumerate() {
                trace!(
                    "tick {} body {}: pos ({:e}, {:e}, {:e}) vel ({:e}, {:e}, {:e})",
                    self.ticks,
                    idx,
                    obj.pos.x,
                    obj.pos.y,
                    obj.pos.z,
                    obj.vel.x,
                    obj.vel.y,
                    obj.vel.z
                );
            }
        }
    }
}

impl<R> Simulation<R> {
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn n_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Largest distance from the origin any body's edge has reached so far.
    pub fn view_radius(&self) -> f64 {
        self.view_radius
    }

    pub fn elapsed(&self) -> ElapsedTime {
        compute_elapsed_time(self.ticks as f64, self.delta)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ElapsedTime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
    pub ticks: f64,
}

impl Display for ElapsedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Day: {}     Time: {:02}:{:02}:{:05.2}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

pub fn compute_elapsed_time(ticks: f64, delta: f64) -> ElapsedTime {
    let mut time_s = ticks * delta;

    let days = (time_s / SEC_PER_DAY).floor();
    time_s -= days * SEC_PER_DAY;
    let hours = (time_s / SEC_PER_HOUR).floor();
    time_s -= hours * SEC_PER_HOUR;
    let minutes = (time_s / SEC_PER_MINUTE).floor();
    let seconds = time_s - minutes * SEC_PER_MINUTE;

    ElapsedTime {
        days: days as u64,
        hours: hours as u64,
        minutes: minutes as u64,
        seconds,
        ticks,
    }
}

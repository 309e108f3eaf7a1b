use std::path::PathBuf;

use anyhow::ensure;
use clap::ValueEnum;
use log::{info, warn};

use crate::{
    constants::{DEFAULT_DELTA, MAX_GENERATED_BODIES, UPDATES_PER_SECOND},
    dataset::load_csv,
    event_loop::LoopSettings,
    presets::{earth_moon, orbiting_cloud},
    sim::{Body, ParallelForSim, SequentialSim, Simulation, SimulationImpl, WorkCursorSim},
};

/// Where the initial bodies come from.
#[derive(Debug, Clone, PartialEq)]
pub enum BodySource {
    /// A comma separated dataset, see [`crate::dataset`].
    File(PathBuf),
    /// A sun with `count - 1` randomly placed bodies orbiting it.
    Generated(usize),
    /// Earth and moon.
    BuiltIn,
}

impl BodySource {
    /// An explicit file wins over a body count, which wins over the built-in system.
    pub fn resolve(file: Option<PathBuf>, count: Option<usize>) -> Self {
        match (file, count) {
            (Some(path), count) => {
                if let Some(count) = count {
                    warn!("ignoring body count {count}, the dataset decides how many bodies there are");
                }
                BodySource::File(path)
            }
            (None, Some(count)) => BodySource::Generated(count),
            (None, None) => BodySource::BuiltIn,
        }
    }

    pub fn load(&self) -> anyhow::Result<Vec<Body>> {
        match self {
            BodySource::File(path) => load_csv(path),
            BodySource::Generated(count) => {
                check_generated_count(*count)?;
                Ok(orbiting_cloud(*count))
            }
            BodySource::BuiltIn => Ok(earth_moon()),
        }
    }
}

fn check_generated_count(count: usize) -> anyhow::Result<()> {
    ensure!(count > 0, "body count must be positive");
    ensure!(
        count <= MAX_GENERATED_BODIES,
        "body count {count} exceeds the limit of {MAX_GENERATED_BODIES}"
    );
    Ok(())
}

/// How the force phase is spread over the worker pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Scheduling {
    /// Everything on one thread.
    Sequential,
    /// A parallel iterator over the body indices.
    ParallelFor,
    /// Workers claim body indices one by one from a shared cursor.
    #[default]
    WorkCursor,
}

impl Scheduling {
    pub fn build(self) -> Box<dyn SimulationImpl + Send> {
        match self {
            Scheduling::Sequential => Box::new(SequentialSim),
            Scheduling::ParallelFor => Box::new(ParallelForSim),
            Scheduling::WorkCursor => Box::new(WorkCursorSim::new()),
        }
    }
}

pub type DynSimulation = Simulation<Box<dyn SimulationImpl + Send>>;

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Simulated seconds per tick.
    pub timestep_seconds: f64,
    /// Stop after this many ticks. Runs until shut down when `None`.
    pub step_limit: Option<u64>,
    pub body_source: BodySource,
    /// Target tick rate. Ticks run back to back when `None`.
    pub updates_per_second: Option<f64>,
    /// Worker pool size. Defaults to the available parallelism.
    pub threads: Option<usize>,
    pub scheduling: Scheduling,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timestep_seconds: DEFAULT_DELTA,
            step_limit: None,
            body_source: BodySource::BuiltIn,
            updates_per_second: Some(UPDATES_PER_SECOND),
            threads: None,
            scheduling: Scheduling::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.timestep_seconds.is_finite() && self.timestep_seconds > 0.0,
            "timestep must be a positive number of seconds, got {}",
            self.timestep_seconds
        );
        if let Some(rate) = self.updates_per_second {
            ensure!(
                rate.is_finite() && rate > 0.0,
                "update rate must be positive, got {rate}"
            );
        }
        ensure!(self.threads != Some(0), "thread count must be positive");
        if let BodySource::Generated(count) = self.body_source {
            check_generated_count(count)?;
        }
        Ok(())
    }

    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            step_limit: self.step_limit,
            updates_per_second: self.updates_per_second,
        }
    }

    /// Validate, load the bodies and set up the worker pool.
    pub fn build(&self) -> anyhow::Result<DynSimulation> {
        self.validate()?;
        let bodies = self.body_source.load()?;
        let n_threads = self.thread_count();
        info!(
            "simulating {} bodies from {:?}, dt = {} s, {} threads ({:?})",
            bodies.len(),
            self.body_source,
            self.timestep_seconds,
            n_threads,
            self.scheduling
        );
        Simulation::new(
            bodies,
            self.scheduling.build(),
            self.timestep_seconds,
            n_threads,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_precedence() {
        let path = PathBuf::from("bodies.csv");
        assert_eq!(
            BodySource::resolve(Some(path.clone()), Some(10)),
            BodySource::File(path.clone())
        );
        assert_eq!(
            BodySource::resolve(Some(path.clone()), None),
            BodySource::File(path)
        );
        assert_eq!(BodySource::resolve(None, Some(10)), BodySource::Generated(10));
        assert_eq!(BodySource::resolve(None, None), BodySource::BuiltIn);
    }

    #[test]
    fn validation_rejects_bad_settings() {
        let ok = SimConfig::default();
        assert!(ok.validate().is_ok());

        for bad in [
            SimConfig { timestep_seconds: 0.0, ..ok.clone() },
            SimConfig { timestep_seconds: f64::NAN, ..ok.clone() },
            SimConfig { updates_per_second: Some(-1.0), ..ok.clone() },
            SimConfig { threads: Some(0), ..ok.clone() },
            SimConfig { body_source: BodySource::Generated(0), ..ok.clone() },
            SimConfig { body_source: BodySource::Generated(usize::MAX), ..ok.clone() },
        ] {
            assert!(bad.validate().is_err(), "{bad:?}");
            assert!(bad.build().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn oversized_generated_cloud_is_an_error() {
        let err = BodySource::Generated(MAX_GENERATED_BODIES + 1).load().unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"), "{err:#}");
    }

    #[test]
    fn missing_file_fails_before_running() {
        let config = SimConfig {
            body_source: BodySource::File("/nope/bodies.csv".into()),
            ..Default::default()
        };
        assert!(config.build().is_err());
    }

    #[test]
    fn builds_each_scheduler() {
        for scheduling in [
            Scheduling::Sequential,
            Scheduling::ParallelFor,
            Scheduling::WorkCursor,
        ] {
            let config = SimConfig {
                threads: Some(2),
                scheduling,
                ..Default::default()
            };
            let mut sim = config.build().unwrap();
            assert_eq!(sim.n_threads(), 2);
            assert_eq!(sim.bodies().len(), 2);
            sim.exec_iter();
            assert_eq!(sim.ticks(), 1);
        }
    }

    #[test]
    fn default_thread_count_uses_the_machine() {
        assert!(SimConfig::default().thread_count() >= 1);
    }
}

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::anyhow;
use clap::Parser;
use log::info;
use nbody::{
    BatchRequest, BodySource, Scheduling, SimConfig, Snapshot,
    constants::{DEFAULT_DELTA, STATUS_INTERVAL, UPDATES_PER_SECOND},
    presets::{barycenter, total_momentum},
    run_sim_loop,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma separated body data. The first record holds the number of bodies.
    file: Option<PathBuf>,

    /// Simulated seconds per tick.
    #[arg(short, long, default_value_t = DEFAULT_DELTA)]
    timestep: f64,

    /// Generate this many bodies instead of the built-in earth and moon. Ignored with a file.
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Stop after this many ticks instead of running until interrupted.
    #[arg(short, long)]
    steps: Option<u64>,

    /// Ticks per second. 0 runs as fast as possible.
    #[arg(short, long, default_value_t = UPDATES_PER_SECOND)]
    rate: f64,

    /// Worker threads for the force computation. Defaults to the number of cores.
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    #[arg(long, value_enum, default_value_t = Scheduling::WorkCursor)]
    scheduler: Scheduling,
}

impl Args {
    fn into_config(self) -> SimConfig {
        SimConfig {
            timestep_seconds: self.timestep,
            step_limit: self.steps,
            body_source: BodySource::resolve(self.file, self.count),
            updates_per_second: (self.rate != 0.0).then_some(self.rate),
            threads: self.threads,
            scheduling: self.scheduler,
        }
    }
}

fn print_status(snapshot: &Snapshot) {
    println!(
        "View Radius: {:.4e} km     {}",
        snapshot.view_radius,
        snapshot.elapsed()
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    let mut sim = config.build()?;
    let settings = config.loop_settings();
    info!(
        "barycenter {:?}, momentum {:?}",
        barycenter(sim.bodies()),
        total_momentum(sim.bodies())
    );

    let exchange = Arc::new(BatchRequest::new(sim.bodies().len()));
    let token = Arc::new(AtomicBool::new(false));
    let mut snapshot = Snapshot::default();

    if settings.step_limit.is_some() {
        let outcome = run_sim_loop(&mut sim, &exchange, &token, settings);
        exchange.sample(&mut snapshot);
        print_status(&snapshot);
        for (idx, obj) in sim.bodies().iter().enumerate() {
            println!(
                "{idx}: pos ({:e}, {:e}, {:e}) km, vel ({:e}, {:e}, {:e}) km/s",
                obj.pos.x, obj.pos.y, obj.pos.z, obj.vel.x, obj.vel.y, obj.vel.z
            );
        }
        info!(
            "{} ticks done, momentum {:?}",
            outcome.ticks,
            total_momentum(sim.bodies())
        );
        return Ok(());
    }

    let exchange_clone = exchange.clone();
    let token_clone = token.clone();
    let handle = thread::Builder::new()
        .name("simulation".to_owned())
        .spawn(move || run_sim_loop(&mut sim, &exchange_clone, &token_clone, settings))?;

    // Stand-in for a display: sample once per refresh until the simulation goes away.
    while !handle.is_finished() {
        thread::sleep(Duration::from_secs_f64(STATUS_INTERVAL));
        exchange.sample(&mut snapshot);
        print_status(&snapshot);
    }

    token.store(true, Ordering::Relaxed);
    handle
        .join()
        .map_err(|_| anyhow!("simulation thread panicked"))?;
    Ok(())
}

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use log::{debug, info};

use crate::{
    batch_request::BatchRequest,
    sim::{Simulation, SimulationImpl},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    /// Number of ticks to run before returning. `None` runs until the token is raised.
    pub step_limit: Option<u64>,
    /// Target tick rate. `None` runs ticks back to back.
    pub updates_per_second: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// Ticks left of the step limit, `Some(0)` once a bounded run completes.
    pub remaining: Option<u64>,
}

/// Run ticks at a fixed rate, publishing samples to `exchange` whenever one is requested.
///
/// After each tick the loop sleeps for whatever is left of the tick's time budget. A tick that
/// overruns its budget is followed immediately by the next one; lost time is never made up.
/// The final state is always published before returning.
pub fn run_sim_loop<R: SimulationImpl + Send>(
    sim: &mut Simulation<R>,
    exchange: &BatchRequest,
    token: &AtomicBool,
    settings: LoopSettings,
) -> LoopOutcome {
    // A rate that yields no representable budget (zero, negative, NaN) runs unthrottled.
    let budget = settings
        .updates_per_second
        .and_then(|rate| Duration::try_from_secs_f64(1.0 / rate).ok());
    let mut remaining = settings.step_limit;
    let mut ticks = 0;

    info!(
        "simulation loop started ({} steps, {:?} per tick)",
        remaining.map_or_else(|| "unlimited".to_owned(), |n| n.to_string()),
        budget
    );
    exchange.store(sim);

    while remaining != Some(0) && !token.load(Ordering::Relaxed) {
        let start = Instant::now();

        sim.exec_iter();
        ticks += 1;
        if let Some(left) = remaining.as_mut() {
            *left -= 1;
        }
        if exchange.should_store() {
            exchange.store(sim);
        }

        let elapsed = start.elapsed();
        debug!("tick {} took {:?}", sim.ticks(), elapsed);
        if remaining == Some(0) {
            break;
        }
        if let Some(rest) = budget.and_then(|budget| budget.checked_sub(elapsed)) {
            thread::sleep(rest);
        }
    }

    exchange.store(sim);
    info!(
        "simulation loop terminated after {} ticks ({})",
        ticks,
        sim.elapsed()
    );
    LoopOutcome { ticks, remaining }
}

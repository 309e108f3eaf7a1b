pub mod batch_request;
pub mod config;
pub mod constants;
pub mod dataset;
mod event_loop;
pub mod presets;
mod sim;

pub use batch_request::{BatchRequest, BodyView, Snapshot};
pub use config::{BodySource, DynSimulation, Scheduling, SimConfig};
pub use event_loop::{LoopOutcome, LoopSettings, run_sim_loop};
pub use sim::{
    Body, ElapsedTime, ParallelForSim, SequentialSim, Simulation, SimulationImpl, WorkCursorSim,
    compute_elapsed_time,
};

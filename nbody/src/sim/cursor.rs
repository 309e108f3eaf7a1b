use std::sync::{Mutex, PoisonError};

use cgmath::Vector3;

use crate::sim::{Body, SimulationImpl, acc_of};

/// Direct summation where every worker of the pool claims one body at a time from a shared
/// cursor until the index space is exhausted.
#[derive(Debug, Default)]
pub struct WorkCursorSim {
    cursor: Mutex<usize>,
}

impl WorkCursorSim {
    pub fn new() -> Self {
        Self::default()
    }
}

fn claim(cursor: &Mutex<usize>) -> usize {
    let mut next = cursor.lock().unwrap_or_else(PoisonError::into_inner);
    let idx = *next;
    *next += 1;
    idx
}

impl SimulationImpl for WorkCursorSim {
    fn accumulate(&mut self, bodies: &[Body], out_buffer: &mut [Vector3<f64>]) {
        *self.cursor.get_mut().unwrap_or_else(PoisonError::into_inner) = 0;
        let cursor = &self.cursor;

        // Runs once on every thread of the current pool and returns when all of them are done.
        let per_worker = rayon::broadcast(|_| {
            let mut claimed = Vec::new();
            loop {
                let idx = claim(cursor);
                if idx >= bodies.len() {
                    break;
                }
                claimed.push((idx, acc_of(bodies, idx)));
            }
            claimed
        });

        for (idx, acc) in per_worker.into_iter().flatten() {
            out_buffer[idx] += acc;
        }
    }
}

use cgmath::Vector3;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::sim::{Body, SimulationImpl, acc_of};

/// Direct summation on the calling thread.
pub struct SequentialSim;

impl SimulationImpl for SequentialSim {
    fn accumulate(&mut self, bodies: &[Body], out_buffer: &mut [Vector3<f64>]) {
        iter_single_threaded(bodies, out_buffer);
    }
}

/// Direct summation with the index space handed to the pool as a parallel iterator.
pub struct ParallelForSim;

impl SimulationImpl for ParallelForSim {
    fn accumulate(&mut self, bodies: &[Body], out_buffer: &mut [Vector3<f64>]) {
        iter(bodies, out_buffer);
    }
}

pub fn iter(bodies: &[Body], out_buffer: &mut [Vector3<f64>]) {
    out_buffer
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| {
            *out += acc_of(bodies, i);
        });
}

pub fn iter_single_threaded(bodies: &[Body], out_buffer: &mut [Vector3<f64>]) {
    for (i, out) in out_buffer.iter_mut().enumerate() {
        *out += acc_of(bodies, i);
    }
}

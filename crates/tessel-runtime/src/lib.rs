//! Background mesh workers and the per-frame chunk scheduling policy.
#![forbid(unsafe_code)]

mod pool;
mod scheduler;

pub use pool::{DispatchError, WorkItem, WorkerPool, WorkerState, partition};
pub use scheduler::{Candidate, Priority, best_candidate};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tessel_chunk::ChunkCoord;
use tessel_mesh_cpu::{ChunkMesh, ChunkNeighborhood, MeshScratch};

/// One compile request, owned by exactly one worker while in flight.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub coord: ChunkCoord,
    pub generation: u64,
    pub revision: u64,
    /// Ask the authority for this chunk once the result is consumed.
    pub load: bool,
    pub show_lights: bool,
    pub neighborhood: ChunkNeighborhood,
    pub mesh: Option<ChunkMesh>,
}

impl WorkItem {
    pub fn new(neighborhood: ChunkNeighborhood, generation: u64, revision: u64) -> Self {
        Self {
            coord: neighborhood.center,
            generation,
            revision,
            load: false,
            show_lights: true,
            neighborhood,
            mesh: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Busy,
    Done,
}

#[derive(Debug)]
pub enum DispatchError {
    NoSuchWorker(usize),
    NotIdle(usize, WorkerState),
    Disconnected(usize),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoSuchWorker(i) => write!(f, "no worker {i}"),
            DispatchError::NotIdle(i, s) => write!(f, "worker {i} is {s:?}, not idle"),
            DispatchError::Disconnected(i) => write!(f, "worker {i} has shut down"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Worker that owns `coord`: `(|p| ^ |q| ^ |r|) mod workers`.
///
/// Each chunk maps to exactly one worker, so no chunk is ever compiled twice in parallel.
#[inline]
pub fn partition(coord: ChunkCoord, workers: usize) -> usize {
    let h = coord.cx.unsigned_abs() ^ coord.cy.unsigned_abs() ^ coord.cz.unsigned_abs();
    h as usize % workers.max(1)
}

struct Worker {
    state: WorkerState,
    job_tx: Sender<WorkItem>,
    done_rx: Receiver<WorkItem>,
}

/// Fixed set of compile threads, each with its own job and result lane.
///
/// Worker state is owned here, on the foreground thread: `dispatch` moves
/// Idle to Busy, `drain_done` moves Busy to Done, `release` moves Done to Idle.
pub struct WorkerPool {
    workers: Vec<Worker>,
    _pool: Option<Arc<ThreadPool>>,
    compiled: Arc<AtomicUsize>,
}

impl WorkerPool {
    pub fn new(count: usize) -> Self {
        let compiled = Arc::new(AtomicUsize::new(0));
        if count == 0 {
            return Self {
                workers: Vec::new(),
                _pool: None,
                compiled,
            };
        }
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(count)
                .thread_name(|i| format!("tessel-mesh-{i}"))
                .build()
                .expect("mesh worker pool"),
        );
        let mut workers = Vec::with_capacity(count);
        for _ in 0..count {
            let (job_tx, job_rx) = unbounded::<WorkItem>();
            let (done_tx, done_rx) = unbounded::<WorkItem>();
            let compiled = compiled.clone();
            pool.spawn(move || {
                let mut scratch: Option<MeshScratch> = None;
                while let Ok(mut item) = job_rx.recv() {
                    let scratch = scratch.get_or_insert_with(MeshScratch::new);
                    item.mesh = Some(scratch.compile(&item.neighborhood, item.show_lights));
                    // Drop the snapshot now so the owner's next write need not copy.
                    item.neighborhood = ChunkNeighborhood::new(item.coord);
                    compiled.fetch_add(1, Ordering::Relaxed);
                    if done_tx.send(item).is_err() {
                        break;
                    }
                }
            });
            workers.push(Worker {
                state: WorkerState::Idle,
                job_tx,
                done_rx,
            });
        }
        log::info!("started {count} mesh workers");
        Self {
            workers,
            _pool: Some(pool),
            compiled,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<WorkerState> {
        self.workers.get(index).map(|w| w.state)
    }

    pub fn idle_workers(&self) -> Vec<usize> {
        self.indices_in(WorkerState::Idle)
    }

    pub fn busy_count(&self) -> usize {
        self.indices_in(WorkerState::Busy).len()
    }

    /// Total compiles finished by background threads.
    pub fn compiled(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }

    fn indices_in(&self, state: WorkerState) -> Vec<usize> {
        self.workers
            .iter()
            .enumerate()
            .filter(|(_, w)| w.state == state)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn dispatch(&mut self, index: usize, item: WorkItem) -> Result<(), DispatchError> {
        let worker = self
            .workers
            .get_mut(index)
            .ok_or(DispatchError::NoSuchWorker(index))?;
        if worker.state != WorkerState::Idle {
            return Err(DispatchError::NotIdle(index, worker.state));
        }
        worker
            .job_tx
            .send(item)
            .map_err(|_| DispatchError::Disconnected(index))?;
        worker.state = WorkerState::Busy;
        Ok(())
    }

    /// Collects every finished item without blocking; those workers become Done.
    pub fn drain_done(&mut self) -> Vec<(usize, WorkItem)> {
        let mut out = Vec::new();
        for (i, worker) in self.workers.iter_mut().enumerate() {
            if worker.state != WorkerState::Busy {
                continue;
            }
            match worker.done_rx.try_recv() {
                Ok(item) => {
                    worker.state = WorkerState::Done;
                    out.push((i, item));
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    log::warn!("mesh worker {i} disconnected while busy");
                }
            }
        }
        out
    }

    /// Like [`drain_done`](Self::drain_done) but waits up to `timeout` for every busy worker.
    pub fn wait_done(&mut self, timeout: Duration) -> Vec<(usize, WorkItem)> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        for (i, worker) in self.workers.iter_mut().enumerate() {
            if worker.state != WorkerState::Busy {
                continue;
            }
            if let Ok(item) = worker.done_rx.recv_deadline(deadline) {
                worker.state = WorkerState::Done;
                out.push((i, item));
            }
        }
        out
    }

    /// Returns a Done worker to Idle once its output has been consumed.
    pub fn release(&mut self, index: usize) {
        if let Some(w) = self.workers.get_mut(index) {
            if w.state == WorkerState::Done {
                w.state = WorkerState::Idle;
            }
        }
    }
}

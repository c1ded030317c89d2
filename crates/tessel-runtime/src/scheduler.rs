use tessel_chunk::{ChunkCoord, ChunkStore};

use crate::partition;

/// Ordering key for compile candidates; smaller is scheduled first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority {
    /// Outside the view frustum.
    pub invisible: bool,
    /// Already loaded and waiting on a rebuild; never-loaded chunks go first.
    pub dirty: bool,
    pub distance: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub coord: ChunkCoord,
    /// False when the chunk has not been allocated yet.
    pub exists: bool,
    pub priority: Priority,
}

/// Best chunk for `worker` inside the cube of `radius` around `center`.
///
/// Only coordinates partitioned to `worker` are considered. Clean chunks and
/// `cy < 0` are skipped; on equal priority the first one scanned wins.
pub fn best_candidate(
    store: &ChunkStore,
    center: ChunkCoord,
    radius: i32,
    worker: usize,
    workers: usize,
    visible: impl Fn(ChunkCoord) -> bool,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                let coord = center.offset(dx, dy, dz);
                if !coord.is_valid() || partition(coord, workers) != worker {
                    continue;
                }
                let chunk = store.get(coord);
                if chunk.is_some_and(|c| !c.dirty) {
                    continue;
                }
                let priority = Priority {
                    invisible: !visible(coord),
                    dirty: chunk.is_some(),
                    distance: center.chebyshev(coord),
                };
                if best.is_none_or(|b| priority < b.priority) {
                    best = Some(Candidate {
                        coord,
                        exists: chunk.is_some(),
                        priority,
                    });
                }
            }
        }
    }
    best
}

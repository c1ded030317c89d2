use std::time::Duration;

use proptest::prelude::*;
use tessel_blocks::STONE;
use tessel_chunk::{ChunkCoord, ChunkStore};
use tessel_mesh_cpu::ChunkNeighborhood;
use tessel_runtime::{DispatchError, WorkItem, WorkerPool, WorkerState, partition};

fn wait_for(pool: &mut WorkerPool, n: usize) -> Vec<(usize, WorkItem)> {
    let mut out = Vec::new();
    for _ in 0..200 {
        out.extend(pool.wait_done(Duration::from_millis(50)));
        if out.len() >= n {
            break;
        }
    }
    out
}

#[test]
fn worker_cycles_idle_busy_done_idle() {
    let c = ChunkCoord::new(0, 1, 0);
    let mut store = ChunkStore::new(8);
    store.get_or_create(c).unwrap();
    store.set_block(4, 40, 4, STONE);
    let chunk = store.get(c).unwrap();
    let item = WorkItem::new(ChunkNeighborhood::gather(&store, c), chunk.generation, chunk.revision);

    let mut pool = WorkerPool::new(2);
    assert_eq!(pool.idle_workers(), vec![0, 1]);
    pool.dispatch(1, item.clone()).unwrap();
    assert_eq!(pool.state(1), Some(WorkerState::Busy));
    assert!(matches!(pool.dispatch(1, item), Err(DispatchError::NotIdle(1, WorkerState::Busy))));

    let done = wait_for(&mut pool, 1);
    assert_eq!(done.len(), 1);
    let (i, item) = &done[0];
    assert_eq!(*i, 1);
    assert_eq!(pool.state(1), Some(WorkerState::Done));
    let mesh = item.mesh.as_ref().unwrap();
    assert_eq!(mesh.faces, 6);
    assert_eq!(item.coord, c);
    assert!(item.neighborhood.voxels(0, 0, 0).is_none());

    pool.release(1);
    assert_eq!(pool.state(1), Some(WorkerState::Idle));
    assert_eq!(pool.busy_count(), 0);
    assert_eq!(pool.compiled(), 1);
}

#[test]
fn unknown_worker_is_rejected() {
    let mut pool = WorkerPool::new(1);
    let item = WorkItem::new(ChunkNeighborhood::new(ChunkCoord::new(0, 0, 0)), 1, 1);
    assert!(matches!(pool.dispatch(3, item), Err(DispatchError::NoSuchWorker(3))));
}

#[test]
fn many_workers_compile_in_parallel() {
    let mut store = ChunkStore::new(64);
    let coords: Vec<_> = (0..4).map(|i| ChunkCoord::new(i, 0, 0)).collect();
    for c in &coords {
        store.get_or_create(*c).unwrap();
    }
    for (i, c) in coords.iter().enumerate() {
        let (bx, _, bz) = c.base();
        store.set_block(bx + i as i32, 5, bz, STONE);
    }
    let mut pool = WorkerPool::new(4);
    for (i, c) in coords.iter().enumerate() {
        let chunk = store.get(*c).unwrap();
        let item = WorkItem::new(ChunkNeighborhood::gather(&store, *c), chunk.generation, chunk.revision);
        pool.dispatch(i, item).unwrap();
    }
    let done = wait_for(&mut pool, 4);
    assert_eq!(done.len(), 4);
    for (_, item) in &done {
        assert_eq!(item.mesh.as_ref().map(|m| m.faces), Some(6));
    }
}

proptest! {
    // Each coordinate belongs to exactly one worker index in range
    #[test]
    fn partition_is_total_and_disjoint(cx in -500i32..500, cy in 0i32..64, cz in -500i32..500, workers in 1usize..40) {
        let c = ChunkCoord::new(cx, cy, cz);
        let owner = partition(c, workers);
        prop_assert!(owner < workers);
        let owners = (0..workers).filter(|w| partition(c, workers) == *w).count();
        prop_assert_eq!(owners, 1);
    }
}

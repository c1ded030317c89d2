use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use tessel_blocks::{GRASS, STONE, TALL_GRASS};
use tessel_chunk::{ChunkCoord, ChunkStore};
use tessel_mesh_cpu::{ChunkNeighborhood, MeshScratch};

// Rolling terrain across a 3x1x3 patch of chunks with grass and a few lamps.
fn terrain_store() -> ChunkStore {
    let mut store = ChunkStore::new(64);
    for cx in -1..=1 {
        for cz in -1..=1 {
            store.get_or_create(ChunkCoord::new(cx, 0, cz)).unwrap();
        }
    }
    for x in -32..64 {
        for z in -32..64 {
            let h = 8 + ((x as f32 * 0.2).sin() * 4.0 + (z as f32 * 0.15).cos() * 4.0) as i32;
            for y in 0..h {
                store.set_block(x, y, z, STONE);
            }
            store.set_block(x, h, z, GRASS);
            if (x * 7 + z * 13) % 11 == 0 {
                store.set_block(x, h + 1, z, TALL_GRASS);
            }
            if (x % 9, z % 9) == (0, 0) {
                store.set_light(x, h + 1, z, 15);
            }
        }
    }
    store
}

fn bench_compile_terrain(c: &mut Criterion) {
    let store = terrain_store();
    let nb = ChunkNeighborhood::gather(&store, ChunkCoord::new(0, 0, 0));
    let mut group = c.benchmark_group("compile_terrain");
    group.measurement_time(Duration::from_secs(5));
    group.bench_function("lit", |b| {
        let mut scratch = MeshScratch::new();
        b.iter(|| black_box(scratch.compile(&nb, true)))
    });
    group.bench_function("unlit", |b| {
        let mut scratch = MeshScratch::new();
        b.iter(|| black_box(scratch.compile(&nb, false)))
    });
    group.finish();
}

criterion_group!(benches, bench_compile_terrain);
criterion_main!(benches);

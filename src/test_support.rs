#![cfg(test)]

use crate::{Engine, EngineConfig};
use miniz_oxide::deflate::compress_to_vec;
use tessel_chunk::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord};
use tessel_proto::ServerMessage;

pub fn headless(workers: usize) -> Engine {
    Engine::new(EngineConfig {
        workers,
        max_chunks: 512,
        ..EngineConfig::default()
    })
}

/// Sends a deflated snapshot of `voxels` for `coord`.
pub fn send_snapshot(engine: &mut Engine, coord: ChunkCoord, voxels: &[u8]) {
    let frame = ServerMessage::snapshot_frame(coord, &compress_to_vec(voxels, 6));
    engine.handle_message(&frame);
}

/// Snapshot bytes with one full horizontal layer of `w` at local height `y`.
pub fn layer(y: usize, w: u8) -> Vec<u8> {
    let s = CHUNK_SIZE as usize;
    let mut v = vec![0u8; CHUNK_VOLUME];
    for z in 0..s {
        for x in 0..s {
            v[x + y * s + z * s * s] = w;
        }
    }
    v
}

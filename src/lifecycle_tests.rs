#![cfg(test)]

use std::collections::HashSet;
use std::time::Duration;

use crate::test_support::send_snapshot;
use crate::{Engine, EngineConfig, NullRenderer};
use tessel_blocks::STONE;
use tessel_chunk::{CHUNK_VOLUME, ChunkCoord};
use tessel_proto::ClientMessage;

fn requested(engine: &mut Engine) -> HashSet<ChunkCoord> {
    engine
        .take_outbox()
        .into_iter()
        .filter_map(|m| match m {
            ClientMessage::ChunkRequest(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// One stone block at local (4, 8, 4) of chunk (0, 1, 0).
fn seeded_chunk(engine: &mut Engine) {
    let mut voxels = vec![0u8; CHUNK_VOLUME];
    voxels[4 + 8 * 32 + 4 * 32 * 32] = STONE;
    send_snapshot(engine, ChunkCoord::new(0, 1, 0), &voxels);
}

#[test]
fn workers_fill_view_and_request_missing_chunks() {
    let mut engine = Engine::new(EngineConfig {
        workers: 2,
        view_radius: 1,
        force_radius: 0,
        max_chunks: 64,
        ..EngineConfig::default()
    });
    let mut render = NullRenderer::new();
    engine.player.state.y = 40.0;
    seeded_chunk(&mut engine);

    let settled = |e: &Engine| {
        e.store().len() == 27
            && e.pool().idle_workers().len() == e.pool().len()
            && e.store().iter().all(|c| !c.dirty)
    };
    for _ in 0..400 {
        engine.ensure_chunks(&mut render);
        engine.wait_workers(Duration::from_millis(50), &mut render);
        if settled(&engine) {
            break;
        }
    }
    assert!(settled(&engine));

    let asked = requested(&mut engine);
    assert_eq!(asked.len(), 26);
    assert!(!asked.contains(&ChunkCoord::new(0, 1, 0)));
    assert!(asked.iter().all(|c| c.cy >= 0));

    assert_eq!(render.live_buffers(), 1);
    assert_eq!(render.live_faces(), 6);
    let centre = engine.store().get(ChunkCoord::new(0, 1, 0)).unwrap();
    assert_eq!((centre.miny, centre.maxy), (40, 40));
    assert!(centre.built_revision >= 1);
}

#[test]
fn edits_rebuild_and_far_chunks_are_freed() {
    let mut engine = Engine::new(EngineConfig {
        workers: 0,
        view_radius: 1,
        force_radius: 1,
        max_chunks: 64,
        ..EngineConfig::default()
    });
    let mut render = NullRenderer::new();
    engine.player.state.y = 40.0;
    seeded_chunk(&mut engine);
    engine.ensure_chunks(&mut render);
    assert_eq!(engine.store().len(), 27);
    assert_eq!(render.live_faces(), 6);

    engine.handle_message(b"B,5,40,4,3");
    engine.ensure_chunks(&mut render);
    assert_eq!(render.live_buffers(), 1);
    assert_eq!(render.live_faces(), 10);
    assert_eq!(render.releases, 1);

    engine.player.state.x = 1000.0;
    assert_eq!(engine.delete_far_chunks(&mut render), 27);
    assert!(engine.store().is_empty());
    assert_eq!(render.live_buffers(), 0);
}

#[test]
fn draw_list_holds_only_built_visible_chunks() {
    let mut engine = Engine::new(EngineConfig {
        workers: 0,
        view_radius: 1,
        force_radius: 1,
        max_chunks: 64,
        ..EngineConfig::default()
    });
    let mut render = NullRenderer::new();
    engine.player.state.y = 40.0;
    engine.player.state.z = -20.0;
    // Look straight along +z at the seeded block.
    engine.player.state.rx = std::f32::consts::PI;
    seeded_chunk(&mut engine);
    engine.ensure_chunks(&mut render);

    let items = engine.draw_list();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].coord, ChunkCoord::new(0, 1, 0));
    assert_eq!(items[0].faces, 6);

    engine.player.state.rx = 0.0;
    assert!(engine.draw_list().is_empty());
}

#[test]
fn reset_releases_everything() {
    let mut engine = Engine::new(EngineConfig {
        workers: 0,
        force_radius: 1,
        max_chunks: 64,
        ..EngineConfig::default()
    });
    let mut render = NullRenderer::new();
    engine.player.state.y = 40.0;
    engine.handle_message(b"P,4,0,0,0,0,0");
    engine.handle_message(b"T,x");
    engine.ensure_chunks(&mut render);
    assert!(!engine.store().is_empty());
    engine.handle_message(b"B,1,40,1,3");
    engine.ensure_chunks(&mut render);
    assert_eq!(render.live_buffers(), 1);

    engine.reset(&mut render);
    assert!(engine.store().is_empty());
    assert!(engine.players().is_empty());
    assert!(engine.chat().is_empty());
    assert_eq!(render.live_buffers(), 0);
}

#[test]
fn zero_view_radius_is_raised_to_one() {
    let mut engine = Engine::new(EngineConfig {
        workers: 0,
        view_radius: 0,
        force_radius: 0,
        max_chunks: 64,
        ..EngineConfig::default()
    });
    let mut render = NullRenderer::new();
    assert_eq!(engine.radii().render, 1);
    engine.player.state.y = 40.0;
    seeded_chunk(&mut engine);
    engine.ensure_chunks(&mut render);
    assert_eq!(render.live_buffers(), 1);
    assert_eq!(render.world_diameter, 0);

    engine.resize_view(-5, &mut render);
    assert_eq!(engine.radii(), crate::Radii::new(1));
    assert_eq!(render.world_diameter, 64);
}

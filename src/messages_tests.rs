#![cfg(test)]

use crate::test_support::{headless, layer, send_snapshot};
use miniz_oxide::deflate::compress_to_vec;
use tessel_blocks::STONE;
use tessel_chunk::{CHUNK_VOLUME, ChunkCoord};
use tessel_proto::{ChannelTransport, ServerMessage, Transport};

#[test]
fn block_message_sets_voxel_and_dirties_chunk() {
    let mut engine = headless(0);
    let c = ChunkCoord::new(0, 0, 0);
    send_snapshot(&mut engine, c, &[]);
    let before = engine.store().get(c).unwrap().revision;
    engine.handle_message(b"B,5,10,5,3");
    assert_eq!(engine.store().block(5, 10, 5), 3);
    let chunk = engine.store().get(c).unwrap();
    assert!(chunk.dirty);
    assert!(chunk.revision > before);
}

#[test]
fn block_for_unloaded_chunk_is_ignored() {
    let mut engine = headless(0);
    engine.handle_message(b"B,500,10,5,3");
    assert_eq!(engine.store().block(500, 10, 5), 0);
    assert!(engine.store().is_empty());
}

#[test]
fn snapshot_fills_grid_and_oversize_is_rejected() {
    let mut engine = headless(0);
    let c = ChunkCoord::new(1, 0, -1);
    let mut voxels = vec![0u8; CHUNK_VOLUME];
    voxels[1 + 2 * 32 + 3 * 32 * 32] = 7;
    send_snapshot(&mut engine, c, &voxels);
    assert_eq!(engine.store().block(33, 2, -29), 7);

    let too_big = vec![1u8; CHUNK_VOLUME + 1];
    engine.handle_message(&ServerMessage::snapshot_frame(c, &compress_to_vec(&too_big, 6)));
    assert_eq!(engine.store().block(33, 2, -29), 7);
    assert_eq!(engine.store().block(32, 0, -32), 0);
    assert!(engine.store().get(c).unwrap().dirty);
}

#[test]
fn malformed_messages_change_nothing() {
    let mut engine = headless(0);
    let junk: [&[u8]; 5] = [b"", b"B,1,2", b"Q,1", b"P,x,1,2,3,4,5", b"C\x00\x01"];
    for frame in junk {
        engine.handle_message(frame);
    }
    assert!(engine.store().is_empty());
    assert!(engine.players().is_empty());
    assert!(engine.chat().is_empty());
}

#[test]
fn remote_players_follow_messages() {
    let mut engine = headless(0);
    engine.handle_message(b"U,1,0,20,0,0,0");
    assert_eq!(engine.player.id, 1);
    engine.handle_message(b"P,1,5,5,5,0,0");
    assert!(engine.players().is_empty());
    engine.handle_message(b"P,7,1,2,3,0,0");
    assert_eq!(engine.players().get(7).unwrap().name, "player7");
    engine.handle_message(b"N,7,alice");
    assert_eq!(engine.players().get(7).unwrap().name, "alice");
    engine.handle_message(b"D,7");
    assert!(engine.players().get(7).is_none());
}

#[test]
fn clock_and_chat_messages() {
    let mut engine = headless(0);
    engine.handle_message(b"E,1350,600");
    assert_eq!(engine.clock().elapsed(), 150.0);
    assert!((engine.clock().time_of_day() - 0.25).abs() < 1e-6);
    engine.handle_message(b"T,hello, world");
    assert_eq!(engine.chat().lines().collect::<Vec<_>>(), ["hello, world"]);
}

#[test]
fn spawn_at_zero_height_lands_above_terrain() {
    let mut engine = headless(0);
    send_snapshot(&mut engine, ChunkCoord::new(0, 0, 0), &layer(9, STONE));
    engine.handle_message(b"U,3,4,0,4,0,0");
    assert_eq!(engine.player.state.y, 11.0);
}

#[test]
fn block_inside_player_lifts_them() {
    let mut engine = headless(0);
    send_snapshot(&mut engine, ChunkCoord::new(0, 0, 0), &layer(9, STONE));
    engine.player.state.x = 4.0;
    engine.player.state.y = 10.0;
    engine.player.state.z = 4.0;
    engine.handle_message(b"B,4,11,4,3");
    assert_eq!(engine.player.state.y, 13.0);
}

#[test]
fn buried_player_is_lifted_by_snapshot() {
    let mut engine = headless(0);
    engine.player.state.x = 4.0;
    engine.player.state.y = 9.0;
    engine.player.state.z = 4.0;
    send_snapshot(&mut engine, ChunkCoord::new(0, 0, 0), &layer(9, STONE));
    assert_eq!(engine.player.state.y, 11.0);
}

#[test]
fn pump_exchanges_with_transport() {
    let mut engine = headless(0);
    let (mut client, mut server) = ChannelTransport::pair();
    engine.handshake("steve", "secret");
    server.send(b"T,welcome");
    server.send(b"U,9,1,2,3,0,0");
    assert_eq!(engine.pump(&mut client), 2);
    assert_eq!(server.try_receive(), Some(b"V,2".to_vec()));
    assert_eq!(server.try_receive(), Some(b"A,steve,secret".to_vec()));
    assert_eq!(engine.player.id, 9);
    assert_eq!(engine.chat().len(), 1);
}

#[test]
fn out_of_range_coordinates_are_dropped() {
    let mut engine = headless(0);
    let mut render = crate::NullRenderer::new();
    engine.handle_message(b"U,1,0,inf,0,0,0");
    assert_eq!(engine.player.id, 0);
    engine.handle_message(b"B,2147483647,10,5,3");
    let far = ChunkCoord::new(100_000_000, 0, 0);
    engine.handle_message(&ServerMessage::snapshot_frame(far, &compress_to_vec(&[1u8; 8], 6)));
    assert!(engine.store().is_empty());

    engine.player.state.x = f32::MAX;
    engine.ensure_chunks(&mut render);
    assert!(engine.store().iter().all(|c| c.coord.is_valid()));
}

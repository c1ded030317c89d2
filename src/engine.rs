//! The world context: chunk lifecycle, message dispatch, movement and local actions.

use std::time::Duration;

use tessel_blocks::{BlockId, is_destructable, is_obstacle, is_plant};
use tessel_chunk::{CHUNK_SIZE, Chunk, ChunkCoord, ChunkStore, StoreError};
use tessel_geom::{Frustum, Mat4, Vec3};
use tessel_mesh_cpu::{ChunkMesh, ChunkNeighborhood, MeshScratch};
use tessel_proto::{ClientMessage, PROTOCOL_VERSION, ServerMessage, Transport, inflate_snapshot};
use tessel_runtime::{WorkItem, WorkerPool, best_candidate};

use crate::chat::{ChatLog, Command, VIEW_RADIUS};
use crate::clock::DayClock;
use crate::config::EngineConfig;
use crate::player::{LocalPlayer, PlayerState, Players};
use crate::query::{self, Hit};
use crate::render::RenderSink;

/// Camera height above the player's feet.
pub const EYE_HEIGHT: f32 = 1.7;
const ZNEAR: f32 = 0.125;
const GRAVITY: f32 = 25.0;
const TERMINAL_VELOCITY: f32 = 250.0;
const JUMP_VELOCITY: f32 = 8.0;
const FLY_SPEED: f32 = 20.0;
const WALK_SPEED: f32 = 5.0;
const MIN_SUBSTEPS: i32 = 8;
/// Squared pose change below which a position report is skipped.
const POSITION_EPSILON: f32 = 0.0001;

/// Chunk radii in chunks, all measured as Chebyshev distance from the player's chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Radii {
    pub create: i32,
    pub render: i32,
    pub delete: i32,
}

impl Radii {
    /// `view` is clamped into [`VIEW_RADIUS`].
    pub fn new(view: i32) -> Self {
        let view = view.clamp(*VIEW_RADIUS.start(), *VIEW_RADIUS.end());
        Self {
            create: view,
            render: view,
            delete: view + 2,
        }
    }

    /// Edge of the wrapping voxel texture.
    pub fn diameter(&self) -> i32 {
        self.render * 2 * CHUNK_SIZE
    }
}

/// Per-frame movement input: `forward`/`strafe` in `{-1, 0, 1}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveInput {
    pub forward: i32,
    pub strafe: i32,
    pub jump: bool,
}

/// A chunk ready to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawItem {
    pub coord: ChunkCoord,
    pub buffer: tessel_chunk::MeshHandle,
    pub faces: usize,
}

pub struct Engine {
    config: EngineConfig,
    store: ChunkStore,
    pool: WorkerPool,
    scratch: MeshScratch,
    pub player: LocalPlayer,
    players: Players,
    clock: DayClock,
    chat: ChatLog,
    radii: Radii,
    outbox: Vec<ClientMessage>,
    last_reported: Option<[f32; 5]>,
    report_timer: f64,
    server_change: Option<(String, u16)>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let radii = Radii::new(config.view_radius);
        log::info!(
            "engine: max_chunks={} workers={} view_radius={}",
            config.max_chunks,
            config.workers,
            config.view_radius
        );
        Self {
            store: ChunkStore::new(config.max_chunks),
            pool: WorkerPool::new(config.workers),
            scratch: MeshScratch::new(),
            player: LocalPlayer::default(),
            players: Players::new(),
            clock: DayClock::new(config.day_length),
            chat: ChatLog::new(),
            radii,
            outbox: Vec::new(),
            last_reported: None,
            report_timer: 0.0,
            server_change: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn radii(&self) -> Radii {
        self.radii
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Messages queued for the authority, in order.
    pub fn outbox(&self) -> &[ClientMessage] {
        &self.outbox
    }

    pub fn take_outbox(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// A `/server` request not yet acted on by the embedding application.
    pub fn take_server_change(&mut self) -> Option<(String, u16)> {
        self.server_change.take()
    }

    fn send(&mut self, msg: ClientMessage) {
        self.outbox.push(msg);
    }

    /// Queues the version handshake and login.
    pub fn handshake(&mut self, username: &str, token: &str) {
        self.send(ClientMessage::Version(PROTOCOL_VERSION));
        self.send(ClientMessage::Login {
            username: username.to_string(),
            token: token.to_string(),
        });
    }

    /// Flushes the outbox to `transport`, then applies every message it has ready.
    pub fn pump(&mut self, transport: &mut dyn Transport) -> usize {
        for msg in self.take_outbox() {
            transport.send(&msg.encode());
        }
        let mut handled = 0;
        while let Some(frame) = transport.try_receive() {
            self.handle_message(&frame);
            handled += 1;
        }
        handled
    }

    // ---- inbound ----

    /// Decodes and applies one server message; malformed input is logged and dropped.
    pub fn handle_message(&mut self, frame: &[u8]) {
        match ServerMessage::decode(frame) {
            Ok(msg) => self.apply(msg),
            Err(e) => log::debug!("dropping message: {e}"),
        }
    }

    pub fn apply(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Chunk { coord, payload } => self.apply_snapshot(coord, &payload),
            ServerMessage::Identity { id, x, y, z, rx, ry } => {
                log::trace!(target: "events", "identity id={id} at ({x:.1}, {y:.1}, {z:.1})");
                self.player.id = id;
                self.player.state = PlayerState::new(x, y, z, rx, ry);
                if y == 0.0 {
                    self.lift_player();
                }
            }
            ServerMessage::Block { x, y, z, w } => {
                log::trace!(target: "events", "block ({x}, {y}, {z}) = {w}");
                self.store.set_block(x, y, z, w);
                if query::player_intersects_block(self.config.player_height, self.player.state.position(), (x, y, z)) {
                    self.lift_player();
                }
            }
            ServerMessage::Light { x, y, z, w } => {
                log::trace!(target: "events", "light ({x}, {y}, {z}) = {w}");
                self.store.set_light(x, y, z, w);
            }
            ServerMessage::Position { id, x, y, z, rx, ry } => {
                if id != self.player.id {
                    let now = self.clock.elapsed();
                    self.players.observe(id, PlayerState::new(x, y, z, rx, ry), now);
                }
            }
            ServerMessage::Disconnect { id } => {
                log::trace!(target: "events", "player {id} left");
                self.players.remove(id);
            }
            ServerMessage::Time { elapsed, day_length } => {
                self.clock.sync(elapsed, day_length);
            }
            ServerMessage::Talk(text) => self.chat.push(text),
            ServerMessage::Nick { id, name } => {
                self.players.rename(id, &name);
            }
        }
    }

    fn apply_snapshot(&mut self, coord: ChunkCoord, payload: &[u8]) {
        let chunk = match self.store.get_or_create(coord) {
            Ok(chunk) => chunk,
            Err(e) => {
                log::debug!("chunk snapshot ({}, {}, {}) discarded: {e}", coord.cx, coord.cy, coord.cz);
                return;
            }
        };
        match inflate_snapshot(payload, chunk.voxels_mut().as_bytes_mut()) {
            Ok(n) => {
                log::trace!(target: "events", "snapshot ({}, {}, {}) {n} bytes", coord.cx, coord.cy, coord.cz);
                self.store.mark_dirty_around(coord);
            }
            Err(e) => {
                log::debug!("chunk snapshot ({}, {}, {}) rejected: {e}", coord.cx, coord.cy, coord.cz);
                chunk.mark_dirty();
                return;
            }
        }
        let here = self.player_chunk();
        if here.cx == coord.cx && here.cz == coord.cz && self.player_is_buried() {
            self.lift_player();
        }
    }

    fn player_is_buried(&self) -> bool {
        let (x, y, z) = query::voxel_of(self.player.state.position());
        (0..self.config.player_height).any(|dy| is_obstacle(self.store.block(x, y + dy, z)))
    }

    /// Moves the player clear of the tallest block in their column.
    fn lift_player(&mut self) {
        let s = self.player.state;
        if let Some(h) = query::highest_block(&self.store, s.x, s.z) {
            self.player.state.y = (h + 2) as f32;
            self.player.dy = 0.0;
        }
    }

    // ---- chunk lifecycle ----

    pub fn player_chunk(&self) -> ChunkCoord {
        let s = &self.player.state;
        ChunkCoord::of_position(s.x, s.y, s.z)
    }

    pub fn eye(&self) -> Vec3 {
        self.player.state.position() + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    pub fn frustum(&self) -> Frustum {
        let s = &self.player.state;
        let zfar = (self.radii.render * CHUNK_SIZE + 64) as f32;
        let m = Mat4::view_projection(self.eye(), s.rx, s.ry, self.config.fov, self.config.aspect, ZNEAR, zfar);
        Frustum::from_matrix(&m)
    }

    /// One scheduling pass: consume finished work, build the near ring inline,
    /// then hand the best candidate to every idle worker.
    pub fn ensure_chunks(&mut self, render: &mut dyn RenderSink) {
        self.collect_results(render);
        self.force_chunks(render);
        self.dispatch_workers();
    }

    fn collect_results(&mut self, render: &mut dyn RenderSink) {
        for (i, item) in self.pool.drain_done() {
            self.apply_result(item, render);
            self.pool.release(i);
        }
    }

    fn apply_result(&mut self, item: WorkItem, render: &mut dyn RenderSink) {
        let diameter = self.radii.diameter();
        let Some(chunk) = self.store.get_mut(item.coord) else {
            log::trace!(target: "events", "result for unloaded chunk ({}, {}, {}) dropped", item.coord.cx, item.coord.cy, item.coord.cz);
            return;
        };
        if chunk.generation != item.generation {
            log::trace!(target: "events", "stale generation for ({}, {}, {})", item.coord.cx, item.coord.cy, item.coord.cz);
            return;
        }
        if item.load {
            self.outbox.push(ClientMessage::ChunkRequest(item.coord));
        }
        let Some(mesh) = item.mesh else {
            return;
        };
        if item.revision > chunk.built_revision {
            install_mesh(chunk, mesh, item.revision, diameter, render);
        }
    }

    fn force_chunks(&mut self, render: &mut dyn RenderSink) {
        let center = self.player_chunk();
        let rad = self.config.force_radius;
        let diameter = self.radii.diameter();
        for dx in -rad..=rad {
            for dy in -rad..=rad {
                for dz in -rad..=rad {
                    let coord = center.offset(dx, dy, dz);
                    if !coord.is_valid() {
                        continue;
                    }
                    match self.store.get(coord) {
                        Some(c) if !c.dirty => continue,
                        Some(_) => {}
                        None => match self.store.get_or_create(coord) {
                            Ok(_) => self.outbox.push(ClientMessage::ChunkRequest(coord)),
                            Err(e) => {
                                log::debug!("cannot create ({}, {}, {}): {e}", coord.cx, coord.cy, coord.cz);
                                continue;
                            }
                        },
                    }
                    let nb = ChunkNeighborhood::gather(&self.store, coord);
                    let mesh = self.scratch.compile(&nb, self.config.show_lights);
                    drop(nb);
                    if let Some(chunk) = self.store.get_mut(coord) {
                        let revision = chunk.revision;
                        install_mesh(chunk, mesh, revision, diameter, render);
                        chunk.dirty = false;
                    }
                }
            }
        }
    }

    fn dispatch_workers(&mut self) {
        let workers = self.pool.len();
        if workers == 0 {
            return;
        }
        let center = self.player_chunk();
        let frustum = self.frustum();
        for i in self.pool.idle_workers() {
            let visible = |c: ChunkCoord| query::chunk_visible(&frustum, c);
            let Some(candidate) = best_candidate(&self.store, center, self.radii.create, i, workers, visible) else {
                continue;
            };
            let coord = candidate.coord;
            let load = !candidate.exists;
            let (generation, revision) = match self.store.get_or_create(coord) {
                Ok(c) => (c.generation, c.revision),
                Err(StoreError::Full) => {
                    log::debug!("chunk store full; skipping ({}, {}, {})", coord.cx, coord.cy, coord.cz);
                    continue;
                }
                Err(e) => {
                    log::debug!("cannot schedule ({}, {}, {}): {e}", coord.cx, coord.cy, coord.cz);
                    continue;
                }
            };
            let mut item = WorkItem::new(ChunkNeighborhood::gather(&self.store, coord), generation, revision);
            item.load = load;
            item.show_lights = self.config.show_lights;
            match self.pool.dispatch(i, item) {
                Ok(()) => {
                    if let Some(c) = self.store.get_mut(coord) {
                        c.dirty = false;
                    }
                }
                Err(e) => log::warn!("dispatch failed: {e}"),
            }
        }
    }

    /// Blocks up to `timeout` for in-flight compiles and applies whatever finished.
    pub fn wait_workers(&mut self, timeout: Duration, render: &mut dyn RenderSink) {
        for (i, item) in self.pool.wait_done(timeout) {
            self.apply_result(item, render);
            self.pool.release(i);
        }
    }

    /// Frees every chunk at or beyond the delete radius.
    pub fn delete_far_chunks(&mut self, render: &mut dyn RenderSink) -> usize {
        let center = self.player_chunk();
        let radius = self.radii.delete;
        let gone = self.store.remove_where(|c| c.coord.chebyshev(center) >= radius);
        for chunk in &gone {
            if let Some(b) = chunk.buffer {
                render.release(b);
            }
        }
        if !gone.is_empty() {
            log::trace!(target: "events", "deleted {} chunks", gone.len());
        }
        gone.len()
    }

    /// Built chunks within the render radius that pass the frustum test.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let center = self.player_chunk();
        let frustum = self.frustum();
        self.store
            .iter()
            .filter(|c| c.coord.chebyshev(center) <= self.radii.render)
            .filter(|c| query::chunk_visible(&frustum, c.coord))
            .filter_map(|c| {
                c.buffer.map(|buffer| DrawItem {
                    coord: c.coord,
                    buffer,
                    faces: c.faces,
                })
            })
            .collect()
    }

    /// Changes all three radii and reallocates the world texture.
    pub fn resize_view(&mut self, radius: i32, render: &mut dyn RenderSink) {
        self.radii = Radii::new(radius);
        log::info!("view radius now {}", self.radii.render);
        render.resize_world(self.radii.diameter());
        let center = self.player_chunk();
        if let Some(c) = self.store.get_mut(center) {
            c.mark_dirty();
        }
    }

    /// Drops all world state, as after a reconnect.
    pub fn reset(&mut self, render: &mut dyn RenderSink) {
        for chunk in self.store.clear() {
            if let Some(b) = chunk.buffer {
                render.release(b);
            }
        }
        self.players.clear();
        self.chat.clear();
        self.clock = DayClock::new(self.config.day_length);
        self.player.flying = false;
        self.player.item_index = 0;
        self.last_reported = None;
        self.report_timer = 0.0;
        log::info!("world reset");
    }

    // ---- per-frame simulation ----

    /// Advances the local player by `dt` seconds with sub-stepped collision.
    pub fn step_movement(&mut self, dt: f32, input: MoveInput) {
        let s = self.player.state;
        let mut v = Vec3::motion(self.player.flying, input.forward, input.strafe, s.rx, s.ry);
        if input.jump {
            if self.player.flying {
                v.y = 1.0;
            } else if self.player.dy == 0.0 {
                self.player.dy = JUMP_VELOCITY;
            }
        }
        let speed = if self.player.flying { FLY_SPEED } else { WALK_SPEED };
        let dy = self.player.dy;
        let estimate = ((v.x * speed).powi(2) + (v.y * speed + dy.abs() * 2.0).powi(2) + (v.z * speed).powi(2))
            .sqrt()
            * dt
            * 8.0;
        let steps = (estimate.round() as i32).max(MIN_SUBSTEPS);
        let ut = dt / steps as f32;
        let v = v * (ut * speed);
        let mut pos = s.position();
        for _ in 0..steps {
            if self.player.flying {
                self.player.dy = 0.0;
            } else {
                self.player.dy = (self.player.dy - ut * GRAVITY).max(-TERMINAL_VELOCITY);
            }
            pos += v + Vec3::new(0.0, self.player.dy * ut, 0.0);
            if query::collide(&self.store, self.config.player_height, &mut pos) {
                self.player.dy = 0.0;
            }
        }
        self.player.state.set_position(pos);
        if pos.y < 0.0 {
            self.lift_player();
        }
    }

    /// Queues a position report when the interval elapsed and the pose changed.
    pub fn report_position(&mut self, dt: f64) {
        self.report_timer += dt;
        if self.report_timer < self.config.position_interval {
            return;
        }
        self.report_timer = 0.0;
        let s = self.player.state;
        let pose = [s.x, s.y, s.z, s.rx, s.ry];
        if let Some(last) = self.last_reported {
            let d: f32 = last.iter().zip(&pose).map(|(a, b)| (a - b) * (a - b)).sum();
            if d < POSITION_EPSILON {
                return;
            }
        }
        self.last_reported = Some(pose);
        self.send(ClientMessage::Position {
            x: s.x,
            y: s.y,
            z: s.z,
            rx: s.rx,
            ry: s.ry,
        });
    }

    /// One frame: movement, clock, remote interpolation, chunk upkeep and reporting.
    pub fn tick(&mut self, dt: f64, input: MoveInput, render: &mut dyn RenderSink) {
        self.step_movement(dt as f32, input);
        self.clock.advance(dt);
        self.players.interpolate(self.clock.elapsed());
        self.delete_far_chunks(render);
        self.report_position(dt);
        self.ensure_chunks(render);
    }

    // ---- local actions ----

    pub fn target(&self) -> Option<Hit> {
        let s = &self.player.state;
        query::hit_test(&self.store, self.eye(), s.rx, s.ry, self.config.hit_distance)
    }

    fn put_block(&mut self, x: i32, y: i32, z: i32, w: BlockId) {
        self.store.set_block(x, y, z, w);
        self.send(ClientMessage::Block { x, y, z, w });
    }

    /// Removes the targeted block and any plant resting on it.
    pub fn break_block(&mut self) -> bool {
        let Some(hit) = self.target() else {
            return false;
        };
        let (x, y, z) = hit.voxel;
        if y <= 0 || !is_destructable(hit.block) {
            return false;
        }
        self.put_block(x, y, z, 0);
        if is_plant(self.store.block(x, y + 1, z)) {
            self.put_block(x, y + 1, z, 0);
        }
        true
    }

    /// Places the selected item in front of the targeted block.
    pub fn place_block(&mut self) -> bool {
        let Some(hit) = self.target() else {
            return false;
        };
        let Some((x, y, z)) = hit.previous else {
            return false;
        };
        if y <= 0 || !is_obstacle(hit.block) {
            return false;
        }
        if query::player_intersects_block(self.config.player_height, self.player.state.position(), (x, y, z)) {
            return false;
        }
        let w = self.player.item();
        self.put_block(x, y, z, w);
        true
    }

    /// Switches the targeted block's light between off and full.
    pub fn toggle_light(&mut self) -> bool {
        let Some(hit) = self.target() else {
            return false;
        };
        let (x, y, z) = hit.voxel;
        if y <= 0 || !is_destructable(hit.block) {
            return false;
        }
        let w = if self.store.light(x, y, z) > 0 { 0 } else { 15 };
        self.store.set_light(x, y, z, w);
        self.send(ClientMessage::Light { x, y, z, w });
        true
    }

    /// Selects the targeted block as the current item.
    pub fn pick_block(&mut self) -> bool {
        match self.target() {
            Some(hit) => self.player.pick_item(hit.block),
            None => false,
        }
    }

    /// Handles a typed line: a command or chat.
    pub fn submit_text(&mut self, text: &str, render: &mut dyn RenderSink) {
        match Command::parse(text) {
            Command::Server { host, port } => {
                log::info!("server change requested: {host}:{port}");
                self.server_change = Some((host, port));
            }
            Command::View(r) if VIEW_RADIUS.contains(&r) => self.resize_view(r, render),
            Command::View(_) => self.chat.push("Viewing distance must be between 1 and 24."),
            Command::Say(text) => {
                if !text.is_empty() {
                    self.send(ClientMessage::Talk(text));
                }
            }
        }
    }
}

/// Swaps in a freshly compiled mesh and mirrors the voxels into the world texture.
fn install_mesh(chunk: &mut Chunk, mesh: ChunkMesh, revision: u64, diameter: i32, render: &mut dyn RenderSink) {
    if let Some(old) = chunk.buffer.take() {
        render.release(old);
    }
    if mesh.faces > 0 {
        chunk.buffer = Some(render.upload_chunk(chunk.coord, &mesh.data, mesh.faces));
    }
    chunk.faces = mesh.faces;
    chunk.miny = mesh.miny;
    chunk.maxy = mesh.maxy;
    chunk.built_revision = revision;
    let (bx, by, bz) = chunk.coord.base();
    let offset = [bx.rem_euclid(diameter), by.rem_euclid(diameter), bz.rem_euclid(diameter)];
    render.upload_voxels(offset, chunk.voxels().as_bytes());
}

use std::fmt;
use std::sync::Arc;

use tessel_blocks::BlockId;

use crate::{CHUNK_SIZE, ChunkCoord, IndexError, LightMap, MAX_LIGHT, SpatialIndex, VoxelGrid};

/// Opaque handle to a renderer-owned vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreError {
    Full,
    InvalidCoord(ChunkCoord),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Full => write!(f, "chunk store is full"),
            StoreError::InvalidCoord(c) => {
                write!(f, "invalid chunk coordinate ({}, {}, {})", c.cx, c.cy, c.cz)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<IndexError> for StoreError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Full => StoreError::Full,
            IndexError::InvalidCoord(c) => StoreError::InvalidCoord(c),
        }
    }
}

/// One loaded chunk.
///
/// Voxels and lights sit behind `Arc` so compile jobs can hold a snapshot
/// while the owner keeps mutating; writes go through `Arc::make_mut`.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub generation: u64,
    pub dirty: bool,
    /// Bumped on every change that invalidates the mesh.
    pub revision: u64,
    /// Revision the current buffer was built from; 0 when never built.
    pub built_revision: u64,
    pub miny: i32,
    pub maxy: i32,
    pub faces: usize,
    pub buffer: Option<MeshHandle>,
    voxels: Arc<VoxelGrid>,
    lights: Arc<LightMap>,
}

impl Chunk {
    fn new(coord: ChunkCoord, generation: u64) -> Self {
        let (_, by, _) = coord.base();
        Self {
            coord,
            generation,
            dirty: true,
            revision: 1,
            built_revision: 0,
            miny: by,
            maxy: by + CHUNK_SIZE,
            faces: 0,
            buffer: None,
            voxels: Arc::new(VoxelGrid::new()),
            lights: Arc::new(LightMap::new()),
        }
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    #[inline]
    pub fn voxels(&self) -> &Arc<VoxelGrid> {
        &self.voxels
    }

    #[inline]
    pub fn lights(&self) -> &Arc<LightMap> {
        &self.lights
    }

    /// Copy-on-write access to the voxel grid.
    #[inline]
    pub fn voxels_mut(&mut self) -> &mut VoxelGrid {
        Arc::make_mut(&mut self.voxels)
    }

    #[inline]
    pub fn lights_mut(&mut self) -> &mut LightMap {
        Arc::make_mut(&mut self.lights)
    }

    /// Local coordinates of a world voxel, if it lies inside this chunk.
    #[inline]
    pub fn local(&self, x: i32, y: i32, z: i32) -> Option<(usize, usize, usize)> {
        let (bx, by, bz) = self.coord.base();
        let (lx, ly, lz) = (x - bx, y - by, z - bz);
        let inside = |v: i32| (0..CHUNK_SIZE).contains(&v);
        (inside(lx) && inside(ly) && inside(lz)).then_some((lx as usize, ly as usize, lz as usize))
    }
}

/// Fixed-capacity chunk arena addressed through a [`SpatialIndex`].
pub struct ChunkStore {
    slots: Vec<Option<Chunk>>,
    free: Vec<usize>,
    index: SpatialIndex<usize>,
    next_generation: u64,
}

impl ChunkStore {
    pub fn new(max_chunks: usize) -> Self {
        let mut slots = Vec::with_capacity(max_chunks);
        slots.resize_with(max_chunks, || None);
        Self {
            slots,
            free: (0..max_chunks).rev().collect(),
            index: SpatialIndex::with_capacity(max_chunks),
            next_generation: 1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.index.find(coord).is_some()
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        let slot = *self.index.get(coord)?;
        self.slots[slot].as_ref()
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        let slot = *self.index.get(coord)?;
        self.slots[slot].as_mut()
    }

    /// Returns the chunk at `coord`, allocating an empty dirty one if absent.
    pub fn get_or_create(&mut self, coord: ChunkCoord) -> Result<&mut Chunk, StoreError> {
        if let Some(&slot) = self.index.get(coord) {
            return self.slots[slot].as_mut().ok_or(StoreError::Full);
        }
        if !coord.is_valid() {
            return Err(StoreError::InvalidCoord(coord));
        }
        let slot = self.free.pop().ok_or(StoreError::Full)?;
        if let Err(e) = self.index.upsert(coord, slot) {
            self.free.push(slot);
            return Err(e.into());
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        log::trace!(target: "events", "chunk alloc ({}, {}, {}) gen={generation}", coord.cx, coord.cy, coord.cz);
        Ok(self.slots[slot].insert(Chunk::new(coord, generation)))
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        let slot = self.index.remove_coord(coord)?;
        self.free.push(slot);
        self.slots[slot].take()
    }

    /// Removes every chunk matching `pred` and hands the records back.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&Chunk) -> bool) -> Vec<Chunk> {
        let doomed: Vec<ChunkCoord> = self
            .iter()
            .filter(|c| pred(*c))
            .map(|c| c.coord)
            .collect();
        doomed.into_iter().filter_map(|c| self.remove(c)).collect()
    }

    pub fn clear(&mut self) -> Vec<Chunk> {
        self.remove_where(|_| true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> + '_ {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Block at a world voxel; 0 when the chunk is not loaded.
    pub fn block(&self, x: i32, y: i32, z: i32) -> BlockId {
        let Some(chunk) = self.get(ChunkCoord::of_voxel(x, y, z)) else {
            return 0;
        };
        match chunk.local(x, y, z) {
            Some((lx, ly, lz)) => chunk.voxels.get(lx, ly, lz),
            None => 0,
        }
    }

    pub fn light(&self, x: i32, y: i32, z: i32) -> u8 {
        let Some(chunk) = self.get(ChunkCoord::of_voxel(x, y, z)) else {
            return 0;
        };
        match chunk.local(x, y, z) {
            Some((lx, ly, lz)) => chunk.lights.get(lx, ly, lz),
            None => 0,
        }
    }

    /// Writes a block into a loaded chunk and dirties the surrounding chunks.
    ///
    /// Clearing a block also clears its light. Returns false when the chunk is not loaded.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, w: BlockId) -> bool {
        let coord = ChunkCoord::of_voxel(x, y, z);
        let Some(chunk) = self.get_mut(coord) else {
            return false;
        };
        let Some((lx, ly, lz)) = chunk.local(x, y, z) else {
            return false;
        };
        chunk.voxels_mut().set(lx, ly, lz, w);
        if w == 0 && chunk.lights.get(lx, ly, lz) != 0 {
            chunk.lights_mut().set(lx, ly, lz, 0);
        }
        self.mark_dirty_around(coord);
        true
    }

    /// Writes a light source; dirties neighbours only when the value changed.
    pub fn set_light(&mut self, x: i32, y: i32, z: i32, w: u8) -> bool {
        let coord = ChunkCoord::of_voxel(x, y, z);
        let Some(chunk) = self.get_mut(coord) else {
            return false;
        };
        let Some((lx, ly, lz)) = chunk.local(x, y, z) else {
            return false;
        };
        if chunk.lights.get(lx, ly, lz) == w.min(MAX_LIGHT) {
            return false;
        }
        chunk.lights_mut().set(lx, ly, lz, w);
        self.mark_dirty_around(coord);
        true
    }

    /// Flags `coord` and its 26 neighbours for recompilation.
    pub fn mark_dirty_around(&mut self, coord: ChunkCoord) {
        for dy in -1..=1 {
            for dz in -1..=1 {
                for dx in -1..=1 {
                    if let Some(c) = self.get_mut(coord.offset(dx, dy, dz)) {
                        c.mark_dirty();
                    }
                }
            }
        }
    }
}

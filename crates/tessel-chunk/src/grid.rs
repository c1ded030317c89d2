use tessel_blocks::BlockId;

use crate::{CHUNK_SIZE, CHUNK_VOLUME};

/// Dense `S³` block grid in local coordinates; x varies fastest, then y, then z.
///
/// This is also the byte order of chunk snapshots on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    blocks: Vec<BlockId>,
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelGrid {
    pub fn new() -> Self {
        Self {
            blocks: vec![0; CHUNK_VOLUME],
        }
    }

    #[inline]
    pub fn idx(x: usize, y: usize, z: usize) -> usize {
        let s = CHUNK_SIZE as usize;
        (z * s + y) * s + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[Self::idx(x, y, z)]
    }

    /// Returns true when the stored value changed.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, w: BlockId) -> bool {
        let i = Self::idx(x, y, z);
        let changed = self.blocks[i] != w;
        self.blocks[i] = w;
        changed
    }

    #[inline]
    pub fn as_bytes(&self) -> &[BlockId] {
        &self.blocks
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [BlockId] {
        &mut self.blocks
    }

    pub fn clear(&mut self) {
        self.blocks.fill(0);
    }

    #[inline]
    pub fn has_blocks(&self) -> bool {
        self.blocks.iter().any(|&b| b != 0)
    }

    /// Iterates non-empty voxels as `(x, y, z, w)` in local coordinates.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, usize, BlockId)> + '_ {
        let s = CHUNK_SIZE as usize;
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0)
            .map(move |(i, &w)| (i % s, (i / s) % s, i / (s * s), w))
    }
}

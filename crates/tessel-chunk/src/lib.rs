//! Chunk records, the coordinate index and the fixed-capacity chunk store.
#![forbid(unsafe_code)]

mod coord;
mod grid;
pub mod index;
mod light;
mod store;

pub use coord::{ChunkCoord, chunked};
pub use grid::VoxelGrid;
pub use index::{IndexError, SpatialIndex, coord_hash};
pub use light::{LightMap, MAX_LIGHT};
pub use store::{Chunk, ChunkStore, MeshHandle, StoreError};

/// Edge length of a cubic chunk in voxels.
pub const CHUNK_SIZE: i32 = 32;

/// Voxels per chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Largest chunk coordinate magnitude on any axis.
///
/// The margin keeps `base()` of every neighbour within view range inside `i32`.
pub const MAX_CHUNK_COORD: i32 = i32::MAX / CHUNK_SIZE - 64;

/// Largest world voxel coordinate magnitude on any axis.
pub const MAX_VOXEL_COORD: i32 = MAX_CHUNK_COORD * CHUNK_SIZE;

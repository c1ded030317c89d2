//! CPU chunk mesher: light flood, ambient occlusion, face culling and vertex emission.
#![forbid(unsafe_code)]

mod compile;
mod emit;
mod face;
mod neighbors;
mod occlusion;

pub use compile::{ChunkMesh, MeshScratch, compile_chunk};
pub use emit::{make_cube, make_plant};
pub use face::Face;
pub use neighbors::ChunkNeighborhood;
pub use occlusion::{CornerValues, occlusion};

/// Floats per vertex: position(3), normal(3), uv(2), ao, light.
pub const FLOATS_PER_VERTEX: usize = 10;
/// Two triangles per face.
pub const VERTICES_PER_FACE: usize = 6;
pub const FLOATS_PER_FACE: usize = FLOATS_PER_VERTEX * VERTICES_PER_FACE;

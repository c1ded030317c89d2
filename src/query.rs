//! Synchronous spatial queries over the loaded chunks.
//!
//! Voxel `(x, y, z)` is centred on the integer point, so a world position maps
//! to the voxel given by rounding each axis.

use tessel_blocks::{BlockId, is_obstacle};
use tessel_chunk::{CHUNK_SIZE, ChunkCoord, ChunkStore};
use tessel_geom::{Aabb, Frustum, Vec3};

/// Ray samples per unit of distance.
const HIT_STEPS: i32 = 32;
/// Horizontal clearance kept between a body and a solid face.
const PAD: f32 = 0.25;

pub type Voxel = (i32, i32, i32);

#[inline]
pub fn voxel_of(p: Vec3) -> Voxel {
    (p.x.round() as i32, p.y.round() as i32, p.z.round() as i32)
}

/// First solid voxel along a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub voxel: Voxel,
    /// Last empty voxel the ray passed through before `voxel`.
    pub previous: Option<Voxel>,
    pub block: BlockId,
}

/// Marches from `eye` along yaw `rx` / pitch `ry` for up to `max_distance` units.
pub fn hit_test(store: &ChunkStore, eye: Vec3, rx: f32, ry: f32, max_distance: f32) -> Option<Hit> {
    let dir = Vec3::sight(rx, ry);
    let steps = (max_distance * HIT_STEPS as f32) as i32;
    let mut previous: Option<Voxel> = None;
    for i in 0..steps {
        let p = eye + dir * (i as f32 / HIT_STEPS as f32);
        let v = voxel_of(p);
        if previous == Some(v) {
            continue;
        }
        let block = store.block(v.0, v.1, v.2);
        if block > 0 {
            return Some(Hit {
                voxel: v,
                previous,
                block,
            });
        }
        previous = Some(v);
    }
    None
}

/// Pushes a body of `height` voxels at `pos` out of neighbouring obstacles.
///
/// Returns true when a vertical contact (floor or ceiling) clamped the position.
pub fn collide(store: &ChunkStore, height: i32, pos: &mut Vec3) -> bool {
    let solid = |x, y, z| is_obstacle(store.block(x, y, z));
    let (nx, ny, nz) = voxel_of(*pos);
    let (px, py, pz) = (pos.x - nx as f32, pos.y - ny as f32, pos.z - nz as f32);
    let mut vertical = false;
    for dy in 0..height {
        let y = ny + dy;
        if px < -PAD && solid(nx - 1, y, nz) {
            pos.x = nx as f32 - PAD;
        }
        if px > PAD && solid(nx + 1, y, nz) {
            pos.x = nx as f32 + PAD;
        }
        if py < -PAD && solid(nx, y - 1, nz) {
            pos.y = ny as f32 - PAD;
            vertical = true;
        }
        if py > PAD && solid(nx, y + 1, nz) {
            pos.y = ny as f32 + PAD;
            vertical = true;
        }
        if pz < -PAD && solid(nx, y, nz - 1) {
            pos.z = nz as f32 - PAD;
        }
        if pz > PAD && solid(nx, y, nz + 1) {
            pos.z = nz as f32 + PAD;
        }
    }
    vertical
}

/// True when the voxel `block` lies inside the `height`-voxel column standing at `pos`.
pub fn player_intersects_block(height: i32, pos: Vec3, block: Voxel) -> bool {
    let (nx, ny, nz) = voxel_of(pos);
    nx == block.0 && nz == block.2 && (ny..ny + height).contains(&block.1)
}

/// Highest obstacle in the column at `(x, z)` across loaded chunks.
pub fn highest_block(store: &ChunkStore, x: f32, z: f32) -> Option<i32> {
    let (vx, _, vz) = voxel_of(Vec3::new(x, 0.0, z));
    let column = ChunkCoord::of_voxel(vx, 0, vz);
    let mut best: Option<i32> = None;
    for chunk in store.iter() {
        if chunk.coord.cx != column.cx || chunk.coord.cz != column.cz {
            continue;
        }
        let (_, by, _) = chunk.coord.base();
        if best.is_some_and(|b| b >= by + CHUNK_SIZE - 1) {
            continue;
        }
        let top = (by..by + CHUNK_SIZE)
            .rev()
            .find(|&y| is_obstacle(store.block(vx, y, vz)));
        if let Some(y) = top {
            best = Some(best.map_or(y, |b| b.max(y)));
        }
    }
    best
}

/// Frustum test against the chunk's cube grown by one voxel.
pub fn chunk_visible(frustum: &Frustum, coord: ChunkCoord) -> bool {
    let (bx, by, bz) = coord.base();
    let origin = Vec3::new(bx as f32 - 1.0, by as f32 - 1.0, bz as f32 - 1.0);
    frustum.intersects_aabb(&Aabb::cube(origin, (CHUNK_SIZE + 1) as f32))
}

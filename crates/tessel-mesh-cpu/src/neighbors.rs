use std::sync::Arc;

use tessel_chunk::{ChunkCoord, ChunkStore, LightMap, VoxelGrid};

/// Read-only 3x3x3 snapshot around one chunk; missing neighbours are `None`.
#[derive(Clone, Debug)]
pub struct ChunkNeighborhood {
    pub center: ChunkCoord,
    voxels: [Option<Arc<VoxelGrid>>; 27],
    lights: [Option<Arc<LightMap>>; 27],
}

impl ChunkNeighborhood {
    pub fn new(center: ChunkCoord) -> Self {
        Self {
            center,
            voxels: [const { None }; 27],
            lights: [const { None }; 27],
        }
    }

    /// Shares the store's grids for `center` and its 26 neighbours.
    pub fn gather(store: &ChunkStore, center: ChunkCoord) -> Self {
        let mut nb = Self::new(center);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(chunk) = store.get(center.offset(dx, dy, dz)) {
                        nb.set(dx, dy, dz, chunk.voxels().clone(), chunk.lights().clone());
                    }
                }
            }
        }
        nb
    }

    #[inline]
    fn slot(dx: i32, dy: i32, dz: i32) -> usize {
        ((dx + 1) * 9 + (dy + 1) * 3 + (dz + 1)) as usize
    }

    pub fn set(&mut self, dx: i32, dy: i32, dz: i32, voxels: Arc<VoxelGrid>, lights: Arc<LightMap>) {
        let i = Self::slot(dx, dy, dz);
        self.voxels[i] = Some(voxels);
        self.lights[i] = Some(lights);
    }

    #[inline]
    pub fn voxels(&self, dx: i32, dy: i32, dz: i32) -> Option<&VoxelGrid> {
        self.voxels[Self::slot(dx, dy, dz)].as_deref()
    }

    #[inline]
    pub fn lights(&self, dx: i32, dy: i32, dz: i32) -> Option<&LightMap> {
        self.lights[Self::slot(dx, dy, dz)].as_deref()
    }

    pub fn has_lights(&self) -> bool {
        self.lights.iter().flatten().any(|l| !l.is_empty())
    }

    /// Present neighbours as `((dx, dy, dz), voxels, lights)`.
    pub fn present(&self) -> impl Iterator<Item = ((i32, i32, i32), &VoxelGrid, Option<&LightMap>)> + '_ {
        (0..27).filter_map(move |i| {
            let v = self.voxels[i].as_deref()?;
            let d = (i as i32 / 9 - 1, (i as i32 / 3) % 3 - 1, i as i32 % 3 - 1);
            Some((d, v, self.lights[i].as_deref()))
        })
    }
}

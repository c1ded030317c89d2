use tessel_blocks::{face_tiles, is_plant, plant_tile};
use tessel_chunk::{CHUNK_SIZE, ChunkCoord};
use tessel_geom::Vec3;
use tessel_lighting::{FloodFill, PaddedVolume};

use crate::{ChunkNeighborhood, FLOATS_PER_FACE, Face, make_cube, make_plant, occlusion};

const S: usize = CHUNK_SIZE as usize;
/// Scratch side: the full 3x3x3 neighbourhood plus a one-voxel rim.
const SIDE: usize = S * 3 + 2;
/// Local bounds of the centre chunk including its rim.
const LO: usize = S;
const HI: usize = S * 2 + 1;
/// Upward search depth for column shading.
const SHADE_DEPTH: usize = 8;

/// Compiled geometry for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    /// `faces * FLOATS_PER_FACE` interleaved vertex floats.
    pub data: Vec<f32>,
    pub faces: usize,
    pub miny: i32,
    pub maxy: i32,
}

/// Reusable scratch volumes for one compiling thread.
pub struct MeshScratch {
    opaque: PaddedVolume<bool>,
    light: PaddedVolume<u8>,
    highest: Vec<i32>,
    flood: FloodFill,
}

impl Default for MeshScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot compile with fresh scratch space.
pub fn compile_chunk(nb: &ChunkNeighborhood, show_lights: bool) -> ChunkMesh {
    MeshScratch::new().compile(nb, show_lights)
}

impl MeshScratch {
    pub fn new() -> Self {
        Self {
            opaque: PaddedVolume::new(SIDE),
            light: PaddedVolume::new(SIDE),
            highest: vec![-1; SIDE * SIDE],
            flood: FloodFill::with_focus(LO, HI),
        }
    }

    #[inline]
    fn column(x: usize, z: usize) -> usize {
        x * SIDE + z
    }

    /// Builds the vertex buffer for `nb.center`.
    ///
    /// Output depends only on the neighbourhood contents.
    pub fn compile(&mut self, nb: &ChunkNeighborhood, show_lights: bool) -> ChunkMesh {
        let coord = nb.center;
        let (bx, by, bz) = coord.base();
        let mut mesh = ChunkMesh {
            coord,
            data: Vec::new(),
            faces: 0,
            miny: by,
            maxy: by + CHUNK_SIZE,
        };
        let Some(center) = nb.voxels(0, 0, 0) else {
            return mesh;
        };
        let s = CHUNK_SIZE;
        let origin = (bx - s - 1, by - s - 1, bz - s - 1);
        self.populate(nb, origin);
        if show_lights && nb.has_lights() {
            self.flood_lights(nb, origin);
        }

        let rim = |v: i32| (v + s + 1) as usize;
        let exposure = |opaque: &PaddedVolume<bool>, x: usize, y: usize, z: usize, wy: i32| {
            let mut f = [false; 6];
            for face in Face::ALL {
                let (dx, dy, dz) = face.delta();
                let n = opaque.get(
                    (x as i32 + dx) as usize,
                    (y as i32 + dy) as usize,
                    (z as i32 + dz) as usize,
                );
                f[face.index()] = !n;
            }
            // Nothing is ever drawn below the world floor.
            if wy <= 0 {
                f[Face::NegY.index()] = false;
            }
            f
        };

        // Count pass: the buffer is sized from this before anything is written.
        let mut faces = 0usize;
        let mut miny = i32::MAX;
        let mut maxy = i32::MIN;
        for (lx, ly, lz, w) in center.occupied() {
            let (x, y, z) = (rim(lx as i32), rim(ly as i32), rim(lz as i32));
            let wy = by + ly as i32;
            let f = exposure(&self.opaque, x, y, z, wy);
            let total = f.iter().filter(|&&e| e).count();
            if total == 0 {
                continue;
            }
            faces += if is_plant(w) { 4 } else { total };
            miny = miny.min(wy);
            maxy = maxy.max(wy);
        }
        if faces == 0 {
            return mesh;
        }

        let mut data = Vec::with_capacity(faces * FLOATS_PER_FACE);
        let mut opaque = [false; 27];
        let mut lights = [0u8; 27];
        let mut shades = [0.0f32; 27];
        for (lx, ly, lz, w) in center.occupied() {
            let (x, y, z) = (rim(lx as i32), rim(ly as i32), rim(lz as i32));
            let (wx, wy, wz) = (bx + lx as i32, by + ly as i32, bz + lz as i32);
            let f = exposure(&self.opaque, x, y, z, wy);
            if !f.iter().any(|&e| e) {
                continue;
            }
            self.gather(x, y, z, &mut opaque, &mut lights, &mut shades);
            let (ao, light) = occlusion(&opaque, &lights, &shades);
            let pos = Vec3::new(wx as f32, wy as f32, wz as f32);
            if is_plant(w) {
                let min_ao = ao.iter().flatten().copied().fold(1.0f32, f32::min);
                let max_light = light.iter().flatten().copied().fold(0.0f32, f32::max);
                let rotation = (i64::from(wx) * 323 - i64::from(wz) * 845).abs() % 360;
                make_plant(&mut data, min_ao, max_light, pos, 0.5, plant_tile(w), rotation as f32);
            } else {
                make_cube(&mut data, &ao, &light, f, face_tiles(w), pos, 0.5);
            }
        }
        assert_eq!(
            data.len(),
            faces * FLOATS_PER_FACE,
            "chunk ({}, {}, {}) emitted a different face count than it sized for",
            coord.cx,
            coord.cy,
            coord.cz
        );

        mesh.data = data;
        mesh.faces = faces;
        mesh.miny = miny;
        mesh.maxy = maxy;
        mesh
    }

    fn populate(&mut self, nb: &ChunkNeighborhood, origin: (i32, i32, i32)) {
        self.opaque.reset(origin);
        self.light.reset(origin);
        self.highest.fill(-1);
        for ((dx, dy, dz), voxels, _) in nb.present() {
            let (nx, ny, nz) = nb.center.offset(dx, dy, dz).base();
            // Every non-empty voxel occludes, glass and plants included.
            for (lx, ly, lz, _) in voxels.occupied() {
                let Some((x, y, z)) = self.opaque.local(nx + lx as i32, ny + ly as i32, nz + lz as i32) else {
                    continue;
                };
                self.opaque.set(x, y, z, true);
                let col = Self::column(x, z);
                self.highest[col] = self.highest[col].max(y as i32);
            }
        }
    }

    fn flood_lights(&mut self, nb: &ChunkNeighborhood, origin: (i32, i32, i32)) {
        debug_assert_eq!(self.light.origin(), origin);
        for ((dx, dy, dz), _, lights) in nb.present() {
            let Some(lights) = lights else {
                continue;
            };
            let (nx, ny, nz) = nb.center.offset(dx, dy, dz).base();
            for (lx, ly, lz, w) in lights.iter() {
                if let Some((x, y, z)) = self.light.local(nx + lx as i32, ny + ly as i32, nz + lz as i32) {
                    self.flood.fill(&self.opaque, &mut self.light, x, y, z, w);
                }
            }
        }
    }

    fn gather(&self, x: usize, y: usize, z: usize, opaque: &mut [bool; 27], lights: &mut [u8; 27], shades: &mut [f32; 27]) {
        let mut i = 0;
        for dx in -1i32..=1 {
            for dy in -1i32..=1 {
                for dz in -1i32..=1 {
                    let (cx, cy, cz) = (
                        (x as i32 + dx) as usize,
                        (y as i32 + dy) as usize,
                        (z as i32 + dz) as usize,
                    );
                    opaque[i] = self.opaque.get(cx, cy, cz);
                    lights[i] = self.light.get(cx, cy, cz);
                    shades[i] = 0.0;
                    if cy as i32 <= self.highest[Self::column(cx, cz)] {
                        for oy in 0..SHADE_DEPTH {
                            if cy + oy < SIDE && self.opaque.get(cx, cy + oy, cz) {
                                shades[i] = 1.0 - oy as f32 * 0.125;
                                break;
                            }
                        }
                    }
                    i += 1;
                }
            }
        }
    }
}

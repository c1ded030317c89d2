use hashbrown::HashMap;
use tessel_chunk::{ChunkCoord, MeshHandle};

/// Graphics collaborator: owns GPU buffers and the wrapping voxel texture.
pub trait RenderSink {
    /// Uploads `faces` worth of interleaved vertices and returns a handle to them.
    fn upload_chunk(&mut self, coord: ChunkCoord, vertices: &[f32], faces: usize) -> MeshHandle;
    fn release(&mut self, handle: MeshHandle);
    /// (Re)allocates the cubic world texture with edge `diameter` voxels.
    fn resize_world(&mut self, diameter: i32);
    /// Writes one chunk's raw voxel bytes at `offset` inside the world texture.
    fn upload_voxels(&mut self, offset: [i32; 3], voxels: &[u8]);
}

/// Headless sink that only keeps counts.
#[derive(Debug, Default)]
pub struct NullRenderer {
    next: u64,
    live: HashMap<MeshHandle, usize>,
    pub uploads: usize,
    pub releases: usize,
    pub voxel_uploads: usize,
    pub world_diameter: i32,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers currently held.
    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    /// Faces across all held buffers.
    pub fn live_faces(&self) -> usize {
        self.live.values().sum()
    }
}

impl RenderSink for NullRenderer {
    fn upload_chunk(&mut self, coord: ChunkCoord, vertices: &[f32], faces: usize) -> MeshHandle {
        self.next += 1;
        let handle = MeshHandle(self.next);
        log::trace!(
            target: "events",
            "upload ({}, {}, {}) faces={faces} floats={}",
            coord.cx,
            coord.cy,
            coord.cz,
            vertices.len()
        );
        self.live.insert(handle, faces);
        self.uploads += 1;
        handle
    }

    fn release(&mut self, handle: MeshHandle) {
        if self.live.remove(&handle).is_none() {
            log::warn!("release of unknown buffer {handle:?}");
        }
        self.releases += 1;
    }

    fn resize_world(&mut self, diameter: i32) {
        self.world_diameter = diameter;
    }

    fn upload_voxels(&mut self, _offset: [i32; 3], _voxels: &[u8]) {
        self.voxel_uploads += 1;
    }
}

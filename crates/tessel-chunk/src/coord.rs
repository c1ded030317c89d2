use crate::{CHUNK_SIZE, MAX_CHUNK_COORD};

/// Chunk grid cell. `cy` is vertical and never negative for a real chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Chunk containing the integer voxel `(x, y, z)`.
    #[inline]
    pub fn of_voxel(x: i32, y: i32, z: i32) -> Self {
        Self::new(
            x.div_euclid(CHUNK_SIZE),
            y.div_euclid(CHUNK_SIZE),
            z.div_euclid(CHUNK_SIZE),
        )
    }

    /// Chunk containing the world position `(x, y, z)`, clamped into the addressable range.
    #[inline]
    pub fn of_position(x: f32, y: f32, z: f32) -> Self {
        Self::new(chunked(x), chunked(y), chunked(z))
    }

    /// True for coordinates the store may hold: `cy >= 0` and every axis within [`MAX_CHUNK_COORD`].
    #[inline]
    pub fn is_valid(self) -> bool {
        let limit = MAX_CHUNK_COORD.unsigned_abs();
        self.cy >= 0
            && self.cx.unsigned_abs() <= limit
            && self.cy.unsigned_abs() <= limit
            && self.cz.unsigned_abs() <= limit
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    /// World voxel coordinate of the chunk's minimum corner.
    #[inline]
    pub fn base(self) -> (i32, i32, i32) {
        (
            self.cx * CHUNK_SIZE,
            self.cy * CHUNK_SIZE,
            self.cz * CHUNK_SIZE,
        )
    }

    /// Largest per-axis distance in chunks.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx)
            .abs()
            .max((self.cy - other.cy).abs())
            .max((self.cz - other.cz).abs())
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

/// Chunk index along one axis for a world position: `floor(round(x) / S)`.
///
/// Saturates to `±MAX_CHUNK_COORD`; NaN maps to 0.
#[inline]
pub fn chunked(x: f32) -> i32 {
    (x.round() as i32)
        .div_euclid(CHUNK_SIZE)
        .clamp(-MAX_CHUNK_COORD, MAX_CHUNK_COORD)
}

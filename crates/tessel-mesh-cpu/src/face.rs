use tessel_geom::Vec3;

/// Cube faces in emission order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    NegX = 0,
    PosX = 1,
    PosY = 2,
    NegY = 3,
    NegZ = 4,
    PosZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::NegX,
        Face::PosX,
        Face::PosY,
        Face::NegY,
        Face::NegZ,
        Face::PosZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Integer step `(dx, dy, dz)` out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::NegX => (-1, 0, 0),
            Face::PosX => (1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::NegZ => (0, 0, -1),
            Face::PosZ => (0, 0, 1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }
}

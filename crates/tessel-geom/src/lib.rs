//! Geometry primitives for the voxel client: vectors, boxes, matrices and view frusta.
#![forbid(unsafe_code)]

mod frustum;
mod mat;

pub use frustum::Frustum;
pub use mat::Mat4;

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    /// Unit view direction for yaw `rx` and pitch `ry` (radians).
    ///
    /// Yaw 0 looks down -z; yaw pi looks down +z.
    pub fn sight(rx: f32, ry: f32) -> Vec3 {
        let yaw = rx - core::f32::consts::FRAC_PI_2;
        let m = ry.cos();
        Vec3::new(yaw.cos() * m, ry.sin(), yaw.sin() * m)
    }

    /// Horizontal/vertical motion vector for a movement input.
    ///
    /// `sz`/`sx` are the forward/strafe axes in `{-1, 0, 1}`; flying follows pitch.
    pub fn motion(flying: bool, sz: i32, sx: i32, rx: f32, ry: f32) -> Vec3 {
        if sz == 0 && sx == 0 {
            return Vec3::ZERO;
        }
        let strafe = (sz as f32).atan2(sx as f32);
        if flying {
            let mut m = ry.cos();
            let mut y = ry.sin();
            if sx != 0 {
                if sz == 0 {
                    y = 0.0;
                }
                m = 1.0;
            }
            if sz > 0 {
                y = -y;
            }
            Vec3::new((rx + strafe).cos() * m, y, (rx + strafe).sin() * m)
        } else {
            Vec3::new((rx + strafe).cos(), 0.0, (rx + strafe).sin())
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Axis-aligned cube with corner `origin` and edge `size`.
    #[inline]
    pub fn cube(origin: Vec3, size: f32) -> Self {
        Self::new(origin, origin + Vec3::new(size, size, size))
    }

    #[inline]
    pub fn inflate(self, by: f32) -> Self {
        let d = Vec3::new(by, by, by);
        Self::new(self.min - d, self.max + d)
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}

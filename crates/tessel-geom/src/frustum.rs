use crate::{Aabb, Mat4, Vec3};

/// Six clip planes `(a, b, c, d)`; a point is inside a plane when `a*x + b*y + c*z + d >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [[f32; 4]; 6],
}

impl Frustum {
    /// Extracts planes (left, right, bottom, top, near, far) from a combined view-projection matrix.
    pub fn from_matrix(m: &Mat4) -> Self {
        let m = &m.0;
        let mut planes = [[0.0f32; 4]; 6];
        for k in 0..4 {
            let row = k * 4;
            planes[0][k] = m[row + 3] + m[row];
            planes[1][k] = m[row + 3] - m[row];
            planes[2][k] = m[row + 3] + m[row + 1];
            planes[3][k] = m[row + 3] - m[row + 1];
            planes[4][k] = m[row + 3] + m[row + 2];
            planes[5][k] = m[row + 3] - m[row + 2];
        }
        Self { planes }
    }

    #[inline]
    pub fn distance(plane: &[f32; 4], p: Vec3) -> f32 {
        plane[0] * p.x + plane[1] * p.y + plane[2] * p.z + plane[3]
    }

    /// Conservative box test: rejected only when all 8 corners lie behind one plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let corners = aabb.corners();
        self.planes.iter().all(|plane| {
            corners
                .iter()
                .any(|&c| Self::distance(plane, c) >= 0.0)
        })
    }
}

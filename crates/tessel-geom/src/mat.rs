use crate::Vec3;

/// Column-major 4x4 matrix, element `(row, col)` stored at `col * 4 + row`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4(pub [f32; 16]);

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub fn translation(d: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.0[12] = d.x;
        m.0[13] = d.y;
        m.0[14] = d.z;
        m
    }

    /// Rotation by `angle` radians about `axis` (normalized internally).
    pub fn rotation(axis: Vec3, angle: f32) -> Self {
        let Vec3 { x, y, z } = axis.normalized();
        let s = angle.sin();
        let c = angle.cos();
        let m = 1.0 - c;
        Mat4([
            m * x * x + c,
            m * x * y - z * s,
            m * z * x + y * s,
            0.0,
            m * x * y + z * s,
            m * y * y + c,
            m * y * z - x * s,
            0.0,
            m * z * x - y * s,
            m * y * z + x * s,
            m * z * z + c,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, znear: f32, zfar: f32) -> Self {
        let t1 = 2.0 * znear;
        let t2 = right - left;
        let t3 = top - bottom;
        let t4 = zfar - znear;
        Mat4([
            t1 / t2,
            0.0,
            0.0,
            0.0,
            0.0,
            t1 / t3,
            0.0,
            0.0,
            (right + left) / t2,
            (top + bottom) / t3,
            (-zfar - znear) / t4,
            -1.0,
            0.0,
            0.0,
            (-t1 * zfar) / t4,
            0.0,
        ])
    }

    /// Perspective projection; `fov_deg` is the vertical field of view in degrees.
    pub fn perspective(fov_deg: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        let ymax = znear * (fov_deg * core::f32::consts::PI / 360.0).tan();
        let xmax = ymax * aspect;
        Self::frustum(-xmax, xmax, -ymax, ymax, znear, zfar)
    }

    /// `self * rhs`: `rhs` is applied first.
    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [0.0f32; 16];
        for c in 0..4 {
            for r in 0..4 {
                let mut total = 0.0;
                for i in 0..4 {
                    total += a[i * 4 + r] * b[c * 4 + i];
                }
                out[c * 4 + r] = total;
            }
        }
        Mat4(out)
    }

    /// Combined view-projection for an eye at `eye` with yaw `rx` and pitch `ry`.
    pub fn view_projection(eye: Vec3, rx: f32, ry: f32, fov_deg: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        let translate = Mat4::translation(-eye);
        let pitch = Mat4::rotation(Vec3::new(rx.cos(), 0.0, rx.sin()), ry);
        let yaw = Mat4::rotation(Vec3::UP, -rx);
        let proj = Mat4::perspective(fov_deg, aspect, znear, zfar);
        proj.mul(&yaw).mul(&pitch).mul(&translate)
    }

    /// Transforms a point (w = 1), returning clip-space `(x, y, z, w)`.
    pub fn transform(&self, p: Vec3) -> [f32; 4] {
        let m = &self.0;
        let mut out = [0.0f32; 4];
        for (r, o) in out.iter_mut().enumerate() {
            *o = m[r] * p.x + m[4 + r] * p.y + m[8 + r] * p.z + m[12 + r];
        }
        out
    }
}

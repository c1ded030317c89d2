use tessel_geom::{Mat4, Vec3};

use crate::{CornerValues, Face};

const TILE: f32 = 0.0625;
const INSET: f32 = 1.0 / 2048.0;

const CUBE_POSITIONS: [[[f32; 3]; 4]; 6] = [
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]],
    [[1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0]],
    [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
    [[-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0]],
];

const CUBE_UVS: [[[u8; 2]; 4]; 6] = [
    [[0, 0], [1, 0], [0, 1], [1, 1]],
    [[1, 0], [0, 0], [1, 1], [0, 1]],
    [[0, 1], [0, 0], [1, 1], [1, 0]],
    [[0, 0], [0, 1], [1, 0], [1, 1]],
    [[0, 0], [0, 1], [1, 0], [1, 1]],
    [[1, 0], [1, 1], [0, 0], [0, 1]],
];

// Corner order per triangle pair; even faces wind one way, odd faces the other.
const EVEN: [usize; 6] = [0, 3, 2, 0, 1, 3];
const ODD: [usize; 6] = [0, 3, 1, 0, 2, 3];
const EVEN_FLIPPED: [usize; 6] = [0, 1, 2, 1, 3, 2];
const ODD_FLIPPED: [usize; 6] = [0, 2, 1, 2, 3, 1];

const PLANT_POSITIONS: [[[f32; 3]; 4]; 4] = [
    [[0.0, -1.0, -1.0], [0.0, -1.0, 1.0], [0.0, 1.0, -1.0], [0.0, 1.0, 1.0]],
    [[0.0, -1.0, -1.0], [0.0, -1.0, 1.0], [0.0, 1.0, -1.0], [0.0, 1.0, 1.0]],
    [[-1.0, -1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0]],
    [[-1.0, -1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0]],
];

const PLANT_NORMALS: [[f32; 3]; 4] = [
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
];

const PLANT_UVS: [[[u8; 2]; 4]; 4] = [
    [[0, 0], [1, 0], [0, 1], [1, 1]],
    [[1, 0], [0, 0], [1, 1], [0, 1]],
    [[0, 0], [0, 1], [1, 0], [1, 1]],
    [[1, 0], [1, 1], [0, 0], [0, 1]],
];

#[inline]
fn tile_origin(tile: u8) -> (f32, f32) {
    ((tile % 16) as f32 * TILE, (tile / 16) as f32 * TILE)
}

#[inline]
fn push_vertex(out: &mut Vec<f32>, p: Vec3, n: Vec3, u: f32, v: f32, ao: f32, light: f32) {
    out.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, u, v, ao, light]);
}

/// Appends the exposed faces of a cube centred at `center` with half-extent `n`.
///
/// The quad diagonal follows the darker corner pair so AO interpolates without creases.
pub fn make_cube(
    out: &mut Vec<f32>,
    ao: &CornerValues,
    light: &CornerValues,
    exposed: [bool; 6],
    tiles: [u8; 6],
    center: Vec3,
    n: f32,
) {
    let (a, b) = (INSET, TILE - INSET);
    for face in Face::ALL {
        let i = face.index();
        if !exposed[i] {
            continue;
        }
        let (du, dv) = tile_origin(tiles[i]);
        let flip = ao[i][0] + ao[i][3] > ao[i][1] + ao[i][2];
        let order = match (i % 2 == 0, flip) {
            (true, false) => &EVEN,
            (false, false) => &ODD,
            (true, true) => &EVEN_FLIPPED,
            (false, true) => &ODD_FLIPPED,
        };
        let normal = face.normal();
        for &j in order {
            let [px, py, pz] = CUBE_POSITIONS[i][j];
            let [u, v] = CUBE_UVS[i][j];
            push_vertex(
                out,
                center + Vec3::new(px, py, pz) * n,
                normal,
                du + if u != 0 { b } else { a },
                dv + if v != 0 { b } else { a },
                ao[i][j],
                light[i][j],
            );
        }
    }
}

/// Appends four crossed quads for a plant, yawed by `rotation_deg` about its centre.
pub fn make_plant(out: &mut Vec<f32>, ao: f32, light: f32, center: Vec3, n: f32, tile: u8, rotation_deg: f32) {
    let (du, dv) = tile_origin(tile);
    let rotate = Mat4::rotation(Vec3::UP, rotation_deg.to_radians());
    let place = Mat4::translation(center).mul(&rotate);
    for quad in 0..4 {
        let order = if quad % 2 == 0 { &EVEN } else { &ODD };
        let [nx, ny, nz] = PLANT_NORMALS[quad];
        let nr = rotate.transform(Vec3::new(nx, ny, nz));
        let normal = Vec3::new(nr[0], nr[1], nr[2]);
        for &j in order {
            let [px, py, pz] = PLANT_POSITIONS[quad][j];
            let p = place.transform(Vec3::new(px, py, pz) * n);
            let [u, v] = PLANT_UVS[quad][j];
            push_vertex(
                out,
                Vec3::new(p[0], p[1], p[2]),
                normal,
                du + if u != 0 { TILE } else { 0.0 },
                dv + if v != 0 { TILE } else { 0.0 },
                ao,
                light,
            );
        }
    }
}

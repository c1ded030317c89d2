/// Per-face, per-corner scalars in `Face` order.
pub type CornerValues = [[f32; 4]; 6];

// Neighbourhood cells are indexed (dx+1)*9 + (dy+1)*3 + (dz+1); 13 is the voxel itself.
// For each face corner: [diagonal corner, side, side].
const CORNER_SIDES: [[[usize; 3]; 4]; 6] = [
    [[0, 1, 3], [2, 1, 5], [6, 3, 7], [8, 5, 7]],
    [[18, 19, 21], [20, 19, 23], [24, 21, 25], [26, 23, 25]],
    [[6, 7, 15], [8, 7, 17], [24, 15, 25], [26, 17, 25]],
    [[0, 1, 9], [2, 1, 11], [18, 9, 19], [20, 11, 19]],
    [[0, 3, 9], [6, 3, 15], [18, 9, 21], [24, 15, 21]],
    [[2, 5, 11], [8, 5, 17], [20, 11, 23], [26, 17, 23]],
];

// The four cells touching each face corner, sampled for shade and light.
const CORNER_CELLS: [[[usize; 4]; 4]; 6] = [
    [[0, 1, 3, 4], [1, 2, 4, 5], [3, 4, 6, 7], [4, 5, 7, 8]],
    [[18, 19, 21, 22], [19, 20, 22, 23], [21, 22, 24, 25], [22, 23, 25, 26]],
    [[6, 7, 15, 16], [7, 8, 16, 17], [15, 16, 24, 25], [16, 17, 25, 26]],
    [[0, 1, 9, 10], [1, 2, 10, 11], [9, 10, 18, 19], [10, 11, 19, 20]],
    [[0, 3, 9, 12], [3, 6, 12, 15], [9, 12, 18, 21], [12, 15, 21, 24]],
    [[2, 5, 11, 14], [5, 8, 14, 17], [11, 14, 20, 23], [14, 17, 23, 26]],
];

const CURVE: [f32; 4] = [0.0, 0.25, 0.5, 0.75];

const CENTER: usize = 13;

/// Corner darkening and light for all six faces of one voxel.
///
/// `opaque`, `lights` and `shades` describe the 3x3x3 cells around the voxel.
/// AO combines the side/corner occupancy curve with the averaged column
/// shade, clamped to 1. Light is the mean of the four touching cells over 15,
/// or full when the voxel is itself a maximum-intensity source.
pub fn occlusion(opaque: &[bool; 27], lights: &[u8; 27], shades: &[f32; 27]) -> (CornerValues, CornerValues) {
    let mut ao = [[0.0f32; 4]; 6];
    let mut light = [[0.0f32; 4]; 6];
    let is_source = lights[CENTER] == 15;
    for face in 0..6 {
        for corner in 0..4 {
            let [c, s1, s2] = CORNER_SIDES[face][corner];
            let (corner_bit, side1, side2) = (opaque[c], opaque[s1], opaque[s2]);
            let value = if side1 && side2 {
                3
            } else {
                corner_bit as usize + side1 as usize + side2 as usize
            };
            let cells = &CORNER_CELLS[face][corner];
            let shade_sum: f32 = cells.iter().map(|&i| shades[i]).sum();
            let light_sum: u32 = cells.iter().map(|&i| lights[i] as u32).sum();
            ao[face][corner] = (CURVE[value] + shade_sum / 4.0).min(1.0);
            light[face][corner] = if is_source {
                1.0
            } else {
                light_sum as f32 / 15.0 / 4.0
            };
        }
    }
    (ao, light)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_air_is_unoccluded() {
        let (ao, light) = occlusion(&[false; 27], &[0; 27], &[0.0; 27]);
        assert!(ao.iter().flatten().all(|&v| v == 0.0));
        assert!(light.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn two_sides_saturate_curve() {
        let mut opaque = [false; 27];
        // Left face, first corner: sides 1 and 3.
        opaque[1] = true;
        opaque[3] = true;
        let (ao, _) = occlusion(&opaque, &[0; 27], &[0.0; 27]);
        assert_eq!(ao[0][0], 0.75);
        // Second corner of the same face shares only side 1.
        assert_eq!(ao[0][1], 0.25);
    }

    #[test]
    fn shade_adds_and_clamps() {
        let opaque = [true; 27];
        let (ao, _) = occlusion(&opaque, &[0; 27], &[1.0; 27]);
        assert!(ao.iter().flatten().all(|&v| v == 1.0));
    }

    #[test]
    fn light_averages_and_source_forces_full() {
        let mut lights = [0u8; 27];
        lights[22] = 12;
        let (_, light) = occlusion(&[false; 27], &lights, &[0.0; 27]);
        // Cell 22 touches every corner of the +x face.
        assert!(light[1].iter().all(|&v| (v - 0.2).abs() < 1e-6));
        lights[CENTER] = 15;
        let (_, light) = occlusion(&[false; 27], &lights, &[0.0; 27]);
        assert!(light.iter().flatten().all(|&v| v == 1.0));
    }
}

use crate::*;

/// Blocks the player can place, in selection order.
pub const ITEMS: [BlockId; 54] = {
    let mut out = [0u8; 54];
    let named = [
        GRASS,
        SAND,
        STONE,
        BRICK,
        WOOD,
        CEMENT,
        DIRT,
        PLANK,
        SNOW,
        GLASS,
        COBBLE,
        LIGHT_STONE,
        DARK_STONE,
        CHEST,
        LEAVES,
        TALL_GRASS,
        YELLOW_FLOWER,
        RED_FLOWER,
        PURPLE_FLOWER,
        SUN_FLOWER,
        WHITE_FLOWER,
        BLUE_FLOWER,
    ];
    let mut i = 0;
    while i < named.len() {
        out[i] = named[i];
        i += 1;
    }
    let mut c = 0;
    while c < 32 {
        out[named.len() + c] = COLOR_00 + c as u8;
        c += 1;
    }
    out
};

// left, right, top, bottom, front, back
const CUBE_TILES: [[u8; 6]; 17] = [
    [0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1],
    [2, 2, 2, 2, 2, 2],
    [3, 3, 3, 3, 3, 3],
    [4, 4, 4, 4, 4, 4],
    [20, 20, 36, 4, 20, 20],
    [5, 5, 5, 5, 5, 5],
    [6, 6, 6, 6, 6, 6],
    [7, 7, 7, 7, 7, 7],
    [24, 24, 40, 8, 24, 24],
    [9, 9, 9, 9, 9, 9],
    [10, 10, 10, 10, 10, 10],
    [11, 11, 11, 11, 11, 11],
    [12, 12, 12, 12, 12, 12],
    [13, 13, 13, 13, 13, 13],
    [14, 14, 14, 14, 14, 14],
    [15, 15, 15, 15, 15, 15],
];

/// Atlas tile per face for a cube block; unknown ids map to tile 0.
pub fn face_tiles(w: BlockId) -> [u8; 6] {
    match w {
        0..=16 => CUBE_TILES[w as usize],
        COLOR_00..=COLOR_31 => [176 + (w - COLOR_00); 6],
        _ => [0; 6],
    }
}

/// Atlas tile for a plant block; 0 for anything else.
pub fn plant_tile(w: BlockId) -> u8 {
    if is_plant(w) { 48 + (w - TALL_GRASS) } else { 0 }
}

//! Block ids, classification predicates and texture tiles.
#![forbid(unsafe_code)]

mod table;

pub use table::{ITEMS, face_tiles, plant_tile};

/// Voxel value stored in chunk grids: 0 is empty, everything else a block id.
pub type BlockId = u8;

pub const EMPTY: BlockId = 0;
pub const GRASS: BlockId = 1;
pub const SAND: BlockId = 2;
pub const STONE: BlockId = 3;
pub const BRICK: BlockId = 4;
pub const WOOD: BlockId = 5;
pub const CEMENT: BlockId = 6;
pub const DIRT: BlockId = 7;
pub const PLANK: BlockId = 8;
pub const SNOW: BlockId = 9;
pub const GLASS: BlockId = 10;
pub const COBBLE: BlockId = 11;
pub const LIGHT_STONE: BlockId = 12;
pub const DARK_STONE: BlockId = 13;
pub const CHEST: BlockId = 14;
pub const LEAVES: BlockId = 15;
pub const CLOUD: BlockId = 16;
pub const TALL_GRASS: BlockId = 17;
pub const YELLOW_FLOWER: BlockId = 18;
pub const RED_FLOWER: BlockId = 19;
pub const PURPLE_FLOWER: BlockId = 20;
pub const SUN_FLOWER: BlockId = 21;
pub const WHITE_FLOWER: BlockId = 22;
pub const BLUE_FLOWER: BlockId = 23;
pub const COLOR_00: BlockId = 32;
pub const COLOR_31: BlockId = 63;

#[inline]
pub fn is_plant(w: BlockId) -> bool {
    (TALL_GRASS..=BLUE_FLOWER).contains(&w)
}

/// Blocks the player collides with.
#[inline]
pub fn is_obstacle(w: BlockId) -> bool {
    !(w == EMPTY || w == CLOUD || is_plant(w))
}

#[inline]
pub fn is_destructable(w: BlockId) -> bool {
    !(w == EMPTY || w == CLOUD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_table() {
        assert!(!is_obstacle(EMPTY));
        assert!(!is_obstacle(CLOUD));
        assert!(!is_obstacle(RED_FLOWER));
        assert!(is_obstacle(GLASS));
        assert!(!is_destructable(CLOUD));
        assert!(is_destructable(TALL_GRASS));
        assert!(is_plant(BLUE_FLOWER));
        assert!(!is_plant(COLOR_31));
    }

    #[test]
    fn items_are_placeable_blocks() {
        assert_eq!(ITEMS.len(), 54);
        assert!(ITEMS.iter().all(|&w| w != EMPTY && w != CLOUD));
        assert_eq!(ITEMS[0], GRASS);
        assert_eq!(*ITEMS.last().unwrap(), COLOR_31);
    }

    #[test]
    fn tiles_for_multi_face_blocks() {
        // left, right, top, bottom, front, back
        assert_eq!(face_tiles(WOOD), [20, 20, 36, 4, 20, 20]);
        assert_eq!(face_tiles(SNOW), [24, 24, 40, 8, 24, 24]);
        assert_eq!(face_tiles(COLOR_00), [176; 6]);
        assert_eq!(plant_tile(TALL_GRASS), 48);
        assert_eq!(plant_tile(BLUE_FLOWER), 54);
        assert_eq!(plant_tile(STONE), 0);
    }
}

//! Open-addressing coordinate index with linear probing.
//!
//! The table is sized at twice the entry limit so collision runs stay short.
//! Removal compacts the chain behind the freed slot (backward shift), so
//! lookups never need tombstones and never observe a stale match.

use std::fmt;

use crate::ChunkCoord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexError {
    /// The entry limit is reached.
    Full,
    /// `cy < 0` is never a valid key.
    InvalidCoord(ChunkCoord),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Full => write!(f, "spatial index is full"),
            IndexError::InvalidCoord(c) => {
                write!(f, "invalid chunk coordinate ({}, {}, {})", c.cx, c.cy, c.cz)
            }
        }
    }
}

impl std::error::Error for IndexError {}

#[inline]
fn mix(v: u32) -> u32 {
    let mut v = v;
    v = ((v >> 16) ^ v).wrapping_mul(0x45d9f3b);
    v = ((v >> 16) ^ v).wrapping_mul(0x45d9f3b);
    (v >> 16) ^ v
}

/// Avalanche hash of a chunk coordinate. Sign is discarded per axis.
#[inline]
pub fn coord_hash(c: ChunkCoord) -> u32 {
    mix(c.cx.unsigned_abs()) ^ mix(c.cy.unsigned_abs()) ^ mix(c.cz.unsigned_abs())
}

#[derive(Clone, Debug)]
struct Entry<V> {
    coord: ChunkCoord,
    value: V,
}

#[derive(Clone, Debug)]
pub struct SpatialIndex<V> {
    table: Vec<Option<Entry<V>>>,
    len: usize,
    max_entries: usize,
}

impl<V> SpatialIndex<V> {
    pub fn with_capacity(max_entries: usize) -> Self {
        let size = (max_entries * 2).max(2);
        let mut table = Vec::with_capacity(size);
        table.resize_with(size, || None);
        Self {
            table,
            len: 0,
            max_entries,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len >= self.max_entries
    }

    #[inline]
    pub fn table_size(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn preferred_slot(&self, coord: ChunkCoord) -> usize {
        coord_hash(coord) as usize % self.table.len()
    }

    /// Slot holding `coord`, if present.
    pub fn find(&self, coord: ChunkCoord) -> Option<usize> {
        if !coord.is_valid() {
            return None;
        }
        let n = self.table.len();
        let mut i = self.preferred_slot(coord);
        // The load factor keeps at least one empty slot, so this terminates.
        while let Some(entry) = &self.table[i] {
            if entry.coord == coord {
                return Some(i);
            }
            i = (i + 1) % n;
        }
        None
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&V> {
        self.find(coord).and_then(|i| self.slot(i)).map(|(_, v)| v)
    }

    pub fn slot(&self, slot: usize) -> Option<(ChunkCoord, &V)> {
        self.table
            .get(slot)
            .and_then(|e| e.as_ref())
            .map(|e| (e.coord, &e.value))
    }

    /// Inserts or replaces the value for `coord`, returning its slot.
    pub fn upsert(&mut self, coord: ChunkCoord, value: V) -> Result<usize, IndexError> {
        if !coord.is_valid() {
            return Err(IndexError::InvalidCoord(coord));
        }
        let n = self.table.len();
        let mut i = self.preferred_slot(coord);
        loop {
            match &mut self.table[i] {
                Some(entry) if entry.coord == coord => {
                    entry.value = value;
                    return Ok(i);
                }
                Some(_) => i = (i + 1) % n,
                None => break,
            }
        }
        if self.is_full() {
            return Err(IndexError::Full);
        }
        self.table[i] = Some(Entry { coord, value });
        self.len += 1;
        Ok(i)
    }

    /// Empties `slot` and shifts later members of its collision run back.
    pub fn remove(&mut self, slot: usize) -> Option<(ChunkCoord, V)> {
        let removed = self.table.get_mut(slot)?.take()?;
        self.len -= 1;
        let n = self.table.len();
        let mut gap = slot;
        let mut j = slot;
        loop {
            j = (j + 1) % n;
            let home = match &self.table[j] {
                Some(entry) => self.preferred_slot(entry.coord),
                None => break,
            };
            // An entry may stay only if its home lies cyclically in (gap, j].
            let stays = if gap <= j {
                gap < home && home <= j
            } else {
                gap < home || home <= j
            };
            if !stays {
                self.table[gap] = self.table[j].take();
                gap = j;
            }
        }
        Some((removed.coord, removed.value))
    }

    pub fn remove_coord(&mut self, coord: ChunkCoord) -> Option<V> {
        let slot = self.find(coord)?;
        self.remove(slot).map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.table.iter_mut().for_each(|e| *e = None);
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &V)> + '_ {
        self.table
            .iter()
            .filter_map(|e| e.as_ref().map(|e| (e.coord, &e.value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colliding(index: &SpatialIndex<u32>, home: usize, count: usize) -> Vec<ChunkCoord> {
        let mut out = Vec::new();
        let mut i = 0;
        while out.len() < count {
            let c = ChunkCoord::new(i, 0, 0);
            if index.preferred_slot(c) == home {
                out.push(c);
            }
            i += 1;
        }
        out
    }

    #[test]
    fn hash_ignores_sign() {
        assert_eq!(
            coord_hash(ChunkCoord::new(-3, 2, -9)),
            coord_hash(ChunkCoord::new(3, 2, 9))
        );
    }

    #[test]
    fn negative_cy_is_absent_and_rejected() {
        let mut idx = SpatialIndex::with_capacity(8);
        let c = ChunkCoord::new(0, -1, 0);
        assert_eq!(idx.upsert(c, 1u32), Err(IndexError::InvalidCoord(c)));
        assert_eq!(idx.find(c), None);
    }

    #[test]
    fn full_index_rejects_new_keys_but_updates_existing() {
        let mut idx = SpatialIndex::with_capacity(2);
        idx.upsert(ChunkCoord::new(0, 0, 0), 1u32).unwrap();
        idx.upsert(ChunkCoord::new(1, 0, 0), 2).unwrap();
        assert_eq!(idx.upsert(ChunkCoord::new(2, 0, 0), 3), Err(IndexError::Full));
        idx.upsert(ChunkCoord::new(1, 0, 0), 7).unwrap();
        assert_eq!(idx.get(ChunkCoord::new(1, 0, 0)), Some(&7));
    }

    #[test]
    fn removal_shifts_chain_across_wraparound() {
        let mut idx = SpatialIndex::with_capacity(8);
        let last = idx.table_size() - 1;
        let keys = colliding(&idx, last, 3);
        for (v, c) in keys.iter().enumerate() {
            idx.upsert(*c, v as u32).unwrap();
        }
        // Chain occupies the last slot then wraps to 0 and 1.
        assert_eq!(idx.find(keys[0]), Some(last));
        assert_eq!(idx.find(keys[1]), Some(0));
        assert_eq!(idx.find(keys[2]), Some(1));

        idx.remove_coord(keys[0]);
        assert_eq!(idx.find(keys[0]), None);
        assert_eq!(idx.find(keys[1]), Some(last));
        assert_eq!(idx.find(keys[2]), Some(0));
        assert!(idx.slot(1).is_none());
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn removal_keeps_entries_already_at_home() {
        let mut idx = SpatialIndex::with_capacity(8);
        let a = colliding(&idx, 3, 1)[0];
        let b = colliding(&idx, 4, 1)[0];
        idx.upsert(a, 1u32).unwrap();
        idx.upsert(b, 2).unwrap();
        idx.remove_coord(a);
        assert_eq!(idx.find(b), Some(4));
    }
}

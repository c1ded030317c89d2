use hashbrown::HashMap;

use crate::CHUNK_SIZE;

pub const MAX_LIGHT: u8 = 15;

/// Sparse light sources of one chunk, keyed by local voxel position.
///
/// Stored values are always in `1..=15`; writing 0 removes the entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LightMap {
    entries: HashMap<u16, u8>,
}

impl LightMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn key(x: usize, y: usize, z: usize) -> u16 {
        let s = CHUNK_SIZE as usize;
        (x + z * s + y * s * s) as u16
    }

    #[inline]
    fn unkey(k: u16) -> (usize, usize, usize) {
        let s = CHUNK_SIZE as usize;
        let k = k as usize;
        (k % s, k / (s * s), (k / s) % s)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.entries.get(&Self::key(x, y, z)).copied().unwrap_or(0)
    }

    /// Sets the intensity, clamped to 15. Returns true when the stored value changed.
    pub fn set(&mut self, x: usize, y: usize, z: usize, w: u8) -> bool {
        let w = w.min(MAX_LIGHT);
        let key = Self::key(x, y, z);
        if w == 0 {
            self.entries.remove(&key).is_some()
        } else {
            self.entries.insert(key, w) != Some(w)
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Local `(x, y, z, w)` for every source, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize, u8)> + '_ {
        self.entries.iter().map(|(&k, &w)| {
            let (x, y, z) = Self::unkey(k);
            (x, y, z, w)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_removes_and_values_clamp() {
        let mut m = LightMap::new();
        assert!(m.set(1, 2, 3, 40));
        assert_eq!(m.get(1, 2, 3), 15);
        assert!(!m.set(1, 2, 3, 15));
        assert!(m.set(1, 2, 3, 0));
        assert!(m.is_empty());
        assert!(!m.set(1, 2, 3, 0));
    }

    #[test]
    fn iter_returns_local_positions() {
        let mut m = LightMap::new();
        m.set(31, 0, 7, 9);
        m.set(0, 31, 31, 4);
        let mut v: Vec<_> = m.iter().collect();
        v.sort();
        assert_eq!(v, vec![(0, 31, 31, 4), (31, 0, 7, 9)]);
    }
}

/// Cubic scratch grid addressed in world coordinates through an origin offset.
///
/// Reused between builds: `reset` refills without reallocating.
#[derive(Clone, Debug)]
pub struct PaddedVolume<T> {
    side: usize,
    origin: (i32, i32, i32),
    cells: Vec<T>,
}

impl<T: Copy + Default> PaddedVolume<T> {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            origin: (0, 0, 0),
            cells: vec![T::default(); side * side * side],
        }
    }

    pub fn reset(&mut self, origin: (i32, i32, i32)) {
        self.origin = origin;
        self.cells.fill(T::default());
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32, i32) {
        self.origin
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.side + z) * self.side + x
    }

    /// Local coordinates of a world position, if inside the volume.
    #[inline]
    pub fn local(&self, x: i32, y: i32, z: i32) -> Option<(usize, usize, usize)> {
        let n = self.side as i32;
        let (lx, ly, lz) = (x - self.origin.0, y - self.origin.1, z - self.origin.2);
        if (0..n).contains(&lx) && (0..n).contains(&ly) && (0..n).contains(&lz) {
            Some((lx as usize, ly as usize, lz as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.cells[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: T) {
        let i = self.idx(x, y, z);
        self.cells[i] = v;
    }
}

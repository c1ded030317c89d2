use crate::PaddedVolume;

const STEPS: [(isize, isize, isize); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// Stack-based light propagation; keeps its stack allocation between calls.
///
/// Intensity drops by one per face step. A cell is entered only when the
/// incoming value beats what it already holds and, except for the source
/// itself, when it is not opaque.
#[derive(Debug, Default)]
pub struct FloodFill {
    stack: Vec<(usize, usize, usize, u8)>,
    focus: Option<(usize, usize)>,
}

impl FloodFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts propagation to cells that can still reach the local cube `lo..=hi` on every axis.
    pub fn with_focus(lo: usize, hi: usize) -> Self {
        Self {
            stack: Vec::new(),
            focus: Some((lo, hi)),
        }
    }

    #[inline]
    fn can_reach_focus(&self, x: usize, y: usize, z: usize, w: u8) -> bool {
        let Some((lo, hi)) = self.focus else {
            return true;
        };
        let w = w as usize;
        [x, y, z].iter().all(|&v| v + w >= lo && v <= hi + w)
    }

    /// Floods from local `(x, y, z)` with intensity `w`.
    pub fn fill(
        &mut self,
        opaque: &PaddedVolume<bool>,
        light: &mut PaddedVolume<u8>,
        x: usize,
        y: usize,
        z: usize,
        w: u8,
    ) {
        if w == 0 || !self.can_reach_focus(x, y, z, w) || light.get(x, y, z) >= w {
            return;
        }
        light.set(x, y, z, w);
        self.push_neighbours(light.side(), x, y, z, w - 1);
        while let Some((x, y, z, w)) = self.stack.pop() {
            if w == 0 || !self.can_reach_focus(x, y, z, w) {
                continue;
            }
            if light.get(x, y, z) >= w || opaque.get(x, y, z) {
                continue;
            }
            light.set(x, y, z, w);
            self.push_neighbours(light.side(), x, y, z, w - 1);
        }
    }

    fn push_neighbours(&mut self, side: usize, x: usize, y: usize, z: usize, w: u8) {
        if w == 0 {
            return;
        }
        for (dx, dy, dz) in STEPS {
            let (Some(nx), Some(ny), Some(nz)) = (
                x.checked_add_signed(dx),
                y.checked_add_signed(dy),
                z.checked_add_signed(dz),
            ) else {
                continue;
            };
            if nx < side && ny < side && nz < side {
                self.stack.push((nx, ny, nz, w));
            }
        }
    }
}

//! Connected-component speckle removal.

use radar_common::PolarGrid;

use crate::ScanFilter;

/// Removes small isolated echo regions.
///
/// Labels 4-connected components of valid (non-`NaN`) gates and blanks any
/// component smaller than `min_area`. The ray axis wraps, matching the
/// circular azimuth of the other ray-direction filters. Labeling uses
/// union-find with path compression rather than recursive flood fill, which
/// keeps large contiguous echo regions off the call stack.
#[derive(Debug, Clone, Copy)]
pub struct SpeckleRemovalFilter {
    min_area: usize,
}

impl SpeckleRemovalFilter {
    pub fn new(min_area: usize) -> Self {
        Self { min_area }
    }
}

/// Union-find over grid cells, path-compressed and united by size.
struct DisjointSet {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            // Path halving: point every other node at its grandparent.
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra as usize] >= self.size[rb as usize] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
    }
}

impl ScanFilter for SpeckleRemovalFilter {
    fn name(&self) -> &'static str {
        "speckle_removal"
    }

    fn apply(&self, grid: &mut PolarGrid) {
        let n_rays = grid.n_rays();
        let n_bins = grid.n_bins();
        if n_rays == 0 || n_bins == 0 || self.min_area <= 1 {
            return;
        }

        let idx = |ray: usize, bin: usize| (ray * n_bins + bin) as u32;
        let mut sets = DisjointSet::new(n_rays * n_bins);

        for ray in 0..n_rays {
            for bin in 0..n_bins {
                if grid.get(ray, bin).is_nan() {
                    continue;
                }
                // Unite with the already-visited neighbors: previous bin and
                // previous ray. The n_rays-1 row closes the azimuth circle
                // back to ray 0.
                if bin > 0 && !grid.get(ray, bin - 1).is_nan() {
                    sets.union(idx(ray, bin), idx(ray, bin - 1));
                }
                if ray > 0 && !grid.get(ray - 1, bin).is_nan() {
                    sets.union(idx(ray, bin), idx(ray - 1, bin));
                }
                if ray == n_rays - 1 && n_rays > 2 && !grid.get(0, bin).is_nan() {
                    sets.union(idx(ray, bin), idx(0, bin));
                }
            }
        }

        for ray in 0..n_rays {
            for bin in 0..n_bins {
                if grid.get(ray, bin).is_nan() {
                    continue;
                }
                let root = sets.find(idx(ray, bin));
                if (sets.size[root as usize] as usize) < self.min_area {
                    grid.set(ray, bin, f32::NAN);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::grid_with_block;

    #[test]
    fn test_small_component_removed() {
        // 2x2 block = 4 cells, below min_area 5.
        let mut grid = grid_with_block(16, 16, 4..6, 4..6, 30.0);

        SpeckleRemovalFilter::new(5).apply(&mut grid);

        assert!(grid.samples().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_large_component_untouched() {
        // 3x3 block = 9 cells, at or above min_area 5.
        let mut grid = grid_with_block(16, 16, 4..7, 4..7, 30.0);

        SpeckleRemovalFilter::new(5).apply(&mut grid);

        let valid = grid.samples().iter().filter(|v| !v.is_nan()).count();
        assert_eq!(valid, 9);
    }

    #[test]
    fn test_mixed_components() {
        let mut grid = grid_with_block(16, 16, 2..5, 2..5, 30.0);
        // A lone distant cell is speckle.
        grid.set(12, 12, 45.0);

        SpeckleRemovalFilter::new(5).apply(&mut grid);

        assert!(grid.get(12, 12).is_nan());
        assert_eq!(grid.get(3, 3), 30.0);
    }

    #[test]
    fn test_component_spanning_ray_seam() {
        // Three cells in ray 15 plus three in ray 0 form one 6-cell
        // component across the azimuth seam.
        let mut grid = grid_with_block(16, 16, 15..16, 4..7, 30.0);
        for bin in 4..7 {
            grid.set(0, bin, 30.0);
        }

        SpeckleRemovalFilter::new(6).apply(&mut grid);

        let valid = grid.samples().iter().filter(|v| !v.is_nan()).count();
        assert_eq!(valid, 6);
    }

    #[test]
    fn test_min_area_one_is_noop() {
        let mut grid = grid_with_block(8, 8, 3..4, 3..4, 30.0);
        SpeckleRemovalFilter::new(1).apply(&mut grid);
        assert_eq!(grid.get(3, 3), 30.0);
    }
}

use std::{cell::OnceCell, iter};

use evotris_engine::Grid;

const NUM_COLS: usize = Grid::NUM_COLS;

/// Column metrics of a grid, computed on first use.
///
/// Heights are measured from the floor: a column whose topmost block sits in row `r` has
/// height `NUM_ROWS - r`, and an empty column has height 0. A hole is an empty cell strictly
/// below the topmost block of its column.
#[derive(Debug)]
pub struct BoardAnalysis {
    grid: Grid,
    column_heights: OnceCell<[u8; NUM_COLS]>,
    column_occupied_cells: OnceCell<[u8; NUM_COLS]>,
    max_height: OnceCell<u8>,
    total_height: OnceCell<u32>,
    num_holes: OnceCell<u32>,
    bumpiness: OnceCell<u32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            grid: grid.clone(),
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
            max_height: OnceCell::new(),
            total_height: OnceCell::new(),
            num_holes: OnceCell::new(),
            bumpiness: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn column_heights(&self) -> &[u8; NUM_COLS] {
        self.column_heights.get_or_init(|| {
            let mut column_heights = [0; NUM_COLS];
            for (x, h) in column_heights.iter_mut().enumerate() {
                let top = (0..Grid::NUM_ROWS).find(|&y| self.grid.is_occupied(y, x));
                if let Some(top) = top {
                    *h = u8::try_from(Grid::NUM_ROWS - top).unwrap_or(u8::MAX);
                }
            }
            column_heights
        })
    }

    #[must_use]
    pub fn column_occupied_cells(&self) -> &[u8; NUM_COLS] {
        self.column_occupied_cells.get_or_init(|| {
            let mut column_occupied_cells = [0; NUM_COLS];
            for row in self.grid.rows() {
                for (o, block) in iter::zip(&mut column_occupied_cells, row) {
                    if block.is_occupied() {
                        *o += 1;
                    }
                }
            }
            column_occupied_cells
        })
    }

    #[must_use]
    pub fn max_height(&self) -> u8 {
        *self
            .max_height
            .get_or_init(|| self.column_heights().iter().copied().max().unwrap_or(0))
    }

    #[must_use]
    pub fn total_height(&self) -> u32 {
        *self
            .total_height
            .get_or_init(|| self.column_heights().iter().map(|&h| u32::from(h)).sum())
    }

    #[must_use]
    pub fn num_holes(&self) -> u32 {
        *self.num_holes.get_or_init(|| {
            iter::zip(self.column_heights(), self.column_occupied_cells())
                .map(|(&h, &occ)| u32::from(h - occ))
                .sum()
        })
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> u32 {
        *self.bumpiness.get_or_init(|| {
            self.column_heights()
                .windows(2)
                .map(|w| u32::from(w[0].abs_diff(w[1])))
                .sum()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_has_no_metrics() {
        let analysis = BoardAnalysis::from_grid(&Grid::EMPTY);
        assert_eq!(analysis.column_heights(), &[0; NUM_COLS]);
        assert_eq!(analysis.total_height(), 0);
        assert_eq!(analysis.num_holes(), 0);
        assert_eq!(analysis.bumpiness(), 0);
        assert_eq!(analysis.max_height(), 0);
    }

    #[test]
    fn test_heights_are_measured_from_the_floor() {
        let grid = Grid::from_ascii(
            "
            #.........
            #...#.....
            ##..#....#
            ",
        );
        let analysis = BoardAnalysis::from_grid(&grid);
        assert_eq!(analysis.column_heights(), &[3, 1, 0, 0, 2, 0, 0, 0, 0, 1]);
        assert_eq!(analysis.total_height(), 7);
        assert_eq!(analysis.max_height(), 3);
    }

    #[test]
    fn test_holes_count_empty_cells_below_the_top() {
        let grid = Grid::from_ascii(
            "
            ##........
            ..........
            .#...#....
            ##...#...#
            ",
        );
        let analysis = BoardAnalysis::from_grid(&grid);
        // column 0: two gaps; column 1: one gap; column 5: none
        assert_eq!(analysis.num_holes(), 2 + 1);
    }

    #[test]
    fn test_bumpiness_sums_adjacent_differences() {
        let grid = Grid::from_ascii(
            "
            #.........
            #.#.......
            #.#......#
            ",
        );
        let analysis = BoardAnalysis::from_grid(&grid);
        // heights [3,0,2,0,0,0,0,0,0,1]
        assert_eq!(analysis.bumpiness(), 3 + 2 + 2 + 1);
    }
}

use std::fmt::{self, Write as _};

use super::piece::{Piece, PieceKind};

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Occupied cell without piece identity (test fixtures, imported boards).
    Filled,
    /// Locked cell of a specific piece type.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }
}

/// Playfield occupancy, 20 rows × 10 columns, row 0 at the top.
///
/// `Grid` is a plain value: cloning it produces an independent copy, which is what the
/// search relies on when it simulates candidate placements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: [[Block; Grid::NUM_COLS]; Grid::NUM_ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const NUM_ROWS: usize = 20;
    pub const NUM_COLS: usize = 10;

    pub const EMPTY: Self = Self {
        rows: [[Block::Empty; Self::NUM_COLS]; Self::NUM_ROWS],
    };

    fn index(row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok().filter(|r| *r < Self::NUM_ROWS)?;
        let col = usize::try_from(col).ok().filter(|c| *c < Self::NUM_COLS)?;
        Some((row, col))
    }

    /// Returns `true` if `(row, col)` lies inside the grid.
    #[must_use]
    pub fn is_inside(row: i32, col: i32) -> bool {
        Self::index(row, col).is_some()
    }

    /// Returns `true` if `(row, col)` lies inside the grid and is empty.
    #[must_use]
    pub fn is_empty_at(&self, row: i32, col: i32) -> bool {
        Self::index(row, col).is_some_and(|(r, c)| self.rows[r][c].is_empty())
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.rows[row][col].is_occupied()
    }

    pub fn set_block(&mut self, row: usize, col: usize, block: Block) {
        self.rows[row][col] = block;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Block; Self::NUM_COLS]> + '_ {
        self.rows.iter()
    }

    /// Returns `true` if every cell of `piece` lies inside the grid.
    #[must_use]
    pub fn contains(&self, piece: &Piece) -> bool {
        piece.cells().iter().all(|&(r, c)| Self::is_inside(r, c))
    }

    /// Returns `true` if every cell of `piece` lies inside the grid on an empty cell.
    #[must_use]
    pub fn fits(&self, piece: &Piece) -> bool {
        piece.cells().iter().all(|&(r, c)| self.is_empty_at(r, c))
    }

    /// Writes the cells of `piece` into the grid.
    ///
    /// Cells outside the grid are dropped.
    pub fn fill_piece(&mut self, piece: &Piece) {
        for (r, c) in piece.cells() {
            if let Some((r, c)) = Self::index(r, c) {
                self.rows[r][c] = Block::Piece(piece.kind());
            }
        }
    }

    /// Removes every completely filled row, shifts the rows above it down, and returns the
    /// number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut count = 0;
        for row in (0..Self::NUM_ROWS).rev() {
            if self.rows[row].iter().all(|b| b.is_occupied()) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[row + count] = self.rows[row];
            }
        }
        self.rows[..count].fill([Block::Empty; Self::NUM_COLS]);
        count
    }

    /// Creates a grid from ASCII art for testing.
    ///
    /// `#` is an occupied cell and `.` an empty one. Each line must have exactly 10 cells.
    /// The given lines fill the *bottom* rows of the grid, so short fixtures only need to
    /// describe the stack.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut grid = Self::EMPTY;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(lines.len() <= Self::NUM_ROWS, "too many rows: {}", lines.len());

        let top = Self::NUM_ROWS - lines.len();
        for (y, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                Self::NUM_COLS,
                "Each row must have exactly {} cells, got {} at row {}",
                Self::NUM_COLS,
                cells.len(),
                y
            );
            for (x, ch) in cells.into_iter().enumerate() {
                if ch == '#' {
                    grid.rows[top + y][x] = Block::Filled;
                }
            }
        }
        grid
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for block in row {
                f.write_char(match block {
                    Block::Empty => '.',
                    Block::Filled => '#',
                    Block::Piece(kind) => kind.as_char(),
                })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid() {
        let grid = Grid::EMPTY;
        for row in 0..Grid::NUM_ROWS {
            for col in 0..Grid::NUM_COLS {
                assert!(!grid.is_occupied(row, col));
            }
        }
    }

    #[test]
    fn test_is_inside_bounds() {
        assert!(Grid::is_inside(0, 0));
        assert!(Grid::is_inside(19, 9));
        assert!(!Grid::is_inside(-1, 0));
        assert!(!Grid::is_inside(0, -1));
        assert!(!Grid::is_inside(20, 0));
        assert!(!Grid::is_inside(0, 10));
    }

    #[test]
    fn test_from_ascii_aligns_to_bottom() {
        let grid = Grid::from_ascii(
            "
            #.........
            ##########
            ",
        );
        assert!(grid.is_occupied(18, 0));
        assert!(!grid.is_occupied(18, 1));
        assert!((0..Grid::NUM_COLS).all(|c| grid.is_occupied(19, c)));
        assert!(!grid.is_occupied(17, 0));
    }

    #[test]
    fn test_clear_full_rows_single() {
        let mut grid = Grid::from_ascii(
            "
            #.........
            ##########
            ",
        );
        assert_eq!(grid.clear_full_rows(), 1);
        assert_eq!(
            grid,
            Grid::from_ascii(
                "
                #.........
                "
            )
        );
    }

    #[test]
    fn test_clear_full_rows_non_adjacent() {
        let mut grid = Grid::from_ascii(
            "
            ##########
            .#........
            ##########
            ..#.......
            ",
        );
        assert_eq!(grid.clear_full_rows(), 2);
        assert_eq!(
            grid,
            Grid::from_ascii(
                "
                .#........
                ..#.......
                "
            )
        );
    }

    #[test]
    fn test_contains_and_fits() {
        let grid = Grid::from_ascii(
            "
            ####......
            ",
        );
        let piece = Piece::with_position(PieceKind::O, 0, 18, 0);
        assert!(grid.contains(&piece));
        assert!(!grid.fits(&piece));

        let outside = Piece::with_position(PieceKind::O, 0, 0, -1);
        assert!(!grid.contains(&outside));
        assert!(!grid.fits(&outside));

        let free = Piece::with_position(PieceKind::O, 0, 17, 0);
        assert!(grid.fits(&free));
    }

    #[test]
    fn test_fill_piece_ignores_cells_outside() {
        let mut grid = Grid::EMPTY;
        grid.fill_piece(&Piece::new(PieceKind::I).moved(0, 6));
        assert!(grid.is_occupied(0, 9));
        assert_eq!(grid.rows().flatten().filter(|b| b.is_occupied()).count(), 1);
    }
}

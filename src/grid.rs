use ndarray::Array2;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Cell {
    Open,
    Wall,
}

/// Immutable wall layout.
///
/// Cells are stored row-major in an `Array2` indexed `[[y, x]]`, so a grid
/// literal reads top to bottom the way it is printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// Build a grid from rows of cell codes: `0` is open, `1` is a wall.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Grid> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(Error::EmptyGrid);
        }
        let mut cells = Array2::from_elem((height, width), Cell::Open);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::RaggedGrid { row: y, expected: width, found: row.len() });
            }
            for (x, &code) in row.iter().enumerate() {
                cells[[y, x]] = match code {
                    0 => Cell::Open,
                    1 => Cell::Wall,
                    _ => return Err(Error::UnknownCell { code, x, y }),
                };
            }
        }
        Ok(Grid { cells })
    }

    /// An all-open grid.
    pub fn open(width: usize, height: usize) -> Result<Grid> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyGrid);
        }
        Ok(Grid { cells: Array2::from_elem((height, width), Cell::Open) })
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height()
    }

    /// Out-of-bounds cells count as walls.
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.cells.get([y, x]).map_or(true, |c| *c == Cell::Wall)
    }

    /// Neighbour of `(x, y)` shifted by `(dx, dy)`, or `None` when that
    /// leaves the grid or lands on a wall.
    pub fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        if self.is_wall(nx, ny) {
            return None;
        }
        Some((nx, ny))
    }

    /// Fail unless `(x, y)` is an open cell. `what` names the cell in the error.
    pub fn check_open(&self, what: &'static str, x: usize, y: usize) -> Result<()> {
        if !self.contains(x, y) {
            return Err(Error::OutOfBounds {
                what, x, y, width: self.width(), height: self.height(),
            });
        }
        if self.is_wall(x, y) {
            return Err(Error::OnWall { what, x, y });
        }
        Ok(())
    }
}

//! Dense structure grid describing which cells block beams.

use astral_beam_core::{CellCoord, Fill};

/// Row-major grid of optional structures.
#[derive(Clone, Debug)]
pub(crate) struct ObstacleGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<Fill>>,
}

impl ObstacleGrid {
    /// Creates an empty grid with the provided dimensions.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    pub(crate) fn fill(&self, cell: CellCoord) -> Option<Fill> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Stores a structure in the cell, returning `false` when the cell is off the grid.
    pub(crate) fn place(&mut self, cell: CellCoord, fill: Fill) -> bool {
        match self.index(cell) {
            Some(index) => {
                self.cells[index] = Some(fill);
                true
            }
            None => false,
        }
    }

    /// Clears the cell, returning the structure that occupied it.
    pub(crate) fn remove(&mut self, cell: CellCoord) -> Option<Fill> {
        self.index(cell).and_then(|index| self.cells[index].take())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        Some(row * width + column)
    }
}

//! Gap-free cell enumeration along a straight line of sight.

use crate::CellCoord;

/// Iterator over every grid cell touched by the segment joining two cell centres.
///
/// The walk advances one axis at a time so consecutive cells always share an
/// edge. When the segment passes exactly through a cell corner both corner
/// neighbours are yielded before the diagonal cell, so an obstruction touching
/// the line can never be stepped over.
#[derive(Clone, Debug)]
pub struct LineOfSight {
    cursor: CellCoord,
    step_column: i32,
    step_row: i32,
    span_column: i64,
    span_row: i64,
    error: i64,
    remaining: u64,
    pending: [Option<CellCoord>; 2],
    finished: bool,
}

impl LineOfSight {
    /// Creates an enumerator walking from `start` to `end`, both inclusive.
    #[must_use]
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        let delta_column = i64::from(end.column()) - i64::from(start.column());
        let delta_row = i64::from(end.row()) - i64::from(start.row());
        let columns = delta_column.abs();
        let rows = delta_row.abs();

        Self {
            cursor: start,
            step_column: if delta_column < 0 { -1 } else { 1 },
            step_row: if delta_row < 0 { -1 } else { 1 },
            span_column: columns * 2,
            span_row: rows * 2,
            error: columns - rows,
            remaining: columns.unsigned_abs() + rows.unsigned_abs(),
            pending: [None, None],
            finished: false,
        }
    }

    fn take_pending(&mut self) -> Option<CellCoord> {
        if let Some(cell) = self.pending[0].take() {
            self.pending[0] = self.pending[1].take();
            return Some(cell);
        }
        None
    }
}

impl Iterator for LineOfSight {
    type Item = CellCoord;

    fn next(&mut self) -> Option<CellCoord> {
        if let Some(cell) = self.take_pending() {
            return Some(cell);
        }

        if self.finished {
            return None;
        }

        let current = self.cursor;
        if self.remaining == 0 {
            self.finished = true;
            return Some(current);
        }

        if self.error > 0 {
            self.cursor = current.offset(self.step_column, 0);
            self.error -= self.span_row;
            self.remaining -= 1;
        } else if self.error < 0 {
            self.cursor = current.offset(0, self.step_row);
            self.error += self.span_column;
            self.remaining -= 1;
        } else {
            // exact corner crossing
            self.pending = [
                Some(current.offset(self.step_column, 0)),
                Some(current.offset(0, self.step_row)),
            ];
            self.cursor = current.offset(self.step_column, self.step_row);
            self.error += self.span_column - self.span_row;
            self.remaining = self.remaining.saturating_sub(2);
        }

        Some(current)
    }
}

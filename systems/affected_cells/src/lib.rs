#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves the grid cells swept by every strand of a beam.

use std::collections::BTreeSet;

use astral_beam_core::{BeamConfig, CellCoord, GridQuery};
use astral_beam_system_tracing::{BeamGeometry, StrandAnchor};
use glam::Vec3;

/// Affected-cell resolver that reuses a scratch set between pulses.
#[derive(Debug, Default)]
pub struct AffectedCells {
    scratch: BTreeSet<CellCoord>,
}

impl AffectedCells {
    /// Creates a new resolver with an empty scratch set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the union of cells occupied by the beam's strands.
    ///
    /// Strands start at the logical origin. Each strand stops at the first cell
    /// off the grid, or just after the first fully-filling cell, which is itself
    /// included. The caster's cell is never reported. The output buffer is
    /// cleared and filled in ascending cell order without duplicates.
    pub fn handle<G>(
        &mut self,
        grid: &G,
        geometry: &BeamGeometry,
        max_range: f32,
        caster_cell: CellCoord,
        out: &mut Vec<CellCoord>,
    ) where
        G: GridQuery,
    {
        out.clear();
        self.scratch.clear();

        if max_range.is_nan() || max_range <= 0.0 {
            return;
        }

        let direction = geometry.direction();
        for strand in geometry.strands(StrandAnchor::LogicalOrigin) {
            let end = strand.start + direction * max_range;
            let cells = grid.cells_on_line(
                CellCoord::containing(strand.start),
                CellCoord::containing(end),
            );
            for cell in cells {
                if !grid.in_bounds(cell) {
                    break;
                }
                if cell == caster_cell {
                    continue;
                }

                let _ = self.scratch.insert(cell);
                if grid.is_fully_obstructed(cell) {
                    break;
                }
            }
        }

        out.extend(self.scratch.iter().copied());
    }
}

/// Resolves the affected cells of a configured beam fired from the caster's current position.
///
/// Degenerate aiming, where caster and target coincide, affects no cells.
#[must_use]
pub fn resolve_affected_cells<G>(
    grid: &G,
    config: &BeamConfig,
    caster_position: Vec3,
    caster_cell: CellCoord,
) -> Vec<CellCoord>
where
    G: GridQuery,
{
    let mut cells = Vec::new();
    if let Some(geometry) = BeamGeometry::from_positions(
        caster_position,
        config.target_position,
        config.strand_count,
    ) {
        AffectedCells::new().handle(grid, &geometry, config.max_range, caster_cell, &mut cells);
    }
    cells
}

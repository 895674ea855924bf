#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure beam geometry and strand collision tracing.
//!
//! [`BeamGeometry`] turns a caster, a target and a strand count into parallel
//! strand rays. [`trace_strand`] walks one ray across the grid and reports
//! how far it travels before a fully-filling structure stops it.

mod geometry;

use astral_beam_core::{CellCoord, GridQuery};
use glam::Vec2;

pub use geometry::{BeamGeometry, Strand, StrandAnchor, LOGICAL_ORIGIN_ADVANCE};

const PARALLEL_EPSILON: f32 = 1.0e-6;

/// Outcome of tracing a single strand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResult {
    /// Distance travelled by the strand, never exceeding the max range.
    pub distance: f32,
    max_range: f32,
}

impl CollisionResult {
    fn unblocked(max_range: f32) -> Self {
        Self {
            distance: max_range,
            max_range,
        }
    }

    /// Reports whether a structure stopped the strand short of its max range.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.distance < self.max_range
    }
}

/// Traces a strand ray and returns the distance at which it is blocked.
///
/// Enumeration stops at the first cell off the grid, which leaves the strand
/// unblocked, or at the first fully-filling cell. The blocking distance is the
/// entry point of the ray into that cell's unit square; if the ray misses the
/// square numerically, the distance to the cell centre is used instead.
pub fn trace_strand<G>(grid: &G, start: Vec2, direction: Vec2, max_range: f32) -> CollisionResult
where
    G: GridQuery,
{
    let unblocked = CollisionResult::unblocked(max_range);
    if max_range.is_nan() || max_range <= 0.0 || !start.is_finite() || !direction.is_finite() {
        return unblocked;
    }

    let end = start + direction * max_range;
    for cell in grid.cells_on_line(CellCoord::containing(start), CellCoord::containing(end)) {
        if !grid.in_bounds(cell) {
            break;
        }

        if grid.is_fully_obstructed(cell) {
            let distance = intersect_cell(cell, start, direction)
                .unwrap_or_else(|| start.distance(cell.center()));
            return CollisionResult {
                distance: distance.min(max_range),
                max_range,
            };
        }
    }

    unblocked
}

/// Traces every strand of the beam from the chosen anchor, in strand order.
///
/// The output buffer is cleared before it is filled.
pub fn trace_strands<G>(
    grid: &G,
    geometry: &BeamGeometry,
    anchor: StrandAnchor,
    max_range: f32,
    out: &mut Vec<CollisionResult>,
) where
    G: GridQuery,
{
    out.clear();
    out.extend(
        geometry
            .strands(anchor)
            .map(|strand| trace_strand(grid, strand.start, geometry.direction(), max_range)),
    );
}

/// Intersects a ray with the unit square of a cell using the slab method.
///
/// Returns the distance along the ray to the entry point, zero when the ray
/// starts inside the square, or `None` when the ray misses it.
#[must_use]
pub fn intersect_cell(cell: CellCoord, origin: Vec2, direction: Vec2) -> Option<f32> {
    let min = Vec2::new(cell.column() as f32, cell.row() as f32);
    let max = min + Vec2::ONE;
    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;

    for axis in 0..2 {
        let start = origin[axis];
        let step = direction[axis];
        if step.abs() < PARALLEL_EPSILON {
            if start < min[axis] || start > max[axis] {
                return None;
            }
            continue;
        }

        let first = (min[axis] - start) / step;
        let second = (max[axis] - start) / step;
        near = near.max(first.min(second));
        far = far.min(first.max(second));
        if near > far {
            return None;
        }
    }

    if far < 0.0 {
        return None;
    }
    Some(near.max(0.0))
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that detects beam overloads and validates casts.
//!
//! A beam overloads when any strand, traced from the caster's own position
//! rather than the logical origin, meets a fully-filling structure closer than
//! the configured safe distance. Casting UIs use [`validate_cast`] to reject
//! such targets and [`preview_cast`] to colour the affected area.

use astral_beam_core::{BeamConfig, CellCoord, ConfigError, GridQuery};
use astral_beam_system_affected_cells::resolve_affected_cells;
use astral_beam_system_tracing::{trace_strand, BeamGeometry, StrandAnchor};
use glam::Vec3;
use thiserror::Error;

/// Strand found closer to an obstruction than the safe distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overload {
    /// Index of the first offending strand.
    pub strand: u32,
    /// Distance from the caster to the obstruction along that strand.
    pub distance: f32,
}

/// Finds the first strand whose obstruction lies within the safe distance.
///
/// Strands are traced from `caster_position`. Degenerate aiming never
/// overloads. Evaluation stops at the first offending strand.
pub fn find_overload<G>(grid: &G, config: &BeamConfig, caster_position: Vec3) -> Option<Overload>
where
    G: GridQuery,
{
    let geometry = BeamGeometry::from_positions(
        caster_position,
        config.target_position,
        config.strand_count,
    )?;

    let overload = geometry.strands(StrandAnchor::Caster).find_map(|strand| {
        let result = trace_strand(grid, strand.start, geometry.direction(), config.max_range);
        (result.distance < config.min_safe_distance).then_some(Overload {
            strand: strand.index,
            distance: result.distance,
        })
    });
    overload
}

/// Reports whether firing the configured beam from `caster_position` would overload.
pub fn is_overload_condition<G>(grid: &G, config: &BeamConfig, caster_position: Vec3) -> bool
where
    G: GridQuery,
{
    find_overload(grid, config, caster_position).is_some()
}

/// Reasons a cast is refused before the channel starts.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CastRejection {
    /// The configuration itself is invalid.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    /// An obstruction sits too close to the caster.
    #[error("target too close, the beam would overload (strand {strand} blocked at {distance:.2})")]
    Overload {
        /// Index of the first offending strand.
        strand: u32,
        /// Distance from the caster to the obstruction along that strand.
        distance: f32,
    },
}

impl From<Overload> for CastRejection {
    fn from(overload: Overload) -> Self {
        Self::Overload {
            strand: overload.strand,
            distance: overload.distance,
        }
    }
}

/// Validates a cast from the caster position stored in the configuration.
pub fn validate_cast<G>(grid: &G, config: &BeamConfig) -> Result<(), CastRejection>
where
    G: GridQuery,
{
    config.validate()?;
    match find_overload(grid, config, config.caster_position) {
        Some(overload) => Err(overload.into()),
        None => Ok(()),
    }
}

/// Area preview shown while the player is choosing a target.
#[derive(Clone, Debug, PartialEq)]
pub struct CastPreview {
    /// Cells that the first damage pulse would hit, ascending.
    pub cells: Vec<CellCoord>,
    /// Whether the cast would be accepted.
    pub valid: bool,
}

/// Computes the preview for a cast fired from the caster's current position.
pub fn preview_cast<G>(
    grid: &G,
    config: &BeamConfig,
    caster_position: Vec3,
    caster_cell: CellCoord,
) -> CastPreview
where
    G: GridQuery,
{
    let valid = config.validate().is_ok() && !is_overload_condition(grid, config, caster_position);
    CastPreview {
        cells: resolve_affected_cells(grid, config, caster_position, caster_cell),
        valid,
    }
}

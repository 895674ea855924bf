//! Beam geometry: aiming direction, strand offsets and beam-axis points.

use astral_beam_core::{plane, VisualSegment, DIRECTION_EPSILON};
use glam::{Vec2, Vec3};

/// Distance between the caster and the logical origin of the beam.
pub const LOGICAL_ORIGIN_ADVANCE: f32 = 1.0;

/// Point from which a strand's ray is cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrandAnchor {
    /// Strands start level with the caster; used by the overload check.
    Caster,
    /// Strands start one cell ahead of the caster; used for damage and visuals.
    LogicalOrigin,
}

/// One parallel sub-ray of the beam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strand {
    /// Index of the strand, counted from the most negative lateral offset.
    pub index: u32,
    /// Signed lateral offset from the centreline along the perpendicular.
    pub offset: f32,
    /// Planar start point of the strand's ray.
    pub start: Vec2,
}

/// Planar geometry of a beam aimed from a caster towards a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamGeometry {
    caster: Vec2,
    direction: Vec2,
    perpendicular: Vec2,
    logical_origin: Vec2,
    strand_count: u32,
}

impl BeamGeometry {
    /// Computes the geometry of a beam between two planar points.
    ///
    /// Returns `None` when caster and target coincide, in which case the beam
    /// has no direction and produces no effect.
    #[must_use]
    pub fn new(caster: Vec2, target: Vec2, strand_count: u32) -> Option<Self> {
        let delta = target - caster;
        if !delta.is_finite() || delta.length_squared() < DIRECTION_EPSILON {
            return None;
        }
        let direction = delta.normalize();

        Some(Self {
            caster,
            direction,
            perpendicular: Vec2::new(direction.y, -direction.x),
            logical_origin: caster + direction * LOGICAL_ORIGIN_ADVANCE,
            strand_count,
        })
    }

    /// Computes the geometry from world positions, ignoring height.
    #[must_use]
    pub fn from_positions(caster: Vec3, target: Vec3, strand_count: u32) -> Option<Self> {
        Self::new(plane(caster), plane(target), strand_count)
    }

    /// Planar position of the caster.
    #[must_use]
    pub const fn caster(&self) -> Vec2 {
        self.caster
    }

    /// Unit aiming direction.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Unit lateral axis, the aiming direction rotated a quarter turn clockwise.
    #[must_use]
    pub const fn perpendicular(&self) -> Vec2 {
        self.perpendicular
    }

    /// Start of the visible beam, one unit ahead of the caster.
    #[must_use]
    pub const fn logical_origin(&self) -> Vec2 {
        self.logical_origin
    }

    /// Number of strands composing the beam.
    #[must_use]
    pub const fn strand_count(&self) -> u32 {
        self.strand_count
    }

    /// Lateral offset of strand zero; offsets are spaced one unit apart.
    #[must_use]
    pub fn initial_offset(&self) -> f32 {
        -(self.strand_count as f32 - 1.0) / 2.0
    }

    /// Lateral offset of the provided strand.
    #[must_use]
    pub fn strand_offset(&self, index: u32) -> f32 {
        self.initial_offset() + index as f32
    }

    /// Iterates the strands of the beam with rays starting at the anchor.
    pub fn strands(&self, anchor: StrandAnchor) -> impl Iterator<Item = Strand> + '_ {
        let base = match anchor {
            StrandAnchor::Caster => self.caster,
            StrandAnchor::LogicalOrigin => self.logical_origin,
        };
        (0..self.strand_count).map(move |index| {
            let offset = self.strand_offset(index);
            Strand {
                index,
                offset,
                start: base + self.perpendicular * offset,
            }
        })
    }

    /// Point at a lateral offset and a distance along the beam from the logical origin.
    #[must_use]
    pub fn point_on_axis(&self, lateral: f32, distance: f32) -> Vec2 {
        self.logical_origin + self.perpendicular * lateral + self.direction * distance
    }

    /// Planar endpoints of a visual segment, centred on the strands it covers.
    #[must_use]
    pub fn segment_endpoints(&self, segment: &VisualSegment) -> (Vec2, Vec2) {
        let first = self.strand_offset(segment.first_strand);
        let last = self.strand_offset(segment.last_strand());
        let lateral = (first + last) / 2.0;
        (
            self.point_on_axis(lateral, segment.start),
            self.point_on_axis(lateral, segment.end),
        )
    }
}

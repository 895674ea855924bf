#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Astral Beam simulation.
//!
//! This crate defines the message surface that connects the host world, the
//! beam systems and the adapters. Systems read the grid through [`GridQuery`],
//! describe damage as [`Command`] values for the world to apply, and hand
//! visual segments to a [`SegmentSink`] owned by the presentation layer. The
//! world answers applied commands with [`Event`] values.

mod line;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use line::LineOfSight;

/// Number of simulation steps that elapse per second of authored time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Distance below which an obstruction in front of the caster overloads the beam.
pub const DEFAULT_MIN_SAFE_DISTANCE: f32 = 2.0;

/// Radius of the explosion triggered when a beam overloads.
pub const DEFAULT_EXPLOSION_RADIUS: f32 = 2.0;

/// Largest strand count a beam may be configured with.
pub const MAX_STRAND_COUNT: u32 = 64;

/// Squared planar distance under which caster and target are considered coincident.
pub const DIRECTION_EPSILON: f32 = 1.0e-4;

/// Projects a world position onto the horizontal plane, discarding height.
#[must_use]
pub fn plane(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Converts authored seconds into whole simulation ticks, rounding to nearest.
#[must_use]
pub fn seconds_to_ticks(seconds: f32) -> u32 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * TICKS_PER_SECOND as f32).round() as u32
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that lines of sight may be enumerated past the
/// grid edge; [`GridQuery::in_bounds`] decides whether a cell exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the cell containing the provided planar point.
    #[must_use]
    pub fn containing(point: Vec2) -> Self {
        Self::new(point.x.floor() as i32, point.y.floor() as i32)
    }

    /// Returns the planar centre of the cell.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }

    /// Returns the world-space centre of the cell at ground height.
    #[must_use]
    pub fn center_3d(self) -> Vec3 {
        let center = self.center();
        Vec3::new(center.x, 0.0, center.y)
    }

    /// Returns the cell displaced by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(
            self.column.saturating_add(columns),
            self.row.saturating_add(rows),
        )
    }
}

/// Unique identifier assigned to an actor living on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a grid generation; reconfiguring the grid allocates a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridId(u32);

impl GridId {
    /// Creates a new grid identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Category of damage dealt by the beam and its overload explosion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    /// Radiant energy damage, the beam's native kind.
    Astral,
    /// Heat damage.
    Burn,
    /// Concussive blast damage.
    Bomb,
}

/// How completely a structure occupies its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    /// Structure that lets beams and sight pass, such as a low barricade.
    Partial,
    /// Structure that completely blocks beams and sight.
    Full,
}

/// Lifecycle of an actor as observed by beam systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorState {
    /// Actor is spawned and alive.
    Active,
    /// Actor's health was depleted.
    Dead,
    /// Actor was removed from the grid.
    Unspawned,
}

/// Immutable view of the actor channelling a beam, captured once per step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CasterSnapshot {
    /// Identifier of the caster.
    pub actor: ActorId,
    /// Current world-space draw position of the caster.
    pub position: Vec3,
    /// Grid cell occupied by the caster.
    pub cell: CellCoord,
    /// Lifecycle state of the caster.
    pub state: ActorState,
    /// Grid generation the caster currently stands on.
    pub grid: GridId,
}

/// Immutable parameters of a single beam cast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Actor channelling the beam.
    pub caster: ActorId,
    /// Grid generation the beam was cast on.
    pub grid: GridId,
    /// Caster position at cast time.
    pub caster_position: Vec3,
    /// Point the beam is aimed at.
    pub target_position: Vec3,
    /// Number of parallel strands composing the beam.
    pub strand_count: u32,
    /// Maximum distance travelled by each strand.
    pub max_range: f32,
    /// Damage dealt to each affected cell per pulse.
    pub damage_amount: u32,
    /// Armour penetration applied to each hit.
    pub armor_penetration: f32,
    /// Category of damage dealt.
    pub damage_kind: DamageKind,
    /// Total channel duration in ticks.
    pub total_duration_ticks: u32,
    /// Ticks between two damage pulses.
    pub pulse_interval_ticks: u32,
    /// Obstruction distance from the caster below which the beam overloads.
    pub min_safe_distance: f32,
    /// Radius of the explosion triggered on overload.
    pub explosion_radius: f32,
}

impl BeamConfig {
    /// Checks that the configuration describes a castable beam.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strand_count == 0 {
            return Err(ConfigError::NoStrands);
        }
        if self.strand_count > MAX_STRAND_COUNT {
            return Err(ConfigError::TooManyStrands {
                strand_count: self.strand_count,
            });
        }
        if !self.max_range.is_finite() || self.max_range <= 0.0 {
            return Err(ConfigError::InvalidRange {
                max_range: self.max_range,
            });
        }
        if !self.min_safe_distance.is_finite() || self.min_safe_distance < 0.0 {
            return Err(ConfigError::InvalidSafeDistance {
                min_safe_distance: self.min_safe_distance,
            });
        }
        if !self.explosion_radius.is_finite() || self.explosion_radius < 0.0 {
            return Err(ConfigError::InvalidExplosionRadius {
                radius: self.explosion_radius,
            });
        }
        if !self.armor_penetration.is_finite() {
            return Err(ConfigError::InvalidPenetration);
        }
        if !self.caster_position.is_finite() || !self.target_position.is_finite() {
            return Err(ConfigError::NonFinitePosition);
        }
        if self.total_duration_ticks == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }
}

/// Authored description of the beam ability, loaded from configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeamAbility {
    /// Number of parallel strands composing the beam.
    pub strand_count: u32,
    /// Maximum distance travelled by each strand.
    pub max_range: f32,
    /// Damage dealt to each affected cell per pulse.
    pub damage_amount: u32,
    /// Armour penetration applied to each hit.
    #[serde(default)]
    pub armor_penetration: f32,
    /// Category of damage dealt.
    #[serde(default = "default_damage_kind")]
    pub damage_kind: DamageKind,
    /// Channel duration in seconds.
    pub duration_seconds: f32,
    /// Seconds between two damage pulses.
    pub pulse_interval_seconds: f32,
    /// Obstruction distance from the caster below which the beam overloads.
    #[serde(default = "default_min_safe_distance")]
    pub min_safe_distance: f32,
    /// Radius of the explosion triggered on overload.
    #[serde(default = "default_explosion_radius")]
    pub explosion_radius: f32,
}

fn default_damage_kind() -> DamageKind {
    DamageKind::Astral
}

fn default_min_safe_distance() -> f32 {
    DEFAULT_MIN_SAFE_DISTANCE
}

fn default_explosion_radius() -> f32 {
    DEFAULT_EXPLOSION_RADIUS
}

impl BeamAbility {
    /// Builds a validated cast configuration aimed from the caster at the target.
    ///
    /// The target is pushed out along the aiming direction to the full beam
    /// range so the beam never stops short at the clicked point. Coincident
    /// caster and target keep the raw target; the systems treat that geometry
    /// as producing no beam.
    pub fn configure(
        &self,
        caster: ActorId,
        grid: GridId,
        caster_position: Vec3,
        target_position: Vec3,
    ) -> Result<BeamConfig, ConfigError> {
        let delta = plane(target_position) - plane(caster_position);
        let target_position = if delta.length_squared() < DIRECTION_EPSILON {
            target_position
        } else {
            let reach = delta.normalize() * self.max_range;
            Vec3::new(
                caster_position.x + reach.x,
                target_position.y,
                caster_position.z + reach.y,
            )
        };

        let config = BeamConfig {
            caster,
            grid,
            caster_position,
            target_position,
            strand_count: self.strand_count,
            max_range: self.max_range,
            damage_amount: self.damage_amount,
            armor_penetration: self.armor_penetration,
            damage_kind: self.damage_kind,
            total_duration_ticks: seconds_to_ticks(self.duration_seconds),
            pulse_interval_ticks: seconds_to_ticks(self.pulse_interval_seconds),
            min_safe_distance: self.min_safe_distance,
            explosion_radius: self.explosion_radius,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Reasons a beam configuration is rejected before casting.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A beam needs at least one strand.
    #[error("beam must have at least one strand")]
    NoStrands,
    /// Strand count exceeds [`MAX_STRAND_COUNT`].
    #[error("beam may have at most {} strands (received {strand_count})", MAX_STRAND_COUNT)]
    TooManyStrands {
        /// Provided strand count that failed validation.
        strand_count: u32,
    },
    /// Range must be positive and finite.
    #[error("max range must be positive and finite (received {max_range})")]
    InvalidRange {
        /// Provided range that failed validation.
        max_range: f32,
    },
    /// Safe distance must be non-negative and finite.
    #[error("minimum safe distance must be non-negative (received {min_safe_distance})")]
    InvalidSafeDistance {
        /// Provided distance that failed validation.
        min_safe_distance: f32,
    },
    /// Explosion radius must be non-negative and finite.
    #[error("explosion radius must be non-negative (received {radius})")]
    InvalidExplosionRadius {
        /// Provided radius that failed validation.
        radius: f32,
    },
    /// Armour penetration must be finite.
    #[error("armor penetration must be finite")]
    InvalidPenetration,
    /// Caster and target positions must be finite.
    #[error("caster and target positions must be finite")]
    NonFinitePosition,
    /// Duration rounds to zero ticks.
    #[error("beam duration must last at least one tick")]
    ZeroDuration,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid with an empty one of the provided dimensions.
    ConfigureGrid {
        /// Number of cell columns.
        columns: u32,
        /// Number of cell rows.
        rows: u32,
    },
    /// Advances the simulation clock by one step.
    Tick,
    /// Places a structure occupying the provided cell.
    PlaceObstacle {
        /// Cell that receives the structure.
        cell: CellCoord,
        /// How completely the structure fills its cell.
        fill: Fill,
    },
    /// Removes the structure occupying the provided cell.
    RemoveObstacle {
        /// Cell to clear.
        cell: CellCoord,
    },
    /// Spawns a new actor in the provided cell.
    SpawnActor {
        /// Cell the actor appears in.
        cell: CellCoord,
        /// Starting health of the actor.
        health: u32,
        /// Fraction of incoming damage absorbed before penetration, in 0.0..=1.0.
        armor: f32,
    },
    /// Moves an actor to a new cell.
    MoveActor {
        /// Actor to relocate.
        actor: ActorId,
        /// Destination cell.
        cell: CellCoord,
    },
    /// Removes an actor from the grid without killing it.
    DespawnActor {
        /// Actor to remove.
        actor: ActorId,
    },
    /// Damages every actor standing in the listed cells.
    ApplyAreaDamage {
        /// Cells receiving the damage.
        cells: Vec<CellCoord>,
        /// Damage dealt to each actor hit.
        amount: u32,
        /// Armour penetration of each hit.
        armor_penetration: f32,
        /// Category of damage dealt.
        kind: DamageKind,
        /// Actor responsible for the damage.
        source: ActorId,
        /// Actors that must never be hit.
        excluded: Vec<ActorId>,
    },
    /// Detonates an explosion centred on a cell.
    ApplyExplosion {
        /// Centre of the blast.
        center: CellCoord,
        /// Blast radius measured in cells.
        radius: f32,
        /// Damage dealt to each actor hit.
        amount: u32,
        /// Armour penetration of each hit.
        armor_penetration: f32,
        /// Category of damage dealt.
        kind: DamageKind,
        /// Actor responsible for the blast.
        source: ActorId,
        /// Actors that must never be hit.
        excluded: Vec<ActorId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new grid generation was configured.
    GridConfigured {
        /// Identifier of the new grid generation.
        grid: GridId,
        /// Number of cell columns.
        columns: u32,
        /// Number of cell rows.
        rows: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the step that just completed.
        tick: u64,
    },
    /// Confirms that a structure was placed.
    ObstaclePlaced {
        /// Cell occupied by the structure.
        cell: CellCoord,
        /// How completely the structure fills its cell.
        fill: Fill,
    },
    /// Confirms that a structure was removed.
    ObstacleRemoved {
        /// Cell that was cleared.
        cell: CellCoord,
    },
    /// Confirms that an actor was spawned.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Cell the actor occupies.
        cell: CellCoord,
    },
    /// Confirms that an actor moved.
    ActorMoved {
        /// Actor that moved.
        actor: ActorId,
        /// Cell the actor occupied before moving.
        from: CellCoord,
        /// Cell the actor occupies after moving.
        to: CellCoord,
    },
    /// Confirms that an actor left the grid.
    ActorDespawned {
        /// Actor that was removed.
        actor: ActorId,
    },
    /// Reports that area damage was applied to a set of cells.
    AreaDamaged {
        /// Actor responsible for the damage.
        source: ActorId,
        /// Number of cells covered by the damage.
        cells: usize,
    },
    /// Reports that an explosion detonated.
    ExplosionTriggered {
        /// Actor responsible for the blast.
        source: ActorId,
        /// Centre of the blast.
        center: CellCoord,
        /// Blast radius measured in cells.
        radius: f32,
    },
    /// Reports that an actor lost health.
    ActorDamaged {
        /// Actor that was hit.
        actor: ActorId,
        /// Actor responsible for the hit.
        source: ActorId,
        /// Health removed by the hit.
        amount: u32,
        /// Category of damage dealt.
        kind: DamageKind,
    },
    /// Reports that an actor's health was depleted.
    ActorDied {
        /// Actor that died.
        actor: ActorId,
    },
}

/// Read-only grid capability consumed by beam systems.
///
/// Beam logic only ever queries the grid; it never mutates obstruction state.
pub trait GridQuery {
    /// Reports whether the cell exists on the grid.
    fn in_bounds(&self, cell: CellCoord) -> bool;

    /// Reports whether the cell holds a structure that completely blocks beams.
    fn is_fully_obstructed(&self, cell: CellCoord) -> bool;

    /// Enumerates every cell on the line of sight between two cells, without gaps.
    fn cells_on_line(&self, start: CellCoord, end: CellCoord) -> impl Iterator<Item = CellCoord> {
        LineOfSight::new(start, end)
    }
}

/// Visual category of a beam segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Fixed segment straddling the logical origin.
    Head,
    /// Segment spanning the stretch between two blocking events.
    Middle,
    /// Terminating slice drawn where strands are blocked.
    Tail,
}

impl SegmentKind {
    /// All segment kinds in drawing order.
    pub const ALL: [SegmentKind; 3] = [Self::Head, Self::Middle, Self::Tail];
}

/// Contiguous run of strands drawn as one quad between two beam-axis distances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualSegment {
    /// Visual category of the segment.
    pub kind: SegmentKind,
    /// Lowest strand index covered by the segment.
    pub first_strand: u32,
    /// Number of adjacent strands covered by the segment.
    pub width: u32,
    /// Distance from the logical origin where the segment starts.
    pub start: f32,
    /// Distance from the logical origin where the segment ends.
    pub end: f32,
}

impl VisualSegment {
    /// Highest strand index covered by the segment.
    #[must_use]
    pub fn last_strand(&self) -> u32 {
        self.first_strand + self.width.saturating_sub(1)
    }

    /// Reports whether the segment covers the provided strand.
    #[must_use]
    pub fn covers_strand(&self, strand: u32) -> bool {
        self.width > 0 && strand >= self.first_strand && strand <= self.last_strand()
    }
}

/// Distinct blocking distance shared by one or more terminating strands.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentEvent {
    /// Distance from the logical origin at which the strands terminate.
    pub distance: f32,
    /// Indices of the strands terminating at this distance, ascending.
    pub strands: Vec<u32>,
}

/// Handle to a visual segment entity owned by a [`SegmentSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentHandle(u64);

impl SegmentHandle {
    /// Creates a handle wrapping the provided value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Resolved visual resource used to instantiate segments of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentTemplate {
    kind: SegmentKind,
    id: u32,
}

impl SegmentTemplate {
    /// Creates a template of the provided kind.
    #[must_use]
    pub const fn new(kind: SegmentKind, id: u32) -> Self {
        Self { kind, id }
    }

    /// Segment kind instantiated by the template.
    #[must_use]
    pub const fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Presentation-defined identifier of the template.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }
}

/// Reasons a visual segment could not be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// No template is registered for the requested kind.
    #[error("no visual template registered for {0:?} segments")]
    MissingTemplate(SegmentKind),
    /// The presentation layer refused to allocate another segment.
    #[error("segment capacity of {capacity} exhausted")]
    CapacityExhausted {
        /// Maximum number of live segments.
        capacity: usize,
    },
}

/// Presentation capability that owns visual segment entities.
pub trait SegmentSink {
    /// Resolves the template for a segment kind, if the presentation provides one.
    fn resolve_template(&self, kind: SegmentKind) -> Option<SegmentTemplate>;

    /// Creates a segment between two planar points with the provided strand width.
    fn create_segment(
        &mut self,
        template: SegmentTemplate,
        start: Vec2,
        end: Vec2,
        width: f32,
    ) -> Result<SegmentHandle, SegmentError>;

    /// Moves an existing segment to new endpoints.
    fn update_segment(&mut self, handle: SegmentHandle, start: Vec2, end: Vec2);

    /// Destroys a segment; unknown handles are ignored.
    fn destroy_segment(&mut self, handle: SegmentHandle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    fn ability() -> BeamAbility {
        BeamAbility {
            strand_count: 3,
            max_range: 10.0,
            damage_amount: 12,
            armor_penetration: 0.4,
            damage_kind: DamageKind::Astral,
            duration_seconds: 5.0,
            pulse_interval_seconds: 0.2,
            min_safe_distance: DEFAULT_MIN_SAFE_DISTANCE,
            explosion_radius: DEFAULT_EXPLOSION_RADIUS,
        }
    }

    #[test]
    fn containing_floors_negative_coordinates() {
        assert_eq!(
            CellCoord::containing(Vec2::new(-0.25, 3.75)),
            CellCoord::new(-1, 3)
        );
        assert_eq!(CellCoord::new(2, 5).center(), Vec2::new(2.5, 5.5));
    }

    #[test]
    fn seconds_round_to_nearest_tick() {
        assert_eq!(seconds_to_ticks(5.0), 300);
        assert_eq!(seconds_to_ticks(0.2), 12);
        assert_eq!(seconds_to_ticks(0.0), 0);
        assert_eq!(seconds_to_ticks(f32::NAN), 0);
    }

    #[test]
    fn configure_extends_target_to_full_range() {
        let config = ability()
            .configure(
                ActorId::new(1),
                GridId::new(0),
                Vec3::new(0.5, 0.0, 0.5),
                Vec3::new(3.5, 0.0, 0.5),
            )
            .expect("valid ability");

        assert!((config.target_position.x - 10.5).abs() < 1.0e-5);
        assert!((config.target_position.z - 0.5).abs() < 1.0e-5);
        assert_eq!(config.total_duration_ticks, 300);
        assert_eq!(config.pulse_interval_ticks, 12);
    }

    #[test]
    fn configure_rejects_zero_strands() {
        let mut ability = ability();
        ability.strand_count = 0;
        let result = ability.configure(
            ActorId::new(1),
            GridId::new(0),
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
        );
        assert_eq!(result, Err(ConfigError::NoStrands));
    }

    #[test]
    fn configure_rejects_excessive_strands() {
        let mut ability = ability();
        ability.strand_count = MAX_STRAND_COUNT;
        assert!(ability
            .configure(
                ActorId::new(1),
                GridId::new(0),
                Vec3::ZERO,
                Vec3::new(4.0, 0.0, 0.0),
            )
            .is_ok());

        ability.strand_count = u32::MAX;
        let result = ability.configure(
            ActorId::new(1),
            GridId::new(0),
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
        );
        assert_eq!(
            result,
            Err(ConfigError::TooManyStrands {
                strand_count: u32::MAX
            })
        );
    }

    #[test]
    fn configure_rejects_non_positive_range() {
        let mut ability = ability();
        ability.max_range = 0.0;
        let result = ability.configure(
            ActorId::new(1),
            GridId::new(0),
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
        );
        assert!(matches!(result, Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn segment_strand_coverage_matches_width() {
        let segment = VisualSegment {
            kind: SegmentKind::Middle,
            first_strand: 2,
            width: 3,
            start: 0.5,
            end: 4.5,
        };
        assert_eq!(segment.last_strand(), 4);
        assert!(segment.covers_strand(2));
        assert!(segment.covers_strand(4));
        assert!(!segment.covers_strand(5));
        assert!(!segment.covers_strand(1));
    }

    #[test]
    fn beam_config_round_trips_through_bincode() {
        let config = ability()
            .configure(
                ActorId::new(9),
                GridId::new(2),
                Vec3::new(1.5, 0.0, 1.5),
                Vec3::new(1.5, 0.0, 8.5),
            )
            .expect("valid ability");
        assert_round_trip(&config);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(-4, 17));
    }
}

use std::collections::BTreeSet;

use astral_beam_core::{ActorId, BeamAbility, CellCoord, Command, Event, Fill};
use astral_beam_world::{apply, World};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;

/// Beam scenario loaded from a TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Dimensions of the grid.
    pub(crate) grid: GridSpec,
    /// Hand-placed structures.
    #[serde(default)]
    pub(crate) obstacles: Vec<ObstacleSpec>,
    /// Randomly scattered structures.
    #[serde(default)]
    pub(crate) scatter: Option<ScatterSpec>,
    /// Actor channelling the beam.
    pub(crate) caster: ActorSpec,
    /// Other actors standing on the grid.
    #[serde(default)]
    pub(crate) bystanders: Vec<ActorSpec>,
    /// Aim point as `[x, z]` world coordinates.
    pub(crate) target: [f32; 2],
    /// Step at which the channel is cancelled, if any.
    #[serde(default)]
    pub(crate) cancel_at: Option<u32>,
    /// Authored beam ability.
    pub(crate) ability: BeamAbility,
}

/// Grid dimensions measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GridSpec {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
}

/// Structure placed on a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ObstacleSpec {
    pub(crate) column: i32,
    pub(crate) row: i32,
    #[serde(default = "full")]
    pub(crate) fill: Fill,
}

/// Seeded random scatter of structures across free cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScatterSpec {
    pub(crate) seed: u64,
    pub(crate) count: u32,
    #[serde(default = "full")]
    pub(crate) fill: Fill,
}

/// Actor spawned at scenario start.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ActorSpec {
    pub(crate) column: i32,
    pub(crate) row: i32,
    pub(crate) health: u32,
    #[serde(default)]
    pub(crate) armor: f32,
}

impl ActorSpec {
    fn cell(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

fn full() -> Fill {
    Fill::Full
}

/// World prepared from a scenario, ready for the beam to be cast.
#[derive(Debug)]
pub(crate) struct StagedScenario {
    pub(crate) world: World,
    pub(crate) caster: ActorId,
    pub(crate) bystanders: Vec<ActorId>,
    pub(crate) target: Vec3,
    pub(crate) events: Vec<Event>,
}

/// Errors raised while loading or staging a scenario.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The file is not valid scenario TOML.
    #[error("invalid scenario file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The grid has no cells.
    #[error("grid must have at least one column and one row")]
    EmptyGrid,
    /// A placed entity lies outside the grid.
    #[error("{what} at ({column}, {row}) lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Kind of entity that was misplaced.
        what: &'static str,
        /// Column of the entity.
        column: i32,
        /// Row of the entity.
        row: i32,
        /// Grid column count.
        columns: u32,
        /// Grid row count.
        rows: u32,
    },
    /// Two actors or structures share a cell.
    #[error("cell ({column}, {row}) is occupied more than once")]
    Occupied {
        /// Column of the contested cell.
        column: i32,
        /// Row of the contested cell.
        row: i32,
    },
    /// The scatter asks for more cells than remain free.
    #[error("cannot scatter {count} obstacles over {free} free cells")]
    ScatterTooDense {
        /// Requested obstacle count.
        count: u32,
        /// Free cells left on the grid.
        free: usize,
    },
    /// The aim point is not a finite position.
    #[error("target must be a finite position")]
    InvalidTarget,
    /// The world refused to spawn an actor.
    #[error("actor at ({column}, {row}) could not be spawned")]
    SpawnFailed {
        /// Column of the actor.
        column: i32,
        /// Row of the actor.
        row: i32,
    },
}

impl Scenario {
    /// Parses and validates a scenario from TOML text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let GridSpec { columns, rows } = self.grid;
        if columns == 0 || rows == 0 {
            return Err(ScenarioError::EmptyGrid);
        }
        if !self.target.iter().all(|value| value.is_finite()) {
            return Err(ScenarioError::InvalidTarget);
        }

        let placed = self
            .obstacles
            .iter()
            .map(|obstacle| ("obstacle", obstacle.column, obstacle.row))
            .chain(std::iter::once(("caster", self.caster.column, self.caster.row)))
            .chain(
                self.bystanders
                    .iter()
                    .map(|actor| ("bystander", actor.column, actor.row)),
            );

        let mut occupied = BTreeSet::new();
        for (what, column, row) in placed {
            let inside = u32::try_from(column).is_ok_and(|column| column < columns)
                && u32::try_from(row).is_ok_and(|row| row < rows);
            if !inside {
                return Err(ScenarioError::OutOfBounds {
                    what,
                    column,
                    row,
                    columns,
                    rows,
                });
            }
            if !occupied.insert(CellCoord::new(column, row)) {
                return Err(ScenarioError::Occupied { column, row });
            }
        }

        if let Some(scatter) = self.scatter {
            let free = columns as usize * rows as usize - occupied.len();
            if scatter.count as usize > free {
                return Err(ScenarioError::ScatterTooDense {
                    count: scatter.count,
                    free,
                });
            }
        }
        Ok(())
    }

    /// Builds the world described by the scenario.
    ///
    /// Scattered obstacles never land on an occupied cell, and the same seed
    /// always produces the same layout.
    pub(crate) fn stage(&self) -> Result<StagedScenario, ScenarioError> {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                columns: self.grid.columns,
                rows: self.grid.rows,
            },
            &mut events,
        );

        for obstacle in &self.obstacles {
            apply(
                &mut world,
                Command::PlaceObstacle {
                    cell: CellCoord::new(obstacle.column, obstacle.row),
                    fill: obstacle.fill,
                },
                &mut events,
            );
        }
        for cell in self.scattered_cells() {
            apply(
                &mut world,
                Command::PlaceObstacle {
                    cell,
                    fill: self.scatter.map_or(Fill::Full, |scatter| scatter.fill),
                },
                &mut events,
            );
        }

        let caster = spawn(&mut world, &self.caster, &mut events)?;
        let bystanders = self
            .bystanders
            .iter()
            .map(|actor| spawn(&mut world, actor, &mut events))
            .collect::<Result<_, _>>()?;

        Ok(StagedScenario {
            world,
            caster,
            bystanders,
            target: Vec3::new(self.target[0], 0.0, self.target[1]),
            events,
        })
    }

    fn scattered_cells(&self) -> Vec<CellCoord> {
        let Some(scatter) = self.scatter else {
            return Vec::new();
        };

        let mut taken: BTreeSet<CellCoord> = self
            .obstacles
            .iter()
            .map(|obstacle| CellCoord::new(obstacle.column, obstacle.row))
            .chain(std::iter::once(self.caster.cell()))
            .chain(self.bystanders.iter().map(ActorSpec::cell))
            .collect();
        let mut free: Vec<CellCoord> = (0..self.grid.rows as i32)
            .flat_map(|row| (0..self.grid.columns as i32).map(move |column| (column, row)))
            .map(|(column, row)| CellCoord::new(column, row))
            .filter(|cell| !taken.contains(cell))
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(scatter.seed);
        let mut cells = Vec::with_capacity(scatter.count as usize);
        for _ in 0..scatter.count {
            if free.is_empty() {
                break;
            }
            let cell = free.swap_remove(rng.gen_range(0..free.len()));
            let _ = taken.insert(cell);
            cells.push(cell);
        }
        cells
    }
}

fn spawn(
    world: &mut World,
    actor: &ActorSpec,
    events: &mut Vec<Event>,
) -> Result<ActorId, ScenarioError> {
    let start = events.len();
    apply(
        world,
        Command::SpawnActor {
            cell: actor.cell(),
            health: actor.health,
            armor: actor.armor,
        },
        events,
    );
    events[start..]
        .iter()
        .find_map(|event| match event {
            Event::ActorSpawned { actor, .. } => Some(*actor),
            _ => None,
        })
        .ok_or(ScenarioError::SpawnFailed {
            column: actor.column,
            row: actor.row,
        })
}

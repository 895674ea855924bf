#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state hosting Astral Beam channels.
//!
//! The world owns the structure grid and the actors standing on it. It is
//! mutated exclusively through [`apply`], and exposes read-only access through
//! the [`query`] module, including a [`query::GridView`] that implements the
//! grid capability consumed by the beam systems.

mod actors;
mod obstacles;

use std::collections::BTreeSet;

use astral_beam_core::{ActorId, ActorState, CellCoord, Command, DamageKind, Event, GridId};

use crate::{actors::ActorRegistry, obstacles::ObstacleGrid};

const DEFAULT_GRID_COLUMNS: u32 = 32;
const DEFAULT_GRID_ROWS: u32 = 32;

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    grid_id: GridId,
    obstacles: ObstacleGrid,
    actors: ActorRegistry,
    tick_index: u64,
}

impl World {
    /// Creates a new world with an empty default-sized grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid_id: GridId::new(0),
            obstacles: ObstacleGrid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            actors: ActorRegistry::new(),
            tick_index: 0,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters shared by every hit of a single damage application.
#[derive(Clone, Copy, Debug)]
struct Hit {
    amount: u32,
    armor_penetration: f32,
    kind: DamageKind,
    source: ActorId,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { columns, rows } => {
            world.grid_id = GridId::new(world.grid_id.get().saturating_add(1));
            world.obstacles = ObstacleGrid::new(columns, rows);
            for actor in world.actors.iter_mut() {
                if actor.state == ActorState::Active {
                    actor.state = ActorState::Unspawned;
                    out_events.push(Event::ActorDespawned { actor: actor.id });
                }
            }
            out_events.push(Event::GridConfigured {
                grid: world.grid_id,
                columns,
                rows,
            });
        }
        Command::Tick => {
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
            world.tick_index = world.tick_index.saturating_add(1);
        }
        Command::PlaceObstacle { cell, fill } => {
            if world.obstacles.place(cell, fill) {
                out_events.push(Event::ObstaclePlaced { cell, fill });
            }
        }
        Command::RemoveObstacle { cell } => {
            if world.obstacles.remove(cell).is_some() {
                out_events.push(Event::ObstacleRemoved { cell });
            }
        }
        Command::SpawnActor {
            cell,
            health,
            armor,
        } => {
            if world.obstacles.contains(cell) {
                let actor = world.actors.spawn(cell, health, armor);
                out_events.push(Event::ActorSpawned { actor, cell });
            }
        }
        Command::MoveActor { actor, cell } => {
            if !world.obstacles.contains(cell) {
                return;
            }
            if let Some(record) = world.actors.get_mut(actor) {
                if record.state == ActorState::Active && record.cell != cell {
                    let from = record.cell;
                    record.cell = cell;
                    out_events.push(Event::ActorMoved {
                        actor,
                        from,
                        to: cell,
                    });
                }
            }
        }
        Command::DespawnActor { actor } => {
            if let Some(record) = world.actors.get_mut(actor) {
                if record.state == ActorState::Active {
                    record.state = ActorState::Unspawned;
                    out_events.push(Event::ActorDespawned { actor });
                }
            }
        }
        Command::ApplyAreaDamage {
            cells,
            amount,
            armor_penetration,
            kind,
            source,
            excluded,
        } => {
            let covered: BTreeSet<CellCoord> = cells.into_iter().collect();
            out_events.push(Event::AreaDamaged {
                source,
                cells: covered.len(),
            });
            let hit = Hit {
                amount,
                armor_penetration,
                kind,
                source,
            };
            damage_actors(world, hit, &excluded, |cell| covered.contains(&cell), out_events);
        }
        Command::ApplyExplosion {
            center,
            radius,
            amount,
            armor_penetration,
            kind,
            source,
            excluded,
        } => {
            out_events.push(Event::ExplosionTriggered {
                source,
                center,
                radius,
            });
            let origin = center.center();
            let radius_squared = radius * radius;
            let hit = Hit {
                amount,
                armor_penetration,
                kind,
                source,
            };
            damage_actors(
                world,
                hit,
                &excluded,
                |cell| cell.center().distance_squared(origin) <= radius_squared,
                out_events,
            );
        }
    }
}

fn damage_actors<F>(
    world: &mut World,
    hit: Hit,
    excluded: &[ActorId],
    mut in_area: F,
    out_events: &mut Vec<Event>,
) where
    F: FnMut(CellCoord) -> bool,
{
    for actor in world.actors.iter_mut() {
        if actor.state != ActorState::Active || excluded.contains(&actor.id) {
            continue;
        }
        if !in_area(actor.cell) {
            continue;
        }

        let (dealt, died) = actor.take_damage(hit.amount, hit.armor_penetration);
        out_events.push(Event::ActorDamaged {
            actor: actor.id,
            source: hit.source,
            amount: dealt,
            kind: hit.kind,
        });
        if died {
            out_events.push(Event::ActorDied { actor: actor.id });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use astral_beam_core::{
        ActorId, ActorState, CasterSnapshot, CellCoord, Fill, GridId, GridQuery,
    };

    use super::{ObstacleGrid, World};

    /// Identifier of the current grid generation.
    #[must_use]
    pub fn grid_id(world: &World) -> GridId {
        world.grid_id
    }

    /// Dimensions of the current grid as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.obstacles.dimensions()
    }

    /// Number of steps the world clock has advanced.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Structure occupying the cell, if any.
    #[must_use]
    pub fn obstacle(world: &World, cell: CellCoord) -> Option<Fill> {
        world.obstacles.fill(cell)
    }

    /// Exposes the structure grid through the beam grid capability.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView {
            obstacles: &world.obstacles,
        }
    }

    /// Captures the state of an actor for beam validity checks.
    #[must_use]
    pub fn caster_snapshot(world: &World, actor: ActorId) -> Option<CasterSnapshot> {
        world.actors.get(actor).map(|record| CasterSnapshot {
            actor: record.id,
            position: record.cell.center_3d(),
            cell: record.cell,
            state: record.state,
            grid: world.grid_id,
        })
    }

    /// Captures every actor in ascending identifier order.
    #[must_use]
    pub fn actors(world: &World) -> Vec<ActorSnapshot> {
        world
            .actors
            .iter()
            .map(|record| ActorSnapshot {
                id: record.id,
                cell: record.cell,
                health: record.health,
                state: record.state,
            })
            .collect()
    }

    /// Immutable representation of a single actor's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ActorSnapshot {
        /// Identifier allocated to the actor.
        pub id: ActorId,
        /// Cell occupied by the actor.
        pub cell: CellCoord,
        /// Remaining health.
        pub health: u32,
        /// Lifecycle state of the actor.
        pub state: ActorState,
    }

    /// Read-only view of the structure grid.
    #[derive(Clone, Copy, Debug)]
    pub struct GridView<'a> {
        obstacles: &'a ObstacleGrid,
    }

    impl GridQuery for GridView<'_> {
        fn in_bounds(&self, cell: CellCoord) -> bool {
            self.obstacles.contains(cell)
        }

        fn is_fully_obstructed(&self, cell: CellCoord) -> bool {
            self.obstacles.fill(cell) == Some(Fill::Full)
        }
    }
}

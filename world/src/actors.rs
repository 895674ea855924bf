//! Authoritative actor state management utilities.

use std::collections::BTreeMap;

use astral_beam_core::{ActorId, ActorState, CellCoord};

/// Actor stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct ActorRecord {
    /// Identifier allocated by the world for the actor.
    pub(crate) id: ActorId,
    /// Cell occupied by the actor.
    pub(crate) cell: CellCoord,
    /// Remaining health.
    pub(crate) health: u32,
    /// Fraction of incoming damage absorbed before penetration, in 0.0..=1.0.
    pub(crate) armor: f32,
    /// Lifecycle state of the actor.
    pub(crate) state: ActorState,
}

impl ActorRecord {
    /// Removes health, returning the amount actually lost and whether the actor died.
    pub(crate) fn take_damage(&mut self, amount: u32, armor_penetration: f32) -> (u32, bool) {
        if self.state != ActorState::Active {
            return (0, false);
        }
        let effective_armor = (self.armor - armor_penetration).clamp(0.0, 1.0);
        let dealt = (amount as f32 * (1.0 - effective_armor)).round() as u32;
        let dealt = dealt.min(self.health);
        self.health -= dealt;
        if self.health == 0 {
            self.state = ActorState::Dead;
            return (dealt, true);
        }
        (dealt, false)
    }
}

/// Registry that stores actors and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ActorRegistry {
    entries: BTreeMap<ActorId, ActorRecord>,
    next_actor_id: ActorId,
}

impl ActorRegistry {
    /// Creates an empty actor registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_actor_id: ActorId::new(0),
        }
    }

    /// Spawns an actor and returns its freshly allocated identifier.
    pub(crate) fn spawn(&mut self, cell: CellCoord, health: u32, armor: f32) -> ActorId {
        let id = self.next_actor_id;
        self.next_actor_id = ActorId::new(id.get().saturating_add(1));
        let state = if health == 0 {
            ActorState::Dead
        } else {
            ActorState::Active
        };
        let _ = self.entries.insert(
            id,
            ActorRecord {
                id,
                cell,
                health,
                armor: armor.clamp(0.0, 1.0),
                state,
            },
        );
        id
    }

    pub(crate) fn get(&self, actor: ActorId) -> Option<&ActorRecord> {
        self.entries.get(&actor)
    }

    pub(crate) fn get_mut(&mut self, actor: ActorId) -> Option<&mut ActorRecord> {
        self.entries.get_mut(&actor)
    }

    /// Iterates actors in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &ActorRecord> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActorRecord> {
        self.entries.values_mut()
    }
}

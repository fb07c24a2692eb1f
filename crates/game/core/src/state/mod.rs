//! Authoritative simulation state.
//!
//! Everything the engine mutates lives here: the entity arena, the turn
//! queue, and the two per-side fire lines. The whole aggregate serializes
//! as one snapshot, which is the entire persistence contract.

mod common;
mod entities;
mod vitals;

pub use common::{Direction, EntityId, Position, SizeClass, Tick};
pub use entities::{EntitiesState, Entity, EntityKind, Loadout, Weapon, WeaponKind};
pub use vitals::Vitals;

use crate::env::compute_seed;
use crate::env::MapOracle;
use crate::fire::FireLines;
use crate::scheduler::TurnQueue;

/// Canonical snapshot of the simulation.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// RNG seed fixed at session start; with it, replays are bit-identical.
    pub game_seed: u64,
    /// Action sequence number, incremented once per attempted action.
    /// Combined with the seed to give every roll its own stream.
    pub nonce: u64,
    pub queue: TurnQueue,
    pub entities: EntitiesState,
    pub fire: FireLines,
}

impl GameState {
    pub fn new(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::default()
        }
    }

    /// Seed for one roll of the current action.
    pub fn roll_seed(&self, actor: EntityId, context: u32) -> u64 {
        compute_seed(self.game_seed, self.nonce, actor.0, context)
    }

    /// Inserts the player and schedules them to act immediately.
    pub fn spawn_player(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.spawn_player(entity);
        self.queue.schedule(0, id);
        id
    }

    /// Inserts a scheduled entity (actor or hazard) and gives it a ticket
    /// at the current time, or an inert one (item, feature) with no ticket.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let scheduled = entity.behavior.is_some();
        let id = self.entities.spawn(entity);
        if scheduled {
            self.queue.schedule(0, id);
        }
        id
    }

    /// Removes an entity and its pending ticket in one step.
    /// `active` is the entity currently holding the popped ticket.
    pub fn despawn(&mut self, id: EntityId, active: EntityId) -> Option<Entity> {
        self.queue.unschedule(id, active);
        self.entities.remove(id)
    }

    /// True if the cell can be stepped onto: walkable terrain, nothing
    /// blocking on it.
    pub fn can_enter(&self, map: &dyn MapOracle, position: Position) -> bool {
        map.in_bounds(position)
            && map.is_walkable(position)
            && self.entities.blocking_entity_at(position).is_none()
    }
}

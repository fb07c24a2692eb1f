//! Arena storage for everything that exists in the simulation.
//!
//! Entities are held in a flat vector and referenced by stable integer
//! handles; behaviors and fire lines never hold pointers, which keeps the
//! whole state serializable and free of ownership cycles.

use crate::behavior::Behavior;
use crate::env::MapOracle;
use crate::state::{EntityId, Position, SizeClass};

use super::vitals::Vitals;

/// Broad classification driving queries and targeting rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// A creature that takes turns: the player or a hostile.
    Actor,
    /// Scenery that can be shot at and destroyed (barrels, crates).
    Feature,
    /// A transient cloud (smoke, fire) with a dissipation behavior.
    Hazard,
    /// A pickup lying on the floor.
    Item { auto_pickup: bool },
}

/// Equipped weapon. Melee weapons fold into the attack stat; ranged weapons
/// carry their own damage, range, and ammunition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub name: String,
    pub kind: WeaponKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponKind {
    Melee {
        attack_bonus: i32,
    },
    Ranged {
        base_damage: i32,
        base_range: u32,
        clip_size: u32,
        current_clip: u32,
    },
}

impl Weapon {
    pub fn melee(name: impl Into<String>, attack_bonus: i32) -> Self {
        Self {
            name: name.into(),
            kind: WeaponKind::Melee { attack_bonus },
        }
    }

    pub fn ranged(name: impl Into<String>, base_damage: i32, base_range: u32, clip_size: u32) -> Self {
        Self {
            name: name.into(),
            kind: WeaponKind::Ranged {
                base_damage,
                base_range,
                clip_size,
                current_clip: clip_size,
            },
        }
    }

    pub fn is_ranged(&self) -> bool {
        matches!(self.kind, WeaponKind::Ranged { .. })
    }
}

/// Equipment-derived bonuses. Inventory bookkeeping itself lives outside
/// the core; only the numbers that feed combat are kept here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    pub weapon: Option<Weapon>,
    pub armor_bonus: i32,
    pub defense_bonus: i32,
}

impl Loadout {
    pub fn attack_bonus(&self) -> i32 {
        match &self.weapon {
            Some(Weapon {
                kind: WeaponKind::Melee { attack_bonus },
                ..
            }) => *attack_bonus,
            _ => 0,
        }
    }
}

/// One simulated object: actor, feature, hazard, or floor item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub position: Position,
    pub size: SizeClass,
    pub blocks_movement: bool,
    pub blocks_view: bool,
    pub vitals: Option<Vitals>,
    pub loadout: Loadout,
    /// The decision object invoked when the scheduler hands this entity a
    /// turn. `None` for inert entities (items, plain features).
    pub behavior: Option<Behavior>,
    /// Consecutive-wait aim bonus, spent on the next shot.
    pub aim_stack: i32,
    /// Consecutive-wait hunker bonus, spent defending behind cover.
    pub hunker_stack: i32,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind, position: Position) -> Self {
        Self {
            id: EntityId::PLAYER,
            name: name.into(),
            kind,
            position,
            size: SizeClass::Medium,
            blocks_movement: false,
            blocks_view: false,
            vitals: None,
            loadout: Loadout::default(),
            behavior: None,
            aim_stack: 0,
            hunker_stack: 0,
        }
    }

    pub fn with_size(mut self, size: SizeClass) -> Self {
        self.size = size;
        self
    }

    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = Some(vitals);
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.loadout.weapon = Some(weapon);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn blocking(mut self) -> Self {
        self.blocks_movement = true;
        self
    }

    pub fn view_blocking(mut self) -> Self {
        self.blocks_view = true;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.vitals.as_ref().is_some_and(Vitals::is_alive)
    }

    pub fn is_actor(&self) -> bool {
        matches!(self.kind, EntityKind::Actor)
    }

    /// Attack pool: base stat plus melee weapon bonus, dragged down by
    /// fatigue, never negative.
    pub fn attack(&self) -> i32 {
        let Some(vitals) = &self.vitals else { return 0 };
        (vitals.base_attack + self.loadout.attack_bonus() - vitals.combat_penalty()).max(0)
    }

    /// Defense pool under the same fatigue penalty as attack.
    pub fn defense(&self) -> i32 {
        let Some(vitals) = &self.vitals else { return 0 };
        (vitals.base_defense + self.loadout.defense_bonus - vitals.combat_penalty()).max(0)
    }

    pub fn armor(&self) -> i32 {
        let Some(vitals) = &self.vitals else { return 0 };
        vitals.base_armor + self.loadout.armor_bonus
    }

    pub fn action_speed(&self) -> u64 {
        self.vitals
            .as_ref()
            .map(Vitals::action_speed)
            .unwrap_or(crate::config::GameConfig::BASE_SPEED)
    }

    /// Wraps the current behavior in a confusion spell for `turns` turns.
    pub fn confuse(&mut self, turns: i32) {
        let previous = self.behavior.take().unwrap_or(Behavior::Idle);
        self.behavior = Some(Behavior::Confused {
            previous: Box::new(previous),
            turns_remaining: turns,
        });
    }
}

/// The entity arena plus its handle allocator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitiesState {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for EntitiesState {
    fn default() -> Self {
        Self::empty()
    }
}

impl EntitiesState {
    pub fn empty() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Inserts the player. Always takes the reserved id 0.
    pub fn spawn_player(&mut self, mut entity: Entity) -> EntityId {
        entity.id = EntityId::PLAYER;
        debug_assert!(self.get(EntityId::PLAYER).is_none(), "player already spawned");
        self.entities.push(entity);
        EntityId::PLAYER
    }

    /// Inserts any non-player entity under a freshly allocated handle.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id == id)?;
        Some(self.entities.remove(index))
    }

    pub fn player(&self) -> Option<&Entity> {
        self.get(EntityId::PLAYER)
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.get_mut(EntityId::PLAYER)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ========================================================================
    // Spatial queries
    // ========================================================================

    /// The living actor standing on a cell, if any.
    pub fn actor_at(&self, position: Position) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.position == position && e.is_actor() && e.is_alive())
    }

    /// Whatever a shot can strike on a cell: a living actor or a feature.
    pub fn target_at(&self, position: Position) -> Option<&Entity> {
        self.entities.iter().find(|e| {
            e.position == position
                && ((e.is_actor() && e.is_alive()) || matches!(e.kind, EntityKind::Feature))
        })
    }

    pub fn blocking_entity_at(&self, position: Position) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.position == position && e.blocks_movement)
    }

    pub fn hazard_at(&self, position: Position) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.position == position && matches!(e.kind, EntityKind::Hazard))
    }

    pub fn item_at(&self, position: Position) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.position == position && matches!(e.kind, EntityKind::Item { .. }))
    }

    /// True if any other living actor stands on a visible tile. Behaviors
    /// use this as the "am I alone" check before automating.
    pub fn sees_other_actor(&self, viewer: EntityId, map: &dyn MapOracle) -> bool {
        self.entities.iter().any(|e| {
            e.id != viewer && e.is_actor() && e.is_alive() && map.is_visible(e.position)
        })
    }

    /// Living visible actors other than `viewer`, nearest first by
    /// Chebyshev distance from `from`.
    pub fn nearest_visible_actor(
        &self,
        viewer: EntityId,
        from: Position,
        map: &dyn MapOracle,
    ) -> Option<&Entity> {
        self.entities
            .iter()
            .filter(|e| {
                e.id != viewer && e.is_actor() && e.is_alive() && map.is_visible(e.position)
            })
            .min_by_key(|e| from.chebyshev(e.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::GridMap;

    fn actor(name: &str, position: Position) -> Entity {
        Entity::new(name, EntityKind::Actor, position)
            .blocking()
            .with_vitals(Vitals::new(10, 3, 2, 1))
    }

    #[test]
    fn handles_are_stable_and_unique() {
        let mut arena = EntitiesState::empty();
        let a = arena.spawn(actor("a", Position::new(1, 1)));
        let b = arena.spawn(actor("b", Position::new(2, 2)));
        assert_ne!(a, b);
        arena.remove(a);
        let c = arena.spawn(actor("c", Position::new(3, 3)));
        assert_ne!(b, c);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(c).unwrap().name, "c");
    }

    #[test]
    fn queries_respect_kind_and_liveness() {
        let mut arena = EntitiesState::empty();
        let pos = Position::new(4, 4);
        let id = arena.spawn(actor("guard", pos));
        assert!(arena.actor_at(pos).is_some());
        assert!(arena.blocking_entity_at(pos).is_some());

        let dead = arena.get_mut(id).unwrap();
        let _ = dead.vitals.as_mut().unwrap().kill();
        assert!(arena.actor_at(pos).is_none());
        assert!(arena.target_at(pos).is_none());
    }

    #[test]
    fn fatigue_drags_pools_down_to_zero() {
        let mut entity = actor("bruiser", Position::ORIGIN);
        entity.vitals.as_mut().unwrap().add_stun(30);
        assert_eq!(entity.attack(), 0);
        assert_eq!(entity.defense(), 0);
    }

    #[test]
    fn visibility_query_ignores_self_and_corpses() {
        let mut arena = EntitiesState::empty();
        let mut map = GridMap::open(8, 8);
        map.reveal_all();
        let player = arena.spawn_player(actor("you", Position::new(0, 0)));
        assert!(!arena.sees_other_actor(player, &map));
        let foe = arena.spawn(actor("raider", Position::new(5, 5)));
        assert!(arena.sees_other_actor(player, &map));
        let _ = arena.get_mut(foe).unwrap().vitals.as_mut().unwrap().kill();
        assert!(!arena.sees_other_actor(player, &map));
    }
}

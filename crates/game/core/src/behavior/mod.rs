//! Per-entity decision objects.
//!
//! A behavior is invoked once each time the scheduler hands its entity a
//! turn, decides exactly one action, and executes it. Behaviors are values
//! on the entity: a temporary state (confusion, a dissipating cloud) wraps
//! the previous behavior and restores it when it runs out, so the entity
//! keeps its identity across the swap.

mod pathfinding;

pub use pathfinding::find_path;

use tracing::debug;

use crate::action::{ActionError, ActionKind, execute};
use crate::combat::roll_context;
use crate::config::GameConfig;
use crate::env::{Env, MessageTag};
use crate::geometry::{circle_coords, disk_coords};
use crate::state::{Direction, EntityId, GameState, Position, WeaponKind};

use strum::IntoEnumIterator;

/// The closed set of behavior variants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behavior {
    /// Terminal fallback: takes no action. Corpses end up here.
    Idle,
    /// Chases and attacks the player, holding a chase path across turns.
    Hostile { path: Vec<Position> },
    /// Stumbles in random directions until the counter runs out, then
    /// reverts to the stored previous behavior.
    Confused {
        previous: Box<Behavior>,
        turns_remaining: i32,
    },
    /// A cloud counting down its lifespan, thinning in stages and possibly
    /// seeding siblings before it goes.
    Dissipating {
        previous: Box<Behavior>,
        turns_remaining: i32,
        initial: i32,
        spawn_siblings: bool,
        chokes: bool,
    },
    /// Player automation: head for the nearest unexplored reachable tile,
    /// detouring to eligible pickups.
    AutoExplore { path: Vec<Position> },
    /// Player automation: head for a fixed destination.
    AutoTravel {
        destination: Position,
        path: Vec<Position>,
    },
}

impl Behavior {
    pub fn hostile() -> Self {
        Behavior::Hostile { path: Vec::new() }
    }

    pub fn dissipating(lifespan: i32, spawn_siblings: bool, chokes: bool) -> Self {
        Behavior::Dissipating {
            previous: Box::new(Behavior::Idle),
            turns_remaining: lifespan,
            initial: lifespan,
            spawn_siblings,
            chokes,
        }
    }

    pub fn auto_explore() -> Self {
        Behavior::AutoExplore { path: Vec::new() }
    }

    pub fn auto_travel(destination: Position) -> Self {
        Behavior::AutoTravel {
            destination,
            path: Vec::new(),
        }
    }

    /// True for the unattended player modes that the cancellation signal
    /// unwinds.
    pub fn is_automated(&self) -> bool {
        matches!(
            self,
            Behavior::AutoExplore { .. } | Behavior::AutoTravel { .. }
        )
    }
}

/// Result of one behavior invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BehaviorVerdict {
    /// Took exactly one action; reschedule at the entity's speed.
    Acted,
    /// Restored the stored previous behavior; the swap consumes the turn.
    Reverted,
    /// The entity removed itself from the simulation.
    Expired,
    /// The chosen action was impossible; the dispatch layer decides what
    /// the failure costs.
    Blocked(ActionError),
    /// Automation must stop and hand control back to manual input.
    Cancel(String),
}

/// Invokes the entity's behavior for one turn.
pub fn tick(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    config: &GameConfig,
) -> BehaviorVerdict {
    let Some(entity) = state.entities.get_mut(actor) else {
        return BehaviorVerdict::Expired;
    };
    let Some(mut behavior) = entity.behavior.take() else {
        // inert entity on the schedule: treat as a wait
        return BehaviorVerdict::Acted;
    };

    let verdict = match &mut behavior {
        Behavior::Idle => BehaviorVerdict::Acted,
        Behavior::Hostile { path } => hostile_tick(state, env, actor, path),
        Behavior::Confused {
            turns_remaining, ..
        } => confused_tick(state, env, actor, turns_remaining),
        Behavior::Dissipating {
            turns_remaining,
            initial,
            spawn_siblings,
            chokes,
            ..
        } => dissipating_tick(
            state,
            env,
            actor,
            turns_remaining,
            *initial,
            *spawn_siblings,
            *chokes,
        ),
        Behavior::AutoExplore { path } => explore_tick(state, env, actor, path, config),
        Behavior::AutoTravel { destination, path } => {
            travel_tick(state, env, actor, *destination, path)
        }
    };

    // Reinstall the (possibly mutated) behavior, or unwrap the stored
    // previous one on reversion. An expired entity is gone already.
    let restored = match &verdict {
        BehaviorVerdict::Expired => None,
        BehaviorVerdict::Reverted => match behavior {
            Behavior::Confused { previous, .. } | Behavior::Dissipating { previous, .. } => {
                Some(*previous)
            }
            other => Some(other),
        },
        _ => Some(behavior),
    };
    if let Some(behavior) = restored {
        if let Some(entity) = state.entities.get_mut(actor) {
            entity.behavior = Some(behavior);
        }
    }

    verdict
}

fn run(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    action: ActionKind,
) -> BehaviorVerdict {
    match execute(state, env, actor, &action) {
        Ok(()) => BehaviorVerdict::Acted,
        Err(error) => BehaviorVerdict::Blocked(error),
    }
}

// ============================================================================
// Hostile
// ============================================================================

fn hostile_tick(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    path: &mut Vec<Position>,
) -> BehaviorVerdict {
    let Some(me) = state.entities.get(actor) else {
        return BehaviorVerdict::Expired;
    };
    let my_pos = me.position;
    let weapon_kind = me.loadout.weapon.as_ref().map(|w| w.kind);

    let foe = state
        .entities
        .player()
        .filter(|player| player.is_alive())
        .map(|player| player.position);

    // Standing inside the player's field of view means the sight line is
    // mutual: engage.
    if let Some(foe_pos) = foe {
        if env.map.is_visible(my_pos) {
            // the player's cached combat numbers are about a different
            // shooter now; drop them, and drop any sentry stance
            state.fire.player.clear_cache();
            if let Some(me) = state.entities.get_mut(actor) {
                me.hunker_stack = 0;
                me.aim_stack = 0;
            }

            let distance = my_pos.chebyshev(foe_pos);
            match weapon_kind {
                None => {
                    if distance <= 1 {
                        return melee_toward(state, env, actor, my_pos, foe_pos);
                    }
                }
                Some(WeaponKind::Ranged {
                    base_range,
                    current_clip,
                    ..
                }) => {
                    if current_clip == 0 {
                        return run(state, env, actor, ActionKind::Reload);
                    }
                    if distance <= base_range {
                        // keep the chase path warm for the turn sight is lost
                        *path = find_path(env.map, Some(&state.entities), my_pos, foe_pos);
                        return run(
                            state,
                            env,
                            actor,
                            ActionKind::Fire {
                                target_xy: Some(foe_pos),
                            },
                        );
                    }
                }
                Some(WeaponKind::Melee { .. }) => {
                    if distance <= 1 {
                        return melee_toward(state, env, actor, my_pos, foe_pos);
                    }
                }
            }

            *path = find_path(env.map, Some(&state.entities), my_pos, foe_pos);
        }
    }

    // out of sight: keep walking the last known route
    if !path.is_empty() {
        return step_along(state, env, actor, my_pos, path);
    }
    run(state, env, actor, ActionKind::Wait)
}

fn melee_toward(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    from: Position,
    to: Position,
) -> BehaviorVerdict {
    match Direction::from_delta(to.x - from.x, to.y - from.y) {
        Some(direction) => run(state, env, actor, ActionKind::Melee(direction)),
        None => BehaviorVerdict::Blocked(ActionError::NothingToAttack),
    }
}

fn step_along(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    from: Position,
    path: &mut Vec<Position>,
) -> BehaviorVerdict {
    let next = path.remove(0);
    match Direction::from_delta(next.x - from.x, next.y - from.y) {
        Some(direction) => run(state, env, actor, ActionKind::Move(direction)),
        None => {
            // stale path (the entity was displaced); recompute next turn
            path.clear();
            BehaviorVerdict::Blocked(ActionError::BlockedByTile)
        }
    }
}

// ============================================================================
// Confused
// ============================================================================

fn confused_tick(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    turns_remaining: &mut i32,
) -> BehaviorVerdict {
    if *turns_remaining <= 0 {
        if let Some(entity) = state.entities.get(actor) {
            env.messages.post(
                &format!("The {} is no longer confused.", entity.name),
                MessageTag::Status,
            );
        }
        return BehaviorVerdict::Reverted;
    }

    let seed = state.roll_seed(actor, roll_context::CONFUSION);
    let index = env.rng.range(seed, 0, 7) as usize;
    let direction = Direction::iter().nth(index).unwrap_or(Direction::North);

    *turns_remaining -= 1;
    // either lurch or blindly swing at whoever is in the way; bumping a
    // wall wastes the turn
    run(state, env, actor, ActionKind::Bump(direction))
}

// ============================================================================
// Dissipating
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn dissipating_tick(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    turns_remaining: &mut i32,
    initial: i32,
    spawn_siblings: bool,
    chokes: bool,
) -> BehaviorVerdict {
    if *turns_remaining <= 0 {
        if let Some(entity) = state.entities.get_mut(actor) {
            entity.blocks_view = false;
            if let Some(vitals) = entity.vitals.as_mut() {
                // zero health runs the usual death path exactly once
                let _ = vitals.kill();
            }
        }
        state.despawn(actor, actor);
        debug!(%actor, "hazard dissipated");
        return BehaviorVerdict::Expired;
    }

    let Some(position) = state.entities.get(actor).map(|e| e.position) else {
        return BehaviorVerdict::Expired;
    };

    let stage_seed = state.roll_seed(actor, roll_context::HAZARD_STAGE);
    let thin = *turns_remaining <= initial / 3 + env.rng.jitter(stage_seed, 1);
    let mid = *turns_remaining <= initial / 2 + env.rng.jitter(stage_seed ^ 0x5a, 1);

    if thin {
        // nearly gone: sight returns and the cloud's bite fades each turn
        if let Some(entity) = state.entities.get_mut(actor) {
            entity.blocks_view = false;
            if let Some(vitals) = entity.vitals.as_mut() {
                vitals.base_attack /= 2;
            }
        }
    } else if mid {
        if let Some(entity) = state.entities.get_mut(actor) {
            entity.blocks_view = false;
        }
    } else if spawn_siblings {
        let spawn_seed = state.roll_seed(actor, roll_context::HAZARD_SPAWN);
        if env.rng.chance(spawn_seed, 10) {
            *turns_remaining += 2;
            let template = state.entities.get(actor).cloned();
            if let Some(template) = template {
                for (index, cell) in disk_coords(position, 1).into_iter().enumerate() {
                    if !env.map.is_walkable(cell) || state.entities.hazard_at(cell).is_some() {
                        continue;
                    }
                    let lifespan_seed =
                        state.roll_seed(actor, roll_context::HAZARD_LIFESPAN) ^ index as u64;
                    let lifespan = *turns_remaining + env.rng.range(lifespan_seed, 0, 2) as i32;

                    let mut sibling = template.clone();
                    sibling.position = cell;
                    sibling.blocks_view = true;
                    sibling.behavior = Some(Behavior::Dissipating {
                        previous: Box::new(Behavior::Idle),
                        turns_remaining: lifespan,
                        initial: lifespan,
                        spawn_siblings: false,
                        chokes,
                    });
                    let id = state.spawn(sibling);
                    debug!(%id, ?cell, "hazard spread");
                }
            }
        }
    }

    if chokes && state.entities.actor_at(position).is_some() {
        // breathing it is the cloud's attack; failure cannot happen here
        let _ = execute(state, env, actor, &ActionKind::Choke);
    }

    *turns_remaining -= 1;
    BehaviorVerdict::Acted
}

// ============================================================================
// Player automation
// ============================================================================

fn explore_tick(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    path: &mut Vec<Position>,
    config: &GameConfig,
) -> BehaviorVerdict {
    if state.entities.sees_other_actor(actor, env.map) {
        return BehaviorVerdict::Cancel("You are not alone.".into());
    }
    let Some(my_pos) = state.entities.get(actor).map(|e| e.position) else {
        return BehaviorVerdict::Expired;
    };

    // visible eligible pickups take priority over fresh ground
    let pickup_target = state
        .entities
        .iter()
        .filter(|e| {
            matches!(e.kind, crate::state::EntityKind::Item { auto_pickup: true })
                && env.map.is_visible(e.position)
        })
        .map(|e| e.position)
        .min_by_key(|&p| my_pos.chebyshev(p));
    if let Some(item_pos) = pickup_target {
        if item_pos == my_pos {
            return run(state, env, actor, ActionKind::Pickup);
        }
        *path = find_path(env.map, None, my_pos, item_pos);
    }

    if path.is_empty() {
        *path = match nearest_unexplored_path(env, my_pos, config) {
            Ok(found) => found,
            Err(reason) => return BehaviorVerdict::Cancel(reason),
        };
    }

    match step_along(state, env, actor, my_pos, path) {
        BehaviorVerdict::Blocked(error) => BehaviorVerdict::Cancel(error.to_string()),
        verdict => verdict,
    }
}

/// Ring search outward from the player: at each radius, consider every
/// in-bounds walkable unexplored tile and keep the shortest path among
/// them. Gives up past the radius cap.
fn nearest_unexplored_path(
    env: &Env<'_>,
    from: Position,
    config: &GameConfig,
) -> Result<Vec<Position>, String> {
    let mut radius = 1;
    loop {
        radius += 1;
        let mut best: Option<Vec<Position>> = None;
        for cell in circle_coords(from, radius) {
            if !env.map.in_bounds(cell)
                || !env.map.is_walkable(cell)
                || env.map.is_explored(cell)
            {
                continue;
            }
            let path = find_path(env.map, None, from, cell);
            if path.is_empty() {
                continue;
            }
            if best.as_ref().is_none_or(|b| path.len() < b.len()) {
                best = Some(path);
            }
        }
        if let Some(path) = best {
            return Ok(path);
        }
        if radius >= config.explore_radius_cap as i32 {
            return Err("There is nowhere else to explore.".into());
        }
    }
}

fn travel_tick(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    destination: Position,
    path: &mut Vec<Position>,
) -> BehaviorVerdict {
    if state.entities.sees_other_actor(actor, env.map) {
        return BehaviorVerdict::Cancel("You are not alone.".into());
    }
    if !env.map.is_explored(destination) {
        return BehaviorVerdict::Cancel("You don't know how to get there.".into());
    }
    let Some(my_pos) = state.entities.get(actor).map(|e| e.position) else {
        return BehaviorVerdict::Expired;
    };

    if path.is_empty() {
        *path = find_path(env.map, None, my_pos, destination);
    }
    if path.is_empty() {
        // arrival and unreachability end the trip the same way
        return BehaviorVerdict::Cancel("Here you are.".into());
    }

    match step_along(state, env, actor, my_pos, path) {
        BehaviorVerdict::Blocked(error) => BehaviorVerdict::Cancel(error.to_string()),
        verdict => verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{GridMap, MessageLog, PcgRng};
    use crate::state::{Entity, EntityKind, SizeClass, Vitals, Weapon};

    fn setup() -> (GameState, GridMap, MessageLog, GameConfig) {
        let mut map = GridMap::open(14, 14);
        map.reveal_all();
        (GameState::new(11), map, MessageLog::new(), GameConfig::new())
    }

    fn player(position: Position) -> Entity {
        Entity::new("you", EntityKind::Actor, position)
            .blocking()
            .with_vitals(Vitals::new(20, 4, 3, 1))
    }

    fn raider(position: Position) -> Entity {
        Entity::new("raider", EntityKind::Actor, position)
            .blocking()
            .with_vitals(Vitals::new(8, 3, 2, 0))
            .with_behavior(Behavior::hostile())
    }

    #[test]
    fn hostile_melees_when_adjacent() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(3, 3)));
        let foe = state.spawn(raider(Position::new(4, 3)));

        let verdict = tick(&mut state, &env, foe, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        assert!(log.contains("Raider attacks you"));
    }

    #[test]
    fn hostile_advances_when_out_of_reach() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(2, 2)));
        let foe = state.spawn(raider(Position::new(8, 2)));

        let verdict = tick(&mut state, &env, foe, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        let moved = state.entities.get(foe).unwrap().position;
        assert_eq!(moved.chebyshev(Position::new(2, 2)), 5);
    }

    #[test]
    fn hostile_reloads_an_empty_weapon() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(2, 2)));
        let mut gunner = raider(Position::new(6, 2)).with_weapon(Weapon::ranged("gun", 3, 6, 4));
        if let Some(Weapon {
            kind: WeaponKind::Ranged { current_clip, .. },
            ..
        }) = gunner.loadout.weapon.as_mut()
        {
            *current_clip = 0;
        }
        let foe = state.spawn(gunner);

        let verdict = tick(&mut state, &env, foe, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        let clip = match state.entities.get(foe).unwrap().loadout.weapon.as_ref().unwrap().kind {
            WeaponKind::Ranged { current_clip, .. } => current_clip,
            _ => unreachable!(),
        };
        assert_eq!(clip, 4);
    }

    #[test]
    fn hostile_fires_when_in_range() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(2, 2)));
        let foe = state.spawn(raider(Position::new(6, 2)).with_weapon(Weapon::ranged("gun", 3, 6, 4)));

        let verdict = tick(&mut state, &env, foe, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        let clip = match state.entities.get(foe).unwrap().loadout.weapon.as_ref().unwrap().kind {
            WeaponKind::Ranged { current_clip, .. } => current_clip,
            _ => unreachable!(),
        };
        assert_eq!(clip, 3);
        // the shot resolved one way or another
        assert!(!log.messages().is_empty());
    }

    #[test]
    fn hostile_engagement_resets_sentry_stacks_and_player_cache() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(2, 2)));
        let foe = state.spawn(raider(Position::new(8, 2)));
        if let Some(e) = state.entities.get_mut(foe) {
            e.aim_stack = 3;
            e.hunker_stack = 2;
        }

        tick(&mut state, &env, foe, &config);
        let foe_ref = state.entities.get(foe).unwrap();
        assert_eq!(foe_ref.aim_stack, 0);
        assert_eq!(foe_ref.hunker_stack, 0);
    }

    #[test]
    fn hostile_waits_with_no_sight_and_no_path() {
        let (mut state, mut map, log, config) = setup();
        map.hide_all();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(2, 2)));
        let foe = state.spawn(raider(Position::new(9, 9)));

        let verdict = tick(&mut state, &env, foe, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        assert_eq!(state.entities.get(foe).unwrap().position, Position::new(9, 9));
    }

    #[test]
    fn confusion_counts_down_and_reverts_with_one_message() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(2, 2)));
        let foe = state.spawn(raider(Position::new(9, 9)));
        state.entities.get_mut(foe).unwrap().confuse(1);

        // first invocation stumbles and decrements
        let verdict = tick(&mut state, &env, foe, &config);
        assert!(matches!(
            verdict,
            BehaviorVerdict::Acted | BehaviorVerdict::Blocked(_)
        ));
        assert!(matches!(
            state.entities.get(foe).unwrap().behavior,
            Some(Behavior::Confused {
                turns_remaining: 0,
                ..
            })
        ));

        // second invocation reverts and announces exactly once
        state.nonce += 1;
        let verdict = tick(&mut state, &env, foe, &config);
        assert_eq!(verdict, BehaviorVerdict::Reverted);
        assert_eq!(log.count_containing("is no longer confused"), 1);
        assert!(matches!(
            state.entities.get(foe).unwrap().behavior,
            Some(Behavior::Hostile { .. })
        ));
    }

    #[test]
    fn dissipating_cloud_expires_and_despawns() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(1, 1)));
        let cloud = state.spawn(
            Entity::new("fog", EntityKind::Hazard, Position::new(5, 5))
                .view_blocking()
                .with_size(SizeClass::Medium)
                .with_vitals(Vitals::new(1, 0, 0, 0))
                .with_behavior(Behavior::dissipating(0, false, false)),
        );

        // drain the spawn tickets the way the engine would before invoking
        assert_eq!(state.queue.invoke_next(), Ok(EntityId::PLAYER));
        assert_eq!(state.queue.invoke_next(), Ok(cloud));

        let verdict = tick(&mut state, &env, cloud, &config);
        assert_eq!(verdict, BehaviorVerdict::Expired);
        assert!(state.entities.get(cloud).is_none());
        assert!(!state.queue.is_scheduled(cloud));
    }

    #[test]
    fn dissipating_cloud_chokes_its_occupant() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        state.spawn_player(player(Position::new(5, 5)));
        let cloud = state.spawn(
            Entity::new("toxic smoke", EntityKind::Hazard, Position::new(5, 5))
                .view_blocking()
                .with_size(SizeClass::Medium)
                .with_vitals(Vitals::new(1, 2, 0, 0))
                .with_behavior(Behavior::dissipating(9, false, true)),
        );

        let verdict = tick(&mut state, &env, cloud, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        assert!(log.contains("chokes in the toxic smoke"));
        let hp = state
            .entities
            .player()
            .unwrap()
            .vitals
            .as_ref()
            .unwrap()
            .health();
        assert!(hp < 20);
    }

    #[test]
    fn explore_cancels_when_not_alone() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        let me = state.spawn_player(player(Position::new(2, 2)).with_behavior(Behavior::auto_explore()));
        state.spawn(raider(Position::new(9, 9)));

        let verdict = tick(&mut state, &env, me, &config);
        assert_eq!(
            verdict,
            BehaviorVerdict::Cancel("You are not alone.".into())
        );
    }

    #[test]
    fn explore_cancels_once_everything_is_explored() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        let start = Position::new(2, 2);
        let me = state.spawn_player(player(start).with_behavior(Behavior::auto_explore()));

        // everything revealed: nothing qualifies, search climbs to the cap
        let verdict = tick(&mut state, &env, me, &config);
        assert_eq!(
            verdict,
            BehaviorVerdict::Cancel("There is nowhere else to explore.".into())
        );
        assert_eq!(state.entities.get(me).unwrap().position, start);
    }

    #[test]
    fn explore_walks_toward_unexplored_ground() {
        let (mut state, mut map, log, config) = setup();
        map.set_explored(Position::new(9, 2), false);
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        let me = state.spawn_player(player(Position::new(2, 2)).with_behavior(Behavior::auto_explore()));

        let verdict = tick(&mut state, &env, me, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        assert_ne!(state.entities.get(me).unwrap().position, Position::new(2, 2));
    }

    #[test]
    fn explore_detours_to_pick_up_loot() {
        let (mut state, map, log, config) = setup();
        let rng = PcgRng;
        let env = Env::new(&map, &rng, &log);
        let me = state.spawn_player(player(Position::new(4, 4)).with_behavior(Behavior::auto_explore()));
        state.spawn(Entity::new(
            "ammo cell",
            EntityKind::Item { auto_pickup: true },
            Position::new(4, 4),
        ));

        let verdict = tick(&mut state, &env, me, &config);
        assert_eq!(verdict, BehaviorVerdict::Acted);
        assert!(log.contains("You put the ammo cell in the inventory."));
    }

    #[test]
    fn travel_cancels_on_unknown_destinations_and_arrival() {
        let (mut state, mut map, log, config) = setup();
        let rng = PcgRng;
        let destination = Position::new(6, 2);
        let me = state.spawn_player(player(Position::new(2, 2)).with_behavior(Behavior::auto_travel(destination)));

        map.set_explored(destination, false);
        {
            let env = Env::new(&map, &rng, &log);
            let verdict = tick(&mut state, &env, me, &config);
            assert_eq!(
                verdict,
                BehaviorVerdict::Cancel("You don't know how to get there.".into())
            );
        }

        map.reveal_all();
        let env = Env::new(&map, &rng, &log);
        for _ in 0..4 {
            assert_eq!(tick(&mut state, &env, me, &config), BehaviorVerdict::Acted);
        }
        assert_eq!(state.entities.get(me).unwrap().position, destination);
        assert_eq!(
            tick(&mut state, &env, me, &config),
            BehaviorVerdict::Cancel("Here you are.".into())
        );
    }
}

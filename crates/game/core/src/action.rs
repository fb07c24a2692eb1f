//! The closed set of things an entity can do with its turn.
//!
//! Every variant validates against the current state, applies its mutation,
//! and narrates through the message sink. Failure is an [`ActionError`]:
//! recoverable, surfaced to the log, and converted by the dispatch layer
//! into either a retry (player) or a penalty reschedule (AI).

use tracing::debug;

use crate::combat::{
    HitRoll, StrayOutcome, damage_calculation, hit_calculation, melee_damage, roll_context,
    stray_fire,
};
use crate::env::{Env, MessageTag};
use crate::state::{Direction, EntityId, GameState, Position, WeaponKind};

/// One turn's worth of intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    /// Step one cell.
    Move(Direction),
    /// Strike the adjacent cell.
    Melee(Direction),
    /// Move, or strike if an actor is in the way.
    Bump(Direction),
    /// Discharge the equipped ranged weapon. With no explicit cell the
    /// nearest visible actor is targeted and must be in weapon range;
    /// an explicit cell may lie beyond range at an attack penalty.
    Fire { target_xy: Option<Position> },
    /// Refill the equipped ranged weapon's clip.
    Reload,
    /// Do nothing. Waiting is how an actor hunkers down and takes aim.
    Wait,
    /// Collect the item underfoot.
    Pickup,
    /// Hazard-only: damage the actor sharing the hazard's cell.
    Choke,
}

/// Recoverable failure of an attempted action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("destination is out of bounds")]
    OutOfBounds,
    #[error("destination is blocked by a tile")]
    BlockedByTile,
    #[error("destination is blocked by an entity")]
    BlockedByEntity,
    #[error("nothing to attack")]
    NothingToAttack,
    #[error("you must have a working ranged weapon")]
    NoRangedWeapon,
    #[error("no more ammo, reload")]
    OutOfAmmo,
    #[error("no weapon to reload")]
    NothingToReload,
    #[error("target is too far away")]
    OutOfRange,
    #[error("you cannot target an area that you cannot see")]
    TargetNotVisible,
    #[error("no visible target")]
    NoVisibleTarget,
    #[error("no object to pick up here")]
    NothingToPickup,
    #[error("acting entity is gone")]
    MissingActor,
}

/// Executes one action for `actor`, who must be the entity whose ticket was
/// just popped. Succeeds silently or fails without consuming state.
pub fn execute(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    action: &ActionKind,
) -> Result<(), ActionError> {
    match action {
        ActionKind::Move(direction) => move_action(state, env, actor, *direction),
        ActionKind::Melee(direction) => melee_action(state, env, actor, *direction),
        ActionKind::Bump(direction) => bump_action(state, env, actor, *direction),
        ActionKind::Fire { target_xy } => fire_action(state, env, actor, *target_xy),
        ActionKind::Reload => reload_action(state, actor),
        ActionKind::Wait => Ok(()),
        ActionKind::Pickup => pickup_action(state, env, actor),
        ActionKind::Choke => choke_action(state, env, actor),
    }
}

fn move_action(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    direction: Direction,
) -> Result<(), ActionError> {
    let origin = state
        .entities
        .get(actor)
        .ok_or(ActionError::MissingActor)?
        .position;
    let destination = origin.step(direction);

    if !env.map.in_bounds(destination) {
        return Err(ActionError::OutOfBounds);
    }
    if !env.map.is_walkable(destination) {
        return Err(ActionError::BlockedByTile);
    }
    if state.entities.blocking_entity_at(destination).is_some() {
        return Err(ActionError::BlockedByEntity);
    }

    state
        .entities
        .get_mut(actor)
        .ok_or(ActionError::MissingActor)?
        .position = destination;
    Ok(())
}

fn melee_action(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    direction: Direction,
) -> Result<(), ActionError> {
    let attacker = state.entities.get(actor).ok_or(ActionError::MissingActor)?;
    let attack = attacker.attack();
    let attacker_name = attacker.name.clone();
    let destination = attacker.position.step(direction);

    let target = state
        .entities
        .actor_at(destination)
        .ok_or(ActionError::NothingToAttack)?;
    let target_id = target.id;
    let target_name = target.name.clone();
    let target_armor = target.armor();

    let damage = melee_damage(attack, target_armor);
    let tag = attack_tag(actor);
    let description = format!("{} attacks {}", capitalize(&attacker_name), target_name);

    if damage > 0 {
        env.messages
            .post(&format!("{description} for {damage} hit points."), tag);
        let died = state
            .entities
            .get_mut(target_id)
            .and_then(|t| t.vitals.as_mut())
            .is_some_and(|v| v.take_damage(damage));
        if died {
            on_death(state, env, target_id, actor);
        }
    } else {
        env.messages
            .post(&format!("{description} but does no damage."), tag);
    }
    Ok(())
}

fn bump_action(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    direction: Direction,
) -> Result<(), ActionError> {
    let origin = state
        .entities
        .get(actor)
        .ok_or(ActionError::MissingActor)?
        .position;
    if state.entities.actor_at(origin.step(direction)).is_some() {
        melee_action(state, env, actor, direction)
    } else {
        move_action(state, env, actor, direction)
    }
}

fn reload_action(state: &mut GameState, actor: EntityId) -> Result<(), ActionError> {
    let entity = state
        .entities
        .get_mut(actor)
        .ok_or(ActionError::MissingActor)?;
    match entity.loadout.weapon.as_mut().map(|w| &mut w.kind) {
        Some(WeaponKind::Ranged {
            clip_size,
            current_clip,
            ..
        }) if *current_clip < *clip_size => {
            *current_clip = *clip_size;
            Ok(())
        }
        _ => Err(ActionError::NothingToReload),
    }
}

fn pickup_action(state: &mut GameState, env: &Env<'_>, actor: EntityId) -> Result<(), ActionError> {
    let position = state
        .entities
        .get(actor)
        .ok_or(ActionError::MissingActor)?
        .position;
    let item_id = state
        .entities
        .item_at(position)
        .map(|item| item.id)
        .ok_or(ActionError::NothingToPickup)?;

    // inventory bookkeeping is the host's concern; the item just leaves
    // the floor
    let item = state.entities.remove(item_id).ok_or(ActionError::NothingToPickup)?;
    env.messages.post(
        &format!("You put the {} in the inventory.", item.name),
        MessageTag::Info,
    );
    Ok(())
}

fn choke_action(state: &mut GameState, env: &Env<'_>, actor: EntityId) -> Result<(), ActionError> {
    let hazard = state.entities.get(actor).ok_or(ActionError::MissingActor)?;
    let position = hazard.position;
    let hazard_name = hazard.name.clone();
    let damage = hazard
        .vitals
        .as_ref()
        .map(|v| v.base_attack)
        .unwrap_or(0);

    let victim = state
        .entities
        .actor_at(position)
        .ok_or(ActionError::NothingToAttack)?;
    let victim_id = victim.id;
    let description = format!("The {} chokes in the {}", victim.name, hazard_name);

    if damage > 0 {
        env.messages.post(
            &format!("{description} for {damage} hit points."),
            MessageTag::EnemyAttack,
        );
        let died = state
            .entities
            .get_mut(victim_id)
            .and_then(|t| t.vitals.as_mut())
            .is_some_and(|v| v.take_damage(damage));
        if died {
            on_death(state, env, victim_id, actor);
        }
    } else {
        env.messages.post(
            &format!("{description} but takes no damage."),
            MessageTag::EnemyAttack,
        );
    }
    Ok(())
}

/// What a resolved shot ends up striking.
#[derive(Clone, Copy, Debug)]
enum Struck {
    Nothing,
    Wall,
    Entity(EntityId),
}

fn fire_action(
    state: &mut GameState,
    env: &Env<'_>,
    actor: EntityId,
    requested: Option<Position>,
) -> Result<(), ActionError> {
    let shooter = state.entities.get(actor).ok_or(ActionError::MissingActor)?;
    let shooter_pos = shooter.position;
    let shooter_name = shooter.name.clone();
    let aim_bonus = shooter.aim_stack;
    let is_player = actor.is_player();

    let Some(weapon) = &shooter.loadout.weapon else {
        return Err(ActionError::NoRangedWeapon);
    };
    let WeaponKind::Ranged {
        base_damage,
        base_range,
        current_clip,
        ..
    } = weapon.kind
    else {
        return Err(ActionError::NoRangedWeapon);
    };
    if current_clip == 0 {
        return Err(ActionError::OutOfAmmo);
    }

    let target_xy = match requested {
        Some(xy) => {
            if !env.map.is_visible(xy) {
                return Err(ActionError::TargetNotVisible);
            }
            xy
        }
        None => {
            let nearest = state
                .entities
                .nearest_visible_actor(actor, shooter_pos, env.map)
                .ok_or(ActionError::NoVisibleTarget)?;
            if shooter_pos.chebyshev(nearest.position) > base_range {
                return Err(ActionError::OutOfRange);
            }
            nearest.position
        }
    };

    // every discharged round is spent, hit or miss
    spend_round(state, actor);

    // resolve line and pools for this side
    let shooter_ref = state.entities.get(actor).ok_or(ActionError::MissingActor)?;
    let target_ref = state.entities.target_at(target_xy);
    let had_target = target_ref.is_some();
    let intended = target_ref.map(|t| t.id);

    let fire_line = state.fire.for_side(is_player);
    fire_line.compute(shooter_ref, target_xy, env.map, &state.entities);
    let stat = fire_line.hit_stat(shooter_ref, target_xy, target_ref, env.map, &state.entities);
    let obstructions = fire_line.obstructions.clone();

    let roll = hit_calculation(
        &stat,
        had_target,
        env.rng,
        state.roll_seed(actor, roll_context::ATTACK),
        state.roll_seed(actor, roll_context::DEFENSE),
    );
    let primary_margin = match roll {
        HitRoll::Hit(margin) => margin,
        HitRoll::Miss => -1,
    };

    // a failed primary roll, or a deliberate shot at nothing, strays
    let resolved: Option<(i32, Struck)> =
        if primary_margin < 0 || (primary_margin == 0 && !had_target) {
            match stray_fire(
                &obstructions,
                had_target,
                env.rng,
                state.roll_seed(actor, roll_context::STRAY_COIN),
                state.roll_seed(actor, roll_context::STRAY_PICK),
            ) {
                StrayOutcome::Lost => None,
                StrayOutcome::Spent => Some((0, Struck::Nothing)),
                StrayOutcome::Redirected(obstruction) => Some((
                    0,
                    match obstruction.entity {
                        Some(id) => Struck::Entity(id),
                        None => Struck::Wall,
                    },
                )),
            }
        } else {
            Some((
                primary_margin,
                match intended {
                    Some(id) => Struck::Entity(id),
                    None => Struck::Nothing,
                },
            ))
        };

    let tag = attack_tag(actor);
    let Some((margin, struck)) = resolved else {
        if had_target {
            env.messages
                .post(&format!("{} missed.", capitalize(&shooter_name)), tag);
        } else {
            env.messages.post(
                &format!("{} shoots an empty space.", capitalize(&shooter_name)),
                tag,
            );
        }
        return Ok(());
    };

    match struck {
        Struck::Nothing => {
            env.messages.post(
                &format!("{} shoots an empty space.", capitalize(&shooter_name)),
                tag,
            );
        }
        Struck::Wall => {
            env.messages.post(
                &format!("{}'s shot hits the wall!", capitalize(&shooter_name)),
                tag,
            );
        }
        Struck::Entity(target_id) => {
            let Some(target) = state.entities.get(target_id) else {
                return Ok(());
            };
            let target_name = target.name.clone();
            let target_armor = target.armor();

            let roll = damage_calculation(
                base_damage,
                margin,
                aim_bonus,
                target_armor,
                env.rng,
                state.roll_seed(actor, roll_context::ARMOR),
            );
            debug!(margin, damage = roll.damage, reduction = roll.armor_reduction, "shot resolved");

            let description = format!("{} shoots {}", capitalize(&shooter_name), target_name);
            if roll.damage == 0 {
                env.messages
                    .post(&format!("{description} but does no damage."), tag);
            } else if roll.damage <= target_armor {
                // glancing hit: the armor holds, the impact still rattles
                env.messages.post(
                    &format!("{description} but the shot glances off the armor."),
                    tag,
                );
                if let Some(vitals) = state
                    .entities
                    .get_mut(target_id)
                    .and_then(|t| t.vitals.as_mut())
                {
                    vitals.add_stun(roll.damage);
                }
            } else {
                env.messages.post(
                    &format!("{description} for {} hit points.", roll.damage),
                    tag,
                );
                let died = state
                    .entities
                    .get_mut(target_id)
                    .and_then(|t| t.vitals.as_mut())
                    .is_some_and(|v| v.take_damage(roll.damage));
                if died {
                    on_death(state, env, target_id, actor);
                }
            }
        }
    }
    Ok(())
}

fn spend_round(state: &mut GameState, actor: EntityId) {
    if let Some(WeaponKind::Ranged { current_clip, .. }) = state
        .entities
        .get_mut(actor)
        .and_then(|e| e.loadout.weapon.as_mut())
        .map(|w| &mut w.kind)
    {
        *current_clip = current_clip.saturating_sub(1);
    }
}

/// Applies the side effects of a death that has just been triggered.
///
/// Callers invoke this exactly once, on the damage call that flipped the
/// vitals to dead; the once-only contract lives in [`crate::state::Vitals`].
pub(crate) fn on_death(state: &mut GameState, env: &Env<'_>, victim: EntityId, active: EntityId) {
    let Some(entity) = state.entities.get_mut(victim) else {
        return;
    };
    let name = entity.name.clone();
    let visible = env.map.is_visible(entity.position);
    let large = entity.size.value() > 3;

    entity.blocks_movement = false;
    entity.blocks_view = false;
    entity.behavior = Some(crate::behavior::Behavior::Idle);
    entity.name = format!("remains of {name}");

    if victim.is_player() {
        env.messages.post("You died!", MessageTag::Death);
    } else if visible {
        env.messages
            .post(&format!("{} is dead!", capitalize(&name)), MessageTag::Death);
    } else if large {
        env.messages.post("Something seems dead!", MessageTag::Death);
    }

    state.queue.unschedule(victim, active);
}

fn attack_tag(actor: EntityId) -> MessageTag {
    if actor.is_player() {
        MessageTag::PlayerAttack
    } else {
        MessageTag::EnemyAttack
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

//! Combat resolution: pure functions over explicit inputs.
//!
//! Nothing in this module touches the arena or the scheduler. Callers
//! gather pools from the fire line, hand in per-roll seeds, and apply the
//! returned numbers themselves. Keeping the dice here side-effect free is
//! what makes outcomes replayable and testable in isolation.

use tracing::debug;

use crate::fire::{HitStat, Obstruction};
use crate::env::RngOracle;

/// Per-roll context discriminants fed to seed derivation so independent
/// rolls inside one action draw from independent streams.
pub mod roll_context {
    pub const ATTACK: u32 = 0;
    pub const DEFENSE: u32 = 1;
    pub const STRAY_COIN: u32 = 2;
    pub const STRAY_PICK: u32 = 3;
    pub const ARMOR: u32 = 4;
    pub const CONFUSION: u32 = 5;
    pub const HAZARD_STAGE: u32 = 6;
    pub const HAZARD_SPAWN: u32 = 7;
    pub const HAZARD_LIFESPAN: u32 = 8;
}

/// Attacker successes minus defender successes, or `Miss` when the attacker
/// rolls no successes at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitRoll {
    /// Margin of zero or more: the shot connects.
    Hit(i32),
    /// Automatic failure, independent of the defender's dice.
    Miss,
}

/// Rolls attack against defense-plus-cover.
///
/// Each pool point is one d3, success on the top face. An attacker with
/// zero successes always misses, even if the defender also rolled nothing.
/// A deliberate shot at an empty cell skips the dice entirely and lands
/// with margin zero.
pub fn hit_calculation(
    stat: &HitStat,
    has_target: bool,
    rng: &dyn RngOracle,
    attack_seed: u64,
    defense_seed: u64,
) -> HitRoll {
    if !has_target {
        return HitRoll::Hit(0);
    }

    let attack_pool = stat.attack.max(0) as u32;
    let defense_pool = (stat.defense + stat.cover).max(0) as u32;

    let attack_successes = rng.roll_pool(attack_seed, attack_pool);
    let defense_successes = rng.roll_pool(defense_seed, defense_pool);
    debug!(
        attack_successes,
        attack_pool, defense_successes, defense_pool, "hit roll"
    );

    if attack_successes == 0 {
        HitRoll::Miss
    } else {
        HitRoll::Hit(attack_successes as i32 - defense_successes as i32)
    }
}

/// Where a shot that failed its primary roll ends up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrayOutcome {
    /// The shot vanishes without effect.
    Lost,
    /// The shot strikes something along the line, margin zero.
    Redirected(Obstruction),
    /// The shot spends itself on the empty target cell.
    Spent,
}

/// Resolves a missed shot, or a zero-margin shot at an empty cell.
///
/// A fair coin decides between losing the shot outright and striking a
/// random intervening obstruction, weighted by size class. With nothing in
/// between, the redirection branch degrades to a lost shot when a target
/// existed, or to a harmless spent shot when there never was one.
pub fn stray_fire(
    obstructions: &[Obstruction],
    had_target: bool,
    rng: &dyn RngOracle,
    coin_seed: u64,
    pick_seed: u64,
) -> StrayOutcome {
    if rng.coin_flip(coin_seed) {
        if had_target {
            return StrayOutcome::Lost;
        }
        return StrayOutcome::Spent;
    }

    let weights: Vec<u32> = obstructions
        .iter()
        .map(|o| o.size.value() as u32)
        .collect();
    match rng.weighted_choice(pick_seed, &weights) {
        Some(index) => {
            debug!(position = ?obstructions[index].position, "stray shot intercepted");
            StrayOutcome::Redirected(obstructions[index])
        }
        None if had_target => StrayOutcome::Lost,
        None => StrayOutcome::Spent,
    }
}

/// Damage after the armor dice, plus the reduction itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRoll {
    /// Final applied damage, never negative.
    pub damage: i32,
    /// Successes rolled on the armor pool, never negative.
    pub armor_reduction: i32,
}

/// Computes damage for a connected shot.
///
/// Base damage is weapon damage plus hit margin plus the shooter's aim
/// stacks (zero for non-actor shooters like exploding barrels). Armor rolls
/// one die per point; each success shaves one point off. The glancing-hit
/// conversion (damage at or below armor becomes stun) is the caller's job
/// since it touches the target's vitals.
pub fn damage_calculation(
    weapon_damage: i32,
    hit_margin: i32,
    aim_bonus: i32,
    target_armor: i32,
    rng: &dyn RngOracle,
    armor_seed: u64,
) -> DamageRoll {
    let damage = weapon_damage + hit_margin + aim_bonus;
    let armor_reduction = rng.roll_pool(armor_seed, target_armor.max(0) as u32) as i32;
    debug!(damage, armor_reduction, "damage roll");

    DamageRoll {
        damage: (damage - armor_reduction).max(0),
        armor_reduction,
    }
}

/// Melee resolution: attack stat against armor, no dice.
pub fn melee_damage(attack: i32, target_armor: i32) -> i32 {
    attack - target_armor
}

//! Combatant vitals: health, stun, and the fatigue arithmetic.
//!
//! Health is stored at 100x precision (`health_centi`) so per-turn
//! regeneration can be fractional while the rest of the engine only ever
//! sees whole hit points. The speed and fatigue formulas are kept exactly
//! as tuned; do not "clean up" the divisors.

use crate::config::GameConfig;

/// Stored combat state for anything that can take damage.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitals {
    max_health: i32,
    health_centi: i32,
    /// Accumulated fatigue from glancing hits. Decays during upkeep and
    /// drags down speed, attack, and defense while present.
    pub stun_points: i32,
    pub base_attack: i32,
    pub base_defense: i32,
    pub base_armor: i32,
    pub base_speed: u64,
    dead: bool,
}

impl Vitals {
    pub fn new(max_health: i32, base_attack: i32, base_defense: i32, base_armor: i32) -> Self {
        Self {
            max_health,
            health_centi: max_health * GameConfig::HEALTH_SCALE,
            stun_points: 0,
            base_attack,
            base_defense,
            base_armor,
            base_speed: GameConfig::BASE_SPEED,
            dead: false,
        }
    }

    pub fn with_speed(mut self, base_speed: u64) -> Self {
        self.base_speed = base_speed;
        self
    }

    /// Whole hit points, as the rest of the engine sees them.
    pub fn health(&self) -> i32 {
        self.health_centi / GameConfig::HEALTH_SCALE
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && self.health_centi > 0
    }

    /// Fatigue penalty applied to attack and defense pools, same term the
    /// speed formula uses.
    pub fn combat_penalty(&self) -> i32 {
        self.stun_points / 3 + (self.max_health - self.health()) / 6
    }

    /// Time cost of one action: wounds and stun slow an actor down.
    pub fn action_speed(&self) -> u64 {
        self.base_speed
            + (self.stun_points / 3) as u64
            + ((self.max_health - self.health()) / 6) as u64
    }

    /// Applies whole-point damage. Returns true exactly once, on the hit
    /// that brings health to zero; further damage never re-triggers death.
    #[must_use]
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.set_health_centi(self.health_centi - amount * GameConfig::HEALTH_SCALE)
    }

    /// Forces health to zero. Same once-only death contract as
    /// [`Vitals::take_damage`].
    #[must_use]
    pub fn kill(&mut self) -> bool {
        self.set_health_centi(0)
    }

    /// Restores whole hit points, clamped to the maximum. Returns the
    /// amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.dead {
            return 0;
        }
        let before = self.health();
        let _ = self.set_health_centi(self.health_centi + amount * GameConfig::HEALTH_SCALE);
        self.health() - before
    }

    pub fn add_stun(&mut self, amount: i32) {
        self.stun_points += amount.max(0);
    }

    /// One derived-turn upkeep tick: stun decays, health trickles back.
    pub fn upkeep(&mut self) {
        if self.dead {
            return;
        }
        self.stun_points = (self.stun_points - GameConfig::STUN_DECAY_PER_TURN).max(0);
        let ceiling = self.max_health * GameConfig::HEALTH_SCALE;
        if self.health_centi < ceiling {
            self.health_centi = (self.health_centi + GameConfig::REGEN_CENTI_PER_TURN).min(ceiling);
        }
    }

    fn set_health_centi(&mut self, value: i32) -> bool {
        self.health_centi = value.clamp(0, self.max_health * GameConfig::HEALTH_SCALE);
        if self.health_centi == 0 && !self.dead {
            self.dead = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_clamps_to_bounds() {
        let mut vitals = Vitals::new(10, 3, 2, 1);
        assert_eq!(vitals.heal(5), 0);
        assert!(!vitals.take_damage(4));
        assert_eq!(vitals.health(), 6);
        assert_eq!(vitals.heal(100), 4);
        assert_eq!(vitals.health(), 10);
    }

    #[test]
    fn death_triggers_exactly_once() {
        let mut vitals = Vitals::new(5, 0, 0, 0);
        assert!(vitals.take_damage(5));
        assert!(!vitals.is_alive());
        // already dead, must not re-trigger
        assert!(!vitals.take_damage(3));
        assert!(!vitals.kill());
    }

    #[test]
    fn regeneration_is_fractional() {
        let mut vitals = Vitals::new(10, 0, 0, 0);
        let _ = vitals.take_damage(1);
        assert_eq!(vitals.health(), 9);
        // 5 centi-points per turn: 19 turns is not yet a whole point
        for _ in 0..19 {
            vitals.upkeep();
        }
        assert_eq!(vitals.health(), 9);
        vitals.upkeep();
        assert_eq!(vitals.health(), 10);
    }

    #[test]
    fn stun_slows_and_decays() {
        let mut vitals = Vitals::new(12, 4, 4, 0);
        vitals.add_stun(6);
        assert_eq!(vitals.action_speed(), 62);
        assert_eq!(vitals.combat_penalty(), 2);
        vitals.upkeep();
        assert_eq!(vitals.stun_points, 5);
        for _ in 0..10 {
            vitals.upkeep();
        }
        assert_eq!(vitals.stun_points, 0);
    }

    #[test]
    fn wounds_slow_the_actor() {
        let mut vitals = Vitals::new(30, 0, 0, 0);
        let _ = vitals.take_damage(18);
        assert_eq!(vitals.action_speed(), 60 + 3);
    }
}

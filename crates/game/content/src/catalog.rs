//! Static templates for actors, weapons, and hazards.
//!
//! Templates are plain data: scenario setup resolves them into
//! `breach-core` entities at spawn time. The builtin catalog carries the
//! stock roster; hosts can load their own from RON via the loaders.

use serde::{Deserialize, Serialize};

use breach_core::{Behavior, Entity, EntityKind, Position, SizeClass, Vitals, Weapon};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponTemplate {
    pub name: String,
    pub kind: WeaponTemplateKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponTemplateKind {
    Melee {
        attack_bonus: i32,
    },
    Ranged {
        base_damage: i32,
        base_range: u32,
        clip_size: u32,
    },
}

impl WeaponTemplate {
    pub fn to_weapon(&self) -> Weapon {
        match self.kind {
            WeaponTemplateKind::Melee { attack_bonus } => {
                Weapon::melee(self.name.clone(), attack_bonus)
            }
            WeaponTemplateKind::Ranged {
                base_damage,
                base_range,
                clip_size,
            } => Weapon::ranged(self.name.clone(), base_damage, base_range, clip_size),
        }
    }
}

/// Blueprint for a combatant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorTemplate {
    pub name: String,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub armor: i32,
    pub size: SizeClass,
    /// Weapon catalog key, if the actor spawns armed.
    pub weapon: Option<String>,
    /// Flat armor bonus from worn gear.
    pub armor_bonus: i32,
    /// Hostiles chase the player; anything else idles until driven.
    pub hostile: bool,
}

impl ActorTemplate {
    pub fn to_entity(&self, catalog: &Catalog, position: Position) -> Entity {
        let mut entity = Entity::new(self.name.clone(), EntityKind::Actor, position)
            .blocking()
            .with_size(self.size)
            .with_vitals(Vitals::new(self.health, self.attack, self.defense, self.armor))
            .with_behavior(if self.hostile {
                Behavior::hostile()
            } else {
                Behavior::Idle
            });
        if let Some(weapon_name) = &self.weapon {
            if let Some(template) = catalog.weapon(weapon_name) {
                entity.loadout.weapon = Some(template.to_weapon());
            }
        }
        entity.loadout.armor_bonus = self.armor_bonus;
        entity
    }
}

/// Blueprint for a transient cloud.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardTemplate {
    pub name: String,
    /// Choke damage per turn spent inside; zero for harmless fog.
    pub attack: i32,
    pub base_lifespan: i32,
    pub spawns_siblings: bool,
    pub size: SizeClass,
}

impl HazardTemplate {
    /// Resolves the template at a cell. Lifespan is passed in because
    /// spawners jitter it per instance.
    pub fn to_entity(&self, position: Position, lifespan: i32) -> Entity {
        Entity::new(self.name.clone(), EntityKind::Hazard, position)
            .view_blocking()
            .with_size(self.size)
            .with_vitals(Vitals::new(1, self.attack, 0, 0))
            .with_behavior(Behavior::dissipating(
                lifespan,
                self.spawns_siblings,
                self.attack > 0,
            ))
    }
}

/// The full template set a scenario draws from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub weapons: Vec<WeaponTemplate>,
    pub actors: Vec<ActorTemplate>,
    pub hazards: Vec<HazardTemplate>,
}

impl Catalog {
    pub fn weapon(&self, name: &str) -> Option<&WeaponTemplate> {
        self.weapons.iter().find(|w| w.name == name)
    }

    pub fn actor(&self, name: &str) -> Option<&ActorTemplate> {
        self.actors.iter().find(|a| a.name == name)
    }

    pub fn hazard(&self, name: &str) -> Option<&HazardTemplate> {
        self.hazards.iter().find(|h| h.name == name)
    }

    /// The stock roster.
    pub fn builtin() -> Self {
        let ranged = |name: &str, base_damage, base_range, clip_size| WeaponTemplate {
            name: name.into(),
            kind: WeaponTemplateKind::Ranged {
                base_damage,
                base_range,
                clip_size,
            },
        };
        let melee = |name: &str, attack_bonus| WeaponTemplate {
            name: name.into(),
            kind: WeaponTemplateKind::Melee { attack_bonus },
        };

        Catalog {
            weapons: vec![
                ranged("sling", 2, 5, 1),
                ranged("gun", 3, 6, 8),
                ranged("revolver", 5, 4, 6),
                ranged("rifle", 6, 10, 3),
                melee("dagger", 2),
                melee("sword", 4),
            ],
            actors: vec![
                ActorTemplate {
                    name: "player".into(),
                    health: 30,
                    attack: 8,
                    defense: 4,
                    armor: 2,
                    size: SizeClass::Medium,
                    weapon: Some("gun".into()),
                    armor_bonus: 0,
                    hostile: false,
                },
                ActorTemplate {
                    name: "orc".into(),
                    health: 10,
                    attack: 6,
                    defense: 2,
                    armor: 0,
                    size: SizeClass::Medium,
                    weapon: Some("gun".into()),
                    armor_bonus: 0,
                    hostile: true,
                },
                ActorTemplate {
                    name: "troll".into(),
                    health: 16,
                    attack: 6,
                    defense: 2,
                    armor: 6,
                    size: SizeClass::Big,
                    weapon: Some("sword".into()),
                    armor_bonus: 0,
                    hostile: true,
                },
            ],
            hazards: vec![
                HazardTemplate {
                    name: "fog".into(),
                    attack: 0,
                    base_lifespan: 8,
                    spawns_siblings: true,
                    size: SizeClass::Medium,
                },
                HazardTemplate {
                    name: "toxic smoke".into(),
                    attack: 2,
                    base_lifespan: 4,
                    spawns_siblings: false,
                    size: SizeClass::Medium,
                },
                HazardTemplate {
                    name: "bright fire".into(),
                    attack: 4,
                    base_lifespan: 10,
                    spawns_siblings: true,
                    size: SizeClass::Medium,
                },
            ],
        }
    }
}

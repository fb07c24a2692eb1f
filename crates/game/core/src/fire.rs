//! Line-of-fire computation.
//!
//! A [`FireLine`] is the resolved path between an attacker and a target
//! cell, the obstructions along it, and a memo of the combat numbers
//! derived from it. There is exactly one instance per side (player shots,
//! hostile shots); `compute` overwrites it per attack and the stat cache
//! lives until the opposing side starts acting.
//!
//! When the direct line crosses walls, the shooter "bends": leans into one
//! of two adjacent cells picked from the target's angular sector and fires
//! from there if that crosses strictly fewer walls. A clear or perfectly
//! row/column-aligned shot is never bent; bending can only reduce the wall
//! count, never increase it.

use std::collections::HashMap;

use tracing::debug;

use crate::config::GameConfig;
use crate::env::MapOracle;
use crate::geometry::{bend_candidates, bresenham, sector_of};
use crate::state::{Direction, EntitiesState, Entity, EntityId, Position, SizeClass, WeaponKind};

/// Something a shot can clip on its way to the target: an entity on the
/// path, or a wall tile standing in as a pseudo-entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstruction {
    pub position: Position,
    pub size: SizeClass,
    /// `None` marks a wall pseudo-entity.
    pub entity: Option<EntityId>,
}

/// Attack pool, defense pool, and cover for one shooter/target pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitStat {
    pub attack: i32,
    pub defense: i32,
    pub cover: i32,
}

/// Cache key: the exact shooter and target cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct StatKey {
    shooter: Position,
    target: Position,
}

/// The per-side fire line, recomputed for every shot.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FireLine {
    pub shooter: Option<EntityId>,
    pub shooter_xy: Position,
    pub target_xy: Position,
    /// Cells from shooter to target, shooter excluded, target included.
    /// When the line is bent, the lean cell leads the path.
    pub path: Vec<Position>,
    /// Entities and wall pseudo-entities between shooter and target,
    /// target excluded.
    pub obstructions: Vec<Obstruction>,
    /// Which way the shooter leaned, for narration only.
    pub bend: Option<Direction>,
    cache: HashMap<StatKey, HitStat>,
}

impl FireLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes path and obstructions for a shot from `shooter` toward
    /// `target_xy`. Leaves the stat cache untouched; that is cleared only
    /// at side boundaries.
    pub fn compute(
        &mut self,
        shooter: &Entity,
        target_xy: Position,
        map: &dyn MapOracle,
        entities: &EntitiesState,
    ) {
        self.shooter = Some(shooter.id);
        self.shooter_xy = shooter.position;
        self.target_xy = target_xy;
        self.bend = None;

        self.path = self.trace_path(map);
        self.obstructions = self.collect_obstructions(map, entities);
    }

    fn trace_path(&mut self, map: &dyn MapOracle) -> Vec<Position> {
        if self.shooter_xy == self.target_xy {
            return Vec::new();
        }

        let direct = bresenham(self.shooter_xy, self.target_xy);
        let direct_walls = interior_wall_count(&direct, map);

        // A clear shot cannot be improved, and neither can an exactly
        // aligned one: leaning sideways would only leave the row/column.
        if direct_walls == 0
            || self.shooter_xy.x == self.target_xy.x
            || self.shooter_xy.y == self.target_xy.y
        {
            return direct[1..].to_vec();
        }

        let mut best_walls = direct_walls;
        let mut best_path = direct[1..].to_vec();

        let sector = sector_of(
            self.target_xy.x - self.shooter_xy.x,
            self.target_xy.y - self.shooter_xy.y,
        );

        for lean in bend_candidates(sector) {
            let lean_cell = self.shooter_xy.step(lean);
            // cannot lean into a wall
            if !map.is_walkable(lean_cell) {
                continue;
            }

            let line = bresenham(lean_cell, self.target_xy);
            let walls = interior_wall_count(&line, map);
            if walls < best_walls {
                best_walls = walls;
                // the shooter occupies the lean cell for this shot, so the
                // lean cell itself stays on the path
                best_path = line;
                self.bend = Some(lean);
            }
        }

        best_path
    }

    fn collect_obstructions(
        &self,
        map: &dyn MapOracle,
        entities: &EntitiesState,
    ) -> Vec<Obstruction> {
        let mut result = Vec::new();
        if self.path.is_empty() {
            return result;
        }

        // A shooter standing inside a wall gap fires over the leading
        // stretch of impassable cells; those walls grant no cover.
        let mut skip_walls = true;
        for &cell in &self.path[..self.path.len() - 1] {
            if skip_walls && map.is_walkable(cell) {
                skip_walls = false;
            }
            if let Some(entity) = entities.target_at(cell) {
                result.push(Obstruction {
                    position: cell,
                    size: entity.size,
                    entity: Some(entity.id),
                });
            }
            if !map.is_walkable(cell) && !skip_walls {
                result.push(Obstruction {
                    position: cell,
                    size: SizeClass::Wall,
                    entity: None,
                });
            }
        }
        result
    }

    /// Attack, defense, and cover for the current line against `target`.
    ///
    /// Memoized per `(shooter, target)` cell pair for the remainder of the
    /// side's turn. Self-targeted probes and melee probes beyond arm's
    /// reach are computed but never cached.
    pub fn hit_stat(
        &mut self,
        shooter: &Entity,
        target_xy: Position,
        target: Option<&Entity>,
        map: &dyn MapOracle,
        entities: &EntitiesState,
    ) -> HitStat {
        let key = StatKey {
            shooter: self.shooter_xy,
            target: target_xy,
        };
        if let Some(stat) = self.cache.get(&key) {
            debug!(shooter = ?key.shooter, target = ?key.target, "fire line stat cache hit");
            return *stat;
        }

        let target_size = target.map(|t| t.size).unwrap_or(SizeClass::Huge).value();

        let mut cover = 0;
        for obstruction in &self.obstructions {
            cover += (obstruction.size.value() + 1 - target_size).max(0);
        }

        let mut attack = shooter.attack();
        if let Some(weapon) = &shooter.loadout.weapon {
            if let WeaponKind::Ranged { base_range, .. } = weapon.kind {
                attack -= GameConfig::RANGE_PENALTY_PER_CELL
                    * (self.path.len() as i32 - base_range as i32).max(0);
                attack = attack.max(0);
            }
        }
        attack += shooter.aim_stack;

        let mut defense = target.map(|t| t.defense()).unwrap_or(0);
        if let Some(target) = target {
            if target.hunker_stack > 0 {
                // Hunkering leans the defender on whatever stands right
                // behind them along the shot.
                let behind = behind_size(self.shooter_xy, target.position, map, entities);
                defense += target.hunker_stack * (behind + 1 - target_size).max(0);
            }
        }

        let stat = HitStat {
            attack,
            defense,
            cover,
        };

        let self_target = target.is_some_and(|t| t.id == shooter.id);
        let reachable = match &shooter.loadout.weapon {
            Some(weapon) if weapon.is_ranged() => true,
            // melee and bare hands only ever connect at range 1
            _ => self.path.len() <= 1,
        };
        if !self_target && reachable {
            debug!(shooter = ?key.shooter, target = ?key.target, ?stat, "fire line stat cache add");
            self.cache.insert(key, stat);
        }

        stat
    }

    /// Drops every memoized stat. Called when the opposing side begins
    /// acting so stale cover numbers never leak across sides.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[cfg(test)]
    fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Walls strictly between the endpoints of a traced line.
fn interior_wall_count(line: &[Position], map: &dyn MapOracle) -> u32 {
    if line.len() < 3 {
        return 0;
    }
    line[1..line.len() - 1]
        .iter()
        .filter(|&&cell| !map.is_walkable(cell))
        .count() as u32
}

/// Size weight of whatever occupies the cell just past `target` on the
/// shot's axis: an entity's size, a wall's, or nothing.
fn behind_size(
    shooter_xy: Position,
    target_xy: Position,
    map: &dyn MapOracle,
    entities: &EntitiesState,
) -> i32 {
    let dx = (target_xy.x - shooter_xy.x).signum();
    let dy = (target_xy.y - shooter_xy.y).signum();
    let behind = Position::new(target_xy.x + dx, target_xy.y + dy);

    if let Some(entity) = entities.target_at(behind) {
        entity.size.value()
    } else if map.in_bounds(behind) && !map.is_walkable(behind) {
        SizeClass::Wall.value()
    } else {
        0
    }
}

/// The two per-side fire lines.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FireLines {
    pub player: FireLine,
    pub hostile: FireLine,
}

impl FireLines {
    pub fn for_side(&mut self, player_side: bool) -> &mut FireLine {
        if player_side {
            &mut self.player
        } else {
            &mut self.hostile
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::GridMap;
    use crate::state::{EntityKind, Vitals, Weapon};

    fn shooter_at(position: Position) -> Entity {
        let mut entity = Entity::new("marksman", EntityKind::Actor, position)
            .blocking()
            .with_vitals(Vitals::new(10, 5, 3, 0));
        entity.id = EntityId(1);
        entity
    }

    fn target_at(position: Position) -> Entity {
        let mut entity = Entity::new("mark", EntityKind::Actor, position)
            .blocking()
            .with_vitals(Vitals::new(10, 2, 2, 0));
        entity.id = EntityId(2);
        entity
    }

    #[test]
    fn clear_shot_takes_the_direct_line() {
        let map = GridMap::open(10, 10);
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(1, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, Position::new(6, 1), &map, &arena);

        assert_eq!(line.path.len(), 5);
        assert_eq!(line.bend, None);
        assert_eq!(line.path.last(), Some(&Position::new(6, 1)));
        assert!(line.obstructions.is_empty());
    }

    #[test]
    fn aligned_shot_never_bends_even_through_walls() {
        let mut map = GridMap::open(10, 10);
        map.set_wall(Position::new(3, 1));
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(1, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, Position::new(6, 1), &map, &arena);

        assert_eq!(line.bend, None);
        // the wall shows up as cover instead
        assert!(
            line.obstructions
                .iter()
                .any(|o| o.entity.is_none() && o.position == Position::new(3, 1))
        );
    }

    #[test]
    fn bending_clears_a_blocking_wall() {
        // Wall on the direct diagonal; leaning south fires around it.
        //   S . .
        //   * # .
        //   . * T
        let mut map = GridMap::open(10, 10);
        map.set_wall(Position::new(1, 1));
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(0, 0));
        let target_xy = Position::new(2, 2);

        let mut line = FireLine::new();
        line.compute(&shooter, target_xy, &map, &arena);

        assert_eq!(line.bend, Some(Direction::South));
        assert_eq!(line.path, vec![
            Position::new(0, 1),
            Position::new(1, 2),
            Position::new(2, 2),
        ]);
        // bent path starts at the lean cell, adjacent to the shooter
        assert_eq!(shooter.position.chebyshev(line.path[0]), 1);
        assert!(line.path.iter().all(|&c| map.is_walkable(c)));
    }

    #[test]
    fn bending_never_does_worse_than_the_direct_line() {
        let mut map = GridMap::open(10, 10);
        map.set_wall(Position::new(1, 1));
        map.set_wall(Position::new(2, 1));
        map.set_wall(Position::new(0, 1));
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(0, 0));
        let target_xy = Position::new(3, 2);

        let direct = bresenham(shooter.position, target_xy);
        let direct_walls = interior_wall_count(&direct, &map);

        let mut line = FireLine::new();
        line.compute(&shooter, target_xy, &map, &arena);

        // a bent path already starts at its firing origin (the lean cell);
        // a direct one needs the shooter prepended to form the full line
        let full = if line.bend.is_some() {
            line.path.clone()
        } else {
            let mut cells = vec![shooter.position];
            cells.extend(&line.path);
            cells
        };
        assert!(interior_wall_count(&full, &map) <= direct_walls);
    }

    #[test]
    fn zero_obstruction_path_is_never_replaced() {
        let map = GridMap::open(10, 10);
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(2, 2));

        let mut line = FireLine::new();
        line.compute(&shooter, Position::new(7, 5), &map, &arena);
        assert_eq!(line.bend, None);
    }

    #[test]
    fn intervening_entities_exclude_the_target() {
        let map = GridMap::open(10, 10);
        let mut arena = EntitiesState::empty();
        let bystander = Entity::new("crate", EntityKind::Feature, Position::new(3, 1))
            .blocking()
            .with_size(SizeClass::Big);
        arena.spawn(bystander);
        let target = target_at(Position::new(6, 1));
        let target_id = arena.spawn(target);
        let shooter = shooter_at(Position::new(1, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, Position::new(6, 1), &map, &arena);

        assert_eq!(line.obstructions.len(), 1);
        assert_eq!(line.obstructions[0].size, SizeClass::Big);
        assert!(line.obstructions.iter().all(|o| o.entity != Some(target_id)));
    }

    #[test]
    fn leading_walls_grant_no_cover() {
        // Shooter embedded behind a wall stretch: those cells are skipped,
        // later walls still count.
        let mut map = GridMap::open(12, 3);
        map.set_wall(Position::new(2, 1));
        map.set_wall(Position::new(3, 1));
        map.set_wall(Position::new(6, 1));
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(1, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, Position::new(9, 1), &map, &arena);

        let wall_cells: Vec<Position> = line
            .obstructions
            .iter()
            .filter(|o| o.entity.is_none())
            .map(|o| o.position)
            .collect();
        assert_eq!(wall_cells, vec![Position::new(6, 1)]);
    }

    #[test]
    fn cover_scales_with_size_gap() {
        let map = GridMap::open(10, 10);
        let mut arena = EntitiesState::empty();
        arena.spawn(
            Entity::new("barricade", EntityKind::Feature, Position::new(3, 1))
                .blocking()
                .with_size(SizeClass::Huge),
        );
        arena.spawn(
            Entity::new("rat", EntityKind::Actor, Position::new(4, 1))
                .blocking()
                .with_size(SizeClass::Tiny)
                .with_vitals(Vitals::new(2, 1, 1, 0)),
        );
        let target = target_at(Position::new(6, 1));
        let shooter = shooter_at(Position::new(1, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, target.position, &map, &arena);
        let stat = line.hit_stat(&shooter, target.position, Some(&target), &map, &arena);

        // huge grants 5+1-3 = 3, tiny grants max(0, 1+1-3) = 0
        assert_eq!(stat.cover, 3);
        assert_eq!(stat.attack, 5);
        assert_eq!(stat.defense, 2);
    }

    #[test]
    fn range_penalty_applies_beyond_weapon_reach() {
        let map = GridMap::open(16, 3);
        let arena = EntitiesState::empty();
        let shooter =
            shooter_at(Position::new(1, 1)).with_weapon(Weapon::ranged("carbine", 3, 4, 6));
        let target = target_at(Position::new(9, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, target.position, &map, &arena);
        let stat = line.hit_stat(&shooter, target.position, Some(&target), &map, &arena);

        // path is 8 cells, range 4: 5 - 2*4 clamps to 0
        assert_eq!(stat.attack, 0);
    }

    #[test]
    fn aim_stacks_raise_the_attack_pool() {
        let map = GridMap::open(10, 10);
        let arena = EntitiesState::empty();
        let mut shooter = shooter_at(Position::new(1, 1));
        shooter.aim_stack = 2;
        let target = target_at(Position::new(4, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, target.position, &map, &arena);
        let stat = line.hit_stat(&shooter, target.position, Some(&target), &map, &arena);
        assert_eq!(stat.attack, 7);
    }

    #[test]
    fn hunkered_target_gains_cover_from_the_wall_behind() {
        let mut map = GridMap::open(10, 3);
        map.set_wall(Position::new(6, 1));
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(1, 1));
        let mut target = target_at(Position::new(5, 1));
        target.hunker_stack = 1;

        let mut line = FireLine::new();
        line.compute(&shooter, target.position, &map, &arena);
        let stat = line.hit_stat(&shooter, target.position, Some(&target), &map, &arena);

        // wall weight 6: one stack grants 6+1-3 = 4 extra defense
        assert_eq!(stat.defense, target.defense() + 4);
    }

    #[test]
    fn repeated_stat_queries_hit_the_cache() {
        let map = GridMap::open(10, 10);
        let arena = EntitiesState::empty();
        let shooter =
            shooter_at(Position::new(1, 1)).with_weapon(Weapon::ranged("pistol", 2, 6, 6));
        let target = target_at(Position::new(5, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, target.position, &map, &arena);
        let first = line.hit_stat(&shooter, target.position, Some(&target), &map, &arena);
        let second = line.hit_stat(&shooter, target.position, Some(&target), &map, &arena);
        assert_eq!(first, second);
        assert_eq!(line.cached_len(), 1);

        line.clear_cache();
        assert_eq!(line.cached_len(), 0);
    }

    #[test]
    fn self_targeting_is_never_cached() {
        let map = GridMap::open(10, 10);
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(1, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, shooter.position, &map, &arena);
        let _ = line.hit_stat(&shooter, shooter.position, Some(&shooter), &map, &arena);
        assert_eq!(line.cached_len(), 0);
    }

    #[test]
    fn melee_probe_beyond_reach_is_not_cached() {
        let map = GridMap::open(10, 10);
        let arena = EntitiesState::empty();
        let shooter = shooter_at(Position::new(1, 1)).with_weapon(Weapon::melee("knife", 2));
        let target = target_at(Position::new(6, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, target.position, &map, &arena);
        let _ = line.hit_stat(&shooter, target.position, Some(&target), &map, &arena);
        assert_eq!(line.cached_len(), 0);

        // adjacent melee is a valid configuration and is cached
        let near = target_at(Position::new(2, 1));
        line.compute(&shooter, near.position, &map, &arena);
        let _ = line.hit_stat(&shooter, near.position, Some(&near), &map, &arena);
        assert_eq!(line.cached_len(), 1);
    }

    #[test]
    fn missing_target_defends_as_huge() {
        let map = GridMap::open(10, 10);
        let mut arena = EntitiesState::empty();
        arena.spawn(
            Entity::new("crate", EntityKind::Feature, Position::new(3, 1))
                .blocking()
                .with_size(SizeClass::Medium),
        );
        let shooter = shooter_at(Position::new(1, 1));

        let mut line = FireLine::new();
        line.compute(&shooter, Position::new(6, 1), &map, &arena);
        let stat = line.hit_stat(&shooter, Position::new(6, 1), None, &map, &arena);

        // medium obstruction vs huge phantom target: max(0, 3+1-5) = 0
        assert_eq!(stat.cover, 0);
        assert_eq!(stat.defense, 0);
    }
}

//! A* over the walkable grid.
//!
//! Costs: cardinal steps 2, diagonal steps 3, plus 10 for squeezing past a
//! cell a blocking entity occupies. The occupancy surcharge is what makes
//! chasers spread out around a corridor instead of queueing forever; pass
//! `None` for the arena to path on bare terrain (exploration, travel).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use strum::IntoEnumIterator;

use crate::env::MapOracle;
use crate::state::{Direction, EntitiesState, Position};

const CARDINAL_COST: u32 = 2;
const DIAGONAL_COST: u32 = 3;
const BLOCKER_COST: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Node {
    f: u32,
    position: Position,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap; position tiebreak keeps expansion
        // order deterministic
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: Position, to: Position) -> u32 {
    CARDINAL_COST * from.chebyshev(to)
}

fn is_diagonal(direction: Direction) -> bool {
    matches!(
        direction,
        Direction::NorthEast | Direction::SouthEast | Direction::SouthWest | Direction::NorthWest
    )
}

/// Shortest path from `from` to `to`, start excluded, goal included.
/// Returns an empty path when the goal is unreachable or already reached.
pub fn find_path(
    map: &dyn MapOracle,
    entities: Option<&EntitiesState>,
    from: Position,
    to: Position,
) -> Vec<Position> {
    if from == to || !map.in_bounds(to) {
        return Vec::new();
    }

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_score: HashMap<Position, u32> = HashMap::new();

    g_score.insert(from, 0);
    open.push(Node {
        f: heuristic(from, to),
        position: from,
    });

    while let Some(Node { position, .. }) = open.pop() {
        if position == to {
            let mut path = vec![to];
            let mut cursor = to;
            while let Some(&previous) = came_from.get(&cursor) {
                if previous == from {
                    break;
                }
                path.push(previous);
                cursor = previous;
            }
            path.reverse();
            return path;
        }

        let current_g = g_score.get(&position).copied().unwrap_or(u32::MAX);
        for direction in Direction::iter() {
            let next = position.step(direction);
            if !map.in_bounds(next) || !map.is_walkable(next) {
                continue;
            }

            let mut step_cost = if is_diagonal(direction) {
                DIAGONAL_COST
            } else {
                CARDINAL_COST
            };
            if let Some(arena) = entities {
                if arena.blocking_entity_at(next).is_some() {
                    step_cost += BLOCKER_COST;
                }
            }

            let tentative = current_g.saturating_add(step_cost);
            if tentative < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                g_score.insert(next, tentative);
                came_from.insert(next, position);
                open.push(Node {
                    f: tentative + heuristic(next, to),
                    position: next,
                });
            }
        }
    }

    Vec::new()
}

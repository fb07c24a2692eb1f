use crate::state::Position;

/// Read-only map surface the engine consults for geometry queries.
///
/// The engine never owns terrain. Walkability and transparency describe the
/// static layout only; blocking or view-blocking entities are layered on top
/// by the entity arena. Visibility and exploration are computed by the host
/// (field-of-view is presentation-adjacent) and exposed here because
/// behaviors key off them.
pub trait MapOracle {
    fn dimensions(&self) -> MapDimensions;

    /// True if the tile itself can be stood on.
    fn is_walkable(&self, position: Position) -> bool;

    /// True if the tile itself does not block sight.
    fn is_transparent(&self, position: Position) -> bool;

    /// True if the tile is inside the player's current field of view.
    fn is_visible(&self, position: Position) -> bool;

    /// True if the player has ever seen the tile.
    fn is_explored(&self, position: Position) -> bool;

    fn in_bounds(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

/// Dense grid map, the reference [`MapOracle`] implementation.
///
/// Hosts with their own map representation can ignore this; it exists so
/// scenarios and tests have something concrete to stand on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMap {
    dimensions: MapDimensions,
    walkable: Vec<bool>,
    transparent: Vec<bool>,
    visible: Vec<bool>,
    explored: Vec<bool>,
}

impl GridMap {
    /// An all-wall map of the given size.
    pub fn sealed(width: u32, height: u32) -> Self {
        let cells = (width * height) as usize;
        Self {
            dimensions: MapDimensions::new(width, height),
            walkable: vec![false; cells],
            transparent: vec![false; cells],
            visible: vec![false; cells],
            explored: vec![false; cells],
        }
    }

    /// An open floor map of the given size.
    pub fn open(width: u32, height: u32) -> Self {
        let cells = (width * height) as usize;
        Self {
            dimensions: MapDimensions::new(width, height),
            walkable: vec![true; cells],
            transparent: vec![true; cells],
            visible: vec![false; cells],
            explored: vec![false; cells],
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        if self.dimensions.contains(position) {
            Some((position.y as u32 * self.dimensions.width + position.x as u32) as usize)
        } else {
            None
        }
    }

    pub fn set_wall(&mut self, position: Position) {
        if let Some(i) = self.index(position) {
            self.walkable[i] = false;
            self.transparent[i] = false;
        }
    }

    pub fn set_floor(&mut self, position: Position) {
        if let Some(i) = self.index(position) {
            self.walkable[i] = true;
            self.transparent[i] = true;
        }
    }

    pub fn set_visible(&mut self, position: Position, visible: bool) {
        if let Some(i) = self.index(position) {
            self.visible[i] = visible;
            // seeing a tile marks it explored for good
            if visible {
                self.explored[i] = true;
            }
        }
    }

    pub fn set_explored(&mut self, position: Position, explored: bool) {
        if let Some(i) = self.index(position) {
            self.explored[i] = explored;
        }
    }

    pub fn reveal_all(&mut self) {
        self.visible.fill(true);
        self.explored.fill(true);
    }

    pub fn hide_all(&mut self) {
        self.visible.fill(false);
    }
}

impl MapOracle for GridMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn is_walkable(&self, position: Position) -> bool {
        self.index(position).is_some_and(|i| self.walkable[i])
    }

    fn is_transparent(&self, position: Position) -> bool {
        self.index(position).is_some_and(|i| self.transparent[i])
    }

    fn is_visible(&self, position: Position) -> bool {
        self.index(position).is_some_and(|i| self.visible[i])
    }

    fn is_explored(&self, position: Position) -> bool {
        self.index(position).is_some_and(|i| self.explored[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_is_neither_walkable_nor_visible() {
        let map = GridMap::open(4, 4);
        assert!(!map.is_walkable(Position::new(-1, 0)));
        assert!(!map.is_walkable(Position::new(4, 0)));
        assert!(!map.is_visible(Position::new(0, 17)));
    }

    #[test]
    fn walls_block_walking_and_sight() {
        let mut map = GridMap::open(4, 4);
        let p = Position::new(2, 2);
        map.set_wall(p);
        assert!(!map.is_walkable(p));
        assert!(!map.is_transparent(p));
        map.set_floor(p);
        assert!(map.is_walkable(p));
    }

    #[test]
    fn seeing_marks_explored() {
        let mut map = GridMap::open(4, 4);
        let p = Position::new(1, 1);
        map.set_visible(p, true);
        map.set_visible(p, false);
        assert!(map.is_explored(p));
        assert!(!map.is_visible(p));
    }
}

//! The world grid: a rectangle of tiles with impassable walls.
//!
//! Pathfinding is a breadth-first search over the 4-connected passable
//! tiles. Every step costs the same, so BFS yields shortest paths.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use stowage_types::{PathEndMode, Position};

/// A rectangular tile grid with walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    walls: BTreeSet<Position>,
}

impl Grid {
    /// Create an open grid. Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            walls: BTreeSet::new(),
        }
    }

    /// Grid width in tiles.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in tiles.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether the tile lies inside the grid.
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Whether an agent can stand on the tile.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.walls.contains(&pos)
    }

    /// Block a tile. Returns `false` if it was already a wall.
    pub fn add_wall(&mut self, pos: Position) -> bool {
        self.walls.insert(pos)
    }

    /// Unblock a tile. Returns `false` if it was not a wall.
    pub fn remove_wall(&mut self, pos: Position) -> bool {
        self.walls.remove(&pos)
    }

    /// Find the shortest path from `start` until `target` is reached under
    /// `mode`. The returned path includes `start` and the final tile.
    ///
    /// `blocked` tiles are treated as walls for this search only (used for
    /// path segments other agents have reserved). Returns `None` if no path
    /// exists or `start` is not passable.
    pub fn path_to(
        &self,
        start: Position,
        target: Position,
        mode: PathEndMode,
        blocked: &BTreeSet<Position>,
    ) -> Option<Vec<Position>> {
        if !self.is_passable(start) {
            return None;
        }
        if start.reached(target, mode) {
            return Some(vec![start]);
        }

        let mut prev: BTreeMap<Position, Position> = BTreeMap::new();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        let mut goal = None;
        while let Some(current) = queue.pop_front() {
            if current.reached(target, mode) {
                goal = Some(current);
                break;
            }
            for neighbor in current.neighbors() {
                if !self.is_passable(neighbor) || blocked.contains(&neighbor) {
                    continue;
                }
                if visited.insert(neighbor) {
                    prev.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        let goal = goal?;
        let mut path = VecDeque::new();
        let mut current = goal;
        path.push_front(current);
        while let Some(&predecessor) = prev.get(&current) {
            path.push_front(predecessor);
            current = predecessor;
        }
        Some(path.into_iter().collect())
    }

    /// Number of steps needed to reach `target` under `mode`, if reachable.
    pub fn path_distance(&self, start: Position, target: Position, mode: PathEndMode) -> Option<u32> {
        let path = self.path_to(start, target, mode, &BTreeSet::new())?;
        u32::try_from(path.len().saturating_sub(1)).ok()
    }

    /// The passable tile closest to `near` (by grid steps, walls ignored
    /// while searching). `near` itself wins if it is passable.
    pub fn nearest_passable(&self, near: Position) -> Option<Position> {
        if !self.in_bounds(near) {
            return None;
        }
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(near);
        queue.push_back(near);
        while let Some(current) = queue.pop_front() {
            if self.is_passable(current) {
                return Some(current);
            }
            for neighbor in current.neighbors() {
                if self.in_bounds(neighbor) && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> BTreeSet<Position> {
        BTreeSet::new()
    }

    #[test]
    fn path_on_open_grid_is_shortest() {
        let grid = Grid::new(5, 5);
        let path = grid.path_to(Position::new(0, 0), Position::new(3, 2), PathEndMode::OnCell, &open());
        assert_eq!(path.map(|p| p.len()), Some(6));
    }

    #[test]
    fn touch_stops_adjacent() {
        let grid = Grid::new(5, 5);
        let distance = grid.path_distance(Position::new(0, 0), Position::new(3, 0), PathEndMode::Touch);
        assert_eq!(distance, Some(2));
    }

    #[test]
    fn already_there_is_zero_steps() {
        let grid = Grid::new(3, 3);
        let distance = grid.path_distance(Position::new(1, 1), Position::new(1, 2), PathEndMode::Touch);
        assert_eq!(distance, Some(0));
    }

    #[test]
    fn walls_force_detour() {
        let mut grid = Grid::new(3, 3);
        grid.add_wall(Position::new(1, 0));
        grid.add_wall(Position::new(1, 1));
        let distance = grid.path_distance(Position::new(0, 0), Position::new(2, 0), PathEndMode::OnCell);
        assert_eq!(distance, Some(6));
    }

    #[test]
    fn sealed_target_is_unreachable() {
        let mut grid = Grid::new(5, 5);
        for pos in Position::new(4, 4).neighbors() {
            grid.add_wall(pos);
        }
        let path = grid.path_to(Position::new(0, 0), Position::new(4, 4), PathEndMode::Touch, &open());
        assert!(path.is_none());
    }

    #[test]
    fn blocked_tiles_act_as_walls() {
        let grid = Grid::new(3, 1);
        let mut blocked = BTreeSet::new();
        blocked.insert(Position::new(1, 0));
        let path = grid.path_to(Position::new(0, 0), Position::new(2, 0), PathEndMode::OnCell, &blocked);
        assert!(path.is_none());
    }

    #[test]
    fn nearest_passable_skips_walls() {
        let mut grid = Grid::new(3, 3);
        grid.add_wall(Position::new(1, 1));
        assert_eq!(grid.nearest_passable(Position::new(0, 0)), Some(Position::new(0, 0)));
        let spot = grid.nearest_passable(Position::new(1, 1));
        assert!(spot.is_some_and(|p| p.manhattan_distance(Position::new(1, 1)) == 1));
        assert_eq!(grid.nearest_passable(Position::new(9, 9)), None);
    }
}

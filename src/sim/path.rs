//! A* search over the tile grid
//!
//! 4-connected, unit step cost, Manhattan heuristic. Equal priorities pop in
//! cell order (x, then y) so routes are reproducible.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use serde::{Deserialize, Serialize};

use super::grid::{Cell, TileGrid};

/// Ordered cells from the current cell to the goal
///
/// Empty means the goal is blocked or unreachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    cells: VecDeque<Cell>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Cell the path starts from
    pub fn first(&self) -> Option<Cell> {
        self.cells.front().copied()
    }

    /// Goal cell
    pub fn last(&self) -> Option<Cell> {
        self.cells.back().copied()
    }

    /// Waypoint after the current cell
    pub fn next_waypoint(&self) -> Option<Cell> {
        self.cells.get(1).copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Drop the leading cell once it has been reached
    pub fn advance(&mut self) -> Option<Cell> {
        self.cells.pop_front()
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Number of steps (edges) along the path
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

impl From<Vec<Cell>> for Path {
    fn from(cells: Vec<Cell>) -> Self {
        Self {
            cells: cells.into(),
        }
    }
}

/// Shortest 4-connected route from `start` to `goal`, inclusive
pub fn find_path(grid: &TileGrid, start: Cell, goal: Cell) -> Path {
    if start == goal {
        return Path::from(vec![start]);
    }
    if grid.is_cell_blocked(goal) {
        return Path::empty();
    }
    let Some(start_index) = grid.index_of(start) else {
        return Path::empty();
    };

    let count = grid.cell_count();
    let mut g_score = vec![u32::MAX; count];
    let mut came_from: Vec<Option<Cell>> = vec![None; count];
    let mut frontier = BinaryHeap::new();

    g_score[start_index] = 0;
    frontier.push(Reverse((0u32, start)));

    while let Some(Reverse((_, current))) = frontier.pop() {
        if current == goal {
            return reconstruct(grid, &came_from, current);
        }

        let Some(current_index) = grid.index_of(current) else {
            continue;
        };
        let tentative = g_score[current_index] + 1;

        for neighbor in current.neighbors() {
            if grid.is_cell_blocked(neighbor) {
                continue;
            }
            let Some(index) = grid.index_of(neighbor) else {
                continue;
            };
            if tentative < g_score[index] {
                came_from[index] = Some(current);
                g_score[index] = tentative;
                let priority = tentative + neighbor.manhattan(goal);
                frontier.push(Reverse((priority, neighbor)));
            }
        }
    }

    Path::empty()
}

fn reconstruct(grid: &TileGrid, came_from: &[Option<Cell>], goal: Cell) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(prev) = grid.index_of(current).and_then(|i| came_from[i]) {
        cells.push(prev);
        current = prev;
    }
    cells.reverse();
    Path::from(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> TileGrid {
        TileGrid::parse(&[
            "1111111", //
            "1000001",
            "1111101",
            "1000001",
            "1111111",
        ])
        .unwrap()
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = corridor();
        let path = find_path(&grid, Cell::new(1, 1), Cell::new(1, 1));
        assert_eq!(path.cells().collect::<Vec<_>>(), vec![Cell::new(1, 1)]);
    }

    #[test]
    fn test_blocked_goal_is_empty() {
        let grid = corridor();
        assert!(find_path(&grid, Cell::new(1, 1), Cell::new(0, 0)).is_empty());
        assert!(find_path(&grid, Cell::new(1, 1), Cell::new(40, 2)).is_empty());
    }

    #[test]
    fn test_unreachable_goal_is_empty() {
        let grid = TileGrid::parse(&["11111", "10101", "11111"]).unwrap();
        assert!(find_path(&grid, Cell::new(1, 1), Cell::new(3, 1)).is_empty());
    }

    #[test]
    fn test_winding_route() {
        let grid = corridor();
        let path = find_path(&grid, Cell::new(1, 1), Cell::new(1, 3));
        assert_eq!(path.first(), Some(Cell::new(1, 1)));
        assert_eq!(path.last(), Some(Cell::new(1, 3)));
        // Across the top, down through (5, 2), back along the bottom
        assert_eq!(path.steps(), 10);
        assert!(path.contains(Cell::new(5, 2)));

        let cells: Vec<_> = path.cells().collect();
        for pair in cells.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
            assert!(!grid.is_cell_blocked(pair[1]));
        }
    }

    #[test]
    fn test_ties_resolve_by_cell_order() {
        let grid = TileGrid::parse(&["1111", "1001", "1001", "1111"]).unwrap();
        let a = find_path(&grid, Cell::new(1, 1), Cell::new(2, 2));
        let b = find_path(&grid, Cell::new(1, 1), Cell::new(2, 2));
        assert_eq!(a, b);
        assert_eq!(a.steps(), 2);
        // (1, 2) sorts before (2, 1) at equal priority
        assert_eq!(a.next_waypoint(), Some(Cell::new(1, 2)));
    }

    #[test]
    fn test_advance_consumes_front() {
        let mut path = Path::from(vec![Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1)]);
        assert_eq!(path.next_waypoint(), Some(Cell::new(2, 1)));
        assert_eq!(path.advance(), Some(Cell::new(1, 1)));
        assert_eq!(path.next_waypoint(), Some(Cell::new(3, 1)));
        assert_eq!(path.len(), 2);
    }
}

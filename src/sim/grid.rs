//! Static tile map and blocking queries
//!
//! The grid is loaded once and shared read-only by motion, pathfinding and
//! the raycaster. Anything outside the map counts as solid wall.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Symbol for an open (walkable) tile
pub const OPEN_TILE: char = '0';

/// Symbol used when a ray leaves the map
pub const DEFAULT_WALL: char = '1';

/// The built-in labyrinth (21 x 19)
pub const REFERENCE_LAYOUT: [&str; 19] = [
    "111111111111111111111",
    "100000000000000000001",
    "101111101111111011101",
    "101000101000001010001",
    "101010101011101011101",
    "101010001010001000101",
    "101011111010111110101",
    "101000001010000010101",
    "101111101011111010101",
    "101000101000001010101",
    "101010101111101011101",
    "101010001000101000101",
    "101011111010101110101",
    "101000000010100010001",
    "101111111110111011101",
    "101000000000001010001",
    "101011111111101011101",
    "100010000000001000001",
    "111111111111111111111",
];

/// Integer grid coordinate
///
/// Ordering is x-major, which the path planner relies on for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a continuous world position (truncating)
    #[inline]
    pub fn containing(pos: Vec2) -> Self {
        Self::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    /// World-space center of the cell
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// Manhattan distance to another cell
    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// 4-connected neighbors in expansion order: +x, -x, +y, -y
    #[inline]
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Map loading errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// No rows at all
    EmptyGrid,
    /// A row with zero tiles
    EmptyRow { row: usize },
    /// Row width differs from the first row
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::EmptyGrid => write!(f, "map has no rows"),
            MapError::EmptyRow { row } => write!(f, "map row {} is empty", row),
            MapError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "map row {} has {} tiles, expected {}",
                row, found, expected
            ),
        }
    }
}

impl std::error::Error for MapError {}

/// Rectangular tile map, immutable after load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    /// Row-major tile symbols
    tiles: Vec<char>,
}

impl TileGrid {
    /// Build a grid from rows of tile symbols
    ///
    /// Fails on an empty map, an empty row, or rows of differing width.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let first = rows.first().ok_or(MapError::EmptyGrid)?;
        let width = first.as_ref().chars().count();

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let before = tiles.len();
            tiles.extend(row.as_ref().chars());
            let found = tiles.len() - before;
            if found == 0 {
                return Err(MapError::EmptyRow { row: index });
            }
            if found != width {
                return Err(MapError::RaggedRow {
                    row: index,
                    expected: width,
                    found,
                });
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
        })
    }

    /// Parse a newline-separated map, ignoring trailing whitespace and blank lines
    pub fn from_text(text: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        Self::parse(&rows)
    }

    /// The built-in labyrinth
    pub fn reference() -> Self {
        // The layout constant is rectangular, so this cannot fail.
        let width = REFERENCE_LAYOUT[0].len();
        Self {
            width,
            height: REFERENCE_LAYOUT.len(),
            tiles: REFERENCE_LAYOUT.iter().flat_map(|row| row.chars()).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile symbol at a cell, `None` outside the map
    #[inline]
    pub fn tile(&self, cell: Cell) -> Option<char> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.tiles[y * self.width + x])
    }

    /// Discrete blocking check used by pathfinding and the raycaster
    #[inline]
    pub fn is_cell_blocked(&self, cell: Cell) -> bool {
        self.tile(cell).is_none_or(|tile| tile != OPEN_TILE)
    }

    /// Continuous blocking check used for collision
    #[inline]
    pub fn is_blocking(&self, x: f32, y: f32) -> bool {
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return true;
        }
        self.is_cell_blocked(Cell::new(x as i32, y as i32))
    }

    /// Convenience wrapper over [`TileGrid::is_blocking`]
    #[inline]
    pub fn is_blocking_at(&self, pos: Vec2) -> bool {
        self.is_blocking(pos.x, pos.y)
    }

    /// Open cells in row-major order
    pub fn open_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.tiles.iter().enumerate().filter_map(|(index, &tile)| {
            (tile == OPEN_TILE)
                .then(|| Cell::new((index % self.width) as i32, (index / self.width) as i32))
        })
    }

    /// Dense index for a cell inside the map
    #[inline]
    pub(crate) fn index_of(&self, cell: Cell) -> Option<usize> {
        self.tile(cell)
            .map(|_| cell.y as usize * self.width + cell.x as usize)
    }

    #[inline]
    pub(crate) fn cell_count(&self) -> usize {
        self.tiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_matches_parse() {
        let parsed = TileGrid::parse(&REFERENCE_LAYOUT).unwrap();
        assert_eq!(parsed, TileGrid::reference());
        assert_eq!(parsed.width(), 21);
        assert_eq!(parsed.height(), 19);
    }

    #[test]
    fn test_out_of_bounds_is_blocking() {
        let grid = TileGrid::reference();
        assert!(grid.is_blocking(-0.1, 3.5));
        assert!(grid.is_blocking(3.5, -0.01));
        assert!(grid.is_blocking(21.0, 3.5));
        assert!(grid.is_blocking(3.5, 19.0));
        assert!(grid.is_cell_blocked(Cell::new(-1, 1)));
        assert!(grid.is_cell_blocked(Cell::new(1, 19)));
    }

    #[test]
    fn test_open_and_wall_tiles() {
        let grid = TileGrid::reference();
        assert!(!grid.is_blocking(3.5, 3.5));
        assert!(grid.is_blocking(2.5, 3.5));
        // Truncation: 3.99 is still cell 3
        assert!(!grid.is_blocking(3.99, 3.99));
        assert!(!grid.is_cell_blocked(Cell::new(15, 9)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let empty: [&str; 0] = [];
        assert_eq!(TileGrid::parse(&empty), Err(MapError::EmptyGrid));
        assert_eq!(
            TileGrid::parse(&["111", "10"]),
            Err(MapError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(TileGrid::parse(&["", ""]), Err(MapError::EmptyRow { row: 0 }));
        assert_eq!(TileGrid::from_text("\n\n"), Err(MapError::EmptyGrid));
    }

    #[test]
    fn test_from_text_and_materials() {
        let grid = TileGrid::from_text("111\n1021\n").unwrap_err();
        assert!(matches!(grid, MapError::RaggedRow { row: 1, .. }));

        let grid = TileGrid::from_text("1111\n1021\n1111\n").unwrap();
        assert_eq!(grid.tile(Cell::new(2, 1)), Some('2'));
        assert!(grid.is_cell_blocked(Cell::new(2, 1)));
        assert_eq!(grid.open_cells().collect::<Vec<_>>(), vec![Cell::new(1, 1)]);
    }

    #[test]
    fn test_cell_helpers() {
        let c = Cell::containing(Vec2::new(3.7, 9.2));
        assert_eq!(c, Cell::new(3, 9));
        assert_eq!(c.center(), Vec2::new(3.5, 9.5));
        assert_eq!(c.manhattan(Cell::new(0, 0)), 12);
        assert!(Cell::new(1, 9) < Cell::new(2, 0));
    }
}

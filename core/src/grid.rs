use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Tag describing the static content of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellTag {
    /// Open air.
    #[default]
    Empty,
    /// Walkable platform surface.
    Wall,
    /// Filler beneath a platform; collides like a wall.
    Dirt,
    /// Where the player appears.
    PlayerStart,
    /// Collectible gem.
    Gem,
    /// Door key.
    Key,
    /// Exit door; its sprite extends one tile above the tagged cell.
    LockedDoor,
    /// Where a patrolling enemy appears.
    EnemySpawn,
}

impl CellTag {
    /// Single-character glyph used by textual layouts.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => 'X',
            Self::Dirt => 'D',
            Self::PlayerStart => 'P',
            Self::Gem => 'C',
            Self::Key => 'K',
            Self::LockedDoor => 'L',
            Self::EnemySpawn => 'E',
        }
    }

    /// Parses a glyph produced by [`CellTag::glyph`].
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        let tag = match glyph {
            '.' => Self::Empty,
            'X' => Self::Wall,
            'D' => Self::Dirt,
            'P' => Self::PlayerStart,
            'C' => Self::Gem,
            'K' => Self::Key,
            'L' => Self::LockedDoor,
            'E' => Self::EnemySpawn,
            _ => return None,
        };
        Some(tag)
    }

    /// Reports whether the cell blocks movement.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Dirt)
    }
}

/// Errors raised when building a grid from a textual layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The layout contained no rows or no columns.
    #[error("grid layout is empty")]
    Empty,
    /// A row had a different width than the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A glyph did not map to any cell tag.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Character that failed to parse.
        glyph: char,
        /// Column of the character.
        column: u32,
        /// Row of the character.
        row: u32,
    },
}

/// Rows × columns of cell tags describing a level's static layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellTag>,
}

impl Grid {
    /// Creates a grid of the provided size filled with [`CellTag::Empty`].
    ///
    /// # Panics
    ///
    /// Panics if `columns * rows` does not fit in `usize`.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows))
            .unwrap_or_else(|_| panic!("grid {columns}x{rows} exceeds addressable memory"));
        Self {
            columns,
            rows,
            cells: vec![CellTag::Empty; capacity],
        }
    }

    /// Parses a grid from rows of glyphs, top row first.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let first = rows.first().ok_or(GridError::Empty)?;
        let columns = first.as_ref().chars().count() as u32;
        if columns == 0 {
            return Err(GridError::Empty);
        }

        let mut grid = Self::new(columns, rows.len() as u32);
        for (row_index, row) in rows.iter().enumerate() {
            let row_index = row_index as u32;
            let found = row.as_ref().chars().count() as u32;
            if found != columns {
                return Err(GridError::Ragged {
                    row: row_index,
                    expected: columns,
                    found,
                });
            }
            for (column, glyph) in row.as_ref().chars().enumerate() {
                let column = column as u32;
                let tag = CellTag::from_glyph(glyph).ok_or(GridError::UnknownGlyph {
                    glyph,
                    column,
                    row: row_index,
                })?;
                grid.set(CellCoord::new(column, row_index), tag);
            }
        }
        Ok(grid)
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the tag stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<CellTag> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the tag stored at the provided cell. Cells outside the grid are ignored.
    pub fn set(&mut self, cell: CellCoord, tag: CellTag) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = tag;
        }
    }

    /// Reports whether the cell lies inside the grid and holds [`CellTag::Empty`].
    #[must_use]
    pub fn is_empty_at(&self, cell: CellCoord) -> bool {
        self.get(cell) == Some(CellTag::Empty)
    }

    /// Iterates every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellTag)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, tag)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *tag)
        })
    }

    /// Counts the cells holding the provided tag.
    #[must_use]
    pub fn count(&self, tag: CellTag) -> usize {
        self.cells.iter().filter(|cell| **cell == tag).count()
    }

    /// Returns the first cell in row-major order holding the provided tag.
    #[must_use]
    pub fn find(&self, tag: CellTag) -> Option<CellCoord> {
        self.iter()
            .find_map(|(cell, candidate)| (candidate == tag).then_some(cell))
    }

    /// Total width of the grid measured in world pixels.
    #[must_use]
    pub fn world_width(&self, tile_size: f32) -> f32 {
        self.columns as f32 * tile_size
    }

    /// Total height of the grid measured in world pixels.
    #[must_use]
    pub fn world_height(&self, tile_size: f32) -> f32 {
        self.rows as f32 * tile_size
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let tag = self.get(CellCoord::new(column, row)).unwrap_or_default();
                write!(f, "{}", tag.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

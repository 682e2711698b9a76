#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic procedural level generation.
//!
//! Levels are a left-to-right chain of platforms separated by gaps. The
//! generator carves them into a [`Grid`], then places the key, the locked
//! door, enemies and gems on top of them. Every random draw comes from a
//! ChaCha stream seeded by the caller, so a seed fully determines a level.

use jungle_escape_core::{CellCoord, CellTag, Grid, Tuning};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Smallest number of columns that fits the minimum platform progression.
pub const MIN_COLUMNS: u32 = 40;
/// Smallest number of rows that leaves room for vertical variation.
pub const MIN_ROWS: u32 = 8;
/// Widest level the generator will lay out.
pub const MAX_COLUMNS: u32 = 4_096;
/// Tallest level the generator will lay out.
pub const MAX_ROWS: u32 = 256;

const START_PLATFORM_LENGTH: u32 = 6;
const PLAYER_START_COLUMN: u32 = 1;
const RIGHT_MARGIN: u32 = 6;
const TOP_PLATFORM_ROW: u32 = 4;
const GAP_RANGE: std::ops::RangeInclusive<u32> = 2..=4;
const LENGTH_RANGE: std::ops::RangeInclusive<u32> = 4..=9;
const ROW_DELTA_RANGE: std::ops::RangeInclusive<i64> = -2..=2;
const FORCED_GEM_CAP: usize = 4;
const EXTRA_ENEMY_MIN_LENGTH: u32 = 5;
const EXTRA_ENEMY_CHANCE: f64 = 0.4;
const EXTRA_GEM_CHANCE: f64 = 0.3;

/// Horizontal run of wall cells used as a placement unit during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Leftmost column of the run.
    pub start_column: u32,
    /// Row holding the wall cells.
    pub row: u32,
    /// Number of wall cells; always at least one.
    pub length: u32,
}

impl Platform {
    /// Rightmost column of the run.
    #[must_use]
    pub const fn end_column(&self) -> u32 {
        self.start_column + self.length - 1
    }

    /// Middle column of the run, rounding right on even lengths.
    #[must_use]
    pub const fn middle_column(&self) -> u32 {
        self.start_column + self.length / 2
    }

    fn surface(&self, column: u32) -> CellCoord {
        CellCoord::new(column, self.row - 1)
    }

    fn random_surface(&self, rng: &mut ChaCha8Rng) -> CellCoord {
        self.surface(self.start_column + rng.gen_range(0..self.length))
    }
}

/// Output of a generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLevel {
    /// Layout to instantiate.
    pub grid: Grid,
    /// Platforms in left-to-right order, excluding the starting platform.
    pub platforms: Vec<Platform>,
}

/// Reasons a generation request is refused.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The requested grid cannot hold the minimum platform progression.
    #[error(
        "grid {columns}x{rows} is too small; levels need at least {min_columns}x{min_rows}",
        min_columns = MIN_COLUMNS,
        min_rows = MIN_ROWS
    )]
    GridTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The requested grid exceeds the supported level size.
    #[error(
        "grid {columns}x{rows} is too large; levels are at most {max_columns}x{max_rows}",
        max_columns = MAX_COLUMNS,
        max_rows = MAX_ROWS
    )]
    GridTooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Platform carving ran past its iteration budget.
    #[error("platform placement did not finish within {iterations} iterations")]
    PlacementBudgetExhausted {
        /// Iterations spent before giving up.
        iterations: u32,
    },
}

/// Produces levels of a fixed size.
#[derive(Clone, Copy, Debug)]
pub struct LevelGenerator {
    columns: u32,
    rows: u32,
}

impl LevelGenerator {
    /// Creates a generator after checking that the size fits the platform progression.
    pub fn new(columns: u32, rows: u32) -> Result<Self, GenerationError> {
        if columns < MIN_COLUMNS || rows < MIN_ROWS {
            return Err(GenerationError::GridTooSmall { columns, rows });
        }
        if columns > MAX_COLUMNS || rows > MAX_ROWS {
            return Err(GenerationError::GridTooLarge { columns, rows });
        }
        Ok(Self { columns, rows })
    }

    /// Creates a generator for the level size configured in `tuning`.
    pub fn from_tuning(tuning: &Tuning) -> Result<Self, GenerationError> {
        Self::new(tuning.level_columns, tuning.level_rows)
    }

    /// Generates the level determined by `seed`.
    pub fn generate(&self, seed: u64) -> Result<GeneratedLevel, GenerationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Grid::new(self.columns, self.rows);

        let start_row = self.rows - 4;
        for column in 0..START_PLATFORM_LENGTH {
            grid.set(CellCoord::new(column, start_row), CellTag::Wall);
        }
        grid.set(
            CellCoord::new(PLAYER_START_COLUMN, start_row - 1),
            CellTag::PlayerStart,
        );

        let platforms = self.carve_platforms(&mut grid, &mut rng, start_row)?;
        let key_platform = place_key(&mut grid, &mut rng, &platforms);
        place_door(&mut grid, &platforms);
        place_enemies(&mut grid, &mut rng, &platforms, key_platform);
        place_gems(&mut grid, &mut rng, &platforms);

        debug!(
            "generated {}x{} level from seed {seed:#x}: {} platforms, {} enemies, {} gems",
            self.columns,
            self.rows,
            platforms.len(),
            grid.count(CellTag::EnemySpawn),
            grid.count(CellTag::Gem)
        );

        Ok(GeneratedLevel { grid, platforms })
    }

    fn carve_platforms(
        &self,
        grid: &mut Grid,
        rng: &mut ChaCha8Rng,
        start_row: u32,
    ) -> Result<Vec<Platform>, GenerationError> {
        let budget = self.columns;
        let lowest_row = self.rows - 3;
        let mut platforms = Vec::new();
        let mut cursor_column = START_PLATFORM_LENGTH;
        let mut cursor_row = start_row;
        let mut iterations = 0;

        while cursor_column < self.columns - RIGHT_MARGIN {
            iterations += 1;
            if iterations > budget {
                return Err(GenerationError::PlacementBudgetExhausted {
                    iterations: budget,
                });
            }

            let gap = rng.gen_range(GAP_RANGE);
            let mut length = rng.gen_range(LENGTH_RANGE);
            let delta = rng.gen_range(ROW_DELTA_RANGE);
            let row = (i64::from(cursor_row) + delta)
                .clamp(i64::from(TOP_PLATFORM_ROW), i64::from(lowest_row)) as u32;

            let start_column = cursor_column + gap;
            if start_column + length >= self.columns {
                length = self.columns - start_column - 1;
            }

            for column in start_column..start_column + length {
                grid.set(CellCoord::new(column, row), CellTag::Wall);
                for below in row + 1..self.rows {
                    grid.set(CellCoord::new(column, below), CellTag::Dirt);
                }
            }

            platforms.push(Platform {
                start_column,
                row,
                length,
            });
            cursor_column += gap + length;
            cursor_row = row;
        }

        Ok(platforms)
    }
}

/// Generates a `columns` × `rows` level from `seed`.
pub fn generate(columns: u32, rows: u32, seed: u64) -> Result<GeneratedLevel, GenerationError> {
    LevelGenerator::new(columns, rows)?.generate(seed)
}

/// Places the key above a random platform other than the last; returns that platform's index.
fn place_key(grid: &mut Grid, rng: &mut ChaCha8Rng, platforms: &[Platform]) -> Option<usize> {
    let eligible = match platforms.len() {
        0 => return None,
        1 => 1,
        count => count - 1,
    };
    let index = rng.gen_range(0..eligible);
    let cell = platforms[index].random_surface(rng);
    grid.set(cell, CellTag::Key);
    Some(index)
}

fn place_door(grid: &mut Grid, platforms: &[Platform]) {
    if let Some(last) = platforms.last() {
        grid.set(last.surface(last.end_column()), CellTag::LockedDoor);
    }
}

/// Forces one enemy onto the first platform that holds neither key nor door,
/// then sprinkles extras onto the remaining long platforms.
fn place_enemies(
    grid: &mut Grid,
    rng: &mut ChaCha8Rng,
    platforms: &[Platform],
    key_platform: Option<usize>,
) {
    let last_platform = platforms.len().saturating_sub(1);
    let mut forced = false;

    for (index, platform) in platforms.iter().enumerate() {
        if Some(index) == key_platform || index == last_platform {
            continue;
        }

        let cell = platform.surface(platform.middle_column());
        if !forced {
            grid.set(cell, CellTag::EnemySpawn);
            forced = true;
            continue;
        }

        if platform.length > EXTRA_ENEMY_MIN_LENGTH
            && rng.gen_bool(EXTRA_ENEMY_CHANCE)
            && grid.is_empty_at(cell)
        {
            grid.set(cell, CellTag::EnemySpawn);
        }
    }
}

fn place_gems(grid: &mut Grid, rng: &mut ChaCha8Rng, platforms: &[Platform]) {
    let mut forced = 0;
    for platform in platforms {
        let cell = platform.random_surface(rng);
        if grid.is_empty_at(cell) && forced < FORCED_GEM_CAP {
            grid.set(cell, CellTag::Gem);
            forced += 1;
        }
    }

    for platform in platforms {
        if rng.gen_bool(EXTRA_GEM_CHANCE) {
            let cell = platform.random_surface(rng);
            if grid.is_empty_at(cell) {
                grid.set(cell, CellTag::Gem);
            }
        }
    }

    if grid.count(CellTag::Gem) == 0 {
        let fallback = platforms.iter().find_map(|platform| {
            (platform.start_column..=platform.end_column())
                .map(|column| platform.surface(column))
                .find(|cell| grid.is_empty_at(*cell))
        });
        if let Some(cell) = fallback {
            grid.set(cell, CellTag::Gem);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_grids_below_minimum() {
        assert_eq!(
            generate(39, 12, 1).unwrap_err(),
            GenerationError::GridTooSmall {
                columns: 39,
                rows: 12
            }
        );
        assert_eq!(
            generate(80, 7, 1).unwrap_err(),
            GenerationError::GridTooSmall { columns: 80, rows: 7 }
        );
    }

    #[test]
    fn rejects_grids_above_maximum() {
        assert_eq!(
            LevelGenerator::new(MAX_COLUMNS + 1, 12).unwrap_err(),
            GenerationError::GridTooLarge {
                columns: MAX_COLUMNS + 1,
                rows: 12
            }
        );
        assert_eq!(
            LevelGenerator::new(80, u32::MAX).unwrap_err(),
            GenerationError::GridTooLarge {
                columns: 80,
                rows: u32::MAX
            }
        );
        assert!(LevelGenerator::new(MAX_COLUMNS, MAX_ROWS).is_ok());
    }

    #[test]
    fn start_platform_has_no_dirt_beneath() {
        let level = generate(80, 12, 3).expect("valid size");
        for column in 0..START_PLATFORM_LENGTH {
            assert_eq!(level.grid.get(CellCoord::new(column, 8)), Some(CellTag::Wall));
            assert_eq!(level.grid.get(CellCoord::new(column, 9)), Some(CellTag::Empty));
        }
        assert_eq!(level.grid.find(CellTag::PlayerStart), Some(CellCoord::new(1, 7)));
    }

    #[test]
    fn gem_fallback_fills_first_free_surface_cell() {
        let mut grid = Grid::new(40, 8);
        let platforms = [Platform {
            start_column: 8,
            row: 5,
            length: 3,
        }];
        grid.set(CellCoord::new(8, 4), CellTag::Key);
        grid.set(CellCoord::new(9, 4), CellTag::EnemySpawn);
        grid.set(CellCoord::new(10, 4), CellTag::Empty);

        // Only one surface cell is free, so whichever pass fills it, exactly
        // one gem ends up there.
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        place_gems(&mut grid, &mut rng, &platforms);

        assert_eq!(grid.count(CellTag::Gem), 1);
        assert_eq!(grid.get(CellCoord::new(10, 4)), Some(CellTag::Gem));
    }
}

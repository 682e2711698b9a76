use jungle_escape_core::{CellCoord, CellTag, Tuning};
use jungle_escape_system_level_generation::{
    generate, GeneratedLevel, LevelGenerator, Platform, MIN_COLUMNS, MIN_ROWS,
};

const SIZES: [(u32, u32); 4] = [(MIN_COLUMNS, MIN_ROWS), (80, 12), (57, 9), (160, 20)];

fn levels() -> impl Iterator<Item = ((u32, u32), u64, GeneratedLevel)> {
    SIZES.into_iter().flat_map(|(columns, rows)| {
        (0..150_u64).map(move |seed| {
            let level = generate(columns, rows, seed).expect("size above minimum");
            ((columns, rows), seed, level)
        })
    })
}

#[test]
fn same_seed_produces_identical_levels() {
    for seed in [0, 1, 0xdead_beef, u64::MAX] {
        let first = generate(80, 12, seed).expect("valid size");
        let second = generate(80, 12, seed).expect("valid size");
        assert_eq!(first, second, "seed {seed:#x} diverged");
    }
}

#[test]
fn different_seeds_produce_different_levels() {
    let first = generate(80, 12, 1).expect("valid size");
    let second = generate(80, 12, 2).expect("valid size");
    assert_ne!(first.grid, second.grid);
}

#[test]
fn every_level_places_required_features() {
    for (size, seed, level) in levels() {
        let grid = &level.grid;
        assert_eq!(
            grid.count(CellTag::PlayerStart),
            1,
            "player start for {size:?} seed {seed}"
        );
        assert_eq!(grid.count(CellTag::Key), 1, "key for {size:?} seed {seed}");
        assert_eq!(
            grid.count(CellTag::LockedDoor),
            1,
            "door for {size:?} seed {seed}"
        );
        assert!(
            grid.count(CellTag::EnemySpawn) >= 1,
            "enemy for {size:?} seed {seed}"
        );
        assert!(grid.count(CellTag::Gem) >= 1, "gem for {size:?} seed {seed}");
    }
}

#[test]
fn platforms_run_left_to_right_without_sharing_columns() {
    for (size, seed, level) in levels() {
        let platforms = &level.platforms;
        assert!(platforms.len() >= 3, "{size:?} seed {seed}");
        assert!(platforms[0].start_column >= 6);

        for platform in platforms {
            assert!(platform.length >= 1);
            assert!(platform.end_column() < size.0);
            assert!(platform.row >= 4 && platform.row <= size.1 - 3);
        }

        for pair in platforms.windows(2) {
            assert!(
                pair[0].end_column() < pair[1].start_column,
                "overlap in {size:?} seed {seed}: {pair:?}"
            );
        }
    }
}

#[test]
fn platforms_are_backed_by_dirt_to_the_bottom() {
    for (size, seed, level) in levels() {
        for platform in &level.platforms {
            for column in platform.start_column..=platform.end_column() {
                assert_eq!(
                    level.grid.get(CellCoord::new(column, platform.row)),
                    Some(CellTag::Wall),
                    "{size:?} seed {seed}"
                );
                for row in platform.row + 1..size.1 {
                    assert_eq!(
                        level.grid.get(CellCoord::new(column, row)),
                        Some(CellTag::Dirt)
                    );
                }
            }
        }
    }
}

#[test]
fn key_avoids_the_door_platform_and_door_caps_the_last_one() {
    for (size, seed, level) in levels() {
        let last = level.platforms.last().expect("platforms");
        let door = level.grid.find(CellTag::LockedDoor).expect("door");
        assert_eq!(door, CellCoord::new(last.end_column(), last.row - 1));

        let key = level.grid.find(CellTag::Key).expect("key");
        let key_platform = platform_under(&level.platforms, key).expect("key above platform");
        assert_ne!(key_platform, *last, "{size:?} seed {seed}");
    }
}

#[test]
fn forced_enemy_sits_mid_platform_away_from_key_and_door() {
    for (_, _, level) in levels() {
        let key = level.grid.find(CellTag::Key).expect("key");
        let key_platform = platform_under(&level.platforms, key).expect("key platform");
        let last = *level.platforms.last().expect("platforms");

        let first_eligible = level
            .platforms
            .iter()
            .find(|platform| **platform != key_platform && **platform != last)
            .expect("eligible platform");
        let cell = CellCoord::new(first_eligible.middle_column(), first_eligible.row - 1);
        assert_eq!(level.grid.get(cell), Some(CellTag::EnemySpawn));
    }
}

#[test]
fn items_rest_directly_above_platforms() {
    for (_, _, level) in levels() {
        for (cell, tag) in level.grid.iter() {
            if matches!(
                tag,
                CellTag::Gem | CellTag::Key | CellTag::LockedDoor | CellTag::EnemySpawn
            ) {
                assert!(
                    platform_under(&level.platforms, cell).is_some(),
                    "{tag:?} at {cell:?} floats"
                );
            }
        }
    }
}

/// Generation never checks reachability. These bounds hold by construction and
/// keep consecutive platforms within the default jump arc; they do not prove a
/// level is winnable.
#[test]
fn consecutive_platforms_stay_within_default_jump_envelope() {
    let tuning = Tuning::default();
    let peak_rise = tuning.jump_speed * tuning.jump_speed / (2.0 * tuning.gravity);
    let airtime = 2.0 * -tuning.jump_speed / tuning.gravity;
    let reach = airtime * tuning.player_move_speed;

    for (_, _, level) in levels() {
        for pair in level.platforms.windows(2) {
            let gap = (pair[1].start_column - pair[0].end_column() - 1) as f32;
            let rise = pair[0].row.saturating_sub(pair[1].row) as f32;
            assert!(gap <= 4.0);
            assert!(rise <= 2.0);
            assert!(gap * tuning.tile_size < reach);
            assert!(rise * tuning.tile_size < peak_rise);
        }
    }
}

#[test]
fn generator_follows_tuning_dimensions() {
    let tuning = Tuning {
        level_columns: 64,
        level_rows: 10,
        ..Tuning::default()
    };
    let level = LevelGenerator::from_tuning(&tuning)
        .expect("valid size")
        .generate(42)
        .expect("generation succeeds");

    assert_eq!(level.grid.columns(), 64);
    assert_eq!(level.grid.rows(), 10);
}

fn platform_under(platforms: &[Platform], cell: CellCoord) -> Option<Platform> {
    platforms
        .iter()
        .copied()
        .find(|platform| {
            platform.row == cell.row() + 1
                && (platform.start_column..=platform.end_column()).contains(&cell.column())
        })
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Jungle Escape.
//!
//! A [`World`] is a pure instantiation of a [`Grid`]: walls, items, enemies and
//! the player are materialised from cell tags and then advanced exclusively
//! through [`apply`]. Entities never reference one another; the player is
//! resolved against the wall, item and enemy collections owned by the world.

mod collision;
mod entities;

use jungle_escape_core::{
    CellTag, Command, DeathCause, EntityId, Event, Grid, InputSnapshot, LevelError, StaticKind,
    Tuning, WorldRect,
};
use log::debug;

pub use entities::{Body, EntityRef, PatrollingEnemy, Player, StaticObject};

/// Represents the authoritative Jungle Escape world state.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    tuning: Tuning,
    columns: u32,
    rows: u32,
    player: Player,
    enemies: Vec<PatrollingEnemy>,
    walls: Vec<StaticObject>,
    items: Vec<StaticObject>,
    tick_index: u64,
}

impl World {
    /// Materialises entities from the provided grid.
    ///
    /// The transform is side-effect free and can be re-run on the same grid to
    /// reload a level. Identifiers are assigned in row-major scan order.
    pub fn build(grid: &Grid, tuning: &Tuning) -> Result<Self, LevelError> {
        let starts = grid.count(CellTag::PlayerStart);
        match starts {
            0 => return Err(LevelError::MissingPlayerStart),
            1 => {}
            count => return Err(LevelError::MultiplePlayerStarts { count }),
        }

        let tile = tuning.tile_size;
        let mut next_id = 0_u32;
        let mut player = None;
        let mut enemies = Vec::new();
        let mut walls = Vec::new();
        let mut items = Vec::new();

        for (cell, tag) in grid.iter() {
            if tag == CellTag::Empty {
                continue;
            }

            let id = EntityId::new(next_id);
            next_id += 1;
            let (x, y) = cell.world_origin(tile);
            let tile_box = WorldRect::new(x, y, tile, tile);

            match tag {
                CellTag::Empty => {}
                CellTag::Wall | CellTag::Dirt => {
                    walls.push(StaticObject::new(id, tile_box, StaticKind::Wall, tag));
                }
                CellTag::Gem => items.push(StaticObject::new(id, tile_box, StaticKind::Gem, tag)),
                CellTag::Key => items.push(StaticObject::new(id, tile_box, StaticKind::Key, tag)),
                CellTag::LockedDoor => {
                    let door = WorldRect::new(x, y - tile, tile, tile * 2.0);
                    items.push(StaticObject::new(id, door, StaticKind::Door, tag));
                }
                CellTag::EnemySpawn => enemies.push(PatrollingEnemy::spawn(id, x, y, tuning)),
                CellTag::PlayerStart => player = Some(Player::spawn(id, x, y, tuning)),
            }
        }

        let player = player.ok_or(LevelError::MissingPlayerStart)?;
        debug!(
            "built world {}x{}: {} walls, {} items, {} enemies",
            grid.columns(),
            grid.rows(),
            walls.len(),
            items.len(),
            enemies.len()
        );

        Ok(Self {
            tuning: tuning.clone(),
            columns: grid.columns(),
            rows: grid.rows(),
            player,
            enemies,
            walls,
            items,
            tick_index: 0,
        })
    }

    fn advance_player(&mut self, input: InputSnapshot, out_events: &mut Vec<Event>) {
        let Self {
            tuning,
            player,
            enemies,
            walls,
            items,
            ..
        } = self;

        if player.is_frozen() {
            return;
        }

        player.apply_input(input, tuning);
        player.animate(tuning);
        player.apply_gravity(tuning);

        collision::move_horizontally(player, walls);
        collision::move_vertically(player, walls);
        collision::collect_items(player, items, out_events);

        if collision::touches_enemy(player, enemies) {
            kill(player, DeathCause::Enemy, out_events);
        }

        if player.bounds.y() > tuning.viewport_height + tuning.fall_margin {
            kill(player, DeathCause::FellOutOfWorld, out_events);
        }
    }
}

fn kill(player: &mut Player, cause: DeathCause, out_events: &mut Vec<Event>) {
    if player.dead {
        return;
    }
    player.dead = true;
    debug!("player died: {cause:?}");
    out_events.push(Event::PlayerDied { cause });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { grid } => match World::build(&grid, &world.tuning) {
            Ok(rebuilt) => {
                *world = rebuilt;
                out_events.push(Event::LevelLoaded {
                    columns: grid.columns(),
                    rows: grid.rows(),
                });
            }
            Err(reason) => out_events.push(Event::LevelRejected { reason }),
        },
        Command::Tick { input } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });

            world.advance_player(input, out_events);
            for enemy in &mut world.enemies {
                enemy.update();
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use jungle_escape_core::Tuning;

    use super::{Body, EntityRef, PatrollingEnemy, Player, StaticObject, World};

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Enemies in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &[PatrollingEnemy] {
        &world.enemies
    }

    /// Walls in row-major order.
    #[must_use]
    pub fn walls(world: &World) -> &[StaticObject] {
        &world.walls
    }

    /// Gems, keys and doors that have not been consumed.
    #[must_use]
    pub fn items(world: &World) -> &[StaticObject] {
        &world.items
    }

    /// Tuning the world was built with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }

    /// World extent in pixels as `(width, height)`.
    #[must_use]
    pub fn extent(world: &World) -> (f32, f32) {
        let tile = world.tuning.tile_size;
        (world.columns as f32 * tile, world.rows as f32 * tile)
    }

    /// Number of `Tick` commands applied since the level was loaded.
    ///
    /// The counter keeps advancing after the player freezes, since enemies
    /// still move on those ticks.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Every live entity ordered by identifier, which is grid scan order.
    #[must_use]
    pub fn entities(world: &World) -> Vec<EntityRef<'_>> {
        let mut entities: Vec<EntityRef<'_>> = world
            .walls
            .iter()
            .chain(world.items.iter())
            .map(EntityRef::Static)
            .chain(world.enemies.iter().map(EntityRef::Enemy))
            .chain(std::iter::once(EntityRef::Player(&world.player)))
            .collect();
        entities.sort_by_key(|entity| entity.id());
        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jungle_escape_core::{CellCoord, ItemKind};

    fn world_from(rows: &[&str]) -> World {
        let grid = Grid::from_rows(rows).expect("valid layout");
        World::build(&grid, &Tuning::default()).expect("buildable layout")
    }

    fn tick(world: &mut World, input: InputSnapshot) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick { input }, &mut events);
        events
    }

    fn settle(world: &mut World) {
        for _ in 0..120 {
            let _ = tick(world, InputSnapshot::IDLE);
        }
    }

    const HOLD_RIGHT: InputSnapshot = InputSnapshot {
        move_left: false,
        move_right: true,
        jump: false,
    };

    const JUMP: InputSnapshot = InputSnapshot {
        move_left: false,
        move_right: false,
        jump: true,
    };

    #[test]
    fn build_maps_tags_to_entities() {
        let world = world_from(&["..C.K", "P...L", "XXEXX", "DDDDD"]);

        assert_eq!(query::walls(&world).len(), 9);
        assert_eq!(query::items(&world).len(), 3);
        assert_eq!(query::enemies(&world).len(), 1);
        assert_eq!(query::player(&world).bounds(), WorldRect::new(0.0, 64.0, 64.0, 64.0));

        let door = query::items(&world)
            .iter()
            .find(|item| item.kind() == StaticKind::Door)
            .expect("door");
        assert_eq!(door.bounds(), WorldRect::new(256.0, 0.0, 64.0, 128.0));

        let enemy = &query::enemies(&world)[0];
        assert_eq!(enemy.patrol_bounds(), (64.0, 256.0));

        let dirt = query::walls(&world)
            .iter()
            .filter(|wall| wall.source() == CellTag::Dirt)
            .count();
        assert_eq!(dirt, 5);
    }

    #[test]
    fn build_assigns_ids_in_scan_order() {
        let world = world_from(&["..C.K", "P...L", "XXEXX"]);
        let ids: Vec<u32> = query::entities(&world)
            .iter()
            .map(|entity| entity.id().get())
            .collect();
        assert_eq!(ids, (0..9).collect::<Vec<_>>());
        assert_eq!(query::player(&world).id(), EntityId::new(2));
    }

    #[test]
    fn build_rejects_missing_or_duplicate_player_start() {
        let grid = Grid::from_rows(&["....", "XXXX"]).expect("valid layout");
        assert_eq!(
            World::build(&grid, &Tuning::default()),
            Err(LevelError::MissingPlayerStart)
        );

        let grid = Grid::from_rows(&["P..P", "XXXX"]).expect("valid layout");
        assert_eq!(
            World::build(&grid, &Tuning::default()),
            Err(LevelError::MultiplePlayerStarts { count: 2 })
        );
    }

    #[test]
    fn rejected_level_keeps_previous_world() {
        let mut world = world_from(&["P...", "XXXX"]);
        let before = world.clone();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::LoadLevel {
                grid: Grid::new(4, 2),
            },
            &mut events,
        );

        assert_eq!(world, before);
        assert_eq!(
            events,
            vec![Event::LevelRejected {
                reason: LevelError::MissingPlayerStart
            }]
        );
    }

    #[test]
    fn player_lands_and_rests_on_floor() {
        let mut world = world_from(&["P...", "....", "XXXX"]);
        settle(&mut world);

        let player = query::player(&world);
        assert!(player.on_ground());
        assert_eq!(player.bounds().bottom(), 128.0);
        assert_eq!(player.velocity_y(), 0.0);
        assert_eq!(player.animation(), jungle_escape_core::AnimationState::Idle);
    }

    #[test]
    fn jump_without_ground_does_not_change_vertical_velocity() {
        let mut world = world_from(&["P...", "....", "....", "XXXX"]);
        let _ = tick(&mut world, JUMP);

        let player = query::player(&world);
        assert!(!player.on_ground());
        assert!((player.velocity_y() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn jump_from_ground_launches_upward() {
        let mut world = world_from(&["....", "....", "P...", "XXXX"]);
        settle(&mut world);

        let _ = tick(&mut world, JUMP);

        let player = query::player(&world);
        assert!(!player.on_ground());
        assert!((player.velocity_y() - (-22.0 + 0.8)).abs() < 1e-4);
        assert_eq!(player.animation(), jungle_escape_core::AnimationState::Jump);
    }

    #[test]
    fn walking_into_a_wall_stops_at_its_edge() {
        let mut world = world_from(&["P..X", "XXXX"]);
        for _ in 0..40 {
            let _ = tick(&mut world, HOLD_RIGHT);
        }

        let player = query::player(&world);
        assert_eq!(player.bounds().right(), 192.0);
        assert!(player.on_ground());
        for wall in query::walls(&world) {
            assert!(!player.bounds().overlaps(&wall.bounds()));
        }
    }

    #[test]
    fn door_requires_key() {
        let mut world = world_from(&["....", "P...", "L...", "XXXX"]);
        let events = tick(&mut world, InputSnapshot::IDLE);
        assert!(!query::player(&world).has_won());
        assert!(!events.iter().any(|event| matches!(event, Event::PlayerWon { .. })));

        world.player.has_key = true;
        let events = tick(&mut world, InputSnapshot::IDLE);
        assert!(query::player(&world).has_won());
        assert!(events.contains(&Event::PlayerWon { gems_collected: 0 }));
        assert_eq!(query::items(&world).len(), 1);
    }

    #[test]
    fn walking_over_key_then_door_wins() {
        let mut world = world_from(&["......", "P.K..L", "XXXXXX"]);
        let mut events = Vec::new();
        for _ in 0..80 {
            events.extend(tick(&mut world, HOLD_RIGHT));
            if query::player(&world).has_won() {
                break;
            }
        }

        assert!(query::player(&world).has_won());
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ItemCollected {
                kind: ItemKind::Key,
                ..
            }
        )));
    }

    #[test]
    fn touching_an_enemy_kills_regardless_of_velocity() {
        // The enemy patrols right first, turns around and walks back into the
        // idle player.
        let mut world = world_from(&["PE..", "XXXX"]);
        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(tick(&mut world, InputSnapshot::IDLE));
            if query::player(&world).is_dead() {
                break;
            }
        }

        let player = query::player(&world);
        assert!(player.is_dead());
        assert_eq!(player.velocity_x(), 0.0);
        assert!(events.contains(&Event::PlayerDied {
            cause: DeathCause::Enemy
        }));
    }

    #[test]
    fn falling_below_viewport_kills() {
        let mut world = world_from(&["P...", "...."]);
        let mut died = false;
        for _ in 0..200 {
            let events = tick(&mut world, InputSnapshot::IDLE);
            if events.contains(&Event::PlayerDied {
                cause: DeathCause::FellOutOfWorld,
            }) {
                died = true;
                break;
            }
        }

        assert!(died);
        assert!(query::player(&world).bounds().y() > 704.0 + 100.0);
    }

    #[test]
    fn frozen_player_ignores_input_but_enemies_keep_moving() {
        let mut world = world_from(&["PE....", "XXXXXX"]);
        for _ in 0..200 {
            let _ = tick(&mut world, InputSnapshot::IDLE);
            if query::player(&world).is_dead() {
                break;
            }
        }
        let frozen = query::player(&world).clone();
        let enemy_x = query::enemies(&world)[0].bounds().x();

        let events = tick(&mut world, HOLD_RIGHT);

        assert!(frozen.is_dead());
        assert_eq!(query::player(&world), &frozen);
        assert_eq!(
            events.first(),
            Some(&Event::TimeAdvanced {
                tick: query::tick_index(&world)
            })
        );
        assert_ne!(query::enemies(&world)[0].bounds().x(), enemy_x);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::PlayerDied { .. })));
    }

    #[test]
    fn gems_are_counted_and_removed() {
        let mut world = world_from(&["PC.C", "XXXX"]);
        for _ in 0..40 {
            let _ = tick(&mut world, HOLD_RIGHT);
        }

        assert_eq!(query::player(&world).gems_collected(), 2);
        assert!(query::items(&world).is_empty());
        assert!(query::entities(&world)
            .iter()
            .all(|entity| !matches!(entity, EntityRef::Static(object) if object.kind() == StaticKind::Gem)));
    }

    #[test]
    fn reload_is_idempotent() {
        let grid = Grid::from_rows(&["..C.K", "P...L", "XXEXX"]).expect("valid layout");
        let mut world = World::build(&grid, &Tuning::default()).expect("buildable");
        for _ in 0..30 {
            let _ = tick(&mut world, HOLD_RIGHT);
        }

        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { grid: grid.clone() }, &mut events);
        let first = world.clone();
        apply(&mut world, Command::LoadLevel { grid }, &mut events);

        assert_eq!(world, first);
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(
            query::player(&world).bounds().x(),
            CellCoord::new(0, 1).world_origin(64.0).0
        );
    }
}

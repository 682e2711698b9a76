//! Axis-separated AABB resolution of the player against walls, items and enemies.
//!
//! Each axis is displaced and corrected on its own so every correction is a
//! one-dimensional push back to the near edge of a collider. Colliders are
//! visited in their fixed collection order (row-major grid order); when several
//! overlap at once the final position depends on that order.

use jungle_escape_core::{Event, ItemKind, StaticKind, WorldRect};

use crate::entities::{Body, PatrollingEnemy, Player, StaticObject};

/// Moves the player by its horizontal velocity and pushes it out of any wall it entered.
pub(crate) fn move_horizontally(player: &mut Player, walls: &[StaticObject]) {
    player.bounds.shift_x(player.velocity_x);
    let velocity_x = player.velocity_x;

    for wall in overlapping(player.bounds, walls) {
        if velocity_x > 0.0 {
            player.bounds.set_right(wall.left());
        } else if velocity_x < 0.0 {
            player.bounds.set_left(wall.right());
        }
    }
}

/// Moves the player by its vertical velocity, pushes it out of walls and refreshes `on_ground`.
pub(crate) fn move_vertically(player: &mut Player, walls: &[StaticObject]) {
    player.bounds.shift_y(player.velocity_y);
    player.on_ground = false;

    for wall in overlapping(player.bounds, walls) {
        if player.velocity_y > 0.0 {
            player.bounds.set_bottom(wall.top());
            player.velocity_y = 0.0;
            player.on_ground = true;
        } else if player.velocity_y < 0.0 {
            player.bounds.set_top(wall.bottom());
            player.velocity_y = 0.0;
        }
    }
}

/// Applies every item the player overlaps.
///
/// Gems and keys are consumed exactly once. Doors stay in place so they can be
/// re-checked on later ticks; touching one while holding the key wins the level.
/// Removals happen after the traversal completes.
pub(crate) fn collect_items(
    player: &mut Player,
    items: &mut Vec<StaticObject>,
    out_events: &mut Vec<Event>,
) {
    let touched: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.bounds().overlaps(&player.bounds))
        .map(|(index, _)| index)
        .collect();
    if touched.is_empty() {
        return;
    }

    let mut consumed = Vec::new();
    for index in touched {
        let item = &items[index];
        match item.kind() {
            StaticKind::Gem => {
                player.gems_collected += 1;
                consumed.push(item.id());
                out_events.push(Event::ItemCollected {
                    item: item.id(),
                    kind: ItemKind::Gem,
                    gems_collected: player.gems_collected,
                });
            }
            StaticKind::Key => {
                player.has_key = true;
                consumed.push(item.id());
                out_events.push(Event::ItemCollected {
                    item: item.id(),
                    kind: ItemKind::Key,
                    gems_collected: player.gems_collected,
                });
            }
            StaticKind::Door => {
                if player.has_key && !player.won {
                    player.won = true;
                    out_events.push(Event::PlayerWon {
                        gems_collected: player.gems_collected,
                    });
                }
            }
            StaticKind::Wall => {}
        }
    }

    items.retain(|item| !consumed.contains(&item.id()));
}

/// Reports whether the player overlaps any enemy.
pub(crate) fn touches_enemy(player: &Player, enemies: &[PatrollingEnemy]) -> bool {
    enemies
        .iter()
        .any(|enemy| enemy.bounds().overlaps(&player.bounds))
}

fn overlapping(bounds: WorldRect, walls: &[StaticObject]) -> Vec<WorldRect> {
    walls
        .iter()
        .map(Body::bounds)
        .filter(|wall| wall.overlaps(&bounds))
        .collect()
}

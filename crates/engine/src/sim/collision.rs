use super::entity::CollisionFlags;
use super::geometry::{Rect, Vec2};
use crate::level::Tilemap;

/// Moves a box by `frame_movement`, horizontal axis fully resolved before the vertical
/// one. Each pass queries tiles around the box's updated position and clamps it flush
/// against every physics tile it overlaps. Only `position` and the returned flags change.
pub fn move_and_collide(
    tilemap: &Tilemap,
    position: &mut Vec2,
    size: Vec2,
    frame_movement: Vec2,
) -> CollisionFlags {
    let mut flags = CollisionFlags::default();

    position.x += frame_movement.x;
    let mut rect = Rect::new(position.x, position.y, size.x, size.y);
    for tile in tilemap.physics_rects_around(*position, size.x, size.y) {
        if rect.collides(&tile) {
            if frame_movement.x > 0.0 {
                rect.set_right(tile.left());
                flags.right = true;
            }
            if frame_movement.x < 0.0 {
                rect.set_left(tile.right());
                flags.left = true;
            }
            position.x = rect.x;
        }
    }

    position.y += frame_movement.y;
    let mut rect = Rect::new(position.x, position.y, size.x, size.y);
    for tile in tilemap.physics_rects_around(*position, size.x, size.y) {
        if rect.collides(&tile) {
            if frame_movement.y > 0.0 {
                rect.set_bottom(tile.top());
                flags.down = true;
            }
            if frame_movement.y < 0.0 {
                rect.set_top(tile.bottom());
                flags.up = true;
            }
            position.y = rect.bottom() - rect.h;
        }
    }

    flags
}

use std::sync::Arc;

use super::animation::{Action, Animation, AnimationLibrary, Archetype};
use super::collision::move_and_collide;
use super::geometry::{Rect, Vec2};
use crate::level::Tilemap;

pub const GRAVITY: f32 = 0.1;
pub const TERMINAL_VELOCITY: f32 = 5.0;

/// Sides touched during the most recent update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionFlags {
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.up || self.down
    }
}

/// Position, velocity and animation state shared by every moving body.
#[derive(Debug, Clone)]
pub struct PhysicsEntity {
    archetype: Archetype,
    pub position: Vec2,
    pub velocity: Vec2,
    size: Vec2,
    collisions: CollisionFlags,
    pub flipped: bool,
    last_movement: Vec2,
    action: Action,
    animation: Animation,
    library: Arc<AnimationLibrary>,
}

impl PhysicsEntity {
    pub fn new(
        archetype: Archetype,
        position: Vec2,
        size: Vec2,
        library: Arc<AnimationLibrary>,
    ) -> Self {
        let animation = library.actor(archetype, Action::Idle).start();
        Self {
            archetype,
            position,
            velocity: Vec2::ZERO,
            size,
            collisions: CollisionFlags::default(),
            flipped: false,
            last_movement: Vec2::ZERO,
            action: Action::Idle,
            animation,
            library,
        }
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn collisions(&self) -> CollisionFlags {
        self.collisions
    }

    pub fn last_movement(&self) -> Vec2 {
        self.last_movement
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Switching to a different action restarts its animation; repeating the current one
    /// keeps the cursor running.
    pub fn set_action(&mut self, action: Action) {
        if action != self.action {
            self.action = action;
            self.animation = self.library.actor(self.archetype, action).start();
        }
    }

    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2) {
        let frame_movement = Vec2::new(
            movement.x + self.velocity.x,
            movement.y + self.velocity.y,
        );
        self.collisions = move_and_collide(tilemap, &mut self.position, self.size, frame_movement);

        if movement.x > 0.0 {
            self.flipped = false;
        }
        if movement.x < 0.0 {
            self.flipped = true;
        }
        self.last_movement = movement;

        self.velocity.y = (self.velocity.y + GRAVITY).min(TERMINAL_VELOCITY);
        if self.collisions.vertical() {
            self.velocity.y = 0.0;
        }

        self.animation.update();
    }
}

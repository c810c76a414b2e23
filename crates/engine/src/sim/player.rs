use std::sync::Arc;

use super::animation::{Action, AnimationLibrary, Archetype};
use super::controller::{Actor, Controller, GenericController};
use super::entity::PhysicsEntity;
use super::events::{DeathCause, SimEvent};
use super::geometry::Vec2;

pub const ACTOR_SIZE: Vec2 = Vec2::new(8.0, 15.0);
pub const PLAYER_START: Vec2 = Vec2::new(50.0, 50.0);

pub const FALL_DEATH_TICKS: u32 = 120;
pub const AIRBORNE_POSE_TICKS: u32 = 4;
pub const WALL_SLIDE_MAX_FALL: f32 = 0.5;
pub const DEATH_SCREENSHAKE: f32 = 16.0;

pub const JUMP_VELOCITY: f32 = -3.0;
pub const WALL_JUMP_VELOCITY: Vec2 = Vec2::new(3.5, -2.5);

pub const DASH_TICKS: i32 = 60;
pub const DASH_CUTOFF: i32 = 50;
pub const DASH_SPEED: f32 = 8.0;
pub const DASH_STOP_FACTOR: f32 = 0.1;
pub const AIR_DAMPING: f32 = 0.1;

pub type Player = Actor<PlayerController>;
pub type Enemy = Actor<GenericController>;

#[derive(Debug, Clone)]
pub struct PlayerController {
    air_time: u32,
    jumps: u32,
    wall_slide: bool,
    dash_timer: i32,
    fall_death_signaled: bool,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self {
            air_time: 0,
            jumps: 1,
            wall_slide: false,
            dash_timer: 0,
            fall_death_signaled: false,
        }
    }
}

impl PlayerController {
    pub fn air_time(&self) -> u32 {
        self.air_time
    }

    pub fn jumps_remaining(&self) -> u32 {
        self.jumps
    }

    pub fn is_wall_sliding(&self) -> bool {
        self.wall_slide
    }

    pub fn dash_timer(&self) -> i32 {
        self.dash_timer
    }

    fn update_dash(&mut self, body: &mut PhysicsEntity, events: &mut Vec<SimEvent>) {
        let magnitude = self.dash_timer.abs();
        if magnitude == DASH_TICKS || magnitude == DASH_CUTOFF {
            events.push(SimEvent::DashBurst {
                center: body.rect().center(),
            });
        }

        // Speed is forced from the timer value the tick starts with, so the tenth tick
        // of a dash (timer 51 -> 50) is the one that brakes.
        let dashing = magnitude > DASH_CUTOFF;
        if dashing {
            let direction = self.dash_timer.signum() as f32;
            body.velocity.x = direction * DASH_SPEED;
            if magnitude == DASH_CUTOFF + 1 {
                body.velocity.x *= DASH_STOP_FACTOR;
            }
            events.push(SimEvent::DashTrail {
                center: body.rect().center(),
                direction,
            });
        }

        self.dash_timer -= self.dash_timer.signum();

        if !dashing {
            body.velocity.x = if body.velocity.x > 0.0 {
                (body.velocity.x - AIR_DAMPING).max(0.0)
            } else {
                (body.velocity.x + AIR_DAMPING).min(0.0)
            };
        }
    }
}

impl Controller for PlayerController {
    fn after_physics(&mut self, body: &mut PhysicsEntity, movement: Vec2, events: &mut Vec<SimEvent>) {
        self.air_time += 1;
        if self.air_time > FALL_DEATH_TICKS && !self.fall_death_signaled {
            self.fall_death_signaled = true;
            events.push(SimEvent::PlayerDied {
                cause: DeathCause::Fall,
            });
            events.push(SimEvent::ScreenshakeRequested {
                strength: DEATH_SCREENSHAKE,
            });
        }

        let collisions = body.collisions();
        if collisions.down {
            self.air_time = 0;
            self.jumps = 1;
        }

        self.wall_slide = false;
        if collisions.horizontal() && self.air_time > AIRBORNE_POSE_TICKS {
            self.air_time = AIRBORNE_POSE_TICKS + 1;
            self.wall_slide = true;
            body.velocity.y = body.velocity.y.min(WALL_SLIDE_MAX_FALL);
            // Face the wall being touched.
            body.flipped = !collisions.right;
            body.set_action(Action::WallSlide);
        }

        if !self.wall_slide {
            if self.air_time > AIRBORNE_POSE_TICKS {
                body.set_action(Action::Jump);
            } else if movement.x != 0.0 {
                body.set_action(Action::Run);
            } else {
                body.set_action(Action::Idle);
            }
        }

        self.update_dash(body, events);
    }
}

impl Actor<PlayerController> {
    pub fn spawn(position: Vec2, library: Arc<AnimationLibrary>) -> Self {
        Actor::new(
            PhysicsEntity::new(Archetype::Player, position, ACTOR_SIZE, library),
            PlayerController::default(),
        )
    }

    /// Moves the player onto a spawn marker and restarts the airborne clock.
    pub fn place_at(&mut self, position: Vec2) {
        self.body.position = position;
        self.controller.air_time = 0;
        self.controller.fall_death_signaled = false;
    }

    /// Wall jump while sliding, otherwise a regular jump if one is left.
    pub fn jump(&mut self) -> bool {
        let controller = &mut self.controller;
        let body = &mut self.body;
        if controller.wall_slide {
            let push = if body.flipped && body.last_movement().x < 0.0 {
                WALL_JUMP_VELOCITY.x
            } else if !body.flipped && body.last_movement().x > 0.0 {
                -WALL_JUMP_VELOCITY.x
            } else {
                return false;
            };
            body.velocity.x = push;
            body.velocity.y = WALL_JUMP_VELOCITY.y;
            controller.air_time = AIRBORNE_POSE_TICKS + 1;
            controller.jumps = controller.jumps.saturating_sub(1);
            true
        } else if controller.jumps > 0 {
            body.velocity.y = JUMP_VELOCITY;
            controller.jumps -= 1;
            controller.air_time = AIRBORNE_POSE_TICKS + 1;
            true
        } else {
            false
        }
    }

    /// Starts a dash in the facing direction. Ignored while a dash is still counting down.
    pub fn dash(&mut self) -> bool {
        if self.controller.dash_timer != 0 {
            return false;
        }
        self.controller.dash_timer = if self.body.flipped {
            -DASH_TICKS
        } else {
            DASH_TICKS
        };
        true
    }

    /// Hidden during the high-speed part of a dash.
    pub fn is_visible(&self) -> bool {
        self.controller.dash_timer.abs() <= DASH_CUTOFF
    }

    /// Immune to projectiles and lethal to enemies on contact.
    pub fn is_invulnerable(&self) -> bool {
        self.controller.dash_timer.abs() >= DASH_CUTOFF
    }
}

impl Actor<GenericController> {
    pub fn spawn(position: Vec2, library: Arc<AnimationLibrary>) -> Self {
        Actor::new(
            PhysicsEntity::new(Archetype::Enemy, position, ACTOR_SIZE, library),
            GenericController,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{GridPos, Tile, TileKind, Tilemap};

    const EPSILON: f32 = 1e-5;

    fn player_at(x: f32, y: f32) -> Player {
        Player::spawn(Vec2::new(x, y), Arc::new(AnimationLibrary::default()))
    }

    fn tick(player: &mut Player, map: &Tilemap, movement: f32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        player.update(map, Vec2::new(movement, 0.0), &mut events);
        events
    }

    fn floor_map() -> Tilemap {
        let mut map = Tilemap::default();
        for x in -4..=8 {
            map.insert(Tile::new(TileKind::Grass, 1, GridPos::new(x, 2)));
        }
        map
    }

    /// Floor at row 2 and a wall column at x = 3 reaching above the player.
    fn wall_map() -> Tilemap {
        let mut map = floor_map();
        for y in -6..=1 {
            map.insert(Tile::new(TileKind::Stone, 7, GridPos::new(3, y)));
        }
        map
    }

    #[test]
    fn jump_consumes_the_single_ground_jump() {
        let mut player = player_at(0.0, 0.0);
        assert_eq!(player.controller.jumps_remaining(), 1);

        assert!(player.jump());
        assert_eq!(player.body.velocity.y, -3.0);
        assert_eq!(player.controller.jumps_remaining(), 0);
        assert_eq!(player.controller.air_time(), 5);

        assert!(!player.jump());
        assert_eq!(player.body.velocity.y, -3.0);
        assert_eq!(player.controller.jumps_remaining(), 0);
    }

    #[test]
    fn landing_restores_jump_and_idles() {
        let map = floor_map();
        let mut player = player_at(4.0, 10.0);
        assert!(player.jump());

        for _ in 0..120 {
            tick(&mut player, &map, 0.0);
            if player.body.collisions().down {
                break;
            }
        }

        assert!(player.body.collisions().down);
        assert_eq!(player.controller.air_time(), 0);
        assert_eq!(player.controller.jumps_remaining(), 1);
        assert_eq!(player.body.action(), Action::Idle);
    }

    #[test]
    fn dash_brakes_on_the_tenth_tick_and_reappears() {
        let map = Tilemap::default();
        let mut player = player_at(0.0, 0.0);

        assert!(player.dash());
        assert_eq!(player.controller.dash_timer(), 60);
        assert!(!player.is_visible());
        assert!(!player.dash());

        let first = tick(&mut player, &map, 0.0);
        assert!(first
            .iter()
            .any(|event| matches!(event, SimEvent::DashBurst { .. })));

        for _ in 1..9 {
            tick(&mut player, &map, 0.0);
        }
        assert_eq!(player.controller.dash_timer(), 51);
        assert_eq!(player.body.velocity.x, 8.0);
        assert!(!player.is_visible());

        let tenth = tick(&mut player, &map, 0.0);
        assert_eq!(player.controller.dash_timer(), 50);
        assert!((player.body.velocity.x - 0.8).abs() < EPSILON);
        assert!(player.is_visible());
        assert!(player.is_invulnerable());
        assert!(tenth
            .iter()
            .any(|event| matches!(event, SimEvent::DashTrail { direction, .. } if *direction == 1.0)));

        let eleventh = tick(&mut player, &map, 0.0);
        assert!(eleventh
            .iter()
            .any(|event| matches!(event, SimEvent::DashBurst { .. })));
        assert!((player.body.velocity.x - 0.7).abs() < EPSILON);
        assert!(!player.is_invulnerable());
    }

    #[test]
    fn dash_follows_facing_and_timer_returns_to_zero() {
        let map = Tilemap::default();
        let mut player = player_at(0.0, 0.0);
        tick(&mut player, &map, -1.0);
        assert!(player.body.flipped);

        assert!(player.dash());
        assert_eq!(player.controller.dash_timer(), -60);
        tick(&mut player, &map, 0.0);
        assert_eq!(player.body.velocity.x, -8.0);

        for _ in 0..59 {
            tick(&mut player, &map, 0.0);
        }
        assert_eq!(player.controller.dash_timer(), 0);
        assert_eq!(player.body.velocity.x, 0.0);
        assert!(player.dash());
    }

    #[test]
    fn horizontal_damping_never_overshoots_zero() {
        let map = Tilemap::default();
        let mut player = player_at(0.0, 0.0);
        player.body.velocity.x = 0.25;
        for _ in 0..3 {
            tick(&mut player, &map, 0.0);
        }
        assert_eq!(player.body.velocity.x, 0.0);

        player.body.velocity.x = -0.15;
        for _ in 0..2 {
            tick(&mut player, &map, 0.0);
        }
        assert_eq!(player.body.velocity.x, 0.0);
    }

    #[test]
    fn long_fall_signals_death_exactly_once() {
        let map = Tilemap::default();
        let mut player = player_at(0.0, 0.0);
        let mut deaths = 0;
        let mut shakes = 0;
        for _ in 0..200 {
            for event in tick(&mut player, &map, 0.0) {
                match event {
                    SimEvent::PlayerDied {
                        cause: DeathCause::Fall,
                    } => deaths += 1,
                    SimEvent::ScreenshakeRequested { .. } => shakes += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(deaths, 1);
        assert_eq!(shakes, 1);
    }

    #[test]
    fn death_fires_on_tick_121() {
        let map = Tilemap::default();
        let mut player = player_at(0.0, 0.0);
        for _ in 0..120 {
            let events = tick(&mut player, &map, 0.0);
            assert!(!events
                .iter()
                .any(|event| matches!(event, SimEvent::PlayerDied { .. })));
        }
        let events = tick(&mut player, &map, 0.0);
        assert!(events.contains(&SimEvent::PlayerDied {
            cause: DeathCause::Fall
        }));

        player.place_at(Vec2::new(0.0, 0.0));
        assert_eq!(player.controller.air_time(), 0);
    }

    #[test]
    fn airborne_player_against_wall_slides_facing_it() {
        let map = wall_map();
        // Right edge flush with the wall at x = 48, well above the floor.
        let mut player = player_at(40.0, -60.0);
        for _ in 0..6 {
            tick(&mut player, &map, 1.0);
        }

        assert!(player.body.collisions().right);
        assert!(player.controller.is_wall_sliding());
        assert_eq!(player.body.action(), Action::WallSlide);
        assert!(!player.body.flipped);
        assert!(player.body.velocity.y <= WALL_SLIDE_MAX_FALL);
        assert_eq!(player.controller.air_time(), 5);
    }

    #[test]
    fn wall_jump_requires_pressing_into_the_wall() {
        let map = wall_map();
        let mut player = player_at(40.0, -60.0);
        for _ in 0..6 {
            tick(&mut player, &map, 1.0);
        }
        assert!(player.controller.is_wall_sliding());

        assert!(player.jump());
        assert_eq!(player.body.velocity.x, -3.5);
        assert_eq!(player.body.velocity.y, -2.5);
        assert_eq!(player.controller.jumps_remaining(), 0);

        // Drifting into the wall without holding toward it still slides, but cannot jump off.
        let mut released = player_at(40.0, -60.0);
        for _ in 0..6 {
            tick(&mut released, &map, 1.0);
        }
        released.body.velocity.x = 0.5;
        tick(&mut released, &map, 0.0);
        assert!(released.controller.is_wall_sliding());
        assert!(!released.jump());
        assert_eq!(released.controller.jumps_remaining(), 1);
    }

    #[test]
    fn running_pose_on_the_ground() {
        let map = floor_map();
        let mut player = player_at(4.0, 17.0);
        tick(&mut player, &map, 1.0);
        tick(&mut player, &map, 1.0);
        assert!(player.body.collisions().down);
        assert_eq!(player.body.action(), Action::Run);
    }
}

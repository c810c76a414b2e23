mod animation;
mod collision;
mod controller;
mod effects;
mod entity;
mod events;
mod geometry;
mod player;
mod world;

pub use animation::{
    Action, Animation, AnimationLibrary, AnimationTemplate, Archetype, FrameHandle, ParticleKind,
};
pub use collision::move_and_collide;
pub use controller::{Actor, Controller, GenericController};
pub use effects::{Particle, Projectile, Spark};
pub use entity::{CollisionFlags, PhysicsEntity, GRAVITY, TERMINAL_VELOCITY};
pub use events::{DeathCause, SimEvent};
pub use geometry::{Rect, Vec2};
pub use player::{
    Enemy, Player, PlayerController, ACTOR_SIZE, DASH_CUTOFF, DASH_TICKS, FALL_DEATH_TICKS,
    PLAYER_START,
};
pub use world::World;

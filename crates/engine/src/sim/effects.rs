use super::animation::{Animation, AnimationLibrary, ParticleKind};
use super::geometry::Vec2;

pub const SPARK_DECAY: f32 = 0.1;
pub const LEAF_SWAY_RATE: f32 = 0.035;
pub const LEAF_SWAY_AMPLITUDE: f32 = 0.3;

/// Short-lived animated mote. Removed once its animation has played out.
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    animation: Animation,
}

impl Particle {
    pub fn new(
        kind: ParticleKind,
        position: Vec2,
        velocity: Vec2,
        frame: u32,
        library: &AnimationLibrary,
    ) -> Self {
        let mut animation = library.particle(kind).start();
        animation.set_frame(frame);
        Self {
            kind,
            position,
            velocity,
            animation,
        }
    }

    /// Returns `true` when the particle should be removed.
    pub fn update(&mut self) -> bool {
        let kill = self.animation.is_done();
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self.animation.update();
        if self.kind == ParticleKind::Leaf {
            self.position.x += (self.animation.frame() as f32 * LEAF_SWAY_RATE).sin() * LEAF_SWAY_AMPLITUDE;
        }
        kill
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}

/// Streak flying along `angle` (radians) that slows to a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub position: Vec2,
    pub angle: f32,
    pub speed: f32,
}

impl Spark {
    pub fn new(position: Vec2, angle: f32, speed: f32) -> Self {
        Self {
            position,
            angle,
            speed,
        }
    }

    pub fn update(&mut self) -> bool {
        self.position.x += self.angle.cos() * self.speed;
        self.position.y += self.angle.sin() * self.speed;
        self.speed = (self.speed - SPARK_DECAY).max(0.0);
        self.speed == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub speed_x: f32,
    pub age: u32,
}

impl Projectile {
    pub fn new(position: Vec2, speed_x: f32) -> Self {
        Self {
            position,
            speed_x,
            age: 0,
        }
    }

    pub fn advance(&mut self) {
        self.position.x += self.speed_x;
        self.age += 1;
    }
}

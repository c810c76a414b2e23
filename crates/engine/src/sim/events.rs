use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Fall,
    Projectile,
}

impl DeathCause {
    pub fn as_str(self) -> &'static str {
        match self {
            DeathCause::Fall => "fall",
            DeathCause::Projectile => "projectile",
        }
    }
}

/// Signals raised during a tick for sound, particles and camera effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Jumped,
    DashStarted,
    /// Dash start or the deceleration tick.
    DashBurst { center: Vec2 },
    /// One per high-speed dash tick; `direction` is `1.0` or `-1.0`.
    DashTrail { center: Vec2, direction: f32 },
    PlayerDied { cause: DeathCause },
    ScreenshakeRequested { strength: f32 },
    EnemyDefeated { index: usize },
    ProjectileImpact { pos: Vec2 },
    LevelPassed { index: usize },
    LevelLoaded { index: usize },
}

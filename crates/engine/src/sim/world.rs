use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::animation::{AnimationLibrary, ParticleKind};
use super::effects::{Particle, Projectile, Spark};
use super::events::{DeathCause, SimEvent};
use super::geometry::{Rect, Vec2};
use super::player::{Enemy, Player, DEATH_SCREENSHAKE, PLAYER_START};
use crate::app::InputSnapshot;
use crate::level::{LevelError, LevelSource, TileKind, Tilemap};

const LEAF_TREE_VARIANT: u32 = 2;
const LEAF_SPAWN_OFFSET: f32 = 4.0;
const LEAF_SPAWN_SIZE: Vec2 = Vec2::new(23.0, 13.0);
const LEAF_SPAWN_ODDS: f32 = 49_999.0;
const LEAF_VELOCITY: Vec2 = Vec2::new(-0.1, 0.3);
const LEAF_MAX_START_FRAME: u32 = 20;
const DUST_MAX_START_FRAME: u32 = 7;

const PLAYER_SPAWN_VARIANT: u32 = 0;
const ENEMY_SPAWN_VARIANT: u32 = 1;

const TRANSITION_START: i32 = -30;
const TRANSITION_CLOSED: i32 = 30;
const DEATH_FADE_TICKS: u32 = 10;
const DEATH_RELOAD_TICKS: u32 = 40;
const PROJECTILE_MAX_AGE: u32 = 360;
const IMPACT_SPARKS: usize = 4;
const HIT_BURST_COUNT: usize = 30;
const DASH_BURST_COUNT: usize = 20;

/// One running level: tilemap, actors and effects advanced a tick at a time.
pub struct World {
    levels: Box<dyn LevelSource>,
    library: Arc<AnimationLibrary>,
    rng: SmallRng,
    level: usize,
    tilemap: Tilemap,
    player: Player,
    enemies: Vec<Enemy>,
    leaf_spawners: Vec<Rect>,
    projectiles: Vec<Projectile>,
    particles: Vec<Particle>,
    sparks: Vec<Spark>,
    dead: u32,
    transition: i32,
    level_passed: bool,
    screenshake: f32,
    ticks: u64,
    deaths: u64,
    levels_loaded: u64,
}

impl World {
    pub fn new(
        levels: Box<dyn LevelSource>,
        library: Arc<AnimationLibrary>,
        start_level: usize,
        seed: u64,
    ) -> Result<Self, LevelError> {
        let player = Player::spawn(PLAYER_START, Arc::clone(&library));
        let mut world = Self {
            levels,
            library,
            rng: SmallRng::seed_from_u64(seed),
            level: start_level,
            tilemap: Tilemap::default(),
            player,
            enemies: Vec::new(),
            leaf_spawners: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            sparks: Vec::new(),
            dead: 0,
            transition: TRANSITION_START,
            level_passed: false,
            screenshake: 0.0,
            ticks: 0,
            deaths: 0,
            levels_loaded: 0,
        };
        world.load_level(start_level)?;
        Ok(world)
    }

    /// Replaces the current level with `index` and repopulates actors from its spawn markers.
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        let mut tilemap = self.levels.load(index)?;

        self.leaf_spawners = tilemap
            .extract(&[(TileKind::LargeDecor, LEAF_TREE_VARIANT)], true)
            .iter()
            .map(|tree| {
                Rect::new(
                    tree.pos().x + LEAF_SPAWN_OFFSET,
                    tree.pos().y + LEAF_SPAWN_OFFSET,
                    LEAF_SPAWN_SIZE.x,
                    LEAF_SPAWN_SIZE.y,
                )
            })
            .collect();

        self.enemies.clear();
        let markers = tilemap.extract(
            &[
                (TileKind::Spawners, PLAYER_SPAWN_VARIANT),
                (TileKind::Spawners, ENEMY_SPAWN_VARIANT),
            ],
            false,
        );
        for marker in markers {
            if marker.variant == PLAYER_SPAWN_VARIANT {
                self.player.place_at(marker.pos());
            } else {
                self.enemies
                    .push(Enemy::spawn(marker.pos(), Arc::clone(&self.library)));
            }
        }

        self.tilemap = tilemap;
        self.projectiles.clear();
        self.particles.clear();
        self.sparks.clear();
        self.dead = 0;
        self.transition = TRANSITION_START;
        self.level_passed = false;
        self.level = index;
        self.levels_loaded += 1;

        info!(
            level = index,
            grid_tiles = self.tilemap.grid_len(),
            offgrid_tiles = self.tilemap.offgrid_tiles().len(),
            enemies = self.enemies.len(),
            leaf_spawners = self.leaf_spawners.len(),
            "level_loaded"
        );
        Ok(())
    }

    /// Advances one simulated frame. Level reloads happen before any actor moves.
    pub fn tick(&mut self, input: &InputSnapshot) -> Result<Vec<SimEvent>, LevelError> {
        let mut events = Vec::new();
        self.ticks += 1;
        self.screenshake = (self.screenshake - 1.0).max(0.0);

        if self.level_passed {
            self.transition += 1;
            if self.transition > TRANSITION_CLOSED {
                let last = self.levels.level_count().saturating_sub(1);
                let next = (self.level + 1).min(last);
                self.load_level(next)?;
                events.push(SimEvent::LevelLoaded { index: next });
            }
        }
        if self.transition < 0 {
            self.transition += 1;
        }

        if self.dead > 0 {
            self.dead += 1;
            if self.dead >= DEATH_FADE_TICKS {
                self.transition = (self.transition + 1).min(TRANSITION_CLOSED);
            }
            if self.dead > DEATH_RELOAD_TICKS {
                let current = self.level;
                self.load_level(current)?;
                events.push(SimEvent::LevelLoaded { index: current });
            }
        }

        self.spawn_leaves();
        self.update_enemies(&mut events);

        if self.dead == 0 {
            let first_player_event = events.len();
            self.player
                .update(&self.tilemap, input.movement(), &mut events);
            let raised = events[first_player_event..].to_vec();
            self.apply_player_events(&raised);
        }

        self.update_projectiles(&mut events);
        self.sparks.retain_mut(|spark| !spark.update());
        self.particles.retain_mut(|particle| !particle.update());

        if input.jump_pressed() && self.player.jump() {
            events.push(SimEvent::Jumped);
        }
        if input.dash_pressed() && self.player.dash() {
            events.push(SimEvent::DashStarted);
        }

        Ok(events)
    }

    /// Fires a projectile; the shooting enemy behaviour lives outside the simulation.
    pub fn spawn_projectile(&mut self, position: Vec2, speed_x: f32) {
        self.projectiles.push(Projectile::new(position, speed_x));
    }

    fn spawn_leaves(&mut self) {
        for spawner in &self.leaf_spawners {
            if self.rng.gen::<f32>() * LEAF_SPAWN_ODDS < spawner.w * spawner.h {
                let position = Vec2::new(
                    spawner.x + self.rng.gen::<f32>() * spawner.w,
                    spawner.y + self.rng.gen::<f32>() * spawner.h,
                );
                let frame = self.rng.gen_range(0..=LEAF_MAX_START_FRAME);
                self.particles.push(Particle::new(
                    ParticleKind::Leaf,
                    position,
                    LEAF_VELOCITY,
                    frame,
                    &self.library,
                ));
            }
        }
    }

    fn update_enemies(&mut self, events: &mut Vec<SimEvent>) {
        let player_rect = self.player.rect();
        let lethal_player = self.player.is_invulnerable();
        let mut defeated = Vec::new();
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            enemy.update(&self.tilemap, Vec2::ZERO, events);
            if lethal_player && enemy.rect().collides(&player_rect) {
                defeated.push(index);
            }
        }
        if defeated.is_empty() {
            return;
        }

        for &index in &defeated {
            let center = self.enemies[index].rect().center();
            self.hit_burst(center);
            self.sparks
                .push(Spark::new(center, 0.0, 5.0 + self.rng.gen::<f32>()));
            self.sparks
                .push(Spark::new(center, PI, 5.0 + self.rng.gen::<f32>()));
            self.request_screenshake(DEATH_SCREENSHAKE, events);
            events.push(SimEvent::EnemyDefeated { index });
            info!(level = self.level, enemy = index, "enemy_defeated");
        }

        let mut index = 0;
        self.enemies.retain(|_| {
            let keep = !defeated.contains(&index);
            index += 1;
            keep
        });

        if self.enemies.is_empty() {
            self.level_passed = true;
            events.push(SimEvent::LevelPassed { index: self.level });
            info!(level = self.level, "level_passed");
        }
    }

    fn apply_player_events(&mut self, raised: &[SimEvent]) {
        for event in raised {
            match *event {
                SimEvent::PlayerDied { cause } => self.record_death(cause),
                SimEvent::ScreenshakeRequested { strength } => {
                    self.screenshake = self.screenshake.max(strength);
                }
                SimEvent::DashBurst { center } => {
                    for _ in 0..DASH_BURST_COUNT {
                        let angle = self.rng.gen::<f32>() * TAU;
                        let speed = self.rng.gen::<f32>() * 0.5 + 0.5;
                        self.push_dust(
                            center,
                            Vec2::new(angle.cos() * speed, angle.sin() * speed),
                        );
                    }
                }
                SimEvent::DashTrail { center, direction } => {
                    let speed = direction * self.rng.gen::<f32>() * 3.0;
                    self.push_dust(center, Vec2::new(speed, 0.0));
                }
                _ => {}
            }
        }
    }

    fn update_projectiles(&mut self, events: &mut Vec<SimEvent>) {
        let mut survivors = Vec::with_capacity(self.projectiles.len());
        for mut projectile in std::mem::take(&mut self.projectiles) {
            projectile.advance();
            if self.tilemap.solid_check(projectile.position).is_some() {
                // Sparks fly back the way the projectile came.
                let back = if projectile.speed_x > 0.0 { PI } else { 0.0 };
                for _ in 0..IMPACT_SPARKS {
                    let angle = self.rng.gen::<f32>() - 0.5 + back;
                    let speed = 2.0 + self.rng.gen::<f32>();
                    self.sparks
                        .push(Spark::new(projectile.position, angle, speed));
                }
                events.push(SimEvent::ProjectileImpact {
                    pos: projectile.position,
                });
                debug!(x = projectile.position.x, y = projectile.position.y, "projectile_impact");
            } else if projectile.age > PROJECTILE_MAX_AGE {
                debug!(age = projectile.age, "projectile_expired");
            } else if !self.player.is_invulnerable()
                && self.player.rect().contains_point(projectile.position)
            {
                let center = self.player.rect().center();
                self.hit_burst(center);
                self.request_screenshake(DEATH_SCREENSHAKE, events);
                events.push(SimEvent::PlayerDied {
                    cause: DeathCause::Projectile,
                });
                self.record_death(DeathCause::Projectile);
            } else {
                survivors.push(projectile);
            }
        }
        self.projectiles = survivors;
    }

    fn record_death(&mut self, cause: DeathCause) {
        if self.dead == 0 {
            self.deaths += 1;
            info!(level = self.level, cause = cause.as_str(), "player_died");
        }
        self.dead += 1;
    }

    fn request_screenshake(&mut self, strength: f32, events: &mut Vec<SimEvent>) {
        self.screenshake = self.screenshake.max(strength);
        events.push(SimEvent::ScreenshakeRequested { strength });
    }

    /// Sparks outward and dust inward, used for enemy and player hits.
    fn hit_burst(&mut self, center: Vec2) {
        for _ in 0..HIT_BURST_COUNT {
            let angle = self.rng.gen::<f32>() * TAU;
            let speed = self.rng.gen::<f32>() * 5.0;
            self.sparks
                .push(Spark::new(center, angle, 2.0 + self.rng.gen::<f32>()));
            self.push_dust(
                center,
                Vec2::new(
                    (angle + PI).cos() * speed * 0.5,
                    (angle + PI).sin() * speed * 0.5,
                ),
            );
        }
    }

    fn push_dust(&mut self, position: Vec2, velocity: Vec2) {
        let frame = self.rng.gen_range(0..=DUST_MAX_START_FRAME);
        self.particles.push(Particle::new(
            ParticleKind::Dust,
            position,
            velocity,
            frame,
            &self.library,
        ));
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn level_count(&self) -> usize {
        self.levels.level_count()
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn leaf_spawners(&self) -> &[Rect] {
        &self.leaf_spawners
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn is_player_dead(&self) -> bool {
        self.dead > 0
    }

    /// Circle-wipe progress: negative while opening, up to 30 when fully closed.
    pub fn transition(&self) -> i32 {
        self.transition
    }

    pub fn screenshake(&self) -> f32 {
        self.screenshake
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn deaths(&self) -> u64 {
        self.deaths
    }

    pub fn levels_loaded(&self) -> u64 {
        self.levels_loaded
    }
}

use std::sync::Arc;

/// Opaque image reference resolved by whatever renders the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u32);

/// Immutable frame list plus timing. Shared between every running copy.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTemplate {
    frames: Arc<[FrameHandle]>,
    frame_duration: u32,
    looping: bool,
}

impl AnimationTemplate {
    /// An empty frame list is replaced by a single `FrameHandle(0)`; a zero duration by 1.
    pub fn new(frames: Vec<FrameHandle>, frame_duration: u32, looping: bool) -> Self {
        let frames = if frames.is_empty() {
            vec![FrameHandle(0)]
        } else {
            frames
        };
        Self {
            frames: frames.into(),
            frame_duration: frame_duration.max(1),
            looping,
        }
    }

    /// `count` frames numbered `0..count`.
    pub fn uniform(count: u32, frame_duration: u32, looping: bool) -> Self {
        Self::new((0..count).map(FrameHandle).collect(), frame_duration, looping)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_duration(&self) -> u32 {
        self.frame_duration
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    fn total_ticks(&self) -> u32 {
        self.frame_duration * self.frames.len() as u32
    }

    pub fn start(&self) -> Animation {
        Animation {
            template: self.clone(),
            frame: 0,
            done: false,
        }
    }
}

/// A running cursor over a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    template: AnimationTemplate,
    frame: u32,
    done: bool,
}

impl Animation {
    pub fn update(&mut self) {
        let total = self.template.total_ticks();
        if self.template.looping {
            self.frame = (self.frame + 1) % total;
        } else {
            self.frame = (self.frame + 1).min(total - 1);
            if self.frame >= total - 1 {
                self.done = true;
            }
        }
    }

    /// Jumps the cursor, clamped to the last tick of the sequence.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame.min(self.template.total_ticks() - 1);
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn image_index(&self) -> usize {
        (self.frame / self.template.frame_duration) as usize
    }

    pub fn image(&self) -> FrameHandle {
        let index = self.image_index().min(self.template.frames.len() - 1);
        self.template.frames[index]
    }

    pub fn template(&self) -> &AnimationTemplate {
        &self.template
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    Player,
    Enemy,
}

impl Archetype {
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        match self {
            Archetype::Player => 0,
            Archetype::Enemy => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Idle,
    Run,
    Jump,
    Slide,
    WallSlide,
}

impl Action {
    pub const COUNT: usize = 5;
    pub const ALL: [Action; Action::COUNT] = [
        Action::Idle,
        Action::Run,
        Action::Jump,
        Action::Slide,
        Action::WallSlide,
    ];

    pub const fn index(self) -> usize {
        match self {
            Action::Idle => 0,
            Action::Run => 1,
            Action::Jump => 2,
            Action::Slide => 3,
            Action::WallSlide => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Leaf,
    Dust,
}

impl ParticleKind {
    pub const fn index(self) -> usize {
        match self {
            ParticleKind::Leaf => 0,
            ParticleKind::Dust => 1,
        }
    }
}

/// Animation templates indexed by archetype and action, plus particle sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationLibrary {
    actors: [[AnimationTemplate; Action::COUNT]; Archetype::COUNT],
    particles: [AnimationTemplate; 2],
}

impl Default for AnimationLibrary {
    fn default() -> Self {
        let player_idle = AnimationTemplate::uniform(22, 6, true);
        let player = [
            player_idle,
            AnimationTemplate::uniform(8, 4, true),
            AnimationTemplate::uniform(1, 5, true),
            AnimationTemplate::uniform(1, 5, true),
            AnimationTemplate::uniform(1, 5, true),
        ];

        // Enemies only ship idle and run art.
        let enemy_idle = AnimationTemplate::uniform(16, 6, true);
        let enemy = [
            enemy_idle.clone(),
            AnimationTemplate::uniform(8, 4, true),
            enemy_idle.clone(),
            enemy_idle.clone(),
            enemy_idle,
        ];

        Self {
            actors: [player, enemy],
            particles: [
                AnimationTemplate::uniform(18, 20, false),
                AnimationTemplate::uniform(4, 6, false),
            ],
        }
    }
}

impl AnimationLibrary {
    pub fn actor(&self, archetype: Archetype, action: Action) -> &AnimationTemplate {
        &self.actors[archetype.index()][action.index()]
    }

    pub fn particle(&self, kind: ParticleKind) -> &AnimationTemplate {
        &self.particles[kind.index()]
    }

    pub fn with_actor(
        mut self,
        archetype: Archetype,
        action: Action,
        template: AnimationTemplate,
    ) -> Self {
        self.actors[archetype.index()][action.index()] = template;
        self
    }

    pub fn with_particle(mut self, kind: ParticleKind, template: AnimationTemplate) -> Self {
        self.particles[kind.index()] = template;
        self
    }
}

//! All game entity types — pure data, no logic.

use crate::pool::EntityPool;

/// Side length of the square world, in world units.
pub const WORLD_SIZE: f64 = 8192.0;

/// Number of slots in the entity pool.
pub const POOL_CAPACITY: usize = 8192;

/// Fake-counter value past which the level ends.
pub const FAKE_LIMIT: i32 = 64;

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// Discriminant used when spawning and drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Troll: worth shooting, leaves fakes behind.
    Enemy,
    /// Regular net user: shooting one costs points.
    User,
    Bullet,
    /// A genuine message dropped by a user.
    Message,
    /// A fake news item dropped by a troll.
    Fake,
    Explosion,
}

impl EntityKind {
    /// Kinds that show up as threat markers when off screen.
    pub fn is_hostile(self) -> bool {
        matches!(self, EntityKind::Enemy | EntityKind::Fake)
    }
}

/// Per-kind data. Every variant carries only what its behaviour reads.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityState {
    Enemy { odometer: f64 },
    User { odometer: f64 },
    Bullet { traveled: f64 },
    Message,
    Fake,
    /// One-way terminal form of an eliminated entity.
    Explosion {
        /// Ticks since the elimination.
        age: u32,
        /// Signed score delta shown above the blast.
        score: i64,
    },
}

impl EntityState {
    /// Fresh state for a newly spawned entity of `kind`.
    pub fn fresh(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Enemy => EntityState::Enemy { odometer: 0.0 },
            EntityKind::User => EntityState::User { odometer: 0.0 },
            EntityKind::Bullet => EntityState::Bullet { traveled: 0.0 },
            EntityKind::Message => EntityState::Message,
            EntityKind::Fake => EntityState::Fake,
            EntityKind::Explosion => EntityState::Explosion { age: 0, score: 0 },
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityState::Enemy { .. } => EntityKind::Enemy,
            EntityState::User { .. } => EntityKind::User,
            EntityState::Bullet { .. } => EntityKind::Bullet,
            EntityState::Message => EntityKind::Message,
            EntityState::Fake => EntityKind::Fake,
            EntityState::Explosion { .. } => EntityKind::Explosion,
        }
    }
}

// ── Entity ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub x: f64,
    pub y: f64,
    /// Heading in radians; forward is `(sin, cos)`.
    pub angle: f64,
    pub state: EntityState,
}

impl Entity {
    pub fn new(x: f64, y: f64, angle: f64, kind: EntityKind) -> Self {
        Self {
            x,
            y,
            angle,
            state: EntityState::fresh(kind),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.state.kind()
    }

    /// Bullets and explosions can never be hit.
    pub fn is_collidable(&self) -> bool {
        !matches!(
            self.state,
            EntityState::Bullet { .. } | EntityState::Explosion { .. }
        )
    }

    /// Axis-independent square overlap test.
    pub fn within(&self, x: f64, y: f64, threshold: f64) -> bool {
        (self.x - x).abs() < threshold && (self.y - y).abs() < threshold
    }

    /// Move `step` units along the heading.
    pub fn advance(&mut self, step: f64) {
        self.x += self.angle.sin() * step;
        self.y += self.angle.cos() * step;
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Movement intent, set by key presses and cleared by releases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub back: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub intent: Intent,
}

/// Sprite pose of the police escort riding next to the car.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EscortPose {
    #[default]
    Idle,
    /// Shown while the ban hammer is being swung.
    Ban,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Opening cutscene; the simulation is frozen.
    Intro,
    Playing,
    /// The fake-counter overflowed. One-way.
    Ended,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything the simulation step reads and writes.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub pool: EntityPool,
    pub score: i64,
    /// Net misinformation pressure; past `FAKE_LIMIT` the level ends.
    pub fake_counter: i32,
    pub status: GameStatus,
    /// Logic ticks since the level started.
    pub frame: u64,
    /// Muzzle-flash countdown.
    pub pew: u32,
    /// Camera-shake countdown.
    pub shake: u32,
    /// Opacity of the full-screen fade-in overlay, 255 = black.
    pub fade: u32,
    /// Roaming entities keep arriving while set.
    pub spawning: bool,
    /// Ticks since the last wave spawn.
    pub wave_clock: u32,
    pub wave_interval: u32,
    pub escort: EscortPose,
}

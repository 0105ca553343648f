//! Game-logic functions.
//!
//! Every function takes the current `GameState` by mutable reference (the
//! pool is far too large to copy every tick) and, where needed, an RNG
//! handle. Side effects are limited to the state and the injected RNG.

use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;

use crate::entities::{
    EntityKind, EntityState, EscortPose, GameState, GameStatus, Intent, Player, FAKE_LIMIT,
    POOL_CAPACITY, WORLD_SIZE,
};
use crate::error::GameResult;
use crate::pool::{EntityId, EntityPool};

// ── Tuning ────────────────────────────────────────────────────────────────────

/// Radians per tick while a turn key is held.
pub const TURN_RATE: f64 = 0.02;
/// Forward rate applied every tick, input or not.
pub const CRUISE_SPEED: f64 = 1.0;
/// Added on top of the cruise rate while accelerating.
pub const BOOST_SPEED: f64 = 1.0;
/// Subtracted from the cruise rate while reversing.
pub const REVERSE_SPEED: f64 = 0.5;

pub const BULLET_SPEED: f64 = 5.0;
pub const BULLET_RANGE: f64 = 300.0;
/// Sideways distance between the car and a fresh bullet.
pub const BULLET_OFFSET: f64 = 10.0;
/// Half-width of the square a bullet hits.
pub const BULLET_HIT: f64 = 8.0;
/// Half-width of the square the car rams.
pub const PLAYER_HIT: f64 = 12.0;

pub const ROAM_SPEED: f64 = 0.5;
/// Odometer reading at which a roamer picks a new heading.
pub const ROAM_LEG: f64 = 200.0;

pub const EXPLOSION_TICKS: u32 = 16;
pub const MUZZLE_FLASH_TICKS: u32 = 10;
pub const SHAKE_TICKS: u32 = 10;
pub const FADE_TICKS: u32 = 255;

pub const WAVE_RADIUS_MIN: f64 = 222.0;
pub const WAVE_RADIUS_MAX: f64 = 522.0;

// ── Scoring ───────────────────────────────────────────────────────────────────

/// Score and fake-counter deltas for eliminating an entity of `kind`.
pub fn score_for(kind: EntityKind) -> (i64, i32) {
    match kind {
        EntityKind::Fake => (100, -1),
        EntityKind::Enemy => (500, 0),
        _ => (-500, 2),
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial state: car parked in the middle of the world, empty
/// pool, screen fully faded out until gameplay starts.
pub fn init_state(wave_interval: u32) -> GameState {
    GameState {
        player: Player {
            x: WORLD_SIZE / 2.0,
            y: WORLD_SIZE / 2.0,
            angle: 0.0,
            intent: Intent::default(),
        },
        pool: EntityPool::new(POOL_CAPACITY),
        score: 0,
        fake_counter: 0,
        status: GameStatus::Intro,
        frame: 0,
        pew: 0,
        shake: 0,
        fade: FADE_TICKS,
        spawning: false,
        wave_clock: 0,
        wave_interval,
        escort: EscortPose::Idle,
    }
}

// ── Spawning & elimination ───────────────────────────────────────────────────

/// Spawn into the pool. Every successful `Fake` spawn raises the
/// fake-counter by one.
pub fn spawn_entity(
    state: &mut GameState,
    x: f64,
    y: f64,
    angle: f64,
    kind: EntityKind,
) -> GameResult<EntityId> {
    let id = state.pool.spawn(x, y, angle, kind)?;
    if kind == EntityKind::Fake {
        state.fake_counter += 1;
    }
    Ok(id)
}

/// In-tick spawns drop the request when the pool is full.
fn spawn_or_drop(state: &mut GameState, x: f64, y: f64, angle: f64, kind: EntityKind) {
    if let Err(err) = spawn_entity(state, x, y, angle, kind) {
        log::warn!("dropping {:?} spawn at ({:.0}, {:.0}): {}", kind, x, y, err);
    }
}

/// Turn a collidable entity into an explosion, applying its score and
/// fake-counter deltas and pulsing the camera shake. Returns the score delta,
/// or `None` if `id` is inactive or already a bullet/explosion.
pub fn eliminate(state: &mut GameState, id: EntityId) -> Option<i64> {
    let entity = state.pool.get_mut(id)?;
    if !entity.is_collidable() {
        return None;
    }
    let (score, fake) = score_for(entity.kind());
    entity.state = EntityState::Explosion { age: 0, score };

    state.score += score;
    state.fake_counter += fake;
    state.shake = SHAKE_TICKS;
    Some(score)
}

// ── Input-driven state transitions ───────────────────────────────────────────

/// Fire a bullet from beside the car along its heading.
pub fn player_shoot(state: &mut GameState) -> GameResult<EntityId> {
    let p = &state.player;
    let side = p.angle + FRAC_PI_2;
    let x = p.x + side.sin() * BULLET_OFFSET;
    let y = p.y + side.cos() * BULLET_OFFSET;
    let angle = p.angle;

    let id = state.pool.spawn(x, y, angle, EntityKind::Bullet)?;
    state.pew = MUZZLE_FLASH_TICKS;
    state.escort = EscortPose::Ban;
    Ok(id)
}

/// Fire key released: the escort lowers the ban hammer.
pub fn release_trigger(state: &mut GameState) {
    state.escort = EscortPose::Idle;
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// What a call to `tick` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing but the frame counter moved.
    Idle,
    Advanced,
    /// The fake-counter overflowed on this tick.
    Ended,
}

/// Advance the simulation by one fixed step. All randomness comes through
/// `rng` so callers control determinism (tests use a seeded RNG).
pub fn tick(state: &mut GameState, rng: &mut impl Rng) -> TickOutcome {
    state.frame += 1;
    if state.status != GameStatus::Playing {
        return TickOutcome::Idle;
    }

    // ── 1. Visual-feedback countdowns ────────────────────────────────────────
    state.pew = state.pew.saturating_sub(1);
    state.shake = state.shake.saturating_sub(1);
    state.fade = state.fade.saturating_sub(1);

    // ── 2. Waves of roamers around the car ───────────────────────────────────
    if state.spawning {
        step_waves(state, rng);
    }

    // ── 3. Drive the car ─────────────────────────────────────────────────────
    step_player(&mut state.player);

    // ── 4. Car rams at most one entity per tick ──────────────────────────────
    let (px, py) = (state.player.x, state.player.y);
    if let Some(hit) = state
        .pool
        .find(|_, e| e.is_collidable() && e.within(px, py, PLAYER_HIT))
    {
        eliminate(state, hit);
    }

    // ── 5. Per-entity behaviour ──────────────────────────────────────────────
    for id in state.pool.active_ids() {
        let Some(kind) = state.pool.get(id).map(|e| e.kind()) else {
            continue; // shot down earlier in this pass
        };
        match kind {
            EntityKind::Bullet => step_bullet(state, id),
            EntityKind::Enemy | EntityKind::User => step_roamer(state, id, rng),
            EntityKind::Explosion => step_explosion(state, id),
            EntityKind::Message | EntityKind::Fake => {}
        }
    }

    // ── 6. End condition ─────────────────────────────────────────────────────
    if state.fake_counter > FAKE_LIMIT {
        state.status = GameStatus::Ended;
        state.spawning = false;
        log::info!(
            "fake-counter at {} after {} ticks, level over with score {}",
            state.fake_counter,
            state.frame,
            state.score
        );
        return TickOutcome::Ended;
    }

    TickOutcome::Advanced
}

fn step_waves(state: &mut GameState, rng: &mut impl Rng) {
    state.wave_clock += 1;
    if state.wave_clock < state.wave_interval {
        return;
    }
    state.wave_clock = 0;

    let bearing = rng.gen_range(0.0..TAU);
    let radius = rng.gen_range(WAVE_RADIUS_MIN..WAVE_RADIUS_MAX);
    let x = state.player.x + bearing.sin() * radius;
    let y = state.player.y + bearing.cos() * radius;
    let kind = if rng.gen_ratio(1, 4) {
        EntityKind::Enemy
    } else {
        EntityKind::User
    };
    let heading = rng.gen_range(0.0..TAU);
    spawn_or_drop(state, x, y, heading, kind);
}

fn step_player(player: &mut Player) {
    let intent = player.intent;
    if intent.left {
        player.angle -= TURN_RATE;
    }
    if intent.right {
        player.angle += TURN_RATE;
    }

    let mut speed = CRUISE_SPEED;
    if intent.forward {
        speed += BOOST_SPEED;
    }
    if intent.back {
        speed -= REVERSE_SPEED;
    }
    player.x += player.angle.sin() * speed;
    player.y += player.angle.cos() * speed;
}

fn step_bullet(state: &mut GameState, id: EntityId) {
    let Some(bullet) = state.pool.get_mut(id) else {
        return;
    };
    bullet.advance(BULLET_SPEED);
    let (x, y) = (bullet.x, bullet.y);
    let spent = match &mut bullet.state {
        EntityState::Bullet { traveled } => {
            *traveled += BULLET_SPEED;
            *traveled >= BULLET_RANGE
        }
        _ => false,
    };
    if spent {
        state.pool.deactivate(id);
        return;
    }

    if let Some(target) = state
        .pool
        .find(|other, e| other != id && e.is_collidable() && e.within(x, y, BULLET_HIT))
    {
        state.pool.deactivate(id);
        eliminate(state, target);
    }
}

fn step_roamer(state: &mut GameState, id: EntityId, rng: &mut impl Rng) {
    let Some(roamer) = state.pool.get_mut(id) else {
        return;
    };
    roamer.advance(ROAM_SPEED);
    let leg_done = match &mut roamer.state {
        EntityState::Enemy { odometer } | EntityState::User { odometer } => {
            *odometer += ROAM_SPEED;
            if *odometer >= ROAM_LEG {
                *odometer = 0.0;
                true
            } else {
                false
            }
        }
        _ => false,
    };
    if !leg_done {
        return;
    }

    roamer.angle = rng.gen_range(0.0..TAU);
    let (x, y) = (roamer.x, roamer.y);
    let follow_on = match roamer.kind() {
        EntityKind::Enemy => Some(EntityKind::Fake),
        EntityKind::User if rng.gen_ratio(1, 3) => Some(EntityKind::Message),
        _ => None,
    };
    if let Some(kind) = follow_on {
        spawn_or_drop(state, x, y, 0.0, kind);
    }
}

fn step_explosion(state: &mut GameState, id: EntityId) {
    let Some(blast) = state.pool.get_mut(id) else {
        return;
    };
    let burnt_out = match &mut blast.state {
        EntityState::Explosion { age, .. } => {
            *age += 1;
            *age >= EXPLOSION_TICKS
        }
        _ => false,
    };
    if burnt_out {
        state.pool.deactivate(id);
    }
}

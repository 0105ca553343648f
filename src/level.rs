//! The playable level: lifecycle hooks, input, fixed-step update and draw.
//!
//! `Level` owns the game state, the cutscene timeline and the media backend.
//! The host loop only feeds it input events and fixed time steps and asks it
//! to draw; everything else happens in here.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compute::{self, init_state, player_shoot, release_trigger, TickOutcome};
use crate::config::{validate_config, GameConfig};
use crate::display::{draw_frame, Canvas};
use crate::entities::{GameState, GameStatus};
use crate::error::GameResult;
use crate::media::{Cue, Media};
use crate::projection::{CameraRig, Projection, Viewport};
use crate::script;
use crate::sequencer::{ActionContext, Presentation, Sequencer};

/// Progress steps reported while loading.
pub const LOADING_STEPS: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Skip,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Key),
    /// Auto-repeat while held.
    Repeated(Key),
    Released(Key),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelSignal {
    Continue,
    Quit,
}

pub struct Level<M: Media> {
    config: GameConfig,
    viewport: Viewport,
    state: GameState,
    sequencer: Sequencer,
    media: M,
    rng: StdRng,
    jitter: DVec2,
}

impl<M: Media> Level<M> {
    /// Prepare the level. `progress` is called once per loading step.
    pub fn load(config: GameConfig, media: M, mut progress: impl FnMut()) -> GameResult<Self> {
        validate_config(&config)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let level = Self {
            viewport: Viewport::new(config.viewport_width, config.viewport_height),
            state: init_state(config.wave_interval),
            sequencer: Sequencer::new(),
            media,
            rng,
            jitter: DVec2::ZERO,
            config,
        };
        progress();
        log::info!("level loaded ({} step)", LOADING_STEPS);
        Ok(level)
    }

    /// Release every stream still owned by the timeline and hand the media
    /// backend back.
    pub fn unload(mut self) -> M {
        self.sequencer.shutdown(&mut self.media);
        self.media.stop_music();
        log::info!("level unloaded");
        self.media
    }

    /// Reset to a fresh intro and queue the opening timeline.
    pub fn start(&mut self) -> GameResult<()> {
        self.sequencer.shutdown(&mut self.media);
        self.state = init_state(self.config.wave_interval);
        self.jitter = DVec2::ZERO;

        let opening = script::opening(&mut self.media)?;
        log::info!("starting level, {} opening actions", opening.len());
        self.sequencer.extend(opening, &mut self.media);
        Ok(())
    }

    pub fn stop(&mut self) {
        log::debug!("stop: nothing to do");
    }

    pub fn pause(&mut self) {
        log::debug!("pause: nothing to do");
    }

    pub fn resume(&mut self) {
        log::debug!("resume: nothing to do");
    }

    pub fn reload(&mut self) {
        log::debug!("reload: nothing to do");
    }

    pub fn process_input(&mut self, event: InputEvent) -> LevelSignal {
        match event {
            InputEvent::Pressed(Key::Escape) => return LevelSignal::Quit,
            InputEvent::Pressed(Key::Skip) => self.sequencer.skip(),
            InputEvent::Pressed(Key::Fire) | InputEvent::Repeated(Key::Fire) => {
                if self.state.status == GameStatus::Playing {
                    if let Err(err) = player_shoot(&mut self.state) {
                        log::warn!("shot dropped: {}", err);
                    }
                }
            }
            InputEvent::Released(Key::Fire) => release_trigger(&mut self.state),
            InputEvent::Pressed(key) | InputEvent::Repeated(key) => self.hold(key, true),
            InputEvent::Released(key) => self.hold(key, false),
        }
        LevelSignal::Continue
    }

    fn hold(&mut self, key: Key, held: bool) {
        let intent = &mut self.state.player.intent;
        match key {
            Key::Left => intent.left = held,
            Key::Right => intent.right = held,
            Key::Up => intent.forward = held,
            Key::Down => intent.back = held,
            Key::Fire | Key::Skip | Key::Escape => {}
        }
    }

    /// One fixed step of `delta` seconds: timeline first, then simulation.
    pub fn step(&mut self, delta: f64) -> GameResult<()> {
        self.media.advance(delta);
        {
            let mut cx = ActionContext {
                state: &mut self.state,
                media: &mut self.media,
                rng: &mut self.rng,
            };
            self.sequencer.tick(delta, &mut cx);
        }

        if compute::tick(&mut self.state, &mut self.rng) == TickOutcome::Ended {
            self.collapse()?;
        }

        self.jitter = if self.state.shake > 0 {
            DVec2::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            )
        } else {
            DVec2::ZERO
        };
        Ok(())
    }

    /// Fake-counter overflow: kill the music, blow up, replace whatever was
    /// still queued with the ending.
    fn collapse(&mut self) -> GameResult<()> {
        self.media.stop_music();
        self.media.play_cue(Cue::Explosion);
        self.sequencer.clean(&mut self.media);
        let ending = script::ending(&mut self.media)?;
        self.sequencer.extend(ending, &mut self.media);
        Ok(())
    }

    /// This frame's camera around the car.
    pub fn projection(&self) -> Projection {
        let p = &self.state.player;
        Projection::build(
            p.x,
            p.y,
            p.angle,
            self.viewport,
            CameraRig::chase(self.viewport),
            self.jitter,
        )
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        draw_frame(
            canvas,
            &self.state,
            self.sequencer.presentation(),
            &self.projection(),
        );
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn presentation(&self) -> &Presentation {
        self.sequencer.presentation()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

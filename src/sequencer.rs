//! Cutscene timeline: a strictly FIFO queue of presentation actions.
//!
//! Every action goes through the same lifecycle:
//!
//! - **init** runs once when the action is queued (stream paused, one-shot mode)
//! - **start** runs once when it reaches the head of the queue
//! - **poll** runs every tick while it is the head; `true` means done
//! - **destroy** runs once on completion and releases its payload
//!
//! Only the head is ever active. Waiting is a poll that keeps returning
//! `false`; nothing blocks the tick.

use std::collections::VecDeque;
use std::fmt;

use rand::{Rng, RngCore};

use crate::compute::{spawn_entity, FADE_TICKS};
use crate::entities::{EntityKind, GameState, GameStatus};
use crate::error::GameResult;
use crate::media::{Media, StreamId};

// ── Presentation state ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    Dispatcher,
    Officer,
    Narrator,
}

impl Speaker {
    pub fn name(self) -> &'static str {
        match self {
            Speaker::Dispatcher => "DISPATCH",
            Speaker::Officer => "OFFICER",
            Speaker::Narrator => "NARRATOR",
        }
    }
}

/// Full-screen images shown once the level is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndScreen {
    Blackout,
    Flood,
    Silence,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caption {
    pub speaker: Speaker,
    pub text: String,
}

/// What the timeline wants on screen, read by the renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Presentation {
    pub caption: Option<Caption>,
    pub show_logo: bool,
    pub end_screen: Option<EndScreen>,
    pub show_score: bool,
    skip: bool,
}

impl Presentation {
    pub fn skip_requested(&self) -> bool {
        self.skip
    }
}

/// Everything an action may touch besides the presentation.
pub struct ActionContext<'a> {
    pub state: &'a mut GameState,
    pub media: &'a mut dyn Media,
    pub rng: &'a mut dyn RngCore,
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// A narrated line and the stream it owns.
#[derive(Debug)]
pub struct Speak {
    pub speaker: Speaker,
    pub text: String,
    stream: StreamId,
}

#[derive(Debug)]
pub enum Action {
    /// Completes once `seconds` of tick delta have accumulated.
    Delay { seconds: f64 },
    /// Shows a caption until the line finishes or is skipped.
    Speak(Speak),
    ShowLogo,
    HideLogo,
    /// Intro → play: music on, fade-in begins.
    StartGameplay,
    /// Roamers start arriving around the car.
    SpawnWave,
    /// One entity `ahead` units in front of the car.
    SpawnSingle { kind: EntityKind, ahead: f64 },
    SwitchEndScreen(EndScreen),
    RevealScore,
}

impl Action {
    pub fn delay(seconds: f64) -> Self {
        Action::Delay { seconds }
    }

    /// Load the stream for a narrated line. The action owns it from here on.
    pub fn speak(
        media: &mut dyn Media,
        speaker: Speaker,
        asset: &str,
        text: impl Into<String>,
    ) -> GameResult<Self> {
        let stream = media.load_stream(asset)?;
        Ok(Action::Speak(Speak {
            speaker,
            text: text.into(),
            stream,
        }))
    }

    fn init(&mut self, media: &mut dyn Media) {
        if let Action::Speak(speak) = self {
            media.prepare_oneshot(speak.stream);
        }
    }

    fn start(&mut self, cx: &mut ActionContext<'_>, presentation: &mut Presentation) {
        match self {
            Action::Delay { .. } => {}
            Action::Speak(speak) => {
                presentation.skip = false;
                presentation.caption = Some(Caption {
                    speaker: speak.speaker,
                    text: speak.text.clone(),
                });
                cx.media.play(speak.stream);
            }
            Action::ShowLogo => presentation.show_logo = true,
            Action::HideLogo => presentation.show_logo = false,
            Action::StartGameplay => {
                if cx.state.status == GameStatus::Intro {
                    cx.state.status = GameStatus::Playing;
                    cx.state.fade = FADE_TICKS;
                    log::info!("gameplay started at tick {}", cx.state.frame);
                }
                cx.media.start_music();
            }
            Action::SpawnWave => cx.state.spawning = true,
            Action::SpawnSingle { kind, ahead } => {
                let p = &cx.state.player;
                let x = p.x + p.angle.sin() * *ahead;
                let y = p.y + p.angle.cos() * *ahead;
                let heading = cx.rng.gen_range(0.0..std::f64::consts::TAU);
                if let Err(err) = spawn_entity(cx.state, x, y, heading, *kind) {
                    log::warn!("scripted {:?} spawn dropped: {}", kind, err);
                }
            }
            Action::SwitchEndScreen(screen) => presentation.end_screen = Some(*screen),
            Action::RevealScore => presentation.show_score = true,
        }
    }

    fn poll(&self, elapsed: f64, media: &dyn Media, presentation: &Presentation) -> bool {
        match self {
            Action::Delay { seconds } => elapsed >= *seconds,
            Action::Speak(speak) => presentation.skip || !media.is_playing(speak.stream),
            _ => true,
        }
    }

    fn destroy(&mut self, media: &mut dyn Media, presentation: &mut Presentation) {
        if let Action::Speak(speak) = self {
            media.release(speak.stream);
            presentation.caption = None;
        }
    }

    /// Release the payload of an action that never started.
    fn discard(&mut self, media: &mut dyn Media) {
        if let Action::Speak(speak) = self {
            media.release(speak.stream);
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Delay { seconds } => write!(f, "delay {seconds}s"),
            Action::Speak(speak) => write!(f, "speak ({})", speak.speaker.name()),
            Action::ShowLogo => f.write_str("show logo"),
            Action::HideLogo => f.write_str("hide logo"),
            Action::StartGameplay => f.write_str("start gameplay"),
            Action::SpawnWave => f.write_str("spawn wave"),
            Action::SpawnSingle { kind, .. } => write!(f, "spawn {kind:?}"),
            Action::SwitchEndScreen(screen) => write!(f, "end screen {screen:?}"),
            Action::RevealScore => f.write_str("reveal score"),
        }
    }
}

// ── Queue ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Queued {
    action: Action,
    started: bool,
    elapsed: f64,
}

#[derive(Debug, Default)]
pub struct Sequencer {
    queue: VecDeque<Queued>,
    presentation: Presentation,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action, running its init phase now.
    pub fn push(&mut self, mut action: Action, media: &mut dyn Media) {
        action.init(media);
        self.queue.push_back(Queued {
            action,
            started: false,
            elapsed: 0.0,
        });
    }

    pub fn extend(&mut self, actions: impl IntoIterator<Item = Action>, media: &mut dyn Media) {
        for action in actions {
            self.push(action, media);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The head action, if any.
    pub fn current(&self) -> Option<&Action> {
        self.queue.front().map(|q| &q.action)
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Skip the line being narrated. Consumed by the active speak action;
    /// cleared whenever a new one starts.
    pub fn skip(&mut self) {
        self.presentation.skip = true;
    }

    /// Process the queue with `delta` seconds of elapsed time.
    ///
    /// An action started on this tick does not receive `delta`; completed
    /// actions hand over to their successor within the same tick.
    pub fn tick(&mut self, delta: f64, cx: &mut ActionContext<'_>) {
        let Self {
            queue,
            presentation,
        } = self;

        while let Some(head) = queue.front_mut() {
            if head.started {
                head.elapsed += delta;
            } else {
                log::debug!("timeline: {}", head.action);
                head.started = true;
                head.action.start(cx, presentation);
            }

            if !head.action.poll(head.elapsed, &*cx.media, presentation) {
                break;
            }
            head.action.destroy(cx.media, presentation);
            queue.pop_front();
        }
    }

    /// Drop every action that has not started yet, releasing their payloads.
    /// A started head is kept and finishes normally.
    pub fn clean(&mut self, media: &mut dyn Media) {
        let keep = usize::from(self.queue.front().map_or(false, |q| q.started));
        for mut queued in self.queue.drain(keep..) {
            queued.action.discard(media);
        }
    }

    /// Tear down the whole queue, started head included.
    pub fn shutdown(&mut self, media: &mut dyn Media) {
        let Self {
            queue,
            presentation,
        } = self;
        for mut queued in queue.drain(..) {
            if queued.started {
                queued.action.destroy(media, presentation);
            } else {
                queued.action.discard(media);
            }
        }
        *presentation = Presentation::default();
    }
}

//! Audio collaborator seam.
//!
//! The level never decodes audio itself. Narrated lines are streams loaded
//! through `Media` and owned by the sequencer action that narrates them;
//! music and one-shot cues are fire-and-forget.

use std::collections::HashMap;

use crate::error::{GameError, GameResult};

/// Handle to a loaded audio stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamId(u32);

impl StreamId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// One-shot sound effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Explosion,
}

pub trait Media {
    /// Load a narrated line. Missing or malformed assets are fatal.
    fn load_stream(&mut self, asset: &str) -> GameResult<StreamId>;
    /// Pause the stream and switch it to play-once mode.
    fn prepare_oneshot(&mut self, stream: StreamId);
    fn play(&mut self, stream: StreamId);
    /// `false` once a one-shot stream has run to its end.
    fn is_playing(&self, stream: StreamId) -> bool;
    /// Stop the stream and drop it.
    fn release(&mut self, stream: StreamId);
    fn start_music(&mut self);
    fn stop_music(&mut self);
    fn play_cue(&mut self, cue: Cue);
    /// Let `dt` seconds of playback elapse.
    fn advance(&mut self, _dt: f64) {}
}

const AUDIO_EXTENSIONS: &[&str] = &[".flac", ".ogg", ".opus", ".wav"];

#[derive(Debug)]
struct SilentStream {
    playing: bool,
    remaining: f64,
}

/// Terminal stand-in for a sound card: every line "plays" for a fixed
/// nominal length so captions stay up long enough to read.
#[derive(Debug)]
pub struct SilentMedia {
    line_seconds: f64,
    streams: HashMap<StreamId, SilentStream>,
    next_id: u32,
    music: bool,
}

impl SilentMedia {
    pub fn new(line_seconds: f64) -> Self {
        Self {
            line_seconds,
            streams: HashMap::new(),
            next_id: 0,
            music: false,
        }
    }

    /// Streams loaded and not yet released.
    pub fn loaded(&self) -> usize {
        self.streams.len()
    }

    pub fn music_playing(&self) -> bool {
        self.music
    }
}

impl Media for SilentMedia {
    fn load_stream(&mut self, asset: &str) -> GameResult<StreamId> {
        if !AUDIO_EXTENSIONS.iter().any(|ext| asset.ends_with(ext)) {
            return Err(GameError::Asset {
                asset: asset.to_string(),
                reason: "not an audio stream".to_string(),
            });
        }
        let id = StreamId(self.next_id);
        self.next_id += 1;
        self.streams.insert(
            id,
            SilentStream {
                playing: false,
                remaining: self.line_seconds,
            },
        );
        log::debug!("loaded stream {:?} for '{}'", id, asset);
        Ok(id)
    }

    fn prepare_oneshot(&mut self, stream: StreamId) {
        if let Some(s) = self.streams.get_mut(&stream) {
            s.playing = false;
        }
    }

    fn play(&mut self, stream: StreamId) {
        if let Some(s) = self.streams.get_mut(&stream) {
            s.playing = true;
        }
    }

    fn is_playing(&self, stream: StreamId) -> bool {
        self.streams.get(&stream).map(|s| s.playing).unwrap_or(false)
    }

    fn release(&mut self, stream: StreamId) {
        if self.streams.remove(&stream).is_some() {
            log::debug!("released stream {:?}", stream);
        }
    }

    fn start_music(&mut self) {
        self.music = true;
    }

    fn stop_music(&mut self) {
        self.music = false;
    }

    fn play_cue(&mut self, cue: Cue) {
        log::debug!("cue {:?}", cue);
    }

    fn advance(&mut self, dt: f64) {
        for stream in self.streams.values_mut().filter(|s| s.playing) {
            stream.remaining -= dt;
            if stream.remaining <= 0.0 {
                stream.playing = false;
            }
        }
    }
}

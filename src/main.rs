use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use fake_news::config::{load_config_from_path, GameConfig};
use fake_news::display::{render, Canvas};
use fake_news::error::GameResult;
use fake_news::level::{InputEvent, Key, Level, LevelSignal};
use fake_news::logging;
use fake_news::media::SilentMedia;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest stretch of wall time fed into the simulation in one frame.
const MAX_CATCH_UP: f64 = 0.25;

/// A key counts as held while its last press/repeat arrived within this many
/// frames. Terminals without release events never report a release, so the
/// key expires after this much silence; OS key-repeat refreshes it sooner.
const HOLD_WINDOW: u64 = 4;

#[derive(Parser, Debug)]
#[command(name = "fake_news", about = "Patrol the net and shoot down fake news")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Where log records go while the terminal is taken over
    #[arg(long, default_value = "fake_news.log")]
    log_file: PathBuf,
}

// ── Input ─────────────────────────────────────────────────────────────────────

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Key::Down),
        KeyCode::Char(' ') => Some(Key::Fire),
        KeyCode::Enter | KeyCode::Tab => Some(Key::Skip),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Escape),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Key::Escape),
        _ => None,
    }
}

/// Turns raw terminal key events into press/repeat/release edges.
#[derive(Default)]
struct HeldKeys {
    /// Each held key → the frame it was last seen (press or repeat).
    last_seen: HashMap<Key, u64>,
}

impl HeldKeys {
    fn feed(&mut self, key: Key, kind: KeyEventKind, frame: u64) -> Option<InputEvent> {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if matches!(key, Key::Skip | Key::Escape) {
                    return (kind == KeyEventKind::Press).then_some(InputEvent::Pressed(key));
                }
                match self.last_seen.insert(key, frame) {
                    Some(_) => Some(InputEvent::Repeated(key)),
                    None => Some(InputEvent::Pressed(key)),
                }
            }
            KeyEventKind::Release => self
                .last_seen
                .remove(&key)
                .map(|_| InputEvent::Released(key)),
        }
    }

    /// Releases for keys that went quiet for longer than `HOLD_WINDOW`.
    fn expire(&mut self, frame: u64) -> Vec<InputEvent> {
        let stale: Vec<Key> = self
            .last_seen
            .iter()
            .filter(|(_, last)| frame.saturating_sub(**last) > HOLD_WINDOW)
            .map(|(&key, _)| key)
            .collect();
        for key in &stale {
            self.last_seen.remove(key);
        }
        stale.into_iter().map(InputEvent::Released).collect()
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Fixed-step driver: wall time accumulates, the level steps in `tick_dt`
/// slices, and one frame is drawn per loop iteration.
fn game_loop<W: Write>(
    out: &mut W,
    level: &mut Level<SilentMedia>,
    rx: &mpsc::Receiver<Event>,
) -> GameResult<()> {
    let tick_dt = level.config().tick_dt();
    let mut held = HeldKeys::default();
    let mut accumulator = 0.0;
    let mut last = Instant::now();
    let mut frame: u64 = 0;
    let (width, height) = terminal::size()?;
    let mut canvas = Canvas::new(width, height);

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    if let Some(key) = map_key(code, modifiers) {
                        events.extend(held.feed(key, kind, frame));
                    }
                }
                Event::Resize(w, h) => canvas.resize(w, h),
                _ => {}
            }
        }
        events.extend(held.expire(frame));

        for event in events {
            if level.process_input(event) == LevelSignal::Quit {
                log::info!("quit requested at frame {}", frame);
                return Ok(());
            }
        }

        // ── Fixed-timestep simulation ─────────────────────────────────────────
        let now = Instant::now();
        let mut real_dt = now.duration_since(last).as_secs_f64();
        last = now;
        if real_dt > MAX_CATCH_UP {
            log::warn!(
                "frame took {:.1}ms, capping catch-up to {}ms",
                real_dt * 1000.0,
                MAX_CATCH_UP * 1000.0
            );
            real_dt = MAX_CATCH_UP;
        }
        accumulator += real_dt;
        while accumulator >= tick_dt {
            accumulator -= tick_dt;
            level.step(tick_dt)?;
        }

        level.draw(&mut canvas);
        render(out, &canvas)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn load_config(args: &Args) -> GameResult<GameConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = logging::init(args.verbose, Some(&args.log_file)) {
        eprintln!("cannot open log file {}: {}", args.log_file.display(), err);
        return ExitCode::FAILURE;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match play(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn play(config: GameConfig) -> GameResult<()> {
    let media = SilentMedia::new(config.line_seconds);
    let mut level = Level::load(config, media, || log::debug!("loading step done"))?;
    level.start()?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to HOLD_WINDOW.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking event reads live on their own thread so the loop never waits
    // on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &mut level, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    let score = level.state().score;
    level.unload();
    log::info!("session over, final score {}", score);
    result
}

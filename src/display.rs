//! Terminal renderer.
//!
//! A frame is first composed into a `Canvas` of terminal cells, then flushed
//! with crossterm. Composition only reads the game state, the timeline's
//! presentation and the frame's projection; no game logic is performed.
//! The projection maps onto the logical low-resolution viewport, which the
//! canvas samples once per cell.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    QueueableCommand,
};
use glam::DVec2;

use crate::entities::{
    EntityKind, EntityState, EscortPose, GameState, GameStatus, FAKE_LIMIT, WORLD_SIZE,
};
use crate::projection::{Projection, Viewport, MARKER_SIZE};
use crate::sequencer::{Caption, EndScreen, Presentation};

// ── Colour palette ────────────────────────────────────────────────────────────

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

const C_BLACK: Color = rgb(0, 0, 0);
const C_TEXT: Color = rgb(230, 230, 230);
const C_SHADOW: Color = rgb(40, 40, 40);
const C_CABLE: Color = rgb(20, 150, 70);
const C_ORIGIN: Color = rgb(255, 0, 0);
const C_TILES: [Color; 4] = [
    rgb(8, 40, 60),
    rgb(12, 52, 80),
    rgb(6, 32, 48),
    rgb(30, 30, 70),
];
const C_BULLET: Color = rgb(254, 232, 0);
const C_ENEMY: Color = rgb(230, 40, 40);
const C_USER: Color = rgb(120, 200, 255);
const C_MESSAGE: Color = rgb(240, 240, 240);
const C_FAKE: Color = rgb(230, 60, 230);
const C_EXPLOSION: Color = rgb(255, 160, 0);
const C_GAIN: Color = rgb(80, 255, 80);
const C_LOSS: Color = rgb(255, 70, 70);
const C_CAR: Color = rgb(255, 255, 255);
const C_ESCORT: Color = rgb(60, 110, 255);
const C_HUD_SCORE: Color = rgb(255, 220, 0);
const C_GAUGE_EMPTY: Color = rgb(70, 70, 70);
const C_CAPTION_BG: Color = rgb(10, 10, 30);
const C_CAPTION_BORDER: Color = rgb(90, 90, 160);
const C_SPEAKER: Color = rgb(255, 220, 0);
const C_LOGO: Color = rgb(255, 60, 60);

/// Cells in the fake-counter bar.
const GAUGE_CELLS: i32 = 16;
/// Side length of one backdrop tile, in world units.
const TILE: f64 = 128.0;
/// Width of the cable running along tile edges.
const CABLE: f64 = 4.0;

const LOGO: [&str; 3] = [
    "╔═╗╔═╗╦╔═╔═╗  ╔╗╔╔═╗╦ ╦╔═╗",
    "╠╣ ╠═╣╠╩╗║╣   ║║║║╣ ║║║╚═╗",
    "╚  ╩ ╩╩ ╩╚═╝  ╝╚╝╚═╝╚╩╝╚═╝",
];

// ── Canvas ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: C_TEXT,
            bg: C_BLACK,
        }
    }
}

/// Off-screen grid of terminal cells.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Match the terminal size, reallocating only when it changed.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell {
            bg,
            ..Cell::default()
        });
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        if col < self.width && row < self.height {
            self.cells
                .get(row as usize * self.width as usize + col as usize)
        } else {
            None
        }
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> Option<&mut Cell> {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return None;
        }
        self.cells
            .get_mut(row as usize * self.width as usize + col as usize)
    }

    /// Set a glyph, keeping the cell's background.
    pub fn put(&mut self, col: i32, row: i32, ch: char, fg: Color) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.ch = ch;
            cell.fg = fg;
        }
    }

    pub fn paint(&mut self, col: i32, row: i32, bg: Color) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.bg = bg;
        }
    }

    pub fn print(&mut self, col: i32, row: i32, text: &str, fg: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.put(col + i as i32, row, ch, fg);
        }
    }

    /// The glyphs of one row as a string.
    pub fn row_text(&self, row: u16) -> String {
        (0..self.width)
            .filter_map(|col| self.cell(col, row).map(|c| c.ch))
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        (0..self.height).any(|row| self.row_text(row).contains(needle))
    }

    /// Scale every colour by `keep` (0 = black, 1 = unchanged).
    fn darken(&mut self, keep: f64) {
        for cell in &mut self.cells {
            cell.fg = dim(cell.fg, keep);
            cell.bg = dim(cell.bg, keep);
        }
    }
}

fn dim(color: Color, keep: f64) -> Color {
    let scale = |c: u8| (c as f64 * keep).round().clamp(0.0, 255.0) as u8;
    match color {
        Color::Rgb { r, g, b } => rgb(scale(r), scale(g), scale(b)),
        other if keep >= 0.5 => other,
        _ => C_BLACK,
    }
}

// ── Viewport ↔ cell mapping ───────────────────────────────────────────────────

fn to_cell(canvas: &Canvas, viewport: Viewport, p: DVec2) -> (i32, i32) {
    let col = p.x / viewport.width * canvas.width as f64;
    let row = p.y / viewport.height * canvas.height as f64;
    (col.floor() as i32, row.floor() as i32)
}

fn cell_center(canvas: &Canvas, viewport: Viewport, col: u16, row: u16) -> DVec2 {
    DVec2::new(
        (col as f64 + 0.5) * viewport.width / canvas.width as f64,
        (row as f64 + 0.5) * viewport.height / canvas.height as f64,
    )
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Compose one complete frame.
pub fn draw_frame(
    canvas: &mut Canvas,
    state: &GameState,
    presentation: &Presentation,
    projection: &Projection,
) {
    match presentation.end_screen {
        Some(screen) if state.status == GameStatus::Ended => {
            draw_end_screen(canvas, screen, state.score, presentation.show_score);
        }
        _ => {
            draw_backdrop(canvas, state, projection);
            draw_bullets(canvas, state, projection);
            draw_entities(canvas, state, projection);
            draw_threat_markers(canvas, state, projection);
            draw_hud(canvas, state);
            draw_fade(canvas, state.fade);
        }
    }

    if let Some(caption) = &presentation.caption {
        draw_caption(canvas, caption);
    }
    if presentation.show_logo {
        draw_logo(canvas, state.frame);
    }
}

/// Flush a composed frame to the terminal.
pub fn render<W: Write>(out: &mut W, canvas: &Canvas) -> std::io::Result<()> {
    let mut fg = None;
    let mut bg = None;
    for row in 0..canvas.height {
        out.queue(cursor::MoveTo(0, row))?;
        for col in 0..canvas.width {
            let Some(cell) = canvas.cell(col, row) else {
                continue;
            };
            if fg != Some(cell.fg) {
                out.queue(style::SetForegroundColor(cell.fg))?;
                fg = Some(cell.fg);
            }
            if bg != Some(cell.bg) {
                out.queue(style::SetBackgroundColor(cell.bg))?;
                bg = Some(cell.bg);
            }
            out.queue(Print(cell.ch))?;
        }
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, canvas.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Background where no world is visible; flashes green with the muzzle.
pub fn clear_color(pew: u32) -> Color {
    let pew = pew as f64;
    rgb(
        (pew * 1.5).min(255.0) as u8,
        (62.0 + pew * 4.0).min(255.0) as u8,
        (pew * 1.5).min(255.0) as u8,
    )
}

/// The procedural "internet" painted over the world plane.
pub fn sample_backdrop(x: f64, y: f64) -> Option<Color> {
    if !(0.0..WORLD_SIZE).contains(&x) || !(0.0..WORLD_SIZE).contains(&y) {
        return None;
    }
    let centre = WORLD_SIZE / 2.0;
    if (x - centre).abs() < 5.0 && (y - centre).abs() < 5.0 {
        return Some(C_ORIGIN);
    }

    let (tx, ty) = ((x / TILE).floor(), (y / TILE).floor());
    if x - tx * TILE < CABLE || y - ty * TILE < CABLE {
        return Some(C_CABLE);
    }
    let shade = tile_hash(tx as u64, ty as u64) % C_TILES.len() as u64;
    Some(C_TILES[shade as usize])
}

fn tile_hash(tx: u64, ty: u64) -> u64 {
    // splitmix64 finaliser over both coordinates
    let mut z = tx.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ ty.wrapping_add(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn draw_backdrop(canvas: &mut Canvas, state: &GameState, projection: &Projection) {
    let clear = clear_color(state.pew);
    let viewport = projection.viewport();
    canvas.clear(clear);
    for row in 0..canvas.height {
        for col in 0..canvas.width {
            let p = cell_center(canvas, viewport, col, row);
            if let Some(bg) = projection
                .screen_to_world(p.x, p.y)
                .and_then(|w| sample_backdrop(w.x, w.y))
            {
                canvas.paint(col as i32, row as i32, bg);
            }
        }
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_bullets(canvas: &mut Canvas, state: &GameState, projection: &Projection) {
    let viewport = projection.viewport();
    for (_, bullet) in state
        .pool
        .iter_active()
        .filter(|(_, e)| e.kind() == EntityKind::Bullet)
    {
        let p = projection.world_to_screen(bullet.x, bullet.y);
        if p.in_front() && viewport.contains(p.pos) {
            let (col, row) = to_cell(canvas, viewport, p.pos);
            canvas.put(col, row, '▪', C_BULLET);
        }
    }
}

fn glyph(kind: EntityKind) -> (char, Color) {
    match kind {
        EntityKind::Enemy => ('T', C_ENEMY),
        EntityKind::User => ('u', C_USER),
        EntityKind::Message => ('m', C_MESSAGE),
        EntityKind::Fake => ('F', C_FAKE),
        EntityKind::Explosion => ('*', C_EXPLOSION),
        EntityKind::Bullet => ('▪', C_BULLET),
    }
}

fn draw_entities(canvas: &mut Canvas, state: &GameState, projection: &Projection) {
    let viewport = projection.viewport();
    for (_, entity) in state.pool.iter_active() {
        let kind = entity.kind();
        if kind == EntityKind::Bullet {
            continue;
        }
        let p = projection.world_to_screen(entity.x, entity.y);
        if !p.in_front() || !viewport.contains(p.pos) {
            continue;
        }
        let (col, row) = to_cell(canvas, viewport, p.pos);
        let (ch, color) = glyph(kind);
        canvas.put(col, row, ch, color);

        if let EntityState::Explosion { score, .. } = entity.state {
            // Shadow layer is the cell background under the text
            let label = format!("{:+}", score);
            let width = label.chars().count() as i32;
            let left = col - width / 2;
            let color = if score >= 0 { C_GAIN } else { C_LOSS };
            for i in 0..width {
                canvas.paint(left + i, row - 1, C_SHADOW);
            }
            canvas.print(left, row - 1, &label, color);
        }
    }
}

fn draw_threat_markers(canvas: &mut Canvas, state: &GameState, projection: &Projection) {
    let viewport = projection.viewport();
    let last_col = canvas.width as i32 - 1;
    let last_row = canvas.height as i32 - 1;
    for (_, entity) in state
        .pool
        .iter_active()
        .filter(|(_, e)| e.kind().is_hostile())
    {
        let Some(corner) = projection.threat_marker(entity.x, entity.y) else {
            continue;
        };
        let centre = corner + DVec2::splat(MARKER_SIZE / 2.0);
        let (col, row) = to_cell(canvas, viewport, centre);
        let (col, row) = (col.clamp(0, last_col), row.clamp(0, last_row));
        let (_, color) = glyph(entity.kind());
        canvas.put(col, row, '!', C_TEXT);
        canvas.paint(col, row, color);
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_hud(canvas: &mut Canvas, state: &GameState) {
    let w = canvas.width as i32;
    let h = canvas.height as i32;

    // Car and escort ride at a fixed spot, three quarters down
    let car_col = w / 2;
    let car_row = h * 3 / 4;
    canvas.put(car_col, car_row, '▲', C_CAR);
    canvas.put(car_col + 2, car_row, 'P', C_ESCORT);
    if state.escort == EscortPose::Ban {
        canvas.put(car_col + 3, car_row, '╤', C_ESCORT);
    }

    // Score, left
    canvas.print(1, 0, &format!("SCORE {:>+7}", state.score), C_HUD_SCORE);

    // Fake gauge, right
    let filled = (state.fake_counter.clamp(0, FAKE_LIMIT) * GAUGE_CELLS) / FAKE_LIMIT;
    let gauge_color = match state.fake_counter {
        n if n < FAKE_LIMIT / 2 => C_GAIN,
        n if n < FAKE_LIMIT * 3 / 4 => C_HUD_SCORE,
        _ => C_LOSS,
    };
    let readout = format!(" {:>2}/{}", state.fake_counter, FAKE_LIMIT);
    let label = "FAKE [";
    let total = label.len() as i32 + GAUGE_CELLS + 1 + readout.len() as i32;
    let mut col = w - total - 1;
    canvas.print(col, 0, label, C_TEXT);
    col += label.len() as i32;
    for i in 0..GAUGE_CELLS {
        if i < filled {
            canvas.put(col + i, 0, '█', gauge_color);
        } else {
            canvas.put(col + i, 0, '-', C_GAUGE_EMPTY);
        }
    }
    col += GAUGE_CELLS;
    canvas.put(col, 0, ']', C_TEXT);
    canvas.print(col + 1, 0, &readout, gauge_color);
}

/// Full-screen fade from black; `fade` is the overlay opacity out of 255.
fn draw_fade(canvas: &mut Canvas, fade: u32) {
    if fade == 0 {
        return;
    }
    let keep = 1.0 - fade.min(255) as f64 / 255.0;
    canvas.darken(keep);
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// Greedy word wrap to `width` columns.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn draw_caption(canvas: &mut Canvas, caption: &Caption) {
    let w = canvas.width as i32;
    let h = canvas.height as i32;
    if w < 8 || h < 5 {
        return;
    }
    let top = h - 4;
    for row in top..h {
        for col in 0..w {
            canvas.put(col, row, ' ', C_TEXT);
            canvas.paint(col, row, C_CAPTION_BG);
        }
    }

    let inner = (w - 4) as usize;
    let name = format!(" {} ", caption.speaker.name());
    let rule = "─".repeat(inner.saturating_sub(name.chars().count()));
    canvas.print(0, top, &format!("┌─{}{}─┐", name, rule), C_CAPTION_BORDER);
    canvas.print(2, top, &name, C_SPEAKER);
    canvas.print(0, h - 1, &format!("└{}┘", "─".repeat(inner + 2)), C_CAPTION_BORDER);

    for (i, line) in wrap(&caption.text, inner).iter().take(2).enumerate() {
        let row = top + 1 + i as i32;
        canvas.put(0, row, '│', C_CAPTION_BORDER);
        canvas.print(2, row, line, C_TEXT);
        canvas.put(w - 1, row, '│', C_CAPTION_BORDER);
    }
    for row in top + 1..h - 1 {
        canvas.put(0, row, '│', C_CAPTION_BORDER);
        canvas.put(w - 1, row, '│', C_CAPTION_BORDER);
    }
}

fn draw_logo(canvas: &mut Canvas, frame: u64) {
    let bob = ((frame as f64 / 10.0).sin() * 1.5).round() as i32;
    let top = canvas.height as i32 / 3 + bob;
    for (i, line) in LOGO.iter().enumerate() {
        let left = (canvas.width as i32 - line.chars().count() as i32) / 2;
        canvas.print(left, top + i as i32, line, C_LOGO);
    }
}

// ── End screen ────────────────────────────────────────────────────────────────

const ART_BLACKOUT: &[&str] = &["┌────────────────┐", "│   NO  SIGNAL   │", "└────────────────┘"];
const ART_FLOOD: &[&str] = &[
    "FAKE FAKE FAKE FAKE FAKE FAKE",
    "  FAKE FAKE FAKE FAKE FAKE   ",
    "FAKE FAKE FAKE FAKE FAKE FAKE",
    "  FAKE FAKE FAKE FAKE FAKE   ",
];
const ART_SILENCE: &[&str] = &["the net is quiet now", "", "thanks for patrolling"];

/// Background, ink and art for each end screen.
fn end_art(screen: EndScreen) -> (Color, Color, &'static [&'static str]) {
    match screen {
        EndScreen::Blackout => (C_BLACK, rgb(200, 30, 30), ART_BLACKOUT),
        EndScreen::Flood => (rgb(40, 0, 40), C_FAKE, ART_FLOOD),
        EndScreen::Silence => (rgb(12, 12, 12), rgb(150, 150, 150), ART_SILENCE),
    }
}

/// 3×5 block glyphs for the final score.
fn big_glyph(ch: char) -> [&'static str; 5] {
    match ch {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => [" █ ", "██ ", " █ ", " █ ", "███"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        '-' => ["   ", "   ", "███", "   ", "   "],
        _ => ["   ", "   ", "   ", "   ", "   "],
    }
}

fn draw_end_screen(canvas: &mut Canvas, screen: EndScreen, score: i64, show_score: bool) {
    let (bg, fg, art) = end_art(screen);
    canvas.clear(bg);
    let w = canvas.width as i32;
    let h = canvas.height as i32;

    let top = h / 4;
    for (i, line) in art.iter().enumerate() {
        let left = (w - line.chars().count() as i32) / 2;
        canvas.print(left, top + i as i32, line, fg);
    }

    if !show_score {
        return;
    }
    let label = "FINAL SCORE";
    let label_row = top + art.len() as i32 + 2;
    canvas.print((w - label.len() as i32) / 2, label_row, label, C_HUD_SCORE);

    let digits = score.to_string();
    let width = digits.chars().count() as i32 * 4 - 1;
    let left = (w - width) / 2;
    for (i, ch) in digits.chars().enumerate() {
        for (row, strip) in big_glyph(ch).iter().enumerate() {
            canvas.print(
                left + i as i32 * 4,
                label_row + 2 + row as i32,
                strip,
                C_HUD_SCORE,
            );
        }
    }
    // Plain readout as well, for narrow terminals
    canvas.print(
        (w - digits.len() as i32) / 2,
        label_row + 8,
        &digits,
        C_HUD_SCORE,
    );
}

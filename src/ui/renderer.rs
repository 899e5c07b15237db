/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer (a grid of Cells)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Emit terminal commands only for cells that changed, batched with `queue!`
///   4. Swap front/back
///
/// The 900 x 500 world is stretched onto a `FieldView`, a rectangle of
/// terminal cells recomputed on every resize. The same view maps mouse
/// cells back to field fractions for pointer input.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Faller, FallerKind};
use crate::domain::geometry::{Rect, FLOOR_H, FLOOR_TOP, WORLD_H, WORLD_W};
use crate::domain::levels::Backdrop;
use crate::sim::world::{Phase, WorldState};

type Rgb = (u8, u8, u8);

const BASE_BG: Rgb = (16, 14, 30);
const PANEL_BG: Rgb = (28, 24, 56);
const JUP_GREEN: Rgb = (199, 242, 132);
const JUP_TEAL: Rgb = (56, 214, 196);
const RUG_RED: Rgb = (220, 70, 90);
const TEXT: Rgb = (235, 235, 245);
const DIM: Rgb = (120, 120, 140);
const CAT_TINT: Rgb = (245, 170, 60);

#[inline]
fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

/// Linear blend from `a` (t = 0) to `b` (t = 1).
fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let ch = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    (ch(a.0, b.0), ch(a.1, b.1), ch(a.2, b.2))
}

/// Terminal columns a char occupies. Covers the emoji this game prints.
fn char_cols(c: char) -> usize {
    match c as u32 {
        0x200D | 0xFE00..=0xFE0F => 0,
        0x1F000..=0x1FAFF | 0x26A1 | 0x26FD | 0x274C | 0x2B50 => 2,
        _ => 1,
    }
}

fn text_cols(s: &str) -> usize {
    s.chars().map(char_cols).sum()
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // occupies 2 terminal columns
    cont: bool, // right half of a wide char (never printed)
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Color::Rgb { r: BASE_BG.0, g: BASE_BG.1, b: BASE_BG.2 },
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell { ch: [0; 4], ch_len: 0, cont: true, ..Cell::BLANK };

    /// Never produced by composition, so a back buffer full of these
    /// forces a complete repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    fn new(c: char, fg: Rgb, bg: Rgb) -> Self {
        let mut cell = Cell { fg: rgb(fg), bg: rgb(bg), ..Cell::BLANK };
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.wide = char_cols(c) == 2;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write text starting at (x, y). Wide chars take two cells and are
    /// dropped rather than split at the right edge.
    fn put_text(&mut self, x: usize, y: usize, s: &str, fg: Rgb, bg: Rgb) {
        let mut cx = x;
        for ch in s.chars() {
            let cols = char_cols(ch);
            if cols == 0 { continue; }
            if cx + cols > self.width { break; }
            self.set(cx, y, Cell::new(ch, fg, bg));
            if cols == 2 {
                self.set(cx + 1, y, Cell::WIDE_CONT);
            }
            cx += cols;
        }
    }

    /// Text centred on column `mid`.
    fn put_centered(&mut self, mid: usize, y: usize, s: &str, fg: Rgb, bg: Rgb) {
        let x = mid.saturating_sub(text_cols(s) / 2);
        self.put_text(x, y, s, fg, bg);
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Rgb) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::new(' ', TEXT, bg));
            }
        }
    }
}

// ── FieldView: world units ↔ terminal cells ──

const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 2;
const FOOTER_ROWS: usize = 2;
const MAX_FIELD_COLS: usize = 120;
const MAX_FIELD_ROWS: usize = 36;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FieldView {
    col0: usize,
    row0: usize,
    cols: usize,
    rows: usize,
}

impl FieldView {
    fn fit(term_w: usize, term_h: usize) -> Self {
        let cols = term_w.clamp(1, MAX_FIELD_COLS);
        let rows = term_h.saturating_sub(FIELD_ROW + FOOTER_ROWS).clamp(1, MAX_FIELD_ROWS);
        FieldView { col0: term_w.saturating_sub(cols) / 2, row0: FIELD_ROW, cols, rows }
    }

    fn col_of(&self, wx: f32) -> usize {
        let f = (wx / WORLD_W).clamp(0.0, 1.0);
        self.col0 + ((f * self.cols as f32) as usize).min(self.cols - 1)
    }

    /// `None` above or below the field (fallers spawn above it).
    fn row_of(&self, wy: f32) -> Option<usize> {
        if !(0.0..WORLD_H).contains(&wy) {
            return None;
        }
        Some(self.row0 + ((wy / WORLD_H * self.rows as f32) as usize).min(self.rows - 1))
    }

    /// Inclusive (columns, rows) a world box covers, clipped to the field.
    /// `None` when the box is entirely above or below it.
    fn cells_of(&self, r: &Rect) -> Option<((usize, usize), (usize, usize))> {
        let top = self.row_of(r.top().max(0.0))?;
        let bottom = self.row_of(r.bottom().min(WORLD_H - 0.01))?;
        Some(((self.col_of(r.left()), self.col_of(r.right())), (top, bottom)))
    }

    fn mid_col(&self) -> usize {
        self.col0 + self.cols / 2
    }

    /// Cell centre as (fx, fy) fractions of the field, or `None` outside it.
    fn fraction(&self, col: usize, row: usize) -> Option<(f32, f32)> {
        let inside = (self.col0..self.col0 + self.cols).contains(&col)
            && (self.row0..self.row0 + self.rows).contains(&row);
        if !inside {
            return None;
        }
        Some((
            ((col - self.col0) as f32 + 0.5) / self.cols as f32,
            ((row - self.row0) as f32 + 0.5) / self.rows as f32,
        ))
    }
}

// ── Backdrops ──

struct Palette {
    sky_top: Rgb,
    sky_bottom: Rgb,
    skyline: Rgb,
    window: Rgb,
}

fn palette(b: Backdrop) -> Palette {
    match b {
        Backdrop::Petronas => Palette {
            sky_top: (12, 16, 48), sky_bottom: (70, 50, 110),
            skyline: (60, 66, 92), window: (250, 220, 140),
        },
        Backdrop::Batu => Palette {
            sky_top: (20, 44, 60), sky_bottom: (120, 150, 130),
            skyline: (56, 84, 60), window: (230, 190, 70),
        },
        Backdrop::Merdeka => Palette {
            sky_top: (40, 90, 160), sky_bottom: (170, 200, 230),
            skyline: (120, 70, 60), window: (245, 235, 200),
        },
        Backdrop::Bukit => Palette {
            sky_top: (30, 6, 40), sky_bottom: (110, 30, 90),
            skyline: (40, 30, 60), window: (255, 80, 200),
        },
    }
}

/// Silhouette height at horizontal fraction `fx`, as a fraction of the
/// field height measured up from the bottom edge.
fn skyline(b: Backdrop, fx: f32) -> f32 {
    match b {
        Backdrop::Petronas => {
            let tower = |centre: f32| -> f32 {
                let d = (fx - centre).abs();
                if d < 0.005 { 0.92 } else if d < 0.02 { 0.78 } else if d < 0.035 { 0.7 } else { 0.0 }
            };
            let low = 0.2 + 0.06 * (fx * 41.0).sin().abs();
            tower(0.4).max(tower(0.6)).max(low)
        }
        Backdrop::Batu => {
            let hill = 0.62 - (fx - 0.55).abs() * 1.1;
            let statue = if (0.22..0.26).contains(&fx) { 0.45 } else { 0.0 };
            hill.max(statue).max(0.12)
        }
        Backdrop::Merdeka => {
            if (fx - 0.78).abs() < 0.003 {
                0.8
            } else if (fx - 0.5).abs() < 0.005 {
                0.7
            } else if (fx - 0.5).abs() < 0.03 {
                0.6
            } else if (0.3..0.7).contains(&fx) {
                0.38
            } else {
                0.15
            }
        }
        Backdrop::Bukit => {
            let block = (fx / 0.06) as u32;
            0.25 + (block.wrapping_mul(7919) % 23) as f32 / 23.0 * 0.35
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    field: FieldView,
    /// START button on the home screen, in cell coordinates.
    start_button: Option<Rect>,
    /// Set by `init` when the terminal reports key releases.
    pub keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            field: FieldView::fit(0, 0),
            start_button: None,
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            SetBackgroundColor(rgb(BASE_BG)),
            Clear(ClearType::All)
        )?;

        self.keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.keyboard_enhanced {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        tracing::debug!(keyboard_enhanced = self.keyboard_enhanced, "terminal ready");

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.apply_size(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn apply_size(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
        self.field = FieldView::fit(w, h);
    }

    /// Map a mouse cell to (fx, fy) fractions of the play field.
    pub fn screen_to_field(&self, col: u16, row: u16) -> Option<(f32, f32)> {
        self.field.fraction(col as usize, row as usize)
    }

    pub fn start_button_hit(&self, col: u16, row: u16) -> bool {
        self.start_button
            .map_or(false, |b| b.contains(col as f32 + 0.5, row as f32 + 0.5))
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.apply_size(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(rgb(BASE_BG)), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.start_button = None;

        match world.phase {
            Phase::Home => self.compose_home(world),
            Phase::Playing => self.compose_game(world),
            Phase::GameOver | Phase::RouteCompleted => {
                self.compose_game(world);
                self.compose_end_overlay(world);
            }
        }

        if world.paused {
            self.compose_pause_overlay(world);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = rgb(BASE_BG);
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                if cell.cont {
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide && self.front.get(x + 1, y) != self.back.get(x + 1, y);
                if cell == self.back.get(x, y) && !cont_changed {
                    x += 1;
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.as_str()))?;

                x += if cell.wide { 2 } else { 1 };
                cursor_at = Some((x, y));
            }
        }

        self.writer.flush()
    }

    // ── Home ──

    fn compose_home(&mut self, w: &WorldState) {
        let mid = self.term_w / 2;
        let top = self.term_h.saturating_sub(20) / 2;

        let box_w = 44.min(self.term_w);
        let box_x = mid.saturating_sub(box_w / 2);
        self.front.fill(box_x, top, box_w, 3, PANEL_BG);
        self.front.put_centered(mid, top + 1, "JUPIKL 🪐", JUP_GREEN, PANEL_BG);

        self.front.put_centered(mid, top + 4, "A Jupiter-inspired game", TEXT, BASE_BG);
        self.front.put_centered(mid, top + 5, "exploring Kuala Lumpur routes", TEXT, BASE_BG);

        let bullets = ["🪐 Find the best route", "⚡ Speed + liquidity", "❌ Avoid rugs"];
        let bullet_x = mid.saturating_sub(11);
        for (i, line) in bullets.iter().enumerate() {
            self.front.put_text(bullet_x, top + 7 + i, line, JUP_TEAL, BASE_BG);
        }

        // START button
        let label = "▶ START GAME";
        let btn_w = text_cols(label) + 6;
        let btn_x = mid.saturating_sub(btn_w / 2);
        let btn_y = top + 11;
        let blink = (w.anim_tick / 30) % 2 == 0;
        let btn_bg = if blink { JUP_GREEN } else { mix(JUP_GREEN, JUP_TEAL, 0.5) };
        self.front.fill(btn_x, btn_y, btn_w, 3, btn_bg);
        self.front.put_centered(btn_x + btn_w / 2, btn_y + 1, label, BASE_BG, btn_bg);
        self.start_button = Some(Rect::new(
            btn_x as f32 + btn_w as f32 / 2.0,
            btn_y as f32 + 1.5,
            btn_w as f32,
            3.0,
        ));

        let best = format!("Best: {}", w.best_score);
        self.front.put_centered(mid, btn_y + 4, &best, TEXT, BASE_BG);
        self.front.put_centered(mid, btn_y + 6, "ENTER or click START   ·   Q quit", DIM, BASE_BG);

        let footer_row = self.term_h.saturating_sub(1);
        if footer_row > btn_y + 6 {
            self.front.put_centered(mid, footer_row, "Built by lhajsol", DIM, BASE_BG);
        }
    }

    // ── Play field ──

    fn compose_game(&mut self, w: &WorldState) {
        self.compose_hud(w);
        self.compose_backdrop(w.level().backdrop);
        self.compose_floor();

        for f in w.coins.iter().chain(w.rugs.iter()) {
            self.compose_faller(f);
        }
        self.compose_cat(w);

        if let Some(toast) = &w.comment {
            self.compose_comment(w.level().backdrop, &toast.text, toast.alpha());
        }

        let help_row = self.field.row0 + self.field.rows + 1;
        if help_row < self.term_h {
            let help = " ←→/AD walk  ↑/W/Space jump  P pause  Esc home  │  mouse: sides walk, bottom jumps";
            self.front.put_text(self.field.col0, help_row, help, DIM, BASE_BG);
        }
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let hud = format!(
            " JUP: {:<4} {} / {}   {}   Best: {}",
            w.score,
            w.level_coins,
            w.tuning.coins_per_level,
            w.level().name,
            w.best_score,
        );
        self.front.fill(0, HUD_ROW, self.term_w, 1, PANEL_BG);
        self.front.put_text(self.field.col0, HUD_ROW, &hud, JUP_GREEN, PANEL_BG);
    }

    fn sky_at(pal: &Palette, fy: f32) -> Rgb {
        mix(pal.sky_top, pal.sky_bottom, fy)
    }

    fn compose_backdrop(&mut self, backdrop: Backdrop) {
        let pal = palette(backdrop);
        let v = self.field;
        for r in 0..v.rows {
            let fy = (r as f32 + 0.5) / v.rows as f32;
            for c in 0..v.cols {
                let fx = (c as f32 + 0.5) / v.cols as f32;
                let cell = if fy >= 1.0 - skyline(backdrop, fx) {
                    let lit = c % 3 == 1 && r % 2 == 0 && backdrop != Backdrop::Batu;
                    Cell::new(if lit { '·' } else { ' ' }, pal.window, pal.skyline)
                } else {
                    Cell::new(' ', TEXT, Self::sky_at(&pal, fy))
                };
                self.front.set(v.col0 + c, v.row0 + r, cell);
            }
        }
    }

    fn compose_floor(&mut self) {
        let v = self.field;
        let (Some(top), Some(bottom)) = (v.row_of(FLOOR_TOP), v.row_of(FLOOR_TOP + FLOOR_H)) else {
            return;
        };
        let floor = (90, 80, 120);
        for row in top..=bottom {
            for col in v.col0..v.col0 + v.cols {
                let ch = if row == top { '▀' } else { ' ' };
                self.front.set(col, row, Cell::new(ch, JUP_TEAL, floor));
            }
        }
        // Ground below the floor
        for row in bottom + 1..v.row0 + v.rows {
            for col in v.col0..v.col0 + v.cols {
                self.front.set(col, row, Cell::new(' ', TEXT, (40, 34, 60)));
            }
        }
    }

    /// Wide glyph centred on a world point; keeps the existing background.
    fn put_sprite(&mut self, glyph: char, wx: f32, wy: f32) {
        let Some(row) = self.field.row_of(wy) else { return };
        let v = self.field;
        let col = self.field.col_of(wx).min(v.col0 + v.cols.saturating_sub(2));
        let bg = self.front.get(col, row).bg;
        let mut cell = Cell::new(glyph, TEXT, BASE_BG);
        cell.bg = bg;
        self.front.set(col, row, cell);
        self.front.set(col + 1, row, Cell { bg, ..Cell::WIDE_CONT });
    }

    fn compose_faller(&mut self, f: &Faller) {
        match f.kind {
            FallerKind::Coin => self.put_sprite('🪙', f.x, f.y),
            FallerKind::Rug => {
                let Some(((from, to), (top, bottom))) = self.field.cells_of(&f.rect()) else { return };
                for row in top..=bottom {
                    for col in from..=to {
                        let ch = if (col + row - from) % 2 == 0 { '▚' } else { '▞' };
                        self.front.set(col, row, Cell::new(ch, (255, 200, 120), RUG_RED));
                    }
                }
            }
        }
    }

    /// The cat's whole hitbox is tinted so contacts line up with what is drawn.
    fn compose_cat(&mut self, w: &WorldState) {
        let p = &w.player;
        if let Some(((from, to), (top, bottom))) = self.field.cells_of(&p.rect()) {
            for row in top..=bottom {
                for col in from..=to {
                    let bg = match self.front.get(col, row).bg {
                        Color::Rgb { r, g, b } => mix((r, g, b), CAT_TINT, 0.45),
                        _ => CAT_TINT,
                    };
                    self.front.set(col, row, Cell::new(' ', TEXT, bg));
                }
            }
        }
        let glyph = if p.on_ground { '🐱' } else { '🐈' };
        self.put_sprite(glyph, p.x, p.y);
    }

    fn compose_comment(&mut self, backdrop: Backdrop, text: &str, alpha: f32) {
        if alpha <= 0.05 { return; }
        let v = self.field;
        let row = v.row0 + v.rows / 5;
        let fy = (row - v.row0) as f32 / v.rows as f32;
        let sky = Self::sky_at(&palette(backdrop), fy);
        let bg = mix(sky, PANEL_BG, alpha);
        let fg = mix(sky, JUP_GREEN, alpha);

        let label = format!("  {}  ", text);
        let width = text_cols(&label);
        self.front.fill(v.mid_col().saturating_sub(width / 2), row, width, 1, bg);
        self.front.put_centered(v.mid_col(), row, &label, fg, bg);
    }

    // ── Overlays ──

    fn compose_panel(&mut self, lines: &[(&str, Rgb)]) {
        let v = self.field;
        let box_w = lines.iter().map(|(l, _)| text_cols(l)).max().unwrap_or(0) + 8;
        let box_h = lines.len() + 2;
        let box_x = v.mid_col().saturating_sub(box_w / 2);
        let box_y = v.row0 + v.rows.saturating_sub(box_h) / 2;
        self.front.fill(box_x, box_y, box_w, box_h, PANEL_BG);
        for (i, (line, fg)) in lines.iter().enumerate() {
            self.front.put_centered(v.mid_col(), box_y + 1 + i, line, *fg, PANEL_BG);
        }
    }

    fn compose_end_overlay(&mut self, w: &WorldState) {
        let (title, colour) = if w.phase == Phase::RouteCompleted {
            ("ROUTE COMPLETED 🪐", JUP_GREEN)
        } else {
            ("GAME OVER", RUG_RED)
        };
        let score = format!("JUP collected: {}", w.score);
        let best = format!("Best: {}", w.best_score);
        self.compose_panel(&[
            (title, colour),
            ("", TEXT),
            (score.as_str(), TEXT),
            (best.as_str(), TEXT),
            ("", TEXT),
            ("ENTER retry   ·   Esc home", DIM),
        ]);
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let blink = (w.anim_tick / 20) % 2 == 0;
        let title = if blink { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        self.compose_panel(&[
            (title, JUP_GREEN),
            ("", TEXT),
            ("P / F1  resume", JUP_TEAL),
            ("Esc     back to home", JUP_TEAL),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_take_two_columns() {
        assert_eq!(text_cols("JUPIKL 🪐"), 9);
        assert_eq!(text_cols("⚡ Speed"), 8);
        assert_eq!(text_cols("abc"), 3);
    }

    #[test]
    fn mix_blends_channels() {
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 0.0), (0, 0, 0));
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 1.0), (200, 100, 50));
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 3.0), (200, 100, 50));
    }

    #[test]
    fn field_is_capped_and_centred() {
        let v = FieldView::fit(200, 60);
        assert_eq!(v.cols, MAX_FIELD_COLS);
        assert_eq!(v.col0, 40);
        assert_eq!(v.rows, MAX_FIELD_ROWS);

        let small = FieldView::fit(80, 24);
        assert_eq!((small.col0, small.cols, small.rows), (0, 80, 20));
    }

    #[test]
    fn world_maps_into_field() {
        let v = FieldView::fit(100, 24);
        assert_eq!(v.col_of(0.0), 0);
        assert_eq!(v.col_of(WORLD_W), 99);
        assert_eq!(v.row_of(-30.0), None);
        assert_eq!(v.row_of(0.0), Some(FIELD_ROW));
        assert_eq!(v.row_of(WORLD_H - 1.0), Some(FIELD_ROW + v.rows - 1));
    }

    #[test]
    fn cat_box_spans_its_hitbox() {
        use crate::domain::entity::{Player, CAT_START};

        let v = FieldView::fit(120, 40);
        let p = Player::standing_at(CAT_START.0);
        let ((from, to), (top, bottom)) = v.cells_of(&p.rect()).unwrap();
        assert_eq!((from, to), (v.col_of(p.rect().left()), v.col_of(p.rect().right())));
        assert!(to - from + 1 >= 7);
        assert!((from..=to).contains(&v.col_of(p.x)));
        assert!(bottom > top);
        assert_eq!(Some(bottom), v.row_of(FLOOR_TOP - 0.01));
    }

    #[test]
    fn boxes_outside_the_field_have_no_cells() {
        let v = FieldView::fit(120, 40);
        assert_eq!(v.cells_of(&Rect::new(300.0, -60.0, 70.0, 40.0)), None);
        // half-spawned rug is clipped to the top row
        let ((_, _), (top, bottom)) = v.cells_of(&Rect::new(300.0, -5.0, 70.0, 40.0)).unwrap();
        assert_eq!((top, bottom), (FIELD_ROW, v.row_of(15.0).unwrap()));
    }

    #[test]
    fn mouse_fractions_cover_the_field() {
        let v = FieldView::fit(100, 24);
        assert_eq!(v.fraction(0, 0), None);
        let (fx, fy) = v.fraction(0, FIELD_ROW).unwrap();
        assert!(fx < 0.01 && fy < 0.05);
        let (fx, fy) = v.fraction(99, FIELD_ROW + v.rows - 1).unwrap();
        assert!(fx > 0.99 && fy > 0.95);
        assert_eq!(v.fraction(100, FIELD_ROW), None);
    }

    #[test]
    fn wide_text_is_not_split_at_the_edge() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.put_text(0, 0, "a🪐b", TEXT, BASE_BG);
        assert_eq!(buf.get(0, 0).as_str(), "a");
        assert!(buf.get(1, 0).wide);
        assert!(buf.get(2, 0).cont);

        let mut buf = FrameBuffer::new(2, 1);
        buf.put_text(1, 0, "🪐", TEXT, BASE_BG);
        assert!(!buf.get(1, 0).wide);
    }

    #[test]
    fn skylines_stay_inside_the_field() {
        for b in [Backdrop::Petronas, Backdrop::Batu, Backdrop::Merdeka, Backdrop::Bukit] {
            for i in 0..=100 {
                let h = skyline(b, i as f32 / 100.0);
                assert!((0.0..1.0).contains(&h), "{b:?} at {i}: {h}");
            }
        }
    }
}

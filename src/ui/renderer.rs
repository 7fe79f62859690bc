/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (a grid of Cells)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// World → screen mapping: the playfield occupies every row between the HUD
/// and the help bar. World x scales to columns, and the camera window
/// (`camera.y .. camera.y + arena.height`) scales to rows, bottom row =
/// bottom of the window.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::PlatformKind;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for menu/game-over screens and chrome.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 30 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position gets diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

/// Sky colors by score stage, one per 100 points, cycling through four.
const SKY: [Color; 4] = [
    Color::Rgb { r: 204, g: 230, b: 255 },
    Color::Rgb { r: 230, g: 204, b: 230 },
    Color::Rgb { r: 230, g: 230, b: 179 },
    Color::Rgb { r: 179, g: 230, b: 179 },
];

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const PLAYER_FG: Color = Color::Rgb { r: 230, g: 26, b: 26 };
const STATIC_FG: Color = Color::Rgb { r: 128, g: 64, b: 0 };
const MOVING_FG: Color = Color::Rgb { r: 102, g: 102, b: 230 };
const BREAKABLE_FG: Color = Color::Rgb { r: 204, g: 128, b: 128 };
const POWERUP_FG: Color = Color::Rgb { r: 255, g: 204, b: 51 };

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
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
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
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::Menu => self.compose_menu(world),
            Phase::Playing => self.compose_playing(world),
            Phase::GameOver => self.compose_game_over(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                let mut tmp = [0u8; 4];
                queue!(self.writer, Print(&*cell.ch.encode_utf8(&mut tmp)))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── World → screen mapping ──

    fn field_rows(&self) -> usize {
        // One HUD row on top, one help row at the bottom
        self.term_h.saturating_sub(MAP_ROW + 1).max(1)
    }

    /// Terminal column of a world x. May exceed the buffer; `set` clips.
    fn col_of(&self, world: &WorldState, x: f32) -> i32 {
        (x / world.arena.width * self.term_w as f32).round() as i32
    }

    /// Terminal row of a world y, or None when outside the camera window.
    fn row_of(&self, world: &WorldState, y: f32) -> Option<usize> {
        let rows = self.field_rows();
        let rel = (y - world.camera.y) / world.arena.height; // 0 bottom, 1 top
        let row = ((1.0 - rel) * (rows - 1) as f32).round() as i32 + MAP_ROW as i32;
        if row >= MAP_ROW as i32 && row < (MAP_ROW + rows) as i32 {
            Some(row as usize)
        } else {
            None
        }
    }

    fn fill_span(&mut self, row: usize, c0: i32, c1: i32, ch: char, fg: Color, bg: Color) {
        if c1 < c0 {
            return;
        }
        for col in c0.max(0)..=c1 {
            self.front.set(col as usize, row, Cell { ch, fg, bg });
        }
    }

    // ── Compose: playing ──

    fn compose_playing(&mut self, w: &WorldState) {
        let sky = SKY[w.stage() as usize];
        let rows = self.field_rows();

        // Sky fill
        for row in MAP_ROW..MAP_ROW + rows {
            for col in 0..self.front.width {
                self.front.set(col, row, Cell { ch: ' ', fg: Color::Black, bg: sky });
            }
        }

        // Platforms (broken ones are not drawn)
        for p in &w.platforms {
            let fg = match p.kind {
                PlatformKind::Static => STATIC_FG,
                PlatformKind::Moving { .. } => MOVING_FG,
                PlatformKind::Breakable { broken: true } => continue,
                PlatformKind::Breakable { broken: false } => BREAKABLE_FG,
            };
            if let Some(row) = self.row_of(w, p.y) {
                let c0 = self.col_of(w, p.x - p.half_w());
                let c1 = self.col_of(w, p.x + p.half_w()) - 1;
                self.fill_span(row, c0, c1, '▄', fg, sky);
            }
        }

        // Power-ups
        for pu in w.power_ups.iter().filter(|pu| pu.active) {
            if let Some(row) = self.row_of(w, pu.y) {
                let c0 = self.col_of(w, pu.x - pu.half());
                let c1 = self.col_of(w, pu.x + pu.half()) - 1;
                self.fill_span(row, c0, c1, '◆', POWERUP_FG, sky);
            }
        }

        // Avatar: a filled rect spanning its world extent
        let p = &w.player;
        let c0 = self.col_of(w, p.x - p.half_w());
        let c1 = self.col_of(w, p.x + p.half_w()) - 1;
        let steps = (p.height / 10.0).max(1.0) as u32;
        for i in 0..=steps {
            let y = p.y - p.half_h() + p.height * i as f32 / steps as f32;
            if let Some(row) = self.row_of(w, y) {
                self.fill_span(row, c0, c1, '█', PLAYER_FG, sky);
            }
        }

        // ── HUD row ──
        for x in 0..self.front.width {
            self.front.set(x, HUD_ROW, Cell { ch: ' ', fg: Color::White, bg: HUD_BG });
        }
        let boost = if w.player.boost_active() {
            format!("  SPRING {:>2}", w.player.boost_ticks)
        } else {
            String::new()
        };
        let hud = format!(" Score:{:<7} Best:{:<7}{}", w.score, w.high_score, boost);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Help bar ──
        let help_row = MAP_ROW + rows;
        if help_row < self.front.height {
            let help = " A/D or ◂/▸ steer";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Cell::BASE_BG);
        }
    }

    // ── Compose: menu ──

    fn compose_menu(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        self.front.put_centered(
            mid.saturating_sub(3),
            "S K Y H O P",
            Color::Rgb { r: 51, g: 153, b: 255 },
            Cell::BASE_BG,
        );
        // Blink roughly once a second at 60Hz
        if (w.anim_tick / 30) % 2 == 0 {
            self.front.put_centered(
                mid,
                "Press SPACE to start",
                Color::White,
                Cell::BASE_BG,
            );
        }
        if w.high_score > 0 {
            let best = format!("Best: {}", w.high_score);
            self.front.put_centered(mid + 2, &best, Color::DarkGrey, Cell::BASE_BG);
        }
        if self.front.height > 1 {
            let help_row = self.front.height - 1;
            self.front.put_str(0, help_row, " Q/Esc quit", Color::DarkGrey, Cell::BASE_BG);
        }
    }

    // ── Compose: game over ──

    fn compose_game_over(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        self.front.put_centered(
            mid.saturating_sub(3),
            "G A M E  O V E R",
            Color::Rgb { r: 204, g: 26, b: 26 },
            Cell::BASE_BG,
        );
        let score = format!("Final Score: {}", w.score);
        self.front.put_centered(mid.saturating_sub(1), &score, Color::White, Cell::BASE_BG);
        let best = format!("High Score: {}", w.high_score);
        self.front.put_centered(mid, &best, Color::White, Cell::BASE_BG);

        if w.score > 0 && w.score == w.high_score && (w.anim_tick / 20) % 2 == 0 {
            self.front.put_centered(
                mid + 1,
                "★ NEW HIGH SCORE ★",
                POWERUP_FG,
                Cell::BASE_BG,
            );
        }
        self.front.put_centered(
            mid + 3,
            "R restart  ·  Esc menu",
            Color::DarkGrey,
            Cell::BASE_BG,
        );
    }
}

/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the world; it never mutates game state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Direction;
use crate::domain::tile::Tile;
use crate::sim::outcome::Signal;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
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
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Tile and entity looks ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

fn tile_look(tile: Tile) -> ([char; 2], Color, Color) {
    match tile {
        Tile::Open => ([' ', ' '], Color::Black, Color::Rgb { r: 144, g: 238, b: 144 }),
        Tile::Wall => (['T', ' '], Color::Rgb { r: 26, g: 95, b: 26 }, Color::Rgb { r: 34, g: 139, b: 34 }),
        Tile::Water => (['~', '~'], Color::White, Color::Rgb { r: 65, g: 105, b: 225 }),
        Tile::Path => ([' ', ' '], Color::Black, Color::Rgb { r: 222, g: 184, b: 135 }),
        Tile::Rock => (['[', ']'], Color::Rgb { r: 96, g: 96, b: 96 }, Color::Rgb { r: 128, g: 128, b: 128 }),
        Tile::Start => (['S', ' '], Color::Rgb { r: 0, g: 100, b: 0 }, Color::Rgb { r: 152, g: 251, b: 152 }),
        Tile::Goal => (['G', '*'], Color::Rgb { r: 255, g: 69, b: 0 }, Color::Rgb { r: 255, g: 215, b: 0 }),
    }
}

fn facing_char(dir: Direction) -> char {
    match dir {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

const PLAYER_FG: Color = Color::Rgb { r: 220, g: 20, b: 60 };
const SLIME_FG: Color = Color::Rgb { r: 50, g: 205, b: 50 };

fn signal_message(signal: Signal) -> &'static str {
    match signal {
        Signal::Captured => "GAME OVER! A slime caught you... retrying on a new maze.",
        Signal::Reached => "CONGRATULATIONS! You reached the goal! Generating a new maze.",
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
        // Force full repaint on first frame.
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

    pub fn render<R>(&mut self, world: &WorldState<R>, bgm_on: bool) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Clean slate when a round ends or restarts.
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose_game(world, bgm_on);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
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
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game<R>(&mut self, w: &WorldState<R>, bgm_on: bool) {
        // ── HUD row ──
        let hud = format!(
            " Round {:<3}  X: {}, Y: {}   Caught: {}  Goals: {}  BGM: {} ",
            w.round,
            w.player.x,
            w.player.y,
            w.captures,
            w.goals,
            if bgm_on { "on" } else { "off" },
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Map ──
        for gy in 0..w.grid.height() {
            let row = MAP_ROW + gy;
            if row >= self.front.height {
                break;
            }
            for gx in 0..w.grid.width() {
                let col = gx * CELL_W;
                if col + 1 >= self.front.width {
                    break;
                }
                self.compose_cell(w, gx, gy, col, row);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + w.grid.height() + 1;
        if let Phase::RoundOver(signal) = w.phase {
            let msg = format!(" {}  [Enter] ", signal_message(signal));
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help = " Arrows/WASD:Move  M:BGM  Q/Esc:Quit";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Cell::BASE_BG);
    }

    /// Tile first, then slime, then player on top.
    fn compose_cell<R>(&mut self, w: &WorldState<R>, gx: usize, gy: usize, col: usize, row: usize) {
        let (mut chars, mut fg, bg) = tile_look(w.grid.tile_at(gx, gy));

        if w.slime_at(gx, gy) {
            chars = ['(', ')'];
            fg = SLIME_FG;
        }
        if w.player.x == gx && w.player.y == gy {
            chars = ['@', facing_char(w.player.facing)];
            fg = PLAYER_FG;
        }

        self.front.set(col, row, Cell::new(chars[0], fg, bg));
        self.front.set(col + 1, row, Cell::new(chars[1], fg, bg));
    }
}

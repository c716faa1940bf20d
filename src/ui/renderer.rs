/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame is composed into `front`, compared cell by cell with `back`
/// (the previous frame), and only the changed cells are emitted. All
/// commands are batched with `queue!` and flushed once, then the buffers
/// swap. A map tile is two terminal columns wide.
///
/// Entities are drawn in list order, so later entities paint over
/// earlier ones on the same tile. Terrain sets the background; blocks,
/// units and effects keep whatever background is already there.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{BlockKind, Effect, Entity, EntityKind, Unit};
use crate::domain::position::Direction;
use crate::domain::tile::Terrain;
use crate::sim::world::{Phase, WorldState};

// ── Cell ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, so row gaps on VTE
    /// terminals match the cells around them.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 16, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composition; filling `back` with it forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer ──

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
        if x < self.width && y < self.height { self.cells[y * self.width + x] } else { Cell::BLANK }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Palette ──

const FLOOR_BG: Color = Color::Rgb { r: 34, g: 30, b: 40 };
const WALL_FG: Color = Color::Rgb { r: 110, g: 104, b: 120 };
const WALL_BG: Color = Color::Rgb { r: 60, g: 56, b: 68 };
const DOOR_FG: Color = Color::Rgb { r: 170, g: 110, b: 50 };
const GOAL_FG: Color = Color::Rgb { r: 90, g: 200, b: 110 };
const HUD_FG: Color = Color::Rgb { r: 200, g: 190, b: 160 };
const DIM_FG: Color = Color::Rgb { r: 110, g: 105, b: 100 };
const FIRE_FG: Color = Color::Rgb { r: 255, g: 140, b: 30 };

/// Two characters, a foreground, and a background (None keeps the one below).
type Glyph = ([char; 2], Color, Option<Color>);

fn facing_char(dir: Direction) -> char {
    match dir {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

fn terrain_glyph(t: Terrain) -> Glyph {
    match t {
        Terrain::Floor => ([' ', ' '], DIM_FG, Some(FLOOR_BG)),
        Terrain::Wall => (['█', '█'], WALL_FG, Some(WALL_BG)),
        Terrain::CrackedWall { exploding: false } => (['▓', '▒'], WALL_FG, Some(WALL_BG)),
        Terrain::CrackedWall { exploding: true } => (['*', '*'], FIRE_FG, Some(WALL_BG)),
        Terrain::Door { open: false } => (['#', '#'], DOOR_FG, Some(WALL_BG)),
        Terrain::Door { open: true } => ([':', ':'], DOOR_FG, Some(FLOOR_BG)),
        Terrain::Switch { covered } => {
            let fg = if covered { Color::Yellow } else { Color::DarkYellow };
            (['(', ')'], fg, Some(FLOOR_BG))
        }
        Terrain::Target { .. } => (['·', '·'], GOAL_FG, Some(FLOOR_BG)),
    }
}

fn entity_glyph(e: &Entity) -> Glyph {
    match &e.kind {
        EntityKind::Terrain(t) => terrain_glyph(*t),
        EntityKind::Block(block) => {
            let on_goal = block.covering.is_some();
            match block.kind {
                BlockKind::Stone => {
                    let fg = if on_goal { GOAL_FG } else { Color::Grey };
                    (['[', ']'], fg, None)
                }
                BlockKind::Ice(_) => {
                    let fg = if on_goal { GOAL_FG } else { Color::Cyan };
                    (['{', '}'], fg, None)
                }
                BlockKind::Tnt { exploding: true } => (['*', '*'], FIRE_FG, None),
                BlockKind::Tnt { exploding: false } => (['T', '!'], Color::Red, None),
            }
        }
        EntityKind::Unit(unit) => match unit {
            Unit::Player(_) => (['@', ' '], Color::Yellow, None),
            Unit::Skeleton { facing, .. } => (['S', facing_char(*facing)], Color::White, None),
            Unit::Rogue { facing, .. } => (['R', facing_char(*facing)], Color::Magenta, None),
            Unit::Mage { armed, .. } => (['M', if *armed { '*' } else { ' ' }], Color::Blue, None),
        },
        EntityKind::Effect(Effect::Blood) => ([',', '.'], Color::DarkRed, None),
        EntityKind::Effect(Effect::Explosion { .. }) => (['%', '%'], FIRE_FG, None),
    }
}

// ── Renderer ──

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const HELP: &str = "arrows/wasd move  z undo  r restart  n skip  q quit";

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    last_phase: Option<Phase>,
    last_level: Option<usize>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            last_phase: None,
            last_level: None,
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
        self.front.resize(tw as usize, th as usize);
        self.back.resize(tw as usize, th as usize);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.front.width || th as usize != self.front.height;
        let scene_changed = self.last_phase != Some(world.phase) || self.last_level != Some(world.level_index);
        if resized {
            self.front.resize(tw as usize, th as usize);
            self.back.resize(tw as usize, th as usize);
        }
        if resized || scene_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
            self.last_level = Some(world.level_index);
        }

        self.front.clear();
        compose(&mut self.front, world);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

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
}

// ══════════════════════════════════════════════════════════════
// Composition
// ══════════════════════════════════════════════════════════════

fn compose(buf: &mut FrameBuffer, w: &WorldState) {
    compose_hud(buf, w);
    let map_w = w.bounds.width.max(0) as usize * CELL_W;
    let left = buf.width.saturating_sub(map_w) / 2;
    compose_map(buf, w, left, MAP_ROW);

    let below = MAP_ROW + w.bounds.height.max(0) as usize + 1;
    buf.put_centered(below, HELP, DIM_FG, Cell::BASE_BG);

    let mid = MAP_ROW + w.bounds.height.max(0) as usize / 2;
    match w.phase {
        Phase::Playing => {}
        Phase::PlayerDead => banner(buf, mid, "YOU DIED", "r to restart"),
        Phase::LevelComplete => banner(buf, mid, "LEVEL CLEARED", ""),
        Phase::GameComplete => banner(buf, mid, "THE CRYPT IS SILENT", "every level cleared; q to quit"),
    }
}

fn compose_hud(buf: &mut FrameBuffer, w: &WorldState) {
    let left = format!(" Level {}  {}", w.level_index + 1, w.level_name());
    let right = format!("Moves {} ", w.move_count);
    buf.put_str(0, HUD_ROW, &left, HUD_FG, Cell::BASE_BG);
    let rx = buf.width.saturating_sub(right.chars().count());
    buf.put_str(rx, HUD_ROW, &right, HUD_FG, Cell::BASE_BG);
}

fn compose_map(buf: &mut FrameBuffer, w: &WorldState, left: usize, top: usize) {
    for e in &w.entities {
        let (chars, fg, bg) = entity_glyph(e);
        let col = left + e.pos.x() as usize * CELL_W;
        let row = top + e.pos.y() as usize;
        for (i, ch) in chars.into_iter().enumerate() {
            let under = buf.get(col + i, row).bg;
            buf.set(col + i, row, Cell { ch, fg, bg: bg.unwrap_or(under) });
        }
    }
}

fn banner(buf: &mut FrameBuffer, row: usize, title: &str, hint: &str) {
    let width = title.len().max(hint.len()) + 6;
    let x = buf.width.saturating_sub(width) / 2;
    let top = row.saturating_sub(1);
    for y in top..top + 4 {
        buf.put_str(x, y, &" ".repeat(width), Color::White, Color::Black);
    }
    buf.put_centered(top + 1, title, Color::Yellow, Color::Black);
    if !hint.is_empty() { buf.put_centered(top + 2, hint, DIM_FG, Color::Black); }
}

/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. The draw pass paints the next frame into `front` through `Canvas`
///   2. Each cell is compared with `back` (the previous frame)
///   3. Only changed cells produce terminal commands
///   4. Commands are batched with `queue!` and flushed once
///   5. front/back swap
///
/// One 48-pixel tile maps to two terminal columns by one row, so the
/// 17x11 tile window needs 34 columns plus the HUD rows below it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Swing, WALK_FRAMES};
use crate::domain::geom::Rect;
use crate::domain::grid::TILE_H;
use crate::domain::npc::PersonId;
use crate::domain::tile::tiles;
use crate::sim::draw::{Canvas, Rgb, Sheet, DEAD_FRAME, HUD_H, SCREEN_H, SCREEN_W, SWING_BASE};

const CELL_W: i32 = 2;
/// Horizontal pixels per terminal column.
const COL_PX: i32 = crate::domain::grid::TILE_W / CELL_W;

const HELP_ROW: usize = ((SCREEN_H + HUD_H) / TILE_H) as usize;
const HELP: &str = " WASD/Arrows:Move  E:Pick up  Q:Drop  1/2:Slot  F/Space:Use  T:Talk  Esc:Quit";

// ── Cell ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background everywhere, so the terminal's own default
    /// never shows through between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from every real cell; forces a full repaint.
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

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(&mut self.cells[y as usize * self.width + x as usize])
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if let Some(cell) = self.cell_mut(x + i as i32, y) {
                cell.ch = ch;
                cell.fg = fg;
            }
        }
    }
}

// ── Glyphs ──

/// What a sheet frame looks like in two terminal cells. `bg: None` keeps
/// whatever is underneath.
struct Glyph {
    chars: [char; 2],
    fg: Color,
    bg: Option<Color>,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

fn glyph(sheet: Sheet, frame: u32) -> Glyph {
    match sheet {
        Sheet::Tiles => tile_glyph(frame),
        Sheet::Items => item_glyph(frame),
        Sheet::Hero | Sheet::HeroArmed => {
            let (facing, swinging) = pose(frame);
            let dir = if swinging { blade(facing) } else { ['^', '<', 'v', '>'][facing] };
            let fg = if sheet == Sheet::HeroArmed { rgb(255, 230, 120) } else { rgb(255, 255, 255) };
            let chars = if facing == 1 { [dir, '@'] } else { ['@', dir] };
            Glyph { chars, fg, bg: None }
        }
        Sheet::Person(id) => {
            let (chars, fg) = match id {
                PersonId::OldMan => (['O', 'm'], rgb(220, 220, 220)),
                PersonId::Lady => (['L', 'y'], rgb(255, 150, 200)),
                PersonId::Kid => (['K', 'd'], rgb(120, 220, 255)),
                PersonId::Blacksmith => (['B', 's'], rgb(255, 160, 60)),
                PersonId::Sailor => (['S', 'l'], rgb(100, 160, 255)),
            };
            Glyph { chars, fg, bg: None }
        }
        Sheet::Monster => {
            if frame >= DEAD_FRAME {
                return Glyph { chars: ['x', 'x'], fg: rgb(110, 110, 110), bg: None };
            }
            let (facing, swinging) = pose(frame);
            let dir = if swinging { blade(facing) } else { 'Ö' };
            Glyph { chars: ['O', dir], fg: rgb(230, 60, 50), bg: None }
        }
    }
}

/// Facing row and whether the frame is part of a swing.
fn pose(frame: u32) -> (usize, bool) {
    if frame >= SWING_BASE {
        (((frame - SWING_BASE) / Swing::FRAMES % 4) as usize, true)
    } else {
        ((frame / WALK_FRAMES % 4) as usize, false)
    }
}

fn blade(facing: usize) -> char {
    if facing % 2 == 0 { '|' } else { '─' }
}

fn tile_glyph(frame: u32) -> Glyph {
    let grass = rgb(40, 110, 40);
    let (chars, fg, bg) = match frame as u16 {
        tiles::GRASS => ([' ', ' '], grass, grass),
        tiles::FLOOR => (['·', '·'], rgb(150, 130, 100), rgb(120, 100, 70)),
        tiles::WATER => (['~', '~'], rgb(150, 200, 255), rgb(30, 70, 160)),
        tiles::SAND => (['.', ' '], rgb(170, 150, 90), rgb(200, 180, 110)),
        tiles::PATH => ([' ', ' '], rgb(150, 120, 80), rgb(150, 120, 80)),
        tiles::PLANK => (['═', '═'], rgb(90, 60, 30), rgb(160, 120, 70)),
        tiles::PAD => (['◊', '◊'], rgb(255, 255, 255), rgb(120, 60, 160)),
        tiles::FENCE => (['╫', '╫'], rgb(150, 110, 60), grass),
        tiles::STONE => (['█', '█'], rgb(120, 120, 120), rgb(70, 70, 70)),
        tiles::ROOF => (['▲', '▲'], rgb(180, 60, 50), rgb(120, 40, 30)),
        tiles::CANOPY => (['♣', '♣'], rgb(30, 150, 30), rgb(20, 80, 20)),
        tiles::HEDGE => (['#', '#'], rgb(20, 120, 20), rgb(10, 60, 10)),
        _ => (['?', '?'], Color::Magenta, Cell::BASE_BG),
    };
    Glyph { chars, fg, bg: Some(bg) }
}

/// Item sheet: five frames per item, icon first, then four world frames.
fn item_glyph(frame: u32) -> Glyph {
    let phase = frame % 5;
    let (chars, fg) = match frame / 5 {
        0 => (['†', ' '], rgb(220, 220, 255)),
        1 => (['P', ' '], rgb(200, 160, 100)),
        2 => (['[', ']'], rgb(180, 180, 180)),
        3 => (['[', '~'], rgb(120, 180, 255)),
        4 if phase % 2 == 1 => (['*', '^'], rgb(255, 120, 30)),
        4 => (['^', '*'], rgb(255, 200, 40)),
        5 => (['o', '-'], rgb(255, 220, 80)),
        6 => (['$', '$'], rgb(255, 215, 0)),
        7 => (['♠', '♠'], rgb(20, 170, 40)),
        8 => (['▐', '▌'], rgb(130, 80, 40)),
        _ => (['?', '?'], Color::Magenta),
    };
    Glyph { chars, fg, bg: None }
}

/// Fade `fg` toward whatever is behind it.
fn blend(fg: Rgb, bg: Color, alpha: u8) -> Color {
    let (br, bgreen, bb) = match bg {
        Color::Rgb { r, g, b } => (r, g, b),
        _ => (22, 22, 35),
    };
    let mix = |f: u8, b: u8| ((f as u32 * alpha as u32 + b as u32 * (255 - alpha as u32)) / 255) as u8;
    rgb(mix(fg.0, br), mix(fg.1, bgreen), mix(fg.2, bb))
}

fn to_color(c: Rgb) -> Color {
    rgb(c.0, c.1, c.2)
}

// ── Pixel → cell mapping ──

fn col_of(x: i32) -> i32 {
    (x + COL_PX / 2).div_euclid(COL_PX)
}

fn row_of(y: i32) -> i32 {
    (y + TILE_H / 2).div_euclid(TILE_H)
}

/// Cells covered by a pixel rectangle, at least one in each direction.
fn cells_of(rect: Rect) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
    let (c0, r0) = (col_of(rect.x), row_of(rect.y));
    let c1 = col_of(rect.x + rect.w).max(c0 + 1);
    let r1 = row_of(rect.y + rect.h).max(r0 + 1);
    (c0..c1, r0..r1)
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
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
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
    }

    /// Pick up terminal resizes and start a blank frame.
    pub fn begin_frame(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.front.width || th as usize != self.front.height {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        self.front.clear();
        Ok(())
    }

    /// Emit the frame and keep it as the next diff base.
    pub fn present(&mut self) -> io::Result<()> {
        self.front.put_str(0, HELP_ROW as i32, HELP, Color::DarkGrey);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // No ResetColor here: the terminal default may differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

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
}

impl Canvas for Renderer {
    fn draw_sprite(&mut self, sheet: Sheet, frame: u32, x: i32, y: i32) {
        let g = glyph(sheet, frame);
        let (col, row) = (col_of(x), row_of(y));
        for (i, ch) in g.chars.into_iter().enumerate() {
            if let Some(cell) = self.front.cell_mut(col + i as i32, row) {
                cell.ch = ch;
                cell.fg = g.fg;
                if let Some(bg) = g.bg {
                    cell.bg = bg;
                }
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, colour: Rgb) {
        let (cols, rows) = cells_of(rect);
        for row in rows {
            for col in cols.clone() {
                if let Some(cell) = self.front.cell_mut(col, row) {
                    *cell = Cell { ch: ' ', fg: Color::White, bg: to_color(colour) };
                }
            }
        }
    }

    /// Terminal cells cannot carry a thin outline; the box is tinted instead.
    fn draw_rect(&mut self, rect: Rect, colour: Rgb) {
        let (cols, rows) = cells_of(rect);
        for row in rows {
            for col in cols.clone() {
                if let Some(cell) = self.front.cell_mut(col, row) {
                    cell.bg = to_color(colour);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, colour: Rgb, alpha: u8) {
        if alpha == 0 {
            return;
        }
        let (col, row) = (x.div_euclid(COL_PX), row_of(y));
        for (i, ch) in text.chars().enumerate() {
            if let Some(cell) = self.front.cell_mut(col + i as i32, row) {
                cell.fg = blend(colour, cell.bg, alpha);
                cell.ch = ch;
            }
        }
    }

    fn draw_text_centred(&mut self, text: &str, y: i32, colour: Rgb, alpha: u8) {
        let width = SCREEN_W / COL_PX;
        let len = text.chars().count() as i32;
        let x = (width - len).max(0) / 2 * COL_PX;
        self.draw_text(text, x, y, colour, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.resize(w, h);
        r
    }

    #[test]
    fn tile_lands_on_two_columns() {
        let mut r = renderer(40, 16);
        r.draw_sprite(Sheet::Tiles, tiles::WATER as u32, 3 * 48, 2 * 48);
        assert_eq!(r.front.get(6, 2).ch, '~');
        assert_eq!(r.front.get(7, 2).ch, '~');
        assert_eq!(r.front.get(8, 2), Cell::BLANK);
    }

    #[test]
    fn actors_keep_the_ground_colour() {
        let mut r = renderer(40, 16);
        r.draw_sprite(Sheet::Tiles, tiles::SAND as u32, 0, 0);
        r.draw_sprite(Sheet::Person(PersonId::Kid), 0, 0, 0);
        let cell = r.front.get(0, 0);
        assert_eq!(cell.ch, 'K');
        assert_eq!(cell.bg, rgb(200, 180, 110));
    }

    #[test]
    fn poses_decode_facing_and_swing() {
        assert_eq!(pose(2 * WALK_FRAMES + 5), (2, false));
        assert_eq!(pose(SWING_BASE + 3 * Swing::FRAMES + 1), (3, true));
        assert_eq!(glyph(Sheet::Monster, DEAD_FRAME).chars, ['x', 'x']);
    }

    #[test]
    fn rects_cover_whole_cells() {
        // inventory slots sit side by side without sharing a column
        let (a, _) = cells_of(Rect::new(8, 536, 48, 48));
        let (b, _) = cells_of(Rect::new(64, 536, 48, 48));
        assert_eq!(a, 0..2);
        assert_eq!(b, 3..5);
        let (_, rows) = cells_of(Rect::new(0, 528, 816, 96));
        assert_eq!(rows, 11..13);
    }

    #[test]
    fn faded_text_sinks_into_the_background() {
        let mut r = renderer(40, 16);
        r.fill_rect(Rect::new(0, 0, 480, 48), Rgb(0, 0, 0));
        r.draw_text("hi", 0, 0, Rgb(255, 255, 255), 255);
        assert_eq!(r.front.get(0, 0).fg, rgb(255, 255, 255));
        r.draw_text("hi", 0, 0, Rgb(255, 255, 255), 51);
        assert_eq!(r.front.get(0, 0).fg, rgb(51, 51, 51));
        r.draw_text("zz", 0, 0, Rgb(255, 255, 255), 0);
        assert_eq!(r.front.get(0, 0).ch, 'h');
    }

    #[test]
    fn centred_text_sits_in_the_playfield() {
        let mut r = renderer(80, 16);
        r.draw_text_centred("abcd", 0, Rgb(255, 255, 255), 255);
        // 34 columns wide: (34 - 4) / 2 = 15
        assert_eq!(r.front.get(15, 0).ch, 'a');
    }
}

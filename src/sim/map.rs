/// Map loading.
///
/// ## Sources (priority order):
///   1. `map_file` from config, when it exists
///   2. The built-in world, authored in code below
///
/// ## File format:
///   ```
///   <width>,<height>
///   <height rows>      base layer, <width> codes each
///   <height rows>      detail layer
///   <height rows>      top layer
///   <3*height rows>    collision layer, <3*width> codes each
///   <height rows>      rail layer
///   ```
///
/// Cells are comma-separated integers. Blank lines and surrounding
/// whitespace are ignored. Layer order and the 3× collision multiplier are
/// positional; anything malformed is a fatal [`MapError`].

use std::ops::RangeInclusive;
use std::path::Path;

use tracing::info;

use crate::domain::grid::{Layer, WorldGrid, MAX_TILES, SUB_PER_TILE, TILE_H, TILE_W};
use crate::domain::maze::{MAZE_HEIGHT, MAZE_ORIGIN, MAZE_WIDTH};
use crate::domain::tile::{tiles, CollisionCode, Rail, Teleport};
use crate::error::MapError;

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read a map file. `Ok(None)` when there is no file at `path`.
pub fn load(path: &Path) -> Result<Option<WorldGrid>, MapError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .map_err(|source| MapError::Io { path: path.to_path_buf(), source })?;
    let grid = parse(&text)?;
    check_fits(&grid)?;
    info!(path = %path.display(), width = grid.width(), height = grid.height(), "map loaded");
    Ok(Some(grid))
}

pub fn parse(text: &str) -> Result<WorldGrid, MapError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines.next().ok_or_else(|| MapError::BadHeader(String::new()))?;
    let (width, height) = parse_header(header)?;
    let mut grid = WorldGrid::new(width, height);

    for (layer, name) in [(Layer::Base, "base"), (Layer::Detail, "detail"), (Layer::Top, "top")] {
        read_layer(&mut lines, name, height, width, |row, col, code| {
            grid.set_tile(layer, row, col, code);
            Ok(())
        })?;
    }

    let (sub_h, sub_w) = (height * SUB_PER_TILE, width * SUB_PER_TILE);
    read_layer(&mut lines, "collision", sub_h, sub_w, |row, col, code| {
        let c = CollisionCode::from_code(code)
            .ok_or(MapError::UnknownCollision { row, col, code })?;
        grid.set_collision(row, col, c);
        Ok(())
    })?;

    read_layer(&mut lines, "rail", height, width, |row, col, code| {
        let rail = Rail::from_code(code).ok_or(MapError::UnknownRail { row, col, code })?;
        grid.set_rail(row, col, rail);
        Ok(())
    })?;

    match lines.count() {
        0 => Ok(grid),
        extra => Err(MapError::TrailingRows(extra)),
    }
}

/// Smallest (width, height) in tiles that holds every authored position:
/// start, people, items, pads, teleport landings and the maze.
pub fn required_extent() -> (usize, usize) {
    let landings = Teleport::ALL.map(|t| {
        let d = t.destination();
        ((d.x / TILE_W) as usize, (d.y / TILE_H) as usize)
    });
    let maze_corner = (MAZE_ORIGIN.0 + MAZE_WIDTH - 1, MAZE_ORIGIN.1 + MAZE_HEIGHT - 1);

    places::ALL
        .iter()
        .chain(PADS.iter().map(|(_, at)| at))
        .chain(landings.iter())
        .chain(std::iter::once(&maze_corner))
        .fold((0, 0), |(w, h), &(c, r)| (w.max(c + 1), h.max(r + 1)))
}

/// Reject a grid the authored content would fall off.
pub fn check_fits(grid: &WorldGrid) -> Result<(), MapError> {
    let (need_width, need_height) = required_extent();
    if grid.width() < need_width || grid.height() < need_height {
        return Err(MapError::TooSmall {
            width: grid.width(),
            height: grid.height(),
            need_width,
            need_height,
        });
    }
    Ok(())
}

fn parse_header(line: &str) -> Result<(usize, usize), MapError> {
    let bad = || MapError::BadHeader(line.to_string());
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let width = parts.next().and_then(|s| s.parse::<usize>().ok()).ok_or_else(bad)?;
    let height = parts.next().and_then(|s| s.parse::<usize>().ok()).ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }
    if !(1..=MAX_TILES).contains(&width) || !(1..=MAX_TILES).contains(&height) {
        return Err(MapError::BadDimensions { width, height, max: MAX_TILES });
    }
    Ok((width, height))
}

fn read_layer<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    layer: &'static str,
    rows: usize,
    cols: usize,
    mut set: impl FnMut(usize, usize, u16) -> Result<(), MapError>,
) -> Result<(), MapError> {
    for row in 0..rows {
        let line = lines.next()
            .ok_or(MapError::MissingRows { layer, expected: rows, found: row })?;
        let cells: Vec<&str> = line.trim_end_matches(',').split(',').map(str::trim).collect();
        if cells.len() != cols {
            return Err(MapError::RowLength { layer, row, expected: cols, found: cells.len() });
        }
        for (col, text) in cells.into_iter().enumerate() {
            let code = text.parse::<u16>()
                .map_err(|_| MapError::BadCell { layer, row, text: text.to_string() })?;
            set(row, col, code)?;
        }
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Built-in world
// ══════════════════════════════════════════════════════════════

pub const BUILTIN_WIDTH: usize = 160;
pub const BUILTIN_HEIGHT: usize = 120;

/// Tile positions (col, row) the content and tests rely on.
pub mod places {
    pub const START: (usize, usize) = (71, 87);
    pub const FORGE: (usize, usize) = (76, 86);
    pub const OLD_MAN: (usize, usize) = (26, 34);
    pub const LADY: (usize, usize) = (30, 40);
    pub const SAILOR: (usize, usize) = (42, 99);
    pub const BUCKET: (usize, usize) = (21, 38);
    pub const PEN_GAP: [(usize, usize); 2] = [(31, 30), (32, 30)];
    pub const AXE: (usize, usize) = (32, 28);
    pub const NOOK_GAP: [(usize, usize); 2] = [(65, 92), (66, 92)];
    pub const COINS: (usize, usize) = (66, 94);
    pub const MAZE_GATE: (usize, usize) = (107, 100);
    pub const RAIL_START: (usize, usize) = (86, 92);
    pub const KID: (usize, usize) = (118, 94);
    pub const MAZE_ORCS: [(usize, usize); 2] = [(112, 98), (124, 92)];
    pub const SHORE: (usize, usize) = (16, 39);

    pub const ALL: [(usize, usize); 18] = [
        START, FORGE, OLD_MAN, LADY, SAILOR, BUCKET, PEN_GAP[0], PEN_GAP[1], AXE,
        NOOK_GAP[0], NOOK_GAP[1], COINS, MAZE_GATE, RAIL_START, KID, MAZE_ORCS[0],
        MAZE_ORCS[1], SHORE,
    ];
}

/// Pad tile for each teleport.
pub const PADS: [(Teleport, (usize, usize)); 8] = [
    (Teleport::A, (80, 82)),
    (Teleport::B, (113, 9)),
    (Teleport::C, (36, 46)),
    (Teleport::D, (122, 82)),
    (Teleport::E, (60, 96)),
    (Teleport::F, (10, 30)),
    (Teleport::G, (38, 100)),
    (Teleport::H, (140, 26)),
];

/// The default world: village, glade with pond and pen, dock, island,
/// shrine, rail loop, and the walled-off maze exit. The maze itself is
/// stamped at startup.
pub fn builtin() -> WorldGrid {
    let mut g = WorldGrid::new(BUILTIN_WIDTH, BUILTIN_HEIGHT);
    let (w, h) = (BUILTIN_WIDTH - 1, BUILTIN_HEIGHT - 1);

    // ── Border ──
    ring(&mut g, 0..=w, 0..=h, tiles::STONE, &[]);

    // ── Village ──
    paint(&mut g, Layer::Base, 58..=82, 88..=88, tiles::PATH);
    paint(&mut g, Layer::Base, 71..=71, 80..=100, tiles::PATH);
    house(&mut g, 62..=66, 82..=85);
    house(&mut g, 74..=78, 82..=85);
    ring(&mut g, 64..=68, 92..=96, tiles::FENCE, &places::NOOK_GAP);

    // ── Rail loop east of the village ──
    paint(&mut g, Layer::Base, 86..=92, 92..=96, tiles::PATH);
    for c in 86..92 { g.set_rail(92, c, Rail::Right); }
    for r in 92..96 { g.set_rail(r, 92, Rail::Down); }
    for c in 87..=92 { g.set_rail(96, c, Rail::Left); }
    for r in 93..=96 { g.set_rail(r, 86, Rail::Up); }

    // ── Sea and dock ──
    water(&mut g, 20..=40, 90..=110);
    paint(&mut g, Layer::Base, 38..=46, 100..=100, tiles::PLANK);
    block(&mut g, 38..=40, 100..=100, CollisionCode::Open);

    // ── Glade ──
    paint(&mut g, Layer::Base, 13..=19, 39..=44, tiles::SAND);
    block(&mut g, 13..=19, 39..=44, CollisionCode::Fillable);
    water(&mut g, 14..=18, 40..=43);
    ring(&mut g, 30..=34, 26..=30, tiles::FENCE, &places::PEN_GAP);
    for (c, r) in [(12, 26), (38, 34), (16, 48), (28, 46)] {
        g.set_tile(Layer::Top, r, c, tiles::CANOPY);
    }

    // ── Maze approach and walled exit ──
    paint(&mut g, Layer::Base, 100..=106, 100..=100, tiles::PATH);
    ring(&mut g, 119..=125, 80..=84, tiles::STONE, &[(122, 84)]);

    // ── Shrine ──
    paint(&mut g, Layer::Base, 104..=116, 4..=14, tiles::FLOOR);

    // ── Island ──
    water(&mut g, 124..=156, 4..=36);
    paint(&mut g, Layer::Base, 130..=150, 10..=30, tiles::SAND);
    block(&mut g, 130..=150, 10..=30, CollisionCode::Open);

    for (t, (c, r)) in PADS {
        g.set_tile(Layer::Base, r, c, tiles::PAD);
        g.fill_tile_collision(r, c, CollisionCode::Teleport(t));
    }

    g
}

// ── Authoring helpers ──

fn paint(g: &mut WorldGrid, layer: Layer, cols: RangeInclusive<usize>, rows: RangeInclusive<usize>, tile: u16) {
    for r in rows {
        for c in cols.clone() {
            g.set_tile(layer, r, c, tile);
        }
    }
}

fn block(g: &mut WorldGrid, cols: RangeInclusive<usize>, rows: RangeInclusive<usize>, code: CollisionCode) {
    for r in rows {
        for c in cols.clone() {
            g.fill_tile_collision(r, c, code);
        }
    }
}

fn water(g: &mut WorldGrid, cols: RangeInclusive<usize>, rows: RangeInclusive<usize>) {
    paint(g, Layer::Base, cols.clone(), rows.clone(), tiles::WATER);
    block(g, cols, rows, CollisionCode::Wall);
}

/// Wall the outline of a rectangle, leaving `gaps` open.
fn ring(
    g: &mut WorldGrid,
    cols: RangeInclusive<usize>,
    rows: RangeInclusive<usize>,
    tile: u16,
    gaps: &[(usize, usize)],
) {
    let (c0, c1, r0, r1) = (*cols.start(), *cols.end(), *rows.start(), *rows.end());
    for r in rows {
        for c in cols.clone() {
            let edge = r == r0 || r == r1 || c == c0 || c == c1;
            if edge && !gaps.contains(&(c, r)) {
                g.set_tile(Layer::Detail, r, c, tile);
                g.fill_tile_collision(r, c, CollisionCode::Wall);
            }
        }
    }
}

/// Solid walls with a roof row on the top layer that actors pass behind.
fn house(g: &mut WorldGrid, cols: RangeInclusive<usize>, rows: RangeInclusive<usize>) {
    let roof = *rows.start();
    paint(g, Layer::Top, cols.clone(), roof..=roof, tiles::ROOF);
    paint(g, Layer::Detail, cols.clone(), roof + 1..=*rows.end(), tiles::STONE);
    block(g, cols, roof + 1..=*rows.end(), CollisionCode::Wall);
}

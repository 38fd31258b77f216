/// Hedge maze: randomized depth-first carve, then stamped into the grid.
///
/// Cells sit on odd coordinates, two units apart, so the even coordinates
/// between them are the walls that carving knocks out. Every carve step
/// opens a wall and a fresh cell, which makes the result a spanning tree
/// (a perfect maze). Two gateways are forced open afterwards.

use rand::Rng;

use super::grid::{Layer, WorldGrid, SUB_PER_TILE};
use super::tile::{tiles, CollisionCode};

pub const MAZE_WIDTH: usize = 23;
pub const MAZE_HEIGHT: usize = 21;

/// Tile offset of the maze's top-left corner in the world.
pub const MAZE_ORIGIN: (usize, usize) = (107, 85);

/// Carving starts here (col, row).
pub const MAZE_START: (usize, usize) = (1, 5);

/// Forced openings (col, row): west entrance and north exit.
pub const MAZE_ENTRANCE: [(usize, usize); 2] = [(0, 15), (1, 15)];
pub const MAZE_EXIT: [(usize, usize); 2] = [(15, 1), (15, 0)];

/// Blocked tiles stamp this many collision columns: one spare sub-cell on
/// each side, so diagonal gaps between hedges can't be slipped through.
const WALL_SUB_COLS: usize = 5;

#[derive(Clone, Debug)]
pub struct Maze {
    width: usize,
    height: usize,
    open: Vec<bool>,
}

impl Maze {
    /// Carve and open the gateways.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut maze = Maze::carve(MAZE_WIDTH, MAZE_HEIGHT, MAZE_START, rng);
        for &(col, row) in MAZE_ENTRANCE.iter().chain(MAZE_EXIT.iter()) {
            maze.set_open(col, row);
        }
        maze
    }

    /// Randomized backtracker over odd cells. `start` must be an odd cell.
    pub fn carve<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        start: (usize, usize),
        rng: &mut R,
    ) -> Self {
        let mut maze = Maze { width, height, open: vec![false; width * height] };
        let mut stack = vec![start];
        maze.set_open(start.0, start.1);

        while let Some((mx, my)) = stack.pop() {
            let mut neighbours: Vec<(isize, isize)> = Vec::with_capacity(4);
            if mx > 1 && !maze.is_open(mx - 2, my) {
                neighbours.push((-1, 0));
            }
            if mx + 2 < width - 1 && !maze.is_open(mx + 2, my) {
                neighbours.push((1, 0));
            }
            if my > 1 && !maze.is_open(mx, my - 2) {
                neighbours.push((0, -1));
            }
            if my + 2 < height - 1 && !maze.is_open(mx, my + 2) {
                neighbours.push((0, 1));
            }

            if neighbours.is_empty() {
                continue;
            }
            let (dx, dy) = neighbours[rng.gen_range(0..neighbours.len())];
            let wall = (offset(mx, dx), offset(my, dy));
            let next = (offset(mx, 2 * dx), offset(my, 2 * dy));
            stack.push((mx, my));
            maze.set_open(wall.0, wall.1);
            maze.set_open(next.0, next.1);
            stack.push(next);
        }

        maze
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn is_open(&self, col: usize, row: usize) -> bool {
        self.open[row * self.width + col]
    }

    fn set_open(&mut self, col: usize, row: usize) {
        self.open[row * self.width + col] = true;
    }

    /// Stamp into the world at `origin` (col, row in tiles).
    ///
    /// Every maze tile gets a floor; blocked tiles also get a hedge sprite
    /// and a 3×5 block of wall codes.
    pub fn stamp(&self, grid: &mut WorldGrid, origin: (usize, usize)) {
        let (ox, oy) = origin;

        for y in 0..self.height {
            for x in 0..self.width {
                let (col, row) = (ox + x, oy + y);
                grid.set_tile(Layer::Base, row, col, tiles::FLOOR);
                grid.set_tile(Layer::Detail, row, col, 0);
                grid.fill_tile_collision(row, col, CollisionCode::Open);
            }
        }

        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_open(x, y) {
                    continue;
                }
                let (col, row) = (ox + x, oy + y);
                grid.set_tile(Layer::Detail, row, col, tiles::HEDGE);
                for i in 0..SUB_PER_TILE {
                    for j in 0..WALL_SUB_COLS {
                        let sub_col = (col * SUB_PER_TILE + j).checked_sub(1);
                        if let Some(sub_col) = sub_col.filter(|&c| c < grid.sub_width()) {
                            grid.set_collision(row * SUB_PER_TILE + i, sub_col, CollisionCode::Wall);
                        }
                    }
                }
            }
        }
    }

    /// Cells reachable from `from` through open 4-neighbours.
    pub fn reachable_from(&self, from: (usize, usize)) -> Vec<bool> {
        let mut seen = vec![false; self.width * self.height];
        if !self.is_open(from.0, from.1) {
            return seen;
        }
        let mut stack = vec![from];
        seen[from.1 * self.width + from.0] = true;
        while let Some((x, y)) = stack.pop() {
            let mut visit = |nx: usize, ny: usize| {
                let i = ny * self.width + nx;
                if self.is_open(nx, ny) && !seen[i] {
                    seen[i] = true;
                    stack.push((nx, ny));
                }
            };
            if x > 0 { visit(x - 1, y); }
            if x + 1 < self.width { visit(x + 1, y); }
            if y > 0 { visit(x, y - 1); }
            if y + 1 < self.height { visit(x, y + 1); }
        }
        seen
    }
}

fn offset(v: usize, d: isize) -> usize {
    (v as isize + d) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_cells(m: &Maze) -> Vec<(usize, usize)> {
        (0..m.height())
            .flat_map(|y| (0..m.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| m.is_open(x, y))
            .collect()
    }

    #[test]
    fn carve_reaches_every_open_cell() {
        for seed in 0..40 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let m = Maze::carve(MAZE_WIDTH, MAZE_HEIGHT, MAZE_START, &mut rng);
            let seen = m.reachable_from(MAZE_START);
            for (x, y) in open_cells(&m) {
                assert!(seen[y * m.width() + x], "seed {seed}: ({x},{y}) unreachable");
            }
        }
    }

    #[test]
    fn carve_visits_all_odd_cells_without_cycles() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let m = Maze::carve(MAZE_WIDTH, MAZE_HEIGHT, MAZE_START, &mut rng);
        for y in (1..MAZE_HEIGHT - 1).step_by(2) {
            for x in (1..MAZE_WIDTH - 1).step_by(2) {
                assert!(m.is_open(x, y));
            }
        }
        // A tree on N nodes has N - 1 edges.
        let cells = open_cells(&m);
        let edges = cells.iter()
            .map(|&(x, y)| {
                let right = x + 1 < m.width() && m.is_open(x + 1, y);
                let down = y + 1 < m.height() && m.is_open(x, y + 1);
                right as usize + down as usize
            })
            .sum::<usize>();
        assert_eq!(edges, cells.len() - 1);
    }

    #[test]
    fn border_stays_closed_before_gateways() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let m = Maze::carve(MAZE_WIDTH, MAZE_HEIGHT, MAZE_START, &mut rng);
        for x in 0..MAZE_WIDTH {
            assert!(!m.is_open(x, 0));
            assert!(!m.is_open(x, MAZE_HEIGHT - 1));
        }
        for y in 0..MAZE_HEIGHT {
            assert!(!m.is_open(0, y));
            assert!(!m.is_open(MAZE_WIDTH - 1, y));
        }
    }

    #[test]
    fn entrance_connects_to_exit() {
        for seed in 100..120 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let m = Maze::generate(&mut rng);
            let seen = m.reachable_from(MAZE_ENTRANCE[0]);
            let (ex, ey) = MAZE_EXIT[1];
            assert!(seen[ey * m.width() + ex], "seed {seed}");
        }
    }

    #[test]
    fn stamp_walls_are_wider_than_a_tile() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let m = Maze::generate(&mut rng);
        let mut grid = WorldGrid::new(140, 110);
        m.stamp(&mut grid, MAZE_ORIGIN);
        let (ox, oy) = MAZE_ORIGIN;

        // Top-left corner is always a hedge.
        assert_eq!(grid.tile_at(Layer::Detail, oy, ox), tiles::HEDGE);
        assert_eq!(grid.tile_at(Layer::Base, oy, ox), tiles::FLOOR);
        // Its wall block spills one sub-column to the left of the tile.
        assert_eq!(grid.collision_at(oy * 3, ox * 3 - 1), CollisionCode::Wall);
        assert_eq!(grid.collision_at(oy * 3 + 2, ox * 3 + 3), CollisionCode::Wall);

        // A carved cell's centre stays walkable.
        let (cx, cy) = MAZE_START;
        assert_eq!(grid.tile_at(Layer::Detail, oy + cy, ox + cx), 0);
        assert_eq!(
            grid.collision_at((oy + cy) * 3 + 1, (ox + cx) * 3 + 1),
            CollisionCode::Open
        );
    }
}

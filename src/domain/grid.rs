/// World grid: five same-shaped layers.
///
///   - `base`, `detail`, `top`: tile-sheet indices (tile granularity)
///   - `rail`: rail hints (tile granularity)
///   - `collision`: semantic codes, 3× finer on both axes
///
/// All geometry is authored data, so an out-of-range lookup is a bug in the
/// caller and panics instead of returning a fallback.

use super::tile::{CollisionCode, Rail};

pub const TILE_W: i32 = 48;
pub const TILE_H: i32 = 48;
/// Collision sub-cells per tile, per axis.
pub const SUB_PER_TILE: usize = 3;
/// Side of one collision sub-cell in pixels.
pub const SUB_SIZE: i32 = TILE_W / SUB_PER_TILE as i32;
/// Hard upper bound on map size in tiles (both axes).
pub const MAX_TILES: usize = 300;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Layer {
    Base,
    Detail,
    Top,
}

#[derive(Clone, Debug)]
pub struct WorldGrid {
    width: usize,
    height: usize,
    base: Vec<u16>,
    detail: Vec<u16>,
    top: Vec<u16>,
    rail: Vec<Rail>,
    collision: Vec<CollisionCode>,
}

impl WorldGrid {
    /// Empty grid: ground tile 0 everywhere, nothing drawn on upper layers,
    /// all collision cells open.
    ///
    /// # Panics
    /// If either dimension is zero or exceeds [`MAX_TILES`].
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            (1..=MAX_TILES).contains(&width) && (1..=MAX_TILES).contains(&height),
            "grid {width}x{height} outside 1..={MAX_TILES}"
        );
        let cells = width * height;
        let sub_cells = cells * SUB_PER_TILE * SUB_PER_TILE;
        WorldGrid {
            width,
            height,
            base: vec![0; cells],
            detail: vec![0; cells],
            top: vec![0; cells],
            rail: vec![Rail::None; cells],
            collision: vec![CollisionCode::Open; sub_cells],
        }
    }

    /// Width in tiles.
    pub fn width(&self) -> usize { self.width }
    /// Height in tiles.
    pub fn height(&self) -> usize { self.height }
    pub fn sub_width(&self) -> usize { self.width * SUB_PER_TILE }
    pub fn sub_height(&self) -> usize { self.height * SUB_PER_TILE }
    pub fn pixel_width(&self) -> i32 { self.width as i32 * TILE_W }
    pub fn pixel_height(&self) -> i32 { self.height as i32 * TILE_H }

    // ── Tile layers ──

    pub fn tile_at(&self, layer: Layer, row: usize, col: usize) -> u16 {
        let i = self.tile_index(row, col);
        self.layer(layer)[i]
    }

    pub fn set_tile(&mut self, layer: Layer, row: usize, col: usize, tile: u16) {
        let i = self.tile_index(row, col);
        self.layer_mut(layer)[i] = tile;
    }

    pub fn rail_at(&self, row: usize, col: usize) -> Rail {
        self.rail[self.tile_index(row, col)]
    }

    pub fn set_rail(&mut self, row: usize, col: usize, rail: Rail) {
        let i = self.tile_index(row, col);
        self.rail[i] = rail;
    }

    // ── Collision layer ──

    pub fn collision_at(&self, sub_row: usize, sub_col: usize) -> CollisionCode {
        self.collision[self.sub_index(sub_row, sub_col)]
    }

    pub fn set_collision(&mut self, sub_row: usize, sub_col: usize, code: CollisionCode) {
        let i = self.sub_index(sub_row, sub_col);
        self.collision[i] = code;
    }

    /// Collision code under a world pixel.
    pub fn collision_at_world(&self, x: i32, y: i32) -> CollisionCode {
        let (row, col) = self.sub_cell_of(x, y);
        self.collision_at(row, col)
    }

    /// Sub-cell (row, col) containing a world pixel.
    ///
    /// # Panics
    /// If the pixel lies left of or above the map origin.
    pub fn sub_cell_of(&self, x: i32, y: i32) -> (usize, usize) {
        assert!(x >= 0 && y >= 0, "world point ({x}, {y}) is off the map");
        ((y / SUB_SIZE) as usize, (x / SUB_SIZE) as usize)
    }

    /// Tile (row, col) containing a world pixel.
    pub fn tile_of(&self, x: i32, y: i32) -> (usize, usize) {
        assert!(x >= 0 && y >= 0, "world point ({x}, {y}) is off the map");
        ((y / TILE_H) as usize, (x / TILE_W) as usize)
    }

    /// Stamp one code over every sub-cell of a tile.
    pub fn fill_tile_collision(&mut self, row: usize, col: usize, code: CollisionCode) {
        for i in 0..SUB_PER_TILE {
            for j in 0..SUB_PER_TILE {
                self.set_collision(row * SUB_PER_TILE + i, col * SUB_PER_TILE + j, code);
            }
        }
    }

    // ── Internal ──

    fn tile_index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "tile ({row}, {col}) outside {}x{} grid", self.width, self.height
        );
        row * self.width + col
    }

    fn sub_index(&self, sub_row: usize, sub_col: usize) -> usize {
        let (w, h) = (self.sub_width(), self.sub_height());
        assert!(
            sub_row < h && sub_col < w,
            "sub-cell ({sub_row}, {sub_col}) outside {w}x{h} collision layer"
        );
        sub_row * w + sub_col
    }

    fn layer(&self, layer: Layer) -> &[u16] {
        match layer {
            Layer::Base => &self.base,
            Layer::Detail => &self.detail,
            Layer::Top => &self.top,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut [u16] {
        match layer {
            Layer::Base => &mut self.base,
            Layer::Detail => &mut self.detail,
            Layer::Top => &mut self.top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_independent() {
        let mut g = WorldGrid::new(4, 3);
        g.set_tile(Layer::Detail, 2, 3, 80);
        assert_eq!(g.tile_at(Layer::Detail, 2, 3), 80);
        assert_eq!(g.tile_at(Layer::Base, 2, 3), 0);
        assert_eq!(g.tile_at(Layer::Top, 2, 3), 0);
        assert_eq!(g.sub_width(), 12);
        assert_eq!(g.sub_height(), 9);
    }

    #[test]
    fn world_lookup_uses_sub_tiles() {
        let mut g = WorldGrid::new(2, 2);
        g.set_collision(1, 2, CollisionCode::Wall);
        // sub-cell (1, 2) spans x 32..48, y 16..32
        assert_eq!(g.collision_at_world(40, 20), CollisionCode::Wall);
        assert_eq!(g.collision_at_world(47, 31), CollisionCode::Wall);
        assert_eq!(g.collision_at_world(48, 20), CollisionCode::Open);
        assert_eq!(g.tile_of(47, 47), (0, 0));
    }

    #[test]
    fn fill_tile_covers_nine_cells() {
        let mut g = WorldGrid::new(3, 3);
        g.fill_tile_collision(1, 1, CollisionCode::Fillable);
        let filled = (0..9)
            .flat_map(|r| (0..9).map(move |c| (r, c)))
            .filter(|&(r, c)| g.collision_at(r, c) == CollisionCode::Fillable)
            .count();
        assert_eq!(filled, 9);
        assert_eq!(g.collision_at(3, 3), CollisionCode::Fillable);
        assert_eq!(g.collision_at(5, 5), CollisionCode::Fillable);
    }

    #[test]
    #[should_panic]
    fn out_of_range_read_fails_fast() {
        let g = WorldGrid::new(2, 2);
        let _ = g.tile_at(Layer::Base, 0, 2);
    }

    #[test]
    #[should_panic]
    fn oversize_grid_rejected() {
        let _ = WorldGrid::new(MAX_TILES + 1, 10);
    }
}

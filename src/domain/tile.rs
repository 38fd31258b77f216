/// Cell codes for the invisible grid layers, plus the tile-sheet indices
/// used by the built-in world.
/// Semantics live here as methods, so callers never compare raw integers.

use super::geom::Facing;

/// Semantic code of one collision sub-cell (3× finer than a tile).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CollisionCode {
    #[default]
    Open,
    Wall,
    /// Water's edge: walkable, and lets an empty bucket be filled.
    Fillable,
    Teleport(Teleport),
}

/// The eight teleport pads. Each has one fixed destination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Teleport {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

/// Where a teleport lands the player and how the camera is re-seated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TeleportDest {
    pub x: i32,
    pub y: i32,
    pub scroll_x: i32,
    pub scroll_y: i32,
}

impl CollisionCode {
    /// Decode a map-file integer. `None` for codes the game doesn't know.
    pub fn from_code(code: u16) -> Option<Self> {
        let c = match code {
            0 => CollisionCode::Open,
            1 => CollisionCode::Wall,
            2 => CollisionCode::Teleport(Teleport::A),
            3 => CollisionCode::Teleport(Teleport::B),
            4 => CollisionCode::Fillable,
            5 => CollisionCode::Teleport(Teleport::C),
            6 => CollisionCode::Teleport(Teleport::D),
            7 => CollisionCode::Teleport(Teleport::E),
            8 => CollisionCode::Teleport(Teleport::F),
            9 => CollisionCode::Teleport(Teleport::G),
            10 => CollisionCode::Teleport(Teleport::H),
            _ => return None,
        };
        Some(c)
    }

    pub fn code(self) -> u16 {
        match self {
            CollisionCode::Open => 0,
            CollisionCode::Wall => 1,
            CollisionCode::Fillable => 4,
            CollisionCode::Teleport(t) => match t {
                Teleport::A => 2,
                Teleport::B => 3,
                Teleport::C => 5,
                Teleport::D => 6,
                Teleport::E => 7,
                Teleport::F => 8,
                Teleport::G => 9,
                Teleport::H => 10,
            },
        }
    }

    /// Only walls stop movement; every other code is legal to enter.
    pub fn is_blocking(self) -> bool {
        matches!(self, CollisionCode::Wall)
    }
}

impl Teleport {
    pub const ALL: [Teleport; 8] = [
        Teleport::A, Teleport::B, Teleport::C, Teleport::D,
        Teleport::E, Teleport::F, Teleport::G, Teleport::H,
    ];

    /// Fixed landing spot and camera offset (in tiles).
    pub fn destination(self) -> TeleportDest {
        let (x, y, scroll_x, scroll_y) = match self {
            // village → northern shrine
            Teleport::A => (5232, 470, 98, 0),
            // shrine → old man's glade
            Teleport::B => (1080, 1752, 12, 28),
            // glade → outside the maze gate
            Teleport::C => (104 * 48 + 24, 100 * 48 + 24, 98, 95),
            // maze exit → glade
            Teleport::D => (1080, 1752, 12, 28),
            // village → glade
            Teleport::E => (24 * 48 + 24, 38 * 48 + 24, 12, 30),
            // glade → village
            Teleport::F => (68 * 48 + 24, 88 * 48 + 24, 60, 84),
            // dock → island (ship passage)
            Teleport::G => (140 * 48 + 24, 20 * 48 + 24, 132, 15),
            // island → dock
            Teleport::H => (47 * 48 + 24, 98 * 48 + 24, 39, 92),
        };
        TeleportDest { x, y, scroll_x, scroll_y }
    }
}

/// Rail direction hint for rail-bound monsters (tile granularity).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Rail {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

impl Rail {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Rail::None),
            1 => Some(Rail::Left),
            2 => Some(Rail::Right),
            3 => Some(Rail::Up),
            4 => Some(Rail::Down),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Rail::None => 0,
            Rail::Left => 1,
            Rail::Right => 2,
            Rail::Up => 3,
            Rail::Down => 4,
        }
    }

    /// Tile step the rail points along; (0, 0) for no rail.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Rail::None => (0, 0),
            Rail::Left => Facing::Left.delta(),
            Rail::Right => Facing::Right.delta(),
            Rail::Up => Facing::Up.delta(),
            Rail::Down => Facing::Down.delta(),
        }
    }
}

/// Tile-sheet indices used by the built-in world and the renderer.
pub mod tiles {
    pub const GRASS: u16 = 0;
    pub const FLOOR: u16 = 1;
    pub const WATER: u16 = 2;
    pub const SAND: u16 = 3;
    pub const PATH: u16 = 4;
    pub const PLANK: u16 = 5;
    pub const PAD: u16 = 6;
    pub const FENCE: u16 = 20;
    pub const STONE: u16 = 21;
    pub const ROOF: u16 = 40;
    pub const CANOPY: u16 = 41;
    pub const HEDGE: u16 = 80;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_decode_and_encode() {
        for code in 0..=10u16 {
            let c = CollisionCode::from_code(code).unwrap();
            assert_eq!(c.code(), code);
        }
        assert_eq!(CollisionCode::from_code(4), Some(CollisionCode::Fillable));
        assert_eq!(CollisionCode::from_code(11), None);
        assert_eq!(Rail::from_code(5), None);
    }

    #[test]
    fn only_wall_blocks() {
        assert!(CollisionCode::Wall.is_blocking());
        assert!(!CollisionCode::Open.is_blocking());
        assert!(!CollisionCode::Fillable.is_blocking());
        for t in Teleport::ALL {
            assert!(!CollisionCode::Teleport(t).is_blocking());
        }
    }

    #[test]
    fn purple_pads_share_destination() {
        assert_eq!(Teleport::B.destination(), Teleport::D.destination());
        assert_eq!(Teleport::A.destination().scroll_x, 98);
    }
}

/// Geometry shared by every actor: axis-aligned boxes and facing.
///
/// World coordinates are integer pixels. Boxes are stored relative to an
/// actor's anchor point (its feet) and translated on demand.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Same box shifted by (dx, dy).
    pub fn translate(self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..self }
    }

    /// Strict overlap test: boxes that merely touch edges do not collide.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0 && self.h > 0 && other.w > 0 && other.h > 0
            && self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Facing direction. Discriminants match sprite-sheet row order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Up = 0,
    Left = 1,
    Down = 2,
    Right = 3,
}

impl Facing {
    /// Unit step (dx, dy) pointing the way this facing looks.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, -1),
            Facing::Left => (-1, 0),
            Facing::Down => (0, 1),
            Facing::Right => (1, 0),
        }
    }

    /// Sprite row offset for an 8-frame walk cycle.
    pub fn row(self) -> u32 {
        self as u32
    }
}

/// Euclidean distance between two world points.
pub fn distance(ax: i32, ay: i32, bx: i32, by: i32) -> f64 {
    let dx = (ax - bx) as f64;
    let dy = (ay - by) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Actor pieces shared by the player and NPCs: the movable body, the
/// attack swing timer, and the player itself.

use super::geom::{Facing, Rect};
use super::grid::{TILE_H, TILE_W};

pub const PLAYER_SPEED: i32 = 3;
pub const NPC_SPEED: i32 = 2;

/// Movement box for every walking actor, relative to its feet.
pub const FOOT_BOX: Rect = Rect::new(-15, -10, 33, 15);

pub const WALK_FRAMES: u32 = 8;
/// Frame pinned when a move is rejected.
pub const BUMP_FRAME: u32 = 7;
/// Walk animation advances on ticks divisible by this.
pub const ANIM_EVERY: u64 = 3;

/// Clamp margins: a step along an axis is only taken while the actor is
/// still inside these bounds.
const EDGE_X: i32 = 16;
const EDGE_TOP: i32 = 78;
const EDGE_BOTTOM: i32 = 6;

pub const MAX_HEALTH: i32 = 100;
pub const REGEN_INTERVAL: u64 = 120;

// ── Body ──

#[derive(Clone, Debug)]
pub struct Body {
    pub x: i32,
    pub y: i32,
    pub foot_box: Rect,
    pub facing: Facing,
    pub anim: u32,
}

impl Body {
    pub fn new(x: i32, y: i32) -> Self {
        Body { x, y, foot_box: FOOT_BOX, facing: Facing::Down, anim: 0 }
    }

    pub fn foot_box_at(&self, x: i32, y: i32) -> Rect {
        self.foot_box.translate(x, y)
    }

    /// Work out where a (dx, dy) step would land, turning to face it and
    /// advancing the walk cycle. Position is left untouched.
    ///
    /// Vertical intent wins the facing when both axes are requested.
    pub fn candidate(
        &mut self,
        dx: i32,
        dy: i32,
        speed: i32,
        world_px: (i32, i32),
        tick: u64,
    ) -> (i32, i32) {
        if tick % ANIM_EVERY == 0 {
            self.anim = (self.anim + 1) % WALK_FRAMES;
        }
        let (world_w, world_h) = world_px;
        let (mut nx, mut ny) = (self.x, self.y);

        if dx > 0 {
            if nx <= world_w - EDGE_X { nx += speed; }
            self.facing = Facing::Right;
        } else if dx < 0 {
            if nx >= EDGE_X { nx -= speed; }
            self.facing = Facing::Left;
        }

        if dy > 0 {
            if ny <= world_h - EDGE_BOTTOM { ny += speed; }
            self.facing = Facing::Down;
        } else if dy < 0 {
            if ny >= EDGE_TOP { ny -= speed; }
            self.facing = Facing::Up;
        }

        (nx, ny)
    }

    pub fn bump(&mut self) {
        self.anim = BUMP_FRAME;
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Point one tile behind this body's back.
    pub fn tile_behind(&self) -> (i32, i32) {
        let (fx, fy) = self.facing.delta();
        (self.x - fx * TILE_W, self.y - fy * TILE_H)
    }
}

// ── Swing (attack animation) ──

/// Four-frame attack animation, three ticks per frame. Runs to completion
/// once started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Swing {
    remaining: u32,
}

impl Swing {
    pub const FRAMES: u32 = 4;
    pub const TICKS_PER_FRAME: u32 = 3;
    const TOTAL: u32 = Self::FRAMES * Self::TICKS_PER_FRAME;

    /// Begin a swing. `false` when one is already in progress.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.remaining = Self::TOTAL;
        true
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn cancel(&mut self) {
        self.remaining = 0;
    }

    /// 0..FRAMES while active.
    pub fn frame(&self) -> u32 {
        (Self::TOTAL - self.remaining) / Self::TICKS_PER_FRAME
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub health: i32,
    pub swing: Swing,
    /// Sword selected: draws the armed sprite set.
    pub armed: bool,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Self {
        Player { body: Body::new(x, y), health: MAX_HEALTH, swing: Swing::default(), armed: false }
    }

    /// Sword reach for the current facing, in world space.
    pub fn attack_box(&self) -> Rect {
        let local = match self.body.facing {
            Facing::Up => Rect::new(-24, -100, 48, 48),
            Facing::Down => Rect::new(-24, 0, 48, 48),
            Facing::Left => Rect::new(-60, -60, 48, 60),
            Facing::Right => Rect::new(12, -60, 48, 60),
        };
        local.translate(self.body.x, self.body.y)
    }

    pub fn can_move(&self) -> bool {
        !self.swing.is_active()
    }

    pub fn is_knocked_out(&self) -> bool {
        self.health <= 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    /// One point back every [`REGEN_INTERVAL`] ticks while conscious and hurt.
    pub fn regenerate(&mut self, tick: u64) {
        if tick % REGEN_INTERVAL == 0 && self.health > 0 && self.health < MAX_HEALTH {
            self.health += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: (i32, i32) = (480, 480);

    #[test]
    fn candidate_faces_attempted_direction() {
        let mut b = Body::new(100, 100);
        assert_eq!(b.candidate(1, 0, 3, WORLD, 1), (103, 100));
        assert_eq!(b.facing, Facing::Right);
        assert_eq!(b.candidate(-1, 1, 2, WORLD, 1), (98, 102));
        assert_eq!(b.facing, Facing::Down);
        assert_eq!((b.x, b.y), (100, 100));
    }

    #[test]
    fn candidate_clamps_at_edges() {
        let mut b = Body::new(15, 77);
        assert_eq!(b.candidate(-1, -1, 3, WORLD, 1), (15, 77));
        assert_eq!(b.facing, Facing::Up);

        let mut b = Body::new(464, 474);
        assert_eq!(b.candidate(1, 1, 3, WORLD, 1), (467, 477));
        let mut b = Body::new(467, 477);
        assert_eq!(b.candidate(1, 1, 3, WORLD, 1), (467, 477));
    }

    #[test]
    fn walk_cycle_advances_every_third_tick() {
        let mut b = Body::new(200, 200);
        for tick in 1..=9 {
            b.candidate(1, 0, 2, WORLD, tick);
        }
        assert_eq!(b.anim, 3);
        b.bump();
        assert_eq!(b.anim, BUMP_FRAME);
        b.candidate(1, 0, 2, WORLD, 12);
        assert_eq!(b.anim, 0);
    }

    #[test]
    fn swing_runs_four_frames_and_cannot_restart() {
        let mut s = Swing::default();
        assert!(s.start());
        assert!(!s.start());
        let mut frames = Vec::new();
        while s.is_active() {
            frames.push(s.frame());
            s.tick();
        }
        assert_eq!(frames, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
        assert!(s.start());
    }

    #[test]
    fn regen_only_when_hurt_and_conscious() {
        let mut p = Player::new(0, 0);
        p.regenerate(120);
        assert_eq!(p.health, MAX_HEALTH);
        p.take_damage(10);
        p.regenerate(119);
        assert_eq!(p.health, 90);
        p.regenerate(240);
        assert_eq!(p.health, 91);
        p.take_damage(91);
        assert!(p.is_knocked_out());
        p.regenerate(360);
        assert_eq!(p.health, 0);
    }

    #[test]
    fn attack_box_follows_facing() {
        let mut p = Player::new(500, 500);
        p.body.facing = Facing::Right;
        assert_eq!(p.attack_box(), Rect::new(512, 440, 48, 60));
        p.body.facing = Facing::Up;
        assert_eq!(p.attack_box(), Rect::new(476, 400, 48, 48));
    }
}

/// Movement legality. Single source of truth for "can this body go there".
///
/// A destination is legal when the foot box clears every world item's base
/// box and the collision sub-cell under the anchor point is not a wall.
/// Shoreline and teleport cells are legal to enter; what a teleport does
/// is the caller's business (only the player is relocated).

use super::entity::{Body, NPC_SPEED};
use super::grid::WorldGrid;
use super::item::{ItemId, ItemManager};
use super::tile::{CollisionCode, Teleport};

/// Target-seeking stops this close to the target on each axis.
pub const SEEK_DEAD_ZONE: i32 = 8;
/// Staircase window: the first half prefers X, the second half Y.
pub const STAIR_PERIOD: u64 = 100;

/// Read-only world view handed to every mover in a tick.
#[derive(Clone, Copy)]
pub struct MoveCtx<'a> {
    pub grid: &'a WorldGrid,
    pub items: &'a ItemManager,
    pub tick: u64,
}

impl MoveCtx<'_> {
    fn world_px(&self) -> (i32, i32) {
        (self.grid.pixel_width(), self.grid.pixel_height())
    }
}

/// What a candidate destination holds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Probe {
    Clear,
    Wall,
    ItemBlocked(ItemId),
    Teleport(Teleport),
}

impl Probe {
    pub fn is_legal(self) -> bool {
        matches!(self, Probe::Clear | Probe::Teleport(_))
    }
}

/// Classify (x, y) for a body with the given foot box.
pub fn probe(ctx: &MoveCtx, body: &Body, x: i32, y: i32) -> Probe {
    if let Some(id) = ctx.items.blocking_item(&body.foot_box_at(x, y)) {
        return Probe::ItemBlocked(id);
    }
    match ctx.grid.collision_at_world(x, y) {
        CollisionCode::Wall => Probe::Wall,
        CollisionCode::Teleport(t) => Probe::Teleport(t),
        CollisionCode::Open | CollisionCode::Fillable => Probe::Clear,
    }
}

/// Attempt one (dx, dy) step. Legal destinations are taken; anything else
/// leaves the body in place on its bump frame.
pub fn step_body(body: &mut Body, dx: i32, dy: i32, speed: i32, ctx: &MoveCtx) -> Probe {
    let (nx, ny) = body.candidate(dx, dy, speed, ctx.world_px(), ctx.tick);
    let result = probe(ctx, body, nx, ny);
    if result.is_legal() {
        body.set_position(nx, ny);
    } else {
        body.bump();
    }
    result
}

/// Axis intent toward a target, with the shared staircase tie-break.
/// `(0, 0)` once inside the dead zone on both axes.
pub fn seek_direction(from: (i32, i32), to: (i32, i32), tick: u64) -> (i32, i32) {
    let axis = |d: i32| {
        if d > SEEK_DEAD_ZONE { 1 } else if d < -SEEK_DEAD_ZONE { -1 } else { 0 }
    };
    let (mut x, mut y) = (axis(to.0 - from.0), axis(to.1 - from.1));
    if x != 0 && y != 0 {
        if tick % STAIR_PERIOD < STAIR_PERIOD / 2 {
            y = 0;
        } else {
            x = 0;
        }
    }
    (x, y)
}

/// Walk an NPC one step toward (tx, ty). `None` when already there.
pub fn seek(body: &mut Body, tx: i32, ty: i32, ctx: &MoveCtx) -> Option<Probe> {
    let (dx, dy) = seek_direction((body.x, body.y), (tx, ty), ctx.tick);
    if dx == 0 && dy == 0 {
        return None;
    }
    Some(step_body(body, dx, dy, NPC_SPEED, ctx))
}

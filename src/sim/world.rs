/// SimulationState: the complete snapshot of a running game.
///
/// Everything that would otherwise be process-wide (scroll offsets, quest
/// state, tick counter, grid layers, RNG) lives here and is passed by
/// reference to `step` and `draw`.
///
/// ## Camera / Viewport
///
/// World coordinates and screen coordinates are separate:
///   - `scroll`: top-left visible tile, in tile units
///   - `screen(sx, sy) = world(x - scroll.x * TILE_W, y - scroll.y * TILE_H)`
///   - When the player nears a screen edge the camera eases a whole screen
///     (12 tiles across, 7 down) one tile per tick, and input waits for it

use rand_chacha::ChaCha8Rng;

use crate::domain::entity::Player;
use crate::domain::grid::{WorldGrid, TILE_H, TILE_W};
use crate::domain::item::ItemManager;
use crate::domain::maze::Maze;
use crate::domain::npc::NpcManager;
use crate::domain::quest::QuestState;

/// Visible window, in tiles.
pub const VIEW_W: i32 = 17;
pub const VIEW_H: i32 = 11;

/// Screen-space edges that start a scroll.
const SCROLL_RIGHT_AT: i32 = 720;
const SCROLL_LEFT_AT: i32 = 96;
const SCROLL_DOWN_AT: i32 = 480;
const SCROLL_UP_AT: i32 = 96;
const SCROLL_STEP_X: i32 = 12;
const SCROLL_STEP_Y: i32 = 7;

// ── Scroll ──

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scroll {
    pub x: i32,
    pub y: i32,
    pending_x: i32,
    pending_y: i32,
}

impl Scroll {
    pub fn new(x: i32, y: i32) -> Self {
        Scroll { x, y, pending_x: 0, pending_y: 0 }
    }

    pub fn is_scrolling(&self) -> bool {
        self.pending_x != 0 || self.pending_y != 0
    }

    /// Move one tile toward the queued offset, horizontal first.
    /// Returns `true` when the camera moved (input stays locked).
    pub fn advance(&mut self) -> bool {
        if self.pending_x != 0 {
            let s = self.pending_x.signum();
            self.x += s;
            self.pending_x -= s;
            return true;
        }
        if self.pending_y != 0 {
            let s = self.pending_y.signum();
            self.y += s;
            self.pending_y -= s;
            return true;
        }
        false
    }

    /// Queue a scroll if the world point sits near a screen edge.
    /// Amounts are clamped so the view never leaves the map.
    pub fn queue_for(&mut self, x: i32, y: i32, map_w: i32, map_h: i32) -> bool {
        if self.is_scrolling() {
            return false;
        }
        let (sx, sy) = self.to_screen(x, y);
        if sx >= SCROLL_RIGHT_AT {
            self.pending_x = SCROLL_STEP_X.min(map_w - VIEW_W - self.x).max(0);
        } else if sx <= SCROLL_LEFT_AT {
            self.pending_x = -SCROLL_STEP_X.min(self.x).max(0);
        }
        if sy >= SCROLL_DOWN_AT {
            self.pending_y = SCROLL_STEP_Y.min(map_h - VIEW_H - self.y).max(0);
        } else if sy <= SCROLL_UP_AT {
            self.pending_y = -SCROLL_STEP_Y.min(self.y).max(0);
        }
        self.is_scrolling()
    }

    /// Jump straight to an offset, dropping any queued motion.
    pub fn reset(&mut self, x: i32, y: i32) {
        *self = Scroll::new(x, y);
    }

    pub fn to_screen(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.x * TILE_W, y - self.y * TILE_H)
    }
}

// ── Message ──

/// Transient status line. Fades out over the second half of its life.
#[derive(Clone, Debug)]
pub struct Message {
    pub text: String,
    remaining: u32,
    lifetime: u32,
}

impl Message {
    pub fn new(text: impl Into<String>, lifetime: u32) -> Self {
        let lifetime = lifetime.max(1);
        Message { text: text.into(), remaining: lifetime, lifetime }
    }

    /// 255 while fresh, down to 0 at expiry.
    pub fn alpha(&self) -> u8 {
        let half = (self.lifetime / 2).max(1);
        if self.remaining >= half {
            255
        } else {
            (255 * self.remaining / half) as u8
        }
    }

    /// Count down one tick. `false` once expired.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining > 0
    }
}

// ── State ──

pub struct SimulationState {
    // ── World ──
    pub grid: WorldGrid,
    /// Layout stamped at startup, if the map had room for it.
    pub maze: Option<Maze>,
    pub scroll: Scroll,

    // ── Entities ──
    pub player: Player,
    pub items: ItemManager,
    pub npcs: NpcManager,

    // ── Progress ──
    pub quest: QuestState,
    pub tick: u64,

    // ── Respawn ──
    pub spawn: (i32, i32),
    pub spawn_scroll: (i32, i32),

    // ── UI ──
    pub message: Option<Message>,
    pub message_ticks: u32,

    pub rng: ChaCha8Rng,
}

impl SimulationState {
    pub fn new(grid: WorldGrid, spawn: (i32, i32), spawn_scroll: (i32, i32), rng: ChaCha8Rng) -> Self {
        SimulationState {
            grid,
            maze: None,
            scroll: Scroll::new(spawn_scroll.0, spawn_scroll.1),
            player: Player::new(spawn.0, spawn.1),
            items: ItemManager::new(),
            npcs: NpcManager::new(),
            quest: QuestState::Start,
            tick: 0,
            spawn,
            spawn_scroll,
            message: None,
            message_ticks: 90,
            rng,
        }
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(Message::new(text, self.message_ticks));
    }

    /// Map size in tiles, as the scroll clamp wants it.
    pub fn map_tiles(&self) -> (i32, i32) {
        (self.grid.width() as i32, self.grid.height() as i32)
    }
}

/// Items and the player's two-slot inventory.
///
/// Every item exists for the whole session and is always in exactly one of
/// three places: standing in the world, held in an inventory slot, or
/// parked at [`SENTINEL`]. Carried items also sit at the sentinel, so the
/// world never sees them.

use super::geom::{distance, Rect};
use super::grid::WorldGrid;
use super::tile::CollisionCode;

/// Tombstone coordinate for items that are not in the world.
pub const SENTINEL: i32 = -100_000;

pub const PICKUP_RANGE: f64 = 50.0;
/// Reach of the bucket and the axe.
pub const CLEAR_RANGE: f64 = 50.0;
pub const UNLOCK_RANGE: f64 = 100.0;

pub const SLOTS: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ItemId {
    Sword,
    EmptyBucket,
    FilledBucket,
    Axe,
    Key,
    GoldCoins,
    Fire1,
    Fire2,
    Tree1,
    Tree2,
    Door,
}

/// What a tool can act on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tag {
    Fire,
    Tree,
    Door,
}

impl ItemId {
    pub const ALL: [ItemId; 11] = [
        ItemId::Sword, ItemId::EmptyBucket, ItemId::FilledBucket, ItemId::Axe,
        ItemId::Key, ItemId::GoldCoins, ItemId::Fire1, ItemId::Fire2,
        ItemId::Tree1, ItemId::Tree2, ItemId::Door,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemId::Sword => "sword",
            ItemId::EmptyBucket => "bucket",
            ItemId::FilledBucket => "bucket of water",
            ItemId::Axe => "axe",
            ItemId::Key => "key",
            ItemId::GoldCoins => "gold coins",
            ItemId::Fire1 | ItemId::Fire2 => "fire",
            ItemId::Tree1 | ItemId::Tree2 => "tree",
            ItemId::Door => "door",
        }
    }

    /// Whether the player can carry it at all.
    pub fn getable(self) -> bool {
        self.tag().is_none()
    }

    pub fn tag(self) -> Option<Tag> {
        match self {
            ItemId::Fire1 | ItemId::Fire2 => Some(Tag::Fire),
            ItemId::Tree1 | ItemId::Tree2 => Some(Tag::Tree),
            ItemId::Door => Some(Tag::Door),
            _ => None,
        }
    }

    /// Obstacle box relative to the item's anchor.
    pub fn base_box(self) -> Rect {
        match self {
            ItemId::Sword => Rect::new(-15, -13, 16, 8),
            ItemId::EmptyBucket | ItemId::FilledBucket => Rect::new(-15, -13, 31, 15),
            ItemId::Axe => Rect::new(-15, -11, 12, 8),
            ItemId::Key => Rect::new(-10, -10, 20, 8),
            ItemId::GoldCoins => Rect::new(-12, -10, 24, 10),
            ItemId::Fire1 | ItemId::Fire2 => Rect::new(-20, -44, 43, 47),
            ItemId::Tree1 | ItemId::Tree2 => Rect::new(-22, -30, 44, 34),
            ItemId::Door => Rect::new(-24, -40, 48, 44),
        }
    }

    /// First frame on the item sheet; world sprites animate over the next four.
    pub fn sprite(self) -> u16 {
        match self {
            ItemId::Sword => 0,
            ItemId::Axe => 5,
            ItemId::EmptyBucket => 10,
            ItemId::FilledBucket => 15,
            ItemId::Fire1 | ItemId::Fire2 => 20,
            ItemId::Key => 25,
            ItemId::GoldCoins => 30,
            ItemId::Tree1 | ItemId::Tree2 => 35,
            ItemId::Door => 40,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Item {
    pub id: ItemId,
    pub x: i32,
    pub y: i32,
    pub getable: bool,
}

impl Item {
    pub fn is_placed(&self) -> bool {
        self.x != SENTINEL
    }

    fn park(&mut self) {
        self.x = SENTINEL;
        self.y = SENTINEL;
    }
}

/// Result of using the selected item.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UseOutcome {
    /// No slot selected, or the selected slot is empty.
    Nothing,
    BucketFilled,
    NoWater,
    /// Fires put out by a splash (0 means wasted water).
    Doused(usize),
    Chopped(usize),
    Unlocked(usize),
    /// Coins and other passive items do nothing when used.
    Inert(ItemId),
    Attack,
}

#[derive(Clone, Debug)]
pub struct ItemManager {
    items: Vec<Item>,
    inventory: [Option<ItemId>; SLOTS],
    selected: Option<usize>,
}

impl ItemManager {
    /// Every item, all parked.
    pub fn new() -> Self {
        let items = ItemId::ALL.iter()
            .map(|&id| Item { id, x: SENTINEL, y: SENTINEL, getable: id.getable() })
            .collect();
        ItemManager { items, inventory: [None; SLOTS], selected: None }
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn placed(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.is_placed())
    }

    pub fn is_placed(&self, id: ItemId) -> bool {
        self.item(id).is_placed()
    }

    // ── Inventory ──

    pub fn inventory(&self) -> [Option<ItemId>; SLOTS] {
        self.inventory
    }

    pub fn carries(&self, id: ItemId) -> bool {
        self.inventory.contains(&Some(id))
    }

    pub fn selected_slot(&self) -> Option<usize> {
        self.selected
    }

    /// Select `slot`, or deselect it if it was already selected.
    pub fn toggle_slot(&mut self, slot: usize) {
        assert!(slot < SLOTS, "slot {slot} out of range");
        self.selected = if self.selected == Some(slot) { None } else { Some(slot) };
    }

    pub fn selected_item(&self) -> Option<ItemId> {
        self.selected.and_then(|s| self.inventory[s])
    }

    // ── World placement ──

    /// Put an item in the world, taking it out of the inventory if held.
    pub fn place(&mut self, id: ItemId, x: i32, y: i32) {
        self.take_from_inventory(id);
        let item = &mut self.items[id.index()];
        item.x = x;
        item.y = y;
    }

    /// Take an item out of play wherever it is.
    pub fn remove(&mut self, id: ItemId) {
        self.take_from_inventory(id);
        self.items[id.index()].park();
    }

    /// First world item whose base box overlaps `rect`.
    pub fn blocking_item(&self, rect: &Rect) -> Option<ItemId> {
        self.placed()
            .find(|i| i.id.base_box().translate(i.x, i.y).intersects(rect))
            .map(|i| i.id)
    }

    // ── Player actions ──

    /// Pick up the nearest getable world item within range into the first
    /// free slot. `None` when nothing is in range or both slots are full.
    ///
    /// Only getable items compete for "nearest": a fire or tree standing
    /// closer than a sword does not hide the sword.
    pub fn pickup(&mut self, x: i32, y: i32) -> Option<ItemId> {
        let slot = self.inventory.iter().position(Option::is_none)?;
        let (id, dist) = self.placed()
            .filter(|i| i.getable)
            .map(|i| (i.id, distance(x, y, i.x, i.y)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        if dist >= PICKUP_RANGE {
            return None;
        }
        self.items[id.index()].park();
        self.inventory[slot] = Some(id);
        Some(id)
    }

    /// Drop a slot's item just below the dropper's feet.
    pub fn drop(&mut self, slot: usize, x: i32, y: i32) -> Option<ItemId> {
        let id = self.inventory.get_mut(slot)?.take()?;
        let item = &mut self.items[id.index()];
        item.x = x;
        item.y = y + 20;
        Some(id)
    }

    /// Use the selected item while standing at (x, y).
    pub fn use_selected(&mut self, grid: &WorldGrid, x: i32, y: i32) -> UseOutcome {
        let Some(slot) = self.selected else { return UseOutcome::Nothing };
        let Some(id) = self.inventory[slot] else { return UseOutcome::Nothing };

        match id {
            ItemId::EmptyBucket => {
                if !near_water(grid, x, y) {
                    return UseOutcome::NoWater;
                }
                self.swap_held(slot, ItemId::FilledBucket);
                UseOutcome::BucketFilled
            }
            ItemId::FilledBucket => {
                self.swap_held(slot, ItemId::EmptyBucket);
                UseOutcome::Doused(self.clear_tagged(Tag::Fire, x, y, CLEAR_RANGE))
            }
            ItemId::Axe => UseOutcome::Chopped(self.clear_tagged(Tag::Tree, x, y, CLEAR_RANGE)),
            ItemId::Key => {
                let opened = self.clear_tagged(Tag::Door, x, y, UNLOCK_RANGE);
                if opened > 0 {
                    self.remove(ItemId::Key);
                }
                UseOutcome::Unlocked(opened)
            }
            ItemId::Sword => UseOutcome::Attack,
            other => UseOutcome::Inert(other),
        }
    }

    // ── Internal ──

    fn take_from_inventory(&mut self, id: ItemId) {
        for slot in self.inventory.iter_mut() {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }

    /// Replace a held item with another identity of the same object
    /// (the two bucket states), pulling the new identity out of play first.
    fn swap_held(&mut self, slot: usize, to: ItemId) {
        self.remove(to);
        self.inventory[slot] = Some(to);
    }

    fn clear_tagged(&mut self, tag: Tag, x: i32, y: i32, range: f64) -> usize {
        let mut cleared = 0;
        for item in self.items.iter_mut() {
            if item.id.tag() == Some(tag)
                && item.is_placed()
                && distance(x, y, item.x, item.y) < range
            {
                item.park();
                cleared += 1;
            }
        }
        cleared
    }
}

impl Default for ItemManager {
    fn default() -> Self {
        ItemManager::new()
    }
}

/// Is the sub-cell under (x, y), or one of its four neighbours, a shoreline?
fn near_water(grid: &WorldGrid, x: i32, y: i32) -> bool {
    let (row, col) = grid.sub_cell_of(x, y);
    let (row, col) = (row as i64, col as i64);
    [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)].iter().any(|&(dr, dc)| {
        let (r, c) = (row + dr, col + dc);
        r >= 0 && c >= 0
            && (r as usize) < grid.sub_height()
            && (c as usize) < grid.sub_width()
            && grid.collision_at(r as usize, c as usize) == CollisionCode::Fillable
    })
}

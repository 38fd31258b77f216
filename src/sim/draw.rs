/// Draw pass: turns a `SimulationState` into calls on a `Canvas`.
///
/// Order per frame:
///   1. Base and detail layers for the visible window
///   2. Items, player, people and monsters through the depth compositor
///   3. Top layer (roofs, canopies) over everything walking below
///   4. HUD: inventory slots, health bar, quest hint, message line
///
/// Everything is in screen pixels. The canvas decides how a sheet frame
/// looks; this module only decides which frame goes where.

use crate::domain::entity::{Body, Swing, MAX_HEALTH, WALK_FRAMES};
use crate::domain::geom::Rect;
use crate::domain::grid::{Layer, TILE_H, TILE_W};
use crate::domain::item::SLOTS;
use crate::domain::npc::{NpcKind, PersonId};
use crate::domain::scene::Scene;
use super::world::{SimulationState, VIEW_H, VIEW_W};

/// Size of the playfield in pixels.
pub const SCREEN_W: i32 = VIEW_W * TILE_W;
pub const SCREEN_H: i32 = VIEW_H * TILE_H;
/// HUD strip below the playfield.
pub const HUD_H: i32 = 2 * TILE_H;

/// Actor sprites are one tile, drawn with the feet at the bottom centre.
const SPRITE_W: i32 = TILE_W;
const SPRITE_H: i32 = TILE_H;
/// Armed sprites carry the blade, so they sit up and left of the feet.
const ARMED_OFFSET: (i32, i32) = (-12, -12);
/// First swing frame on an actor sheet, after the walk rows.
pub const SWING_BASE: u32 = 4 * WALK_FRAMES;
/// Corpse frame on the monster sheet, after the swing rows.
pub const DEAD_FRAME: u32 = SWING_BASE + 4 * Swing::FRAMES;

/// Item world sprites advance every this many ticks.
const ITEM_ANIM_EVERY: u64 = 7;
const ITEM_ANIM_FRAMES: u64 = 4;

// ── Canvas ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub mod palette {
    use super::Rgb;

    pub const HUD_BG: Rgb = Rgb(20, 20, 60);
    pub const SLOT: Rgb = Rgb(90, 90, 120);
    pub const SLOT_SELECTED: Rgb = Rgb(255, 220, 50);
    pub const HEALTH: Rgb = Rgb(60, 200, 80);
    pub const HEALTH_LOW: Rgb = Rgb(220, 50, 40);
    pub const HEALTH_BG: Rgb = Rgb(50, 20, 20);
    pub const TEXT: Rgb = Rgb(255, 255, 255);
    pub const HINT: Rgb = Rgb(160, 200, 255);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sheet {
    Tiles,
    Items,
    Hero,
    HeroArmed,
    Person(PersonId),
    Monster,
}

/// Rendering collaborator. Implementations own the window or terminal.
pub trait Canvas {
    /// Draw one frame of a sheet with its top-left corner at (x, y).
    fn draw_sprite(&mut self, sheet: Sheet, frame: u32, x: i32, y: i32);
    fn fill_rect(&mut self, rect: Rect, colour: Rgb);
    fn draw_rect(&mut self, rect: Rect, colour: Rgb);
    /// `alpha` 255 is opaque, 0 invisible.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, colour: Rgb, alpha: u8);
    fn draw_text_centred(&mut self, text: &str, y: i32, colour: Rgb, alpha: u8);
}

// ── Frame ──

pub fn draw(state: &SimulationState, canvas: &mut impl Canvas) {
    draw_layer(state, canvas, Layer::Base);
    draw_layer(state, canvas, Layer::Detail);
    draw_entities(state, canvas);
    draw_layer(state, canvas, Layer::Top);
    draw_hud(state, canvas);
}

/// Visible tile range, clipped to the grid.
fn visible(state: &SimulationState) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
    let (map_w, map_h) = state.map_tiles();
    let col0 = state.scroll.x.clamp(0, map_w);
    let row0 = state.scroll.y.clamp(0, map_h);
    let cols = col0 as usize..(col0 + VIEW_W).min(map_w) as usize;
    let rows = row0 as usize..(row0 + VIEW_H).min(map_h) as usize;
    (cols, rows)
}

fn draw_layer(state: &SimulationState, canvas: &mut impl Canvas, layer: Layer) {
    let (cols, rows) = visible(state);
    for row in rows {
        for col in cols.clone() {
            let tile = state.grid.tile_at(layer, row, col);
            // 0 on the upper layers means nothing drawn
            if tile == 0 && layer != Layer::Base {
                continue;
            }
            let (sx, sy) = state.scroll.to_screen(col as i32 * TILE_W, row as i32 * TILE_H);
            canvas.draw_sprite(Sheet::Tiles, tile as u32, sx, sy);
        }
    }
}

// ── Entities ──

#[derive(Clone, Copy, Debug)]
struct Sprite {
    sheet: Sheet,
    frame: u32,
    x: i32,
    y: i32,
}

/// Top-left screen corner for an actor standing at world (x, y).
fn actor_corner(state: &SimulationState, x: i32, y: i32) -> (i32, i32) {
    let (sx, sy) = state.scroll.to_screen(x, y);
    (sx - SPRITE_W / 2, sy - SPRITE_H)
}

fn on_screen(x: i32, y: i32) -> bool {
    x > -SPRITE_W && x < SCREEN_W && y > -SPRITE_H && y < SCREEN_H
}

fn walk_frame(body: &Body) -> u32 {
    body.facing.row() * WALK_FRAMES + body.anim
}

fn swing_frame(body: &Body, swing: &Swing) -> u32 {
    SWING_BASE + body.facing.row() * Swing::FRAMES + swing.frame()
}

fn draw_entities(state: &SimulationState, canvas: &mut impl Canvas) {
    let mut scene = Scene::new();
    let mut submit = |sprite: Sprite, y_key: i32| {
        if on_screen(sprite.x, sprite.y) {
            scene.submit(sprite, y_key);
        }
    };

    let item_phase = ((state.tick / ITEM_ANIM_EVERY) % ITEM_ANIM_FRAMES) as u32;
    for item in state.items.placed() {
        let (x, y) = actor_corner(state, item.x, item.y);
        let frame = item.id.sprite() as u32 + 1 + item_phase;
        submit(Sprite { sheet: Sheet::Items, frame, x, y }, item.y);
    }

    let player = &state.player;
    let body = &player.body;
    let (mut x, mut y) = actor_corner(state, body.x, body.y);
    let sheet = if player.armed {
        x += ARMED_OFFSET.0;
        y += ARMED_OFFSET.1;
        Sheet::HeroArmed
    } else {
        Sheet::Hero
    };
    let frame = if player.swing.is_active() {
        swing_frame(body, &player.swing)
    } else {
        walk_frame(body)
    };
    submit(Sprite { sheet, frame, x, y }, body.y);

    // People before monsters so equal-depth ties keep that order.
    let people = state.npcs.iter().filter(|n| matches!(n.kind, NpcKind::Person(_)));
    let monsters = state.npcs.iter().filter(|n| matches!(n.kind, NpcKind::Monster(_)));
    for npc in people.chain(monsters) {
        let (x, y) = actor_corner(state, npc.body.x, npc.body.y);
        let (sheet, frame) = match &npc.kind {
            NpcKind::Person(p) => (Sheet::Person(p.id), walk_frame(&npc.body)),
            NpcKind::Monster(m) if m.is_dead() => (Sheet::Monster, DEAD_FRAME),
            NpcKind::Monster(m) if m.swing.is_active() => {
                (Sheet::Monster, swing_frame(&npc.body, &m.swing))
            }
            NpcKind::Monster(_) => (Sheet::Monster, walk_frame(&npc.body)),
        };
        submit(Sprite { sheet, frame, x, y }, npc.body.y);
    }

    scene.flush(|s| canvas.draw_sprite(s.sheet, s.frame, s.x, s.y));
}

// ── HUD ──

const SLOT_SIZE: i32 = 48;
const SLOT_GAP: i32 = 8;
const BAR_X: i32 = 2 * (SLOT_SIZE + SLOT_GAP) + 16;
const BAR_W: i32 = 200;
const BAR_H: i32 = 16;
const HINT_X: i32 = BAR_X + BAR_W + 24;

fn draw_hud(state: &SimulationState, canvas: &mut impl Canvas) {
    use palette::*;

    canvas.fill_rect(Rect::new(0, SCREEN_H, SCREEN_W, HUD_H), HUD_BG);

    let top = SCREEN_H + SLOT_GAP;
    let inventory = state.items.inventory();
    let selected = state.items.selected_slot();
    for slot in 0..SLOTS {
        let x = SLOT_GAP + slot as i32 * (SLOT_SIZE + SLOT_GAP);
        let colour = if selected == Some(slot) { SLOT_SELECTED } else { SLOT };
        canvas.draw_rect(Rect::new(x, top, SLOT_SIZE, SLOT_SIZE), colour);
        if let Some(id) = inventory[slot] {
            canvas.draw_sprite(Sheet::Items, id.sprite() as u32, x, top);
        }
    }

    let health = state.player.health.clamp(0, MAX_HEALTH);
    let filled = BAR_W * health / MAX_HEALTH;
    let colour = if health * 4 <= MAX_HEALTH { HEALTH_LOW } else { HEALTH };
    canvas.fill_rect(Rect::new(BAR_X, top, BAR_W, BAR_H), HEALTH_BG);
    if filled > 0 {
        canvas.fill_rect(Rect::new(BAR_X, top, filled, BAR_H), colour);
    }

    canvas.draw_text(state.quest.objective(), HINT_X, top, HINT, 255);

    if let Some(msg) = &state.message {
        canvas.draw_text_centred(&msg.text, SCREEN_H + TILE_H, TEXT, msg.alpha());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::domain::grid::WorldGrid;
    use crate::domain::item::ItemId;
    use crate::domain::npc::{MonsterId, MonsterMove, PersonMove};

    #[derive(Debug, PartialEq)]
    enum Op {
        Sprite(Sheet, u32, i32, i32),
        Fill(Rect, Rgb),
        Outline(Rect, Rgb),
        Text(String, u8),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Recorder {
        fn sprites(&self, want: fn(Sheet) -> bool) -> Vec<(usize, &Op)> {
            self.ops
                .iter()
                .enumerate()
                .filter(|(_, op)| matches!(op, Op::Sprite(s, ..) if want(*s)))
                .collect()
        }
    }

    impl Canvas for Recorder {
        fn draw_sprite(&mut self, sheet: Sheet, frame: u32, x: i32, y: i32) {
            self.ops.push(Op::Sprite(sheet, frame, x, y));
        }
        fn fill_rect(&mut self, rect: Rect, colour: Rgb) {
            self.ops.push(Op::Fill(rect, colour));
        }
        fn draw_rect(&mut self, rect: Rect, colour: Rgb) {
            self.ops.push(Op::Outline(rect, colour));
        }
        fn draw_text(&mut self, text: &str, _x: i32, _y: i32, _colour: Rgb, alpha: u8) {
            self.ops.push(Op::Text(text.to_string(), alpha));
        }
        fn draw_text_centred(&mut self, text: &str, _y: i32, _colour: Rgb, alpha: u8) {
            self.ops.push(Op::Text(text.to_string(), alpha));
        }
    }

    fn small_state() -> SimulationState {
        let grid = WorldGrid::new(20, 15);
        SimulationState::new(grid, (200, 200), (0, 0), ChaCha8Rng::seed_from_u64(5))
    }

    fn record(state: &SimulationState) -> Recorder {
        let mut rec = Recorder::default();
        draw(state, &mut rec);
        rec
    }

    #[test]
    fn roofs_draw_over_the_player() {
        let mut s = small_state();
        s.grid.set_tile(Layer::Top, 3, 4, 40);
        let rec = record(&s);
        let base = (VIEW_W * VIEW_H) as usize;
        assert!(matches!(rec.ops[base], Op::Sprite(Sheet::Hero, ..)));
        assert_eq!(rec.ops[base + 1], Op::Sprite(Sheet::Tiles, 40, 4 * 48, 3 * 48));
    }

    #[test]
    fn window_is_clipped_at_the_map_edge() {
        let mut s = small_state();
        s.scroll.reset(10, 10);
        s.player.body.set_position(12 * 48, 12 * 48);
        let rec = record(&s);
        // 10 columns by 5 rows left inside a 20x15 map
        assert_eq!(rec.sprites(|sh| sh == Sheet::Tiles).len(), 50);
    }

    #[test]
    fn entities_draw_back_to_front() {
        let mut s = small_state();
        s.npcs.add_person(PersonId::Lady, 240, 260, PersonMove::None);
        s.npcs.add_person(PersonId::Kid, 300, 150, PersonMove::None);
        let rec = record(&s);
        let order: Vec<Sheet> = rec
            .sprites(|sh| sh != Sheet::Tiles)
            .into_iter()
            .map(|(_, op)| match op {
                Op::Sprite(sheet, ..) => *sheet,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(
            order,
            [Sheet::Person(PersonId::Kid), Sheet::Hero, Sheet::Person(PersonId::Lady)]
        );
    }

    #[test]
    fn people_draw_before_monsters_at_equal_depth() {
        let mut s = small_state();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        s.npcs.add_monster(MonsterId::VillageOrc, 300, 260, MonsterMove::None, &mut rng);
        s.npcs.add_person(PersonId::Lady, 240, 260, PersonMove::None);
        let rec = record(&s);
        let order: Vec<Sheet> = rec
            .sprites(|sh| matches!(sh, Sheet::Person(_) | Sheet::Monster))
            .into_iter()
            .map(|(_, op)| match op {
                Op::Sprite(sheet, ..) => *sheet,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(order, [Sheet::Person(PersonId::Lady), Sheet::Monster]);
    }

    #[test]
    fn parked_items_stay_invisible() {
        let mut s = small_state();
        s.items.place(ItemId::EmptyBucket, 400, 300);
        let rec = record(&s);
        let items = rec.sprites(|sh| sh == Sheet::Items);
        assert_eq!(items.len(), 1);
        let first = ItemId::EmptyBucket.sprite() as u32 + 1;
        assert!(matches!(items[0].1, Op::Sprite(_, f, 376, 252) if *f == first));
    }

    #[test]
    fn item_animation_cycles_every_seven_ticks() {
        let mut s = small_state();
        s.items.place(ItemId::Fire1, 400, 300);
        let frame_at = |s: &SimulationState| match record(s).sprites(|sh| sh == Sheet::Items)[0].1 {
            Op::Sprite(_, f, ..) => *f,
            _ => unreachable!(),
        };
        let base = ItemId::Fire1.sprite() as u32 + 1;
        s.tick = 6;
        assert_eq!(frame_at(&s), base);
        s.tick = 7;
        assert_eq!(frame_at(&s), base + 1);
        s.tick = 28;
        assert_eq!(frame_at(&s), base);
    }

    #[test]
    fn selected_slot_is_highlighted() {
        let mut s = small_state();
        s.items.place(ItemId::Axe, 200, 200);
        assert_eq!(s.items.pickup(200, 200), Some(ItemId::Axe));
        s.items.toggle_slot(0);
        let rec = record(&s);
        let outlines: Vec<Rgb> = rec
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Outline(_, c) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(outlines, [palette::SLOT_SELECTED, palette::SLOT]);
        assert!(rec.ops.contains(&Op::Sprite(Sheet::Items, ItemId::Axe.sprite() as u32, 8, SCREEN_H + 8)));
    }

    #[test]
    fn health_bar_shrinks_with_damage() {
        let mut s = small_state();
        s.player.take_damage(60);
        let rec = record(&s);
        assert!(rec.ops.contains(&Op::Fill(Rect::new(BAR_X, SCREEN_H + 8, 80, BAR_H), palette::HEALTH)));
        s.player.take_damage(30);
        let rec = record(&s);
        assert!(rec.ops.contains(&Op::Fill(Rect::new(BAR_X, SCREEN_H + 8, 20, BAR_H), palette::HEALTH_LOW)));
    }

    #[test]
    fn message_carries_its_fade() {
        let mut s = small_state();
        s.message_ticks = 10;
        s.set_message("Hello");
        for _ in 0..8 {
            if let Some(m) = s.message.as_mut() {
                m.tick();
            }
        }
        let rec = record(&s);
        let alpha = rec.ops.iter().find_map(|op| match op {
            Op::Text(t, a) if t == "Hello" => Some(*a),
            _ => None,
        });
        assert!(matches!(alpha, Some(a) if a < 255));
    }
}

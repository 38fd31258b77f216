/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Actions (pickup, drop, slot select, use, talk)
///   2. Scroll lock: an easing camera consumes the tick
///   3. Player movement (teleports, ship passage gate)
///   4. Scroll trigger
///   5. NPC updates (people, monsters, monster strikes)
///   6. Player status (swing timer, regen, knock-out)
///   7. Message fade
///
/// Every mover in one tick sees the same `tick`, so the staircase window
/// is shared.

use tracing::{debug, info};

use crate::domain::entity::{MAX_HEALTH, PLAYER_SPEED};
use crate::domain::geom::{distance, Facing};
use crate::domain::item::{ItemId, UseOutcome, SLOTS};
use crate::domain::npc::{Hit, PersonId, PlayerView};
use crate::domain::physics::{self, MoveCtx, Probe};
use crate::domain::quest::{self, TalkContext, RETURN_RANGE};
use crate::domain::tile::Teleport;
use super::event::GameEvent;
use super::world::SimulationState;

pub const TALK_RANGE: f64 = 80.0;
pub const SWORD_DAMAGE: i32 = 10;
pub const MONSTER_DAMAGE: i32 = 5;

/// Per-tick player intent. Movement is held; everything else is a press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Held movement, each axis in -1..=1.
    pub dx: i32,
    pub dy: i32,
    pub pickup: bool,
    pub drop: bool,
    /// Toggle this inventory slot.
    pub slot: Option<usize>,
    pub use_item: bool,
    pub talk: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(state: &mut SimulationState, input: FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    state.tick += 1;

    resolve_actions(state, &input, &mut events);

    if !state.scroll.advance() {
        resolve_player_movement(state, &input, &mut events);
        resolve_scroll_trigger(state, &mut events);
        resolve_npcs(state, &mut events);
    }

    resolve_player_status(state, &mut events);
    resolve_message(state);

    events
}

// ══════════════════════════════════════════════════════════════
// Actions
// ══════════════════════════════════════════════════════════════

fn resolve_actions(state: &mut SimulationState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if let Some(slot) = input.slot.filter(|&s| s < SLOTS) {
        state.items.toggle_slot(slot);
    }
    if input.pickup {
        pickup(state, events);
    }
    if input.drop {
        drop_item(state, events);
    }
    if input.use_item && state.player.can_move() {
        use_item(state, events);
    }
    if input.talk {
        talk(state, events);
    }
    state.player.armed = state.items.selected_item() == Some(ItemId::Sword);
}

fn pickup(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    let (x, y) = (state.player.body.x, state.player.body.y);
    match state.items.pickup(x, y) {
        Some(id) => {
            debug!(item = ?id, "picked up");
            state.set_message(format!("You picked up the {}.", id.name()));
            events.push(GameEvent::PickedUp(id));
        }
        None if state.items.inventory().iter().all(Option::is_some) => {
            state.set_message("Your hands are full.");
        }
        None => state.set_message("There's nothing here to pick up."),
    }
}

/// Drops the selected slot, or the first occupied one when nothing is
/// selected.
fn drop_item(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    let inv = state.items.inventory();
    let slot = state.items.selected_slot()
        .filter(|&s| inv[s].is_some())
        .or_else(|| inv.iter().position(Option::is_some));
    let Some(slot) = slot else {
        state.set_message("You aren't carrying anything.");
        return;
    };
    let (x, y) = (state.player.body.x, state.player.body.y);
    if let Some(id) = state.items.drop(slot, x, y) {
        debug!(item = ?id, slot, "dropped");
        state.set_message(format!("You drop the {}.", id.name()));
        events.push(GameEvent::Dropped(id));
    }
}

fn use_item(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    let (x, y) = (state.player.body.x, state.player.body.y);
    let outcome = state.items.use_selected(&state.grid, x, y);
    let text = match outcome {
        UseOutcome::Nothing => "Select an item first (1 or 2).".to_string(),
        UseOutcome::BucketFilled => {
            events.push(GameEvent::BucketFilled);
            "You fill the bucket with water.".to_string()
        }
        UseOutcome::NoWater => "There's no water here.".to_string(),
        UseOutcome::Doused(n) => {
            events.push(GameEvent::Splash { doused: n });
            match n {
                0 => "Splash! The water soaks into the ground.".to_string(),
                1 => "The fire hisses out.".to_string(),
                n => format!("You put out {n} fires."),
            }
        }
        UseOutcome::Chopped(n) => {
            events.push(GameEvent::Chopped { trees: n });
            match n {
                0 => "You swing the axe at nothing.".to_string(),
                1 => "You chop down the tree.".to_string(),
                n => format!("You chop down {n} trees."),
            }
        }
        UseOutcome::Unlocked(0) => "There's no lock nearby.".to_string(),
        UseOutcome::Unlocked(n) => {
            info!(doors = n, "door unlocked");
            events.push(GameEvent::Unlocked { doors: n });
            "The key turns and the gate swings open.".to_string()
        }
        UseOutcome::Inert(id) => format!("You can't use the {} here.", id.name()),
        UseOutcome::Attack => {
            attack(state, events);
            return;
        }
    };
    state.set_message(text);
}

fn attack(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    if !state.player.swing.start() {
        return;
    }
    events.push(GameEvent::Swing);
    let hitbox = state.player.attack_box();
    for hit in state.npcs.strike(&hitbox, SWORD_DAMAGE) {
        match hit {
            Hit::Wounded(id) => events.push(GameEvent::MonsterHit(id)),
            Hit::Killed(id) => {
                info!(monster = ?id, "monster killed");
                events.push(GameEvent::MonsterKilled(id));
            }
        }
    }
}

fn talk(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    let (x, y) = (state.player.body.x, state.player.body.y);
    let Some(who) = state.npcs.nearest_person(x, y, TALK_RANGE) else {
        state.set_message("There's nobody to talk to.");
        return;
    };

    let speaker = &state.npcs.person(who).body;
    let kid = &state.npcs.person(PersonId::Kid).body;
    let old_man = &state.npcs.person(PersonId::OldMan).body;
    let ctx = TalkContext {
        quest: state.quest,
        speaker: (speaker.x, speaker.y),
        has_axe: state.items.carries(ItemId::Axe),
        has_coins: state.items.carries(ItemId::GoldCoins),
        kid_nearby: distance(kid.x, kid.y, old_man.x, old_man.y) < RETURN_RANGE,
    };

    let reply = quest::talk(who, &ctx);
    state.set_message(format!("{}: {}", who.name(), reply.line));
    events.push(GameEvent::Talked(who));

    if let Some(q) = quest::apply(&reply.effects, &mut state.quest, &mut state.npcs, &mut state.items) {
        info!(quest = ?q, speaker = who.name(), "quest advanced");
        events.push(GameEvent::QuestAdvanced(q));
    }
}

// ══════════════════════════════════════════════════════════════
// Player movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(state: &mut SimulationState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if !state.player.can_move() {
        return;
    }
    let (dx, dy) = (input.dx.signum(), input.dy.signum());
    if dx == 0 && dy == 0 {
        return;
    }

    let before = (state.player.body.x, state.player.body.y);
    let ctx = MoveCtx { grid: &state.grid, items: &state.items, tick: state.tick };
    let probe = physics::step_body(&mut state.player.body, dx, dy, PLAYER_SPEED, &ctx);

    match probe {
        Probe::Teleport(Teleport::G) if !state.items.carries(ItemId::GoldCoins) => {
            state.player.body.set_position(before.0, before.1);
            state.player.body.bump();
            state.set_message("Sailor: No coins, no passage!");
            events.push(GameEvent::PassageRefused);
        }
        Probe::Teleport(t) => {
            if t == Teleport::G {
                state.items.remove(ItemId::GoldCoins);
                state.set_message("You hand over the coins and board the ship.");
            }
            teleport(state, t, events);
        }
        Probe::Clear | Probe::Wall | Probe::ItemBlocked(_) => {}
    }
}

fn teleport(state: &mut SimulationState, t: Teleport, events: &mut Vec<GameEvent>) {
    let dest = t.destination();
    state.player.body.set_position(dest.x, dest.y);
    state.scroll.reset(dest.scroll_x, dest.scroll_y);
    info!(pad = ?t, x = dest.x, y = dest.y, "teleported");
    events.push(GameEvent::Teleported(t));
}

fn resolve_scroll_trigger(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    let (map_w, map_h) = state.map_tiles();
    let (x, y) = (state.player.body.x, state.player.body.y);
    if state.scroll.queue_for(x, y, map_w, map_h) {
        debug!(from_x = state.scroll.x, from_y = state.scroll.y, "scroll started");
        events.push(GameEvent::ScrollStarted);
    }
}

// ══════════════════════════════════════════════════════════════
// NPCs
// ══════════════════════════════════════════════════════════════

fn resolve_npcs(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    let view = PlayerView {
        x: state.player.body.x,
        y: state.player.body.y,
        facing: state.player.body.facing,
    };
    let ctx = MoveCtx { grid: &state.grid, items: &state.items, tick: state.tick };
    let strikes = state.npcs.update(&ctx, view, &mut state.rng);

    for id in strikes {
        state.player.take_damage(MONSTER_DAMAGE);
        debug!(monster = ?id, health = state.player.health, "player hit");
        events.push(GameEvent::PlayerHurt { health: state.player.health });
    }
}

// ══════════════════════════════════════════════════════════════
// Player status
// ══════════════════════════════════════════════════════════════

fn resolve_player_status(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    state.player.swing.tick();
    state.player.regenerate(state.tick);
    if state.player.is_knocked_out() {
        knock_out(state, events);
    }
}

/// Back to the village with full health. Quest and inventory are kept.
fn knock_out(state: &mut SimulationState, events: &mut Vec<GameEvent>) {
    let (x, y) = state.spawn;
    let p = &mut state.player;
    p.body.set_position(x, y);
    p.body.facing = Facing::Down;
    p.health = MAX_HEALTH;
    p.swing.cancel();
    state.scroll.reset(state.spawn_scroll.0, state.spawn_scroll.1);
    info!(tick = state.tick, "player knocked out");
    state.set_message("You were knocked out... and wake up back in the village.");
    events.push(GameEvent::KnockedOut);
}

fn resolve_message(state: &mut SimulationState) {
    if let Some(m) = state.message.as_mut() {
        if !m.tick() {
            state.message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{TILE_H, TILE_W};
    use crate::domain::npc::MonsterId;
    use crate::domain::quest::QuestState;
    use crate::sim::content::{new_game, SPAWN_SCROLL};
    use crate::sim::map::{self, PADS};
    use crate::sim::world::SimulationState;

    fn game() -> SimulationState {
        new_game(map::builtin(), Some(99)).unwrap()
    }

    fn pad_centre(t: Teleport) -> (i32, i32) {
        let (_, (c, r)) = PADS.iter().find(|(p, _)| *p == t).copied().unwrap();
        (c as i32 * TILE_W + TILE_W / 2, r as i32 * TILE_H + TILE_H / 2)
    }

    fn walk(dx: i32, dy: i32) -> FrameInput {
        FrameInput { dx, dy, ..FrameInput::default() }
    }

    fn give(state: &mut SimulationState, id: ItemId) {
        let (x, y) = (state.player.body.x, state.player.body.y);
        state.items.place(id, x, y);
        assert_eq!(state.items.pickup(x, y), Some(id));
    }

    // ── Scroll ──

    #[test]
    fn scroll_locks_player_and_npcs_until_done() {
        let mut s = game();
        s.player.body.set_position(60 * TILE_W + 719, 87 * TILE_H);
        let events = step(&mut s, walk(1, 0));
        assert!(events.contains(&GameEvent::ScrollStarted));

        let frozen = s.player.body.x;
        let lady = s.npcs.person(PersonId::Lady).body.clone();
        for _ in 0..12 {
            step(&mut s, walk(1, 0));
            assert_eq!(s.player.body.x, frozen);
            let now = &s.npcs.person(PersonId::Lady).body;
            assert_eq!((now.x, now.y), (lady.x, lady.y));
        }
        assert_eq!(s.scroll.x, 72);
        step(&mut s, walk(1, 0));
        assert_eq!(s.player.body.x, frozen + PLAYER_SPEED);
    }

    // ── Teleports ──

    #[test]
    fn pad_relocates_player_and_camera() {
        let mut s = game();
        let (x, y) = pad_centre(Teleport::E);
        s.player.body.set_position(x + TILE_W / 2 + 2, y);
        let events = step(&mut s, walk(-1, 0));
        assert!(events.contains(&GameEvent::Teleported(Teleport::E)));
        let dest = Teleport::E.destination();
        assert_eq!((s.player.body.x, s.player.body.y), (dest.x, dest.y));
        assert_eq!((s.scroll.x, s.scroll.y), (dest.scroll_x, dest.scroll_y));
    }

    #[test]
    fn ship_passage_needs_coins() {
        let mut s = game();
        let (x, y) = pad_centre(Teleport::G);
        let start = (x + TILE_W / 2 + 2, y);
        s.player.body.set_position(start.0, start.1);
        s.scroll.reset(30, 92);

        let events = step(&mut s, walk(-1, 0));
        assert!(events.contains(&GameEvent::PassageRefused));
        assert_eq!((s.player.body.x, s.player.body.y), start);

        give(&mut s, ItemId::GoldCoins);
        let events = step(&mut s, walk(-1, 0));
        assert!(events.contains(&GameEvent::Teleported(Teleport::G)));
        assert!(!s.items.carries(ItemId::GoldCoins));
        assert!(!s.items.is_placed(ItemId::GoldCoins));
    }

    // ── Combat ──

    #[test]
    fn sword_swing_hits_and_locks_movement() {
        let mut s = game();
        let (orc, _) = s.npcs.monster(MonsterId::VillageOrc);
        let (ox, oy) = (orc.x, orc.y);
        s.player.body.set_position(ox + 40, oy);
        s.scroll.reset(80, 84);
        give(&mut s, ItemId::Sword);
        s.items.toggle_slot(0);
        s.player.body.facing = Facing::Left;

        let events = step(&mut s, FrameInput { use_item: true, ..FrameInput::default() });
        assert!(events.contains(&GameEvent::Swing));
        assert!(events.contains(&GameEvent::MonsterHit(MonsterId::VillageOrc)));
        assert!(s.player.armed);

        let held = (s.player.body.x, s.player.body.y);
        let events = step(&mut s, FrameInput { dx: 1, use_item: true, ..FrameInput::default() });
        assert!(!events.contains(&GameEvent::Swing));
        assert_eq!((s.player.body.x, s.player.body.y), held);
        assert_eq!(s.npcs.monster(MonsterId::VillageOrc).1.health, 40);
    }

    #[test]
    fn knock_out_returns_player_to_the_village() {
        let mut s = game();
        let dest = Teleport::E.destination();
        s.player.body.set_position(dest.x, dest.y);
        s.scroll.reset(dest.scroll_x, dest.scroll_y);
        give(&mut s, ItemId::Axe);
        s.quest = QuestState::Blacksmith;
        s.player.health = 0;

        let events = step(&mut s, FrameInput::default());
        assert!(events.contains(&GameEvent::KnockedOut));
        assert_eq!((s.player.body.x, s.player.body.y), s.spawn);
        assert_eq!((s.scroll.x, s.scroll.y), SPAWN_SCROLL);
        assert_eq!(s.player.health, MAX_HEALTH);
        assert!(s.items.carries(ItemId::Axe));
        assert_eq!(s.quest, QuestState::Blacksmith);
    }

    // ── Actions ──

    #[test]
    fn talking_to_the_old_man_starts_the_quest() {
        let mut s = game();
        let old = s.npcs.person(PersonId::OldMan).body.clone();
        s.player.body.set_position(old.x, old.y + 44);
        s.scroll.reset(12, 28);
        let events = step(&mut s, FrameInput { talk: true, ..FrameInput::default() });
        assert!(events.contains(&GameEvent::Talked(PersonId::OldMan)));
        assert!(events.contains(&GameEvent::QuestAdvanced(QuestState::Blacksmith)));
        assert_eq!(s.quest, QuestState::Blacksmith);
        assert!(s.message.as_ref().unwrap().text.starts_with("Old man:"));
    }

    #[test]
    fn pickup_then_drop_round_trips_through_the_slot() {
        let mut s = game();
        let bucket = s.items.item(ItemId::EmptyBucket).clone();
        s.player.body.set_position(bucket.x, bucket.y + 10);
        s.scroll.reset(12, 30);

        let events = step(&mut s, FrameInput { pickup: true, ..FrameInput::default() });
        assert_eq!(events, vec![GameEvent::PickedUp(ItemId::EmptyBucket)]);

        let events = step(&mut s, FrameInput { drop: true, ..FrameInput::default() });
        assert_eq!(events, vec![GameEvent::Dropped(ItemId::EmptyBucket)]);
        let dropped = s.items.item(ItemId::EmptyBucket);
        assert_eq!((dropped.x, dropped.y), (bucket.x, bucket.y + 30));
    }

    fn use_selected(state: &mut SimulationState) -> (Vec<GameEvent>, String) {
        let events = step(state, FrameInput { use_item: true, ..FrameInput::default() });
        let text = state.message.as_ref().map(|m| m.text.clone()).unwrap_or_default();
        (events, text)
    }

    #[test]
    fn douse_reports_none_one_or_many_fires() {
        let mut s = game();
        let (x, y) = (s.player.body.x, s.player.body.y);
        let refill = |s: &mut SimulationState| {
            s.items.remove(ItemId::EmptyBucket);
            give(s, ItemId::FilledBucket);
        };
        refill(&mut s);
        s.items.toggle_slot(0);

        let (events, text) = use_selected(&mut s);
        assert_eq!(events, vec![GameEvent::Splash { doused: 0 }]);
        assert_eq!(text, "Splash! The water soaks into the ground.");

        refill(&mut s);
        s.items.place(ItemId::Fire1, x, y + 30);
        let (events, text) = use_selected(&mut s);
        assert_eq!(events, vec![GameEvent::Splash { doused: 1 }]);
        assert_eq!(text, "The fire hisses out.");

        refill(&mut s);
        s.items.place(ItemId::Fire1, x, y + 30);
        s.items.place(ItemId::Fire2, x, y - 30);
        let (events, text) = use_selected(&mut s);
        assert_eq!(events, vec![GameEvent::Splash { doused: 2 }]);
        assert_eq!(text, "You put out 2 fires.");
        assert_eq!(s.items.selected_item(), Some(ItemId::EmptyBucket));
    }

    #[test]
    fn chop_reports_none_one_or_many_trees() {
        let mut s = game();
        let (x, y) = (s.player.body.x, s.player.body.y);
        give(&mut s, ItemId::Axe);
        s.items.toggle_slot(0);

        let (events, text) = use_selected(&mut s);
        assert_eq!(events, vec![GameEvent::Chopped { trees: 0 }]);
        assert_eq!(text, "You swing the axe at nothing.");
        assert!(s.items.is_placed(ItemId::Tree1));

        s.items.place(ItemId::Tree1, x, y + 30);
        let (events, text) = use_selected(&mut s);
        assert_eq!(events, vec![GameEvent::Chopped { trees: 1 }]);
        assert_eq!(text, "You chop down the tree.");

        s.items.place(ItemId::Tree1, x, y + 30);
        s.items.place(ItemId::Tree2, x, y - 30);
        let (events, text) = use_selected(&mut s);
        assert_eq!(events, vec![GameEvent::Chopped { trees: 2 }]);
        assert_eq!(text, "You chop down 2 trees.");
        assert!(!s.items.is_placed(ItemId::Tree1) && !s.items.is_placed(ItemId::Tree2));
        assert!(s.items.carries(ItemId::Axe));
    }

    #[test]
    fn use_with_nothing_selected_only_shows_a_message() {
        let mut s = game();
        let events = step(&mut s, FrameInput { use_item: true, ..FrameInput::default() });
        assert!(events.is_empty());
        assert!(s.message.is_some());
    }
}

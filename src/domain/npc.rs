/// Non-player characters: villagers and monsters.
///
/// One tagged type covers both. Shared movement state lives in [`Body`];
/// behaviour is a per-variant payload dispatched with a `match`.
///
/// ## Behaviours
///
///   - Person `Wander`: every 60 to 90 ticks pick one of five headings
///     (including standing still) and walk it until the timer runs out.
///   - Person `Follow`: seek the tile behind the player; snap there when
///     more than 15 tiles adrift.
///   - Monster `Rails`: seek the centre of the tile the rail underfoot
///     points at.
///   - Monster `Attack`: seek the player plus a per-monster offset and
///     swing when close.
///
/// Idle and railed monsters engage when the player enters their proximity
/// box; engaged monsters snap back home once the player is 15 tiles away.

use rand::Rng;

use super::entity::{Body, Swing, NPC_SPEED};
use super::geom::{distance, Facing, Rect};
use super::grid::{TILE_H, TILE_W};
use super::physics::{self, MoveCtx};

pub const WANDER_FIRST: u32 = 60;
pub const WANDER_MIN: u32 = 60;
pub const WANDER_MAX: u32 = 90;
pub const CATCH_UP_TILES: i32 = 15;
pub const LEASH_TILES: i32 = 15;
/// Half-extents of the box around a monster that wakes it.
pub const ENGAGE_X: i32 = 240;
pub const ENGAGE_Y: i32 = 192;
pub const MONSTER_HEALTH: i32 = 50;
pub const MELEE_RANGE: f64 = 50.0;
pub const STRIKE_CHANCE: f64 = 0.05;
/// Chase offsets are drawn from `-CHASE_SPREAD..=CHASE_SPREAD` per axis.
pub const CHASE_SPREAD: i32 = 20;

/// Hit box of a monster's body, relative to its feet.
pub const MONSTER_BODY: Rect = Rect::new(-18, -60, 36, 60);

const HEADINGS: [(i32, i32); 5] = [(0, 0), (0, -1), (-1, 0), (0, 1), (1, 0)];

// ── Identities ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PersonId {
    OldMan,
    Lady,
    Kid,
    Blacksmith,
    Sailor,
}

impl PersonId {
    pub const COUNT: usize = 5;

    pub fn name(self) -> &'static str {
        match self {
            PersonId::OldMan => "Old man",
            PersonId::Lady => "Lady",
            PersonId::Kid => "Kid",
            PersonId::Blacksmith => "Blacksmith",
            PersonId::Sailor => "Sailor",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MonsterId {
    VillageOrc,
    MazeOrc1,
    MazeOrc2,
}

impl MonsterId {
    pub const COUNT: usize = 3;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PersonMove {
    None,
    Wander,
    Follow,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonsterMove {
    None,
    Rails,
    Attack,
    Dead,
}

// ── Variants ──

#[derive(Clone, Debug)]
pub struct Person {
    pub id: PersonId,
    pub movement: PersonMove,
    timer: u32,
    heading: (i32, i32),
}

#[derive(Clone, Copy, Debug)]
struct Home {
    x: i32,
    y: i32,
    facing: Facing,
    movement: MonsterMove,
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub id: MonsterId,
    pub movement: MonsterMove,
    pub health: i32,
    pub swing: Swing,
    home: Home,
    chase_offset: (i32, i32),
}

impl Monster {
    pub fn is_dead(&self) -> bool {
        self.movement == MonsterMove::Dead
    }
}

#[derive(Clone, Debug)]
pub enum NpcKind {
    Person(Person),
    Monster(Monster),
}

#[derive(Clone, Debug)]
pub struct Npc {
    pub body: Body,
    pub kind: NpcKind,
}

/// What NPCs get to know about the player each tick.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
}

/// Outcome of a sword sweep on one monster.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Hit {
    Wounded(MonsterId),
    Killed(MonsterId),
}

// ── Manager ──

#[derive(Clone, Debug, Default)]
pub struct NpcManager {
    npcs: Vec<Npc>,
    person_index: [Option<usize>; PersonId::COUNT],
    monster_index: [Option<usize>; MonsterId::COUNT],
}

impl NpcManager {
    pub fn new() -> Self {
        NpcManager::default()
    }

    pub fn add_person(&mut self, id: PersonId, x: i32, y: i32, movement: PersonMove) {
        assert!(self.person_index[id as usize].is_none(), "{id:?} added twice");
        self.person_index[id as usize] = Some(self.npcs.len());
        self.npcs.push(Npc {
            body: Body::new(x, y),
            kind: NpcKind::Person(Person { id, movement, timer: WANDER_FIRST, heading: (0, 0) }),
        });
    }

    pub fn add_monster<R: Rng + ?Sized>(
        &mut self,
        id: MonsterId,
        x: i32,
        y: i32,
        movement: MonsterMove,
        rng: &mut R,
    ) {
        assert!(self.monster_index[id as usize].is_none(), "{id:?} added twice");
        let body = Body::new(x, y);
        let chase_offset = (
            rng.gen_range(-CHASE_SPREAD..=CHASE_SPREAD),
            rng.gen_range(-CHASE_SPREAD..=CHASE_SPREAD),
        );
        let home = Home { x, y, facing: body.facing, movement };
        self.monster_index[id as usize] = Some(self.npcs.len());
        self.npcs.push(Npc {
            body,
            kind: NpcKind::Monster(Monster {
                id,
                movement,
                health: MONSTER_HEALTH,
                swing: Swing::default(),
                home,
                chase_offset,
            }),
        });
    }

    /// Every NPC in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.iter()
    }

    pub fn person(&self, id: PersonId) -> &Npc {
        let i = self.person_index[id as usize]
            .unwrap_or_else(|| panic!("{id:?} not in the world"));
        &self.npcs[i]
    }

    fn person_mut(&mut self, id: PersonId) -> (&mut Body, &mut Person) {
        let i = self.person_index[id as usize]
            .unwrap_or_else(|| panic!("{id:?} not in the world"));
        let npc = &mut self.npcs[i];
        match &mut npc.kind {
            NpcKind::Person(p) => (&mut npc.body, p),
            NpcKind::Monster(_) => unreachable!("person index points at a monster"),
        }
    }

    pub fn person_movement(&self, id: PersonId) -> PersonMove {
        match &self.person(id).kind {
            NpcKind::Person(p) => p.movement,
            NpcKind::Monster(_) => unreachable!("person index points at a monster"),
        }
    }

    pub fn set_person_movement(&mut self, id: PersonId, movement: PersonMove) {
        self.person_mut(id).1.movement = movement;
    }

    pub fn monster(&self, id: MonsterId) -> (&Body, &Monster) {
        let i = self.monster_index[id as usize]
            .unwrap_or_else(|| panic!("{id:?} not in the world"));
        let npc = &self.npcs[i];
        match &npc.kind {
            NpcKind::Monster(m) => (&npc.body, m),
            NpcKind::Person(_) => unreachable!("monster index points at a person"),
        }
    }

    /// Closest villager within `range` of (x, y).
    pub fn nearest_person(&self, x: i32, y: i32, range: f64) -> Option<PersonId> {
        self.npcs.iter()
            .filter_map(|n| match &n.kind {
                NpcKind::Person(p) => Some((p.id, distance(x, y, n.body.x, n.body.y))),
                NpcKind::Monster(_) => None,
            })
            .filter(|&(_, d)| d < range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Advance every NPC one tick. Returns the monsters that began a swing
    /// at the player this tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        ctx: &MoveCtx,
        player: PlayerView,
        rng: &mut R,
    ) -> Vec<MonsterId> {
        let mut strikes = Vec::new();
        for npc in self.npcs.iter_mut() {
            match &mut npc.kind {
                NpcKind::Person(p) => update_person(&mut npc.body, p, ctx, player, rng),
                NpcKind::Monster(m) => {
                    if update_monster(&mut npc.body, m, ctx, player, rng) {
                        strikes.push(m.id);
                    }
                }
            }
        }
        strikes
    }

    /// Apply a sword sweep. Dead monsters ignore it.
    pub fn strike(&mut self, hitbox: &Rect, damage: i32) -> Vec<Hit> {
        let mut hits = Vec::new();
        for npc in self.npcs.iter_mut() {
            let NpcKind::Monster(m) = &mut npc.kind else { continue };
            if m.is_dead() || !MONSTER_BODY.translate(npc.body.x, npc.body.y).intersects(hitbox) {
                continue;
            }
            m.health -= damage;
            if m.health <= 0 {
                m.movement = MonsterMove::Dead;
                m.swing.cancel();
                hits.push(Hit::Killed(m.id));
            } else {
                hits.push(Hit::Wounded(m.id));
            }
        }
        hits
    }
}

// ══════════════════════════════════════════════════════════════
// Per-variant updates
// ══════════════════════════════════════════════════════════════

fn update_person<R: Rng + ?Sized>(
    body: &mut Body,
    p: &mut Person,
    ctx: &MoveCtx,
    player: PlayerView,
    rng: &mut R,
) {
    match p.movement {
        PersonMove::None => {}
        PersonMove::Wander => {
            p.timer = p.timer.saturating_sub(1);
            if p.timer == 0 {
                p.timer = rng.gen_range(WANDER_MIN..=WANDER_MAX);
                p.heading = HEADINGS[rng.gen_range(0..HEADINGS.len())];
            }
            let (hx, hy) = p.heading;
            if hx != 0 || hy != 0 {
                physics::step_body(body, hx, hy, NPC_SPEED, ctx);
            }
        }
        PersonMove::Follow => {
            let (fx, fy) = player.facing.delta();
            // Behind a player at the map edge is off the map; stay inside.
            let tx = (player.x - fx * TILE_W).clamp(0, ctx.grid.pixel_width() - 1);
            let ty = (player.y - fy * TILE_H).clamp(0, ctx.grid.pixel_height() - 1);
            if (tx - body.x).abs() > CATCH_UP_TILES * TILE_W
                || (ty - body.y).abs() > CATCH_UP_TILES * TILE_H
            {
                body.set_position(tx, ty);
            } else {
                physics::seek(body, tx, ty, ctx);
            }
        }
    }
}

/// Returns `true` when the monster started a swing at the player.
fn update_monster<R: Rng + ?Sized>(
    body: &mut Body,
    m: &mut Monster,
    ctx: &MoveCtx,
    player: PlayerView,
    rng: &mut R,
) -> bool {
    if m.is_dead() {
        return false;
    }
    m.swing.tick();

    let (dx, dy) = (player.x - body.x, player.y - body.y);
    match m.movement {
        MonsterMove::None | MonsterMove::Rails => {
            if dx.abs() < ENGAGE_X && dy.abs() < ENGAGE_Y {
                m.movement = MonsterMove::Attack;
            }
        }
        MonsterMove::Attack => {
            if dx.abs() > LEASH_TILES * TILE_W || dy.abs() > LEASH_TILES * TILE_H {
                body.set_position(m.home.x, m.home.y);
                body.facing = m.home.facing;
                m.movement = m.home.movement;
                m.swing.cancel();
                return false;
            }
        }
        MonsterMove::Dead => {}
    }

    match m.movement {
        MonsterMove::Rails => {
            let (row, col) = ctx.grid.tile_of(body.x, body.y);
            let (rx, ry) = ctx.grid.rail_at(row, col).delta();
            let tx = (col as i32 + rx) * TILE_W + TILE_W / 2;
            let ty = (row as i32 + ry) * TILE_H + TILE_H / 2;
            physics::seek(body, tx, ty, ctx);
            false
        }
        MonsterMove::Attack => {
            let (ox, oy) = m.chase_offset;
            physics::seek(body, player.x + ox, player.y + oy, ctx);
            let close = distance(body.x, body.y, player.x, player.y) < MELEE_RANGE;
            close && !m.swing.is_active() && rng.gen_bool(STRIKE_CHANCE) && m.swing.start()
        }
        MonsterMove::None | MonsterMove::Dead => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::WorldGrid;
    use crate::domain::item::ItemManager;
    use crate::domain::tile::Rail;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn far_player() -> PlayerView {
        PlayerView { x: 100_000, y: 100_000, facing: Facing::Down }
    }

    fn ctx<'a>(grid: &'a WorldGrid, items: &'a ItemManager, tick: u64) -> MoveCtx<'a> {
        MoveCtx { grid, items, tick }
    }

    #[test]
    fn wander_rerolls_heading_within_window() {
        let grid = WorldGrid::new(40, 40);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut npcs = NpcManager::new();
        npcs.add_person(PersonId::Lady, 960, 960, PersonMove::Wander);

        let mut moved = false;
        for tick in 1..=600 {
            npcs.update(&ctx(&grid, &items, tick), far_player(), &mut rng);
            let (_, p) = npcs.person_mut(PersonId::Lady);
            assert!(p.timer >= 1 && p.timer <= WANDER_MAX);
            assert!(HEADINGS.contains(&p.heading));
            let b = &npcs.person(PersonId::Lady).body;
            moved |= (b.x, b.y) != (960, 960);
        }
        assert!(moved);
    }

    #[test]
    fn follower_catches_up_when_far() {
        let grid = WorldGrid::new(100, 100);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut npcs = NpcManager::new();
        npcs.add_person(PersonId::Kid, 200, 200, PersonMove::Follow);

        let player = PlayerView { x: 3000, y: 3000, facing: Facing::Right };
        npcs.update(&ctx(&grid, &items, 1), player, &mut rng);
        let b = &npcs.person(PersonId::Kid).body;
        assert_eq!((b.x, b.y), (3000 - TILE_W, 3000));
    }

    #[test]
    fn follower_catch_up_stays_on_the_map() {
        let grid = WorldGrid::new(100, 100);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut npcs = NpcManager::new();
        npcs.add_person(PersonId::Kid, 3000, 3000, PersonMove::Follow);

        // Facing right at the left edge: the tile behind is at x < 0.
        let player = PlayerView { x: 20, y: 100, facing: Facing::Right };
        npcs.update(&ctx(&grid, &items, 1), player, &mut rng);
        let b = &npcs.person(PersonId::Kid).body;
        assert_eq!((b.x, b.y), (0, 100));
        npcs.update(&ctx(&grid, &items, 2), player, &mut rng);
    }

    #[test]
    fn follower_never_walks_diagonally() {
        let grid = WorldGrid::new(60, 60);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut npcs = NpcManager::new();
        npcs.add_person(PersonId::Kid, 1000, 1000, PersonMove::Follow);

        let player = PlayerView { x: 1300, y: 1250, facing: Facing::Up };
        for tick in 1..=400 {
            let before = { let b = &npcs.person(PersonId::Kid).body; (b.x, b.y) };
            npcs.update(&ctx(&grid, &items, tick), player, &mut rng);
            let b = &npcs.person(PersonId::Kid).body;
            assert!(b.x == before.0 || b.y == before.1, "diagonal step at tick {tick}");
        }
        let b = &npcs.person(PersonId::Kid).body;
        assert!((b.x - 1300).abs() <= 8 && (b.y - (1250 + TILE_H)).abs() <= 8);
    }

    #[test]
    fn rails_monster_loops_its_track() {
        let mut grid = WorldGrid::new(10, 10);
        grid.set_rail(2, 2, Rail::Right);
        grid.set_rail(2, 3, Rail::Down);
        grid.set_rail(3, 3, Rail::Left);
        grid.set_rail(3, 2, Rail::Up);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut npcs = NpcManager::new();
        npcs.add_monster(MonsterId::VillageOrc, 120, 120, MonsterMove::Rails, &mut rng);

        let mut visited = std::collections::HashSet::new();
        for tick in 1..=400 {
            npcs.update(&ctx(&grid, &items, tick), far_player(), &mut rng);
            let (b, _) = npcs.monster(MonsterId::VillageOrc);
            let tile = grid.tile_of(b.x, b.y);
            assert!((2..=3).contains(&tile.0) && (2..=3).contains(&tile.1), "left the loop at {tile:?}");
            visited.insert(tile);
        }
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn monster_engages_then_leashes_home() {
        let grid = WorldGrid::new(60, 60);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut npcs = NpcManager::new();
        npcs.add_monster(MonsterId::MazeOrc1, 1000, 1000, MonsterMove::None, &mut rng);

        let near = PlayerView { x: 1200, y: 1100, facing: Facing::Left };
        npcs.update(&ctx(&grid, &items, 1), near, &mut rng);
        let (b, m) = npcs.monster(MonsterId::MazeOrc1);
        assert_eq!(m.movement, MonsterMove::Attack);
        assert_ne!((b.x, b.y), (1000, 1000));

        let gone = PlayerView { x: 1000 + 16 * TILE_W, y: 1000, facing: Facing::Left };
        npcs.update(&ctx(&grid, &items, 2), gone, &mut rng);
        let (b, m) = npcs.monster(MonsterId::MazeOrc1);
        assert_eq!(m.movement, MonsterMove::None);
        assert_eq!((b.x, b.y), (1000, 1000));
    }

    #[test]
    fn monster_swings_occasionally_when_close() {
        let grid = WorldGrid::new(40, 40);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut npcs = NpcManager::new();
        npcs.add_monster(MonsterId::VillageOrc, 960, 960, MonsterMove::Attack, &mut rng);

        let player = PlayerView { x: 960, y: 960, facing: Facing::Down };
        let mut strike_ticks = Vec::new();
        for tick in 1..=1000 {
            if !npcs.update(&ctx(&grid, &items, tick), player, &mut rng).is_empty() {
                strike_ticks.push(tick);
            }
        }
        assert!(!strike_ticks.is_empty());
        assert!(strike_ticks.len() < 200);
        for pair in strike_ticks.windows(2) {
            assert!(pair[1] - pair[0] >= 12, "swing restarted mid-animation");
        }
    }

    #[test]
    fn five_sword_hits_kill_and_corpse_ignores_more() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut npcs = NpcManager::new();
        npcs.add_monster(MonsterId::MazeOrc2, 500, 500, MonsterMove::None, &mut rng);
        let sword = Rect::new(480, 460, 48, 48);

        for _ in 0..4 {
            assert_eq!(npcs.strike(&sword, 10), vec![Hit::Wounded(MonsterId::MazeOrc2)]);
        }
        assert_eq!(npcs.strike(&sword, 10), vec![Hit::Killed(MonsterId::MazeOrc2)]);
        assert!(npcs.monster(MonsterId::MazeOrc2).1.is_dead());
        assert!(npcs.strike(&sword, 10).is_empty());
        assert_eq!(npcs.monster(MonsterId::MazeOrc2).1.health, 0);
    }

    #[test]
    fn dead_monster_stays_put() {
        let grid = WorldGrid::new(40, 40);
        let items = ItemManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut npcs = NpcManager::new();
        npcs.add_monster(MonsterId::MazeOrc2, 500, 500, MonsterMove::Attack, &mut rng);
        npcs.strike(&Rect::new(480, 460, 48, 48), 50);
        let player = PlayerView { x: 520, y: 520, facing: Facing::Down };
        for tick in 1..=100 {
            assert!(npcs.update(&ctx(&grid, &items, tick), player, &mut rng).is_empty());
        }
        let (b, _) = npcs.monster(MonsterId::MazeOrc2);
        assert_eq!((b.x, b.y), (500, 500));
    }

    #[test]
    fn talk_target_is_nearest_villager_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut npcs = NpcManager::new();
        npcs.add_person(PersonId::OldMan, 100, 100, PersonMove::None);
        npcs.add_person(PersonId::Sailor, 150, 100, PersonMove::None);
        npcs.add_monster(MonsterId::VillageOrc, 130, 100, MonsterMove::None, &mut rng);
        assert_eq!(npcs.nearest_person(140, 100, 80.0), Some(PersonId::Sailor));
        assert_eq!(npcs.nearest_person(110, 100, 80.0), Some(PersonId::OldMan));
        assert_eq!(npcs.nearest_person(400, 100, 80.0), None);
    }
}

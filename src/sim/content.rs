/// Startup population: stamps the maze and puts every person, monster and
/// item in its authored place. Positions are given in tiles and converted
/// to anchor points here.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::domain::grid::{WorldGrid, TILE_H, TILE_W};
use crate::domain::item::ItemId;
use crate::domain::maze::{Maze, MAZE_ORIGIN};
use crate::domain::npc::{MonsterId, MonsterMove, PersonId, PersonMove};
use crate::error::MapError;
use super::map::{self, places};
use super::world::SimulationState;

pub const SPAWN_SCROLL: (i32, i32) = (60, 84);

/// Tile centre.
fn centre((c, r): (usize, usize)) -> (i32, i32) {
    (c as i32 * TILE_W + TILE_W / 2, r as i32 * TILE_H + TILE_H / 2)
}

/// Anchor for an obstacle that should fill the bottom of its tile.
fn footing((c, r): (usize, usize), inset: i32) -> (i32, i32) {
    (c as i32 * TILE_W + TILE_W / 2, (r as i32 + 1) * TILE_H - inset)
}

/// Build a fresh game on `grid`. `seed` fixes the maze and all later
/// randomness; `None` seeds from the OS.
///
/// Fails when the grid cannot hold the authored content.
pub fn new_game(mut grid: WorldGrid, seed: Option<u64>) -> Result<SimulationState, MapError> {
    map::check_fits(&grid)?;
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    let maze = Maze::generate(&mut rng);
    maze.stamp(&mut grid, MAZE_ORIGIN);

    let (sc, sr) = places::START;
    let spawn = (sc as i32 * TILE_W, sr as i32 * TILE_H);
    let mut state = SimulationState::new(grid, spawn, SPAWN_SCROLL, rng);
    state.maze = Some(maze);

    populate_people(&mut state);
    populate_monsters(&mut state);
    populate_items(&mut state);

    info!(seed = ?seed, npcs = state.npcs.iter().count(), "world populated");
    Ok(state)
}

fn populate_people(state: &mut SimulationState) {
    let people = [
        (PersonId::OldMan, places::OLD_MAN, PersonMove::None),
        (PersonId::Lady, places::LADY, PersonMove::Wander),
        (PersonId::Kid, places::KID, PersonMove::None),
        (PersonId::Blacksmith, places::FORGE, PersonMove::Wander),
        (PersonId::Sailor, places::SAILOR, PersonMove::None),
    ];
    for (id, tile, movement) in people {
        let (x, y) = centre(tile);
        state.npcs.add_person(id, x, y, movement);
    }
}

fn populate_monsters(state: &mut SimulationState) {
    let monsters = [
        (MonsterId::VillageOrc, places::RAIL_START, MonsterMove::Rails),
        (MonsterId::MazeOrc1, places::MAZE_ORCS[0], MonsterMove::None),
        (MonsterId::MazeOrc2, places::MAZE_ORCS[1], MonsterMove::None),
    ];
    for (id, tile, movement) in monsters {
        let (x, y) = centre(tile);
        state.npcs.add_monster(id, x, y, movement, &mut state.rng);
    }
}

fn populate_items(state: &mut SimulationState) {
    // Sword, filled bucket and key wait off-map until the story needs them.
    let placements = [
        (ItemId::EmptyBucket, centre(places::BUCKET)),
        (ItemId::Axe, centre(places::AXE)),
        (ItemId::Fire1, footing(places::PEN_GAP[0], 4)),
        (ItemId::Fire2, footing(places::PEN_GAP[1], 4)),
        (ItemId::Tree1, footing(places::NOOK_GAP[0], 8)),
        (ItemId::Tree2, footing(places::NOOK_GAP[1], 8)),
        (ItemId::GoldCoins, centre(places::COINS)),
        (ItemId::Door, footing(places::MAZE_GATE, 8)),
    ];
    for (id, (x, y)) in placements {
        state.items.place(id, x, y);
    }
}

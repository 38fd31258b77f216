pub mod entity;
pub mod geom;
pub mod grid;
pub mod item;
pub mod maze;
pub mod npc;
pub mod physics;
pub mod quest;
pub mod scene;
pub mod tile;

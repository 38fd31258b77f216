pub mod content;
pub mod draw;
pub mod event;
pub mod map;
pub mod step;
pub mod world;

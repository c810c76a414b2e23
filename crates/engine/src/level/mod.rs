mod atomic_io;
mod autotile;
mod format;
mod source;
mod tile;
mod tilemap;

pub use format::LevelError;
pub use source::{DirectoryLevels, InMemoryLevels, LevelSource};
pub use tile::{GridPos, PlacedTile, Tile, TileKind};
pub use tilemap::{Tilemap, DEFAULT_TILE_SIZE};

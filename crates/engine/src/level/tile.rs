use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::Vec2;

/// Tile type as persisted in level files (`"type"` field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TileKind {
    Decor,
    Grass,
    Stone,
    LargeDecor,
    Spawners,
    Other(String),
}

impl TileKind {
    pub fn as_str(&self) -> &str {
        match self {
            TileKind::Decor => "decor",
            TileKind::Grass => "grass",
            TileKind::Stone => "stone",
            TileKind::LargeDecor => "large_decor",
            TileKind::Spawners => "spawners",
            TileKind::Other(name) => name,
        }
    }

    /// Grass and stone block movement.
    pub fn is_physics(&self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    pub fn is_autotile(&self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }
}

impl From<String> for TileKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "decor" => TileKind::Decor,
            "grass" => TileKind::Grass,
            "stone" => TileKind::Stone,
            "large_decor" => TileKind::LargeDecor,
            "spawners" => TileKind::Spawners,
            _ => TileKind::Other(value),
        }
    }
}

impl From<TileKind> for String {
    fn from(value: TileKind) -> Self {
        match value {
            TileKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer grid coordinate. Ordered by `x` then `y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell `(dx, dy)` away, or `None` past the edge of the `i32` grid.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Floor division of a pixel position by the tile size.
    pub fn from_pixel(position: Vec2, tile_size: i32) -> Self {
        let size = tile_size as f32;
        Self {
            x: (position.x / size).floor() as i32,
            y: (position.y / size).floor() as i32,
        }
    }

    /// `"<x>;<y>"`, the key format used by level files.
    pub fn to_key(self) -> String {
        format!("{};{}", self.x, self.y)
    }

    pub fn parse_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(';')?;
        Some(Self {
            x: x.parse().ok()?,
            y: y.parse().ok()?,
        })
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: GridPos,
}

impl Tile {
    pub fn new(kind: TileKind, variant: u32, pos: GridPos) -> Self {
        Self { kind, variant, pos }
    }
}

/// A tile positioned in pixel space: off-grid decoration, or a copy returned by `extract`.
///
/// The position is held at the precision level files store it in, so loading and
/// saving a level leaves its coordinates untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile {
    pub kind: TileKind,
    pub variant: u32,
    pixel_pos: [f64; 2],
}

impl PlacedTile {
    pub fn new(kind: TileKind, variant: u32, pos: Vec2) -> Self {
        Self::at_pixels(kind, variant, f64::from(pos.x), f64::from(pos.y))
    }

    pub fn at_pixels(kind: TileKind, variant: u32, x: f64, y: f64) -> Self {
        Self {
            kind,
            variant,
            pixel_pos: [x, y],
        }
    }

    /// Simulation-space position.
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.pixel_pos[0] as f32, self.pixel_pos[1] as f32)
    }

    pub fn pixel_pos(&self) -> [f64; 2] {
        self.pixel_pos
    }
}

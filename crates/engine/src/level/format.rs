use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::atomic_io::write_text_atomic;
use super::tile::{GridPos, PlacedTile, Tile, TileKind};
use super::tilemap::Tilemap;

const IN_MEMORY_ORIGIN: &str = "<memory>";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read or write level file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse level {origin} at {location}: {source}")]
    Parse {
        origin: String,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode level: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid grid key '{key}' (expected \"<x>;<y>\")")]
    InvalidKey { key: String },
    #[error("grid key '{key}' does not match tile position {pos}")]
    KeyPositionMismatch { key: String, pos: GridPos },
    #[error("tile size must be positive, got {tile_size}")]
    InvalidTileSize { tile_size: i32 },
    #[error("level {index} not found in '{dir}'")]
    MissingLevel { index: usize, dir: PathBuf },
    #[error("no level files found in '{dir}'")]
    NoLevels { dir: PathBuf },
}

/// On-disk level record. Field order matches the files written by the level editor.
#[derive(Debug, Serialize, Deserialize)]
struct LevelFile {
    tilemap: BTreeMap<String, GridTileRecord>,
    tile_size: i32,
    offgrid: Vec<OffgridTileRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GridTileRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [i32; 2],
}

#[derive(Debug, Serialize, Deserialize)]
struct OffgridTileRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [f64; 2],
}

impl Tilemap {
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let raw = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tilemap = parse_level(&raw, &path.display().to_string())?;
        info!(
            path = %path.display(),
            tile_size = tilemap.tile_size(),
            grid_tiles = tilemap.grid_len(),
            offgrid_tiles = tilemap.offgrid_tiles().len(),
            "level_file_loaded"
        );
        Ok(tilemap)
    }

    pub fn save(&self, path: &Path) -> Result<(), LevelError> {
        let json = self.to_json_string()?;
        write_text_atomic(path, &json).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            grid_tiles = self.grid_len(),
            offgrid_tiles = self.offgrid_tiles().len(),
            "level_saved"
        );
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, LevelError> {
        parse_level(raw, IN_MEMORY_ORIGIN)
    }

    pub fn to_json_string(&self) -> Result<String, LevelError> {
        serde_json::to_string(&to_level_file(self)).map_err(LevelError::Encode)
    }
}

fn parse_level(raw: &str, origin: &str) -> Result<Tilemap, LevelError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file: LevelFile = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        LevelError::Parse {
            origin: origin.to_string(),
            location: if path.is_empty() { ".".to_string() } else { path },
            source: error.into_inner(),
        }
    })?;
    from_level_file(file)
}

fn from_level_file(file: LevelFile) -> Result<Tilemap, LevelError> {
    let mut tilemap = Tilemap::new(file.tile_size)?;
    for (key, record) in file.tilemap {
        let key_pos = GridPos::parse_key(&key).ok_or_else(|| LevelError::InvalidKey {
            key: key.clone(),
        })?;
        let pos = GridPos::new(record.pos[0], record.pos[1]);
        if key_pos != pos {
            return Err(LevelError::KeyPositionMismatch { key, pos });
        }
        tilemap.insert(Tile::new(record.kind, record.variant, pos));
    }
    for record in file.offgrid {
        tilemap.push_offgrid(PlacedTile::at_pixels(
            record.kind,
            record.variant,
            record.pos[0],
            record.pos[1],
        ));
    }
    Ok(tilemap)
}

fn to_level_file(tilemap: &Tilemap) -> LevelFile {
    LevelFile {
        tilemap: tilemap
            .tiles()
            .map(|tile| {
                (
                    tile.pos.to_key(),
                    GridTileRecord {
                        kind: tile.kind.clone(),
                        variant: tile.variant,
                        pos: [tile.pos.x, tile.pos.y],
                    },
                )
            })
            .collect(),
        tile_size: tilemap.tile_size(),
        offgrid: tilemap
            .offgrid_tiles()
            .iter()
            .map(|tile| OffgridTileRecord {
                kind: tile.kind.clone(),
                variant: tile.variant,
                pos: tile.pixel_pos(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Vec2;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "tilemap": {
            "0;5": {"type": "grass", "variant": 1, "pos": [0, 5]},
            "-2;7": {"type": "stone", "variant": 0, "pos": [-2, 7]},
            "3;4": {"type": "spawners", "variant": 1, "pos": [3, 4]}
        },
        "tile_size": 16,
        "offgrid": [
            {"type": "decor", "variant": 2, "pos": [12.5, 40]},
            {"type": "large_decor", "variant": 2, "pos": [60, 33.25]}
        ]
    }"#;

    fn sample_map() -> Tilemap {
        Tilemap::from_json_str(SAMPLE).expect("sample level")
    }

    #[test]
    fn parses_grid_and_offgrid_tiles() {
        let map = sample_map();
        assert_eq!(map.tile_size(), 16);
        assert_eq!(map.grid_len(), 3);
        let stone = map.tile_at(GridPos::new(-2, 7)).expect("stone");
        assert_eq!(stone.kind, TileKind::Stone);
        assert_eq!(map.offgrid_tiles().len(), 2);
        assert_eq!(map.offgrid_tiles()[0].pos(), Vec2::new(12.5, 40.0));
        assert_eq!(map.offgrid_tiles()[1].kind, TileKind::LargeDecor);
    }

    #[test]
    fn save_then_load_reproduces_the_map() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("maps").join("0.json");
        let map = sample_map();

        map.save(&path).expect("save");
        let loaded = Tilemap::load(&path).expect("load");

        assert_eq!(loaded, map);
        assert!(!temp.path().join("maps").join("0.json.tmp").exists());
    }

    #[test]
    fn offgrid_positions_keep_full_precision_through_save() {
        let raw = r#"{"tilemap": {}, "tile_size": 16, "offgrid": [
            {"type": "decor", "variant": 0, "pos": [123456.789, 0.30000000000000004]}
        ]}"#;
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("0.json");
        Tilemap::from_json_str(raw)
            .expect("parse")
            .save(&path)
            .expect("save");

        let written = fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&written).expect("json");
        assert_eq!(
            value["offgrid"][0]["pos"],
            serde_json::json!([123456.789, 0.30000000000000004])
        );
        let reloaded = Tilemap::load(&path).expect("reload");
        assert_eq!(
            reloaded.offgrid_tiles()[0].pixel_pos(),
            [123456.789, 0.30000000000000004]
        );
    }

    #[test]
    fn grid_keys_are_written_in_x_semicolon_y_form() {
        let json = sample_map().to_json_string().expect("encode");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        let grid = value["tilemap"].as_object().expect("tilemap object");
        let mut keys = grid.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, vec!["-2;7", "0;5", "3;4"]);
        assert_eq!(grid["3;4"]["type"], "spawners");
        assert_eq!(grid["3;4"]["pos"], serde_json::json!([3, 4]));
        assert_eq!(value["tile_size"], 16);
    }

    #[test]
    fn unknown_tile_kinds_survive_a_round_trip() {
        let raw = r#"{"tilemap": {"1;1": {"type": "lava", "variant": 0, "pos": [1, 1]}},
                      "tile_size": 8, "offgrid": []}"#;
        let map = Tilemap::from_json_str(raw).expect("parse");
        let reparsed =
            Tilemap::from_json_str(&map.to_json_string().expect("encode")).expect("reparse");
        assert_eq!(
            reparsed.tile_at(GridPos::new(1, 1)).expect("tile").kind,
            TileKind::Other("lava".to_string())
        );
    }

    #[test]
    fn structural_errors_report_the_failing_path() {
        let raw = r#"{"tilemap": {"0;0": {"type": "grass", "variant": "x", "pos": [0, 0]}},
                      "tile_size": 16, "offgrid": []}"#;
        let err = Tilemap::from_json_str(raw).expect_err("bad variant");
        match err {
            LevelError::Parse { location, .. } => assert!(location.contains("variant"), "{location}"),
            other => panic!("unexpected error: {other}"),
        }

        let missing = Tilemap::from_json_str(r#"{"tilemap": {}, "offgrid": []}"#)
            .expect_err("missing tile_size");
        assert!(matches!(missing, LevelError::Parse { .. }));
    }

    #[test]
    fn bad_keys_and_mismatched_positions_are_rejected() {
        let bad_key = r#"{"tilemap": {"0-0": {"type": "grass", "variant": 0, "pos": [0, 0]}},
                          "tile_size": 16, "offgrid": []}"#;
        assert!(matches!(
            Tilemap::from_json_str(bad_key),
            Err(LevelError::InvalidKey { .. })
        ));

        let mismatch = r#"{"tilemap": {"1;0": {"type": "grass", "variant": 0, "pos": [0, 0]}},
                           "tile_size": 16, "offgrid": []}"#;
        assert!(matches!(
            Tilemap::from_json_str(mismatch),
            Err(LevelError::KeyPositionMismatch { .. })
        ));

        let bad_size = r#"{"tilemap": {}, "tile_size": -4, "offgrid": []}"#;
        assert!(matches!(
            Tilemap::from_json_str(bad_size),
            Err(LevelError::InvalidTileSize { tile_size: -4 })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().expect("temp");
        let err = Tilemap::load(&temp.path().join("nope.json")).expect_err("missing");
        assert!(matches!(err, LevelError::Io { .. }));
    }
}

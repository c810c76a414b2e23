use std::collections::BTreeMap;

use tracing::debug;

use super::autotile::{variant_for_mask, CARDINAL_NEIGHBORS};
use super::format::LevelError;
use super::tile::{GridPos, PlacedTile, Tile, TileKind};
use crate::sim::{Rect, Vec2};

pub const DEFAULT_TILE_SIZE: i32 = 16;

/// Sparse tile grid plus off-grid decoration.
///
/// Grid tiles are keyed by their integer coordinate; `tile_size` converts grid units to
/// pixels and is fixed once the map is built. Queries against empty or negative
/// coordinates simply find nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    tile_size: i32,
    grid: BTreeMap<GridPos, Tile>,
    offgrid: Vec<PlacedTile>,
}

impl Default for Tilemap {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            grid: BTreeMap::new(),
            offgrid: Vec::new(),
        }
    }
}

impl Tilemap {
    pub fn new(tile_size: i32) -> Result<Self, LevelError> {
        if tile_size <= 0 {
            return Err(LevelError::InvalidTileSize { tile_size });
        }
        Ok(Self {
            tile_size,
            ..Self::default()
        })
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Places `tile` at its own grid position, returning whatever occupied that cell.
    pub fn insert(&mut self, tile: Tile) -> Option<Tile> {
        self.grid.insert(tile.pos, tile)
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Tile> {
        self.grid.remove(&pos)
    }

    pub fn push_offgrid(&mut self, tile: PlacedTile) {
        self.offgrid.push(tile);
    }

    pub fn tile_at(&self, pos: GridPos) -> Option<&Tile> {
        self.grid.get(&pos)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.grid.values()
    }

    pub fn offgrid_tiles(&self) -> &[PlacedTile] {
        &self.offgrid
    }

    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    pub fn pixel_to_grid(&self, position: Vec2) -> GridPos {
        GridPos::from_pixel(position, self.tile_size)
    }

    /// Pixel-space square covered by a grid cell.
    pub fn cell_rect(&self, pos: GridPos) -> Rect {
        let size = self.tile_size as f32;
        Rect::new(pos.x as f32 * size, pos.y as f32 * size, size, size)
    }

    /// Tiles in the 3x3 neighbourhood around the cell containing `position`.
    pub fn tiles_around(&self, position: Vec2) -> Vec<&Tile> {
        let center = self.pixel_to_grid(position);
        let mut found = Vec::with_capacity(9);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(tile) = center.offset(dx, dy).and_then(|pos| self.grid.get(&pos)) {
                    found.push(tile);
                }
            }
        }
        found
    }

    /// Neighbourhood sized to an entity box anchored at `position`: one ring of cells
    /// around every cell the box can reach. Boxes no larger than a tile get the 3x3 ring.
    pub fn tiles_around_sized(&self, position: Vec2, width: f32, height: f32) -> Vec<&Tile> {
        let origin = self.pixel_to_grid(position);
        let size = self.tile_size as f32;
        let span_x = ((width / size).ceil() as i32).max(1);
        let span_y = ((height / size).ceil() as i32).max(1);
        let mut found = Vec::new();
        for dy in -1..=span_y {
            for dx in -1..=span_x {
                if let Some(tile) = origin.offset(dx, dy).and_then(|pos| self.grid.get(&pos)) {
                    found.push(tile);
                }
            }
        }
        found
    }

    /// Pixel rectangles of the physics tiles an entity box at `position` could touch.
    pub fn physics_rects_around(&self, position: Vec2, width: f32, height: f32) -> Vec<Rect> {
        self.tiles_around_sized(position, width, height)
            .into_iter()
            .filter(|tile| tile.kind.is_physics())
            .map(|tile| self.cell_rect(tile.pos))
            .collect()
    }

    /// The physics tile occupying the cell under `position`, if any.
    pub fn solid_check(&self, position: Vec2) -> Option<&Tile> {
        self.grid
            .get(&self.pixel_to_grid(position))
            .filter(|tile| tile.kind.is_physics())
    }

    /// Copies every tile whose `(kind, variant)` is listed in `filter`, off-grid tiles
    /// first. Grid tiles come back with pixel positions. Unless `keep` is set the matches
    /// are removed from the map.
    pub fn extract(&mut self, filter: &[(TileKind, u32)], keep: bool) -> Vec<PlacedTile> {
        let wanted = |kind: &TileKind, variant: u32| {
            filter
                .iter()
                .any(|(filter_kind, filter_variant)| filter_kind == kind && *filter_variant == variant)
        };

        let mut matches: Vec<PlacedTile> = self
            .offgrid
            .iter()
            .filter(|tile| wanted(&tile.kind, tile.variant))
            .cloned()
            .collect();

        let size = f64::from(self.tile_size);
        matches.extend(
            self.grid
                .values()
                .filter(|tile| wanted(&tile.kind, tile.variant))
                .map(|tile| {
                    PlacedTile::at_pixels(
                        tile.kind.clone(),
                        tile.variant,
                        f64::from(tile.pos.x) * size,
                        f64::from(tile.pos.y) * size,
                    )
                }),
        );

        if !keep {
            self.offgrid.retain(|tile| !wanted(&tile.kind, tile.variant));
            self.grid.retain(|_, tile| !wanted(&tile.kind, tile.variant));
        }

        debug!(matched = matches.len(), keep, "tilemap_extract");
        matches
    }

    /// Picks wall/corner variants for grass and stone from their same-kind cardinal
    /// neighbours. Returns how many tiles changed variant.
    pub fn autotile(&mut self) -> usize {
        let updates: Vec<(GridPos, u32)> = self
            .grid
            .values()
            .filter(|tile| tile.kind.is_autotile())
            .filter_map(|tile| {
                variant_for_mask(self.same_kind_mask(tile)).map(|variant| (tile.pos, variant))
            })
            .collect();

        let mut changed = 0;
        for (pos, variant) in updates {
            if let Some(tile) = self.grid.get_mut(&pos) {
                if tile.variant != variant {
                    tile.variant = variant;
                    changed += 1;
                }
            }
        }
        changed
    }

    fn same_kind_mask(&self, tile: &Tile) -> u8 {
        CARDINAL_NEIGHBORS
            .iter()
            .filter(|((dx, dy), _)| {
                tile.pos
                    .offset(*dx, *dy)
                    .and_then(|pos| self.grid.get(&pos))
                    .is_some_and(|neighbor| neighbor.kind == tile.kind)
            })
            .fold(0u8, |mask, (_, bit)| mask | bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grass(x: i32, y: i32) -> Tile {
        Tile::new(TileKind::Grass, 0, GridPos::new(x, y))
    }

    fn block_3x3(kind: TileKind) -> Tilemap {
        let mut map = Tilemap::default();
        for y in 0..3 {
            for x in 0..3 {
                map.insert(Tile::new(kind.clone(), 0, GridPos::new(x, y)));
            }
        }
        map
    }

    #[test]
    fn rejects_non_positive_tile_size() {
        assert!(matches!(
            Tilemap::new(0),
            Err(LevelError::InvalidTileSize { tile_size: 0 })
        ));
        assert_eq!(Tilemap::new(8).expect("map").tile_size(), 8);
    }

    #[test]
    fn queries_on_empty_regions_return_nothing() {
        let mut map = Tilemap::default();
        map.insert(grass(0, 0));
        for position in [
            Vec2::new(500.0, 500.0),
            Vec2::new(-400.0, -90.0),
            Vec2::new(-1000.0, 20.0),
        ] {
            assert!(map.tiles_around(position).is_empty());
            assert!(map.physics_rects_around(position, 8.0, 15.0).is_empty());
            assert!(map.solid_check(position).is_none());
        }
    }

    #[test]
    fn tiles_around_covers_nine_cells() {
        let mut map = Tilemap::default();
        for y in -2..=2 {
            for x in -2..=2 {
                map.insert(grass(x, y));
            }
        }
        let around = map.tiles_around(Vec2::new(4.0, 4.0));
        assert_eq!(around.len(), 9);
        for tile in around {
            assert!(tile.pos.x.abs() <= 1 && tile.pos.y.abs() <= 1);
        }
    }

    #[test]
    fn sized_query_matches_nine_cells_for_small_boxes() {
        let mut map = Tilemap::default();
        for y in -3..=3 {
            for x in -3..=3 {
                map.insert(grass(x, y));
            }
        }
        assert_eq!(map.tiles_around_sized(Vec2::new(1.0, 1.0), 8.0, 15.0).len(), 9);
        assert_eq!(
            map.tiles_around_sized(Vec2::new(1.0, 1.0), 20.0, 15.0).len(),
            12
        );
    }

    #[test]
    fn physics_rects_skip_decoration() {
        let mut map = Tilemap::default();
        map.insert(grass(1, 1));
        map.insert(Tile::new(TileKind::Decor, 0, GridPos::new(0, 1)));
        map.insert(Tile::new(TileKind::Stone, 3, GridPos::new(1, 0)));

        let mut rects = map.physics_rects_around(Vec2::new(8.0, 8.0), 8.0, 15.0);
        rects.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_eq!(
            rects,
            vec![
                Rect::new(16.0, 0.0, 16.0, 16.0),
                Rect::new(16.0, 16.0, 16.0, 16.0)
            ]
        );
    }

    #[test]
    fn solid_check_ignores_non_physics_tiles() {
        let mut map = Tilemap::default();
        map.insert(Tile::new(TileKind::Stone, 0, GridPos::new(2, 3)));
        map.insert(Tile::new(TileKind::Decor, 0, GridPos::new(3, 3)));

        let hit = map.solid_check(Vec2::new(40.0, 50.0)).expect("solid");
        assert_eq!(hit.pos, GridPos::new(2, 3));
        assert!(map.solid_check(Vec2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn extract_scales_grid_copies_and_consumes_when_not_kept() {
        let mut map = Tilemap::default();
        map.insert(Tile::new(TileKind::Spawners, 0, GridPos::new(2, 3)));
        map.insert(Tile::new(TileKind::Spawners, 1, GridPos::new(5, 3)));
        map.insert(Tile::new(TileKind::Spawners, 2, GridPos::new(6, 3)));
        map.push_offgrid(PlacedTile::new(
            TileKind::Spawners,
            1,
            Vec2::new(7.5, 9.0),
        ));

        let found = map.extract(
            &[(TileKind::Spawners, 0), (TileKind::Spawners, 1)],
            false,
        );
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].pos(), Vec2::new(7.5, 9.0));
        assert_eq!(found[1].pos(), Vec2::new(32.0, 48.0));
        assert_eq!(found[2].pos(), Vec2::new(80.0, 48.0));

        assert!(map.offgrid_tiles().is_empty());
        assert_eq!(map.grid_len(), 1);
        assert_eq!(
            map.tile_at(GridPos::new(6, 3)).map(|tile| tile.variant),
            Some(2)
        );
    }

    #[test]
    fn extract_keep_leaves_originals_grid_scaled() {
        let mut map = Tilemap::default();
        map.insert(Tile::new(TileKind::LargeDecor, 2, GridPos::new(4, 1)));

        let found = map.extract(&[(TileKind::LargeDecor, 2)], true);
        assert_eq!(found[0].pos(), Vec2::new(64.0, 16.0));
        let original = map.tile_at(GridPos::new(4, 1)).expect("kept");
        assert_eq!(original.pos, GridPos::new(4, 1));
    }

    #[test]
    fn autotile_block_assigns_center_and_corner_variants() {
        let mut map = block_3x3(TileKind::Grass);
        map.autotile();

        let variant = |x, y| map.tile_at(GridPos::new(x, y)).expect("tile").variant;
        assert_eq!(variant(1, 1), 8);
        assert_eq!(variant(0, 0), 0);
        assert_eq!(variant(2, 0), 2);
        assert_eq!(variant(2, 2), 4);
        assert_eq!(variant(0, 2), 6);
        assert_eq!(variant(1, 0), 1);
        assert_eq!(variant(2, 1), 3);
        assert_eq!(variant(1, 2), 5);
        assert_eq!(variant(0, 1), 7);
    }

    #[test]
    fn autotile_only_counts_same_kind_and_skips_unmapped() {
        let mut map = Tilemap::default();
        map.insert(Tile::new(TileKind::Grass, 5, GridPos::new(0, 0)));
        map.insert(Tile::new(TileKind::Stone, 5, GridPos::new(1, 0)));
        map.insert(Tile::new(TileKind::Stone, 5, GridPos::new(0, 1)));
        map.insert(Tile::new(TileKind::Decor, 5, GridPos::new(5, 5)));
        map.insert(Tile::new(TileKind::Decor, 5, GridPos::new(6, 5)));

        map.autotile();

        assert_eq!(map.tile_at(GridPos::new(0, 0)).expect("grass").variant, 5);
        assert_eq!(map.tile_at(GridPos::new(1, 0)).expect("stone").variant, 5);
        assert_eq!(map.tile_at(GridPos::new(5, 5)).expect("decor").variant, 5);
    }

    #[test]
    fn autotile_is_idempotent() {
        let mut map = block_3x3(TileKind::Stone);
        assert_eq!(map.autotile(), 8);
        let snapshot = map.clone();
        assert_eq!(map.autotile(), 0);
        assert_eq!(map, snapshot);
    }

    #[test]
    fn autotile_handles_tiles_on_the_grid_edge() {
        let raw = r#"{"tilemap": {
            "2147483647;0": {"type": "stone", "variant": 1, "pos": [2147483647, 0]},
            "2147483646;0": {"type": "stone", "variant": 1, "pos": [2147483646, 0]},
            "2147483647;1": {"type": "stone", "variant": 1, "pos": [2147483647, 1]}
        }, "tile_size": 16, "offgrid": []}"#;
        let mut map = Tilemap::from_json_str(raw).expect("edge level");

        assert_eq!(map.autotile(), 1);
        let variant = |x, y| map.tile_at(GridPos::new(x, y)).expect("tile").variant;
        assert_eq!(variant(i32::MAX, 0), 2);
        assert_eq!(variant(i32::MAX - 1, 0), 1);
        assert_eq!(variant(i32::MAX, 1), 1);
    }

    #[test]
    fn far_away_queries_find_nothing() {
        let mut map = Tilemap::default();
        map.insert(grass(0, 0));
        for position in [Vec2::new(1.0e12, 0.0), Vec2::new(-1.0e12, -1.0e12)] {
            assert!(map.tiles_around(position).is_empty());
            assert!(map.physics_rects_around(position, 8.0, 15.0).is_empty());
            assert!(map.solid_check(position).is_none());
        }
    }
}

//! Binding from tile color/phase to atlas cells. The block sheet keeps one
//! color per column and one look per row; combo badges and their digits live
//! in two small companion atlases.

use thiserror::Error;

use crate::assets::manifest::AssetManifest;
use crate::components::tile::{TileColor, TilePhase};

// Block sheet rows, one look per row.
const ROW_REGULAR: f32 = 0.0;
const ROW_BOUNCE_HIGH: f32 = 1.0;
const ROW_BOUNCE_MID: f32 = 2.0;
const ROW_BOUNCE_LOW: f32 = 3.0;
const ROW_DARK: f32 = 4.0;
const ROW_POPPED: f32 = 5.0;
const ROW_FLASH: f32 = 6.0;
const BLOCK_ROWS: u32 = 7;

/// Smallest badge number with its own digit sprite.
const NUMBER_MIN: u32 = 2;
/// Largest badge number with its own digit sprite.
const NUMBER_MAX: u32 = 19;

/// One atlas cell a renderer can draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteCell {
    /// Index into the manifest's atlas list.
    pub atlas: u32,
    pub col: f32,
    pub row: f32,
}

/// The two combo badge boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    /// Group-size box ("pop").
    Pop,
    /// Chain-depth box ("repeat").
    Repeat,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SheetError {
    #[error("manifest has no {0:?} atlas")]
    MissingAtlas(&'static str),
    #[error("atlas {name:?} is {cols}x{rows}, needs at least {need_cols}x{need_rows}")]
    AtlasTooSmall {
        name: &'static str,
        cols: u32,
        rows: u32,
        need_cols: u32,
        need_rows: u32,
    },
}

/// Resolved sprite-sheet binding for one game session.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSpriteSet {
    blocks: u32,
    badges: u32,
    numbers: u32,
}

impl TileSpriteSet {
    /// Resolve and validate the three atlases this game draws from:
    /// "blocks", "combo_boxes" and "numbers".
    pub fn from_manifest(manifest: &AssetManifest) -> Result<Self, SheetError> {
        let blocks = require(manifest, "blocks", TileColor::ALL.len() as u32, BLOCK_ROWS)?;
        let badges = require(manifest, "combo_boxes", 2, 1)?;
        let numbers = require(manifest, "numbers", NUMBER_MAX - NUMBER_MIN + 1, 1)?;
        Ok(Self {
            blocks,
            badges,
            numbers,
        })
    }

    /// The cell for a tile in a given phase, or `None` when the tile is
    /// already invisible.
    pub fn tile_sprite(&self, color: TileColor, phase: TilePhase) -> Option<SpriteCell> {
        let row = match phase {
            TilePhase::Regular | TilePhase::Matched => ROW_REGULAR,
            TilePhase::MatchedBlink => ROW_FLASH,
            TilePhase::Popping => ROW_POPPED,
            TilePhase::Popped => return None,
            TilePhase::BounceLow => ROW_BOUNCE_LOW,
            TilePhase::BounceHigh => ROW_BOUNCE_HIGH,
            TilePhase::BounceMid => ROW_BOUNCE_MID,
        };
        Some(SpriteCell {
            atlas: self.blocks,
            col: color.atlas_col(),
            row,
        })
    }

    /// Dimmed look for tiles on the boundary row the scroll has not fully
    /// revealed yet.
    pub fn boundary_sprite(&self, color: TileColor) -> SpriteCell {
        SpriteCell {
            atlas: self.blocks,
            col: color.atlas_col(),
            row: ROW_DARK,
        }
    }

    pub fn badge_sprite(&self, kind: BadgeKind) -> SpriteCell {
        SpriteCell {
            atlas: self.badges,
            col: match kind {
                BadgeKind::Pop => 0.0,
                BadgeKind::Repeat => 1.0,
            },
            row: 0.0,
        }
    }

    /// Digit sprite for a badge value; values past the sheet reuse the last
    /// digit cell.
    pub fn number_sprite(&self, value: u32) -> Option<SpriteCell> {
        if value < NUMBER_MIN {
            return None;
        }
        let col = (value.min(NUMBER_MAX) - NUMBER_MIN) as f32;
        Some(SpriteCell {
            atlas: self.numbers,
            col,
            row: 0.0,
        })
    }
}

fn require(
    manifest: &AssetManifest,
    name: &'static str,
    need_cols: u32,
    need_rows: u32,
) -> Result<u32, SheetError> {
    let index = manifest
        .atlas_index(name)
        .ok_or(SheetError::MissingAtlas(name))?;
    let atlas = manifest.atlas(index).expect("index from atlas_index");
    if atlas.cols < need_cols || atlas.rows < need_rows {
        return Err(SheetError::AtlasTooSmall {
            name,
            cols: atlas.cols,
            rows: atlas.rows,
            need_cols,
            need_rows,
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> AssetManifest {
        AssetManifest::from_json(
            r#"{
            "atlases": [
                { "name": "blocks", "cols": 6, "rows": 8, "path": "blocks.png" },
                { "name": "combo_boxes", "cols": 2, "rows": 1, "path": "boxes.png" },
                { "name": "numbers", "cols": 18, "rows": 1, "path": "numbers.png" }
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn binds_all_three_atlases() {
        let sheet = TileSpriteSet::from_manifest(&manifest()).unwrap();
        let cell = sheet.tile_sprite(TileColor::Red, TilePhase::Regular).unwrap();
        assert_eq!(cell.atlas, 0);
        assert_eq!(cell.col, TileColor::Red.atlas_col());
        assert_eq!(cell.row, 0.0);
    }

    #[test]
    fn missing_atlas_is_reported() {
        let manifest = AssetManifest::from_json(r#"{ "atlases": [] }"#).unwrap();
        assert_eq!(
            TileSpriteSet::from_manifest(&manifest),
            Err(SheetError::MissingAtlas("blocks"))
        );
    }

    #[test]
    fn undersized_atlas_is_rejected() {
        let manifest = AssetManifest::from_json(
            r#"{
            "atlases": [
                { "name": "blocks", "cols": 4, "rows": 8, "path": "blocks.png" },
                { "name": "combo_boxes", "cols": 2, "rows": 1, "path": "boxes.png" },
                { "name": "numbers", "cols": 18, "rows": 1, "path": "numbers.png" }
            ]
        }"#,
        )
        .unwrap();
        assert!(matches!(
            TileSpriteSet::from_manifest(&manifest),
            Err(SheetError::AtlasTooSmall { name: "blocks", .. })
        ));
    }

    #[test]
    fn phases_map_to_distinct_rows() {
        let sheet = TileSpriteSet::from_manifest(&manifest()).unwrap();
        let rows: Vec<f32> = [
            TilePhase::Regular,
            TilePhase::BounceHigh,
            TilePhase::BounceMid,
            TilePhase::BounceLow,
            TilePhase::Popping,
            TilePhase::MatchedBlink,
        ]
        .into_iter()
        .map(|phase| {
            sheet
                .tile_sprite(TileColor::Green, phase)
                .unwrap()
                .row
        })
        .collect();
        for (i, a) in rows.iter().enumerate() {
            for b in &rows[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn popped_tiles_have_no_sprite() {
        let sheet = TileSpriteSet::from_manifest(&manifest()).unwrap();
        assert!(sheet.tile_sprite(TileColor::Blue, TilePhase::Popped).is_none());
    }

    #[test]
    fn numbers_clamp_to_the_sheet() {
        let sheet = TileSpriteSet::from_manifest(&manifest()).unwrap();
        assert!(sheet.number_sprite(1).is_none());
        assert_eq!(sheet.number_sprite(2).unwrap().col, 0.0);
        assert_eq!(sheet.number_sprite(19).unwrap().col, 17.0);
        assert_eq!(sheet.number_sprite(50).unwrap().col, 17.0);
    }
}

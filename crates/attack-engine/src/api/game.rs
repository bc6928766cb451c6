use serde::{Deserialize, Serialize};

use crate::api::types::GameEvent;
use crate::assets::manifest::AssetManifest;
use crate::assets::sheet::{SheetError, TileSpriteSet};
use crate::components::animation::Timings;
use crate::components::tile::Tile;
use crate::core::board::{Board, Cursor, LayoutError};

/// Configuration for one game session, loadable from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Columns on the board.
    pub width: usize,
    /// Rows the render window shows at once.
    pub visible_rows: usize,
    /// Pixel size of one tile cell.
    pub tile_size: f32,
    /// 0..60; higher scrolls faster.
    pub scroll_speed: u32,
    /// PRNG seed for row generation.
    pub seed: u64,
    pub timings: Timings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 6,
            visible_rows: 12,
            tile_size: 32.0,
            scroll_speed: 10,
            seed: 42,
            timings: Timings::default(),
        }
    }
}

impl GameConfig {
    /// Parse a config from a JSON string; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Thin facade over [`Board`]: translates directional input into board
/// calls and exposes the read-only state a renderer or control script needs.
/// Constructed once per session and passed by handle to whoever needs it —
/// there is no ambient instance.
#[derive(Debug, Clone)]
pub struct GameInstance {
    config: GameConfig,
    board: Board,
    sheet: Option<TileSpriteSet>,
}

impl GameInstance {
    pub fn new(config: GameConfig) -> Self {
        Self {
            board: Board::new(&config),
            config,
            sheet: None,
        }
    }

    /// Start from a fixture layout instead of generated rows.
    pub fn with_layout(config: GameConfig, layout: &str) -> Result<Self, LayoutError> {
        Ok(Self {
            board: Board::with_layout(&config, layout)?,
            config,
            sheet: None,
        })
    }

    /// Throw the board away and start over with the same config.
    pub fn reset(&mut self) {
        self.board = Board::new(&self.config);
    }

    /// Advance the simulation one fixed step.
    pub fn tick(&mut self) {
        self.board.tick();
    }

    /// Swap the cursor pair. Reports whether the swap was accepted.
    pub fn swap(&mut self) -> bool {
        self.board.swap()
    }

    pub fn move_left(&mut self) -> bool {
        if self.board.cursor.x == 0 {
            return false;
        }
        self.board.cursor.x -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.board.cursor.x + 2 >= self.board.width {
            return false;
        }
        self.board.cursor.x += 1;
        true
    }

    pub fn move_up(&mut self) -> bool {
        if self.board.cursor.y <= self.board.top_most_row - 1 {
            return false;
        }
        self.board.cursor.y -= 1;
        true
    }

    pub fn move_down(&mut self) -> bool {
        if self.board.cursor.y >= self.board.lowest_visible_row() - 1 {
            return false;
        }
        self.board.cursor.y += 1;
        true
    }

    pub fn cursor(&self) -> Cursor {
        self.board.cursor
    }

    /// The pair of tiles under the cursor; either side may be empty.
    pub fn cursor_tiles(&self) -> [Option<&Tile>; 2] {
        let Cursor { x, y } = self.board.cursor;
        [self.board.tile(x, y), self.board.tile(x + 1, y)]
    }

    pub fn tile(&self, x: usize, y: i32) -> Option<&Tile> {
        self.board.tile(x, y)
    }

    pub fn combo_count(&self) -> u32 {
        self.board.combo_count
    }

    pub fn top_most_row(&self) -> i32 {
        self.board.top_most_row
    }

    pub fn lowest_visible_row(&self) -> i32 {
        self.board.lowest_visible_row()
    }

    /// Events of the most recent tick.
    pub fn events(&self) -> &[GameEvent] {
        &self.board.events
    }

    /// Full read access for renderers and speculative AI. Cloning the
    /// instance deep-copies the board, so a script can tick the copy freely.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Bind the presentational sprite sheets. Purely a render concern;
    /// simulation behavior never depends on it.
    pub fn load_asset_sheets(&mut self, manifest: &AssetManifest) -> Result<(), SheetError> {
        self.sheet = Some(TileSpriteSet::from_manifest(manifest)?);
        Ok(())
    }

    pub fn sprite_sheet(&self) -> Option<&TileSpriteSet> {
        self.sheet.as_ref()
    }
}

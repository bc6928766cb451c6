use glam::Vec2;

use crate::api::types::TileId;

/// The six tile hues of the block sheet, in atlas column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileColor {
    Green,
    Purple,
    Red,
    Yellow,
    Teal,
    Blue,
}

impl TileColor {
    pub const ALL: [TileColor; 6] = [
        TileColor::Green,
        TileColor::Purple,
        TileColor::Red,
        TileColor::Yellow,
        TileColor::Teal,
        TileColor::Blue,
    ];

    /// One-letter layout code, used by `Board::with_layout` fixtures.
    pub fn from_char(c: char) -> Option<TileColor> {
        match c {
            'g' => Some(TileColor::Green),
            'p' => Some(TileColor::Purple),
            'r' => Some(TileColor::Red),
            'y' => Some(TileColor::Yellow),
            't' => Some(TileColor::Teal),
            'b' => Some(TileColor::Blue),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            TileColor::Green => 'g',
            TileColor::Purple => 'p',
            TileColor::Red => 'r',
            TileColor::Yellow => 'y',
            TileColor::Teal => 't',
            TileColor::Blue => 'b',
        }
    }

    /// Column of this color in every row of the block atlas.
    pub fn atlas_col(self) -> f32 {
        self as u32 as f32
    }
}

/// Presentation phase of a tile. Gates simulation too: a tile mid-pop or
/// mid-bounce is excluded from new match scans via its `swappable` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TilePhase {
    #[default]
    Regular,
    Matched,
    MatchedBlink,
    Popping,
    Popped,
    BounceLow,
    BounceHigh,
    BounceMid,
}

impl TilePhase {
    /// Popped tiles are gone visually before they leave the grid.
    pub fn is_visible(self) -> bool {
        self != TilePhase::Popped
    }
}

/// One grid tile. `x`/`y` always mirror the cell that holds the tile;
/// all moves go through `TileGrid` so the two can never diverge.
#[derive(Debug, Clone)]
pub struct Tile {
    pub id: TileId,
    pub color: TileColor,
    pub x: usize,
    /// Row index. Grows downward without bound as the board scrolls.
    pub y: i32,
    /// False while the tile takes part in a swap, drop or pop sequence.
    pub swappable: bool,
    /// Set for one detection cycle on tiles that landed because of a pop;
    /// a match containing one extends the chain.
    pub combo_viable: bool,
    pub phase: TilePhase,
    /// Interpolated pixel position, recomputed every tick.
    pub draw_pos: Vec2,
}

impl Tile {
    pub fn new(id: TileId, color: TileColor, x: usize, y: i32, tile_size: f32) -> Self {
        let mut tile = Tile {
            id,
            color,
            x,
            y,
            swappable: true,
            combo_viable: false,
            phase: TilePhase::Regular,
            draw_pos: Vec2::ZERO,
        };
        tile.sync_draw_pos(tile_size);
        tile
    }

    /// Reset the draw position to the cell-derived pixel position.
    /// In-flight swap offsets are layered on top afterwards.
    pub fn sync_draw_pos(&mut self, tile_size: f32) {
        self.draw_pos = Vec2::new(self.x as f32 * tile_size, self.y as f32 * tile_size);
    }
}

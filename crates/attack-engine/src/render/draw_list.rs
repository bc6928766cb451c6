//! Pull-based draw state: after each tick a renderer sweeps the board into a
//! flat buffer of Pod instances. The board is never mutated by rendering.

use bytemuck::{Pod, Zeroable};

use crate::assets::sheet::{BadgeKind, TileSpriteSet};
use crate::core::board::Board;

/// Instance kinds, stored as a float tag in [`TileInstance::kind`].
pub const KIND_TILE: f32 = 1.0;
pub const KIND_CURSOR: f32 = 2.0;
pub const KIND_BADGE: f32 = 3.0;
pub const KIND_DIGIT: f32 = 4.0;

/// Per-instance draw data; 8 floats, 32 bytes stride.
/// `y` is in board space — renderers add [`Board::pixel_scroll`] to place
/// rows on screen.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct TileInstance {
    pub x: f32,
    pub y: f32,
    /// Rendered cell height in pixels. The cursor box is two cells wide;
    /// everything else is square.
    pub size: f32,
    /// Atlas index; meaningless for the cursor, which has its own art.
    pub atlas: f32,
    pub col: f32,
    pub row: f32,
    pub alpha: f32,
    pub kind: f32,
}

impl TileInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Rebuild the draw list for the current tick: visible tiles (the boundary
/// row dimmed), the flexing cursor box, then rising combo badges.
pub fn build_draw_list(board: &Board, sheet: &TileSpriteSet, out: &mut Vec<TileInstance>) {
    out.clear();
    let tile_size = board.tile_size;
    let lowest = board.lowest_visible_row();

    for y in board.top_most_row..=lowest {
        for x in 0..board.width {
            let Some(tile) = board.tile(x, y) else {
                continue;
            };
            let sprite = if y == lowest {
                Some(sheet.boundary_sprite(tile.color))
            } else {
                sheet.tile_sprite(tile.color, tile.phase)
            };
            let Some(sprite) = sprite else {
                continue;
            };
            out.push(TileInstance {
                x: tile.draw_pos.x,
                y: tile.draw_pos.y,
                size: tile_size,
                atlas: sprite.atlas as f32,
                col: sprite.col,
                row: sprite.row,
                alpha: 1.0,
                kind: KIND_TILE,
            });
        }
    }

    let pad = if cursor_flexed(board) { 4.0 } else { 8.0 };
    out.push(TileInstance {
        x: board.cursor.x as f32 * tile_size - pad,
        y: board.cursor.y as f32 * tile_size - pad,
        size: tile_size + pad * 2.0,
        atlas: 0.0,
        col: 0.0,
        row: 0.0,
        alpha: 1.0,
        kind: KIND_CURSOR,
    });

    for anim in &board.pop_animations {
        let badge = &anim.badge;
        let Some(rise) = badge.rise_offset() else {
            continue;
        };
        if badge.age <= 2 {
            continue;
        }
        let mut y = badge.pos.y - rise;
        if badge.group_size > 3 {
            push_badge(out, sheet, BadgeKind::Pop, badge.group_size, badge.pos.x, y, tile_size);
            y -= tile_size;
        }
        if badge.chain > 1 {
            push_badge(out, sheet, BadgeKind::Repeat, badge.chain, badge.pos.x, y, tile_size);
        }
    }
}

fn push_badge(
    out: &mut Vec<TileInstance>,
    sheet: &TileSpriteSet,
    kind: BadgeKind,
    value: u32,
    x: f32,
    y: f32,
    tile_size: f32,
) {
    let box_cell = sheet.badge_sprite(kind);
    out.push(TileInstance {
        x,
        y,
        size: tile_size,
        atlas: box_cell.atlas as f32,
        col: box_cell.col,
        row: box_cell.row,
        alpha: 1.0,
        kind: KIND_BADGE,
    });
    if let Some(digit) = sheet.number_sprite(value) {
        out.push(TileInstance {
            x: x + tile_size * 0.2,
            y: y + tile_size * 0.1,
            size: tile_size * 0.6,
            atlas: digit.atlas as f32,
            col: digit.col,
            row: digit.row,
            alpha: 1.0,
            kind: KIND_DIGIT,
        });
    }
}

/// True during the narrow half of the cursor box flex cycle.
pub fn cursor_flexed(board: &Board) -> bool {
    let period = board.timings.cursor_flex_ticks.max(1);
    (board.tick_count % period) * 2 < period
}

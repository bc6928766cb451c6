//! The board orchestrator: owns the grid, the scroll window, the cursor and
//! every in-flight animation, and runs the per-tick pipeline in a fixed
//! order. One external driver calls [`Board::tick`] once per frame; swap and
//! cursor moves only record intent that the next tick consumes.

use thiserror::Error;

use crate::api::game::GameConfig;
use crate::api::types::{GameEvent, TileId};
use crate::components::animation::{
    ComboTracker, DropAnimation, PopAnimation, SwapAnimation, Timings,
};
use crate::components::tile::{Tile, TileColor};
use crate::core::grid::TileGrid;
use crate::core::rng::Rng;
use crate::systems::{gravity, matching, popping};

/// Rows of generated tiles kept ahead of the scroll.
const ROW_BUFFER: i32 = 15;
/// The scroll offset advances one pixel every `SCROLL_BASE - speed` ticks.
const SCROLL_BASE: u64 = 60;
/// Cadence of top-row advance, row pruning and refill, in ticks.
const HOUSEKEEPING_TICKS: u64 = 10;

/// Failure to parse a `Board::with_layout` fixture string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown tile character {0:?}")]
    UnknownTile(char),
    #[error("row {row} is {len} cells wide, board is {width}")]
    BadWidth {
        row: usize,
        len: usize,
        width: usize,
    },
}

/// Player selection: the pair of cells at (x, y) and (x + 1, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: usize,
    pub y: i32,
}

#[derive(Debug, Clone)]
pub struct Board {
    pub width: usize,
    /// Rows the render window shows at once.
    pub visible_rows: usize,
    pub tile_size: f32,
    /// 0..60; higher scrolls faster.
    pub scroll_speed: u32,
    pub timings: Timings,
    pub grid: TileGrid,
    pub rng: Rng,
    next_tile_id: u32,
    pub tick_count: u64,
    /// Sub-row pixel scroll accumulator; frozen while any pop runs.
    pub scroll_offset: f32,
    /// Empty row just above the first populated one; advances as upper rows
    /// drain.
    pub top_most_row: i32,
    pub cursor: Cursor,
    /// Current chain depth; 1 whenever the board is quiet.
    pub combo_count: u32,
    pub combo_trackers: Vec<ComboTracker>,
    pub swap_animation: Option<SwapAnimation>,
    pub pop_animations: Vec<PopAnimation>,
    pub dropping_columns: Vec<DropAnimation>,
    /// Events of the most recent tick.
    pub events: Vec<GameEvent>,
}

impl Board {
    /// A fresh board filled with generated rows.
    pub fn new(config: &GameConfig) -> Self {
        let mut board = Self::empty(config);
        for y in 0..ROW_BUFFER {
            board.fill_row(y);
        }
        board
    }

    /// A board seeded from a fixture string: one line per row from the top,
    /// one color letter per cell, `'.'` for an empty cell. Generated rows
    /// are appended below, as on a fresh board.
    pub fn with_layout(config: &GameConfig, layout: &str) -> Result<Self, LayoutError> {
        let mut board = Self::empty(config);
        let mut next_y = 0;
        for line in layout.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let len = line.chars().count();
            if len != board.width {
                return Err(LayoutError::BadWidth {
                    row: next_y as usize,
                    len,
                    width: board.width,
                });
            }
            for (x, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                let color = TileColor::from_char(c).ok_or(LayoutError::UnknownTile(c))?;
                board.spawn_tile(color, x, next_y);
            }
            next_y += 1;
        }
        for y in next_y..next_y + ROW_BUFFER {
            board.fill_row(y);
        }
        Ok(board)
    }

    fn empty(config: &GameConfig) -> Self {
        assert!(config.width >= 2, "board needs at least two columns");
        Board {
            width: config.width,
            visible_rows: config.visible_rows,
            tile_size: config.tile_size,
            scroll_speed: config.scroll_speed.min(SCROLL_BASE as u32 - 1),
            timings: config.timings,
            grid: TileGrid::new(config.width),
            rng: Rng::new(config.seed),
            next_tile_id: 1,
            tick_count: 0,
            scroll_offset: config.tile_size * config.visible_rows as f32 / 2.0,
            top_most_row: 0,
            cursor: Cursor::default(),
            combo_count: 1,
            combo_trackers: Vec::new(),
            swap_animation: None,
            pop_animations: Vec::new(),
            dropping_columns: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The scroll freezes while any match is popping.
    pub fn is_paused(&self) -> bool {
        !self.pop_animations.is_empty()
    }

    /// Lowest row the scroll has revealed. The row itself is the dimmed
    /// boundary: rendered, but outside the simulated range.
    pub fn lowest_visible_row(&self) -> i32 {
        let mut y = self.top_most_row;
        while self.scroll_offset - y as f32 * self.tile_size > 0.0 {
            y += 1;
        }
        y - 1
    }

    /// Pixel offset renderers add to board-space draw positions to place
    /// rows on screen.
    pub fn pixel_scroll(&self) -> f32 {
        self.visible_rows as f32 * self.tile_size - self.scroll_offset
    }

    pub fn tile(&self, x: usize, y: i32) -> Option<&Tile> {
        self.grid.get(x, y)
    }

    /// Advance the simulation by one fixed step.
    pub fn tick(&mut self) {
        self.events.clear();
        self.tick_count += 1;
        self.advance_scroll();
        if self.tick_count % HOUSEKEEPING_TICKS == 0 {
            self.housekeeping();
        }
        self.sync_draw_positions();
        self.tick_swap();
        popping::tick_pops(self);
        matching::run_match_scan(self);
        self.clear_combo_flags();
        gravity::tick_drops(self);
        gravity::seed_drops(self);
        self.update_chain_state();
        debug_assert!(self.grid.cells_consistent());
    }

    /// Lock the cursor pair and start the swap. Empty cells swap freely;
    /// locked tiles and an in-flight swap reject the request.
    pub fn swap(&mut self) -> bool {
        if self.swap_animation.is_some() {
            return false;
        }
        let Cursor { x, y } = self.cursor;
        if x + 1 >= self.width {
            return false;
        }
        let left_ok = self.grid.get(x, y).map_or(true, |tile| tile.swappable);
        let right_ok = self.grid.get(x + 1, y).map_or(true, |tile| tile.swappable);
        if !left_ok || !right_ok {
            return false;
        }
        if let Some(tile) = self.grid.get_mut(x, y) {
            tile.swappable = false;
        }
        if let Some(tile) = self.grid.get_mut(x + 1, y) {
            tile.swappable = false;
        }
        self.swap_animation = Some(SwapAnimation {
            x1: x,
            x2: x + 1,
            y,
            ticks_left: self.timings.swap_ticks,
        });
        self.events.push(GameEvent::SwapStarted { x, y });
        true
    }

    fn advance_scroll(&mut self) {
        if self.is_paused() {
            return;
        }
        let period = (SCROLL_BASE - self.scroll_speed as u64).max(1);
        if self.tick_count % period == 0 {
            self.scroll_offset += 1.0;
        }
    }

    fn housekeeping(&mut self) {
        let lowest = self.lowest_visible_row();
        for y in self.top_most_row..lowest {
            if self.grid.is_row_empty(y) {
                self.top_most_row = y;
            } else {
                break;
            }
        }
        self.grid.prune_rows_above(self.top_most_row);

        let max_y = self
            .grid
            .max_tile_row()
            .map_or(self.top_most_row, |y| y + 1);
        if max_y - self.top_most_row < ROW_BUFFER {
            for y in max_y..self.top_most_row + ROW_BUFFER {
                self.fill_row(y);
            }
        }
    }

    fn sync_draw_positions(&mut self) {
        let tile_size = self.tile_size;
        for tile in self.grid.iter_mut() {
            tile.sync_draw_pos(tile_size);
        }
    }

    fn tick_swap(&mut self) {
        let Some(anim) = self.swap_animation else {
            return;
        };
        if anim.ticks_left > 0 {
            let ticks_left = anim.ticks_left - 1;
            self.swap_animation = Some(SwapAnimation { ticks_left, ..anim });
            let progress = 1.0 - ticks_left as f32 / self.timings.swap_ticks as f32;
            let shift = self.tile_size * progress;
            if let Some(tile) = self.grid.get_mut(anim.x1, anim.y) {
                tile.draw_pos.x += shift;
            }
            if let Some(tile) = self.grid.get_mut(anim.x2, anim.y) {
                tile.draw_pos.x -= shift;
            }
        } else {
            self.swap_animation = None;
            self.grid.swap_cells(anim.x1, anim.x2, anim.y);
            let tile_size = self.tile_size;
            for x in [anim.x1, anim.x2] {
                if let Some(tile) = self.grid.get_mut(x, anim.y) {
                    tile.swappable = true;
                    tile.sync_draw_pos(tile_size);
                }
            }
        }
    }

    fn clear_combo_flags(&mut self) {
        for tile in self.grid.iter_mut() {
            tile.combo_viable = false;
        }
    }

    fn update_chain_state(&mut self) {
        if self.pop_animations.is_empty() && self.dropping_columns.is_empty() {
            if self.combo_count > 1 {
                self.events.push(GameEvent::ChainEnded {
                    length: self.combo_count,
                });
            }
            self.combo_count = 1;
        }
        for tracker in &mut self.combo_trackers {
            tracker.timer = tracker.timer.saturating_sub(1);
        }
        self.combo_trackers.retain(|tracker| tracker.timer > 0);
    }

    /// Generate one full row at `y`, re-rolling any color that would arrive
    /// as a ready-made horizontal or vertical triple.
    fn fill_row(&mut self, y: i32) {
        for x in 0..self.width {
            let mut color = *self.rng.pick(&TileColor::ALL);
            let mut rerolls = 0;
            while self.completes_triple(x, y, color) && rerolls < 16 {
                color = *self.rng.pick(&TileColor::ALL);
                rerolls += 1;
            }
            self.spawn_tile(color, x, y);
        }
    }

    fn completes_triple(&self, x: usize, y: i32, color: TileColor) -> bool {
        let same = |x: usize, y: i32| self.grid.get(x, y).is_some_and(|tile| tile.color == color);
        let horizontal = x >= 2 && same(x - 1, y) && same(x - 2, y);
        let vertical = same(x, y - 1) && same(x, y - 2);
        horizontal || vertical
    }

    pub(crate) fn spawn_tile(&mut self, color: TileColor, x: usize, y: i32) -> TileId {
        let id = TileId(self.next_tile_id);
        self.next_tile_id += 1;
        let tile = Tile::new(id, color, x, y, self.tile_size);
        if self.grid.insert(tile).is_some() {
            log::warn!("spawn displaced a live tile at ({x}, {y})");
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(layout: &str) -> Board {
        Board::with_layout(&GameConfig::default(), layout).unwrap()
    }

    fn run_ticks(board: &mut Board, n: u32) {
        for _ in 0..n {
            board.tick();
        }
    }

    fn colors_at(board: &Board, y: i32, xs: std::ops::Range<usize>) -> Vec<Option<char>> {
        xs.map(|x| board.tile(x, y).map(|t| t.color.as_char()))
            .collect()
    }

    #[test]
    fn layout_parsing_rejects_bad_input() {
        let config = GameConfig::default();
        assert_eq!(
            Board::with_layout(&config, "gg").unwrap_err(),
            LayoutError::BadWidth {
                row: 0,
                len: 2,
                width: 6
            }
        );
        assert_eq!(
            Board::with_layout(&config, "gggxgg").unwrap_err(),
            LayoutError::UnknownTile('x')
        );
    }

    #[test]
    fn layout_rows_land_where_written() {
        let board = board_with(
            "bgtgbg
             rrbbgg",
        );
        assert_eq!(
            colors_at(&board, 0, 0..6),
            "bgtgbg".chars().map(Some).collect::<Vec<_>>()
        );
        assert_eq!(board.tile(2, 1).unwrap().color, TileColor::Blue);
        // Generated rows continue below the fixture
        assert!(board.tile(0, 2).is_some());
        assert!(board.grid.cells_consistent());
    }

    #[test]
    fn swap_exchanges_cells_and_restores_swappable() {
        let mut board = board_with(
            "bgtgbg
             ttyyrr
             bbggtt",
        );
        assert!(board.swap());
        assert!(!board.tile(0, 0).unwrap().swappable);
        assert!(board
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::SwapStarted { x: 0, y: 0 })));

        // Mid-swap the draw positions slide toward each other
        board.tick();
        let left = board.tile(0, 0).unwrap();
        assert_eq!(left.draw_pos.x, board.tile_size * 0.25);

        run_ticks(&mut board, 4);
        let left = board.tile(0, 0).unwrap();
        let right = board.tile(1, 0).unwrap();
        assert_eq!(left.color, TileColor::Green);
        assert_eq!(right.color, TileColor::Blue);
        assert!(left.swappable && right.swappable);
        assert_eq!(left.draw_pos.x, 0.0);
    }

    #[test]
    fn swap_with_an_empty_cell_moves_the_tile() {
        let mut board = board_with(
            "b.....
             tygbgt
             gbtgtb",
        );
        assert!(board.swap());
        run_ticks(&mut board, 5);
        assert!(board.tile(0, 0).is_none());
        let moved = board.tile(1, 0).unwrap();
        assert_eq!(moved.color, TileColor::Blue);
        assert_eq!(moved.x, 1);
        assert!(board.grid.cells_consistent());
    }

    #[test]
    fn swap_rejected_while_one_is_in_flight() {
        let mut board = board_with(
            "bgtgbg
             ttyyrr
             bbggtt",
        );
        assert!(board.swap());
        assert!(!board.swap());
    }

    #[test]
    fn swap_rejected_when_a_tile_is_locked() {
        let mut board = board_with(
            "ggg...
             tybtyb",
        );
        board.tick();
        assert!(!board.pop_animations.is_empty());
        let before = colors_at(&board, 0, 0..2);
        assert!(!board.swap());
        assert_eq!(colors_at(&board, 0, 0..2), before);
    }

    #[test]
    fn same_color_swap_causes_no_match() {
        let mut board = board_with(
            "bgtgbg
             rrbbgg",
        );
        board.cursor = Cursor { x: 0, y: 1 };
        assert!(board.swap());
        run_ticks(&mut board, 30);
        assert!(board.pop_animations.is_empty());
        assert_eq!(board.tile(0, 1).unwrap().color, TileColor::Red);
        assert_eq!(board.tile(1, 1).unwrap().color, TileColor::Red);

        board.cursor = Cursor { x: 4, y: 1 };
        assert!(board.swap());
        run_ticks(&mut board, 30);
        assert!(board.pop_animations.is_empty());
        assert_eq!(board.combo_count, 1);
    }

    #[test]
    fn swap_into_a_row_of_three_pops_and_drains_the_cells() {
        let mut board = board_with(
            "gbgg..
             brbyty
             ygbgbg",
        );
        board.cursor = Cursor { x: 0, y: 0 };
        assert!(board.swap());
        let mut matched = false;
        for _ in 0..200 {
            board.tick();
            matched |= board
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::MatchFound { size: 3, chain: 1, .. }));
        }
        assert!(matched, "swap never produced a match");
        assert!(board.pop_animations.is_empty());
        for x in 1..4 {
            assert!(board.tile(x, 0).is_none(), "cell ({x}, 0) still occupied");
        }
    }

    #[test]
    fn chain_reaction_counts_and_resets() {
        // Swapping (0,3) turns row 3 into b-g-g-g. The popped g under the
        // r-stack lets it fall onto the r at row 4, landing r-r-r.
        let mut board = board_with(
            "......
             .r....
             .r....
             gbgg..
             brbyty
             ygbgbg",
        );
        board.cursor = Cursor { x: 0, y: 3 };
        assert!(board.swap());

        let mut max_combo = 1;
        let mut chain_ended = None;
        for _ in 0..400 {
            board.tick();
            max_combo = max_combo.max(board.combo_count);
            for event in &board.events {
                if let GameEvent::ChainEnded { length } = event {
                    chain_ended = Some(*length);
                }
            }
        }
        assert_eq!(max_combo, 2, "the drop should have extended the chain");
        assert_eq!(chain_ended, Some(2));
        assert_eq!(board.combo_count, 1);
        assert!(board.pop_animations.is_empty());
        assert!(board.dropping_columns.is_empty());

        // Both matches drained: the g-row and the r-column
        for x in 1..4 {
            assert!(board.tile(x, 3).is_none());
        }
        assert!(board.tile(1, 1).is_none());
        assert!(board.tile(1, 2).is_none());
        assert!(board.tile(1, 4).is_none());
    }

    #[test]
    fn chain_match_reports_its_depth() {
        let mut board = board_with(
            "......
             .r....
             .r....
             gbgg..
             brbyty
             ygbgbg",
        );
        board.cursor = Cursor { x: 0, y: 3 };
        board.swap();
        let mut depths = Vec::new();
        for _ in 0..400 {
            board.tick();
            for event in &board.events {
                if let GameEvent::MatchFound { chain, .. } = event {
                    depths.push(*chain);
                }
            }
        }
        assert_eq!(depths, vec![1, 2]);
    }

    #[test]
    fn grid_invariant_holds_through_a_full_chain() {
        let mut board = board_with(
            "......
             .r....
             .r....
             gbgg..
             brbyty
             ygbgbg",
        );
        board.cursor = Cursor { x: 0, y: 3 };
        board.swap();
        for _ in 0..400 {
            board.tick();
            assert!(board.grid.cells_consistent());
        }
    }

    #[test]
    fn scroll_reveals_the_boundary_row_for_matching() {
        // g,g,g sits at rows 3..5; row 5 is past the boundary until the
        // scroll advances one pixel at tick 50.
        let mut board = board_with(
            "......
             ......
             ......
             g.....
             gybtyt
             gtbyty",
        );
        run_ticks(&mut board, 49);
        assert!(board.pop_animations.is_empty());
        assert_eq!(board.lowest_visible_row(), 5);
        board.tick();
        assert_eq!(board.lowest_visible_row(), 6);
        assert_eq!(board.pop_animations.len(), 1);
        assert_eq!(board.pop_animations[0].group.len(), 3);
    }

    #[test]
    fn housekeeping_advances_top_and_refills() {
        let mut board = Board::new(&GameConfig::default());
        for y in 0..3 {
            for x in 0..board.width {
                board.grid.take(x, y);
            }
        }
        run_ticks(&mut board, 10);
        assert_eq!(board.top_most_row, 2);
        assert_eq!(board.grid.first_row(), 2);
        let max_y = board.grid.max_tile_row().unwrap();
        assert!(
            max_y + 1 - board.top_most_row >= 15,
            "row buffer not refilled: max_y {max_y}"
        );
    }

    #[test]
    fn combo_trackers_expire_after_two_ticks() {
        let mut board = board_with(
            "ggg...
             tybtyb",
        );
        board.tick();
        let mut guard = 0;
        while board.combo_trackers.is_empty() {
            board.tick();
            guard += 1;
            assert!(guard < 200, "pop never left trackers behind");
        }
        board.tick();
        assert!(board.combo_trackers.is_empty());
    }
}

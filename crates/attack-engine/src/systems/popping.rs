//! Pop sequencer: every detected group runs blink → solid → pop on its own
//! timers, reveals its tiles one at a time, and on completion removes them
//! from the grid and leaves combo trackers behind for the drop sequencer.

use crate::api::types::{GameEvent, TileId};
use crate::components::animation::{ComboBadge, ComboTracker, PopAnimation, PopPhase};
use crate::components::tile::TilePhase;
use crate::core::board::Board;

/// Start a pop animation for one ordered match group. Extends the running
/// chain if any member landed off the back of an earlier pop.
pub fn start_group(board: &mut Board, group: Vec<TileId>) {
    if group.is_empty() {
        return;
    }
    let chained = group
        .iter()
        .any(|&id| board.grid.tile_by_id(id).is_some_and(|t| t.combo_viable));
    if chained {
        board.combo_count += 1;
    }
    let chain = if chained { board.combo_count } else { 1 };

    // The group is sorted top-most/left-most first; the badge anchors there.
    let anchor = board.grid.tile_by_id(group[0]);
    let (pos, anchor_x, anchor_y) = anchor
        .map(|tile| (tile.draw_pos, tile.x, tile.y))
        .unwrap_or_default();

    board.events.push(GameEvent::MatchFound {
        size: group.len() as u32,
        chain,
        x: anchor_x,
        y: anchor_y,
    });
    let badge = ComboBadge {
        pos,
        chain,
        group_size: group.len() as u32,
        age: 0,
    };
    board.pop_animations.push(PopAnimation {
        group,
        phase: PopPhase::Blink,
        timer: board.timings.match_blink_ticks,
        pop_index: 0,
        badge,
    });
}

/// Advance every pop animation by one tick and restamp the draw phases of
/// their queued tiles.
pub fn tick_pops(board: &mut Board) {
    let timings = board.timings;
    let mut index = board.pop_animations.len();
    while index > 0 {
        index -= 1;
        let finished = {
            let anim = &mut board.pop_animations[index];
            anim.badge.age += 1;
            advance_phase(anim, timings.match_solid_ticks, timings.match_pop_ticks_each)
        };
        if finished {
            let anim = board.pop_animations.remove(index);
            finish_group(board, &anim);
        } else {
            apply_draw_phases(board, index);
        }
    }
}

/// Run one timer step. Returns true when the whole group has popped.
fn advance_phase(anim: &mut PopAnimation, solid_ticks: u32, pop_ticks_each: u32) -> bool {
    match anim.phase {
        PopPhase::Blink => {
            if anim.timer > 0 {
                anim.timer -= 1;
            } else {
                anim.phase = PopPhase::Solid;
                anim.timer = solid_ticks;
            }
        }
        PopPhase::Solid => {
            if anim.timer > 0 {
                anim.timer -= 1;
            } else {
                anim.phase = PopPhase::Pop;
                anim.timer = pop_ticks_each;
            }
        }
        PopPhase::Pop => {
            if anim.timer > 0 {
                anim.timer -= 1;
            } else if anim.pop_index + 1 < anim.group.len() {
                anim.pop_index += 1;
                anim.timer = pop_ticks_each;
            } else {
                return true;
            }
        }
    }
    false
}

fn apply_draw_phases(board: &mut Board, index: usize) {
    let anim = &board.pop_animations[index];
    let (phase, timer, pop_index) = (anim.phase, anim.timer, anim.pop_index);
    let group = anim.group.clone();
    for (slot, id) in group.into_iter().enumerate() {
        let Some(tile) = board.grid.tile_mut_by_id(id) else {
            continue;
        };
        tile.phase = match phase {
            PopPhase::Blink => {
                if timer % 2 == 0 {
                    TilePhase::Matched
                } else {
                    TilePhase::MatchedBlink
                }
            }
            PopPhase::Solid => TilePhase::Popping,
            PopPhase::Pop => {
                if slot <= pop_index {
                    TilePhase::Popped
                } else {
                    TilePhase::Popping
                }
            }
        };
    }
}

/// Remove the group from the grid and leave one combo tracker per touched
/// column, recording the deepest removed row.
fn finish_group(board: &mut Board, anim: &PopAnimation) {
    let mut columns: Vec<(usize, i32)> = Vec::new();
    let mut color = None;
    for &id in &anim.group {
        if let Some(tile) = board.grid.tile_by_id(id) {
            color = color.or(Some(tile.color));
            match columns.iter_mut().find(|(x, _)| *x == tile.x) {
                Some((_, above_y)) => *above_y = (*above_y).max(tile.y),
                None => columns.push((tile.x, tile.y)),
            }
        }
    }
    for (x, above_y) in columns {
        board.combo_trackers.push(ComboTracker {
            x,
            above_y,
            timer: 2,
        });
    }

    let mut popped = 0;
    for &id in &anim.group {
        if remove_tile(board, id) {
            popped += 1;
        }
    }
    if let (Some(color), 1..) = (color, popped) {
        board.events.push(GameEvent::TilesPopped {
            count: popped,
            color,
        });
    }
}

/// Removal is idempotent: a queued tile that already left the grid is logged
/// and skipped, and the rest of the group is unaffected.
fn remove_tile(board: &mut Board, id: TileId) -> bool {
    let Some(tile) = board.grid.tile_by_id(id) else {
        log::warn!("pop: tile {id:?} already removed");
        return false;
    };
    let (x, y) = (tile.x, tile.y);
    board.grid.take(x, y);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::game::GameConfig;

    fn board_with(layout: &str) -> Board {
        Board::with_layout(&GameConfig::default(), layout).unwrap()
    }

    fn run_ticks(board: &mut Board, n: u32) {
        for _ in 0..n {
            board.tick();
        }
    }

    #[test]
    fn pop_runs_blink_solid_then_one_at_a_time() {
        let mut board = board_with(
            "ggg...
             tybtyb",
        );
        let timings = board.timings;
        board.tick();
        assert_eq!(board.pop_animations.len(), 1);
        assert_eq!(board.pop_animations[0].phase, PopPhase::Blink);

        // Blink budget, plus the expiry tick that flips the phase
        run_ticks(&mut board, timings.match_blink_ticks + 1);
        assert_eq!(board.pop_animations[0].phase, PopPhase::Solid);
        for x in 0..3 {
            assert_eq!(board.tile(x, 0).unwrap().phase, TilePhase::Popping);
        }

        run_ticks(&mut board, timings.match_solid_ticks + 1);
        assert_eq!(board.pop_animations[0].phase, PopPhase::Pop);

        // First reveal: leftmost tile popped, the rest still popping
        run_ticks(&mut board, timings.match_pop_ticks_each + 1);
        assert_eq!(board.tile(0, 0).unwrap().phase, TilePhase::Popped);
        assert_eq!(board.tile(2, 0).unwrap().phase, TilePhase::Popping);
    }

    #[test]
    fn finished_group_leaves_grid_and_trackers() {
        let mut board = board_with(
            "ggg...
             tybtyb",
        );
        board.tick();
        let mut guard = 0;
        while !board.pop_animations.is_empty() {
            board.tick();
            guard += 1;
            assert!(guard < 200, "pop never finished");
        }
        for x in 0..3 {
            assert!(board.tile(x, 0).is_none());
        }
        assert!(board
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::TilesPopped { count: 3, .. })));
        // One tracker per touched column, all recording row 0
        let mut xs: Vec<usize> = board.combo_trackers.iter().map(|t| t.x).collect();
        xs.sort_unstable();
        assert_eq!(xs, vec![0, 1, 2]);
        assert!(board.combo_trackers.iter().all(|t| t.above_y == 0));
    }

    #[test]
    fn removing_an_already_gone_tile_is_a_no_op() {
        let mut board = board_with(
            "ggg...
             tybtyb",
        );
        board.tick();
        // Yank the middle tile out from under the sequencer
        board.grid.take(1, 0);
        let mut guard = 0;
        while !board.pop_animations.is_empty() {
            board.tick();
            guard += 1;
            assert!(guard < 200, "pop never finished");
        }
        assert!(board.tile(0, 0).is_none());
        assert!(board.tile(2, 0).is_none());
        // The support row is untouched
        assert!(board.tile(0, 1).is_some());
    }

    #[test]
    fn scroll_freezes_while_a_pop_runs() {
        let mut board = board_with(
            "ggg...
             tybtyb",
        );
        board.tick();
        let offset_during = board.scroll_offset;
        run_ticks(&mut board, 60);
        assert!(
            !board.pop_animations.is_empty(),
            "pop should still be running"
        );
        assert_eq!(board.scroll_offset, offset_during);
    }
}

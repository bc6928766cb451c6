//! Drop sequencer: columns with unsupported tiles stall, fall one row per
//! tick, then play a four-phase landing bounce before their tiles become
//! swappable again. Falls caused by a pop carry the chain forward.

use crate::api::types::GameEvent;
use crate::components::animation::{DropAnimation, DropPhase};
use crate::components::tile::TilePhase;
use crate::core::board::Board;

/// Advance every drop record by one tick.
pub fn tick_drops(board: &mut Board) {
    let mut index = board.dropping_columns.len();
    while index > 0 {
        index -= 1;
        if board.dropping_columns[index].is_falling() {
            fall_step(board, index);
        } else {
            bounce_step(board, index);
        }
    }
}

/// Stall, then shift the whole column above the gap down one row. The cell
/// below is re-checked after every shift: still empty means keep falling,
/// occupied means collect the bounce set and start the bounce.
fn fall_step(board: &mut Board, index: usize) {
    {
        let drop = &mut board.dropping_columns[index];
        if drop.stall_ticks > 0 {
            drop.stall_ticks -= 1;
            return;
        }
    }
    let (x, bottom_y) = {
        let drop = &board.dropping_columns[index];
        (drop.x, drop.bottom_y)
    };
    for y in (board.top_most_row..=bottom_y).rev() {
        if board.grid.get(x, y).is_some() && !board.grid.move_tile(x, y, y + 1) {
            log::warn!("drop: cell ({x}, {y}) blocked mid-fall");
        }
    }
    let bottom_y = bottom_y + 1;
    board.dropping_columns[index].bottom_y = bottom_y;

    if board.grid.get(x, bottom_y + 1).is_some() {
        let mut bouncing = Vec::new();
        for y in board.top_most_row + 1..=bottom_y {
            if let Some(tile) = board.grid.get_mut(x, y) {
                tile.swappable = false;
                bouncing.push(tile.id);
            }
        }
        let drop = &mut board.dropping_columns[index];
        drop.bouncing = bouncing;
        drop.bounce_ticks = 1;
        drop.phase = DropPhase::Regular;
    }
}

fn bounce_step(board: &mut Board, index: usize) {
    {
        let drop = &mut board.dropping_columns[index];
        if drop.bounce_ticks > 0 {
            drop.bounce_ticks -= 1;
            return;
        }
    }
    // Tiles matched mid-bounce belong to the pop sequencer now
    prune_matched(board, index);

    let bounce_ticks = board.timings.drop_bounce_ticks;
    match board.dropping_columns[index].phase {
        DropPhase::NotStarted => unreachable!("bounce step on a falling column"),
        DropPhase::Regular => {
            set_bounce_phase(board, index, TilePhase::BounceLow);
            let drop = &mut board.dropping_columns[index];
            drop.phase = DropPhase::Low;
            drop.bounce_ticks = bounce_ticks;
        }
        DropPhase::Low => {
            // Tiles are playable again from here, even though the bounce is
            // still settling on screen
            let bouncing = board.dropping_columns[index].bouncing.clone();
            for id in bouncing {
                if let Some(tile) = board.grid.tile_mut_by_id(id) {
                    tile.phase = TilePhase::BounceHigh;
                    tile.swappable = true;
                }
            }
            let participants = board.dropping_columns[index].combo_participants.clone();
            for id in participants {
                if let Some(tile) = board.grid.tile_mut_by_id(id) {
                    tile.combo_viable = true;
                }
            }
            let drop = &mut board.dropping_columns[index];
            drop.phase = DropPhase::High;
            drop.bounce_ticks = bounce_ticks;
        }
        DropPhase::High => {
            set_bounce_phase(board, index, TilePhase::BounceMid);
            let drop = &mut board.dropping_columns[index];
            drop.phase = DropPhase::Mid;
            drop.bounce_ticks = bounce_ticks;
        }
        DropPhase::Mid => {
            set_bounce_phase(board, index, TilePhase::Regular);
            let drop = board.dropping_columns.remove(index);
            board.events.push(GameEvent::ColumnLanded { x: drop.x });
        }
    }
}

fn prune_matched(board: &mut Board, index: usize) {
    if board.pop_animations.is_empty() {
        return;
    }
    let retained: Vec<_> = board.dropping_columns[index]
        .bouncing
        .iter()
        .copied()
        .filter(|id| !board.pop_animations.iter().any(|pop| pop.group.contains(id)))
        .collect();
    board.dropping_columns[index].bouncing = retained;
}

fn set_bounce_phase(board: &mut Board, index: usize, phase: TilePhase) {
    let bouncing = board.dropping_columns[index].bouncing.clone();
    for id in bouncing {
        if let Some(tile) = board.grid.tile_mut_by_id(id) {
            tile.phase = phase;
        }
    }
}

/// Seed new drop records: once per tick, any swappable tile above an empty
/// cell starts its column falling. One record per column; an active one is
/// left to keep extending itself.
pub fn seed_drops(board: &mut Board) {
    let lowest = board.lowest_visible_row();
    for y in board.top_most_row..lowest {
        for x in 0..board.width {
            if board.dropping_columns.iter().any(|drop| drop.x == x) {
                continue;
            }
            let Some(tile) = board.grid.get(x, y) else {
                continue;
            };
            if !tile.swappable || board.grid.get(x, y + 1).is_some() {
                continue;
            }
            let seed_y = tile.y;

            let fell_from_pop = board
                .combo_trackers
                .iter()
                .any(|tracker| tracker.x == x && seed_y < tracker.above_y);
            let mut combo_participants = Vec::new();
            if fell_from_pop {
                let mut fy = seed_y;
                while fy >= board.top_most_row {
                    if let Some(above) = board.grid.get(x, fy) {
                        combo_participants.push(above.id);
                    }
                    fy -= 1;
                }
            }

            if let Some(tile) = board.grid.get_mut(x, y) {
                tile.swappable = false;
            }
            board.dropping_columns.push(DropAnimation {
                x,
                bottom_y: seed_y,
                stall_ticks: board.timings.drop_stall_ticks,
                bounce_ticks: 0,
                phase: DropPhase::NotStarted,
                bouncing: Vec::new(),
                combo_participants,
            });
        }
    }
}

//! Match detection: finds runs of three or more same-colored settled tiles
//! and hands each independent group to the pop sequencer.
//!
//! Probes walk rightward and downward only; leftward/upward runs are found
//! by the symmetric probes of earlier seeds. A run is collected through an
//! explicit accumulator and queued only once its length reaches three, so
//! shorter partial runs are left untouched.

use crate::api::types::TileId;
use crate::components::tile::TileColor;
use crate::core::board::Board;
use crate::systems::popping;

/// Direction of one probe walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Right,
    Down,
}

/// Scan the settled window, queue every completed run, split the result into
/// independent same-color groups and start one pop animation per group.
pub fn run_match_scan(board: &mut Board) {
    let matched = scan(board);
    if matched.is_empty() {
        return;
    }
    for group in split_into_groups(board, &matched) {
        popping::start_group(board, group);
    }
}

fn scan(board: &mut Board) -> Vec<TileId> {
    let mut matched = Vec::new();
    let lowest = board.lowest_visible_row();
    for y in board.top_most_row..lowest {
        for x in 0..board.width {
            if column_is_falling(board, x) {
                continue;
            }
            let Some(tile) = board.grid.get(x, y) else {
                continue;
            };
            if !tile.swappable {
                continue;
            }
            let (seed, color) = (tile.id, tile.color);
            if x + 1 < board.width {
                try_run(board, &mut matched, seed, color, Probe::Right, x + 1, y);
            }
            try_run(board, &mut matched, seed, color, Probe::Down, x, y + 1);
        }
    }
    matched
}

fn try_run(
    board: &mut Board,
    matched: &mut Vec<TileId>,
    seed: TileId,
    color: TileColor,
    direction: Probe,
    x: usize,
    y: i32,
) {
    let mut run = Vec::new();
    let total = probe(board, color, direction, x, y, 1, &mut run);
    if total >= 3 {
        for id in run {
            queue(board, matched, id);
        }
        queue(board, matched, seed);
    }
}

/// Walk one direction, collecting the contiguous same-color run into `run`.
/// Returns the run length including the seed. The walk stops at a color
/// mismatch, a missing tile, a locked tile, a falling column, or (downward
/// only) the scroll boundary.
fn probe(
    board: &Board,
    color: TileColor,
    direction: Probe,
    x: usize,
    y: i32,
    count: u32,
    run: &mut Vec<TileId>,
) -> u32 {
    let Some(tile) = board.grid.get(x, y) else {
        return count;
    };
    if !tile.swappable || tile.color != color || column_is_falling(board, x) {
        return count;
    }
    if direction == Probe::Down && y >= board.lowest_visible_row() {
        return count;
    }
    let id = tile.id;
    let total = match direction {
        Probe::Right => probe(board, color, direction, x + 1, y, count + 1, run),
        Probe::Down => probe(board, color, direction, x, y + 1, count + 1, run),
    };
    if total >= 3 {
        run.push(id);
    }
    total
}

/// Queue a tile exactly once: locking it is both the side effect the pop
/// sequencer relies on and the once-only guard.
fn queue(board: &mut Board, matched: &mut Vec<TileId>, id: TileId) {
    if let Some(tile) = board.grid.tile_mut_by_id(id) {
        if tile.swappable {
            tile.swappable = false;
            matched.push(id);
        }
    }
}

/// A column whose drop record has not started bouncing is still in motion;
/// its tiles neither seed nor extend a run.
fn column_is_falling(board: &Board, x: usize) -> bool {
    board
        .dropping_columns
        .iter()
        .any(|drop| drop.x == x && drop.is_falling())
}

/// Split the matched set into same-color 4-adjacent components, each sorted
/// top-most/left-most first (`y * width + x` ascending). Groups come out in
/// discovery order.
fn split_into_groups(board: &Board, matched: &[TileId]) -> Vec<Vec<TileId>> {
    let tiles: Vec<(TileId, usize, i32, TileColor)> = matched
        .iter()
        .filter_map(|&id| board.grid.tile_by_id(id))
        .map(|tile| (tile.id, tile.x, tile.y, tile.color))
        .collect();

    let mut assigned = vec![false; tiles.len()];
    let mut groups = Vec::new();
    for start in 0..tiles.len() {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;
        let mut component = vec![start];
        let mut next = 0;
        while next < component.len() {
            let (_, x, y, color) = tiles[component[next]];
            next += 1;
            for (candidate, &(_, cx, cy, ccolor)) in tiles.iter().enumerate() {
                if assigned[candidate] || ccolor != color {
                    continue;
                }
                let adjacent = (cx == x && (cy - y).abs() == 1) || (cy == y && cx.abs_diff(x) == 1);
                if adjacent {
                    assigned[candidate] = true;
                    component.push(candidate);
                }
            }
        }
        let mut ordered: Vec<(i64, TileId)> = component
            .into_iter()
            .map(|index| {
                let (id, x, y, _) = tiles[index];
                (y as i64 * board.width as i64 + x as i64, id)
            })
            .collect();
        ordered.sort_by_key(|&(key, _)| key);
        groups.push(ordered.into_iter().map(|(_, id)| id).collect());
    }
    groups
}

//! Animation records the board drives each tick: swap interpolation, pop
//! sequencing, column drops with landing bounce, and chain bookkeeping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::TileId;

/// Tick budgets for every animation the board runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Ticks a swap takes to slide two cells across each other.
    pub swap_ticks: u32,
    /// Ticks an unsupported column waits before it starts falling.
    pub drop_stall_ticks: u32,
    /// Ticks per landing-bounce phase.
    pub drop_bounce_ticks: u32,
    /// Ticks a matched group blinks before going solid.
    pub match_blink_ticks: u32,
    /// Ticks a matched group holds the pre-pop look.
    pub match_solid_ticks: u32,
    /// Ticks between one-at-a-time tile pops inside a group.
    pub match_pop_ticks_each: u32,
    /// Period of the cursor box flex, in ticks.
    pub cursor_flex_ticks: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            swap_ticks: 4,
            drop_stall_ticks: 12,
            drop_bounce_ticks: 3,
            match_blink_ticks: 44,
            match_solid_ticks: 20,
            match_pop_ticks_each: 9,
            cursor_flex_ticks: 16,
        }
    }
}

/// The single in-flight swap. Both cells are locked while it runs; either
/// cell may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAnimation {
    pub x1: usize,
    pub x2: usize,
    pub y: i32,
    pub ticks_left: u32,
}

/// Phases of a pop group. Transitions happen on timer expiry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopPhase {
    Blink,
    Solid,
    Pop,
}

/// Floating indicator anchored at a group's top-most/left-most tile,
/// showing group size and chain depth while it rises.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboBadge {
    /// Pixel anchor, captured at detection time.
    pub pos: Vec2,
    /// Chain depth shown in the repeat box (1 = no chain).
    pub chain: u32,
    pub group_size: u32,
    /// Ticks since the badge appeared.
    pub age: u32,
}

impl ComboBadge {
    /// Pixel rise above the anchor: quick at first, then slowing, then a
    /// hold. `None` once the badge has expired.
    pub fn rise_offset(&self) -> Option<f32> {
        match self.age {
            0..=2 => Some(0.0),
            3..=6 => Some((self.age - 2) as f32),
            7..=14 => Some(4.0 + (self.age - 6) as f32 / 2.0),
            15..=46 => Some(8.0 + (self.age - 14) as f32 / 4.0),
            47..=76 => Some(16.0),
            _ => None,
        }
    }
}

/// One detected match group working through blink, solid and the
/// one-tile-at-a-time pop reveal.
#[derive(Debug, Clone)]
pub struct PopAnimation {
    /// Queued tiles, top-most/left-most first (`y * width + x` ascending).
    pub group: Vec<TileId>,
    pub phase: PopPhase,
    pub timer: u32,
    /// Index of the tile currently revealed during the pop phase.
    pub pop_index: usize,
    pub badge: ComboBadge,
}

/// Bounce phases of a landed column. `NotStarted` means the column is still
/// stalled or falling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPhase {
    NotStarted,
    Regular,
    Low,
    High,
    Mid,
}

/// One falling column segment: a stall, then one row per tick, then the
/// four-phase landing bounce.
#[derive(Debug, Clone)]
pub struct DropAnimation {
    pub x: usize,
    /// Bottom row of the falling segment; advances as the segment drops.
    pub bottom_y: i32,
    pub stall_ticks: u32,
    pub bounce_ticks: u32,
    pub phase: DropPhase,
    /// Tiles caught in the landing bounce.
    pub bouncing: Vec<TileId>,
    /// Tiles whose fall was caused by a pop; flagged combo-viable when the
    /// bounce reaches its low point.
    pub combo_participants: Vec<TileId>,
}

impl DropAnimation {
    /// Still stalled or moving; falling columns are fenced off from match
    /// scans.
    pub fn is_falling(&self) -> bool {
        self.phase == DropPhase::NotStarted
    }
}

/// Short-lived marker left behind by a pop: column `x` lost tiles up to row
/// `above_y`, so tiles falling past that point within the window chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboTracker {
    pub x: usize,
    pub above_y: i32,
    pub timer: u32,
}

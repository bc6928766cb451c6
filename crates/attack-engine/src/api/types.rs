use crate::components::tile::TileColor;

/// Stable identity of a tile for the lifetime of a board.
/// Tiles move between cells; the id never changes until the tile pops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

/// An event emitted by the simulation during one `tick()`.
/// The buffer is cleared at the start of every tick; sound/UI layers read it
/// after the tick returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A swap was accepted at the cursor cell.
    SwapStarted { x: usize, y: i32 },
    /// A match group was queued for popping. `chain` is 1 for a plain match,
    /// 2+ when the group extends a running chain.
    MatchFound { size: u32, chain: u32, x: usize, y: i32 },
    /// A pop group finished and removed `count` tiles from the grid.
    TilesPopped { count: u32, color: TileColor },
    /// A dropped column finished its bounce and settled.
    ColumnLanded { x: usize },
    /// The last pop/drop activity ended while a chain was running.
    ChainEnded { length: u32 },
}

pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod render;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::game::{GameConfig, GameInstance};
pub use api::types::{GameEvent, TileId};
pub use assets::manifest::{AssetManifest, AtlasDescriptor, SpriteDescriptor};
pub use assets::sheet::{BadgeKind, SheetError, SpriteCell, TileSpriteSet};
pub use components::animation::{
    ComboBadge, ComboTracker, DropAnimation, DropPhase, PopAnimation, PopPhase, SwapAnimation,
    Timings,
};
pub use components::tile::{Tile, TileColor, TilePhase};
pub use core::board::{Board, Cursor, LayoutError};
pub use core::grid::TileGrid;
pub use core::rng::Rng;
pub use core::time::FixedTimestep;
pub use render::draw_list::{build_draw_list, TileInstance};

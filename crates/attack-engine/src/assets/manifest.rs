use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Asset manifest describing the texture atlases and named sprites a
/// renderer loads for this game. Parsed from JSON at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Texture atlases, in binding order.
    pub atlases: Vec<AtlasDescriptor>,
    /// Named one-off sprites: name → atlas index + cell.
    #[serde(default)]
    pub sprites: HashMap<String, SpriteDescriptor>,
}

/// One texture atlas, a regular grid of equally sized cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    /// Name game code binds against (e.g. "blocks").
    pub name: String,
    pub cols: u32,
    pub rows: u32,
    /// Path to the image, relative to the manifest.
    pub path: String,
}

/// A named sprite within an atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Index into the atlases array.
    pub atlas: u32,
    pub col: u32,
    pub row: u32,
    /// Cells the sprite spans (default 1).
    #[serde(default = "default_span")]
    pub span: u32,
}

fn default_span() -> u32 {
    1
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find an atlas index by name.
    pub fn atlas_index(&self, name: &str) -> Option<u32> {
        self.atlases
            .iter()
            .position(|atlas| atlas.name == name)
            .map(|index| index as u32)
    }

    pub fn atlas(&self, index: u32) -> Option<&AtlasDescriptor> {
        self.atlases.get(index as usize)
    }
}

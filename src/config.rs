//! Stack construction settings

use crate::error::Result;
use crate::types::TileShape;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings fixed when a stack is built from a tileset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Required pixel shape of every tile; `None` adopts the first tile's shape
    pub tile_shape: Option<TileShape>,

    /// Scale integer tiles into [0, 1] (unsigned) or [-1, 1] (signed) when
    /// decoding into a float stack
    pub normalize_integers: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            tile_shape: None,
            normalize_integers: true,
        }
    }
}

impl StackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every ingested tile to have this shape
    pub fn with_tile_shape(mut self, tile_shape: TileShape) -> Self {
        self.tile_shape = Some(tile_shape);
        self
    }

    /// Enable or disable integer normalisation
    pub fn with_normalize_integers(mut self, normalize: bool) -> Self {
        self.normalize_integers = normalize;
        self
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

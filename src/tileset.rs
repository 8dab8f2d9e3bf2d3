//! Ingestion boundary: tilesets a stack can be built from
//!
//! Tile acquisition and on-disk formats live outside this crate. Anything
//! that can enumerate tiles keyed by (round, channel, z-plane) labels, with
//! a pixel shape, physical coordinates and raw little-endian pixel bytes,
//! can implement [`TileSet`]. [`MemoryTileSet`] is the in-memory
//! implementation, and [`build_tileset`] assembles one from a fetcher
//! callback over a label grid.

use crate::error::{Result, StackError};
use crate::pixel::Pixel;
use crate::types::{DataType, Label, PhysicalCoordinates, TileShape};
use crate::utils::encode_pixels;
use bytes::Bytes;
use ndarray::ArrayView2;

/// A single 2D tile offered for ingestion
pub trait Tile {
    fn round(&self) -> Label;
    fn ch(&self) -> Label;
    fn zplane(&self) -> Label;

    /// Pixel shape of this tile
    fn shape(&self) -> TileShape;

    /// Physical bounds of this tile
    fn coordinates(&self) -> PhysicalCoordinates;

    /// Element type of the bytes returned by [`tile_data`](Tile::tile_data)
    fn data_type(&self) -> DataType;

    /// Raw row-major, little-endian pixel bytes
    fn tile_data(&self) -> Result<Bytes>;
}

/// A collection of tiles forming one field of view
pub trait TileSet {
    type Tile: Tile;

    fn tiles(&self) -> Box<dyn Iterator<Item = &Self::Tile> + '_>;
}

/// Pixels and coordinates of a tile, before labels are attached
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTile {
    shape: TileShape,
    coordinates: PhysicalCoordinates,
    data_type: DataType,
    data: Bytes,
}

impl FetchedTile {
    /// Encode a typed pixel array
    pub fn from_array<P: Pixel>(coordinates: PhysicalCoordinates, pixels: ArrayView2<'_, P>) -> Self {
        let (height, width) = pixels.dim();
        Self {
            shape: TileShape::new(height, width),
            coordinates,
            data_type: P::DATA_TYPE,
            data: Bytes::from(encode_pixels(pixels.iter().copied())),
        }
    }

    /// Wrap raw bytes of a declared type; length is checked at ingestion
    pub fn from_bytes(
        shape: TileShape,
        coordinates: PhysicalCoordinates,
        data_type: DataType,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            shape,
            coordinates,
            data_type,
            data: data.into(),
        }
    }
}

/// A labeled tile held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTile {
    round: Label,
    ch: Label,
    zplane: Label,
    tile: FetchedTile,
}

impl MemoryTile {
    pub fn new(round: Label, ch: Label, zplane: Label, tile: FetchedTile) -> Self {
        Self {
            round,
            ch,
            zplane,
            tile,
        }
    }
}

impl Tile for MemoryTile {
    fn round(&self) -> Label {
        self.round
    }

    fn ch(&self) -> Label {
        self.ch
    }

    fn zplane(&self) -> Label {
        self.zplane
    }

    fn shape(&self) -> TileShape {
        self.tile.shape
    }

    fn coordinates(&self) -> PhysicalCoordinates {
        self.tile.coordinates
    }

    fn data_type(&self) -> DataType {
        self.tile.data_type
    }

    fn tile_data(&self) -> Result<Bytes> {
        Ok(self.tile.data.clone())
    }
}

/// Tileset backed by a vector of [`MemoryTile`]s
#[derive(Debug, Clone, Default)]
pub struct MemoryTileSet {
    tiles: Vec<MemoryTile>,
}

impl MemoryTileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tile: MemoryTile) {
        self.tiles.push(tile);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl FromIterator<MemoryTile> for MemoryTileSet {
    fn from_iter<I: IntoIterator<Item = MemoryTile>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

impl TileSet for MemoryTileSet {
    type Tile = MemoryTile;

    fn tiles(&self) -> Box<dyn Iterator<Item = &MemoryTile> + '_> {
        Box::new(self.tiles.iter())
    }
}

/// Build a tileset covering every (round, ch, zplane) label combination.
///
/// `fetcher` is called once per combination, rounds outermost.
pub fn build_tileset<F>(
    rounds: &[Label],
    chs: &[Label],
    zplanes: &[Label],
    mut fetcher: F,
) -> Result<MemoryTileSet>
where
    F: FnMut(Label, Label, Label) -> Result<FetchedTile>,
{
    if rounds.is_empty() || chs.is_empty() || zplanes.is_empty() {
        return Err(StackError::Configuration(
            "a tileset needs at least one label per axis".to_string(),
        ));
    }

    let mut tileset = MemoryTileSet::new();
    for &round in rounds {
        for &ch in chs {
            for &zplane in zplanes {
                let tile = fetcher(round, ch, zplane)?;
                tileset.push(MemoryTile::new(round, ch, zplane, tile));
            }
        }
    }
    tracing::debug!(tiles = tileset.len(), "built in-memory tileset");
    Ok(tileset)
}

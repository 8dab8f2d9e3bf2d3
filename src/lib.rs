//! Tilestack - labeled multi-dimensional tile store
//!
//! An in-memory store for image volumes shaped (round, channel, z-plane,
//! height, width), as produced by multiplexed microscopy experiments.
//! Round, channel and z-plane are addressed by *labels*: arbitrary,
//! possibly sparse, non-zero-based integers such as rounds `1, 4, 6`.
//!
//! # Features
//!
//! - Label-based reads and writes of whole tiles or blocks of tiles
//! - Inclusive label-range selection (`..=4` keeps labels up to and including 4)
//! - Sub-selection into independent stacks, with per-tile physical
//!   coordinates narrowed in lockstep
//! - Ingestion from any [`TileSet`], decoding raw pixel bytes of any
//!   supported [`DataType`] into the stack's pixel type
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array2;
//! use tilestack::{
//!     build_tileset, Axis, AxisSelector, FetchedTile, LabeledStack, PhysicalCoordinates,
//!     Selector,
//! };
//!
//! # fn main() -> tilestack::Result<()> {
//! let tileset = build_tileset(&[1, 4, 6], &[2, 4], &[3], |round, ch, _zplane| {
//!     let pixels = Array2::from_elem((2, 4), (round * 10 + ch) as f32);
//!     let coords = PhysicalCoordinates::new((0.0, 1.0), (0.0, 1.0), (0.0, 0.1));
//!     Ok(FetchedTile::from_array(coords, pixels.view()))
//! })?;
//! let stack: LabeledStack = LabeledStack::build(&tileset)?;
//!
//! let sub = stack.sel(&Selector::new().with(Axis::Round, AxisSelector::range(None, Some(4))))?;
//! assert_eq!(sub.axis_labels(Axis::Round), &[1, 4]);
//! assert_eq!(sub.coordinates().sizes()[Axis::Round], 2);
//!
//! let tile = sub.get_tile(&Selector::point(4, 2, 3))?;
//! assert_eq!(tile[[0, 0]], 42.0);
//! # Ok(())
//! # }
//! ```

pub mod axis;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod pixel;
pub mod provenance;
pub mod selector;
pub mod stack;
pub mod tileset;
pub mod types;
pub mod utils;
pub mod volume;

// Re-exports
pub use axis::AxisLabelIndex;
pub use config::StackConfig;
pub use coordinates::{CoordinateSizes, CoordinateTable};
pub use error::{Result, StackError};
pub use pixel::Pixel;
pub use provenance::{LogEntry, ProvenanceLog};
pub use selector::{AxisSelector, Selector};
pub use stack::{AxisIter, LabeledStack, Slice, StackStats};
pub use tileset::{build_tileset, FetchedTile, MemoryTile, MemoryTileSet, Tile, TileSet};
pub use types::{
    Axis, Coordinate, CoordinateRange, DataType, Label, PhysicalCoordinates, TileShape, Triple,
};
pub use volume::TileVolume;

/// Version of the tilestack crate
pub const TILESTACK_VERSION: &str = env!("CARGO_PKG_VERSION");

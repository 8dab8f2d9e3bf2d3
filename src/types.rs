//! Core data types for labeled tile stacks

use serde::{Deserialize, Serialize};
use std::fmt;

/// External identifier for a position along a labeled axis
pub type Label = i64;

/// Label-indexed axes of a tile stack, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Imaging round
    #[serde(rename = "r")]
    Round,
    /// Fluorescence channel
    #[serde(rename = "c")]
    Ch,
    /// Focal plane
    #[serde(rename = "z")]
    ZPlane,
}

impl Axis {
    /// All labeled axes in storage order
    pub const ALL: [Axis; 3] = [Axis::Round, Axis::Ch, Axis::ZPlane];

    /// Dimension of this axis in the 5D volume
    pub fn index(&self) -> usize {
        match self {
            Axis::Round => 0,
            Axis::Ch => 1,
            Axis::ZPlane => 2,
        }
    }

    /// Short name used in diagnostics and serialized selectors
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Round => "r",
            Axis::Ch => "c",
            Axis::ZPlane => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical coordinate dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Coordinate {
    #[serde(rename = "xc")]
    X,
    #[serde(rename = "yc")]
    Y,
    #[serde(rename = "zc")]
    Z,
}

impl Coordinate {
    pub const ALL: [Coordinate; 3] = [Coordinate::X, Coordinate::Y, Coordinate::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Coordinate::X => "xc",
            Coordinate::Y => "yc",
            Coordinate::Z => "zc",
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dense (round, channel, z-plane) position addressing exactly one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub round: usize,
    pub ch: usize,
    pub zplane: usize,
}

impl Triple {
    pub fn new(round: usize, ch: usize, zplane: usize) -> Self {
        Self { round, ch, zplane }
    }

    /// Position along the given axis
    pub fn get(&self, axis: Axis) -> usize {
        match axis {
            Axis::Round => self.round,
            Axis::Ch => self.ch,
            Axis::ZPlane => self.zplane,
        }
    }

    pub fn to_array(&self) -> [usize; 3] {
        [self.round, self.ch, self.zplane]
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.round, self.ch, self.zplane)
    }
}

/// Pixel shape shared by every tile of a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileShape {
    pub height: usize,
    pub width: usize,
}

impl TileShape {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Number of pixels in one tile
    pub fn num_pixels(&self) -> usize {
        self.height * self.width
    }

    pub fn to_array(&self) -> [usize; 2] {
        [self.height, self.width]
    }
}

impl fmt::Display for TileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Pixel data types understood at the ingestion boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8 = 1,
    /// Unsigned 16-bit integer
    U16 = 2,
    /// Unsigned 32-bit integer
    U32 = 3,
    /// Unsigned 64-bit integer
    U64 = 4,
    /// Signed 8-bit integer
    I8 = 5,
    /// Signed 16-bit integer
    I16 = 6,
    /// Signed 32-bit integer
    I32 = 7,
    /// Signed 64-bit integer
    I64 = 8,
    /// 32-bit floating point
    F32 = 9,
    /// 64-bit floating point
    F64 = 10,
}

impl DataType {
    /// Size in bytes of this data type
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::U64 | DataType::I64 | DataType::F64 => 8,
        }
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Closed physical interval along one coordinate dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRange {
    pub min: f64,
    pub max: f64,
}

impl CoordinateRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl From<(f64, f64)> for CoordinateRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Physical extent of one tile: a (min, max) pair per spatial dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalCoordinates {
    pub x: CoordinateRange,
    pub y: CoordinateRange,
    pub z: CoordinateRange,
}

impl PhysicalCoordinates {
    pub fn new(
        x: impl Into<CoordinateRange>,
        y: impl Into<CoordinateRange>,
        z: impl Into<CoordinateRange>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    /// Range along the given coordinate dimension
    pub fn get(&self, coordinate: Coordinate) -> CoordinateRange {
        match coordinate {
            Coordinate::X => self.x,
            Coordinate::Y => self.y,
            Coordinate::Z => self.z,
        }
    }
}

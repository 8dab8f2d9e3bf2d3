//! Physical coordinate table kept in lockstep with the tile volume

use crate::error::{Result, StackError};
use crate::types::{Axis, Coordinate, CoordinateRange, PhysicalCoordinates, Triple};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Retained positions along each labeled axis.
///
/// The cartesian product of the three position lists, taken round-major,
/// is the ordered list of triples a selection keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionGrid {
    positions: [Vec<usize>; 3],
}

impl PositionGrid {
    pub fn new(round: Vec<usize>, ch: Vec<usize>, zplane: Vec<usize>) -> Self {
        Self {
            positions: [round, ch, zplane],
        }
    }

    /// Every position of a volume with the given extents
    pub fn full(extents: [usize; 3]) -> Self {
        let [round, ch, zplane] = extents;
        Self::new(
            (0..round).collect(),
            (0..ch).collect(),
            (0..zplane).collect(),
        )
    }

    pub fn positions(&self, axis: Axis) -> &[usize] {
        &self.positions[axis.index()]
    }

    /// Number of retained positions per axis
    pub fn extents(&self) -> [usize; 3] {
        [
            self.positions[0].len(),
            self.positions[1].len(),
            self.positions[2].len(),
        ]
    }

    /// Number of retained triples
    pub fn len(&self) -> usize {
        self.extents().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(destination, source)` triple pairs in round-major order.
    ///
    /// Destinations are dense positions in a volume shaped by
    /// [`extents`](Self::extents); sources are the retained positions.
    pub fn triples(&self) -> impl Iterator<Item = (Triple, Triple)> + '_ {
        let [rounds, chs, zplanes] = &self.positions;
        rounds.iter().enumerate().flat_map(move |(ir, &r)| {
            chs.iter().enumerate().flat_map(move |(ic, &c)| {
                zplanes
                    .iter()
                    .enumerate()
                    .map(move |(iz, &z)| (Triple::new(ir, ic, iz), Triple::new(r, c, z)))
            })
        })
    }

    /// Fail unless every retained position is below `extents`
    pub(crate) fn check_within(&self, extents: [usize; 3]) -> Result<()> {
        for axis in Axis::ALL {
            let limit = extents[axis.index()];
            if let Some(&position) = self.positions(axis).iter().find(|&&p| p >= limit) {
                return Err(StackError::OutOfBounds(format!(
                    "position {} on axis {} exceeds extent {}",
                    position, axis, limit
                )));
            }
        }
        Ok(())
    }
}

/// Number of distinct positions per labeled axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateSizes {
    #[serde(rename = "r")]
    pub round: usize,
    #[serde(rename = "c")]
    pub ch: usize,
    #[serde(rename = "z")]
    pub zplane: usize,
}

impl CoordinateSizes {
    pub fn get(&self, axis: Axis) -> usize {
        self[axis]
    }
}

impl Index<Axis> for CoordinateSizes {
    type Output = usize;

    fn index(&self, axis: Axis) -> &usize {
        match axis {
            Axis::Round => &self.round,
            Axis::Ch => &self.ch,
            Axis::ZPlane => &self.zplane,
        }
    }
}

/// Physical coordinate bounds, one row per tile triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTable {
    extents: [usize; 3],
    rows: Vec<PhysicalCoordinates>,
}

impl CoordinateTable {
    /// Create a table from rows in round-major triple order
    pub fn from_rows(extents: [usize; 3], rows: Vec<PhysicalCoordinates>) -> Result<Self> {
        let expected: usize = extents.iter().product();
        if rows.len() != expected {
            return Err(StackError::shape_mismatch(&[expected], &[rows.len()]));
        }
        Ok(Self { extents, rows })
    }

    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row_index(&self, triple: Triple) -> Option<usize> {
        let [_, nc, nz] = self.extents;
        let [r, c, z] = triple.to_array();
        let in_bounds = triple
            .to_array()
            .iter()
            .zip(self.extents.iter())
            .all(|(position, extent)| position < extent);
        in_bounds.then(|| (r * nc + c) * nz + z)
    }

    /// Coordinates of the tile at `triple`
    pub fn get(&self, triple: Triple) -> Option<&PhysicalCoordinates> {
        self.row_index(triple).map(|row| &self.rows[row])
    }

    /// Range along one coordinate dimension for the tile at `triple`
    pub fn range(&self, triple: Triple, coordinate: Coordinate) -> Option<CoordinateRange> {
        self.get(triple).map(|coords| coords.get(coordinate))
    }

    /// Rows with their triples, in round-major order
    pub fn iter(&self) -> impl Iterator<Item = (Triple, &PhysicalCoordinates)> + '_ {
        let [_, nc, nz] = self.extents;
        self.rows.iter().enumerate().map(move |(row, coords)| {
            let triple = Triple::new(row / (nc * nz), (row / nz) % nc, row % nz);
            (triple, coords)
        })
    }

    /// A new table holding the rows of the retained triples, reindexed densely
    pub fn restrict(&self, grid: &PositionGrid) -> Result<Self> {
        grid.check_within(self.extents)?;
        let rows = grid
            .triples()
            .filter_map(|(_, source)| self.get(source).copied())
            .collect();
        Self::from_rows(grid.extents(), rows)
    }

    /// Distinct positions per axis
    pub fn sizes(&self) -> CoordinateSizes {
        let [round, ch, zplane] = self.extents;
        CoordinateSizes { round, ch, zplane }
    }
}

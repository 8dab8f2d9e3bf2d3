//! Dense in-memory tile volume

use crate::coordinates::PositionGrid;
use crate::error::{Result, StackError};
use crate::pixel::Pixel;
use crate::types::{TileShape, Triple};
use ndarray::{s, Array5, ArrayView2, ArrayView5};

/// Dense (round, channel, z-plane, height, width) pixel buffer.
///
/// Access is restricted to whole tiles addressed by a position [`Triple`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileVolume<T> {
    data: Array5<T>,
}

impl<T: Pixel> TileVolume<T> {
    /// A volume of default-valued (zero) tiles
    pub fn zeros(extents: [usize; 3], tile_shape: TileShape) -> Self {
        let [nr, nc, nz] = extents;
        Self {
            data: Array5::from_elem(
                (nr, nc, nz, tile_shape.height, tile_shape.width),
                T::default(),
            ),
        }
    }

    pub fn from_array(data: Array5<T>) -> Self {
        Self { data }
    }

    pub fn into_array(self) -> Array5<T> {
        self.data
    }

    pub fn view(&self) -> ArrayView5<'_, T> {
        self.data.view()
    }

    /// Full five-dimensional shape
    pub fn shape(&self) -> [usize; 5] {
        let dim = self.data.dim();
        [dim.0, dim.1, dim.2, dim.3, dim.4]
    }

    /// Number of positions along each labeled axis
    pub fn extents(&self) -> [usize; 3] {
        let [nr, nc, nz, _, _] = self.shape();
        [nr, nc, nz]
    }

    pub fn tile_shape(&self) -> TileShape {
        let [_, _, _, height, width] = self.shape();
        TileShape::new(height, width)
    }

    pub fn num_tiles(&self) -> usize {
        self.extents().iter().product()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.data.len() * T::DATA_TYPE.size_in_bytes()
    }

    fn check_triple(&self, triple: Triple) -> Result<()> {
        let extents = self.extents();
        if triple
            .to_array()
            .iter()
            .zip(extents.iter())
            .any(|(position, extent)| position >= extent)
        {
            return Err(StackError::OutOfBounds(format!(
                "tile {} outside volume extents {:?}",
                triple, extents
            )));
        }
        Ok(())
    }

    /// Borrow the tile at `triple`
    pub fn read(&self, triple: Triple) -> Result<ArrayView2<'_, T>> {
        self.check_triple(triple)?;
        Ok(self
            .data
            .slice(s![triple.round, triple.ch, triple.zplane, .., ..]))
    }

    /// Overwrite the tile at `triple`
    pub fn write(&mut self, triple: Triple, tile: ArrayView2<'_, T>) -> Result<()> {
        let expected = self.tile_shape().to_array();
        if tile.shape() != expected.as_slice() {
            return Err(StackError::shape_mismatch(&expected, tile.shape()));
        }
        self.check_triple(triple)?;

        self.data
            .slice_mut(s![triple.round, triple.ch, triple.zplane, .., ..])
            .assign(&tile);
        Ok(())
    }

    /// Copy the retained tiles into a new, densely indexed volume
    pub fn restrict(&self, grid: &PositionGrid) -> Result<Self> {
        grid.check_within(self.extents())?;

        let mut restricted = Self::zeros(grid.extents(), self.tile_shape());
        for (dest, source) in grid.triples() {
            tracing::trace!(%source, %dest, "copying tile");
            restricted
                .data
                .slice_mut(s![dest.round, dest.ch, dest.zplane, .., ..])
                .assign(&self.data.slice(s![source.round, source.ch, source.zplane, .., ..]));
        }
        Ok(restricted)
    }
}

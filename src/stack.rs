//! Labeled tile stack - label-based access and sub-selection
//!
//! [`LabeledStack`] composes one [`AxisLabelIndex`] per labeled axis, a
//! [`TileVolume`] and a [`CoordinateTable`]. Callers address tiles by label
//! only; every request is resolved to dense positions before any data is
//! read or written, so a failed request leaves the stack untouched.

use crate::axis::AxisLabelIndex;
use crate::config::StackConfig;
use crate::coordinates::{CoordinateSizes, CoordinateTable, PositionGrid};
use crate::error::{Result, StackError};
use crate::pixel::Pixel;
use crate::provenance::ProvenanceLog;
use crate::selector::{AxisSelector, Selector};
use crate::tileset::{Tile, TileSet};
use crate::types::{Axis, DataType, Label, PhysicalCoordinates, TileShape, Triple};
use crate::utils::decode_pixels;
use crate::volume::TileVolume;
use ndarray::{s, Array2, ArrayD, ArrayView, ArrayView2, Axis as NdAxis, Dimension};
use serde_json::json;
use std::collections::HashSet;

/// Result of [`LabeledStack::get_slice`].
///
/// An axis contributes a dimension to the result when its selection
/// resolves to anything other than exactly one position.
#[derive(Debug, Clone, PartialEq)]
pub enum Slice<T> {
    /// Every axis resolved to a single position
    Tile(Array2<T>),
    /// `axes` lists the labeled axes kept as leading dimensions, in order,
    /// followed by height and width
    Stack { data: ArrayD<T>, axes: Vec<Axis> },
}

impl<T> Slice<T> {
    /// Labeled axes that contributed a dimension
    pub fn axes(&self) -> &[Axis] {
        match self {
            Slice::Tile(_) => &[],
            Slice::Stack { axes, .. } => axes.as_slice(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Slice::Tile(tile) => tile.shape(),
            Slice::Stack { data, .. } => data.shape(),
        }
    }

    pub fn is_tile(&self) -> bool {
        matches!(self, Slice::Tile(_))
    }

    pub fn as_tile(&self) -> Option<ArrayView2<'_, T>> {
        match self {
            Slice::Tile(tile) => Some(tile.view()),
            Slice::Stack { .. } => None,
        }
    }

    pub fn into_dyn(self) -> ArrayD<T> {
        match self {
            Slice::Tile(tile) => tile.into_dyn(),
            Slice::Stack { data, .. } => data,
        }
    }
}

/// Labeled (round, channel, z-plane, height, width) image stack
#[derive(Debug, Clone)]
pub struct LabeledStack<T: Pixel = f32> {
    indices: [AxisLabelIndex; 3],
    volume: TileVolume<T>,
    coordinates: CoordinateTable,
    log: ProvenanceLog,
}

impl<T: Pixel> LabeledStack<T> {
    /// Build a stack from a tileset with the default config
    pub fn build<S: TileSet>(tileset: &S) -> Result<Self> {
        Self::build_with_config(tileset, &StackConfig::default())
    }

    /// Build a stack from a tileset.
    ///
    /// Labels are collected per axis and sorted ascending; every label
    /// combination must be present exactly once and all tiles must share
    /// one pixel shape.
    pub fn build_with_config<S: TileSet>(tileset: &S, config: &StackConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut tile_shape = config.tile_shape;
        for tile in tileset.tiles() {
            let (round, ch, zplane) = (tile.round(), tile.ch(), tile.zplane());
            if !seen.insert((round, ch, zplane)) {
                return Err(StackError::DuplicateTriple { round, ch, zplane });
            }

            let actual = tile.shape();
            match (config.tile_shape, tile_shape) {
                (Some(required), _) if required != actual => {
                    return Err(StackError::shape_mismatch(
                        &required.to_array(),
                        &actual.to_array(),
                    ));
                }
                (None, Some(expected)) if expected != actual => {
                    return Err(StackError::InconsistentShape {
                        round,
                        ch,
                        zplane,
                        expected,
                        actual,
                    });
                }
                _ => tile_shape = Some(actual),
            }
        }

        let tile_shape = tile_shape.ok_or_else(|| {
            StackError::Configuration("tileset contains no tiles".to_string())
        })?;
        let indices = Axis::ALL.map(|axis| {
            AxisLabelIndex::from_discovered(
                axis,
                seen.iter().map(|&(round, ch, zplane)| match axis {
                    Axis::Round => round,
                    Axis::Ch => ch,
                    Axis::ZPlane => zplane,
                }),
            )
        });
        Self::check_complete(&indices, &seen)?;

        let extents = [indices[0].len(), indices[1].len(), indices[2].len()];
        let [_, nc, nz] = extents;
        let mut volume = TileVolume::zeros(extents, tile_shape);
        let mut rows = vec![None; extents.iter().product()];
        let expected_pixels = tile_shape.num_pixels();

        for tile in tileset.tiles() {
            let triple = Triple::new(
                indices[0].position_of(tile.round())?,
                indices[1].position_of(tile.ch())?,
                indices[2].position_of(tile.zplane())?,
            );
            let bytes = tile.tile_data()?;
            let pixels: Vec<T> =
                decode_pixels(&bytes, tile.data_type(), config.normalize_integers)?;
            if pixels.len() != expected_pixels {
                return Err(StackError::InvalidTileData(format!(
                    "tile {} holds {} pixels, expected {}",
                    triple,
                    pixels.len(),
                    expected_pixels
                )));
            }
            let pixels = Array2::from_shape_vec((tile_shape.height, tile_shape.width), pixels)
                .map_err(|err| StackError::InvalidTileData(err.to_string()))?;

            tracing::trace!(%triple, data_type = %tile.data_type(), "ingesting tile");
            volume.write(triple, pixels.view())?;
            rows[(triple.round * nc + triple.ch) * nz + triple.zplane] = Some(tile.coordinates());
        }

        let rows = rows.into_iter().collect::<Option<Vec<_>>>().ok_or_else(|| {
            StackError::Configuration("tileset changed while it was being read".to_string())
        })?;
        let coordinates = CoordinateTable::from_rows(extents, rows)?;

        let mut log = ProvenanceLog::new();
        log.add_entry(
            "build",
            json!({
                "tiles": seen.len(),
                "extents": extents,
                "tile_shape": tile_shape,
                "data_type": T::DATA_TYPE,
                "normalize_integers": config.normalize_integers,
            }),
        );

        tracing::debug!(
            rounds = extents[0],
            chs = extents[1],
            zplanes = extents[2],
            %tile_shape,
            data_type = %T::DATA_TYPE,
            "built labeled stack"
        );

        Ok(Self {
            indices,
            volume,
            coordinates,
            log,
        })
    }

    fn check_complete(
        indices: &[AxisLabelIndex; 3],
        seen: &HashSet<(Label, Label, Label)>,
    ) -> Result<()> {
        for &round in indices[0].labels() {
            for &ch in indices[1].labels() {
                for &zplane in indices[2].labels() {
                    if !seen.contains(&(round, ch, zplane)) {
                        return Err(StackError::MissingTile { round, ch, zplane });
                    }
                }
            }
        }
        Ok(())
    }

    /// Assemble a stack from its parts; all extents must agree
    pub fn from_parts(
        indices: [AxisLabelIndex; 3],
        volume: TileVolume<T>,
        coordinates: CoordinateTable,
    ) -> Result<Self> {
        for (index, axis) in indices.iter().zip(Axis::ALL) {
            if index.axis() != axis {
                return Err(StackError::Configuration(format!(
                    "label index for axis {} supplied in the slot for axis {}",
                    index.axis(),
                    axis
                )));
            }
        }

        let label_extents = [indices[0].len(), indices[1].len(), indices[2].len()];
        if volume.extents() != label_extents {
            return Err(StackError::shape_mismatch(&label_extents, &volume.extents()));
        }
        if coordinates.extents() != label_extents {
            return Err(StackError::shape_mismatch(
                &label_extents,
                &coordinates.extents(),
            ));
        }

        Ok(Self {
            indices,
            volume,
            coordinates,
            log: ProvenanceLog::new(),
        })
    }

    /// Label table of one axis
    pub(crate) fn index(&self, axis: Axis) -> &AxisLabelIndex {
        &self.indices[axis.index()]
    }

    /// Labels currently present on `axis`, in storage order
    pub fn axis_labels(&self, axis: Axis) -> &[Label] {
        self.index(axis).labels()
    }

    pub fn coordinates(&self) -> &CoordinateTable {
        &self.coordinates
    }

    /// Shorthand for `coordinates().sizes()`
    pub fn coordinate_sizes(&self) -> CoordinateSizes {
        self.coordinates.sizes()
    }

    /// (rounds, channels, z-planes, height, width)
    pub fn shape(&self) -> [usize; 5] {
        self.volume.shape()
    }

    pub fn tile_shape(&self) -> TileShape {
        self.volume.tile_shape()
    }

    pub fn num_tiles(&self) -> usize {
        self.volume.num_tiles()
    }

    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    pub fn log(&self) -> &ProvenanceLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ProvenanceLog {
        &mut self.log
    }

    /// Resolve every axis of a selector to retained positions
    fn resolve(&self, selector: &Selector) -> Result<PositionGrid> {
        let [round, ch, zplane] =
            Axis::ALL.map(|axis| self.index(axis).resolve(selector.get(axis)));
        Ok(PositionGrid::new(round?, ch?, zplane?))
    }

    /// Resolve a selector that pins every axis to one label
    fn resolve_point(&self, selector: &Selector) -> Result<Triple> {
        let mut positions = [0; 3];
        for axis in Axis::ALL {
            let label = selector.label(axis).ok_or_else(|| {
                StackError::IncompleteSelector(format!(
                    "{} selects no single label on axis {}",
                    selector, axis
                ))
            })?;
            positions[axis.index()] = self.index(axis).position_of(label)?;
        }
        let [round, ch, zplane] = positions;
        Ok(Triple::new(round, ch, zplane))
    }

    fn slice_shape(&self, grid: &PositionGrid) -> (Vec<Axis>, Vec<usize>) {
        let axes: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|&axis| grid.positions(axis).len() != 1)
            .collect();
        let mut shape: Vec<usize> = axes
            .iter()
            .map(|&axis| grid.positions(axis).len())
            .collect();
        shape.extend(self.tile_shape().to_array());
        (axes, shape)
    }

    /// Read the tiles addressed by `selector`
    pub fn get_slice(&self, selector: &Selector) -> Result<Slice<T>> {
        let grid = self.resolve(selector)?;
        let (axes, shape) = self.slice_shape(&grid);

        if axes.is_empty() {
            let (_, source) = grid.triples().next().ok_or_else(|| {
                StackError::OutOfBounds(format!("{} addresses no tile", selector))
            })?;
            return Ok(Slice::Tile(self.volume.read(source)?.to_owned()));
        }

        let block = self.volume.restrict(&grid)?.into_array();
        let mut data = block.into_dyn();
        for axis in Axis::ALL.into_iter().rev() {
            if !axes.contains(&axis) {
                data = data.index_axis_move(NdAxis(axis.index()), 0);
            }
        }
        debug_assert_eq!(data.shape(), shape.as_slice());

        tracing::debug!(%selector, shape = ?shape, "read slice");
        Ok(Slice::Stack { data, axes })
    }

    /// Overwrite the tiles addressed by `selector`.
    ///
    /// `data` must have exactly the shape [`get_slice`](Self::get_slice)
    /// would return for the same selector. Only pixel data changes; labels
    /// and coordinates are left alone.
    pub fn set_slice<D: Dimension>(
        &mut self,
        selector: &Selector,
        data: ArrayView<'_, T, D>,
    ) -> Result<()> {
        let grid = self.resolve(selector)?;
        let (_, shape) = self.slice_shape(&grid);
        if data.shape() != shape.as_slice() {
            return Err(StackError::shape_mismatch(&shape, data.shape()));
        }

        let [nr, nc, nz] = grid.extents();
        let TileShape { height, width } = self.tile_shape();
        let block = data
            .to_shape((nr, nc, nz, height, width))
            .map_err(|_| StackError::shape_mismatch(&shape, data.shape()))?;

        for (dest, source) in grid.triples() {
            self.volume.write(
                source,
                block.slice(s![dest.round, dest.ch, dest.zplane, .., ..]),
            )?;
        }

        tracing::debug!(%selector, tiles = grid.len(), "wrote slice");
        Ok(())
    }

    /// Borrow the single tile addressed by a full-point selector
    pub fn get_tile(&self, selector: &Selector) -> Result<ArrayView2<'_, T>> {
        let triple = self.resolve_point(selector)?;
        self.volume.read(triple)
    }

    /// Physical coordinates of the tile addressed by a full-point selector
    pub fn tile_coordinates(&self, selector: &Selector) -> Result<PhysicalCoordinates> {
        let triple = self.resolve_point(selector)?;
        self.coordinates
            .get(triple)
            .copied()
            .ok_or_else(|| StackError::OutOfBounds(format!("no coordinates for tile {}", triple)))
    }

    /// Select a sub-stack by label.
    ///
    /// The result owns copies of the retained labels, tiles and coordinate
    /// rows; later writes to either stack are invisible to the other. An
    /// axis resolving to no labels yields a stack with zero extent there.
    pub fn sel(&self, selector: &Selector) -> Result<Self> {
        let grid = self.resolve(selector)?;

        let indices = Axis::ALL.map(|axis| self.index(axis).subset(grid.positions(axis)));
        let volume = self.volume.restrict(&grid)?;
        let coordinates = self.coordinates.restrict(&grid)?;

        let mut log = self.log.clone();
        log.add_entry("sel", serde_json::to_value(selector)?);

        tracing::debug!(%selector, extents = ?grid.extents(), "selected sub-stack");
        Ok(Self {
            indices,
            volume,
            coordinates,
            log,
        })
    }

    /// Iterate full-point selectors over the cartesian product of `axes`.
    ///
    /// The first axis given varies slowest; labels are visited in storage
    /// order. Each call starts a fresh iteration from the current labels.
    pub fn iter_axes(&self, axes: &[Axis]) -> AxisIter {
        let mut unique: Vec<(Axis, Vec<Label>)> = Vec::with_capacity(axes.len());
        for &axis in axes {
            if !unique.iter().any(|(seen, _)| *seen == axis) {
                unique.push((axis, self.axis_labels(axis).to_vec()));
            }
        }
        AxisIter::new(unique)
    }

    pub fn stats(&self) -> StackStats {
        StackStats {
            shape: self.shape(),
            num_tiles: self.num_tiles(),
            size_in_bytes: self.volume.size_in_bytes(),
            data_type: T::DATA_TYPE,
            log_entries: self.log.len(),
        }
    }
}

/// Iterator over label combinations, see [`LabeledStack::iter_axes`]
#[derive(Debug, Clone)]
pub struct AxisIter {
    axes: Vec<(Axis, Vec<Label>)>,
    cursor: Option<Vec<usize>>,
}

impl AxisIter {
    fn new(axes: Vec<(Axis, Vec<Label>)>) -> Self {
        let cursor = if axes.iter().any(|(_, labels)| labels.is_empty()) {
            None
        } else {
            Some(vec![0; axes.len()])
        };
        Self { axes, cursor }
    }
}

impl Iterator for AxisIter {
    type Item = Selector;

    fn next(&mut self) -> Option<Selector> {
        let cursor = self.cursor.as_mut()?;
        let selector = self
            .axes
            .iter()
            .zip(cursor.iter())
            .map(|((axis, labels), &i)| (*axis, AxisSelector::Label(labels[i])))
            .collect();

        // odometer: last axis turns fastest
        let mut exhausted = true;
        for dim in (0..cursor.len()).rev() {
            cursor[dim] += 1;
            if cursor[dim] < self.axes[dim].1.len() {
                exhausted = false;
                break;
            }
            cursor[dim] = 0;
        }
        if exhausted {
            self.cursor = None;
        }

        Some(selector)
    }
}

/// Stack statistics
#[derive(Debug, Clone)]
pub struct StackStats {
    pub shape: [usize; 5],
    pub num_tiles: usize,
    pub size_in_bytes: usize,
    pub data_type: DataType,
    pub log_entries: usize,
}

impl StackStats {
    pub fn summary(&self) -> String {
        let [nr, nc, nz, height, width] = self.shape;
        format!(
            "{} tiles ({} r x {} c x {} z) of {}x{} {:?}, {} in memory, {} log entries",
            self.num_tiles,
            nr,
            nc,
            nz,
            height,
            width,
            self.data_type,
            crate::utils::format_bytes(self.size_in_bytes),
            self.log_entries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::{build_tileset, FetchedTile, MemoryTile, MemoryTileSet};
    use ndarray::{Array, IxDyn};

    const ROUNDS: [Label; 3] = [1, 4, 6];
    const CHS: [Label; 4] = [2, 4, 6, 8];
    const ZPLANES: [Label; 2] = [3, 4];

    fn position(labels: &[Label], label: Label) -> usize {
        labels.iter().position(|&l| l == label).unwrap()
    }

    fn fill_value(round: Label, ch: Label, zplane: Label) -> f32 {
        let (r, c, z) = (
            position(&ROUNDS, round),
            position(&CHS, ch),
            position(&ZPLANES, zplane),
        );
        ((r * 4 + c) * 2 + z) as f32 / 24.0
    }

    fn coords(round: Label, ch: Label, zplane: Label) -> PhysicalCoordinates {
        let (low, high) = (round.min(ch) as f64, round.max(ch) as f64);
        let z = zplane as f64;
        PhysicalCoordinates::new(
            (low * 0.01, high * 0.01),
            (low * 0.001, high * 0.001),
            (z * 0.0001, (z + 1.0) * 0.0001),
        )
    }

    fn tileset() -> MemoryTileSet {
        build_tileset(&ROUNDS, &CHS, &ZPLANES, |r, c, z| {
            let pixels = Array2::from_elem((2, 4), fill_value(r, c, z));
            Ok(FetchedTile::from_array(coords(r, c, z), pixels.view()))
        })
        .unwrap()
    }

    fn stack() -> LabeledStack {
        LabeledStack::build(&tileset()).unwrap()
    }

    fn fill_of(slice: &Slice<f32>) -> f32 {
        let first = slice.as_tile().unwrap()[[0, 0]];
        assert!(slice.as_tile().unwrap().iter().all(|&v| v == first));
        first
    }

    #[test]
    fn test_build_discovers_labels() {
        let stack = stack();
        assert_eq!(stack.axis_labels(Axis::Round).to_vec(), ROUNDS.to_vec());
        assert_eq!(stack.axis_labels(Axis::Ch).to_vec(), CHS.to_vec());
        assert_eq!(stack.axis_labels(Axis::ZPlane).to_vec(), ZPLANES.to_vec());
        assert_eq!(stack.shape(), [3, 4, 2, 2, 4]);
        assert_eq!(stack.data_type(), DataType::F32);
        assert_eq!(stack.log().operations().collect::<Vec<_>>(), vec!["build"]);
    }

    #[test]
    fn test_get_slice_single_tile() {
        let stack = stack();
        let first = stack.get_slice(&Selector::point(1, 2, 3)).unwrap();
        assert!(first.is_tile());
        assert!(first.axes().is_empty());
        assert_eq!(first.shape(), &[2, 4]);
        assert_eq!(fill_of(&first), 0.0);

        let last = stack.get_slice(&Selector::point(6, 8, 4)).unwrap();
        assert_eq!(fill_of(&last), 23.0 / 24.0);
    }

    #[test]
    fn test_get_slice_keeps_multi_position_axes() {
        let stack = stack();
        let selector = Selector::new()
            .with(Axis::Round, AxisSelector::Label(4))
            .with(Axis::Ch, AxisSelector::range(Some(4), Some(6)));
        let slice = stack.get_slice(&selector).unwrap();

        assert_eq!(slice.axes(), &[Axis::Ch, Axis::ZPlane]);
        assert_eq!(slice.shape(), &[2, 2, 2, 4]);
        let data = slice.into_dyn();
        assert_eq!(data[IxDyn(&[0, 0, 0, 0])], fill_value(4, 4, 3));
        assert_eq!(data[IxDyn(&[1, 1, 1, 3])], fill_value(4, 6, 4));
    }

    #[test]
    fn test_get_slice_range_resolving_to_one_label_is_squeezed() {
        let stack = stack();
        let selector = Selector::new()
            .with(Axis::Round, AxisSelector::range(Some(2), Some(5)))
            .with(Axis::Ch, AxisSelector::Label(8))
            .with(Axis::ZPlane, AxisSelector::Label(3));
        let slice = stack.get_slice(&selector).unwrap();
        assert!(slice.is_tile());
        assert_eq!(fill_of(&slice), fill_value(4, 8, 3));
    }

    #[test]
    fn test_get_slice_unknown_label() {
        let stack = stack();
        let err = stack.get_slice(&Selector::point(2, 2, 3)).unwrap_err();
        assert!(matches!(
            err,
            StackError::LabelNotFound {
                axis: Axis::Round,
                label: 2
            }
        ));
    }

    #[test]
    fn test_set_slice_single_tile() {
        let mut stack = stack();
        let marker = Array2::<f32>::from_elem((2, 4), -1.0);
        stack.set_slice(&Selector::point(4, 6, 4), marker.view()).unwrap();

        for selector in stack.iter_axes(&Axis::ALL) {
            let (r, c, z) = (
                selector.label(Axis::Round).unwrap(),
                selector.label(Axis::Ch).unwrap(),
                selector.label(Axis::ZPlane).unwrap(),
            );
            let expected = if (r, c, z) == (4, 6, 4) {
                -1.0
            } else {
                fill_value(r, c, z)
            };
            assert_eq!(fill_of(&stack.get_slice(&selector).unwrap()), expected);
        }
    }

    #[test]
    fn test_set_slice_block_round_trip() {
        let mut stack = stack();
        let selector = Selector::new()
            .with(Axis::Round, AxisSelector::Labels(vec![1, 6]))
            .with(Axis::ZPlane, AxisSelector::Label(4));
        let block = Array::from_shape_fn(IxDyn(&[2, 4, 2, 4]), |idx| {
            (idx[0] * 1000 + idx[1] * 100 + idx[2] * 10 + idx[3]) as f32
        });
        stack.set_slice(&selector, block.view()).unwrap();

        assert_eq!(stack.get_slice(&selector).unwrap().into_dyn(), block);
        let tile = stack.get_tile(&Selector::point(6, 4, 4)).unwrap();
        assert_eq!(tile[[1, 3]], 1113.0);
        // z=3 tiles untouched
        assert_eq!(
            fill_of(&stack.get_slice(&Selector::point(6, 4, 3)).unwrap()),
            fill_value(6, 4, 3)
        );
    }

    #[test]
    fn test_set_slice_shape_mismatch_leaves_stack_untouched() {
        let mut stack = stack();
        let before = stack.volume.clone();
        let selector = Selector::new().with(Axis::Round, AxisSelector::Label(1));

        let wrong = Array2::<f32>::zeros((2, 4));
        let err = stack.set_slice(&selector, wrong.view()).unwrap_err();
        assert!(matches!(
            err,
            StackError::ShapeMismatch { ref expected, .. } if expected == &vec![4, 2, 2, 4]
        ));
        assert_eq!(stack.volume, before);
    }

    #[test]
    fn test_set_slice_unknown_label_leaves_stack_untouched() {
        let mut stack = stack();
        let before = stack.volume.clone();
        let selector = Selector::new()
            .with(Axis::Round, AxisSelector::Label(1))
            .with(Axis::Ch, AxisSelector::Labels(vec![2, 3]));
        let block = Array::<f32, _>::zeros(IxDyn(&[2, 2, 2, 4]));
        assert!(stack.set_slice(&selector, block.view()).is_err());
        assert_eq!(stack.volume, before);
    }

    #[test]
    fn test_sel_label_ranges() {
        let stack = stack();
        let selector = Selector::new()
            .with(Axis::Round, AxisSelector::range(None, Some(4)))
            .with(Axis::Ch, AxisSelector::range(Some(4), Some(6)))
            .with(Axis::ZPlane, AxisSelector::Label(4));
        let sub = stack.sel(&selector).unwrap();

        assert_eq!(sub.axis_labels(Axis::Round).to_vec(), vec![1, 4]);
        assert_eq!(sub.axis_labels(Axis::Ch).to_vec(), vec![4, 6]);
        assert_eq!(sub.axis_labels(Axis::ZPlane).to_vec(), vec![4]);
        assert_eq!(
            sub.coordinate_sizes(),
            CoordinateSizes {
                round: 2,
                ch: 2,
                zplane: 1
            }
        );
        for point in sub.iter_axes(&Axis::ALL) {
            let (r, c, z) = (
                point.label(Axis::Round).unwrap(),
                point.label(Axis::Ch).unwrap(),
                point.label(Axis::ZPlane).unwrap(),
            );
            assert_eq!(fill_of(&sub.get_slice(&point).unwrap()), fill_value(r, c, z));
            assert_eq!(sub.tile_coordinates(&point).unwrap(), coords(r, c, z));
        }
        assert_eq!(
            sub.log().operations().collect::<Vec<_>>(),
            vec!["build", "sel"]
        );
        assert_eq!(stack.log().len(), 1);
    }

    #[test]
    fn test_sel_is_independent_of_parent() {
        let mut parent = stack();
        let mut child = parent
            .sel(&Selector::new().with(Axis::Round, AxisSelector::Label(4)))
            .unwrap();
        let point = Selector::point(4, 2, 3);
        let original = fill_value(4, 2, 3);

        let ones = Array2::<f32>::ones((2, 4));
        child.set_slice(&point, ones.view()).unwrap();
        assert_eq!(fill_of(&parent.get_slice(&point).unwrap()), original);

        let twos = Array2::<f32>::from_elem((2, 4), 2.0);
        parent.set_slice(&point, twos.view()).unwrap();
        assert_eq!(fill_of(&child.get_slice(&point).unwrap()), 1.0);
    }

    #[test]
    fn test_sel_missing_label_fails() {
        let stack = stack();
        let result = stack.sel(&Selector::new().with(Axis::Ch, AxisSelector::Labels(vec![2, 5])));
        assert!(matches!(
            result,
            Err(StackError::LabelNotFound {
                axis: Axis::Ch,
                label: 5
            })
        ));
    }

    #[test]
    fn test_sel_empty_range_gives_zero_extent() {
        let stack = stack();
        let sub = stack
            .sel(&Selector::new().with(Axis::Round, AxisSelector::range(Some(7), None)))
            .unwrap();
        assert!(sub.axis_labels(Axis::Round).is_empty());
        assert_eq!(sub.shape(), [0, 4, 2, 2, 4]);
        assert_eq!(sub.coordinate_sizes()[Axis::Round], 0);
        assert_eq!(sub.num_tiles(), 0);
        assert_eq!(sub.iter_axes(&Axis::ALL).count(), 0);
    }

    #[test]
    fn test_slices_over_empty_selections() {
        let mut stack = stack();
        let before = stack.volume.clone();
        let selector = Selector::new()
            .with(Axis::Round, AxisSelector::Labels(vec![]))
            .with(Axis::Ch, AxisSelector::range(Some(4), Some(6)))
            .with(Axis::ZPlane, AxisSelector::Label(3));

        let slice = stack.get_slice(&selector).unwrap();
        assert!(!slice.is_tile());
        assert_eq!(slice.axes(), &[Axis::Round, Axis::Ch]);
        assert_eq!(slice.shape(), &[0, 2, 2, 4]);

        let empty = Array::<f32, _>::zeros(IxDyn(&[0, 2, 2, 4]));
        stack.set_slice(&selector, empty.view()).unwrap();
        assert_eq!(stack.volume, before);

        let child = stack
            .sel(&Selector::new().with(Axis::Round, AxisSelector::range(Some(7), None)))
            .unwrap();
        let whole = child.get_slice(&Selector::new()).unwrap();
        assert_eq!(whole.axes(), &Axis::ALL);
        assert_eq!(whole.shape(), &[0, 4, 2, 2, 4]);
    }

    #[test]
    fn test_iter_axes_cartesian_product() {
        let stack = stack();
        let points: Vec<Selector> = stack.iter_axes(&Axis::ALL).collect();
        assert_eq!(points.len(), 3 * 4 * 2);
        let unique: HashSet<String> = points.iter().map(|p| p.to_string()).collect();
        assert_eq!(unique.len(), 24);
        assert!(points.iter().all(Selector::is_point));
        assert_eq!(points[0], Selector::point(1, 2, 3));
        assert_eq!(points[1], Selector::point(1, 2, 4));
        assert_eq!(points[23], Selector::point(6, 8, 4));
    }

    #[test]
    fn test_iter_axes_follows_supplied_order() {
        let stack = stack();
        let points: Vec<Selector> = stack.iter_axes(&[Axis::ZPlane, Axis::Round]).collect();
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].label(Axis::ZPlane), Some(3));
        assert_eq!(points[0].label(Axis::Round), Some(1));
        assert_eq!(points[1].label(Axis::Round), Some(4));
        assert_eq!(points[3].label(Axis::ZPlane), Some(4));
        assert!(points.iter().all(|p| !p.constrains(Axis::Ch)));
    }

    #[test]
    fn test_iter_axes_is_restartable() {
        let stack = stack();
        let first: Vec<Selector> = stack.iter_axes(&[Axis::Ch]).collect();
        let second: Vec<Selector> = stack.iter_axes(&[Axis::Ch]).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_tile_coordinates_needs_full_point() {
        let stack = stack();
        let err = stack
            .tile_coordinates(&Selector::new().with(Axis::Round, AxisSelector::Label(1)))
            .unwrap_err();
        assert!(matches!(err, StackError::IncompleteSelector(_)));
        assert_eq!(
            stack.tile_coordinates(&Selector::point(6, 2, 4)).unwrap(),
            coords(6, 2, 4)
        );
    }

    #[test]
    fn test_build_rejects_duplicate_triple() {
        let mut tiles = tileset();
        let pixels = Array2::<f32>::zeros((2, 4));
        tiles.push(MemoryTile::new(
            1,
            2,
            3,
            FetchedTile::from_array(coords(1, 2, 3), pixels.view()),
        ));
        let result = LabeledStack::<f32>::build(&tiles);
        assert!(matches!(
            result,
            Err(StackError::DuplicateTriple {
                round: 1,
                ch: 2,
                zplane: 3
            })
        ));
    }

    #[test]
    fn test_build_rejects_inconsistent_shape() {
        let tiles = build_tileset(&[1, 2], &[1], &[1], |r, c, z| {
            let pixels = Array2::<f32>::zeros((2, 2 + r as usize));
            Ok(FetchedTile::from_array(coords(r, c, z), pixels.view()))
        })
        .unwrap();
        let result = LabeledStack::<f32>::build(&tiles);
        assert!(matches!(
            result,
            Err(StackError::InconsistentShape { round: 2, .. })
        ));

        let config = StackConfig::new().with_tile_shape(TileShape::new(2, 2));
        let result = LabeledStack::<f32>::build_with_config(&tiles, &config);
        assert!(matches!(result, Err(StackError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_build_rejects_missing_tile() {
        let tiles: MemoryTileSet = tileset()
            .tiles()
            .filter(|t| (t.round(), t.ch(), t.zplane()) != (6, 4, 3))
            .cloned()
            .collect();
        let result = LabeledStack::<f32>::build(&tiles);
        assert!(matches!(
            result,
            Err(StackError::MissingTile {
                round: 6,
                ch: 4,
                zplane: 3
            })
        ));
    }

    #[test]
    fn test_build_rejects_short_tile_data() {
        let mut tiles = MemoryTileSet::new();
        tiles.push(MemoryTile::new(
            0,
            0,
            0,
            FetchedTile::from_bytes(
                TileShape::new(2, 2),
                coords(0, 0, 0),
                DataType::U8,
                vec![0u8; 3],
            ),
        ));
        let result = LabeledStack::<f32>::build(&tiles);
        assert!(matches!(result, Err(StackError::InvalidTileData(_))));
    }

    #[test]
    fn test_build_normalizes_integer_tiles() {
        let tiles = build_tileset(&[0], &[0], &[0], |r, c, z| {
            let pixels = Array2::<u8>::from_elem((1, 2), 255);
            Ok(FetchedTile::from_array(coords(r, c, z), pixels.view()))
        })
        .unwrap();

        let stack = LabeledStack::<f32>::build(&tiles).unwrap();
        assert_eq!(stack.get_tile(&Selector::point(0, 0, 0)).unwrap()[[0, 1]], 1.0);

        let config = StackConfig::new().with_normalize_integers(false);
        let stack = LabeledStack::<f32>::build_with_config(&tiles, &config).unwrap();
        assert_eq!(stack.get_tile(&Selector::point(0, 0, 0)).unwrap()[[0, 1]], 255.0);

        let stack = LabeledStack::<u16>::build(&tiles).unwrap();
        assert_eq!(stack.get_tile(&Selector::point(0, 0, 0)).unwrap()[[0, 0]], 255);
    }

    #[test]
    fn test_build_rejects_empty_tileset() {
        let result = LabeledStack::<f32>::build(&MemoryTileSet::new());
        assert!(matches!(result, Err(StackError::Configuration(_))));
    }

    #[test]
    fn test_from_parts_checks_extents() {
        let stack = stack();
        let indices = [
            AxisLabelIndex::new(Axis::Round, vec![1, 4, 6]).unwrap(),
            AxisLabelIndex::new(Axis::Ch, vec![2, 4, 6, 8]).unwrap(),
            AxisLabelIndex::new(Axis::ZPlane, vec![3, 4]).unwrap(),
        ];
        let rebuilt = LabeledStack::from_parts(
            indices.clone(),
            stack.volume.clone(),
            stack.coordinates().clone(),
        )
        .unwrap();
        assert_eq!(rebuilt.volume, stack.volume);
        assert!(rebuilt.log().is_empty());

        let short = [
            AxisLabelIndex::new(Axis::Round, vec![1, 4]).unwrap(),
            indices[1].clone(),
            indices[2].clone(),
        ];
        let result =
            LabeledStack::from_parts(short, stack.volume.clone(), stack.coordinates().clone());
        assert!(matches!(result, Err(StackError::ShapeMismatch { .. })));

        let swapped = [indices[1].clone(), indices[0].clone(), indices[2].clone()];
        let result =
            LabeledStack::from_parts(swapped, stack.volume.clone(), stack.coordinates().clone());
        assert!(matches!(result, Err(StackError::Configuration(_))));
    }

    #[test]
    fn test_stats_summary() {
        let stats = stack().stats();
        assert_eq!(stats.num_tiles, 24);
        assert_eq!(stats.size_in_bytes, 24 * 8 * 4);
        assert_eq!(
            stats.summary(),
            "24 tiles (3 r x 4 c x 2 z) of 2x4 F32, 768 B in memory, 1 log entries"
        );
    }
}

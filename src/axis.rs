//! Per-axis label tables
//!
//! An [`AxisLabelIndex`] maps the external labels of one axis to the dense,
//! zero-based positions used by the tile volume. Labels are kept in strictly
//! ascending order; range selectors rely on that ordering to resolve to a
//! contiguous run of positions.

use crate::error::{Result, StackError};
use crate::selector::AxisSelector;
use crate::types::{Axis, Label};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Ordered label table for one labeled axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisLabelIndex {
    axis: Axis,
    labels: Vec<Label>,
    #[serde(skip)]
    position_of: HashMap<Label, usize>,
}

impl AxisLabelIndex {
    /// Create an index from labels already in storage order.
    ///
    /// Fails with [`StackError::InconsistentLabels`] unless the labels are
    /// strictly ascending (which also rules out duplicates).
    pub fn new(axis: Axis, labels: Vec<Label>) -> Result<Self> {
        if let Some(pair) = labels.windows(2).find(|pair| pair[0] >= pair[1]) {
            let reason = if pair[0] == pair[1] {
                format!("duplicate label {}", pair[0])
            } else {
                format!("label {} follows {}; labels must be ascending", pair[1], pair[0])
            };
            return Err(StackError::InconsistentLabels { axis, reason });
        }

        Ok(Self::from_sorted(axis, labels))
    }

    /// Create an index from labels discovered in arbitrary order, possibly repeated
    pub fn from_discovered(axis: Axis, labels: impl IntoIterator<Item = Label>) -> Self {
        let labels: BTreeSet<Label> = labels.into_iter().collect();
        Self::from_sorted(axis, labels.into_iter().collect())
    }

    fn from_sorted(axis: Axis, labels: Vec<Label>) -> Self {
        let position_of = labels
            .iter()
            .enumerate()
            .map(|(position, &label)| (label, position))
            .collect();
        Self {
            axis,
            labels,
            position_of,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Labels in storage order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: Label) -> bool {
        self.position_of.contains_key(&label)
    }

    /// Label stored at a position
    pub fn label_at(&self, position: usize) -> Option<Label> {
        self.labels.get(position).copied()
    }

    /// Position of a label
    pub fn position_of(&self, label: Label) -> Result<usize> {
        self.position_of
            .get(&label)
            .copied()
            .ok_or(StackError::LabelNotFound {
                axis: self.axis,
                label,
            })
    }

    /// Resolve a selection to positions, in storage order
    pub fn resolve(&self, selection: &AxisSelector) -> Result<Vec<usize>> {
        match selection {
            AxisSelector::All => Ok((0..self.len()).collect()),
            AxisSelector::Label(label) => Ok(vec![self.position_of(*label)?]),
            AxisSelector::Labels(labels) => {
                let positions = labels
                    .iter()
                    .map(|&label| self.position_of(label))
                    .collect::<Result<BTreeSet<usize>>>()?;
                Ok(positions.into_iter().collect())
            }
            AxisSelector::Range { start, stop } => {
                let first = start.map_or(0, |start| {
                    self.labels.partition_point(|&label| label < start)
                });
                let end = stop.map_or(self.len(), |stop| {
                    self.labels.partition_point(|&label| label <= stop)
                });
                Ok((first..end.max(first)).collect())
            }
        }
    }

    /// A new index holding the labels at `positions` (ascending, in bounds)
    pub(crate) fn subset(&self, positions: &[usize]) -> Self {
        debug_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        Self::from_sorted(
            self.axis,
            positions.iter().map(|&position| self.labels[position]).collect(),
        )
    }
}

//! Label-space selection requests
//!
//! A [`Selector`] maps each labeled axis to an [`AxisSelector`]. Axes left
//! out of a selector are unconstrained. Selectors hold no reference to a
//! stack; the same selector can be resolved against any number of stacks.
//!
//! Label ranges are inclusive at both ends and compare label *values*, so
//! only the inclusive std range types convert into a range selector:
//!
//! ```rust
//! use tilestack::{Axis, AxisSelector, Label, Selector};
//!
//! let (low, high): (Label, Label) = (4, 6);
//! let selector = Selector::new()
//!     .with(Axis::Round, ..=low)
//!     .with(Axis::Ch, low..=high)
//!     .with(Axis::ZPlane, low);
//! assert_eq!(selector.label(Axis::ZPlane), Some(4));
//! assert_eq!(selector.get(Axis::Ch), &AxisSelector::range(Some(4), Some(6)));
//! ```

use crate::types::{Axis, Label};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{RangeFrom, RangeFull, RangeInclusive, RangeToInclusive};

/// Selection along a single labeled axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSelector {
    /// Every label on the axis
    #[default]
    All,
    /// Exactly one label; the axis is dropped from sliced results
    Label(Label),
    /// An explicit set of labels
    Labels(Vec<Label>),
    /// Labels `l` with `start <= l <= stop`; an omitted bound is open
    Range {
        start: Option<Label>,
        stop: Option<Label>,
    },
}

impl AxisSelector {
    pub fn range(start: Option<Label>, stop: Option<Label>) -> Self {
        AxisSelector::Range { start, stop }
    }

    /// The label if this selects exactly one label
    pub fn as_label(&self) -> Option<Label> {
        match self {
            AxisSelector::Label(label) => Some(*label),
            _ => None,
        }
    }
}

impl fmt::Display for AxisSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(value: &Option<Label>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        match self {
            AxisSelector::All => f.write_str(":"),
            AxisSelector::Label(label) => write!(f, "{}", label),
            AxisSelector::Labels(labels) => write!(f, "{:?}", labels),
            AxisSelector::Range { start, stop } => write!(f, "{}:{}", bound(start), bound(stop)),
        }
    }
}

impl From<Label> for AxisSelector {
    fn from(label: Label) -> Self {
        AxisSelector::Label(label)
    }
}

impl From<Vec<Label>> for AxisSelector {
    fn from(labels: Vec<Label>) -> Self {
        AxisSelector::Labels(labels)
    }
}

impl From<&[Label]> for AxisSelector {
    fn from(labels: &[Label]) -> Self {
        AxisSelector::Labels(labels.to_vec())
    }
}

impl From<RangeFull> for AxisSelector {
    fn from(_: RangeFull) -> Self {
        AxisSelector::All
    }
}

impl From<RangeInclusive<Label>> for AxisSelector {
    fn from(range: RangeInclusive<Label>) -> Self {
        let (start, stop) = range.into_inner();
        AxisSelector::range(Some(start), Some(stop))
    }
}

impl From<RangeToInclusive<Label>> for AxisSelector {
    fn from(range: RangeToInclusive<Label>) -> Self {
        AxisSelector::range(None, Some(range.end))
    }
}

impl From<RangeFrom<Label>> for AxisSelector {
    fn from(range: RangeFrom<Label>) -> Self {
        AxisSelector::range(Some(range.start), None)
    }
}

/// A per-axis selection request in label space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    axes: BTreeMap<Axis, AxisSelector>,
}

impl Selector {
    /// An empty selector: every axis unconstrained
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector addressing one tile by its three labels
    pub fn point(round: Label, ch: Label, zplane: Label) -> Self {
        Self::new()
            .with(Axis::Round, round)
            .with(Axis::Ch, ch)
            .with(Axis::ZPlane, zplane)
    }

    /// Constrain an axis
    pub fn with(mut self, axis: Axis, selection: impl Into<AxisSelector>) -> Self {
        self.set(axis, selection);
        self
    }

    pub fn set(&mut self, axis: Axis, selection: impl Into<AxisSelector>) {
        self.axes.insert(axis, selection.into());
    }

    /// Selection along `axis`; unconstrained axes report [`AxisSelector::All`]
    pub fn get(&self, axis: Axis) -> &AxisSelector {
        static ALL: AxisSelector = AxisSelector::All;
        self.axes.get(&axis).unwrap_or(&ALL)
    }

    /// The single label selected on `axis`, if any
    pub fn label(&self, axis: Axis) -> Option<Label> {
        self.axes.get(&axis).and_then(AxisSelector::as_label)
    }

    /// Whether `axis` has an explicit constraint
    pub fn constrains(&self, axis: Axis) -> bool {
        self.axes.contains_key(&axis)
    }

    /// Whether every labeled axis is pinned to a single label
    pub fn is_point(&self) -> bool {
        Axis::ALL.iter().all(|&axis| self.label(axis).is_some())
    }

    /// Explicitly constrained axes, in axis order
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &AxisSelector)> {
        self.axes.iter().map(|(axis, selection)| (*axis, selection))
    }
}

impl FromIterator<(Axis, AxisSelector)> for Selector {
    fn from_iter<I: IntoIterator<Item = (Axis, AxisSelector)>>(iter: I) -> Self {
        Self {
            axes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (axis, selection)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", axis, selection)?;
        }
        f.write_str("}")
    }
}

//! Measurement keys and their static configuration.
//!
//! Every key is a closed enum variant bound to a [`KeyConfig`]. Nothing here
//! is computed from a mesh; heights are stored as fractions of the mesh's
//! extent along the up axis and resolved by the selector.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeasureError, MeasureResult};

/// Standard anthropometric measurement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MeasurementKey {
    /// Stature: extent of the whole body along the up axis.
    Height,
    /// Neck circumference.
    NeckCirc,
    /// Bust circumference (fullest level of the chest).
    BustCirc,
    /// Underbust circumference.
    UnderbustCirc,
    /// Waist circumference (narrowest level of the torso).
    WaistCirc,
    /// Hip circumference (fullest level of the seat).
    HipCirc,
    /// Circumference of a single thigh.
    ThighCirc,
    /// Shoulder width.
    ShoulderWidth,
    /// Chest width.
    ChestWidth,
    /// Waist width.
    WaistWidth,
    /// Hip width.
    HipWidth,
    /// Chest depth (front to back).
    ChestDepth,
    /// Waist depth (front to back).
    WaistDepth,
    /// Hip depth (front to back).
    HipDepth,
}

impl MeasurementKey {
    /// Every standard key, in output order.
    pub const ALL: [Self; 14] = [
        Self::Height,
        Self::NeckCirc,
        Self::BustCirc,
        Self::UnderbustCirc,
        Self::WaistCirc,
        Self::HipCirc,
        Self::ThighCirc,
        Self::ShoulderWidth,
        Self::ChestWidth,
        Self::WaistWidth,
        Self::HipWidth,
        Self::ChestDepth,
        Self::WaistDepth,
        Self::HipDepth,
    ];

    /// Stable upper-snake-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Height => "HEIGHT",
            Self::NeckCirc => "NECK_CIRC",
            Self::BustCirc => "BUST_CIRC",
            Self::UnderbustCirc => "UNDERBUST_CIRC",
            Self::WaistCirc => "WAIST_CIRC",
            Self::HipCirc => "HIP_CIRC",
            Self::ThighCirc => "THIGH_CIRC",
            Self::ShoulderWidth => "SHOULDER_WIDTH",
            Self::ChestWidth => "CHEST_WIDTH",
            Self::WaistWidth => "WAIST_WIDTH",
            Self::HipWidth => "HIP_WIDTH",
            Self::ChestDepth => "CHEST_DEPTH",
            Self::WaistDepth => "WAIST_DEPTH",
            Self::HipDepth => "HIP_DEPTH",
        }
    }

    /// Look up a key by its identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coordinate axis of the input vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// First column.
    X,
    /// Second column.
    Y,
    /// Third column.
    Z,
}

impl Axis {
    /// Column index of this axis.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Projection plane for slices: the width axis becomes planar `x`, the depth
/// axis planar `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    /// Left/right axis.
    pub width_axis: Axis,
    /// Front/back axis.
    pub depth_axis: Axis,
}

impl Plane {
    /// The XY plane, used with a Z-up mesh.
    pub const XY: Self = Self {
        width_axis: Axis::X,
        depth_axis: Axis::Y,
    };

    /// The XZ plane, used with a Y-up mesh.
    pub const XZ: Self = Self {
        width_axis: Axis::X,
        depth_axis: Axis::Z,
    };
}

/// What kind of quantity a key measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeasurementKind {
    /// Closed-loop length of a slice.
    Circumference,
    /// Extent of a slice along the width axis.
    Width,
    /// Extent of a slice along the depth axis.
    Depth,
    /// Extent of the whole mesh along the up axis.
    Height,
}

/// How a candidate height is turned into a slice.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Slice exactly at the candidate height.
    Fixed,
    /// Scan `steps` evenly spaced heights within `±span` (as a fraction of the
    /// mesh extent) and keep the largest value.
    BandPeak {
        /// Half-span of the scan, as a fraction of the mesh extent.
        span: f64,
        /// Number of heights scanned (at least 2).
        steps: usize,
    },
    /// Like [`Strategy::BandPeak`] but keeps the smallest value.
    BandTrough {
        /// Half-span of the scan, as a fraction of the mesh extent.
        span: f64,
        /// Number of heights scanned (at least 2).
        steps: usize,
    },
}

/// Which part of a slice a candidate measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Region {
    /// All slice points.
    #[default]
    Whole,
    /// Points below the slice's width-axis center.
    Left,
    /// Points above the slice's width-axis center.
    Right,
}

/// One `(height, strategy)` pair tried by the selector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// Height as a fraction of the mesh's up-axis extent (0 = lowest point).
    pub fraction: f64,
    /// Slice strategy.
    pub strategy: Strategy,
    /// Part of the slice to measure.
    pub region: Region,
}

impl Candidate {
    /// A fixed-height candidate over the whole slice.
    #[must_use]
    pub const fn fixed(fraction: f64) -> Self {
        Self {
            fraction,
            strategy: Strategy::Fixed,
            region: Region::Whole,
        }
    }

    /// A band-peak candidate over the whole slice.
    #[must_use]
    pub const fn peak(fraction: f64, span: f64, steps: usize) -> Self {
        Self {
            fraction,
            strategy: Strategy::BandPeak { span, steps },
            region: Region::Whole,
        }
    }

    /// A band-trough candidate over the whole slice.
    #[must_use]
    pub const fn trough(fraction: f64, span: f64, steps: usize) -> Self {
        Self {
            fraction,
            strategy: Strategy::BandTrough { span, steps },
            region: Region::Whole,
        }
    }

    /// Restrict the candidate to a region of the slice.
    #[must_use]
    pub const fn in_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }
}

/// Static configuration of one measurement key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyConfig {
    /// Quantity measured.
    pub kind: MeasurementKind,
    /// Vertical axis of the mesh.
    pub up: Axis,
    /// Projection plane for slices.
    pub plane: Plane,
    /// Slice half-width along the up axis, in meters.
    pub half_width: f64,
    /// Candidates, tried in order.
    pub candidates: Vec<Candidate>,
    /// Values above this emit `PERIMETER_LARGE` (circumferences only).
    pub sanity_ceiling: Option<f64>,
}

impl KeyConfig {
    /// Default slice half-width in meters.
    pub const DEFAULT_HALF_WIDTH: f64 = 0.005;

    fn base(kind: MeasurementKind) -> Self {
        Self {
            kind,
            up: Axis::Z,
            plane: Plane::XY,
            half_width: Self::DEFAULT_HALF_WIDTH,
            candidates: Vec::new(),
            sanity_ceiling: None,
        }
    }

    /// A Z-up circumference key with the given sanity ceiling.
    #[must_use]
    pub fn circumference(sanity_ceiling: f64) -> Self {
        Self {
            sanity_ceiling: Some(sanity_ceiling),
            ..Self::base(MeasurementKind::Circumference)
        }
    }

    /// A Z-up width key.
    #[must_use]
    pub fn width() -> Self {
        Self::base(MeasurementKind::Width)
    }

    /// A Z-up depth key.
    #[must_use]
    pub fn depth() -> Self {
        Self::base(MeasurementKind::Depth)
    }

    /// A Z-up stature key.
    #[must_use]
    pub fn height() -> Self {
        Self::base(MeasurementKind::Height)
    }

    /// Set the up axis and projection plane.
    #[must_use]
    pub const fn with_orientation(mut self, up: Axis, plane: Plane) -> Self {
        self.up = up;
        self.plane = plane;
        self
    }

    /// Set the slice half-width.
    #[must_use]
    pub const fn with_half_width(mut self, half_width: f64) -> Self {
        self.half_width = half_width;
        self
    }

    /// Replace the candidate list.
    #[must_use]
    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = Candidate>) -> Self {
        self.candidates = candidates.into_iter().collect();
        self
    }

    /// Set or clear the sanity ceiling.
    #[must_use]
    pub const fn with_sanity_ceiling(mut self, ceiling: Option<f64>) -> Self {
        self.sanity_ceiling = ceiling;
        self
    }

    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::InvalidConfig`] if the axes overlap, the
    /// half-width is not positive, a slicing key has no candidates, or a
    /// candidate is out of range.
    pub fn validate(&self, key: MeasurementKey) -> MeasureResult<()> {
        let axes = [self.up, self.plane.width_axis, self.plane.depth_axis];
        if axes[0] == axes[1] || axes[0] == axes[2] || axes[1] == axes[2] {
            return Err(MeasureError::invalid_config(
                key,
                "up, width and depth axes must be distinct",
            ));
        }
        if !(self.half_width.is_finite() && self.half_width > 0.0) {
            return Err(MeasureError::invalid_config(
                key,
                format!("half-width must be positive, got {}", self.half_width),
            ));
        }
        if let Some(ceiling) = self.sanity_ceiling {
            if !(ceiling.is_finite() && ceiling > 0.0) {
                return Err(MeasureError::invalid_config(
                    key,
                    format!("sanity ceiling must be positive, got {ceiling}"),
                ));
            }
        }
        if self.kind == MeasurementKind::Height {
            return Ok(());
        }
        if self.candidates.is_empty() {
            return Err(MeasureError::invalid_config(key, "no candidates"));
        }
        for (index, candidate) in self.candidates.iter().enumerate() {
            if !candidate.fraction.is_finite() {
                return Err(MeasureError::invalid_config(
                    key,
                    format!("candidate {index} has a non-finite height"),
                ));
            }
            if let Strategy::BandPeak { span, steps } | Strategy::BandTrough { span, steps } =
                candidate.strategy
            {
                if !(span.is_finite() && span > 0.0) || steps < 2 {
                    return Err(MeasureError::invalid_config(
                        key,
                        format!("candidate {index} needs a positive span and at least 2 steps"),
                    ));
                }
            }
        }
        Ok(())
    }
}

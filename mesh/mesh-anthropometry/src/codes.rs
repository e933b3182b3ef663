//! Closed vocabulary of warning and reason codes.
//!
//! The string forms are stable identifiers consumed by downstream reporting;
//! renaming one is a breaking change.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A warning or failure-reason code attached to a measurement result.
///
/// Warnings (upper-case) annotate an otherwise valid value. Reasons
/// (lower-case) explain why a value is NaN. [`Code::ExecFail`] is both: it is
/// the warning stamped on every key of a failed case and the reason of a key
/// whose own computation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Code {
    /// Units were inferred as millimeters from coordinate magnitude.
    #[cfg_attr(feature = "serde", serde(rename = "SCALE_ASSUMED_MM_TO_M"))]
    ScaleAssumedMmToM,
    /// Value exceeds the key's sanity ceiling. Reported, never clamped.
    #[cfg_attr(feature = "serde", serde(rename = "PERIMETER_LARGE"))]
    PerimeterLarge,
    /// Fallback polar ordering was used; point order is not hull-verified.
    #[cfg_attr(feature = "serde", serde(rename = "ORDERING_SUSPECTED"))]
    OrderingSuspected,
    /// Slice points were collinear after projection.
    #[cfg_attr(feature = "serde", serde(rename = "PROJECTION_SUSPECTED"))]
    ProjectionSuspected,
    /// Execution failed at the key or case boundary.
    #[cfg_attr(feature = "serde", serde(rename = "EXEC_FAIL"))]
    ExecFail,
    /// The slice band lies outside the mesh, or the mesh has no vertices.
    #[cfg_attr(feature = "serde", serde(rename = "mesh_empty_at_height"))]
    MeshEmptyAtHeight,
    /// The slice band contains no points.
    #[cfg_attr(feature = "serde", serde(rename = "empty_slice"))]
    EmptySlice,
    /// The slice has points but none inside the requested region.
    #[cfg_attr(feature = "serde", serde(rename = "no_vertices_in_region"))]
    NoVerticesInRegion,
    /// The mesh-loading collaborator failed to produce vertices.
    #[cfg_attr(feature = "serde", serde(rename = "load_failed"))]
    LoadFailed,
    /// Input could not be interpreted (bad unit, malformed coordinates).
    #[cfg_attr(feature = "serde", serde(rename = "parse_error"))]
    ParseError,
}

impl Code {
    /// Every code, in vocabulary order.
    pub const ALL: [Self; 10] = [
        Self::ScaleAssumedMmToM,
        Self::PerimeterLarge,
        Self::OrderingSuspected,
        Self::ProjectionSuspected,
        Self::ExecFail,
        Self::MeshEmptyAtHeight,
        Self::EmptySlice,
        Self::NoVerticesInRegion,
        Self::LoadFailed,
        Self::ParseError,
    ];

    /// Stable string identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScaleAssumedMmToM => "SCALE_ASSUMED_MM_TO_M",
            Self::PerimeterLarge => "PERIMETER_LARGE",
            Self::OrderingSuspected => "ORDERING_SUSPECTED",
            Self::ProjectionSuspected => "PROJECTION_SUSPECTED",
            Self::ExecFail => "EXEC_FAIL",
            Self::MeshEmptyAtHeight => "mesh_empty_at_height",
            Self::EmptySlice => "empty_slice",
            Self::NoVerticesInRegion => "no_vertices_in_region",
            Self::LoadFailed => "load_failed",
            Self::ParseError => "parse_error",
        }
    }

    /// Parse a stable identifier back into a code.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Whether this code may explain a NaN value.
    #[must_use]
    pub const fn is_reason(self) -> bool {
        matches!(
            self,
            Self::ExecFail
                | Self::MeshEmptyAtHeight
                | Self::EmptySlice
                | Self::NoVerticesInRegion
                | Self::LoadFailed
                | Self::ParseError
        )
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

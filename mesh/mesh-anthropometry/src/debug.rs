//! Structured per-result diagnostics.
//!
//! Every [`MeasurementResult`](crate::MeasurementResult) carries a
//! [`DebugRecord`], success or failure, so a value can always be traced back
//! to the slice and path that produced it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds3;
use crate::codes::Code;
use crate::perimeter::{Method, PerimeterResult, SegmentStats};
use crate::units::NormalizedMesh;

/// Outcome of one selector candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttemptOutcome {
    /// The candidate produced this value and was kept.
    Accepted(f64),
    /// The candidate was skipped for this reason.
    Rejected(Code),
}

/// One candidate tried by the selector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateAttempt {
    /// Position in the key's candidate list.
    pub index: usize,
    /// Absolute slice height in meters (the chosen height for band scans).
    pub height: f64,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// Diagnostics attached to every measurement result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugRecord {
    /// Points entering the final computation (slice or whole mesh).
    pub raw_count: usize,
    /// Points left after dedupe.
    pub dedupe_count: usize,
    /// Mesh bounds before unit scaling.
    pub bounds_raw: Bounds3,
    /// Mesh bounds after unit scaling.
    pub bounds_scaled: Bounds3,
    /// Factor applied by the unit normalizer.
    pub scale_factor: f64,
    /// Segment length statistics of the measured loop.
    pub segments: Option<SegmentStats>,
    /// Segments longer than the jump threshold.
    pub jump_count: usize,
    /// Path that produced the value.
    pub method: Option<Method>,
    /// Whether the perimeter fallback ran.
    pub fallback: bool,
    /// Why the fallback ran.
    pub fallback_reason: Option<Code>,
    /// Index of the accepted candidate.
    pub chosen_candidate: Option<usize>,
    /// Height of the accepted slice in meters.
    pub chosen_height: Option<f64>,
    /// Every candidate tried, in order.
    pub attempts: Vec<CandidateAttempt>,
    /// Error message when the computation failed outright.
    pub error: Option<String>,
}

impl Default for DebugRecord {
    fn default() -> Self {
        Self {
            raw_count: 0,
            dedupe_count: 0,
            bounds_raw: Bounds3::empty(),
            bounds_scaled: Bounds3::empty(),
            scale_factor: 1.0,
            segments: None,
            jump_count: 0,
            method: None,
            fallback: false,
            fallback_reason: None,
            chosen_candidate: None,
            chosen_height: None,
            attempts: Vec::new(),
            error: None,
        }
    }
}

impl DebugRecord {
    /// A record seeded with the case-level scaling information.
    #[must_use]
    pub fn for_mesh(mesh: &NormalizedMesh) -> Self {
        Self {
            bounds_raw: mesh.bounds_raw,
            bounds_scaled: mesh.bounds_scaled,
            scale_factor: mesh.scale,
            ..Self::default()
        }
    }

    /// A record describing a failure that happened before or outside the
    /// geometry chain.
    #[must_use]
    pub fn for_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Copy the perimeter evaluator's counts and statistics.
    pub fn record_perimeter(&mut self, perimeter: &PerimeterResult) {
        self.raw_count = perimeter.raw_count;
        self.dedupe_count = perimeter.dedupe_count;
        self.segments = perimeter.segments;
        self.jump_count = perimeter.jump_count;
        self.method = Some(perimeter.method);
        self.fallback = perimeter.is_fallback();
        self.fallback_reason = perimeter.fallback_reason;
    }

    /// Record the point counts and method of a non-perimeter value.
    pub fn record_counts(&mut self, raw_count: usize, dedupe_count: usize, method: Method) {
        self.raw_count = raw_count;
        self.dedupe_count = dedupe_count;
        self.method = Some(method);
    }

    /// Record the accepted candidate.
    pub fn record_choice(&mut self, index: usize, height: f64) {
        self.chosen_candidate = Some(index);
        self.chosen_height = Some(height);
    }

    /// Reason of the last rejected attempt, if the last attempt was rejected.
    #[must_use]
    pub fn last_rejection(&self) -> Option<Code> {
        match self.attempts.last()?.outcome {
            AttemptOutcome::Rejected(code) => Some(code),
            AttemptOutcome::Accepted(_) => None,
        }
    }
}

//! Closed-loop length of a planar slice.
//!
//! The preferred path measures the convex hull. When the hull is degenerate,
//! or compatibility mode forces it, the points are ordered by polar angle
//! around their centroid instead and the fallback is reported with a reason
//! code. Values are never clamped; an oversized value only gains a warning.

// Point counts are far below 2^52.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use nalgebra::{Point2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codes::Code;
use crate::dedupe::dedupe_planar;
use crate::error::{MeasureError, MeasureResult};
use crate::hull::{ConvexHull, DegenerateKind, closed_segments, convex_hull};

/// How a perimeter (or other value) was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Method {
    /// Perimeter of the monotone-chain convex hull.
    ConvexHull,
    /// Perimeter of points sorted by polar angle around their centroid.
    PolarSort,
    /// Extent of a slice along one plane axis.
    PlanarExtent,
    /// Extent of the whole mesh along the up axis.
    VerticalSpan,
}

/// Length statistics of the segments of a closed loop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentStats {
    /// Shortest segment.
    pub min: f64,
    /// Mean segment length.
    pub mean: f64,
    /// Longest segment.
    pub max: f64,
    /// 95th percentile (nearest rank).
    pub p95: f64,
    /// Number of segments.
    pub count: usize,
}

impl SegmentStats {
    /// Statistics of `lengths`; `None` when empty.
    #[must_use]
    pub fn from_lengths(lengths: &[f64]) -> Option<Self> {
        if lengths.is_empty() {
            return None;
        }
        let mut sorted = lengths.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let rank = ((0.95 * n as f64).ceil() as usize).clamp(1, n);
        Some(Self {
            min: sorted[0],
            mean: sorted.iter().sum::<f64>() / n as f64,
            max: sorted[n - 1],
            p95: sorted[rank - 1],
            count: n,
        })
    }
}

/// Tunables for [`evaluate_perimeter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerimeterParams {
    /// Dedupe quantization step.
    pub dedupe_epsilon: f64,
    /// Segments longer than `jump_factor × mean` are jumps.
    pub jump_factor: f64,
    /// Skip the hull and use polar ordering.
    pub force_fallback: bool,
    /// Values above this gain `PERIMETER_LARGE`.
    pub sanity_ceiling: Option<f64>,
}

impl Default for PerimeterParams {
    fn default() -> Self {
        Self {
            dedupe_epsilon: 1e-6,
            jump_factor: 10.0,
            force_fallback: false,
            sanity_ceiling: None,
        }
    }
}

/// A closed-loop length and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct PerimeterResult {
    /// Non-negative loop length.
    pub length: f64,
    /// Path used.
    pub method: Method,
    /// Points before dedupe.
    pub raw_count: usize,
    /// Points after dedupe.
    pub dedupe_count: usize,
    /// Segment statistics; `None` when fewer than two points remain.
    pub segments: Option<SegmentStats>,
    /// Segments longer than `jump_factor × mean`.
    pub jump_count: usize,
    /// Why the fallback path ran, if it did.
    pub fallback_reason: Option<Code>,
    /// Warnings raised (fallback reason, `PERIMETER_LARGE`).
    pub warnings: Vec<Code>,
}

impl PerimeterResult {
    /// Whether the polar-sort fallback produced this value.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Measure the closed-loop length of a planar slice.
///
/// # Errors
///
/// Returns [`MeasureError::NonFinite`] if the length overflows.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::{evaluate_perimeter, Method, PerimeterParams};
/// use nalgebra::Point2;
///
/// let square = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// let result = evaluate_perimeter(&square, &PerimeterParams::default()).unwrap();
///
/// assert!((result.length - 4.0).abs() < 1e-12);
/// assert_eq!(result.method, Method::ConvexHull);
/// assert!(!result.is_fallback());
/// ```
pub fn evaluate_perimeter(
    points: &[Point2<f64>],
    params: &PerimeterParams,
) -> MeasureResult<PerimeterResult> {
    let unique = dedupe_planar(points, params.dedupe_epsilon);

    let hull = if params.force_fallback {
        None
    } else {
        Some(convex_hull(&unique))
    };

    let (loop_points, method, fallback_reason) = match hull {
        Some(ConvexHull::Polygon(vertices)) => (vertices, Method::ConvexHull, None),
        Some(ConvexHull::Degenerate(DegenerateKind::Collinear)) => (
            polar_order(&unique),
            Method::PolarSort,
            Some(Code::ProjectionSuspected),
        ),
        Some(ConvexHull::Degenerate(DegenerateKind::TooFewPoints)) | None => (
            polar_order(&unique),
            Method::PolarSort,
            Some(Code::OrderingSuspected),
        ),
    };

    let lengths: Vec<f64> = closed_segments(&loop_points).collect();
    let length: f64 = lengths.iter().sum();
    if !length.is_finite() {
        return Err(MeasureError::non_finite(format!(
            "perimeter of {} points",
            loop_points.len()
        )));
    }

    let segments = SegmentStats::from_lengths(&lengths);
    let jump_count = segments.map_or(0, |s| {
        let limit = params.jump_factor * s.mean;
        lengths.iter().filter(|&&l| l > limit).count()
    });

    let mut warnings = Vec::new();
    warnings.extend(fallback_reason);
    if params.sanity_ceiling.is_some_and(|ceiling| length > ceiling) {
        warnings.push(Code::PerimeterLarge);
    }

    Ok(PerimeterResult {
        length,
        method,
        raw_count: points.len(),
        dedupe_count: unique.len(),
        segments,
        jump_count,
        fallback_reason,
        warnings,
    })
}

/// Order points by polar angle around their centroid.
///
/// Equal angles are broken by distance from the centroid, then by input
/// index, so the order is total and stable.
#[must_use]
pub fn polar_order(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if points.is_empty() {
        return Vec::new();
    }
    let n = points.len() as f64;
    let centroid = Point2::from(points.iter().map(|p| p.coords).sum::<Vector2<f64>>() / n);

    let mut keyed: Vec<(f64, f64, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let d = p - centroid;
            (d.y.atan2(d.x), d.norm(), i)
        })
        .collect();
    keyed.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });
    keyed.into_iter().map(|(_, _, i)| points[i]).collect()
}

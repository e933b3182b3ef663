//! 2D convex hull by Andrew's monotone chain.

use nalgebra::Point2;

/// Why a point set has no proper hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateKind {
    /// Fewer than three points.
    TooFewPoints,
    /// Three or more points, all on one line (or coincident).
    Collinear,
}

/// Result of hull construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvexHull {
    /// Counter-clockwise polygon with at least three vertices and no
    /// collinear or repeated vertices.
    Polygon(Vec<Point2<f64>>),
    /// No polygon exists; the caller must fall back.
    Degenerate(DegenerateKind),
}

impl ConvexHull {
    /// Hull vertices, or `None` when degenerate.
    #[must_use]
    pub fn vertices(&self) -> Option<&[Point2<f64>]> {
        match self {
            Self::Polygon(v) => Some(v),
            Self::Degenerate(_) => None,
        }
    }

    /// Whether the hull is degenerate.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }
}

/// Z component of `(b - a) × (c - a)`; positive for a left turn.
#[must_use]
pub fn cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Compute the convex hull of `points`.
///
/// Points are sorted lexicographically by `(x, y)` before construction, so
/// the result does not depend on input order. Runs in `O(n log n)`.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::{convex_hull, ConvexHull, DegenerateKind};
/// use nalgebra::Point2;
///
/// let square = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.5, 0.5),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.0, 1.0),
/// ];
/// assert_eq!(convex_hull(&square).vertices().map(<[_]>::len), Some(4));
///
/// let line = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
/// assert_eq!(convex_hull(&line), ConvexHull::Degenerate(DegenerateKind::Collinear));
/// ```
#[must_use]
pub fn convex_hull(points: &[Point2<f64>]) -> ConvexHull {
    if points.len() < 3 {
        return ConvexHull::Degenerate(DegenerateKind::TooFewPoints);
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let lower = half_hull(sorted.iter());
    let upper = half_hull(sorted.iter().rev());

    // Each chain ends where the other begins.
    let mut hull = Vec::with_capacity(lower.len() + upper.len());
    hull.extend_from_slice(&lower[..lower.len() - 1]);
    hull.extend_from_slice(&upper[..upper.len() - 1]);

    if hull.len() < 3 {
        return ConvexHull::Degenerate(DegenerateKind::Collinear);
    }
    ConvexHull::Polygon(hull)
}

fn half_hull<'a>(points: impl Iterator<Item = &'a Point2<f64>>) -> Vec<Point2<f64>> {
    let mut chain: Vec<Point2<f64>> = Vec::new();
    for p in points {
        while chain.len() >= 2 && cross(&chain[chain.len() - 2], &chain[chain.len() - 1], p) <= 0.0
        {
            chain.pop();
        }
        chain.push(*p);
    }
    chain
}

/// Closed perimeter of a polygon given in order.
#[must_use]
pub fn polygon_perimeter(vertices: &[Point2<f64>]) -> f64 {
    closed_segments(vertices).sum()
}

/// Lengths of consecutive edges, including the closing edge.
pub(crate) fn closed_segments(vertices: &[Point2<f64>]) -> impl Iterator<Item = f64> + '_ {
    let n = vertices.len();
    let count = if n < 2 { 0 } else { n };
    (0..count).map(move |i| (vertices[(i + 1) % n] - vertices[i]).norm())
}

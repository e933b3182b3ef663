//! Near-duplicate removal for planar point sets.

// Cell indices are range-checked before the cast.
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashSet;
use nalgebra::Point2;

/// Collapse points that fall into the same `epsilon` grid cell.
///
/// The first point seen in each cell is kept, so the output order follows the
/// input order and is deterministic. Points too far out for an `i64` cell
/// index are never merged.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::dedupe_planar;
/// use nalgebra::Point2;
///
/// let points = [
///     Point2::new(0.0, 0.0),
///     Point2::new(0.0, 1e-9),
///     Point2::new(1.0, 0.0),
/// ];
/// let unique = dedupe_planar(&points, 1e-6);
/// assert_eq!(unique.len(), 2);
/// ```
#[must_use]
pub fn dedupe_planar(points: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| quantize(p, epsilon).is_none_or(|cell| seen.insert(cell)))
        .copied()
        .collect()
}

/// 2^63, the first magnitude an `i64` cannot hold.
const CELL_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn quantize(p: &Point2<f64>, epsilon: f64) -> Option<(i64, i64)> {
    Some((cell_index(p.x / epsilon)?, cell_index(p.y / epsilon)?))
}

fn cell_index(q: f64) -> Option<i64> {
    let q = q.round();
    (q.is_finite() && q.abs() < CELL_LIMIT).then(|| q as i64)
}

//! Band slicing of vertex clouds.
//!
//! A body scan is a point cloud without reliable faces, so a cross-section is
//! approximated by every vertex within a thin band around the target height,
//! projected onto the measurement plane.

use nalgebra::{Point2, Point3};

use crate::error::{MeasureError, MeasureResult};
use crate::key::{Axis, Plane, Region};

/// A height band along the up axis.
///
/// Always has a finite center and a finite, strictly positive half-width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceBand {
    height: f64,
    half_width: f64,
}

impl SliceBand {
    /// Create a band.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::InvalidBand`] if `half_width <= 0` or either
    /// value is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_anthropometry::SliceBand;
    ///
    /// assert!(SliceBand::new(1.2, 0.005).is_ok());
    /// assert!(SliceBand::new(1.2, 0.0).is_err());
    /// ```
    pub fn new(height: f64, half_width: f64) -> MeasureResult<Self> {
        if !(height.is_finite() && half_width.is_finite() && half_width > 0.0) {
            return Err(MeasureError::InvalidBand { height, half_width });
        }
        Ok(Self { height, half_width })
    }

    /// Band center.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Band half-width.
    #[must_use]
    pub const fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Whether `value` lies within the band (inclusive).
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (value - self.height).abs() <= self.half_width
    }

    /// Whether the band overlaps `[min, max]`.
    #[must_use]
    pub fn overlaps(&self, min: f64, max: f64) -> bool {
        self.height + self.half_width >= min && self.height - self.half_width <= max
    }
}

/// Points projected onto the measurement plane. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanarPointSet {
    /// Projected points, in input order.
    pub points: Vec<Point2<f64>>,
}

impl PlanarPointSet {
    /// Wrap a list of planar points.
    #[must_use]
    pub const fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(min, max)` of planar `x` (width) or `y` (depth); `None` when empty.
    #[must_use]
    pub fn extent(&self, along_width: bool) -> Option<(f64, f64)> {
        let coord = |p: &Point2<f64>| if along_width { p.x } else { p.y };
        let mut iter = self.points.iter().map(coord);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Keep only the points of `region`, split at the width-axis center of
    /// the slice's bounding box.
    #[must_use]
    pub fn restrict(self, region: Region) -> Self {
        let Some((lo, hi)) = self.extent(true) else {
            return self;
        };
        let center = 0.5 * (lo + hi);
        match region {
            Region::Whole => self,
            Region::Left => Self::new(self.points.into_iter().filter(|p| p.x < center).collect()),
            Region::Right => Self::new(self.points.into_iter().filter(|p| p.x > center).collect()),
        }
    }
}

/// Extract the points within `band` along `up` and project them on `plane`.
///
/// Returns an empty set when nothing falls in the band.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::{slice_points, Axis, Plane, Point3, SliceBand};
///
/// let points = [
///     Point3::new(1.0, 2.0, 0.50),
///     Point3::new(3.0, 4.0, 0.90),
/// ];
/// let band = SliceBand::new(0.5, 0.01).unwrap();
/// let slice = slice_points(&points, &band, Axis::Z, Plane::XY);
///
/// assert_eq!(slice.len(), 1);
/// assert_eq!((slice.points[0].x, slice.points[0].y), (1.0, 2.0));
/// ```
#[must_use]
pub fn slice_points(
    points: &[Point3<f64>],
    band: &SliceBand,
    up: Axis,
    plane: Plane,
) -> PlanarPointSet {
    let (u, w, d) = (up.index(), plane.width_axis.index(), plane.depth_axis.index());
    PlanarPointSet::new(
        points
            .iter()
            .filter(|p| band.contains(p[u]))
            .map(|p| Point2::new(p[w], p[d]))
            .collect(),
    )
}

//! Axis-aligned bounding-box statistics for vertex clouds.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::key::Axis;

/// Axis-aligned bounds of a point set.
///
/// Stored as plain arrays so the record serializes without pulling nalgebra's
/// serde support into the diagnostics output.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::{Bounds3, Point3};
///
/// let points = [Point3::new(0.0, -2.0, 1.0), Point3::new(3.0, 4.0, -5.0)];
/// let bounds = Bounds3::from_points(points.iter());
///
/// assert_eq!(bounds.min, [0.0, -2.0, -5.0]);
/// assert_eq!(bounds.max, [3.0, 4.0, 1.0]);
/// assert!((bounds.max_abs() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds3 {
    /// Minimum corner.
    pub min: [f64; 3],
    /// Maximum corner.
    pub max: [f64; 3],
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds3 {
    /// Bounds containing nothing (min > max on every axis).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Bounds of an iterator of points; empty for an empty iterator.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand_to_include(p);
        }
        bounds
    }

    /// Grow the bounds to contain `point`.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(point[i]);
            self.max[i] = self.max[i].max(point[i]);
        }
    }

    /// Whether no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    /// Extent along each axis; zero for empty bounds.
    #[must_use]
    pub fn size(&self) -> [f64; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Largest absolute coordinate magnitude; zero for empty bounds.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.min
            .iter()
            .chain(self.max.iter())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// `(min, max)` along one axis.
    #[must_use]
    pub const fn range(&self, axis: Axis) -> (f64, f64) {
        let i = axis.index();
        (self.min[i], self.max[i])
    }

    /// Bounds with every coordinate multiplied by `factor` (`factor > 0`).
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min.map(|v| v * factor),
            max: self.max.map(|v| v * factor),
        }
    }
}

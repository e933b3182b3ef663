//! Unit normalization of raw vertex coordinates to meters.
//!
//! A declared unit is applied exactly. Without one, a single fixed heuristic
//! applies: coordinates whose largest magnitude exceeds the millimeter
//! threshold are divided by 1000 and flagged `SCALE_ASSUMED_MM_TO_M`. The
//! normalizer never guesses beyond that rule.

use nalgebra::Point3;

use crate::bounds::Bounds3;
use crate::codes::Code;
use crate::config::UnitPolicy;
use crate::error::{MeasureError, MeasureResult};

/// Vertices scaled to meters, with the scale that was applied.
#[derive(Debug, Clone)]
pub struct NormalizedMesh {
    /// Vertices in meters.
    pub points: Vec<Point3<f64>>,
    /// Factor applied to the raw coordinates.
    pub scale: f64,
    /// `SCALE_ASSUMED_MM_TO_M` when the scale was inferred heuristically.
    pub warning: Option<Code>,
    /// Bounds of the raw coordinates.
    pub bounds_raw: Bounds3,
    /// Bounds after scaling.
    pub bounds_scaled: Bounds3,
}

/// Parse a declared unit string into a meters-per-unit factor.
///
/// # Errors
///
/// Returns [`MeasureError::UnknownUnit`] for anything other than meters,
/// centimeters, or millimeters.
pub fn unit_factor(unit: &str) -> MeasureResult<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "m" | "meter" | "meters" | "metre" | "metres" => Ok(1.0),
        "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => Ok(0.01),
        "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => Ok(0.001),
        _ => Err(MeasureError::UnknownUnit(unit.to_string())),
    }
}

/// Scale raw vertices to meters.
///
/// # Errors
///
/// Returns [`MeasureError::NonFiniteVertex`] if any coordinate is NaN or
/// infinite, and [`MeasureError::UnknownUnit`] for an unreadable unit.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::{normalize_units, Code, UnitPolicy};
///
/// let raw = [[0.0, 0.0, 0.0], [100.0, 50.0, 1700.0]];
/// let mesh = normalize_units(&raw, None, &UnitPolicy::default()).unwrap();
///
/// assert!((mesh.scale - 0.001).abs() < 1e-12);
/// assert_eq!(mesh.warning, Some(Code::ScaleAssumedMmToM));
/// assert!((mesh.points[1].z - 1.7).abs() < 1e-12);
/// ```
pub fn normalize_units(
    vertices: &[[f64; 3]],
    declared_unit: Option<&str>,
    policy: &UnitPolicy,
) -> MeasureResult<NormalizedMesh> {
    if let Some(index) = vertices
        .iter()
        .position(|v| v.iter().any(|c| !c.is_finite()))
    {
        return Err(MeasureError::NonFiniteVertex { index });
    }

    let raw: Vec<Point3<f64>> = vertices
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect();
    let bounds_raw = Bounds3::from_points(raw.iter());

    let (scale, warning) = match declared_unit {
        Some(unit) => (unit_factor(unit)?, None),
        None => infer_scale(bounds_raw.max_abs(), policy),
    };

    let points = if (scale - 1.0).abs() < f64::EPSILON {
        raw
    } else {
        raw.into_iter().map(|p| Point3::from(p.coords * scale)).collect()
    };

    Ok(NormalizedMesh {
        points,
        scale,
        warning,
        bounds_raw,
        bounds_scaled: bounds_raw.scaled(scale),
    })
}

fn infer_scale(max_abs: f64, policy: &UnitPolicy) -> (f64, Option<Code>) {
    if max_abs <= policy.mm_threshold {
        return (1.0, None);
    }
    if max_abs / 1000.0 > policy.max_plausible_m {
        // Out of range for the heuristic: leave the data alone but say so.
        return (1.0, Some(Code::ScaleAssumedMmToM));
    }
    (0.001, Some(Code::ScaleAssumedMmToM))
}

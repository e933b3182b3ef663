//! Candidate selection per measurement key.
//!
//! Candidates are tried strictly in configuration order and the first one
//! whose slice is non-empty and whose computation completes wins. Rejections
//! are values, not errors: each one records a reason code and the loop moves
//! on. When every candidate is rejected the key fails with the reason of the
//! last attempt.

// Step counts are tiny.
#![allow(clippy::cast_precision_loss)]

use tracing::{debug, warn};

use crate::codes::Code;
use crate::config::MeasurementConfig;
use crate::debug::{AttemptOutcome, CandidateAttempt, DebugRecord};
use crate::dedupe::dedupe_planar;
use crate::error::{MeasureError, MeasureResult};
use crate::key::{Candidate, KeyConfig, MeasurementKey, MeasurementKind, Strategy};
use crate::perimeter::{Method, PerimeterParams, PerimeterResult, evaluate_perimeter};
use crate::result::MeasurementResult;
use crate::slice::{PlanarPointSet, SliceBand, slice_points};
use crate::units::NormalizedMesh;

/// A value computed from one slice.
#[derive(Debug, Clone)]
struct Measured {
    value: f64,
    height: f64,
    raw_count: usize,
    dedupe_count: usize,
    method: Method,
    perimeter: Option<PerimeterResult>,
    warnings: Vec<Code>,
}

impl Measured {
    /// Whether the value came from the preferred path (no perimeter fallback).
    fn is_trusted(&self) -> bool {
        self.perimeter.as_ref().is_none_or(|p| !p.is_fallback())
    }
}

/// What one candidate produced.
#[derive(Debug, Clone)]
enum CandidateOutcome {
    Accepted(Measured),
    Rejected { height: f64, reason: Code },
}

/// Resolve one key against a normalized mesh.
///
/// Geometric failures come back as a NaN [`MeasurementResult`] with a reason.
///
/// # Errors
///
/// Returns [`MeasureError::InvalidConfig`] for an inconsistent `key_config`.
/// Otherwise an error means the chain itself failed (invalid band, non-finite
/// arithmetic); the façade folds that into an `EXEC_FAIL` result.
pub fn resolve_key(
    key: MeasurementKey,
    key_config: &KeyConfig,
    mesh: &NormalizedMesh,
    config: &MeasurementConfig,
) -> MeasureResult<MeasurementResult> {
    key_config.validate(key)?;

    let base_warnings: Vec<Code> = mesh.warning.into_iter().collect();
    let mut record = DebugRecord::for_mesh(mesh);

    if mesh.points.is_empty() {
        return Ok(MeasurementResult::failed(
            Code::MeshEmptyAtHeight,
            base_warnings,
            record,
        ));
    }

    let (min_up, max_up) = mesh.bounds_scaled.range(key_config.up);

    if key_config.kind == MeasurementKind::Height {
        let span = max_up - min_up;
        if !span.is_finite() {
            return Err(MeasureError::non_finite(format!("{key} vertical span")));
        }
        record.record_counts(mesh.points.len(), mesh.points.len(), Method::VerticalSpan);
        return Ok(MeasurementResult::measured(span, base_warnings, record));
    }

    let params = PerimeterParams {
        dedupe_epsilon: config.dedupe_epsilon,
        jump_factor: config.jump_factor,
        force_fallback: config.compat_mode,
        sanity_ceiling: key_config.sanity_ceiling,
    };

    for (index, candidate) in key_config.candidates.iter().enumerate() {
        match evaluate_candidate(key, candidate, key_config, mesh, (min_up, max_up), &params)? {
            CandidateOutcome::Accepted(measured) => {
                debug!(
                    key = %key,
                    candidate = index,
                    height = measured.height,
                    value = measured.value,
                    "candidate accepted"
                );
                record.attempts.push(CandidateAttempt {
                    index,
                    height: measured.height,
                    outcome: AttemptOutcome::Accepted(measured.value),
                });
                record.record_choice(index, measured.height);
                match &measured.perimeter {
                    Some(perimeter) => {
                        record.record_perimeter(perimeter);
                        if let Some(reason) = perimeter.fallback_reason {
                            warn!(key = %key, reason = %reason, "perimeter fallback used");
                        }
                    }
                    None => {
                        record.record_counts(measured.raw_count, measured.dedupe_count, measured.method);
                    }
                }
                let warnings = base_warnings.into_iter().chain(measured.warnings);
                return Ok(MeasurementResult::measured(measured.value, warnings, record));
            }
            CandidateOutcome::Rejected { height, reason } => {
                debug!(key = %key, candidate = index, height, reason = %reason, "candidate rejected");
                record.attempts.push(CandidateAttempt {
                    index,
                    height,
                    outcome: AttemptOutcome::Rejected(reason),
                });
            }
        }
    }

    let reason = record.last_rejection().unwrap_or(Code::EmptySlice);
    debug!(key = %key, reason = %reason, "all candidates exhausted");
    Ok(MeasurementResult::failed(reason, base_warnings, record))
}

/// Heights scanned by a candidate, lowest first.
fn scan_heights(candidate: &Candidate, min_up: f64, extent: f64) -> Vec<f64> {
    let center = candidate.fraction.mul_add(extent, min_up);
    match candidate.strategy {
        Strategy::Fixed => vec![center],
        Strategy::BandPeak { span, steps } | Strategy::BandTrough { span, steps } => {
            let half = span * extent;
            let step = 2.0 * half / (steps - 1) as f64;
            (0..steps)
                .map(|i| (i as f64).mul_add(step, center - half))
                .collect()
        }
    }
}

/// How far a rejected slice got; the furthest stage explains a band failure.
const fn rejection_rank(reason: Code) -> u8 {
    match reason {
        Code::NoVerticesInRegion => 2,
        Code::EmptySlice => 1,
        _ => 0,
    }
}

fn evaluate_candidate(
    key: MeasurementKey,
    candidate: &Candidate,
    key_config: &KeyConfig,
    mesh: &NormalizedMesh,
    (min_up, max_up): (f64, f64),
    params: &PerimeterParams,
) -> MeasureResult<CandidateOutcome> {
    let extent = max_up - min_up;
    let heights = scan_heights(candidate, min_up, extent);
    let center = candidate.fraction.mul_add(extent, min_up);

    let mut best: Option<Measured> = None;
    let mut rejection = (Code::MeshEmptyAtHeight, center);

    for height in heights {
        let band = SliceBand::new(height, key_config.half_width)?;
        let reason = if band.overlaps(min_up, max_up) {
            let slice = slice_points(&mesh.points, &band, key_config.up, key_config.plane);
            if slice.is_empty() {
                Code::EmptySlice
            } else {
                let region = slice.restrict(candidate.region);
                if region.is_empty() {
                    Code::NoVerticesInRegion
                } else {
                    let measured = measure_slice(key, key_config.kind, &region, height, params)?;
                    best = Some(match best {
                        None => measured,
                        Some(current) => pick(candidate.strategy, current, measured),
                    });
                    continue;
                }
            }
        } else {
            Code::MeshEmptyAtHeight
        };

        if rejection_rank(reason) > rejection_rank(rejection.0) {
            rejection = (reason, height);
        }
    }

    Ok(match best {
        Some(measured) => CandidateOutcome::Accepted(measured),
        None => CandidateOutcome::Rejected {
            height: rejection.1,
            reason: rejection.0,
        },
    })
}

/// Keep the better of two band samples; ties keep the lower (earlier) one.
///
/// A sample measured on the preferred path always beats a fallback sample,
/// whatever the values.
fn pick(strategy: Strategy, current: Measured, next: Measured) -> Measured {
    let replace = match (current.is_trusted(), next.is_trusted()) {
        (false, true) => true,
        (true, false) => false,
        _ => match strategy {
            Strategy::Fixed => false,
            Strategy::BandPeak { .. } => next.value > current.value,
            Strategy::BandTrough { .. } => next.value < current.value,
        },
    };
    if replace { next } else { current }
}

fn measure_slice(
    key: MeasurementKey,
    kind: MeasurementKind,
    slice: &PlanarPointSet,
    height: f64,
    params: &PerimeterParams,
) -> MeasureResult<Measured> {
    match kind {
        MeasurementKind::Circumference => {
            let perimeter = evaluate_perimeter(&slice.points, params)?;
            Ok(Measured {
                value: perimeter.length,
                height,
                raw_count: perimeter.raw_count,
                dedupe_count: perimeter.dedupe_count,
                method: perimeter.method,
                warnings: perimeter.warnings.clone(),
                perimeter: Some(perimeter),
            })
        }
        MeasurementKind::Width | MeasurementKind::Depth => {
            let unique = PlanarPointSet::new(dedupe_planar(&slice.points, params.dedupe_epsilon));
            let along_width = kind == MeasurementKind::Width;
            let (lo, hi) = unique
                .extent(along_width)
                .ok_or_else(|| MeasureError::non_finite(format!("{key} extent of empty slice")))?;
            let value = hi - lo;
            if !value.is_finite() {
                return Err(MeasureError::non_finite(format!("{key} extent")));
            }
            Ok(Measured {
                value,
                height,
                raw_count: slice.len(),
                dedupe_count: unique.len(),
                method: Method::PlanarExtent,
                perimeter: None,
                warnings: Vec::new(),
            })
        }
        MeasurementKind::Height => Err(MeasureError::invalid_config(
            key,
            "height keys measure the whole mesh, not a slice",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitPolicy;
    use crate::key::Region;
    use crate::units::normalize_units;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    /// Rings of `n` points at the given heights with the given radii.
    fn rings(levels: &[(f64, f64)], n: usize) -> NormalizedMesh {
        let mut raw = Vec::new();
        for &(z, r) in levels {
            for i in 0..n {
                let t = 2.0 * PI * i as f64 / n as f64;
                raw.push([r * t.cos(), r * t.sin(), z]);
            }
        }
        normalize_units(&raw, Some("m"), &UnitPolicy::default()).unwrap()
    }

    fn circ(candidates: Vec<Candidate>) -> KeyConfig {
        KeyConfig::circumference(5.0)
            .with_half_width(0.01)
            .with_candidates(candidates)
    }

    #[test]
    fn test_empty_slice_advances_to_next_candidate() {
        let mesh = rings(&[(0.0, 0.1), (1.0, 0.2)], 64);
        let config = MeasurementConfig::empty();
        let key_config = circ(vec![Candidate::fixed(0.5), Candidate::fixed(1.0)]);

        let result = resolve_key(MeasurementKey::WaistCirc, &key_config, &mesh, &config).unwrap();

        assert!(!result.is_nan());
        assert_relative_eq!(result.value, 2.0 * PI * 0.2, max_relative = 0.01);
        assert_eq!(result.debug.attempts.len(), 2);
        assert_eq!(
            result.debug.attempts[0].outcome,
            AttemptOutcome::Rejected(Code::EmptySlice)
        );
        assert_eq!(result.debug.chosen_candidate, Some(1));
        assert_eq!(result.debug.method, Some(Method::ConvexHull));
    }

    #[test]
    fn test_all_candidates_fail_with_last_reason() {
        let mesh = rings(&[(0.0, 0.1), (1.0, 0.2)], 16);
        let config = MeasurementConfig::empty();
        let key_config = circ(vec![Candidate::fixed(0.5), Candidate::fixed(3.0)]);

        let result = resolve_key(MeasurementKey::HipCirc, &key_config, &mesh, &config).unwrap();

        assert!(result.is_nan());
        assert_eq!(result.reason, Some(Code::MeshEmptyAtHeight));
        assert_eq!(result.debug.chosen_candidate, None);
        assert_eq!(result.debug.attempts.len(), 2);
    }

    #[test]
    fn test_region_without_vertices() {
        // A single vertical line of points: every slice has one point at x = 0.
        let raw: Vec<[f64; 3]> = (0..=10).map(|i| [0.0, 0.0, f64::from(i) * 0.1]).collect();
        let mesh = normalize_units(&raw, None, &UnitPolicy::default()).unwrap();
        let key_config = circ(vec![Candidate::fixed(0.5).in_region(Region::Left)]);

        let result = resolve_key(
            MeasurementKey::ThighCirc,
            &key_config,
            &mesh,
            &MeasurementConfig::empty(),
        )
        .unwrap();

        assert_eq!(result.reason, Some(Code::NoVerticesInRegion));
    }

    #[test]
    fn test_band_peak_and_trough() {
        let levels = [(0.0, 0.10), (0.4, 0.12), (0.5, 0.20), (0.6, 0.11), (1.0, 0.10)];
        let mesh = rings(&levels, 48);
        let config = MeasurementConfig::empty();

        let peak = circ(vec![Candidate::peak(0.5, 0.1, 3)]);
        let result = resolve_key(MeasurementKey::BustCirc, &peak, &mesh, &config).unwrap();
        assert_relative_eq!(result.debug.chosen_height.unwrap(), 0.5, epsilon = 1e-9);

        let trough = circ(vec![Candidate::trough(0.5, 0.1, 3)]);
        let result = resolve_key(MeasurementKey::WaistCirc, &trough, &mesh, &config).unwrap();
        assert_relative_eq!(result.debug.chosen_height.unwrap(), 0.6, epsilon = 1e-9);
    }

    #[test]
    fn test_band_prefers_hull_slices_over_fallback() {
        let mut raw = Vec::new();
        for z in [0.0, 0.5, 0.6, 1.0] {
            for i in 0..48 {
                let t = 2.0 * PI * f64::from(i) / 48.0;
                raw.push([0.15 * t.cos(), 0.15 * t.sin(), z]);
            }
        }
        // A sparse level: two opposite points measure a short polar loop.
        raw.push([0.15, 0.0, 0.4]);
        raw.push([-0.15, 0.0, 0.4]);
        let mesh = normalize_units(&raw, Some("m"), &UnitPolicy::default()).unwrap();
        let key_config = circ(vec![Candidate::trough(0.5, 0.1, 3)]);

        let result = resolve_key(
            MeasurementKey::WaistCirc,
            &key_config,
            &mesh,
            &MeasurementConfig::empty(),
        )
        .unwrap();

        assert_relative_eq!(result.value, 2.0 * PI * 0.15, max_relative = 0.01);
        assert_relative_eq!(result.debug.chosen_height.unwrap(), 0.5, epsilon = 1e-9);
        assert_eq!(result.debug.method, Some(Method::ConvexHull));
        assert!(!result.has_warning(Code::OrderingSuspected));
    }

    #[test]
    fn test_band_of_fallback_slices_still_measures() {
        let raw = [
            [0.1, 0.0, 0.0],
            [-0.1, 0.0, 0.0],
            [0.2, 0.0, 0.5],
            [-0.2, 0.0, 0.5],
            [0.3, 0.0, 1.0],
            [-0.3, 0.0, 1.0],
        ];
        let mesh = normalize_units(&raw, Some("m"), &UnitPolicy::default()).unwrap();
        let key_config = circ(vec![Candidate::peak(0.5, 0.5, 3)]);

        let result = resolve_key(
            MeasurementKey::HipCirc,
            &key_config,
            &mesh,
            &MeasurementConfig::empty(),
        )
        .unwrap();

        assert_relative_eq!(result.value, 1.2, epsilon = 1e-12);
        assert!(result.debug.fallback);
        assert!(result.has_warning(Code::OrderingSuspected));
    }

    #[test]
    fn test_invalid_band_config_is_rejected() {
        let mesh = rings(&[(0.0, 0.1), (1.0, 0.1)], 16);
        let key_config = circ(vec![Candidate::trough(0.5, 0.1, 0)]);

        let err = resolve_key(
            MeasurementKey::WaistCirc,
            &key_config,
            &mesh,
            &MeasurementConfig::empty(),
        )
        .unwrap_err();

        assert!(err.is_config_error());
    }

    #[test]
    fn test_width_and_depth() {
        let raw = [
            [-0.2, -0.1, 0.5],
            [0.2, 0.1, 0.5],
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let mesh = normalize_units(&raw, None, &UnitPolicy::default()).unwrap();
        let config = MeasurementConfig::empty();

        let width = KeyConfig::width().with_candidates([Candidate::fixed(0.5)]);
        let result = resolve_key(MeasurementKey::HipWidth, &width, &mesh, &config).unwrap();
        assert_relative_eq!(result.value, 0.4, epsilon = 1e-12);
        assert_eq!(result.debug.method, Some(Method::PlanarExtent));
        assert_eq!(result.debug.raw_count, 2);

        let depth = KeyConfig::depth().with_candidates([Candidate::fixed(0.5)]);
        let result = resolve_key(MeasurementKey::HipDepth, &depth, &mesh, &config).unwrap();
        assert_relative_eq!(result.value, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_height_is_vertical_span() {
        let mesh = rings(&[(0.1, 0.1), (1.8, 0.1)], 8);
        let result = resolve_key(
            MeasurementKey::Height,
            &KeyConfig::height(),
            &mesh,
            &MeasurementConfig::empty(),
        )
        .unwrap();
        assert_relative_eq!(result.value, 1.7, epsilon = 1e-12);
        assert_eq!(result.debug.method, Some(Method::VerticalSpan));
    }

    #[test]
    fn test_compat_mode_forces_fallback() {
        let mesh = rings(&[(0.0, 0.15), (0.5, 0.15), (1.0, 0.15)], 64);
        let config = MeasurementConfig::empty().with_compat_mode(true);
        let key_config = circ(vec![Candidate::fixed(0.5)]);

        let result = resolve_key(MeasurementKey::WaistCirc, &key_config, &mesh, &config).unwrap();

        assert!(result.debug.fallback);
        assert_eq!(result.debug.fallback_reason, Some(Code::OrderingSuspected));
        assert!(result.has_warning(Code::OrderingSuspected));
        assert_relative_eq!(result.value, 2.0 * PI * 0.15, max_relative = 0.01);
    }

    #[test]
    fn test_scan_heights() {
        let fixed = scan_heights(&Candidate::fixed(0.5), 1.0, 2.0);
        assert_eq!(fixed, vec![2.0]);

        let band = scan_heights(&Candidate::peak(0.5, 0.25, 3), 0.0, 2.0);
        assert_eq!(band.len(), 3);
        assert_relative_eq!(band[0], 0.5);
        assert_relative_eq!(band[1], 1.0);
        assert_relative_eq!(band[2], 1.5);
    }
}

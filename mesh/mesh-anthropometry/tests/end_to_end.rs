//! End-to-end tests through the public façade.

use std::f64::consts::{PI, TAU};

use approx::assert_relative_eq;
use mesh_anthropometry::{
    Axis, Candidate, Code, KeyConfig, LoadError, MeasureError, MeasurementBundle,
    MeasurementConfig, MeasurementKey, MeshPoints, Method, Plane, measure, measure_all,
    measure_loaded,
};

// =============================================================================
// Synthetic scans
// =============================================================================

/// Z-up cylinder sampled as rings of `per_ring` points every `spacing` meters.
fn cylinder(radius: f64, height: f64, spacing: f64, per_ring: u32) -> Vec<[f64; 3]> {
    let rings = (height / spacing).round() as u32;
    let mut vertices = Vec::new();
    for k in 0..=rings {
        let z = f64::from(k) * spacing;
        for i in 0..per_ring {
            let t = TAU * f64::from(i) / f64::from(per_ring);
            vertices.push([radius * t.cos(), radius * t.sin(), z]);
        }
    }
    vertices
}

fn waist_only() -> MeasurementConfig {
    MeasurementConfig::empty().with_key(
        MeasurementKey::WaistCirc,
        KeyConfig::circumference(2.0).with_candidates([Candidate::fixed(0.5)]),
    )
}

/// Bundles are equal, with NaN values compared bitwise.
fn assert_same_bundle(a: &MeasurementBundle, b: &MeasurementBundle) {
    assert_eq!(a.len(), b.len());
    for ((key_a, ra), (key_b, rb)) in a.iter().zip(b.iter()) {
        assert_eq!(key_a, key_b);
        assert_eq!(ra.value.to_bits(), rb.value.to_bits(), "{key_a}");
        assert_eq!(ra.warnings, rb.warnings, "{key_a}");
        assert_eq!(ra.reason, rb.reason, "{key_a}");
        assert_eq!(ra.debug, rb.debug, "{key_a}");
    }
}

// =============================================================================
// Measurements
// =============================================================================

#[test]
fn cylinder_waist_within_one_percent() {
    let vertices = cylinder(0.15, 1.0, 0.05, 64);
    let bundle = measure(
        MeshPoints::new(&vertices),
        &[MeasurementKey::WaistCirc],
        &waist_only(),
    )
    .unwrap();

    let waist = bundle.get(MeasurementKey::WaistCirc).unwrap();
    let expected = 2.0 * PI * 0.15;
    assert!((waist.value - expected).abs() / expected < 0.01);
    assert!(waist.warnings.is_empty());
    assert!(waist.reason.is_none());
    assert_eq!(waist.debug.method, Some(Method::ConvexHull));
    assert_eq!(waist.debug.raw_count, 64);
    assert_eq!(waist.debug.chosen_candidate, Some(0));
    assert_relative_eq!(waist.debug.chosen_height.unwrap(), 0.5, epsilon = 1e-12);
}

#[test]
fn standard_config_measures_every_key_on_dense_cylinder() {
    let vertices = cylinder(0.15, 1.0, 0.01, 64);
    let bundle = measure_all(MeshPoints::with_unit(&vertices, "m"), &MeasurementConfig::standard())
        .unwrap();

    assert_eq!(bundle.len(), MeasurementKey::ALL.len());
    assert_eq!(bundle.nan_count(), 0, "{bundle}");

    assert_relative_eq!(bundle.value(MeasurementKey::Height).unwrap(), 1.0, epsilon = 1e-9);
    for key in [
        MeasurementKey::ShoulderWidth,
        MeasurementKey::HipWidth,
        MeasurementKey::ChestDepth,
        MeasurementKey::WaistDepth,
    ] {
        assert_relative_eq!(bundle.value(key).unwrap(), 0.3, epsilon = 1e-9);
    }

    // One leg of the cylinder: roughly half a ring closed by its chord.
    let thigh = bundle.value(MeasurementKey::ThighCirc).unwrap();
    assert!((thigh - (PI * 0.15 + 0.3)).abs() < 0.02);
    let thigh_debug = &bundle.get(MeasurementKey::ThighCirc).unwrap().debug;
    assert_eq!(thigh_debug.chosen_candidate, Some(0));
}

#[test]
fn y_up_orientation() {
    let vertices: Vec<[f64; 3]> = cylinder(0.15, 1.0, 0.05, 64)
        .into_iter()
        .map(|[x, y, z]| [x, z, y])
        .collect();
    let config = MeasurementConfig::empty().with_key(
        MeasurementKey::WaistCirc,
        KeyConfig::circumference(2.0)
            .with_orientation(Axis::Y, Plane::XZ)
            .with_candidates([Candidate::fixed(0.5)]),
    );

    let bundle = measure_all(MeshPoints::new(&vertices), &config).unwrap();
    let waist = bundle.value(MeasurementKey::WaistCirc).unwrap();
    assert!((waist - 2.0 * PI * 0.15).abs() < 0.01);
}

#[test]
fn millimeter_scan_is_rescaled_and_flagged() {
    let vertices: Vec<[f64; 3]> = cylinder(0.15, 1.0, 0.05, 64)
        .into_iter()
        .map(|v| v.map(|c| c * 1000.0))
        .collect();
    let config = waist_only().with_key(MeasurementKey::Height, KeyConfig::height());

    let bundle = measure_all(MeshPoints::new(&vertices), &config).unwrap();

    for (_, result) in bundle.iter() {
        assert!(result.has_warning(Code::ScaleAssumedMmToM));
        assert_relative_eq!(result.debug.scale_factor, 0.001);
    }
    assert_relative_eq!(bundle.value(MeasurementKey::Height).unwrap(), 1.0, epsilon = 1e-9);
    let waist = bundle.value(MeasurementKey::WaistCirc).unwrap();
    assert!((waist - 2.0 * PI * 0.15).abs() < 0.01);
}

#[test]
fn declared_unit_overrides_heuristic() {
    let vertices: Vec<[f64; 3]> = cylinder(0.15, 1.0, 0.05, 16)
        .into_iter()
        .map(|v| v.map(|c| c * 100.0))
        .collect();
    let config = MeasurementConfig::empty().with_key(MeasurementKey::Height, KeyConfig::height());

    let bundle = measure_all(MeshPoints::with_unit(&vertices, "cm"), &config).unwrap();
    let height = bundle.get(MeasurementKey::Height).unwrap();

    assert!(height.warnings.is_empty());
    assert_relative_eq!(height.value, 1.0, epsilon = 1e-9);
}

#[test]
fn flat_slice_is_measured_with_projection_warning() {
    // A wall in the YZ plane: every slice is a line segment.
    let vertices: Vec<[f64; 3]> = (0..=20)
        .flat_map(|k| (0..=10).map(move |j| [0.0, f64::from(j) * 0.02 - 0.1, f64::from(k) * 0.05]))
        .collect();

    let bundle = measure_all(MeshPoints::new(&vertices), &waist_only()).unwrap();
    let waist = bundle.get(MeasurementKey::WaistCirc).unwrap();

    assert!(!waist.is_nan());
    assert!(waist.has_warning(Code::ProjectionSuspected));
    assert_eq!(waist.debug.method, Some(Method::PolarSort));
    assert_relative_eq!(waist.value, 0.4, epsilon = 1e-9);
}

#[test]
fn oversized_loop_is_flagged_not_dropped() {
    let vertices = cylinder(0.5, 1.0, 0.05, 64);
    let bundle = measure_all(MeshPoints::new(&vertices), &waist_only()).unwrap();
    let waist = bundle.get(MeasurementKey::WaistCirc).unwrap();

    assert!(waist.has_warning(Code::PerimeterLarge));
    assert!((waist.value - PI).abs() < 0.01);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn empty_mesh_fails_every_key() {
    let bundle = measure_all(MeshPoints::new(&[]), &MeasurementConfig::standard()).unwrap();

    assert_eq!(bundle.len(), MeasurementKey::ALL.len());
    assert_eq!(bundle.nan_count(), bundle.len());
    assert_eq!(
        bundle.reasons().get(&Code::MeshEmptyAtHeight),
        Some(&bundle.len())
    );
    assert_eq!(bundle.warnings().into_iter().collect::<Vec<_>>(), vec![Code::ExecFail]);
}

#[test]
fn every_nan_has_a_reason() {
    // Rings every 5 cm: fixed heights between rings come back empty.
    let vertices = cylinder(0.15, 1.0, 0.05, 32);
    let bundle = measure_all(MeshPoints::new(&vertices), &MeasurementConfig::standard()).unwrap();

    assert_eq!(bundle.len(), MeasurementKey::ALL.len());
    assert!(bundle.nan_count() > 0);
    for (key, result) in bundle.iter() {
        assert_eq!(result.is_nan(), result.reason.is_some(), "{key}");
        if let Some(reason) = result.reason {
            assert!(reason.is_reason() || reason == Code::ExecFail, "{key}: {reason}");
            assert!(!result.debug.attempts.is_empty(), "{key}");
        }
    }
}

#[test]
fn exhausted_candidates_report_last_reason() {
    let vertices = cylinder(0.15, 1.0, 0.05, 32);
    let config = MeasurementConfig::empty().with_key(
        MeasurementKey::NeckCirc,
        KeyConfig::circumference(1.0)
            .with_candidates([Candidate::fixed(0.51), Candidate::fixed(1.5)]),
    );

    let bundle = measure_all(MeshPoints::new(&vertices), &config).unwrap();
    let neck = bundle.get(MeasurementKey::NeckCirc).unwrap();

    assert!(neck.is_nan());
    assert_eq!(neck.reason, Some(Code::MeshEmptyAtHeight));
    assert_eq!(neck.debug.attempts.len(), 2);
}

#[test]
fn load_failures_map_to_reasons() {
    let config = MeasurementConfig::standard();
    let keys = [MeasurementKey::Height, MeasurementKey::WaistCirc];

    let io = measure_loaded(Err(LoadError::Io("permission denied".into())), &keys, &config)
        .unwrap();
    assert_eq!(io.reasons().get(&Code::LoadFailed), Some(&2));

    let parse = measure_loaded(Err(LoadError::Parse("truncated".into())), &keys, &config)
        .unwrap();
    assert_eq!(parse.reasons().get(&Code::ParseError), Some(&2));

    let vertices = cylinder(0.15, 1.0, 0.05, 64);
    let ok = measure_loaded(Ok(MeshPoints::new(&vertices)), &keys, &config).unwrap();
    assert!(ok.value(MeasurementKey::Height).is_some());
}

#[test]
fn unconfigured_key_is_an_error() {
    let vertices = cylinder(0.15, 1.0, 0.05, 16);
    let err = measure(
        MeshPoints::new(&vertices),
        &[MeasurementKey::WaistCirc, MeasurementKey::HipDepth],
        &waist_only(),
    )
    .unwrap_err();

    assert_eq!(err, MeasureError::UnconfiguredKey(MeasurementKey::HipDepth));
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn repeated_runs_are_identical() {
    let vertices = cylinder(0.15, 1.0, 0.05, 48);
    let config = MeasurementConfig::standard();

    let first = measure_all(MeshPoints::new(&vertices), &config).unwrap();
    let second = measure_all(MeshPoints::new(&vertices), &config).unwrap();

    assert_same_bundle(&first, &second);
}

#[test]
fn compat_mode_is_deterministic_and_flagged() {
    let vertices = cylinder(0.15, 1.0, 0.05, 64);
    let config = waist_only().with_compat_mode(true);

    let first = measure_all(MeshPoints::new(&vertices), &config).unwrap();
    let second = measure_all(MeshPoints::new(&vertices), &config).unwrap();
    assert_same_bundle(&first, &second);

    let waist = first.get(MeasurementKey::WaistCirc).unwrap();
    assert!(waist.debug.fallback);
    assert!(waist.has_warning(Code::OrderingSuspected));
}

// =============================================================================
// Serialization
// =============================================================================

#[cfg(feature = "serde")]
#[test]
fn nan_serializes_as_null() {
    let vertices = cylinder(0.15, 1.0, 0.05, 16);
    let config = MeasurementConfig::empty()
        .with_key(MeasurementKey::Height, KeyConfig::height())
        .with_key(
            MeasurementKey::HipCirc,
            KeyConfig::circumference(2.0).with_candidates([Candidate::fixed(0.51)]),
        );

    let bundle = measure_all(MeshPoints::new(&vertices), &config).unwrap();
    let json = serde_json::to_value(&bundle).unwrap();

    assert!(json["HIP_CIRC"]["value_m"].is_null());
    assert_eq!(json["HIP_CIRC"]["reason"], "empty_slice");
    assert!(json["HEIGHT"]["value_m"].is_number());
    assert!(json["HEIGHT"]["reason"].is_null());
    assert!(json["HEIGHT"]["debug_info"].is_object());
}

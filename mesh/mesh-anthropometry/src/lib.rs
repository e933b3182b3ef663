//! Anthropometric measurements from 3D body scans.
//!
//! This crate turns a raw scan vertex array into body measurements (height,
//! circumferences, widths, depths) in meters, each with warnings, a failure
//! reason when it could not be taken, and a diagnostic record.
//!
//! # Features
//!
//! - **Unit normalization**: declared units or a fixed millimeter heuristic
//! - **Cross-sections**: horizontal band slicing with planar projection
//! - **Circumferences**: convex hull perimeter with a polar-sort fallback
//! - **Candidate selection**: ordered fallback heights, band peak/trough scans
//! - **Diagnostics**: a [`DebugRecord`] on every result, success or failure
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Every call is pure
//! and synchronous; callers parallelize across scans.
//!
//! # Example
//!
//! ```
//! use mesh_anthropometry::{measure, Code, MeasurementConfig, MeasurementKey, MeshPoints};
//!
//! // A 1 m tall cylinder of radius 0.15 m, sampled in rings.
//! let mut vertices = Vec::new();
//! for k in 0..=20 {
//!     for i in 0..64 {
//!         let t = std::f64::consts::TAU * f64::from(i) / 64.0;
//!         vertices.push([0.15 * t.cos(), 0.15 * t.sin(), f64::from(k) * 0.05]);
//!     }
//! }
//!
//! let config = MeasurementConfig::standard();
//! let bundle = measure(
//!     MeshPoints::with_unit(&vertices, "m"),
//!     &[MeasurementKey::Height, MeasurementKey::WaistCirc],
//!     &config,
//! )
//! .unwrap();
//!
//! assert!((bundle.value(MeasurementKey::Height).unwrap() - 1.0).abs() < 1e-9);
//! let waist = bundle.get(MeasurementKey::WaistCirc).unwrap();
//! assert!((waist.value - 0.9425).abs() < 0.01);
//! assert!(!waist.has_warning(Code::PerimeterLarge));
//! ```
//!
//! # Coordinate System
//!
//! Defaults assume a **right-handed, Z-up** scan:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down)
//!
//! Other orientations are set per key with
//! [`KeyConfig::with_orientation`].

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod codes;
mod config;
mod debug;
mod dedupe;
mod error;
mod facade;
mod hull;
mod key;
mod perimeter;
mod result;
mod selector;
mod slice;
mod units;

// Re-export main types and functions
pub use bounds::Bounds3;
pub use codes::Code;
pub use config::{MeasurementConfig, UnitPolicy};
pub use debug::{AttemptOutcome, CandidateAttempt, DebugRecord};
pub use dedupe::dedupe_planar;
pub use error::{MeasureError, MeasureResult};
pub use facade::{LoadError, MeshPoints, measure, measure_all, measure_loaded};
pub use hull::{ConvexHull, DegenerateKind, convex_hull, cross, polygon_perimeter};
pub use key::{
    Axis, Candidate, KeyConfig, MeasurementKey, MeasurementKind, Plane, Region, Strategy,
};
pub use perimeter::{
    Method, PerimeterParams, PerimeterResult, SegmentStats, evaluate_perimeter, polar_order,
};
pub use result::{MeasurementBundle, MeasurementResult};
pub use selector::resolve_key;
pub use slice::{PlanarPointSet, SliceBand, slice_points};
pub use units::{NormalizedMesh, normalize_units, unit_factor};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3};

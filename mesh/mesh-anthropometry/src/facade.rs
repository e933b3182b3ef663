//! Per-case entry points.
//!
//! The façade validates the configuration, normalizes units once, then
//! resolves every requested key independently. Whatever happens to one key,
//! every requested key ends up in the returned bundle.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codes::Code;
use crate::config::MeasurementConfig;
use crate::debug::DebugRecord;
use crate::error::MeasureResult;
use crate::key::MeasurementKey;
use crate::result::{MeasurementBundle, MeasurementResult};
use crate::selector::resolve_key;
use crate::units::normalize_units;

/// Borrowed vertex array plus its declared unit, if any.
#[derive(Debug, Clone, Copy)]
pub struct MeshPoints<'a> {
    /// Raw vertex coordinates.
    pub vertices: &'a [[f64; 3]],
    /// Declared unit (`"m"`, `"cm"`, `"mm"`), or `None` to infer.
    pub unit: Option<&'a str>,
}

impl<'a> MeshPoints<'a> {
    /// Vertices with no declared unit.
    #[must_use]
    pub const fn new(vertices: &'a [[f64; 3]]) -> Self {
        Self {
            vertices,
            unit: None,
        }
    }

    /// Vertices in a declared unit.
    #[must_use]
    pub const fn with_unit(vertices: &'a [[f64; 3]], unit: &'a str) -> Self {
        Self {
            vertices,
            unit: Some(unit),
        }
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether there are no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Failure reported by whatever loaded the mesh.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to load mesh: {0}")]
    Io(String),
    /// The file was read but could not be parsed.
    #[error("failed to parse mesh: {0}")]
    Parse(String),
}

impl LoadError {
    /// Reason code applied to every key.
    #[must_use]
    pub const fn reason(&self) -> Code {
        match self {
            Self::Io(_) => Code::LoadFailed,
            Self::Parse(_) => Code::ParseError,
        }
    }
}

/// Measure `keys` on one mesh.
///
/// # Errors
///
/// Returns [`MeasureError::UnconfiguredKey`](crate::MeasureError::UnconfiguredKey)
/// or [`MeasureError::InvalidConfig`](crate::MeasureError::InvalidConfig)
/// when a requested key is missing from `config` or misconfigured. Every
/// other failure is reported per key as a NaN result with a reason.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::{measure, MeasurementConfig, MeasurementKey, MeshPoints};
///
/// let vertices = [[0.0, 0.0, 0.0], [0.3, 0.2, 1.75]];
/// let bundle = measure(
///     MeshPoints::with_unit(&vertices, "m"),
///     &[MeasurementKey::Height],
///     &MeasurementConfig::standard(),
/// )
/// .unwrap();
///
/// let height = bundle.value(MeasurementKey::Height).unwrap();
/// assert!((height - 1.75).abs() < 1e-12);
/// ```
pub fn measure(
    mesh: MeshPoints<'_>,
    keys: &[MeasurementKey],
    config: &MeasurementConfig,
) -> MeasureResult<MeasurementBundle> {
    config.validate_for(keys)?;
    info!(
        vertices = mesh.len(),
        keys = keys.len(),
        unit = mesh.unit.unwrap_or("inferred"),
        "measuring case"
    );

    let normalized = match normalize_units(mesh.vertices, mesh.unit, &config.unit_policy) {
        Ok(normalized) => normalized,
        Err(err) => {
            warn!(error = %err, "unit normalization failed");
            return Ok(fail_case(keys, Code::ParseError, &err.to_string()));
        }
    };

    if normalized.points.is_empty() {
        warn!("mesh has no vertices");
        return Ok(fail_case(keys, Code::MeshEmptyAtHeight, "mesh has no vertices"));
    }

    if let Some(code) = normalized.warning {
        warn!(scale = normalized.scale, code = %code, "unit scale inferred");
    }

    let mut bundle = MeasurementBundle::new();
    for &key in keys {
        let key_config = config.key(key)?;
        let result = match resolve_key(key, key_config, &normalized, config) {
            Ok(result) => result,
            Err(err) if err.is_config_error() => return Err(err),
            Err(err) => {
                warn!(key = %key, error = %err, "measurement failed");
                let warnings = normalized.warning.into_iter().chain([Code::ExecFail]);
                let mut record = DebugRecord::for_mesh(&normalized);
                record.error = Some(err.to_string());
                MeasurementResult::failed(Code::ExecFail, warnings, record)
            }
        };
        debug!(key = %key, value = result.value, reason = ?result.reason, "key resolved");
        bundle.insert(key, result);
    }

    info!(
        keys = bundle.len(),
        nan = bundle.nan_count(),
        "case measured"
    );
    Ok(bundle)
}

/// Measure every key configured in `config`.
///
/// # Errors
///
/// Same as [`measure`].
pub fn measure_all(
    mesh: MeshPoints<'_>,
    config: &MeasurementConfig,
) -> MeasureResult<MeasurementBundle> {
    let keys: Vec<MeasurementKey> = config.configured_keys().collect();
    measure(mesh, &keys, config)
}

/// Measure `keys` on the outcome of a mesh load.
///
/// A load failure marks every key NaN with `load_failed` (I/O) or
/// `parse_error` (parse).
///
/// # Errors
///
/// Same as [`measure`]; configuration is validated even when the load failed.
pub fn measure_loaded(
    loaded: Result<MeshPoints<'_>, LoadError>,
    keys: &[MeasurementKey],
    config: &MeasurementConfig,
) -> MeasureResult<MeasurementBundle> {
    match loaded {
        Ok(mesh) => measure(mesh, keys, config),
        Err(err) => {
            config.validate_for(keys)?;
            warn!(error = %err, "mesh load failed");
            Ok(fail_case(keys, err.reason(), &err.to_string()))
        }
    }
}

/// Every key NaN with `reason` and a single `EXEC_FAIL` warning.
fn fail_case(keys: &[MeasurementKey], reason: Code, message: &str) -> MeasurementBundle {
    let mut bundle = MeasurementBundle::new();
    for &key in keys {
        bundle.insert(
            key,
            MeasurementResult::failed(reason, [Code::ExecFail], DebugRecord::for_error(message)),
        );
    }
    bundle
}

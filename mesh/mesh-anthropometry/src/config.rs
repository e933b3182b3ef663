//! Measurement configuration and presets.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeasureError, MeasureResult};
use crate::key::{Candidate, KeyConfig, MeasurementKey, Region};

/// Thresholds for the unit heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitPolicy {
    /// Coordinates with a larger magnitude are assumed to be millimeters.
    pub mm_threshold: f64,
    /// Largest plausible magnitude in meters once converted. Beyond it the
    /// data passes through unscaled (with a warning).
    pub max_plausible_m: f64,
}

impl Default for UnitPolicy {
    fn default() -> Self {
        Self {
            mm_threshold: 10.0,
            max_plausible_m: 10.0,
        }
    }
}

/// Full configuration for one call to the façade.
///
/// # Example
///
/// ```
/// use mesh_anthropometry::{Candidate, KeyConfig, MeasurementConfig, MeasurementKey};
///
/// let config = MeasurementConfig::standard()
///     .with_compat_mode(true)
///     .with_key(
///         MeasurementKey::WaistCirc,
///         KeyConfig::circumference(1.8).with_candidates([Candidate::fixed(0.6)]),
///     );
///
/// assert!(config.compat_mode);
/// assert!(config.key(MeasurementKey::WaistCirc).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementConfig {
    /// Per-key configuration.
    pub keys: BTreeMap<MeasurementKey, KeyConfig>,
    /// Quantization step for planar dedupe, in meters.
    pub dedupe_epsilon: f64,
    /// Segments longer than `jump_factor × mean` count as jumps.
    pub jump_factor: f64,
    /// Unit heuristic thresholds.
    pub unit_policy: UnitPolicy,
    /// Force the polar-sort perimeter path for every circumference.
    pub compat_mode: bool,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl MeasurementConfig {
    /// Default dedupe epsilon (1 µm).
    pub const DEFAULT_DEDUPE_EPSILON: f64 = 1e-6;

    /// Default jump factor.
    pub const DEFAULT_JUMP_FACTOR: f64 = 10.0;

    /// Configuration with no keys.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
            dedupe_epsilon: Self::DEFAULT_DEDUPE_EPSILON,
            jump_factor: Self::DEFAULT_JUMP_FACTOR,
            unit_policy: UnitPolicy::default(),
            compat_mode: false,
        }
    }

    /// Configuration for every standard key, Z-up.
    ///
    /// Heights are fractions of stature taken from common anthropometric
    /// proportions; ceilings are loose upper bounds for adult bodies.
    #[must_use]
    pub fn standard() -> Self {
        let keys = [
            (MeasurementKey::Height, KeyConfig::height()),
            (
                MeasurementKey::NeckCirc,
                KeyConfig::circumference(1.0).with_candidates([
                    Candidate::fixed(0.84),
                    Candidate::fixed(0.83),
                    Candidate::fixed(0.85),
                ]),
            ),
            (
                MeasurementKey::BustCirc,
                KeyConfig::circumference(2.0).with_candidates([
                    Candidate::peak(0.72, 0.03, 7),
                    Candidate::fixed(0.72),
                    Candidate::fixed(0.70),
                ]),
            ),
            (
                MeasurementKey::UnderbustCirc,
                KeyConfig::circumference(2.0)
                    .with_candidates([Candidate::fixed(0.68), Candidate::fixed(0.67)]),
            ),
            (
                MeasurementKey::WaistCirc,
                KeyConfig::circumference(2.0).with_candidates([
                    Candidate::trough(0.61, 0.04, 9),
                    Candidate::fixed(0.62),
                    Candidate::fixed(0.60),
                ]),
            ),
            (
                MeasurementKey::HipCirc,
                KeyConfig::circumference(2.2).with_candidates([
                    Candidate::peak(0.50, 0.04, 9),
                    Candidate::fixed(0.50),
                    Candidate::fixed(0.52),
                ]),
            ),
            (
                MeasurementKey::ThighCirc,
                KeyConfig::circumference(1.2).with_candidates([
                    Candidate::fixed(0.43).in_region(Region::Left),
                    Candidate::fixed(0.43).in_region(Region::Right),
                    Candidate::fixed(0.45).in_region(Region::Left),
                ]),
            ),
            (
                MeasurementKey::ShoulderWidth,
                KeyConfig::width().with_candidates([Candidate::fixed(0.82), Candidate::fixed(0.81)]),
            ),
            (
                MeasurementKey::ChestWidth,
                KeyConfig::width().with_candidates([Candidate::fixed(0.72), Candidate::fixed(0.70)]),
            ),
            (
                MeasurementKey::WaistWidth,
                KeyConfig::width().with_candidates([Candidate::fixed(0.62), Candidate::fixed(0.60)]),
            ),
            (
                MeasurementKey::HipWidth,
                KeyConfig::width().with_candidates([Candidate::fixed(0.50), Candidate::fixed(0.52)]),
            ),
            (
                MeasurementKey::ChestDepth,
                KeyConfig::depth().with_candidates([Candidate::fixed(0.72), Candidate::fixed(0.70)]),
            ),
            (
                MeasurementKey::WaistDepth,
                KeyConfig::depth().with_candidates([Candidate::fixed(0.62), Candidate::fixed(0.60)]),
            ),
            (
                MeasurementKey::HipDepth,
                KeyConfig::depth().with_candidates([Candidate::fixed(0.50), Candidate::fixed(0.52)]),
            ),
        ];

        Self {
            keys: keys.into_iter().collect(),
            ..Self::empty()
        }
    }

    /// Add or replace the configuration for one key.
    #[must_use]
    pub fn with_key(mut self, key: MeasurementKey, config: KeyConfig) -> Self {
        self.keys.insert(key, config);
        self
    }

    /// Set the dedupe epsilon.
    #[must_use]
    pub const fn with_dedupe_epsilon(mut self, epsilon: f64) -> Self {
        self.dedupe_epsilon = epsilon;
        self
    }

    /// Set the jump factor.
    #[must_use]
    pub const fn with_jump_factor(mut self, factor: f64) -> Self {
        self.jump_factor = factor;
        self
    }

    /// Set the unit heuristic thresholds.
    #[must_use]
    pub const fn with_unit_policy(mut self, policy: UnitPolicy) -> Self {
        self.unit_policy = policy;
        self
    }

    /// Force (or stop forcing) the fallback perimeter path.
    #[must_use]
    pub const fn with_compat_mode(mut self, compat: bool) -> Self {
        self.compat_mode = compat;
        self
    }

    /// Configured keys in output order.
    pub fn configured_keys(&self) -> impl Iterator<Item = MeasurementKey> + '_ {
        self.keys.keys().copied()
    }

    /// Configuration for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::UnconfiguredKey`] if `key` has no entry.
    pub fn key(&self, key: MeasurementKey) -> MeasureResult<&KeyConfig> {
        self.keys.get(&key).ok_or(MeasureError::UnconfiguredKey(key))
    }

    /// Validate the global thresholds and the requested keys.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate_for(&self, keys: &[MeasurementKey]) -> MeasureResult<()> {
        for &key in keys {
            let config = self.key(key)?;
            config.validate(key)?;
            if !(self.dedupe_epsilon.is_finite() && self.dedupe_epsilon > 0.0) {
                return Err(MeasureError::invalid_config(
                    key,
                    format!("dedupe epsilon must be positive, got {}", self.dedupe_epsilon),
                ));
            }
            if !(self.jump_factor.is_finite() && self.jump_factor > 0.0) {
                return Err(MeasureError::invalid_config(
                    key,
                    format!("jump factor must be positive, got {}", self.jump_factor),
                ));
            }
        }
        Ok(())
    }
}

//! Error types for measurement operations.

use thiserror::Error;

use crate::key::MeasurementKey;

/// Result type alias for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Errors that can occur during measurement operations.
///
/// Geometric failures (empty slices, degenerate hulls) are not errors; they
/// travel as reason codes on [`MeasurementResult`](crate::MeasurementResult).
/// Only configuration mistakes escape the façade as `Err`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    /// A key was requested that has no configuration entry.
    #[error("measurement key {0} is not configured")]
    UnconfiguredKey(MeasurementKey),

    /// A key configuration is internally inconsistent.
    #[error("invalid configuration for {key}: {details}")]
    InvalidConfig {
        /// The offending key.
        key: MeasurementKey,
        /// What is wrong with it.
        details: String,
    },

    /// A slice band was built with a non-positive or non-finite half-width.
    #[error("invalid slice band: height {height}, half-width {half_width}")]
    InvalidBand {
        /// Band center along the up axis.
        height: f64,
        /// Band half-width along the up axis.
        half_width: f64,
    },

    /// The declared unit string could not be interpreted.
    #[error("unknown declared unit {0:?}")]
    UnknownUnit(String),

    /// The vertex array contains non-finite coordinates.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Index of the first offending vertex.
        index: usize,
    },

    /// A computation produced a non-finite value.
    #[error("non-finite result: {0}")]
    NonFinite(String),
}

impl MeasureError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(key: MeasurementKey, details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key,
            details: details.into(),
        }
    }

    /// Create a non-finite result error.
    #[must_use]
    pub fn non_finite(details: impl Into<String>) -> Self {
        Self::NonFinite(details.into())
    }

    /// Whether this error is a programmer error that the façade must surface
    /// instead of folding into a NaN result.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::UnconfiguredKey(_) | Self::InvalidConfig { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeasureError::UnconfiguredKey(MeasurementKey::WaistCirc);
        assert!(format!("{err}").contains("WAIST_CIRC"));

        let err = MeasureError::invalid_config(MeasurementKey::Height, "no candidates");
        assert!(format!("{err}").contains("no candidates"));

        let err = MeasureError::UnknownUnit("furlong".to_string());
        assert!(format!("{err}").contains("furlong"));

        let err = MeasureError::non_finite("perimeter overflow");
        assert!(format!("{err}").contains("perimeter overflow"));
    }

    #[test]
    fn test_config_error_classification() {
        assert!(MeasureError::UnconfiguredKey(MeasurementKey::HipCirc).is_config_error());
        assert!(!MeasureError::NonFiniteVertex { index: 3 }.is_config_error());
        assert!(
            !MeasureError::InvalidBand {
                height: 1.0,
                half_width: 0.0
            }
            .is_config_error()
        );
    }
}

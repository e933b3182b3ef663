//! Measurement results and per-case bundles.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::codes::Code;
use crate::debug::DebugRecord;
use crate::key::MeasurementKey;

/// Value, warnings and diagnostics for one key.
///
/// A result is either measured (finite value, no reason) or failed (NaN value
/// plus exactly one reason code). The constructors keep the two consistent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MeasurementResult {
    /// Value in meters, NaN on failure. Serialized as `value_m`, `null` when NaN.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "value_m", serialize_with = "nan_as_null")
    )]
    pub value: f64,
    /// Warnings, in vocabulary order.
    pub warnings: BTreeSet<Code>,
    /// Why the value is NaN.
    pub reason: Option<Code>,
    /// Diagnostics.
    #[cfg_attr(feature = "serde", serde(rename = "debug_info"))]
    pub debug: DebugRecord,
}

impl MeasurementResult {
    /// A successful measurement.
    #[must_use]
    pub fn measured(
        value: f64,
        warnings: impl IntoIterator<Item = Code>,
        debug: DebugRecord,
    ) -> Self {
        Self {
            value,
            warnings: warnings.into_iter().collect(),
            reason: None,
            debug,
        }
    }

    /// A failed measurement with its reason.
    #[must_use]
    pub fn failed(
        reason: Code,
        warnings: impl IntoIterator<Item = Code>,
        debug: DebugRecord,
    ) -> Self {
        Self {
            value: f64::NAN,
            warnings: warnings.into_iter().collect(),
            reason: Some(reason),
            debug,
        }
    }

    /// Whether the value is NaN.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.value.is_nan()
    }

    /// The value, or `None` when NaN.
    #[must_use]
    pub fn value_m(&self) -> Option<f64> {
        if self.value.is_nan() {
            None
        } else {
            Some(self.value)
        }
    }

    /// Whether `code` is among the warnings.
    #[must_use]
    pub fn has_warning(&self, code: Code) -> bool {
        self.warnings.contains(&code)
    }
}

#[cfg(feature = "serde")]
#[allow(clippy::trivially_copy_pass_by_ref)] // signature fixed by serde
fn nan_as_null<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_none()
    } else {
        serializer.serialize_some(value)
    }
}

/// Results for every requested key of one case, in key order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MeasurementBundle {
    results: BTreeMap<MeasurementKey, MeasurementResult>,
}

impl MeasurementBundle {
    /// An empty bundle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            results: BTreeMap::new(),
        }
    }

    /// Insert or replace the result for `key`.
    pub fn insert(&mut self, key: MeasurementKey, result: MeasurementResult) {
        self.results.insert(key, result);
    }

    /// Result for `key`.
    #[must_use]
    pub fn get(&self, key: MeasurementKey) -> Option<&MeasurementResult> {
        self.results.get(&key)
    }

    /// Value for `key`, `None` when missing or NaN.
    #[must_use]
    pub fn value(&self, key: MeasurementKey) -> Option<f64> {
        self.get(key).and_then(MeasurementResult::value_m)
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (MeasurementKey, &MeasurementResult)> {
        self.results.iter().map(|(k, r)| (*k, r))
    }

    /// Keys present.
    pub fn keys(&self) -> impl Iterator<Item = MeasurementKey> + '_ {
        self.results.keys().copied()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the bundle has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of NaN results.
    #[must_use]
    pub fn nan_count(&self) -> usize {
        self.results.values().filter(|r| r.is_nan()).count()
    }

    /// Union of all warnings.
    #[must_use]
    pub fn warnings(&self) -> BTreeSet<Code> {
        self.results
            .values()
            .flat_map(|r| r.warnings.iter().copied())
            .collect()
    }

    /// Count of results per failure reason.
    #[must_use]
    pub fn reasons(&self) -> BTreeMap<Code, usize> {
        let mut counts = BTreeMap::new();
        for reason in self.results.values().filter_map(|r| r.reason) {
            *counts.entry(reason).or_insert(0) += 1;
        }
        counts
    }
}

impl IntoIterator for MeasurementBundle {
    type Item = (MeasurementKey, MeasurementResult);
    type IntoIter = std::collections::btree_map::IntoIter<MeasurementKey, MeasurementResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl fmt::Display for MeasurementBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MeasurementBundle: {} keys, {} NaN, {} distinct warnings",
            self.len(),
            self.nan_count(),
            self.warnings().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> MeasurementBundle {
        let mut bundle = MeasurementBundle::new();
        bundle.insert(
            MeasurementKey::WaistCirc,
            MeasurementResult::measured(0.8, [Code::ScaleAssumedMmToM], DebugRecord::default()),
        );
        bundle.insert(
            MeasurementKey::Height,
            MeasurementResult::measured(1.7, [Code::ScaleAssumedMmToM], DebugRecord::default()),
        );
        bundle.insert(
            MeasurementKey::ThighCirc,
            MeasurementResult::failed(
                Code::NoVerticesInRegion,
                [Code::ScaleAssumedMmToM],
                DebugRecord::default(),
            ),
        );
        bundle
    }

    #[test]
    fn test_measured_and_failed_invariants() {
        let ok = MeasurementResult::measured(1.0, [], DebugRecord::default());
        assert!(!ok.is_nan());
        assert!(ok.reason.is_none());
        assert_eq!(ok.value_m(), Some(1.0));

        let bad = MeasurementResult::failed(Code::EmptySlice, [], DebugRecord::default());
        assert!(bad.is_nan());
        assert_eq!(bad.reason, Some(Code::EmptySlice));
        assert_eq!(bad.value_m(), None);
    }

    #[test]
    fn test_bundle_aggregation() {
        let bundle = sample_bundle();
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.nan_count(), 1);
        assert_eq!(
            bundle.warnings().into_iter().collect::<Vec<_>>(),
            vec![Code::ScaleAssumedMmToM]
        );
        assert_eq!(bundle.reasons().get(&Code::NoVerticesInRegion), Some(&1));
        assert_eq!(bundle.value(MeasurementKey::ThighCirc), None);
        assert_eq!(bundle.value(MeasurementKey::Height), Some(1.7));
    }

    #[test]
    fn test_bundle_iterates_in_key_order() {
        let keys: Vec<_> = sample_bundle().keys().collect();
        assert_eq!(
            keys,
            vec![
                MeasurementKey::Height,
                MeasurementKey::WaistCirc,
                MeasurementKey::ThighCirc
            ]
        );
    }

    #[test]
    fn test_display() {
        let text = format!("{}", sample_bundle());
        assert!(text.contains("3 keys"));
        assert!(text.contains("1 NaN"));
    }
}

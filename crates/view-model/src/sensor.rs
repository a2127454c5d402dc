//! Live dynamic data (sensor values) and its cache fingerprint.

use std::collections::BTreeMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::value::{Context, Value};

/// Hashable mirror of [`Value`]; floats compare by total order so that
/// identical readings always produce identical keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
}

impl From<&Value> for ScalarKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ScalarKey::Null,
            Value::Bool(b) => ScalarKey::Bool(*b),
            Value::Int(i) => ScalarKey::Int(*i),
            Value::Float(f) => ScalarKey::Float(OrderedFloat(*f)),
            Value::Str(s) => ScalarKey::Str(s.clone()),
        }
    }
}

/// Complete, order-independent fingerprint of a sensor snapshot.
///
/// Cheap to clone; two snapshots with equal contents have equal fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SensorFingerprint(Arc<[(String, ScalarKey)]>);

impl SensorFingerprint {
    fn of(values: &BTreeMap<String, Value>) -> Self {
        Self(
            values
                .iter()
                .map(|(k, v)| (k.clone(), ScalarKey::from(v)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Flat mapping from names to scalar values.
///
/// Updates merge into the existing values; the fingerprint is recomputed on
/// every mutation so lookups during a frame never pay for it.
#[derive(Debug, Clone)]
pub struct SensorSnapshot {
    values: BTreeMap<String, Value>,
    fingerprint: SensorFingerprint,
}

impl SensorSnapshot {
    pub fn new() -> Self {
        let values = BTreeMap::new();
        let fingerprint = SensorFingerprint::of(&values);
        Self {
            values,
            fingerprint,
        }
    }

    /// Set a single field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
        self.fingerprint = SensorFingerprint::of(&self.values);
    }

    /// Merge several fields at once.
    pub fn update<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (k, v) in fields {
            self.values.insert(k.into(), v.into());
        }
        self.fingerprint = SensorFingerprint::of(&self.values);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy the values into an evaluation context.
    pub fn to_context(&self) -> Context {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn fingerprint(&self) -> &SensorFingerprint {
        &self.fingerprint
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SensorSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        snapshot.update(iter);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_merges_fields() {
        let mut data = SensorSnapshot::new();
        data.set("temperature", 25.0);
        data.update([("mode", Value::from("auto")), ("level", Value::from(75))]);

        assert_eq!(data.len(), 3);
        assert_eq!(data.get("temperature"), Some(&Value::Float(25.0)));
        assert_eq!(data.get("mode"), Some(&Value::from("auto")));
    }

    #[test]
    fn test_fingerprint_tracks_contents() {
        let mut a = SensorSnapshot::new();
        let mut b = SensorSnapshot::new();
        a.set("temp", 25.0);
        b.set("temp", 30.0);
        assert_ne!(a.fingerprint(), b.fingerprint());

        b.set("temp", 25.0);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_is_insertion_order_independent() {
        let a: SensorSnapshot = [("x", 1), ("y", 2)].into_iter().collect();
        let b: SensorSnapshot = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_types() {
        let a: SensorSnapshot = [("x", Value::Int(1))].into_iter().collect();
        let b: SensorSnapshot = [("x", Value::Float(1.0))].into_iter().collect();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}

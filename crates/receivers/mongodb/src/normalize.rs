//! Decoding of raw bson leaves into metric values.
//!
//! The driver reports some large counters as a `{ "floatApprox": x }`
//! wrapper instead of a primitive. Those are decoded once, here, into
//! [`RawValue::Approx`] and unwrapped by [`normalize`].

use mongodb::bson::Bson;
use mongodb_sensu_component::{MetricMapping, MetricValue};
use std::collections::BTreeMap;

const FLOAT_APPROX: &str = "floatApprox";

/// A candidate metric value before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Intentionally omitted, never emitted.
    Absent,
    Value(MetricValue),
    /// Approximate number carried in a `floatApprox` wrapper.
    Approx(f64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("unsupported metric value {0:?}")]
pub struct UnsupportedValue(pub Bson);

impl RawValue {
    pub fn decode(value: &Bson) -> Result<Self, UnsupportedValue> {
        match value {
            Bson::Null | Bson::Undefined => Ok(Self::Absent),
            Bson::Int32(v) => Ok(Self::Value(MetricValue::from(*v))),
            Bson::Int64(v) => Ok(Self::Value(MetricValue::from(*v))),
            Bson::Double(v) => Ok(Self::Value(MetricValue::from(*v))),
            Bson::String(v) => Ok(Self::Value(MetricValue::from(v.as_str()))),
            Bson::Boolean(v) => Ok(Self::Value(MetricValue::Int(i64::from(*v)))),
            Bson::DateTime(v) => Ok(Self::Value(MetricValue::Int(v.timestamp_millis() / 1000))),
            Bson::Timestamp(v) => Ok(Self::Value(MetricValue::Int(i64::from(v.time)))),
            Bson::Document(doc) if doc.len() == 1 => match doc.get(FLOAT_APPROX) {
                Some(Bson::Double(v)) => Ok(Self::Approx(*v)),
                Some(Bson::Int32(v)) => Ok(Self::Approx(f64::from(*v))),
                Some(Bson::Int64(v)) => Ok(Self::Approx(*v as f64)),
                _ => Err(UnsupportedValue(value.clone())),
            },
            other => Err(UnsupportedValue(other.clone())),
        }
    }
}

macro_rules! impl_from_metric_value {
    ( $( $ty:ty ),* ) => {
        $(
            impl From<$ty> for RawValue {
                fn from(value: $ty) -> Self {
                    Self::Value(MetricValue::from(value))
                }
            }
        )*
    };
}

impl_from_metric_value!(i32, i64, f64, String, &str);

impl From<MetricValue> for RawValue {
    fn from(value: MetricValue) -> Self {
        Self::Value(value)
    }
}

/// Candidate metrics collected during one pass, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetrics(BTreeMap<String, RawValue>);

impl RawMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn extend(&mut self, other: RawMetrics) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for RawMetrics {
    type Item = (String, RawValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, RawValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Drops absent entries and unwraps approximate numbers.
pub fn normalize(metrics: RawMetrics) -> MetricMapping {
    metrics
        .into_iter()
        .filter_map(|(name, value)| match value {
            RawValue::Absent => None,
            RawValue::Approx(value) => Some((name, MetricValue::Float(value))),
            RawValue::Value(value) => Some((name, value)),
        })
        .collect()
}

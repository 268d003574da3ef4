pub mod config;
pub mod status;

use color_eyre::eyre;
use std::collections::BTreeMap;

pub use status::ExitStatus;

/// A single flattened metric value.
///
/// Ratios are carried as their formatted decimal string so that consumers see
/// exactly the representation the plugins have always published.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value, used for threshold comparisons.
    ///
    /// Text values are parsed, so formatted ratios such as `"0.00125"`
    /// compare by their numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => std::fmt::Display::fmt(value, f),
            // debug formatting keeps the trailing ".0" of whole floats
            Self::Float(value) => std::fmt::Debug::fmt(value, f),
            Self::Text(value) => std::fmt::Display::fmt(value, f),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for MetricValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Flat mapping of metric name to value produced by one collection pass.
///
/// Names are unique and iteration order is the lexical order of the names,
/// so the same snapshot always renders the same output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricMapping(BTreeMap<String, MetricValue>);

impl MetricMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> Option<MetricValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
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

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> + '_ {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Moves all metrics of `other` into this mapping.
    ///
    /// Metrics of `other` replace metrics of the same name.
    pub fn merge(&mut self, other: MetricMapping) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, MetricValue)> for MetricMapping {
    fn from_iter<T: IntoIterator<Item = (String, MetricValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MetricMapping {
    type Item = (String, MetricValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Consumes the finished mapping of one collection pass.
pub trait MetricsConsumer: std::fmt::Debug {
    type Output;

    fn consume(&mut self, metrics: &MetricMapping) -> eyre::Result<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_values_keep_their_fraction() {
        assert_eq!(MetricValue::Float(1168.0).to_string(), "1168.0");
        assert_eq!(
            MetricValue::Float(2.7058823529411766).to_string(),
            "2.7058823529411766"
        );
        assert_eq!(MetricValue::Int(52_427).to_string(), "52427");
        assert_eq!(MetricValue::from("0.00000").to_string(), "0.00000");
    }

    #[test]
    fn text_values_compare_numerically() {
        assert_eq!(MetricValue::from("0.12500").as_f64(), Some(0.125));
        assert_eq!(MetricValue::from("PRIMARY").as_f64(), None);
        assert_eq!(MetricValue::Int(3).as_f64(), Some(3.0));
    }

    #[test]
    fn mapping_iterates_in_name_order() {
        let mut metrics = MetricMapping::new();
        metrics.insert("opcounters.query", 137);
        metrics.insert("asserts.user", 0);
        metrics.insert("mem.residentMb", 43);
        let names: Vec<_> = metrics.names().collect();
        assert_eq!(names, ["asserts.user", "mem.residentMb", "opcounters.query"]);
    }

    #[test]
    fn merge_replaces_duplicate_names() {
        let mut metrics = MetricMapping::new();
        metrics.insert("member_0.health", 0.0);
        let mut other = MetricMapping::new();
        other.insert("member_0.health", 1.0);
        other.insert("member_1.health", 1.0);
        metrics.merge(other);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics.get("member_0.health"), Some(&MetricValue::Float(1.0)));
    }
}

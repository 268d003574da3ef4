use crate::normalize::{RawMetrics, RawValue};
use mongodb::bson::Bson;

lazy_static::lazy_static! {
    static ref SEPARATOR: regex::Regex = regex::Regex::new(r"[,\s\-(]+").unwrap();
}

/// Normalizes one path segment of an open-ended section into a metric name
/// segment, e.g. `"transaction checkpoint max time (msecs)"` becomes
/// `"transaction_checkpoint_max_time_msecs"`.
pub fn normalize_segment(segment: &str) -> String {
    SEPARATOR.replace_all(segment, "_").replace(')', "")
}

/// Recursively flattens every numeric leaf below `value` into `metrics`.
///
/// Non-numeric leaves (strings such as `uri`, booleans, arrays) are skipped.
pub fn walk(prefix: &str, value: &Bson, metrics: &mut RawMetrics) {
    match value {
        Bson::Document(document) => {
            if let Ok(leaf @ RawValue::Approx(_)) = RawValue::decode(value) {
                metrics.insert(prefix, leaf);
                return;
            }
            for (key, value) in document {
                let name = format!("{}.{}", prefix, normalize_segment(key));
                walk(&name, value, metrics);
            }
        }
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => {
            if let Ok(leaf) = RawValue::decode(value) {
                metrics.insert(prefix, leaf);
            }
        }
        _ => {}
    }
}

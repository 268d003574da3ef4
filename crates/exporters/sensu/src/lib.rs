pub mod check;
pub mod graphite;

pub use check::{CheckOutcome, ThresholdCheck};
pub use graphite::GraphiteWriter;

/// Seconds since the unix epoch, as stamped on every graphite line.
pub fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

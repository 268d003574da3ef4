pub mod fields;
pub mod walk;

use crate::attributes::{LockDimension, LockMode, LockNamespace};
use crate::doc::{self, BsonKey, InvalidTypeError, OwnedPath, QueryError};
use crate::normalize::{RawMetrics, RawValue, UnsupportedValue};
use crate::version::{SchemaEra, ServerVersion};
use mongodb::bson::Bson;
use strum::IntoEnumIterator;
use tracing::trace;

pub const WIRED_TIGER: &str = "wiredTiger";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to collect {metric:?}: {source}")]
    CollectMetric {
        metric: String,
        #[source]
        source: doc::Error,
    },
}

/// `dbStats` result of one database.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStats {
    pub name: String,
    pub stats: Bson,
}

/// Raw documents of one collection pass.
#[derive(Debug, Clone, Copy)]
pub struct StatusInput<'a> {
    pub server_status: &'a Bson,
    pub replica_set_status: Option<&'a Bson>,
    pub database_stats: &'a [DatabaseStats],
}

impl<'a> StatusInput<'a> {
    pub fn new(server_status: &'a Bson) -> Self {
        Self {
            server_status,
            replica_set_status: None,
            database_stats: &[],
        }
    }
}

/// Flattens server status documents of one server version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattener {
    version: ServerVersion,
    era: SchemaEra,
}

impl Flattener {
    pub fn new(version: ServerVersion) -> Self {
        let era = version.era();
        Self { version, era }
    }

    /// Classifies the server by the mandatory `version` field.
    pub fn from_server_status(server_status: &Bson) -> Result<Self, crate::Error> {
        let version = crate::get_str!(server_status, "version").map_err(|source| {
            crate::Error::MissingField {
                field: "version",
                source,
            }
        })?;
        let version = ServerVersion::parse(version);
        trace!(%version, "server version");
        Ok(Self::new(version))
    }

    pub fn version(&self) -> &ServerVersion {
        &self.version
    }

    pub fn era(&self) -> SchemaEra {
        self.era
    }

    /// Builds the candidate metrics of one snapshot.
    ///
    /// Absent sections are skipped. Fields of present sections that cannot
    /// be decoded are skipped as well and reported in `errors`.
    pub fn flatten(&self, input: &StatusInput<'_>, errors: &mut Vec<Error>) -> RawMetrics {
        let status = input.server_status;
        let mut metrics = RawMetrics::new();

        for section in fields::SECTIONS {
            if !section.applies_to(self.era) || !doc::contains_path(status, section.key) {
                continue;
            }
            for field in section.fields {
                record_field(status, field.name, field.path, &mut metrics, errors);
            }
        }

        record_lock_ratio(status, &mut metrics, errors);
        match self.era {
            SchemaEra::Legacy | SchemaEra::Transitional => {
                record_index_counters(status, &mut metrics, errors);
            }
            SchemaEra::Modern => {
                record_locks(status, &mut metrics, errors);
            }
        }

        for database in input.database_stats {
            for &name in fields::DATABASE_STATS {
                let metric = format!("databaseSizes.{}.{}", database.name, name);
                record_field(&database.stats, &metric, &[name], &mut metrics, errors);
            }
        }

        if let Some(replica_set_status) = input.replica_set_status {
            record_field(
                replica_set_status,
                "metrics.replicaset.state",
                &["myState"],
                &mut metrics,
                errors,
            );
        }

        if let Some(wired_tiger) = doc::get(status, BsonKey::Key(WIRED_TIGER)) {
            walk::walk(WIRED_TIGER, wired_tiger, &mut metrics);
        }

        metrics
    }
}

fn owned_path(path: &[&str]) -> OwnedPath {
    path.iter().copied().map(BsonKey::from).collect()
}

fn collect_error(metric: &str, source: doc::Error) -> Error {
    Error::CollectMetric {
        metric: metric.to_string(),
        source,
    }
}

fn invalid_type(path: &[&str], expected_type: &'static str, value: Bson) -> doc::Error {
    doc::Error {
        path: owned_path(path),
        source: QueryError::InvalidType(InvalidTypeError {
            expected_type,
            value,
        }),
    }
}

/// Copies the value at `path` to `metric`.
///
/// A missing field is recorded as absent.
pub(crate) fn record_field(
    document: &Bson,
    metric: &str,
    path: &[&str],
    metrics: &mut RawMetrics,
    errors: &mut Vec<Error>,
) {
    match doc::lookup(document, path) {
        Ok(value) => match RawValue::decode(value) {
            Ok(value) => metrics.insert(metric, value),
            Err(UnsupportedValue(value)) => {
                errors.push(collect_error(metric, invalid_type(path, "scalar", value)));
            }
        },
        Err(err) if err.is_not_found() => metrics.insert(metric, RawValue::Absent),
        Err(err) => errors.push(collect_error(metric, err)),
    }
}

fn format_ratio(value: f64) -> String {
    format!("{:.5}", value)
}

/// Records a ratio formatted to five decimals.
fn record_ratio(
    document: &Bson,
    metric: &str,
    path: &[&str],
    metrics: &mut RawMetrics,
    errors: &mut Vec<Error>,
) {
    let value = doc::lookup(document, path).and_then(|value| {
        doc::BsonValue::get_f64(value).map_err(|err| doc::Error {
            path: owned_path(path),
            source: QueryError::InvalidType(err),
        })
    });
    match value {
        Ok(ratio) => metrics.insert(metric, format_ratio(ratio)),
        Err(err) if err.is_not_found() => {}
        Err(err) => errors.push(collect_error(metric, err)),
    }
}

fn record_lock_ratio(status: &Bson, metrics: &mut RawMetrics, errors: &mut Vec<Error>) {
    record_ratio(status, "lock.ratio", &["globalLock", "ratio"], metrics, errors);
}

fn record_index_counters(status: &Bson, metrics: &mut RawMetrics, errors: &mut Vec<Error>) {
    let base: &[&str] = if doc::contains_path(status, &["indexCounters", "btree"]) {
        &["indexCounters", "btree"]
    } else if doc::contains_path(status, &["indexCounters"]) {
        &["indexCounters"]
    } else {
        return;
    };
    let path = |key: &'static str| [base, &[key][..]].concat();

    record_ratio(status, "indexes.missRatio", &path("missRatio"), metrics, errors);
    for &(metric, key) in fields::INDEX_COUNTERS {
        record_field(status, metric, &path(key), metrics, errors);
    }
}

/// Per-namespace lock acquisition counters, published since 3.0.
///
/// Only combinations present in the status document are recorded.
fn record_locks(status: &Bson, metrics: &mut RawMetrics, errors: &mut Vec<Error>) {
    if !doc::contains_path(status, &["locks"]) {
        return;
    }
    for namespace in LockNamespace::iter() {
        for dimension in LockDimension::iter() {
            for mode in LockMode::iter() {
                let path = [
                    "locks",
                    namespace.as_str(),
                    dimension.as_str(),
                    mode.as_str(),
                ];
                let metric = format!(
                    "locks.{}.{}_{}",
                    namespace.as_str(),
                    dimension.as_str(),
                    mode.as_str()
                );
                match doc::lookup(status, &path) {
                    Ok(value) => match RawValue::decode(value) {
                        Ok(value) => metrics.insert(metric, value),
                        Err(UnsupportedValue(value)) => {
                            errors.push(collect_error(&metric, invalid_type(&path, "scalar", value)));
                        }
                    },
                    Err(err) if err.is_not_found() => {
                        // mongodb only publishes lock modes that have been acquired
                    }
                    Err(err) => errors.push(collect_error(&metric, err)),
                }
            }
        }
    }
}

//! Field tables of the fixed-shape server status sections.
//!
//! Every entry copies the value at `path` of the server status document to
//! the metric `name`. A section is only flattened when its `key` is present
//! and the server version falls into one of its `eras`.

use crate::version::SchemaEra::{self, Legacy, Modern, Transitional};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub path: &'static [&'static str],
}

const fn field(name: &'static str, path: &'static [&'static str]) -> Field {
    Field { name, path }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub key: &'static [&'static str],
    pub eras: &'static [SchemaEra],
    pub fields: &'static [Field],
}

impl Section {
    pub fn applies_to(&self, era: SchemaEra) -> bool {
        self.eras.contains(&era)
    }
}

const ALL: &[SchemaEra] = &[Legacy, Transitional, Modern];
const SINCE_2_6: &[SchemaEra] = &[Transitional, Modern];
const SINCE_3_0: &[SchemaEra] = &[Modern];
const BEFORE_2_6: &[SchemaEra] = &[Legacy];

pub const SECTIONS: &[Section] = &[
    Section {
        key: &["asserts"],
        eras: ALL,
        fields: &[
            field("asserts.warnings", &["asserts", "warning"]),
            field("asserts.errors", &["asserts", "msg"]),
            field("asserts.regular", &["asserts", "regular"]),
            field("asserts.user", &["asserts", "user"]),
            field("asserts.rollovers", &["asserts", "rollovers"]),
        ],
    },
    Section {
        key: &["backgroundFlushing"],
        eras: ALL,
        fields: &[
            field("backgroundFlushing.flushes", &["backgroundFlushing", "flushes"]),
            field("backgroundFlushing.total_ms", &["backgroundFlushing", "total_ms"]),
            field("backgroundFlushing.average_ms", &["backgroundFlushing", "average_ms"]),
            field("backgroundFlushing.last_ms", &["backgroundFlushing", "last_ms"]),
        ],
    },
    Section {
        key: &["connections"],
        eras: ALL,
        fields: &[
            field("connections.current", &["connections", "current"]),
            field("connections.available", &["connections", "available"]),
            field("connections.totalCreated", &["connections", "totalCreated"]),
        ],
    },
    // legacy cursor counters, renamed to the 2.6 vocabulary
    Section {
        key: &["cursors"],
        eras: BEFORE_2_6,
        fields: &[
            field("clientCursors.size", &["cursors", "clientCursors_size"]),
            field("cursors.timedOut", &["cursors", "timedOut"]),
            field("cursors.open.noTimeout", &["cursors", "totalNoTimeout"]),
            field("cursors.open.pinned", &["cursors", "pinned"]),
            field("cursors.open.total", &["cursors", "totalOpen"]),
        ],
    },
    Section {
        key: &["metrics", "cursor"],
        eras: SINCE_2_6,
        fields: &[
            field("cursors.timedOut", &["metrics", "cursor", "timedOut"]),
            field("cursors.open.noTimeout", &["metrics", "cursor", "open", "noTimeout"]),
            field("cursors.open.pinned", &["metrics", "cursor", "open", "pinned"]),
            field("cursors.open.total", &["metrics", "cursor", "open", "total"]),
        ],
    },
    Section {
        key: &["metrics", "cursor"],
        eras: SINCE_3_0,
        fields: &[
            field("cursors.open.multiTarget", &["metrics", "cursor", "open", "multiTarget"]),
            field("cursors.open.singleTarget", &["metrics", "cursor", "open", "singleTarget"]),
        ],
    },
    Section {
        key: &["dur"],
        eras: ALL,
        fields: &[
            field("journal.commits", &["dur", "commits"]),
            field("journaled_MB", &["dur", "journaledMB"]),
            field("journal.writeToDataFilesMB", &["dur", "writeToDataFilesMB"]),
            field("journal.compression", &["dur", "compression"]),
            field("journal.commitsInWriteLock", &["dur", "commitsInWriteLock"]),
            field("journal.timeMs.dt", &["dur", "timeMs", "dt"]),
            field("journal.timeMs.prepLogBuffer", &["dur", "timeMs", "prepLogBuffer"]),
            field("journal.timeMs.writeToJournal", &["dur", "timeMs", "writeToJournal"]),
            field("journal.timeMs.writeToDataFiles", &["dur", "timeMs", "writeToDataFiles"]),
            field("journal.timeMs.remapPrivateView", &["dur", "timeMs", "remapPrivateView"]),
        ],
    },
    Section {
        key: &["extra_info"],
        eras: ALL,
        fields: &[
            field("mem.heap_usage_bytes", &["extra_info", "heap_usage_bytes"]),
            field("mem.pageFaults", &["extra_info", "page_faults"]),
        ],
    },
    Section {
        key: &["globalLock"],
        eras: ALL,
        fields: &[
            field("lock.totalTime", &["globalLock", "totalTime"]),
            field("lock.queue_total", &["globalLock", "currentQueue", "total"]),
            field("lock.queue_readers", &["globalLock", "currentQueue", "readers"]),
            field("lock.queue_writers", &["globalLock", "currentQueue", "writers"]),
            field("lock.clients_total", &["globalLock", "activeClients", "total"]),
            field("lock.clients_readers", &["globalLock", "activeClients", "readers"]),
            field("lock.clients_writers", &["globalLock", "activeClients", "writers"]),
        ],
    },
    Section {
        key: &["network"],
        eras: ALL,
        fields: &[
            field("network.bytesIn", &["network", "bytesIn"]),
            field("network.bytesOut", &["network", "bytesOut"]),
            field("network.numRequests", &["network", "numRequests"]),
        ],
    },
    Section {
        key: &["opLatencies"],
        eras: ALL,
        fields: &[
            field("oplatencies.read.latency", &["opLatencies", "reads", "latency"]),
            field("oplatencies.read.operations", &["opLatencies", "reads", "ops"]),
            field("oplatencies.write.latency", &["opLatencies", "writes", "latency"]),
            field("oplatencies.write.operations", &["opLatencies", "writes", "ops"]),
            field("oplatencies.command.latency", &["opLatencies", "commands", "latency"]),
            field("oplatencies.command.operations", &["opLatencies", "commands", "ops"]),
        ],
    },
    Section {
        key: &["opcounters"],
        eras: ALL,
        fields: &[
            field("opcounters.insert", &["opcounters", "insert"]),
            field("opcounters.query", &["opcounters", "query"]),
            field("opcounters.update", &["opcounters", "update"]),
            field("opcounters.delete", &["opcounters", "delete"]),
            field("opcounters.getmore", &["opcounters", "getmore"]),
            field("opcounters.command", &["opcounters", "command"]),
        ],
    },
    Section {
        key: &["opcountersRepl"],
        eras: ALL,
        fields: &[
            field("opcountersRepl.insert", &["opcountersRepl", "insert"]),
            field("opcountersRepl.query", &["opcountersRepl", "query"]),
            field("opcountersRepl.update", &["opcountersRepl", "update"]),
            field("opcountersRepl.delete", &["opcountersRepl", "delete"]),
            field("opcountersRepl.getmore", &["opcountersRepl", "getmore"]),
            field("opcountersRepl.command", &["opcountersRepl", "command"]),
        ],
    },
    Section {
        key: &["mem"],
        eras: ALL,
        fields: &[
            field("mem.residentMb", &["mem", "resident"]),
            field("mem.virtualMb", &["mem", "virtual"]),
            field("mem.mapped", &["mem", "mapped"]),
            field("mem.mappedWithJournal", &["mem", "mappedWithJournal"]),
        ],
    },
    Section {
        key: &["tcmalloc", "generic"],
        eras: ALL,
        fields: &[
            field("mem.heap_size_bytes", &["tcmalloc", "generic", "heap_size"]),
            field(
                "mem.current_allocated_bytes",
                &["tcmalloc", "generic", "current_allocated_bytes"],
            ),
        ],
    },
    Section {
        key: &["metrics", "document"],
        eras: ALL,
        fields: &[
            field("metrics.document.deleted", &["metrics", "document", "deleted"]),
            field("metrics.document.inserted", &["metrics", "document", "inserted"]),
            field("metrics.document.returned", &["metrics", "document", "returned"]),
            field("metrics.document.updated", &["metrics", "document", "updated"]),
        ],
    },
    Section {
        key: &["metrics", "getLastError"],
        eras: ALL,
        fields: &[
            field(
                "metrics.getLastError.wtime_num",
                &["metrics", "getLastError", "wtime", "num"],
            ),
            field(
                "metrics.getLastError.wtime_totalMillis",
                &["metrics", "getLastError", "wtime", "totalMillis"],
            ),
            field("metrics.getLastError.wtimeouts", &["metrics", "getLastError", "wtimeouts"]),
        ],
    },
    Section {
        key: &["metrics", "operation"],
        eras: ALL,
        fields: &[
            field("metrics.operation.fastmod", &["metrics", "operation", "fastmod"]),
            field("metrics.operation.idhack", &["metrics", "operation", "idhack"]),
            field("metrics.operation.scanAndOrder", &["metrics", "operation", "scanAndOrder"]),
        ],
    },
    Section {
        key: &["metrics", "queryExecutor"],
        eras: ALL,
        fields: &[
            field("metrics.queryExecutor.scanned", &["metrics", "queryExecutor", "scanned"]),
            field(
                "metrics.queryExecutor.scannedObjects",
                &["metrics", "queryExecutor", "scannedObjects"],
            ),
        ],
    },
    Section {
        key: &["metrics", "record"],
        eras: ALL,
        fields: &[field("metrics.record.moves", &["metrics", "record", "moves"])],
    },
    Section {
        key: &["metrics", "repl"],
        eras: ALL,
        fields: &[
            field(
                "metrics.repl.apply.batches_num",
                &["metrics", "repl", "apply", "batches", "num"],
            ),
            field(
                "metrics.repl.apply.batches_totalMillis",
                &["metrics", "repl", "apply", "batches", "totalMillis"],
            ),
            field("metrics.repl.apply.ops", &["metrics", "repl", "apply", "ops"]),
            field("metrics.repl.buffer.count", &["metrics", "repl", "buffer", "count"]),
            field(
                "metrics.repl.buffer.maxSizeBytes",
                &["metrics", "repl", "buffer", "maxSizeBytes"],
            ),
            field("metrics.repl.buffer.sizeBytes", &["metrics", "repl", "buffer", "sizeBytes"]),
            field("metrics.repl.network.bytes", &["metrics", "repl", "network", "bytes"]),
            field(
                "metrics.repl.network.getmores_num",
                &["metrics", "repl", "network", "getmores", "num"],
            ),
            field(
                "metrics.repl.network.getmores_totalMillis",
                &["metrics", "repl", "network", "getmores", "totalMillis"],
            ),
            field("metrics.repl.network.ops", &["metrics", "repl", "network", "ops"]),
            field(
                "metrics.repl.network.readersCreated",
                &["metrics", "repl", "network", "readersCreated"],
            ),
            field(
                "metrics.repl.preload.docs_num",
                &["metrics", "repl", "preload", "docs", "num"],
            ),
            field(
                "metrics.repl.preload.docs_totalMillis",
                &["metrics", "repl", "preload", "docs", "totalMillis"],
            ),
            field(
                "metrics.repl.preload.indexes_num",
                &["metrics", "repl", "preload", "indexes", "num"],
            ),
            field(
                "metrics.repl.preload.indexes_totalMillis",
                &["metrics", "repl", "preload", "indexes", "totalMillis"],
            ),
        ],
    },
    // "bucketExhauseted" is the published metric name
    Section {
        key: &["metrics", "storage", "freelist"],
        eras: SINCE_2_6,
        fields: &[
            field(
                "metrics.storage.freelist.search_bucketExhauseted",
                &["metrics", "storage", "freelist", "search", "bucketExhausted"],
            ),
            field(
                "metrics.storage.freelist.search_requests",
                &["metrics", "storage", "freelist", "search", "requests"],
            ),
            field(
                "metrics.storage.freelist.search_scanned",
                &["metrics", "storage", "freelist", "search", "scanned"],
            ),
        ],
    },
    Section {
        key: &["metrics", "ttl"],
        eras: ALL,
        fields: &[
            field("metrics.ttl.deletedDocuments", &["metrics", "ttl", "deletedDocuments"]),
            field("metrics.ttl.passes", &["metrics", "ttl", "passes"]),
        ],
    },
];

/// Fields of the `dbStats` result, emitted as `databaseSizes.<db>.<name>`.
pub const DATABASE_STATS: &[&str] = &[
    "collections",
    "objects",
    "avgObjSize",
    "dataSize",
    "storageSize",
    "numExtents",
    "indexes",
    "indexSize",
    "fileSize",
    "nsSizeMB",
];

/// Index access counters, published below 3.0 either directly under
/// `indexCounters` or nested in `indexCounters.btree`.
pub const INDEX_COUNTERS: &[(&str, &str)] = &[
    ("indexes.hits", "hits"),
    ("indexes.misses", "misses"),
    ("indexes.accesses", "accesses"),
    ("indexes.resets", "resets"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn field_paths_start_at_section_key() {
        for section in SECTIONS {
            for field in section.fields {
                assert!(
                    field.path.starts_with(section.key),
                    "{} is outside of section {:?}",
                    field.name,
                    section.key
                );
            }
        }
    }

    #[test]
    fn metric_names_are_unique_per_era() {
        for era in [Legacy, Transitional, Modern] {
            let mut names = HashSet::new();
            for section in SECTIONS.iter().filter(|section| section.applies_to(era)) {
                for field in section.fields {
                    assert!(names.insert(field.name), "duplicate metric {}", field.name);
                }
            }
        }
    }

    #[test]
    fn cursor_shapes_are_exclusive() {
        let cursor_sections: Vec<_> = SECTIONS
            .iter()
            .filter(|section| section.fields.iter().any(|f| f.name == "cursors.open.total"))
            .collect();
        assert_eq!(cursor_sections.len(), 2);
        for era in [Legacy, Transitional, Modern] {
            let applicable = cursor_sections
                .iter()
                .filter(|section| section.applies_to(era))
                .count();
            assert_eq!(applicable, 1);
        }
    }
}

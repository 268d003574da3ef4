#![allow(dead_code)]

use mongodb::bson::{doc, DateTime, Document};
use mongodb_sensu_component::{MetricMapping, MetricValue};
use mongodb_sensu_receiver::gateway::{self, Command, CommandGateway, Reason, Unavailable};
use std::collections::HashMap;

/// Serves canned command results.
#[derive(Debug, Default, Clone)]
pub struct StaticGateway {
    pub commands: HashMap<Command, Document>,
    pub databases: Vec<(String, Document)>,
}

impl StaticGateway {
    pub fn with(mut self, command: Command, result: Document) -> Self {
        self.commands.insert(command, result);
        self
    }

    pub fn with_database(mut self, name: &str, stats: Document) -> Self {
        self.databases.push((name.to_string(), stats));
        self
    }
}

#[async_trait::async_trait]
impl CommandGateway for StaticGateway {
    async fn fetch(&self, command: Command) -> Result<Document, Unavailable> {
        let result = self.commands.get(&command).cloned().ok_or_else(|| {
            Unavailable::new(command, Reason::NotOk("no such command".to_string()))
        })?;
        gateway::check_ok(command, result)
    }

    async fn list_database_names(&self) -> Result<Vec<String>, Unavailable> {
        Ok(self.databases.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn database_stats(&self, database: &str) -> Result<Document, Unavailable> {
        let stats = self
            .databases
            .iter()
            .find(|(name, _)| name == database)
            .map(|(_, stats)| stats.clone())
            .ok_or_else(|| Unavailable::new(Command::DbStats, Reason::NoDocument))?;
        gateway::check_ok(Command::DbStats, stats)
    }
}

pub fn mapping<'a>(
    metrics: impl IntoIterator<Item = (&'a str, MetricValue)>,
) -> MetricMapping {
    metrics
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

pub fn int(value: i64) -> MetricValue {
    MetricValue::Int(value)
}

pub fn float(value: f64) -> MetricValue {
    MetricValue::Float(value)
}

pub fn text(value: &str) -> MetricValue {
    MetricValue::from(value)
}

pub const OPTIME_MILLIS: i64 = 1_473_400_000_000;

pub fn is_master() -> Document {
    doc! {
        "setName": "rs0",
        "setVersion": 1,
        "ismaster": true,
        "secondary": false,
        "hosts": ["db-0:27017", "db-1:27017"],
        "primary": "db-0:27017",
        "me": "db-0:27017",
        "maxBsonObjectSize": 16_777_216,
        "localTime": DateTime::from_millis(OPTIME_MILLIS),
        "maxWireVersion": 4,
        "minWireVersion": 0,
        "ok": 1.0,
    }
}

pub fn is_secondary() -> Document {
    doc! {
        "setName": "rs0",
        "ismaster": false,
        "secondary": true,
        "primary": "db-0:27017",
        "me": "db-1:27017",
        "ok": 1.0,
    }
}

pub fn db_stats_admin() -> Document {
    doc! {
        "db": "admin",
        "collections": 4,
        "objects": 11,
        "avgObjSize": 106.18181818181819,
        "dataSize": 1168.0,
        "storageSize": 28672.0,
        "numExtents": 4,
        "indexes": 3,
        "indexSize": 24528.0,
        "fileSize": 67108864.0,
        "nsSizeMB": 16,
        "dataFileVersion": { "major": 4, "minor": 5 },
        "extentFreeList": { "num": 0, "totalSize": 0 },
        "ok": 1.0,
    }
}

fn metrics_section(storage_requests: i32, storage_scanned: i32, ttl_passes: i32, inserted: i32) -> Document {
    doc! {
        "cursor": {
            "timedOut": 0_i64,
            "open": { "noTimeout": 0_i64, "pinned": 0_i64, "total": 0_i64 },
        },
        "document": { "deleted": 0_i64, "inserted": inserted as i64, "returned": 0_i64, "updated": 0_i64 },
        "getLastError": {
            "wtime": { "num": 0, "totalMillis": 0 },
            "wtimeouts": 0_i64,
        },
        "operation": { "fastmod": 0_i64, "idhack": 0_i64, "scanAndOrder": 0_i64 },
        "queryExecutor": { "scanned": 0_i64, "scannedObjects": 0_i64 },
        "record": { "moves": 0_i64 },
        "repl": {
            "apply": { "batches": { "num": 0, "totalMillis": 0 }, "ops": 0_i64 },
            "buffer": { "count": 0_i64, "maxSizeBytes": 268_435_456, "sizeBytes": 0_i64 },
            "network": {
                "bytes": 0_i64,
                "getmores": { "num": 0, "totalMillis": 0 },
                "ops": 0_i64,
                "readersCreated": 0_i64,
            },
            "preload": {
                "docs": { "num": 0, "totalMillis": 0 },
                "indexes": { "num": 0, "totalMillis": 0 },
            },
        },
        "storage": {
            "freelist": {
                "search": {
                    "bucketExhausted": 0_i64,
                    "requests": storage_requests as i64,
                    "scanned": storage_scanned as i64,
                },
            },
        },
        "ttl": { "deletedDocuments": 0_i64, "passes": ttl_passes as i64 },
    }
}

pub fn server_status_2_4() -> Document {
    doc! {
        "host": "db-0:27017",
        "version": "2.4.14",
        "process": "mongod",
        "uptime": 4127,
        "asserts": { "regular": 0, "warning": 0, "msg": 0, "user": 2, "rollovers": 0 },
        "backgroundFlushing": {
            "flushes": 68,
            "total_ms": 184,
            "average_ms": 2.7058823529411766,
            "last_ms": 3,
            "last_finished": DateTime::from_millis(OPTIME_MILLIS),
        },
        "connections": { "current": 3, "available": 816 },
        "cursors": {
            "totalOpen": 2,
            "clientCursors_size": 2,
            "timedOut": 1,
            "totalNoTimeout": 1,
            "pinned": 0,
        },
        "globalLock": {
            "totalTime": 4_127_130_000_i64,
            "lockTime": 51_532_i64,
            "ratio": 0.000012486,
            "currentQueue": { "total": 0, "readers": 0, "writers": 0 },
            "activeClients": { "total": 1, "readers": 1, "writers": 0 },
        },
        "indexCounters": {
            "btree": { "accesses": 10, "hits": 9, "misses": 1, "resets": 0, "missRatio": 0.1 },
        },
        "locks": {
            ".": { "timeLockedMicros": { "R": 1_024, "W": 2_048 } },
        },
        "mem": { "bits": 64, "resident": 31, "virtual": 190, "supported": true, "mapped": 32, "mappedWithJournal": 64 },
        "metrics": {
            "cursor": { "timedOut": 7, "open": { "total": 7 } },
            "storage": { "freelist": { "search": { "requests": 3 } } },
        },
        "network": { "bytesIn": 1_024, "bytesOut": 2_048, "numRequests": 16 },
        "opcounters": { "insert": 1, "query": 12, "update": 0, "delete": 0, "getmore": 0, "command": 8 },
        "ok": 1.0,
    }
}

pub fn server_status_2_6_11() -> Document {
    doc! {
        "host": "db-0:27017",
        "version": "2.6.11",
        "process": "mongod",
        "pid": 3_027_i64,
        "uptime": 4_128.0,
        "localTime": DateTime::from_millis(OPTIME_MILLIS),
        "asserts": { "regular": 0, "warning": 0, "msg": 0, "user": 0, "rollovers": 0 },
        "backgroundFlushing": {
            "flushes": 68,
            "total_ms": 184,
            "average_ms": 2.7058823529411766,
            "last_ms": 3,
            "last_finished": DateTime::from_millis(OPTIME_MILLIS),
        },
        "connections": { "current": 1, "available": 52_427, "totalCreated": 37_i64 },
        "cursors": {
            "note": "deprecated, use server status metrics",
            "clientCursors_size": 0,
            "totalOpen": 0,
            "pinned": 0,
            "totalNoTimeout": 0,
            "timedOut": 0,
        },
        "dur": {
            "commits": 30,
            "journaledMB": 0,
            "writeToDataFilesMB": 0,
            "compression": 0,
            "commitsInWriteLock": 0,
            "earlyCommits": 0,
            "timeMs": {
                "dt": 3_066,
                "prepLogBuffer": 0,
                "writeToJournal": 0,
                "writeToDataFiles": 0,
                "remapPrivateView": 0,
            },
        },
        "extra_info": {
            "note": "fields vary by platform",
            "heap_usage_bytes": { "floatApprox": 62_525_976.0 },
            "page_faults": 236,
        },
        "globalLock": {
            "totalTime": 4_127_130_000_i64,
            "lockTime": 0_i64,
            "currentQueue": { "total": 0, "readers": 0, "writers": 0 },
            "activeClients": { "total": 0, "readers": 0, "writers": 0 },
        },
        "indexCounters": { "accesses": 2, "hits": 2, "misses": 0, "resets": 0, "missRatio": 0.0 },
        "locks": {
            ".": {
                "timeLockedMicros": { "R": 1_264, "W": 3_207 },
                "timeAcquiringMicros": { "R": 498, "W": 37 },
            },
            "admin": { "timeLockedMicros": { "r": 377, "w": 0 } },
        },
        "network": { "bytesIn": 3_375, "bytesOut": 56_884, "numRequests": 53 },
        "opcounters": { "insert": 1, "query": 137, "update": 0, "delete": 0, "getmore": 0, "command": 55 },
        "opcountersRepl": { "insert": 0, "query": 0, "update": 0, "delete": 0, "getmore": 0, "command": 0 },
        "mem": { "bits": 64, "resident": 43, "virtual": 343, "supported": true, "mapped": 80, "mappedWithJournal": 160 },
        "metrics": metrics_section(6, 11, 68, 1),
        "writeBacksQueued": false,
        "ok": 1.0,
    }
}

pub fn server_status_3_2_9() -> Document {
    doc! {
        "host": "db-0:27017",
        "version": "3.2.9",
        "process": "mongod",
        "uptime": 4_262.0,
        "localTime": DateTime::from_millis(OPTIME_MILLIS),
        "asserts": { "regular": 0, "warning": 0, "msg": 0, "user": 0, "rollovers": 0 },
        "connections": { "current": 1, "available": 52_427, "totalCreated": 76_i64 },
        "extra_info": {
            "note": "fields vary by platform",
            "heap_usage_bytes": 60_214_264,
            "page_faults": 256,
        },
        "globalLock": {
            "totalTime": 4_261_830_000_i64,
            "currentQueue": { "total": 0, "readers": 0, "writers": 0 },
            "activeClients": { "total": 8, "readers": 0, "writers": 0 },
        },
        "locks": {
            "Global": { "acquireCount": { "r": 2_290_i64, "w": 32_i64, "W": 4_i64 } },
            "Database": {
                "acquireCount": { "r": 1_142_i64, "W": 8_i64 },
                "acquireWaitCount": { "W": 1_i64 },
                "timeAcquiringMicros": { "W": 37_i64 },
            },
            "Collection": { "acquireCount": { "r": 1_142_i64 } },
            "Metadata": {},
        },
        "network": { "bytesIn": 4_567, "bytesOut": 489_982, "numRequests": 77 },
        "opcounters": { "insert": 0, "query": 1, "update": 0, "delete": 0, "getmore": 0, "command": 78 },
        "opcountersRepl": { "insert": 0, "query": 0, "update": 0, "delete": 0, "getmore": 0, "command": 0 },
        "storageEngine": { "name": "wiredTiger", "supportsCommittedReads": true, "persistent": true },
        "tcmalloc": {
            "generic": { "current_allocated_bytes": 58_984_016_i64, "heap_size": 64_421_888_i64 },
            "tcmalloc": { "pageheap_free_bytes": 1_269_760_i64 },
        },
        "wiredTiger": {
            "uri": "statistics:",
            "block-manager": { "blocks read": 1, "blocks written": 19, "mapped blocks read": 0 },
            "cache": {
                "bytes currently in the cache": 44_843,
                "maximum bytes configured": { "floatApprox": 8_589_934_592.0 },
                "tracked dirty bytes in the cache": 0,
            },
            "concurrentTransactions": {
                "write": { "out": 0, "available": 128, "totalTickets": 128 },
                "read": { "out": 1, "available": 127, "totalTickets": 128 },
            },
            "log": { "log flush operations": 42_581, "log bytes written": 9_728 },
            "session": { "open session count": 16 },
            "transaction": {
                "transaction checkpoint currently running": 0,
                "transaction checkpoint max time (msecs)": 32,
                "transactions committed": 3,
            },
        },
        "mem": { "bits": 64, "resident": 49, "virtual": 245, "supported": true, "mapped": 0, "mappedWithJournal": 0 },
        "metrics": metrics_section(0, 0, 71, 0),
        "ok": 1.0,
    }
}

pub fn replica_set_status() -> Document {
    doc! {
        "set": "rs0",
        "date": DateTime::from_millis(OPTIME_MILLIS + 2_000),
        "myState": 1,
        "term": 3_i64,
        "heartbeatIntervalMillis": 2_000_i64,
        "members": [
            {
                "_id": 0,
                "name": "db-0:27017",
                "health": 1.0,
                "state": 1,
                "stateStr": "PRIMARY",
                "uptime": 4_262,
                "optimeDate": DateTime::from_millis(OPTIME_MILLIS),
                "electionDate": DateTime::from_millis(OPTIME_MILLIS - 4_000_000),
                "configVersion": 1,
                "self": true,
            },
            {
                "_id": 1,
                "name": "db-1:27017",
                "health": 1.0,
                "state": 2,
                "stateStr": "SECONDARY",
                "uptime": 4_250,
                "optimeDate": DateTime::from_millis(OPTIME_MILLIS - 125_000),
                "lastHeartbeat": DateTime::from_millis(OPTIME_MILLIS + 1_000),
                "lastHeartbeatRecv": DateTime::from_millis(OPTIME_MILLIS),
                "pingMs": 0_i64,
                "syncingTo": "db-0:27017",
                "configVersion": 1,
            },
            {
                "_id": 2,
                "name": "db-2:27017",
                "health": 0.0,
                "state": 8,
                "stateStr": "(not reachable/healthy)",
                "uptime": 0,
                "lastHeartbeat": DateTime::from_millis(OPTIME_MILLIS + 1_500),
                "pingMs": 0_i64,
                "configVersion": -1,
            },
        ],
        "ok": 1.0,
    }
}

pub fn standalone_replica_set_status() -> Document {
    doc! {
        "ok": 0.0,
        "errmsg": "not running with --replSet",
        "code": 76,
    }
}

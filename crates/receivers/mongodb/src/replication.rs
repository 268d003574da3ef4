use crate::attributes::MemberState;
use crate::doc;
use crate::flatten;
use crate::normalize::{RawMetrics, RawValue};
use mongodb::bson::{self, Bson};
use mongodb_sensu_component::MetricValue;
use serde::Deserialize;
use tracing::warn;

const MILLIS_PER_SECOND: i64 = 1_000;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;

/// One entry of the `members` array of `replSetGetStatus`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSetMember {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub health: Option<f64>,
    pub state: Option<i64>,
    pub state_str: String,
    pub optime_date: Option<bson::DateTime>,
    pub uptime: Option<i64>,
    pub last_heartbeat: Option<bson::DateTime>,
    pub last_heartbeat_recv: Option<bson::DateTime>,
    pub ping_ms: Option<i64>,
    #[serde(alias = "syncSourceHost")]
    pub syncing_to: Option<String>,
    pub config_version: Option<i64>,
}

impl ReplicaSetMember {
    pub fn member_state(&self) -> MemberState {
        MemberState::from_label(&self.state_str)
    }

    pub fn prefix(&self) -> String {
        format!("member_{}", self.id)
    }
}

/// Which primary secondaries are compared against.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq, strum::IntoStaticStr)]
pub enum LagReference {
    /// The most recent primary preceding the secondary in member order.
    ///
    /// Secondaries listed before any primary get no lag metrics.
    #[default]
    #[strum(serialize = "in-order")]
    InOrder,
    /// The first primary of the whole member list, regardless of order.
    #[strum(serialize = "primary-first")]
    PrimaryFirst,
}

/// Replication lag of a secondary behind its reference primary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Lag {
    pub seconds: i64,
}

impl Lag {
    pub fn between(primary: bson::DateTime, secondary: bson::DateTime) -> Self {
        let millis = primary.timestamp_millis() - secondary.timestamp_millis();
        Self {
            seconds: millis / MILLIS_PER_SECOND,
        }
    }

    pub fn minutes(&self) -> i64 {
        self.seconds / SECONDS_PER_MINUTE
    }

    pub fn hours(&self) -> i64 {
        self.seconds / SECONDS_PER_HOUR
    }
}

/// Parses the `members` array of a `replSetGetStatus` result.
///
/// Members that do not deserialize are skipped.
pub fn members(replica_set_status: &Bson) -> Vec<ReplicaSetMember> {
    let members = match doc::lookup(replica_set_status, &["members"]) {
        Ok(Bson::Array(members)) => members,
        Ok(other) => {
            warn!("unexpected replica set members {:?}", other);
            return Vec::new();
        }
        Err(_) => return Vec::new(),
    };
    members
        .iter()
        .enumerate()
        .filter_map(|(idx, member)| {
            let Bson::Document(member) = member else {
                warn!("skipping replica set member {}: not a document", idx);
                return None;
            };
            match bson::from_document::<ReplicaSetMember>(member.clone()) {
                Ok(member) => Some(member),
                Err(err) => {
                    warn!("skipping replica set member {}: {}", idx, err);
                    None
                }
            }
        })
        .collect()
}

fn date(value: Option<bson::DateTime>) -> RawValue {
    value
        .map(|date| RawValue::from(date.timestamp_millis() / MILLIS_PER_SECOND))
        .unwrap_or(RawValue::Absent)
}

fn optional<T: Into<MetricValue>>(value: Option<T>) -> RawValue {
    value
        .map(|value| RawValue::Value(value.into()))
        .unwrap_or(RawValue::Absent)
}

fn record_member(member: &ReplicaSetMember, lag: Option<Lag>, metrics: &mut RawMetrics) {
    let prefix = member.prefix();
    let name = |field: &str| format!("{}.{}", prefix, field);

    metrics.insert(name("id"), member.id);
    metrics.insert(name("name"), member.name.as_str());
    metrics.insert(name("health"), optional(member.health));
    metrics.insert(name("state"), optional(member.state));
    metrics.insert(name("stateStr"), member.state_str.as_str());
    if member.member_state() == MemberState::Primary {
        metrics.insert(name("primary.startOptimeDate"), date(member.optime_date));
    }
    if let Some(lag) = lag {
        metrics.insert(name("secondsBehindPrimary"), lag.seconds);
        metrics.insert(name("minutesBehindPrimary"), lag.minutes());
        metrics.insert(name("hoursBehindPrimary"), lag.hours());
    }
    metrics.insert(name("optimeDate"), date(member.optime_date));
    metrics.insert(name("uptime"), optional(member.uptime));
    metrics.insert(name("lastHeartbeat"), date(member.last_heartbeat));
    metrics.insert(name("lastHeartbeatRecv"), date(member.last_heartbeat_recv));
    metrics.insert(name("pingMs"), optional(member.ping_ms));
    metrics.insert(name("syncingTo"), optional(member.syncing_to.clone()));
    metrics.insert(name("configVersion"), optional(member.config_version));
}

/// Per-member metrics under `member_<id>.`, including the lag of every
/// secondary behind the primary.
pub fn compute_lag(members: &[ReplicaSetMember], reference: LagReference) -> RawMetrics {
    let mut metrics = RawMetrics::new();
    let mut primary_optime = match reference {
        LagReference::InOrder => None,
        LagReference::PrimaryFirst => members
            .iter()
            .find(|member| member.member_state() == MemberState::Primary)
            .and_then(|primary| primary.optime_date),
    };

    for member in members {
        let lag = match member.member_state() {
            MemberState::Primary => {
                if reference == LagReference::InOrder {
                    primary_optime = member.optime_date;
                }
                None
            }
            MemberState::Secondary => primary_optime
                .zip(member.optime_date)
                .map(|(primary, secondary)| Lag::between(primary, secondary)),
            MemberState::Other(_) => None,
        };
        record_member(member, lag, &mut metrics);
    }
    metrics
}

/// Summary of the replica set under `replication.`.
pub fn replica_set_summary(
    replica_set_status: &Bson,
    errors: &mut Vec<flatten::Error>,
) -> RawMetrics {
    const FIELDS: &[(&str, &str)] = &[
        ("replication.replica_set", "set"),
        ("replication.date", "date"),
        ("replication.myState", "myState"),
        ("replication.term", "term"),
        ("replication.heartbeatIntervalMillis", "heartbeatIntervalMillis"),
    ];
    let mut metrics = RawMetrics::new();
    for &(metric, key) in FIELDS {
        flatten::record_field(replica_set_status, metric, &[key], &mut metrics, errors);
    }
    metrics
}

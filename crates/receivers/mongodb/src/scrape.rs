use crate::doc::{self, QueryError};
use crate::flatten::{self, DatabaseStats, Flattener, StatusInput};
use crate::gateway::{Command, CommandGateway};
use crate::normalize::normalize;
use crate::replication::{self, LagReference};
use crate::{role, Error};
use mongodb::bson::Bson;
use mongodb_sensu_component::MetricMapping;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Collect `dbStats` of every database visible to the connection.
    pub database_sizes: bool,
    pub lag_reference: LagReference,
}

/// Runs one snapshot-and-flatten pass against a single server.
#[derive(Debug)]
pub struct Collector<G> {
    gateway: G,
    options: Options,
}

impl<G> Collector<G>
where
    G: CommandGateway,
{
    pub fn new(gateway: G, options: Options) -> Self {
        Self { gateway, options }
    }

    pub async fn is_primary(&self) -> bool {
        role::is_primary(&self.gateway).await
    }

    /// Flattened server status, database sizes and replica set state.
    ///
    /// Fails only when the server status itself is unavailable or lacks its
    /// version.
    pub async fn server_metrics(&self) -> Result<MetricMapping, Error> {
        let start = std::time::Instant::now();

        let server_status = Bson::Document(self.gateway.fetch(Command::ServerStatus).await?);
        let flattener = Flattener::from_server_status(&server_status)?;
        debug!(
            version = %flattener.version(),
            era = flattener.era().as_str(),
            "classified server"
        );

        let replica_set_status = self.replica_set_status().await;
        let database_stats = if self.options.database_sizes {
            self.database_stats().await
        } else {
            Vec::new()
        };

        let input = StatusInput {
            server_status: &server_status,
            replica_set_status: replica_set_status.as_ref(),
            database_stats: &database_stats,
        };
        let mut errors = Vec::new();
        let metrics = normalize(flattener.flatten(&input, &mut errors));
        log_errors(&errors);

        debug!(count = metrics.len(), "completed in {:?}", start.elapsed());
        Ok(metrics)
    }

    /// Replica set summary and per-member metrics.
    ///
    /// Empty when the node is not part of a replica set.
    pub async fn replication_metrics(&self) -> MetricMapping {
        let Some(replica_set_status) = self.replica_set_status().await else {
            return MetricMapping::new();
        };
        let mut errors = Vec::new();
        let mut metrics = replication::replica_set_summary(&replica_set_status, &mut errors);
        let members = replication::members(&replica_set_status);
        trace!(members = members.len(), reference = ?self.options.lag_reference);
        metrics.extend(replication::compute_lag(
            &members,
            self.options.lag_reference,
        ));
        log_errors(&errors);
        normalize(metrics)
    }

    async fn replica_set_status(&self) -> Option<Bson> {
        match self.gateway.fetch(Command::ReplSetGetStatus).await {
            Ok(status) => Some(Bson::Document(status)),
            Err(err) => {
                debug!("{}", err);
                None
            }
        }
    }

    async fn database_stats(&self) -> Vec<DatabaseStats> {
        let names = match self.gateway.list_database_names().await {
            Ok(names) => names,
            Err(err) => {
                warn!("{}", err);
                return Vec::new();
            }
        };
        let mut database_stats = Vec::with_capacity(names.len());
        for name in names {
            match self.gateway.database_stats(&name).await {
                Ok(stats) => database_stats.push(DatabaseStats {
                    name,
                    stats: Bson::Document(stats),
                }),
                Err(err) => warn!(database = %name, "{}", err),
            }
        }
        database_stats
    }
}

fn log_errors(errors: &[flatten::Error]) {
    for err in errors {
        warn!("{}", err);
        let flatten::Error::CollectMetric { source, .. } = err;
        match &source.source {
            QueryError::InvalidType(invalid) => {
                trace!(
                    "[{}] = {:#}",
                    source.path,
                    doc::omit_values(invalid.value.clone(), 1)
                );
            }
            QueryError::NotFound {
                partial_match: Some(partial_match),
            } => {
                trace!(
                    "[{}] = {:#}",
                    partial_match.path,
                    doc::omit_values(partial_match.value.clone(), 1)
                );
            }
            QueryError::NotFound { .. } => {}
        }
    }
}

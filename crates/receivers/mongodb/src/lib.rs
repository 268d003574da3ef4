pub mod attributes;
pub mod doc;
pub mod flatten;
pub mod gateway;
pub mod normalize;
pub mod replication;
pub mod role;
pub mod scrape;
pub mod version;

pub use gateway::{Command, CommandGateway, Connection, Unavailable};
pub use scrape::{Collector, Options};

use mongodb_sensu_component::ExitStatus;

pub const APPLICATION_NAME: &str = "mongodb-sensu";

/// Class of a failed collection pass.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum FailureKind {
    /// The database could not be reached.
    Connectivity,
    /// The database was reached but its status could not be collected.
    Collection,
}

impl From<FailureKind> for ExitStatus {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Connectivity => ExitStatus::ConnectionFailed,
            FailureKind::Collection => ExitStatus::CollectionFailed,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to connect to {address}")]
    Connect {
        address: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error(transparent)]
    Unavailable(#[from] gateway::Unavailable),
    #[error("server status is missing mandatory field {field:?}")]
    MissingField {
        field: &'static str,
        #[source]
        source: doc::Error,
    },
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connect { .. } => FailureKind::Connectivity,
            Self::Unavailable(err) if err.is_connectivity() => FailureKind::Connectivity,
            Self::Unavailable(_) | Self::MissingField { .. } => FailureKind::Collection,
        }
    }
}

use crate::Error;
use mongodb::{
    bson::{Bson, Document},
    error::ErrorKind,
    options::{ClientOptions, Credential, ServerAddress, Tls, TlsOptions},
    Client,
};
use mongodb_sensu_component::config::ConnectionConfig;
use tracing::{debug, info};

pub const ADMIN_DATABASE: &str = "admin";

/// Administrative commands issued by the collector.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::IntoStaticStr)]
pub enum Command {
    #[strum(serialize = "serverStatus")]
    ServerStatus,
    #[strum(serialize = "isMaster")]
    IsMaster,
    #[strum(serialize = "replSetGetStatus")]
    ReplSetGetStatus,
    #[strum(serialize = "dbStats")]
    DbStats,
    #[strum(serialize = "ping")]
    Ping,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn document(&self) -> Document {
        let mut document = Document::new();
        document.insert(self.as_str(), 1);
        document
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Reason {
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
    #[error("command reported failure: {0}")]
    NotOk(String),
    #[error("no result document")]
    NoDocument,
}

/// The command produced no usable result.
///
/// This is the expected outcome for commands that do not apply to the node,
/// e.g. `replSetGetStatus` on a standalone server.
#[derive(thiserror::Error, Debug)]
#[error("{command} unavailable: {reason}")]
pub struct Unavailable {
    pub command: String,
    #[source]
    pub reason: Reason,
}

impl Unavailable {
    pub fn new(command: impl std::fmt::Display, reason: impl Into<Reason>) -> Self {
        Self {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the server could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        match &self.reason {
            Reason::Driver(err) => matches!(
                *err.kind,
                ErrorKind::Io(_)
                    | ErrorKind::ServerSelection { .. }
                    | ErrorKind::ConnectionPoolCleared { .. }
            ),
            Reason::NotOk(_) | Reason::NoDocument => false,
        }
    }
}

/// Source of administrative command results.
#[async_trait::async_trait]
pub trait CommandGateway: Send + Sync {
    async fn fetch(&self, command: Command) -> Result<Document, Unavailable>;

    async fn list_database_names(&self) -> Result<Vec<String>, Unavailable>;

    async fn database_stats(&self, database: &str) -> Result<Document, Unavailable>;
}

/// Checks the `ok` field of a command result.
pub fn check_ok(command: impl std::fmt::Display, result: Document) -> Result<Document, Unavailable> {
    if result.is_empty() {
        return Err(Unavailable::new(command, Reason::NoDocument));
    }
    let ok = match result.get("ok") {
        Some(Bson::Double(ok)) => *ok == 1.0,
        Some(Bson::Int32(ok)) => *ok == 1,
        Some(Bson::Int64(ok)) => *ok == 1,
        Some(Bson::Boolean(ok)) => *ok,
        _ => false,
    };
    if ok {
        Ok(result)
    } else {
        let message = result
            .get_str("errmsg")
            .map(str::to_string)
            .unwrap_or_else(|_| format!("ok = {:?}", result.get("ok")));
        Err(Unavailable::new(command, Reason::NotOk(message)))
    }
}

/// Established connection to a single server.
#[derive(Debug, Clone)]
pub struct Connection {
    client: Client,
}

impl Connection {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, Error> {
        let address = config.address();
        let connect_error = |source| Error::Connect {
            address: address.clone(),
            source,
        };

        let host = ServerAddress::parse(&address).map_err(connect_error)?;
        let mut options = ClientOptions::builder().hosts(vec![host]).build();
        options.direct_connection = Some(true);
        options.app_name = Some(crate::APPLICATION_NAME.to_string());
        options.connect_timeout = config.connect_timeout.clone().map(Into::into);
        options.server_selection_timeout = config.server_selection_timeout.clone().map(Into::into);

        if let Some(username) = &config.username {
            let mut credential = Credential::default();
            credential.username = Some(username.clone());
            credential.password = config.password.clone();
            credential.source = Some(config.auth_database().to_string());
            options.credential = Some(credential);
        }

        if let Some(tls) = &config.tls {
            let mut tls_options = TlsOptions::default();
            tls_options.allow_invalid_certificates = tls.insecure;
            tls_options.ca_file_path = tls.ca_file.clone();
            tls_options.cert_key_file_path = tls.cert_key_file.clone();
            options.tls = Some(Tls::Enabled(tls_options));
        }

        let client = Client::with_options(options).map_err(connect_error)?;

        // the driver connects lazily, ping to confirm the server is reachable
        client
            .database(ADMIN_DATABASE)
            .run_command(Command::Ping.document())
            .await
            .map_err(connect_error)?;

        info!(%address, "connected to database");
        Ok(Self { client })
    }

    async fn run_command(
        &self,
        database: &str,
        command: Command,
    ) -> Result<Document, Unavailable> {
        debug!(database, %command, "running command");
        let result = self
            .client
            .database(database)
            .run_command(command.document())
            .await
            .map_err(|err| Unavailable::new(command, err))?;
        check_ok(command, result)
    }
}

#[async_trait::async_trait]
impl CommandGateway for Connection {
    async fn fetch(&self, command: Command) -> Result<Document, Unavailable> {
        self.run_command(ADMIN_DATABASE, command).await
    }

    async fn list_database_names(&self) -> Result<Vec<String>, Unavailable> {
        self.client
            .list_database_names()
            .await
            .map_err(|err| Unavailable::new("listDatabases", err))
    }

    async fn database_stats(&self, database: &str) -> Result<Document, Unavailable> {
        self.run_command(database, Command::DbStats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn command_documents() {
        assert_eq!(Command::ServerStatus.document(), doc! { "serverStatus": 1 });
        assert_eq!(Command::IsMaster.to_string(), "isMaster");
    }

    #[test]
    fn accepts_ok_results() {
        let result = check_ok(Command::IsMaster, doc! { "ismaster": true, "ok": 1.0 });
        assert!(result.is_ok());
        let result = check_ok(Command::IsMaster, doc! { "ismaster": true, "ok": 1 });
        assert!(result.is_ok());
    }

    #[test]
    fn failed_results_are_unavailable() {
        let err = check_ok(
            Command::ReplSetGetStatus,
            doc! { "ok": 0.0, "errmsg": "not running with --replSet", "code": 76 },
        )
        .unwrap_err();
        assert_eq!(err.command, "replSetGetStatus");
        assert!(matches!(err.reason, Reason::NotOk(ref msg) if msg == "not running with --replSet"));
        assert!(!err.is_connectivity());

        let err = check_ok(Command::ServerStatus, Document::new()).unwrap_err();
        assert!(matches!(err.reason, Reason::NoDocument));
    }

    #[test]
    fn io_errors_are_connectivity_failures() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = Unavailable::new(Command::ServerStatus, mongodb::error::Error::from(refused));
        assert!(err.is_connectivity());
        assert_eq!(crate::Error::from(err).kind(), crate::FailureKind::Connectivity);
    }

    #[test]
    fn command_failures_are_collection_failures() {
        let err = check_ok(
            Command::ServerStatus,
            doc! { "ok": 0.0, "errmsg": "not authorized on admin to execute command" },
        )
        .unwrap_err();
        assert!(!err.is_connectivity());
        assert_eq!(crate::Error::from(err).kind(), crate::FailureKind::Collection);

        let err = Unavailable::new(Command::IsMaster, Reason::NoDocument);
        assert_eq!(crate::Error::from(err).kind(), crate::FailureKind::Collection);
    }
}

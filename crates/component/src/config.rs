use color_eyre::eyre;
use duration_string::DurationString;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_AUTH_DATABASE: &str = "admin";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct TlsConfig {
    /// Accept certificates that fail peer validation.
    pub insecure: Option<bool>,
    /// PEM file holding the client certificate followed by its private key.
    pub cert_key_file: Option<PathBuf>,
    /// PEM bundle of certificate authorities used to validate the server.
    pub ca_file: Option<PathBuf>,
}

#[derive(Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_database: Option<String>,
    pub connect_timeout: Option<DurationString>,
    pub server_selection_timeout: Option<DurationString>,
    pub tls: Option<TlsConfig>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("auth_database", &self.auth_database)
            .field("connect_timeout", &self.connect_timeout)
            .field("server_selection_timeout", &self.server_selection_timeout)
            .field("tls", &self.tls)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn auth_database(&self) -> &str {
        self.auth_database.as_deref().unwrap_or(DEFAULT_AUTH_DATABASE)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }

    /// Layers `overrides` on top of this config.
    ///
    /// Every option set in `overrides` wins, unset options fall back to `self`.
    pub fn merge(self, overrides: ConnectionConfig) -> Self {
        Self {
            host: overrides.host.or(self.host),
            port: overrides.port.or(self.port),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
            auth_database: overrides.auth_database.or(self.auth_database),
            connect_timeout: overrides.connect_timeout.or(self.connect_timeout),
            server_selection_timeout: overrides
                .server_selection_timeout
                .or(self.server_selection_timeout),
            tls: overrides.tls.or(self.tls),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Prefix of every emitted metric name.
    pub scheme: Option<String>,
    /// Collect `dbStats` for every database visible to the connection.
    pub database_sizes: Option<bool>,
}

impl Config {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> eyre::Result<Self> {
        let file = std::fs::OpenOptions::new().read(true).open(path)?;
        let reader = std::io::BufReader::new(file);
        Self::from_reader(reader)
    }

    pub fn from_reader(reader: impl std::io::BufRead) -> eyre::Result<Self> {
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }
}

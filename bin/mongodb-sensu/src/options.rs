use duration_string::DurationString;
use mongodb_sensu_component::config::{ConnectionConfig, TlsConfig};
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Options {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[arg(
        long = "config",
        aliases = ["conf"],
        global = true,
        env = "MONGODB_SENSU_CONFIG",
        help = "Path to YAML config file"
    )]
    pub config_path: Option<PathBuf>,
    #[arg(long = "debug", global = true, help = "Log at debug level")]
    pub debug: bool,
    #[command(subcommand)]
    pub plugin: Plugin,
}

#[derive(Clone, Default, clap::Args)]
pub struct ConnectionArgs {
    #[arg(long = "host", global = true, env = "MONGODB_HOST", help = "MongoDB host [default: localhost]")]
    pub host: Option<String>,
    #[arg(long = "port", global = true, env = "MONGODB_PORT", help = "MongoDB port [default: 27017]")]
    pub port: Option<u16>,
    #[arg(long = "user", global = true, env = "MONGODB_USER", help = "MongoDB user")]
    pub user: Option<String>,
    #[arg(
        long = "password",
        global = true,
        env = "MONGODB_PASSWORD",
        hide_env_values = true,
        help = "MongoDB password"
    )]
    pub password: Option<String>,
    #[arg(
        long = "auth-database",
        global = true,
        env = "MONGODB_AUTH_DATABASE",
        help = "Database to authenticate against [default: admin]"
    )]
    pub auth_database: Option<String>,
    #[arg(long = "ssl", global = true, env = "MONGODB_SSL", help = "Connect using TLS")]
    pub ssl: bool,
    #[arg(
        long = "ssl-cert",
        global = true,
        env = "MONGODB_SSL_CERT",
        help = "PEM file with the client certificate and its private key"
    )]
    pub ssl_cert: Option<PathBuf>,
    #[arg(
        long = "ssl-ca-cert",
        global = true,
        env = "MONGODB_SSL_CA_CERT",
        help = "PEM file with the certificate authorities"
    )]
    pub ssl_ca_cert: Option<PathBuf>,
    #[arg(
        long = "ssl-verify",
        global = true,
        env = "MONGODB_SSL_VERIFY",
        help = "Verify the server certificate"
    )]
    pub ssl_verify: bool,
    #[arg(
        long = "connect-timeout",
        global = true,
        env = "MONGODB_CONNECT_TIMEOUT",
        value_parser = parse_duration,
        help = "Connect timeout, e.g. 5s"
    )]
    pub connect_timeout: Option<DurationString>,
    #[arg(
        long = "server-selection-timeout",
        global = true,
        env = "MONGODB_SERVER_SELECTION_TIMEOUT",
        value_parser = parse_duration,
        help = "Server selection timeout, e.g. 30s"
    )]
    pub server_selection_timeout: Option<DurationString>,
}

fn parse_duration(value: &str) -> Result<DurationString, String> {
    DurationString::try_from(value.to_string()).map_err(|err| err.to_string())
}

impl ConnectionArgs {
    /// Connection options given on the command line.
    ///
    /// Unset options stay `None` so they can be layered over the config file.
    pub fn into_config(self) -> ConnectionConfig {
        let tls = self.ssl.then(|| TlsConfig {
            insecure: Some(!self.ssl_verify),
            cert_key_file: self.ssl_cert,
            ca_file: self.ssl_ca_cert,
        });
        ConnectionConfig {
            host: self.host,
            port: self.port,
            username: self.user,
            password: self.password,
            auth_database: self.auth_database,
            connect_timeout: self.connect_timeout,
            server_selection_timeout: self.server_selection_timeout,
            tls,
        }
    }
}

impl std::fmt::Debug for ConnectionArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.clone().into_config(), f)
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Plugin {
    /// Print server status metrics as graphite lines
    Metrics(MetricsArgs),
    /// Print replica set member metrics as graphite lines
    Replication(ReplicationArgs),
    /// Check a single metric against thresholds
    Check(CheckArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct MetricsArgs {
    #[arg(short = 's', long = "scheme", help = "Metric naming scheme [default: <hostname>.mongodb]")]
    pub scheme: Option<String>,
    #[arg(long = "require-master", help = "Print nothing unless the node is the primary")]
    pub require_master: bool,
    #[arg(long = "no-database-sizes", help = "Skip dbStats of every database")]
    pub no_database_sizes: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ReplicationArgs {
    #[arg(short = 's', long = "scheme", help = "Metric naming scheme [default: <hostname>.mongodb]")]
    pub scheme: Option<String>,
    #[arg(
        long = "primary-first",
        help = "Measure lag against the first primary instead of the preceding one"
    )]
    pub primary_first: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    #[arg(short = 'm', long = "metric", help = "Name of the metric to check")]
    pub metric: String,
    #[arg(short = 'w', long = "warn", default_value_t = 0.0, help = "Warning threshold")]
    pub warn: f64,
    #[arg(short = 'c', long = "crit", default_value_t = 0.0, help = "Critical threshold")]
    pub crit: f64,
    #[arg(long = "require-master", help = "Warn unless the node is the primary")]
    pub require_master: bool,
}

/// `<hostname>.mongodb`, the scheme used when none is configured.
pub fn default_scheme() -> String {
    let hostname = std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/proc/sys/kernel/hostname").ok())
        .map(|hostname| hostname.trim().to_string())
        .filter(|hostname| !hostname.is_empty())
        .unwrap_or_else(|| "localhost".to_string());
    format!("{}.mongodb", hostname)
}

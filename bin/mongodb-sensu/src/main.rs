mod options;

use clap::Parser;
use color_eyre::eyre;
use mongodb_sensu_component::config::Config;
use mongodb_sensu_component::{ExitStatus, MetricsConsumer};
use mongodb_sensu_exporter::{unix_timestamp, CheckOutcome, GraphiteWriter, ThresholdCheck};
use mongodb_sensu_receiver::replication::LagReference;
use mongodb_sensu_receiver::{Collector, CommandGateway, Connection, APPLICATION_NAME};
use opentelemetry::trace::TracerProvider as TracerProviderTrait;
use opentelemetry_sdk::trace::TracerProvider;
use options::{CheckArgs, MetricsArgs, Options, Plugin, ReplicationArgs};
use tracing::{debug, error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;

fn setup_telemetry(debug: bool) -> eyre::Result<()> {
    let provider = TracerProvider::builder().build();
    let tracer = provider.tracer(APPLICATION_NAME);
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    // stdout is reserved for plugin output
    let subscriber = tracing_subscriber::registry()
        .with(telemetry)
        .with(
            tracing_subscriber::fmt::Layer::new()
                .compact()
                .with_writer(std::io::stderr),
        )
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn graphite(scheme: Option<String>, config: &Config) -> GraphiteWriter<std::io::StdoutLock<'static>> {
    let scheme = scheme
        .or_else(|| config.scheme.clone())
        .unwrap_or_else(options::default_scheme);
    GraphiteWriter::new(scheme, unix_timestamp(), std::io::stdout().lock())
}

async fn metrics(
    connection: Connection,
    args: MetricsArgs,
    config: &Config,
) -> eyre::Result<ExitStatus> {
    let options = mongodb_sensu_receiver::Options {
        database_sizes: config.database_sizes.unwrap_or(true) && !args.no_database_sizes,
        ..Default::default()
    };
    let collector = Collector::new(connection, options);
    if args.require_master && !collector.is_primary().await {
        info!("not the primary, skipping collection");
        return Ok(ExitStatus::Ok);
    }
    let metrics = match collector.server_metrics().await {
        Ok(metrics) => metrics,
        Err(err) => {
            error!("{}", err);
            return Ok(err.kind().into());
        }
    };
    graphite(args.scheme, config).consume(&metrics)?;
    Ok(ExitStatus::Ok)
}

async fn replication(
    connection: Connection,
    args: ReplicationArgs,
    config: &Config,
) -> eyre::Result<ExitStatus> {
    let lag_reference = if args.primary_first {
        LagReference::PrimaryFirst
    } else {
        LagReference::InOrder
    };
    let options = mongodb_sensu_receiver::Options {
        lag_reference,
        ..Default::default()
    };
    let collector = Collector::new(connection, options);
    let metrics = collector.replication_metrics().await;
    graphite(args.scheme, config).consume(&metrics)?;
    Ok(ExitStatus::Ok)
}

async fn check<G>(gateway: G, args: CheckArgs, config: &Config) -> eyre::Result<CheckOutcome>
where
    G: CommandGateway,
{
    let options = mongodb_sensu_receiver::Options {
        database_sizes: config.database_sizes.unwrap_or(true),
        ..Default::default()
    };
    let collector = Collector::new(gateway, options);
    if args.require_master && !collector.is_primary().await {
        return Ok(CheckOutcome::new(
            ExitStatus::Warning,
            "The node is not the primary.",
        ));
    }
    let metrics = match collector.server_metrics().await {
        Ok(metrics) => metrics,
        Err(err) => return Ok(CheckOutcome::new(err.kind().into(), err.to_string())),
    };
    ThresholdCheck::new(args.metric, args.warn, args.crit).consume(&metrics)
}

async fn run(options: Options) -> eyre::Result<ExitStatus> {
    let config = match &options.config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let connection_config = config
        .connection
        .clone()
        .merge(options.connection.into_config());
    debug!(config = ?connection_config, plugin = ?options.plugin, "arguments");

    let connection = match Connection::connect(&connection_config).await {
        Ok(connection) => connection,
        Err(err) => {
            let status = ExitStatus::from(err.kind());
            error!("{:?}", eyre::Report::new(err));
            if let Plugin::Check(_) = options.plugin {
                let outcome = CheckOutcome::new(
                    status,
                    format!("Unable to connect to {}", connection_config.address()),
                );
                println!("{}", outcome);
            }
            return Ok(status);
        }
    };

    match options.plugin {
        Plugin::Metrics(args) => metrics(connection, args, &config).await,
        Plugin::Replication(args) => replication(connection, args, &config).await,
        Plugin::Check(args) => {
            let outcome = check(connection, args, &config).await?;
            println!("{}", outcome);
            Ok(outcome.status)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let options = Options::parse();
    setup_telemetry(options.debug)?;

    let status = run(options).await?;
    debug!(%status, code = status.code(), "done");
    std::process::exit(status.code());
}

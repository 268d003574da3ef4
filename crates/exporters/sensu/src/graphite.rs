use color_eyre::eyre;
use mongodb_sensu_component::{MetricMapping, MetricsConsumer};
use std::io::Write;
use tracing::debug;

/// Writes metrics in the graphite plaintext protocol.
///
/// Every metric becomes one `<scheme>.<name> <value> <timestamp>` line.
#[derive(Debug)]
pub struct GraphiteWriter<W> {
    scheme: String,
    timestamp: u64,
    writer: W,
}

impl<W> GraphiteWriter<W>
where
    W: Write + std::fmt::Debug,
{
    pub fn new(scheme: impl Into<String>, timestamp: u64, writer: W) -> Self {
        Self {
            scheme: scheme.into(),
            timestamp,
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn metric_name(&self, name: &str) -> String {
        if self.scheme.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.scheme, name)
        }
    }
}

impl<W> MetricsConsumer for GraphiteWriter<W>
where
    W: Write + std::fmt::Debug,
{
    /// Number of lines written.
    type Output = usize;

    fn consume(&mut self, metrics: &MetricMapping) -> eyre::Result<Self::Output> {
        for (name, value) in metrics.iter() {
            let name = self.metric_name(name);
            writeln!(self.writer, "{} {} {}", name, value, self.timestamp)?;
        }
        self.writer.flush()?;
        debug!(scheme = %self.scheme, lines = metrics.len(), "wrote graphite lines");
        Ok(metrics.len())
    }
}

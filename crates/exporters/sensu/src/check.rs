use color_eyre::eyre;
use mongodb_sensu_component::{ExitStatus, MetricMapping, MetricsConsumer};
use tracing::debug;

pub const CHECK_NAME: &str = "CheckMongodbMetric";

/// Compares a single metric against a warning and a critical threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCheck {
    pub metric: String,
    pub warn: f64,
    pub crit: f64,
}

/// Status and human readable message of a finished check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub status: ExitStatus,
    pub message: String,
}

impl CheckOutcome {
    pub fn new(status: ExitStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", CHECK_NAME, self.status, self.message)
    }
}

impl ThresholdCheck {
    pub fn new(metric: impl Into<String>, warn: f64, crit: f64) -> Self {
        Self {
            metric: metric.into(),
            warn,
            crit,
        }
    }

    /// Evaluates the check, critical taking precedence over warning.
    pub fn evaluate(&self, metrics: &MetricMapping) -> CheckOutcome {
        let Some(value) = metrics.get(&self.metric) else {
            return CheckOutcome::new(
                ExitStatus::Unknown,
                format!("Unable to find a value for metric '{}'", self.metric),
            );
        };
        let Some(number) = value.as_f64() else {
            return CheckOutcome::new(
                ExitStatus::Unknown,
                format!("The value of '{}' is not numeric: {}", self.metric, value),
            );
        };
        debug!(metric = %self.metric, %value, warn = self.warn, crit = self.crit);

        if number >= self.crit {
            CheckOutcome::new(
                ExitStatus::Critical,
                format!("The value of '{}' exceeds {}.", self.metric, self.crit),
            )
        } else if number >= self.warn {
            CheckOutcome::new(
                ExitStatus::Warning,
                format!("The value of '{}' exceeds {}.", self.metric, self.warn),
            )
        } else {
            CheckOutcome::new(
                ExitStatus::Ok,
                format!("The value of '{}' is below all threshold.", self.metric),
            )
        }
    }
}

impl MetricsConsumer for ThresholdCheck {
    type Output = CheckOutcome;

    fn consume(&mut self, metrics: &MetricMapping) -> eyre::Result<Self::Output> {
        Ok(self.evaluate(metrics))
    }
}

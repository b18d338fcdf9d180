// 🚨 Error types
// Configuration errors are loud. Unparsable values are not errors at all:
// they travel as `None` and get rendered as "N/A".

/// Errors raised by the registry, the conversion engine and the series model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Metric {0} does not exist")]
    UnknownMetric(String),

    #[error("Invalid metric or unit of {metric}({unit})")]
    InvalidUnit { metric: String, unit: String },

    #[error("Cannot convert between metrics {from} and {to}")]
    MetricMismatch { from: String, to: String },

    #[error("Invalid groupBy of {0}")]
    InvalidGroupBy(String),

    #[error("Invalid graphType of {0}")]
    InvalidGraphType(String),

    #[error("Invalid yStat of {0}")]
    InvalidGroupStat(String),

    #[error("date is invalid, must be a valid date of type yyyy-mm-dd: {0}")]
    InvalidDate(String),
}

impl Error {
    pub(crate) fn invalid_unit<M: Into<String>, U: Into<String>>(metric: M, unit: U) -> Self {
        Error::InvalidUnit {
            metric: metric.into(),
            unit: unit.into(),
        }
    }

    /// True for errors that mean the registry was asked about something it never had
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownMetric(_) | Error::InvalidUnit { .. } | Error::MetricMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

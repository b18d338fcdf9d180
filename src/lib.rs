// Perf Log - Core Library
// Unit registry, conversion engine and period statistics for numeric series

pub mod error;
pub mod numeric;
pub mod units;     // Metric/unit registry
pub mod convert;   // Pivot-through-base conversion
pub mod period;    // Week/month boundaries
pub mod stats;     // Partitioning + aggregation
pub mod log_group; // Series + records
pub mod config;

// Re-export commonly used types
pub use error::{Error, Result};
pub use numeric::{format_duration, parse_duration, round_to};
pub use units::{
    registry, Codec, Converter, Metric, MetricBuilder, RenderPolicy, SignPrefix,
    Unit, UnitRegistry, UnitRole, UnitSpec,
};
pub use convert::{
    convert, convert_from_base, convert_to_base, display_with_unit,
    DEFAULT_DECIMAL_PLACES, NOT_AVAILABLE,
};
pub use period::{GroupBy, parse_iso_date, to_iso_date};
pub use stats::{
    FormattedStats, GroupStat, Observation, PeriodStat, RawPeriodStat, RawStats,
    group_stats, series_stats, summarize,
};
pub use log_group::{GraphType, LogGroup, LogRecord, SortOrder};
pub use config::EngineConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

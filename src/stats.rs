// 📊 Period Grouping & Statistics Engine
//
// Records arrive newest first. They are cut into contiguous calendar
// periods, summarised in base units, then rendered in the series unit.
// Periods come out oldest first.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::period::GroupBy;
use crate::units::registry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

// ============================================================================
// OBSERVATION
// ============================================================================

/// Anything with a calendar date and a value in base units
pub trait Observation {
    fn date(&self) -> NaiveDate;
    fn value(&self) -> f64;
}

impl<T: Observation> Observation for &T {
    fn date(&self) -> NaiveDate {
        (**self).date()
    }

    fn value(&self) -> f64 {
        (**self).value()
    }
}

impl Observation for (NaiveDate, f64) {
    fn date(&self) -> NaiveDate {
        self.0
    }

    fn value(&self) -> f64 {
        self.1
    }
}

// ============================================================================
// GROUP STAT
// ============================================================================

/// Statistic a series plots on its y axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStat {
    Records,
    Mean,
    Median,
    Max,
    Min,
    Total,
}

impl GroupStat {
    pub const ALL: [GroupStat; 6] = [
        GroupStat::Records,
        GroupStat::Mean,
        GroupStat::Median,
        GroupStat::Max,
        GroupStat::Min,
        GroupStat::Total,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStat::Records => "records",
            GroupStat::Mean => "mean",
            GroupStat::Median => "median",
            GroupStat::Max => "max",
            GroupStat::Min => "min",
            GroupStat::Total => "total",
        }
    }

    pub fn alias(&self) -> &'static str {
        match self {
            GroupStat::Records => "Records",
            GroupStat::Mean => "Average",
            GroupStat::Median => "Median",
            GroupStat::Max => "Max",
            GroupStat::Min => "Min",
            GroupStat::Total => "Total",
        }
    }

    /// `{P}` is the period word, `{L}` the unit label
    pub fn y_label_template(&self) -> &'static str {
        match self {
            GroupStat::Records => "{P} Records",
            GroupStat::Mean => "Average {P} {L}",
            GroupStat::Median => "Median {P} {L}",
            GroupStat::Max => "Max {P} {L}",
            GroupStat::Min => "Min {P} {L}",
            GroupStat::Total => "Total {P} {L}",
        }
    }

    pub fn y_label(&self, period: &str, label: &str) -> String {
        self.y_label_template()
            .replace("{P}", period)
            .replace("{L}", label)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for GroupStat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GroupStat::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| Error::InvalidGroupStat(s.to_string()))
    }
}

impl fmt::Display for GroupStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RAW + FORMATTED STATS
// ============================================================================

/// Aggregates in base units. Everything but `records` is `None` when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub mean: Option<f64>,
    pub records: usize,
    pub total: Option<f64>,
}

impl RawStats {
    pub fn get(&self, stat: GroupStat) -> Option<f64> {
        match stat {
            GroupStat::Records => Some(self.records as f64),
            GroupStat::Mean => self.mean,
            GroupStat::Median => self.median,
            GroupStat::Max => self.max,
            GroupStat::Min => self.min,
            GroupStat::Total => self.total,
        }
    }
}

/// Aggregates rendered in the series unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedStats {
    pub min: String,
    pub max: String,
    pub median: String,
    pub mean: String,
    pub records: String,
    pub total: String,
}

/// One calendar period of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStat {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub raw: RawStats,
    pub formatted: FormattedStats,
}

/// Period bounds + base-unit aggregates, before rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPeriodStat {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    #[serde(flatten)]
    pub stats: RawStats,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Summarise a bag of base values
pub fn summarize(values: &[f64]) -> RawStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    if count == 0 {
        return RawStats {
            min: None,
            max: None,
            median: None,
            mean: None,
            records: 0,
            total: None,
        };
    }

    let median = if count % 2 == 0 {
        0.5 * (sorted[count / 2 - 1] + sorted[count / 2])
    } else {
        sorted[count / 2]
    };
    let total: f64 = sorted.iter().sum();

    RawStats {
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        median: Some(median),
        mean: Some(total / count as f64),
        records: count,
        total: Some(total),
    }
}

/// Cut newest-first records into contiguous periods, returned oldest first.
///
/// A new period starts whenever the period start of a record differs from the
/// previous record's. `GroupBy::None` yields a single period.
pub fn partition<T: Observation>(records: &[T], group_by: GroupBy) -> Vec<&[T]> {
    if records.is_empty() {
        return Vec::new();
    }
    if group_by == GroupBy::None {
        return vec![records];
    }

    let mut partitions = Vec::new();
    let mut begin = 0;
    let mut current = group_by.period_start(records[0].date());

    for (index, record) in records.iter().enumerate().skip(1) {
        let start = group_by.period_start(record.date());
        if start != current {
            partitions.push(&records[begin..index]);
            begin = index;
            current = start;
        }
    }
    partitions.push(&records[begin..]);
    partitions.reverse();

    debug!(periods = partitions.len(), group_by = %group_by, "partitioned records");
    partitions
}

/// Base-unit aggregates per period, oldest period first
pub fn raw_period_stats<T: Observation>(records: &[T], group_by: GroupBy) -> Vec<RawPeriodStat> {
    partition(records, group_by)
        .into_iter()
        .filter_map(|period| {
            let oldest = period.iter().map(Observation::date).min()?;
            let newest = period.iter().map(Observation::date).max()?;
            let values: Vec<f64> = period.iter().map(Observation::value).collect();
            Some(RawPeriodStat {
                date_start: group_by.period_start(oldest),
                date_end: group_by.period_end(newest),
                stats: summarize(&values),
            })
        })
        .collect()
}

// ============================================================================
// RENDERING
// ============================================================================

/// Render aggregates in `metric`/`unit`. `records` stays a plain integer.
pub fn render(raw: &RawStats, metric: &str, unit: &str, config: &EngineConfig) -> Result<FormattedStats> {
    let registry = registry();
    let one = |value: Option<f64>| -> Result<String> {
        match value {
            Some(v) => registry.convert_value(
                metric,
                unit,
                v,
                config.annotate_units,
                Some(config.decimal_places),
            ),
            None => Ok(config.not_available.clone()),
        }
    };

    Ok(FormattedStats {
        min: one(raw.min)?,
        max: one(raw.max)?,
        median: one(raw.median)?,
        mean: one(raw.mean)?,
        records: raw.records.to_string(),
        total: one(raw.total)?,
    })
}

/// Rendered statistics per period of a newest-first record list
pub fn group_stats<T: Observation>(
    records: &[T],
    metric: &str,
    unit: &str,
    group_by: GroupBy,
    config: &EngineConfig,
) -> Result<Vec<PeriodStat>> {
    registry().resolve(metric, unit)?;

    raw_period_stats(records, group_by)
        .into_iter()
        .map(|period| {
            let formatted = render(&period.stats, metric, unit, config)?;
            Ok(PeriodStat {
                date_start: period.date_start,
                date_end: period.date_end,
                raw: period.stats,
                formatted,
            })
        })
        .collect()
}

/// Rendered statistics over every record of a series
pub fn series_stats<T: Observation>(
    records: &[T],
    metric: &str,
    unit: &str,
    config: &EngineConfig,
) -> Result<FormattedStats> {
    registry().resolve(metric, unit)?;

    let values: Vec<f64> = records.iter().map(Observation::value).collect();
    render(&summarize(&values), metric, unit, config)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::parse_iso_date;

    fn rec(date: &str, value: f64) -> (NaiveDate, f64) {
        (parse_iso_date(date).unwrap(), value)
    }

    #[test]
    fn test_median_parity() {
        assert_eq!(summarize(&[3.0, 1.0, 2.0]).median, Some(2.0));
        assert_eq!(summarize(&[4.0, 1.0, 3.0, 2.0]).median, Some(2.5));
    }

    #[test]
    fn test_summarize_values() {
        let stats = summarize(&[5.0, 1.0, 3.0, 7.0]);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(7.0));
        assert_eq!(stats.total, Some(16.0));
        assert_eq!(stats.mean, Some(4.0));
        assert_eq!(stats.records, 4);
    }

    #[test]
    fn test_single_value() {
        let stats = summarize(&[42.0]);
        for value in [stats.min, stats.max, stats.median, stats.mean, stats.total] {
            assert_eq!(value, Some(42.0));
        }
        assert_eq!(stats.records, 1);
    }

    #[test]
    fn test_empty_renders_not_available() {
        let config = EngineConfig::default();
        let empty: Vec<(NaiveDate, f64)> = Vec::new();
        let stats = series_stats(&empty, "length", "km", &config).unwrap();
        assert_eq!(stats.records, "0");
        for field in [&stats.min, &stats.max, &stats.median, &stats.mean, &stats.total] {
            assert_eq!(field, "N/A");
        }
    }

    #[test]
    fn test_partition_by_month_oldest_first() {
        let records = vec![
            rec("2024-03-02", 3.0),
            rec("2024-02-20", 2.0),
            rec("2024-02-01", 1.0),
            rec("2024-01-31", 0.5),
        ];
        let periods = partition(&records, GroupBy::Month);
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].len(), 1, "January first");
        assert_eq!(periods[1].len(), 2);
        assert_eq!(periods[2][0].1, 3.0, "March last");
    }

    #[test]
    fn test_partition_none_is_single() {
        let records = vec![rec("2024-03-02", 3.0), rec("2023-01-01", 1.0)];
        assert_eq!(partition(&records, GroupBy::None).len(), 1);
        let empty: Vec<(NaiveDate, f64)> = Vec::new();
        assert!(partition(&empty, GroupBy::Week).is_empty());
    }

    #[test]
    fn test_sunday_groups_with_preceding_monday() {
        // 2024-03-10 is a Sunday, 2024-03-11 the next Monday
        let records = vec![
            rec("2024-03-11", 4.0),
            rec("2024-03-10", 2.0),
            rec("2024-03-04", 1.0),
        ];
        let stats = raw_period_stats(&records, GroupBy::Week);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].date_start, parse_iso_date("2024-03-04").unwrap());
        assert_eq!(stats[0].date_end, parse_iso_date("2024-03-10").unwrap());
        assert_eq!(stats[0].stats.records, 2);
        assert_eq!(stats[1].date_start, parse_iso_date("2024-03-11").unwrap());
        assert_eq!(stats[1].stats.total, Some(4.0));
    }

    #[test]
    fn test_group_stats_rendered_in_unit() {
        let config = EngineConfig::default();
        let records = vec![
            rec("2024-02-10", 1500.0),
            rec("2024-02-03", 500.0),
            rec("2024-01-15", 2000.0),
        ];
        let stats = group_stats(&records, "length", "km", GroupBy::Month, &config).unwrap();
        assert_eq!(stats.len(), 2);

        let january = &stats[0].formatted;
        assert_eq!(january.records, "1");
        assert_eq!(january.total, "2");

        let february = &stats[1].formatted;
        assert_eq!(february.min, "0.5");
        assert_eq!(february.max, "1.5");
        assert_eq!(february.median, "1");
        assert_eq!(february.total, "2");
    }

    #[test]
    fn test_group_stats_annotated() {
        let config = EngineConfig {
            annotate_units: true,
            ..EngineConfig::default()
        };
        let records = vec![rec("2024-02-10", 90.0), rec("2024-02-03", 30.0)];
        let stats = group_stats(&records, "time", "duration", GroupBy::Week, &config).unwrap();
        assert_eq!(stats[0].formatted.total, "00:30", "duration is never suffixed");
        assert_eq!(stats[1].formatted.total, "01:30");

        let money = series_stats(&records, "currency", "$", &config).unwrap();
        assert_eq!(money.total, "$120.00");
        assert_eq!(money.mean, "$60.00");
    }

    #[test]
    fn test_group_stats_invalid_unit_fails_even_when_empty() {
        let config = EngineConfig::default();
        let empty: Vec<(NaiveDate, f64)> = Vec::new();
        assert!(group_stats(&empty, "length", "kg", GroupBy::Week, &config).is_err());
        assert!(series_stats(&empty, "volume", "l", &config).is_err());
    }

    #[test]
    fn test_group_stat_labels() {
        assert_eq!("mean".parse::<GroupStat>(), Ok(GroupStat::Mean));
        assert!("mode".parse::<GroupStat>().is_err());
        assert_eq!(GroupStat::Mean.alias(), "Average");
        assert_eq!(GroupStat::Total.y_label("Weekly", "Length (km)"), "Total Weekly Length (km)");
        assert_eq!(GroupStat::Records.y_label("", ""), "Records");
    }

    #[test]
    fn test_raw_stats_get() {
        let stats = summarize(&[1.0, 2.0]);
        assert_eq!(stats.get(GroupStat::Records), Some(2.0));
        assert_eq!(stats.get(GroupStat::Median), Some(1.5));
    }
}

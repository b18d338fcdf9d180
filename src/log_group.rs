// 🗂️ Log groups + log records
//
// A log group is a named series with a fixed metric/unit and a period
// granularity. Record values are stored in the metric's base unit; every
// display path goes through the conversion engine.

use crate::config::EngineConfig;
use crate::convert::NOT_AVAILABLE;
use crate::error::{Error, Result};
use crate::numeric::format_rounded;
use crate::period::GroupBy;
use crate::stats::{self, FormattedStats, GroupStat, Observation, PeriodStat, RawPeriodStat};
use crate::units::{registry, Codec, RenderPolicy, SignPrefix, Unit};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// GRAPH TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    #[default]
    Line,
    Column,
}

impl GraphType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphType::Line => "line",
            GraphType::Column => "column",
        }
    }
}

impl FromStr for GraphType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "line" => Ok(GraphType::Line),
            "column" => Ok(GraphType::Column),
            other => Err(Error::InvalidGraphType(other.to_string())),
        }
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LOG RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: i64,

    /// Value in the base unit of the owning group's metric
    pub value: f64,

    /// Calendar day, no time component
    pub date: NaiveDate,

    /// When the record was created; used only for display ordering
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    pub log_group_id: i64,
}

impl LogRecord {
    pub fn new(id: i64, value: f64, date: NaiveDate, log_group_id: i64) -> Self {
        LogRecord {
            id,
            value,
            date,
            created: None,
            log_group_id,
        }
    }

    /// Value rendered in the group's unit
    pub fn converted_value(&self, group: &LogGroup) -> Result<String> {
        group.converted_value(self.value, false)
    }

    pub fn line_graph_value(&self, group: &LogGroup) -> Result<Option<f64>> {
        group.line_graph_value(self.value)
    }
}

impl Observation for LogRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> f64 {
        self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Date, then creation time. Records without `created` sort before those with one.
fn chronological(a: &LogRecord, b: &LogRecord) -> Ordering {
    a.date.cmp(&b.date).then_with(|| a.created.cmp(&b.created))
}

/// Stable sort by date; same-day records order by creation time, and keep
/// their insertion order when that is equal or missing
pub fn sort_by_date(records: &mut [LogRecord], order: SortOrder) {
    match order {
        SortOrder::Asc => records.sort_by(chronological),
        SortOrder::Desc => records.sort_by(|a, b| chronological(b, a)),
    }
}

// ============================================================================
// LOG GROUP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroup {
    pub id: i64,
    pub name: String,
    pub metric: String,
    pub unit: String,

    #[serde(default)]
    pub group_by: GroupBy,

    #[serde(default)]
    pub graph_type: GraphType,

    #[serde(default = "default_y_stat")]
    pub y_stat: GroupStat,

    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub log_records: Vec<LogRecord>,
}

fn default_y_stat() -> GroupStat {
    GroupStat::Total
}

impl LogGroup {
    /// Create a group; the unit must belong to the metric
    pub fn new(
        id: i64,
        name: impl Into<String>,
        metric: impl Into<String>,
        unit: impl Into<String>,
        group_by: GroupBy,
    ) -> Result<Self> {
        let group = LogGroup {
            id,
            name: name.into(),
            metric: metric.into(),
            unit: unit.into(),
            group_by,
            graph_type: GraphType::default(),
            y_stat: default_y_stat(),
            created: None,
            log_records: Vec::new(),
        };
        group.validate()?;
        Ok(group)
    }

    /// Builder: set graph type
    pub fn with_graph_type(mut self, graph_type: GraphType) -> Self {
        self.graph_type = graph_type;
        self
    }

    /// Builder: set the plotted statistic
    pub fn with_y_stat(mut self, y_stat: GroupStat) -> Self {
        self.y_stat = y_stat;
        self
    }

    /// Check metric/unit against the registry (needed after deserializing)
    pub fn validate(&self) -> Result<()> {
        registry().resolve(&self.metric, &self.unit).map(|_| ())
    }

    fn unit_def(&self) -> Result<&'static Unit> {
        registry().resolve(&self.metric, &self.unit).map(|(_, unit)| unit)
    }

    // ------------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------------

    pub fn add_record(&mut self, record: LogRecord) -> &LogRecord {
        let index = self.log_records.len();
        self.log_records.push(record);
        &self.log_records[index]
    }

    pub fn add_records(&mut self, records: impl IntoIterator<Item = LogRecord>) {
        self.log_records.extend(records);
    }

    /// Newest first
    pub fn sort_records(&mut self) -> &[LogRecord] {
        sort_by_date(&mut self.log_records, SortOrder::Desc);
        &self.log_records
    }

    fn newest_first(&self) -> Vec<&LogRecord> {
        let mut ordered: Vec<&LogRecord> = self.log_records.iter().collect();
        ordered.sort_by(|a, b| chronological(b, a));
        ordered
    }

    // ------------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------------

    /// Whole-series statistics
    pub fn analytics(&self, config: &EngineConfig) -> Result<FormattedStats> {
        stats::series_stats(&self.log_records, &self.metric, &self.unit, config)
    }

    /// Rendered statistics per period, oldest first
    pub fn period_stats(&self, config: &EngineConfig) -> Result<Vec<PeriodStat>> {
        stats::group_stats(&self.newest_first(), &self.metric, &self.unit, self.group_by, config)
    }

    /// Base-unit statistics per period, oldest first
    pub fn raw_period_stats(&self) -> Vec<RawPeriodStat> {
        stats::raw_period_stats(&self.newest_first(), self.group_by)
    }

    // ------------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------------

    pub fn is_duration(&self) -> bool {
        self.unit_def().map(|u| u.policy.codec == Codec::Duration).unwrap_or(false)
    }

    pub fn is_time(&self) -> bool {
        self.metric == "time"
    }

    /// Base value in the group's unit, optionally dressed with its unit
    pub fn converted_value(&self, value: f64, include_suffix: bool) -> Result<String> {
        registry().convert_value(&self.metric, &self.unit, value, include_suffix, None)
    }

    /// Number plotted on a line graph: raw seconds for durations, else the converted number
    pub fn line_graph_value(&self, value: f64) -> Result<Option<f64>> {
        if self.unit_def()?.policy.codec == Codec::Duration {
            return Ok(Some(value.abs()));
        }
        let converted = self.converted_value(value, false)?;
        if converted == NOT_AVAILABLE {
            return Ok(None);
        }
        Ok(converted.parse::<f64>().ok())
    }

    /// Axis tick text for a plotted value
    pub fn convert_graph_value(&self, graph_value: f64) -> Result<String> {
        match self.unit_def()?.policy.codec {
            Codec::Duration => registry().convert_from_base(&self.metric, &self.unit, graph_value, None),
            Codec::Plain => Ok(format_rounded(graph_value, 4)),
        }
    }

    /// "Length (km)"; "Dollars ($)" for currency; empty for plain counts
    pub fn y_label(&self) -> Result<String> {
        let unit = self.unit_def()?;
        if unit.policy.sign == SignPrefix::Currency {
            return Ok("Dollars ($)".to_string());
        }
        if unit.policy == RenderPolicy::bare() {
            return Ok(String::new());
        }
        let alias = registry().metric_alias(&self.metric)?;
        Ok(format!("{} ({})", alias, unit.code))
    }

    /// Full y-axis title, e.g. "Total Weekly Length (km)"
    pub fn y_axis_title(&self) -> Result<String> {
        let period = match self.group_by {
            GroupBy::None => "",
            GroupBy::Week => "Weekly",
            GroupBy::Month => "Monthly",
        };
        Ok(self.y_stat.y_label(period, &self.y_label()?))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::parse_iso_date;

    fn record(id: i64, date: &str, value: f64) -> LogRecord {
        LogRecord::new(id, value, parse_iso_date(date).unwrap(), 1)
    }

    fn running_group() -> LogGroup {
        let mut group = LogGroup::new(1, "Morning run", "length", "km", GroupBy::Week).unwrap();
        group.add_records(vec![
            record(1, "2024-03-04", 5000.0),
            record(2, "2024-03-12", 8000.0),
            record(3, "2024-03-06", 3000.0),
            record(4, "2024-03-10", 4000.0),
        ]);
        group
    }

    #[test]
    fn test_group_requires_unit_of_metric() {
        assert!(LogGroup::new(1, "Bad", "length", "kg", GroupBy::None).is_err());
        assert!(LogGroup::new(1, "Bad", "volume", "l", GroupBy::None).is_err());
        assert!(LogGroup::new(1, "Good", "mass", "kg", GroupBy::Month).is_ok());
    }

    #[test]
    fn test_sort_records_newest_first_stable() {
        let mut group = running_group();
        group.add_record(record(5, "2024-03-12", 1000.0));
        let ids: Vec<i64> = group.sort_records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5, 4, 3, 1], "same-day records keep insertion order");
    }

    #[test]
    fn test_sort_records_same_day_newest_creation_first() {
        let mut group = LogGroup::new(1, "Morning run", "length", "km", GroupBy::Week).unwrap();
        let mut morning = record(1, "2024-03-12", 5000.0);
        morning.created = Some("2024-03-12T08:00:00Z".parse().unwrap());
        let mut evening = record(2, "2024-03-12", 3000.0);
        evening.created = Some("2024-03-12T20:00:00Z".parse().unwrap());
        group.add_records(vec![morning, evening, record(3, "2024-03-11", 1000.0)]);

        let ids: Vec<i64> = group.sort_records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3], "later creation comes first on the same day");

        let mut ascending = group.log_records.clone();
        sort_by_date(&mut ascending, SortOrder::Asc);
        let ids: Vec<i64> = ascending.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_period_stats_unsorted_input() {
        let group = running_group();
        let stats = group.period_stats(&EngineConfig::default()).unwrap();
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].date_start, parse_iso_date("2024-03-04").unwrap());
        assert_eq!(stats[0].formatted.records, "3");
        assert_eq!(stats[0].formatted.total, "12");
        assert_eq!(stats[0].formatted.median, "4");

        assert_eq!(stats[1].date_start, parse_iso_date("2024-03-11").unwrap());
        assert_eq!(stats[1].formatted.max, "8");
    }

    #[test]
    fn test_analytics_whole_series() {
        let group = running_group();
        let analytics = group.analytics(&EngineConfig::default()).unwrap();
        assert_eq!(analytics.records, "4");
        assert_eq!(analytics.total, "20");
        assert_eq!(analytics.mean, "5");
        assert_eq!(analytics.median, "4.5");
        assert_eq!(group.raw_period_stats().len(), 2);
    }

    #[test]
    fn test_labels() {
        let group = running_group().with_y_stat(GroupStat::Total);
        assert_eq!(group.y_label().unwrap(), "Length (km)");
        assert_eq!(group.y_axis_title().unwrap(), "Total Weekly Length (km)");

        let money = LogGroup::new(2, "Coffee", "currency", "$", GroupBy::Month).unwrap();
        assert_eq!(money.y_label().unwrap(), "Dollars ($)");

        let count = LogGroup::new(3, "Pushups", "unit", "unit", GroupBy::None)
            .unwrap()
            .with_y_stat(GroupStat::Records);
        assert_eq!(count.y_label().unwrap(), "");
        assert_eq!(count.y_axis_title().unwrap(), "Records");

        let plank = LogGroup::new(4, "Plank", "time", "duration", GroupBy::None).unwrap();
        assert_eq!(plank.y_label().unwrap(), "Time (hh:mm:ss)");
    }

    #[test]
    fn test_graph_values() {
        let plank = LogGroup::new(4, "Plank", "time", "duration", GroupBy::None).unwrap();
        assert!(plank.is_duration());
        assert!(plank.is_time());
        assert_eq!(plank.line_graph_value(-95.0).unwrap(), Some(95.0));
        assert_eq!(plank.convert_graph_value(95.0).unwrap(), "01:35");

        let run = running_group();
        assert!(!run.is_duration());
        assert_eq!(run.line_graph_value(1234.5).unwrap(), Some(1.2345));
        assert_eq!(run.convert_graph_value(1.234567).unwrap(), "1.2346");
    }

    #[test]
    fn test_record_display() {
        let group = running_group();
        let record = &group.log_records[0];
        assert_eq!(record.converted_value(&group).unwrap(), "5");
        assert_eq!(group.converted_value(5000.0, true).unwrap(), "5 km");
    }

    #[test]
    fn test_deserialize_group() {
        let json = r#"{
            "id": 7,
            "name": "Weight",
            "metric": "mass",
            "unit": "lb",
            "groupBy": "month",
            "graphType": "column",
            "yStat": "mean"
        }"#;
        let group: LogGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.group_by, GroupBy::Month);
        assert_eq!(group.graph_type, GraphType::Column);
        assert_eq!(group.y_stat, GroupStat::Mean);
        assert!(group.validate().is_ok());
        assert!(group.log_records.is_empty());
    }

    #[test]
    fn test_graph_type_from_str() {
        assert_eq!("column".parse::<GraphType>(), Ok(GraphType::Column));
        assert_eq!(
            "pie".parse::<GraphType>(),
            Err(Error::InvalidGraphType("pie".to_string()))
        );
    }
}

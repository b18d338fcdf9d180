// 📂 Import - groups from JSON, records from CSV
// Only the binary touches the filesystem.

use anyhow::{Context, Result};
use perf_log::{parse_iso_date, registry, LogGroup, LogRecord};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// One CSV row: `id,value,date[,logGroupId]`, value in the group's native unit
#[derive(Debug, Deserialize)]
struct RecordRow {
    id: i64,
    value: String,
    date: String,
    #[serde(rename = "logGroupId", default)]
    log_group_id: Option<i64>,
}

pub fn load_group(path: &Path) -> Result<LogGroup> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read group file {}", path.display()))?;
    let group: LogGroup = serde_json::from_str(&text).context("Failed to deserialize log group")?;
    group.validate().context("Log group has an invalid metric or unit")?;
    Ok(group)
}

/// Load records for `group`, converting native values to base units.
///
/// Rows whose value cannot be parsed are skipped with a warning; rows for
/// another group are ignored.
pub fn load_records(csv_path: &Path, group: &LogGroup) -> Result<Vec<LogRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let row: RecordRow = result.context("Failed to deserialize record")?;

        if row.log_group_id.is_some_and(|id| id != group.id) {
            continue;
        }

        let date = parse_iso_date(row.date.trim())
            .with_context(|| format!("Record {} has an invalid date", row.id))?;

        let Some(value) = registry().convert_to_base(&group.metric, &group.unit, row.value.trim())? else {
            warn!("Skipping record {}: cannot read {:?} as {}", row.id, row.value, group.unit);
            continue;
        };

        records.push(LogRecord::new(row.id, value, date, group.id));
    }

    Ok(records)
}

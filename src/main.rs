// File loading lives in the binary only
mod import;

use anyhow::{bail, Context, Result};
use perf_log::{registry, EngineConfig, DEFAULT_DECIMAL_PLACES, NOT_AVAILABLE};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PERF_LOG_LOG";

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("units") => run_units(),
        Some("convert") => run_convert(&args[1..]),
        Some("stats") => run_stats(&args[1..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("perf-log {}", perf_log::VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  perf-log units");
    eprintln!("  perf-log convert <metric> <from-unit> <to-unit> <value> [decimals]");
    eprintln!("  perf-log stats <group.json> <records.csv>");
    eprintln!();
    eprintln!("Environment: PERF_LOG_DECIMALS, PERF_LOG_ANNOTATE, {}", LOG_ENV);
}

fn run_units() -> Result<()> {
    let json = serde_json::to_string_pretty(registry().metrics())?;
    println!("{}", json);
    Ok(())
}

fn run_convert(args: &[String]) -> Result<()> {
    let [metric, from, to, value, rest @ ..] = args else {
        bail!("convert needs <metric> <from-unit> <to-unit> <value> [decimals]");
    };

    let decimals = match rest.first() {
        Some(d) => d.parse::<u32>().context("decimals must be a non-negative integer")?,
        None => DEFAULT_DECIMAL_PLACES,
    };

    let converted = registry().convert(metric, from, metric, to, value, decimals)?;
    println!("{}", converted.as_deref().unwrap_or(NOT_AVAILABLE));
    Ok(())
}

fn run_stats(args: &[String]) -> Result<()> {
    let [group_path, records_path, ..] = args else {
        bail!("stats needs <group.json> <records.csv>");
    };

    let config = EngineConfig::default().with_env_overrides();

    let mut group = import::load_group(Path::new(group_path))?;
    let records = import::load_records(Path::new(records_path), &group)?;
    group.add_records(records);
    group.sort_records();

    let report = serde_json::json!({
        "group": group.name,
        "metric": group.metric,
        "unit": group.unit,
        "groupBy": group.group_by,
        "yAxis": group.y_axis_title()?,
        "analytics": group.analytics(&config)?,
        "periods": group.period_stats(&config)?,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

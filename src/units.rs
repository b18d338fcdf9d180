// 📏 Unit Registry - Metrics, their base unit and every derived unit
//
// Each metric pivots through exactly one base unit:
//   native string --to_base--> base number --from_base[code]--> native string
//
// The registry is built once and never mutated afterwards.

use crate::error::{Error, Result};
use crate::numeric::{format_currency, format_duration, format_number, parse_duration, parse_number};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

/// Native string -> base value. `None` when the text cannot be parsed.
pub type ToBaseFn = fn(&str) -> Option<f64>;

/// Base value -> native string
pub type FromBaseFn = fn(f64) -> String;

// ============================================================================
// CONVERTERS
// ============================================================================

/// Forward and reverse converter of one unit
#[derive(Clone, Copy)]
pub struct Converter {
    pub to_base: ToBaseFn,
    pub from_base: FromBaseFn,
}

pub mod converters {
    use super::*;

    pub const MILES_PER_METER: f64 = 6.21371e-4;
    pub const FEET_PER_METER: f64 = 3.28084;
    pub const KILOGRAMS_PER_POUND: f64 = 0.45359237;

    fn identity_to_base(x: &str) -> Option<f64> {
        parse_number(x)
    }
    fn identity_from_base(n: f64) -> String {
        format_number(n)
    }

    fn cm_to_base(x: &str) -> Option<f64> {
        parse_number(x).map(|n| n / 100.0)
    }
    fn cm_from_base(n: f64) -> String {
        format_number(n * 100.0)
    }

    fn km_to_base(x: &str) -> Option<f64> {
        parse_number(x).map(|n| n * 1000.0)
    }
    fn km_from_base(n: f64) -> String {
        format_number(n / 1000.0)
    }

    fn mi_to_base(x: &str) -> Option<f64> {
        parse_number(x).map(|n| n / MILES_PER_METER)
    }
    fn mi_from_base(n: f64) -> String {
        format_number(n * MILES_PER_METER)
    }

    fn ft_to_base(x: &str) -> Option<f64> {
        parse_number(x).map(|n| n / FEET_PER_METER)
    }
    fn ft_from_base(n: f64) -> String {
        format_number(n * FEET_PER_METER)
    }

    fn g_to_base(x: &str) -> Option<f64> {
        parse_number(x).map(|n| n / 1000.0)
    }
    fn g_from_base(n: f64) -> String {
        format_number(n * 1000.0)
    }

    fn lb_to_base(x: &str) -> Option<f64> {
        parse_number(x).map(|n| n * KILOGRAMS_PER_POUND)
    }
    fn lb_from_base(n: f64) -> String {
        format_number(n / KILOGRAMS_PER_POUND)
    }

    fn seconds_to_base(x: &str) -> Option<f64> {
        parse_number(x).map(f64::abs)
    }
    fn seconds_from_base(n: f64) -> String {
        format_number(n.abs())
    }

    fn duration_from_base(n: f64) -> String {
        format_duration(n)
    }

    fn dollars_from_base(n: f64) -> String {
        format_currency(n)
    }

    pub const IDENTITY: Converter = Converter { to_base: identity_to_base, from_base: identity_from_base };
    pub const CENTIMETER: Converter = Converter { to_base: cm_to_base, from_base: cm_from_base };
    pub const KILOMETER: Converter = Converter { to_base: km_to_base, from_base: km_from_base };
    pub const MILE: Converter = Converter { to_base: mi_to_base, from_base: mi_from_base };
    pub const FOOT: Converter = Converter { to_base: ft_to_base, from_base: ft_from_base };
    pub const GRAM: Converter = Converter { to_base: g_to_base, from_base: g_from_base };
    pub const POUND: Converter = Converter { to_base: lb_to_base, from_base: lb_from_base };
    pub const SECONDS: Converter = Converter { to_base: seconds_to_base, from_base: seconds_from_base };
    pub const DURATION: Converter = Converter { to_base: parse_duration, from_base: duration_from_base };
    pub const DOLLARS: Converter = Converter { to_base: identity_to_base, from_base: dollars_from_base };
}

// ============================================================================
// RENDERING POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignPrefix {
    /// Sign stays inside the number
    None,
    /// `$12.00` / `-$12.00`, never rounded by the caller's precision
    Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Plain,
    /// `HH:MM:SS` text instead of a number
    Duration,
}

/// How a converted value is dressed for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderPolicy {
    /// Append " <code>" after the number
    pub suffix: bool,
    pub sign: SignPrefix,
    pub codec: Codec,
}

impl RenderPolicy {
    pub const fn suffixed() -> Self {
        RenderPolicy { suffix: true, sign: SignPrefix::None, codec: Codec::Plain }
    }

    pub const fn bare() -> Self {
        RenderPolicy { suffix: false, sign: SignPrefix::None, codec: Codec::Plain }
    }

    pub const fn currency() -> Self {
        RenderPolicy { suffix: false, sign: SignPrefix::Currency, codec: Codec::Plain }
    }

    pub const fn duration() -> Self {
        RenderPolicy { suffix: false, sign: SignPrefix::None, codec: Codec::Duration }
    }
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::suffixed()
    }
}

// ============================================================================
// UNIT
// ============================================================================

/// Derived units only know how to reach the base. The base unit also owns
/// the reverse table, keyed by every unit id of its metric (itself included).
pub enum UnitRole {
    Derived,
    Base { from_base: Vec<(&'static str, FromBaseFn)> },
}

impl fmt::Debug for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitRole::Derived => write!(f, "Derived"),
            UnitRole::Base { from_base } => f
                .debug_struct("Base")
                .field("from_base", &from_base.iter().map(|(id, _)| *id).collect::<Vec<_>>())
                .finish(),
        }
    }
}

#[derive(Serialize)]
pub struct Unit {
    /// Registry key (e.g. "km", "M", "duration")
    pub id: &'static str,
    /// Human-readable name (e.g. "Kilometer")
    pub alias: &'static str,
    /// Short code shown after values (e.g. "km", "hh:mm:ss")
    pub code: &'static str,
    pub policy: RenderPolicy,
    #[serde(skip)]
    pub to_base: ToBaseFn,
    #[serde(skip)]
    pub role: UnitRole,
}

impl Unit {
    pub fn is_base(&self) -> bool {
        matches!(self.role, UnitRole::Base { .. })
    }

    /// Reverse converter for `unit_id`; only the base unit has any
    pub fn from_base_for(&self, unit_id: &str) -> Option<FromBaseFn> {
        match &self.role {
            UnitRole::Base { from_base } => from_base
                .iter()
                .find(|(id, _)| *id == unit_id)
                .map(|(_, f)| *f),
            UnitRole::Derived => None,
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.id)
            .field("alias", &self.alias)
            .field("code", &self.code)
            .field("policy", &self.policy)
            .field("role", &self.role)
            .finish()
    }
}

/// Declaration of one unit before its metric is assembled
#[derive(Clone, Copy)]
pub struct UnitSpec {
    pub id: &'static str,
    pub alias: &'static str,
    pub code: &'static str,
    pub converter: Converter,
    pub policy: RenderPolicy,
}

impl UnitSpec {
    pub fn new(id: &'static str, alias: &'static str, code: &'static str, converter: Converter) -> Self {
        UnitSpec {
            id,
            alias,
            code,
            converter,
            policy: RenderPolicy::default(),
        }
    }

    /// Builder: override the rendering policy
    pub fn with_policy(mut self, policy: RenderPolicy) -> Self {
        self.policy = policy;
        self
    }
}

// ============================================================================
// METRIC
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Metric {
    /// Registry key (e.g. "length")
    pub id: &'static str,
    /// Human-readable name (e.g. "Length")
    pub alias: &'static str,
    /// Id of the base unit
    pub base_unit: &'static str,
    /// Units in registration order
    pub units: Vec<Unit>,
}

impl Metric {
    pub fn builder(id: &'static str, alias: &'static str) -> MetricBuilder {
        MetricBuilder {
            id,
            alias,
            base: None,
            units: Vec::new(),
        }
    }

    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    pub fn has_unit(&self, unit_id: &str) -> bool {
        self.unit(unit_id).is_some()
    }

    pub fn base(&self) -> Option<&Unit> {
        self.unit(self.base_unit).filter(|u| u.is_base())
    }
}

/// Collects unit declarations, then freezes them into a `Metric` whose base
/// unit carries the reverse converter of every sibling.
pub struct MetricBuilder {
    id: &'static str,
    alias: &'static str,
    base: Option<usize>,
    units: Vec<UnitSpec>,
}

impl MetricBuilder {
    /// Builder: add a derived unit
    pub fn with_unit(mut self, spec: UnitSpec) -> Self {
        self.units.push(spec);
        self
    }

    /// Builder: add the base unit. Its own forward converter is kept, so a base
    /// can normalise raw input (seconds drop their sign).
    pub fn with_base_unit(mut self, spec: UnitSpec) -> Self {
        self.base = Some(self.units.len());
        self.units.push(spec);
        self
    }

    /// Freeze. Without an explicit base the first unit becomes the base.
    pub fn build(self) -> Metric {
        let base_index = self.base.unwrap_or(0);
        let table: Vec<(&'static str, FromBaseFn)> = self
            .units
            .iter()
            .map(|spec| (spec.id, spec.converter.from_base))
            .collect();
        let base_unit = self.units.get(base_index).map(|s| s.id).unwrap_or("");

        let mut table = Some(table);
        let units = self
            .units
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Unit {
                id: spec.id,
                alias: spec.alias,
                code: spec.code,
                policy: spec.policy,
                to_base: spec.converter.to_base,
                role: match (index == base_index).then(|| table.take()).flatten() {
                    Some(from_base) => UnitRole::Base { from_base },
                    None => UnitRole::Derived,
                },
            })
            .collect();

        Metric {
            id: self.id,
            alias: self.alias,
            base_unit,
            units,
        }
    }
}

// ============================================================================
// UNIT REGISTRY
// ============================================================================

/// Catalog of every metric and unit, in registration order
#[derive(Debug)]
pub struct UnitRegistry {
    metrics: Vec<Metric>,
}

static REGISTRY: Lazy<UnitRegistry> = Lazy::new(UnitRegistry::new);

/// Process-wide registry, built on first use
pub fn registry() -> &'static UnitRegistry {
    &REGISTRY
}

impl UnitRegistry {
    /// Create a registry with all core metrics
    pub fn new() -> Self {
        UnitRegistry {
            metrics: core_metrics(),
        }
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.metric(metric).is_some()
    }

    pub fn has_unit(&self, metric: &str, unit: &str) -> bool {
        self.unit(metric, unit).is_some()
    }

    pub fn metric(&self, metric: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.id == metric)
    }

    pub fn unit(&self, metric: &str, unit: &str) -> Option<&Unit> {
        self.metric(metric)?.unit(unit)
    }

    /// Alias of a metric; unknown metrics are an error
    pub fn metric_alias(&self, metric: &str) -> Result<&'static str> {
        self.metric(metric)
            .map(|m| m.alias)
            .ok_or_else(|| Error::UnknownMetric(metric.to_string()))
    }

    pub fn unit_code(&self, metric: &str, unit: &str) -> Option<&'static str> {
        self.unit(metric, unit).map(|u| u.code)
    }

    pub fn base_unit_id(&self, metric: &str) -> Option<&'static str> {
        self.metric(metric).map(|m| m.base_unit)
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn units(&self, metric: &str) -> Option<&[Unit]> {
        self.metric(metric).map(|m| m.units.as_slice())
    }

    pub fn metric_aliases(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|m| m.alias).collect()
    }

    pub fn unit_aliases(&self, metric: &str) -> Option<Vec<&'static str>> {
        self.units(metric)
            .map(|units| units.iter().map(|u| u.alias).collect())
    }

    /// Resolve a metric/unit pair or fail loudly
    pub fn resolve(&self, metric: &str, unit: &str) -> Result<(&Metric, &Unit)> {
        let m = self
            .metric(metric)
            .ok_or_else(|| Error::invalid_unit(metric, unit))?;
        let u = m.unit(unit).ok_or_else(|| Error::invalid_unit(metric, unit))?;
        Ok((m, u))
    }

    pub fn count(&self) -> usize {
        self.metrics.len()
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn core_metrics() -> Vec<Metric> {
    use converters::*;

    vec![
        Metric::builder("length", "Length")
            .with_unit(UnitSpec::new("cm", "Centimeter", "cm", CENTIMETER))
            .with_base_unit(UnitSpec::new("M", "Meter", "m", IDENTITY))
            .with_unit(UnitSpec::new("km", "Kilometer", "km", KILOMETER))
            .with_unit(UnitSpec::new("mi", "Mile", "mi", MILE))
            .with_unit(UnitSpec::new("ft", "Feet", "ft", FOOT))
            .build(),
        Metric::builder("mass", "Weight")
            .with_base_unit(UnitSpec::new("kg", "Kilogram", "kg", IDENTITY))
            .with_unit(UnitSpec::new("g", "Gram", "g", GRAM))
            .with_unit(UnitSpec::new("lb", "Pound", "lb", POUND))
            .build(),
        Metric::builder("time", "Time")
            .with_base_unit(UnitSpec::new("s", "Seconds", "s", SECONDS))
            .with_unit(
                UnitSpec::new("duration", "hh:mm:ss", "hh:mm:ss", DURATION)
                    .with_policy(RenderPolicy::duration()),
            )
            .build(),
        Metric::builder("currency", "Currency")
            .with_base_unit(
                UnitSpec::new("$", "Dollars", "$", DOLLARS).with_policy(RenderPolicy::currency()),
            )
            .build(),
        Metric::builder("unit", "Unit")
            .with_base_unit(
                UnitSpec::new("unit", "Unit", "units", IDENTITY).with_policy(RenderPolicy::bare()),
            )
            .build(),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

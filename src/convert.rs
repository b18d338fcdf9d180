// 🔁 Conversion Engine - pivot through the base unit of one metric
//
//   source unit --to_base--> base value --base.from_base[dest]--> dest native
//
// Never crosses metrics. Bad registry keys are errors, unparsable values are `None`.

use crate::error::{Error, Result};
use crate::numeric::{format_number, format_rounded};
use crate::units::{registry, SignPrefix, Unit, UnitRegistry};
use tracing::warn;

/// Precision used when the caller does not ask for one
pub const DEFAULT_DECIMAL_PLACES: u32 = 4;

/// Marker rendered for values that cannot be shown
pub const NOT_AVAILABLE: &str = "N/A";

impl UnitRegistry {
    /// Convert a native value between two units of the same metric.
    ///
    /// Returns `Ok(None)` when `value` cannot be parsed by the source unit.
    pub fn convert(
        &self,
        from_metric: &str,
        from_unit: &str,
        to_metric: &str,
        to_unit: &str,
        value: &str,
        decimal_places: u32,
    ) -> Result<Option<String>> {
        let (source_metric, source) = self.resolve(from_metric, from_unit)?;
        let (dest_metric, dest) = self.resolve(to_metric, to_unit)?;

        if source_metric.id != dest_metric.id {
            return Err(Error::MetricMismatch {
                from: from_metric.to_string(),
                to: to_metric.to_string(),
            });
        }

        let Some(base_value) = (source.to_base)(value) else {
            warn!(
                "Cannot convert value {} from {}({}) to {}({})",
                value, from_metric, from_unit, to_metric, to_unit
            );
            return Ok(None);
        };

        let from_base = dest_metric
            .base()
            .and_then(|base| base.from_base_for(dest.id))
            .ok_or_else(|| Error::invalid_unit(to_metric, to_unit))?;

        Ok(Some(finish(dest, from_base(base_value), decimal_places)))
    }

    /// Native value -> base value, without rendering
    pub fn convert_to_base(&self, metric: &str, unit: &str, value: &str) -> Result<Option<f64>> {
        let (_, unit) = self.resolve(metric, unit)?;
        Ok((unit.to_base)(value))
    }

    /// Base value -> native string in `unit`. Unrenderable values become "N/A".
    pub fn convert_from_base(
        &self,
        metric: &str,
        unit: &str,
        base_value: f64,
        decimal_places: Option<u32>,
    ) -> Result<String> {
        let base_unit = self
            .base_unit_id(metric)
            .ok_or_else(|| Error::UnknownMetric(metric.to_string()))?;

        let converted = self.convert(
            metric,
            base_unit,
            metric,
            unit,
            &format_number(base_value),
            decimal_places.unwrap_or(DEFAULT_DECIMAL_PLACES),
        )?;

        Ok(converted.unwrap_or_else(|| NOT_AVAILABLE.to_string()))
    }

    /// Base value rendered with its unit: "3.5 km", "-$12.00", "01:30", "7"
    pub fn display_with_unit(
        &self,
        metric: &str,
        unit: &str,
        base_value: f64,
        decimal_places: Option<u32>,
    ) -> Result<String> {
        let (_, dest) = self.resolve(metric, unit)?;

        match dest.policy.sign {
            SignPrefix::Currency => {
                let sign = if base_value < 0.0 { "-" } else { "" };
                let amount = self.convert_from_base(metric, unit, base_value.abs(), decimal_places)?;
                if amount == NOT_AVAILABLE {
                    return Ok(amount);
                }
                Ok(format!("{}${}", sign, amount))
            }
            SignPrefix::None => {
                let converted = self.convert_from_base(metric, unit, base_value, decimal_places)?;
                if dest.policy.suffix && converted != NOT_AVAILABLE {
                    Ok(format!("{} {}", converted, dest.code))
                } else {
                    Ok(converted)
                }
            }
        }
    }

    /// Plain or annotated rendering of a base value
    pub fn convert_value(
        &self,
        metric: &str,
        unit: &str,
        base_value: f64,
        include_suffix: bool,
        decimal_places: Option<u32>,
    ) -> Result<String> {
        if include_suffix {
            self.display_with_unit(metric, unit, base_value, decimal_places)
        } else {
            self.convert_from_base(metric, unit, base_value, decimal_places)
        }
    }
}

/// Round numeric output; leave currency and non-numeric codecs untouched
fn finish(dest: &Unit, native: String, decimal_places: u32) -> String {
    if dest.policy.sign == SignPrefix::Currency {
        return native;
    }

    match native.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => format_rounded(n, decimal_places),
        _ => native,
    }
}

// ============================================================================
// PROCESS-WIDE SHORTCUTS
// ============================================================================

pub fn convert(
    from_metric: &str,
    from_unit: &str,
    to_metric: &str,
    to_unit: &str,
    value: &str,
    decimal_places: u32,
) -> Result<Option<String>> {
    registry().convert(from_metric, from_unit, to_metric, to_unit, value, decimal_places)
}

pub fn convert_to_base(metric: &str, unit: &str, value: &str) -> Result<Option<f64>> {
    registry().convert_to_base(metric, unit, value)
}

pub fn convert_from_base(
    metric: &str,
    unit: &str,
    base_value: f64,
    decimal_places: Option<u32>,
) -> Result<String> {
    registry().convert_from_base(metric, unit, base_value, decimal_places)
}

pub fn display_with_unit(metric: &str, unit: &str, base_value: f64) -> Result<String> {
    registry().display_with_unit(metric, unit, base_value, None)
}

// ============================================================================
// TESTS
// ============================================================================

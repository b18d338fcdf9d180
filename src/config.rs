// ⚙️ Engine configuration
//
// Rendering knobs only. Every field has a default so a partial JSON
// document (or none at all) is enough.

use crate::convert::{DEFAULT_DECIMAL_PLACES, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};
use std::env;

pub const ENV_DECIMALS: &str = "PERF_LOG_DECIMALS";
pub const ENV_ANNOTATE: &str = "PERF_LOG_ANNOTATE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fractional digits for non-currency values
    pub decimal_places: u32,

    /// Render "3.5 km" / "$12.00" instead of bare numbers
    pub annotate_units: bool,

    /// Text shown for aggregates that do not exist (empty periods)
    pub not_available: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            annotate_units: false,
            not_available: NOT_AVAILABLE.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Apply `PERF_LOG_DECIMALS` / `PERF_LOG_ANNOTATE`. Unparsable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(env::var(ENV_DECIMALS).ok(), env::var(ENV_ANNOTATE).ok())
    }

    fn with_overrides(mut self, decimals: Option<String>, annotate: Option<String>) -> Self {
        if let Some(places) = decimals.and_then(|v| v.trim().parse::<u32>().ok()) {
            self.decimal_places = places;
        }
        if let Some(flag) = annotate {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.annotate_units = true,
                "0" | "false" | "no" => self.annotate_units = false,
                _ => {}
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.decimal_places, 4);
        assert!(!config.annotate_units);
        assert_eq!(config.not_available, "N/A");
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(r#"{"decimal_places": 2}"#).unwrap();
        assert_eq!(config.decimal_places, 2);
        assert_eq!(config.not_available, "N/A");

        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::default()
            .with_overrides(Some("6".to_string()), Some("TRUE".to_string()));
        assert_eq!(config.decimal_places, 6);
        assert!(config.annotate_units);

        let config = EngineConfig::default()
            .with_overrides(Some("lots".to_string()), Some("maybe".to_string()));
        assert_eq!(config, EngineConfig::default());
    }
}

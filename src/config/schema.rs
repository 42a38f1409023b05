use crate::scoring::{MeasurementKind, TypeRules};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
///
/// Example YAML:
/// ```yaml
/// catalog_path: /var/lib/news-score/ranges.json
/// lookup_timeout: "2s"
/// measurement_types:
///   - { name: TEMP, integral_only: false }
///   - { name: HR, integral_only: true }
///   - { name: RR, integral_only: true }
///   - { name: SPO2, integral_only: true }
/// required_types: [TEMP, HR, RR]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON file holding the range catalog (default: ~/.config/news-score/ranges.json)
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Known measurement types and their value constraints
    #[serde(default)]
    pub measurement_types: Option<Vec<MeasurementTypeConfig>>,

    /// Types every scoring request must include (default: all configured types)
    #[serde(default)]
    pub required_types: Option<Vec<String>>,

    /// Maximum time for a single catalog read, e.g. "500ms" or "2s"
    #[serde(default)]
    pub lookup_timeout: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MeasurementTypeConfig {
    pub name: String,

    /// Values must have no fractional part (counts such as beats per minute)
    #[serde(default)]
    pub integral_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            measurement_types: Some(default_measurement_types()),
            required_types: None,
            lookup_timeout: None,
        }
    }
}

fn default_measurement_types() -> Vec<MeasurementTypeConfig> {
    MeasurementKind::ALL
        .iter()
        .map(|kind| MeasurementTypeConfig {
            name: kind.tag().to_string(),
            integral_only: kind.integral_only(),
        })
        .collect()
}

impl Config {
    pub fn effective_measurement_types(&self) -> Vec<MeasurementTypeConfig> {
        self.measurement_types
            .clone()
            .unwrap_or_else(default_measurement_types)
    }

    pub fn type_rules(&self) -> TypeRules {
        let mut rules = TypeRules::new();
        for t in self.effective_measurement_types() {
            rules.set(&t.name, t.integral_only);
        }
        rules
    }

    pub fn required_types(&self) -> Vec<String> {
        match &self.required_types {
            Some(required) => required.clone(),
            None => self
                .effective_measurement_types()
                .into_iter()
                .map(|t| t.name)
                .collect(),
        }
    }

    pub fn lookup_timeout(&self) -> Result<Option<Duration>> {
        self.lookup_timeout
            .as_deref()
            .map(|s| {
                humantime::parse_duration(s.trim())
                    .with_context(|| format!("Invalid lookup_timeout '{}'", s))
            })
            .transpose()
    }

    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.catalog_path {
            Some(path) => Ok(path.clone()),
            None => crate::catalog::get_catalog_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        let rules = config.type_rules();
        assert!(rules.requires_whole_number("HR"));
        assert!(rules.requires_whole_number("RR"));
        assert!(!rules.requires_whole_number("TEMP"));
        assert_eq!(config.required_types(), vec!["TEMP", "HR", "RR"]);
        assert!(config.lookup_timeout().unwrap().is_none());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_empty_config_parse_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert!(config.measurement_types.is_none());
        assert_eq!(config.effective_measurement_types().len(), 3);
        assert_eq!(config.required_types().len(), 3);
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
catalog_path: /tmp/ranges.json
lookup_timeout: "250ms"
measurement_types:
  - name: TEMP
  - name: HR
    integral_only: true
  - name: SPO2
    integral_only: true
required_types: [TEMP, HR]
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.catalog_path().unwrap(), PathBuf::from("/tmp/ranges.json"));
        assert_eq!(
            config.lookup_timeout().unwrap(),
            Some(Duration::from_millis(250))
        );
        let rules = config.type_rules();
        assert!(rules.requires_whole_number("spo2"));
        assert!(!rules.requires_whole_number("RR"));
        assert_eq!(config.required_types(), vec!["TEMP", "HR"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "base_score: 100\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let config = Config {
            lookup_timeout: Some("soon".to_string()),
            ..Config::default()
        };
        assert!(config.lookup_timeout().is_err());
    }
}

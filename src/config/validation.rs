use super::schema::Config;
use crate::catalog::normalize_type;
use std::collections::HashSet;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let types = config.effective_measurement_types();
    if types.is_empty() {
        errors.push("measurement_types: at least one type is required".to_string());
    }

    let mut seen = HashSet::new();
    for (i, t) in types.iter().enumerate() {
        let name = normalize_type(&t.name);
        if name.is_empty() {
            errors.push(format!("measurement_types[{}].name: must not be empty", i));
        } else if !seen.insert(name) {
            errors.push(format!(
                "measurement_types[{}].name: duplicate type '{}'",
                i, t.name
            ));
        }
    }

    if let Some(ref required) = config.required_types {
        for (i, t) in required.iter().enumerate() {
            if !seen.contains(&normalize_type(t)) {
                errors.push(format!(
                    "required_types[{}]: '{}' is not a configured measurement type",
                    i, t
                ));
            }
        }
    }

    if let Err(e) = config.lookup_timeout() {
        errors.push(format!("lookup_timeout: {:#}", e));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeasurementTypeConfig;

    fn type_config(name: &str, integral_only: bool) -> MeasurementTypeConfig {
        MeasurementTypeConfig {
            name: name.to_string(),
            integral_only,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_types() {
        let config = Config {
            measurement_types: Some(vec![]),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("measurement_types"));
    }

    #[test]
    fn test_duplicate_type_case_insensitive() {
        let config = Config {
            measurement_types: Some(vec![type_config("HR", true), type_config("hr", false)]),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("measurement_types[1].name"));
    }

    #[test]
    fn test_unknown_required_type() {
        let config = Config {
            required_types: Some(vec!["TEMP".to_string(), "SPO2".to_string()]),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("required_types[1]"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = Config {
            catalog_path: None,
            measurement_types: Some(vec![type_config("", false)]),
            required_types: Some(vec!["TEMP".to_string()]),
            lookup_timeout: Some("whenever".to_string()),
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}

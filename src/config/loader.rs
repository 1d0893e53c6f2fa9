//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StrategyConfig;
    use std::io::Write;

    const FLOW: &str = r#"
        [[channels]]
        name = "output1"

        [[channels]]
        name = "output2"
        capacity = 8

        [[routers]]
        name = "numbers"
        input_channel = "input"
        default_output = "output2"
        send_timeout_ms = 1234
        strategy = { type = "mapping", mappings = { "1" = "output1", "2" = "output2" } }

        [[outbound]]
        name = "orders"
        input_channel = "orders-in"
        url = "http://localhost:8080/orders"
        output_channel = "output1"

        [observability]
        log_level = "debug"
    "#;

    #[test]
    fn test_parse_full_flow() {
        let config = parse_config(FLOW).unwrap();
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[0].capacity, crate::channel::queue::DEFAULT_CAPACITY);
        assert_eq!(config.channels[1].capacity, 8);

        let router = &config.routers[0];
        assert_eq!(router.send_timeout_ms, Some(1234));
        assert!(!router.resolution_required);
        match &router.strategy {
            StrategyConfig::Mapping { mappings } => assert_eq!(mappings["1"], "output1"),
            other => panic!("unexpected strategy {:?}", other),
        }

        assert_eq!(config.outbound[0].http_method, "POST");
        assert_eq!(config.http_client.timeout_secs, 30);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = parse_config("").unwrap();
        assert!(config.routers.is_empty());
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config(
            r#"
            [[routers]]
            name = "r"
            input_channel = "in"
            default_output = "missing"
            strategy = { type = "payload_as_name" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FLOW.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.routers[0].name, "numbers");

        let missing = load_config(Path::new("/nonexistent/relay.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}

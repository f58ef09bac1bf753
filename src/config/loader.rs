//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `backend.api_key`.
pub const API_KEY_ENV: &str = "RISK_GATE_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let api_key = std::env::var(API_KEY_ENV).ok();
    parse_config(&content, api_key)
}

/// Parse and validate configuration text, applying an API key override.
pub fn parse_config(content: &str, api_key: Option<String>) -> Result<GateConfig, ConfigError> {
    let mut config: GateConfig = toml::from_str(content)?;

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        config.backend.api_key = key;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [backend]
        api_key = "from_file"

        [[routes]]
        method = "POST"
        path = "/login"
        event = "$login"
    "#;

    #[test]
    fn test_sample_config_parses() {
        let config = parse_config(include_str!("../../demos/gate.toml"), Some("sk_live".into())).unwrap();
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.pages.len(), 1);
        assert_eq!(config.backend.api_key, "sk_live");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.routes[0].path, "/login");
    }

    #[test]
    fn test_api_key_override() {
        let config = parse_config(MINIMAL, Some("from_env".into())).unwrap();
        assert_eq!(config.backend.api_key, "from_env");

        let config = parse_config(MINIMAL, Some(String::new())).unwrap();
        assert_eq!(config.backend.api_key, "from_file");
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = parse_config("[[routes]]\nmethod = \"POST\"\npath = \"/a\"\nevent = \"e\"\n", None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("routes = 3", None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/risk-gate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

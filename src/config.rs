use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::errors::{ConverterError, Result};

/// Converter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Identifier the stylesheet is imported as (`import styles from ...`)
    pub style_binding: String,

    /// Prefix for the counter-based names given to plain elements
    pub plain_element_prefix: String,

    /// Extension of the generated stylesheet, without the leading dot
    pub module_extension: String,

    /// Suffix repeated component names instead of letting them share a class
    pub disambiguate_components: bool,

    /// Ask the engine for the preflight layer as well (it is never emitted)
    pub include_preflight: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            style_binding: "styles".to_string(),
            plain_element_prefix: "node".to_string(),
            module_extension: "module.css".to_string(),
            disambiguate_components: false,
            include_preflight: false,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConverterError::ConfigError {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ConverterError::ConfigError {
                message: format!("Failed to parse YAML config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConverterError::ConfigError {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConverterError::ConfigError {
                message: format!("Failed to parse JSON config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (auto-detect format)
    pub fn from_file(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ConverterError::ConfigError {
                message: format!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .json",
                    path.display()
                ),
            }),
        }
    }

    /// Reject values that would produce an unusable import or class name
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.style_binding) {
            return Err(ConverterError::ConfigError {
                message: format!("style_binding '{}' is not a valid identifier", self.style_binding),
            });
        }
        if !is_identifier(&self.plain_element_prefix) {
            return Err(ConverterError::ConfigError {
                message: format!(
                    "plain_element_prefix '{}' is not a valid identifier",
                    self.plain_element_prefix
                ),
            });
        }
        if self.module_extension.trim_matches('.').is_empty() {
            return Err(ConverterError::ConfigError {
                message: "module_extension must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Stylesheet file name for a component base name, e.g. `button.module.css`
    pub fn stylesheet_file_name(&self, base_name: &str) -> String {
        format!("{}.{}", base_name, self.module_extension.trim_start_matches('.'))
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ParamError, Result};
use crate::tree::TraversalOrder;
use crate::value::{ValueKind, ValueTypeValidator};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# paramtree configuration file
# Location: ~/.paramtree/config.toml

[values]
# Value kinds items may hold
# Kinds: text, number, date-time, path, supplier, consumer, function
# Example: allowed = ["text", "number"]
allowed = ["text", "number", "date-time", "path", "supplier", "consumer", "function"]

[traversal]
# Default search order for `paramtree search`
# Values: depth-first, breadth-first
order = "depth-first"

[log]
# Log filter used when PARAMTREE_LOG is not set
# Example: level = "paramtree_core=debug,info"
level = "warn"
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub values: ValuesConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Value-kind restrictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuesConfig {
    #[serde(default = "default_allowed")]
    pub allowed: Vec<ValueKind>,
}

fn default_allowed() -> Vec<ValueKind> {
    ValueKind::all().to_vec()
}

impl Default for ValuesConfig {
    fn default() -> Self {
        Self {
            allowed: default_allowed(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraversalConfig {
    #[serde(default)]
    pub order: TraversalOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| ParamError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "values.allowed" => {
                self.values.allowed = parse_string_list(value)
                    .iter()
                    .map(|s| s.parse())
                    .collect::<Result<Vec<ValueKind>>>()?;
                Ok(())
            }
            "traversal.order" => {
                self.traversal.order = match value.trim() {
                    "depth-first" | "dfs" => TraversalOrder::DepthFirst,
                    "breadth-first" | "bfs" => TraversalOrder::BreadthFirst,
                    other => {
                        return Err(ParamError::validation(
                            "traversal.order",
                            format!("unknown order '{}'", other),
                        ))
                    }
                };
                Ok(())
            }
            "log.level" => {
                self.log.level = value.trim().to_string();
                Ok(())
            }
            _ => Err(ParamError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        let allowed: Vec<&str> = self.values.allowed.iter().map(|k| k.id()).collect();
        let order = match self.traversal.order {
            TraversalOrder::DepthFirst => "depth-first",
            TraversalOrder::BreadthFirst => "breadth-first",
        };
        vec![
            ("values.allowed".to_string(), format!("{:?}", allowed)),
            ("traversal.order".to_string(), order.to_string()),
            ("log.level".to_string(), self.log.level.clone()),
        ]
    }

    /// Validator built from `values.allowed`
    pub fn validator(&self) -> ValueTypeValidator {
        ValueTypeValidator::new(self.values.allowed.iter().copied())
    }
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_string_list_comma() {
        assert_eq!(parse_string_list("text,number"), vec!["text", "number"]);
    }

    #[test]
    fn test_parse_string_list_json() {
        assert_eq!(
            parse_string_list(r#"["text", "path"]"#),
            vec!["text", "path"]
        );
        assert!(parse_string_list("[]").is_empty());
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("values.allowed", "text,number").unwrap();
        assert_eq!(
            config.values.allowed,
            vec![ValueKind::Text, ValueKind::Number]
        );
        assert_eq!(
            config.get("values.allowed").unwrap(),
            r#"["text", "number"]"#
        );

        config.set("traversal.order", "bfs").unwrap();
        assert_eq!(config.traversal.order, TraversalOrder::BreadthFirst);
        assert_eq!(config.get("traversal.order").unwrap(), "breadth-first");

        assert!(config.set("values.allowed", "text,boolean").is_err());
        assert!(matches!(
            config.set("nope", "x"),
            Err(ParamError::ConfigKeyNotFound { .. })
        ));
    }

    #[test]
    fn test_load_missing_is_default() -> Result<()> {
        let temp = TempDir::new()?;
        let config = Config::load(temp.path())?;
        assert_eq!(config.values.allowed.len(), ValueKind::all().len());
        assert_eq!(config.log.level, "warn");
        Ok(())
    }

    #[test]
    fn test_init_template_parses() -> Result<()> {
        let temp = TempDir::new()?;
        let path = Config::init(temp.path())?;
        assert!(path.exists());

        let config = Config::load(temp.path())?;
        assert_eq!(config.traversal.order, TraversalOrder::DepthFirst);
        assert!(config.validator().allows(ValueKind::Supplier));
        Ok(())
    }

    #[test]
    fn test_save_roundtrip_restriction() -> Result<()> {
        let temp = TempDir::new()?;
        let mut config = Config::default();
        config.set("values.allowed", "[text]")?;
        config.save(temp.path())?;

        let loaded = Config::load(temp.path())?;
        let validator = loaded.validator();
        assert!(validator.allows(ValueKind::Text));
        assert!(!validator.allows(ValueKind::Path));
        Ok(())
    }

    #[test]
    fn test_bad_file_reports_path() -> Result<()> {
        let temp = TempDir::new()?;
        fs::write(Config::path(temp.path()), "[values]\nallowed = [\"boolean\"]\n")?;
        let err = Config::load(temp.path()).unwrap_err();
        assert!(matches!(err, ParamError::ConfigParse { .. }));
        Ok(())
    }
}

//! Configuration schema for goalpost
//!
//! Configuration is stored at `~/.config/goalpost/config.toml`

use crate::error::GoalResult;
use crate::goal::{Goal, GoalOrder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Resolution policy
    pub resolver: ResolverConfig,

    /// Goal cache settings
    pub cache: CacheConfig,

    /// Declared goal lookup
    pub manifest: ManifestConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Resolution policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Goals to attempt for undeclared sources, primary first
    pub order: Vec<Goal>,

    /// Per-attempt parse timeout in milliseconds (0 = disabled)
    pub parse_timeout_ms: u64,

    /// Parallel resolutions in a batch (0 = available parallelism)
    pub jobs: usize,
}

impl ResolverConfig {
    /// Validated attempt order
    pub fn goal_order(&self) -> GoalResult<GoalOrder> {
        GoalOrder::new(&self.order)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            order: vec![Goal::Script, Goal::Module],
            parse_timeout_ms: 0,
            jobs: 0,
        }
    }
}

/// Goal cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the goal cache (default: true)
    pub enabled: bool,

    /// Cache directory (default: platform cache dir)
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Declared goal lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Read declared goals at all
    pub enabled: bool,

    /// Manifest file name searched upward from each source
    pub file_name: String,

    /// Manifest field holding the goal
    pub field: String,

    /// `.mjs` declares module, `.cjs` declares script
    pub extensions: bool,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_name: "package.json".to_string(),
            field: "type".to_string(),
            extensions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GoalError;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[resolver]"));
        assert!(toml.contains("order = ["));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.resolver.order, vec![Goal::Script, Goal::Module]);
        assert!(config.cache.enabled);
        assert_eq!(config.manifest.file_name, "package.json");
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [resolver]
            order = ["module"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.resolver.goal_order().unwrap().goals(),
            &[Goal::Module, Goal::Script]
        );
        assert_eq!(config.manifest.field, "type"); // default preserved
    }

    #[test]
    fn duplicate_order_rejected() {
        let toml = r#"
            [resolver]
            order = ["script", "script"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.resolver.goal_order(),
            Err(GoalError::GoalOrderInvalid(_))
        ));
    }

    #[test]
    fn unknown_goal_rejected() {
        let toml = r#"
            [resolver]
            order = ["wasm"]
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}

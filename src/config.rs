use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use ts_rs::TS;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MULTISTEP";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Plugin-level defaults applied to every multi-step container
    #[serde(default)]
    pub wizard: MultiStepConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How step tabs are drawn
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TabStyle {
    /// Row of clickable tabs
    #[default]
    Tab,
    /// Progress bar with optional labels
    Progress,
}

impl fmt::Display for TabStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabStyle::Tab => write!(f, "tab"),
            TabStyle::Progress => write!(f, "progress"),
        }
    }
}

/// Options recognized by a multi-step container.
///
/// Accepts both snake_case keys and the camelCase names used by form schemas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MultiStepConfig {
    #[serde(default, alias = "tabStyle")]
    pub tab_style: TabStyle,
    /// Hide step labels under the progress bar (progress style only)
    #[serde(default, alias = "hideProgressLabels")]
    pub hide_progress_labels: bool,
    /// Let users advance past steps with blocking validation errors
    #[serde(default, alias = "allowIncomplete")]
    pub allow_incomplete: bool,
}

impl MultiStepConfig {
    /// Overlay per-container options on top of these defaults
    pub fn with_overrides(&self, overrides: &MultiStepOverrides) -> Self {
        Self {
            tab_style: overrides.tab_style.unwrap_or(self.tab_style),
            hide_progress_labels: overrides
                .hide_progress_labels
                .unwrap_or(self.hide_progress_labels),
            allow_incomplete: overrides.allow_incomplete.unwrap_or(self.allow_incomplete),
        }
    }
}

/// Per-container options; unset fields fall back to the plugin defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStepOverrides {
    #[serde(default, alias = "tabStyle", skip_serializing_if = "Option::is_none")]
    pub tab_style: Option<TabStyle>,
    #[serde(
        default,
        alias = "hideProgressLabels",
        skip_serializing_if = "Option::is_none"
    )]
    pub hide_progress_labels: Option<bool>,
    #[serde(
        default,
        alias = "allowIncomplete",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_incomplete: Option<bool>,
}

impl MultiStepOverrides {
    pub fn is_empty(&self) -> bool {
        self.tab_style.is_none()
            && self.hide_progress_labels.is_none()
            && self.allow_incomplete.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a timestamped file instead of stderr
    #[serde(default)]
    pub to_file: bool,

    /// Directory for log files (defaults to the user cache directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            directory: None,
        }
    }
}

impl Config {
    /// Project-local config file, picked up when present in the working directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("multistep.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_env_prefix(config_path, ENV_PREFIX)
    }

    /// Load configuration in layers: embedded defaults, local file, user file,
    /// explicit file, then environment variables under `env_prefix`.
    pub fn load_with_env_prefix(config_path: Option<&str>, env_prefix: &str) -> Result<Self> {
        // Start with embedded defaults so the CLI works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/multistep/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("multistep").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Directory for log files
    pub fn logs_path(&self) -> PathBuf {
        match &self.logging.directory {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("multistep")
                .join("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = MultiStepConfig::default();
        assert_eq!(config.tab_style, TabStyle::Tab);
        assert!(!config.hide_progress_labels);
        assert!(!config.allow_incomplete);
    }

    #[test]
    fn test_with_overrides_only_replaces_set_fields() {
        let defaults = MultiStepConfig {
            allow_incomplete: true,
            ..MultiStepConfig::default()
        };
        let overrides = MultiStepOverrides {
            tab_style: Some(TabStyle::Progress),
            ..MultiStepOverrides::default()
        };
        let merged = defaults.with_overrides(&overrides);
        assert_eq!(merged.tab_style, TabStyle::Progress);
        assert!(merged.allow_incomplete);
        assert!(!merged.hide_progress_labels);
        assert!(MultiStepOverrides::default().is_empty());
        assert!(!overrides.is_empty());
    }

    #[test]
    fn test_camel_case_aliases() {
        let config: MultiStepConfig = serde_json::from_str(
            r#"{"tabStyle": "progress", "hideProgressLabels": true, "allowIncomplete": true}"#,
        )
        .unwrap();
        assert_eq!(config.tab_style, TabStyle::Progress);
        assert!(config.hide_progress_labels);
        assert!(config.allow_incomplete);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[wizard]\ntab_style = \"progress\"\nallow_incomplete = true\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config =
            Config::load_with_env_prefix(path.to_str(), "MULTISTEP_TEST_FILE_UNUSED").unwrap();
        assert_eq!(config.wizard.tab_style, TabStyle::Progress);
        assert!(config.wizard.allow_incomplete);
        assert!(!config.wizard.hide_progress_labels);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_env_override() {
        std::env::set_var("MULTISTEP_TEST_ENV__WIZARD__HIDE_PROGRESS_LABELS", "true");
        let config = Config::load_with_env_prefix(None, "MULTISTEP_TEST_ENV").unwrap();
        std::env::remove_var("MULTISTEP_TEST_ENV__WIZARD__HIDE_PROGRESS_LABELS");
        assert!(config.wizard.hide_progress_labels);
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.wizard.tab_style = TabStyle::Progress;
        config.logging.to_file = true;
        config.save(&path).unwrap();

        let loaded = Config::load_with_env_prefix(path.to_str(), "MULTISTEP_TEST_SAVE_UNUSED")
            .unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_logs_path_uses_configured_directory() {
        let mut config = Config::default();
        config.logging.directory = Some("/tmp/multistep-logs".to_string());
        assert_eq!(config.logs_path(), PathBuf::from("/tmp/multistep-logs"));
        config.logging.directory = None;
        assert!(config.logs_path().ends_with("logs"));
    }
}

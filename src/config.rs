use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::repository::{discover_install_root, FsStepRepository};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where late-loaded steps live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Install root containing the steps directory (default: discovered from the executable)
    #[serde(default)]
    pub root: Option<String>,
    /// Steps directory name under the install root
    #[serde(default = "default_steps_dir")]
    pub steps_dir: String,
    /// Manifest file listing step names in order
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// Per-step descriptor file name
    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,
}

fn default_steps_dir() -> String {
    "steps".to_string()
}

fn default_manifest_file() -> String {
    "steps.json".to_string()
}

fn default_descriptor_file() -> String {
    "step.json".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: None,
            steps_dir: default_steps_dir(),
            manifest_file: default_manifest_file(),
            descriptor_file: default_descriptor_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Region step views are rendered into
    #[serde(default = "default_destination")]
    pub destination: String,
    /// Page title used when writing rendered pages
    #[serde(default = "default_title")]
    pub title: String,
    /// Fail renders that reference context keys which are not set
    #[serde(default)]
    pub strict_templates: bool,
}

fn default_destination() -> String {
    "#content-holder".to_string()
}

fn default_title() -> String {
    "stepdeck".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            title: default_title(),
            strict_templates: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to a file instead of stderr
    #[serde(default)]
    pub to_file: bool,

    /// Log directory (default: `.stepdeck/logs`)
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_dir() -> String {
    ".stepdeck/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Path to the project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".stepdeck/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so stepdeck works without config files
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

        // User config in ~/.config/stepdeck/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("stepdeck").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with STEPDECK_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("STEPDECK")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Install root: configured, or discovered next to the running executable
    pub fn install_root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.paths.root {
            return Ok(absolute(PathBuf::from(root)));
        }

        let exe = std::env::current_exe().context("Failed to locate running executable")?;
        let exe_dir = exe
            .parent()
            .context("Executable path has no parent directory")?;
        Ok(discover_install_root(exe_dir))
    }

    /// Absolute path to the steps directory
    pub fn steps_path(&self) -> Result<PathBuf> {
        Ok(self.install_root()?.join(&self.paths.steps_dir))
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        absolute(PathBuf::from(&self.logging.dir))
    }

    /// Filesystem repository for the configured layout
    pub fn step_repository(&self) -> Result<FsStepRepository> {
        Ok(FsStepRepository::with_steps_root(self.steps_path()?)
            .with_manifest_file(self.paths.manifest_file.clone())
            .with_descriptor_file(self.paths.descriptor_file.clone()))
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the values derived from
//! it (template parameter defaults, the replacement mode).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables `TRELLIS_<SECTION>__<KEY>`
//! 3. Local `.trellis.toml` in the current directory
//! 4. User config file (`--config FILE` or the platform config dir)
//! 5. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use trellis_core::domain::{ReplaceMode, TemplateParameters};

use crate::cli::OutputFormat;

/// File name of the per-directory configuration override.
pub const LOCAL_CONFIG_FILE: &str = ".trellis.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Template parameter defaults for new projects and components.
    pub defaults: Defaults,
    /// Rename and move behaviour.
    pub rename: RenameConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Operation log settings.
    pub log: LogConfig,
    /// Template settings.
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub author_full_name: String,
    pub author_email: String,
    pub license: String,
    pub python_version: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            author_full_name: String::new(),
            author_email: String::new(),
            license: "MIT".into(),
            python_version: "3.10".into(),
        }
    }
}

impl Defaults {
    /// The defaults as template parameters.
    pub fn template_parameters(&self) -> TemplateParameters {
        TemplateParameters::new()
            .with("author_full_name", &self.author_full_name)
            .with("author_email", &self.author_email)
            .with("license", &self.license)
            .with("python_version", &self.python_version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    pub mode: ReplaceMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Append operations to `<project>/trellis.log`.
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { file: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory of templates overriding the built-in ones.
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from all layers.
    ///
    /// `config_file` is the path the user passed via `--config`; it must
    /// exist. The default user file and the local file are optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let user = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        let local = (PathBuf::from(LOCAL_CONFIG_FILE), false);

        let env = Environment::with_prefix("TRELLIS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        Self::load_layers(&[user, local], Some(env))
    }

    /// Merge `files` (lowest priority first) and `env` over the defaults.
    fn load_layers(files: &[(PathBuf, bool)], env: Option<Environment>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to build default configuration")?;
        let mut builder = Config::builder().add_source(defaults);

        for (path, required) in files {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(*required),
            );
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.trellis.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "trellis", "trellis")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Templates directory: the CLI flag wins over the config file.
    pub fn templates_dir<'a>(&'a self, flag: Option<&'a Path>) -> Option<&'a Path> {
        flag.or(self.templates.dir.as_deref())
    }
}

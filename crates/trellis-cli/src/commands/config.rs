//! `trellis config`: inspect and initialise configuration.

use std::{env, fs, path::Path};

use crate::{
    cli::ConfigCommands,
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliError, CliResult, IntoCli as _},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.data(&value)?;
        }

        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            output.data(&to_toml(&config)?)?;
        }

        ConfigCommands::Path => {
            output.data(&AppConfig::config_path().display().to_string())?;
        }

        ConfigCommands::Init { local, force } => {
            let path = if local {
                env::current_dir()
                    .with_cli_context(|| "Cannot determine the current directory")?
                    .join(LOCAL_CONFIG_FILE)
            } else {
                AppConfig::config_path()
            };
            init_config(&path, force)?;
            output.success(&format!("Wrote {}", path.display()))?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Value at a dotted key such as `defaults.license`.
fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let doc = serde_json::to_value(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })?;

    let value = key
        .split('.')
        .try_fold(&doc, |node, part| node.get(part))
        .ok_or_else(|| CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        })?;

    Ok(match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn to_toml(config: &AppConfig) -> CliResult<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Write the default configuration to `path`.
fn init_config(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::ConfigError {
            message: format!("{} already exists (use --force to overwrite)", path.display()),
            source: None,
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_cli_context(|| format!("Cannot create {}", parent.display()))?;
    }
    let text = to_toml(&AppConfig::default())?;
    fs::write(path, text).with_cli_context(|| format!("Cannot write {}", path.display()))
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trellis_core::domain::ReplaceMode;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "defaults.license").unwrap(), "MIT");
        assert_eq!(get_config_value(&cfg, "rename.mode").unwrap(), "substring");
        assert_eq!(get_config_value(&cfg, "log.file").unwrap(), "true");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn unset_optional_key_is_empty() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "templates.dir").unwrap(), "");
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("trellis").join("config.toml");

        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }

    #[test]
    fn written_defaults_parse_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        init_config(&path, false).unwrap();

        let parsed: AppConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, AppConfig::default());
        assert_eq!(parsed.rename.mode, ReplaceMode::Substring);
    }
}

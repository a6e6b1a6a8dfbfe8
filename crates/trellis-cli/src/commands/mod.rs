//! Command handlers.
//!
//! Each submodule translates its clap arguments into a core service call and
//! renders the result. The helpers below wire the adapters the handlers share.

use std::path::Path;

use tracing::debug;
use trellis_adapters::{
    InMemoryTemplateStore, JsonRegistryStore, LocalFilesystem, PlaceholderExpander,
    detect_project,
};
use trellis_core::{
    application::{ComponentService, Project, ScaffoldService},
    domain::ReplaceMode,
};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliResult, IntoCli as _},
};

pub mod add;
pub mod completions;
pub mod config;
pub mod create;
pub mod info;
pub mod list;
pub mod mv;
pub mod templates;

/// Built-in templates, overridden by the user's templates directory.
fn template_store(global: &GlobalArgs, config: &AppConfig) -> CliResult<InMemoryTemplateStore> {
    let store = InMemoryTemplateStore::with_builtin()?;
    if let Some(dir) = config.templates_dir(global.templates.as_deref()) {
        let loaded = store.load_directory(dir)?;
        debug!(dir = %dir.display(), loaded, "User templates loaded");
    }
    Ok(store)
}

/// The project enclosing `--project-path` (or the current directory).
fn open_project(global: &GlobalArgs) -> CliResult<Project> {
    let start = global
        .start_dir()
        .with_cli_context(|| "Cannot determine the current directory")?;
    Ok(detect_project(&start)?)
}

fn scaffold_service(global: &GlobalArgs, config: &AppConfig) -> CliResult<ScaffoldService> {
    Ok(ScaffoldService::new(
        Box::new(template_store(global, config)?),
        Box::new(PlaceholderExpander::new()),
        Box::new(LocalFilesystem::new()),
        Box::new(JsonRegistryStore::new()),
    ))
}

fn component_service(mode: ReplaceMode) -> ComponentService {
    ComponentService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(JsonRegistryStore::new()),
    )
    .with_replace_mode(mode)
}

/// `path` relative to the current directory when it lies below it.
fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

//! Locates the project a command operates on.
//!
//! A project root is a directory holding `pyproject.toml` and a top-level
//! package `<package_name>/__init__.py`. The search starts at the given
//! directory and walks up its ancestors, so commands work from anywhere
//! inside a project.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;
use trellis_core::{
    application::{ApplicationError, Project},
    domain::{entities::layout::PYPROJECT_FILE, to_module_name},
    error::TrellisResult,
};

/// Find the enclosing project of `start` and open it.
pub fn detect_project(start: &Path) -> TrellisResult<Project> {
    let root = find_project_root(start).ok_or_else(|| ApplicationError::NotAProject {
        path: start.to_path_buf(),
        reason: format!("no {PYPROJECT_FILE} found here or in any parent directory"),
    })?;
    open_project(&root)
}

/// Nearest ancestor of `start` (inclusive) containing `pyproject.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PYPROJECT_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Open the project rooted at `root`.
///
/// The project name comes from `[project] name`, falling back to the
/// directory name. The package is the module name of either, whichever
/// exists as `<package>/__init__.py`.
pub fn open_project(root: &Path) -> TrellisResult<Project> {
    let pyproject = root.join(PYPROJECT_FILE);
    let text = fs::read_to_string(&pyproject)
        .map_err(|e| ApplicationError::filesystem("read", &pyproject, e))?;
    let declared = declared_project_name(&text).map_err(|reason| ApplicationError::NotAProject {
        path: root.to_path_buf(),
        reason,
    })?;

    let dir_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut candidates: Vec<String> = Vec::new();
    for name in declared.iter().chain(std::iter::once(&dir_name)) {
        let package = to_module_name(name);
        if !package.is_empty() && !candidates.contains(&package) {
            candidates.push(package);
        }
    }

    let package_name = candidates
        .iter()
        .find(|pkg| root.join(pkg.as_str()).join("__init__.py").is_file())
        .cloned()
        .ok_or_else(|| ApplicationError::NotAProject {
            path: root.to_path_buf(),
            reason: format!(
                "no top-level package found (looked for {})",
                candidates
                    .iter()
                    .map(|c| format!("{c}/__init__.py"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })?;

    let project_name = declared.unwrap_or(dir_name);
    debug!(root = %root.display(), project = %project_name, package = %package_name, "opened project");
    Ok(Project::new(root, project_name, package_name))
}

/// `[project] name` of a pyproject document, if it declares one.
fn declared_project_name(text: &str) -> Result<Option<String>, String> {
    let table: toml::Table = text
        .parse()
        .map_err(|e| format!("{PYPROJECT_FILE} is not valid TOML: {e}"))?;
    Ok(table
        .get("project")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string))
}

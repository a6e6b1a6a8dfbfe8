//! Where components live inside a project.
//!
//! ```text
//! BAR/                      project root
//! ├── pyproject.toml        tracked: [project.scripts] entries of CLIs
//! ├── API.rst               tracked: automodule entries
//! ├── bar/                  package root
//! │   ├── foo/              tree-like component `foo`
//! │   │   └── soup/         tree-like component `foo/soup`
//! │   └── cli/
//! │       └── app.py        cli-like component `app`
//! └── tests/bar/            mirrored test tree
//!     ├── foo/soup/test_soup.py
//!     └── cli/test_app.py
//! ```

use std::path::Path;

use super::common::RelativePath;
use super::component::ComponentId;
use crate::domain::error::DomainError;
use crate::domain::value_objects::{ComponentKind, ComponentLayout};

pub const API_REFERENCE_FILE: &str = "API.rst";
pub const PYPROJECT_FILE: &str = "pyproject.toml";
pub const TESTS_DIR: &str = "tests";
pub const CLI_DIR: &str = "cli";

/// Directories never descended into when rewriting file contents.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".venv",
    ".git",
    "_build",
    "_cmake_build",
    "__pycache__",
    ".pytest_cache",
];

/// Extensions of files whose contents are never rewritten (binary or
/// generated).
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    "so", "pyd", "dll", "dylib", "o", "a", "mod", "pyc", "json", "lock", "log", "png", "jpg",
    "gif", "pdf", "zip", "gz",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    package_name: String,
}

impl ProjectLayout {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn package_dir(&self) -> Result<RelativePath, DomainError> {
        RelativePath::try_new(&self.package_name)
    }

    pub fn test_package_dir(&self) -> Result<RelativePath, DomainError> {
        RelativePath::try_new(TESTS_DIR)?.join(&self.package_name)
    }

    /// Primary file or directory of a component.
    pub fn source_path(
        &self,
        id: &ComponentId,
        kind: ComponentKind,
    ) -> Result<RelativePath, DomainError> {
        match kind.layout() {
            ComponentLayout::TreeLike => self.package_dir()?.join(id.as_str()),
            ComponentLayout::CliLike => self
                .package_dir()?
                .join(CLI_DIR)?
                .join(format!("{}.py", id.name())),
        }
    }

    /// Mirrored test directory (tree-like) or test file (cli-like).
    pub fn test_path(
        &self,
        id: &ComponentId,
        kind: ComponentKind,
    ) -> Result<RelativePath, DomainError> {
        match kind.layout() {
            ComponentLayout::TreeLike => self.test_package_dir()?.join(id.as_str()),
            ComponentLayout::CliLike => self
                .test_package_dir()?
                .join(CLI_DIR)?
                .join(format!("test_{}.py", id.name())),
        }
    }

    /// Fully-qualified Python module path, e.g. `bar.foo.soup` or
    /// `bar.cli.app`.
    pub fn module_path(&self, id: &ComponentId, kind: ComponentKind) -> String {
        match kind.layout() {
            ComponentLayout::TreeLike => format!("{}.{}", self.package_name, id.dotted()),
            ComponentLayout::CliLike => {
                format!("{}.{}.{}", self.package_name, CLI_DIR, id.name())
            }
        }
    }

    /// The literal a component owns in one of the shared files trellis
    /// writes to, or `None` for any other file.
    pub fn tracked_literal(
        &self,
        file: &RelativePath,
        id: &ComponentId,
        kind: ComponentKind,
    ) -> Option<String> {
        let module = self.module_path(id, kind);
        match file.to_slash().as_str() {
            API_REFERENCE_FILE => Some(api_reference(&module)),
            PYPROJECT_FILE if kind.is_cli() => Some(script_entry(id.name(), &module)),
            _ => None,
        }
    }
}

/// `API.rst` section of one module. Tracked whole, so that editing it never
/// touches the section of a module whose path merely starts the same way.
pub fn api_reference(module: &str) -> String {
    format!("\n.. automodule:: {module}\n   :members:\n")
}

/// `[project.scripts]` line of a CLI component.
pub fn script_entry(name: &str, module: &str) -> String {
    format!("{name} = \"{module}:main\"")
}

/// Whether the contents of `path` may be rewritten during a rename.
///
/// `path` is relative to the tree being rewritten; any excluded directory
/// among its ancestors disqualifies it.
pub fn is_text_substitutable(path: &Path) -> bool {
    let in_excluded_dir = path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|c| c.as_os_str().to_str())
        .any(is_excluded_dir);
    if in_excluded_dir {
        return false;
    }

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.starts_with(".orig.") {
        return false;
    }
    let excluded_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXCLUDED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    !excluded_ext
}

pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    #[test]
    fn tree_components_nest_under_package() {
        let layout = ProjectLayout::new("bar");
        let soup = id("foo/soup");
        let kind = ComponentKind::PythonModule;

        assert_eq!(layout.source_path(&soup, kind).unwrap().to_slash(), "bar/foo/soup");
        assert_eq!(layout.test_path(&soup, kind).unwrap().to_slash(), "tests/bar/foo/soup");
        assert_eq!(layout.module_path(&soup, kind), "bar.foo.soup");
    }

    #[test]
    fn cli_components_live_in_cli_dir() {
        let layout = ProjectLayout::new("bar");
        let app = id("app");
        let kind = ComponentKind::CliWithSubcommands;

        assert_eq!(layout.source_path(&app, kind).unwrap().to_slash(), "bar/cli/app.py");
        assert_eq!(layout.test_path(&app, kind).unwrap().to_slash(), "tests/bar/cli/test_app.py");
        assert_eq!(layout.module_path(&app, kind), "bar.cli.app");
    }

    #[test]
    fn tracked_literals_cover_the_whole_entry() {
        let layout = ProjectLayout::new("bar");
        let file = |p: &str| RelativePath::try_new(p).unwrap();
        let module = ComponentKind::PythonModule;
        let cli = ComponentKind::CliSingleCommand;

        assert_eq!(
            layout.tracked_literal(&file("API.rst"), &id("foo"), module).as_deref(),
            Some("\n.. automodule:: bar.foo\n   :members:\n")
        );
        assert_eq!(
            layout.tracked_literal(&file("pyproject.toml"), &id("app"), cli).as_deref(),
            Some("app = \"bar.cli.app:main\"")
        );
        assert!(layout.tracked_literal(&file("pyproject.toml"), &id("foo"), module).is_none());
        assert!(layout.tracked_literal(&file("README.md"), &id("foo"), module).is_none());
    }

    #[test]
    fn sibling_api_sections_do_not_contain_each_other() {
        assert!(!api_reference("bar.foo2").contains(&api_reference("bar.foo")));
        assert!(!api_reference("bar.foo.soup").contains(&api_reference("bar.foo")));
    }

    #[test]
    fn binary_and_generated_files_are_not_substitutable() {
        assert!(is_text_substitutable(Path::new("foo/__init__.py")));
        assert!(is_text_substitutable(Path::new("soup/soup.f90")));
        assert!(!is_text_substitutable(Path::new("soup/soup.cpython-312.so")));
        assert!(!is_text_substitutable(Path::new("components.json")));
        assert!(!is_text_substitutable(Path::new("poetry.lock")));
        assert!(!is_text_substitutable(Path::new(".orig.__init__.py")));
    }

    #[test]
    fn files_under_excluded_dirs_are_not_substitutable() {
        assert!(!is_text_substitutable(Path::new("soup/__pycache__/x.py")));
        assert!(!is_text_substitutable(Path::new(".venv/lib/site.py")));
        assert!(is_text_substitutable(Path::new("soup/build_notes.md")));
    }
}

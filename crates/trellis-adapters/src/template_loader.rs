//! Filesystem-based template loader.
//!
//! Reads user templates from a directory tree and converts them into domain
//! [`Template`] objects. A user template with the id of a builtin replaces it.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── module-py/                               ← template id
//! │   ├── template.toml                        ← manifest (optional)
//! │   ├── {{tmpl.package_name}}/{{tmpl.component_path}}/__init__.py
//! │   └── tests/{{tmpl.package_name}}/{{tmpl.component_path}}/test_{{tmpl.component_name}}.py
//! └── project/
//!     └── ...
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! description = "Python module with logging"   # optional
//!
//! # Optional: override per-file handling.
//! # If omitted, files containing {{tmpl.<name>}} are parameterized.
//! [[files]]
//! path   = "{{tmpl.package_name}}/cli/__init__.py"
//! type   = "parameterized"   # literal | parameterized
//! shared = true              # keep the file if it already exists
//! ```

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use trellis_core::{
    application::ApplicationError,
    domain::{
        DirectorySpec, DomainError, FileSpec, Template, TemplateContent, TemplateId, TemplateNode,
        TemplateSource,
    },
    error::TrellisResult,
};

const MANIFEST_FILE: &str = "template.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateManifest {
    #[serde(default)]
    pub template: TemplateSection,
    /// Explicit per-file overrides. Files not listed here are auto-detected.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateSection {
    pub description: Option<String>,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    /// Path pattern relative to the template root.
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,
    /// Leave the file alone when it already exists in the project.
    #[serde(default)]
    pub shared: bool,
}

/// Controls how a file's content is treated during expansion.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Content is copied verbatim.
    Literal,
    /// Content contains `{{tmpl.<name>}}` placeholders.
    Parameterized,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Template`] objects from a directory of template directories.
///
/// Each immediate subdirectory of `templates_dir` is one template, named
/// after the subdirectory. Subdirectories that fail to load emit a `WARN`
/// log and are skipped.
///
/// # Example
///
/// ```no_run
/// use trellis_adapters::template_loader::FilesystemTemplateLoader;
///
/// let loader = FilesystemTemplateLoader::new("./templates");
/// let templates = loader.load_all()?;
/// println!("Loaded {} templates", templates.len());
/// # Ok::<(), trellis_core::error::TrellisError>(())
/// ```
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    /// Load every valid template found under the templates directory.
    ///
    /// # Errors
    ///
    /// Fails when the directory itself is missing or unreadable. Individual
    /// templates that fail to load are skipped.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_all(&self) -> TrellisResult<Vec<Template>> {
        let read_dir = fs::read_dir(&self.templates_dir).map_err(|e| {
            ApplicationError::filesystem("read templates directory", &self.templates_dir, e)
        })?;

        let mut dirs: Vec<PathBuf> = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                ApplicationError::filesystem("read templates directory", &self.templates_dir, e)
            })?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();

        let mut templates = Vec::new();
        for dir in dirs {
            match self.load_template_from_dir(&dir) {
                Ok(template) => {
                    debug!(id = %template.id, "loaded template");
                    templates.push(template);
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping template directory");
                }
            }
        }

        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }

    /// Load a single template from one subdirectory.
    fn load_template_from_dir(&self, dir: &Path) -> Result<Template, DomainError> {
        let id = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                DomainError::InvalidTemplate(format!(
                    "template directory name is not valid UTF-8: {}",
                    dir.display()
                ))
            })?
            .to_string();

        let manifest = read_manifest(dir)?;
        let description = manifest
            .template
            .description
            .clone()
            .unwrap_or_else(|| format!("User template from {}", dir.display()));

        let mut template = Template::new(TemplateId::new(id), description);
        for node in build_nodes(dir, &manifest)? {
            template = template.with_node(node);
        }
        template.validate()?;
        Ok(template)
    }
}

fn read_manifest(dir: &Path) -> Result<TemplateManifest, DomainError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Ok(TemplateManifest::default());
    }

    let raw = fs::read_to_string(&manifest_path).map_err(|e| {
        DomainError::InvalidTemplate(format!(
            "failed to read '{}': {e}",
            manifest_path.display()
        ))
    })?;
    toml::from_str(&raw).map_err(|e| {
        DomainError::InvalidTemplate(format!(
            "failed to parse '{}': {e}",
            manifest_path.display()
        ))
    })
}

/// Walk `dir` and turn every file into a node. Directories only become nodes
/// when they are empty; others are created implicitly by their files.
fn build_nodes(dir: &Path, manifest: &TemplateManifest) -> Result<Vec<TemplateNode>, DomainError> {
    let overrides: HashMap<String, &FileEntry> = manifest
        .files
        .iter()
        .map(|f| (normalize_path(&f.path), f))
        .collect();

    let mut nodes = Vec::new();
    let mut non_empty: HashSet<PathBuf> = HashSet::new();
    let mut directories: Vec<(PathBuf, String)> = Vec::new();

    for walk_entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let walk_entry = walk_entry
            .map_err(|e| DomainError::InvalidTemplate(format!("directory walk error: {e}")))?;
        let abs_path = walk_entry.path();
        let rel = abs_path.strip_prefix(dir).map_err(|_| {
            DomainError::InvalidTemplate(format!(
                "failed to relativise '{}' against '{}'",
                abs_path.display(),
                dir.display()
            ))
        })?;

        if rel == Path::new(MANIFEST_FILE) {
            continue;
        }
        if let Some(parent) = abs_path.parent() {
            non_empty.insert(parent.to_path_buf());
        }

        let path_str = normalize_path(&rel.to_string_lossy());
        if walk_entry.file_type().is_dir() {
            directories.push((abs_path.to_path_buf(), path_str));
            continue;
        }
        if !walk_entry.file_type().is_file() {
            continue;
        }

        let content = fs::read_to_string(abs_path).map_err(|e| {
            DomainError::InvalidTemplate(format!("failed to read file '{path_str}': {e}"))
        })?;
        let entry = overrides.get(&path_str).copied();
        let mut spec = FileSpec::new(path_str, resolve_content(content, entry));
        if entry.is_some_and(|e| e.shared) {
            spec = spec.keep_existing();
        }
        nodes.push(TemplateNode::File(spec));
    }

    for (abs_path, path_str) in directories {
        if !non_empty.contains(&abs_path) {
            nodes.push(TemplateNode::Directory(DirectorySpec::new(path_str)));
        }
    }

    Ok(nodes)
}

/// An explicit manifest `type` wins; otherwise content with a placeholder is
/// parameterized and everything else literal.
fn resolve_content(content: String, entry: Option<&FileEntry>) -> TemplateContent {
    let source = TemplateSource::from(content);
    match entry.and_then(|e| e.file_type) {
        Some(FileType::Literal) => TemplateContent::Literal(source),
        Some(FileType::Parameterized) => TemplateContent::Parameterized(source),
        None if source.contains_placeholder() => TemplateContent::Parameterized(source),
        None => TemplateContent::Literal(source),
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trellis_core::domain::WritePolicy;

    fn write(root: &Path, rel: &str, content: &str) {
        let full = root.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    fn find_file<'a>(t: &'a Template, path: &str) -> &'a FileSpec {
        t.tree
            .nodes
            .iter()
            .find_map(|n| match n {
                TemplateNode::File(f) if f.path == path => Some(f),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no file '{path}' in template"))
    }

    #[test]
    fn missing_directory_is_filesystem_error() {
        let loader = FilesystemTemplateLoader::new("/absolutely/does/not/exist");
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn subdirectory_name_is_template_id() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "module-py/{{tmpl.package_name}}/x.py", "pass\n");
        write(temp.path(), "README.md", "not a template");

        let templates = FilesystemTemplateLoader::new(temp.path()).load_all().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id.name(), "module-py");
    }

    #[test]
    fn auto_detects_content_type() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "t/a.py", "import {{tmpl.module_path}}\n");
        write(temp.path(), "t/b.txt", "no placeholders {{ here }}\n");

        let templates = FilesystemTemplateLoader::new(temp.path()).load_all().unwrap();
        let t = &templates[0];
        assert!(matches!(
            find_file(t, "a.py").content,
            TemplateContent::Parameterized(_)
        ));
        assert!(matches!(
            find_file(t, "b.txt").content,
            TemplateContent::Literal(_)
        ));
    }

    #[test]
    fn manifest_overrides_type_and_sharing() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "t/template.toml",
            r#"
[template]
description = "custom"

[[files]]
path = "a.py"
type = "literal"
shared = true
"#,
        );
        write(temp.path(), "t/a.py", "{{tmpl.package_name}}\n");

        let templates = FilesystemTemplateLoader::new(temp.path()).load_all().unwrap();
        let t = &templates[0];
        assert_eq!(t.description, "custom");
        assert_eq!(t.tree.len(), 1, "manifest is not part of the tree");
        let file = find_file(t, "a.py");
        assert!(matches!(file.content, TemplateContent::Literal(_)));
        assert_eq!(file.policy, WritePolicy::KeepExisting);
    }

    #[test]
    fn only_empty_directories_become_nodes() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "t/src/main.py", "");
        fs::create_dir_all(temp.path().join("t/data")).unwrap();

        let templates = FilesystemTemplateLoader::new(temp.path()).load_all().unwrap();
        let dirs: Vec<&str> = templates[0]
            .tree
            .nodes
            .iter()
            .filter_map(|n| match n {
                TemplateNode::Directory(d) => Some(d.path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(dirs, vec!["data"]);
    }

    #[test]
    fn broken_manifest_skips_only_that_template() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "bad/template.toml", "[template\n");
        write(temp.path(), "bad/a.py", "");
        write(temp.path(), "good/a.py", "");

        let templates = FilesystemTemplateLoader::new(temp.path()).load_all().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id.name(), "good");
    }

    #[test]
    fn empty_template_directory_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();
        let templates = FilesystemTemplateLoader::new(temp.path()).load_all().unwrap();
        assert!(templates.is_empty());
    }
}

//! Template domain model.
//!
//! A [`Template`] is a tree of file and directory specs whose paths and
//! contents may contain `{{tmpl.<name>}}` placeholders. Rendering against a
//! [`TemplateParameters`] set is strict: any placeholder without a value
//! fails with [`DomainError::MissingParameter`], before anything is written.
//!
//! Templates are data. Where they come from (compiled-in, a user template
//! directory) is the concern of the `TemplateStore` port.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::domain::entities::project_structure::WritePolicy;
use crate::domain::error::DomainError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    // {{tmpl.name}}, whitespace inside the braces tolerated
    Regex::new(r"\{\{\s*tmpl\.(\w+)\s*\}\}").expect("placeholder pattern is valid")
});

// ============================================================================
// Parameters
// ============================================================================

/// Values substituted into `{{tmpl.<name>}}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParameters {
    values: BTreeMap<String, String>,
}

impl TemplateParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters every project template can rely on.
    pub fn for_project(project_name: &str, package_name: &str) -> Self {
        Self::new()
            .with("project_name", project_name)
            .with("package_name", package_name)
            .with("year", chrono::Local::now().year().to_string())
            .with("trellis_version", crate::VERSION)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Fill in keys not already present. Explicit values win.
    pub fn with_defaults(mut self, defaults: &TemplateParameters) -> Self {
        for (key, value) in &defaults.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    /// Substitute every placeholder in `text`.
    ///
    /// `location` names the file (or file name pattern) being rendered and
    /// only appears in the error.
    pub fn render(&self, text: &str, location: &str) -> Result<String, DomainError> {
        if let Some(missing) = self.first_missing(text) {
            return Err(DomainError::MissingParameter {
                name: missing,
                location: location.to_string(),
            });
        }

        Ok(PLACEHOLDER
            .replace_all(text, |caps: &regex::Captures<'_>| {
                self.get(&caps[1]).unwrap_or_default().to_string()
            })
            .into_owned())
    }

    fn first_missing(&self, text: &str) -> Option<String> {
        PLACEHOLDER
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .find(|name| !self.values.contains_key(name))
    }
}

/// Names of all placeholders referenced in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

// ============================================================================
// Template
// ============================================================================

/// Name of a template, e.g. `module-py`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateId,
    pub description: String,
    pub tree: TemplateTree,
}

impl Template {
    pub fn new(id: impl Into<TemplateId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            tree: TemplateTree::new(),
        }
    }

    pub fn with_node(mut self, node: TemplateNode) -> Self {
        self.tree.push(node);
        self
    }

    /// Parameterized file that must not already exist.
    pub fn with_file(self, path: impl Into<String>, content: impl Into<TemplateSource>) -> Self {
        self.with_node(TemplateNode::File(FileSpec::new(
            path,
            TemplateContent::Parameterized(content.into()),
        )))
    }

    /// Parameterized file that is left alone when it already exists, for
    /// files shared between components (e.g. a package `__init__.py`).
    pub fn with_shared_file(
        self,
        path: impl Into<String>,
        content: impl Into<TemplateSource>,
    ) -> Self {
        self.with_node(TemplateNode::File(
            FileSpec::new(path, TemplateContent::Parameterized(content.into())).keep_existing(),
        ))
    }

    /// Structural checks only: placeholders are resolved at render time.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.tree.is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "template '{}' has no content",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for node in &self.tree.nodes {
            let path = node.path();
            if path.starts_with('/') || path.split('/').any(|s| s == "..") {
                return Err(DomainError::AbsolutePathNotAllowed {
                    path: path.to_string(),
                });
            }
            if !seen.insert(path) {
                return Err(DomainError::DuplicatePath {
                    path: path.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Every parameter name the template references, deduplicated.
    pub fn required_parameters(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for node in &self.tree.nodes {
            let mut found = placeholders(node.path());
            if let TemplateNode::File(file) = node {
                found.extend(placeholders(file.content.source().as_str()));
            }
            for name in found {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateTree {
    /// Ordered list of filesystem nodes to create.
    pub nodes: Vec<TemplateNode>,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TemplateNode) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(Debug, Clone)]
pub enum TemplateNode {
    File(FileSpec),
    Directory(DirectorySpec),
}

impl TemplateNode {
    /// Path pattern (may contain placeholders).
    pub fn path(&self) -> &str {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSpec {
    /// Path pattern relative to the expansion root, `/`-separated.
    pub path: String,
    pub content: TemplateContent,
    pub policy: WritePolicy,
}

impl FileSpec {
    pub fn new(path: impl Into<String>, content: TemplateContent) -> Self {
        Self {
            path: path.into(),
            content,
            policy: WritePolicy::CreateNew,
        }
    }

    pub fn keep_existing(mut self) -> Self {
        self.policy = WritePolicy::KeepExisting;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySpec {
    pub path: String,
}

impl DirectorySpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

// ============================================================================
// Content Types
// ============================================================================

#[derive(Debug, Clone)]
pub enum TemplateContent {
    /// Content used exactly as provided.
    Literal(TemplateSource),

    /// Content with `{{tmpl.<name>}}` placeholders to be substituted.
    Parameterized(TemplateSource),
}

impl TemplateContent {
    pub fn source(&self) -> &TemplateSource {
        match self {
            Self::Literal(s) | Self::Parameterized(s) => s,
        }
    }
}

/// Source of template content: either compile-time or runtime.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Compile-time string literal (builtin templates)
    Static(&'static str),

    /// Runtime-owned string (loaded from a template directory)
    Owned(String),
}

impl From<&'static str> for TemplateSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for TemplateSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }

    pub fn contains_placeholder(&self) -> bool {
        PLACEHOLDER.is_match(self.as_str())
    }
}

// ============================================================================
// Name helpers
// ============================================================================

/// Python-friendly module name for a project name: lowercase, with runs of
/// separators and other non-identifier characters collapsed to `_`.
///
/// | Input            | Output          |
/// |------------------|-----------------|
/// | `BAR`            | `bar`           |
/// | `my-project`     | `my_project`    |
/// | `Hello World 2`  | `hello_world_2` |
pub fn to_module_name(project_name: &str) -> String {
    let mut out = String::with_capacity(project_name.len());
    let mut pending_sep = false;
    for c in project_name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_all_placeholders() {
        let params = TemplateParameters::new()
            .with("package_name", "bar")
            .with("module_name", "soup");
        let out = params
            .render("import {{tmpl.package_name}}.{{ tmpl.module_name }}", "x.py")
            .unwrap();
        assert_eq!(out, "import bar.soup");
    }

    #[test]
    fn render_fails_on_missing_parameter() {
        let params = TemplateParameters::new().with("a", "1");
        let err = params.render("{{tmpl.a}} {{tmpl.x}}", "README.md").unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingParameter {
                name: "x".into(),
                location: "README.md".into()
            }
        );
    }

    #[test]
    fn render_leaves_foreign_braces_alone() {
        let params = TemplateParameters::new();
        let text = "{{ jinja_var }} and {PROJECT}";
        assert_eq!(params.render(text, "t").unwrap(), text);
    }

    #[test]
    fn defaults_do_not_override_explicit_values() {
        let defaults = TemplateParameters::new().with("author", "Anon").with("license", "MIT");
        let params = TemplateParameters::new()
            .with("author", "Ada")
            .with_defaults(&defaults);
        assert_eq!(params.get("author"), Some("Ada"));
        assert_eq!(params.get("license"), Some("MIT"));
    }

    #[test]
    fn project_parameters_include_year() {
        let params = TemplateParameters::for_project("BAR", "bar");
        assert_eq!(params.get("package_name"), Some("bar"));
        assert_eq!(params.get("year").map(str::len), Some(4));
    }

    #[test]
    fn template_validation_rejects_duplicates_and_escapes() {
        let dup = Template::new("t", "dup")
            .with_file("a.py", "")
            .with_file("a.py", "");
        assert!(matches!(dup.validate(), Err(DomainError::DuplicatePath { .. })));

        let escape = Template::new("t", "escape").with_file("../a.py", "");
        assert!(escape.validate().is_err());

        assert!(Template::new("t", "empty").validate().is_err());
    }

    #[test]
    fn required_parameters_cover_paths_and_contents() {
        let template = Template::new("t", "")
            .with_file("{{tmpl.package_name}}/x.py", "{{tmpl.module_name}} {{tmpl.package_name}}");
        assert_eq!(
            template.required_parameters(),
            vec!["package_name".to_string(), "module_name".to_string()]
        );
    }

    #[test]
    fn module_name_from_project_name() {
        assert_eq!(to_module_name("BAR"), "bar");
        assert_eq!(to_module_name("my-project"), "my_project");
        assert_eq!(to_module_name("Hello  World 2"), "hello_world_2");
        assert_eq!(to_module_name("3d-tools"), "_3d_tools");
    }
}

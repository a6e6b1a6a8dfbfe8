//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `trellis-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{ProjectStructure, Registry, Template, TemplateId, TemplateParameters};
use crate::error::TrellisResult;

/// One entry found while walking a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsNode {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `trellis_adapters::filesystem::LocalFilesystem` (production)
/// - `trellis_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Every call is blocking and completes before the next one starts. Paths
/// are absolute (the project root joined with a project-relative path).
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> TrellisResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> TrellisResult<()>;

    fn read_to_string(&self, path: &Path) -> TrellisResult<String>;

    /// Rename a file or directory. The destination's parent must exist.
    fn rename(&self, from: &Path, to: &Path) -> TrellisResult<()>;

    fn remove_file(&self, path: &Path) -> TrellisResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> TrellisResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Every file and directory below `root` (not `root` itself), parents
    /// before children.
    fn walk(&self, root: &Path) -> TrellisResult<Vec<FsNode>>;
}

/// Port for component registry persistence.
///
/// Implemented by:
/// - `trellis_adapters::registry_store::JsonRegistryStore` (production)
/// - `trellis_adapters::registry_store::InMemoryRegistryStore` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait RegistryStore: Send + Sync {
    /// Where the registry of the project at `project_root` is persisted.
    fn location(&self, project_root: &Path) -> PathBuf;

    /// Read the persisted registry. A missing document is an empty registry;
    /// an unparsable one is `ApplicationError::RegistryFormat`.
    fn load(&self, project_root: &Path) -> TrellisResult<Registry>;

    /// Overwrite the persisted document with the whole registry.
    fn save(&self, registry: &Registry, project_root: &Path) -> TrellisResult<()>;
}

/// Port for template storage and retrieval.
///
/// Implemented by:
/// - `trellis_adapters::template_store::BuiltinTemplateStore`
pub trait TemplateStore: Send + Sync {
    /// Get a specific template by ID.
    fn get(&self, id: &TemplateId) -> TrellisResult<Template>;

    /// List all available templates.
    fn list(&self) -> TrellisResult<Vec<Template>>;
}

/// Port for template expansion.
///
/// Implemented by:
/// - `trellis_adapters::expander::PlaceholderExpander`
pub trait TemplateExpander: Send + Sync {
    /// Resolve every placeholder of `template` in file names and contents.
    ///
    /// Nothing is written: the returned structure is fully rendered, so a
    /// missing parameter fails here, before any file exists.
    fn expand(
        &self,
        template: &Template,
        parameters: &TemplateParameters,
        destination: &Path,
    ) -> TrellisResult<ProjectStructure>;
}
